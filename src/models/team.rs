use crate::schema::{namespaces, service_accounts, team_members, teams};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewTeam {
    pub fn new(name: String) -> Self {
        Self {
            name,
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = namespaces)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Namespace {
    pub id: i32,
    pub name: String,
    pub team_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = namespaces)]
pub struct NewNamespace {
    pub name: String,
    pub team_id: i32,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TeamMember {
    pub id: i32,
    pub team_id: i32,
    pub user_id: i32,
    pub role: String,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = team_members)]
pub struct NewTeamMember {
    pub team_id: i32,
    pub user_id: i32,
    pub role: String,
    pub datetime_created: NaiveDateTime,
}

impl NewTeamMember {
    pub fn new(team_id: i32, user_id: i32, role: String) -> Self {
        Self {
            team_id,
            user_id,
            role,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = service_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ServiceAccount {
    pub id: i32,
    pub identifier: String,
    pub team_id: i32,
    pub nickname: String,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = service_accounts)]
pub struct NewServiceAccount {
    pub identifier: String,
    pub team_id: i32,
    pub nickname: String,
    pub datetime_created: NaiveDateTime,
}

impl NewServiceAccount {
    pub fn new(team_id: i32, nickname: String) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            team_id,
            nickname,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

// Role validation
#[derive(Debug, PartialEq)]
pub enum TeamRole {
    Owner,
    Member,
}

impl TeamRole {
    pub fn from_role_str(role: &str) -> Option<Self> {
        match role.to_lowercase().as_str() {
            "owner" => Some(Self::Owner),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Owner)
    }

    pub fn can_manage_packages(&self) -> bool {
        matches!(self, Self::Owner | Self::Member)
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Member => write!(f, "member"),
        }
    }
}

pub fn validate_role(role: &str) -> Result<TeamRole, String> {
    TeamRole::from_role_str(role)
        .ok_or_else(|| "Invalid role. Must be 'owner' or 'member'".to_string())
}

// Request/Response models for the team API

#[derive(Deserialize, Debug)]
pub struct AddTeamMemberRequest {
    pub username: String,
    pub role: String,
}

#[derive(Serialize, Debug)]
pub struct TeamDetailResponse {
    pub identifier: i32,
    pub name: String,
}

impl From<&Team> for TeamDetailResponse {
    fn from(team: &Team) -> Self {
        Self {
            identifier: team.id,
            name: team.name.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct TeamMemberResponse {
    pub username: String,
    pub role: String,
}

#[derive(Serialize, Debug)]
pub struct TeamMembersResponse {
    pub members: Vec<TeamMemberResponse>,
}

#[derive(Serialize, Debug)]
pub struct ServiceAccountResponse {
    pub identifier: String,
    pub name: String,
}

impl From<&ServiceAccount> for ServiceAccountResponse {
    fn from(account: &ServiceAccount) -> Self {
        Self {
            identifier: account.identifier.clone(),
            name: account.nickname.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ServiceAccountListResponse {
    pub service_accounts: Vec<ServiceAccountResponse>,
}
