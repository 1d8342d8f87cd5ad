use crate::error::ApiError;
use crate::models::auth::AuthenticatedUser;
use crate::models::team::{
    AddTeamMemberRequest, ServiceAccountListResponse, ServiceAccountResponse, Team,
    TeamDetailResponse, TeamMemberResponse, TeamMembersResponse, validate_role,
};
use crate::state::AppState;
use rocket::serde::json::Json;
use rocket::{State, get, post};

fn resolve_team(state: &AppState, name: &str) -> Result<Team, ApiError> {
    state
        .database
        .get_team_by_name(name)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("Team '{name}' not found")))
}

/// Checks that the caller may view team internals. Superusers and any
/// member of the team qualify.
fn ensure_team_access(
    state: &AppState,
    team: &Team,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    if user.is_superuser {
        return Ok(());
    }

    let is_member = state
        .database
        .is_team_member(team.id, user.user_id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    if is_member {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "User has insufficient permissions to access this team".to_string(),
        ))
    }
}

#[get("/api/cyberstorm/team/<name>")]
pub async fn get_team_detail(
    name: &str,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<TeamDetailResponse>, ApiError> {
    let team = resolve_team(state, name)?;
    ensure_team_access(state, &team, &user)?;

    Ok(Json(TeamDetailResponse::from(&team)))
}

#[get("/api/cyberstorm/team/<name>/members")]
pub async fn list_team_members(
    name: &str,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<TeamMembersResponse>, ApiError> {
    let team = resolve_team(state, name)?;
    ensure_team_access(state, &team, &user)?;

    let rows = state
        .database
        .get_team_members_with_users(team.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(TeamMembersResponse {
        members: rows
            .into_iter()
            .map(|(member, member_user)| TeamMemberResponse {
                username: member_user.username,
                role: member.role,
            })
            .collect(),
    }))
}

#[get("/api/cyberstorm/team/<name>/service-accounts")]
pub async fn list_service_accounts(
    name: &str,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<ServiceAccountListResponse>, ApiError> {
    let team = resolve_team(state, name)?;
    ensure_team_access(state, &team, &user)?;

    let accounts = state
        .database
        .get_service_accounts(team.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(ServiceAccountListResponse {
        service_accounts: accounts.iter().map(ServiceAccountResponse::from).collect(),
    }))
}

/// Adds a user to a team. Only team owners and superusers may manage
/// membership.
#[post("/api/cyberstorm/team/<name>/members/add", data = "<request>")]
pub async fn add_team_member(
    name: &str,
    request: Json<AddTeamMemberRequest>,
    user: AuthenticatedUser,
    state: &State<AppState>,
) -> Result<Json<TeamMemberResponse>, ApiError> {
    let team = resolve_team(state, name)?;

    if !user.is_superuser {
        let membership = state
            .database
            .get_team_member(team.id, user.user_id)
            .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
            .ok_or_else(|| {
                ApiError::Forbidden(
                    "User has insufficient permissions to access this team".to_string(),
                )
            })?;

        let role = validate_role(&membership.role)
            .map_err(|e| ApiError::InternalServerError(format!("Corrupt role value: {e}")))?;

        if !role.can_manage_members() {
            return Err(ApiError::Forbidden(
                "Must be an owner to manage team members".to_string(),
            ));
        }
    }

    let role = validate_role(&request.role).map_err(ApiError::ValidationError)?;

    let new_member = state
        .database
        .get_user_by_username(&request.username)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", request.username)))?;

    let existing = state
        .database
        .get_team_member(team.id, new_member.id)
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    if existing.is_some() {
        return Err(ApiError::Conflict(format!(
            "User '{}' is already a member of this team",
            request.username
        )));
    }

    let member = state
        .database
        .add_team_member(team.id, new_member.id, &role.to_string())
        .map_err(|e| ApiError::InternalServerError(format!("Database error: {e}")))?;

    Ok(Json(TeamMemberResponse {
        username: new_member.username,
        role: member.role,
    }))
}
