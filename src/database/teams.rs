use super::connection::{DbPool, get_connection_with_retry, pool_error};
use crate::models::auth::{NewUser, NewUserToken, User, UserToken};
use crate::models::team::*;
use crate::schema::{namespaces, service_accounts, team_members, teams, users, user_tokens};
use diesel::prelude::*;

/// Team, namespace and user-related database operations
pub struct TeamOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> TeamOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub fn create_team(&self, name: String) -> Result<Team, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(teams::table)
            .values(&NewTeam::new(name))
            .get_result::<Team>(&mut conn)
    }

    pub fn create_namespace(
        &self,
        team_id: i32,
        name: String,
    ) -> Result<Namespace, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(namespaces::table)
            .values(&NewNamespace { name, team_id })
            .get_result::<Namespace>(&mut conn)
    }

    pub fn create_user(
        &self,
        username: String,
        is_superuser: bool,
    ) -> Result<User, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(users::table)
            .values(&NewUser::new(username, is_superuser))
            .get_result::<User>(&mut conn)
    }

    pub fn create_user_token(&self, user_id: i32) -> Result<UserToken, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(user_tokens::table)
            .values(&NewUserToken::new(user_id))
            .get_result::<UserToken>(&mut conn)
    }

    pub fn add_team_member(
        &self,
        team_id: i32,
        user_id: i32,
        role: &str,
    ) -> Result<TeamMember, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(team_members::table)
            .values(&NewTeamMember::new(team_id, user_id, role.to_string()))
            .get_result::<TeamMember>(&mut conn)
    }

    pub fn create_service_account(
        &self,
        team_id: i32,
        nickname: String,
    ) -> Result<ServiceAccount, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        diesel::insert_into(service_accounts::table)
            .values(&NewServiceAccount::new(team_id, nickname))
            .get_result::<ServiceAccount>(&mut conn)
    }

    pub fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        teams::table
            .filter(teams::name.eq(name))
            .filter(teams::is_active.eq(true))
            .first::<Team>(&mut conn)
            .optional()
    }

    pub fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        users::table
            .filter(users::username.eq(username))
            .filter(users::is_active.eq(true))
            .first::<User>(&mut conn)
            .optional()
    }

    pub fn get_team_member(
        &self,
        team_id: i32,
        user_id: i32,
    ) -> Result<Option<TeamMember>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        team_members::table
            .filter(team_members::team_id.eq(team_id))
            .filter(team_members::user_id.eq(user_id))
            .first::<TeamMember>(&mut conn)
            .optional()
    }

    pub fn is_team_member(&self, team_id: i32, user_id: i32) -> Result<bool, diesel::result::Error> {
        Ok(self.get_team_member(team_id, user_id)?.is_some())
    }

    pub fn get_team_members_with_users(
        &self,
        team_id: i32,
    ) -> Result<Vec<(TeamMember, User)>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        team_members::table
            .inner_join(users::table)
            .filter(team_members::team_id.eq(team_id))
            .order(team_members::datetime_created.asc())
            .load::<(TeamMember, User)>(&mut conn)
    }

    pub fn get_service_accounts(
        &self,
        team_id: i32,
    ) -> Result<Vec<ServiceAccount>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        service_accounts::table
            .filter(service_accounts::team_id.eq(team_id))
            .order(service_accounts::datetime_created.asc())
            .load::<ServiceAccount>(&mut conn)
    }

    pub fn get_namespace_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Namespace>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        namespaces::table
            .filter(namespaces::name.eq(name))
            .first::<Namespace>(&mut conn)
            .optional()
    }

    pub fn get_namespace_by_id(
        &self,
        namespace_id: i32,
    ) -> Result<Option<Namespace>, diesel::result::Error> {
        let mut conn = get_connection_with_retry(self.pool).map_err(pool_error)?;

        namespaces::table
            .find(namespace_id)
            .first::<Namespace>(&mut conn)
            .optional()
    }
}
