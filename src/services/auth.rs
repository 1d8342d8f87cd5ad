use crate::error::ApiError;
use crate::models::auth::{User, UserToken};
use crate::schema::{user_tokens, users};
use crate::services::DatabaseService;
use diesel::prelude::*;

pub struct AuthService;

impl AuthService {
    /// Resolves a bearer token to its active user. Tokens are provisioned
    /// out of band; there are no login or registration endpoints.
    pub fn validate_token(db: &DatabaseService, token: &str) -> Result<User, ApiError> {
        let mut conn = db.get_connection().map_err(|e| {
            ApiError::InternalServerError(format!("Database connection error: {e}"))
        })?;

        let user_token = user_tokens::table
            .filter(user_tokens::token.eq(token))
            .filter(user_tokens::is_active.eq(true))
            .first::<UserToken>(&mut conn)
            .optional()
            .map_err(|e| ApiError::InternalServerError(format!("Database query error: {e}")))?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or revoked token".to_string()))?;

        users::table
            .filter(users::id.eq(user_token.user_id))
            .filter(users::is_active.eq(true))
            .first::<User>(&mut conn)
            .optional()
            .map_err(|e| ApiError::InternalServerError(format!("Failed to retrieve user: {e}")))?
            .ok_or_else(|| ApiError::Unauthorized("User is deactivated".to_string()))
    }

    pub fn revoke_token(db: &DatabaseService, token: &str) -> Result<(), ApiError> {
        let mut conn = db.get_connection().map_err(|e| {
            ApiError::InternalServerError(format!("Database connection error: {e}"))
        })?;

        diesel::update(user_tokens::table.filter(user_tokens::token.eq(token)))
            .set(user_tokens::is_active.eq(false))
            .execute(&mut conn)
            .map_err(|e| ApiError::InternalServerError(format!("Failed to revoke token: {e}")))?;

        Ok(())
    }
}
