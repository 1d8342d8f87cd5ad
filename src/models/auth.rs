use crate::schema::{user_tokens, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::serde::{Deserialize, Serialize};
use rocket::{
    State,
    http::Status,
    request::{FromRequest, Outcome, Request},
};

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewUser {
    pub fn new(username: String, is_superuser: bool) -> Self {
        Self {
            username,
            is_superuser,
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserToken {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = user_tokens)]
pub struct NewUserToken {
    pub user_id: i32,
    pub token: String,
    pub is_active: bool,
    pub datetime_created: NaiveDateTime,
}

impl NewUserToken {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            token: uuid::Uuid::new_v4().to_string(),
            is_active: true,
            datetime_created: chrono::Utc::now().naive_utc(),
        }
    }
}

// Authentication guard for extracting the acting user from the
// Authorization header. Tokens are provisioned out of band.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
    pub is_superuser: bool,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = crate::error::ApiError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        use crate::services::AuthService;
        use crate::state::AppState;

        let state = match request.guard::<&State<AppState>>().await {
            Outcome::Success(state) => state,
            _ => {
                return Outcome::Error((
                    Status::InternalServerError,
                    crate::error::ApiError::InternalServerError(
                        "Application state unavailable".to_string(),
                    ),
                ));
            }
        };

        let auth_header = request.headers().get_one("Authorization");

        if let Some(auth_value) = auth_header {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                match AuthService::validate_token(&state.database, token) {
                    Ok(user) => Outcome::Success(AuthenticatedUser {
                        user_id: user.id,
                        username: user.username,
                        is_superuser: user.is_superuser,
                    }),
                    Err(_) => Outcome::Error((
                        Status::Unauthorized,
                        crate::error::ApiError::Unauthorized("Invalid token".to_string()),
                    )),
                }
            } else {
                Outcome::Error((
                    Status::Unauthorized,
                    crate::error::ApiError::Unauthorized(
                        "Invalid authorization format".to_string(),
                    ),
                ))
            }
        } else {
            Outcome::Error((
                Status::Unauthorized,
                crate::error::ApiError::Unauthorized("Authorization header required".to_string()),
            ))
        }
    }
}
