use rocket::response::{Responder, Response};
use rocket::{Request, http::Status};
use std::io::Cursor;

#[derive(Debug)]
pub enum ApiError {
    DatabaseError(String),
    ValidationError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalServerError(String),
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let (status, message) = match self {
            ApiError::DatabaseError(msg) => (Status::InternalServerError, msg),
            ApiError::ValidationError(msg) => (Status::BadRequest, msg),
            ApiError::BadRequest(msg) => (Status::BadRequest, msg),
            ApiError::Unauthorized(msg) => (Status::Unauthorized, msg),
            ApiError::Forbidden(msg) => (Status::Forbidden, msg),
            ApiError::NotFound(msg) => (Status::NotFound, msg),
            ApiError::Conflict(msg) => (Status::Conflict, msg),
            ApiError::InternalServerError(msg) => (Status::InternalServerError, msg),
        };

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::Plain)
            .sized_body(message.len(), Cursor::new(message))
            .ok()
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => ApiError::NotFound("Not found".to_string()),
            other => ApiError::DatabaseError(format!("Database error: {other}")),
        }
    }
}
