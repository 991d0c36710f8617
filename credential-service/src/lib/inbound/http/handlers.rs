use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::credential::errors::CredentialError;
use crate::credential::errors::ErrorKind;

pub mod login;
pub mod refresh;
pub mod signup;

const INVALID_REQUEST_BODY: &str = "invalid request body";
const INVALID_CREDENTIALS: &str = "invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "refresh token is invalid or expired";
const EMAIL_EXISTS: &str = "email already exists";
const INTERNAL_ERROR: &str = "internal server error";

/// Successful response: status plus a flat JSON body.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Self::BadRequest(INVALID_REQUEST_BODY.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Authentication failures collapse to one message per flow; internal
// failures are logged here and never echoed to the client.
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err.kind() {
            ErrorKind::Validation => ApiError::BadRequest(err.to_string()),
            ErrorKind::Conflict => ApiError::Conflict(EMAIL_EXISTS.to_string()),
            ErrorKind::Authentication => match err {
                CredentialError::InvalidOrExpiredToken => {
                    ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
                }
                _ => ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            },
            ErrorKind::Internal => {
                tracing::error!("Request failed: {}", err);
                ApiError::InternalServerError(INTERNAL_ERROR.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::errors::ValidationError;

    #[test]
    fn test_validation_message_passes_through() {
        let err = ApiError::from(CredentialError::from(ValidationError::PasswordTooShort {
            min: 12,
        }));

        assert_eq!(
            err,
            ApiError::BadRequest("password is too short: minimum 12 characters".to_string())
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError::from(CredentialError::DatabaseError(
            "disk I/O error at /var/lib/credentials.db".to_string(),
        ));

        assert_eq!(err, ApiError::InternalServerError(INTERNAL_ERROR.to_string()));
    }

    #[test]
    fn test_authentication_messages_are_generic() {
        assert_eq!(
            ApiError::from(CredentialError::InvalidCredentials),
            ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
        );
        assert_eq!(
            ApiError::from(CredentialError::InvalidOrExpiredToken),
            ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
        );
        assert_eq!(
            ApiError::from(CredentialError::EmailAlreadyExists("a@b.com".to_string())),
            ApiError::Conflict(EMAIL_EXISTS.to_string())
        );
    }
}
