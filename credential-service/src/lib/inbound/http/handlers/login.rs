use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::signup::SignupRequest;
use super::signup::TokenPairResponse;
use super::ApiError;
use super::ApiSuccess;
use crate::credential::models::LoginCommand;
use crate::domain::deadline::Deadline;
use crate::inbound::http::router::AppState;

/// Login takes the same `{email, password}` body as signup.
pub type LoginRequest = SignupRequest;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenPairResponse>, ApiError> {
    let Json(body) = body?;

    state
        .credential_service
        .login(
            LoginCommand::new(body.email, body.password),
            Deadline::after(state.request_timeout),
        )
        .await
        .map_err(ApiError::from)
        .map(|tokens| ApiSuccess::new(StatusCode::OK, tokens.into()))
}
