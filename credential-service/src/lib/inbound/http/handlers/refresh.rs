use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::credential::models::RefreshCommand;
use crate::domain::deadline::Deadline;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<AccessTokenResponse>, ApiError> {
    let Json(body) = body?;

    state
        .credential_service
        .refresh(
            RefreshCommand::new(body.refresh_token),
            Deadline::after(state.request_timeout),
        )
        .await
        .map_err(ApiError::from)
        .map(|refreshed| {
            ApiSuccess::new(
                StatusCode::OK,
                AccessTokenResponse {
                    access_token: refreshed.access_token,
                },
            )
        })
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}
