//! Metadata re-sync handler.

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use linked_roles_discord::providers::{MetadataSource, TokenStore};
use linked_roles_discord::UserId;
use serde::{Deserialize, Serialize};

/// Body of `POST /update-metadata`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetadataRequest {
    /// Discord user id whose metadata changed.
    pub user_id: String,
}

/// Recompute and push a linked user's metadata.
///
/// Invoked by whatever owns the profile data when it changes.
///
/// # Endpoint
///
/// ```text
/// POST /update-metadata
/// Content-Type: application/json
///
/// { "userId": "80351110224678912" }
/// ```
///
/// # Errors
///
/// Returns 500 if the body is not a JSON object with a `userId` string, the
/// user never linked, or Discord rejects the push.
pub async fn update_metadata<T, M>(
    State(state): State<AppState<T, M>>,
    body: Result<Json<UpdateMetadataRequest>, JsonRejection>,
) -> WebResult<StatusCode>
where
    T: TokenStore + 'static,
    M: MetadataSource + 'static,
{
    let Json(request) = body.map_err(|rejection| {
        AppError::internal("An internal error occurred").with_source(anyhow::Error::new(rejection))
    })?;

    let user_id = UserId::from(request.user_id);
    state.linked_roles.update_metadata(&user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
