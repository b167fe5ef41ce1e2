//! Shared request execution for Discord REST calls.

use crate::error::{LinkedRoleError, Operation, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Build the HTTP client used for every Discord call.
///
/// # Errors
///
/// Returns [`LinkedRoleError::Configuration`] if the TLS backend cannot be
/// initialized.
pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("linked-roles/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LinkedRoleError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Send `request` and reject anything but a 2xx answer.
///
/// Non-success bodies are logged in full and never returned to the caller.
pub(crate) async fn execute(operation: Operation, request: RequestBuilder) -> Result<Response> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            record(operation, "transport_error");
            tracing::warn!(operation = %operation, error = %e, "Discord request did not complete");
            return Err(LinkedRoleError::transport(operation, &e));
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        record(operation, "error");
        tracing::error!(
            operation = %operation,
            status = status.as_u16(),
            body = %body,
            "Discord request failed"
        );
        return Err(LinkedRoleError::provider(operation, status));
    }

    record(operation, "success");
    Ok(response)
}

/// Decode a successful response body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    operation: Operation,
    response: Response,
) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| LinkedRoleError::InvalidResponse {
            operation,
            message: e.to_string(),
        })
}

fn record(operation: Operation, outcome: &'static str) {
    metrics::counter!(
        "linked_roles.provider_request",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
