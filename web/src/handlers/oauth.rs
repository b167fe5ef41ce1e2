//! Discord authorization handlers.
//!
//! `GET /linked-role` sends the user to Discord's consent page and remembers
//! the issued state in a signed cookie. `GET /discord-oauth-callback` checks
//! that cookie against the returned state before touching the code.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use linked_roles_discord::constants::state_cookie;
use linked_roles_discord::providers::{MetadataSource, TokenStore};
use linked_roles_discord::verify_state;
use serde::{Deserialize, Serialize};

/// Query parameters Discord appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallbackParams {
    /// Authorization code (absent when the user denied consent).
    pub code: Option<String>,

    /// State issued by [`linked_role`].
    pub state: Option<String>,

    /// Error reported by Discord.
    pub error: Option<String>,

    /// Human-readable error detail reported by Discord.
    pub error_description: Option<String>,
}

/// Start the linked-role authorization.
///
/// # Endpoint
///
/// ```text
/// GET /linked-role
/// ```
///
/// # Response
///
/// 303 redirect to the Discord consent page, setting the signed
/// `clientState` cookie (5 minutes).
///
/// # Errors
///
/// Returns 500 if the consent URL cannot be built.
pub async fn linked_role<T, M>(
    State(state): State<AppState<T, M>>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError>
where
    T: TokenStore + 'static,
    M: MetadataSource + 'static,
{
    let request = state.linked_roles.begin()?;

    let cookie = Cookie::build((state_cookie::NAME, request.state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies())
        .max_age(time::Duration::seconds(state_cookie::MAX_AGE_SECS));

    Ok((jar.add(cookie), Redirect::to(&request.url)))
}

/// Complete the authorization Discord redirected back with.
///
/// # Endpoint
///
/// ```text
/// GET /discord-oauth-callback?code=...&state=...
/// ```
///
/// # Flow
///
/// 1. Compare the signed `clientState` cookie with `state` (403 on mismatch)
/// 2. Exchange the code, identify the user, store tokens, push metadata
/// 3. Clear the cookie and greet the user
///
/// # Errors
///
/// 403 on state mismatch. Anything else that goes wrong, including a denied
/// consent or a missing code, is an opaque 500.
pub async fn oauth_callback<T, M>(
    State(state): State<AppState<T, M>>,
    jar: SignedCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(SignedCookieJar, String), AppError>
where
    T: TokenStore + 'static,
    M: MetadataSource + 'static,
{
    let expected = jar.get(state_cookie::NAME);
    verify_state(
        expected.as_ref().map(Cookie::value),
        params.state.as_deref(),
    )?;

    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or_default();
        tracing::warn!(error = %error, description = %description, "Discord declined authorization");
        return Err(AppError::internal("An internal error occurred"));
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        tracing::warn!("OAuth callback carried no authorization code");
        return Err(AppError::internal("An internal error occurred"));
    };

    let user = state.linked_roles.complete_authorization(&code).await?;

    let jar = jar.remove(Cookie::build(state_cookie::NAME).path("/"));

    Ok((
        jar,
        format!(
            "Mission complete, {}. You can head back to Discord now.",
            user.display_name()
        ),
    ))
}
