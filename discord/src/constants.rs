//! Discord and linked-role constants.

/// Discord REST API base (versioned).
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord OAuth2 consent page.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Scopes requested on every authorization.
pub const OAUTH_SCOPES: [&str; 2] = ["role_connections.write", "identify"];

/// Platform name shown on the user's Discord profile connection.
pub const DEFAULT_PLATFORM_NAME: &str = "MIYABI";

/// Per-call timeout for Discord requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Random bytes in an OAuth correlation token (256 bits).
pub const STATE_TOKEN_BYTES: usize = 32;

/// Correlation cookie settings.
pub mod state_cookie {
    /// Cookie carrying the signed correlation token between redirect and callback.
    pub const NAME: &str = "clientState";

    /// Lifetime of the correlation cookie in seconds.
    pub const MAX_AGE_SECS: i64 = 5 * 60;
}

/// Keys of the linked-role metadata document.
pub mod metadata_keys {
    /// Whether the in-game profile is public.
    pub const VIEW_PROFILE: &str = "viewprofile";

    /// Whether a game account is connected.
    pub const CONNECTED: &str = "zzzconnect";

    /// Date the game account was connected.
    pub const CONNECTED_DATE: &str = "zzzdate";

    /// In-game level.
    pub const LEVEL: &str = "zzzlevel";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_string() {
        assert_eq!(OAUTH_SCOPES.join(" "), "role_connections.write identify");
    }

    #[test]
    fn test_state_cookie_lifetime() {
        assert_eq!(state_cookie::MAX_AGE_SECS, 300);
        assert_eq!(state_cookie::NAME, "clientState");
    }
}
