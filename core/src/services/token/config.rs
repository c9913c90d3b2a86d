//! Token issuance and verification policy

use signet_shared::config::AuthConfig;

/// Lifetimes and tolerances for issued tokens
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    /// Access token lifetime in seconds
    pub access_token_lifetime_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_lifetime_seconds: i64,
    /// Allowed clock skew when checking `exp` and `iat`, in seconds
    pub clock_skew_leeway_seconds: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_token_lifetime_seconds: 900,      // 15 minutes
            refresh_token_lifetime_seconds: 604_800, // 7 days
            clock_skew_leeway_seconds: 5,
        }
    }
}

impl From<&AuthConfig> for TokenPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access_token_lifetime_seconds: config.token.access_token_expiry,
            refresh_token_lifetime_seconds: config.token.refresh_token_expiry,
            clock_skew_leeway_seconds: config.token.clock_skew_leeway,
        }
    }
}
