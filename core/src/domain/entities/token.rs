//! Token entities for RS256-signed JWT authentication.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of token a claim set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented to resource services
    Access,
    /// Long-lived token exchanged for new pairs
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for the JWT payload
///
/// The wire format is fixed: `sub`, `iat`, `exp`, `jti`, `type`, and
/// `familyId` on refresh tokens only. Verifiers in other processes
/// depend on exactly these names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Token kind (access or refresh)
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Refresh token family, present on refresh tokens only
    #[serde(rename = "familyId", skip_serializing_if = "Option::is_none", default)]
    pub family_id: Option<String>,
}

impl Claims {
    /// Creates new claims for an access token
    ///
    /// # Arguments
    ///
    /// * `subject` - The user identifier placed in `sub`
    /// * `ttl_seconds` - Access token lifetime
    ///
    /// # Returns
    ///
    /// A new `Claims` instance with a fresh `jti`
    pub fn new_access_token(subject: impl Into<String>, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
            family_id: None,
        }
    }

    /// Creates new claims for a refresh token
    ///
    /// # Arguments
    ///
    /// * `subject` - The user identifier placed in `sub`
    /// * `family_id` - The rotation chain this token belongs to
    /// * `ttl_seconds` - Refresh token lifetime
    ///
    /// # Returns
    ///
    /// A new `Claims` instance with a fresh `jti`
    pub fn new_refresh_token(
        subject: impl Into<String>,
        family_id: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Refresh,
            family_id: Some(family_id.into()),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.exp
    }

    /// Expiration as a UTC timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }

    /// Issue time as a UTC timestamp
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_else(Utc::now)
    }
}

/// A token that passed verification, with the key that vouched for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// The validated claim set
    pub claims: Claims,
    /// Key id from the token header
    pub kid: String,
}

impl VerifiedToken {
    /// Subject the token was issued to
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Kind of token that was verified
    pub fn token_type(&self) -> TokenType {
        self.claims.token_type
    }
}

/// Token pair returned to the client after login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Token type for the Authorization header
    pub token_type: String,

    /// Access token expiry time in seconds
    pub expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    ///
    /// # Arguments
    ///
    /// * `access_token` - The JWT access token
    /// * `refresh_token` - The JWT refresh token
    /// * `access_expiry_seconds` - Access token lifetime
    /// * `refresh_expiry_seconds` - Refresh token lifetime
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expiry_seconds: i64,
        refresh_expiry_seconds: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: access_expiry_seconds,
            refresh_expires_in: refresh_expiry_seconds,
        }
    }
}
