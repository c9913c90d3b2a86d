//! Authentication configuration for the token core

use serde::{Deserialize, Serialize};

/// Token lifetime and verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Clock-skew tolerance applied to `exp` and `iat` checks, in seconds
    #[serde(default = "default_leeway")]
    pub clock_skew_leeway: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            clock_skew_leeway: default_leeway(),
        }
    }
}

impl TokenConfig {
    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set clock-skew tolerance in seconds
    pub fn with_leeway_seconds(mut self, seconds: i64) -> Self {
        self.clock_skew_leeway = seconds;
        self
    }
}

/// Signing key rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    /// Interval between scheduled rotations, in seconds
    pub rotation_interval: i64,

    /// How long a key stays verifiable after leaving active, in seconds.
    /// Must cover the longest refresh token lifetime.
    pub grace_period: i64,

    /// RSA modulus size in bits for newly generated keys
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval: 604800, // weekly
            grace_period: 1209600,     // 14 days
            key_bits: default_key_bits(),
        }
    }
}

impl RotationConfig {
    /// Set the rotation interval in days
    pub fn with_rotation_interval_days(mut self, days: i64) -> Self {
        self.rotation_interval = days * 86400;
        self
    }

    /// Set the grace period in days
    pub fn with_grace_period_days(mut self, days: i64) -> Self {
        self.grace_period = days * 86400;
        self
    }
}

/// Key-set discovery configuration for remote verifiers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// How long a fetched key-set document is considered fresh, in seconds
    pub refresh_interval: u64,

    /// Upper bound on a single key-set fetch, in seconds
    pub fetch_timeout: u64,

    /// Maximum backoff between failed refresh attempts, in seconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 900, // 15 minutes
            fetch_timeout: 5,
            max_backoff: default_max_backoff(),
        }
    }
}

/// Complete configuration for the authentication core
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Token lifetimes and verification tolerances
    pub token: TokenConfig,

    /// Key rotation policy
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Key-set discovery for remote verifiers
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Interval between revocation store sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub revocation_sweep_interval: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            rotation: RotationConfig::default(),
            discovery: DiscoveryConfig::default(),
            revocation_sweep_interval: default_sweep_interval(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let access_token_expiry = std::env::var("SIGNET_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("SIGNET_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);
        let clock_skew_leeway = std::env::var("SIGNET_CLOCK_SKEW_LEEWAY")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let rotation_interval = std::env::var("SIGNET_KEY_ROTATION_INTERVAL")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);
        let grace_period = std::env::var("SIGNET_KEY_GRACE_PERIOD")
            .unwrap_or_else(|_| "1209600".to_string())
            .parse()
            .unwrap_or(1209600);
        let key_bits = std::env::var("SIGNET_KEY_BITS")
            .unwrap_or_else(|_| "2048".to_string())
            .parse()
            .unwrap_or(2048);
        let refresh_interval = std::env::var("SIGNET_JWKS_REFRESH_INTERVAL")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);
        let fetch_timeout = std::env::var("SIGNET_JWKS_FETCH_TIMEOUT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Self {
            token: TokenConfig {
                access_token_expiry,
                refresh_token_expiry,
                clock_skew_leeway,
            },
            rotation: RotationConfig {
                rotation_interval,
                grace_period,
                key_bits,
            },
            discovery: DiscoveryConfig {
                refresh_interval,
                fetch_timeout,
                max_backoff: default_max_backoff(),
            },
            revocation_sweep_interval: default_sweep_interval(),
        }
    }

    /// Validate cross-field constraints, failing fast at startup.
    ///
    /// A refresh token issued the instant before a rotation must stay
    /// verifiable for its whole lifetime, so the grace period has to
    /// cover the refresh token expiry. Remote verifier caches must turn
    /// over well inside that window.
    pub fn validate(&self) -> Result<(), String> {
        if self.token.access_token_expiry <= 0 || self.token.refresh_token_expiry <= 0 {
            return Err("token lifetimes must be positive".to_string());
        }
        if self.token.clock_skew_leeway < 0 {
            return Err("clock_skew_leeway must not be negative".to_string());
        }
        if self.rotation.grace_period < self.token.refresh_token_expiry {
            return Err(format!(
                "key grace period ({}s) must cover the refresh token lifetime ({}s)",
                self.rotation.grace_period, self.token.refresh_token_expiry
            ));
        }
        if (self.discovery.refresh_interval as i64) >= self.rotation.grace_period {
            return Err(format!(
                "discovery refresh interval ({}s) must be shorter than the key grace period ({}s)",
                self.discovery.refresh_interval, self.rotation.grace_period
            ));
        }
        if self.rotation.key_bits < 2048 {
            return Err(format!(
                "RSA keys shorter than 2048 bits are not accepted (got {})",
                self.rotation.key_bits
            ));
        }
        Ok(())
    }
}

fn default_leeway() -> i64 {
    5
}

fn default_key_bits() -> usize {
    2048
}

fn default_max_backoff() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    3600
}
