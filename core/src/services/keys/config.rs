//! Rotation policy for the signing key set

use signet_shared::config::AuthConfig;

/// Policy governing key generation, rotation, and retirement
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// How long a retiring key stays verifiable, in seconds
    pub grace_period_seconds: i64,
    /// RSA modulus size for newly generated keys
    pub key_bits: usize,
    /// Longest token lifetime the grace period must cover, in seconds
    pub max_token_lifetime_seconds: i64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            grace_period_seconds: 1_209_600, // 14 days
            key_bits: 2048,
            max_token_lifetime_seconds: 604_800, // 7 days
        }
    }
}

impl RotationPolicy {
    /// Checks the policy invariants.
    ///
    /// A grace period shorter than the longest token lifetime would
    /// retire the verification key of tokens that are still live, so
    /// such a policy is rejected outright.
    pub fn validate(&self) -> Result<(), String> {
        if self.grace_period_seconds < self.max_token_lifetime_seconds {
            return Err(format!(
                "grace period ({}s) must cover the longest token lifetime ({}s)",
                self.grace_period_seconds, self.max_token_lifetime_seconds
            ));
        }
        if self.key_bits < 2048 {
            return Err(format!(
                "key size {} is below the 2048-bit minimum",
                self.key_bits
            ));
        }
        Ok(())
    }
}

impl From<&AuthConfig> for RotationPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            grace_period_seconds: config.rotation.grace_period,
            key_bits: config.rotation.key_bits,
            max_token_lifetime_seconds: config.token.refresh_token_expiry,
        }
    }
}
