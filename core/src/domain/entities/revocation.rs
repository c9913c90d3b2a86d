//! Revocation entities shared between the authority and verifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a token or family was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevocationReason {
    /// The user ended the session
    Logout,
    /// The token was exchanged during refresh rotation
    RotationSuperseded,
    /// A rotated-out refresh token was presented again
    ReuseDetected,
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevocationReason::Logout => write!(f, "logout"),
            RevocationReason::RotationSuperseded => write!(f, "rotation-superseded"),
            RevocationReason::ReuseDetected => write!(f, "reuse-detected"),
        }
    }
}

/// What a revocation entry refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevocationId {
    /// A single token by its `jti` claim
    Jti(String),
    /// Every token in a refresh family, past and future
    Family(String),
}

impl RevocationId {
    /// Storage key for this id, stable across store implementations
    pub fn storage_key(&self) -> String {
        match self {
            RevocationId::Jti(jti) => format!("jti:{}", jti),
            RevocationId::Family(family_id) => format!("family:{}", family_id),
        }
    }
}

/// A single revocation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// Why the revocation happened
    pub reason: RevocationReason,

    /// When the revocation was recorded
    pub revoked_at: DateTime<Utc>,

    /// Expiry of the underlying token (or family horizon); the entry
    /// may be pruned once this has passed
    pub expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    /// Creates an entry recorded now
    pub fn new(reason: RevocationReason, expires_at: DateTime<Utc>) -> Self {
        Self {
            reason,
            revoked_at: Utc::now(),
            expires_at,
        }
    }

    /// Whether the underlying token is past its own expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Lifecycle of a refresh token family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyStatus {
    /// Normal operation, the newest token is usable
    Valid,
    /// The previous generation was exchanged
    Rotated,
    /// Reuse was detected; every member is revoked
    Compromised,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_revocation_id_storage_keys() {
        assert_eq!(RevocationId::Jti("abc".into()).storage_key(), "jti:abc");
        assert_eq!(
            RevocationId::Family("fam-1".into()).storage_key(),
            "family:fam-1"
        );
    }

    #[test]
    fn test_entry_expiry() {
        let now = Utc::now();
        let entry = RevocationEntry::new(RevocationReason::Logout, now + Duration::hours(1));

        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn test_reason_wire_format() {
        let json = serde_json::to_value(RevocationReason::RotationSuperseded).unwrap();
        assert_eq!(json, "rotation-superseded");

        let json = serde_json::to_value(RevocationReason::ReuseDetected).unwrap();
        assert_eq!(json, "reuse-detected");
    }
}
