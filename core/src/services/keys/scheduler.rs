//! Background key rotation
//!
//! Rotates the signing key set on a fixed interval so no key signs
//! indefinitely.

use std::sync::Arc;

use tracing::{error, info, warn};

use signet_shared::config::AuthConfig;

use super::manager::KeyManager;
use crate::repositories::key_store::KeyStore;

/// Configuration for scheduled key rotation
#[derive(Debug, Clone)]
pub struct RotationScheduleConfig {
    /// How often to rotate (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic rotation
    pub enabled: bool,
}

impl Default for RotationScheduleConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 604_800, // rotate weekly
            enabled: true,
        }
    }
}

impl From<&AuthConfig> for RotationScheduleConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            interval_seconds: config.rotation.rotation_interval.max(0) as u64,
            enabled: true,
        }
    }
}

/// Rotates the signing key set on a fixed schedule
pub struct RotationScheduler<S: KeyStore + 'static> {
    manager: Arc<KeyManager<S>>,
    config: RotationScheduleConfig,
}

impl<S: KeyStore + 'static> RotationScheduler<S> {
    /// Creates a new rotation scheduler.
    pub fn new(manager: Arc<KeyManager<S>>, config: RotationScheduleConfig) -> Self {
        Self { manager, config }
    }

    /// Starts the scheduler as a background task.
    ///
    /// This spawns a tokio task that rotates at regular intervals.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("key rotation scheduler is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "key rotation scheduler started - will rotate every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);
            // The first tick fires immediately and the set was just
            // loaded, so consume it before entering the loop.
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;

                match self.manager.rotate().await {
                    Ok(outcome) => {
                        if !outcome.retired_kids.is_empty() {
                            info!(
                                retired = ?outcome.retired_kids,
                                "keys past their grace period were retired"
                            );
                        }
                    }
                    Err(e) => {
                        error!("scheduled key rotation failed: {}", e);
                    }
                }
            }
        });
    }
}
