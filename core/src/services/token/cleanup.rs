//! Background revocation maintenance
//!
//! Drops revocation entries once the tokens they deny have expired. An
//! entry removed any earlier would let a revoked token back in, so the
//! sweeper only ever looks at expiry.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use signet_shared::config::AuthConfig;

use crate::errors::DomainResult;
use crate::repositories::revocation::RevocationStore;

/// Configuration for the revocation sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic sweeping
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3_600, // run every hour
            enabled: true,
        }
    }
}

impl From<&AuthConfig> for SweeperConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            interval_seconds: config.revocation_sweep_interval,
            enabled: true,
        }
    }
}

/// Periodically drops revocation entries for expired tokens
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    config: SweeperConfig,
}

impl RevocationSweeper {
    /// Creates a new revocation sweeper.
    pub fn new(store: Arc<dyn RevocationStore>, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    /// Runs a single sweep.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of entries dropped
    /// * `Err(DomainError)` - The store could not be swept
    pub async fn run_sweep(&self) -> DomainResult<usize> {
        let removed = self.store.purge_expired(Utc::now()).await?;
        if removed > 0 {
            info!("dropped {} expired revocation entries", removed);
        }
        Ok(removed)
    }

    /// Starts the sweeper as a background task.
    ///
    /// This spawns a tokio task that sweeps at regular intervals.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("revocation sweeper is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "revocation sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!("revocation sweep failed: {}", e);
                }
            }
        });
    }
}
