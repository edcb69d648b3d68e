//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Environment variable overriding the database path.
pub const DATABASE_PATH_ENV: &str = "MEDIGIVE_DATABASE_PATH";

/// Tunables for the engine and its drivers. Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
    /// Donor identity stamped on new donations
    pub donor_id: String,
    /// Passive progression period
    pub passive_period_ms: u64,
    /// Span of the live-tracking simulation
    pub fast_track_duration_ms: u64,
    /// Progress frame interval during live tracking
    pub fast_track_frame_ms: u64,
    /// Pause between the end of the animation and the delivery commit
    pub fast_track_settle_ms: u64,
    /// How long a notification stays visible
    pub notification_ttl_ms: u64,
    /// Reject donations submitted without a pickup address
    pub require_pickup_address: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            donor_id: "user_1".into(),
            passive_period_ms: 15_000,
            fast_track_duration_ms: 8_000,
            fast_track_frame_ms: 50,
            fast_track_settle_ms: 500,
            notification_ttl_ms: 5_000,
            require_pickup_address: false,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `MEDIGIVE_DATABASE_PATH` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
            if !path.is_empty() {
                self.database_path = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Reject configurations the drivers cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.donor_id.trim().is_empty() {
            return Err(CoreError::Config("donor_id must not be empty".into()));
        }
        for (name, value) in [
            ("passive_period_ms", self.passive_period_ms),
            ("fast_track_duration_ms", self.fast_track_duration_ms),
            ("fast_track_frame_ms", self.fast_track_frame_ms),
            ("notification_ttl_ms", self.notification_ttl_ms),
        ] {
            if value == 0 {
                return Err(CoreError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    pub fn passive_period(&self) -> Duration {
        Duration::from_millis(self.passive_period_ms)
    }

    pub fn fast_track_duration(&self) -> Duration {
        Duration::from_millis(self.fast_track_duration_ms)
    }

    pub fn fast_track_frame(&self) -> Duration {
        Duration::from_millis(self.fast_track_frame_ms)
    }

    pub fn fast_track_settle(&self) -> Duration {
        Duration::from_millis(self.fast_track_settle_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}
