//! Farm-mode timing parameters
//!
//! All tunables for the liveness supervisor, handshake and heartbeat.
//! Defaults match what the monitoring host expects; a validated override
//! can be stored as a postcard blob under [`storage_keys::CONFIG`].

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::error::ConfigError;

/// Keys in the persistent store.
pub mod storage_keys {
    /// Farm mode active bit (0 / 1; 0xFF on erased storage).
    pub const FARM_MODE: &str = "farm_mode";
    /// Fan-safety check enable.
    pub const FAN_CHECK: &str = "fan_check";
    /// Silent-mode preference.
    pub const SILENT_MODE: &str = "silent_mode";
    /// Serialized [`FarmConfig`](super::FarmConfig).
    pub const CONFIG: &str = "farm_cfg";
}

/// Silent-mode byte value meaning "off".
pub const SILENT_MODE_OFF: u8 = 0;

/// Value of an erased EEPROM / never-written NVS byte.
pub const ERASED_BYTE: u8 = 0xFF;

const MAX_BLOB_SIZE: usize = 64;

/// Farm-mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    // --- Liveness ---
    /// Host silence tolerated while the command queue is empty (seconds).
    pub ping_timeout_secs: u32,
    /// Host silence tolerated while commands are queued (seconds).
    /// Long moves can delay processing of a queued ping.
    pub ping_timeout_busy_secs: u32,

    // --- Handshake ---
    /// Pending status re-announce period (seconds).
    pub reannounce_interval_secs: u32,
    /// Continuous button hold that overrides the handshake (seconds).
    pub long_press_secs: u32,
    /// Fallback prompt loop period (milliseconds).
    pub prompt_step_ms: u32,
    /// Prompt steps between re-announcements while blocked.
    pub prompt_reannounce_steps: u16,

    // --- Heartbeat ---
    /// Status ticks per heartbeat cycle.
    pub heartbeat_period_ticks: u8,
    /// Countdown value at boot.
    pub heartbeat_initial_ticks: u8,
    /// Countdown value at which temperatures are pushed.
    pub temperature_slot: u8,
    /// Countdown value at which print progress is echoed.
    pub progress_slot: u8,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            // Liveness
            ping_timeout_secs: 60,
            ping_timeout_busy_secs: 600, // 10 min

            // Handshake
            reannounce_interval_secs: 10,
            long_press_secs: 15,
            prompt_step_ms: 100,
            prompt_reannounce_steps: 10, // once per second

            // Heartbeat
            heartbeat_period_ticks: 10,
            heartbeat_initial_ticks: 8,
            temperature_slot: 8,
            progress_slot: 5,
        }
    }
}

impl FarmConfig {
    /// Prompt steps making up one long press.
    pub fn long_press_steps(&self) -> u32 {
        let ms = u64::from(self.long_press_secs) * 1000;
        u32::try_from(ms / u64::from(self.prompt_step_ms.max(1))).unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ping_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("ping_timeout_secs must be > 0"));
        }
        if self.ping_timeout_busy_secs < self.ping_timeout_secs {
            return Err(ConfigError::ValidationFailed(
                "ping_timeout_busy_secs must be >= ping_timeout_secs",
            ));
        }
        if self.reannounce_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "reannounce_interval_secs must be > 0",
            ));
        }
        if self.prompt_step_ms == 0 || self.prompt_step_ms > 1000 {
            return Err(ConfigError::ValidationFailed("prompt_step_ms must be 1–1000"));
        }
        let Some(long_press_ms) = self.long_press_secs.checked_mul(1000) else {
            return Err(ConfigError::ValidationFailed("long_press_secs out of range"));
        };
        if self.long_press_secs == 0 || long_press_ms % self.prompt_step_ms != 0 {
            return Err(ConfigError::ValidationFailed(
                "long_press_secs must be a non-zero whole number of prompt steps",
            ));
        }
        if self.prompt_reannounce_steps == 0 {
            return Err(ConfigError::ValidationFailed(
                "prompt_reannounce_steps must be > 0",
            ));
        }
        if self.heartbeat_period_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_period_ticks must be > 0",
            ));
        }
        let period = self.heartbeat_period_ticks;
        if self.heartbeat_initial_ticks > period
            || self.temperature_slot > period
            || self.progress_slot > period
        {
            return Err(ConfigError::ValidationFailed(
                "heartbeat slots must lie within the period",
            ));
        }
        Ok(())
    }

    /// Load the stored config.
    pub fn load(store: &impl StoragePort) -> Result<Self, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = store.read(storage_keys::CONFIG, &mut buf)?;
        let cfg: Self = postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the stored config, falling back to defaults on any failure.
    pub fn load_or_default(store: &impl StoragePort) -> Self {
        match Self::load(store) {
            Ok(cfg) => {
                info!("Farm config loaded from storage");
                cfg
            }
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => {
                warn!("Farm config load failed ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Validate and persist.
    pub fn save(&self, store: &mut impl StoragePort) -> Result<(), ConfigError> {
        self.validate()?;
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let bytes = postcard::to_slice(self, &mut buf).map_err(|_| ConfigError::Corrupted)?;
        store.write(storage_keys::CONFIG, bytes)?;
        Ok(())
    }
}
