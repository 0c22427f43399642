// Application configuration
//
// This module contains:
// - UI timing constants
// - Command-line / environment configuration (clap)
// - Conversion into the session configuration

use crate::history::DEFAULT_CAPACITY;
use crate::logging::{LogConfig, LogLevel};
use crate::net::DEFAULT_ENDPOINT;
use crate::session::{ConfigError, SessionConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// UI redraw / input poll interval
pub const UI_TICK: Duration = Duration::from_millis(100);

/// Shortest input wait when a producer timer is due before the next tick
pub const MIN_POLL_WAIT: Duration = Duration::from_millis(5);

/// Default mock cadence in milliseconds
pub const DEFAULT_CADENCE_MS: u64 = 500;

/// Default mock startup delay in milliseconds
pub const DEFAULT_STARTUP_MS: u64 = 500;

/// Default reconnect delay in milliseconds
pub const DEFAULT_RECONNECT_MS: u64 = 2000;

// ============================================================================
// Command line
// ============================================================================

/// Live viewer for model-input visualization frames
#[derive(Debug, Clone, Parser)]
#[command(name = "framewatch", version, about)]
pub struct Cli {
    /// WebSocket endpoint of the frame producer
    #[arg(long, env = "FRAMEWATCH_URL", default_value = DEFAULT_ENDPOINT)]
    pub url: String,

    /// Generate synthetic frames instead of connecting
    #[arg(long, env = "FRAMEWATCH_MOCK")]
    pub mock: bool,

    /// Number of frames kept for scrubbing
    #[arg(long, env = "FRAMEWATCH_HISTORY", default_value_t = DEFAULT_CAPACITY)]
    pub history: usize,

    /// Interval between mock frames in milliseconds
    #[arg(long, default_value_t = DEFAULT_CADENCE_MS)]
    pub cadence_ms: u64,

    /// Simulated mock connection delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_STARTUP_MS)]
    pub startup_ms: u64,

    /// Delay before reconnecting after a disconnect in milliseconds
    #[arg(long, default_value_t = DEFAULT_RECONNECT_MS)]
    pub reconnect_ms: u64,

    /// Log verbosity (only used with --log-file)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Write logs to this file
    #[arg(long, env = "FRAMEWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Validated session configuration
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let config = SessionConfig {
            endpoint: self.url.clone(),
            capacity: self.history,
            mock: self.mock,
            mock_cadence: Duration::from_millis(self.cadence_ms),
            mock_startup_delay: Duration::from_millis(self.startup_ms),
            reconnect_delay: Duration::from_millis(self.reconnect_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            file: self.log_file.clone(),
        }
    }
}
