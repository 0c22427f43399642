// Viewer session
//
// A session ties together exactly one frame producer (live connection or
// mock source), the history buffer it writes into, and the playback state
// the viewer reads. Dropping the session stops the producer, so no reconnect
// timer or open socket outlives it.

use crate::frame::Frame;
use crate::history::{HistoryBuffer, PlaybackState, DEFAULT_CAPACITY, MAX_CAPACITY};
use crate::mock::{self, MockSource};
use crate::net::{self, ConnectionManager, ConnectionStatus, LinkStats, Producer, WsConnector};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;

/// Invalid session configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("history capacity must be at least 1")]
    ZeroCapacity,

    #[error("history capacity {0} exceeds the maximum of {max}", max = MAX_CAPACITY)]
    CapacityTooLarge(usize),

    #[error("mock cadence must be greater than zero")]
    ZeroCadence,

    #[error("endpoint {0:?} must start with ws://")]
    InvalidEndpoint(String),
}

/// Everything a session needs to know up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Producer address
    pub endpoint: String,
    /// Frames kept for scrubbing
    pub capacity: usize,
    /// Use the synthetic source instead of the endpoint
    pub mock: bool,
    /// Mock frame interval
    pub mock_cadence: Duration,
    /// Simulated mock connection latency
    pub mock_startup_delay: Duration,
    /// Delay before reconnecting after a close or error
    pub reconnect_delay: Duration,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.capacity));
        }
        if self.mock && self.mock_cadence.is_zero() {
            return Err(ConfigError::ZeroCadence);
        }
        // No TLS support is built in, so wss:// could never connect
        if !self.mock && !self.endpoint.starts_with("ws://") {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: net::DEFAULT_ENDPOINT.to_string(),
            capacity: DEFAULT_CAPACITY,
            mock: false,
            mock_cadence: mock::DEFAULT_CADENCE,
            mock_startup_delay: mock::DEFAULT_STARTUP_DELAY,
            reconnect_delay: net::DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// One producer, one history, one playback state
pub struct Session {
    config: SessionConfig,
    history: HistoryBuffer,
    playback: PlaybackState,
    producer: Box<dyn Producer>,
}

impl Session {
    /// Build a session with the producer selected by `config.mock`
    ///
    /// Live connections run their socket I/O on `runtime`.
    pub fn new(config: SessionConfig, runtime: Handle) -> Self {
        let producer: Box<dyn Producer> = if config.mock {
            Box::new(MockSource::new(config.mock_cadence, config.mock_startup_delay))
        } else {
            Box::new(ConnectionManager::new(
                config.endpoint.clone(),
                config.reconnect_delay,
                Box::new(WsConnector::new(runtime)),
            ))
        };
        Self::with_producer(config, producer)
    }

    pub fn with_producer(config: SessionConfig, producer: Box<dyn Producer>) -> Self {
        Self {
            history: HistoryBuffer::new(config.capacity),
            playback: PlaybackState::new(),
            config,
            producer,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.producer.start(now);
    }

    /// Let the producer handle everything due at `now`
    ///
    /// Returns the number of frames appended. The playback projection
    /// reflects them as soon as this returns.
    pub fn poll(&mut self, now: Instant) -> usize {
        self.producer.poll(now, &mut self.history)
    }

    /// Stop the producer; safe to call repeatedly
    pub fn stop(&mut self) {
        self.producer.stop();
    }

    pub fn status(&self) -> ConnectionStatus {
        self.producer.status()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.producer.next_deadline()
    }

    pub fn stats(&self) -> LinkStats {
        self.producer.stats()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_mock(&self) -> bool {
        self.config.mock
    }

    #[allow(dead_code)]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[allow(dead_code)]
    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    /// Frame the viewer should display
    pub fn current_frame(&self) -> Option<&Frame> {
        self.playback.current_frame(&self.history)
    }

    pub fn display_index(&self) -> Option<usize> {
        self.playback.display_index(self.history.len())
    }

    pub fn frame_count(&self) -> usize {
        self.history.len()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn is_live(&self) -> bool {
        self.playback.is_live()
    }

    pub fn select_index(&mut self, index: usize) {
        self.playback.select_index(index, &self.history);
    }

    pub fn toggle_live(&mut self) {
        self.playback.toggle_live(&self.history);
    }

    pub fn go_live(&mut self) {
        self.playback.go_live(&self.history);
    }

    pub fn step_back(&mut self) {
        self.playback.step_back(&self.history);
    }

    pub fn step_forward(&mut self) {
        self.playback.step_forward(&self.history);
    }

    pub fn jump_to_oldest(&mut self) {
        self.playback.jump_to_oldest(&self.history);
    }

    pub fn jump_to_newest(&mut self) {
        self.playback.jump_to_newest(&self.history);
    }

    /// Discard buffered frames; the producer keeps running
    pub fn clear_history(&mut self) {
        tracing::info!(frames = self.history.len(), "Clearing frame history");
        self.history.clear();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.producer.stop();
    }
}
