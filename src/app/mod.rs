// Application state management
//
// This module contains the main AppState struct, which wraps the viewer
// session with the bits of state only the terminal UI needs.

pub mod config;
pub mod event;

pub use config::Cli;

use crate::session::Session;
use config::{MIN_POLL_WAIT, UI_TICK};
use std::time::{Duration, Instant};

/// How long a transient notice stays in the status bar
const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// The ingestion session being viewed
    pub session: Session,

    /// Short message shown in the status bar (e.g. "History cleared")
    notice: Option<(String, Instant)>,

    /// Time of the last frame arrival, for the "last frame" age display
    last_frame_at: Option<Instant>,
}

impl AppState {
    /// Wrap a session and start its producer
    pub fn new(mut session: Session) -> Self {
        session.start(Instant::now());
        Self {
            running: true,
            session,
            notice: None,
            last_frame_at: None,
        }
    }

    /// Drive the session; called once per loop iteration
    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    pub fn on_tick_at(&mut self, now: Instant) {
        if self.session.poll(now) > 0 {
            self.last_frame_at = Some(now);
        }
        if let Some((_, shown_at)) = &self.notice {
            if now.duration_since(*shown_at) >= NOTICE_DURATION {
                self.notice = None;
            }
        }
    }

    /// How long to wait for input before the next tick
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout_at(Instant::now())
    }

    fn poll_timeout_at(&self, now: Instant) -> Duration {
        match self.session.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .clamp(MIN_POLL_WAIT, UI_TICK),
            None => UI_TICK,
        }
    }

    /// Age of the newest received frame
    pub fn last_frame_age(&self) -> Option<Duration> {
        self.last_frame_at.map(|at| at.elapsed())
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn clear_history(&mut self) {
        self.session.clear_history();
        self.notice = Some(("History cleared".to_string(), Instant::now()));
    }

    /// Stop the producer and leave the run loop
    pub fn quit(&mut self) {
        self.session.stop();
        self.running = false;
    }
}

#[cfg(test)]
pub(crate) fn mock_app() -> AppState {
    use crate::mock::MockSource;
    use crate::session::SessionConfig;

    let config = SessionConfig {
        mock: true,
        ..SessionConfig::default()
    };
    let source = MockSource::new(config.mock_cadence, config.mock_startup_delay);
    AppState::new(Session::with_producer(config, Box::new(source)))
}
