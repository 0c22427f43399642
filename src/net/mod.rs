// Live frame ingestion
//
// The connection manager keeps one WebSocket link to the frame producer
// alive for as long as it runs: it decodes inbound messages into the
// history, and after every close or error it waits a fixed delay and
// connects again. It is a plain state machine driven by `poll`; the only
// timer is the single pending reconnect deadline.

pub mod transport;

pub use transport::{Transport, TransportError, TransportEvent, TransportLink, WsConnector};

use crate::frame;
use crate::history::FrameSink;
use std::fmt;
use std::time::{Duration, Instant};

/// Default producer endpoint
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";

/// Default delay between a disconnect and the next attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Connection state as shown to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A source of frames owned by a session
///
/// Implementations are driven entirely by `poll`: they never block and never
/// spawn timers of their own, so `stop` can cancel everything they own.
pub trait Producer {
    /// Begin producing; restarts a stopped producer
    fn start(&mut self, now: Instant);

    /// Process everything due at `now`, pushing decoded frames into `sink`
    ///
    /// Returns the number of frames pushed.
    fn poll(&mut self, now: Instant, sink: &mut dyn FrameSink) -> usize;

    /// Cancel the pending timer and release the transport; idempotent
    fn stop(&mut self);

    fn status(&self) -> ConnectionStatus;

    /// When the pending timer fires, if one is armed
    fn next_deadline(&self) -> Option<Instant>;

    fn stats(&self) -> LinkStats;
}

/// Ingestion counters shown in the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Connection attempts started, including the first
    pub attempts: u64,
    /// Frames decoded and delivered
    pub frames: u64,
    /// Messages dropped because they failed to decode
    pub decode_failures: u64,
}

/// Reconnecting WebSocket frame source
pub struct ConnectionManager {
    endpoint: String,
    reconnect_delay: Duration,
    transport: Box<dyn Transport>,
    status: ConnectionStatus,
    link: Option<Box<dyn TransportLink>>,
    reconnect_at: Option<Instant>,
    stopped: bool,
    stats: LinkStats,
}

impl ConnectionManager {
    pub fn new(
        endpoint: impl Into<String>,
        reconnect_delay: Duration,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_delay,
            transport,
            status: ConnectionStatus::Connecting,
            link: None,
            reconnect_at: None,
            stopped: false,
            stats: LinkStats::default(),
        }
    }

    #[allow(dead_code)]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn connect(&mut self) {
        self.status = ConnectionStatus::Connecting;
        self.stats.attempts += 1;
        tracing::info!(endpoint = %self.endpoint, attempt = self.stats.attempts, "Connecting to frame source");
        self.link = Some(self.transport.open(&self.endpoint));
    }

    fn release_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        self.reconnect_at = Some(now + self.reconnect_delay);
        tracing::debug!(
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "Reconnect scheduled"
        );
    }

    fn handle_event(&mut self, event: TransportEvent, now: Instant, sink: &mut dyn FrameSink) -> usize {
        match event {
            TransportEvent::Opened => {
                tracing::info!(endpoint = %self.endpoint, "Connected to frame source");
                self.status = ConnectionStatus::Connected;
                0
            }
            TransportEvent::Message(raw) => match frame::decode(&raw) {
                Ok(frame) => {
                    self.stats.frames += 1;
                    sink.push(frame);
                    1
                }
                Err(e) => {
                    self.stats.decode_failures += 1;
                    tracing::warn!(error = %e, bytes = raw.len(), "Dropping undecodable message");
                    0
                }
            },
            TransportEvent::Error(e) => {
                tracing::warn!(error = %e, endpoint = %self.endpoint, "Transport error");
                self.status = ConnectionStatus::Error;
                self.release_link();
                self.schedule_reconnect(now);
                0
            }
            TransportEvent::Closed => {
                tracing::info!(endpoint = %self.endpoint, "Disconnected from frame source");
                self.status = ConnectionStatus::Disconnected;
                self.release_link();
                self.schedule_reconnect(now);
                0
            }
        }
    }
}

impl Producer for ConnectionManager {
    fn start(&mut self, _now: Instant) {
        if self.link.is_some() {
            return;
        }
        self.stopped = false;
        self.reconnect_at = None;
        self.connect();
    }

    fn poll(&mut self, now: Instant, sink: &mut dyn FrameSink) -> usize {
        if self.stopped {
            return 0;
        }

        let mut pushed = 0;
        while let Some(event) = self.link.as_mut().and_then(|link| link.try_next()) {
            pushed += self.handle_event(event, now, sink);
        }

        if let Some(deadline) = self.reconnect_at {
            if now >= deadline {
                self.reconnect_at = None;
                tracing::debug!("Reconnect timer elapsed");
                self.connect();
            }
        }

        pushed
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.reconnect_at = None;
        self.release_link();
        tracing::info!(endpoint = %self.endpoint, "Connection manager stopped");
    }

    fn status(&self) -> ConnectionStatus {
        self.status
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    fn stats(&self) -> LinkStats {
        self.stats
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;
    use crate::frame::Frame;

    const DELAY: Duration = Duration::from_millis(2000);
    const GOOD: &str = r#"{"timestamp": 1, "metadata": {"step": 1}}"#;

    fn manager() -> (ConnectionManager, FakeTransport) {
        let transport = FakeTransport::default();
        let manager = ConnectionManager::new(DEFAULT_ENDPOINT, DELAY, Box::new(transport.clone()));
        (manager, transport)
    }

    fn frame_json(timestamp: i64) -> String {
        format!(r#"{{"timestamp": {}, "metadata": {{}}}}"#, timestamp)
    }

    #[test]
    fn test_status_cycle_with_reconnect() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let t0 = Instant::now();

        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        manager.start(t0);
        assert_eq!(net.opened(), 1);
        assert_eq!(net.endpoint(0), DEFAULT_ENDPOINT);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);

        net.deliver(TransportEvent::Opened);
        manager.poll(t0, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Connected);

        net.deliver(TransportEvent::Closed);
        manager.poll(t0, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(manager.next_deadline(), Some(t0 + DELAY));
        assert_eq!(net.close_calls(0), 1);

        // Not yet due
        manager.poll(t0 + DELAY - Duration::from_millis(1), &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(net.opened(), 1);

        manager.poll(t0 + DELAY, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        assert_eq!(net.opened(), 2);
        assert_eq!(manager.next_deadline(), None);
        assert_eq!(manager.stats().attempts, 2);

        net.deliver(TransportEvent::Opened);
        manager.poll(t0 + DELAY, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_messages_are_appended_in_arrival_order() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let now = Instant::now();
        manager.start(now);

        net.deliver(TransportEvent::Opened);
        for ts in [3, 1, 2] {
            net.deliver(TransportEvent::Message(frame_json(ts)));
        }
        assert_eq!(manager.poll(now, &mut sink), 3);

        let order: Vec<i64> = sink.iter().map(|f| f.timestamp).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(manager.stats().frames, 3);
    }

    #[test]
    fn test_bad_message_is_skipped_without_state_change() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let now = Instant::now();
        manager.start(now);

        net.deliver(TransportEvent::Opened);
        net.deliver(TransportEvent::Message(GOOD.to_string()));
        manager.poll(now, &mut sink);
        assert_eq!(sink.len(), 1);

        net.deliver(TransportEvent::Message("{garbage".to_string()));
        net.deliver(TransportEvent::Message(r#"{"timestamp": "x"}"#.to_string()));
        assert_eq!(manager.poll(now, &mut sink), 0);
        assert_eq!(sink.len(), 1);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
        assert_eq!(manager.stats().decode_failures, 2);
        assert_eq!(manager.next_deadline(), None);

        // Same link keeps delivering afterwards
        net.deliver(TransportEvent::Message(GOOD.to_string()));
        assert_eq!(manager.poll(now, &mut sink), 1);
        assert_eq!(net.opened(), 1);
    }

    #[test]
    fn test_transport_error_reconnects_after_delay() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let t0 = Instant::now();
        manager.start(t0);

        net.deliver(TransportEvent::Error(TransportError::TaskEnded));
        manager.poll(t0, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Error);
        assert_eq!(net.close_calls(0), 1);
        assert_eq!(manager.next_deadline(), Some(t0 + DELAY));

        manager.poll(t0 + DELAY, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        assert_eq!(net.opened(), 2);
    }

    #[test]
    fn test_error_while_connected() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let t0 = Instant::now();
        manager.start(t0);

        net.deliver(TransportEvent::Opened);
        net.deliver(TransportEvent::Message(GOOD.to_string()));
        net.deliver(TransportEvent::Error(TransportError::TaskEnded));
        // Anything after the error belongs to a discarded link
        net.deliver(TransportEvent::Message(GOOD.to_string()));
        assert_eq!(manager.poll(t0, &mut sink), 1);
        assert_eq!(manager.status(), ConnectionStatus::Error);
    }

    #[test]
    fn test_fixed_delay_never_gives_up() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let mut now = Instant::now();
        manager.start(now);

        for attempt in 1..=10 {
            net.deliver(TransportEvent::Error(TransportError::TaskEnded));
            net.deliver(TransportEvent::Closed);
            manager.poll(now, &mut sink);
            assert_eq!(manager.next_deadline(), Some(now + DELAY));
            now += DELAY;
            manager.poll(now, &mut sink);
            assert_eq!(net.opened(), attempt + 1);
        }
    }

    #[test]
    fn test_start_is_noop_while_link_open() {
        let (mut manager, net) = manager();
        let now = Instant::now();
        manager.start(now);
        manager.start(now);
        assert_eq!(net.opened(), 1);
    }

    #[test]
    fn test_stop_twice_and_no_frames_after_stop() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let now = Instant::now();
        manager.start(now);
        net.deliver(TransportEvent::Opened);
        manager.poll(now, &mut sink);

        manager.stop();
        assert!(manager.is_stopped());
        assert_eq!(net.close_calls(0), 1);

        manager.stop();
        assert_eq!(net.close_calls(0), 1);

        net.deliver(TransportEvent::Message(GOOD.to_string()));
        assert_eq!(manager.poll(now + DELAY * 3, &mut sink), 0);
        assert!(sink.is_empty());
        assert_eq!(manager.status(), ConnectionStatus::Connected);
        assert_eq!(net.opened(), 1);
    }

    #[test]
    fn test_stop_cancels_pending_reconnect() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let t0 = Instant::now();
        manager.start(t0);

        net.deliver(TransportEvent::Closed);
        manager.poll(t0, &mut sink);
        assert!(manager.next_deadline().is_some());

        manager.stop();
        assert_eq!(manager.next_deadline(), None);
        manager.poll(t0 + DELAY * 2, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(net.opened(), 1);
    }

    #[test]
    fn test_stop_before_start_is_safe() {
        let (mut manager, net) = manager();
        manager.stop();
        manager.stop();
        assert_eq!(net.opened(), 0);
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut manager, net) = manager();
        let mut sink: Vec<Frame> = Vec::new();
        let now = Instant::now();
        manager.start(now);
        manager.stop();

        manager.start(now);
        assert!(!manager.is_stopped());
        assert_eq!(net.opened(), 2);
        net.deliver(TransportEvent::Opened);
        manager.poll(now, &mut sink);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_drop_closes_link() {
        let (mut manager, net) = manager();
        manager.start(Instant::now());
        drop(manager);
        assert_eq!(net.close_calls(0), 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Connecting);
        assert_eq!(ConnectionStatus::Connected.to_string(), "Connected");
        assert_eq!(ConnectionStatus::Error.label(), "Error");
    }
}
