// WebSocket transport
//
// Bridges the async tokio-tungstenite client to the poll-driven connection
// manager. Each link runs as one spawned task that forwards events over an
// unbounded channel; the manager drains them on its own schedule with
// `try_next` and never blocks.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};

/// Transport-level failure reported on a link
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("websocket stream error: {0}")]
    Stream(#[from] tungstenite::Error),

    #[error("binary message is not valid UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("transport task ended unexpectedly")]
    TaskEnded,
}

/// Event observed on a transport link, in arrival order
#[derive(Debug)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// One inbound text payload
    Message(String),
    /// Link failed; the link is unusable afterwards
    Error(TransportError),
    /// Peer closed or the stream ended
    Closed,
}

/// Opens links to an endpoint
pub trait Transport {
    fn open(&mut self, endpoint: &str) -> Box<dyn TransportLink>;
}

/// One connection attempt and, if it succeeds, the live connection
pub trait TransportLink {
    /// Next pending event, if any has arrived
    fn try_next(&mut self) -> Option<TransportEvent>;

    /// Close the connection; safe to call more than once
    fn close(&mut self);
}

/// Transport backed by tokio-tungstenite on a shared runtime
#[derive(Debug, Clone)]
pub struct WsConnector {
    runtime: Handle,
}

impl WsConnector {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Transport for WsConnector {
    fn open(&mut self, endpoint: &str) -> Box<dyn TransportLink> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.runtime
            .spawn(run_link(endpoint.to_string(), events_tx, shutdown_rx));
        Box::new(WsLink {
            events: events_rx,
            shutdown: Some(shutdown_tx),
            finished: false,
        })
    }
}

/// Handle to a spawned link task
///
/// Dropping the handle drops the shutdown sender, which also ends the task.
#[derive(Debug)]
pub struct WsLink {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    finished: bool,
}

impl TransportLink for WsLink {
    fn try_next(&mut self) -> Option<TransportEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => {
                if matches!(event, TransportEvent::Closed) {
                    self.finished = true;
                }
                Some(event)
            }
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Task went away without reporting a close
                self.finished = true;
                if self.shutdown.is_some() {
                    Some(TransportEvent::Error(TransportError::TaskEnded))
                } else {
                    None
                }
            }
        }
    }

    fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run_link(
    endpoint: String,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let connected = tokio::select! {
        result = connect_async(endpoint.as_str()) => result,
        _ = &mut shutdown => return,
    };

    let mut stream = match connected {
        Ok((stream, _response)) => stream,
        Err(source) => {
            let _ = events.send(TransportEvent::Error(TransportError::Connect {
                endpoint,
                source,
            }));
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };

    let _ = events.send(TransportEvent::Opened);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let _ = stream.close(None).await;
                return;
            }
            next = stream.next() => {
                let event = match next {
                    Some(Ok(Message::Text(text))) => TransportEvent::Message(text),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => TransportEvent::Message(text),
                        Err(err) => {
                            let err = TransportError::from(err);
                            tracing::warn!(error = %err, "Dropping binary message");
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        let _ = events.send(TransportEvent::Closed);
                        return;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        let _ = events.send(TransportEvent::Error(err.into()));
                        let _ = events.send(TransportEvent::Closed);
                        return;
                    }
                };
                if events.send(event).is_err() {
                    // Receiver dropped, nobody is listening anymore
                    let _ = stream.close(None).await;
                    return;
                }
            }
        }
    }
}
