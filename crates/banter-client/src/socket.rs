//! WebSocket transport for the real-time channel.
//!
//! Provides [`ChatSocket`], a handle to a background task that owns the
//! channel. The task dials the derived endpoint, drives the
//! [`Connection`](crate::connection::Connection) state machine (backoff,
//! keep-alive, send gating), and surfaces lifecycle and frame events over a
//! channel. Protocol logic stays in the Sans-IO machine; this is the thin
//! I/O layer around it.
//!
//! Teardown is explicit: [`ChatSocket::close`] (or dropping the handle)
//! stops the task at its next suspension point, cancelling any pending
//! reconnect sleep and closing the underlying stream on the way out.

use std::time::{Duration, Instant};

use banter_proto::{ClientFrame, Message, MessageId, RoomId, ServerFrame, UserRef};
use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    time::MissedTickBehavior,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};

use crate::{
    config::{ClientConfig, ConfigError},
    connection::{Connection, ConnectionAction},
    dispatch::parse_frame,
};

/// Cadence at which the transport feeds time to the state machine while the
/// channel is open. Keep-alives therefore fire on the first tick at or after
/// their due time.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the event channel towards the consumer.
const EVENT_BUFFER: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle and frame notifications surfaced to the consumer.
///
/// Transport failures never propagate as errors to application code; they
/// arrive here as `Error`/`Closed` notifications while the task reconnects
/// on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// The channel opened (initially or after a reconnect).
    Opened,

    /// The channel closed; a reconnect is pending.
    Closed,

    /// A transport error occurred. Side-channel only — the close that
    /// typically follows drives the lifecycle.
    Error {
        /// Human-readable description.
        message: String,
    },

    /// A classified inbound frame.
    Frame(ServerFrame),
}

/// How an open channel session ended.
enum SessionEnd {
    /// Consumer asked for teardown (or went away).
    Shutdown,
    /// The channel was lost; reconnect with backoff.
    Lost,
}

/// Handle to the real-time channel.
///
/// Commands are accepted at any time; frames submitted while the channel is
/// not open are dropped, not queued. Dropping the handle tears the task
/// down the same way [`ChatSocket::close`] does.
#[derive(Debug)]
pub struct ChatSocket {
    commands: mpsc::UnboundedSender<ClientFrame>,
    shutdown: oneshot::Sender<()>,
}

impl ChatSocket {
    /// Start the transport task and begin dialing.
    ///
    /// Returns the handle plus the event stream. Fails only if the
    /// configured base URL cannot be mapped to a channel endpoint.
    /// Must be called within a tokio runtime.
    pub fn connect(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::Receiver<SocketEvent>), ConfigError> {
        let url = config.ws_url()?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let connection = Connection::new(config.connection.clone());
        tokio::spawn(run(url.to_string(), connection, commands_rx, events_tx, shutdown_rx));

        Ok((Self { commands: commands_tx, shutdown: shutdown_tx }, events_rx))
    }

    /// Submit a frame for transmission.
    ///
    /// A no-op when the channel is not open or the task is gone.
    pub fn send(&self, frame: ClientFrame) {
        if self.commands.send(frame).is_err() {
            tracing::debug!("socket task gone, dropping frame");
        }
    }

    /// Announce a local typing-state change for a room.
    pub fn set_typing(&self, room_id: impl Into<RoomId>, is_typing: bool, user: UserRef) {
        self.send(ClientFrame::typing(room_id, is_typing, user));
    }

    /// Relay a created message to other clients.
    pub fn send_message(&self, room_id: impl Into<RoomId>, message: Message) {
        self.send(ClientFrame::message(room_id, message));
    }

    /// Relay a message deletion to other clients.
    pub fn delete_message(&self, room_id: impl Into<RoomId>, message_id: impl Into<MessageId>) {
        self.send(ClientFrame::delete(room_id, message_id));
    }

    /// Tear the channel down.
    ///
    /// The task closes the stream (when open), cancels any pending reconnect
    /// sleep, and exits.
    pub fn close(self) {
        let _ = self.shutdown.send(());
    }
}

/// Transport task: dial, run the open session, back off, redial.
async fn run(
    url: String,
    mut connection: Connection,
    mut commands: mpsc::UnboundedReceiver<ClientFrame>,
    events: mpsc::Sender<SocketEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        // Connecting: dial while draining (and dropping) submitted frames.
        let stream = 'dial: {
            let dial = connect_async(url.clone());
            tokio::pin!(dial);
            loop {
                tokio::select! {
                    _ = &mut shutdown => return,
                    result = &mut dial => break 'dial match result {
                        Ok((stream, _response)) => Some(stream),
                        Err(error) => {
                            tracing::warn!(%error, %url, "dial failed");
                            if emit(&events, SocketEvent::Error { message: error.to_string() })
                                .await
                                .is_err()
                            {
                                return;
                            }
                            None
                        },
                    },
                    command = commands.recv() => match command {
                        Some(frame) => {
                            let _ = connection.transmit(frame);
                        },
                        None => return,
                    },
                }
            }
        };

        if let Some(mut stream) = stream {
            connection.handle_open(Instant::now());
            tracing::info!(%url, "channel open");
            if emit(&events, SocketEvent::Opened).await.is_err() {
                return;
            }

            match run_session(&mut connection, &mut stream, &mut commands, &events, &mut shutdown)
                .await
            {
                SessionEnd::Shutdown => {
                    let _ = stream.close(None).await;
                    return;
                },
                SessionEnd::Lost => {},
            }
        }

        // Closed: schedule the reconnect, still draining submitted frames.
        connection.handle_close(Instant::now());
        tracing::info!(delay = ?connection.backoff_delay(), "channel closed, reconnect pending");
        if emit(&events, SocketEvent::Closed).await.is_err() {
            return;
        }

        let wait = connection.backoff_remaining(Instant::now()).unwrap_or(Duration::ZERO);
        let sleep = tokio::time::sleep(wait);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut shutdown => return,
                () = &mut sleep => break,
                command = commands.recv() => match command {
                    Some(frame) => {
                        let _ = connection.transmit(frame);
                    },
                    None => return,
                },
            }
        }

        let actions = connection.tick(Instant::now());
        debug_assert_eq!(actions, vec![ConnectionAction::Dial]);
    }
}

/// Drive one open channel session until it is lost or torn down.
async fn run_session(
    connection: &mut Connection,
    stream: &mut WsStream,
    commands: &mut mpsc::UnboundedReceiver<ClientFrame>,
    events: &mpsc::Sender<SocketEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    let mut ticks = tokio::time::interval(TICK_INTERVAL);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut *shutdown => return SessionEnd::Shutdown,

            command = commands.recv() => match command {
                Some(frame) => {
                    if let Some(ConnectionAction::Transmit(frame)) = connection.transmit(frame)
                        && let Err(end) = transmit(stream, &frame, events).await
                    {
                        return end;
                    }
                },
                None => return SessionEnd::Shutdown,
            },

            _ = ticks.tick() => {
                for action in connection.tick(Instant::now()) {
                    if let ConnectionAction::Transmit(frame) = action
                        && let Err(end) = transmit(stream, &frame, events).await
                    {
                        return end;
                    }
                }
            },

            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(frame) = parse_frame(text.as_str())
                        && emit(events, SocketEvent::Frame(frame)).await.is_err()
                    {
                        return SessionEnd::Shutdown;
                    }
                },
                Some(Ok(WsMessage::Close(_))) | None => return SessionEnd::Lost,
                Some(Ok(_)) => {}, // binary/ping/pong frames carry no chat events
                Some(Err(error)) => {
                    tracing::warn!(%error, "channel read failed");
                    if emit(events, SocketEvent::Error { message: error.to_string() })
                        .await
                        .is_err()
                    {
                        return SessionEnd::Shutdown;
                    }
                    return SessionEnd::Lost;
                },
            },
        }
    }
}

/// Encode and send one frame, reporting failures as events.
async fn transmit(
    stream: &mut WsStream,
    frame: &ClientFrame,
    events: &mpsc::Sender<SocketEvent>,
) -> Result<(), SessionEnd> {
    let text = match frame.encode() {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(%error, "dropping unencodable frame");
            return Ok(());
        },
    };

    if let Err(error) = stream.send(WsMessage::Text(text.into())).await {
        tracing::warn!(%error, "channel write failed");
        if emit(events, SocketEvent::Error { message: error.to_string() }).await.is_err() {
            return Err(SessionEnd::Shutdown);
        }
        return Err(SessionEnd::Lost);
    }
    Ok(())
}

/// Forward an event to the consumer; `Err` means the consumer went away.
async fn emit(events: &mpsc::Sender<SocketEvent>, event: SocketEvent) -> Result<(), ()> {
    events.send(event).await.map_err(|_| ())
}
