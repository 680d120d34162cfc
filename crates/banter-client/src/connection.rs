//! Connection lifecycle state machine.
//!
//! Manages the reconnect loop and keep-alive schedule for the real-time
//! channel. Uses the action pattern: methods take time as input and return
//! actions for the transport driver to execute. This keeps the state machine
//! pure (no I/O) and makes the backoff behavior testable with synthetic
//! instants.
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐   open    ┌──────┐   close   ┌─────────────────────┐
//! │ Connecting │──────────>│ Open │──────────>│ Closed              │
//! └────────────┘           └──────┘           │ (reconnect pending) │
//!       ▲                                     └─────────────────────┘
//!       │              backoff elapsed                  │
//!       └───────────────────────────────────────────────┘
//! ```
//!
//! There is no terminal state: reconnection is unbounded. Teardown happens at
//! the transport layer, which simply stops driving the machine.
//!
//! Transport errors are a side channel (surfaced as events by the driver);
//! they do not transition the machine. The close that follows an error does.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use banter_proto::ClientFrame;

/// Initial (and floor) delay before a reconnect attempt.
pub const DEFAULT_RECONNECT_FLOOR: Duration = Duration::from_millis(1000);

/// Ceiling for the reconnect delay.
pub const DEFAULT_RECONNECT_CEILING: Duration = Duration::from_millis(10_000);

/// Interval between keep-alive pings while the channel is open.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_millis(25_000);

/// Actions returned by the connection state machine.
///
/// The transport driver executes these:
/// - `Dial`: open a fresh channel to the configured endpoint
/// - `Transmit`: encode and send the frame on the open channel
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a fresh channel to the endpoint.
    Dial,

    /// Send this frame on the open channel.
    Transmit(ClientFrame),
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Dial in flight, waiting for the channel to open.
    Connecting,
    /// Channel open; frames flow and keep-alives are due periodically.
    Open,
    /// Channel lost; a reconnect is pending after the current backoff delay.
    Closed,
}

/// Connection timing configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Floor (and initial) reconnect delay.
    pub reconnect_floor: Duration,
    /// Ceiling for the doubled reconnect delay.
    pub reconnect_ceiling: Duration,
    /// Keep-alive ping interval while open.
    pub keepalive_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            reconnect_floor: DEFAULT_RECONNECT_FLOOR,
            reconnect_ceiling: DEFAULT_RECONNECT_CEILING,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
        }
    }
}

/// Reconnect/keep-alive state machine for one client session.
///
/// This is a pure state machine: no I/O, no timers. Time is passed as a
/// parameter to the methods that need it, and the machine is generic over the
/// `Instant` type so tests can drive it with synthetic clocks.
///
/// # Invariants
///
/// - After the Nth consecutive close the scheduled delay is
///   `min(floor * 2^(N-1), ceiling)`.
/// - A successful open resets the delay to the floor.
/// - [`Connection::transmit`] yields an action only while `Open`; otherwise
///   the frame is dropped — no queuing, no error.
#[derive(Debug, Clone)]
pub struct Connection<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Current lifecycle state.
    state: ConnectionState,
    /// Timing configuration.
    config: ConnectionConfig,
    /// Delay the next closure will schedule.
    next_delay: Duration,
    /// Delay scheduled for the pending reconnect (valid while `Closed`).
    pending_delay: Duration,
    /// When the channel closed (valid while `Closed`).
    closed_at: Option<I>,
    /// When the last keep-alive was sent, or the open instant.
    last_keepalive: Option<I>,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a machine in [`ConnectionState::Connecting`] — the caller is
    /// expected to have a dial in flight already.
    pub fn new(config: ConnectionConfig) -> Self {
        let next_delay = config.reconnect_floor;
        Self {
            state: ConnectionState::Connecting,
            config,
            next_delay,
            pending_delay: next_delay,
            closed_at: None,
            last_keepalive: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether frames can currently be transmitted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Delay scheduled for the pending reconnect. `None` unless `Closed`.
    #[must_use]
    pub fn backoff_delay(&self) -> Option<Duration> {
        (self.state == ConnectionState::Closed).then_some(self.pending_delay)
    }

    /// Delay a future closure would schedule.
    #[must_use]
    pub fn next_backoff(&self) -> Duration {
        self.next_delay
    }

    /// Time left until the pending reconnect is due. `None` unless `Closed`.
    #[must_use]
    pub fn backoff_remaining(&self, now: I) -> Option<Duration> {
        let closed_at = self.closed_at?;
        if self.state != ConnectionState::Closed {
            return None;
        }
        let elapsed = if now > closed_at { now - closed_at } else { Duration::ZERO };
        Some(self.pending_delay.saturating_sub(elapsed))
    }

    /// The channel opened: reset backoff to the floor and start the
    /// keep-alive schedule (first ping due one full interval from now).
    pub fn handle_open(&mut self, now: I) {
        self.state = ConnectionState::Open;
        self.next_delay = self.config.reconnect_floor;
        self.closed_at = None;
        self.last_keepalive = Some(now);
    }

    /// The channel closed: clear the keep-alive schedule, note when the
    /// closure happened, and double the delay (capped) for the *next* one.
    ///
    /// Idempotent — a repeated close while already `Closed` does not double
    /// the delay again.
    pub fn handle_close(&mut self, now: I) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        self.closed_at = Some(now);
        self.last_keepalive = None;
        self.pending_delay = self.next_delay;
        self.next_delay =
            self.next_delay.saturating_mul(2).min(self.config.reconnect_ceiling);
    }

    /// Gate an outbound frame on the channel being open.
    ///
    /// Returns the transmit action while `Open`; otherwise the frame is
    /// dropped and `None` is returned. No queuing, no error — sends while
    /// disconnected are deliberately lost.
    pub fn transmit(&self, frame: ClientFrame) -> Option<ConnectionAction> {
        if self.state == ConnectionState::Open {
            Some(ConnectionAction::Transmit(frame))
        } else {
            tracing::debug!(state = ?self.state, "dropping frame, channel not open");
            None
        }
    }

    /// Process periodic maintenance (keep-alives and reconnects).
    ///
    /// While `Open`, emits a keep-alive ping once per interval. While
    /// `Closed`, emits [`ConnectionAction::Dial`] once the backoff delay has
    /// elapsed and transitions back to `Connecting`.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Open => {
                let due = match self.last_keepalive {
                    None => true,
                    Some(last) => now - last >= self.config.keepalive_interval,
                };
                if due {
                    self.last_keepalive = Some(now);
                    vec![ConnectionAction::Transmit(ClientFrame::Ping)]
                } else {
                    vec![]
                }
            },
            ConnectionState::Closed => {
                let elapsed = match self.closed_at {
                    Some(closed_at) if now > closed_at => now - closed_at,
                    _ => Duration::ZERO,
                };
                if elapsed >= self.pending_delay {
                    self.state = ConnectionState::Connecting;
                    self.closed_at = None;
                    vec![ConnectionAction::Dial]
                } else {
                    vec![]
                }
            },
            ConnectionState::Connecting => vec![],
        }
    }
}
