//! Real-time channel client and REST collaborator client.
//!
//! # Architecture
//!
//! The connection lifecycle follows the Sans-IO and action-based patterns:
//! [`Connection`] is a pure state machine (backoff, keep-alive, send gating)
//! that takes time as input and returns actions; [`ChatSocket`] is the thin
//! tokio/WebSocket layer that executes them and surfaces [`SocketEvent`]s.
//!
//! Inbound classification lives in [`parse_frame`]: malformed frames are
//! discarded with a warning, unknown types silently, and processing always
//! continues with the next frame.
//!
//! [`ApiClient`] covers the REST surface of the same backend (rooms,
//! messages, attachment uploads) with credentials included.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod config;
mod connection;
mod dispatch;
mod socket;

pub use api::{ApiClient, ApiError, AttachmentUpload};
pub use config::{ClientConfig, ConfigError};
pub use connection::{
    Connection, ConnectionAction, ConnectionConfig, ConnectionState,
    DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_RECONNECT_CEILING, DEFAULT_RECONNECT_FLOOR,
};
pub use dispatch::parse_frame;
pub use socket::{ChatSocket, SocketEvent};
