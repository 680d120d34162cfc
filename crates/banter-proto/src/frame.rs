//! Frame types for the real-time channel.
//!
//! One frame is one JSON object, discriminated by its `type` field. The
//! outbound and inbound unions mirror each other, with one asymmetry: an
//! inbound message event carries the message under `payload`, while the
//! outbound command carries it under `message`.
//!
//! # Invariants
//!
//! - Each variant maps to exactly one `type` tag; adding a variant without a
//!   tag is a compile error via the serde derive.
//! - Encoding a [`ClientFrame`] always yields a single-line JSON object.
//!   Frames carry no field validation; payload well-formedness is the
//!   caller's responsibility.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Message, MessageId, RoomId, UserRef};

/// Errors produced while encoding frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON serialization failed.
    #[error("frame encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Commands this client sends over the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    /// Keep-alive signal. Carries no payload.
    Ping,

    /// Local typing-state change for a room.
    Typing {
        /// Room the indicator applies to.
        room_id: RoomId,
        /// Whether the local user is currently typing.
        is_typing: bool,
        /// Who is typing.
        user: UserRef,
    },

    /// Relay a freshly created message to other clients.
    Message {
        /// Room the message belongs to.
        room_id: RoomId,
        /// The message as confirmed by the REST collaborator.
        message: Message,
    },

    /// Relay a message deletion to other clients.
    Delete {
        /// Room the message belonged to.
        room_id: RoomId,
        /// Identifier of the deleted message.
        message_id: MessageId,
    },
}

impl ClientFrame {
    /// Typing-state command.
    pub fn typing(room_id: impl Into<RoomId>, is_typing: bool, user: UserRef) -> Self {
        Self::Typing { room_id: room_id.into(), is_typing, user }
    }

    /// Message relay command.
    pub fn message(room_id: impl Into<RoomId>, message: Message) -> Self {
        Self::Message { room_id: room_id.into(), message }
    }

    /// Deletion relay command.
    pub fn delete(room_id: impl Into<RoomId>, message_id: impl Into<MessageId>) -> Self {
        Self::Delete { room_id: room_id.into(), message_id: message_id.into() }
    }

    /// Encode this frame as its JSON wire text.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events the backend pushes over the real-time channel.
///
/// Unknown `type` tags and malformed bodies are not representable here; the
/// dispatcher in `banter-client` filters them out before decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// A message was posted to a room.
    Message {
        /// Room the message belongs to.
        room_id: RoomId,
        /// The authoritative message copy.
        payload: Message,
    },

    /// A message was deleted from a room.
    Delete {
        /// Room the message belonged to.
        room_id: RoomId,
        /// Identifier of the deleted message.
        message_id: MessageId,
    },

    /// Someone's typing state changed in a room.
    Typing {
        /// Room the indicator applies to.
        room_id: RoomId,
        /// Whether that user is currently typing.
        is_typing: bool,
        /// Who is typing. Absent when the relay strips it.
        #[serde(default)]
        user: Option<UserRef>,
    },
}

impl ServerFrame {
    /// Room this event applies to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::Message { room_id, .. }
            | Self::Delete { room_id, .. }
            | Self::Typing { room_id, .. } => room_id,
        }
    }
}
