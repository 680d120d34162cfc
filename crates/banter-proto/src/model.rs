//! Chat data model shared by the wire frames and the REST collaborator.
//!
//! Field names follow the backend's camelCase JSON convention. Everything the
//! backend may omit is optional; decoding must tolerate sparse objects so one
//! lean payload does not poison the whole frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned room identifier.
pub type RoomId = String;

/// Server-assigned message identifier.
pub type MessageId = String;

/// A chat room as listed by the REST collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Display name.
    pub name: String,
}

/// A single chat message.
///
/// Created locally (optimistic) on send and confirmed when the authoritative
/// copy arrives from the backend; the `id` is the reconciliation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier (assigned by the backend).
    pub id: MessageId,

    /// Author display name. `None` renders as anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Message text. `None` for attachment-only messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Ordered attachments, possibly empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Creation timestamp (UTC). `None` if the backend did not stamp it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An uploaded file referenced by a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Where the uploaded file is served from.
    pub url: String,

    /// Original file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type. The wire field is `type`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Body of a create-message request to the REST collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Message text.
    pub text: String,

    /// Attachments already uploaded via the attachments endpoint.
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Author display name.
    pub author: String,
}

/// The user object carried by typing frames.
///
/// The backend treats this as opaque; both fields may be absent for an
/// unidentified sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Stable user identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserRef {
    /// A user reference carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { id: None, name: Some(name.into()) }
    }
}
