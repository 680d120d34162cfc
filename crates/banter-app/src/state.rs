//! Observable application state types.
//!
//! The subset of client state necessary for rendering a chat view, without
//! exposing transport mechanics.

/// High-level channel state for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection attempt yet.
    Disconnected,
    /// Channel down; the transport is dialing or backing off.
    Connecting,
    /// Channel open.
    Connected,
}

/// Alert categories for failed data mutations.
///
/// Each maps to the generic user-facing alert text shown when that action's
/// collaborator request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Posting a new message (including its attachment uploads).
    SendMessage,
    /// Deleting a message.
    DeleteMessage,
    /// Creating a room.
    CreateRoom,
}

impl Mutation {
    /// The user-facing alert text for a failure of this mutation.
    pub fn alert_text(self) -> &'static str {
        match self {
            Self::SendMessage => "Failed to send message",
            Self::DeleteMessage => "Failed to delete message",
            Self::CreateRoom => "Failed to create room",
        }
    }
}
