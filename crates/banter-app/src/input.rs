//! Runtime input events.
//!
//! [`InputEvent`] is what a [`crate::Driver`] yields from its poll loop:
//! channel notifications from the transport and user intents from whatever
//! front end is driving the runtime.

use banter_client::{AttachmentUpload, SocketEvent};
use banter_proto::{MessageId, RoomId};

/// One input for the runtime loop.
#[derive(Debug)]
pub enum InputEvent {
    /// A channel lifecycle or frame notification.
    Socket(SocketEvent),

    /// A user intent.
    Command(UserCommand),

    /// The composer input flipped between empty and non-empty.
    ///
    /// Drives the local typing indicator; the runtime debounces the
    /// trailing edge.
    TextChanged {
        /// Whether the input currently holds text.
        non_empty: bool,
    },

    /// Tear down and exit the runtime loop.
    Quit,
}

/// User intents a front end can issue.
#[derive(Debug, Clone)]
pub enum UserCommand {
    /// Post a message to the active room.
    SendMessage {
        /// Message text (trimmed by the state machine).
        text: String,
    },

    /// Delete a message from the active room.
    DeleteMessage {
        /// Message to delete.
        message_id: MessageId,
    },

    /// Create a room and switch to it.
    CreateRoom {
        /// Requested display name.
        name: String,
    },

    /// Switch to a known room.
    SelectRoom {
        /// Room to activate.
        room_id: RoomId,
    },

    /// Re-fetch the room list, preferring a room once it arrives.
    RefreshRooms {
        /// Room to select after the refresh, if still present.
        preferred: Option<RoomId>,
    },

    /// Change the local author display name.
    SetAuthor {
        /// New display name; blank falls back to anonymous.
        name: String,
    },

    /// Stage files for the next send.
    Attach {
        /// Files to upload with the next message.
        files: Vec<AttachmentUpload>,
    },
}
