//! Application side-effects and intents.
//!
//! [`AppAction`] instructions are produced by the [`crate::App`] state
//! machine for the runtime to execute. Collaborator requests carry the
//! staleness generation that must be echoed back with their result events.

use banter_client::AttachmentUpload;
use banter_proto::{ClientFrame, MessageDraft, MessageId, RoomId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the current state.
    Render,

    /// Fetch the room list from the collaborator.
    FetchRooms {
        /// Generation to echo back in `RoomsLoaded`.
        generation: u64,
    },

    /// Fetch a room's messages from the collaborator.
    FetchMessages {
        /// Room to fetch.
        room_id: RoomId,
        /// Generation to echo back in `MessagesLoaded`.
        generation: u64,
    },

    /// Create a room at the collaborator.
    CreateRoom {
        /// Requested display name.
        name: String,
    },

    /// Upload any staged attachments, then create the message.
    CreateMessage {
        /// Target room.
        room_id: RoomId,
        /// Draft body; `attachments` is filled in after the uploads land.
        draft: MessageDraft,
        /// Files staged for upload ahead of the create.
        uploads: Vec<AttachmentUpload>,
    },

    /// Delete a message at the collaborator.
    DeleteMessage {
        /// Room the message belongs to.
        room_id: RoomId,
        /// Message to delete.
        message_id: MessageId,
    },

    /// Send a frame on the real-time channel.
    SendFrame(ClientFrame),

    /// Show a blocking alert for a failed data mutation.
    Alert {
        /// User-facing alert text.
        message: String,
    },
}
