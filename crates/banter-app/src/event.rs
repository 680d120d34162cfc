//! Application input events.
//!
//! [`AppEvent`] is the full set of inputs that drive the [`crate::App`]
//! state machine. Events originate from three sources:
//!
//! - channel lifecycle notifications from the transport,
//! - classified server-pushed frames,
//! - results of collaborator requests fed back by the runtime (tagged with
//!   the staleness generation that was current when the request started).

use banter_proto::{Message, MessageId, Room, RoomId, ServerFrame};

use crate::state::Mutation;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The channel opened (initially or after a reconnect).
    ChannelOpened,

    /// The channel closed; the transport reconnects on its own.
    ChannelClosed,

    /// Transport error side channel. Does not drive the lifecycle.
    ChannelError {
        /// Human-readable description.
        message: String,
    },

    /// A message was posted to a room (server push).
    MessageReceived {
        /// Room the message belongs to.
        room_id: RoomId,
        /// Authoritative message copy.
        message: Message,
    },

    /// A message was deleted from a room (server push).
    MessageDeleted {
        /// Room the message belonged to.
        room_id: RoomId,
        /// Identifier of the deleted message.
        message_id: MessageId,
    },

    /// Someone's typing state changed in a room (server push).
    TypingChanged {
        /// Room the indicator applies to.
        room_id: RoomId,
        /// Whether someone is typing there.
        is_typing: bool,
    },

    /// The room list arrived from the collaborator.
    RoomsLoaded {
        /// Generation the fetch was issued under.
        generation: u64,
        /// The fetched rooms.
        rooms: Vec<Room>,
    },

    /// A room was created via the collaborator.
    RoomCreated {
        /// The authoritative room copy.
        room: Room,
    },

    /// The active room's messages arrived from the collaborator.
    MessagesLoaded {
        /// Generation the fetch was issued under.
        generation: u64,
        /// The fetched messages, in server order.
        messages: Vec<Message>,
    },

    /// A locally sent message was confirmed by the collaborator.
    MessageCreated {
        /// Room the message was posted to.
        room_id: RoomId,
        /// The authoritative message copy.
        message: Message,
    },

    /// A locally requested deletion was confirmed by the collaborator.
    DeleteConfirmed {
        /// Room the message belonged to.
        room_id: RoomId,
        /// Identifier of the deleted message.
        message_id: MessageId,
    },

    /// A data mutation failed at the collaborator.
    MutationFailed {
        /// Which action failed.
        mutation: Mutation,
        /// Underlying failure description (for logs, not the user).
        message: String,
    },
}

impl From<ServerFrame> for AppEvent {
    fn from(frame: ServerFrame) -> Self {
        match frame {
            ServerFrame::Message { room_id, payload } => {
                Self::MessageReceived { room_id, message: payload }
            },
            ServerFrame::Delete { room_id, message_id } => {
                Self::MessageDeleted { room_id, message_id }
            },
            // Single remote-typing flag: the originating user is dropped.
            ServerFrame::Typing { room_id, is_typing, user: _ } => {
                Self::TypingChanged { room_id, is_typing }
            },
        }
    }
}
