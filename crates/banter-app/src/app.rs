//! Application state machine.
//!
//! [`App`] manages the interactive state of the chat view, completely
//! decoupled from I/O: it consumes [`AppEvent`] inputs and produces
//! [`AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the room list, the active room, and the active room's ordered
//!   message sequence. Only the active room's messages are held in memory;
//!   switching rooms discards them and re-fetches from the collaborator.
//! - Reconciles server-pushed events against local state, keyed by message
//!   id: an incoming copy of a known id replaces it in place, anything else
//!   appends in arrival order. Events for non-active rooms are ignored.
//! - Guards in-flight collaborator fetches with a generation counter so a
//!   response for an abandoned room switch (or a superseded room-list
//!   refresh) is discarded instead of clobbering newer state.
//! - Tracks one remote-typing flag for the active room.

use banter_client::AttachmentUpload;
use banter_proto::{Message, MessageDraft, MessageId, Room, RoomId};

use crate::{AppAction, AppEvent, ConnectionState};

/// Author name used when the local user has not picked one.
const ANONYMOUS: &str = "Anon";

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a transport or backend.
#[derive(Debug, Clone)]
pub struct App {
    /// Channel state for UI feedback.
    connection: ConnectionState,
    /// Known rooms, in collaborator order.
    rooms: Vec<Room>,
    /// Currently active room. `None` until the room list arrives.
    active_room: Option<RoomId>,
    /// Active room's messages, in arrival order.
    messages: Vec<Message>,
    /// Someone (other than us) is typing in the active room.
    remote_typing: bool,
    /// Local author display name.
    author: String,
    /// Files staged for the next send.
    pending_attachments: Vec<AttachmentUpload>,
    /// Room selection preferred by an in-flight room-list refresh.
    preferred_room: Option<RoomId>,
    /// Staleness generation for room-list fetches.
    rooms_generation: u64,
    /// Staleness generation for message fetches.
    messages_generation: u64,
}

impl App {
    /// Create a new App with no rooms loaded yet.
    pub fn new(author: impl Into<String>) -> Self {
        let author = author.into();
        let author = if author.trim().is_empty() { ANONYMOUS.to_string() } else { author };
        Self {
            connection: ConnectionState::Disconnected,
            rooms: Vec::new(),
            active_room: None,
            messages: Vec::new(),
            remote_typing: false,
            author,
            pending_attachments: Vec::new(),
            preferred_room: None,
            rooms_generation: 0,
            messages_generation: 0,
        }
    }

    /// Kick off the initial room-list load.
    pub fn start(&mut self) -> Vec<AppAction> {
        self.connection = ConnectionState::Connecting;
        self.rooms_generation += 1;
        vec![AppAction::FetchRooms { generation: self.rooms_generation }, AppAction::Render]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::ChannelOpened => {
                self.connection = ConnectionState::Connected;
                vec![AppAction::Render]
            },
            AppEvent::ChannelClosed => {
                // The transport reconnects on its own; reflect that.
                self.connection = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::ChannelError { message } => {
                // Side channel only: transient connectivity stays invisible.
                tracing::debug!(%message, "channel error");
                vec![]
            },
            AppEvent::MessageReceived { room_id, message } => {
                if self.active_room.as_ref() != Some(&room_id) {
                    return vec![];
                }
                self.reconcile(message);
                vec![AppAction::Render]
            },
            AppEvent::MessageDeleted { room_id, message_id } => {
                if self.active_room.as_ref() != Some(&room_id) {
                    return vec![];
                }
                self.messages.retain(|m| m.id != message_id);
                vec![AppAction::Render]
            },
            AppEvent::TypingChanged { room_id, is_typing } => {
                if self.active_room.as_ref() != Some(&room_id) {
                    return vec![];
                }
                self.remote_typing = is_typing;
                vec![AppAction::Render]
            },
            AppEvent::RoomsLoaded { generation, rooms } => {
                self.handle_rooms_loaded(generation, rooms)
            },
            AppEvent::RoomCreated { room } => {
                self.rooms.push(room.clone());
                let mut actions = self.activate(room.id);
                actions.push(AppAction::Render);
                actions
            },
            AppEvent::MessagesLoaded { generation, messages } => {
                if generation != self.messages_generation {
                    tracing::debug!(generation, "discarding stale message load");
                    return vec![];
                }
                self.messages = messages;
                vec![AppAction::Render]
            },
            AppEvent::MessageCreated { room_id, message } => {
                // Optimistic append, plus the relay frame so other clients
                // see the message without waiting for the backend broadcast.
                let frame = AppAction::SendFrame(banter_proto::ClientFrame::message(
                    room_id.clone(),
                    message.clone(),
                ));
                if self.active_room.as_ref() == Some(&room_id) {
                    self.reconcile(message);
                }
                vec![frame, AppAction::Render]
            },
            AppEvent::DeleteConfirmed { room_id, message_id } => {
                let frame = AppAction::SendFrame(banter_proto::ClientFrame::delete(
                    room_id.clone(),
                    message_id.clone(),
                ));
                if self.active_room.as_ref() == Some(&room_id) {
                    self.messages.retain(|m| m.id != message_id);
                }
                vec![frame, AppAction::Render]
            },
            AppEvent::MutationFailed { mutation, message } => {
                tracing::warn!(%message, ?mutation, "collaborator request failed");
                vec![AppAction::Alert { message: mutation.alert_text().to_string() }]
            },
        }
    }

    /// Switch to a known room, discarding the previous room's state.
    ///
    /// Unknown ids are ignored.
    pub fn select_room(&mut self, room_id: &RoomId) -> Vec<AppAction> {
        if !self.rooms.iter().any(|r| &r.id == room_id) {
            return vec![];
        }
        let mut actions = self.activate(room_id.clone());
        actions.push(AppAction::Render);
        actions
    }

    /// Re-fetch the room list, then select `preferred` (falling back to the
    /// first room) once it arrives.
    pub fn refresh_rooms(&mut self, preferred: Option<RoomId>) -> Vec<AppAction> {
        self.preferred_room = preferred;
        self.rooms_generation += 1;
        vec![AppAction::FetchRooms { generation: self.rooms_generation }]
    }

    /// Post a message to the active room.
    ///
    /// Empty text with no staged attachments, or no active room, is a no-op.
    pub fn send_message(&mut self, text: &str) -> Vec<AppAction> {
        let Some(room_id) = self.active_room.clone() else {
            return vec![];
        };
        let text = text.trim();
        let uploads = std::mem::take(&mut self.pending_attachments);
        if text.is_empty() && uploads.is_empty() {
            return vec![];
        }

        let draft = MessageDraft {
            text: text.to_string(),
            attachments: Vec::new(),
            author: self.author.clone(),
        };
        vec![AppAction::CreateMessage { room_id, draft, uploads }]
    }

    /// Delete a message from the active room.
    pub fn delete_message(&mut self, message_id: &MessageId) -> Vec<AppAction> {
        let Some(room_id) = self.active_room.clone() else {
            return vec![];
        };
        vec![AppAction::DeleteMessage { room_id, message_id: message_id.clone() }]
    }

    /// Create a new room. Blank names are a no-op.
    pub fn create_room(&mut self, name: &str) -> Vec<AppAction> {
        let name = name.trim();
        if name.is_empty() {
            return vec![];
        }
        vec![AppAction::CreateRoom { name: name.to_string() }]
    }

    /// Stage files for the next send, replacing any previous staging.
    pub fn attach(&mut self, files: Vec<AttachmentUpload>) {
        self.pending_attachments = files;
    }

    /// Set the local author display name. Blank falls back to anonymous.
    pub fn set_author(&mut self, name: &str) -> Vec<AppAction> {
        let name = name.trim();
        self.author = if name.is_empty() { ANONYMOUS.to_string() } else { name.to_string() };
        vec![AppAction::Render]
    }

    fn handle_rooms_loaded(&mut self, generation: u64, rooms: Vec<Room>) -> Vec<AppAction> {
        if generation != self.rooms_generation {
            tracing::debug!(generation, "discarding stale room load");
            return vec![];
        }
        self.rooms = rooms;

        let preferred = self.preferred_room.take();
        let target = preferred
            .filter(|id| self.rooms.iter().any(|r| &r.id == id))
            .or_else(|| {
                self.active_room
                    .clone()
                    .filter(|id| self.rooms.iter().any(|r| &r.id == id))
            })
            .or_else(|| self.rooms.first().map(|r| r.id.clone()));

        match target {
            Some(id) if self.active_room.as_ref() != Some(&id) => {
                let mut actions = self.activate(id);
                actions.push(AppAction::Render);
                actions
            },
            Some(_) => vec![AppAction::Render],
            None => {
                self.active_room = None;
                self.messages.clear();
                self.remote_typing = false;
                vec![AppAction::Render]
            },
        }
    }

    /// Make a room active: discard the previous sequence and start a fresh
    /// fetch under a new generation.
    fn activate(&mut self, room_id: RoomId) -> Vec<AppAction> {
        self.active_room = Some(room_id.clone());
        self.messages.clear();
        self.remote_typing = false;
        self.messages_generation += 1;
        vec![AppAction::FetchMessages { room_id, generation: self.messages_generation }]
    }

    /// Merge one authoritative message copy into the active sequence.
    ///
    /// Keyed by id: a known id is replaced in place, a new one appends in
    /// arrival order. No sorting by timestamp.
    fn reconcile(&mut self, message: Message) {
        if let Some(existing) = self.messages.iter_mut().find(|m| m.id == message.id) {
            *existing = message;
        } else {
            self.messages.push(message);
        }
    }

    /// Current channel state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// All known rooms.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Active room id. `None` until the room list arrives.
    pub fn active_room_id(&self) -> Option<&RoomId> {
        self.active_room.as_ref()
    }

    /// Active room. `None` until the room list arrives.
    pub fn active_room(&self) -> Option<&Room> {
        let id = self.active_room.as_ref()?;
        self.rooms.iter().find(|r| &r.id == id)
    }

    /// Active room's messages, in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether someone else is typing in the active room.
    pub fn remote_typing(&self) -> bool {
        self.remote_typing
    }

    /// Local author display name.
    pub fn author(&self) -> &str {
        &self.author
    }
}
