//! Scripted driver for runtime tests.
//!
//! [`ScriptDriver`] feeds a fixed sequence of input events into the
//! [`Runtime`](banter_app::Runtime) loop and serves collaborator requests
//! from in-memory tables, recording everything the runtime does (frames
//! sent, alerts raised, renders) for later assertions. No network involved.

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::http::StatusCode;
use banter_app::{App, Driver, InputEvent};
use banter_client::{ApiError, AttachmentUpload};
use banter_proto::{Attachment, ClientFrame, Message, MessageDraft, MessageId, Room, RoomId};

/// Everything a runtime did while driven by a [`ScriptDriver`].
#[derive(Debug, Default)]
pub struct Recorded {
    /// Frames handed to the transport, in order.
    pub frames: Vec<ClientFrame>,
    /// Alert texts raised for failed mutations, in order.
    pub alerts: Vec<String>,
    /// Number of render calls.
    pub renders: usize,
    /// Whether the runtime released the transport on exit.
    pub closed: bool,
}

/// Shared view of a driver's recording.
pub type Recorder = Arc<Mutex<Recorded>>;

/// Driver implementation over a scripted event sequence.
///
/// When the script is exhausted the driver yields [`InputEvent::Quit`], so a
/// runtime always terminates.
pub struct ScriptDriver {
    events: VecDeque<InputEvent>,
    rooms: Vec<Room>,
    messages: Vec<(RoomId, Message)>,
    next_id: u64,
    fail_mutations: bool,
    recorded: Recorder,
}

impl ScriptDriver {
    /// Empty driver: no rooms, no script.
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            rooms: Vec::new(),
            messages: Vec::new(),
            next_id: 1,
            fail_mutations: false,
            recorded: Arc::default(),
        }
    }

    /// Seed a room into the collaborator tables.
    pub fn seed_room(&mut self, id: &str, name: &str) {
        self.rooms.push(Room { id: id.into(), name: name.into() });
    }

    /// Seed a stored message into the collaborator tables.
    pub fn seed_message(&mut self, room_id: &str, message: Message) {
        self.messages.push((room_id.into(), message));
    }

    /// Append an event to the script.
    pub fn enqueue(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Make every data mutation fail with a 500 from here on.
    pub fn fail_mutations(&mut self, fail: bool) {
        self.fail_mutations = fail;
    }

    /// Handle for inspecting the recording after the runtime finishes.
    pub fn recorder(&self) -> Recorder {
        Arc::clone(&self.recorded)
    }

    fn record<T>(&self, apply: impl FnOnce(&mut Recorded) -> T) -> T {
        let mut guard = match self.recorded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut guard)
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn mutation_failure(path: &str) -> ApiError {
        ApiError::Status {
            method: "POST",
            path: path.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Default for ScriptDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for ScriptDriver {
    type Error = Infallible;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        Ok(Some(self.events.pop_front().unwrap_or(InputEvent::Quit)))
    }

    async fn send_frame(&mut self, frame: ClientFrame) -> Result<(), Self::Error> {
        self.record(|r| r.frames.push(frame));
        Ok(())
    }

    async fn fetch_rooms(&mut self) -> Result<Vec<Room>, ApiError> {
        Ok(self.rooms.clone())
    }

    async fn create_room(&mut self, name: &str) -> Result<Room, ApiError> {
        if self.fail_mutations {
            return Err(Self::mutation_failure("/rooms"));
        }
        let room = Room { id: self.fresh_id("r"), name: name.to_string() };
        self.rooms.push(room.clone());
        Ok(room)
    }

    async fn fetch_messages(&mut self, room_id: &RoomId) -> Result<Vec<Message>, ApiError> {
        Ok(self
            .messages
            .iter()
            .filter(|(room, _)| room == room_id)
            .map(|(_, message)| message.clone())
            .collect())
    }

    async fn create_message(
        &mut self,
        room_id: &RoomId,
        draft: &MessageDraft,
    ) -> Result<Message, ApiError> {
        if self.fail_mutations {
            return Err(Self::mutation_failure("/messages"));
        }
        let message = Message {
            id: self.fresh_id("m"),
            author: Some(draft.author.clone()),
            text: Some(draft.text.clone()),
            attachments: draft.attachments.clone(),
            created_at: None,
        };
        self.messages.push((room_id.clone(), message.clone()));
        Ok(message)
    }

    async fn delete_message(
        &mut self,
        room_id: &RoomId,
        message_id: &MessageId,
    ) -> Result<(), ApiError> {
        if self.fail_mutations {
            return Err(Self::mutation_failure("/messages"));
        }
        self.messages.retain(|(room, message)| !(room == room_id && &message.id == message_id));
        Ok(())
    }

    async fn upload_attachments(
        &mut self,
        room_id: &RoomId,
        files: Vec<AttachmentUpload>,
    ) -> Result<Vec<Attachment>, ApiError> {
        if self.fail_mutations {
            return Err(Self::mutation_failure("/attachments"));
        }
        Ok(files
            .into_iter()
            .map(|file| Attachment {
                url: format!("http://files.invalid/{room_id}/{}", file.file_name),
                name: Some(file.file_name),
                mime: file.mime,
            })
            .collect())
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.record(|r| r.renders += 1);
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), Self::Error> {
        self.record(|r| r.alerts.push(message.to_string()));
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn close(&mut self) {
        self.record(|r| r.closed = true);
    }
}
