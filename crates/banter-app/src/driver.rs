//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each front end implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration — the same loop runs against the real transport and the
//! test harness.

use std::{future::Future, ops::Sub, time::Duration};

use banter_client::{ApiError, AttachmentUpload};
use banter_proto::{Attachment, ClientFrame, Message, MessageDraft, MessageId, Room, RoomId};

use crate::{App, InputEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Collaborator requests return [`ApiError`] — terminal for that one user
/// action, not for the driver. The associated [`Error`](Driver::Error) type
/// is for failures of the driver itself (rendering, event polling).
///
/// # Contract
///
/// [`poll_event`](Driver::poll_event) must be time-boxed: return `Ok(None)`
/// when nothing is ready within a bounded wait, so the runtime can run its
/// periodic maintenance (typing-indicator retraction) between events.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables synthetic time in tests.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next input event, or `None` after a bounded wait.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<InputEvent>, Self::Error>> + Send;

    /// Send a frame on the real-time channel.
    ///
    /// Dropped (not queued) by the transport when the channel is not open.
    fn send_frame(&mut self, frame: ClientFrame)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Fetch the room list from the collaborator.
    fn fetch_rooms(&mut self) -> impl Future<Output = Result<Vec<Room>, ApiError>> + Send;

    /// Create a room at the collaborator.
    fn create_room(&mut self, name: &str)
    -> impl Future<Output = Result<Room, ApiError>> + Send;

    /// Fetch a room's messages from the collaborator.
    fn fetch_messages(
        &mut self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<Message>, ApiError>> + Send;

    /// Create a message at the collaborator.
    fn create_message(
        &mut self,
        room_id: &RoomId,
        draft: &MessageDraft,
    ) -> impl Future<Output = Result<Message, ApiError>> + Send;

    /// Delete a message at the collaborator.
    fn delete_message(
        &mut self,
        room_id: &RoomId,
        message_id: &MessageId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Upload attachments for a room.
    fn upload_attachments(
        &mut self,
        room_id: &RoomId,
        files: Vec<AttachmentUpload>,
    ) -> impl Future<Output = Result<Vec<Attachment>, ApiError>> + Send;

    /// Render the application state.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Show a blocking alert for a failed data mutation.
    fn alert(&mut self, message: &str) -> Result<(), Self::Error>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Release transport resources (closes the channel).
    fn close(&mut self);
}
