//! Minimal line client for protocol verification.
//!
//! Connects the full client stack (REST collaborator, real-time channel,
//! reconciler runtime) to a line-oriented terminal. Not a product UI — a
//! driver for exercising the core against a live backend.
//!
//! Input lines starting with `/` are commands (`/rooms`, `/join ID`,
//! `/create NAME`, `/delete ID`, `/name AUTHOR`, `/quit`); anything else is
//! sent as a message to the active room.

// Terminal output is this binary's purpose.
#![allow(clippy::print_stdout)]

use std::{io, time::Duration};

use banter_app::{App, ConnectionState, Driver, InputEvent, Runtime, UserCommand};
use banter_client::{
    ApiClient, ApiError, AttachmentUpload, ChatSocket, ClientConfig, ConfigError, SocketEvent,
};
use banter_proto::{Attachment, ClientFrame, Message, MessageDraft, MessageId, Room, RoomId};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use url::Url;

/// How long one poll waits before yielding to runtime maintenance.
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "banter", about = "Line client for the banter chat backend")]
struct Args {
    /// REST base URL of the chat backend.
    #[arg(long, default_value = "http://localhost:5000/api/v1")]
    base_url: Url,

    /// Author display name.
    #[arg(long, default_value = "Anon")]
    author: String,
}

/// Top-level failures of the binary.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// The base URL cannot be mapped to a channel endpoint.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The REST client could not be built.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Terminal I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Driver wiring the runtime to a terminal, the transport, and the REST
/// collaborator.
struct CliDriver {
    socket: Option<ChatSocket>,
    socket_events: mpsc::Receiver<SocketEvent>,
    api: ApiClient,
    lines: Lines<BufReader<Stdin>>,
    /// Render bookkeeping: what was already printed.
    printed_messages: usize,
    last_connection: ConnectionState,
    last_room: Option<RoomId>,
    last_typing: bool,
}

impl CliDriver {
    fn new(socket: ChatSocket, socket_events: mpsc::Receiver<SocketEvent>, api: ApiClient) -> Self {
        Self {
            socket: Some(socket),
            socket_events,
            api,
            lines: BufReader::new(tokio::io::stdin()).lines(),
            printed_messages: 0,
            last_connection: ConnectionState::Disconnected,
            last_room: None,
            last_typing: false,
        }
    }

    /// Map one input line to an event.
    fn parse_line(line: &str) -> Option<InputEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = if let Some(rest) = line.strip_prefix('/') {
            let (verb, arg) = rest.split_once(' ').unwrap_or((rest, ""));
            let arg = arg.trim();
            match verb {
                "quit" => return Some(InputEvent::Quit),
                "rooms" => UserCommand::RefreshRooms { preferred: None },
                "join" if !arg.is_empty() => UserCommand::SelectRoom { room_id: arg.to_string() },
                "create" if !arg.is_empty() => UserCommand::CreateRoom { name: arg.to_string() },
                "delete" if !arg.is_empty() => {
                    UserCommand::DeleteMessage { message_id: arg.to_string() }
                },
                "name" if !arg.is_empty() => UserCommand::SetAuthor { name: arg.to_string() },
                _ => {
                    println!("unknown command: /{verb}");
                    return None;
                },
            }
        } else {
            UserCommand::SendMessage { text: line.to_string() }
        };
        Some(InputEvent::Command(command))
    }

    fn print_message(message: &Message) {
        let author = message.author.as_deref().unwrap_or("Anon");
        let text = message.text.as_deref().unwrap_or("");
        if message.attachments.is_empty() {
            println!("[{}] {author}: {text}", message.id);
        } else {
            println!("[{}] {author}: {text} ({} attachments)", message.id, message.attachments.len());
        }
    }
}

impl Driver for CliDriver {
    type Error = io::Error;
    type Instant = std::time::Instant;

    async fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        tokio::select! {
            event = self.socket_events.recv() => match event {
                Some(event) => Ok(Some(InputEvent::Socket(event))),
                // Transport task gone; nothing left to drive.
                None => Ok(Some(InputEvent::Quit)),
            },
            line = self.lines.next_line() => match line? {
                Some(line) => Ok(Self::parse_line(&line)),
                None => Ok(Some(InputEvent::Quit)),
            },
            () = tokio::time::sleep(POLL_TIMEOUT) => Ok(None),
        }
    }

    async fn send_frame(&mut self, frame: ClientFrame) -> Result<(), Self::Error> {
        if let Some(socket) = &self.socket {
            socket.send(frame);
        }
        Ok(())
    }

    async fn fetch_rooms(&mut self) -> Result<Vec<Room>, ApiError> {
        self.api.rooms().await
    }

    async fn create_room(&mut self, name: &str) -> Result<Room, ApiError> {
        self.api.create_room(name).await
    }

    async fn fetch_messages(&mut self, room_id: &RoomId) -> Result<Vec<Message>, ApiError> {
        self.api.messages(room_id).await
    }

    async fn create_message(
        &mut self,
        room_id: &RoomId,
        draft: &MessageDraft,
    ) -> Result<Message, ApiError> {
        self.api.create_message(room_id, draft).await
    }

    async fn delete_message(
        &mut self,
        room_id: &RoomId,
        message_id: &MessageId,
    ) -> Result<(), ApiError> {
        self.api.delete_message(room_id, message_id).await
    }

    async fn upload_attachments(
        &mut self,
        room_id: &RoomId,
        files: Vec<AttachmentUpload>,
    ) -> Result<Vec<Attachment>, ApiError> {
        self.api.upload_attachments(room_id, files).await
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        if app.connection_state() != self.last_connection {
            self.last_connection = app.connection_state();
            let label = match self.last_connection {
                ConnectionState::Disconnected => "disconnected",
                ConnectionState::Connecting => "connecting...",
                ConnectionState::Connected => "connected",
            };
            println!("* {label}");
        }

        if app.active_room_id() != self.last_room.as_ref() {
            self.last_room = app.active_room_id().cloned();
            self.printed_messages = 0;
            if let Some(room) = app.active_room() {
                println!("* room: {} ({})", room.name, room.id);
            }
        }

        let messages = app.messages();
        // The sequence can shrink (deletes) or be replaced (room fetch).
        if messages.len() < self.printed_messages {
            self.printed_messages = 0;
            println!("* messages:");
        }
        for message in &messages[self.printed_messages..] {
            Self::print_message(message);
        }
        self.printed_messages = messages.len();

        if app.remote_typing() != self.last_typing {
            self.last_typing = app.remote_typing();
            if self.last_typing {
                println!("* someone is typing...");
            }
        }

        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), Self::Error> {
        println!("! {message}");
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.close();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ClientConfig::new(args.base_url);

    let (socket, socket_events) = ChatSocket::connect(&config)?;
    let api = ApiClient::new(&config)?;

    let driver = CliDriver::new(socket, socket_events, api);
    Runtime::new(driver, args.author).run().await?;
    Ok(())
}
