//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: the reconciler state machine
//! - [`TypingTracker`]: local typing-indicator debouncing
//! - [`Driver`]: platform-specific I/O
//!
//! Collaborator requests are executed inline: list fetches fail soft (logged,
//! no user-visible error), data mutations feed a failure event back into the
//! state machine, which answers with a blocking alert for that action only.

use banter_client::SocketEvent;
use banter_proto::{ClientFrame, UserRef};

use crate::{App, AppAction, AppEvent, Driver, InputEvent, TypingTracker, UserCommand,
    state::Mutation};

/// Generic runtime that orchestrates App, TypingTracker, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
    typing: TypingTracker<D::Instant>,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime with the given driver and author name.
    pub fn new(driver: D, author: impl Into<String>) -> Self {
        Self { driver, app: App::new(author), typing: TypingTracker::new() }
    }

    /// Run the main event loop.
    ///
    /// Starts the initial room load, then: poll an input event, run it
    /// through the state machine, execute the resulting actions, and handle
    /// the typing idle window. Returns when the driver yields
    /// [`InputEvent::Quit`]; the channel is closed on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let actions = self.app.start();
        self.execute(actions).await?;

        loop {
            if let Some(event) = self.driver.poll_event().await?
                && self.process(event).await?
            {
                break;
            }

            let now = self.driver.now();
            if let Some(flag) = self.typing.tick(now) {
                self.send_typing(flag).await?;
            }
        }

        self.driver.close();
        Ok(())
    }

    /// Process one input event. Returns `true` if the runtime should quit.
    async fn process(&mut self, event: InputEvent) -> Result<bool, D::Error> {
        match event {
            InputEvent::Quit => return Ok(true),

            InputEvent::Socket(socket_event) => {
                let app_event = match socket_event {
                    SocketEvent::Opened => AppEvent::ChannelOpened,
                    SocketEvent::Closed => AppEvent::ChannelClosed,
                    SocketEvent::Error { message } => AppEvent::ChannelError { message },
                    SocketEvent::Frame(frame) => AppEvent::from(frame),
                };
                let actions = self.app.handle(app_event);
                self.execute(actions).await?;
            },

            InputEvent::Command(command) => {
                let actions = self.handle_command(command).await?;
                self.execute(actions).await?;
            },

            InputEvent::TextChanged { non_empty } => {
                let now = self.driver.now();
                if let Some(flag) = self.typing.input_changed(non_empty, now) {
                    self.send_typing(flag).await?;
                }
            },
        }
        Ok(false)
    }

    async fn handle_command(&mut self, command: UserCommand) -> Result<Vec<AppAction>, D::Error> {
        let actions = match command {
            UserCommand::SendMessage { text } => {
                // Sending clears the composer: retract the indicator now
                // rather than waiting out the idle window.
                let now = self.driver.now();
                if let Some(flag) = self.typing.input_changed(false, now) {
                    self.send_typing(flag).await?;
                }
                self.app.send_message(&text)
            },
            UserCommand::DeleteMessage { message_id } => self.app.delete_message(&message_id),
            UserCommand::CreateRoom { name } => self.app.create_room(&name),
            UserCommand::SelectRoom { room_id } => self.app.select_room(&room_id),
            UserCommand::RefreshRooms { preferred } => self.app.refresh_rooms(preferred),
            UserCommand::SetAuthor { name } => self.app.set_author(&name),
            UserCommand::Attach { files } => {
                self.app.attach(files);
                vec![]
            },
        };
        Ok(actions)
    }

    /// Execute actions, feeding collaborator results back into the state
    /// machine until it settles.
    async fn execute(&mut self, initial: Vec<AppAction>) -> Result<(), D::Error> {
        let mut pending = initial;

        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Alert { message } => self.driver.alert(&message)?,
                    AppAction::SendFrame(frame) => self.driver.send_frame(frame).await?,

                    AppAction::FetchRooms { generation } => {
                        match self.driver.fetch_rooms().await {
                            Ok(rooms) => pending.extend(
                                self.app.handle(AppEvent::RoomsLoaded { generation, rooms }),
                            ),
                            Err(error) => tracing::error!(%error, "room list fetch failed"),
                        }
                    },

                    AppAction::FetchMessages { room_id, generation } => {
                        match self.driver.fetch_messages(&room_id).await {
                            Ok(messages) => pending.extend(
                                self.app
                                    .handle(AppEvent::MessagesLoaded { generation, messages }),
                            ),
                            Err(error) => {
                                tracing::error!(%error, %room_id, "message fetch failed");
                            },
                        }
                    },

                    AppAction::CreateRoom { name } => match self.driver.create_room(&name).await {
                        Ok(room) => {
                            pending.extend(self.app.handle(AppEvent::RoomCreated { room }));
                        },
                        Err(error) => pending.extend(self.app.handle(AppEvent::MutationFailed {
                            mutation: Mutation::CreateRoom,
                            message: error.to_string(),
                        })),
                    },

                    AppAction::CreateMessage { room_id, mut draft, uploads } => {
                        let outcome = 'create: {
                            if !uploads.is_empty() {
                                match self.driver.upload_attachments(&room_id, uploads).await {
                                    Ok(files) => draft.attachments = files,
                                    Err(error) => break 'create Err(error),
                                }
                            }
                            self.driver.create_message(&room_id, &draft).await
                        };
                        match outcome {
                            Ok(message) => pending.extend(
                                self.app.handle(AppEvent::MessageCreated { room_id, message }),
                            ),
                            Err(error) => {
                                pending.extend(self.app.handle(AppEvent::MutationFailed {
                                    mutation: Mutation::SendMessage,
                                    message: error.to_string(),
                                }));
                            },
                        }
                    },

                    AppAction::DeleteMessage { room_id, message_id } => {
                        match self.driver.delete_message(&room_id, &message_id).await {
                            Ok(()) => pending.extend(
                                self.app
                                    .handle(AppEvent::DeleteConfirmed { room_id, message_id }),
                            ),
                            Err(error) => {
                                pending.extend(self.app.handle(AppEvent::MutationFailed {
                                    mutation: Mutation::DeleteMessage,
                                    message: error.to_string(),
                                }));
                            },
                        }
                    },
                }
            }
        }

        Ok(())
    }

    /// Send the local typing flag for the active room.
    async fn send_typing(&mut self, is_typing: bool) -> Result<(), D::Error> {
        let Some(room_id) = self.app.active_room_id().cloned() else {
            return Ok(());
        };
        let user = UserRef::named(self.app.author());
        self.driver.send_frame(ClientFrame::typing(room_id, is_typing, user)).await
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
