//! In-process mock of the chat backend.
//!
//! Serves the REST surface (rooms, messages, attachments) and the WebSocket
//! relay at `/api/v1/ws` on one ephemeral port. Frames received from any
//! connected client are fanned out to every connected client (the sender
//! included), which is how the real relay behaves for this protocol.
//!
//! Test hooks: [`MockServer::push_frame`] injects a server-initiated frame,
//! [`MockServer::kick_all`] abruptly drops every channel to exercise the
//! client's reconnect path.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use banter_proto::{Attachment, Message, MessageDraft, Room};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, broadcast, oneshot};
use url::Url;

/// Shared mock backend state.
struct ServerState {
    rooms: Mutex<Vec<Room>>,
    messages: Mutex<Vec<(String, Message)>>,
    next_id: AtomicU64,
    /// Raw frame text fan-out to every connected channel.
    relay: broadcast::Sender<String>,
    /// Abrupt-disconnect signal for connected channels.
    kill: broadcast::Sender<()>,
}

impl ServerState {
    fn fresh_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a running mock backend.
///
/// The server stops when the handle is dropped.
pub struct MockServer {
    addr: SocketAddr,
    base: Url,
    state: Arc<ServerState>,
    _shutdown: oneshot::Sender<()>,
}

impl MockServer {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> std::io::Result<Self> {
        let (relay, _) = broadcast::channel(64);
        let (kill, _) = broadcast::channel(8);
        let state = Arc::new(ServerState {
            rooms: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            relay,
            kill,
        });

        let app = Router::new()
            .route("/api/v1/rooms", get(list_rooms).post(create_room))
            .route(
                "/api/v1/rooms/{room_id}/messages",
                get(list_messages).post(create_message),
            )
            .route(
                "/api/v1/rooms/{room_id}/messages/{message_id}",
                axum::routing::delete(delete_message),
            )
            .route("/api/v1/rooms/{room_id}/attachments", axum::routing::post(upload))
            .route("/api/v1/ws", get(upgrade))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        // INVARIANT: a socket-derived authority always forms a valid URL.
        #[allow(clippy::expect_used)]
        let base = Url::parse(&format!("http://{addr}/api/v1"))
            .expect("addr-derived URL is always valid");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(error) = serve.await {
                tracing::error!(%error, "mock server stopped");
            }
        });

        Ok(Self { addr, base, state, _shutdown: shutdown_tx })
    }

    /// REST base URL of this instance (`http://127.0.0.1:PORT/api/v1`).
    pub fn base_url(&self) -> Url {
        self.base.clone()
    }

    /// Socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Seed a room directly into the store.
    pub async fn seed_room(&self, id: &str, name: &str) {
        self.state.rooms.lock().await.push(Room { id: id.into(), name: name.into() });
    }

    /// Push a raw frame to every connected channel, as the server would.
    pub fn push_frame(&self, frame: &str) {
        let _ = self.state.relay.send(frame.to_string());
    }

    /// Abruptly drop every connected channel (no close handshake).
    pub fn kick_all(&self) {
        let _ = self.state.kill.send(());
    }

    /// Snapshot of a room's stored messages.
    pub async fn stored_messages(&self, room_id: &str) -> Vec<Message> {
        self.state
            .messages
            .lock()
            .await
            .iter()
            .filter(|(room, _)| room == room_id)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

async fn list_rooms(State(state): State<Arc<ServerState>>) -> Json<serde_json::Value> {
    let rooms = state.rooms.lock().await.clone();
    Json(serde_json::json!({ "rooms": rooms }))
}

async fn create_room(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Room>, StatusCode> {
    let name = body
        .get("name")
        .and_then(serde_json::Value::as_str)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let room = Room { id: state.fresh_id("r"), name: name.to_string() };
    state.rooms.lock().await.push(room.clone());
    Ok(Json(room))
}

async fn room_exists(state: &ServerState, room_id: &str) -> bool {
    state.rooms.lock().await.iter().any(|r| r.id == room_id)
}

async fn list_messages(
    State(state): State<Arc<ServerState>>,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if !room_exists(&state, &room_id).await {
        return Err(StatusCode::NOT_FOUND);
    }
    let messages: Vec<Message> = state
        .messages
        .lock()
        .await
        .iter()
        .filter(|(room, _)| room == &room_id)
        .map(|(_, message)| message.clone())
        .collect();
    Ok(Json(serde_json::json!({ "messages": messages })))
}

async fn create_message(
    State(state): State<Arc<ServerState>>,
    Path(room_id): Path<String>,
    Json(draft): Json<MessageDraft>,
) -> Result<Json<Message>, StatusCode> {
    if !room_exists(&state, &room_id).await {
        return Err(StatusCode::NOT_FOUND);
    }

    let message = Message {
        id: state.fresh_id("m"),
        author: Some(draft.author),
        text: Some(draft.text),
        attachments: draft.attachments,
        created_at: Some(Utc::now()),
    };
    state.messages.lock().await.push((room_id, message.clone()));
    Ok(Json(message))
}

async fn delete_message(
    State(state): State<Arc<ServerState>>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut messages = state.messages.lock().await;
    let before = messages.len();
    messages.retain(|(room, message)| !(room == &room_id && message.id == message_id));
    if messages.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn upload(
    State(state): State<Arc<ServerState>>,
    Path(room_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if !room_exists(&state, &room_id).await {
        return Err(StatusCode::NOT_FOUND);
    }

    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.file_name().map(str::to_string);
        let mime = field.content_type().map(str::to_string);
        // Contents are read and discarded; only the descriptor matters here.
        let _ = field.bytes().await.map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

        let served = name.clone().unwrap_or_else(|| state.fresh_id("f"));
        files.push(Attachment {
            url: format!("http://files.invalid/uploads/{room_id}/{served}"),
            name,
            mime,
        });
    }

    Ok(Json(serde_json::json!({ "files": files })))
}

async fn upgrade(
    State(state): State<Arc<ServerState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

/// One connected channel: relay inbound frames to everyone, forward the
/// fan-out to this client, drop abruptly on a kick.
async fn client_session(socket: WebSocket, state: Arc<ServerState>) {
    let (mut sink, mut source) = socket.split();
    let mut relay = state.relay.subscribe();
    let mut kill = state.kill.subscribe();

    loop {
        tokio::select! {
            inbound = source.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = state.relay.send(text.to_string());
                },
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {},
                Some(Err(_)) => break,
            },
            outbound = relay.recv() => match outbound {
                Ok(text) => {
                    if sink.send(WsMessage::Text(text.into())).await.is_err() {
                        break;
                    }
                },
                Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = kill.recv() => break,
        }
    }
}
