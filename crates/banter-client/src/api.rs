//! REST collaborator client.
//!
//! Conventional JSON request/response with credentials (cookies) included.
//! Non-success statuses surface as [`ApiError::Status`]; there is no retry —
//! a failed mutation is terminal for that user action only.

use banter_proto::{Attachment, Message, MessageDraft, MessageId, Room, RoomId};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;

/// Errors from the REST collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The collaborator answered with a non-success status.
    #[error("{method} {path} failed: {status}")]
    Status {
        /// Request method.
        method: &'static str,
        /// Request path relative to the base URL.
        path: String,
        /// Response status.
        status: StatusCode,
    },

    /// Transport-level failure (DNS, connect, body read, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A file staged for upload to the attachments endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// File name sent with the multipart part.
    pub file_name: String,
    /// MIME type, when known.
    pub mime: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RoomsEnvelope {
    #[serde(default)]
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    #[serde(default)]
    files: Vec<Attachment>,
}

/// Client for the chat backend's REST surface.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for the configured base URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base: config.base_url.clone() })
    }

    /// Resolve a path against the base URL.
    ///
    /// Paths are concatenated, not joined: the base's own path segment (e.g.
    /// `/api/v1`) is preserved.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    fn expect_success(
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status { method, path: path.to_string(), status })
        }
    }

    /// List all rooms.
    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        let path = "/rooms";
        let response = self.http.get(self.endpoint(path)).send().await?;
        let response = Self::expect_success("GET", path, response)?;
        Ok(response.json::<RoomsEnvelope>().await?.rooms)
    }

    /// Create a room and return the authoritative copy.
    pub async fn create_room(&self, name: &str) -> Result<Room, ApiError> {
        let path = "/rooms";
        let response = self
            .http
            .post(self.endpoint(path))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        let response = Self::expect_success("POST", path, response)?;
        Ok(response.json().await?)
    }

    /// List the messages of a room.
    pub async fn messages(&self, room_id: &RoomId) -> Result<Vec<Message>, ApiError> {
        let path = format!("/rooms/{room_id}/messages");
        let response = self.http.get(self.endpoint(&path)).send().await?;
        let response = Self::expect_success("GET", &path, response)?;
        Ok(response.json::<MessagesEnvelope>().await?.messages)
    }

    /// Create a message and return the authoritative copy.
    pub async fn create_message(
        &self,
        room_id: &RoomId,
        draft: &MessageDraft,
    ) -> Result<Message, ApiError> {
        let path = format!("/rooms/{room_id}/messages");
        let response = self.http.post(self.endpoint(&path)).json(draft).send().await?;
        let response = Self::expect_success("POST", &path, response)?;
        Ok(response.json().await?)
    }

    /// Delete a message.
    pub async fn delete_message(
        &self,
        room_id: &RoomId,
        message_id: &MessageId,
    ) -> Result<(), ApiError> {
        let path = format!("/rooms/{room_id}/messages/{message_id}");
        let response = self.http.delete(self.endpoint(&path)).send().await?;
        Self::expect_success("DELETE", &path, response)?;
        Ok(())
    }

    /// Upload attachments for a room, returning their served descriptors.
    pub async fn upload_attachments(
        &self,
        room_id: &RoomId,
        files: Vec<AttachmentUpload>,
    ) -> Result<Vec<Attachment>, ApiError> {
        let path = format!("/rooms/{room_id}/attachments");

        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let mut part =
                reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = &file.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part("files", part);
        }

        let response = self.http.post(self.endpoint(&path)).multipart(form).send().await?;
        let response = Self::expect_success("UPLOAD", &path, response)?;
        Ok(response.json::<UploadEnvelope>().await?.files)
    }
}
