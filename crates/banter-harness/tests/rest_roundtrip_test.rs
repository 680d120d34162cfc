//! REST collaborator round-trips against the in-process mock backend.

use axum::http::StatusCode;
use banter_client::{ApiClient, ApiError, AttachmentUpload, ClientConfig};
use banter_harness::MockServer;
use banter_proto::MessageDraft;

async fn client() -> (MockServer, ApiClient) {
    let server = MockServer::start().await.unwrap();
    server.seed_room("r1", "general").await;
    let config = ClientConfig::new(server.base_url());
    let api = ApiClient::new(&config).unwrap();
    (server, api)
}

#[tokio::test]
async fn rooms_and_messages_round_trip() {
    let (server, api) = client().await;

    let rooms = api.rooms().await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "r1");
    assert_eq!(rooms[0].name, "general");

    let created = api.create_room("random").await.unwrap();
    assert_eq!(created.name, "random");
    assert_eq!(api.rooms().await.unwrap().len(), 2);

    let draft = MessageDraft {
        text: "hi there".into(),
        attachments: Vec::new(),
        author: "ann".into(),
    };
    let message = api.create_message(&"r1".into(), &draft).await.unwrap();
    assert_eq!(message.text.as_deref(), Some("hi there"));
    assert_eq!(message.author.as_deref(), Some("ann"));
    assert!(message.created_at.is_some(), "backend stamps creation time");

    let listed = api.messages(&"r1".into()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, message.id);

    // The store agrees with the API view.
    assert_eq!(server.stored_messages("r1").await.len(), 1);

    api.delete_message(&"r1".into(), &message.id).await.unwrap();
    assert!(api.messages(&"r1".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_success_statuses_surface_as_errors() {
    let (_server, api) = client().await;

    // Unknown room.
    let err = api.messages(&"ghost".into()).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND));

    // Unknown message id on delete.
    let err = api.delete_message(&"r1".into(), &"nope".into()).await.unwrap_err();
    match err {
        ApiError::Status { method, status, .. } => {
            assert_eq!(method, "DELETE");
            assert_eq!(status, StatusCode::NOT_FOUND);
        },
        other => panic!("expected status error, got {other:?}"),
    }

    // Posting into an unknown room.
    let draft = MessageDraft { text: "x".into(), attachments: Vec::new(), author: "a".into() };
    assert!(api.create_message(&"ghost".into(), &draft).await.is_err());
}

#[tokio::test]
async fn attachment_upload_returns_served_descriptors() {
    let (_server, api) = client().await;

    let uploads = vec![
        AttachmentUpload {
            file_name: "photo.png".into(),
            mime: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        },
        AttachmentUpload { file_name: "notes.txt".into(), mime: None, bytes: b"hi".to_vec() },
    ];

    let files = api.upload_attachments(&"r1".into(), uploads).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name.as_deref(), Some("photo.png"));
    assert_eq!(files[0].mime.as_deref(), Some("image/png"));
    assert!(files[0].url.contains("photo.png"));
    assert_eq!(files[1].name.as_deref(), Some("notes.txt"));
}
