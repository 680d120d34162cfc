//! Runtime orchestration behavior over a scripted driver.
//!
//! These exercise the full event → state machine → action → driver loop
//! without any network: the script stands in for both the transport and the
//! user.

use banter_app::{InputEvent, Runtime, UserCommand};
use banter_client::SocketEvent;
use banter_harness::ScriptDriver;
use banter_proto::{ClientFrame, Message, ServerFrame};

fn message(id: &str, text: &str) -> Message {
    Message {
        id: id.into(),
        author: Some("ann".into()),
        text: Some(text.into()),
        attachments: Vec::new(),
        created_at: None,
    }
}

async fn run(driver: ScriptDriver) -> banter_harness::Recorder {
    let recorder = driver.recorder();
    let runtime = Runtime::new(driver, "ann");
    runtime.run().await.unwrap();
    recorder
}

#[tokio::test]
async fn send_flow_confirms_then_relays() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.enqueue(InputEvent::Socket(SocketEvent::Opened));
    driver.enqueue(InputEvent::Command(UserCommand::SendMessage { text: "hello".into() }));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();

    // Exactly one relay frame, carrying the collaborator-confirmed message.
    let frames: Vec<_> = recorded
        .frames
        .iter()
        .filter(|f| matches!(f, ClientFrame::Message { .. }))
        .collect();
    assert_eq!(frames.len(), 1);
    match frames[0] {
        ClientFrame::Message { room_id, message } => {
            assert_eq!(room_id, "r1");
            assert_eq!(message.text.as_deref(), Some("hello"));
            assert_eq!(message.author.as_deref(), Some("ann"));
        },
        other => panic!("expected message frame, got {other:?}"),
    }

    assert!(recorded.alerts.is_empty());
    assert!(recorded.closed, "runtime must release the transport on exit");
}

#[tokio::test]
async fn typing_indicator_follows_composer_edges() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.enqueue(InputEvent::Socket(SocketEvent::Opened));
    driver.enqueue(InputEvent::TextChanged { non_empty: true });
    driver.enqueue(InputEvent::Command(UserCommand::SendMessage { text: "hi".into() }));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();

    let typing: Vec<bool> = recorded
        .frames
        .iter()
        .filter_map(|f| match f {
            ClientFrame::Typing { is_typing, .. } => Some(*is_typing),
            _ => None,
        })
        .collect();

    // Up on the first keystroke, down when the send clears the composer.
    assert_eq!(typing, vec![true, false]);
}

#[tokio::test]
async fn failed_send_raises_one_alert_and_no_relay() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.fail_mutations(true);
    driver.enqueue(InputEvent::Command(UserCommand::SendMessage { text: "doomed".into() }));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();

    assert_eq!(recorded.alerts, vec!["Failed to send message".to_string()]);
    assert!(
        !recorded.frames.iter().any(|f| matches!(f, ClientFrame::Message { .. })),
        "no relay frame for an unconfirmed message"
    );
}

#[tokio::test]
async fn delete_flow_relays_deletion() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.seed_message("r1", message("m1", "old"));
    driver.enqueue(InputEvent::Command(UserCommand::DeleteMessage { message_id: "m1".into() }));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();

    assert!(recorded.frames.iter().any(|f| matches!(
        f,
        ClientFrame::Delete { room_id, message_id } if room_id == "r1" && message_id == "m1"
    )));
}

#[tokio::test]
async fn failed_room_creation_raises_alert() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.fail_mutations(true);
    driver.enqueue(InputEvent::Command(UserCommand::CreateRoom { name: "new room".into() }));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();
    assert_eq!(recorded.alerts, vec!["Failed to create room".to_string()]);
}

#[tokio::test]
async fn inbound_frames_drive_renders_without_outbound_traffic() {
    let mut driver = ScriptDriver::new();
    driver.seed_room("r1", "general");
    driver.enqueue(InputEvent::Socket(SocketEvent::Opened));
    driver.enqueue(InputEvent::Socket(SocketEvent::Frame(ServerFrame::Message {
        room_id: "r1".into(),
        payload: message("m7", "pushed"),
    })));
    driver.enqueue(InputEvent::Socket(SocketEvent::Frame(ServerFrame::Typing {
        room_id: "r1".into(),
        is_typing: true,
        user: None,
    })));

    let recorder = run(driver).await;
    let recorded = recorder.lock().unwrap();

    assert!(recorded.frames.is_empty(), "server pushes must not echo back out");
    assert!(recorded.renders >= 3, "each applied event re-renders");
}
