//! Property-based tests for the reconciler state machine.
//!
//! Arbitrary event interleavings must uphold the reconciliation invariants:
//! unique message ids in the active sequence, isolation from non-active
//! rooms, and delete-of-absent-id being a no-op.

use std::collections::HashSet;

use banter_app::{App, AppEvent};
use banter_proto::{Message, Room};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Receive { room: u8, id: u8 },
    Delete { room: u8, id: u8 },
    Typing { room: u8, on: bool },
    Created { room: u8, id: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3, 0u8..12).prop_map(|(room, id)| Op::Receive { room, id }),
        (0u8..3, 0u8..12).prop_map(|(room, id)| Op::Delete { room, id }),
        (0u8..3, any::<bool>()).prop_map(|(room, on)| Op::Typing { room, on }),
        (0u8..3, 0u8..12).prop_map(|(room, id)| Op::Created { room, id }),
    ]
}

fn room_id(n: u8) -> String {
    format!("r{n}")
}

fn message(id: u8) -> Message {
    Message {
        id: format!("m{id}"),
        author: Some("prop".into()),
        text: Some("x".into()),
        attachments: Vec::new(),
        created_at: None,
    }
}

/// App with rooms r0..r2 loaded and r0 active.
fn loaded_app() -> App {
    let mut app = App::new("prop");
    let _ = app.start();
    let rooms = (0u8..3).map(|n| Room { id: room_id(n), name: format!("room {n}") }).collect();
    let _ = app.handle(AppEvent::RoomsLoaded { generation: 1, rooms });
    app
}

proptest! {
    /// Message ids in the active sequence stay unique under any event
    /// interleaving (the id-keyed reconcile never duplicates).
    #[test]
    fn active_sequence_ids_stay_unique(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut app = loaded_app();

        for op in ops {
            let _ = match op {
                Op::Receive { room, id } => app.handle(AppEvent::MessageReceived {
                    room_id: room_id(room),
                    message: message(id),
                }),
                Op::Delete { room, id } => app.handle(AppEvent::MessageDeleted {
                    room_id: room_id(room),
                    message_id: format!("m{id}"),
                }),
                Op::Typing { room, on } => app.handle(AppEvent::TypingChanged {
                    room_id: room_id(room),
                    is_typing: on,
                }),
                Op::Created { room, id } => app.handle(AppEvent::MessageCreated {
                    room_id: room_id(room),
                    message: message(id),
                }),
            };

            let mut seen = HashSet::new();
            for m in app.messages() {
                prop_assert!(seen.insert(m.id.clone()), "duplicate id {} in sequence", m.id);
            }
        }
    }

    /// Events targeting non-active rooms never touch the active sequence.
    #[test]
    fn other_rooms_never_leak_into_active_sequence(
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut app = loaded_app();

        for op in ops {
            let before = app.messages().to_vec();
            let other_room = !matches!(
                &op,
                Op::Receive { room: 0, .. }
                    | Op::Delete { room: 0, .. }
                    | Op::Typing { room: 0, .. }
                    | Op::Created { room: 0, .. }
            );

            let _ = match op {
                Op::Receive { room, id } => app.handle(AppEvent::MessageReceived {
                    room_id: room_id(room),
                    message: message(id),
                }),
                Op::Delete { room, id } => app.handle(AppEvent::MessageDeleted {
                    room_id: room_id(room),
                    message_id: format!("m{id}"),
                }),
                Op::Typing { room, on } => app.handle(AppEvent::TypingChanged {
                    room_id: room_id(room),
                    is_typing: on,
                }),
                Op::Created { room, id } => app.handle(AppEvent::MessageCreated {
                    room_id: room_id(room),
                    message: message(id),
                }),
            };

            if other_room {
                prop_assert_eq!(app.messages(), before.as_slice());
            }
        }
    }

    /// Deleting an id that is not present leaves the sequence unchanged.
    #[test]
    fn delete_of_absent_id_is_noop(present in 0u8..6, absent in 6u8..12) {
        let mut app = loaded_app();
        let _ = app.handle(AppEvent::MessageReceived {
            room_id: room_id(0),
            message: message(present),
        });

        let before = app.messages().to_vec();
        let _ = app.handle(AppEvent::MessageDeleted {
            room_id: room_id(0),
            message_id: format!("m{absent}"),
        });
        prop_assert_eq!(app.messages(), before.as_slice());
    }
}
