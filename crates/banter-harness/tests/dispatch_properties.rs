//! Property-based tests across the wire model and the dispatcher.
//!
//! Whatever shape an inbound event takes, classification must be total:
//! well-formed frames always classify back to the frame that was encoded,
//! and arbitrary junk never classifies and never panics.

use banter_client::parse_frame;
use banter_proto::{Message, ServerFrame, UserRef};
use proptest::prelude::*;

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}"
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (id_strategy(), proptest::option::of(".{0,40}"), proptest::option::of("[a-z ]{0,20}"))
        .prop_map(|(id, text, author)| Message {
            id,
            author,
            text,
            attachments: Vec::new(),
            created_at: None,
        })
}

fn server_frame_strategy() -> impl Strategy<Value = ServerFrame> {
    prop_oneof![
        (id_strategy(), message_strategy())
            .prop_map(|(room_id, payload)| ServerFrame::Message { room_id, payload }),
        (id_strategy(), id_strategy())
            .prop_map(|(room_id, message_id)| ServerFrame::Delete { room_id, message_id }),
        (id_strategy(), any::<bool>(), proptest::option::of("[a-z]{1,10}"))
            .prop_map(|(room_id, is_typing, name)| ServerFrame::Typing {
                room_id,
                is_typing,
                user: name.map(UserRef::named),
            }),
    ]
}

proptest! {
    /// Every encodable server frame classifies back to itself.
    #[test]
    fn well_formed_frames_round_trip_through_the_dispatcher(
        frame in server_frame_strategy(),
    ) {
        let raw = serde_json::to_string(&frame).unwrap();
        prop_assert_eq!(parse_frame(&raw), Some(frame));
    }

    /// Arbitrary text never panics the dispatcher.
    #[test]
    fn arbitrary_text_is_discarded_quietly(raw in ".{0,200}") {
        let _ = parse_frame(&raw);
    }

    /// JSON objects with unknown types are ignored, whatever else they
    /// carry.
    #[test]
    fn unknown_types_are_ignored(kind in "[a-z]{1,12}", room in id_strategy()) {
        prop_assume!(!["message", "delete", "typing"].contains(&kind.as_str()));
        let raw = serde_json::json!({ "type": kind, "roomId": room }).to_string();
        prop_assert_eq!(parse_frame(&raw), None);
    }
}
