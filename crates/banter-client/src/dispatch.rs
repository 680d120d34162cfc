//! Inbound frame classification.
//!
//! Raw text from the channel goes through two stages: JSON validity, then
//! `type` classification. Malformed input is discarded with a warning and
//! processing continues on the next frame; unknown types are ignored
//! silently (forward compatibility with newer backends).

use banter_proto::ServerFrame;
use serde_json::Value;

/// Frame types this client understands.
const KNOWN_TYPES: [&str; 3] = ["message", "delete", "typing"];

/// Classify one raw inbound frame.
///
/// Returns `None` for anything that should not reach the application:
/// non-JSON data and known-type frames with malformed bodies (both logged at
/// warn), and frames with an unknown `type` (dropped silently).
pub fn parse_frame(raw: &str) -> Option<ServerFrame> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "discarding non-JSON frame");
            return None;
        },
    };

    let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        tracing::warn!("discarding frame without a type field");
        return None;
    };

    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return None;
    }

    match serde_json::from_value::<ServerFrame>(value) {
        Ok(frame) => Some(frame),
        Err(error) => {
            tracing::warn!(%error, kind, "discarding malformed frame body");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_json_is_discarded() {
        assert_eq!(parse_frame("not json at all"), None);
        assert_eq!(parse_frame(""), None);
    }

    #[test]
    fn unknown_type_is_ignored() {
        assert_eq!(parse_frame(r#"{"type":"presence","roomId":"r1"}"#), None);
    }

    #[test]
    fn missing_type_is_discarded() {
        assert_eq!(parse_frame(r#"{"roomId":"r1"}"#), None);
    }

    #[test]
    fn known_type_with_malformed_body_is_discarded() {
        // `message` without a payload object.
        assert_eq!(parse_frame(r#"{"type":"message","roomId":"r1"}"#), None);
        // `typing` with a non-boolean flag.
        assert_eq!(parse_frame(r#"{"type":"typing","roomId":"r1","isTyping":"yes"}"#), None);
    }

    #[test]
    fn well_formed_frames_survive_garbage_neighbors() {
        assert_eq!(parse_frame("garbage"), None);

        let frame =
            parse_frame(r#"{"type":"message","roomId":"r1","payload":{"id":"m1","text":"hi"}}"#);
        match frame {
            Some(ServerFrame::Message { room_id, payload }) => {
                assert_eq!(room_id, "r1");
                assert_eq!(payload.id, "m1");
            },
            other => panic!("expected message frame, got {other:?}"),
        }

        let frame = parse_frame(r#"{"type":"delete","roomId":"r1","messageId":"m1"}"#);
        assert!(matches!(frame, Some(ServerFrame::Delete { .. })));
    }
}
