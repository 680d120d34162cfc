//! Wire model for the banter chat protocol.
//!
//! The real-time channel carries one JSON object per frame. Outbound frames
//! ([`ClientFrame`]) are commands issued by this client; inbound frames
//! ([`ServerFrame`]) are events relayed by the backend. Both are tagged
//! unions discriminated by a `type` field.
//!
//! This crate is pure data: no I/O, no transport assumptions. Encoding and
//! decoding go through `serde_json`; classification of raw inbound text
//! (including the malformed/unknown-type policy) lives in `banter-client`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod frame;
mod model;

pub use frame::{ClientFrame, ProtocolError, ServerFrame};
pub use model::{Attachment, Message, MessageDraft, MessageId, Room, RoomId, UserRef};
