//! Test harness for the banter client stack.
//!
//! Provides an in-process mock of the chat backend — REST routes plus the
//! WebSocket relay at the derived `/ws` path, on one port, the way the real
//! collaborator presents itself — and a scripted [`Driver`] implementation
//! for exercising the [`Runtime`] loop without any network at all.
//!
//! [`Driver`]: banter_app::Driver
//! [`Runtime`]: banter_app::Runtime

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod mock_server;
pub mod script_driver;

pub use mock_server::MockServer;
pub use script_driver::{Recorded, Recorder, ScriptDriver};
