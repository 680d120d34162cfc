//! Fuzz target for the connection lifecycle state machine.
//!
//! Arbitrary open/close/tick/transmit interleavings with arbitrary time
//! deltas must never panic, and the scheduled backoff must stay within the
//! configured bounds.

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use banter_client::{Connection, ConnectionConfig};
use banter_proto::ClientFrame;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Open,
    Close,
    Tick { advance_ms: u16 },
    Transmit,
}

fuzz_target!(|ops: Vec<Op>| {
    let config = ConnectionConfig::default();
    let floor = config.reconnect_floor;
    let ceiling = config.reconnect_ceiling;

    let mut conn = Connection::new(config);
    let mut now = Instant::now();

    for op in ops {
        match op {
            Op::Open => conn.handle_open(now),
            Op::Close => conn.handle_close(now),
            Op::Tick { advance_ms } => {
                now += Duration::from_millis(u64::from(advance_ms));
                let _ = conn.tick(now);
            },
            Op::Transmit => {
                let gated = conn.transmit(ClientFrame::Ping);
                assert_eq!(gated.is_some(), conn.is_open());
            },
        }

        if let Some(delay) = conn.backoff_delay() {
            assert!(delay >= floor && delay <= ceiling);
        }
    }
});
