//! Property-based tests for the reconnect backoff schedule.
//!
//! These verify the delay formula for ALL disconnect counts and arbitrary
//! open/close interleavings, not just specific examples.

use std::time::{Duration, Instant};

use banter_client::{Connection, ConnectionAction, ConnectionConfig, ConnectionState};
use banter_proto::ClientFrame;
use proptest::prelude::*;

/// Delay expected after the nth consecutive disconnect (1-based).
fn expected_delay_ms(n: u32) -> u64 {
    (1000u64 << (n - 1)).min(10_000)
}

/// Drive one close → redial cycle and return the scheduled delay.
fn close_and_redial(conn: &mut Connection, t: &mut Instant) -> Duration {
    conn.handle_close(*t);
    let delay = conn.backoff_delay().unwrap();
    *t += delay;
    assert_eq!(conn.tick(*t), vec![ConnectionAction::Dial]);
    delay
}

proptest! {
    /// After the Nth consecutive disconnect the scheduled delay is
    /// `min(1000 * 2^(N-1), 10000)` milliseconds.
    #[test]
    fn consecutive_disconnects_follow_the_formula(count in 1u32..10) {
        let mut conn = Connection::new(ConnectionConfig::default());
        let mut t = Instant::now();

        for n in 1..=count {
            let delay = close_and_redial(&mut conn, &mut t);
            prop_assert_eq!(delay, Duration::from_millis(expected_delay_ms(n)));
        }
    }

    /// An open anywhere in the sequence resets the schedule: the next
    /// disconnect starts over at the floor.
    #[test]
    fn open_resets_the_schedule(before in 1u32..8, after in 1u32..8) {
        let mut conn = Connection::new(ConnectionConfig::default());
        let mut t = Instant::now();

        for _ in 0..before {
            close_and_redial(&mut conn, &mut t);
        }

        conn.handle_open(t);

        for n in 1..=after {
            let delay = close_and_redial(&mut conn, &mut t);
            prop_assert_eq!(delay, Duration::from_millis(expected_delay_ms(n)));
        }
    }

    /// The scheduled delay never leaves the [floor, ceiling] range, no
    /// matter how opens and closes interleave.
    #[test]
    fn delay_stays_within_bounds(events in prop::collection::vec(any::<bool>(), 1..40)) {
        let mut conn = Connection::new(ConnectionConfig::default());
        let mut t = Instant::now();

        for open in events {
            if open {
                conn.handle_open(t);
            } else if conn.state() != ConnectionState::Closed {
                conn.handle_close(t);
                let delay = conn.backoff_delay().unwrap();
                prop_assert!(delay >= Duration::from_millis(1000));
                prop_assert!(delay <= Duration::from_millis(10_000));
                t += delay;
                prop_assert_eq!(conn.tick(t), vec![ConnectionAction::Dial]);
            }
        }
    }

    /// Sending while not open never yields an action and never changes
    /// state.
    #[test]
    fn transmit_is_gated_on_open(open in any::<bool>()) {
        let mut conn = Connection::new(ConnectionConfig::default());
        let t = Instant::now();

        if open {
            conn.handle_open(t);
            prop_assert!(conn.transmit(ClientFrame::Ping).is_some());
        } else {
            conn.handle_close(t);
            let state = conn.state();
            prop_assert!(conn.transmit(ClientFrame::Ping).is_none());
            prop_assert_eq!(conn.state(), state);
        }
    }
}
