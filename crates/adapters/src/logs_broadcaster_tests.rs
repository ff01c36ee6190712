// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn broadcast_reaches_subscriber() {
    let bus = BroadcastLogsBroadcaster::new(16);
    let mut rx = bus.subscribe();
    bus.broadcast("api", "listening on :8080");

    let (service, line) = rx.try_recv().unwrap();
    assert_eq!(service, "api");
    assert_eq!(line, "listening on :8080");
}

#[test]
fn broadcast_with_no_subscribers_does_not_panic() {
    let bus = BroadcastLogsBroadcaster::new(16);
    bus.broadcast("api", "nobody listening");
}

#[test]
fn noop_broadcaster_discards_silently() {
    let bus = NoopLogsBroadcaster;
    bus.broadcast("api", "discarded");
}

#[test]
fn fake_broadcaster_records_lines_in_order() {
    let fake = FakeLogsBroadcaster::new();
    fake.broadcast("db", "ready");
    fake.broadcast("api", "listening");

    assert_eq!(
        fake.lines(),
        vec![
            ("db".to_string(), "ready".to_string()),
            ("api".to_string(), "listening".to_string()),
        ]
    );
}
