// SPDX-License-Identifier: MIT

use super::*;
use crate::logger::Level;

#[test]
fn fake_logger_records_calls_in_order() {
    let logger = FakeLogger::new();
    logger.info("starting");
    logger.warn("slow");
    logger.error("boom");
    logger.debug("detail");

    let calls = logger.calls();
    assert_eq!(
        calls,
        vec![
            (Level::Info, "starting".to_string()),
            (Level::Warn, "slow".to_string()),
            (Level::Error, "boom".to_string()),
            (Level::Debug, "detail".to_string()),
        ]
    );
}

#[test]
fn tracing_logger_does_not_panic() {
    let logger = TracingLogger;
    logger.info("hello");
    logger.warn("hello");
    logger.error("hello");
    logger.debug("hello");
}
