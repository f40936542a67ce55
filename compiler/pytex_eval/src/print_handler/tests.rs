#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn capture_keeps_writes_verbatim() {
    let handler = capture_handler();
    handler.write("a");
    handler.write("");
    handler.write("b\n\n");
    assert!(handler.is_capturing());
    assert_eq!(handler.captured(), "ab\n\n");
}

#[test]
fn take_captured_drains() {
    let handler = capture_handler();
    handler.write("first");
    assert_eq!(handler.take_captured(), "first");
    assert_eq!(handler.captured(), "");
    handler.write("second");
    assert_eq!(handler.take_captured(), "second");
}

#[test]
fn non_capturing_handlers_report_nothing() {
    for handler in [stdout_handler(), silent_handler()] {
        assert!(!handler.is_capturing());
        assert_eq!(handler.take_captured(), "");
    }
    let silent = silent_handler();
    silent.write("dropped");
    assert_eq!(silent.captured(), "");
}

#[test]
fn capture_is_shared_across_clones() {
    let handler = capture_handler();
    let writer = Arc::clone(&handler);
    let thread = std::thread::spawn(move || {
        for _ in 0..50 {
            writer.write("x");
        }
    });
    thread.join().unwrap();
    assert_eq!(handler.captured().len(), 50);
}
