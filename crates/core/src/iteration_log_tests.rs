use super::*;

#[test]
fn formats_with_reason() {
    let event = IterationEvent::new(
        Utc::now(),
        IterationEventKind::Fatal,
        2,
        Some("compaction detected, killing"),
    );
    let line = event.to_string();
    assert!(line.contains("[FATAL] iteration 2 -- compaction detected, killing"));
}

#[test]
fn formats_without_reason() {
    let event = IterationEvent::new(Utc::now(), IterationEventKind::Done, 1, None::<String>);
    let line = event.to_string();
    assert!(line.contains("[DONE] iteration 1"));
    assert!(!line.contains("--"));
}
