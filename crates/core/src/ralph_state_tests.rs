use super::*;

#[test]
fn new_starts_at_iteration_one_running() {
    let state = RalphState::new(
        "r1",
        5,
        PathBuf::from("/tmp/prompt.md"),
        Some("/done".into()),
        60,
        InactivityMode::Output,
        None,
        Utc::now(),
    );
    assert_eq!(state.iteration, 1);
    assert_eq!(state.status, RalphStatus::Running);
    assert!(state.check_done_continuous);
}

#[test]
fn check_done_continuous_defaults_false_without_done_pattern() {
    let state = RalphState::new(
        "r1",
        5,
        PathBuf::from("/tmp/prompt.md"),
        None,
        60,
        InactivityMode::Output,
        None,
        Utc::now(),
    );
    assert!(!state.check_done_continuous);
}

#[test]
fn backoff_doubles_and_caps_at_300() {
    assert_eq!(RalphState::backoff_secs(0), 0);
    assert_eq!(RalphState::backoff_secs(1), 1);
    assert_eq!(RalphState::backoff_secs(2), 2);
    assert_eq!(RalphState::backoff_secs(3), 4);
    assert_eq!(RalphState::backoff_secs(4), 8);
    assert_eq!(RalphState::backoff_secs(9), 256);
    assert_eq!(RalphState::backoff_secs(10), 300);
    assert_eq!(RalphState::backoff_secs(20), 300);
}

#[test]
fn state_round_trips_through_json() {
    let state = RalphState::new(
        "r1",
        5,
        PathBuf::from("/tmp/prompt.md"),
        Some("/done".into()),
        60,
        InactivityMode::Both,
        Some(80),
        Utc::now(),
    );
    let json = serde_json::to_string(&state).unwrap();
    let back: RalphState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, "r1");
    assert_eq!(back.max_context, Some(80));
}
