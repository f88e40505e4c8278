use super::*;
use std::collections::BTreeMap;

fn base_record() -> WorkerRecord {
    WorkerRecord {
        name: "w1".into(),
        status: WorkerStatus::Running,
        cmd: vec!["echo".into(), "hi".into()],
        started_at: Utc::now(),
        cwd: PathBuf::from("/tmp"),
        env: BTreeMap::new(),
        tags: Default::default(),
        tmux: None,
        worktree: None,
        pid: Some(123),
        metadata: BTreeMap::new(),
    }
}

#[test]
fn running_with_pid_is_valid() {
    assert!(base_record().check_invariants().is_ok());
}

#[test]
fn running_with_neither_tmux_nor_pid_is_invalid() {
    let mut r = base_record();
    r.pid = None;
    assert!(r.check_invariants().is_err());
}

#[test]
fn running_with_both_tmux_and_pid_is_invalid() {
    let mut r = base_record();
    r.tmux = Some(TmuxTarget { session: "s".into(), window: "w".into(), socket: None });
    assert!(r.check_invariants().is_err());
}

#[test]
fn stopped_worker_may_have_neither() {
    let mut r = base_record();
    r.status = WorkerStatus::Stopped;
    r.pid = None;
    assert!(r.check_invariants().is_ok());
}

#[test]
fn worktree_must_be_sibling_of_base_repo() {
    let mut r = base_record();
    r.worktree = Some(WorktreeInfo {
        path: PathBuf::from("/repo-worktrees/w1"),
        branch: "feat/a".into(),
        base_repo: PathBuf::from("/repo"),
    });
    assert!(r.check_invariants().is_ok());
}

#[test]
fn worktree_pointing_at_base_repo_itself_is_rejected() {
    let mut r = base_record();
    r.worktree = Some(WorktreeInfo {
        path: PathBuf::from("/repo"),
        branch: "feat/a".into(),
        base_repo: PathBuf::from("/repo"),
    });
    assert!(r.check_invariants().is_err());
}

#[test]
fn is_ralph_reads_metadata_flag() {
    let mut r = base_record();
    assert!(!r.is_ralph());
    r.metadata.insert("ralph".into(), serde_json::Value::Bool(true));
    assert!(r.is_ralph());
}

#[test]
fn record_round_trips_through_json() {
    let r = base_record();
    let json = serde_json::to_string(&r).unwrap();
    let back: WorkerRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(r, back);
}
