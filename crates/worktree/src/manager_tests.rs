use super::*;
use std::process::Command;

fn git_available() -> bool {
    Command::new("git").arg("--version").output().map(|o| o.status.success()).unwrap_or(false)
}

fn init_repo(dir: &Path) {
    git::run("init", dir, &["init", "-q", "-b", "main"]).unwrap();
    git::run("config", dir, &["config", "user.email", "swarm@example.com"]).unwrap();
    git::run("config", dir, &["config", "user.name", "swarm"]).unwrap();
    std::fs::write(dir.join("README.md"), b"hi").unwrap();
    git::run("add", dir, &["add", "."]).unwrap();
    git::run("commit", dir, &["commit", "-q", "-m", "initial"]).unwrap();
}

#[test]
fn create_then_remove_round_trip() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo_dir = tempfile::tempdir().unwrap();
    init_repo(repo_dir.path());

    let worktree_path = repo_dir.path().join("..").join("w1-worktree");
    let worktree_path = std::path::absolute(&worktree_path).unwrap_or(worktree_path);

    create(&worktree_path, "feat/a", repo_dir.path()).unwrap();
    assert!(worktree_path.join(".git").is_file());
    assert!(!is_dirty(&worktree_path).unwrap());

    remove(&worktree_path, false).unwrap();
    assert!(!worktree_path.exists());
}

#[test]
fn create_fails_when_path_already_exists() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo_dir = tempfile::tempdir().unwrap();
    init_repo(repo_dir.path());

    let existing = tempfile::tempdir().unwrap();
    let err = create(existing.path(), "feat/b", repo_dir.path()).unwrap_err();
    assert!(matches!(err, WorktreeError::PathExists(_)));
}

#[test]
fn create_fails_on_non_repo_base() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let not_a_repo = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let path = target.path().join("w");
    let err = create(&path, "feat/c", not_a_repo.path()).unwrap_err();
    assert!(matches!(err, WorktreeError::NotAGitRepo(_)));
}

#[test]
fn remove_refuses_main_working_tree() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo_dir = tempfile::tempdir().unwrap();
    init_repo(repo_dir.path());

    let err = remove(repo_dir.path(), true).unwrap_err();
    assert!(matches!(err, WorktreeError::RefusedToDeleteMain(_)));
}

#[test]
fn remove_refuses_dirty_worktree_without_force() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo_dir = tempfile::tempdir().unwrap();
    init_repo(repo_dir.path());

    let worktree_path = repo_dir.path().join("..").join("w2-worktree");
    let worktree_path = std::path::absolute(&worktree_path).unwrap_or(worktree_path);
    create(&worktree_path, "feat/d", repo_dir.path()).unwrap();
    std::fs::write(worktree_path.join("scratch.txt"), b"uncommitted").unwrap();

    assert!(is_dirty(&worktree_path).unwrap());
    let err = remove(&worktree_path, false).unwrap_err();
    assert!(matches!(err, WorktreeError::Dirty(_)));

    remove(&worktree_path, true).unwrap();
}
