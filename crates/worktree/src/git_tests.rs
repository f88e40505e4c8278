use super::*;
use std::process::Command;

fn git_available() -> bool {
    Command::new("git").arg("--version").output().map(|o| o.status.success()).unwrap_or(false)
}

fn init_repo(dir: &Path) {
    run("init", dir, &["init", "-q", "-b", "main"]).unwrap();
    run("config", dir, &["config", "user.email", "swarm@example.com"]).unwrap();
    run("config", dir, &["config", "user.name", "swarm"]).unwrap();
    std::fs::write(dir.join("README.md"), b"hi").unwrap();
    run("add", dir, &["add", "."]).unwrap();
    run("commit", dir, &["commit", "-q", "-m", "initial"]).unwrap();
}

#[test]
fn is_inside_work_tree_true_for_repo_false_for_plain_dir() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path());
    assert!(is_inside_work_tree(repo.path()));

    let plain = tempfile::tempdir().unwrap();
    assert!(!is_inside_work_tree(plain.path()));
}

#[test]
fn is_main_working_tree_true_for_repo_root() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path());
    assert!(is_main_working_tree(repo.path()));
}

#[test]
fn repo_root_from_worktree_parses_gitdir_file() {
    let worktree = tempfile::tempdir().unwrap();
    std::fs::write(
        worktree.path().join(".git"),
        b"gitdir: /home/user/project/.git/worktrees/w1\n",
    )
    .unwrap();

    let root = repo_root_from_worktree(worktree.path()).unwrap();
    assert_eq!(root, Path::new("/home/user/project"));
}

#[test]
fn repo_root_from_worktree_none_for_main_checkout() {
    if !git_available() {
        eprintln!("skipping test: git not available");
        return;
    }
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path());
    assert!(repo_root_from_worktree(repo.path()).is_none());
}
