use super::*;

#[yare::parameterized(
    shell_prompt         = { "> " },
    dollar_prompt        = { "foo@bar:~$ " },
    versioned_banner     = { "claude-cli v1.2.3 ready" },
)]
fn ready_patterns_match(pane: &str) {
    assert_eq!(poll_pane(pane), Readiness::Ready);
}

#[yare::parameterized(
    theme_picker = { "Choose the text style that looks best with your terminal" },
    login_picker = { "Select login method" },
    oauth_paste  = { "Paste code here" },
    empty_pane   = { "" },
)]
fn non_ready_patterns_do_not_match_ready(pane: &str) {
    assert_ne!(poll_pane(pane), Readiness::Ready);
}

#[test]
fn stuck_pattern_is_distinguished_from_dismissible() {
    let stuck = poll_pane("Select login method");
    assert!(matches!(stuck, Readiness::NotReady(r) if r.starts_with("stuck")));

    let dismissible = poll_pane("Choose the text style for your terminal");
    assert!(matches!(dismissible, Readiness::NotReady(r) if r.starts_with("dismissible")));
}

#[test]
fn ansi_color_codes_do_not_defeat_prompt_anchoring() {
    let pane = "\x1b[32m> \x1b[0m";
    assert_eq!(poll_pane(pane), Readiness::Ready);
}

#[test]
fn ansi_codes_do_not_defeat_stuck_pattern_matching() {
    let pane = "\x1b[1mSelect login \x1b[0mmethod";
    assert!(matches!(poll_pane(pane), Readiness::NotReady(r) if r.starts_with("stuck")));
}
