// SPDX-License-Identifier: MIT

//! Minimal clap help styling, trimmed from the teacher's fuller color
//! palette to just what `--help` needs.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

const HEADER: u8 = 74;
const LITERAL: u8 = 250;
const PLACEHOLDER: u8 = 245;

fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(PLACEHOLDER)))))
}
