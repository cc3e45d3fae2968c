//! Terminal output for the engine's markdown.

use anyhow::Result;
use termimad::{
    crossterm::style::{Attribute, Color},
    MadSkin,
};

const RED: u8 = 31;
const GREEN: u8 = 32;
const YELLOW: u8 = 33;
const BLUE: u8 = 34;

/// Prints markdown styled with termimad, or verbatim when color is off.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.bold.set_fg(Color::White);
        skin.bold.add_attr(Attribute::Bold);
        skin.italic.set_fg(Color::DarkGrey);
        skin.inline_code.set_fg(Color::Cyan);

        Self { rich_enabled, skin }
    }

    /// Render markdown text to stdout.
    ///
    /// Header lines keep their hash marks so incident and step IDs line up,
    /// and are colored by the status icon they carry. Severity and status
    /// lines are highlighted when they report something urgent.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for line in markdown.lines() {
            match line_color(line) {
                Some(color) => println!("\x1b[{color}m{line}\x1b[0m"),
                None => {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        }
        Ok(())
    }
}

fn line_color(line: &str) -> Option<u8> {
    if line.starts_with('#') {
        return Some(if line.contains('✗') {
            RED
        } else if line.contains('✓') {
            GREEN
        } else if line.contains('➤') {
            YELLOW
        } else {
            BLUE
        });
    }

    let urgent = ["CRITICAL", "Status: failed", "- Error:"];
    urgent
        .iter()
        .any(|marker| line.contains(marker))
        .then_some(RED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
        assert!(renderer.render("# 1. DB timeout\n").is_ok());
    }

    #[test]
    fn test_headers_colored_by_step_outcome() {
        assert_eq!(line_color("### step-1 restart api (✓ Completed)"), Some(GREEN));
        assert_eq!(line_color("### step-2 scale db (✗ Failed)"), Some(RED));
        assert_eq!(line_color("### step-3 notify (➤ In Progress)"), Some(YELLOW));
        assert_eq!(line_color("# 1. DB timeout"), Some(BLUE));
    }

    #[test]
    fn test_urgent_lines_are_highlighted() {
        assert_eq!(line_color("- Severity: CRITICAL"), Some(RED));
        assert_eq!(line_color("- Error: Action failed: boom"), Some(RED));
        assert_eq!(line_color("- Severity: LOW"), None);
    }
}
