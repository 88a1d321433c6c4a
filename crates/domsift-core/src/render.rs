//! Digest rendering.

use crate::walker::OutputLine;

const INDENT: &str = "  ";

/// Join lines with `\n`, indenting two spaces per depth level.
pub fn render(lines: &[OutputLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", INDENT.repeat(line.depth), line.rendered()))
        .collect::<Vec<_>>()
        .join("\n")
}
