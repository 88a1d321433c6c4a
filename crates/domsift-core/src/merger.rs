//! Adjacent-text merging.
//!
//! After flattening, sibling text fragments from different wrappers can end
//! up next to each other at the same depth; they read as one phrase.

use crate::walker::OutputLine;

/// Coalesce runs of consecutive same-depth text lines, joined by a space.
///
/// A tag line or a depth change ends a run. Tag lines pass through untouched.
pub fn merge_text_runs(lines: Vec<OutputLine>) -> Vec<OutputLine> {
    let mut merged: Vec<OutputLine> = Vec::with_capacity(lines.len());

    for line in lines {
        if let Some(last) = merged.last_mut() {
            if line.is_text() && last.is_text() && last.depth == line.depth {
                last.content.push(' ');
                last.content.push_str(&line.content);
                continue;
            }
        }
        merged.push(line);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_same_depth_run() {
        let lines = vec![
            OutputLine::text(0, "Hello"),
            OutputLine::text(0, "World"),
            OutputLine::text(0, "again"),
        ];
        assert_eq!(
            merge_text_runs(lines),
            vec![OutputLine::text(0, "Hello World again")]
        );
    }

    #[test]
    fn test_tag_line_breaks_run() {
        let lines = vec![
            OutputLine::text(0, "before"),
            OutputLine::tag(0, "<a dsid=\"1\">"),
            OutputLine::text(0, "after"),
        ];
        assert_eq!(merge_text_runs(lines.clone()), lines);
    }

    #[test]
    fn test_depth_change_breaks_run() {
        let lines = vec![
            OutputLine::tag(0, "<button dsid=\"1\">"),
            OutputLine::text(1, "Save"),
            OutputLine::text(0, "Hello"),
            OutputLine::text(0, "World"),
        ];
        assert_eq!(
            merge_text_runs(lines),
            vec![
                OutputLine::tag(0, "<button dsid=\"1\">"),
                OutputLine::text(1, "Save"),
                OutputLine::text(0, "Hello World"),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_text_runs(Vec::new()).is_empty());
    }
}
