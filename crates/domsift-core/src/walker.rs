//! Flattening tree walker.
//!
//! One pre-order pass from the content root. Interesting elements become
//! `TagOpen` lines and push their children one level deeper; every other
//! element is transparent and its children stay at the current depth.
//! Hidden, off-screen and unanswerable elements are pruned with their whole
//! subtree before anything below them is looked at.

use tracing::debug;

use crate::allocator::IdAllocator;
use crate::classifier::is_interesting;
use crate::document::{Document, ElementData, NodeData, NodeId};
use crate::filter::{ElementFilter, FilterConfig, Verdict};
use crate::provider::{BoundingBox, StyleProvider};

/// Default maximum length of a single text line, in characters.
pub const DEFAULT_TEXT_LIMIT: usize = 100;

const ELLIPSIS: &str = "...";

/// Kind of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    TagOpen,
    Text,
}

/// One line of the digest.
///
/// For `TagOpen` lines `content` is the full `<tag ...>` token. For `Text`
/// lines it is the bare text; quotes are added by [`OutputLine::rendered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub depth: usize,
    pub kind: LineKind,
    pub content: String,
}

impl OutputLine {
    pub fn tag(depth: usize, content: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::TagOpen,
            content: content.into(),
        }
    }

    pub fn text(depth: usize, content: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::Text,
            content: content.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == LineKind::Text
    }

    /// Line content without indentation.
    pub fn rendered(&self) -> String {
        match self.kind {
            LineKind::TagOpen => self.content.clone(),
            LineKind::Text => format!("\"{}\"", self.content),
        }
    }
}

/// Counters collected during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub elements_visited: usize,
    pub pruned_hidden: usize,
    pub pruned_offscreen: usize,
    pub provider_failures: usize,
    pub lines_emitted: usize,
    pub ids_assigned: usize,
}

/// Walks a document and produces the raw (unmerged) line sequence.
pub struct TreeWalker<'a, P: StyleProvider + ?Sized> {
    filter: ElementFilter<'a, P>,
    config: FilterConfig,
    text_limit: usize,
}

impl<'a, P: StyleProvider + ?Sized> TreeWalker<'a, P> {
    pub fn new(provider: &'a P, config: FilterConfig) -> Self {
        Self {
            filter: ElementFilter::new(provider, config),
            config,
            text_limit: DEFAULT_TEXT_LIMIT,
        }
    }

    pub fn with_text_limit(mut self, limit: usize) -> Self {
        self.text_limit = limit;
        self
    }

    /// Walk from `start` at depth 0.
    ///
    /// Uses an explicit stack of `(node, depth)` so deep documents cannot
    /// overflow the call stack. Children are pushed in reverse so they pop in
    /// document order.
    pub fn walk(
        &self,
        doc: &mut Document,
        start: NodeId,
        alloc: &mut IdAllocator,
    ) -> (Vec<OutputLine>, WalkStats) {
        let mut lines = Vec::new();
        let mut stats = WalkStats::default();
        let assigned_before = alloc.assigned().len();
        let mut stack = vec![(start, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            match doc.data(node) {
                Some(NodeData::Text(text)) => {
                    if let Some(text) = self.clip_text(text) {
                        lines.push(OutputLine::text(depth, text));
                    }
                    continue;
                }
                Some(NodeData::Element(_)) => {}
                Some(NodeData::Comment(_)) | None => continue,
            }

            stats.elements_visited += 1;
            let rect = match self.filter.check(doc, node) {
                Verdict::Keep(rect) => rect,
                Verdict::Hidden => {
                    stats.pruned_hidden += 1;
                    continue;
                }
                Verdict::Offscreen => {
                    stats.pruned_offscreen += 1;
                    continue;
                }
                Verdict::Unavailable => {
                    stats.provider_failures += 1;
                    continue;
                }
            };

            let child_depth = if doc.element(node).is_some_and(is_interesting) {
                let id = alloc.ensure(doc, node);
                if let Some(element) = doc.element(node) {
                    lines.push(OutputLine::tag(depth, self.open_tag(element, id, rect)));
                }
                depth + 1
            } else {
                depth
            };

            stack.extend(
                doc.children(node)
                    .iter()
                    .rev()
                    .map(|&child| (child, child_depth)),
            );
        }

        stats.lines_emitted = lines.len();
        stats.ids_assigned = alloc.assigned().len() - assigned_before;
        debug!(
            visited = stats.elements_visited,
            hidden = stats.pruned_hidden,
            offscreen = stats.pruned_offscreen,
            failures = stats.provider_failures,
            lines = stats.lines_emitted,
            assigned = stats.ids_assigned,
            "walk complete"
        );
        (lines, stats)
    }

    /// Render the `<tag dsid="N" ...>` token for an interesting element.
    /// `dsid` is left out only when no identifier could be allocated.
    fn open_tag(
        &self,
        element: &ElementData,
        id: Option<u64>,
        rect: Option<BoundingBox>,
    ) -> String {
        let mut out = format!("<{}", element.tag_name);
        if let Some(id) = id {
            out.push_str(&format!(" dsid=\"{}\"", id));
        }

        match element.tag_name.as_str() {
            "input" => {
                let input_type = element.attribute("type").unwrap_or("text");
                out.push_str(&format!(" type=\"{}\"", input_type));
            }
            "option" => {
                if let Some(value) = element.attribute("value") {
                    out.push_str(&format!(" value=\"{}\"", value));
                }
                if element
                    .attribute("selected")
                    .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
                {
                    out.push_str(" selected=\"true\"");
                }
            }
            _ => {}
        }

        if self.config.include_position() {
            if let Some(rect) = rect {
                out.push_str(&format!(" pos=\"{}\"", rect.to_pos_string()));
            }
        }

        out.push('>');
        out
    }

    /// Trim, collapse whitespace runs and truncate. `None` for blank text.
    fn clip_text(&self, raw: &str) -> Option<String> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }
        if collapsed.chars().count() <= self.text_limit {
            return Some(collapsed);
        }
        let mut clipped: String = collapsed.chars().take(self.text_limit).collect();
        clipped.push_str(ELLIPSIS);
        Some(clipped)
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
