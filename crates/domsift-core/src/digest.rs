//! Engine entry point: scan, walk, merge, render.

use tracing::info;

use crate::allocator::IdAllocator;
use crate::document::Document;
use crate::error::DigestError;
use crate::filter::FilterConfig;
use crate::merger::merge_text_runs;
use crate::provider::StyleProvider;
use crate::render::render;
use crate::walker::{DEFAULT_TEXT_LIMIT, OutputLine, TreeWalker, WalkStats};

/// Options for one digest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    pub filter: FilterConfig,
    /// Maximum characters per text node before truncation.
    pub text_limit: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            text_limit: DEFAULT_TEXT_LIMIT,
        }
    }
}

impl DigestOptions {
    pub fn new(filter: FilterConfig) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn with_text_limit(mut self, text_limit: usize) -> Self {
        self.text_limit = text_limit;
        self
    }
}

/// Result of a digest call.
#[derive(Debug, Clone)]
pub struct Digest {
    /// Lines after text merging.
    pub lines: Vec<OutputLine>,
    /// Rendered, newline-joined output.
    pub text: String,
    pub stats: WalkStats,
    /// Identifiers created during this call, in allocation order.
    pub assigned: Vec<u64>,
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Summarize `doc`, writing identifiers onto newly seen interesting
/// elements.
///
/// Taking `&mut Document` means two digests of the same document can never
/// overlap.
pub fn summarize<P: StyleProvider + ?Sized>(
    doc: &mut Document,
    provider: &P,
    options: &DigestOptions,
) -> Digest {
    let mut alloc = IdAllocator::scan(doc);
    let start = doc.content_root();

    let (raw, stats) = TreeWalker::new(provider, options.filter)
        .with_text_limit(options.text_limit)
        .walk(doc, start, &mut alloc);
    let lines = merge_text_runs(raw);
    let text = render(&lines);

    info!(
        mode = %options.filter.mode(),
        lines = lines.len(),
        assigned = alloc.assigned().len(),
        "digest complete"
    );

    Digest {
        lines,
        text,
        stats,
        assigned: alloc.assigned().to_vec(),
    }
}

/// Like [`summarize`], with options given as positional words
/// (`[all|onscreen] [position]`). Invalid words fail before the document is
/// touched.
pub fn summarize_with_args<P: StyleProvider + ?Sized, S: AsRef<str>>(
    doc: &mut Document,
    provider: &P,
    args: &[S],
) -> Result<Digest, DigestError> {
    let filter = FilterConfig::from_args(args)?;
    Ok(summarize(doc, provider, &DigestOptions::new(filter)))
}
