//! Compact digests of live DOM trees.
//!
//! Given a document and a source of computed style and geometry, produces an
//! indented text outline of the page that keeps only what matters to an
//! automated reader: interactive elements and the text around them.
//!
//! ## Pipeline
//!
//! ```text
//! scan ids ──► walk (filter, classify, allocate) ──► merge text ──► render
//! ```
//!
//! - Interactive elements (`input`, `textarea`, `select`, `button`, `a`,
//!   `option`, or anything with an inline `on*` handler) become
//!   `<tag dsid="N" ...>` lines.
//! - Other elements are flattened away: their children are emitted at the
//!   depth the wrapper would have occupied.
//! - Hidden elements, and in `onscreen` mode off-viewport elements, are
//!   pruned together with their subtree.
//! - Identifiers are stored on the elements in the `data-dsid` attribute,
//!   so they stay stable across calls on the same live document.
//!
//! ## Example output
//!
//! ```text
//! <button dsid="1">
//!   "Save"
//! "Hello World"
//! ```

mod allocator;
mod classifier;
mod digest;
mod document;
mod error;
mod filter;
mod merger;
mod provider;
mod render;
mod snapshot;
mod walker;

pub use allocator::{ID_ATTRIBUTE, IdAllocator, MAX_ID, parse_id};
pub use classifier::{INTERACTIVE_TAGS, has_inline_handler, is_interesting};
pub use digest::{Digest, DigestOptions, summarize, summarize_with_args};
pub use document::{Attribute, Descendants, Document, ElementData, NodeData, NodeId};
pub use error::{DigestError, ProviderError, SnapshotError};
pub use filter::{ElementFilter, FilterConfig, FilterMode, Verdict};
pub use merger::merge_text_runs;
pub use provider::{
    BoundingBox, ComputedStyle, SnapshotProvider, StyleDecl, StyleProvider, ViewportInfo,
};
pub use render::render;
pub use snapshot::{ElementSnapshot, MAX_SNAPSHOT_DEPTH, Snapshot, SnapshotFile, SnapshotNode};
pub use walker::{DEFAULT_TEXT_LIMIT, LineKind, OutputLine, TreeWalker, WalkStats};
