//! Filter configuration and the per-element visibility/viewport check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::document::{Document, NodeId};
use crate::error::DigestError;
use crate::provider::{BoundingBox, StyleProvider, ViewportInfo};

/// Which elements survive the viewport check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// No viewport filtering.
    #[default]
    All,
    /// Drop elements whose bounding box misses the viewport.
    Onscreen,
}

impl FromStr for FilterMode {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "onscreen" => Ok(FilterMode::Onscreen),
            other => Err(DigestError::Config(format!(
                "unknown mode '{}', expected 'all' or 'onscreen'",
                other
            ))),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::All => write!(f, "all"),
            FilterMode::Onscreen => write!(f, "onscreen"),
        }
    }
}

/// Validated filter settings. Position output without onscreen mode cannot
/// be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    mode: FilterMode,
    include_position: bool,
}

impl FilterConfig {
    pub fn new(mode: FilterMode, include_position: bool) -> Result<Self, DigestError> {
        if include_position && mode != FilterMode::Onscreen {
            return Err(DigestError::Config(
                "position output requires onscreen mode".to_string(),
            ));
        }
        Ok(Self {
            mode,
            include_position,
        })
    }

    /// Parse positional option words: `[mode] [position]`.
    ///
    /// No words means `all`. The second word, if present, must be
    /// `position`, and is only accepted after `onscreen`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, DigestError> {
        let mut words = args.iter().map(|s| s.as_ref());
        let mode = match words.next() {
            None => return Ok(Self::default()),
            Some("position") => {
                return Err(DigestError::Config(
                    "position output requires onscreen mode".to_string(),
                ));
            }
            Some(word) => word.parse::<FilterMode>()?,
        };
        let include_position = match words.next() {
            None => false,
            Some("position") => true,
            Some(other) => {
                return Err(DigestError::Config(format!(
                    "unknown option '{}', expected 'position'",
                    other
                )));
            }
        };
        if let Some(extra) = words.next() {
            return Err(DigestError::Config(format!("unexpected option '{}'", extra)));
        }
        Self::new(mode, include_position)
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn include_position(&self) -> bool {
        self.include_position
    }
}

/// Outcome of checking one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Element survives; carries its rectangle when one was fetched.
    Keep(Option<BoundingBox>),
    /// Hidden by display, visibility or opacity.
    Hidden,
    /// Outside the viewport.
    Offscreen,
    /// Provider could not answer; treated as hidden.
    Unavailable,
}

impl Verdict {
    pub fn is_kept(&self) -> bool {
        matches!(self, Verdict::Keep(_))
    }
}

/// Applies the visibility check and, in onscreen mode, the viewport check.
pub struct ElementFilter<'a, P: StyleProvider + ?Sized> {
    provider: &'a P,
    config: FilterConfig,
    viewport: ViewportInfo,
}

impl<'a, P: StyleProvider + ?Sized> ElementFilter<'a, P> {
    pub fn new(provider: &'a P, config: FilterConfig) -> Self {
        Self {
            provider,
            config,
            viewport: provider.viewport(),
        }
    }

    pub fn check(&self, doc: &Document, node: NodeId) -> Verdict {
        let style = match self.provider.computed_style(doc, node) {
            Ok(style) => style,
            Err(e) => {
                debug!(node = %node, error = %e, "style unavailable, pruning");
                return Verdict::Unavailable;
            }
        };
        if style.is_hidden() {
            trace!(node = %node, "hidden");
            return Verdict::Hidden;
        }

        if self.config.mode() != FilterMode::Onscreen {
            return Verdict::Keep(None);
        }

        let rect = match self.provider.bounding_rect(doc, node) {
            Ok(rect) => rect,
            Err(e) => {
                debug!(node = %node, error = %e, "geometry unavailable, pruning");
                return Verdict::Unavailable;
            }
        };
        if !rect.is_visible_in_viewport(&self.viewport) {
            trace!(node = %node, "offscreen");
            return Verdict::Offscreen;
        }
        Verdict::Keep(Some(rect))
    }
}
