//! Style and geometry provider seam.
//!
//! The engine does no layout of its own. Effective style and bounding boxes
//! come from a [`StyleProvider`]: a live browser bridge, or the
//! [`SnapshotProvider`] backed by declarations loaded from a snapshot file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeId};
use crate::error::ProviderError;

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Bounding box for an element, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if this box overlaps `[0,0]-[width,height]` of the viewport.
    ///
    /// Touching an edge does not count: a box whose bottom is exactly 0 is
    /// off-screen.
    pub fn is_visible_in_viewport(&self, viewport: &ViewportInfo) -> bool {
        !(self.top() >= f64::from(viewport.height)
            || self.bottom() <= 0.0
            || self.left() >= f64::from(viewport.width)
            || self.right() <= 0.0)
    }

    /// `x,y,w,h` rounded to integers.
    pub fn to_pos_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.x.round() as i64,
            self.y.round() as i64,
            self.width.round() as i64,
            self.height.round() as i64
        )
    }
}

/// Effective style properties the visibility check needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    /// `display: none`, `visibility: hidden`, or `opacity: 0`.
    ///
    /// Only the exact value `hidden` counts; `collapse` is left to the
    /// provider, which reports it as `hidden` where the element really
    /// disappears.
    pub fn is_hidden(&self) -> bool {
        self.display == "none" || self.visibility == "hidden" || self.opacity == 0.0
    }
}

/// Source of effective style and geometry for elements.
///
/// Calls are synchronous; an `Err` means the provider could not answer for
/// that node (for example it was detached), and the caller decides how to
/// degrade.
pub trait StyleProvider {
    fn computed_style(&self, doc: &Document, node: NodeId) -> Result<ComputedStyle, ProviderError>;

    fn bounding_rect(&self, doc: &Document, node: NodeId) -> Result<BoundingBox, ProviderError>;

    fn viewport(&self) -> ViewportInfo;
}

/// Style properties declared on an element. Missing values fall back to
/// user-agent defaults or inheritance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl StyleDecl {
    pub fn is_empty(&self) -> bool {
        self.display.is_none() && self.visibility.is_none() && self.opacity.is_none()
    }
}

/// Tags the user-agent stylesheet hides.
const UA_HIDDEN_TAGS: [&str; 8] = [
    "head", "script", "style", "template", "noscript", "meta", "link", "title",
];

/// Provider backed by per-element declarations.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    viewport: ViewportInfo,
    styles: HashMap<NodeId, StyleDecl>,
    rects: HashMap<NodeId, BoundingBox>,
}

impl SnapshotProvider {
    pub fn new(viewport: ViewportInfo) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn set_viewport(&mut self, viewport: ViewportInfo) {
        self.viewport = viewport;
    }

    pub fn set_style(&mut self, node: NodeId, style: StyleDecl) {
        self.styles.insert(node, style);
    }

    pub fn set_rect(&mut self, node: NodeId, rect: BoundingBox) {
        self.rects.insert(node, rect);
    }

    pub fn declared_style(&self, node: NodeId) -> Option<&StyleDecl> {
        self.styles.get(&node)
    }

    pub fn declared_rect(&self, node: NodeId) -> Option<&BoundingBox> {
        self.rects.get(&node)
    }

    fn inherited_visibility(&self, doc: &Document, node: NodeId) -> String {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(v) = self.styles.get(&id).and_then(|s| s.visibility.as_ref()) {
                return v.clone();
            }
            current = doc.parent(id);
        }
        "visible".to_string()
    }

    fn check_node(&self, doc: &Document, node: NodeId) -> Result<(), ProviderError> {
        if doc.element(node).is_none() {
            return Err(ProviderError::NotAnElement(node));
        }
        if !doc.is_attached(node) {
            return Err(ProviderError::Detached(node));
        }
        Ok(())
    }
}

impl StyleProvider for SnapshotProvider {
    fn computed_style(&self, doc: &Document, node: NodeId) -> Result<ComputedStyle, ProviderError> {
        self.check_node(doc, node)?;
        let declared = self.styles.get(&node);

        let display = match declared.and_then(|s| s.display.clone()) {
            Some(display) => display,
            None => {
                let tag = doc.element(node).map(|e| e.tag_name.as_str()).unwrap_or("");
                if UA_HIDDEN_TAGS.contains(&tag) {
                    "none".to_string()
                } else {
                    "block".to_string()
                }
            }
        };

        Ok(ComputedStyle {
            display,
            visibility: self.inherited_visibility(doc, node),
            opacity: declared.and_then(|s| s.opacity).unwrap_or(1.0),
        })
    }

    fn bounding_rect(&self, doc: &Document, node: NodeId) -> Result<BoundingBox, ProviderError> {
        self.check_node(doc, node)?;
        self.rects
            .get(&node)
            .copied()
            .ok_or(ProviderError::NoGeometry(node))
    }

    fn viewport(&self) -> ViewportInfo {
        self.viewport
    }
}
