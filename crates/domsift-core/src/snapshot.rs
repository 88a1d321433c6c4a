//! JSON document snapshots.
//!
//! A snapshot is a serialized document together with the declared style and
//! geometry of each element. It lets the engine run without a live browser,
//! and writing the annotated document back keeps identifiers stable across
//! runs the same way they are kept on a live page.
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 720 },
//!   "root": {
//!     "tag": "body",
//!     "attributes": { "class": "page" },
//!     "style": { "display": "block" },
//!     "rect": { "x": 0, "y": 0, "width": 1280, "height": 2000 },
//!     "children": [ { "text": "Hello" }, { "comment": "skipped" } ]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{Document, NodeData, NodeId};
use crate::error::SnapshotError;
use crate::provider::{BoundingBox, SnapshotProvider, StyleDecl, StyleProvider, ViewportInfo};

/// Deepest element nesting a snapshot may carry, root included. Matches the
/// tree depth limit of the HTML parser.
pub const MAX_SNAPSHOT_DEPTH: usize = 512;

/// Element at depth `d` sits at JSON depth `2d`; its children array and a
/// text child add two more levels.
const MAX_JSON_DEPTH: usize = 2 * MAX_SNAPSHOT_DEPTH + 2;

/// Top-level snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportInfo>,
    pub root: SnapshotNode,
}

/// One node of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Element(ElementSnapshot),
    Text { text: String },
    Comment { comment: String },
}

/// An element with its declared style and geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "StyleDecl::is_empty")]
    pub style: StyleDecl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

fn too_deep() -> SnapshotError {
    SnapshotError::InvalidNode(format!(
        "element nesting exceeds {} levels",
        MAX_SNAPSHOT_DEPTH
    ))
}

/// Deepest `{`/`[` nesting in `json`, ignoring brackets inside strings.
/// Stops counting once `limit` is passed.
fn json_nesting_exceeds(json: &str, limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for b in json.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Snapshot loading and saving.
pub struct Snapshot;

impl Snapshot {
    /// Parse a snapshot, using the default viewport when none is declared.
    pub fn parse(json: &str) -> Result<(Document, SnapshotProvider), SnapshotError> {
        Self::parse_with_viewport(json, ViewportInfo::default())
    }

    /// Parse a snapshot, using `fallback` when it declares no viewport.
    ///
    /// serde_json's recursion limit is lifted and decoding runs on a
    /// growable stack; nesting is bounded by [`MAX_SNAPSHOT_DEPTH`] instead.
    pub fn parse_with_viewport(
        json: &str,
        fallback: ViewportInfo,
    ) -> Result<(Document, SnapshotProvider), SnapshotError> {
        if json_nesting_exceeds(json, MAX_JSON_DEPTH) {
            return Err(too_deep());
        }
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let file = SnapshotFile::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Self::build(file, fallback)
    }

    pub fn load(
        path: &Path,
        fallback: ViewportInfo,
    ) -> Result<(Document, SnapshotProvider), SnapshotError> {
        let content = fs::read_to_string(path)?;
        Self::parse_with_viewport(&content, fallback)
    }

    /// Build a document and provider from a decoded snapshot.
    ///
    /// Children are moved out of each node as it is visited, so the decoded
    /// tree is torn down iteratively too.
    pub fn build(
        file: SnapshotFile,
        fallback: ViewportInfo,
    ) -> Result<(Document, SnapshotProvider), SnapshotError> {
        let SnapshotNode::Element(mut root) = file.root else {
            return Err(SnapshotError::InvalidNode(
                "snapshot root must be an element".to_string(),
            ));
        };

        let mut doc = Document::new(root.tag.as_str());
        let mut provider = SnapshotProvider::new(file.viewport.unwrap_or(fallback));
        let root_id = doc.root();
        Self::apply_element(&mut doc, &mut provider, root_id, &root)?;

        let mut stack: Vec<(SnapshotNode, NodeId, usize)> = std::mem::take(&mut root.children)
            .into_iter()
            .rev()
            .map(|c| (c, root_id, 2))
            .collect();
        while let Some((node, parent, depth)) = stack.pop() {
            match node {
                SnapshotNode::Element(mut el) => {
                    if depth > MAX_SNAPSHOT_DEPTH {
                        return Err(too_deep());
                    }
                    let id = doc.append_element(parent, el.tag.as_str());
                    Self::apply_element(&mut doc, &mut provider, id, &el)?;
                    stack.extend(
                        std::mem::take(&mut el.children)
                            .into_iter()
                            .rev()
                            .map(|c| (c, id, depth + 1)),
                    );
                }
                SnapshotNode::Text { text } => {
                    doc.append_text(parent, text);
                }
                SnapshotNode::Comment { comment } => {
                    doc.append_comment(parent, comment);
                }
            }
        }

        debug!(nodes = doc.len(), "snapshot loaded");
        Ok((doc, provider))
    }

    fn apply_element(
        doc: &mut Document,
        provider: &mut SnapshotProvider,
        id: NodeId,
        el: &ElementSnapshot,
    ) -> Result<(), SnapshotError> {
        if el.tag.trim().is_empty() {
            return Err(SnapshotError::InvalidNode("element with empty tag".to_string()));
        }
        for (name, value) in &el.attributes {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(SnapshotError::InvalidNode(format!(
                        "attribute '{}' on <{}> has unsupported value {}",
                        name, el.tag, other
                    )));
                }
            };
            doc.set_attribute(id, name.as_str(), value);
        }
        if !el.style.is_empty() {
            provider.set_style(id, el.style.clone());
        }
        if let Some(rect) = el.rect {
            provider.set_rect(id, rect);
        }
        Ok(())
    }

    /// Serialize the document (identifiers included) with its declared
    /// style and geometry. Detached subtrees are not written.
    ///
    /// Nodes are collected in pre-order and assembled bottom-up, so no
    /// recursion follows the document depth.
    pub fn export(
        doc: &Document,
        provider: &SnapshotProvider,
    ) -> Result<SnapshotFile, SnapshotError> {
        let mut order = Vec::new();
        let mut stack = vec![(doc.root(), 1usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_SNAPSHOT_DEPTH && doc.element(node).is_some() {
                return Err(too_deep());
            }
            order.push(node);
            stack.extend(doc.children(node).iter().rev().map(|&c| (c, depth + 1)));
        }

        let mut built: HashMap<NodeId, SnapshotNode> = HashMap::with_capacity(order.len());
        for &node in order.iter().rev() {
            let snapshot = match doc.data(node) {
                Some(NodeData::Element(el)) => SnapshotNode::Element(ElementSnapshot {
                    tag: el.tag_name.clone(),
                    attributes: el
                        .attributes
                        .iter()
                        .map(|a| (a.name.clone(), Value::String(a.value.clone())))
                        .collect(),
                    style: provider.declared_style(node).cloned().unwrap_or_default(),
                    rect: provider.declared_rect(node).copied(),
                    children: doc
                        .children(node)
                        .iter()
                        .filter_map(|child| built.remove(child))
                        .collect(),
                }),
                Some(NodeData::Text(text)) => SnapshotNode::Text { text: text.clone() },
                Some(NodeData::Comment(comment)) => SnapshotNode::Comment {
                    comment: comment.clone(),
                },
                None => continue,
            };
            built.insert(node, snapshot);
        }

        let root = built
            .remove(&doc.root())
            .ok_or_else(|| SnapshotError::InvalidNode("document has no root".to_string()))?;
        Ok(SnapshotFile {
            viewport: Some(provider.viewport()),
            root,
        })
    }

    pub fn to_json(doc: &Document, provider: &SnapshotProvider) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&Self::export(doc, provider)?)?)
    }

    pub fn save(
        path: &Path,
        doc: &Document,
        provider: &SnapshotProvider,
    ) -> Result<(), SnapshotError> {
        fs::write(path, Self::to_json(doc, provider)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "viewport": { "width": 640, "height": 480 },
        "root": {
            "tag": "BODY",
            "children": [
                { "tag": "div", "attributes": { "class": "wrap", "tabindex": 0, "hidden": false },
                  "style": { "opacity": 0.5 },
                  "rect": { "x": 1, "y": 2, "width": 3, "height": 4 },
                  "children": [ { "text": "Hello" } ] },
                { "comment": "note" }
            ]
        }
    }"#;

    #[test]
    fn test_parse_builds_document() {
        let (doc, provider) = Snapshot::parse(PAGE).unwrap();
        let root = doc.root();
        assert_eq!(doc.element(root).unwrap().tag_name, "body");
        assert_eq!(doc.children(root).len(), 2);

        let div = doc.children(root)[0];
        let el = doc.element(div).unwrap();
        let names: Vec<_> = el.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["class", "tabindex", "hidden"]);
        assert_eq!(el.attribute("tabindex"), Some("0"));
        assert_eq!(el.attribute("hidden"), Some("false"));

        assert_eq!(provider.viewport(), ViewportInfo { width: 640, height: 480 });
        assert_eq!(provider.computed_style(&doc, div).unwrap().opacity, 0.5);
        assert_eq!(
            provider.bounding_rect(&doc, div).unwrap(),
            BoundingBox::new(1.0, 2.0, 3.0, 4.0)
        );
        assert!(matches!(doc.data(doc.children(root)[1]), Some(NodeData::Comment(_))));
    }

    #[test]
    fn test_missing_viewport_uses_fallback() {
        let fallback = ViewportInfo {
            width: 100,
            height: 50,
        };
        let (_, provider) =
            Snapshot::parse_with_viewport(r#"{ "root": { "tag": "body" } }"#, fallback).unwrap();
        assert_eq!(provider.viewport(), fallback);
    }

    #[test]
    fn test_invalid_snapshots() {
        assert!(matches!(
            Snapshot::parse(r#"{ "root": { "text": "x" } }"#),
            Err(SnapshotError::InvalidNode(_))
        ));
        assert!(matches!(
            Snapshot::parse(r#"{ "root": { "tag": "body", "attributes": { "a": [1] } } }"#),
            Err(SnapshotError::InvalidNode(_))
        ));
        assert!(matches!(
            Snapshot::parse(r#"{ "root": { "tag": "" } }"#),
            Err(SnapshotError::InvalidNode(_))
        ));
        assert!(matches!(
            Snapshot::parse(r#"{ "root": { "bogus": 1 } }"#),
            Err(SnapshotError::Json(_))
        ));
        assert!(matches!(Snapshot::parse("not json"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_export_keeps_annotations() {
        let (mut doc, provider) = Snapshot::parse(PAGE).unwrap();
        let div = doc.children(doc.root())[0];
        doc.set_attribute(div, "data-dsid", "7");

        let json = Snapshot::to_json(&doc, &provider).unwrap();
        let (reloaded, reloaded_provider) = Snapshot::parse(&json).unwrap();
        let div = reloaded.children(reloaded.root())[0];
        assert_eq!(reloaded.attribute(div, "data-dsid"), Some("7"));
        assert_eq!(reloaded_provider.declared_style(div).unwrap().opacity, Some(0.5));
        assert_eq!(reloaded_provider.viewport().width, 640);
    }

    #[test]
    fn test_save_and_load() {
        let (doc, provider) = Snapshot::parse(PAGE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");

        Snapshot::save(&path, &doc, &provider).unwrap();
        let (loaded, _) = Snapshot::load(&path, ViewportInfo::default()).unwrap();
        assert_eq!(loaded.len(), doc.len());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Snapshot::load(Path::new("/nonexistent/page.json"), ViewportInfo::default());
        assert!(matches!(result, Err(SnapshotError::Io(_))));
    }

    /// `depth` nested `div`s under the root, the innermost holding a button.
    fn nested_json(depth: usize) -> String {
        let mut json = r#"{ "tag": "button", "children": [ { "text": "deep" } ] }"#.to_string();
        for _ in 0..depth {
            json = format!(r#"{{ "tag": "div", "children": [ {} ] }}"#, json);
        }
        format!(r#"{{ "root": {{ "tag": "body", "children": [ {} ] }} }}"#, json)
    }

    #[test]
    fn test_parse_deeply_nested_snapshot() {
        let (mut doc, provider) = Snapshot::parse(&nested_json(200)).unwrap();
        assert_eq!(doc.elements().count(), 202);

        let digest = crate::summarize(&mut doc, &provider, &crate::DigestOptions::default());
        assert_eq!(digest.text, "<button dsid=\"1\">\n  \"deep\"");
    }

    #[test]
    fn test_deep_snapshot_round_trip() {
        let (doc, provider) = Snapshot::parse(&nested_json(300)).unwrap();
        let json = Snapshot::to_json(&doc, &provider).unwrap();
        let (reloaded, _) = Snapshot::parse(&json).unwrap();
        assert_eq!(reloaded.len(), doc.len());
    }

    #[test]
    fn test_nesting_beyond_limit_is_rejected() {
        // Body plus the button already take two levels.
        let at_limit = nested_json(MAX_SNAPSHOT_DEPTH - 2);
        assert!(Snapshot::parse(&at_limit).is_ok());

        let too_deep = nested_json(MAX_SNAPSHOT_DEPTH - 1);
        assert!(matches!(
            Snapshot::parse(&too_deep),
            Err(SnapshotError::InvalidNode(_))
        ));

        let far_too_deep = nested_json(5_000);
        assert!(matches!(
            Snapshot::parse(&far_too_deep),
            Err(SnapshotError::InvalidNode(_))
        ));
    }

    #[test]
    fn test_export_rejects_too_deep_document() {
        let mut doc = Document::new("body");
        let mut parent = doc.root();
        for _ in 0..MAX_SNAPSHOT_DEPTH {
            parent = doc.append_element(parent, "div");
        }
        let provider = SnapshotProvider::default();
        assert!(matches!(
            Snapshot::export(&doc, &provider),
            Err(SnapshotError::InvalidNode(_))
        ));
    }

    #[test]
    fn test_brackets_inside_strings_do_not_count() {
        let json = r#"{ "root": { "tag": "body", "children": [ { "text": "[[[{{{\"]]" } ] } }"#;
        assert!(!json_nesting_exceeds(json, 4));
        let (doc, _) = Snapshot::parse(json).unwrap();
        assert_eq!(doc.len(), 2);
    }
}
