//! Stable identifier allocation.
//!
//! Identifiers live on the elements themselves, in [`ID_ATTRIBUTE`]. The
//! allocator holds no state between calls: each digest rebuilds the counter
//! by scanning the document, so the next identifier is always strictly
//! greater than anything already present.

use std::collections::HashMap;

use tracing::warn;

use crate::document::{Document, NodeId};

/// Attribute that carries an element's identifier.
pub const ID_ATTRIBUTE: &str = "data-dsid";

/// Largest identifier a script can read back exactly
/// (`Number.MAX_SAFE_INTEGER`). Larger values are treated as invalid.
pub const MAX_ID: u64 = (1 << 53) - 1;

/// Parse an identifier attribute value. Only integers in `1..=MAX_ID` count.
pub fn parse_id(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| (1..=MAX_ID).contains(id))
}

/// Hands out identifiers for one digest pass.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    /// At most `MAX_ID + 1`; a value past `MAX_ID` means exhausted.
    next: u64,
    /// First attached holder of each identifier, in document order.
    owners: HashMap<u64, NodeId>,
    assigned: Vec<u64>,
}

impl IdAllocator {
    /// Resume numbering after the largest identifier in the document.
    ///
    /// Every element in the arena is scanned, detached ones included, so an
    /// identifier is never handed out twice even if its holder is later
    /// re-attached. Ownership of duplicated identifiers is settled here over
    /// the whole attached tree, so it does not depend on which elements the
    /// walk later finds visible.
    pub fn scan(doc: &Document) -> Self {
        let max = doc
            .elements()
            .filter_map(|(_, el)| el.attribute(ID_ATTRIBUTE).and_then(parse_id))
            .max()
            .unwrap_or(0);

        let mut owners = HashMap::new();
        for node in doc.descendants(doc.root()) {
            if let Some(id) = doc.attribute(node, ID_ATTRIBUTE).and_then(parse_id) {
                owners.entry(id).or_insert(node);
            }
        }

        Self {
            next: max + 1,
            owners,
            assigned: Vec::new(),
        }
    }

    /// The identifier the next new element would receive, or `None` once
    /// the identifier space is used up.
    pub fn next_id(&self) -> Option<u64> {
        (self.next <= MAX_ID).then_some(self.next)
    }

    /// Identifiers created by this allocator, in allocation order.
    pub fn assigned(&self) -> &[u64] {
        &self.assigned
    }

    /// Return the element's identifier, assigning a fresh one if it has
    /// none, an invalid one, or one owned by an earlier element.
    ///
    /// Returns `None` only when a fresh identifier is needed and none is
    /// left; the element is then left untouched.
    pub fn ensure(&mut self, doc: &mut Document, node: NodeId) -> Option<u64> {
        if let Some(existing) = doc.attribute(node, ID_ATTRIBUTE).and_then(parse_id) {
            match self.owners.get(&existing) {
                Some(&owner) if owner != node => {
                    warn!(
                        node = %node,
                        owner = %owner,
                        id = existing,
                        "duplicate identifier, reassigning"
                    );
                }
                _ => return Some(existing),
            }
        }

        let Some(id) = self.next_id() else {
            warn!(node = %node, "identifier space exhausted");
            return None;
        };
        self.next += 1;
        doc.set_attribute(node, ID_ATTRIBUTE, id.to_string());
        self.owners.insert(id, node);
        self.assigned.push(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id(" 12 "), Some(12));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(&MAX_ID.to_string()), Some(MAX_ID));
        assert_eq!(parse_id(&(MAX_ID + 1).to_string()), None);
        assert_eq!(parse_id(&u64::MAX.to_string()), None);
    }

    #[test]
    fn test_scan_empty_document_starts_at_one() {
        let doc = Document::new("body");
        assert_eq!(IdAllocator::scan(&doc).next_id(), Some(1));
    }

    #[test]
    fn test_scan_resumes_after_max() {
        let mut doc = Document::new("body");
        let a = doc.append_element(doc.root(), "button");
        let b = doc.append_element(doc.root(), "input");
        let c = doc.append_element(doc.root(), "div");
        doc.set_attribute(a, ID_ATTRIBUTE, "3");
        doc.set_attribute(b, ID_ATTRIBUTE, "41");
        doc.set_attribute(c, ID_ATTRIBUTE, "junk");

        assert_eq!(IdAllocator::scan(&doc).next_id(), Some(42));
    }

    #[test]
    fn test_scan_counts_detached_elements() {
        let mut doc = Document::new("body");
        let a = doc.append_element(doc.root(), "button");
        doc.set_attribute(a, ID_ATTRIBUTE, "9");
        doc.detach(a);

        assert_eq!(IdAllocator::scan(&doc).next_id(), Some(10));
    }

    #[test]
    fn test_ensure_reuses_and_assigns() {
        let mut doc = Document::new("body");
        let old = doc.append_element(doc.root(), "button");
        let new = doc.append_element(doc.root(), "button");
        doc.set_attribute(old, ID_ATTRIBUTE, "5");

        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.ensure(&mut doc, old), Some(5));
        assert_eq!(alloc.ensure(&mut doc, new), Some(6));
        assert_eq!(doc.attribute(new, ID_ATTRIBUTE), Some("6"));
        assert_eq!(alloc.assigned(), &[6]);
        assert_eq!(alloc.next_id(), Some(7));
    }

    #[test]
    fn test_ensure_replaces_invalid_value() {
        let mut doc = Document::new("body");
        let el = doc.append_element(doc.root(), "input");
        doc.set_attribute(el, ID_ATTRIBUTE, "0");

        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.ensure(&mut doc, el), Some(1));
        assert_eq!(doc.attribute(el, ID_ATTRIBUTE), Some("1"));
    }

    #[test]
    fn test_ensure_reassigns_duplicates() {
        let mut doc = Document::new("body");
        let first = doc.append_element(doc.root(), "button");
        let clone = doc.append_element(doc.root(), "button");
        doc.set_attribute(first, ID_ATTRIBUTE, "2");
        doc.set_attribute(clone, ID_ATTRIBUTE, "2");

        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.ensure(&mut doc, first), Some(2));
        assert_eq!(alloc.ensure(&mut doc, clone), Some(3));
        assert_eq!(doc.attribute(first, ID_ATTRIBUTE), Some("2"));
    }

    #[test]
    fn test_u64_max_id_is_replaced() {
        let mut doc = Document::new("body");
        let el = doc.append_element(doc.root(), "button");
        doc.set_attribute(el, ID_ATTRIBUTE, u64::MAX.to_string());

        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.next_id(), Some(1));
        assert_eq!(alloc.ensure(&mut doc, el), Some(1));
        assert_eq!(doc.attribute(el, ID_ATTRIBUTE), Some("1"));
    }

    #[test]
    fn test_exhausted_counter_leaves_element_untouched() {
        let mut doc = Document::new("body");
        let last = doc.append_element(doc.root(), "button");
        let fresh = doc.append_element(doc.root(), "button");
        doc.set_attribute(last, ID_ATTRIBUTE, MAX_ID.to_string());

        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.next_id(), None);
        assert_eq!(alloc.ensure(&mut doc, last), Some(MAX_ID));
        assert_eq!(alloc.ensure(&mut doc, fresh), None);
        assert!(doc.attribute(fresh, ID_ATTRIBUTE).is_none());
        assert!(alloc.assigned().is_empty());
    }

    #[test]
    fn test_duplicate_owner_is_first_in_document_order() {
        let mut doc = Document::new("body");
        let first = doc.append_element(doc.root(), "button");
        let clone = doc.append_element(doc.root(), "button");
        doc.set_attribute(first, ID_ATTRIBUTE, "4");
        doc.set_attribute(clone, ID_ATTRIBUTE, "4");

        // The clone is handled first, as if the owner had been skipped.
        let mut alloc = IdAllocator::scan(&doc);
        assert_eq!(alloc.ensure(&mut doc, clone), Some(5));
        assert_eq!(alloc.ensure(&mut doc, first), Some(4));
    }
}
