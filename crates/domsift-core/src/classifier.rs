//! Interest classification.
//!
//! An element is "interesting" when it should appear as a structural node in
//! the digest. The inline-handler check is a heuristic proxy for "reacts to
//! user interaction", not a guarantee: listeners attached from script are
//! invisible to it.

use crate::document::ElementData;

/// Tags that are always interesting.
pub const INTERACTIVE_TAGS: [&str; 6] = ["input", "textarea", "select", "button", "a", "option"];

/// Whether the element belongs in the digest as a structural node.
pub fn is_interesting(element: &ElementData) -> bool {
    INTERACTIVE_TAGS.contains(&element.tag_name.as_str()) || has_inline_handler(element)
}

/// Whether any attribute name starts with `on` (`onclick`, `onChange`, ...).
pub fn has_inline_handler(element: &ElementData) -> bool {
    element.attributes.iter().any(|a| {
        a.name
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
    })
}
