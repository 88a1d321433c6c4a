//! Arena-backed document tree.
//!
//! Nodes live in a flat `Vec` and are addressed by [`NodeId`]. Every node
//! keeps a back-reference to its parent so providers can answer inherited
//! style and geometry questions. Nodes are never removed from the arena;
//! [`Document::detach`] only unlinks them from their parent.

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element payload: tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name (lowercase).
    pub tag_name: String,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute value by exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    /// Comments and any other node shape the digest does not represent.
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A mutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl Document {
    /// Create a document whose root is an element with the given tag.
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeEntry {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element(ElementData::new(root_tag)),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The element a digest starts from: the first `body` in document
    /// order, or the root when there is none.
    pub fn content_root(&self) -> NodeId {
        self.descendants(self.root)
            .find(|&id| self.element(id).is_some_and(|e| e.tag_name == "body"))
            .unwrap_or(self.root)
    }

    pub fn append_element(&mut self, parent: NodeId, tag_name: impl Into<String>) -> NodeId {
        self.append(parent, NodeData::Element(ElementData::new(tag_name)))
    }

    /// Insert an element at `index` among the parent's children (clamped to
    /// the end).
    pub fn insert_element(
        &mut self,
        parent: NodeId,
        index: usize,
        tag_name: impl Into<String>,
    ) -> NodeId {
        let id = self.append_element(parent, tag_name);
        if let Some(entry) = self.nodes.get_mut(parent.0) {
            entry.children.pop();
            let index = index.min(entry.children.len());
            entry.children.insert(index, id);
        }
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeData::Text(text.into()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeData::Comment(text.into()))
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        if let Some(entry) = self.nodes.get_mut(parent.0) {
            entry.children.push(id);
        }
        id
    }

    /// Unlink a node from its parent. The node and its subtree stay in the
    /// arena (and keep their attributes) but are no longer reachable from
    /// the root.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|e| e.parent) else {
            return;
        };
        if let Some(entry) = self.nodes.get_mut(parent.0) {
            entry.children.retain(|&c| c != node);
        }
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.parent = None;
        }
    }

    /// Whether the node is reachable from the root through parent links.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).map(|e| &e.data)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.data(node)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(node.0).map(|e| &mut e.data)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|e| e.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(name)
    }

    /// Set an attribute on an element. Returns `false` for non-elements.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.element_mut(node) {
            Some(element) => {
                element.set_attribute(name, value);
                true
            }
            None => false,
        }
    }

    /// Every element in the arena, detached subtrees included.
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &ElementData)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match &e.data {
                NodeData::Element(element) => Some((NodeId(i), element)),
                _ => None,
            })
    }

    /// Pre-order iterator over `node` and everything below it.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![node],
        }
    }
}

/// Pre-order traversal returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
