//! Arena-backed document tree for the editable surface.
//!
//! # Responsibility
//! - Hold element and text nodes with parent/child links.
//! - Provide the structural edits the surface and controller need.
//!
//! # Invariants
//! - `NodeId`s are never reused; detached nodes stay allocated but unreachable.
//! - A node has at most one parent, and appears once in that parent's children.
//! - Text offsets are counted in `char`s, not bytes.

use std::fmt::{Display, Formatter};

/// Handle of one node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element tag plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Boundary point: a char offset inside a text node, or a child index
/// inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Elements that never have children.
pub fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "br" | "img" | "input" | "hr" | "wbr")
}

/// Elements that start a new line in the plain-text rendering.
pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "div"
            | "p"
            | "li"
            | "ul"
            | "ol"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "blockquote"
            | "pre"
    )
}

/// Elements the editor treats as one line of content.
pub fn is_line_tag(tag: &str) -> bool {
    matches!(tag, "div" | "p" | "li")
}

/// Tree of nodes under a single root container.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose root is an empty `div` container.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("div");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Creates a detached element with the same tag and attributes.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.data(id).kind.clone();
        let kind = match kind {
            NodeKind::Text(_) => NodeKind::Text(String::new()),
            element => element,
        };
        self.push(kind)
    }

    /// Node payload, or `None` for an id this document never allocated.
    pub fn get(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|data| &data.kind)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Text(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element(element) => Some(element.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Renames an element in place, keeping its children and id.
    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        if let NodeKind::Element(element) = &mut self.data_mut(id).kind {
            element.tag = tag.to_ascii_lowercase();
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element(element) => element
                .attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(element) = &mut self.data_mut(id).kind {
            match element.attrs.iter_mut().find(|(key, _)| key == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => element.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element(element) = &mut self.data_mut(id).kind {
            element.attrs.retain(|(key, _)| key != name);
        }
    }

    /// Text of a text node; `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeKind::Text(text) = &mut self.data_mut(id).kind {
            *text = value.into();
        }
    }

    /// Length used for boundary offsets: chars for text, child count otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        match &self.data(id).kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Element(_) => self.data(id).children.len(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.children(parent).get(prev).copied())
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(self.root, id)
    }

    /// Removes the node from its parent, keeping its own subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.data(id).parent {
            self.data_mut(parent).children.retain(|child| *child != id);
            self.data_mut(id).parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Inserts `child` at `index` (clamped) under `parent`, moving it if attached.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.data_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, index + 1, node);
        }
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, index, node);
        }
    }

    /// Detaches every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.data_mut(id).children);
        for child in children {
            self.data_mut(child).parent = None;
        }
    }

    /// Moves `children[from..]` of `source` to the end of `target`.
    pub fn move_children_from(&mut self, source: NodeId, from: usize, target: NodeId) {
        let moved: Vec<NodeId> = self.children(source).iter().skip(from).copied().collect();
        for child in moved {
            self.append_child(target, child);
        }
    }

    /// Replaces `node` by its children in its parent.
    pub fn unwrap(&mut self, node: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(node), self.index_in_parent(node)) else {
            return;
        };
        let children: Vec<NodeId> = self.children(node).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + offset, child);
        }
        self.detach(node);
    }

    /// Pre-order traversal of the subtree below `id` (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all text descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// First element below `id` matching `predicate`.
    pub fn find_descendant(
        &self,
        id: NodeId,
        predicate: impl Fn(&Self, NodeId) -> bool,
    ) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|node| predicate(self, *node))
    }

    /// Nearest inclusive ancestor of `node`, not above `stop`, matching `predicate`.
    pub fn closest(
        &self,
        node: NodeId,
        stop: NodeId,
        predicate: impl Fn(&Self, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if predicate(self, id) {
                return Some(id);
            }
            if id == stop {
                return None;
            }
            current = self.parent(id);
        }
        None
    }

    /// Child-index path from the root, or `None` when detached.
    pub fn path_of(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for index in path {
            current = *self.children(current).get(*index)?;
        }
        Some(current)
    }

    /// Whether a block has no visible content (no text, no media).
    pub fn is_visually_empty(&self, id: NodeId) -> bool {
        if let Some(text) = self.text(id) {
            return text.is_empty();
        }
        self.descendants(id).into_iter().all(|node| match self.kind(node) {
            NodeKind::Text(text) => text.is_empty(),
            NodeKind::Element(element) => !matches!(element.tag.as_str(), "img" | "input" | "hr"),
        })
    }

    /// Orders two boundary points in document order.
    pub fn compare_positions(&self, a: Position, b: Position) -> std::cmp::Ordering {
        let key = |position: Position| {
            let mut path = self.path_of(position.node).unwrap_or_default();
            path.push(position.offset);
            path
        };
        key(a).cmp(&key(b))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }
}

/// Byte index of the `char_offset`-th char of `text` (clamped to the end).
pub fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::{byte_index, Document, Position};
    use std::cmp::Ordering;

    #[test]
    fn insert_and_detach_keep_links_consistent() {
        let mut doc = Document::new();
        let line = doc.create_element("DIV");
        let text = doc.create_text("hello");
        doc.append_child(doc.root(), line);
        doc.append_child(line, text);

        assert_eq!(doc.tag(line), Some("div"));
        assert_eq!(doc.parent(text), Some(line));
        assert_eq!(doc.path_of(text), Some(vec![0, 0]));

        doc.detach(line);
        assert!(doc.children(doc.root()).is_empty());
        assert!(!doc.is_attached(text));
    }

    #[test]
    fn unwrap_hoists_children_in_order() {
        let mut doc = Document::new();
        let bold = doc.create_element("b");
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(doc.root(), bold);
        doc.append_child(bold, a);
        doc.append_child(bold, b);
        doc.unwrap(bold);
        assert_eq!(doc.children(doc.root()), &[a, b]);
    }

    #[test]
    fn positions_inside_a_node_sort_after_the_boundary_before_it() {
        let mut doc = Document::new();
        let text = doc.create_text("abc");
        doc.append_child(doc.root(), text);
        let before = Position::new(doc.root(), 0);
        let inside = Position::new(text, 2);
        let after = Position::new(doc.root(), 1);
        assert_eq!(doc.compare_positions(before, inside), Ordering::Less);
        assert_eq!(doc.compare_positions(inside, after), Ordering::Less);
    }

    #[test]
    fn byte_index_counts_chars() {
        assert_eq!(byte_index("h\u{e9}llo", 2), 3);
        assert_eq!(byte_index("abc", 10), 3);
    }
}
