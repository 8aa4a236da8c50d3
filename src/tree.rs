//! Format-preserving document tree.
//!
//! A [`Node`] is a parsed JSON/YAML value in which every container entry
//! remembers where its key and value tokens live in the source text. The
//! navigation functions here are pure views over one immutable snapshot:
//! they hand out cheap [`NodeRef`] handles and never cache anything, so a
//! caller that splices text must re-parse and re-navigate before asking for
//! more ranges.

use serde_json::Value;

use crate::pointer::Pointer;

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Object(ObjectNode),
    Array(ArrayNode),
    Scalar(ScalarNode),
}

/// Mapping with entries in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub span: Span,
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub key_span: Span,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub span: Span,
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    pub span: Span,
    pub value: Value,
}

impl Node {
    /// Span of this node's own value token(s).
    pub fn span(&self) -> Span {
        match self {
            Node::Object(object) => object.span,
            Node::Array(array) => array.span,
            Node::Scalar(scalar) => scalar.span,
        }
    }

    /// Child by unescaped segment: mapping key, or decimal array index.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        match self {
            Node::Object(object) => object
                .entries
                .iter()
                .find(|entry| entry.key == segment)
                .map(|entry| &entry.node),
            Node::Array(array) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| array.items.get(index)),
            Node::Scalar(_) => None,
        }
    }

    pub fn find(&self, pointer: &Pointer) -> Option<&Node> {
        let mut current = self;
        for segment in pointer.segments() {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Plain value with all span metadata stripped.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Object(object) => Value::Object(
                object
                    .entries
                    .iter()
                    .map(|entry| (entry.key.clone(), entry.node.to_value()))
                    .collect(),
            ),
            Node::Array(array) => Value::Array(array.items.iter().map(Node::to_value).collect()),
            Node::Scalar(scalar) => scalar.value.clone(),
        }
    }
}

/// Logical handle to a node: the node plus its pointer.
///
/// Two references are equal iff their pointers are equal. References are
/// created on demand by the navigation functions and are invalidated by any
/// text splice.
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    pub pointer: Pointer,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.pointer == other.pointer
    }
}

impl Eq for NodeRef<'_> {}

impl NodeRef<'_> {
    pub fn is_object(&self) -> bool {
        matches!(self.node, Node::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.node, Node::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.node, Node::Scalar(_))
    }

    /// Last pointer segment, i.e. the key this node lives under.
    pub fn key(&self) -> Option<&str> {
        self.pointer.last_segment()
    }
}

pub fn root_ref(root: &Node) -> NodeRef<'_> {
    NodeRef {
        node: root,
        pointer: Pointer::root(),
    }
}

pub fn find_node<'a>(root: &'a Node, pointer: &Pointer) -> Option<NodeRef<'a>> {
    root.find(pointer).map(|node| NodeRef {
        node,
        pointer: pointer.clone(),
    })
}

/// Children in document order. `keep_order` re-sorts by source position;
/// entries are stored in document order, so both listings agree for trees
/// produced by this crate's parsers.
pub fn children<'a>(node: &NodeRef<'a>, keep_order: bool) -> Vec<NodeRef<'a>> {
    let mut refs: Vec<NodeRef<'a>> = match node.node {
        Node::Object(object) => object
            .entries
            .iter()
            .map(|entry| NodeRef {
                node: &entry.node,
                pointer: node.pointer.child(entry.key.clone()),
            })
            .collect(),
        Node::Array(array) => array
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| NodeRef {
                node: item,
                pointer: node.pointer.child(index.to_string()),
            })
            .collect(),
        Node::Scalar(_) => Vec::new(),
    };
    if keep_order {
        refs.sort_by_key(|child| child.node.span().start);
    }
    refs
}

/// Parent reference; `None` only at the root.
pub fn parent<'a>(root: &'a Node, node: &NodeRef<'_>) -> Option<NodeRef<'a>> {
    let parent_pointer = node.pointer.parent()?;
    find_node(root, &parent_pointer)
}

/// Positional next sibling in document order; `None` at the boundary.
pub fn next<'a>(root: &'a Node, node: &NodeRef<'_>) -> Option<NodeRef<'a>> {
    sibling(root, node, 1)
}

/// Positional previous sibling in document order; `None` at the boundary.
pub fn prev<'a>(root: &'a Node, node: &NodeRef<'_>) -> Option<NodeRef<'a>> {
    sibling(root, node, -1)
}

fn sibling<'a>(root: &'a Node, node: &NodeRef<'_>, step: isize) -> Option<NodeRef<'a>> {
    let parent = parent(root, node)?;
    let siblings = children(&parent, true);
    let index = siblings.iter().position(|child| child == node)?;
    let target = index.checked_add_signed(step)?;
    siblings.into_iter().nth(target)
}

/// Whole-entry span: key through value for mapping entries, the value span
/// for array items and the root.
pub fn range(root: &Node, node: &NodeRef<'_>) -> Option<Span> {
    if node.pointer.is_root() {
        return Some(node.node.span());
    }
    let parent = parent(root, node)?;
    match parent.node {
        Node::Object(object) => {
            let entry = object.entries.iter().find(|entry| {
                node.key() == Some(entry.key.as_str())
            })?;
            Some(Span::new(entry.key_span.start, entry.node.span().end))
        }
        Node::Array(_) => Some(node.node.span()),
        Node::Scalar(_) => None,
    }
}

/// Span of the key token alone; `None` for array items and the root.
pub fn key_range(root: &Node, node: &NodeRef<'_>) -> Option<Span> {
    let parent = parent(root, node)?;
    match parent.node {
        Node::Object(object) => object
            .entries
            .iter()
            .find(|entry| node.key() == Some(entry.key.as_str()))
            .map(|entry| entry.key_span),
        _ => None,
    }
}

/// Span of the value token alone.
pub fn value_range(root: &Node, node: &NodeRef<'_>) -> Option<Span> {
    if node.pointer.is_root() {
        return Some(node.node.span());
    }
    parent(root, node)?;
    Some(node.node.span())
}

/// Whole-entry spans of a container's members, in document order. Empty for
/// empty containers; `None` for scalars.
pub fn entry_ranges(node: &NodeRef<'_>) -> Option<Vec<Span>> {
    match node.node {
        Node::Object(object) => Some(
            object
                .entries
                .iter()
                .map(|entry| Span::new(entry.key_span.start, entry.node.span().end))
                .collect(),
        ),
        Node::Array(array) => Some(array.items.iter().map(|item| item.span()).collect()),
        Node::Scalar(_) => None,
    }
}

/// Last member of a container in document order.
pub fn last_child<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    children(node, true).into_iter().last()
}
