//! Document tree access.
//!
//! The style core never owns the document. It reads an externally-owned
//! tree through [`DocumentTree`] and mutates it in exactly two narrowly
//! scoped places: first-letter wrapper insertion and removal of consumed
//! presentation attributes.

/// Dense arena index of a node in the document tree.
///
/// Implementations must hand out ids in `0..node_count()` so per-node
/// style state can live in a flat side table.
pub type NodeId = usize;

/// Read access to an externally-owned document tree.
///
/// Elements report a tag via [`tag`](DocumentTree::tag); text nodes report
/// `None` there and carry content in [`text`](DocumentTree::text).
pub trait DocumentTree {
    /// Root node of the tree (the document node, not necessarily an
    /// element).
    fn root(&self) -> NodeId;

    /// Total number of nodes, including any inserted wrappers.
    fn node_count(&self) -> usize;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Tag name for element nodes, `None` otherwise.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Remove an attribute if present. Used when legacy presentation
    /// attributes are converted into style properties.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Content of a text node, `None` for elements.
    fn text(&self, node: NodeId) -> Option<&str>;

    /// Replace the content of a text node.
    fn set_text(&mut self, node: NodeId, text: String);

    /// Insert a new element holding a single text child at `index` within
    /// `parent`'s child list, returning the id of the new element. Used
    /// for first-letter wrapper synthesis.
    fn insert_wrapper(&mut self, parent: NodeId, index: usize, tag: &str, text: String) -> NodeId;
}

/// Pre-order traversal of the whole tree.
pub fn document_order(tree: &dyn DocumentTree) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(tree.node_count());
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        order.push(node);
        for &child in tree.children(node).iter().rev() {
            stack.push(child);
        }
    }
    order
}
