//! Node factory
//!
//! All nodes of a parse are created here. Every created (or copied) node is
//! recorded in a per-kind list so the second pass can visit nodes by kind
//! without walking the whole tree.

use fxhash::FxHashMap;

use super::tree::{Node, NodeId, NodeKind, Tree};

#[derive(Debug, Default)]
pub struct NodeFactory {
    tree: Tree,
    lists: FxHashMap<NodeKind, Vec<NodeId>>,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes created so far
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    fn register(&mut self, node: Node) -> NodeId {
        let kind = node.kind;
        let id = self.tree.push(node);
        self.lists.entry(kind).or_default().push(id);
        id
    }

    /// Create an element with attributes and children
    pub fn create(
        &mut self,
        kind: NodeKind,
        attributes: &[(&str, &str)],
        children: &[NodeId],
    ) -> NodeId {
        let mut node = Node::new(kind);
        for (name, value) in attributes {
            node.attributes.insert((*name).to_string(), (*value).to_string());
        }
        let id = self.register(node);
        for &child in children {
            self.tree.append_child(id, child);
        }
        id
    }

    /// Create an element without attributes
    pub fn node(&mut self, kind: NodeKind, children: &[NodeId]) -> NodeId {
        self.create(kind, &[], children)
    }

    /// Create a token element holding `text`
    pub fn create_token(
        &mut self,
        kind: NodeKind,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.create(kind, attributes, &[]);
        if !text.is_empty() {
            let child = self.create_text(text);
            self.tree.append_child(id, child);
        }
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text);
        node.text = Some(text.to_string());
        self.register(node)
    }

    /// Deep copy of a subtree; the copy has no parent
    pub fn copy(&mut self, id: NodeId) -> NodeId {
        let mut node = self.tree.node(id).clone();
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        let copy = self.register(node);
        for child in children {
            let child_copy = self.copy(child);
            self.tree.append_child(copy, child_copy);
        }
        copy
    }

    /// Every node of `kind` created so far, in creation order
    pub fn nodes_of(&self, kind: NodeKind) -> &[NodeId] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record a node under a different kind after its kind changed
    pub(crate) fn rekind(&mut self, id: NodeId, kind: NodeKind) {
        let old = self.tree.kind(id);
        if old == kind {
            return;
        }
        if let Some(list) = self.lists.get_mut(&old) {
            list.retain(|&n| n != id);
        }
        self.tree.set_kind(id, kind);
        let list = self.lists.entry(kind).or_default();
        let pos = list.partition_point(|&n| n < id);
        list.insert(pos, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_token() {
        let mut factory = NodeFactory::new();
        let mi = factory.create_token(NodeKind::Mi, &[("mathvariant", "normal")], "d");
        assert_eq!(
            factory.tree().to_mathml(mi),
            "<mi mathvariant=\"normal\">d</mi>"
        );
        assert_eq!(factory.nodes_of(NodeKind::Mi), &[mi]);
    }

    #[test]
    fn test_create_sets_parents() {
        let mut factory = NodeFactory::new();
        let a = factory.create_token(NodeKind::Mi, &[], "a");
        let row = factory.node(NodeKind::Mrow, &[a]);
        assert_eq!(factory.tree().parent(a), Some(row));
    }

    #[test]
    fn test_copy_is_deep_and_registered() {
        let mut factory = NodeFactory::new();
        let a = factory.create_token(NodeKind::Mi, &[], "a");
        let row = factory.node(NodeKind::Mrow, &[a]);
        let copy = factory.copy(row);
        assert_ne!(copy, row);
        let copied_child = factory.tree().children(copy)[0];
        assert_ne!(copied_child, a);
        assert_eq!(factory.tree().text(copied_child), "a");
        assert_eq!(factory.nodes_of(NodeKind::Mi).len(), 2);
        assert_eq!(factory.nodes_of(NodeKind::Mrow).len(), 2);
        assert_eq!(factory.tree().parent(copy), None);
    }

    #[test]
    fn test_rekind_moves_between_lists() {
        let mut factory = NodeFactory::new();
        let x = factory.create_token(NodeKind::Mi, &[], "x");
        let script = factory.node(NodeKind::Msub, &[x]);
        factory.rekind(script, NodeKind::Msubsup);
        assert!(factory.nodes_of(NodeKind::Msub).is_empty());
        assert_eq!(factory.nodes_of(NodeKind::Msubsup), &[script]);
    }
}
