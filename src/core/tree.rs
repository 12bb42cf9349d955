//! Semantic output tree
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by [`NodeId`].
//! Ids are handed out in creation order and stay valid for the lifetime of
//! the tree. The vocabulary is MathML plus `TeXAtom`, which carries a TeX
//! class and is serialised as an `mrow` with a `data-mjx-texclass` attribute.

use indexmap::IndexMap;
use std::fmt::Write;

use crate::data::operators;

/// Handle to a node in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element kinds of the output vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Math,
    Mi,
    Mn,
    Mo,
    Mtext,
    Mspace,
    Ms,
    Mrow,
    Mfrac,
    Msqrt,
    Mroot,
    Mstyle,
    Merror,
    Mpadded,
    Mphantom,
    Menclose,
    Msub,
    Msup,
    Msubsup,
    Munder,
    Mover,
    Munderover,
    Mtable,
    Mtr,
    Mlabeledtr,
    Mtd,
    TeXAtom,
    /// Character data inside a token element
    Text,
}

impl NodeKind {
    /// Element name as used by the vocabulary
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Math => "math",
            NodeKind::Mi => "mi",
            NodeKind::Mn => "mn",
            NodeKind::Mo => "mo",
            NodeKind::Mtext => "mtext",
            NodeKind::Mspace => "mspace",
            NodeKind::Ms => "ms",
            NodeKind::Mrow => "mrow",
            NodeKind::Mfrac => "mfrac",
            NodeKind::Msqrt => "msqrt",
            NodeKind::Mroot => "mroot",
            NodeKind::Mstyle => "mstyle",
            NodeKind::Merror => "merror",
            NodeKind::Mpadded => "mpadded",
            NodeKind::Mphantom => "mphantom",
            NodeKind::Menclose => "menclose",
            NodeKind::Msub => "msub",
            NodeKind::Msup => "msup",
            NodeKind::Msubsup => "msubsup",
            NodeKind::Munder => "munder",
            NodeKind::Mover => "mover",
            NodeKind::Munderover => "munderover",
            NodeKind::Mtable => "mtable",
            NodeKind::Mtr => "mtr",
            NodeKind::Mlabeledtr => "mlabeledtr",
            NodeKind::Mtd => "mtd",
            NodeKind::TeXAtom => "TeXAtom",
            NodeKind::Text => "text",
        }
    }

    /// Look up a kind by element name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "math" => NodeKind::Math,
            "mi" => NodeKind::Mi,
            "mn" => NodeKind::Mn,
            "mo" => NodeKind::Mo,
            "mtext" => NodeKind::Mtext,
            "mspace" => NodeKind::Mspace,
            "ms" => NodeKind::Ms,
            "mrow" => NodeKind::Mrow,
            "mfrac" => NodeKind::Mfrac,
            "msqrt" => NodeKind::Msqrt,
            "mroot" => NodeKind::Mroot,
            "mstyle" => NodeKind::Mstyle,
            "merror" => NodeKind::Merror,
            "mpadded" => NodeKind::Mpadded,
            "mphantom" => NodeKind::Mphantom,
            "menclose" => NodeKind::Menclose,
            "msub" => NodeKind::Msub,
            "msup" => NodeKind::Msup,
            "msubsup" => NodeKind::Msubsup,
            "munder" => NodeKind::Munder,
            "mover" => NodeKind::Mover,
            "munderover" => NodeKind::Munderover,
            "mtable" => NodeKind::Mtable,
            "mtr" => NodeKind::Mtr,
            "mlabeledtr" => NodeKind::Mlabeledtr,
            "mtd" => NodeKind::Mtd,
            "TeXAtom" => NodeKind::TeXAtom,
            _ => return None,
        };
        Some(kind)
    }

    /// Token elements hold character data
    pub fn is_token(self) -> bool {
        matches!(
            self,
            NodeKind::Mi
                | NodeKind::Mn
                | NodeKind::Mo
                | NodeKind::Mtext
                | NodeKind::Mspace
                | NodeKind::Ms
        )
    }

    /// Elements whose children form an (inferred) row
    pub fn is_row_like(self) -> bool {
        matches!(
            self,
            NodeKind::Math
                | NodeKind::Mrow
                | NodeKind::Msqrt
                | NodeKind::Mstyle
                | NodeKind::Merror
                | NodeKind::Mpadded
                | NodeKind::Mphantom
                | NodeKind::Menclose
                | NodeKind::Mtd
                | NodeKind::TeXAtom
        )
    }

    pub fn is_script(self) -> bool {
        matches!(
            self,
            NodeKind::Msub
                | NodeKind::Msup
                | NodeKind::Msubsup
                | NodeKind::Munder
                | NodeKind::Mover
                | NodeKind::Munderover
        )
    }

    /// Default value of an attribute that was not set explicitly
    pub fn default_attribute(self, name: &str) -> Option<&'static str> {
        match (self, name) {
            (NodeKind::Math, "display") => Some("inline"),
            (NodeKind::Mfrac, "linethickness") => Some("medium"),
            (NodeKind::Mspace, "width") => Some("0em"),
            (NodeKind::Mtable, "columnalign") => Some("center"),
            (NodeKind::Mtable, "rowspacing") => Some("1ex"),
            (NodeKind::Mtable, "columnspacing") => Some("0.8em"),
            (NodeKind::Mtable, "displaystyle") => Some("false"),
            (NodeKind::Munder, "accentunder") | (NodeKind::Munderover, "accentunder") => {
                Some("false")
            }
            (NodeKind::Mover, "accent") | (NodeKind::Munderover, "accent") => Some("false"),
            (_, "mathvariant") if self == NodeKind::Mi => Some("italic"),
            (_, "mathvariant") if self.is_token() => Some("normal"),
            _ => None,
        }
    }
}

/// TeX spacing class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TexClass {
    Ord,
    Op,
    Bin,
    Rel,
    Open,
    Close,
    Punct,
    Inner,
    Vcenter,
    None,
}

impl TexClass {
    pub fn name(self) -> &'static str {
        match self {
            TexClass::Ord => "ORD",
            TexClass::Op => "OP",
            TexClass::Bin => "BIN",
            TexClass::Rel => "REL",
            TexClass::Open => "OPEN",
            TexClass::Close => "CLOSE",
            TexClass::Punct => "PUNCT",
            TexClass::Inner => "INNER",
            TexClass::Vcenter => "VCENTER",
            TexClass::None => "NONE",
        }
    }
}

/// Value stored in a node's property bag
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Bool(bool),
    Int(i64),
    Str(String),
    Node(NodeId),
}

/// A single tree node
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) inherited: IndexMap<&'static str, String>,
    pub(crate) properties: IndexMap<&'static str, Property>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) text: Option<String>,
    pub(crate) tex_class: Option<TexClass>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            attributes: IndexMap::new(),
            inherited: IndexMap::new(),
            properties: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            text: None,
            tex_class: None,
        }
    }
}

/// Arena holding every node of one parse
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.0].kind = kind;
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Replace `old` by `new` among the children of `parent`
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };
        self.nodes[parent.0].children[pos] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    pub(crate) fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let children = &mut self.nodes[parent.0].children;
        if index >= children.len() {
            return None;
        }
        let child = children.remove(index);
        self.nodes[child.0].parent = None;
        Some(child)
    }

    // Attributes

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        self.nodes[id.0]
            .attributes
            .insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.nodes[id.0].attributes.shift_remove(name)
    }

    /// Explicitly set attribute
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attributes.get(name).map(String::as_str)
    }

    /// Attribute lookup through explicit, inherited and kind-default values
    pub fn resolved_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let node = &self.nodes[id.0];
        node.attributes
            .get(name)
            .map(String::as_str)
            .or_else(|| node.inherited.get(name).map(String::as_str))
            .or_else(|| node.kind.default_attribute(name))
    }

    pub fn attributes(&self, id: NodeId) -> &IndexMap<String, String> {
        &self.nodes[id.0].attributes
    }

    pub(crate) fn set_inherited(&mut self, id: NodeId, name: &'static str, value: String) {
        self.nodes[id.0].inherited.insert(name, value);
    }

    // Properties

    pub fn set_property(&mut self, id: NodeId, name: &'static str, value: Property) {
        self.nodes[id.0].properties.insert(name, value);
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&Property> {
        self.nodes[id.0].properties.get(name)
    }

    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Option<Property> {
        self.nodes[id.0].properties.shift_remove(name)
    }

    /// `Some(b)` when the property is a boolean
    pub fn bool_property(&self, id: NodeId, name: &str) -> Option<bool> {
        match self.property(id, name) {
            Some(Property::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn str_property(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.property(id, name) {
            Some(Property::Str(s)) => Some(s),
            _ => None,
        }
    }

    // Text

    /// Character data of a text node
    pub fn text_value(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    /// Concatenated character data below a node
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Replace the character data of a token element
    pub fn set_token_text(&mut self, id: NodeId, text: &str) {
        let first = self.nodes[id.0].children.first().copied();
        match first {
            Some(child) if self.nodes[child.0].kind == NodeKind::Text => {
                self.nodes[child.0].text = Some(text.to_string());
                self.nodes[id.0].children.truncate(1);
            }
            _ => {
                let mut node = Node::new(NodeKind::Text);
                node.text = Some(text.to_string());
                let child = self.push(node);
                self.nodes[id.0].children.clear();
                self.append_child(id, child);
            }
        }
    }

    // TeX classes

    pub fn set_tex_class(&mut self, id: NodeId, class: TexClass) {
        self.nodes[id.0].tex_class = Some(class);
    }

    pub fn explicit_tex_class(&self, id: NodeId) -> Option<TexClass> {
        self.nodes[id.0].tex_class
    }

    /// TeX class of a node: explicit, from the operator dictionary for
    /// `mo`, from the base for embellished operators, otherwise by kind.
    pub fn tex_class(&self, id: NodeId) -> TexClass {
        let node = &self.nodes[id.0];
        if let Some(class) = node.tex_class {
            return class;
        }
        match node.kind {
            NodeKind::Mo => operators::lookup(&self.text(id)).class,
            NodeKind::Mspace => TexClass::None,
            NodeKind::Mfrac => TexClass::Inner,
            kind if kind.is_script() => match node.children.first() {
                Some(&base) => self.tex_class(base),
                None => TexClass::Ord,
            },
            NodeKind::Mstyle | NodeKind::Mphantom | NodeKind::Mpadded => {
                match node.children.as_slice() {
                    [only] => self.tex_class(*only),
                    _ => TexClass::Ord,
                }
            }
            _ => TexClass::Ord,
        }
    }

    /// Whether a node is (or is embellished by) an operator marked as fence
    pub fn is_fence(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Mo => match self.attribute(id, "fence") {
                Some(value) => value == "true",
                None => operators::lookup(&self.text(id)).fence,
            },
            _ => false,
        }
    }

    // Serialisation

    /// Serialise a subtree as MathML markup
    pub fn to_mathml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_mathml(id, &mut out, None, 0);
        out
    }

    /// Serialise a subtree as indented MathML markup
    pub fn to_mathml_pretty(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_mathml(id, &mut out, Some("  "), 0);
        out
    }

    fn write_mathml(&self, id: NodeId, out: &mut String, indent: Option<&str>, depth: usize) {
        let node = &self.nodes[id.0];
        if node.kind == NodeKind::Text {
            escape_into(node.text.as_deref().unwrap_or(""), out, false);
            return;
        }
        if let Some(unit) = indent {
            if depth > 0 {
                out.push('\n');
            }
            for _ in 0..depth {
                out.push_str(unit);
            }
        }
        let name = match node.kind {
            NodeKind::TeXAtom => "mrow",
            kind => kind.name(),
        };
        out.push('<');
        out.push_str(name);
        let class_attr = match (node.kind, node.tex_class) {
            (NodeKind::TeXAtom, class) => Some(class.unwrap_or(TexClass::Ord)),
            (NodeKind::Mrow, Some(class)) => Some(class),
            _ => None,
        };
        if let Some(class) = class_attr {
            let _ = write!(out, " data-mjx-texclass=\"{}\"", class.name());
        }
        for (key, value) in &node.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_into(value, out, true);
            out.push('"');
        }
        if node.children.is_empty() {
            if node.kind.is_token() {
                let _ = write!(out, "></{}>", name);
            } else {
                out.push_str(" />");
            }
            return;
        }
        out.push('>');
        if node.kind.is_token() {
            for &child in &node.children {
                self.write_mathml(child, out, None, 0);
            }
        } else {
            for &child in &node.children {
                self.write_mathml(child, out, indent, depth + 1);
            }
            if let Some(unit) = indent {
                out.push('\n');
                for _ in 0..depth {
                    out.push_str(unit);
                }
            }
        }
        let _ = write!(out, "</{}>", name);
    }
}

fn escape_into(text: &str, out: &mut String, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Read-only view of a node, convenient for traversal
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        NodeRef { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.tree.kind(self.id)
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .map(move |&id| NodeRef::new(tree, id))
    }

    /// Children that are elements (text nodes skipped)
    pub fn elements(&self) -> Vec<NodeRef<'a>> {
        self.children()
            .filter(|child| child.kind() != NodeKind::Text)
            .collect()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.tree
            .children(self.id)
            .get(index)
            .map(|&id| NodeRef::new(self.tree, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.parent(self.id).map(|id| NodeRef::new(self.tree, id))
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree.attribute(self.id, name)
    }

    pub fn resolved_attribute(&self, name: &str) -> Option<&'a str> {
        self.tree.resolved_attribute(self.id, name)
    }

    pub fn property(&self, name: &str) -> Option<&'a Property> {
        self.tree.property(self.id, name)
    }

    pub fn text(&self) -> String {
        self.tree.text(self.id)
    }

    pub fn tex_class(&self) -> TexClass {
        self.tree.tex_class(self.id)
    }

    pub fn is_fence(&self) -> bool {
        self.tree.is_fence(self.id)
    }

    pub fn to_mathml(&self) -> String {
        self.tree.to_mathml(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(tree: &mut Tree, kind: NodeKind, text: &str) -> NodeId {
        let id = tree.push(Node::new(kind));
        tree.set_token_text(id, text);
        id
    }

    #[test]
    fn test_serialise_token() {
        let mut tree = Tree::new();
        let mi = token(&mut tree, NodeKind::Mi, "x");
        assert_eq!(tree.to_mathml(mi), "<mi>x</mi>");
    }

    #[test]
    fn test_serialise_escapes() {
        let mut tree = Tree::new();
        let mo = token(&mut tree, NodeKind::Mo, "<");
        tree.set_attribute(mo, "title", "a\"b");
        assert_eq!(tree.to_mathml(mo), "<mo title=\"a&quot;b\">&lt;</mo>");
    }

    #[test]
    fn test_texatom_serialises_as_row() {
        let mut tree = Tree::new();
        let atom = tree.push(Node::new(NodeKind::TeXAtom));
        tree.set_tex_class(atom, TexClass::Op);
        let mi = token(&mut tree, NodeKind::Mi, "f");
        tree.append_child(atom, mi);
        assert_eq!(
            tree.to_mathml(atom),
            "<mrow data-mjx-texclass=\"OP\"><mi>f</mi></mrow>"
        );
    }

    #[test]
    fn test_empty_elements() {
        let mut tree = Tree::new();
        let row = tree.push(Node::new(NodeKind::Mrow));
        let mspace = tree.push(Node::new(NodeKind::Mspace));
        assert_eq!(tree.to_mathml(row), "<mrow />");
        assert_eq!(tree.to_mathml(mspace), "<mspace></mspace>");
    }

    #[test]
    fn test_attribute_resolution_order() {
        let mut tree = Tree::new();
        let frac = tree.push(Node::new(NodeKind::Mfrac));
        assert_eq!(tree.resolved_attribute(frac, "linethickness"), Some("medium"));
        tree.set_inherited(frac, "displaystyle", "true".to_string());
        assert_eq!(tree.resolved_attribute(frac, "displaystyle"), Some("true"));
        tree.set_attribute(frac, "linethickness", "0");
        assert_eq!(tree.resolved_attribute(frac, "linethickness"), Some("0"));
    }

    #[test]
    fn test_tex_class_from_dictionary() {
        let mut tree = Tree::new();
        let plus = token(&mut tree, NodeKind::Mo, "+");
        let eq = token(&mut tree, NodeKind::Mo, "=");
        assert_eq!(tree.tex_class(plus), TexClass::Bin);
        assert_eq!(tree.tex_class(eq), TexClass::Rel);
    }

    #[test]
    fn test_replace_child() {
        let mut tree = Tree::new();
        let row = tree.push(Node::new(NodeKind::Mrow));
        let a = token(&mut tree, NodeKind::Mi, "a");
        let b = token(&mut tree, NodeKind::Mi, "b");
        tree.append_child(row, a);
        assert!(tree.replace_child(row, a, b));
        assert_eq!(tree.children(row), &[b]);
        assert_eq!(tree.parent(b), Some(row));
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [NodeKind::Mi, NodeKind::Munderover, NodeKind::TeXAtom] {
            assert_eq!(NodeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("div"), None);
    }
}
