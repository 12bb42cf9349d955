//! Passes over the finished tree
//!
//! - adjacent relations with equal attributes merge into one operator
//! - binary operators in non-binary positions become ordinary
//! - `displaystyle` and `scriptlevel` are inherited down the tree

use super::factory::NodeFactory;
use super::tree::{NodeId, NodeKind, TexClass, Tree};

/// Run every pass on the tree below `root`
pub fn finish_tree(factory: &mut NodeFactory, root: NodeId, display: bool) {
    combine_relations(factory);
    clean_binaries(factory.tree_mut(), root);
    inherit_styles(factory.tree_mut(), root, display, 0);
}

/// Merge runs of relation operators (`<` `=` into `<=`)
pub fn combine_relations(factory: &mut NodeFactory) {
    let operators = factory.nodes_of(NodeKind::Mo).to_vec();
    let tree = factory.tree_mut();
    for mo in operators {
        let Some(parent) = tree.parent(mo) else {
            continue;
        };
        if !tree.kind(parent).is_row_like() || tree.tex_class(mo) != TexClass::Rel {
            continue;
        }
        let Some(mut index) = tree.children(parent).iter().position(|&c| c == mo) else {
            continue;
        };
        index += 1;
        while let Some(&next) = tree.children(parent).get(index) {
            if tree.kind(next) != NodeKind::Mo
                || tree.tex_class(next) != TexClass::Rel
                || !same_attributes(tree, mo, next)
            {
                break;
            }
            let text = tree.text(mo) + &tree.text(next);
            tree.set_token_text(mo, &text);
            let latex = match (tree.attribute(mo, "data-latex"), tree.attribute(next, "data-latex")) {
                (Some(a), Some(b)) => Some(format!("{}{}", a, b)),
                _ => None,
            };
            if let Some(latex) = latex {
                tree.set_attribute(mo, "data-latex", latex);
            }
            tree.remove_child_at(parent, index);
        }
    }
}

fn same_attributes(tree: &Tree, a: NodeId, b: NodeId) -> bool {
    let left = tree.attributes(a);
    let right = tree.attributes(b);
    let relevant = |(k, _): &(&String, &String)| k.as_str() != "data-latex";
    left.iter().filter(relevant).count() == right.iter().filter(relevant).count()
        && left
            .iter()
            .filter(relevant)
            .all(|(k, v)| right.get(k) == Some(v))
}

/// A binary operator with nothing to combine on its left, or followed by a
/// relation, closing fence or punctuation, is an ordinary symbol
pub fn clean_binaries(tree: &mut Tree, node: NodeId) {
    let children = tree.children(node).to_vec();
    for &child in &children {
        clean_binaries(tree, child);
    }
    if !tree.kind(node).is_row_like() {
        return;
    }
    let mut previous: Option<(NodeId, TexClass)> = None;
    for &child in &children {
        let class = tree.tex_class(child);
        if class == TexClass::None {
            continue;
        }
        let mut class = class;
        if class == TexClass::Bin {
            let after_binary_context = match previous {
                None => true,
                Some((_, prev)) => matches!(
                    prev,
                    TexClass::Bin | TexClass::Op | TexClass::Rel | TexClass::Open | TexClass::Punct
                ),
            };
            if after_binary_context {
                tree.set_tex_class(child, TexClass::Ord);
                class = TexClass::Ord;
            }
        }
        if let Some((prev, TexClass::Bin)) = previous {
            if matches!(class, TexClass::Rel | TexClass::Close | TexClass::Punct) {
                tree.set_tex_class(prev, TexClass::Ord);
            }
        }
        previous = Some((child, class));
    }
    if let Some((last, TexClass::Bin)) = previous {
        tree.set_tex_class(last, TexClass::Ord);
    }
}

fn bool_text(value: bool) -> String {
    value.to_string()
}

/// Record inherited `displaystyle` and `scriptlevel` on every node
pub fn inherit_styles(tree: &mut Tree, node: NodeId, display: bool, level: u32) {
    let (display, level) = match tree.kind(node) {
        NodeKind::Mstyle | NodeKind::Mtable => {
            let display = match tree.attribute(node, "displaystyle") {
                Some(value) => value == "true",
                None if tree.kind(node) == NodeKind::Mtable => false,
                None => display,
            };
            let level = match tree.attribute(node, "scriptlevel") {
                Some(value) => scriptlevel(value, level),
                None => level,
            };
            (display, level)
        }
        _ => (display, level),
    };
    if !tree.kind(node).is_token() {
        tree.set_inherited(node, "displaystyle", bool_text(display));
        tree.set_inherited(node, "scriptlevel", level.to_string());
    }
    let children = tree.children(node).to_vec();
    let kind = tree.kind(node);
    for (i, &child) in children.iter().enumerate() {
        let (child_display, child_level) = match kind {
            NodeKind::Mfrac => (false, if display { level } else { level + 1 }),
            NodeKind::Mroot if i == 1 => (false, level + 2),
            NodeKind::Msub | NodeKind::Msup | NodeKind::Msubsup if i > 0 => (false, level + 1),
            NodeKind::Munder | NodeKind::Mover | NodeKind::Munderover if i > 0 => {
                let accent = match (kind, i) {
                    (NodeKind::Munder, 1) | (NodeKind::Munderover, 1) => {
                        tree.attribute(node, "accentunder") == Some("true")
                    }
                    _ => tree.attribute(node, "accent") == Some("true"),
                };
                (false, if accent { level } else { level + 1 })
            }
            _ => (display, level),
        };
        inherit_styles(tree, child, child_display, child_level);
    }
}

fn scriptlevel(value: &str, current: u32) -> u32 {
    if let Some(delta) = value.strip_prefix('+') {
        return current + delta.parse::<u32>().unwrap_or(0);
    }
    if let Some(delta) = value.strip_prefix('-') {
        return current.saturating_sub(delta.parse::<u32>().unwrap_or(0));
    }
    value.parse().unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mo(factory: &mut NodeFactory, text: &str) -> NodeId {
        factory.create_token(NodeKind::Mo, &[], text)
    }

    #[test]
    fn test_relations_combine() {
        let mut factory = NodeFactory::new();
        let lt = mo(&mut factory, "<");
        let eq = mo(&mut factory, "=");
        let x = factory.create_token(NodeKind::Mi, &[], "x");
        let row = factory.node(NodeKind::Mrow, &[lt, eq, x]);
        combine_relations(&mut factory);
        let tree = factory.tree();
        assert_eq!(tree.children(row).len(), 2);
        assert_eq!(tree.text(lt), "<=");
    }

    #[test]
    fn test_relations_with_different_attributes_stay() {
        let mut factory = NodeFactory::new();
        let lt = factory.create_token(NodeKind::Mo, &[("mathcolor", "red")], "<");
        let eq = mo(&mut factory, "=");
        let row = factory.node(NodeKind::Mrow, &[lt, eq]);
        combine_relations(&mut factory);
        assert_eq!(factory.tree().children(row).len(), 2);
    }

    #[test]
    fn test_leading_binary_becomes_ordinary() {
        let mut factory = NodeFactory::new();
        let minus = mo(&mut factory, "\u{2212}");
        let x = factory.create_token(NodeKind::Mi, &[], "x");
        let plus = mo(&mut factory, "+");
        let y = factory.create_token(NodeKind::Mi, &[], "y");
        let row = factory.node(NodeKind::Mrow, &[minus, x, plus, y]);
        clean_binaries(factory.tree_mut(), row);
        let tree = factory.tree();
        assert_eq!(tree.tex_class(minus), TexClass::Ord);
        assert_eq!(tree.tex_class(plus), TexClass::Bin);
    }

    #[test]
    fn test_binary_before_relation() {
        let mut factory = NodeFactory::new();
        let x = factory.create_token(NodeKind::Mi, &[], "x");
        let plus = mo(&mut factory, "+");
        let eq = mo(&mut factory, "=");
        let row = factory.node(NodeKind::Mrow, &[x, plus, eq]);
        clean_binaries(factory.tree_mut(), row);
        assert_eq!(factory.tree().tex_class(plus), TexClass::Ord);
    }

    #[test]
    fn test_script_levels() {
        let mut factory = NodeFactory::new();
        let x = factory.create_token(NodeKind::Mi, &[], "x");
        let two = factory.create_token(NodeKind::Mn, &[], "2");
        let sup = factory.node(NodeKind::Msup, &[x, two]);
        let a = factory.create_token(NodeKind::Mi, &[], "a");
        let b = factory.create_token(NodeKind::Mi, &[], "b");
        let num = factory.node(NodeKind::Mrow, &[sup]);
        let den = factory.node(NodeKind::Mrow, &[a, b]);
        let frac = factory.node(NodeKind::Mfrac, &[num, den]);
        inherit_styles(factory.tree_mut(), frac, true, 0);
        let tree = factory.tree();
        assert_eq!(tree.resolved_attribute(num, "scriptlevel"), Some("0"));
        assert_eq!(tree.resolved_attribute(num, "displaystyle"), Some("false"));
        assert_eq!(tree.resolved_attribute(sup, "scriptlevel"), Some("0"));
        assert_eq!(scriptlevel("+1", 1), 2);
    }
}
