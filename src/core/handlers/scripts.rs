//! Superscripts, subscripts, primes and `\limits`

use crate::core::items::{ItemKind, ScriptPosition, ScriptState};
use crate::core::parser::TexParser;
use crate::core::symbols::HandlerArg;
use crate::core::tree::{NodeId, NodeKind, Property, TexClass};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

const MISPLACED_LIMITS: ErrorKind = ErrorKind::Custom {
    id: "MisplacedLimits",
    template: "%1 is allowed only on operators",
};

/// `^` and `\sp`
pub fn superscript(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    script(parser, ScriptPosition::Sup)
}

/// `_` and `\sb`
pub fn subscript(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    script(parser, ScriptPosition::Sub)
}

/// The previous node, or an empty identifier when there is none
fn take_base(parser: &mut TexParser<'_>) -> NodeId {
    match parser.stack.prev() {
        Some(node) => node,
        None => parser.factory().create_token(NodeKind::Mi, &[], ""),
    }
}

fn script(parser: &mut TexParser<'_>, position: ScriptPosition) -> ParseResult<()> {
    let pending = match parser.stack.top().map(|top| &top.kind) {
        Some(ItemKind::Subsup(_)) => {
            return Err(TexError::simple(match position {
                ScriptPosition::Sup => ErrorKind::MissingOpenForSup,
                ScriptPosition::Sub => ErrorKind::MissingOpenForSub,
            }))
        }
        Some(ItemKind::Prime { base, primes }) => Some((*base, *primes)),
        _ => None,
    };
    let (base, primes) = match pending {
        Some((base, primes)) => {
            parser.stack.pop();
            (base, Some(primes))
        }
        None => (take_base(parser), None),
    };

    let tree = parser.factory().tree();
    let kind = tree.kind(base);
    let limits = tree.bool_property(base, "movesupsub").unwrap_or(false);
    let subsup_ok = tree.bool_property(base, "subsupOK").unwrap_or(false);
    match position {
        ScriptPosition::Sup => {
            let taken = matches!(kind, NodeKind::Msup | NodeKind::Msubsup)
                || (matches!(kind, NodeKind::Mover | NodeKind::Munderover) && !subsup_ok);
            if taken {
                return Err(TexError::simple(ErrorKind::DoubleExponent));
            }
        }
        ScriptPosition::Sub => {
            let taken = matches!(kind, NodeKind::Msub | NodeKind::Msubsup)
                || (matches!(kind, NodeKind::Munder | NodeKind::Munderover) && !subsup_ok);
            if taken {
                return Err(TexError::simple(ErrorKind::DoubleSubscripts));
            }
        }
    }
    let item = parser.item(ItemKind::Subsup(ScriptState {
        base,
        position,
        primes,
        limits,
        subsup_ok,
    }));
    parser.push(item)
}

/// `'`, with any immediately following primes
pub fn prime(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let base = take_base(parser);
    if matches!(parser.factory().tree().kind(base), NodeKind::Msup | NodeKind::Msubsup) {
        return Err(TexError::simple(ErrorKind::DoubleExponent));
    }
    let mut count = 1;
    while parser.buffer.peek() == Some('\'') {
        parser.buffer.next_char();
        count += 1;
    }
    let text = match count {
        1 => "\u{2032}".to_string(),
        2 => "\u{2033}".to_string(),
        3 => "\u{2034}".to_string(),
        4 => "\u{2057}".to_string(),
        n => "\u{2032}".repeat(n),
    };
    let primes = parser.factory().create_token(NodeKind::Mo, &[], &text);
    let item = parser.item(ItemKind::Prime { base, primes });
    parser.push(item)
}

/// `\limits` (bound `true`) and `\nolimits` on the preceding operator
pub fn limits(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let limits = args.first().and_then(HandlerArg::as_bool).unwrap_or(true);
    let Some(&op) = parser.stack.top().and_then(|top| top.nodes.last()) else {
        return Err(TexError::new(MISPLACED_LIMITS, [name]));
    };
    let factory = parser.factory();
    let tree = factory.tree();
    let is_operator = tree.tex_class(op) == TexClass::Op || tree.property(op, "movesupsub").is_some();
    if !is_operator {
        return Err(TexError::new(MISPLACED_LIMITS, [name]));
    }
    let swapped = match (tree.kind(op), limits) {
        (NodeKind::Msubsup, true) => Some(NodeKind::Munderover),
        (NodeKind::Msub, true) => Some(NodeKind::Munder),
        (NodeKind::Msup, true) => Some(NodeKind::Mover),
        (NodeKind::Munderover, false) => Some(NodeKind::Msubsup),
        (NodeKind::Munder, false) => Some(NodeKind::Msub),
        (NodeKind::Mover, false) => Some(NodeKind::Msup),
        _ => None,
    };
    if let Some(kind) = swapped {
        factory.rekind(op, kind);
    }
    let core = match factory.tree().kind(op) {
        kind if kind.is_script() => factory.tree().children(op).first().copied().unwrap_or(op),
        _ => op,
    };
    let tree = factory.tree_mut();
    tree.set_property(op, "movesupsub", Property::Bool(limits));
    if tree.kind(core) == NodeKind::Mo {
        tree.set_attribute(core, "movablelimits", "false");
    }
    Ok(())
}
