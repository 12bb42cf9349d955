//! Stack frames
//!
//! Each frame decides what happens to an item pushed on top of it: the
//! frame may take the item (a finished node joins its children), let it be
//! pushed, or pop itself and hand a list of replacement items to the frame
//! below. Deferred constructs such as `\over`, `\left ... \right` and
//! pending scripts are resolved this way.

use std::rc::Rc;

use super::parser::ParseContext;
use super::tree::{NodeId, NodeKind, TexClass};
use crate::data::constants;
use crate::utils::error::{ErrorKind, ParseResult, TexError};

/// Scoped settings inherited by frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    /// Key into the variant table
    pub font: Option<&'static str>,
    pub bold_symbol: bool,
    /// Last math-style switch (`displaystyle` ...)
    pub style: Option<&'static str>,
    /// Letter runs form one identifier (`\operatorname`)
    pub multi_letter: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPosition {
    Sub,
    Sup,
}

/// A script operator waiting for its argument
#[derive(Debug, Clone)]
pub struct ScriptState {
    pub base: NodeId,
    pub position: ScriptPosition,
    pub primes: Option<NodeId>,
    /// Scripts go under/over the base
    pub limits: bool,
    /// The base is an under/over construct that takes a fresh script
    pub subsup_ok: bool,
}

/// A generalised fraction waiting for its denominator
#[derive(Debug, Clone)]
pub struct OverState {
    pub name: String,
    pub numerator: Vec<NodeId>,
    pub thickness: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
}

/// Alignment state of an array-like frame
#[derive(Debug, Clone, Default)]
pub struct ArrayState {
    /// Environment name, empty for `\matrix`-style commands
    pub name: String,
    pub rows: Vec<NodeId>,
    pub row: Vec<NodeId>,
    pub attributes: Vec<(String, String)>,
    /// Line style below each finished row
    pub row_lines: Vec<String>,
    /// Extra space after each finished row
    pub row_spacing: Vec<Option<String>>,
    pub base_spacing: Option<String>,
    pub frame_top: Option<String>,
    pub frame_bottom: Option<String>,
    pub frame_left: Option<String>,
    pub frame_right: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
    /// Closed by `}` rather than `\end`
    pub require_close: bool,
    /// Rows get equation numbers
    pub numbered: bool,
    /// `\tag` may be used inside
    pub taggable: bool,
    /// A display equation structure (nesting is checked)
    pub display_env: bool,
    /// The whole environment carries at most one number
    pub single_number: bool,
    /// A single formula rather than a table, unless it carries a label
    pub equation: bool,
    /// Cells allowed per row and the error raised past them
    pub max_columns: Option<(usize, ErrorKind)>,
    /// First row flush left, last row flush right
    pub multline: bool,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Start,
    Stop,
    Open,
    Close,
    Prime { base: NodeId, primes: NodeId },
    Subsup(ScriptState),
    Over(OverState),
    Left { delim: String },
    Right { delim: String },
    Middle { delim: String },
    Begin { name: String },
    End { name: String },
    Array(Box<ArrayState>),
    Fn,
    /// `nested` counts unmatched inner copies of the opening character
    AutoOpen { open: String, close: char, nested: usize },
    AutoClose { close: char },
    Not,
    /// `&` (`row_end == false`) or `\\` / `\cr`
    Cell { row_end: bool, spacing: Option<String> },
    Style { attributes: Vec<(String, String)> },
    Position { name: String, attributes: Vec<(&'static str, String)> },
    Mml(NodeId),
    Null,
}

/// What the top frame does with an incoming item
#[derive(Debug)]
pub enum Outcome {
    Push(StackItem),
    Absorbed,
    /// Pop the top frame and push these items in order
    Replace(Vec<StackItem>),
}

#[derive(Debug, Clone)]
pub struct StackItem {
    pub kind: ItemKind,
    pub nodes: Vec<NodeId>,
    pub env: Rc<Env>,
}

impl StackItem {
    pub fn new(kind: ItemKind, env: Rc<Env>) -> Self {
        StackItem {
            kind,
            nodes: Vec::new(),
            env,
        }
    }

    /// A finished node travelling to its frame
    pub fn mml(node: NodeId) -> Self {
        StackItem::new(ItemKind::Mml(node), Rc::default())
    }

    pub fn name(&self) -> &'static str {
        match &self.kind {
            ItemKind::Start => "start",
            ItemKind::Stop => "stop",
            ItemKind::Open => "open",
            ItemKind::Close => "close",
            ItemKind::Prime { .. } => "prime",
            ItemKind::Subsup(_) => "subsup",
            ItemKind::Over(_) => "over",
            ItemKind::Left { .. } => "left",
            ItemKind::Right { .. } => "right",
            ItemKind::Middle { .. } => "middle",
            ItemKind::Begin { .. } => "begin",
            ItemKind::End { .. } => "end",
            ItemKind::Array(_) => "array",
            ItemKind::Fn => "fn",
            ItemKind::AutoOpen { .. } => "auto open",
            ItemKind::AutoClose { .. } => "auto close",
            ItemKind::Not => "not",
            ItemKind::Cell { .. } => "cell",
            ItemKind::Style { .. } => "style",
            ItemKind::Position { .. } => "position",
            ItemKind::Mml(_) => "mml",
            ItemKind::Null => "null",
        }
    }

    /// Frames that collect children and may serve as a numerator
    pub fn is_open(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Start
                | ItemKind::Open
                | ItemKind::Left { .. }
                | ItemKind::Begin { .. }
                | ItemKind::Array(_)
                | ItemKind::AutoOpen { .. }
                | ItemKind::Style { .. }
        )
    }

    /// Items that end the frame below them
    pub fn is_close(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Stop
                | ItemKind::Close
                | ItemKind::Right { .. }
                | ItemKind::Middle { .. }
                | ItemKind::End { .. }
                | ItemKind::Cell { .. }
                | ItemKind::AutoClose { .. }
        )
    }

    /// Decide what happens to `item` pushed on top of this frame
    pub(crate) fn check(&mut self, item: StackItem, ctx: &mut ParseContext) -> ParseResult<Outcome> {
        match &mut self.kind {
            ItemKind::Start => {
                if let ItemKind::Stop = item.kind {
                    let node = rowify(ctx, std::mem::take(&mut self.nodes));
                    return Ok(Outcome::Replace(vec![StackItem::mml(node)]));
                }
                self.base_check(item)
            }
            ItemKind::Open => match item.kind {
                ItemKind::Close => {
                    let nodes = std::mem::take(&mut self.nodes);
                    let atom = ctx.factory.node(NodeKind::TeXAtom, &nodes);
                    ctx.factory.tree_mut().set_tex_class(atom, TexClass::Ord);
                    Ok(Outcome::Replace(vec![StackItem::mml(atom)]))
                }
                ItemKind::Stop => Err(TexError::simple(ErrorKind::ExtraOpenMissingClose)),
                _ => self.base_check(item),
            },
            ItemKind::Prime { base, primes } => {
                let script = attach_primes(ctx, *base, *primes);
                Ok(Outcome::Replace(vec![StackItem::mml(script), item]))
            }
            ItemKind::Subsup(state) => match item.kind {
                ItemKind::Mml(arg) => {
                    let script = fill_script(ctx, state, arg);
                    Ok(Outcome::Replace(vec![StackItem::mml(script)]))
                }
                ItemKind::Null => Ok(Outcome::Absorbed),
                ItemKind::Over(_) => Err(TexError::simple(ErrorKind::MissingScript)),
                _ if item.is_close() => Err(TexError::simple(ErrorKind::MissingScript)),
                _ => Ok(Outcome::Push(item)),
            },
            ItemKind::Over(state) => {
                if let ItemKind::Over(incoming) = &item.kind {
                    return Err(TexError::new(ErrorKind::AmbiguousUseOf, [incoming.name.clone()]));
                }
                if item.is_close() {
                    let denominator = std::mem::take(&mut self.nodes);
                    let frac = build_fraction(ctx, state, denominator);
                    return Ok(Outcome::Replace(vec![StackItem::mml(frac), item]));
                }
                self.base_check(item)
            }
            ItemKind::Left { delim } => match item.kind {
                ItemKind::Right { delim: right } => {
                    let nodes = std::mem::take(&mut self.nodes);
                    let row = fenced(ctx, delim, &nodes, &right);
                    Ok(Outcome::Replace(vec![StackItem::mml(row)]))
                }
                ItemKind::Middle { delim: middle } => {
                    let mo = ctx.factory.create_token(
                        NodeKind::Mo,
                        &[("stretchy", "true"), ("symmetric", "true")],
                        &middle,
                    );
                    self.nodes.push(mo);
                    Ok(Outcome::Absorbed)
                }
                ItemKind::Stop => Err(TexError::simple(ErrorKind::ExtraLeftMissingRight)),
                _ => self.base_check(item),
            },
            ItemKind::Begin { name } => match &item.kind {
                ItemKind::End { name: end } => {
                    if end != name {
                        return Err(TexError::new(
                            ErrorKind::EnvBadEnd,
                            [name.clone(), end.clone()],
                        ));
                    }
                    let node = rowify(ctx, std::mem::take(&mut self.nodes));
                    Ok(Outcome::Replace(vec![StackItem::mml(node)]))
                }
                ItemKind::Stop => Err(TexError::new(ErrorKind::EnvMissingEnd, [name.clone()])),
                _ => self.base_check(item),
            },
            ItemKind::Array(state) => match &item.kind {
                ItemKind::Cell { row_end, .. } if state.equation => {
                    if *row_end {
                        return Ok(Outcome::Absorbed);
                    }
                    Err(TexError::new(ErrorKind::Misplaced, ["&"]))
                }
                ItemKind::Cell { row_end, spacing } => {
                    let nodes = std::mem::take(&mut self.nodes);
                    end_entry(ctx, state, nodes)?;
                    if *row_end {
                        end_row(ctx, state, spacing.clone());
                    }
                    Ok(Outcome::Absorbed)
                }
                _ if item.is_close() => {
                    let nodes = std::mem::take(&mut self.nodes);
                    let table = end_table(ctx, state, nodes)?;
                    if state.require_close {
                        return match item.kind {
                            ItemKind::Close => Ok(Outcome::Replace(vec![StackItem::mml(table)])),
                            _ => Err(TexError::simple(ErrorKind::MissingCloseBrace)),
                        };
                    }
                    Ok(Outcome::Replace(vec![StackItem::mml(table), item]))
                }
                _ => self.base_check(item),
            },
            ItemKind::Fn => {
                let Some(&function) = self.nodes.first() else {
                    return self.base_check(item);
                };
                match &item.kind {
                    ItemKind::Open | ItemKind::Left { .. } | ItemKind::AutoOpen { .. } => {
                        Ok(Outcome::Push(item))
                    }
                    ItemKind::Mml(node) => {
                        let tree = ctx.factory.tree();
                        let operator = tree.kind(*node) == NodeKind::Mo
                            && tree.tex_class(*node) != TexClass::Open;
                        if operator {
                            return Ok(Outcome::Replace(vec![StackItem::mml(function), item]));
                        }
                        let apply = ctx.factory.create_token(NodeKind::Mo, &[], "\u{2061}");
                        ctx.factory.tree_mut().set_tex_class(apply, TexClass::None);
                        Ok(Outcome::Replace(vec![
                            StackItem::mml(function),
                            StackItem::mml(apply),
                            item,
                        ]))
                    }
                    _ => Ok(Outcome::Replace(vec![StackItem::mml(function), item])),
                }
            }
            ItemKind::AutoOpen { open, close, .. } => {
                let closes = match item.kind {
                    ItemKind::AutoClose { close: c } => c == *close,
                    ItemKind::Close => *close == '}',
                    _ => false,
                };
                if closes {
                    let nodes = std::mem::take(&mut self.nodes);
                    let row = fenced(ctx, open, &nodes, &close.to_string());
                    return Ok(Outcome::Replace(vec![StackItem::mml(row)]));
                }
                if let ItemKind::Stop = item.kind {
                    return Err(TexError::simple(ErrorKind::ExtraOpenMissingClose));
                }
                self.base_check(item)
            }
            ItemKind::Not => match item.kind {
                ItemKind::Open | ItemKind::Left { .. } => Ok(Outcome::Push(item)),
                ItemKind::Mml(node) if negatable(ctx, node) => {
                    negate(ctx, node);
                    Ok(Outcome::Replace(vec![StackItem::mml(node)]))
                }
                _ => {
                    let slash = ctx.factory.create_token(NodeKind::Mtext, &[], "\u{29F8}");
                    Ok(Outcome::Replace(vec![StackItem::mml(slash), item]))
                }
            },
            ItemKind::Style { attributes } => {
                if item.is_close() {
                    let attrs: Vec<(&str, &str)> = attributes
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str()))
                        .collect();
                    let nodes = std::mem::take(&mut self.nodes);
                    let style = ctx.factory.create(NodeKind::Mstyle, &attrs, &nodes);
                    return Ok(Outcome::Replace(vec![StackItem::mml(style), item]));
                }
                self.base_check(item)
            }
            ItemKind::Position { name, attributes } => match item.kind {
                ItemKind::Mml(node) => {
                    let attrs: Vec<(&str, &str)> =
                        attributes.iter().map(|(k, v)| (*k, v.as_str())).collect();
                    let padded = ctx.factory.create(NodeKind::Mpadded, &attrs, &[node]);
                    Ok(Outcome::Replace(vec![StackItem::mml(padded)]))
                }
                _ if item.is_close() => {
                    Err(TexError::new(ErrorKind::MissingBoxFor, [name.clone()]))
                }
                _ => Ok(Outcome::Push(item)),
            },
            _ => Ok(Outcome::Push(item)),
        }
    }

    /// Behaviour shared by all frames
    fn base_check(&mut self, mut item: StackItem) -> ParseResult<Outcome> {
        if self.is_open() {
            if let ItemKind::Over(state) = &mut item.kind {
                state.numerator = std::mem::take(&mut self.nodes);
                return Ok(Outcome::Push(item));
            }
            if let ItemKind::Cell { row_end, .. } = item.kind {
                if row_end {
                    return Ok(Outcome::Absorbed);
                }
                return Err(TexError::new(ErrorKind::Misplaced, ["&"]));
            }
        }
        match &item.kind {
            ItemKind::End { name } => {
                Err(TexError::new(ErrorKind::MissingBeginExtraEnd, [name.clone()]))
            }
            ItemKind::Close => Err(TexError::simple(ErrorKind::ExtraCloseMissingOpen)),
            ItemKind::Right { .. } => Err(TexError::simple(ErrorKind::MissingLeftExtraRight)),
            ItemKind::Middle { .. } => Err(TexError::simple(ErrorKind::ExtraMiddle)),
            ItemKind::AutoClose { close } => {
                Err(TexError::new(ErrorKind::Misplaced, [close.to_string()]))
            }
            ItemKind::Mml(node) => {
                self.nodes.push(*node);
                Ok(Outcome::Absorbed)
            }
            ItemKind::Null => Ok(Outcome::Absorbed),
            _ => Ok(Outcome::Push(item)),
        }
    }
}

/// One node stays itself, none give an empty row, several a row
pub(crate) fn rowify(ctx: &mut ParseContext, nodes: Vec<NodeId>) -> NodeId {
    match nodes.as_slice() {
        [only] => *only,
        _ => ctx.factory.node(NodeKind::Mrow, &nodes),
    }
}

/// Inner-class row with stretchy fences around `content`
pub(crate) fn fenced(ctx: &mut ParseContext, open: &str, content: &[NodeId], close: &str) -> NodeId {
    let attrs = [("fence", "true"), ("stretchy", "true"), ("symmetric", "true")];
    let left = ctx.factory.create_token(NodeKind::Mo, &attrs, open);
    ctx.factory.tree_mut().set_tex_class(left, TexClass::Open);
    let right = ctx.factory.create_token(NodeKind::Mo, &attrs, close);
    ctx.factory.tree_mut().set_tex_class(right, TexClass::Close);
    let mut children = Vec::with_capacity(content.len() + 2);
    children.push(left);
    children.extend_from_slice(content);
    children.push(right);
    let row = ctx.factory.node(NodeKind::Mrow, &children);
    ctx.factory.tree_mut().set_tex_class(row, TexClass::Inner);
    row
}

fn attach_primes(ctx: &mut ParseContext, base: NodeId, primes: NodeId) -> NodeId {
    let factory = &mut ctx.factory;
    if factory.tree().kind(base) == NodeKind::Msub {
        factory.rekind(base, NodeKind::Msubsup);
        factory.tree_mut().append_child(base, primes);
        return base;
    }
    factory.node(NodeKind::Msup, &[base, primes])
}

fn fill_script(ctx: &mut ParseContext, state: &ScriptState, arg: NodeId) -> NodeId {
    let factory = &mut ctx.factory;
    let base = state.base;
    let base_kind = factory.tree().kind(base);
    let extend = !state.subsup_ok;
    let script = match state.position {
        ScriptPosition::Sup => {
            let sup = match state.primes {
                Some(primes) => factory.node(NodeKind::Mrow, &[primes, arg]),
                None => arg,
            };
            match base_kind {
                NodeKind::Msub if extend => {
                    factory.rekind(base, NodeKind::Msubsup);
                    factory.tree_mut().append_child(base, sup);
                    base
                }
                NodeKind::Munder if extend => {
                    factory.rekind(base, NodeKind::Munderover);
                    factory.tree_mut().append_child(base, sup);
                    base
                }
                _ if state.limits => factory.node(NodeKind::Mover, &[base, sup]),
                _ => factory.node(NodeKind::Msup, &[base, sup]),
            }
        }
        ScriptPosition::Sub => match base_kind {
            NodeKind::Msup if extend && state.primes.is_none() => {
                factory.rekind(base, NodeKind::Msubsup);
                factory.tree_mut().insert_child(base, 1, arg);
                base
            }
            NodeKind::Mover if extend && state.primes.is_none() => {
                factory.rekind(base, NodeKind::Munderover);
                factory.tree_mut().insert_child(base, 1, arg);
                base
            }
            _ => match (state.primes, state.limits) {
                (Some(primes), false) => factory.node(NodeKind::Msubsup, &[base, arg, primes]),
                (Some(primes), true) => factory.node(NodeKind::Munderover, &[base, arg, primes]),
                (None, true) => factory.node(NodeKind::Munder, &[base, arg]),
                (None, false) => factory.node(NodeKind::Msub, &[base, arg]),
            },
        },
    };
    if state.limits {
        factory
            .tree_mut()
            .set_property(script, "movesupsub", super::tree::Property::Bool(true));
    }
    script
}

fn build_fraction(ctx: &mut ParseContext, state: &mut OverState, denominator: Vec<NodeId>) -> NodeId {
    let numerator = std::mem::take(&mut state.numerator);
    let num = group(ctx, numerator);
    let den = group(ctx, denominator);
    let mut attrs = Vec::new();
    if let Some(thickness) = &state.thickness {
        attrs.push(("linethickness", thickness.as_str()));
    }
    let frac = ctx.factory.create(NodeKind::Mfrac, &attrs, &[num, den]);
    if state.open.is_none() && state.close.is_none() {
        return frac;
    }
    ctx.factory
        .tree_mut()
        .set_property(frac, "withDelims", super::tree::Property::Bool(true));
    let open = state.open.clone().unwrap_or_default();
    let close = state.close.clone().unwrap_or_default();
    fenced(ctx, &open, &[frac], &close)
}

/// Single node, or an explicit row
fn group(ctx: &mut ParseContext, nodes: Vec<NodeId>) -> NodeId {
    match nodes.as_slice() {
        [only] => *only,
        _ => ctx.factory.node(NodeKind::Mrow, &nodes),
    }
}

fn negatable(ctx: &ParseContext, node: NodeId) -> bool {
    let tree = ctx.factory.tree();
    tree.kind(node) == NodeKind::Mo && tree.text(node).chars().count() == 1
}

fn negate(ctx: &mut ParseContext, node: NodeId) {
    let text = ctx.factory.tree().text(node);
    let negated = match text.as_str() {
        "=" => "\u{2260}".to_string(),
        "<" => "\u{226E}".to_string(),
        ">" => "\u{226F}".to_string(),
        "\u{2208}" => "\u{2209}".to_string(),
        "\u{220B}" => "\u{220C}".to_string(),
        "\u{2261}" => "\u{2262}".to_string(),
        "\u{2264}" => "\u{2270}".to_string(),
        "\u{2265}" => "\u{2271}".to_string(),
        "\u{223C}" => "\u{2241}".to_string(),
        "\u{2243}" => "\u{2244}".to_string(),
        "\u{2245}" => "\u{2247}".to_string(),
        "\u{2248}" => "\u{2249}".to_string(),
        "\u{2282}" => "\u{2284}".to_string(),
        "\u{2283}" => "\u{2285}".to_string(),
        "\u{2286}" => "\u{2288}".to_string(),
        "\u{2287}" => "\u{2289}".to_string(),
        "\u{2203}" => "\u{2204}".to_string(),
        "\u{2192}" => "\u{219B}".to_string(),
        "\u{2190}" => "\u{219A}".to_string(),
        "\u{2194}" => "\u{21AE}".to_string(),
        "\u{21D2}" => "\u{21CF}".to_string(),
        "\u{21D0}" => "\u{21CD}".to_string(),
        "\u{21D4}" => "\u{21CE}".to_string(),
        "\u{2223}" => "\u{2224}".to_string(),
        "\u{2225}" => "\u{2226}".to_string(),
        "\u{227A}" => "\u{2280}".to_string(),
        "\u{227B}" => "\u{2281}".to_string(),
        "\u{22A2}" => "\u{22AC}".to_string(),
        "\u{22A8}" => "\u{22AD}".to_string(),
        other => format!("{}\u{0338}", other),
    };
    ctx.factory.tree_mut().set_token_text(node, &negated);
}

fn end_entry(ctx: &mut ParseContext, state: &mut ArrayState, nodes: Vec<NodeId>) -> ParseResult<()> {
    let mtd = ctx.factory.node(NodeKind::Mtd, &nodes);
    state.row.push(mtd);
    if let Some((max, kind)) = state.max_columns {
        if state.row.len() > max {
            return Err(TexError::new(kind, [state.name.clone()]));
        }
    }
    Ok(())
}

fn end_row(ctx: &mut ParseContext, state: &mut ArrayState, spacing: Option<String>) {
    // Single-number environments label only their last row
    let label = if state.single_number {
        None
    } else {
        ctx.tags.row_label(state.numbered)
    };
    push_row(ctx, state, label);
    if let Some(last) = state.row_spacing.last_mut() {
        *last = spacing;
    }
}

fn push_row(ctx: &mut ParseContext, state: &mut ArrayState, label: Option<String>) {
    let cells = std::mem::take(&mut state.row);
    let row = match label {
        Some(text) => {
            let mut children = vec![label_cell(ctx, &text)];
            children.extend(cells);
            ctx.factory.node(NodeKind::Mlabeledtr, &children)
        }
        None => ctx.factory.node(NodeKind::Mtr, &cells),
    };
    state.rows.push(row);
    state.row_spacing.push(None);
}

fn label_cell(ctx: &mut ParseContext, text: &str) -> NodeId {
    let mtext = ctx.factory.create_token(NodeKind::Mtext, &[], text);
    ctx.factory.node(NodeKind::Mtd, &[mtext])
}

fn end_table(ctx: &mut ParseContext, state: &mut ArrayState, nodes: Vec<NodeId>) -> ParseResult<NodeId> {
    let trailing = !nodes.is_empty() || !state.row.is_empty();
    if trailing {
        end_entry(ctx, state, nodes)?;
    }
    if state.single_number {
        let label = ctx.tags.row_label(state.numbered);
        if trailing {
            push_row(ctx, state, label);
        } else if let (Some(text), Some(&last)) = (label, state.rows.last()) {
            let cell = label_cell(ctx, &text);
            ctx.factory.rekind(last, NodeKind::Mlabeledtr);
            ctx.factory.tree_mut().insert_child(last, 0, cell);
        }
    } else if trailing {
        end_row(ctx, state, None);
    }
    if state.display_env {
        ctx.tags.leave_display();
    }
    if state.equation {
        return Ok(finish_equation(ctx, state));
    }
    Ok(create_table(ctx, state))
}

/// An equation without a label is just its content
fn finish_equation(ctx: &mut ParseContext, state: &mut ArrayState) -> NodeId {
    let labelled = state
        .rows
        .iter()
        .any(|&row| ctx.factory.tree().kind(row) == NodeKind::Mlabeledtr);
    if labelled {
        return create_table(ctx, state);
    }
    let content: Vec<NodeId> = state
        .rows
        .iter()
        .flat_map(|&row| ctx.factory.tree().children(row).to_vec())
        .flat_map(|cell| ctx.factory.tree().children(cell).to_vec())
        .collect();
    rowify(ctx, content)
}

fn create_table(ctx: &mut ParseContext, state: &mut ArrayState) -> NodeId {
    let mut attrs: Vec<(String, String)> = state.attributes.clone();

    // A line after the last row is the bottom frame
    if state.row_lines.len() >= state.rows.len() && !state.rows.is_empty() {
        let last = state.row_lines.len() - 1;
        if state.row_lines[last] != "none" {
            state.frame_bottom = Some(state.row_lines[last].clone());
        }
        state.row_lines.truncate(state.rows.len().saturating_sub(1));
    }
    if state.row_lines.iter().any(|l| l != "none") {
        let mut lines = state.row_lines.clone();
        lines.resize(state.rows.len().saturating_sub(1).max(1), "none".to_string());
        attrs.push(("rowlines".to_string(), lines.join(" ")));
    }
    if state.row_spacing.iter().take(state.rows.len().saturating_sub(1)).any(Option::is_some) {
        let base = state.base_spacing.clone().unwrap_or_else(|| "0.5em".to_string());
        let base_em = constants::dimen_to_em(&base).unwrap_or(0.5);
        let spacing: Vec<String> = state
            .row_spacing
            .iter()
            .take(state.rows.len().saturating_sub(1))
            .map(|extra| match extra.as_deref().and_then(constants::dimen_to_em) {
                Some(add) => constants::em((base_em + add).max(0.0)),
                None => base.clone(),
            })
            .collect();
        attrs.retain(|(k, _)| k != "rowspacing");
        attrs.push(("rowspacing".to_string(), spacing.join(" ")));
    }
    let frame = [
        &state.frame_top,
        &state.frame_right,
        &state.frame_bottom,
        &state.frame_left,
    ];
    if frame.iter().all(|side| side.as_deref() == Some("solid")) {
        attrs.push(("frame".to_string(), "solid".to_string()));
    } else if frame.iter().any(|side| side.is_some()) {
        let styles: Vec<&str> = frame
            .iter()
            .map(|side| side.as_deref().unwrap_or("none"))
            .collect();
        attrs.push(("data-frame-styles".to_string(), styles.join(" ")));
    }
    if state.multline && state.rows.len() > 1 {
        let first = state.rows[0];
        let last = state.rows[state.rows.len() - 1];
        ctx.factory.tree_mut().set_attribute(first, "columnalign", "left");
        ctx.factory.tree_mut().set_attribute(last, "columnalign", "right");
    }
    let attr_refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let rows = std::mem::take(&mut state.rows);
    let table = ctx.factory.create(NodeKind::Mtable, &attr_refs, &rows);
    match (&state.open, &state.close) {
        (None, None) => table,
        (open, close) => {
            let open = open.clone().unwrap_or_default();
            let close = close.clone().unwrap_or_default();
            fenced(ctx, &open, &[table], &close)
        }
    }
}
