//! The `ams` package: AMS fractions, operator names, extensible arrows,
//! equation numbering and the display environments

use std::rc::Rc;

use crate::core::handlers::arrays::{self, begin_frame, start_array, table_state};
use crate::core::handlers::tokens;
use crate::core::items::{fenced, ItemKind};
use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, MacroSymbol, Symbol, SymbolMap};
use crate::core::tree::{NodeId, NodeKind, Property, TexClass};
use crate::data::constants::{em, match_dimen};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

use super::Configuration;

use HandlerArg::{Bool, Int, Str};

const ILLEGAL_ALIGN: ErrorKind = ErrorKind::Custom {
    id: "IllegalAlign",
    template: "Illegal alignment specified in %1",
};

/// `\genfrac{left}{right}{thickness}{style}{num}{den}`
fn genfrac(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let open = delimiter_argument(parser, name)?;
    let close = delimiter_argument(parser, name)?;
    let thickness = parser.get_argument(name)?.trim().to_string();
    let style = parser.get_argument(name)?.trim().to_string();
    let numerator = parser.parse_arg(name)?;
    let denominator = parser.parse_arg(name)?;

    let mut attrs = Vec::new();
    if !thickness.is_empty() {
        let dimen = match match_dimen(&thickness) {
            Some((dimen, len)) if thickness[len..].trim().is_empty() => dimen,
            _ => return Err(TexError::new(ErrorKind::MissingDimOrUnits, [name])),
        };
        attrs.push(("linethickness", dimen));
    }
    let refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let mut node = parser
        .factory()
        .create(NodeKind::Mfrac, &refs, &[numerator, denominator]);
    if open.is_some() || close.is_some() {
        let open = open.unwrap_or_default();
        let close = close.unwrap_or_default();
        node = fenced(parser.context(), &open, &[node], &close);
    }
    if !style.is_empty() {
        let (display, level) = match style.as_str() {
            "0" => ("true", "0"),
            "1" => ("false", "0"),
            "2" => ("false", "1"),
            "3" => ("false", "2"),
            _ => return Err(TexError::new(ErrorKind::BadMathStyleFor, [name])),
        };
        node = parser.factory().create(
            NodeKind::Mstyle,
            &[("displaystyle", display), ("scriptlevel", level)],
            &[node],
        );
    }
    parser.push_node(node)
}

/// A delimiter given as an argument; empty means none
fn delimiter_argument(parser: &mut TexParser<'_>, name: &str) -> ParseResult<Option<String>> {
    let arg = parser.get_argument(name)?;
    let key = arg.trim();
    if key.is_empty() {
        return Ok(None);
    }
    match parser.context().registry.lookup_delimiter(key) {
        Some(Symbol::Character(delim)) => Ok(Some(delim.text.to_string())),
        _ => Err(TexError::new(ErrorKind::MissingOrUnrecognizedDelim, [name])),
    }
}

/// `\cfrac[l|r]{num}{den}`: continued fractions keep text style
fn cfrac(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let align = parser.get_bracket(name)?.unwrap_or_default();
    let align = match align.trim() {
        "" | "c" => None,
        "l" => Some("left"),
        "r" => Some("right"),
        _ => return Err(TexError::new(ILLEGAL_ALIGN, [name])),
    };
    let numerator = parser.get_argument(name)?;
    let denominator = parser.get_argument(name)?;
    let env = parser.env();
    let numerator = parser.sub_parse(&format!("\\strut\\textstyle{{{}}}", numerator), Rc::clone(&env))?;
    let denominator = parser.sub_parse(&format!("\\strut\\textstyle{{{}}}", denominator), env)?;
    let mut attrs = Vec::new();
    if let Some(align) = align {
        attrs.push(("numalign", align));
    }
    let frac = parser
        .factory()
        .create(NodeKind::Mfrac, &attrs, &[numerator, denominator]);
    parser.push_node(frac)
}

/// `\operatorname{name}` and `\operatorname*{name}` (limits)
fn operatorname(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let limits = parser.get_star();
    let mut op = parser.parse_roman(name)?;
    let factory = parser.factory();
    if factory.tree().kind(op) != NodeKind::Mi {
        op = factory.node(NodeKind::TeXAtom, &[op]);
    }
    factory.tree_mut().set_tex_class(op, TexClass::Op);
    if limits {
        let tree = factory.tree_mut();
        tree.set_property(op, "movesupsub", Property::Bool(true));
        tree.set_property(op, "movablelimits", Property::Bool(true));
        return parser.push_node(op);
    }
    let mut item = parser.item(ItemKind::Fn);
    item.nodes.push(op);
    parser.push(item)
}

/// `\DeclareMathOperator{\cs}{text}`, starred for limits
fn declare_operator(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let star = if parser.get_star() { "*" } else { "" };
    let cs = parser.get_argument(name)?;
    let cs = cs.trim().trim_start_matches('\\').to_string();
    let text = parser.get_argument(name)?;
    let template = format!("\\operatorname{}{{{}}}", star, text);
    parser
        .context()
        .define_macro(&cs, Symbol::Macro(MacroSymbol::new(template, 0)), None);
    Ok(())
}

/// `\xrightarrow[below]{above}`: bound arrow and padding (mu) on each side
fn xarrow(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let arrow = args.first().and_then(HandlerArg::as_str).unwrap_or("\u{2192}");
    let left = args.get(1).and_then(HandlerArg::as_int).unwrap_or(0) as f64;
    let right = args.get(2).and_then(HandlerArg::as_int).unwrap_or(0) as f64;
    let below = parser.get_bracket(name)?;
    let above = parser.parse_arg(name)?;

    let width = format!("+{}", em((left + right) / 18.0));
    let lspace = em(left / 18.0);
    let padding = [("width", width.as_str()), ("lspace", lspace.as_str()), ("voffset", ".15em")];
    let mo = parser
        .factory()
        .create_token(NodeKind::Mo, &[("stretchy", "true")], arrow);
    parser.factory().tree_mut().set_tex_class(mo, TexClass::Rel);
    let over = parser.factory().create(NodeKind::Mpadded, &padding, &[above]);
    let node = match below.filter(|b| !b.trim().is_empty()) {
        Some(below) => {
            let env = parser.env();
            let under = parser.sub_parse(&below, env)?;
            let under = parser.factory().create(NodeKind::Mpadded, &padding, &[under]);
            parser.factory().node(NodeKind::Munderover, &[mo, under, over])
        }
        None => parser.factory().node(NodeKind::Mover, &[mo, over]),
    };
    let tree = parser.factory().tree_mut();
    tree.set_property(node, "subsupOK", Property::Bool(true));
    tree.set_tex_class(node, TexClass::Rel);
    parser.push_node(node)
}

// Numbering

/// `\tag{text}` and `\tag*{text}`
fn tag(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let starred = parser.get_star();
    let text = parser.get_argument(name)?.trim().to_string();
    if let Some(array) = parser.stack.array() {
        if !array.taggable {
            let env = array.name.clone();
            return Err(TexError::new(ErrorKind::CommandNotAllowedInEnv, [name.to_string(), env]));
        }
    }
    parser.context().tags.set_tag(text, starred)
}

/// `\notag` and `\nonumber`
fn notag(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.context().tags.set_no_tag();
    Ok(())
}

fn label(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let label = parser.get_argument(name)?.trim().to_string();
    parser.context().tags.set_label(label)
}

/// `\ref` (bound `false`) and `\eqref` (bound `true`, with parentheses).
/// The text is filled in once the whole formula is parsed.
fn reference(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let parens = args.first().and_then(HandlerArg::as_bool).unwrap_or(false);
    let label = parser.get_argument(name)?.trim().to_string();
    let placeholder: NodeId = parser
        .factory()
        .create_token(NodeKind::Mtext, &[("class", "MathJax-ref")], "???");
    parser.context().tags.add_reference(placeholder, label, parens);
    parser.push_node(placeholder)
}

// Environments

/// `equation`: one formula, numbered when the bound flag is set
fn equation_env(parser: &mut TexParser<'_>, env: &str, args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let mut state = table_state(env, "c", None, None, Some("D"));
    state.numbered = args.first().and_then(HandlerArg::as_bool).unwrap_or(false);
    state.equation = true;
    state.single_number = true;
    state.taggable = true;
    state.display_env = true;
    start_array(parser, state)
}

/// `multline`: one column, first row left, last row right
fn multline_env(parser: &mut TexParser<'_>, env: &str, args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let mut state = table_state(env, "c", None, Some("0.5em"), Some("D"));
    state.numbered = args.first().and_then(HandlerArg::as_bool).unwrap_or(false);
    state.single_number = true;
    state.taggable = true;
    state.display_env = true;
    state.multline = true;
    state.max_columns = Some((1, ErrorKind::MultlineRowsOneCol));
    start_array(parser, state)
}

/// `\begin{subarray}{align}`: compact script-style rows
fn subarray_env(parser: &mut TexParser<'_>, env: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let align = parser.get_argument(env)?;
    let state = table_state(env, &align, Some("0em"), Some("0.1em"), Some("S"));
    start_array(parser, state)
}

const ALIGN_COLUMNS: &str = "rlrlrlrlrlrl";
const ALIGN_SPACING: &str = "0em 2em 0em 2em 0em 2em 0em 2em 0em 2em 0em";

fn macros() -> SymbolMap {
    SymbolMap::new("ams-macros")
        .command("genfrac", genfrac, &[])
        .macro_("dfrac", "\\genfrac{}{}{}{0}{#1}{#2}", 2)
        .macro_("tfrac", "\\genfrac{}{}{}{1}{#1}{#2}", 2)
        .macro_("binom", "\\genfrac(){0pt}{}{#1}{#2}", 2)
        .macro_("dbinom", "\\genfrac(){0pt}{0}{#1}{#2}", 2)
        .macro_("tbinom", "\\genfrac(){0pt}{1}{#1}{#2}", 2)
        .command("cfrac", cfrac, &[])
        .command("operatorname", operatorname, &[])
        .command("DeclareMathOperator", declare_operator, &[])
        .macro_("substack", "\\begin{subarray}{c}#1\\end{subarray}", 1)
        .command("xrightarrow", xarrow, &[Str("\u{2192}"), Int(5), Int(10)])
        .command("xleftarrow", xarrow, &[Str("\u{2190}"), Int(10), Int(5)])
        .macro_("boxed", "\\fbox{$\\displaystyle{#1}$}", 1)
        .macro_("idotsint", "\\int\\cdots\\int", 0)
        .command("tag", tag, &[])
        .command("notag", notag, &[])
        .command("nonumber", notag, &[])
        .command("label", label, &[])
        .command("ref", reference, &[Bool(false)])
        .command("eqref", reference, &[Bool(true)])
}

fn operators() -> SymbolMap {
    SymbolMap::new("ams-mathchar0mo")
        .with_character_handler(tokens::mathchar0mo)
        .character("iiiint", "\u{2A0C}", &[], None)
        .character("leqslant", "\u{2A7D}", &[], None)
        .character("geqslant", "\u{2A7E}", &[], None)
        .character("lesssim", "\u{2272}", &[], None)
        .character("gtrsim", "\u{2273}", &[], None)
        .character("coloneqq", "\u{2254}", &[], None)
        .character("nleq", "\u{2270}", &[], None)
        .character("ngeq", "\u{2271}", &[], None)
        .character("therefore", "\u{2234}", &[], None)
        .character("because", "\u{2235}", &[], None)
}

fn delimiter_macros() -> SymbolMap {
    SymbolMap::new("ams-delimiter-macros")
        .with_character_handler(tokens::delimiter)
        .character("lvert", "|", &[], Some(TexClass::Open))
        .character("rvert", "|", &[], Some(TexClass::Close))
        .character("lVert", "\u{2016}", &[], Some(TexClass::Open))
        .character("rVert", "\u{2016}", &[], Some(TexClass::Close))
}

fn delimiters() -> SymbolMap {
    SymbolMap::new("ams-delimiter")
        .with_character_handler(tokens::delimiter)
        .character("\\lvert", "|", &[], None)
        .character("\\rvert", "|", &[], None)
        .character("\\lVert", "\u{2016}", &[], None)
        .character("\\rVert", "\u{2016}", &[], None)
}

fn environments() -> SymbolMap {
    let align = |numbered: bool, display: bool| {
        [Str(ALIGN_COLUMNS), Str(ALIGN_SPACING), Bool(numbered), Bool(display), Bool(display)]
    };
    let gather = |numbered: bool, display: bool| {
        [Str("c"), Str(""), Bool(numbered), Bool(display), Bool(display)]
    };
    SymbolMap::new("ams-environment")
        .environment("equation", equation_env, &[Bool(true)])
        .environment("equation*", equation_env, &[Bool(false)])
        .environment("align", arrays::aligned_env, &align(true, true))
        .environment("align*", arrays::aligned_env, &align(false, true))
        .environment("aligned", arrays::aligned_env, &align(false, false))
        .environment("gather", arrays::aligned_env, &gather(true, true))
        .environment("gather*", arrays::aligned_env, &gather(false, true))
        .environment("gathered", arrays::aligned_env, &gather(false, false))
        .environment(
            "split",
            arrays::aligned_env,
            &[Str("rl"), Str("0em"), Bool(false), Bool(false), Bool(false)],
        )
        .environment("multline", multline_env, &[Bool(true)])
        .environment("multline*", multline_env, &[Bool(false)])
        .environment(
            "smallmatrix",
            arrays::matrix_env,
            &[Str(""), Str(""), Str("c"), Str("0.333em"), Str("0.2em"), Str("S")],
        )
        .environment("subarray", subarray_env, &[])
}

pub fn configuration() -> Configuration {
    Configuration::new("ams")
        .requires(&["base"])
        .map(HandlerKind::Delimiter, delimiters())
        .map(HandlerKind::Macro, macros())
        .map(HandlerKind::Macro, operators())
        .map(HandlerKind::Macro, delimiter_macros())
        .map(HandlerKind::Environment, environments())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        let registry = configuration().registry();
        for name in ["dfrac", "binom", "operatorname", "tag", "eqref", "xrightarrow"] {
            assert!(registry.lookup_macro(name).is_some(), "missing \\{}", name);
        }
        for env in ["align*", "gathered", "multline", "subarray"] {
            assert!(registry.lookup_environment(env).is_some(), "missing {}", env);
        }
        assert!(registry.lookup_delimiter("\\lVert").is_some());
    }
}
