//! The `physics` package: automatic fences, vector notation, derivatives,
//! brackets and diagonal matrices

use crate::core::handlers::tokens;
use crate::core::items::ItemKind;
use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{CharacterSymbol, HandlerArg, SymbolMap};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

use super::Configuration;

use HandlerArg::{Bool, Str};

/// Closing character for each automatic fence opener
fn closing_fence(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '|' => Some('|'),
        '{' => Some('}'),
        _ => None,
    }
}

/// `\qty(...)`, `\qty[...]`, `\qty|...|`, `\qty{...}`: fences sized to
/// their content
fn qty(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.buffer.skip_whitespace();
    let open = parser.buffer.peek();
    let Some((open, close)) = open.and_then(|o| closing_fence(o).map(|c| (o, c))) else {
        return Err(TexError::new(ErrorKind::MissingArgFor, [name]));
    };
    parser.buffer.next_char();
    let item = parser.item(ItemKind::AutoOpen {
        open: open.to_string(),
        close,
        nested: 0,
    });
    parser.push(item)
}

/// Fence characters while `\qty` is open: inner pairs stay plain, the
/// matching closer ends the automatic fence
fn fence_character(parser: &mut TexParser<'_>, _name: &str, symbol: &CharacterSymbol) -> ParseResult<()> {
    let Some(c) = symbol.text.chars().next() else {
        return Ok(());
    };
    let mut auto_close = false;
    if let Some(fence) = parser.stack.auto_open_mut() {
        if let ItemKind::AutoOpen { open, close, nested } = &mut fence.kind {
            if *close == c {
                if *nested == 0 {
                    auto_close = true;
                } else {
                    *nested -= 1;
                }
            } else if open.starts_with(c) {
                *nested += 1;
            }
        }
    }
    if auto_close {
        let item = parser.item(ItemKind::AutoClose { close: c });
        return parser.push(item);
    }
    tokens::other(parser, c)
}

/// `\dv[n]{f}{x}` and `\pdv[n]{f}{x}{y}`. Bound: the differential and
/// whether a second variable is accepted.
fn derivative(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let d = args.first().and_then(HandlerArg::as_str).unwrap_or("\\mathrm{d}");
    let mixed = args.get(1).and_then(HandlerArg::as_bool).unwrap_or(false);
    let order = parser.get_bracket(name)?.filter(|n| !n.trim().is_empty());
    let f = parser.get_argument(name)?;
    let text = if parser.next_is('{') {
        let x = parser.get_argument(name)?;
        let y = if mixed && parser.next_is('{') {
            Some(parser.get_argument(name)?)
        } else {
            None
        };
        match (y, order) {
            (Some(y), _) => format!("\\frac{{{d}^{{2}} {f}}}{{{d} {x}\\,{d} {y}}}"),
            (None, Some(n)) => format!("\\frac{{{d}^{{{n}}} {f}}}{{{d} {x}^{{{n}}}}}"),
            (None, None) => format!("\\frac{{{d} {f}}}{{{d} {x}}}"),
        }
    } else {
        match order {
            Some(n) => format!("\\frac{{{d}^{{{n}}}}}{{{d} {f}^{{{n}}}}}"),
            None => format!("\\frac{{{d}}}{{{d} {f}}}"),
        }
    };
    parser.splice(text, ErrorKind::MaxMacroSub1)
}

/// `\dmat{a,b,c}` and `\admat{a,b,c}`. Bound: anti-diagonal.
fn diagonal_matrix(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let anti = args.first().and_then(HandlerArg::as_bool).unwrap_or(false);
    let entries = parser.get_argument(name)?;
    let text = format!("\\begin{{pmatrix}}{}\\end{{pmatrix}}", diagonal_rows(&entries, anti));
    parser.splice(text, ErrorKind::MaxMacroSub1)
}

fn diagonal_rows(entries: &str, anti: bool) -> String {
    let entries: Vec<&str> = entries.split(',').map(str::trim).collect();
    let n = entries.len();
    let rows: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let column = if anti { n - 1 - i } else { i };
            let mut cells = vec![""; n];
            cells[column] = entry;
            cells.join("&")
        })
        .collect();
    rows.join("\\\\")
}

fn characters() -> SymbolMap {
    SymbolMap::new("physics-fences")
        .with_character_handler(fence_character)
        .character("(", "(", &[], None)
        .character(")", ")", &[], None)
        .character("[", "[", &[], None)
        .character("]", "]", &[], None)
        .character("|", "|", &[], None)
}

fn macros() -> SymbolMap {
    SymbolMap::new("physics")
        .command("qty", qty, &[])
        .macro_("abs", "\\left\\vert {#1} \\right\\vert", 1)
        .macro_("norm", "\\left\\Vert {#1} \\right\\Vert", 1)
        .macro_("order", "\\mathcal{O}\\left( {#1} \\right)", 1)
        .macro_("eval", "\\left. {#1} \\right\\vert", 1)
        .macro_("vb", "{\\boldsymbol{\\mathbf{#1}}}", 1)
        .macro_("va", "{\\vec{\\mathbf{#1}}}", 1)
        .macro_("vu", "{\\boldsymbol{\\hat{\\mathbf{#1}}}}", 1)
        .macro_("grad", "{\\boldsymbol{\\nabla}}", 0)
        .macro_("div", "{\\boldsymbol{\\nabla}\\cdot}", 0)
        .macro_("curl", "{\\boldsymbol{\\nabla}\\times}", 0)
        .macro_("laplacian", "{\\nabla^2}", 0)
        .command("dv", derivative, &[Str("\\mathrm{d}"), Bool(false)])
        .command("pdv", derivative, &[Str("\\partial"), Bool(true)])
        .macro_("comm", "\\left[ {#1},{#2} \\right]", 2)
        .macro_("acomm", "\\left\\{ {#1},{#2} \\right\\}", 2)
        .macro_("pb", "\\left\\{ {#1},{#2} \\right\\}", 2)
        .command("dmat", diagonal_matrix, &[Bool(false)])
        .command("admat", diagonal_matrix, &[Bool(true)])
}

pub fn configuration() -> Configuration {
    Configuration::new("physics")
        .requires(&["base", "boldsymbol"])
        .map(HandlerKind::Character, characters())
        .map(HandlerKind::Macro, macros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_rows() {
        assert_eq!(diagonal_rows("a,b", false), "a&\\\\&b");
        assert_eq!(diagonal_rows("a, b, c", true), "&&a\\\\&b&\\\\c&&");
    }

    #[test]
    fn test_closing_fence() {
        assert_eq!(closing_fence('('), Some(')'));
        assert_eq!(closing_fence('|'), Some('|'));
        assert_eq!(closing_fence('x'), None);
    }
}
