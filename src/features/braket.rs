//! The `braket` package: Dirac notation and set builder braces

use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, SymbolMap};
use crate::core::tree::{NodeKind, TexClass};
use crate::utils::error::{ErrorKind, ParseResult};

use super::Configuration;

use HandlerArg::Str;

/// `\bra`, `\ket`, `\braket`, `\set`: an inner row between fixed-size
/// fences. Bound: open and close fences.
fn braket(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let open = args.first().and_then(HandlerArg::as_str).unwrap_or("\u{27E8}");
    let close = args.get(1).and_then(HandlerArg::as_str).unwrap_or("\u{27E9}");
    let content = parser.parse_arg(name)?;
    let factory = parser.factory();
    let attrs = [("fence", "true"), ("stretchy", "false")];
    let left = factory.create_token(NodeKind::Mo, &attrs, open);
    factory.tree_mut().set_tex_class(left, TexClass::Open);
    let right = factory.create_token(NodeKind::Mo, &attrs, close);
    factory.tree_mut().set_tex_class(right, TexClass::Close);
    let content = match factory.tree().kind(content) {
        NodeKind::TeXAtom => content,
        _ => {
            let atom = factory.node(NodeKind::TeXAtom, &[content]);
            factory.tree_mut().set_tex_class(atom, TexClass::Ord);
            atom
        }
    };
    let row = factory.node(NodeKind::Mrow, &[left, content, right]);
    factory.tree_mut().set_tex_class(row, TexClass::Inner);
    parser.push_node(row)
}

/// `\Bra`, `\Ket`, `\Braket`, `\Set`: stretchy fences, and bars at the top
/// level of the argument stretch with them. Bound: `\left` and `\right`
/// delimiters.
fn big_braket(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let open = args.first().and_then(HandlerArg::as_str).unwrap_or("\\langle");
    let close = args.get(1).and_then(HandlerArg::as_str).unwrap_or("\\rangle");
    let content = parser.get_argument(name)?;
    let text = format!("\\left{} {} \\right{}", open, middle_bars(&content), close);
    parser.splice(text, ErrorKind::MaxMacroSub1)
}

/// Turn `|` and `\|` outside braces into `\middle` delimiters
fn middle_bars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut depth = 0usize;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            '|' if depth == 0 => out.push_str("\\middle|"),
            '\\' => match chars.next() {
                Some('|') if depth == 0 => out.push_str("\\middle\\|"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}

fn macros() -> SymbolMap {
    SymbolMap::new("braket")
        .command("bra", braket, &[Str("\u{27E8}"), Str("|")])
        .command("ket", braket, &[Str("|"), Str("\u{27E9}")])
        .command("braket", braket, &[Str("\u{27E8}"), Str("\u{27E9}")])
        .command("set", braket, &[Str("{"), Str("}")])
        .command("Bra", big_braket, &[Str("\\langle"), Str("|")])
        .command("Ket", big_braket, &[Str("|"), Str("\\rangle")])
        .command("Braket", big_braket, &[Str("\\langle"), Str("\\rangle")])
        .command("Set", big_braket, &[Str("\\{"), Str("\\}")])
        .macro_("ketbra", "\\ket{#1}\\!\\bra{#2}", 2)
}

pub fn configuration() -> Configuration {
    Configuration::new("braket")
        .requires(&["base"])
        .map(HandlerKind::Macro, macros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_bars() {
        assert_eq!(middle_bars("a|b"), "a\\middle|b");
        assert_eq!(middle_bars("{a|b}|c"), "{a|b}\\middle|c");
        assert_eq!(middle_bars("x \\| y"), "x \\middle\\| y");
        assert_eq!(middle_bars("\\alpha"), "\\alpha");
    }
}
