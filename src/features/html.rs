//! The `html` package: `\href`, `\class`, `\cssId` and `\style` attach
//! attributes to the node of their math argument

use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, SymbolMap};
use crate::utils::error::ParseResult;

use super::Configuration;

use HandlerArg::Str;

/// Bound: the attribute to set. `class` values accumulate.
fn attribute(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let attr = args.first().and_then(HandlerArg::as_str).unwrap_or("class");
    let value = parser.get_argument(name)?.trim().to_string();
    let node = parser.parse_arg(name)?;
    let tree = parser.factory().tree_mut();
    let value = match (attr, tree.attribute(node, attr)) {
        ("class", Some(existing)) => format!("{} {}", existing, value),
        _ => value,
    };
    tree.set_attribute(node, attr, value);
    parser.push_node(node)
}

fn macros() -> SymbolMap {
    SymbolMap::new("html")
        .command("href", attribute, &[Str("href")])
        .command("class", attribute, &[Str("class")])
        .command("cssId", attribute, &[Str("id")])
        .command("style", attribute, &[Str("style")])
}

pub fn configuration() -> Configuration {
    Configuration::new("html")
        .requires(&["base"])
        .map(HandlerKind::Macro, macros())
}
