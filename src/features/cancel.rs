//! The `cancel` package: strike-through notations

use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, SymbolMap};
use crate::core::tree::{NodeId, NodeKind};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

use super::Configuration;

use HandlerArg::Str;

const INVALID_OPTION: ErrorKind = ErrorKind::Custom {
    id: "InvalidOption",
    template: "Invalid option: %1",
};

const UP: &str = "updiagonalstrike";
const DOWN: &str = "downdiagonalstrike";
const BOTH: &str = "updiagonalstrike downdiagonalstrike";
const TO: &str = "updiagonalstrike updiagonalarrow northeastarrow";

/// `[key=value,...]` options as menclose attributes
fn enclose_options(options: &str) -> ParseResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for entry in options.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        let key = match key.trim() {
            "color" | "mathcolor" => "mathcolor",
            "background" | "mathbackground" => "mathbackground",
            "padding" => "padding",
            "thickness" => "thickness",
            other => return Err(TexError::new(INVALID_OPTION, [other])),
        };
        attrs.push((key.to_string(), value.trim().to_string()));
    }
    Ok(attrs)
}

fn enclose(parser: &mut TexParser<'_>, notation: &str, options: &str, content: NodeId) -> ParseResult<NodeId> {
    let mut attrs = enclose_options(options)?;
    attrs.insert(0, ("notation".to_string(), notation.to_string()));
    let refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    Ok(parser.factory().create(NodeKind::Menclose, &refs, &[content]))
}

/// `\cancel`, `\bcancel`, `\xcancel`; bound: the notation
fn cancel(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let notation = args.first().and_then(HandlerArg::as_str).unwrap_or(UP);
    let options = parser.get_bracket(name)?.unwrap_or_default();
    let content = parser.parse_arg(name)?;
    let node = enclose(parser, notation, &options, content)?;
    parser.push_node(node)
}

/// `\cancelto{value}[options]{expression}`: an arrow to the value, set as
/// a superscript
fn cancel_to(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let value = parser.parse_arg(name)?;
    let options = parser.get_bracket(name)?.unwrap_or_default();
    let content = parser.parse_arg(name)?;
    let enclosed = enclose(parser, TO, &options, content)?;
    let factory = parser.factory();
    let padded = factory.create(
        NodeKind::Mpadded,
        &[("depth", "-.1em"), ("height", "+.1em"), ("voffset", ".1em")],
        &[value],
    );
    let node = factory.node(NodeKind::Msup, &[enclosed, padded]);
    parser.push_node(node)
}

fn macros() -> SymbolMap {
    SymbolMap::new("cancel")
        .command("cancel", cancel, &[Str(UP)])
        .command("bcancel", cancel, &[Str(DOWN)])
        .command("xcancel", cancel, &[Str(BOTH)])
        .command("cancelto", cancel_to, &[])
}

pub fn configuration() -> Configuration {
    Configuration::new("cancel")
        .requires(&["base"])
        .map(HandlerKind::Macro, macros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclose_options() {
        let attrs = enclose_options("color=red, padding=1px").unwrap();
        assert_eq!(
            attrs,
            vec![
                ("mathcolor".to_string(), "red".to_string()),
                ("padding".to_string(), "1px".to_string())
            ]
        );
        assert!(enclose_options("").unwrap().is_empty());
        let err = enclose_options("angle=45").unwrap_err();
        assert_eq!(err.id(), "InvalidOption");
    }
}
