//! The `color` package: `\color`, `\textcolor`, `\colorbox` and
//! `\definecolor`

use std::rc::Rc;

use crate::core::items::ItemKind;
use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, SymbolMap};
use crate::core::tree::NodeKind;
use crate::data::colors::parse_color;
use crate::utils::error::ParseResult;

use super::Configuration;

/// Read `[model]{spec}` and resolve it. Colours defined in the formula
/// take precedence over named colours.
fn get_color(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let model = parser.get_bracket(name)?;
    let spec = parser.get_argument(name)?;
    resolve(parser, model.as_deref(), &spec)
}

fn resolve(parser: &mut TexParser<'_>, model: Option<&str>, spec: &str) -> ParseResult<String> {
    let model = model.map(str::trim).filter(|m| !m.is_empty());
    if model.is_none() {
        if let Some(defined) = parser.context().colors.get(spec.trim()) {
            return Ok(defined.clone());
        }
    }
    let default_model = parser.options().color_model.clone();
    parse_color(Some(model.unwrap_or(&default_model)), spec)
}

/// `\color{c}`: colours the rest of the group
fn color(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    if let Some(env) = parser.env_mut() {
        env.color = Some(color.clone());
    }
    let item = parser.item(ItemKind::Style {
        attributes: vec![("mathcolor".to_string(), color)],
    });
    parser.push(item)
}

/// `\textcolor{c}{math}`
fn text_color(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    let text = parser.get_argument(name)?;
    let mut env = (*parser.env()).clone();
    env.color = Some(color.clone());
    let content = parser.sub_parse(&text, Rc::new(env))?;
    let node = parser
        .factory()
        .create(NodeKind::Mstyle, &[("mathcolor", color.as_str())], &[content]);
    parser.push_node(node)
}

/// `\colorbox{c}{text}`: text on a coloured background
fn color_box(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    let content = parser.parse_text_arg(name)?;
    let node = parser.factory().create(
        NodeKind::Mpadded,
        &[
            ("mathbackground", color.as_str()),
            ("width", "+10px"),
            ("height", "+5px"),
            ("depth", "+5px"),
            ("lspace", "5px"),
        ],
        &[content],
    );
    parser.push_node(node)
}

/// `\definecolor{name}{model}{spec}`: local to the formula
fn define_color(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let color_name = parser.get_argument(name)?.trim().to_string();
    let model = parser.get_argument(name)?;
    let spec = parser.get_argument(name)?;
    let value = parse_color(Some(model.trim()), &spec)?;
    parser.context().colors.insert(color_name, value);
    Ok(())
}

fn macros() -> SymbolMap {
    SymbolMap::new("color")
        .command("color", color, &[])
        .command("textcolor", text_color, &[])
        .command("colorbox", color_box, &[])
        .command("definecolor", define_color, &[])
}

pub fn configuration() -> Configuration {
    Configuration::new("color")
        .requires(&["base"])
        .map(HandlerKind::Macro, macros())
}
