//! `\left`/`\right`/`\middle`, fixed-size delimiters and infix fractions

use crate::core::items::{ItemKind, OverState};
use crate::core::parser::TexParser;
use crate::core::symbols::HandlerArg;
use crate::core::tree::{NodeKind, TexClass};
use crate::data::constants::em;
use crate::utils::error::ParseResult;

pub fn left(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let delim = parser.get_delimiter(name, false)?;
    let item = parser.item(ItemKind::Left { delim });
    parser.push(item)
}

pub fn right(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let delim = parser.get_delimiter(name, false)?;
    let item = parser.item(ItemKind::Right { delim });
    parser.push(item)
}

pub fn middle(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let delim = parser.get_delimiter(name, false)?;
    let item = parser.item(ItemKind::Middle { delim });
    parser.push(item)
}

/// `\big`, `\Bigl`, `\biggm` ...: bound class and size in em
pub fn big(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let class = args.first().and_then(HandlerArg::as_class).unwrap_or(TexClass::Ord);
    let size = em(args.get(1).and_then(HandlerArg::as_num).unwrap_or(1.0) as f64);
    let delim = parser.get_delimiter(name, false)?;
    let factory = parser.factory();
    let mo = factory.create_token(
        NodeKind::Mo,
        &[
            ("minsize", size.as_str()),
            ("maxsize", size.as_str()),
            ("stretchy", "true"),
            ("symmetric", "true"),
        ],
        &delim,
    );
    let atom = factory.node(NodeKind::TeXAtom, &[mo]);
    factory.tree_mut().set_tex_class(atom, class);
    parser.push_node(atom)
}

/// `\over`, `\atop`, `\above`, `\choose` and the `withdelims` forms.
/// Bound arguments: open delimiter, close delimiter, rule thickness (empty
/// for "not given"). `\above` reads its thickness, `withdelims` forms read
/// both delimiters.
pub fn over(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let given = |i: usize| {
        args.get(i)
            .and_then(HandlerArg::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let mut open = given(0);
    let mut close = given(1);
    let mut thickness = given(2);
    if name.ends_with("withdelims") {
        open = Some(parser.get_delimiter(name, false)?);
        close = Some(parser.get_delimiter(name, false)?);
    }
    if name.starts_with("\\above") {
        thickness = Some(parser.get_dimen(name)?);
    }
    let item = parser.item(ItemKind::Over(OverState {
        name: name.to_string(),
        numerator: Vec::new(),
        thickness,
        open,
        close,
    }));
    parser.push(item)
}
