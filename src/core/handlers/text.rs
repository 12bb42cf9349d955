//! Text boxes: `\text`, `\mbox`, `\textbf` ... with `$...$` math inside

use std::rc::Rc;

use crate::core::parser::TexParser;
use crate::core::symbols::HandlerArg;
use crate::core::tree::{NodeId, NodeKind};
use crate::data::constants::VARIANTS;
use crate::utils::error::{ErrorKind, ParseResult, TexError};

const MATH_NOT_TERMINATED: ErrorKind = ErrorKind::Custom {
    id: "MathNotTerminated",
    template: "Math mode is not properly terminated",
};

/// `\text{...}`; the bound argument names a font variant
pub fn text(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let font = args.first().and_then(HandlerArg::as_str).filter(|f| !f.is_empty());
    let text = parser.get_argument(name)?;
    for node in internal_math(parser, &text, font)? {
        parser.push_node(node)?;
    }
    Ok(())
}

/// Split box text into `mtext` runs and the math between `$` signs.
/// Spaces at either end of a run become non-breaking spaces.
pub(crate) fn internal_math(parser: &mut TexParser<'_>, text: &str, font: Option<&'static str>) -> ParseResult<Vec<NodeId>> {
    let mut nodes = Vec::new();
    let mut run = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('$' | '%' | '&' | '#' | '_' | '{' | '}')) => run.push(escaped),
                Some(other) => {
                    run.push('\\');
                    run.push(other);
                }
                None => run.push('\\'),
            },
            '$' => {
                flush_run(parser, &mut run, font, &mut nodes);
                let mut math = String::new();
                let mut closed = false;
                while let Some(m) = chars.next() {
                    match m {
                        '$' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            math.push(m);
                            if let Some(next) = chars.next() {
                                math.push(next);
                            }
                        }
                        _ => math.push(m),
                    }
                }
                if !closed {
                    return Err(TexError::simple(MATH_NOT_TERMINATED));
                }
                let mut env = (*parser.env()).clone();
                env.font = None;
                env.multi_letter = false;
                let content = parser.sub_parse(&math, Rc::new(env))?;
                let style = parser.factory().create(
                    NodeKind::Mstyle,
                    &[("displaystyle", "false"), ("scriptlevel", "0")],
                    &[content],
                );
                nodes.push(style);
            }
            _ => run.push(c),
        }
    }
    flush_run(parser, &mut run, font, &mut nodes);
    if nodes.is_empty() {
        nodes.push(parser.factory().create_token(NodeKind::Mtext, &[], ""));
    }
    Ok(nodes)
}

fn flush_run(parser: &mut TexParser<'_>, run: &mut String, font: Option<&'static str>, nodes: &mut Vec<NodeId>) {
    if run.is_empty() {
        return;
    }
    let text = nbsp_ends(&std::mem::take(run));
    let mut attrs = Vec::new();
    if let Some(variant) = font.and_then(|f| VARIANTS.get(f)) {
        attrs.push(("mathvariant", variant.mathvariant));
    }
    nodes.push(parser.factory().create_token(NodeKind::Mtext, &attrs, &text));
}

fn nbsp_ends(text: &str) -> String {
    let trimmed_start = text.trim_start();
    let leading = text.len() - trimmed_start.len();
    let trimmed = trimmed_start.trim_end();
    let trailing = trimmed_start.len() - trimmed.len();
    let mut out = String::with_capacity(text.len() + 4);
    if leading > 0 {
        out.push('\u{A0}');
    }
    out.push_str(trimmed);
    if trailing > 0 && !trimmed.is_empty() {
        out.push('\u{A0}');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbsp_ends() {
        assert_eq!(nbsp_ends(" if "), "\u{A0}if\u{A0}");
        assert_eq!(nbsp_ends("a b"), "a b");
        assert_eq!(nbsp_ends("   "), "\u{A0}");
    }
}
