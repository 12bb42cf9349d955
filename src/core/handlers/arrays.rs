//! Environments, tables and row structure

use crate::core::expand;
use crate::core::items::{ArrayState, ItemKind};
use crate::core::parser::TexParser;
use crate::core::symbols::HandlerArg;
use crate::data::constants::match_dimen;
use crate::utils::error::{ErrorKind, ParseResult, TexError};

const BRACKET_MUST_BE_DIMENSION: ErrorKind = ErrorKind::Custom {
    id: "BracketMustBeDimension",
    template: "Bracket argument to %1 must be a dimension",
};

fn arg_str(args: &[HandlerArg], index: usize) -> Option<&'static str> {
    args.get(index).and_then(HandlerArg::as_str).filter(|s| !s.is_empty())
}

fn arg_bool(args: &[HandlerArg], index: usize) -> bool {
    args.get(index).and_then(HandlerArg::as_bool).unwrap_or(false)
}

/// `\begin{name}`
pub fn begin(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let env = parser.get_argument(name)?.trim().to_string();
    if env.contains('\\') {
        return Err(TexError::new(ErrorKind::InvalidEnv, [env]));
    }
    parser.context().count_substitution(ErrorKind::MaxMacroSub2)?;
    parser.run_environment(&env)
}

/// `\end{name}`
pub fn end(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let env = parser.get_argument(name)?.trim().to_string();
    if expand::end_defined_environment(parser, &env)? {
        return Ok(());
    }
    let item = parser.item(ItemKind::End { name: env });
    parser.push(item)
}

/// Push the frame that `\end{env}` closes
pub(crate) fn begin_frame(parser: &mut TexParser<'_>, env: &str) -> ParseResult<()> {
    let item = parser.item(ItemKind::Begin {
        name: env.to_string(),
    });
    parser.push(item)
}

/// Start collecting rows. Display structures may not nest.
pub(crate) fn start_array(parser: &mut TexParser<'_>, state: ArrayState) -> ParseResult<()> {
    if state.display_env {
        parser.context().tags.enter_display()?;
    }
    let item = parser.item(ItemKind::Array(Box::new(state)));
    parser.push(item)
}

/// Attributes for a `D`, `T` or `S` style letter
pub(crate) fn style_attributes(style: Option<&str>) -> Vec<(String, String)> {
    let (display, level) = match style {
        Some("D") => ("true", None),
        Some("T") => ("false", None),
        Some("S") => ("false", Some("1")),
        _ => return Vec::new(),
    };
    let mut attrs = vec![("displaystyle".to_string(), display.to_string())];
    if let Some(level) = level {
        attrs.push(("scriptlevel".to_string(), level.to_string()));
    }
    attrs
}

/// Table attributes for column alignment letters and spacing
pub(crate) fn table_state(
    name: &str,
    align: &str,
    spacing: Option<&str>,
    vspacing: Option<&str>,
    style: Option<&str>,
) -> ArrayState {
    let aligns: Vec<&str> = align
        .chars()
        .filter_map(|c| match c {
            'l' => Some("left"),
            'c' => Some("center"),
            'r' => Some("right"),
            _ => None,
        })
        .collect();
    let vspacing = vspacing.unwrap_or("4pt");
    let mut attributes = Vec::new();
    if !aligns.is_empty() {
        attributes.push(("columnalign".to_string(), aligns.join(" ")));
    }
    attributes.push(("columnspacing".to_string(), spacing.unwrap_or("1em").to_string()));
    attributes.push(("rowspacing".to_string(), vspacing.to_string()));
    attributes.extend(style_attributes(style));
    ArrayState {
        name: name.to_string(),
        attributes,
        base_spacing: Some(vspacing.to_string()),
        ..ArrayState::default()
    }
}

/// `\matrix{...}`, `\pmatrix{...}`, `\cases{...}`: bound open and close
/// delimiters, column alignment and spacing, and whether rows hold at most
/// two cells; the body ends at the closing brace
pub fn matrix(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    if !parser.eat('{') {
        return Err(TexError::new(ErrorKind::MissingArgFor, [name]));
    }
    let mut state = table_state("", arg_str(args, 2).unwrap_or("c"), arg_str(args, 3), arg_str(args, 4), None);
    state.open = arg_str(args, 0).map(str::to_string);
    state.close = arg_str(args, 1).map(str::to_string).or_else(|| state.open.as_ref().map(|_| String::new()));
    state.require_close = true;
    if arg_bool(args, 5) {
        state.max_columns = Some((2, ErrorKind::ExtraAlignTab));
    }
    start_array(parser, state)
}

/// `\cr`
pub fn cr(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let item = parser.item(ItemKind::Cell {
        row_end: true,
        spacing: None,
    });
    parser.push(item)
}

/// `\\` with an optional `[dimen]` of extra row space
pub fn linebreak(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.get_star();
    let mut spacing = None;
    if parser.buffer.peek() == Some('[') {
        let text = parser.get_bracket(name)?.unwrap_or_default();
        match match_dimen(&text) {
            Some((dimen, len)) if text[len..].trim().is_empty() => spacing = Some(dimen),
            _ if text.trim().is_empty() => {}
            _ => return Err(TexError::new(BRACKET_MUST_BE_DIMENSION, [name])),
        }
    }
    let item = parser.item(ItemKind::Cell {
        row_end: true,
        spacing,
    });
    parser.push(item)
}

/// `\hline` and `\hdashline`: a rule below the last finished row, or the
/// top frame before any row
pub fn hline(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let style = arg_str(args, 0).unwrap_or("solid");
    let Some(top) = parser.stack.top_mut() else {
        return Err(TexError::new(ErrorKind::Misplaced, [name]));
    };
    let started = !top.nodes.is_empty();
    let ItemKind::Array(state) = &mut top.kind else {
        return Err(TexError::new(ErrorKind::Misplaced, [name]));
    };
    if started || !state.row.is_empty() {
        return Err(TexError::new(ErrorKind::Misplaced, [name]));
    }
    if state.rows.is_empty() {
        state.frame_top = Some(style.to_string());
        return Ok(());
    }
    let index = state.rows.len() - 1;
    if state.row_lines.len() <= index {
        state.row_lines.resize(index + 1, "none".to_string());
    }
    state.row_lines[index] = style.to_string();
    Ok(())
}

// Environments

/// Column specification of an `array`: alignments, lines between columns,
/// and lines on the left and right edge
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Columns {
    pub align: Vec<&'static str>,
    pub lines: Vec<&'static str>,
    pub left: Option<&'static str>,
    pub right: Option<&'static str>,
}

pub(crate) fn parse_columns(spec: &str) -> Columns {
    let spec = expand_repeats(spec);
    let mut columns = Columns::default();
    let mut after: Vec<Option<&'static str>> = Vec::new();
    let mut chars = spec.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            'l' | 'c' | 'r' | 'p' | 'm' | 'b' => {
                columns.align.push(match c {
                    'c' => "center",
                    'r' => "right",
                    _ => "left",
                });
                after.push(None);
                if matches!(c, 'p' | 'm' | 'b') {
                    skip_group(&mut chars);
                }
            }
            '|' | ':' => {
                let style = if c == '|' { "solid" } else { "dashed" };
                match after.last_mut() {
                    Some(slot) => *slot = Some(style),
                    None => columns.left = Some(style),
                }
            }
            '@' | '!' => {
                skip_group(&mut chars);
            }
            _ => {}
        }
    }
    if let Some(last) = after.pop() {
        columns.right = last;
    }
    columns.lines = after.into_iter().map(|l| l.unwrap_or("none")).collect();
    columns
}

fn skip_group(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    if chars.peek() != Some(&'{') {
        return String::new();
    }
    chars.next();
    let mut depth = 1usize;
    let mut text = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        text.push(c);
    }
    text
}

/// Expand `*{n}{cols}` repetitions
fn expand_repeats(spec: &str) -> String {
    let mut out = String::new();
    let mut chars = spec.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            out.push(c);
            continue;
        }
        let count = skip_group(&mut chars).trim().parse::<usize>().unwrap_or(0);
        let body = expand_repeats(&skip_group(&mut chars));
        out.push_str(&body.repeat(count.min(64)));
    }
    out
}

/// `\begin{array}[pos]{cols}`
pub fn array_env(parser: &mut TexParser<'_>, env: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let position = parser.get_bracket(env)?;
    let spec = parser.get_argument(env)?;
    let columns = parse_columns(&spec);
    let mut state = table_state(env, "", None, None, None);
    if !columns.align.is_empty() {
        state
            .attributes
            .insert(0, ("columnalign".to_string(), columns.align.join(" ")));
    }
    if columns.lines.iter().any(|l| *l != "none") {
        state
            .attributes
            .push(("columnlines".to_string(), columns.lines.join(" ")));
    }
    match position.as_deref().map(str::trim) {
        Some("t") => state.attributes.push(("align".to_string(), "baseline 1".to_string())),
        Some("b") => state.attributes.push(("align".to_string(), "baseline -1".to_string())),
        _ => {}
    }
    state.frame_left = columns.left.map(str::to_string);
    state.frame_right = columns.right.map(str::to_string);
    start_array(parser, state)
}

/// `matrix`, `pmatrix`, `cases` ...: bound open, close, alignment, column
/// spacing, row spacing, style letter and the two-cell limit of `cases`
pub fn matrix_env(parser: &mut TexParser<'_>, env: &str, args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let mut state = table_state(
        env,
        arg_str(args, 2).unwrap_or("c"),
        arg_str(args, 3),
        arg_str(args, 4),
        arg_str(args, 5),
    );
    state.open = arg_str(args, 0).map(str::to_string);
    state.close = arg_str(args, 1).map(str::to_string);
    if state.open.is_some() || state.close.is_some() {
        state.open.get_or_insert_with(String::new);
        state.close.get_or_insert_with(String::new);
    }
    if arg_bool(args, 6) {
        state.max_columns = Some((2, ErrorKind::ExtraAlignTab));
    }
    start_array(parser, state)
}

/// Multi-line display environments (`eqnarray`, `align`, `gather` ...).
/// Bound: alignment letters, column spacing, whether rows are numbered,
/// whether `\tag` is allowed, and whether this is a top-level display
/// structure.
pub fn aligned_env(parser: &mut TexParser<'_>, env: &str, args: &[HandlerArg]) -> ParseResult<()> {
    begin_frame(parser, env)?;
    let mut state = table_state(env, arg_str(args, 0).unwrap_or("c"), arg_str(args, 1), Some("3pt"), Some("D"));
    state.numbered = arg_bool(args, 2);
    state.taggable = arg_bool(args, 3);
    state.display_env = arg_bool(args, 4);
    start_array(parser, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns() {
        let columns = parse_columns("|l|c:r|");
        assert_eq!(columns.align, vec!["left", "center", "right"]);
        assert_eq!(columns.lines, vec!["solid", "dashed"]);
        assert_eq!(columns.left, Some("solid"));
        assert_eq!(columns.right, Some("solid"));
    }

    #[test]
    fn test_parse_columns_repeat_and_groups() {
        let columns = parse_columns("*{3}{c}p{2cm}@{,}");
        assert_eq!(columns.align, vec!["center", "center", "center", "left"]);
        assert_eq!(columns.lines, vec!["none", "none", "none"]);
        assert_eq!(columns.right, None);
    }

    #[test]
    fn test_style_attributes() {
        assert_eq!(style_attributes(Some("S")).len(), 2);
        assert!(style_attributes(None).is_empty());
    }
}
