//! Macro expansion
//!
//! A macro call reads its arguments, substitutes them for `#1`..`#9` in the
//! template and pushes the result in front of the remaining input. The
//! expansion is counted against `max_macros` and its size against
//! `max_buffer`.

use log::trace;

use super::items::ItemKind;
use super::parser::TexParser;
use super::symbols::{HandlerArg, MacroSymbol};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

pub(crate) fn expand_macro(parser: &mut TexParser<'_>, name: &str, symbol: &MacroSymbol) -> ParseResult<()> {
    let args = read_arguments(parser, name, symbol)?;
    let text = if args.is_empty() {
        symbol.template.to_string()
    } else {
        substitute(&symbol.template, &args)?
    };
    trace!("expand {} -> {}", name, text);
    parser.splice(text, ErrorKind::MaxMacroSub1)
}

fn read_arguments(parser: &mut TexParser<'_>, name: &str, symbol: &MacroSymbol) -> ParseResult<Vec<String>> {
    let mut args = Vec::with_capacity(symbol.args);
    if let Some(delimiters) = &symbol.delimiters {
        if let Some(leading) = delimiters.first().filter(|d| !d.is_empty()) {
            parser.buffer.skip_whitespace();
            if !parser.buffer.eat(leading) {
                return Err(TexError::new(ErrorKind::MismatchUseDef, [name]));
            }
        }
        for i in 1..=symbol.args {
            let arg = match delimiters.get(i).filter(|d| !d.is_empty()) {
                Some(token) => read_delimited(parser, name, token)?,
                None => parser.get_argument(name)?,
            };
            args.push(arg);
        }
        return Ok(args);
    }
    let mut count = symbol.args;
    if let Some(default) = &symbol.default {
        if count > 0 {
            let arg = parser.get_bracket(name)?.unwrap_or_else(|| default.to_string());
            args.push(arg);
            count -= 1;
        }
    }
    for _ in 0..count {
        args.push(parser.get_argument(name)?);
    }
    Ok(args)
}

/// Read a parameter ended by `token`. A parameter that is exactly one
/// braced group loses its braces.
fn read_delimited(parser: &mut TexParser<'_>, name: &str, token: &str) -> ParseResult<String> {
    let mut text = String::new();
    let mut groups = 0usize;
    let mut plain = false;
    loop {
        if parser.at_token(token) {
            parser.buffer.eat(token);
            if groups == 1 && !plain && text.starts_with('{') && text.ends_with('}') {
                text = text[1..text.len() - 1].to_string();
            }
            return Ok(text);
        }
        match parser.buffer.peek() {
            None => return Err(TexError::new(ErrorKind::RunawayArgument, [name])),
            Some('{') => {
                let group = parser.get_argument(name)?;
                text.push('{');
                text.push_str(&group);
                text.push('}');
                groups += 1;
            }
            Some('\\') => {
                parser.buffer.next_char();
                text.push('\\');
                plain = true;
                if parser.buffer.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    while let Some(c) = parser.buffer.peek().filter(char::is_ascii_alphabetic) {
                        text.push(c);
                        parser.buffer.next_char();
                    }
                } else if let Some(c) = parser.buffer.next_char() {
                    text.push(c);
                }
            }
            Some(c) => {
                parser.buffer.next_char();
                text.push(c);
                plain = true;
            }
        }
    }
}

/// Replace `#1`..`#9` in `template` by `args`; `##` gives `#`. A space is
/// inserted between a control word and an argument starting with a letter.
pub(crate) fn substitute(template: &str, args: &[String]) -> ParseResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        match c {
            '#' => match chars.next() {
                Some('#') => out.push('#'),
                Some(d @ '1'..='9') => {
                    let index = d as usize - '1' as usize;
                    let Some(arg) = args.get(index) else {
                        return Err(TexError::simple(ErrorKind::IllegalMacroParam));
                    };
                    if arg.starts_with(|c: char| c.is_ascii_alphabetic()) && ends_with_control_word(&out) {
                        out.push(' ');
                    }
                    out.push_str(arg);
                }
                _ => return Err(TexError::simple(ErrorKind::IllegalMacroParam)),
            },
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Whether `text` ends with an unescaped control word such as `\alpha`
pub(crate) fn ends_with_control_word(text: &str) -> bool {
    let letters = text
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if letters == 0 {
        return false;
    }
    let head = &text[..text.len() - letters];
    let backslashes = head.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 1
}

/// Keep a trailing control word from running into the text after it
pub(crate) fn terminate_control_word(mut text: String) -> String {
    if ends_with_control_word(&text) {
        text.push(' ');
    }
    text
}

/// Begin a user-defined environment. Bound arguments: begin text, end
/// text, argument count and optional default of the first argument.
pub(crate) fn begin_defined_environment(parser: &mut TexParser<'_>, env: &str, bound: &[HandlerArg]) -> ParseResult<()> {
    let begin = bound.first().and_then(HandlerArg::as_text).unwrap_or_default().to_string();
    let end = bound.get(1).and_then(HandlerArg::as_text).unwrap_or_default().to_string();
    let count = bound.get(2).and_then(HandlerArg::as_int).unwrap_or(0).max(0) as usize;
    let default = bound.get(3).and_then(HandlerArg::as_text).map(str::to_string);

    let mut args = Vec::with_capacity(count);
    let mut remaining = count;
    if let (Some(default), true) = (default, count > 0) {
        args.push(parser.get_bracket(env)?.unwrap_or(default));
        remaining -= 1;
    }
    for _ in 0..remaining {
        args.push(parser.get_argument(env)?);
    }
    let begin = substitute(&begin, &args)?;
    let end = substitute(&end, &args)?;

    let item = parser.item(ItemKind::Begin {
        name: env.to_string(),
    });
    parser.push(item)?;
    parser.ctx.env_ends.push((env.to_string(), end));
    parser.splice(begin, ErrorKind::MaxMacroSub2)
}

/// Handle `\end{env}` for a user-defined environment: its end text is
/// read first, then the environment closes. Returns false for other
/// environments.
pub(crate) fn end_defined_environment(parser: &mut TexParser<'_>, env: &str) -> ParseResult<bool> {
    if parser.ctx.closing.as_deref() == Some(env) {
        parser.ctx.closing = None;
        return Ok(false);
    }
    let open = parser.ctx.env_ends.last().is_some_and(|(name, _)| name == env);
    if !open {
        return Ok(false);
    }
    let Some((_, end)) = parser.ctx.env_ends.pop() else {
        return Ok(false);
    };
    parser.ctx.closing = Some(env.to_string());
    parser.splice(format!("{}\\end{{{}}}", end, env), ErrorKind::MaxMacroSub2)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substitute() {
        let out = substitute("\\frac{#1}{#2}", &args(&["a", "b"])).unwrap();
        assert_eq!(out, "\\frac{a}{b}");
    }

    #[test]
    fn test_substitute_hash_hash() {
        let out = substitute("##1#1", &args(&["x"])).unwrap();
        assert_eq!(out, "#1x");
    }

    #[test]
    fn test_substitute_spaces_after_control_word() {
        let out = substitute("\\mathrm#1", &args(&["d"])).unwrap();
        assert_eq!(out, "\\mathrm d");
        let out = substitute("\\{#1", &args(&["d"])).unwrap();
        assert_eq!(out, "\\{d");
    }

    #[test]
    fn test_substitute_bad_parameter() {
        let err = substitute("#2", &args(&["x"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalMacroParam);
        let err = substitute("#x", &args(&["x"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalMacroParam);
    }

    #[test]
    fn test_control_word_detection() {
        assert!(ends_with_control_word("a\\alpha"));
        assert!(!ends_with_control_word("a\\\\alpha"));
        assert!(!ends_with_control_word("\\{"));
        assert!(!ends_with_control_word("abc"));
        assert_eq!(terminate_control_word("\\b".to_string()), "\\b ");
    }
}
