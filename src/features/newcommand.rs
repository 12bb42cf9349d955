//! The `newcommand` package: `\newcommand`, `\renewcommand`,
//! `\newenvironment`, `\renewenvironment`, `\def` and `\let`.
//!
//! Definitions live in the parse context and shadow package symbols for
//! the rest of the formula.

use std::sync::Arc;

use log::debug;

use crate::core::expand;
use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{EnvironmentSymbol, HandlerArg, MacroSymbol, Symbol, SymbolMap};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

use super::Configuration;

const ILLEGAL_CONTROL_SEQUENCE_NAME: ErrorKind = ErrorKind::Custom {
    id: "IllegalControlSequenceName",
    template: "Illegal control sequence name for %1",
};

/// Read the control sequence being defined, braced or not
fn defined_name(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let arg = parser.get_argument(name)?;
    let cs = arg.trim();
    let Some(rest) = cs.strip_prefix('\\') else {
        return Err(TexError::new(ILLEGAL_CONTROL_SEQUENCE_NAME, [name]));
    };
    let word = !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic());
    if !word && rest.chars().count() != 1 {
        return Err(TexError::new(ILLEGAL_CONTROL_SEQUENCE_NAME, [name]));
    }
    Ok(rest.to_string())
}

/// `[n]`: a parameter count from 0 to 9
fn parameter_count(parser: &mut TexParser<'_>, name: &str) -> ParseResult<usize> {
    let Some(count) = parser.get_bracket(name)? else {
        return Ok(0);
    };
    let count = count.trim();
    if count.is_empty() {
        return Ok(0);
    }
    match count.parse::<usize>() {
        Ok(n) if n <= 9 && count.chars().all(|c| c.is_ascii_digit()) => Ok(n),
        _ => Err(TexError::new(ErrorKind::IllegalParamNumber, [name])),
    }
}

/// `\newcommand{\cs}[n][default]{template}` and `\renewcommand`
fn new_command(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let cs = defined_name(parser, name)?;
    let count = parameter_count(parser, name)?;
    let default = parser.get_bracket(name)?;
    let template = parser.get_argument(name)?;
    debug!("{} \\{} with {} parameters", name, cs, count);
    let mut symbol = MacroSymbol::new(template, count);
    symbol.default = default.filter(|_| count > 0).map(Into::into);
    parser.context().define_macro(&cs, Symbol::Macro(symbol), None);
    Ok(())
}

/// `\newenvironment{name}[n][default]{begin}{end}` and `\renewenvironment`
fn new_environment(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let env = parser.get_argument(name)?.trim().to_string();
    if env.is_empty() || env.contains('\\') {
        return Err(TexError::new(ErrorKind::InvalidEnv, [env]));
    }
    let count = parameter_count(parser, name)?;
    let default = parser.get_bracket(name)?;
    let begin = parser.get_argument(name)?;
    let end = parser.get_argument(name)?;
    debug!("{} {} with {} parameters", name, env, count);
    parser.context().define_environment(&env, defined_environment(begin, end, count, default));
    Ok(())
}

/// The symbol of an environment defined by begin and end texts
pub(crate) fn defined_environment(begin: String, end: String, count: usize, default: Option<String>) -> Symbol {
    let mut args = vec![
        HandlerArg::Text(begin),
        HandlerArg::Text(end),
        HandlerArg::Int(count as i64),
    ];
    if let Some(default) = default.filter(|_| count > 0) {
        args.push(HandlerArg::Text(default));
    }
    Symbol::Environment(EnvironmentSymbol {
        handler: expand::begin_defined_environment,
        args,
    })
}

/// `\def\cs<parameter text>{template}`. Tokens between parameters
/// delimit the arguments at the call site.
fn def(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let cs = parser.get_cs_name(name)?;
    let params = parameter_text(parser, name)?;
    let template = parser.get_argument(name)?;
    let (count, delimiters) = parse_parameters(&params, name)?;
    let mut symbol = MacroSymbol::new(template, count);
    if delimiters.iter().any(|d| !d.is_empty()) {
        symbol.delimiters = Some(delimiters);
    }
    debug!("\\def \\{} with {} parameters", cs, count);
    parser.context().define_macro(&cs, Symbol::Macro(symbol), None);
    Ok(())
}

/// Everything up to the opening brace of the replacement text
fn parameter_text(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let mut text = String::new();
    loop {
        match parser.buffer.peek() {
            None => return Err(TexError::new(ErrorKind::MissingReplacementString, [name])),
            Some('{') => return Ok(text),
            Some('\\') => {
                parser.buffer.next_char();
                text.push('\\');
                if let Some(c) = parser.buffer.next_char() {
                    text.push(c);
                }
            }
            Some(c) => {
                parser.buffer.next_char();
                text.push(c);
            }
        }
    }
}

/// Split a parameter text like `#1.#2` into the count and the delimiter
/// before the first parameter and after each one
fn parse_parameters(params: &str, name: &str) -> ParseResult<(usize, Vec<String>)> {
    let mut delimiters = vec![String::new()];
    let mut count = 0;
    let mut chars = params.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '#' => {
                let n = chars.next().and_then(|d| d.to_digit(10));
                if n != Some(count as u32 + 1) {
                    return Err(TexError::new(ErrorKind::IllegalParamNumber, [name]));
                }
                count += 1;
                delimiters.push(String::new());
            }
            '\\' => {
                let current = delimiters.last_mut().map(|d| {
                    d.push('\\');
                    d
                });
                if let (Some(d), Some(next)) = (current, chars.next()) {
                    d.push(next);
                }
            }
            c if c.is_whitespace() && count == 0 && delimiters[0].is_empty() => {}
            c => {
                if let Some(d) = delimiters.last_mut() {
                    d.push(c);
                }
            }
        }
    }
    for d in delimiters.iter_mut() {
        *d = d.trim().to_string();
    }
    Ok((count, delimiters))
}

/// `\let\cs=\other` or `\let\cs=c`: copy the current meaning
fn let_(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let cs = parser.get_cs_name(name)?;
    parser.buffer.skip_whitespace();
    if parser.eat('=') {
        parser.buffer.skip_whitespace();
    }
    let (symbol, handler) = if parser.buffer.peek() == Some('\\') {
        parser.buffer.next_char();
        let target = parser.get_cs();
        let ctx = parser.context();
        let registry = Arc::clone(&ctx.registry);
        if let Some(entry) = ctx.macros.get(&target) {
            (entry.symbol.clone(), entry.handler)
        } else if let Some(resolved) = registry.resolve(HandlerKind::Macro, &target) {
            (resolved.symbol.clone(), resolved.character_handler())
        } else {
            (Symbol::Macro(MacroSymbol::new(format!("\\{}", target), 0)), None)
        }
    } else {
        let Some(c) = parser.buffer.next_char() else {
            return Err(TexError::new(ErrorKind::MissingArgFor, [name]));
        };
        let key = c.to_string();
        let registry = Arc::clone(&parser.context().registry);
        match registry.resolve(HandlerKind::Character, &key) {
            Some(resolved) => (resolved.symbol.clone(), resolved.character_handler()),
            None => (Symbol::Macro(MacroSymbol::new(key, 0)), None),
        }
    };
    debug!("\\let \\{}", cs);
    parser.context().define_macro(&cs, symbol, handler);
    Ok(())
}

fn macros() -> SymbolMap {
    SymbolMap::new("newcommand")
        .command("newcommand", new_command, &[])
        .command("renewcommand", new_command, &[])
        .command("newenvironment", new_environment, &[])
        .command("renewenvironment", new_environment, &[])
        .command("def", def, &[])
        .command("let", let_, &[])
}

pub fn configuration() -> Configuration {
    Configuration::new("newcommand")
        .requires(&["base"])
        .map(HandlerKind::Macro, macros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters() {
        let (count, delimiters) = parse_parameters("#1#2", "\\def").unwrap();
        assert_eq!(count, 2);
        assert!(delimiters.iter().all(String::is_empty));

        let (count, delimiters) = parse_parameters("(#1,#2)", "\\def").unwrap();
        assert_eq!(count, 2);
        assert_eq!(delimiters, vec!["(", ",", ")"]);
    }

    #[test]
    fn test_parameters_must_be_sequential() {
        let err = parse_parameters("#2", "\\def").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalParamNumber);
        let err = parse_parameters("#1#1", "\\def").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalParamNumber);
    }

    #[test]
    fn test_defined_environment_symbol() {
        let symbol = defined_environment("\\left(".into(), "\\right)".into(), 1, Some("x".into()));
        let Symbol::Environment(env) = symbol else {
            panic!("expected an environment");
        };
        assert_eq!(env.args.len(), 4);
        assert_eq!(env.args[2].as_int(), Some(1));
    }
}
