//! Letters, digits, other characters and the symbol-table characters

use crate::core::items::Env;
use crate::core::parser::TexParser;
use crate::core::symbols::CharacterSymbol;
use crate::core::tree::{NodeKind, Property, TexClass};
use crate::data::constants::VARIANTS;
use crate::data::operators;
use crate::data::symbols::REMAP;
use crate::utils::error::ParseResult;

/// `mathvariant` (and `data-mjx-variant`) for a token in `env`.
/// `italic_default` is the variant a token has when no font is selected.
pub(crate) fn variant_attributes(env: &Env, italic_default: bool) -> Vec<(&'static str, &'static str)> {
    let font = match (env.font, env.bold_symbol) {
        (Some("normal"), true) => Some("bold"),
        (None, true) if italic_default => Some("bold-italic"),
        (None, true) => Some("bold"),
        (font, _) => font.filter(|f| !f.is_empty()),
    };
    let Some(variant) = font.and_then(|name| VARIANTS.get(name)) else {
        return Vec::new();
    };
    let mut attrs = vec![("mathvariant", variant.mathvariant)];
    if let Some(mjx) = variant.mjx {
        attrs.push(("data-mjx-variant", mjx));
    }
    attrs
}

/// `\` starts a control sequence
pub fn control_sequence(parser: &mut TexParser<'_>, _c: char) -> ParseResult<()> {
    let cs = parser.get_cs();
    parser.run_control_sequence(&cs)
}

/// A letter becomes an identifier; in multi-letter mode a run of letters
/// forms one identifier
pub fn letter(parser: &mut TexParser<'_>, c: char) -> ParseResult<()> {
    let env = parser.env();
    let mut text = c.to_string();
    if env.multi_letter {
        while let Some(next) = parser.buffer.peek().filter(char::is_ascii_alphabetic) {
            text.push(next);
            parser.buffer.next_char();
        }
    }
    let attrs = variant_attributes(&env, true);
    parser.push_token(NodeKind::Mi, &attrs, &text)?;
    Ok(())
}

/// Digits, with `{,}` thousands groups and a decimal part, become one
/// number; a lone `.` is an operator
pub fn digit(parser: &mut TexParser<'_>, c: char) -> ParseResult<()> {
    let Some(number) = scan_number(parser, c) else {
        return other(parser, c);
    };
    let env = parser.env();
    let attrs = variant_attributes(&env, false);
    parser.push_token(NodeKind::Mn, &attrs, &number)?;
    Ok(())
}

fn scan_number(parser: &mut TexParser<'_>, first: char) -> Option<String> {
    let mut text = first.to_string();
    let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
    if first == '.' {
        if !is_digit(parser.buffer.peek()) {
            return None;
        }
        take_digits(parser, &mut text);
        return Some(text);
    }
    take_digits(parser, &mut text);
    while parser.buffer.starts_with("{,}")
        && (3..6).all(|n| is_digit(parser.buffer.peek_nth(n)))
    {
        parser.buffer.eat("{,}");
        text.push(',');
        for _ in 0..3 {
            if let Some(d) = parser.buffer.next_char() {
                text.push(d);
            }
        }
    }
    if parser.buffer.peek() == Some('.') {
        parser.buffer.next_char();
        text.push('.');
        take_digits(parser, &mut text);
    }
    Some(text)
}

fn take_digits(parser: &mut TexParser<'_>, text: &mut String) {
    while let Some(d) = parser.buffer.peek().filter(char::is_ascii_digit) {
        text.push(d);
        parser.buffer.next_char();
    }
}

/// Anything else: non-ASCII letters are identifiers, the rest operators
pub fn other(parser: &mut TexParser<'_>, c: char) -> ParseResult<()> {
    let env = parser.env();
    if c.is_alphabetic() {
        let attrs = variant_attributes(&env, true);
        parser.push_token(NodeKind::Mi, &attrs, &c.to_string())?;
        return Ok(());
    }
    let text = match REMAP.get(&c) {
        Some(remapped) => (*remapped).to_string(),
        None => c.to_string(),
    };
    let mut attrs = match env.font {
        Some(font) if !font.is_empty() => variant_attributes(&env, false),
        _ => Vec::new(),
    };
    if operators::lookup(&text).stretchy {
        attrs.push(("stretchy", "false"));
    }
    parser.push_token(NodeKind::Mo, &attrs, &text)?;
    Ok(())
}

fn with_symbol_attributes(
    mut attrs: Vec<(&'static str, &'static str)>,
    symbol: &CharacterSymbol,
) -> Vec<(&'static str, &'static str)> {
    for &(name, value) in &symbol.attributes {
        attrs.retain(|&(existing, _)| existing != name);
        attrs.push((name, value));
    }
    attrs
}

/// Identifier from a symbol table (Greek letters ...)
pub fn mathchar0mi(parser: &mut TexParser<'_>, _name: &str, symbol: &CharacterSymbol) -> ParseResult<()> {
    let env = parser.env();
    let attrs = with_symbol_attributes(variant_attributes(&env, true), symbol);
    let node = parser.factory().create_token(NodeKind::Mi, &attrs, &symbol.text);
    if let Some(class) = symbol.class {
        parser.factory().tree_mut().set_tex_class(node, class);
    }
    parser.push_node(node)
}

/// Operator from a symbol table. Stretchy operators are fixed at their
/// normal size; large operators with movable limits take limits in display.
pub fn mathchar0mo(parser: &mut TexParser<'_>, _name: &str, symbol: &CharacterSymbol) -> ParseResult<()> {
    let info = operators::lookup(&symbol.text);
    let mut attrs = with_symbol_attributes(Vec::new(), symbol);
    if info.stretchy && !attrs.iter().any(|(name, _)| *name == "stretchy") {
        attrs.push(("stretchy", "false"));
    }
    let node = parser.factory().create_token(NodeKind::Mo, &attrs, &symbol.text);
    let tree = parser.factory().tree_mut();
    if let Some(class) = symbol.class {
        tree.set_tex_class(node, class);
    }
    if info.largeop && info.movablelimits {
        tree.set_property(node, "movesupsub", Property::Bool(true));
    }
    parser.push_node(node)
}

/// Upright identifier (`\_`, `\#`, capital Greek ...), variant from the font
pub fn mathchar7(parser: &mut TexParser<'_>, _name: &str, symbol: &CharacterSymbol) -> ParseResult<()> {
    let env = parser.env();
    let mut attrs = variant_attributes(&env, false);
    if attrs.is_empty() {
        attrs.push(("mathvariant", "normal"));
    }
    let attrs = with_symbol_attributes(attrs, symbol);
    let node = parser.factory().create_token(NodeKind::Mi, &attrs, &symbol.text);
    if let Some(class) = symbol.class {
        parser.factory().tree_mut().set_tex_class(node, class);
    }
    parser.push_node(node)
}

/// A delimiter used on its own (`\langle`, `\{`, `\vert`)
pub fn delimiter(parser: &mut TexParser<'_>, _name: &str, symbol: &CharacterSymbol) -> ParseResult<()> {
    let info = operators::lookup(&symbol.text);
    let mut attrs = with_symbol_attributes(Vec::new(), symbol);
    if info.stretchy {
        attrs.push(("stretchy", "false"));
    }
    let node = parser.factory().create_token(NodeKind::Mo, &attrs, &symbol.text);
    let class = symbol.class.or(match info.class {
        TexClass::Open | TexClass::Close => Some(info.class),
        _ => None,
    });
    if let Some(class) = class {
        parser.factory().tree_mut().set_tex_class(node, class);
    }
    parser.push_node(node)
}
