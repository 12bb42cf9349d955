//! General commands: groups, fractions, roots, fonts, styles, accents,
//! spacing, boxes and raw markup

use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use super::text::internal_math;
use crate::core::items::ItemKind;
use crate::core::parser::TexParser;
use crate::core::symbols::HandlerArg;
use crate::core::tree::{NodeId, NodeKind, Property, TexClass};
use crate::data::constants::{em, MATH_STYLES};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

lazy_static! {
    static ref MML_ATTRIBUTE: Regex =
        Regex::new(r#"^\s*([a-zA-Z][-a-zA-Z]*)\s*=\s*("[^"]*"|'[^']*'|[^\s,"']*)\s*,?"#)
            .expect("attribute pattern is valid");
    static ref UNICODE_ARG: Regex =
        Regex::new(r"^\s*(x[0-9A-Fa-f]+|[0-9]+)\s*$").expect("unicode pattern is valid");
}

fn arg_str(args: &[HandlerArg], index: usize) -> &'static str {
    args.get(index).and_then(HandlerArg::as_str).unwrap_or("")
}

fn arg_bool(args: &[HandlerArg], index: usize) -> bool {
    args.get(index).and_then(HandlerArg::as_bool).unwrap_or(false)
}

/// Operators used as a base lose their own limit placement
pub(crate) fn fix_movable_limits(parser: &mut TexParser<'_>, base: NodeId) {
    let tree = parser.factory().tree_mut();
    if tree.kind(base) == NodeKind::Mo || tree.property(base, "movablelimits").is_some() {
        tree.set_attribute(base, "movablelimits", "false");
    }
}

// Special characters

pub fn open(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let item = parser.item(ItemKind::Open);
    parser.push(item)
}

pub fn close(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let item = parser.item(ItemKind::Close);
    parser.push(item)
}

/// `~` and `\ `: a non-breaking space
pub fn tilde(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.push_token(NodeKind::Mtext, &[], "\u{A0}")?;
    Ok(())
}

pub fn hash(_parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    Err(TexError::simple(ErrorKind::CantUseHash1))
}

/// `&` ends a table entry
pub fn entry(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let item = parser.item(ItemKind::Cell {
        row_end: false,
        spacing: None,
    });
    parser.push(item)
}

pub fn relax(_parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    Ok(())
}

// Fractions and roots

pub fn frac(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let numerator = parser.parse_arg(name)?;
    let denominator = parser.parse_arg(name)?;
    let frac = parser.factory().node(NodeKind::Mfrac, &[numerator, denominator]);
    parser.push_node(frac)
}

pub fn sqrt(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let index = parser.get_bracket(name)?;
    let radicand = parser.parse_arg(name)?;
    let node = match index {
        None => parser.factory().node(NodeKind::Msqrt, &[radicand]),
        Some(index) => {
            let env = parser.env();
            let index = parser.sub_parse(&index, env)?;
            parser.factory().node(NodeKind::Mroot, &[radicand, index])
        }
    };
    parser.push_node(node)
}

/// `\root n \of x`
pub fn root(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let index = parser.get_up_to(name, "\\of")?;
    let radicand = parser.parse_arg(name)?;
    let env = parser.env();
    let index = parser.sub_parse(&index, env)?;
    let node = parser.factory().node(NodeKind::Mroot, &[radicand, index]);
    parser.push_node(node)
}

// Named functions and operators

/// `\sin`, `\log` ...: upright name applied to what follows
pub fn named_fn(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let text = match arg_str(args, 0) {
        "" => &name[1..],
        text => text,
    };
    let mi = parser.factory().create_token(NodeKind::Mi, &[], text);
    parser.factory().tree_mut().set_tex_class(mi, TexClass::Op);
    let mut item = parser.item(ItemKind::Fn);
    item.nodes.push(mi);
    parser.push(item)
}

/// `\lim`, `\max` ...: operators whose limits move under and over
pub fn named_op(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let text = match arg_str(args, 0) {
        "" => &name[1..],
        text => text,
    };
    let factory = parser.factory();
    let mo = factory.create_token(NodeKind::Mo, &[("movablelimits", "true"), ("form", "prefix")], text);
    let tree = factory.tree_mut();
    tree.set_tex_class(mo, TexClass::Op);
    tree.set_property(mo, "movesupsub", Property::Bool(true));
    parser.push_node(mo)
}

// Fonts, styles and sizes

/// `\mathbf{...}` and friends: the argument in a font variant
pub fn math_font(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let text = parser.get_argument(name)?;
    let mut env = (*parser.env()).clone();
    env.font = Some(arg_str(args, 0)).filter(|f| !f.is_empty());
    env.multi_letter = env.font.is_some();
    let content = parser.sub_parse(&text, Rc::new(env))?;
    let atom = parser.factory().node(NodeKind::TeXAtom, &[content]);
    parser.factory().tree_mut().set_tex_class(atom, TexClass::Ord);
    parser.push_node(atom)
}

/// `\rm`, `\bf` ...: switch the font for the rest of the group
pub fn font_switch(parser: &mut TexParser<'_>, _name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let font = arg_str(args, 0);
    if let Some(env) = parser.env_mut() {
        env.font = Some(font);
    }
    Ok(())
}

/// `\displaystyle` ... `\scriptscriptstyle`
pub fn set_style(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let Some((key, &(display, level))) = MATH_STYLES.get_entry(&name[1..]) else {
        return Err(TexError::new(ErrorKind::UndefinedControlSequence, [name]));
    };
    if let Some(env) = parser.env_mut() {
        env.style = Some(*key);
    }
    let item = parser.item(ItemKind::Style {
        attributes: vec![
            ("displaystyle".to_string(), display.to_string()),
            ("scriptlevel".to_string(), level.to_string()),
        ],
    });
    parser.push(item)
}

/// `\tiny` ... `\Huge`
pub fn set_size(parser: &mut TexParser<'_>, _name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let size = args.first().and_then(HandlerArg::as_num).unwrap_or(1.0);
    let item = parser.item(ItemKind::Style {
        attributes: vec![("mathsize".to_string(), em(size as f64))],
    });
    parser.push(item)
}

/// `\mathop`, `\mathrel` ...: the argument with a fixed TeX class
pub fn math_class(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let class = args.first().and_then(HandlerArg::as_class).unwrap_or(TexClass::Ord);
    let content = parser.parse_arg(name)?;
    let atom = parser.factory().node(NodeKind::TeXAtom, &[content]);
    let tree = parser.factory().tree_mut();
    tree.set_tex_class(atom, class);
    if class == TexClass::Op {
        tree.set_property(atom, "movesupsub", Property::Bool(true));
    }
    parser.push_node(atom)
}

// Accents and under/over constructions

/// `\hat`, `\vec`, `\widetilde` ...: bound accent character and
/// stretchiness
pub fn accent(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let stretchy = if arg_bool(args, 1) { "true" } else { "false" };
    let base = parser.parse_arg(name)?;
    fix_movable_limits(parser, base);
    let factory = parser.factory();
    let mark = factory.create_token(NodeKind::Mo, &[("stretchy", stretchy)], arg_str(args, 0));
    let over = factory.create(NodeKind::Mover, &[("accent", "true")], &[base, mark]);
    let atom = factory.node(NodeKind::TeXAtom, &[over]);
    factory.tree_mut().set_tex_class(atom, TexClass::Ord);
    parser.push_node(atom)
}

/// `\overline`, `\underbrace`, `\overrightarrow` ...: bound character and
/// whether scripts stack above and below
pub fn under_over(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let stack = arg_bool(args, 1);
    let base = parser.parse_arg(name)?;
    fix_movable_limits(parser, base);
    let factory = parser.factory();
    let mark = factory.create_token(
        NodeKind::Mo,
        &[("stretchy", "true"), ("accent", "true")],
        arg_str(args, 0),
    );
    let node = if name.starts_with("\\over") {
        factory.create(NodeKind::Mover, &[("accent", "true")], &[base, mark])
    } else {
        factory.create(NodeKind::Munder, &[("accentunder", "true")], &[base, mark])
    };
    let atom = factory.node(NodeKind::TeXAtom, &[node]);
    let tree = factory.tree_mut();
    if stack {
        tree.set_property(node, "subsupOK", Property::Bool(true));
        tree.set_property(atom, "movesupsub", Property::Bool(true));
        tree.set_tex_class(atom, TexClass::Op);
    } else {
        tree.set_tex_class(atom, TexClass::Ord);
    }
    parser.push_node(atom)
}

/// `\overset{top}{base}` and `\underset{bottom}{base}`
pub fn set_over_under(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let script = parser.parse_arg(name)?;
    let base = parser.parse_arg(name)?;
    fix_movable_limits(parser, base);
    let factory = parser.factory();
    if factory.tree().kind(script) == NodeKind::Mo {
        factory.tree_mut().set_attribute(script, "stretchy", "false");
    }
    let kind = if name == "\\overset" {
        NodeKind::Mover
    } else {
        NodeKind::Munder
    };
    let node = factory.node(kind, &[base, script]);
    parser.push_node(node)
}

// Spacing

/// Fixed spaces (`\,`, `\quad` ...), bound width in em
pub fn spacer(parser: &mut TexParser<'_>, _name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let width = em(args.first().and_then(HandlerArg::as_num).unwrap_or(0.0) as f64);
    parser.push_token(NodeKind::Mspace, &[("width", width.as_str())], "")?;
    Ok(())
}

/// `\hskip`, `\hspace`, `\kern`, `\mkern`, `\mskip`
pub fn hskip(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.get_star();
    let width = parser.get_dimen(name)?;
    parser.push_token(NodeKind::Mspace, &[("width", width.as_str())], "")?;
    Ok(())
}

/// `\phantom` (both bound flags), `\vphantom` (vertical only), `\hphantom`
pub fn phantom(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let vertical = arg_bool(args, 0);
    let horizontal = arg_bool(args, 1);
    let content = parser.parse_arg(name)?;
    let factory = parser.factory();
    let phantom = factory.node(NodeKind::Mphantom, &[content]);
    let node = match (vertical, horizontal) {
        (true, false) => factory.create(NodeKind::Mpadded, &[("width", "0")], &[phantom]),
        (false, true) => {
            factory.create(NodeKind::Mpadded, &[("height", "0"), ("depth", "0")], &[phantom])
        }
        _ => phantom,
    };
    parser.push_node(node)
}

/// `\smash[tb]{...}`
pub fn smash(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let which = parser.get_bracket(name)?.unwrap_or_else(|| "tb".to_string());
    let content = parser.parse_arg(name)?;
    let mut attrs = Vec::new();
    if which.contains('t') {
        attrs.push(("height", "0"));
    }
    if which.contains('b') {
        attrs.push(("depth", "0"));
    }
    let node = parser.factory().create(NodeKind::Mpadded, &attrs, &[content]);
    parser.push_node(node)
}

/// `\llap` and `\rlap`: zero-width boxes overlapping on the bound side
pub fn lap(parser: &mut TexParser<'_>, name: &str, args: &[HandlerArg]) -> ParseResult<()> {
    let content = parser.parse_arg(name)?;
    let attrs: &[(&str, &str)] = match arg_str(args, 0) {
        "left" => &[("width", "0"), ("lspace", "-1width")],
        _ => &[("width", "0")],
    };
    let node = parser.factory().create(NodeKind::Mpadded, attrs, &[content]);
    parser.push_node(node)
}

pub fn strut(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let factory = parser.factory();
    let row = factory.node(NodeKind::Mrow, &[]);
    let node = factory.create(
        NodeKind::Mpadded,
        &[("height", "8.6pt"), ("depth", "3pt"), ("width", "0")],
        &[row],
    );
    parser.push_node(node)
}

/// `\raise` and `\lower`: move the next box vertically
pub fn raise_lower(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let mut height = parser.get_dimen(name)?;
    let mut raise = name == "\\raise";
    if let Some(rest) = height.strip_prefix('-') {
        height = rest.to_string();
        raise = !raise;
    }
    let (up, down) = if raise {
        (format!("+{}", height), format!("-{}", height))
    } else {
        (format!("-{}", height), format!("+{}", height))
    };
    let item = parser.item(ItemKind::Position {
        name: name.to_string(),
        attributes: vec![("height", up.clone()), ("depth", down), ("voffset", up)],
    });
    parser.push(item)
}

/// `\moveleft` and `\moveright`: shift the next box horizontally
pub fn move_left_right(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let width = parser.get_dimen(name)?;
    let shift = if name != "\\moveleft" {
        width
    } else if let Some(positive) = width.strip_prefix('-') {
        positive.to_string()
    } else {
        format!("-{}", width)
    };
    let item = parser.item(ItemKind::Position {
        name: name.to_string(),
        attributes: vec![("lspace", shift)],
    });
    parser.push(item)
}

// Negation, boxes and choices

pub fn not(parser: &mut TexParser<'_>, _name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let item = parser.item(ItemKind::Not);
    parser.push(item)
}

/// `\fbox{text}`: framed text, `$...$` inside is math
pub fn fbox(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let text = parser.get_argument(name)?;
    let content = internal_math(parser, &text, None)?;
    let node = parser
        .factory()
        .create(NodeKind::Menclose, &[("notation", "box")], &content);
    parser.push_node(node)
}

/// `\mathchoice{D}{T}{S}{SS}`: the branch for the current style
pub fn mathchoice(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let mut choices = Vec::with_capacity(4);
    for _ in 0..4 {
        choices.push(parser.get_argument(name)?);
    }
    let env = parser.env();
    let index = match env.style {
        Some("displaystyle") => 0,
        Some("textstyle") => 1,
        Some("scriptstyle") => 2,
        Some("scriptscriptstyle") => 3,
        _ if parser.options().display => 0,
        _ => 1,
    };
    let node = parser.sub_parse(&choices[index], env)?;
    parser.push_node(node)
}

/// `\unicode[font]{N}` with a decimal or `x`-prefixed hexadecimal code
pub fn unicode(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    parser.get_bracket(name)?;
    let arg = parser.get_argument(name)?;
    let Some(caps) = UNICODE_ARG.captures(&arg) else {
        return Err(TexError::simple(ErrorKind::BadUnicode));
    };
    let code = &caps[1];
    let value = match code.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => code.parse::<u32>().ok(),
    };
    let Some(c) = value.and_then(char::from_u32) else {
        return Err(TexError::simple(ErrorKind::BadUnicode));
    };
    parser.push_token(NodeKind::Mtext, &[], &c.to_string())?;
    Ok(())
}

/// `\mmlToken{kind}[attributes]{text}`: a token element written directly
pub fn mml_token(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let kind_name = parser.get_argument(name)?.trim().to_string();
    let attributes = parser.get_bracket(name)?.unwrap_or_default();
    let text = parser.get_argument(name)?;
    let kind = NodeKind::from_name(&kind_name)
        .filter(|kind| kind.is_token())
        .ok_or_else(|| TexError::new(ErrorKind::NotMathMLToken, [kind_name.as_str()]))?;
    let attrs = parse_token_attributes(kind, &kind_name, &attributes)?;
    let refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    parser.push_token(kind, &refs, &text)?;
    Ok(())
}

fn parse_token_attributes(kind: NodeKind, kind_name: &str, text: &str) -> ParseResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        let Some(caps) = MML_ATTRIBUTE.captures(rest) else {
            return Err(TexError::new(ErrorKind::InvalidMathMLAttr, [rest]));
        };
        let attribute = caps[1].to_string();
        let value = caps[2].trim_matches(|c| c == '"' || c == '\'').to_string();
        if !token_attribute_allowed(kind, &attribute) {
            return Err(TexError::new(
                ErrorKind::UnknownAttrForElement,
                [attribute.as_str(), kind_name],
            ));
        }
        attrs.push((attribute, value));
        rest = rest[caps[0].len()..].trim_start();
    }
    Ok(attrs)
}

const TOKEN_ATTRIBUTES: &[&str] = &[
    "mathvariant",
    "mathsize",
    "mathcolor",
    "mathbackground",
    "dir",
    "class",
    "id",
    "style",
    "href",
    "fontfamily",
    "fontsize",
    "fontstyle",
    "fontweight",
    "color",
    "background",
];

const MO_ATTRIBUTES: &[&str] = &[
    "form",
    "fence",
    "separator",
    "lspace",
    "rspace",
    "stretchy",
    "symmetric",
    "maxsize",
    "minsize",
    "largeop",
    "movablelimits",
    "accent",
    "linebreak",
];

fn token_attribute_allowed(kind: NodeKind, attribute: &str) -> bool {
    if attribute.starts_with("data-") || TOKEN_ATTRIBUTES.contains(&attribute) {
        return true;
    }
    match kind {
        NodeKind::Mo => MO_ATTRIBUTES.contains(&attribute),
        NodeKind::Mspace => matches!(attribute, "width" | "height" | "depth" | "linebreak"),
        NodeKind::Ms => matches!(attribute, "lquote" | "rquote"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_attributes() {
        let attrs = parse_token_attributes(NodeKind::Mo, "mo", r#"lspace="1em" rspace='0'"#).unwrap();
        assert_eq!(
            attrs,
            vec![
                ("lspace".to_string(), "1em".to_string()),
                ("rspace".to_string(), "0".to_string())
            ]
        );
    }

    #[test]
    fn test_token_attribute_not_allowed() {
        let err = parse_token_attributes(NodeKind::Mi, "mi", "stretchy=true").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAttrForElement);
        assert_eq!(err.message(), "stretchy is not a recognized attribute for mi");
    }

    #[test]
    fn test_token_attribute_malformed() {
        let err = parse_token_attributes(NodeKind::Mi, "mi", "=1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMathMLAttr);
    }
}
