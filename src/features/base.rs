//! The `base` package: characters, delimiters, core commands and the
//! basic array environments

use crate::core::handlers::{arrays, commands, delimiters, scripts, text, tokens};
use crate::core::registry::HandlerKind;
use crate::core::symbols::{
    CharClass, CharacterSymbol, HandlerArg, PatternHandler, PatternSymbol, Symbol, SymbolMap,
};
use crate::core::tree::TexClass;
use crate::data::constants::{delim_size, space, FONT_COMMANDS, FONT_SWITCHES, MATH_STYLES, SIZES};
use crate::data::symbols::{
    DELIMITERS, MATHCHAR0MI, MATHCHAR0MO, MATHCHAR7, NAMED_FUNCTIONS, NAMED_OPERATORS,
};

use super::Configuration;

use HandlerArg::{Bool, Class, Num, Str};

/// Accent commands: character and whether it stretches
const ACCENTS: &[(&str, &str, bool)] = &[
    ("acute", "\u{02CA}", false),
    ("grave", "\u{02CB}", false),
    ("ddot", "\u{00A8}", false),
    ("dddot", "\u{20DB}", false),
    ("tilde", "\u{02DC}", false),
    ("bar", "\u{02C9}", false),
    ("breve", "\u{02D8}", false),
    ("check", "\u{02C7}", false),
    ("hat", "\u{02C6}", false),
    ("vec", "\u{20D7}", false),
    ("dot", "\u{02D9}", false),
    ("mathring", "\u{02DA}", false),
    ("widehat", "\u{0302}", true),
    ("widetilde", "\u{0303}", true),
];

/// Under/over constructions: character and whether scripts stack
const UNDER_OVER: &[(&str, &str, bool)] = &[
    ("overline", "\u{2015}", false),
    ("underline", "\u{2015}", false),
    ("overbrace", "\u{23DE}", true),
    ("underbrace", "\u{23DF}", true),
    ("overparen", "\u{23DC}", false),
    ("underparen", "\u{23DD}", false),
    ("overrightarrow", "\u{2192}", false),
    ("overleftarrow", "\u{2190}", false),
    ("overleftrightarrow", "\u{2194}", false),
    ("underrightarrow", "\u{2192}", false),
    ("underleftarrow", "\u{2190}", false),
    ("underleftrightarrow", "\u{2194}", false),
];

/// `\big` family: class and size
const BIG: &[(&str, TexClass, f64)] = &[
    ("big", TexClass::Ord, delim_size::BIG),
    ("Big", TexClass::Ord, delim_size::BIG2),
    ("bigg", TexClass::Ord, delim_size::BIGG),
    ("Bigg", TexClass::Ord, delim_size::BIGG2),
    ("bigl", TexClass::Open, delim_size::BIG),
    ("Bigl", TexClass::Open, delim_size::BIG2),
    ("biggl", TexClass::Open, delim_size::BIGG),
    ("Biggl", TexClass::Open, delim_size::BIGG2),
    ("bigr", TexClass::Close, delim_size::BIG),
    ("Bigr", TexClass::Close, delim_size::BIG2),
    ("biggr", TexClass::Close, delim_size::BIGG),
    ("Biggr", TexClass::Close, delim_size::BIGG2),
    ("bigm", TexClass::Rel, delim_size::BIG),
    ("Bigm", TexClass::Rel, delim_size::BIG2),
    ("biggm", TexClass::Rel, delim_size::BIGG),
    ("Biggm", TexClass::Rel, delim_size::BIGG2),
];

const SPACES: &[(&str, f64)] = &[
    (",", space::THIN),
    (":", space::MEDIUM),
    (">", space::MEDIUM),
    (";", space::THICK),
    ("!", -space::THIN),
    ("enspace", space::EN),
    ("quad", space::QUAD),
    ("qquad", space::QQUAD),
    ("thinspace", space::THIN),
    ("medspace", space::MEDIUM),
    ("thickspace", space::THICK),
    ("negthinspace", -space::THIN),
    ("negmedspace", -space::MEDIUM),
    ("negthickspace", -space::THICK),
];

const CLASSES: &[(&str, TexClass)] = &[
    ("mathord", TexClass::Ord),
    ("mathop", TexClass::Op),
    ("mathbin", TexClass::Bin),
    ("mathrel", TexClass::Rel),
    ("mathopen", TexClass::Open),
    ("mathclose", TexClass::Close),
    ("mathpunct", TexClass::Punct),
    ("mathinner", TexClass::Inner),
];

const TEXT_COMMANDS: &[(&str, &str)] = &[
    ("text", ""),
    ("mbox", ""),
    ("hbox", ""),
    ("textrm", "normal"),
    ("textup", "normal"),
    ("textnormal", "normal"),
    ("textbf", "bold"),
    ("textit", "italic"),
    ("textsf", "sans-serif"),
    ("texttt", "monospace"),
];

fn special_characters() -> SymbolMap {
    SymbolMap::new("special")
        .command("{", commands::open, &[])
        .command("}", commands::close, &[])
        .command("^", scripts::superscript, &[])
        .command("_", scripts::subscript, &[])
        .command("'", scripts::prime, &[])
        .command("&", commands::entry, &[])
        .command("#", commands::hash, &[])
        .command("~", commands::tilde, &[])
}

/// Delimiters written as control sequences, usable on their own
fn delimiter_macros() -> SymbolMap {
    let mut map = SymbolMap::new("delimiter-macros").with_character_handler(tokens::delimiter);
    for (key, text) in DELIMITERS.entries() {
        match key.strip_prefix('\\') {
            Some(name) if *key != "\\\\" => {
                map.insert(name, Symbol::Character(CharacterSymbol::plain(*text)));
            }
            _ => {}
        }
    }
    map
}

fn named_functions() -> SymbolMap {
    let mut map = SymbolMap::new("named-functions");
    for &name in NAMED_FUNCTIONS {
        map = map.command(name, commands::named_fn, &[Str(name)]);
    }
    for &(name, text) in NAMED_OPERATORS {
        map = map.command(name, commands::named_op, &[Str(text)]);
    }
    map
}

fn macros() -> SymbolMap {
    let mut map = SymbolMap::new("macros")
        // Fractions and roots
        .command("frac", commands::frac, &[])
        .command("sqrt", commands::sqrt, &[])
        .command("root", commands::root, &[])
        .command("over", delimiters::over, &[Str(""), Str(""), Str("")])
        .command("atop", delimiters::over, &[Str(""), Str(""), Str("0")])
        .command("above", delimiters::over, &[Str(""), Str(""), Str("")])
        .command("choose", delimiters::over, &[Str("("), Str(")"), Str("0")])
        .command("overwithdelims", delimiters::over, &[Str(""), Str(""), Str("")])
        .command("atopwithdelims", delimiters::over, &[Str(""), Str(""), Str("0")])
        .command("abovewithdelims", delimiters::over, &[Str(""), Str(""), Str("")])
        // Delimiters
        .command("left", delimiters::left, &[])
        .command("right", delimiters::right, &[])
        .command("middle", delimiters::middle, &[])
        // Scripts and limits
        .command("sp", scripts::superscript, &[])
        .command("sb", scripts::subscript, &[])
        .command("limits", scripts::limits, &[Bool(true)])
        .command("nolimits", scripts::limits, &[Bool(false)])
        .command("overset", commands::set_over_under, &[])
        .command("underset", commands::set_over_under, &[])
        .macro_("stackrel", "\\mathrel{\\overset{#1}{#2}}", 2)
        // Spacing
        .command(" ", commands::tilde, &[])
        .command("nobreakspace", commands::tilde, &[])
        .command("hskip", commands::hskip, &[])
        .command("hspace", commands::hskip, &[])
        .command("kern", commands::hskip, &[])
        .command("mkern", commands::hskip, &[])
        .command("mskip", commands::hskip, &[])
        .command("mspace", commands::hskip, &[])
        .command("phantom", commands::phantom, &[Bool(true), Bool(true)])
        .command("vphantom", commands::phantom, &[Bool(true), Bool(false)])
        .command("hphantom", commands::phantom, &[Bool(false), Bool(true)])
        .command("smash", commands::smash, &[])
        .command("llap", commands::lap, &[Str("left")])
        .command("rlap", commands::lap, &[Str("right")])
        .command("strut", commands::strut, &[])
        .macro_("mathstrut", "\\vphantom{(}", 0)
        .command("raise", commands::raise_lower, &[])
        .command("lower", commands::raise_lower, &[])
        .command("moveleft", commands::move_left_right, &[])
        .command("moveright", commands::move_left_right, &[])
        // Modular arithmetic
        .macro_("bmod", "\\mathbin{\\mathrm{mod}}", 0)
        .macro_("pod", "\\mkern18mu(#1)", 1)
        .macro_("pmod", "\\pod{\\mathrm{mod}\\mkern6mu #1}", 1)
        .macro_("mod", "\\mkern18mu\\mathrm{mod}\\,\\,#1", 1)
        // Boxes, negation, choices and raw markup
        .command("not", commands::not, &[])
        .command("fbox", commands::fbox, &[])
        .command("mathchoice", commands::mathchoice, &[])
        .command("unicode", commands::unicode, &[])
        .command("mmlToken", commands::mml_token, &[])
        .command("relax", commands::relax, &[])
        // Tables
        .command("matrix", arrays::matrix, &[])
        .command("pmatrix", arrays::matrix, &[Str("("), Str(")")])
        .command("cases", arrays::matrix, &[Str("{"), Str(""), Str("ll"), Str("1em"), Str("0.2em"), Bool(true)])
        .command("cr", arrays::cr, &[])
        .command("\\", arrays::linebreak, &[])
        .command("newline", arrays::linebreak, &[])
        .command("hline", arrays::hline, &[Str("solid")])
        .command("hdashline", arrays::hline, &[Str("dashed")])
        .command("begin", arrays::begin, &[])
        .command("end", arrays::end, &[]);

    for (name, variant) in FONT_COMMANDS.entries() {
        map = map.command(name, commands::math_font, &[Str(*variant)]);
    }
    for (name, variant) in FONT_SWITCHES.entries() {
        map = map.command(name, commands::font_switch, &[Str(*variant)]);
    }
    for name in MATH_STYLES.keys() {
        map = map.command(name, commands::set_style, &[]);
    }
    for (name, size) in SIZES.entries() {
        map = map.command(name, commands::set_size, &[Num(*size as f32)]);
    }
    for &(name, class) in CLASSES {
        map = map.command(name, commands::math_class, &[Class(class)]);
    }
    for &(name, class, size) in BIG {
        map = map.command(name, delimiters::big, &[Class(class), Num(size as f32)]);
    }
    for &(name, width) in SPACES {
        map = map.command(name, commands::spacer, &[Num(width as f32)]);
    }
    for &(name, mark, stretchy) in ACCENTS {
        map = map.command(name, commands::accent, &[Str(mark), Bool(stretchy)]);
    }
    for &(name, mark, stack) in UNDER_OVER {
        map = map.command(name, commands::under_over, &[Str(mark), Bool(stack)]);
    }
    for &(name, font) in TEXT_COMMANDS {
        map = map.command(name, text::text, &[Str(font)]);
    }
    map
}

fn environments() -> SymbolMap {
    SymbolMap::new("environment")
        .environment("array", arrays::array_env, &[])
        .environment("matrix", arrays::matrix_env, &[])
        .environment("pmatrix", arrays::matrix_env, &[Str("("), Str(")")])
        .environment("bmatrix", arrays::matrix_env, &[Str("["), Str("]")])
        .environment("Bmatrix", arrays::matrix_env, &[Str("{"), Str("}")])
        .environment("vmatrix", arrays::matrix_env, &[Str("|"), Str("|")])
        .environment("Vmatrix", arrays::matrix_env, &[Str("\u{2016}"), Str("\u{2016}")])
        .environment(
            "cases",
            arrays::matrix_env,
            &[Str("{"), Str(""), Str("ll"), Str("1em"), Str("0.2em"), Str("T"), Bool(true)],
        )
        .environment(
            "eqnarray",
            arrays::aligned_env,
            &[Str("rcl"), Str("0.278em"), Bool(true), Bool(true), Bool(true)],
        )
        .environment(
            "eqnarray*",
            arrays::aligned_env,
            &[Str("rcl"), Str("0.278em"), Bool(false), Bool(true), Bool(true)],
        )
}

fn pattern(name: &'static str, class: CharClass, handler: PatternHandler) -> PatternSymbol {
    PatternSymbol { name, class, handler }
}

pub fn configuration() -> Configuration {
    Configuration::new("base")
        .map(HandlerKind::Character, special_characters())
        .map(HandlerKind::Delimiter, SymbolMap::characters("delimiter", tokens::delimiter, &DELIMITERS))
        .map(HandlerKind::Macro, SymbolMap::characters("mathchar0mi", tokens::mathchar0mi, &MATHCHAR0MI))
        .map(HandlerKind::Macro, SymbolMap::characters("mathchar0mo", tokens::mathchar0mo, &MATHCHAR0MO))
        .map(HandlerKind::Macro, SymbolMap::characters("mathchar7", tokens::mathchar7, &MATHCHAR7))
        .map(HandlerKind::Macro, macros())
        .map(HandlerKind::Macro, named_functions())
        .map(HandlerKind::Macro, delimiter_macros())
        .map(HandlerKind::Environment, environments())
        .pattern(pattern("command", CharClass::ControlSequence, tokens::control_sequence))
        .pattern(pattern("letter", CharClass::Letter, tokens::letter))
        .pattern(pattern("digit", CharClass::Digit, tokens::digit))
        .pattern(pattern("other", CharClass::Other, tokens::other))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_macros_skip_double_backslash() {
        let map = delimiter_macros();
        assert!(map.contains("langle"));
        assert!(map.contains("{"));
        assert!(!map.contains("\\"));
    }

    #[test]
    fn test_macro_table_entries() {
        let map = macros();
        for name in ["frac", "mathbf", "rm", "displaystyle", "Large", "mathrel", "Bigl", ",", "hat", "overbrace", "text", "\\"] {
            assert!(map.contains(name), "missing \\{}", name);
        }
    }

    #[test]
    fn test_configuration_patterns() {
        let registry = configuration().registry();
        assert_eq!(registry.patterns().len(), 4);
        assert!(registry.lookup_delimiter("(").is_some());
        assert!(registry.lookup_environment("pmatrix").is_some());
    }
}
