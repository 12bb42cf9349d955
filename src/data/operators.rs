//! Operator dictionary
//!
//! Default TeX class and layout properties of operator text. Operators not
//! listed here get a class from their Unicode block.

use phf::phf_map;

use crate::core::tree::TexClass;

/// Dictionary entry for one operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub class: TexClass,
    pub stretchy: bool,
    pub fence: bool,
    pub symmetric: bool,
    pub largeop: bool,
    pub movablelimits: bool,
    pub accent: bool,
}

const fn op(class: TexClass) -> OpInfo {
    OpInfo {
        class,
        stretchy: false,
        fence: false,
        symmetric: false,
        largeop: false,
        movablelimits: false,
        accent: false,
    }
}

const fn fence(class: TexClass) -> OpInfo {
    OpInfo {
        class,
        stretchy: true,
        fence: true,
        symmetric: true,
        largeop: false,
        movablelimits: false,
        accent: false,
    }
}

const fn large(movablelimits: bool) -> OpInfo {
    OpInfo {
        class: TexClass::Op,
        stretchy: false,
        fence: false,
        symmetric: true,
        largeop: true,
        movablelimits,
        accent: false,
    }
}

const fn arrow() -> OpInfo {
    OpInfo {
        class: TexClass::Rel,
        stretchy: true,
        fence: false,
        symmetric: false,
        largeop: false,
        movablelimits: false,
        accent: false,
    }
}

const fn accent(stretchy: bool) -> OpInfo {
    OpInfo {
        class: TexClass::Ord,
        stretchy,
        fence: false,
        symmetric: false,
        largeop: false,
        movablelimits: false,
        accent: true,
    }
}

static OPERATORS: phf::Map<&'static str, OpInfo> = phf_map! {
    // Fences
    "(" => fence(TexClass::Open),
    ")" => fence(TexClass::Close),
    "[" => fence(TexClass::Open),
    "]" => fence(TexClass::Close),
    "{" => fence(TexClass::Open),
    "}" => fence(TexClass::Close),
    "\u{27E8}" => fence(TexClass::Open),
    "\u{27E9}" => fence(TexClass::Close),
    "\u{2308}" => fence(TexClass::Open),
    "\u{2309}" => fence(TexClass::Close),
    "\u{230A}" => fence(TexClass::Open),
    "\u{230B}" => fence(TexClass::Close),
    "\u{27EE}" => fence(TexClass::Open),
    "\u{27EF}" => fence(TexClass::Close),
    "\u{23B0}" => fence(TexClass::Open),
    "\u{23B1}" => fence(TexClass::Close),
    "|" => fence(TexClass::Ord),
    "\u{2016}" => fence(TexClass::Ord),
    "\u{2223}" => op(TexClass::Rel),
    "\u{2225}" => op(TexClass::Rel),
    // Relations
    "=" => op(TexClass::Rel),
    "<" => op(TexClass::Rel),
    ">" => op(TexClass::Rel),
    ":" => op(TexClass::Rel),
    "\u{2260}" => op(TexClass::Rel),
    "\u{2264}" => op(TexClass::Rel),
    "\u{2265}" => op(TexClass::Rel),
    "\u{2261}" => op(TexClass::Rel),
    "\u{2248}" => op(TexClass::Rel),
    "\u{223C}" => op(TexClass::Rel),
    "\u{2243}" => op(TexClass::Rel),
    "\u{2245}" => op(TexClass::Rel),
    "\u{224D}" => op(TexClass::Rel),
    "\u{2250}" => op(TexClass::Rel),
    "\u{221D}" => op(TexClass::Rel),
    "\u{2208}" => op(TexClass::Rel),
    "\u{2209}" => op(TexClass::Rel),
    "\u{220B}" => op(TexClass::Rel),
    "\u{2282}" => op(TexClass::Rel),
    "\u{2283}" => op(TexClass::Rel),
    "\u{2286}" => op(TexClass::Rel),
    "\u{2287}" => op(TexClass::Rel),
    "\u{2291}" => op(TexClass::Rel),
    "\u{2292}" => op(TexClass::Rel),
    "\u{227A}" => op(TexClass::Rel),
    "\u{227B}" => op(TexClass::Rel),
    "\u{2AAF}" => op(TexClass::Rel),
    "\u{2AB0}" => op(TexClass::Rel),
    "\u{226A}" => op(TexClass::Rel),
    "\u{226B}" => op(TexClass::Rel),
    "\u{22A2}" => op(TexClass::Rel),
    "\u{22A3}" => op(TexClass::Rel),
    "\u{22A5}" => op(TexClass::Rel),
    "\u{22A8}" => op(TexClass::Rel),
    "\u{22C8}" => op(TexClass::Rel),
    "\u{2322}" => op(TexClass::Rel),
    "\u{2323}" => op(TexClass::Rel),
    "\u{2192}" => arrow(),
    "\u{2190}" => arrow(),
    "\u{2194}" => arrow(),
    "\u{21D2}" => arrow(),
    "\u{21D0}" => arrow(),
    "\u{21D4}" => arrow(),
    "\u{21A6}" => arrow(),
    "\u{27F5}" => arrow(),
    "\u{27F6}" => arrow(),
    "\u{27F7}" => arrow(),
    "\u{27F8}" => arrow(),
    "\u{27F9}" => arrow(),
    "\u{27FA}" => arrow(),
    "\u{2191}" => fence(TexClass::Rel),
    "\u{2193}" => fence(TexClass::Rel),
    // Binary operators
    "+" => op(TexClass::Bin),
    "\u{2212}" => op(TexClass::Bin),
    "\u{00B1}" => op(TexClass::Bin),
    "\u{2213}" => op(TexClass::Bin),
    "\u{00D7}" => op(TexClass::Bin),
    "\u{00F7}" => op(TexClass::Bin),
    "\u{22C5}" => op(TexClass::Bin),
    "\u{2217}" => op(TexClass::Bin),
    "\u{2218}" => op(TexClass::Bin),
    "\u{2219}" => op(TexClass::Bin),
    "\u{2229}" => op(TexClass::Bin),
    "\u{222A}" => op(TexClass::Bin),
    "\u{2227}" => op(TexClass::Bin),
    "\u{2228}" => op(TexClass::Bin),
    "\u{2295}" => op(TexClass::Bin),
    "\u{2296}" => op(TexClass::Bin),
    "\u{2297}" => op(TexClass::Bin),
    "\u{2298}" => op(TexClass::Bin),
    "\u{2299}" => op(TexClass::Bin),
    "\u{2216}" => op(TexClass::Bin),
    "\u{22C6}" => op(TexClass::Bin),
    "\u{2020}" => op(TexClass::Bin),
    "\u{2021}" => op(TexClass::Bin),
    "\u{2293}" => op(TexClass::Bin),
    "\u{2294}" => op(TexClass::Bin),
    "\u{228E}" => op(TexClass::Bin),
    "\u{22C4}" => op(TexClass::Bin),
    "\u{2240}" => op(TexClass::Bin),
    "\u{2A3F}" => op(TexClass::Bin),
    "\u{25C3}" => op(TexClass::Bin),
    "\u{25B9}" => op(TexClass::Bin),
    "\u{25B3}" => op(TexClass::Bin),
    "\u{25BD}" => op(TexClass::Bin),
    "\u{25EF}" => op(TexClass::Bin),
    // Punctuation and ordinary operators
    "," => op(TexClass::Punct),
    ";" => op(TexClass::Punct),
    "!" => op(TexClass::Close),
    "?" => op(TexClass::Close),
    "." => op(TexClass::Ord),
    "/" => op(TexClass::Ord),
    "\\" => op(TexClass::Ord),
    "\u{2026}" => op(TexClass::Inner),
    "\u{22EF}" => op(TexClass::Inner),
    "\u{22F1}" => op(TexClass::Inner),
    "\u{22EE}" => op(TexClass::Ord),
    "\u{2032}" => op(TexClass::Ord),
    "\u{2033}" => op(TexClass::Ord),
    "\u{2034}" => op(TexClass::Ord),
    "\u{2057}" => op(TexClass::Ord),
    "\u{221A}" => op(TexClass::Ord),
    "\u{00AC}" => op(TexClass::Ord),
    "\u{2061}" => op(TexClass::None),
    "\u{2062}" => op(TexClass::None),
    // Large operators
    "\u{2211}" => large(true),
    "\u{220F}" => large(true),
    "\u{2210}" => large(true),
    "\u{22C0}" => large(true),
    "\u{22C1}" => large(true),
    "\u{22C2}" => large(true),
    "\u{22C3}" => large(true),
    "\u{2A00}" => large(true),
    "\u{2A01}" => large(true),
    "\u{2A02}" => large(true),
    "\u{2A04}" => large(true),
    "\u{2A06}" => large(true),
    "\u{222B}" => large(false),
    "\u{222C}" => large(false),
    "\u{222D}" => large(false),
    "\u{222E}" => large(false),
    "\u{2A0C}" => large(false),
    // Accents
    "^" => accent(false),
    "~" => accent(false),
    "\u{02C6}" => accent(false),
    "\u{02C7}" => accent(false),
    "\u{02DC}" => accent(false),
    "\u{02CA}" => accent(false),
    "\u{02CB}" => accent(false),
    "\u{02D9}" => accent(false),
    "\u{00A8}" => accent(false),
    "\u{02D8}" => accent(false),
    "\u{02C9}" => accent(false),
    "\u{02DA}" => accent(false),
    "\u{20D7}" => accent(false),
    "\u{0302}" => accent(true),
    "\u{0303}" => accent(true),
    "\u{203E}" => accent(true),
    "_" => accent(true),
    "\u{23DE}" => accent(true),
    "\u{23DF}" => accent(true),
    "\u{2194}\u{0305}" => accent(true),
};

/// Dictionary entry for `text`, falling back to the Unicode block of its
/// first character
pub fn lookup(text: &str) -> OpInfo {
    if let Some(info) = OPERATORS.get(text) {
        return *info;
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => by_range(c),
        _ => op(TexClass::Ord),
    }
}

/// Whether the dictionary lists `text` explicitly
pub fn is_known(text: &str) -> bool {
    OPERATORS.contains_key(text)
}

fn by_range(c: char) -> OpInfo {
    match c as u32 {
        0x2190..=0x21FF | 0x27F0..=0x27FF | 0x2900..=0x297F => arrow(),
        0x2200..=0x22FF => op(TexClass::Bin),
        0x2A00..=0x2AFF => op(TexClass::Bin),
        _ => op(TexClass::Ord),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_operators() {
        assert_eq!(lookup("=").class, TexClass::Rel);
        assert_eq!(lookup("+").class, TexClass::Bin);
        assert!(lookup("(").fence);
        assert!(lookup("\u{27E8}").fence);
        assert!(lookup("|").fence);
    }

    #[test]
    fn test_large_operators() {
        let sum = lookup("\u{2211}");
        assert!(sum.largeop && sum.movablelimits);
        let int = lookup("\u{222B}");
        assert!(int.largeop && !int.movablelimits);
    }

    #[test]
    fn test_unknown_by_block() {
        assert_eq!(lookup("\u{21A0}").class, TexClass::Rel);
        assert_eq!(lookup("\u{22BB}").class, TexClass::Bin);
        assert_eq!(lookup("x").class, TexClass::Ord);
        assert_eq!(lookup("mod").class, TexClass::Ord);
    }
}
