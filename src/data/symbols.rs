//! Character tables for control sequences
//!
//! Keys are control-sequence names without the backslash, except in
//! [`DELIMITERS`] where keys are written as they appear after `\left`.

use phf::phf_map;

/// Control sequences rendered as `mi` (italic where applicable)
pub static MATHCHAR0MI: phf::Map<&'static str, &'static str> = phf_map! {
    // Lowercase Greek
    "alpha" => "\u{03B1}",
    "beta" => "\u{03B2}",
    "gamma" => "\u{03B3}",
    "delta" => "\u{03B4}",
    "epsilon" => "\u{03F5}",
    "zeta" => "\u{03B6}",
    "eta" => "\u{03B7}",
    "theta" => "\u{03B8}",
    "iota" => "\u{03B9}",
    "kappa" => "\u{03BA}",
    "lambda" => "\u{03BB}",
    "mu" => "\u{03BC}",
    "nu" => "\u{03BD}",
    "xi" => "\u{03BE}",
    "omicron" => "\u{03BF}",
    "pi" => "\u{03C0}",
    "rho" => "\u{03C1}",
    "sigma" => "\u{03C3}",
    "tau" => "\u{03C4}",
    "upsilon" => "\u{03C5}",
    "phi" => "\u{03D5}",
    "chi" => "\u{03C7}",
    "psi" => "\u{03C8}",
    "omega" => "\u{03C9}",
    "varepsilon" => "\u{03B5}",
    "vartheta" => "\u{03D1}",
    "varpi" => "\u{03D6}",
    "varrho" => "\u{03F1}",
    "varsigma" => "\u{03C2}",
    "varphi" => "\u{03C6}",
    // Ordinary symbols
    "S" => "\u{00A7}",
    "aleph" => "\u{2135}",
    "hbar" => "\u{210F}",
    "imath" => "\u{0131}",
    "jmath" => "\u{0237}",
    "ell" => "\u{2113}",
    "wp" => "\u{2118}",
    "Re" => "\u{211C}",
    "Im" => "\u{2111}",
    "partial" => "\u{2202}",
    "infty" => "\u{221E}",
    "prime" => "\u{2032}",
    "emptyset" => "\u{2205}",
    "nabla" => "\u{2207}",
    "top" => "\u{22A4}",
    "bot" => "\u{22A5}",
    "angle" => "\u{2220}",
    "triangle" => "\u{25B3}",
    "forall" => "\u{2200}",
    "exists" => "\u{2203}",
    "neg" => "\u{00AC}",
    "lnot" => "\u{00AC}",
    "flat" => "\u{266D}",
    "natural" => "\u{266E}",
    "sharp" => "\u{266F}",
    "clubsuit" => "\u{2663}",
    "diamondsuit" => "\u{2662}",
    "heartsuit" => "\u{2661}",
    "spadesuit" => "\u{2660}",
};

/// Control sequences rendered as `mo`
pub static MATHCHAR0MO: phf::Map<&'static str, &'static str> = phf_map! {
    "surd" => "\u{221A}",
    // Large operators
    "coprod" => "\u{2210}",
    "bigvee" => "\u{22C1}",
    "bigwedge" => "\u{22C0}",
    "biguplus" => "\u{2A04}",
    "bigcap" => "\u{22C2}",
    "bigcup" => "\u{22C3}",
    "int" => "\u{222B}",
    "intop" => "\u{222B}",
    "iint" => "\u{222C}",
    "iiint" => "\u{222D}",
    "prod" => "\u{220F}",
    "sum" => "\u{2211}",
    "bigotimes" => "\u{2A02}",
    "bigoplus" => "\u{2A01}",
    "bigodot" => "\u{2A00}",
    "oint" => "\u{222E}",
    "bigsqcup" => "\u{2A06}",
    "smallint" => "\u{222B}",
    // Binary operators
    "triangleleft" => "\u{25C3}",
    "triangleright" => "\u{25B9}",
    "bigtriangleup" => "\u{25B3}",
    "bigtriangledown" => "\u{25BD}",
    "wedge" => "\u{2227}",
    "land" => "\u{2227}",
    "vee" => "\u{2228}",
    "lor" => "\u{2228}",
    "cap" => "\u{2229}",
    "cup" => "\u{222A}",
    "ddagger" => "\u{2021}",
    "dagger" => "\u{2020}",
    "sqcap" => "\u{2293}",
    "sqcup" => "\u{2294}",
    "uplus" => "\u{228E}",
    "amalg" => "\u{2A3F}",
    "diamond" => "\u{22C4}",
    "bullet" => "\u{2219}",
    "wr" => "\u{2240}",
    "div" => "\u{00F7}",
    "odot" => "\u{2299}",
    "oslash" => "\u{2298}",
    "otimes" => "\u{2297}",
    "ominus" => "\u{2296}",
    "oplus" => "\u{2295}",
    "mp" => "\u{2213}",
    "pm" => "\u{00B1}",
    "circ" => "\u{2218}",
    "bigcirc" => "\u{25EF}",
    "setminus" => "\u{2216}",
    "cdot" => "\u{22C5}",
    "ast" => "\u{2217}",
    "times" => "\u{00D7}",
    "star" => "\u{22C6}",
    // Relations
    "propto" => "\u{221D}",
    "sqsubseteq" => "\u{2291}",
    "sqsupseteq" => "\u{2292}",
    "parallel" => "\u{2225}",
    "mid" => "\u{2223}",
    "dashv" => "\u{22A3}",
    "vdash" => "\u{22A2}",
    "leq" => "\u{2264}",
    "le" => "\u{2264}",
    "geq" => "\u{2265}",
    "ge" => "\u{2265}",
    "lt" => "<",
    "gt" => ">",
    "succ" => "\u{227B}",
    "prec" => "\u{227A}",
    "approx" => "\u{2248}",
    "succeq" => "\u{2AB0}",
    "preceq" => "\u{2AAF}",
    "supset" => "\u{2283}",
    "subset" => "\u{2282}",
    "supseteq" => "\u{2287}",
    "subseteq" => "\u{2286}",
    "in" => "\u{2208}",
    "ni" => "\u{220B}",
    "notin" => "\u{2209}",
    "owns" => "\u{220B}",
    "gg" => "\u{226B}",
    "ll" => "\u{226A}",
    "sim" => "\u{223C}",
    "simeq" => "\u{2243}",
    "perp" => "\u{22A5}",
    "equiv" => "\u{2261}",
    "asymp" => "\u{224D}",
    "smile" => "\u{2323}",
    "frown" => "\u{2322}",
    "ne" => "\u{2260}",
    "neq" => "\u{2260}",
    "cong" => "\u{2245}",
    "doteq" => "\u{2250}",
    "bowtie" => "\u{22C8}",
    "models" => "\u{22A8}",
    // Arrows
    "leftarrow" => "\u{2190}",
    "gets" => "\u{2190}",
    "rightarrow" => "\u{2192}",
    "to" => "\u{2192}",
    "uparrow" => "\u{2191}",
    "downarrow" => "\u{2193}",
    "updownarrow" => "\u{2195}",
    "leftrightarrow" => "\u{2194}",
    "Leftarrow" => "\u{21D0}",
    "Rightarrow" => "\u{21D2}",
    "Uparrow" => "\u{21D1}",
    "Downarrow" => "\u{21D3}",
    "Updownarrow" => "\u{21D5}",
    "Leftrightarrow" => "\u{21D4}",
    "iff" => "\u{27FA}",
    "implies" => "\u{27F9}",
    "impliedby" => "\u{27F8}",
    "longleftarrow" => "\u{27F5}",
    "longrightarrow" => "\u{27F6}",
    "longleftrightarrow" => "\u{27F7}",
    "Longleftarrow" => "\u{27F8}",
    "Longrightarrow" => "\u{27F9}",
    "Longleftrightarrow" => "\u{27FA}",
    "mapsto" => "\u{21A6}",
    "longmapsto" => "\u{27FC}",
    "hookleftarrow" => "\u{21A9}",
    "hookrightarrow" => "\u{21AA}",
    "nearrow" => "\u{2197}",
    "searrow" => "\u{2198}",
    "swarrow" => "\u{2199}",
    "nwarrow" => "\u{2196}",
    "leftharpoonup" => "\u{21BC}",
    "leftharpoondown" => "\u{21BD}",
    "rightharpoonup" => "\u{21C0}",
    "rightharpoondown" => "\u{21C1}",
    "rightleftharpoons" => "\u{21CC}",
    // Punctuation and dots
    "colon" => ":",
    "ldotp" => ".",
    "cdotp" => "\u{22C5}",
    "ldots" => "\u{2026}",
    "cdots" => "\u{22EF}",
    "vdots" => "\u{22EE}",
    "ddots" => "\u{22F1}",
    "dots" => "\u{2026}",
    "dotsc" => "\u{2026}",
    "dotsb" => "\u{22EF}",
    "dotsm" => "\u{22EF}",
    "dotsi" => "\u{22EF}",
    "dotso" => "\u{2026}",
};

/// Control sequences rendered as upright `mi`
pub static MATHCHAR7: phf::Map<&'static str, &'static str> = phf_map! {
    "Gamma" => "\u{0393}",
    "Delta" => "\u{0394}",
    "Theta" => "\u{0398}",
    "Lambda" => "\u{039B}",
    "Xi" => "\u{039E}",
    "Pi" => "\u{03A0}",
    "Sigma" => "\u{03A3}",
    "Upsilon" => "\u{03A5}",
    "Phi" => "\u{03A6}",
    "Psi" => "\u{03A8}",
    "Omega" => "\u{03A9}",
    "_" => "_",
    "#" => "#",
    "$" => "$",
    "%" => "%",
    "&" => "&",
};

/// Delimiters accepted after `\left`, `\right`, `\middle` and `\big`.
/// The empty string is the null delimiter.
pub static DELIMITERS: phf::Map<&'static str, &'static str> = phf_map! {
    "(" => "(",
    ")" => ")",
    "[" => "[",
    "]" => "]",
    "<" => "\u{27E8}",
    ">" => "\u{27E9}",
    "\\lt" => "\u{27E8}",
    "\\gt" => "\u{27E9}",
    "/" => "/",
    "|" => "|",
    "." => "",
    "\\\\" => "\\",
    "\\lmoustache" => "\u{23B0}",
    "\\rmoustache" => "\u{23B1}",
    "\\lgroup" => "\u{27EE}",
    "\\rgroup" => "\u{27EF}",
    "\\arrowvert" => "\u{23D0}",
    "\\Arrowvert" => "\u{2016}",
    "\\bracevert" => "\u{23AA}",
    "\\Vert" => "\u{2016}",
    "\\|" => "\u{2016}",
    "\\vert" => "|",
    "\\uparrow" => "\u{2191}",
    "\\downarrow" => "\u{2193}",
    "\\updownarrow" => "\u{2195}",
    "\\Uparrow" => "\u{21D1}",
    "\\Downarrow" => "\u{21D3}",
    "\\Updownarrow" => "\u{21D5}",
    "\\backslash" => "\\",
    "\\rangle" => "\u{27E9}",
    "\\langle" => "\u{27E8}",
    "\\rbrace" => "}",
    "\\lbrace" => "{",
    "\\}" => "}",
    "\\{" => "{",
    "\\rceil" => "\u{2309}",
    "\\lceil" => "\u{2308}",
    "\\rfloor" => "\u{230B}",
    "\\lfloor" => "\u{230A}",
    "\\lbrack" => "[",
    "\\rbrack" => "]",
};

/// Characters replaced when they appear literally in math
pub static REMAP: phf::Map<char, &'static str> = phf_map! {
    '-' => "\u{2212}",
    '*' => "\u{2217}",
    '`' => "\u{2018}",
};

/// Named functions rendered as upright `mi` followed by a function application
pub const NAMED_FUNCTIONS: &[&str] = &[
    "arcsin", "arccos", "arctan", "arg", "cos", "cosh", "cot", "coth", "csc", "deg", "dim",
    "exp", "hom", "ker", "lg", "ln", "log", "sec", "sin", "sinh", "tan", "tanh",
];

/// Named operators taking limits: name and rendered text
pub const NAMED_OPERATORS: &[(&str, &str)] = &[
    ("lim", "lim"),
    ("limsup", "lim\u{2006}sup"),
    ("liminf", "lim\u{2006}inf"),
    ("max", "max"),
    ("min", "min"),
    ("sup", "sup"),
    ("inf", "inf"),
    ("det", "det"),
    ("gcd", "gcd"),
    ("Pr", "Pr"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greek_tables() {
        assert_eq!(MATHCHAR0MI.get("alpha"), Some(&"\u{03B1}"));
        assert_eq!(MATHCHAR7.get("Omega"), Some(&"\u{03A9}"));
    }

    #[test]
    fn test_delimiter_lookup() {
        assert_eq!(DELIMITERS.get("\\langle"), Some(&"\u{27E8}"));
        assert_eq!(DELIMITERS.get("."), Some(&""));
        assert!(DELIMITERS.get("x").is_none());
    }

    #[test]
    fn test_remap() {
        assert_eq!(REMAP.get(&'-'), Some(&"\u{2212}"));
        assert!(REMAP.get(&'+').is_none());
    }
}
