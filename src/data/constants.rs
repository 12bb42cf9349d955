//! Numeric and named constants: spacing, font variants, math styles,
//! sizes, and dimension conversion.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;

/// Named math spaces in em
pub mod space {
    pub const THIN: f64 = 3.0 / 18.0;
    pub const MEDIUM: f64 = 4.0 / 18.0;
    pub const THICK: f64 = 5.0 / 18.0;
    pub const QUAD: f64 = 1.0;
    pub const QQUAD: f64 = 2.0;
    pub const EN: f64 = 0.5;
}

/// Sizes of the `\big` family in em
pub mod delim_size {
    pub const BIG: f64 = 1.2;
    pub const BIG2: f64 = 1.623;
    pub const BIGG: f64 = 2.047;
    pub const BIGG2: f64 = 2.470;
}

/// A font variant: the MathML `mathvariant` value plus an optional
/// `data-mjx-variant` for variants MathML has no name for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub mathvariant: &'static str,
    pub mjx: Option<&'static str>,
}

pub static VARIANTS: phf::Map<&'static str, Variant> = phf_map! {
    "normal" => Variant { mathvariant: "normal", mjx: None },
    "italic" => Variant { mathvariant: "italic", mjx: None },
    "bold" => Variant { mathvariant: "bold", mjx: None },
    "bold-italic" => Variant { mathvariant: "bold-italic", mjx: None },
    "double-struck" => Variant { mathvariant: "double-struck", mjx: None },
    "fraktur" => Variant { mathvariant: "fraktur", mjx: None },
    "bold-fraktur" => Variant { mathvariant: "bold-fraktur", mjx: None },
    "script" => Variant { mathvariant: "script", mjx: None },
    "bold-script" => Variant { mathvariant: "bold-script", mjx: None },
    "sans-serif" => Variant { mathvariant: "sans-serif", mjx: None },
    "bold-sans-serif" => Variant { mathvariant: "bold-sans-serif", mjx: None },
    "sans-serif-italic" => Variant { mathvariant: "sans-serif-italic", mjx: None },
    "monospace" => Variant { mathvariant: "monospace", mjx: None },
    "-tex-calligraphic" => Variant { mathvariant: "script", mjx: Some("-tex-calligraphic") },
    "-tex-bold-calligraphic" => Variant { mathvariant: "bold-script", mjx: Some("-tex-bold-calligraphic") },
    "-tex-oldstyle" => Variant { mathvariant: "normal", mjx: Some("-tex-oldstyle") },
    "-tex-mathit" => Variant { mathvariant: "italic", mjx: Some("-tex-mathit") },
};

/// Font commands and the variant they select
pub static FONT_COMMANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "mathrm" => "normal",
    "mathup" => "normal",
    "mathnormal" => "",
    "mathbf" => "bold",
    "mathbfup" => "bold",
    "mathit" => "-tex-mathit",
    "mathbfit" => "bold-italic",
    "mathbb" => "double-struck",
    "Bbb" => "double-struck",
    "mathfrak" => "fraktur",
    "mathbffrak" => "bold-fraktur",
    "mathscr" => "script",
    "mathbfscr" => "bold-script",
    "mathsf" => "sans-serif",
    "mathsfup" => "sans-serif",
    "mathbfsf" => "bold-sans-serif",
    "mathsfit" => "sans-serif-italic",
    "mathtt" => "monospace",
    "mathcal" => "-tex-calligraphic",
    "mathbfcal" => "-tex-bold-calligraphic",
};

/// Old-style font switches (`\rm`, `\bf` ...)
pub static FONT_SWITCHES: phf::Map<&'static str, &'static str> = phf_map! {
    "rm" => "normal",
    "mit" => "italic",
    "oldstyle" => "-tex-oldstyle",
    "cal" => "-tex-calligraphic",
    "it" => "-tex-mathit",
    "bf" => "bold",
    "bbFont" => "double-struck",
    "scr" => "script",
    "frak" => "fraktur",
    "sf" => "sans-serif",
    "tt" => "monospace",
};

/// Math styles: `displaystyle` and `scriptlevel` values
pub static MATH_STYLES: phf::Map<&'static str, (bool, u8)> = phf_map! {
    "displaystyle" => (true, 0),
    "textstyle" => (false, 0),
    "scriptstyle" => (false, 1),
    "scriptscriptstyle" => (false, 2),
};

/// Size switches and their scale factor
pub static SIZES: phf::Map<&'static str, f64> = phf_map! {
    "tiny" => 0.5,
    "Tiny" => 0.6,
    "scriptsize" => 0.7,
    "small" => 0.85,
    "normalsize" => 1.0,
    "large" => 1.2,
    "Large" => 1.44,
    "LARGE" => 1.73,
    "huge" => 2.07,
    "Huge" => 2.49,
};

lazy_static! {
    /// A TeX dimension: optional sign, number, unit
    pub static ref DIMEN: Regex =
        Regex::new(r"^\s*([-+]?)\s*([0-9]+\.?[0-9]*|\.[0-9]+)\s*(pt|em|ex|mu|px|pc|in|mm|cm)")
            .expect("dimension pattern is valid");
}

/// Convert a value in `unit` to em
pub fn to_em(value: f64, unit: &str) -> Option<f64> {
    let factor = match unit {
        "em" => 1.0,
        "ex" => 0.431,
        "pt" => 0.1,
        "pc" => 1.2,
        "px" => 0.1,
        "in" => 7.2,
        "cm" => 7.2 / 2.54,
        "mm" => 7.2 / 25.4,
        "mu" => 1.0 / 18.0,
        _ => return None,
    };
    Some(value * factor)
}

/// Format an em length the way attributes carry it: at most three decimals,
/// trailing zeros trimmed
pub fn em(value: f64) -> String {
    if value.abs() < 0.0006 {
        return "0em".to_string();
    }
    let mut text = format!("{:.3}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{}em", text)
}

/// Parse a dimension at the start of `text`. Returns the normalised
/// dimension and the number of bytes consumed. `mu` is converted to em.
pub fn match_dimen(text: &str) -> Option<(String, usize)> {
    let caps = DIMEN.captures(text)?;
    let whole = caps.get(0)?;
    let sign = caps.get(1).map_or("", |m| m.as_str());
    let number = caps.get(2)?.as_str();
    let unit = caps.get(3)?.as_str();
    let dimen = if unit == "mu" {
        let value: f64 = number.parse().ok()?;
        let value = if sign == "-" { -value } else { value };
        em(to_em(value, unit)?)
    } else {
        format!("{}{}{}", if sign == "-" { "-" } else { "" }, number, unit)
    };
    Some((dimen, whole.end()))
}

/// Convert a normalised dimension back to em
pub fn dimen_to_em(dimen: &str) -> Option<f64> {
    let caps = DIMEN.captures(dimen)?;
    let number: f64 = caps.get(2)?.as_str().parse().ok()?;
    let value = if caps.get(1).map_or("", |m| m.as_str()) == "-" {
        -number
    } else {
        number
    };
    to_em(value, caps.get(3)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_em_formatting() {
        assert_eq!(em(1.0), "1em");
        assert_eq!(em(space::THIN), "0.167em");
        assert_eq!(em(-0.5), "-0.5em");
        assert_eq!(em(0.0001), "0em");
    }

    #[test]
    fn test_match_dimen() {
        assert_eq!(match_dimen("2pt rest"), Some(("2pt".to_string(), 3)));
        assert_eq!(match_dimen(" - 1.5em"), Some(("-1.5em".to_string(), 8)));
        assert_eq!(match_dimen("18mu"), Some(("1em".to_string(), 4)));
        assert_eq!(match_dimen("3 apples"), None);
    }

    #[test]
    fn test_dimen_to_em() {
        assert_eq!(dimen_to_em("10pt"), Some(1.0));
        assert_eq!(dimen_to_em("-2em"), Some(-2.0));
        assert_eq!(dimen_to_em("wide"), None);
    }

    #[test]
    fn test_variant_table() {
        let cal = VARIANTS.get("-tex-calligraphic").copied();
        assert_eq!(
            cal,
            Some(Variant {
                mathvariant: "script",
                mjx: Some("-tex-calligraphic")
            })
        );
        assert_eq!(FONT_COMMANDS.get("mathcal"), Some(&"-tex-calligraphic"));
    }
}
