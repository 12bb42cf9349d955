//! Colour names and colour models
//!
//! Named colours cover the basic CSS names and the dvips palette. Colour
//! specifications in the `rgb`, `RGB`, `gray` and `HTML` models are
//! normalised to `#RRGGBB`; `name!pct!name` mixes two colours.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;

use crate::utils::error::{ErrorKind, ParseResult, TexError};

pub static NAMED_COLORS: phf::Map<&'static str, &'static str> = phf_map! {
    "black" => "#000000",
    "white" => "#FFFFFF",
    "red" => "#FF0000",
    "green" => "#00FF00",
    "blue" => "#0000FF",
    "yellow" => "#FFFF00",
    "cyan" => "#00FFFF",
    "magenta" => "#FF00FF",
    "orange" => "#FFA500",
    "purple" => "#800080",
    "pink" => "#FFC0CB",
    "brown" => "#A52A2A",
    "gray" => "#808080",
    "grey" => "#808080",
    "darkgray" => "#A9A9A9",
    "darkgrey" => "#A9A9A9",
    "lightgray" => "#D3D3D3",
    "lightgrey" => "#D3D3D3",
    "lime" => "#00FF00",
    "olive" => "#808000",
    "teal" => "#008080",
    "navy" => "#000080",
    "maroon" => "#800000",
    "silver" => "#C0C0C0",
    "aqua" => "#00FFFF",
    "fuchsia" => "#FF00FF",
    "Apricot" => "#FBB982",
    "Aquamarine" => "#00B5BE",
    "Bittersweet" => "#C04F17",
    "Black" => "#000000",
    "Blue" => "#0000FF",
    "BlueGreen" => "#00B5BE",
    "BlueViolet" => "#473992",
    "BrickRed" => "#B6321C",
    "Brown" => "#792500",
    "BurntOrange" => "#F7921D",
    "CadetBlue" => "#74729A",
    "CarnationPink" => "#F282B4",
    "Cerulean" => "#00A2E3",
    "CornflowerBlue" => "#41B0E4",
    "Cyan" => "#00FFFF",
    "Dandelion" => "#FDBC42",
    "DarkOrchid" => "#A4538A",
    "Emerald" => "#00A99D",
    "ForestGreen" => "#009B55",
    "Fuchsia" => "#8C368C",
    "Goldenrod" => "#FFDF42",
    "Gray" => "#808080",
    "Green" => "#00FF00",
    "GreenYellow" => "#DFE674",
    "JungleGreen" => "#00A99A",
    "Lavender" => "#F49EC4",
    "LimeGreen" => "#8DC73E",
    "Magenta" => "#FF00FF",
    "Mahogany" => "#A9341F",
    "Maroon" => "#AF3235",
    "Melon" => "#F89E7B",
    "MidnightBlue" => "#006795",
    "Mulberry" => "#A93C93",
    "NavyBlue" => "#006EB8",
    "OliveGreen" => "#3C8031",
    "Orange" => "#FFA500",
    "OrangeRed" => "#ED135A",
    "Orchid" => "#AF72B0",
    "Peach" => "#F7965A",
    "Periwinkle" => "#7977B8",
    "PineGreen" => "#008B72",
    "Plum" => "#92268F",
    "ProcessBlue" => "#00B0F0",
    "Purple" => "#800080",
    "RawSienna" => "#974006",
    "Red" => "#FF0000",
    "RedOrange" => "#F26035",
    "RedViolet" => "#A1246B",
    "Rhodamine" => "#EF559F",
    "RoyalBlue" => "#0071BC",
    "RoyalPurple" => "#613F99",
    "RubineRed" => "#ED017D",
    "Salmon" => "#F69289",
    "SeaGreen" => "#3FBC9D",
    "Sepia" => "#671800",
    "SkyBlue" => "#46C5DD",
    "SpringGreen" => "#C6DC67",
    "Tan" => "#DA9D76",
    "TealBlue" => "#00AEB3",
    "Thistle" => "#D883B7",
    "Turquoise" => "#00B4CE",
    "Violet" => "#58429B",
    "VioletRed" => "#EF58A0",
    "White" => "#FFFFFF",
    "WildStrawberry" => "#EE2967",
    "Yellow" => "#FFFF00",
    "YellowGreen" => "#98CC70",
    "YellowOrange" => "#FAA21A",
};

pub const UNDEFINED_COLOR_MODEL: ErrorKind = ErrorKind::Custom {
    id: "UndefinedColorModel",
    template: "Color model '%1' not defined",
};

pub const MODEL_ARG_COUNT: ErrorKind = ErrorKind::Custom {
    id: "ModelArg1",
    template: "Color values for the %1 model require %2 numbers",
};

pub const MODEL_ARG_RANGE: ErrorKind = ErrorKind::Custom {
    id: "ModelArg2",
    template: "Color values for the %1 model must be between %2 and %3",
};

pub const INVALID_NUMBER: ErrorKind = ErrorKind::Custom {
    id: "InvalidNumber",
    template: "Invalid number",
};

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#?([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").expect("hex colour pattern is valid");
    static ref CSS_NAME: Regex = Regex::new(r"^[a-zA-Z]+$").expect("colour name pattern is valid");
}

/// Resolve a colour given an optional model, e.g. `(Some("rgb"), "1,0,0")`
/// or `(None, "RoyalBlue")`
pub fn parse_color(model: Option<&str>, spec: &str) -> ParseResult<String> {
    let spec = spec.trim();
    match model.map(str::trim) {
        None | Some("") | Some("named") => named_color(spec),
        Some("rgb") => {
            let [r, g, b] = components::<3>("rgb", spec, 0.0, 1.0)?;
            Ok(hex(r * 255.0, g * 255.0, b * 255.0))
        }
        Some("RGB") => {
            let [r, g, b] = components::<3>("RGB", spec, 0.0, 255.0)?;
            Ok(hex(r, g, b))
        }
        Some("gray") => {
            let [v] = components::<1>("gray", spec, 0.0, 1.0)?;
            Ok(hex(v * 255.0, v * 255.0, v * 255.0))
        }
        Some("HTML") => match HEX_COLOR.captures(spec) {
            Some(caps) if caps[1].len() == 6 => Ok(format!("#{}", caps[1].to_uppercase())),
            _ => Err(TexError::new(MODEL_ARG_COUNT, ["HTML", "6 hexadecimal"])),
        },
        Some(other) => Err(TexError::new(UNDEFINED_COLOR_MODEL, [other])),
    }
}

/// A colour name, a `#hex` value, or an xcolor mix `a!pct!b`
fn named_color(spec: &str) -> ParseResult<String> {
    if spec.contains('!') {
        return mix(spec);
    }
    if let Some(value) = NAMED_COLORS.get(spec) {
        return Ok((*value).to_string());
    }
    if spec.starts_with('#') && HEX_COLOR.is_match(spec) {
        return Ok(spec.to_uppercase());
    }
    // Unknown plain names are passed through as CSS colour names
    if CSS_NAME.is_match(spec) {
        return Ok(spec.to_string());
    }
    Err(TexError::simple(INVALID_NUMBER))
}

fn mix(spec: &str) -> ParseResult<String> {
    let parts: Vec<&str> = spec.split('!').map(str::trim).collect();
    let first = rgb_of(&named_color(parts[0])?);
    let percent: f64 = parts
        .get(1)
        .map(|p| p.parse::<f64>())
        .transpose()
        .map_err(|_| TexError::simple(INVALID_NUMBER))?
        .unwrap_or(100.0)
        .clamp(0.0, 100.0);
    let second = match parts.get(2) {
        Some(name) => rgb_of(&named_color(name)?),
        None => Some((255.0, 255.0, 255.0)),
    };
    match (first, second) {
        (Some(a), Some(b)) => {
            let t = percent / 100.0;
            Ok(hex(
                a.0 * t + b.0 * (1.0 - t),
                a.1 * t + b.1 * (1.0 - t),
                a.2 * t + b.2 * (1.0 - t),
            ))
        }
        _ => Err(TexError::simple(INVALID_NUMBER)),
    }
}

fn rgb_of(color: &str) -> Option<(f64, f64, f64)> {
    let caps = HEX_COLOR.captures(color)?;
    let digits = &caps[1];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let value = u32::from_str_radix(&expanded, 16).ok()?;
    Some((
        ((value >> 16) & 0xFF) as f64,
        ((value >> 8) & 0xFF) as f64,
        (value & 0xFF) as f64,
    ))
}

fn components<const N: usize>(model: &str, spec: &str, min: f64, max: f64) -> ParseResult<[f64; N]> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(TexError::new(MODEL_ARG_COUNT, [model.to_string(), N.to_string()]));
    }
    let mut values = [0.0; N];
    for (slot, part) in values.iter_mut().zip(&parts) {
        let value: f64 = part.parse().map_err(|_| TexError::simple(INVALID_NUMBER))?;
        if !(min..=max).contains(&value) {
            return Err(TexError::new(
                MODEL_ARG_RANGE,
                [model.to_string(), min.to_string(), max.to_string()],
            ));
        }
        *slot = value;
    }
    Ok(values)
}

fn hex(r: f64, g: f64, b: f64) -> String {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_color() {
        assert_eq!(parse_color(None, "RoyalBlue").unwrap(), "#0071BC");
        assert_eq!(parse_color(None, "red").unwrap(), "#FF0000");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(parse_color(None, "rebeccapurple").unwrap(), "rebeccapurple");
    }

    #[test]
    fn test_rgb_models() {
        assert_eq!(parse_color(Some("rgb"), "1, 0.5, 0").unwrap(), "#FF8000");
        assert_eq!(parse_color(Some("RGB"), "0,128,255").unwrap(), "#0080FF");
        assert_eq!(parse_color(Some("gray"), "0").unwrap(), "#000000");
        assert_eq!(parse_color(Some("HTML"), "00ff00").unwrap(), "#00FF00");
    }

    #[test]
    fn test_model_errors() {
        let err = parse_color(Some("rgb"), "1,0").unwrap_err();
        assert_eq!(err.id(), "ModelArg1");
        assert_eq!(err.message(), "Color values for the rgb model require 3 numbers");
        let err = parse_color(Some("rgb"), "2,0,0").unwrap_err();
        assert_eq!(err.id(), "ModelArg2");
        let err = parse_color(Some("cmyk"), "0,0,0,1").unwrap_err();
        assert_eq!(err.message(), "Color model 'cmyk' not defined");
    }

    #[test]
    fn test_mix() {
        assert_eq!(parse_color(None, "black!50!white").unwrap(), "#808080");
        assert_eq!(parse_color(None, "red!0").unwrap(), "#FFFFFF");
    }
}
