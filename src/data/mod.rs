//! Data layer - Static tables and constants
//!
//! This module contains the static data the packages build their symbol
//! maps from:
//! - Character tables for control sequences and delimiters
//! - The operator dictionary
//! - Spacing, font-variant, style and size constants
//! - Colour names and colour models

pub mod colors;
pub mod constants;
pub mod operators;
pub mod symbols;

// Re-export commonly used items
pub use colors::{parse_color, NAMED_COLORS};
pub use constants::{em, match_dimen, Variant, VARIANTS};
pub use operators::OpInfo;
pub use symbols::{DELIMITERS, MATHCHAR0MI, MATHCHAR0MO, MATHCHAR7};
