//! Parser options

use indexmap::IndexMap;

use super::tags::{TagMode, TagSide};

/// A macro supplied through the options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroDefinition {
    pub template: String,
    pub args: usize,
    /// Default of an optional first argument
    pub default: Option<String>,
}

/// An environment supplied through the options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentDefinition {
    pub begin: String,
    pub end: String,
    pub args: usize,
    pub default: Option<String>,
}

/// Options controlling a parse
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserOptions {
    /// Maximum number of macro and environment substitutions per parse
    /// Default: 10000
    pub max_macros: usize,

    /// Maximum size in bytes of pending expanded text
    /// Default: 5120
    pub max_buffer: usize,

    /// Parse as a displayed formula
    /// Default: false
    pub display: bool,

    /// Automatic equation numbering
    /// Default: none
    pub tags: TagMode,

    /// Side of equation numbers
    /// Default: right
    pub tag_side: TagSide,

    /// Indent of equation numbers
    /// Default: 0.8em
    pub tag_indent: String,

    /// Colour model used when `\color` names no model
    /// Default: named
    pub color_model: String,

    /// Macros defined by the `configmacros` package
    pub macros: IndexMap<String, MacroDefinition>,

    /// Environments defined by the `configmacros` package
    pub environments: IndexMap<String, EnvironmentDefinition>,

    /// Attach `data-latex` source attributes
    /// Default: true
    pub data_latex: bool,

    /// Return an error node instead of failing; set by the `noerrors` package
    /// Default: false
    pub recover_errors: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_macros: 10000,
            max_buffer: 5 * 1024,
            display: false,
            tags: TagMode::None,
            tag_side: TagSide::Right,
            tag_indent: "0.8em".to_string(),
            color_model: "named".to_string(),
            macros: IndexMap::new(),
            environments: IndexMap::new(),
            data_latex: true,
            recover_errors: false,
        }
    }
}

impl ParserOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for inline math
    pub fn inline() -> Self {
        Self::default()
    }

    /// Options for displayed math with AMS numbering
    pub fn display() -> Self {
        Self {
            display: true,
            tags: TagMode::Ams,
            ..Self::default()
        }
    }

    /// Options with a small substitution limit
    pub fn strict_limits(max_macros: usize) -> Self {
        Self {
            max_macros,
            max_buffer: 1024,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn with_tags(mut self, tags: TagMode) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag_side(mut self, side: TagSide) -> Self {
        self.tag_side = side;
        self
    }

    pub fn with_max_macros(mut self, max_macros: usize) -> Self {
        self.max_macros = max_macros;
        self
    }

    pub fn with_max_buffer(mut self, max_buffer: usize) -> Self {
        self.max_buffer = max_buffer;
        self
    }

    pub fn with_data_latex(mut self, data_latex: bool) -> Self {
        self.data_latex = data_latex;
        self
    }

    /// Define a macro (name without backslash)
    pub fn with_macro(mut self, name: &str, template: &str, args: usize) -> Self {
        self.macros.insert(
            name.trim_start_matches('\\').to_string(),
            MacroDefinition {
                template: template.to_string(),
                args,
                default: None,
            },
        );
        self
    }

    pub fn with_environment(mut self, name: &str, begin: &str, end: &str, args: usize) -> Self {
        self.environments.insert(
            name.to_string(),
            EnvironmentDefinition {
                begin: begin.to_string(),
                end: end.to_string(),
                args,
                default: None,
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.max_macros, 10000);
        assert_eq!(options.max_buffer, 5 * 1024);
        assert!(!options.display);
        assert!(options.data_latex);
    }

    #[test]
    fn test_presets() {
        assert!(ParserOptions::display().display);
        assert_eq!(ParserOptions::display().tags, TagMode::Ams);
        assert_eq!(ParserOptions::strict_limits(5).max_macros, 5);
    }

    #[test]
    fn test_with_macro_strips_backslash() {
        let options = ParserOptions::new().with_macro("\\RR", "\\mathbb{R}", 0);
        assert!(options.macros.contains_key("RR"));
    }
}
