//! Error handling for texmml parsing
//!
//! This module provides the typed error value raised by the parser, the
//! result alias used throughout the crate, and the configuration-time error
//! returned while a session is being assembled.
//!
//! A [`TexError`] is pure data: a kind identifier, a message template with
//! `%1`, `%2`, ... placeholders, and the arguments substituted into it.
//! Constructing one never performs I/O.

use std::borrow::Cow;
use std::fmt;

/// The kind of a parse error.
///
/// Each kind carries a stable identifier (see [`ErrorKind::id`]) and a
/// message template (see [`ErrorKind::template`]). Packages that need their
/// own failure kinds use [`ErrorKind::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Grouping balance
    ExtraCloseMissingOpen,
    ExtraOpenMissingClose,
    MissingCloseBrace,
    ExtraCloseLooking,
    // Delimiter balance
    ExtraLeftMissingRight,
    MissingLeftExtraRight,
    ExtraMiddle,
    MissingOrUnrecognizedDelim,
    // Arguments
    MissingArgFor,
    MissingCloseBracket,
    MissingDimOrUnits,
    MissingCS,
    IllegalParamNumber,
    IllegalMacroParam,
    MissingReplacementString,
    MissingBoxFor,
    BadMathStyleFor,
    TokenNotFoundForCommand,
    MismatchUseDef,
    RunawayArgument,
    // Ambiguity
    DoubleExponent,
    DoubleSubscripts,
    AmbiguousUseOf,
    MissingOpenForSup,
    MissingOpenForSub,
    MissingScript,
    // Lookup
    UndefinedControlSequence,
    UnknownEnv,
    InvalidEnv,
    EnvBadEnd,
    EnvMissingEnd,
    MissingBeginExtraEnd,
    Misplaced,
    CantUseHash1,
    ExtraAlignTab,
    // Resource limits
    MaxMacroSub1,
    MaxMacroSub2,
    MaxBufferSize,
    // Equation numbering
    MultipleCommand,
    MultipleLabel,
    CommandNotAllowedInEnv,
    ErroneousNestingEq,
    MultlineRowsOneCol,
    // Raw markup validation
    NotMathMLToken,
    InvalidMathMLAttr,
    UnknownAttrForElement,
    BadUnicode,
    /// A package-defined error kind
    Custom {
        id: &'static str,
        template: &'static str,
    },
}

impl ErrorKind {
    /// Stable identifier of this kind
    pub fn id(&self) -> &'static str {
        match self {
            ErrorKind::ExtraCloseMissingOpen => "ExtraCloseMissingOpen",
            ErrorKind::ExtraOpenMissingClose => "ExtraOpenMissingClose",
            ErrorKind::MissingCloseBrace => "MissingCloseBrace",
            ErrorKind::ExtraCloseLooking => "ExtraCloseLooking",
            ErrorKind::ExtraLeftMissingRight => "ExtraLeftMissingRight",
            ErrorKind::MissingLeftExtraRight => "MissingLeftExtraRight",
            ErrorKind::ExtraMiddle => "ExtraMiddle",
            ErrorKind::MissingOrUnrecognizedDelim => "MissingOrUnrecognizedDelim",
            ErrorKind::MissingArgFor => "MissingArgFor",
            ErrorKind::MissingCloseBracket => "MissingCloseBracket",
            ErrorKind::MissingDimOrUnits => "MissingDimOrUnits",
            ErrorKind::MissingCS => "MissingCS",
            ErrorKind::IllegalParamNumber => "IllegalParamNumber",
            ErrorKind::IllegalMacroParam => "IllegalMacroParam",
            ErrorKind::MissingReplacementString => "MissingReplacementString",
            ErrorKind::MissingBoxFor => "MissingBoxFor",
            ErrorKind::BadMathStyleFor => "BadMathStyleFor",
            ErrorKind::TokenNotFoundForCommand => "TokenNotFoundForCommand",
            ErrorKind::MismatchUseDef => "MismatchUseDef",
            ErrorKind::RunawayArgument => "RunawayArgument",
            ErrorKind::DoubleExponent => "DoubleExponent",
            ErrorKind::DoubleSubscripts => "DoubleSubscripts",
            ErrorKind::AmbiguousUseOf => "AmbiguousUseOf",
            ErrorKind::MissingOpenForSup => "MissingOpenForSup",
            ErrorKind::MissingOpenForSub => "MissingOpenForSub",
            ErrorKind::MissingScript => "MissingScript",
            ErrorKind::UndefinedControlSequence => "UndefinedControlSequence",
            ErrorKind::UnknownEnv => "UnknownEnv",
            ErrorKind::InvalidEnv => "InvalidEnv",
            ErrorKind::EnvBadEnd => "EnvBadEnd",
            ErrorKind::EnvMissingEnd => "EnvMissingEnd",
            ErrorKind::MissingBeginExtraEnd => "MissingBeginExtraEnd",
            ErrorKind::Misplaced => "Misplaced",
            ErrorKind::CantUseHash1 => "CantUseHash1",
            ErrorKind::ExtraAlignTab => "ExtraAlignTab",
            ErrorKind::MaxMacroSub1 => "MaxMacroSub1",
            ErrorKind::MaxMacroSub2 => "MaxMacroSub2",
            ErrorKind::MaxBufferSize => "MaxBufferSize",
            ErrorKind::MultipleCommand => "MultipleCommand",
            ErrorKind::MultipleLabel => "MultipleLabel",
            ErrorKind::CommandNotAllowedInEnv => "CommandNotAllowedInEnv",
            ErrorKind::ErroneousNestingEq => "ErroneousNestingEq",
            ErrorKind::MultlineRowsOneCol => "MultlineRowsOneCol",
            ErrorKind::NotMathMLToken => "NotMathMLToken",
            ErrorKind::InvalidMathMLAttr => "InvalidMathMLAttr",
            ErrorKind::UnknownAttrForElement => "UnknownAttrForElement",
            ErrorKind::BadUnicode => "BadUnicode",
            ErrorKind::Custom { id, .. } => id,
        }
    }

    /// Message template; `%1`, `%2`, ... are replaced by the error arguments
    pub fn template(&self) -> &'static str {
        match self {
            ErrorKind::ExtraCloseMissingOpen => "Extra close brace or missing open brace",
            ErrorKind::ExtraOpenMissingClose => "Extra open brace or missing close brace",
            ErrorKind::MissingCloseBrace => "Missing close brace",
            ErrorKind::ExtraCloseLooking => "Extra close brace while looking for %1",
            ErrorKind::ExtraLeftMissingRight => "Extra \\left or missing \\right",
            ErrorKind::MissingLeftExtraRight => "Missing \\left or extra \\right",
            ErrorKind::ExtraMiddle => "Extra \\middle",
            ErrorKind::MissingOrUnrecognizedDelim => "Missing or unrecognized delimiter for %1",
            ErrorKind::MissingArgFor => "Missing argument for %1",
            ErrorKind::MissingCloseBracket => "Could not find closing ']' for argument to %1",
            ErrorKind::MissingDimOrUnits => "Missing dimension or its units for %1",
            ErrorKind::MissingCS => "%1 must be followed by a control sequence",
            ErrorKind::IllegalParamNumber => "Illegal number of parameters specified in %1",
            ErrorKind::IllegalMacroParam => "Illegal macro parameter reference",
            ErrorKind::MissingReplacementString => {
                "Missing replacement string for definition of %1"
            }
            ErrorKind::MissingBoxFor => "Missing box for %1",
            ErrorKind::BadMathStyleFor => "Bad math style for %1",
            ErrorKind::TokenNotFoundForCommand => "Could not find %1 for %2",
            ErrorKind::MismatchUseDef => "Use of %1 doesn't match its definition",
            ErrorKind::RunawayArgument => "Runaway argument for %1?",
            ErrorKind::DoubleExponent => "Double exponent: use braces to clarify",
            ErrorKind::DoubleSubscripts => "Double subscripts: use braces to clarify",
            ErrorKind::AmbiguousUseOf => "Ambiguous use of %1",
            ErrorKind::MissingOpenForSup => "Missing open brace for superscript",
            ErrorKind::MissingOpenForSub => "Missing open brace for subscript",
            ErrorKind::MissingScript => "Missing superscript or subscript argument",
            ErrorKind::UndefinedControlSequence => "Undefined control sequence %1",
            ErrorKind::UnknownEnv => "Unknown environment '%1'",
            ErrorKind::InvalidEnv => "Invalid environment name '%1'",
            ErrorKind::EnvBadEnd => "\\begin{%1} ended with \\end{%2}",
            ErrorKind::EnvMissingEnd => "Missing \\end{%1}",
            ErrorKind::MissingBeginExtraEnd => "Missing \\begin{%1} or extra \\end{%1}",
            ErrorKind::Misplaced => "Misplaced %1",
            ErrorKind::CantUseHash1 => {
                "You can't use 'macro parameter character #' in math mode"
            }
            ErrorKind::ExtraAlignTab => "Extra alignment tab in \\cases text",
            ErrorKind::MaxMacroSub1 => {
                "Maximum macro substitution count exceeded; is there a recursive macro call?"
            }
            ErrorKind::MaxMacroSub2 => {
                "Maximum substitution count exceeded; is there a recursive latex environment?"
            }
            ErrorKind::MaxBufferSize => {
                "Internal buffer size exceeded; is there a recursive macro call?"
            }
            ErrorKind::MultipleCommand => "Multiple %1",
            ErrorKind::MultipleLabel => "Label '%1' multiply defined",
            ErrorKind::CommandNotAllowedInEnv => "%1 not allowed in %2 environment",
            ErrorKind::ErroneousNestingEq => "Erroneous nesting of equation structures",
            ErrorKind::MultlineRowsOneCol => {
                "The rows within the %1 environment must have exactly one column"
            }
            ErrorKind::NotMathMLToken => "%1 is not a token element",
            ErrorKind::InvalidMathMLAttr => "Invalid MathML attribute: %1",
            ErrorKind::UnknownAttrForElement => "%1 is not a recognized attribute for %2",
            ErrorKind::BadUnicode => "Argument to \\unicode must be a number",
            ErrorKind::Custom { template, .. } => template,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A parse failure for one formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexError {
    kind: ErrorKind,
    args: Vec<String>,
    offset: Option<usize>,
}

impl TexError {
    /// Create an error with positional arguments
    pub fn new<I, S>(kind: ErrorKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TexError {
            kind,
            args: args.into_iter().map(Into::into).collect(),
            offset: None,
        }
    }

    /// Create an error that takes no arguments
    pub fn simple(kind: ErrorKind) -> Self {
        TexError {
            kind,
            args: Vec::new(),
            offset: None,
        }
    }

    /// Attach the byte offset in the source where the error was detected.
    /// An offset that is already set is kept.
    pub fn at(mut self, offset: usize) -> Self {
        if self.offset.is_none() {
            self.offset = Some(offset);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn template(&self) -> &'static str {
        self.kind.template()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Byte offset into the original formula, if known
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The template with its `%n` placeholders substituted
    pub fn message(&self) -> String {
        substitute(self.kind.template(), &self.args).into_owned()
    }
}

/// Replace `%1`..`%9` by the matching argument. `%%` is a literal percent
/// sign; a placeholder without a matching argument is left as is.
fn substitute<'a>(template: &'a str, args: &[String]) -> Cow<'a, str> {
    if !template.contains('%') {
        return Cow::Borrowed(template);
    }
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(d @ '1'..='9') => {
                chars.next();
                let index = d as usize - '1' as usize;
                match args.get(index) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push(d);
                    }
                }
            }
            _ => out.push('%'),
        }
    }
    Cow::Owned(out)
}

impl fmt::Display for TexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for TexError {}

/// Result type for parse operations
pub type ParseResult<T> = Result<T, TexError>;

/// Errors raised while a session is assembled from packages and options
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown package '{0}'")]
    UnknownPackage(String),
    #[error("circular package dependency: {0}")]
    CircularDependency(String),
    #[error("invalid definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_substitution() {
        let err = TexError::new(ErrorKind::MissingArgFor, ["\\frac"]);
        assert_eq!(err.to_string(), "Missing argument for \\frac");
        assert_eq!(err.id(), "MissingArgFor");
    }

    #[test]
    fn test_two_arguments() {
        let err = TexError::new(ErrorKind::EnvBadEnd, ["array", "matrix"]);
        assert_eq!(err.message(), "\\begin{array} ended with \\end{matrix}");
    }

    #[test]
    fn test_repeated_placeholder() {
        let err = TexError::new(ErrorKind::MissingBeginExtraEnd, ["cases"]);
        assert_eq!(
            err.message(),
            "Missing \\begin{cases} or extra \\end{cases}"
        );
    }

    #[test]
    fn test_missing_argument_keeps_placeholder() {
        let err = TexError::simple(ErrorKind::AmbiguousUseOf);
        assert_eq!(err.message(), "Ambiguous use of %1");
    }

    #[test]
    fn test_custom_kind() {
        let kind = ErrorKind::Custom {
            id: "BadColor",
            template: "Unknown color '%1'",
        };
        let err = TexError::new(kind, ["octarine"]);
        assert_eq!(err.id(), "BadColor");
        assert_eq!(err.to_string(), "Unknown color 'octarine'");
    }

    #[test]
    fn test_offset_is_kept_once_set() {
        let err = TexError::simple(ErrorKind::DoubleExponent).at(3).at(7);
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownPackage("tikz".to_string());
        assert_eq!(err.to_string(), "unknown package 'tikz'");
    }
}
