//! Diagnostics for TeX math input
//!
//! [`check_tex`] parses a formula with a session and reports:
//!
//! - The parse error, if any, located by line and column
//! - Plain-TeX infix fractions (`\over`, `\atop`, `\choose` ...)
//! - Deprecated two-letter font switches (`\rm`, `\bf`, `\it` ...)
//!
//! ## Example
//!
//! ```rust
//! use texmml::diagnostics::check_tex;
//! use texmml::TexInput;
//!
//! let result = check_tex(r"x^2^3", &TexInput::default());
//! assert!(result.has_errors());
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::TexInput;

lazy_static! {
    static ref CONTROL_WORD: Regex = Regex::new(r"\\([A-Za-z]+)").expect("control word pattern is valid");
}

/// Infix fraction commands and their preferred replacements
const INFIX_COMMANDS: &[(&str, &str)] = &[
    ("over", "\\frac{a}{b}"),
    ("atop", "\\genfrac{}{}{0pt}{}{a}{b}"),
    ("above", "\\genfrac{}{}{<dimen>}{}{a}{b}"),
    ("choose", "\\binom{a}{b}"),
    ("brace", "\\genfrac\\{\\}{0pt}{}{a}{b}"),
    ("brack", "\\genfrac[]{0pt}{}{a}{b}"),
];

/// Deprecated font switches and their font commands
const FONT_SWITCHES: &[(&str, &str)] = &[
    ("rm", "\\mathrm{...}"),
    ("bf", "\\mathbf{...}"),
    ("it", "\\mathit{...}"),
    ("sf", "\\mathsf{...}"),
    ("tt", "\\mathtt{...}"),
    ("cal", "\\mathcal{...}"),
];

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    /// The formula parses, but the input is discouraged
    Warning,
    /// The formula does not parse
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Error identifier for parse errors (`DoubleExponent` ...)
    pub code: Option<&'static str>,
    /// Line number (1-indexed)
    pub line: Option<usize>,
    /// Column number (1-indexed, in characters)
    pub column: Option<usize>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            code: None,
            line: None,
            column: None,
            suggestion: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.level, code, self.message)?,
            None => write!(f, "{}: {}", self.level, self.message)?,
        }
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "\n  --> line {}:{}", line, col)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  = help: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Check result with summary
#[derive(Debug, Default)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.diagnostics.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        let mut parts = Vec::new();
        if self.errors > 0 {
            parts.push(format!("{} error{}", self.errors, plural(self.errors)));
        }
        if self.warnings > 0 {
            parts.push(format!("{} warning{}", self.warnings, plural(self.warnings)));
        }
        if self.infos > 0 {
            parts.push(format!("{} note{}", self.infos, plural(self.infos)));
        }
        if parts.is_empty() {
            "no issues found".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Parse `input` with `session` and collect diagnostics
pub fn check_tex(input: &str, session: &TexInput) -> CheckResult {
    let mut result = CheckResult::new();
    let line_offsets = compute_line_offsets(input);

    if let Err(err) = session.parse(input) {
        let mut diag = Diagnostic::new(DiagnosticLevel::Error, err.message()).with_code(err.id());
        if let Some(offset) = err.offset() {
            let (line, col) = offset_to_location(input, offset, &line_offsets);
            diag = diag.with_location(line, col);
        }
        result.add(diag);
    }

    for caps in CONTROL_WORD.captures_iter(input) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let (line, col) = offset_to_location(input, whole.start(), &line_offsets);
        if let Some((name, replacement)) = INFIX_COMMANDS.iter().find(|(n, _)| *n == word.as_str()) {
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Warning,
                    format!("infix '\\{}' applies to the whole group", name),
                )
                .with_location(line, col)
                .with_suggestion(format!("use {}", replacement)),
            );
        } else if let Some((name, replacement)) = FONT_SWITCHES.iter().find(|(n, _)| *n == word.as_str()) {
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Warning,
                    format!("font switch '\\{}' is deprecated", name),
                )
                .with_location(line, col)
                .with_suggestion(format!("use {}", replacement)),
            );
        }
    }

    result
}

/// Byte offsets of each line start
fn compute_line_offsets(input: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in input.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Byte offset to 1-indexed line and character column
fn offset_to_location(input: &str, offset: usize, line_offsets: &[usize]) -> (usize, usize) {
    let offset = offset.min(input.len());
    let line = line_offsets.iter().rposition(|&o| o <= offset).unwrap_or(0);
    let start = line_offsets[line];
    let column = input
        .get(start..offset)
        .map(|text| text.chars().count())
        .unwrap_or(0)
        + 1;
    (line + 1, column)
}

/// Format check results for terminal output, quoting the source line of
/// each located diagnostic
pub fn format_diagnostics(result: &CheckResult, input: &str, use_color: bool) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut output = String::new();

    for diag in &result.diagnostics {
        if use_color {
            let color = match diag.level {
                DiagnosticLevel::Error => "\x1b[31m",
                DiagnosticLevel::Warning => "\x1b[33m",
                DiagnosticLevel::Info => "\x1b[34m",
            };
            output.push_str(color);
        }
        output.push_str(&diag.to_string());
        if let (Some(line), Some(col)) = (diag.line, diag.column) {
            if let Some(source) = lines.get(line - 1) {
                output.push_str(&format!("\n  |\n  | {}\n  | {}^", source, " ".repeat(col - 1)));
            }
        }
        if use_color {
            output.push_str("\x1b[0m");
        }
        output.push_str("\n\n");
    }

    if use_color {
        if result.has_errors() {
            output.push_str("\x1b[31m");
        } else if result.warnings > 0 {
            output.push_str("\x1b[33m");
        } else {
            output.push_str("\x1b[32m");
        }
    }

    output.push_str(&format!("Summary: {}", result.summary()));

    if use_color {
        output.push_str("\x1b[0m");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_formula() {
        let result = check_tex(r"\frac{1}{2}", &TexInput::default());
        assert!(result.is_empty());
        assert_eq!(result.summary(), "no issues found");
    }

    #[test]
    fn test_parse_error_is_located() {
        let result = check_tex("a+b\n+x^2^3", &TexInput::default());
        assert!(result.has_errors());
        let diag = &result.diagnostics[0];
        assert_eq!(diag.code, Some("DoubleExponent"));
        assert_eq!(diag.line, Some(2));
    }

    #[test]
    fn test_infix_and_font_warnings() {
        let result = check_tex(r"{\rm a \over b}", &TexInput::default());
        assert!(!result.has_errors());
        assert_eq!(result.warnings, 2);
        let text = format_diagnostics(&result, r"{\rm a \over b}", false);
        assert!(text.contains("\\frac{a}{b}"));
        assert!(text.contains("\\mathrm{...}"));
        assert!(text.ends_with("Summary: 2 warnings"));
    }

    #[test]
    fn test_longer_words_are_not_switches() {
        let result = check_tex(r"\right( \itemize", &TexInput::default());
        assert_eq!(result.warnings, 0);
    }

    #[test]
    fn test_offset_to_location() {
        let input = "ab\ncd";
        let offsets = compute_line_offsets(input);
        assert_eq!(offset_to_location(input, 0, &offsets), (1, 1));
        assert_eq!(offset_to_location(input, 4, &offsets), (2, 2));
    }
}
