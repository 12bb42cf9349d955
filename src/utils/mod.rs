//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Diagnostics and error reporting

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{check_tex, format_diagnostics, CheckResult, Diagnostic, DiagnosticLevel};
pub use error::{ConfigError, ErrorKind, ParseResult, TexError};
