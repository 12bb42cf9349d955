//! The `configmacros` package: macros and environments given in
//! [`ParserOptions::macros`] and [`ParserOptions::environments`].
//!
//! The maps are built when the session is assembled, so every parse of the
//! session sees the same definitions. The package merges after the others
//! and its definitions win over package symbols of the same name.

use crate::core::options::ParserOptions;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{MacroSymbol, Symbol, SymbolMap};
use crate::utils::error::ConfigError;

use super::newcommand::defined_environment;
use super::Configuration;

/// Most parameters a definition can take
const MAX_PARAMETERS: usize = 9;

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidDefinition {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn setup(options: &ParserOptions) -> Result<Vec<(HandlerKind, SymbolMap)>, ConfigError> {
    let mut macros = SymbolMap::new("configmacros-macros");
    for (name, definition) in &options.macros {
        let cs = name.strip_prefix('\\').unwrap_or(name);
        if cs.is_empty() {
            return Err(invalid(name, "empty macro name"));
        }
        if definition.args > MAX_PARAMETERS {
            return Err(invalid(name, format!("{} parameters (at most 9)", definition.args)));
        }
        let mut symbol = MacroSymbol::new(definition.template.clone(), definition.args);
        symbol.default = definition
            .default
            .clone()
            .filter(|_| definition.args > 0)
            .map(Into::into);
        macros.insert(cs, Symbol::Macro(symbol));
    }

    let mut environments = SymbolMap::new("configmacros-environments");
    for (name, definition) in &options.environments {
        if name.is_empty() || name.contains('\\') {
            return Err(invalid(name, "invalid environment name"));
        }
        if definition.args > MAX_PARAMETERS {
            return Err(invalid(name, format!("{} parameters (at most 9)", definition.args)));
        }
        let symbol = defined_environment(
            definition.begin.clone(),
            definition.end.clone(),
            definition.args,
            definition.default.clone(),
        );
        environments.insert(name, symbol);
    }
    Ok(vec![
        (HandlerKind::Macro, macros),
        (HandlerKind::Environment, environments),
    ])
}

pub fn configuration() -> Configuration {
    Configuration::new("configmacros")
        .requires(&["base", "newcommand"])
        .setup(setup)
        .priority(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_builds_maps() {
        let options = ParserOptions::new()
            .with_macro("RR", "\\mathbb{R}", 0)
            .with_macro("\\half", "\\frac{#1}{2}", 1)
            .with_environment("pbox", "\\left(", "\\right)", 0);
        let maps = setup(&options).unwrap();
        let (kind, macros) = &maps[0];
        assert_eq!(*kind, HandlerKind::Macro);
        assert!(macros.contains("RR"));
        assert!(macros.contains("half"));
        assert!(maps[1].1.contains("pbox"));
    }

    #[test]
    fn test_too_many_parameters() {
        let options = ParserOptions::new().with_macro("bad", "#1", 12);
        let err = setup(&options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefinition { ref name, .. } if name == "bad"));
    }
}
