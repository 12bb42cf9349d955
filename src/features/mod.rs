//! Packages
//!
//! A package is a [`Configuration`]: symbol maps for each handler kind,
//! optional pattern and fallback overrides, the packages it requires, and
//! hooks run while a session is assembled. Sessions name their packages;
//! [`resolve_packages`] orders them (requirements first) and
//! [`build_registry`] merges their maps into one [`Registry`].
//!
//! Built-in packages:
//! - `base`: characters, delimiters, core commands and environments
//! - `ams`: AMS fractions, operators, numbering and display environments
//! - `newcommand`: definitions made inside a formula
//! - `configmacros`: macros and environments from the options
//! - `braket`, `physics`, `cancel`, `color`, `boldsymbol`, `html`
//! - `noundefined`, `noerrors`: behaviour for undefined names and errors

pub mod ams;
pub mod base;
pub mod boldsymbol;
pub mod braket;
pub mod cancel;
pub mod color;
pub mod configmacros;
pub mod html;
pub mod newcommand;
pub mod noerrors;
pub mod noundefined;
pub mod physics;

use std::sync::Arc;

use fxhash::{FxHashMap, FxHashSet};
use lazy_static::lazy_static;
use log::debug;

use crate::core::options::ParserOptions;
use crate::core::registry::{Fallbacks, HandlerKind, Registry};
use crate::core::symbols::{PatternSymbol, SymbolMap};
use crate::utils::error::ConfigError;

/// Adjusts option defaults before the session is built
pub type InitHook = fn(&mut ParserOptions);

/// Builds maps that depend on the options
pub type SetupHook = fn(&ParserOptions) -> Result<Vec<(HandlerKind, SymbolMap)>, ConfigError>;

/// Packages used when a session names none
pub const DEFAULT_PACKAGES: &[&str] = &["base", "ams", "newcommand"];

/// Every built-in package by name
pub const PACKAGES: &[(&str, fn() -> Configuration)] = &[
    ("base", base::configuration),
    ("ams", ams::configuration),
    ("newcommand", newcommand::configuration),
    ("configmacros", configmacros::configuration),
    ("braket", braket::configuration),
    ("physics", physics::configuration),
    ("cancel", cancel::configuration),
    ("color", color::configuration),
    ("boldsymbol", boldsymbol::configuration),
    ("html", html::configuration),
    ("noundefined", noundefined::configuration),
    ("noerrors", noerrors::configuration),
];

lazy_static! {
    static ref CONFIGURATIONS: FxHashMap<&'static str, Arc<Configuration>> = PACKAGES
        .iter()
        .map(|(name, build)| (*name, Arc::new(build())))
        .collect();
}

/// A package definition
#[derive(Debug, Clone)]
pub struct Configuration {
    pub name: &'static str,
    /// Maps in priority order within their kind
    pub maps: Vec<(HandlerKind, Arc<SymbolMap>)>,
    pub patterns: Vec<PatternSymbol>,
    pub fallbacks: Fallbacks,
    pub requires: &'static [&'static str],
    pub init: Option<InitHook>,
    pub setup: Option<SetupHook>,
    /// Higher priorities are merged later and win lookups
    pub priority: i32,
}

impl Configuration {
    pub fn new(name: &'static str) -> Self {
        Configuration {
            name,
            maps: Vec::new(),
            patterns: Vec::new(),
            fallbacks: Fallbacks::default(),
            requires: &[],
            init: None,
            setup: None,
            priority: 0,
        }
    }

    pub fn map(mut self, kind: HandlerKind, map: SymbolMap) -> Self {
        self.maps.push((kind, Arc::new(map)));
        self
    }

    pub fn pattern(mut self, pattern: PatternSymbol) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn requires(mut self, requires: &'static [&'static str]) -> Self {
        self.requires = requires;
        self
    }

    pub fn init(mut self, hook: InitHook) -> Self {
        self.init = Some(hook);
        self
    }

    pub fn setup(mut self, hook: SetupHook) -> Self {
        self.setup = Some(hook);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The registry holding this package's static maps
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for (kind, map) in &self.maps {
            registry.add_map(*kind, Arc::clone(map));
        }
        for pattern in &self.patterns {
            registry.set_pattern(pattern.clone());
        }
        registry.set_fallbacks(self.fallbacks);
        registry
    }
}

/// A built-in package by name
pub fn configuration(name: &str) -> Option<Arc<Configuration>> {
    CONFIGURATIONS.get(name).cloned()
}

/// Resolve built-in packages by name, requirements first
pub fn resolve_packages(names: &[&str]) -> Result<Vec<Arc<Configuration>>, ConfigError> {
    resolve_with(names, configuration)
}

/// Resolve packages through `lookup`. Each package appears once, after
/// everything it requires; packages of equal priority keep that order.
pub fn resolve_with<F>(names: &[&str], lookup: F) -> Result<Vec<Arc<Configuration>>, ConfigError>
where
    F: Fn(&str) -> Option<Arc<Configuration>>,
{
    let mut resolved = Vec::new();
    let mut done = FxHashSet::default();
    let mut path = Vec::new();
    for name in names {
        visit(name, &lookup, &mut path, &mut done, &mut resolved)?;
    }
    resolved.sort_by_key(|config: &Arc<Configuration>| config.priority);
    Ok(resolved)
}

fn visit<F>(
    name: &str,
    lookup: &F,
    path: &mut Vec<String>,
    done: &mut FxHashSet<String>,
    resolved: &mut Vec<Arc<Configuration>>,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<Arc<Configuration>>,
{
    if done.contains(name) {
        return Ok(());
    }
    if path.iter().any(|p| p == name) {
        let mut cycle = path.clone();
        cycle.push(name.to_string());
        return Err(ConfigError::CircularDependency(cycle.join(" -> ")));
    }
    let config = lookup(name).ok_or_else(|| ConfigError::UnknownPackage(name.to_string()))?;
    path.push(name.to_string());
    for required in config.requires {
        visit(required, lookup, path, done, resolved)?;
    }
    path.pop();
    done.insert(name.to_string());
    resolved.push(config);
    Ok(())
}

/// Merge the maps of resolved packages; later packages win lookups.
/// Setup hooks add their option-dependent maps here.
pub fn build_registry(configs: &[Arc<Configuration>], options: &ParserOptions) -> Result<Registry, ConfigError> {
    let mut registries = Vec::with_capacity(configs.len());
    for config in configs {
        let mut registry = config.registry();
        if let Some(setup) = config.setup {
            for (kind, map) in setup(options)? {
                registry.add_map(kind, Arc::new(map));
            }
        }
        registries.push(registry);
    }
    let refs: Vec<&Registry> = registries.iter().collect();
    let merged = Registry::merge(&refs);
    debug!(
        "registry built from [{}]: {} symbols",
        configs.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
        merged.symbol_count()
    );
    Ok(merged)
}

lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<Registry> = {
        let registries: Vec<Registry> = DEFAULT_PACKAGES
            .iter()
            .filter_map(|name| configuration(name))
            .map(|config| config.registry())
            .collect();
        let refs: Vec<&Registry> = registries.iter().collect();
        Arc::new(Registry::merge(&refs))
    };
}

/// Registry of the default packages, built once per process
pub fn default_registry() -> Arc<Registry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &'static str, requires: &'static [&'static str]) -> Arc<Configuration> {
        Arc::new(Configuration::new(name).requires(requires))
    }

    fn names(configs: &[Arc<Configuration>]) -> Vec<&'static str> {
        configs.iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_requirements_come_first() {
        let lookup = |name: &str| match name {
            "a" => Some(package("a", &["b"])),
            "b" => Some(package("b", &["c"])),
            "c" => Some(package("c", &[])),
            _ => None,
        };
        let resolved = resolve_with(&["a", "c"], lookup).unwrap();
        assert_eq!(names(&resolved), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_unknown_package() {
        let err = resolve_with(&["missing"], |_| None).unwrap_err();
        assert_eq!(err, ConfigError::UnknownPackage("missing".to_string()));
    }

    #[test]
    fn test_circular_dependency() {
        let lookup = |name: &str| match name {
            "a" => Some(package("a", &["b"])),
            "b" => Some(package("b", &["a"])),
            _ => None,
        };
        let err = resolve_with(&["a"], lookup).unwrap_err();
        assert_eq!(err, ConfigError::CircularDependency("a -> b -> a".to_string()));
    }

    #[test]
    fn test_priority_orders_merge() {
        let lookup = |name: &str| match name {
            "late" => Some(Arc::new(Configuration::new("late").priority(10))),
            "early" => Some(Arc::new(Configuration::new("early"))),
            _ => None,
        };
        let resolved = resolve_with(&["late", "early"], lookup).unwrap();
        assert_eq!(names(&resolved), vec!["early", "late"]);
    }

    #[test]
    fn test_builtin_table() {
        for (name, _) in PACKAGES {
            let config = configuration(name).unwrap();
            assert_eq!(config.name, *name);
            for required in config.requires {
                assert!(configuration(required).is_some(), "{} requires {}", name, required);
            }
        }
        let resolved = resolve_packages(&["physics"]).unwrap();
        assert_eq!(resolved.first().map(|c| c.name), Some("base"));
    }

    #[test]
    fn test_default_registry_knows_basics() {
        let registry = default_registry();
        assert!(registry.lookup_macro("frac").is_some());
        assert!(registry.lookup_macro("dfrac").is_some());
        assert!(registry.lookup_environment("align").is_some());
        assert!(registry.lookup_character('^').is_some());
    }
}
