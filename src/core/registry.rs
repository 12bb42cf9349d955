//! Symbol registry
//!
//! The registry groups symbol maps by handler kind. Within a kind, maps form
//! a priority list: the first map that knows a name wins. Pattern symbols
//! are consulted only when exact-name lookup fails.

use std::sync::Arc;

use super::symbols::{
    CharClass, CharacterHandler, FallbackHandler, PatternSymbol, Symbol, SymbolMap,
};

/// The kinds of lookup the parser performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Single characters (`{`, `^`, `-` ...)
    Character,
    /// Delimiters after `\left`, `\right`, `\big` ...
    Delimiter,
    /// Control sequences
    Macro,
    /// Environment names
    Environment,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 4] = [
        HandlerKind::Character,
        HandlerKind::Delimiter,
        HandlerKind::Macro,
        HandlerKind::Environment,
    ];

    fn index(self) -> usize {
        match self {
            HandlerKind::Character => 0,
            HandlerKind::Delimiter => 1,
            HandlerKind::Macro => 2,
            HandlerKind::Environment => 3,
        }
    }
}

/// Handlers for names no map knows about. `None` means the core raises
/// `UndefinedControlSequence` / `UnknownEnv`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallbacks {
    pub macro_: Option<FallbackHandler>,
    pub environment: Option<FallbackHandler>,
}

/// A symbol together with the map it was found in
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub map: &'a SymbolMap,
    pub symbol: &'a Symbol,
}

impl<'a> Resolved<'a> {
    pub fn character_handler(&self) -> Option<CharacterHandler> {
        self.map.character_handler()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    maps: [Vec<Arc<SymbolMap>>; 4],
    patterns: Vec<PatternSymbol>,
    fallbacks: Fallbacks,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a map at the lowest priority of its kind. A map whose name is
    /// already present is ignored.
    pub fn add_map(&mut self, kind: HandlerKind, map: Arc<SymbolMap>) {
        let list = &mut self.maps[kind.index()];
        if list.iter().any(|m| m.name() == map.name()) {
            return;
        }
        list.push(map);
    }

    /// Install a pattern symbol, replacing any pattern of the same class
    pub fn set_pattern(&mut self, pattern: PatternSymbol) {
        self.patterns.retain(|p| p.class != pattern.class);
        self.patterns.push(pattern);
        self.patterns.sort_by_key(|p| p.class);
    }

    pub fn set_fallbacks(&mut self, fallbacks: Fallbacks) {
        if fallbacks.macro_.is_some() {
            self.fallbacks.macro_ = fallbacks.macro_;
        }
        if fallbacks.environment.is_some() {
            self.fallbacks.environment = fallbacks.environment;
        }
    }

    pub fn fallbacks(&self) -> Fallbacks {
        self.fallbacks
    }

    pub fn maps(&self, kind: HandlerKind) -> &[Arc<SymbolMap>] {
        &self.maps[kind.index()]
    }

    pub fn patterns(&self) -> &[PatternSymbol] {
        &self.patterns
    }

    /// Exact-name lookup through the priority list of `kind`
    pub fn resolve(&self, kind: HandlerKind, name: &str) -> Option<Resolved<'_>> {
        self.maps[kind.index()].iter().find_map(|map| {
            map.get(name).map(|symbol| Resolved {
                map: map.as_ref(),
                symbol,
            })
        })
    }

    pub fn lookup(&self, kind: HandlerKind, name: &str) -> Option<&Symbol> {
        self.resolve(kind, name).map(|r| r.symbol)
    }

    pub fn lookup_macro(&self, name: &str) -> Option<&Symbol> {
        self.lookup(HandlerKind::Macro, name)
    }

    pub fn lookup_character(&self, c: char) -> Option<&Symbol> {
        let mut buf = [0u8; 4];
        self.lookup(HandlerKind::Character, c.encode_utf8(&mut buf))
    }

    pub fn lookup_delimiter(&self, name: &str) -> Option<&Symbol> {
        self.lookup(HandlerKind::Delimiter, name)
    }

    pub fn lookup_environment(&self, name: &str) -> Option<&Symbol> {
        self.lookup(HandlerKind::Environment, name)
    }

    /// First pattern symbol, in class priority order, matching `c`
    pub fn lookup_by_class(&self, c: char) -> Option<&PatternSymbol> {
        self.patterns.iter().find(|p| p.class.matches(c))
    }

    pub fn pattern(&self, class: CharClass) -> Option<&PatternSymbol> {
        self.patterns.iter().find(|p| p.class == class)
    }

    /// Merge registries; maps of later registries take priority. A map that
    /// is already present (same name) is not duplicated, so merging a
    /// registry with itself answers every lookup like the original.
    pub fn merge(registries: &[&Registry]) -> Registry {
        let mut merged = Registry::new();
        for kind in HandlerKind::ALL {
            for registry in registries.iter().rev() {
                for map in registry.maps(kind) {
                    merged.add_map(kind, Arc::clone(map));
                }
            }
        }
        for registry in registries {
            for pattern in &registry.patterns {
                merged.set_pattern(pattern.clone());
            }
            merged.set_fallbacks(registry.fallbacks);
        }
        merged
    }

    /// Total number of symbols across all maps
    pub fn symbol_count(&self) -> usize {
        self.maps.iter().flatten().map(|m| m.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::TexParser;
    use crate::utils::error::ParseResult;

    fn noop(_: &mut TexParser<'_>, _: char) -> ParseResult<()> {
        Ok(())
    }

    fn registry_with(name: &'static str, entries: &[(&str, &'static str)]) -> Registry {
        let mut map = SymbolMap::new(name);
        for (key, template) in entries {
            map = map.macro_(key, *template, 0);
        }
        let mut registry = Registry::new();
        registry.add_map(HandlerKind::Macro, Arc::new(map));
        registry
    }

    fn template_of(registry: &Registry, name: &str) -> Option<String> {
        match registry.lookup_macro(name) {
            Some(Symbol::Macro(m)) => Some(m.template.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_priority_list_first_wins() {
        let low = registry_with("low", &[("x", "low"), ("y", "only-low")]);
        let high = registry_with("high", &[("x", "high")]);
        let merged = Registry::merge(&[&low, &high]);
        assert_eq!(template_of(&merged, "x").as_deref(), Some("high"));
        assert_eq!(template_of(&merged, "y").as_deref(), Some("only-low"));
        assert_eq!(template_of(&merged, "z"), None);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let registry = registry_with("base", &[("a", "1"), ("b", "2")]);
        let merged = Registry::merge(&[&registry, &registry]);
        assert_eq!(merged.maps(HandlerKind::Macro).len(), 1);
        for name in ["a", "b", "c"] {
            assert_eq!(template_of(&merged, name), template_of(&registry, name));
        }
    }

    #[test]
    fn test_pattern_priority() {
        let mut registry = Registry::new();
        registry.set_pattern(PatternSymbol {
            name: "other",
            class: CharClass::Other,
            handler: noop,
        });
        registry.set_pattern(PatternSymbol {
            name: "letter",
            class: CharClass::Letter,
            handler: noop,
        });
        assert_eq!(registry.lookup_by_class('a').map(|p| p.name), Some("letter"));
        assert_eq!(registry.lookup_by_class('+').map(|p| p.name), Some("other"));
        assert_eq!(registry.lookup_by_class('1').map(|p| p.name), Some("other"));
    }

    #[test]
    fn test_later_pattern_replaces_same_class() {
        let mut first = Registry::new();
        first.set_pattern(PatternSymbol {
            name: "letter",
            class: CharClass::Letter,
            handler: noop,
        });
        let mut second = Registry::new();
        second.set_pattern(PatternSymbol {
            name: "letter2",
            class: CharClass::Letter,
            handler: noop,
        });
        let merged = Registry::merge(&[&first, &second]);
        assert_eq!(merged.patterns().len(), 1);
        assert_eq!(merged.lookup_by_class('q').map(|p| p.name), Some("letter2"));
    }
}
