//! Symbol definitions and symbol maps
//!
//! A [`SymbolMap`] is a named table of [`Symbol`]s. Packages build maps once
//! at configuration time; the parser only reads them.

use std::borrow::Cow;

use fxhash::FxHashMap;

use super::parser::TexParser;
use super::tree::TexClass;
use crate::utils::error::ParseResult;

/// Handler for control sequences and special characters.
/// Receives the name as written (`\frac`, `^`) and the bound arguments.
pub type CommandHandler = fn(&mut TexParser<'_>, &str, &[HandlerArg]) -> ParseResult<()>;

/// Handler run after `\begin{name}` has pushed its frame
pub type EnvironmentHandler = fn(&mut TexParser<'_>, &str, &[HandlerArg]) -> ParseResult<()>;

/// Renders a [`CharacterSymbol`] found in a map
pub type CharacterHandler = fn(&mut TexParser<'_>, &str, &CharacterSymbol) -> ParseResult<()>;

/// Handler for a character class
pub type PatternHandler = fn(&mut TexParser<'_>, char) -> ParseResult<()>;

/// Handler for names no map knows about
pub type FallbackHandler = fn(&mut TexParser<'_>, &str) -> ParseResult<()>;

/// Argument bound to a handler at registration time
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerArg {
    Str(&'static str),
    /// Text supplied at configuration time
    Text(String),
    Num(f32),
    Int(i64),
    Bool(bool),
    Class(TexClass),
}

impl HandlerArg {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            HandlerArg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Either kind of string argument
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HandlerArg::Str(s) => Some(s),
            HandlerArg::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f32> {
        match self {
            HandlerArg::Num(n) => Some(*n),
            HandlerArg::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HandlerArg::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HandlerArg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<TexClass> {
        match self {
            HandlerArg::Class(c) => Some(*c),
            _ => None,
        }
    }
}

/// Literal output text with default attributes
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSymbol {
    pub text: Cow<'static, str>,
    pub attributes: Vec<(&'static str, &'static str)>,
    pub class: Option<TexClass>,
}

/// Replacement-text macro
#[derive(Debug, Clone, PartialEq)]
pub struct MacroSymbol {
    pub template: Cow<'static, str>,
    pub args: usize,
    /// Default value of an optional first argument
    pub default: Option<Cow<'static, str>>,
    /// Delimiter texts of a `\def` parameter template: the text required
    /// before the first parameter, then the text ending each parameter
    /// (empty for undelimited parameters).
    pub delimiters: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct CommandSymbol {
    pub handler: CommandHandler,
    pub args: Vec<HandlerArg>,
}

#[derive(Debug, Clone)]
pub struct EnvironmentSymbol {
    pub handler: EnvironmentHandler,
    pub args: Vec<HandlerArg>,
}

/// One entry of a symbol map
#[derive(Debug, Clone)]
pub enum Symbol {
    Character(CharacterSymbol),
    Macro(MacroSymbol),
    Command(CommandSymbol),
    Environment(EnvironmentSymbol),
}

/// Character classes matched by pattern symbols, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharClass {
    ControlSequence,
    Letter,
    Digit,
    Other,
}

impl CharClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::ControlSequence => c == '\\',
            CharClass::Letter => c.is_ascii_alphabetic(),
            CharClass::Digit => c.is_ascii_digit() || c == '.',
            CharClass::Other => true,
        }
    }
}

/// A character-class test bound to a handler
#[derive(Debug, Clone)]
pub struct PatternSymbol {
    pub name: &'static str,
    pub class: CharClass,
    pub handler: PatternHandler,
}

/// Named table of symbols
#[derive(Debug, Clone)]
pub struct SymbolMap {
    name: &'static str,
    entries: FxHashMap<String, Symbol>,
    character_handler: Option<CharacterHandler>,
}

impl SymbolMap {
    pub fn new(name: &'static str) -> Self {
        SymbolMap {
            name,
            entries: FxHashMap::default(),
            character_handler: None,
        }
    }

    /// A map of character symbols rendered by `handler`
    pub fn characters(
        name: &'static str,
        handler: CharacterHandler,
        table: &phf::Map<&'static str, &'static str>,
    ) -> Self {
        let mut map = SymbolMap::new(name).with_character_handler(handler);
        for (key, text) in table.entries() {
            map.insert(key, Symbol::Character(CharacterSymbol::plain(*text)));
        }
        map
    }

    pub fn with_character_handler(mut self, handler: CharacterHandler) -> Self {
        self.character_handler = Some(handler);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn character_handler(&self) -> Option<CharacterHandler> {
        self.character_handler
    }

    pub fn insert(&mut self, name: &str, symbol: Symbol) {
        self.entries.insert(name.to_string(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // Builder helpers

    pub fn character(
        mut self,
        name: &str,
        text: &'static str,
        attributes: &[(&'static str, &'static str)],
        class: Option<TexClass>,
    ) -> Self {
        self.insert(
            name,
            Symbol::Character(CharacterSymbol {
                text: Cow::Borrowed(text),
                attributes: attributes.to_vec(),
                class,
            }),
        );
        self
    }

    pub fn macro_(mut self, name: &str, template: &'static str, args: usize) -> Self {
        self.insert(name, Symbol::Macro(MacroSymbol::new(template, args)));
        self
    }

    pub fn macro_with_default(
        mut self,
        name: &str,
        template: &'static str,
        args: usize,
        default: &'static str,
    ) -> Self {
        let mut symbol = MacroSymbol::new(template, args);
        symbol.default = Some(Cow::Borrowed(default));
        self.insert(name, Symbol::Macro(symbol));
        self
    }

    pub fn command(mut self, name: &str, handler: CommandHandler, args: &[HandlerArg]) -> Self {
        self.insert(
            name,
            Symbol::Command(CommandSymbol {
                handler,
                args: args.to_vec(),
            }),
        );
        self
    }

    pub fn environment(
        mut self,
        name: &str,
        handler: EnvironmentHandler,
        args: &[HandlerArg],
    ) -> Self {
        self.insert(
            name,
            Symbol::Environment(EnvironmentSymbol {
                handler,
                args: args.to_vec(),
            }),
        );
        self
    }
}

impl CharacterSymbol {
    pub fn plain(text: &'static str) -> Self {
        CharacterSymbol {
            text: Cow::Borrowed(text),
            attributes: Vec::new(),
            class: None,
        }
    }
}

impl MacroSymbol {
    pub fn new(template: impl Into<Cow<'static, str>>, args: usize) -> Self {
        MacroSymbol {
            template: template.into(),
            args,
            default: None,
            delimiters: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class_priority_order() {
        let mut classes = vec![CharClass::Other, CharClass::Digit, CharClass::ControlSequence];
        classes.sort();
        assert_eq!(
            classes,
            vec![CharClass::ControlSequence, CharClass::Digit, CharClass::Other]
        );
    }

    #[test]
    fn test_char_class_matching() {
        assert!(CharClass::Letter.matches('q'));
        assert!(!CharClass::Letter.matches('1'));
        assert!(CharClass::Digit.matches('.'));
        assert!(CharClass::ControlSequence.matches('\\'));
        assert!(CharClass::Other.matches('+'));
    }

    #[test]
    fn test_builder_entries() {
        let map = SymbolMap::new("test")
            .macro_("bra", "{\\langle {#1} \\vert}", 1)
            .character("alpha", "\u{03B1}", &[], None);
        assert_eq!(map.len(), 2);
        match map.get("bra") {
            Some(Symbol::Macro(m)) => assert_eq!(m.args, 1),
            other => panic!("unexpected symbol {:?}", other),
        }
        assert!(map.contains("alpha"));
        assert!(!map.contains("beta"));
    }
}
