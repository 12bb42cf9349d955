//! TeX parser
//!
//! A [`TexParser`] reads one piece of TeX text. Every character is
//! dispatched through the symbol registry; the handlers it reaches create
//! nodes and push items on the parser's [`Stack`]. Arguments are parsed by
//! nested parsers that share the [`ParseContext`] (node factory, macro
//! counters, local definitions and numbering state) with their parent.

use std::rc::Rc;
use std::sync::Arc;

use fxhash::FxHashMap;
use log::trace;

use super::buffer::TextBuffer;
use super::expand;
use super::factory::NodeFactory;
use super::handlers::text::internal_math;
use super::items::{Env, ItemKind, StackItem};
use super::options::ParserOptions;
use super::registry::{HandlerKind, Registry};
use super::stack::Stack;
use super::symbols::{CharClass, CharacterHandler, Symbol};
use super::tags::TagState;
use super::tree::{NodeId, NodeKind};
use crate::data::constants::match_dimen;
use crate::utils::error::{ErrorKind, ParseResult, TexError};

/// Deepest allowed nesting of stack frames, counted across a parser and
/// all of its enclosing parsers
pub(crate) const MAX_NESTING: usize = 256;

/// A definition made while parsing (`\def`, `\newcommand`, `\let`)
#[derive(Debug, Clone)]
pub struct LocalEntry {
    pub symbol: Symbol,
    /// Handler of the map a `\let` copy was taken from
    pub handler: Option<CharacterHandler>,
}

/// State shared by a parser and all of its nested parsers
#[derive(Debug)]
pub struct ParseContext {
    pub(crate) factory: NodeFactory,
    pub(crate) registry: Arc<Registry>,
    pub(crate) options: Arc<ParserOptions>,
    pub(crate) macro_count: usize,
    pub(crate) depth: usize,
    /// Frames held by the stacks of enclosing parsers
    pub(crate) outer_frames: usize,
    pub(crate) macros: FxHashMap<String, LocalEntry>,
    pub(crate) environments: FxHashMap<String, Symbol>,
    /// End texts of open user-defined environments
    pub(crate) env_ends: Vec<(String, String)>,
    /// User-defined environment whose end text is being read
    pub(crate) closing: Option<String>,
    pub(crate) tags: TagState,
    pub(crate) colors: FxHashMap<String, String>,
}

impl ParseContext {
    pub fn new(registry: Arc<Registry>, options: Arc<ParserOptions>) -> Self {
        let tags = TagState::new(options.tags);
        ParseContext {
            factory: NodeFactory::new(),
            registry,
            options,
            macro_count: 0,
            depth: 0,
            outer_frames: 0,
            macros: FxHashMap::default(),
            environments: FxHashMap::default(),
            env_ends: Vec::new(),
            closing: None,
            tags,
            colors: FxHashMap::default(),
        }
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn tags(&self) -> &TagState {
        &self.tags
    }

    /// Count one substitution against `max_macros`
    pub(crate) fn count_substitution(&mut self, kind: ErrorKind) -> ParseResult<()> {
        self.macro_count += 1;
        if self.macro_count > self.options.max_macros {
            return Err(TexError::simple(kind));
        }
        Ok(())
    }

    /// Define or redefine a control sequence (name without backslash)
    pub fn define_macro(&mut self, name: &str, symbol: Symbol, handler: Option<CharacterHandler>) {
        trace!("define \\{}", name);
        self.macros
            .insert(name.to_string(), LocalEntry { symbol, handler });
    }

    pub fn define_environment(&mut self, name: &str, symbol: Symbol) {
        trace!("define environment {}", name);
        self.environments.insert(name.to_string(), symbol);
    }

    pub(crate) fn into_parts(self) -> (NodeFactory, TagState) {
        (self.factory, self.tags)
    }
}

pub struct TexParser<'a> {
    pub(crate) ctx: &'a mut ParseContext,
    pub(crate) buffer: TextBuffer,
    pub(crate) stack: Stack,
    nested: bool,
    tracking: bool,
    pushed: Vec<NodeId>,
}

impl<'a> TexParser<'a> {
    pub fn new(text: &str, env: Rc<Env>, ctx: &'a mut ParseContext, nested: bool) -> Self {
        let buffer = TextBuffer::new(text, ctx.options.max_buffer);
        TexParser {
            ctx,
            buffer,
            stack: Stack::new(env),
            nested,
            tracking: false,
            pushed: Vec::new(),
        }
    }

    /// Parse the whole text and return its root node
    pub fn parse(mut self) -> ParseResult<NodeId> {
        match self.run() {
            Ok(root) => Ok(root),
            Err(err) if self.nested => Err(err),
            Err(err) => Err(err.at(self.buffer.position())),
        }
    }

    fn run(&mut self) -> ParseResult<NodeId> {
        loop {
            let origin = (!self.buffer.in_expansion()).then(|| self.buffer.position());
            let Some(c) = self.buffer.next_char() else {
                break;
            };
            self.dispatch(c, origin)?;
        }
        let stop = self.item(ItemKind::Stop);
        self.push(stop)?;
        self.stack
            .result()
            .ok_or_else(|| TexError::simple(ErrorKind::ExtraOpenMissingClose))
    }

    fn dispatch(&mut self, c: char, origin: Option<usize>) -> ParseResult<()> {
        if c.is_whitespace() {
            return Ok(());
        }
        if c == '%' {
            self.skip_comment();
            return Ok(());
        }
        let registry = Arc::clone(&self.ctx.registry);
        let mut buf = [0u8; 4];
        let key: &str = c.encode_utf8(&mut buf);
        let special = match c {
            '\\' => None,
            _ => registry.resolve(HandlerKind::Character, key),
        };

        let start = origin.filter(|_| !self.nested && special.is_none() && self.ctx.options.data_latex);
        let mark = self.ctx.factory.len();
        self.tracking = start.is_some();

        if c == '\\' {
            match registry.pattern(CharClass::ControlSequence) {
                Some(pattern) => (pattern.handler)(self, c)?,
                None => return Err(TexError::new(ErrorKind::Misplaced, ["\\"])),
            }
        } else if let Some(resolved) = special {
            self.apply(key, resolved.symbol, resolved.character_handler())?;
        } else if let Some(pattern) = registry.lookup_by_class(c) {
            (pattern.handler)(self, c)?;
        } else {
            return Err(TexError::new(ErrorKind::Misplaced, [key]));
        }

        self.tracking = false;
        let pushed = std::mem::take(&mut self.pushed);
        if let Some(start) = start {
            self.mark_source(start, mark, &pushed);
        }
        Ok(())
    }

    /// Attach the source text of the last dispatch to the nodes it created
    fn mark_source(&mut self, start: usize, mark: usize, pushed: &[NodeId]) {
        let end = self.buffer.position();
        let Some(latex) = self.buffer.source().get(start..end).map(str::trim) else {
            return;
        };
        if latex.is_empty() {
            return;
        }
        let tree = self.ctx.factory.tree_mut();
        for &node in pushed {
            if node.index() >= mark && tree.attribute(node, "data-latex").is_none() {
                tree.set_attribute(node, "data-latex", latex);
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.buffer.next_char() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Run a symbol found in a map
    pub(crate) fn apply(
        &mut self,
        name: &str,
        symbol: &Symbol,
        handler: Option<CharacterHandler>,
    ) -> ParseResult<()> {
        match symbol {
            Symbol::Character(character) => match handler {
                Some(handler) => handler(self, name, character),
                None => Err(TexError::new(ErrorKind::Misplaced, [name])),
            },
            Symbol::Macro(definition) => expand::expand_macro(self, name, definition),
            Symbol::Command(command) => (command.handler)(self, name, &command.args),
            Symbol::Environment(environment) => (environment.handler)(self, name, &environment.args),
        }
    }

    /// Look up and run a control sequence (name without backslash).
    /// Definitions made during the parse shadow package symbols.
    pub fn run_control_sequence(&mut self, cs: &str) -> ParseResult<()> {
        let name = format!("\\{}", cs);
        trace!("control sequence {}", name);
        if let Some(entry) = self.ctx.macros.get(cs).cloned() {
            return self.apply(&name, &entry.symbol, entry.handler);
        }
        let registry = Arc::clone(&self.ctx.registry);
        if let Some(resolved) = registry.resolve(HandlerKind::Macro, cs) {
            return self.apply(&name, resolved.symbol, resolved.character_handler());
        }
        if let Some(fallback) = registry.fallbacks().macro_ {
            return fallback(self, &name);
        }
        Err(TexError::new(ErrorKind::UndefinedControlSequence, [name]))
    }

    /// Look up and run the handler of environment `env`
    pub fn run_environment(&mut self, env: &str) -> ParseResult<()> {
        trace!("environment {}", env);
        if let Some(symbol) = self.ctx.environments.get(env).cloned() {
            return self.apply(env, &symbol, None);
        }
        let registry = Arc::clone(&self.ctx.registry);
        if let Some(resolved) = registry.resolve(HandlerKind::Environment, env) {
            return self.apply(env, resolved.symbol, resolved.character_handler());
        }
        if let Some(fallback) = registry.fallbacks().environment {
            return fallback(self, env);
        }
        Err(TexError::new(ErrorKind::UnknownEnv, [env]))
    }

    // Accessors

    pub fn context(&mut self) -> &mut ParseContext {
        self.ctx
    }

    pub fn options(&self) -> &ParserOptions {
        &self.ctx.options
    }

    pub fn factory(&mut self) -> &mut NodeFactory {
        &mut self.ctx.factory
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    pub fn env(&self) -> Rc<Env> {
        self.stack.env()
    }

    /// Settings of the current frame, for modification
    pub fn env_mut(&mut self) -> Option<&mut Env> {
        self.stack.env_mut()
    }

    // Stack

    /// An item inheriting the current environment
    pub fn item(&self, kind: ItemKind) -> StackItem {
        StackItem::new(kind, self.stack.env())
    }

    pub fn push(&mut self, item: StackItem) -> ParseResult<()> {
        if self.tracking {
            if let ItemKind::Mml(node) = item.kind {
                self.pushed.push(node);
            }
        }
        self.stack.push(item, self.ctx)
    }

    pub fn push_node(&mut self, node: NodeId) -> ParseResult<()> {
        self.push(StackItem::mml(node))
    }

    /// Create a token element and push it
    pub fn push_token(&mut self, kind: NodeKind, attributes: &[(&str, &str)], text: &str) -> ParseResult<NodeId> {
        let node = self.ctx.factory.create_token(kind, attributes, text);
        self.push_node(node)?;
        Ok(node)
    }

    // Reading

    /// Read a control sequence name after its backslash. A control word
    /// swallows one following space.
    pub fn get_cs(&mut self) -> String {
        let mut name = String::new();
        match self.buffer.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                while let Some(c) = self.buffer.peek().filter(char::is_ascii_alphabetic) {
                    name.push(c);
                    self.buffer.next_char();
                }
                if self.buffer.peek() == Some(' ') {
                    self.buffer.next_char();
                }
            }
            Some(c) => {
                name.push(c);
                self.buffer.next_char();
            }
            None => {}
        }
        name
    }

    /// Whether the next unread character is `c` (spaces skipped)
    pub fn next_is(&mut self, c: char) -> bool {
        self.buffer.skip_whitespace();
        self.buffer.peek() == Some(c)
    }

    /// Consume `c` if it is the next character (spaces skipped)
    pub fn eat(&mut self, c: char) -> bool {
        if self.next_is(c) {
            self.buffer.next_char();
            return true;
        }
        false
    }

    /// Consume a literal `*` directly after a command name
    pub fn get_star(&mut self) -> bool {
        if self.buffer.peek() == Some('*') {
            self.buffer.next_char();
            return true;
        }
        false
    }

    /// Read one argument: a braced group (braces removed), a control
    /// sequence, or a single character
    pub fn get_argument(&mut self, name: &str) -> ParseResult<String> {
        self.buffer.skip_whitespace();
        match self.buffer.peek() {
            None => Err(TexError::new(ErrorKind::MissingArgFor, [name])),
            Some('}') => Err(TexError::simple(ErrorKind::ExtraCloseMissingOpen)),
            Some('\\') => {
                self.buffer.next_char();
                Ok(format!("\\{}", self.get_cs()))
            }
            Some('{') => {
                self.buffer.next_char();
                self.read_group()
            }
            Some(c) => {
                self.buffer.next_char();
                Ok(c.to_string())
            }
        }
    }

    /// Read up to the brace matching an already consumed `{`
    fn read_group(&mut self) -> ParseResult<String> {
        let mut depth = 1usize;
        let mut text = String::new();
        while let Some(c) = self.buffer.next_char() {
            match c {
                '\\' => {
                    text.push(c);
                    if let Some(next) = self.buffer.next_char() {
                        text.push(next);
                    }
                }
                '{' => {
                    depth += 1;
                    text.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                    text.push(c);
                }
                _ => text.push(c),
            }
        }
        Err(TexError::simple(ErrorKind::MissingCloseBrace))
    }

    /// Read an optional `[...]` argument
    pub fn get_bracket(&mut self, name: &str) -> ParseResult<Option<String>> {
        if !self.next_is('[') {
            return Ok(None);
        }
        self.buffer.next_char();
        let mut depth = 0usize;
        let mut text = String::new();
        while let Some(c) = self.buffer.next_char() {
            match c {
                '{' => {
                    depth += 1;
                    text.push(c);
                }
                '}' => {
                    if depth == 0 {
                        return Err(TexError::new(ErrorKind::ExtraCloseLooking, ["']'"]));
                    }
                    depth -= 1;
                    text.push(c);
                }
                '\\' => {
                    text.push(c);
                    if let Some(next) = self.buffer.next_char() {
                        text.push(next);
                    }
                }
                ']' if depth == 0 => return Ok(Some(text)),
                _ => text.push(c),
            }
        }
        Err(TexError::new(ErrorKind::MissingCloseBracket, [name]))
    }

    /// Read a delimiter and return its text. With `brace_ok` the delimiter
    /// may be given in braces.
    pub fn get_delimiter(&mut self, name: &str, brace_ok: bool) -> ParseResult<String> {
        self.buffer.skip_whitespace();
        let key = match self.buffer.next_char() {
            None => return Err(TexError::new(ErrorKind::MissingOrUnrecognizedDelim, [name])),
            Some('\\') => format!("\\{}", self.get_cs()),
            Some('{') if brace_ok => self.read_group()?.trim().to_string(),
            Some(c) => c.to_string(),
        };
        match self.ctx.registry.lookup_delimiter(&key) {
            Some(Symbol::Character(delim)) => Ok(delim.text.to_string()),
            _ => Err(TexError::new(ErrorKind::MissingOrUnrecognizedDelim, [name])),
        }
    }

    /// Read a dimension, braced or not, normalised (`mu` becomes em)
    pub fn get_dimen(&mut self, name: &str) -> ParseResult<String> {
        self.buffer.skip_whitespace();
        if self.buffer.peek() == Some('{') {
            let arg = self.get_argument(name)?;
            return match match_dimen(&arg) {
                Some((dimen, len)) if arg[len..].trim().is_empty() => Ok(dimen),
                _ => Err(TexError::new(ErrorKind::MissingDimOrUnits, [name])),
            };
        }
        match match_dimen(self.buffer.rest_of_chunk()) {
            Some((dimen, len)) => {
                self.buffer.advance(len);
                Ok(dimen)
            }
            None => Err(TexError::new(ErrorKind::MissingDimOrUnits, [name])),
        }
    }

    /// Read the text before `token` at brace level zero; the token is
    /// consumed
    pub fn get_up_to(&mut self, name: &str, token: &str) -> ParseResult<String> {
        self.buffer.skip_whitespace();
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            if depth == 0 && self.at_token(token) {
                self.buffer.eat(token);
                return Ok(text);
            }
            let Some(c) = self.buffer.next_char() else {
                break;
            };
            text.push(c);
            match c {
                '\\' => {
                    if self.buffer.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
                        while let Some(n) = self.buffer.peek().filter(char::is_ascii_alphabetic) {
                            text.push(n);
                            self.buffer.next_char();
                        }
                    } else if let Some(n) = self.buffer.next_char() {
                        text.push(n);
                    }
                }
                '{' => depth += 1,
                '}' => {
                    if depth == 0 {
                        return Err(TexError::new(ErrorKind::ExtraCloseLooking, [token]));
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(TexError::new(ErrorKind::TokenNotFoundForCommand, [token, name]))
    }

    /// Whether the input continues with `token` as a whole token
    pub(crate) fn at_token(&self, token: &str) -> bool {
        if !self.buffer.starts_with(token) {
            return false;
        }
        let word = token.starts_with('\\') && token.ends_with(|c: char| c.is_ascii_alphabetic());
        !word
            || !self
                .buffer
                .peek_nth(token.chars().count())
                .is_some_and(|c| c.is_ascii_alphabetic())
    }

    /// Read `\name` and return the name without backslash
    pub fn get_cs_name(&mut self, name: &str) -> ParseResult<String> {
        self.buffer.skip_whitespace();
        if self.buffer.peek() != Some('\\') {
            return Err(TexError::new(ErrorKind::MissingCS, [name]));
        }
        self.buffer.next_char();
        Ok(self.get_cs())
    }

    // Nested parsing

    /// Parse `text` with a nested parser in environment `env`
    pub fn sub_parse(&mut self, text: &str, env: Rc<Env>) -> ParseResult<NodeId> {
        if self.ctx.depth >= MAX_NESTING {
            return Err(TexError::simple(ErrorKind::MaxMacroSub1));
        }
        self.ctx.count_substitution(ErrorKind::MaxMacroSub1)?;
        trace!("nested parse {:?}", text);
        let frames = self.stack.len();
        self.ctx.depth += 1;
        self.ctx.outer_frames += frames;
        let result = TexParser::new(text, env, &mut *self.ctx, true).parse();
        self.ctx.outer_frames -= frames;
        self.ctx.depth -= 1;
        result
    }

    /// Read an argument and parse it in the current environment
    pub fn parse_arg(&mut self, name: &str) -> ParseResult<NodeId> {
        let arg = self.get_argument(name)?;
        let env = self.stack.env();
        self.sub_parse(&arg, env)
    }

    /// Read an argument and parse it as a row of its own
    pub fn parse_arg_row(&mut self, name: &str) -> ParseResult<NodeId> {
        let node = self.parse_arg(name)?;
        Ok(match self.ctx.factory.tree().kind(node) {
            NodeKind::Mrow => node,
            _ => self.ctx.factory.node(NodeKind::Mrow, &[node]),
        })
    }

    /// Read an argument as text: `mtext` runs with `$...$` math between
    pub fn parse_text_arg(&mut self, name: &str) -> ParseResult<NodeId> {
        let text = self.get_argument(name)?;
        let nodes = internal_math(self, &text, None)?;
        Ok(match nodes.as_slice() {
            [single] => *single,
            _ => self.ctx.factory.node(NodeKind::Mrow, &nodes),
        })
    }

    /// Read an argument in upright font, letter runs forming one identifier
    pub fn parse_roman(&mut self, name: &str) -> ParseResult<NodeId> {
        let text = self.get_argument(name)?;
        let mut env = (*self.stack.env()).clone();
        env.font = Some("normal");
        env.multi_letter = true;
        self.sub_parse(&text, Rc::new(env))
    }

    /// Push expanded text in front of the input, counting it as one
    /// substitution
    pub fn splice(&mut self, text: String, kind: ErrorKind) -> ParseResult<()> {
        self.ctx.count_substitution(kind)?;
        self.buffer.splice(expand::terminate_control_word(text))
    }
}
