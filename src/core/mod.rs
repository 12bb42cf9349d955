//! Core parsing engine
//!
//! - `tree` / `factory`: the output node arena and its constructors
//! - `symbols` / `registry`: symbol maps and their priority lists
//! - `buffer` / `expand`: input text and macro expansion
//! - `items` / `stack`: the stack automaton resolving deferred constructs
//! - `parser`: character dispatch and argument reading
//! - `handlers`: parse methods the packages bind to names
//! - `tags` / `filters`: numbering and passes over the finished tree

pub mod buffer;
pub mod expand;
pub mod factory;
pub mod filters;
pub mod handlers;
pub mod items;
pub mod options;
pub mod parser;
pub mod registry;
pub mod stack;
pub mod symbols;
pub mod tags;
pub mod tree;

pub use factory::NodeFactory;
pub use items::{Env, ItemKind, StackItem};
pub use options::{EnvironmentDefinition, MacroDefinition, ParserOptions};
pub use parser::{ParseContext, TexParser};
pub use registry::{Fallbacks, HandlerKind, Registry};
pub use symbols::{CharClass, HandlerArg, PatternSymbol, Symbol, SymbolMap};
pub use tags::{TagMode, TagSide, TagState};
pub use tree::{NodeId, NodeKind, NodeRef, Property, TexClass, Tree};
