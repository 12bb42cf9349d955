//! Parse methods bound into symbol maps
//!
//! Every handler reads what it needs from the parser's input and pushes
//! nodes or stack items. Handlers are plain functions so that symbol maps
//! can be built as static tables of function pointers.

pub mod arrays;
pub mod commands;
pub mod delimiters;
pub mod scripts;
pub mod text;
pub mod tokens;
