//! The `boldsymbol` package

use std::rc::Rc;

use crate::core::parser::TexParser;
use crate::core::registry::HandlerKind;
use crate::core::symbols::{HandlerArg, SymbolMap};
use crate::core::tree::{NodeKind, TexClass};
use crate::utils::error::ParseResult;

use super::Configuration;

/// `\boldsymbol{...}`: bold letters stay italic, symbols turn bold
fn boldsymbol(parser: &mut TexParser<'_>, name: &str, _args: &[HandlerArg]) -> ParseResult<()> {
    let text = parser.get_argument(name)?;
    let mut env = (*parser.env()).clone();
    env.bold_symbol = true;
    let content = parser.sub_parse(&text, Rc::new(env))?;
    let factory = parser.factory();
    let atom = factory.node(NodeKind::TeXAtom, &[content]);
    factory.tree_mut().set_tex_class(atom, TexClass::Ord);
    parser.push_node(atom)
}

pub fn configuration() -> Configuration {
    Configuration::new("boldsymbol")
        .requires(&["base"])
        .map(HandlerKind::Macro, SymbolMap::new("boldsymbol").command("boldsymbol", boldsymbol, &[]))
}
