//! The `noundefined` package: unknown control sequences are shown as red
//! text instead of raising `UndefinedControlSequence`

use crate::core::parser::TexParser;
use crate::core::registry::Fallbacks;
use crate::core::tree::NodeKind;
use crate::utils::error::ParseResult;

use super::Configuration;

fn undefined(parser: &mut TexParser<'_>, name: &str) -> ParseResult<()> {
    parser.push_token(NodeKind::Mtext, &[("mathcolor", "red")], name)?;
    Ok(())
}

pub fn configuration() -> Configuration {
    Configuration::new("noundefined")
        .requires(&["base"])
        .fallbacks(Fallbacks {
            macro_: Some(undefined),
            environment: None,
        })
}
