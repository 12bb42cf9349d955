//! # texmml
//!
//! TeX math to MathML node-tree parser with pluggable symbol tables.
//!
//! ## Features
//!
//! - **Registry-driven**: every character and control sequence is looked up
//!   in symbol maps contributed by packages (`base`, `ams`, `physics` ...)
//! - **Macro Expansion**: `\newcommand`, `\def`, `\let` and configured
//!   macros, bounded by substitution and buffer limits
//! - **Equation Numbering**: `\tag`, `\label`, `\ref` and AMS environments
//! - **Precise Errors**: typed error kinds with the established TeX messages
//! - **WASM Support**: Compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ```rust
//! use texmml::tex_to_mathml;
//!
//! let mathml = tex_to_mathml(r"\frac{1}{2}").unwrap();
//! assert!(mathml.contains("<mfrac"));
//! ```
//!
//! ### Sessions
//!
//! ```rust
//! use texmml::{ParserOptions, TexInput};
//!
//! let input = TexInput::builder()
//!     .packages(&["base", "ams", "braket"])
//!     .options(ParserOptions::display())
//!     .build()
//!     .unwrap();
//! let tree = input.parse(r"\bra{\psi}").unwrap();
//! assert!(tree.to_mathml().starts_with("<math display=\"block\">"));
//! ```

use std::rc::Rc;
use std::sync::Arc;

use log::debug;

/// Core parsing engine
pub mod core;

/// Data layer - static tables and constants
pub mod data;

/// Packages - symbol maps and handlers grouped by name
pub mod features;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

pub use core::filters::finish_tree;
pub use core::{
    Env, HandlerKind, NodeId, NodeKind, NodeRef, ParseContext, ParserOptions, Registry, Symbol,
    SymbolMap, TagMode, TagSide, TexClass, TexParser, Tree,
};
pub use features::{Configuration, DEFAULT_PACKAGES, PACKAGES};

// Re-export utilities
pub use utils::diagnostics;
pub use utils::error::{ConfigError, ErrorKind, ParseResult, TexError};

/// A parsing session: a merged registry and the options every parse uses.
///
/// The registry is never mutated after [`TexInputBuilder::build`], so one
/// session can parse formulas on several threads at once.
#[derive(Debug, Clone)]
pub struct TexInput {
    registry: Arc<Registry>,
    options: Arc<ParserOptions>,
    packages: Vec<&'static str>,
}

/// Collects packages and options for a [`TexInput`]
#[derive(Debug, Clone, Default)]
pub struct TexInputBuilder {
    packages: Vec<String>,
    options: ParserOptions,
}

impl TexInputBuilder {
    /// Add packages by name; the default packages are used if none are named
    pub fn packages(mut self, names: &[&str]) -> Self {
        self.packages.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn package(mut self, name: &str) -> Self {
        self.packages.push(name.to_string());
        self
    }

    pub fn options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve package requirements, run `init` hooks and merge the
    /// package registries
    pub fn build(self) -> Result<TexInput, ConfigError> {
        let names: Vec<&str> = if self.packages.is_empty() {
            DEFAULT_PACKAGES.to_vec()
        } else {
            self.packages.iter().map(String::as_str).collect()
        };
        let configs = features::resolve_packages(&names)?;
        let mut options = self.options;
        for config in &configs {
            if let Some(init) = config.init {
                init(&mut options);
            }
        }
        let registry = features::build_registry(&configs, &options)?;
        let packages: Vec<&'static str> = configs.iter().map(|c| c.name).collect();
        debug!("session with packages [{}]", packages.join(", "));
        Ok(TexInput {
            registry: Arc::new(registry),
            options: Arc::new(options),
            packages,
        })
    }
}

impl Default for TexInput {
    /// The default packages with default options
    fn default() -> Self {
        TexInput {
            registry: features::default_registry(),
            options: Arc::new(ParserOptions::default()),
            packages: DEFAULT_PACKAGES.to_vec(),
        }
    }
}

impl TexInput {
    pub fn builder() -> TexInputBuilder {
        TexInputBuilder::default()
    }

    /// A session with the default packages and the given options
    pub fn with_options(options: ParserOptions) -> Self {
        TexInput {
            options: Arc::new(options),
            ..TexInput::default()
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Packages of the session in merge order
    pub fn packages(&self) -> &[&'static str] {
        &self.packages
    }

    /// Parse one formula
    pub fn parse(&self, text: &str) -> ParseResult<MathTree> {
        let mut ctx = ParseContext::new(Arc::clone(&self.registry), Arc::clone(&self.options));
        let content = TexParser::new(text, Rc::new(Env::default()), &mut ctx, false).parse()?;
        let content = self.label_formula(&mut ctx, content);
        let display = self.options.display;

        let (mut factory, mut tags) = ctx.into_parts();
        let children = match factory.tree().kind(content) {
            NodeKind::Mrow if factory.tree().explicit_tex_class(content).is_none() => {
                factory.tree().children(content).to_vec()
            }
            _ => vec![content],
        };
        let attrs: &[(&str, &str)] = if display { &[("display", "block")] } else { &[] };
        let root = factory.create(NodeKind::Math, attrs, &children);
        tags.resolve_references(factory.tree_mut());
        finish_tree(&mut factory, root, display);
        Ok(MathTree {
            tree: factory.into_tree(),
            root,
        })
    }

    /// Parse one formula; a failure gives an `merror` node holding the
    /// source text instead of an error
    pub fn parse_or_recover(&self, text: &str) -> MathTree {
        match self.parse(text) {
            Ok(tree) => tree,
            Err(err) => {
                debug!("recovering from {}: {}", err.id(), err.message());
                MathTree::error(text, &err, self.options.display)
            }
        }
    }

    /// Parse one formula, recovering from errors when the `noerrors`
    /// package is loaded
    pub fn render(&self, text: &str) -> ParseResult<MathTree> {
        if self.options.recover_errors {
            return Ok(self.parse_or_recover(text));
        }
        self.parse(text)
    }

    /// A `\tag` outside any display environment (or automatic numbering of
    /// a displayed formula) puts the formula in a labelled one-row table
    fn label_formula(&self, ctx: &mut ParseContext, content: NodeId) -> NodeId {
        let numbered = self.options.display
            && self.options.tags == TagMode::All
            && !ctx.tags.used_display();
        if !numbered && !ctx.tags.has_tag() {
            return content;
        }
        let Some(label) = ctx.tags.row_label(numbered) else {
            return content;
        };
        let factory = &mut ctx.factory;
        let text = factory.create_token(NodeKind::Mtext, &[], &label);
        let label_cell = factory.node(NodeKind::Mtd, &[text]);
        let cell = factory.node(NodeKind::Mtd, &[content]);
        let row = factory.node(NodeKind::Mlabeledtr, &[label_cell, cell]);
        let indent = self.options.tag_indent.as_str();
        factory.create(
            NodeKind::Mtable,
            &[
                ("displaystyle", "true"),
                ("side", self.options.tag_side.name()),
                ("minlabelspacing", indent),
            ],
            &[row],
        )
    }
}

/// A parsed formula: the node arena and its `math` root
#[derive(Debug, Clone)]
pub struct MathTree {
    tree: Tree,
    root: NodeId,
}

impl MathTree {
    fn error(text: &str, err: &TexError, display: bool) -> Self {
        let mut factory = crate::core::NodeFactory::new();
        let source = factory.create_token(NodeKind::Mtext, &[], text);
        let message = err.message();
        let merror = factory.create(
            NodeKind::Merror,
            &[
                ("data-mjx-error", message.as_str()),
                ("data-mjx-error-id", err.id()),
                ("title", message.as_str()),
            ],
            &[source],
        );
        let attrs: &[(&str, &str)] = if display { &[("display", "block")] } else { &[] };
        let root = factory.create(NodeKind::Math, attrs, &[merror]);
        MathTree {
            tree: factory.into_tree(),
            root,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_ref(&self) -> NodeRef<'_> {
        NodeRef::new(&self.tree, self.root)
    }

    /// Whether this tree is an error placeholder
    pub fn is_error(&self) -> bool {
        self.tree
            .children(self.root)
            .first()
            .is_some_and(|&child| self.tree.kind(child) == NodeKind::Merror)
    }

    pub fn to_mathml(&self) -> String {
        self.tree.to_mathml(self.root)
    }

    pub fn to_mathml_pretty(&self) -> String {
        self.tree.to_mathml_pretty(self.root)
    }

    /// The tree as nested JSON objects (`kind`, `texClass`, `attributes`,
    /// `text`, `children`)
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        node_json(&self.tree, self.root)
    }
}

#[cfg(feature = "serde")]
fn node_json(tree: &Tree, id: NodeId) -> serde_json::Value {
    use serde_json::{json, Map, Value};

    let kind = tree.kind(id);
    if kind == NodeKind::Text {
        return json!({ "kind": "text", "text": tree.text(id) });
    }
    let attributes: Map<String, Value> = tree
        .attributes(id)
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let mut node = json!({ "kind": kind.name(), "attributes": attributes });
    if let Some(class) = tree.explicit_tex_class(id) {
        node["texClass"] = json!(class.name());
    }
    if kind.is_token() {
        node["text"] = json!(tree.text(id));
    } else {
        let children: Vec<Value> = tree.children(id).iter().map(|&c| node_json(tree, c)).collect();
        node["children"] = Value::Array(children);
    }
    node
}

/// Parse with the default packages and options and serialise as MathML
pub fn tex_to_mathml(input: &str) -> ParseResult<String> {
    TexInput::default().parse(input).map(|tree| tree.to_mathml())
}

/// Like [`tex_to_mathml`] in display style
pub fn tex_to_mathml_display(input: &str) -> ParseResult<String> {
    TexInput::with_options(ParserOptions::display())
        .parse(input)
        .map(|tree| tree.to_mathml())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tex_to_mathml_basic() {
        let result = tex_to_mathml(r"\alpha + \beta").unwrap();
        assert!(result.starts_with("<math>"));
        assert!(result.contains(">\u{3B1}</mi>"));
        assert!(result.contains(">+</mo>"));
    }

    #[test]
    fn test_display_root() {
        let result = tex_to_mathml_display("x").unwrap();
        assert!(result.starts_with("<math display=\"block\">"));
    }

    #[test]
    fn test_builder_default_packages() {
        let input = TexInput::builder().build().unwrap();
        assert_eq!(input.packages(), &["base", "ams", "newcommand"]);
    }

    #[test]
    fn test_builder_unknown_package() {
        let err = TexInput::builder().package("nope").build().unwrap_err();
        assert_eq!(err, ConfigError::UnknownPackage("nope".to_string()));
    }

    #[test]
    fn test_parse_or_recover() {
        let input = TexInput::default();
        let tree = input.parse_or_recover(r"\frac{b}");
        assert!(tree.is_error());
        let mathml = tree.to_mathml();
        assert!(mathml.contains("<merror"));
        assert!(mathml.contains("<mtext>\\frac{b}</mtext>"));
        assert!(mathml.contains("Missing argument for \\frac"));
        let merror = tree.root_ref().child(0).unwrap();
        assert_eq!(merror.attribute("data-mjx-error-id"), Some("MissingArgFor"));
    }

    #[test]
    fn test_render_honours_noerrors() {
        let strict = TexInput::default();
        assert!(strict.render(r"x^").is_err());
        let lenient = TexInput::builder()
            .packages(&["base", "noerrors"])
            .build()
            .unwrap();
        assert!(lenient.render(r"x^").unwrap().is_error());
    }

    #[test]
    fn test_session_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TexInput>();
    }

    #[test]
    fn test_top_level_tag() {
        let tree = TexInput::default().parse(r"E=mc^2 \tag{1}").unwrap();
        let mathml = tree.to_mathml();
        assert!(mathml.contains("<mlabeledtr>"));
        assert!(mathml.contains("<mtext>(1)</mtext>"));
    }
}
