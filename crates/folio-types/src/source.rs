//! Parsed stylesheet records and collaborator interfaces.
//!
//! The style core never parses CSS text or selector syntax itself. A
//! [`SheetParser`] turns raw stylesheet text into rule records, a
//! [`SelectorCompiler`] turns selector text into a reusable matcher, and
//! a [`Resources`] collaborator resolves linked stylesheet references.
//! All three are supplied by the embedder.

use crate::error::Result;
use crate::tree::{DocumentTree, NodeId};

/// One declaration inside a rule block.
///
/// `components` holds the value split into its ordered component tokens:
/// `margin: 1em 2em` arrives as `["1em", "2em"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub components: Vec<String>,
}

impl Declaration {
    pub fn new(name: &str, components: &[&str]) -> Self {
        Declaration {
            name: name.to_string(),
            components: components.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// The full value with components joined by single spaces.
    pub fn value(&self) -> String {
        self.components.join(" ")
    }
}

/// A parsed top-level rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRule {
    /// An ordinary style rule with one or more comma-separated selectors.
    Style {
        selectors: Vec<String>,
        declarations: Vec<Declaration>,
    },
    /// An `@page` rule.
    Page { declarations: Vec<Declaration> },
    /// An `@font-face` rule.
    FontFace { declarations: Vec<Declaration> },
}

/// An embedded font declaration, carried through style resolution
/// untouched for a later font-loading stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRule {
    pub declarations: Vec<Declaration>,
}

/// Stylesheet text parser supplied by the embedder.
pub trait SheetParser {
    fn parse_stylesheet(&self, text: &str) -> Result<Vec<ParsedRule>>;

    /// Parse a bare declaration block (the body of an inline `style=`
    /// attribute).
    fn parse_declarations(&self, text: &str) -> Result<Vec<Declaration>>;
}

/// A compiled, reusable selector matcher.
pub trait CompiledSelector {
    /// Every node the selector matches, in document order.
    fn select(&self, tree: &dyn DocumentTree) -> Vec<NodeId>;
}

/// Selector-to-matcher compiler supplied by the embedder.
pub trait SelectorCompiler {
    fn compile(&self, selector: &str) -> Result<Box<dyn CompiledSelector>>;
}

/// A fetched stylesheet resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssResource {
    pub encoding: String,
    pub text: String,
}

/// Resolves stylesheet references against the document's resource set.
pub trait Resources {
    /// Stylesheet text for a normalized path. Fails when the path is
    /// unknown or the resource is not of a stylesheet media type; both
    /// cases are skip-with-diagnostic for the resolver.
    fn css_text(&self, path: &str) -> Result<CssResource>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_value_joins_components() {
        let d = Declaration::new("margin", &["1em", "2em"]);
        assert_eq!(d.value(), "1em 2em");
    }

    #[test]
    fn declaration_value_single_component() {
        let d = Declaration::new("color", &["red"]);
        assert_eq!(d.value(), "red");
    }

    #[test]
    fn declaration_value_empty() {
        let d = Declaration::new("color", &[]);
        assert_eq!(d.value(), "");
    }
}
