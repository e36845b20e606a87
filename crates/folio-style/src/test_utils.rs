//! Shared test fixtures.
//!
//! Provides an arena [`TestTree`] plus small reference implementations of
//! the parser, selector and resource collaborators, so cascade tests can
//! run end-to-end without a real CSS or selector engine.

use std::collections::HashMap;

use folio_types::error::{Result, StyleError};
use folio_types::source::{
    CompiledSelector, CssResource, Declaration, ParsedRule, Resources, SelectorCompiler,
    SheetParser,
};
use folio_types::tree::{DocumentTree, NodeId, document_order};

// -----------------------------------------------------------------------
// TestTree
// -----------------------------------------------------------------------

#[derive(Debug)]
struct TestNode {
    tag: Option<String>,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena document tree. Node 0 is the document node.
#[derive(Debug)]
pub(crate) struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    pub fn new() -> Self {
        TestTree {
            nodes: vec![TestNode {
                tag: None,
                attrs: Vec::new(),
                text: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TestNode {
            tag: Some(tag.to_string()),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn text_node(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TestNode {
            tag: None,
            attrs: Vec::new(),
            text: Some(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }
}

impl DocumentTree for TestTree {
    fn root(&self) -> NodeId {
        0
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].tag.as_deref()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node].attrs.retain(|(k, _)| k != name);
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].text.as_deref()
    }

    fn set_text(&mut self, node: NodeId, text: String) {
        self.nodes[node].text = Some(text);
    }

    fn insert_wrapper(&mut self, parent: NodeId, index: usize, tag: &str, text: String) -> NodeId {
        let elem = self.nodes.len();
        self.nodes.push(TestNode {
            tag: Some(tag.to_string()),
            attrs: Vec::new(),
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        let child = self.nodes.len();
        self.nodes.push(TestNode {
            tag: None,
            attrs: Vec::new(),
            text: Some(text),
            parent: Some(elem),
            children: Vec::new(),
        });
        self.nodes[elem].children.push(child);
        self.nodes[parent].children.insert(index, elem);
        elem
    }
}

// -----------------------------------------------------------------------
// TestParser
// -----------------------------------------------------------------------

/// Brace-counting parser for the simple CSS subset the tests use.
pub(crate) struct TestParser;

impl SheetParser for TestParser {
    fn parse_stylesheet(&self, text: &str) -> Result<Vec<ParsedRule>> {
        let mut rules = Vec::new();
        let mut rest = text.trim();
        while !rest.is_empty() {
            let Some(open) = rest.find('{') else {
                return Err(StyleError::CssParse(format!("expected block in {rest:?}")));
            };
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| StyleError::CssParse("unclosed block".to_string()))?;
            let head = rest[..open].trim();
            let declarations = self.parse_declarations(&rest[open + 1..close])?;
            match head {
                "@page" => rules.push(ParsedRule::Page { declarations }),
                "@font-face" => rules.push(ParsedRule::FontFace { declarations }),
                "" => return Err(StyleError::CssParse("missing selector".to_string())),
                _ => rules.push(ParsedRule::Style {
                    selectors: head.split(',').map(|s| s.trim().to_string()).collect(),
                    declarations,
                }),
            }
            rest = rest[close + 1..].trim();
        }
        Ok(rules)
    }

    fn parse_declarations(&self, text: &str) -> Result<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for part in text.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part
                .split_once(':')
                .ok_or_else(|| StyleError::CssParse(format!("bad declaration {part:?}")))?;
            declarations.push(Declaration {
                name: name.trim().to_string(),
                components: value.split_whitespace().map(str::to_string).collect(),
            });
        }
        Ok(declarations)
    }
}

// -----------------------------------------------------------------------
// TestSelectors
// -----------------------------------------------------------------------

/// Compiler for tag/class/id compounds with descendant and child
/// combinators. Matching is case-sensitive so the resolver's case
/// fallbacks stay observable; pseudo-classes fail to compile like an
/// engine without support for them would.
pub(crate) struct TestSelectors;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    id: Option<String>,
}

struct TestMatcher {
    /// Compounds left to right; the combinator links a compound to the
    /// one before it.
    parts: Vec<(Compound, Option<Combinator>)>,
}

impl SelectorCompiler for TestSelectors {
    fn compile(&self, selector: &str) -> Result<Box<dyn CompiledSelector>> {
        if selector.contains(':') {
            return Err(StyleError::Selector(format!(
                "unsupported pseudo-class in {selector:?}"
            )));
        }
        let mut parts = Vec::new();
        // normalized input: child combinators carry no spaces
        for (i, group) in selector.split_whitespace().enumerate() {
            for (j, piece) in group.split('>').enumerate() {
                let combinator = match (i, j) {
                    (0, 0) => None,
                    (_, 0) => Some(Combinator::Descendant),
                    _ => Some(Combinator::Child),
                };
                parts.push((parse_compound(piece)?, combinator));
            }
        }
        if parts.is_empty() {
            return Err(StyleError::Selector("empty selector".to_string()));
        }
        Ok(Box::new(TestMatcher { parts }))
    }
}

fn parse_compound(text: &str) -> Result<Compound> {
    if text.is_empty() {
        return Err(StyleError::Selector("empty compound".to_string()));
    }
    let mut compound = Compound::default();
    let mut rest = text;
    if !rest.starts_with(['.', '#']) && rest != "*" {
        let end = rest.find(['.', '#']).unwrap_or(rest.len());
        compound.tag = Some(rest[..end].to_string());
        rest = &rest[end..];
    } else if rest.starts_with('*') {
        rest = &rest[1..];
    }
    while !rest.is_empty() {
        let kind = rest.as_bytes()[0];
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() {
            return Err(StyleError::Selector(format!("bad compound {text:?}")));
        }
        match kind {
            b'.' => compound.classes.push(name.to_string()),
            b'#' => compound.id = Some(name.to_string()),
            _ => return Err(StyleError::Selector(format!("bad compound {text:?}"))),
        }
        rest = &body[end..];
    }
    Ok(compound)
}

impl CompiledSelector for TestMatcher {
    fn select(&self, tree: &dyn DocumentTree) -> Vec<NodeId> {
        document_order(tree)
            .into_iter()
            .filter(|&node| self.matches(tree, node))
            .collect()
    }
}

impl TestMatcher {
    fn matches(&self, tree: &dyn DocumentTree, node: NodeId) -> bool {
        let last = self.parts.len() - 1;
        if !matches_compound(tree, node, &self.parts[last].0) {
            return false;
        }
        let mut current = node;
        for i in (0..last).rev() {
            let compound = &self.parts[i].0;
            match self.parts[i + 1].1 {
                Some(Combinator::Child) | None => match parent_element(tree, current) {
                    Some(parent) if matches_compound(tree, parent, compound) => current = parent,
                    _ => return false,
                },
                Some(Combinator::Descendant) => {
                    let mut ancestor = parent_element(tree, current);
                    loop {
                        match ancestor {
                            Some(candidate) if matches_compound(tree, candidate, compound) => {
                                current = candidate;
                                break;
                            }
                            Some(candidate) => ancestor = parent_element(tree, candidate),
                            None => return false,
                        }
                    }
                }
            }
        }
        true
    }
}

fn matches_compound(tree: &dyn DocumentTree, node: NodeId, compound: &Compound) -> bool {
    let Some(tag) = tree.tag(node) else {
        return false;
    };
    if let Some(want) = &compound.tag {
        if want != tag {
            return false;
        }
    }
    if let Some(want) = &compound.id {
        if tree.attribute(node, "id") != Some(want.as_str()) {
            return false;
        }
    }
    compound.classes.iter().all(|want| {
        tree.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == want))
    })
}

fn parent_element(tree: &dyn DocumentTree, node: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(node);
    while let Some(parent) = current {
        if tree.tag(parent).is_some() {
            return Some(parent);
        }
        current = tree.parent(parent);
    }
    None
}

// -----------------------------------------------------------------------
// TestResources
// -----------------------------------------------------------------------

/// In-memory resource set.
#[derive(Default)]
pub(crate) struct TestResources {
    sheets: HashMap<String, String>,
    wrong_type: Vec<String>,
}

impl TestResources {
    pub fn with(mut self, path: &str, css: &str) -> Self {
        self.sheets.insert(path.to_string(), css.to_string());
        self
    }

    /// Register a path that exists but is not a stylesheet.
    pub fn with_wrong_type(mut self, path: &str) -> Self {
        self.wrong_type.push(path.to_string());
        self
    }
}

impl Resources for TestResources {
    fn css_text(&self, path: &str) -> Result<CssResource> {
        if self.wrong_type.iter().any(|p| p == path) {
            return Err(StyleError::Resource(format!("{path} is not a stylesheet")));
        }
        match self.sheets.get(path) {
            Some(text) => Ok(CssResource {
                encoding: "utf-8".to_string(),
                text: text.clone(),
            }),
            None => Err(StyleError::Resource(format!("{path} not in resource set"))),
        }
    }
}
