//! Benchmarks for cascade resolution and computed value derivation.

use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use folio_style::{Sources, StyleOptions, Stylizer};
use folio_types::error::{Result, StyleError};
use folio_types::profile::DeviceProfile;
use folio_types::source::{
    CompiledSelector, CssResource, Declaration, ParsedRule, Resources, SelectorCompiler,
    SheetParser,
};
use folio_types::tree::{DocumentTree, NodeId, document_order};

// -----------------------------------------------------------------------
// Minimal collaborators (tag and class selectors only)
// -----------------------------------------------------------------------

struct BenchNode {
    tag: Option<String>,
    class: Option<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct BenchTree {
    nodes: Vec<BenchNode>,
}

impl BenchTree {
    fn new() -> Self {
        BenchTree {
            nodes: vec![BenchNode {
                tag: None,
                class: None,
                text: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn element(&mut self, parent: NodeId, tag: &str, class: Option<&str>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(BenchNode {
            tag: Some(tag.to_string()),
            class: class.map(str::to_string),
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }
}

impl DocumentTree for BenchTree {
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
        if name == "class" {
            self.nodes[node].class.as_deref()
        } else {
            None
        }
    }

    fn remove_attribute(&mut self, _node: NodeId, _name: &str) {}

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].text.as_deref()
    }

    fn set_text(&mut self, node: NodeId, text: String) {
        self.nodes[node].text = Some(text);
    }

    fn insert_wrapper(&mut self, parent: NodeId, index: usize, tag: &str, text: String) -> NodeId {
        let elem = self.nodes.len();
        self.nodes.push(BenchNode {
            tag: Some(tag.to_string()),
            class: None,
            text: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        let child = self.nodes.len();
        self.nodes.push(BenchNode {
            tag: None,
            class: None,
            text: Some(text),
            parent: Some(elem),
            children: Vec::new(),
        });
        self.nodes[elem].children.push(child);
        self.nodes[parent].children.insert(index, elem);
        elem
    }
}

struct BenchParser;

impl SheetParser for BenchParser {
    fn parse_stylesheet(&self, text: &str) -> Result<Vec<ParsedRule>> {
        let mut rules = Vec::new();
        let mut rest = text.trim();
        while !rest.is_empty() {
            let open = rest
                .find('{')
                .ok_or_else(|| StyleError::CssParse("expected block".to_string()))?;
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| StyleError::CssParse("unclosed block".to_string()))?;
            let declarations = self.parse_declarations(&rest[open + 1..close])?;
            rules.push(ParsedRule::Style {
                selectors: rest[..open].split(',').map(|s| s.trim().to_string()).collect(),
                declarations,
            });
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
                .ok_or_else(|| StyleError::CssParse("bad declaration".to_string()))?;
            declarations.push(Declaration {
                name: name.trim().to_string(),
                components: value.split_whitespace().map(str::to_string).collect(),
            });
        }
        Ok(declarations)
    }
}

enum BenchSelector {
    Tag(String),
    Class(String),
}

impl CompiledSelector for BenchSelector {
    fn select(&self, tree: &dyn DocumentTree) -> Vec<NodeId> {
        document_order(tree)
            .into_iter()
            .filter(|&node| match self {
                BenchSelector::Tag(tag) => tree.tag(node) == Some(tag.as_str()),
                BenchSelector::Class(class) => {
                    tree.attribute(node, "class") == Some(class.as_str())
                }
            })
            .collect()
    }
}

struct BenchSelectors;

impl SelectorCompiler for BenchSelectors {
    fn compile(&self, selector: &str) -> Result<Box<dyn CompiledSelector>> {
        if let Some(class) = selector.strip_prefix('.') {
            Ok(Box::new(BenchSelector::Class(class.to_string())))
        } else if selector.chars().all(|c| c.is_ascii_alphanumeric()) && !selector.is_empty() {
            Ok(Box::new(BenchSelector::Tag(selector.to_string())))
        } else {
            Err(StyleError::Selector(selector.to_string()))
        }
    }
}

#[derive(Default)]
struct BenchResources(HashMap<String, String>);

impl Resources for BenchResources {
    fn css_text(&self, path: &str) -> Result<CssResource> {
        self.0
            .get(path)
            .map(|text| CssResource {
                encoding: "utf-8".to_string(),
                text: text.clone(),
            })
            .ok_or_else(|| StyleError::Resource(format!("{path} not in resource set")))
    }
}

// -----------------------------------------------------------------------
// Workload generators
// -----------------------------------------------------------------------

/// Generate a stylesheet with `n` class rules.
fn generate_css(n: usize) -> String {
    let mut css = String::with_capacity(n * 96);
    for i in 0..n {
        css.push_str(&format!(
            ".class-{i} {{ color: #{i:02x}{i:02x}{i:02x}; padding: {}px; margin: {}em; \
             font-size: {}pt; line-height: 1.{} }}\n",
            i % 20,
            i % 4,
            8 + i % 12,
            i % 10,
        ));
    }
    css
}

/// Generate a document with `n` paragraphs, each carrying one of 100
/// rule-matching classes, plus a `<style>` sheet in the head.
fn generate_tree(n_elements: usize, css: &str) -> BenchTree {
    let mut tree = BenchTree::new();
    let html = tree.element(0, "html", None);
    let head = tree.element(html, "head", None);
    let style = tree.element(head, "style", None);
    tree.set_text_child(style, css);
    let body = tree.element(html, "body", None);
    for i in 0..n_elements {
        let div = tree.element(body, "div", Some(&format!("class-{}", i % 100)));
        tree.element(div, "p", None);
    }
    tree
}

impl BenchTree {
    fn set_text_child(&mut self, parent: NodeId, text: &str) {
        let id = self.nodes.len();
        self.nodes.push(BenchNode {
            tag: None,
            class: None,
            text: Some(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
    }
}

// -----------------------------------------------------------------------
// Benchmarks
// -----------------------------------------------------------------------

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");

    for (n_rules, n_elements) in [(50, 200), (100, 500), (100, 1000)] {
        let css = generate_css(n_rules);
        let label = format!("{n_rules}r_{n_elements}e");

        group.bench_with_input(BenchmarkId::new("resolve", &label), &css, |b, css| {
            b.iter(|| {
                let mut tree = generate_tree(n_elements, css);
                let parser = BenchParser;
                let selectors = BenchSelectors;
                let resources = BenchResources::default();
                let sources = Sources {
                    resources: &resources,
                    parser: &parser,
                    selectors: &selectors,
                };
                Stylizer::new(
                    &mut tree,
                    "bench.xhtml",
                    &sources,
                    &DeviceProfile::default(),
                    &StyleOptions::default(),
                )
            });
        });
    }

    group.finish();
}

fn bench_computed_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("computed");

    let css = generate_css(100);
    let mut tree = generate_tree(500, &css);
    let parser = BenchParser;
    let selectors = BenchSelectors;
    let resources = BenchResources::default();
    let sources = Sources {
        resources: &resources,
        parser: &parser,
        selectors: &selectors,
    };
    let styles = Stylizer::new(
        &mut tree,
        "bench.xhtml",
        &sources,
        &DeviceProfile::default(),
        &StyleOptions::default(),
    );
    let nodes: Vec<_> = document_order(&tree)
        .into_iter()
        .filter(|&n| tree.tag(n).is_some())
        .collect();

    group.bench_function("font_size_500e", |b| {
        b.iter(|| {
            let mut total = 0.0f32;
            for &node in &nodes {
                total += styles.style(node).font_size();
            }
            total
        });
    });

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_computed_access);
criterion_main!(benches);
