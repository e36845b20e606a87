//! Stylesheet aggregation and rule flattening.
//!
//! Builds the ordered rule-source list the cascade consumes: the built-in
//! base sheet first, then the document's embedded and linked sheets in
//! head order, then the engine-supplied extra CSS, then the user CSS.
//! Rules are flattened through the shorthand expander and stamped with
//! their global source index; `@page` and `@font-face` rules are split
//! off into their own collections.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use folio_types::profile::DeviceProfile;
use folio_types::source::{FontFaceRule, ParsedRule, Resources, SheetParser};
use folio_types::tree::{DocumentTree, NodeId};

use crate::config::{Justification, StyleOptions};
use crate::diag::Diagnostic;
use crate::selector::{self, Specificity};
use crate::shorthand;

/// Media types accepted for embedded and linked stylesheets.
pub const STYLE_MEDIA_TYPES: [&str; 3] = ["text/css", "text/x-oeb1-css", "text/x-oeb-css"];

/// Href recorded for the built-in base sheet.
pub const BASE_SHEET_HREF: &str = "about:base.css";

// -----------------------------------------------------------------------
// Base stylesheet
// -----------------------------------------------------------------------

/// Built-in base stylesheet: CSS 2.1-flavored defaults for the document
/// vocabulary, lowest cascade priority.
const BASE_CSS: &str = r#"
html, body, div, blockquote, figure, figcaption,
section, article, aside, header, footer {
    display: block;
}

p {
    display: block;
    margin-top: 1em;
    margin-bottom: 1em;
}

h1 {
    display: block;
    font-size: 2em;
    font-weight: bold;
    margin-top: 0.67em;
    margin-bottom: 0.67em;
}
h2 {
    display: block;
    font-size: 1.5em;
    font-weight: bold;
    margin-top: 0.83em;
    margin-bottom: 0.83em;
}
h3 {
    display: block;
    font-size: 1.17em;
    font-weight: bold;
    margin-top: 1em;
    margin-bottom: 1em;
}
h4 {
    display: block;
    font-size: 1em;
    font-weight: bold;
    margin-top: 1.33em;
    margin-bottom: 1.33em;
}
h5 {
    display: block;
    font-size: 0.83em;
    font-weight: bold;
    margin-top: 1.67em;
    margin-bottom: 1.67em;
}
h6 {
    display: block;
    font-size: 0.67em;
    font-weight: bold;
    margin-top: 2.33em;
    margin-bottom: 2.33em;
}

ul, ol {
    display: block;
    margin-top: 1em;
    margin-bottom: 1em;
    padding-left: 40px;
}
li {
    display: list-item;
    list-style-type: disc;
}

pre {
    display: block;
    white-space: pre;
    font-family: monospace;
    margin-top: 1em;
    margin-bottom: 1em;
}
code, kbd, samp, tt {
    font-family: monospace;
}

b, strong { font-weight: bold; }
i, em, cite, dfn, var { font-style: italic; }
u, ins { text-decoration: underline; }
s, del, strike { text-decoration: line-through; }
big { font-size: larger; }
small { font-size: smaller; }
sub { vertical-align: sub; font-size: smaller; }
sup { vertical-align: super; font-size: smaller; }

a {
    color: #0000ee;
    text-decoration: underline;
}

table { display: table; }
tr { display: table-row; }
td, th { display: table-cell; }
th { font-weight: bold; text-align: center; }
caption { display: table-caption; text-align: center; }

head, script, style, link, meta, title { display: none; }
"#;

static BASE_RULES: OnceLock<Vec<ParsedRule>> = OnceLock::new();

/// The parsed base stylesheet. Parsed once per process with the first
/// parser supplied; immutable and shared by reference afterwards.
pub fn base_rules(parser: &dyn SheetParser) -> &'static [ParsedRule] {
    BASE_RULES.get_or_init(|| parser.parse_stylesheet(BASE_CSS).unwrap_or_default())
}

// -----------------------------------------------------------------------
// Hrefs
// -----------------------------------------------------------------------

/// Synthetic stylesheet name for a document: `text/ch1.xhtml` -> `ch1.css`.
/// Embedded, extra and user sheets are all recorded under this name.
pub fn sheet_name(doc_href: &str) -> String {
    let base = doc_href.rsplit('/').next().unwrap_or(doc_href);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    format!("{stem}.css")
}

/// Resolve `href` relative to `base` (the referencing document's href).
/// Absolute references pass through untouched.
pub fn resolve_href(base: &str, href: &str) -> String {
    if href.contains("://") || href.starts_with('/') {
        return href.to_string();
    }
    let mut parts: Vec<&str> = base.split('/').collect();
    parts.pop();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(segment),
        }
    }
    parts.join("/")
}

// -----------------------------------------------------------------------
// Aggregation
// -----------------------------------------------------------------------

/// One aggregated rule source.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub href: String,
    pub rules: Vec<ParsedRule>,
}

/// Collect every rule source for a document, in cascade priority order.
pub fn collect_sheets<T: DocumentTree>(
    tree: &T,
    doc_href: &str,
    resources: &dyn Resources,
    parser: &dyn SheetParser,
    options: &StyleOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Sheet> {
    let cssname = sheet_name(doc_href);
    let mut sheets = vec![Sheet {
        href: BASE_SHEET_HREF.to_string(),
        rules: base_rules(parser).to_vec(),
    }];

    if let Some(head) = find_head(tree) {
        for &child in tree.children(head) {
            match tree.tag(child) {
                Some("style") => {
                    let media = tree.attribute(child, "type").unwrap_or("text/css");
                    if !STYLE_MEDIA_TYPES.contains(&media) {
                        continue;
                    }
                    let text = subtree_text(tree, child);
                    if text.is_empty() {
                        continue;
                    }
                    match parser.parse_stylesheet(&text) {
                        Ok(rules) => sheets.push(Sheet { href: cssname.clone(), rules }),
                        Err(err) => {
                            log::warn!("failed to parse embedded stylesheet in {doc_href}: {err}");
                            diagnostics.push(Diagnostic::new(doc_href, err.to_string()));
                        }
                    }
                }
                Some("link") => {
                    let rel = tree.attribute(child, "rel").unwrap_or("stylesheet");
                    let media = tree.attribute(child, "type").unwrap_or("text/css");
                    let Some(href) = tree.attribute(child, "href") else {
                        continue;
                    };
                    if !rel.eq_ignore_ascii_case("stylesheet")
                        || !STYLE_MEDIA_TYPES.contains(&media.to_ascii_lowercase().as_str())
                    {
                        continue;
                    }
                    let path = resolve_href(doc_href, href);
                    match resources.css_text(&path) {
                        Ok(resource) => match parser.parse_stylesheet(&resource.text) {
                            Ok(rules) => sheets.push(Sheet { href: path, rules }),
                            Err(err) => {
                                log::warn!("failed to parse stylesheet {path}: {err}");
                                diagnostics.push(Diagnostic::new(path, err.to_string()));
                            }
                        },
                        Err(err) => {
                            log::warn!("stylesheet {path} referenced by {doc_href}: {err}");
                            diagnostics.push(Diagnostic::new(path, err.to_string()));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for (label, css) in [("extra CSS", &options.extra_css), ("user CSS", &options.user_css)] {
        if css.is_empty() {
            continue;
        }
        match parser.parse_stylesheet(css) {
            Ok(rules) => sheets.push(Sheet { href: cssname.clone(), rules }),
            Err(err) => {
                log::warn!("failed to parse {label}, ignoring: {err}");
                diagnostics.push(Diagnostic::new(label, err.to_string()));
            }
        }
    }

    sheets
}

fn find_head<T: DocumentTree>(tree: &T) -> Option<NodeId> {
    let root = tree.root();
    let html = if tree.tag(root) == Some("html") {
        root
    } else {
        *tree
            .children(root)
            .iter()
            .find(|&&node| tree.tag(node) == Some("html"))?
    };
    tree.children(html)
        .iter()
        .copied()
        .find(|&node| tree.tag(node) == Some("head"))
}

/// Concatenated text-node content of `elem`'s subtree.
fn subtree_text<T: DocumentTree>(tree: &T, elem: NodeId) -> String {
    let mut pieces = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(elem).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if let Some(text) = tree.text(node) {
            if !text.trim().is_empty() {
                pieces.push(text);
            }
        }
        for &child in tree.children(node).iter().rev() {
            stack.push(child);
        }
    }
    pieces.join("\n\n")
}

// -----------------------------------------------------------------------
// Flattening
// -----------------------------------------------------------------------

/// One cascade-ready rule: expanded longhand properties plus the ordering
/// key. Immutable once flattened.
#[derive(Debug, Clone)]
pub struct Rule {
    pub specificity: Specificity,
    /// Global source index, assigned monotonically during aggregation.
    /// Breaks specificity ties in favor of later sources.
    pub order: usize,
    pub style: BTreeMap<String, String>,
    pub selector: String,
    pub href: String,
}

/// Flatten one parsed rule. Style rules yield one [`Rule`] per selector;
/// `@page` properties accumulate last-write-wins into `page_rule`;
/// `@font-face` rules are collected untouched.
pub fn flatten_rule(
    parsed: &ParsedRule,
    href: &str,
    index: usize,
    profile: &DeviceProfile,
    justification: Justification,
    page_rule: &mut BTreeMap<String, String>,
    font_face_rules: &mut Vec<FontFaceRule>,
) -> Vec<Rule> {
    match parsed {
        ParsedRule::Style { selectors, declarations } => {
            let style = shorthand::flatten_declarations(declarations, profile, justification);
            selectors
                .iter()
                .map(|sel| Rule {
                    specificity: selector::specificity(sel),
                    order: index,
                    style: style.clone(),
                    selector: sel.clone(),
                    href: href.to_string(),
                })
                .collect()
        }
        ParsedRule::Page { declarations } => {
            page_rule.extend(shorthand::flatten_declarations(declarations, profile, justification));
            Vec::new()
        }
        ParsedRule::FontFace { declarations } => {
            font_face_rules.push(FontFaceRule { declarations: declarations.clone() });
            Vec::new()
        }
    }
}
