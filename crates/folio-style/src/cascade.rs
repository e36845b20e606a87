//! Style resolution: cascade application over a document tree.
//!
//! [`Stylizer::new`] runs the whole resolution in one pass: aggregate
//! rule sources, flatten them through the shorthand expander, sort by
//! `(specificity, source order)`, match selectors and overwrite each
//! matched node's raw property map key by key, then apply inline
//! `style=` attributes (which therefore always win) and the legacy
//! `width=`/`height=` presentation attributes. Computed values are
//! derived lazily afterwards through [`Style`] handles.
//!
//! A `Stylizer` is scoped to one document: caches key off node ids and
//! must not be reused across trees.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use folio_types::profile::DeviceProfile;
use folio_types::source::{FontFaceRule, Resources, SelectorCompiler, SheetParser};
use folio_types::tree::{DocumentTree, NodeId, document_order};

use crate::computed::{ElementRecord, Style};
use crate::config::StyleOptions;
use crate::diag::Diagnostic;
use crate::selector;
use crate::shorthand;
use crate::stylesheet::{self, Rule};

/// Inline declaration prefixes left behind by word processors; stripped
/// before the inline block is parsed.
const WORD_PROCESSOR_PREFIXES: [&str; 4] = ["mso-", "panose-", "text-underline", "tab-interval"];

// -----------------------------------------------------------------------
// Sources
// -----------------------------------------------------------------------

/// The external collaborators style resolution consumes.
pub struct Sources<'a> {
    pub resources: &'a dyn Resources,
    pub parser: &'a dyn SheetParser,
    pub selectors: &'a dyn SelectorCompiler,
}

// -----------------------------------------------------------------------
// Stylizer
// -----------------------------------------------------------------------

/// Resolved styles for one document tree.
pub struct Stylizer {
    profile: DeviceProfile,
    rules: Vec<Rule>,
    page_rule: BTreeMap<String, String>,
    font_face_rules: Vec<FontFaceRule>,
    stylesheets: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
    records: Vec<ElementRecord>,
}

impl Stylizer {
    /// Resolve styles for `tree`.
    ///
    /// The tree is only mutated by first-letter wrapper insertion and
    /// presentation-attribute removal. Every failure along the way
    /// degrades (rule, sheet or declaration block skipped) and is
    /// recorded in [`diagnostics`](Stylizer::diagnostics); resolution
    /// itself never fails.
    pub fn new<T: DocumentTree>(
        tree: &mut T,
        doc_href: &str,
        sources: &Sources<'_>,
        profile: &DeviceProfile,
        options: &StyleOptions,
    ) -> Self {
        let justification = options.change_justification;
        let mut diagnostics = Vec::new();

        // 1. Aggregate rule sources and flatten into ordered rules.
        let sheets = stylesheet::collect_sheets(
            &*tree,
            doc_href,
            sources.resources,
            sources.parser,
            options,
            &mut diagnostics,
        );
        let mut rules = Vec::new();
        let mut page_rule = BTreeMap::new();
        let mut font_face_rules = Vec::new();
        let mut stylesheets = BTreeSet::new();
        let mut index = 0;
        for sheet in &sheets {
            stylesheets.insert(sheet.href.clone());
            for parsed in &sheet.rules {
                rules.extend(stylesheet::flatten_rule(
                    parsed,
                    &sheet.href,
                    index,
                    profile,
                    justification,
                    &mut page_rule,
                    &mut font_face_rules,
                ));
                index += 1;
            }
        }
        rules.sort_by(|a, b| (a.specificity, a.order).cmp(&(b.specificity, b.order)));

        // 2. Match rules and overwrite raw maps in cascade order.
        let mut raw: HashMap<NodeId, BTreeMap<String, String>> = HashMap::new();
        for rule in &rules {
            let first_letter = rule.selector.contains(":first-letter");
            let text = if first_letter {
                rule.selector.replace("::first-letter", "").replace(":first-letter", "")
            } else {
                rule.selector.clone()
            };
            let Some(matches) =
                selector::select(sources.selectors, &text, &*tree, &rule.href, &mut diagnostics)
            else {
                continue;
            };
            for node in matches {
                let target = if first_letter {
                    match selector::synthesize_first_letter(tree, node) {
                        Some(wrapper) => wrapper,
                        None => continue,
                    }
                } else {
                    node
                };
                raw.entry(target).or_default().extend(rule.style.clone());
            }
        }

        // 3. Inline style= attributes outrank every sheet rule.
        for node in document_order(&*tree) {
            if tree.tag(node).is_none() {
                continue;
            }
            let Some(inline) = tree.attribute(node, "style") else {
                continue;
            };
            let filtered = filter_word_processor_props(inline);
            if filtered.is_empty() {
                continue;
            }
            match sources.parser.parse_declarations(&filtered) {
                Ok(declarations) => {
                    let flat = shorthand::flatten_declarations(&declarations, profile, justification);
                    raw.entry(node).or_default().extend(flat);
                }
                // malformed inline style: the element keeps its sheet-derived map
                Err(_) => {}
            }
        }

        // 4. Legacy width=/height= presentation attributes on images.
        for node in document_order(&*tree) {
            if tree.tag(node) != Some("img") {
                continue;
            }
            let styled = raw.get(&node).is_some_and(|style| {
                style.get("width").is_some_and(|w| w != "auto")
                    || style.get("height").is_some_and(|h| h != "auto")
            });
            if styled {
                continue;
            }
            let mut update = BTreeMap::new();
            for prop in ["width", "height"] {
                let Some(value) = tree.attribute(node, prop).map(|v| v.trim().to_string()) else {
                    continue;
                };
                tree.remove_attribute(node, prop);
                if value.is_empty() {
                    continue;
                }
                let value = if value.chars().all(|c| c.is_ascii_digit()) {
                    format!("{value}px")
                } else {
                    value
                };
                update.insert(prop.to_string(), value);
            }
            if !update.is_empty() {
                raw.entry(node).or_default().extend(update);
            }
        }

        // 5. Freeze the per-node side table (after all tree mutation).
        let mut records: Vec<ElementRecord> = (0..tree.node_count())
            .map(|node| ElementRecord {
                parent: parent_element(&*tree, node),
                attr_width: tree.attribute(node, "width").map(str::to_string),
                attr_height: tree.attribute(node, "height").map(str::to_string),
                ..ElementRecord::default()
            })
            .collect();
        for (node, style) in raw {
            records[node].raw = style;
        }

        Stylizer {
            profile: profile.clone(),
            rules,
            page_rule,
            font_face_rules,
            stylesheets,
            diagnostics,
            records,
        }
    }

    /// Computed style accessor for a node.
    pub fn style(&self, node: NodeId) -> Style<'_> {
        Style::new(self, node)
    }

    /// `@page` properties accumulated across all sheets, last write wins.
    pub fn page_rule(&self) -> &BTreeMap<String, String> {
        &self.page_rule
    }

    /// `@font-face` rules in document order, untouched.
    pub fn font_face_rules(&self) -> &[FontFaceRule] {
        &self.font_face_rules
    }

    /// Hrefs of every aggregated sheet, including the base sheet.
    pub fn stylesheets(&self) -> &BTreeSet<String> {
        &self.stylesheets
    }

    /// Non-fatal problems encountered during resolution.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Regenerate the textual rules of one tracked sheet, optionally
    /// scaling point-valued font sizes by `font_scale`.
    pub fn stylesheet(&self, name: &str, font_scale: Option<f32>) -> String {
        let mut out = Vec::new();
        for rule in &self.rules {
            if rule.href != name {
                continue;
            }
            let mut style = rule.style.clone();
            if let Some(scale) = font_scale {
                if let Some(pt) = style
                    .get("font-size")
                    .and_then(|size| size.strip_suffix("pt"))
                    .and_then(|size| size.parse::<f32>().ok())
                {
                    style.insert("font-size".to_string(), format!("{:.2}pt", pt * scale));
                }
            }
            let body = style
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join(";\n    ");
            out.push(format!("{} {{\n    {};\n}}", rule.selector, body));
        }
        out.join("\n")
    }

    pub(crate) fn record(&self, node: NodeId) -> &ElementRecord {
        &self.records[node]
    }
}

/// Strip word-processor properties from an inline declaration block.
fn filter_word_processor_props(style: &str) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| !WORD_PROCESSOR_PREFIXES.iter().any(|p| decl.starts_with(p)))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Nearest ancestor that is an element.
fn parent_element<T: DocumentTree>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(node);
    while let Some(parent) = current {
        if tree.tag(parent).is_some() {
            return Some(parent);
        }
        current = tree.parent(parent);
    }
    None
}
