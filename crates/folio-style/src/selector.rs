//! Selector matching policies layered over the external compiler.
//!
//! The compiler itself is opaque (supplied by the embedder); this module
//! owns what happens around it: selector text normalization, specificity
//! computation, the case-mismatch fallbacks for sloppily-cased documents,
//! and first-letter wrapper synthesis.

use unicode_categories::UnicodeCategories;

use folio_types::source::{CompiledSelector as _, SelectorCompiler};
use folio_types::tree::{DocumentTree, NodeId, document_order};

use crate::diag::Diagnostic;

// -----------------------------------------------------------------------
// Specificity
// -----------------------------------------------------------------------

/// 4-component selector specificity: inline, ids, classes/attributes/
/// pseudo-classes, types/pseudo-elements. Ordered lexicographically;
/// rules of equal specificity fall back to source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
    pub inline: u32,
    pub ids: u32,
    pub classes: u32,
    pub types: u32,
}

/// CSS 2 pseudo-elements, which count as types for specificity.
const PSEUDO_ELEMENTS: [&str; 4] = ["first-line", "first-letter", "before", "after"];

/// Compute the specificity of a single selector from its text.
pub fn specificity(selector: &str) -> Specificity {
    let mut spec = Specificity::default();
    let bytes = selector.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                i = skip_ident(selector, i + 1);
                spec.ids += 1;
            }
            b'.' => {
                i = skip_ident(selector, i + 1);
                spec.classes += 1;
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                i += 1;
                spec.classes += 1;
            }
            b':' => {
                i += 1;
                if i < bytes.len() && bytes[i] == b':' {
                    i += 1;
                }
                let start = i;
                i = skip_ident(selector, i);
                if PSEUDO_ELEMENTS.contains(&&selector[start..i]) {
                    spec.types += 1;
                } else {
                    spec.classes += 1;
                }
                // skip functional arguments like :lang(fr)
                if i < bytes.len() && bytes[i] == b'(' {
                    while i < bytes.len() && bytes[i] != b')' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                i = skip_ident(selector, i + 1);
                spec.types += 1;
            }
            // combinators, whitespace, the universal selector
            _ => i += 1,
        }
    }
    spec
}

fn skip_ident(s: &str, mut i: usize) -> usize {
    let bytes = s.as_bytes();
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c >= 0x80 {
            i += 1;
        } else {
            break;
        }
    }
    i
}

// -----------------------------------------------------------------------
// Normalization and matching
// -----------------------------------------------------------------------

/// Collapse whitespace around combinators: `div > p` becomes `div>p`.
pub fn normalize(selector: &str) -> String {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            ' ' => {
                let mut j = i;
                while j < chars.len() && chars[j] == ' ' {
                    j += 1;
                }
                if j < chars.len() && matches!(chars[j], '>' | '~' | '+') {
                    i = j;
                    continue;
                }
                out.push(' ');
                i += 1;
            }
            c @ ('>' | '~' | '+') => {
                out.push(c);
                i += 1;
                while i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Lowercase ASCII capital runs, keeping everything else intact. Used to
/// retry selectors against documents with inconsistently cased tags.
fn lowercase_capitals(selector: &str) -> String {
    selector
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// A bare class selector: `.name`, with a letter after the dot.
fn is_bare_class(selector: &str) -> bool {
    let mut chars = selector.chars();
    chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Match a selector against the tree, applying the fallback policies.
///
/// Returns `None` when the selector does not compile; the rule is
/// skipped and the failure recorded against `source_href`. An empty
/// match triggers one retry with capital runs lowercased; a still-empty
/// bare class selector falls back to a case-insensitive scan of `class`
/// attributes.
pub fn select<T: DocumentTree>(
    compiler: &dyn SelectorCompiler,
    selector: &str,
    tree: &T,
    source_href: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<NodeId>> {
    let text = normalize(selector);
    let matcher = match compiler.compile(&text) {
        Ok(matcher) => matcher,
        Err(err) => {
            log::warn!("skipping rule with unsupported selector {text}: {err}");
            diagnostics.push(Diagnostic::new(
                source_href,
                format!("skipping rule with unsupported selector {text}: {err}"),
            ));
            return None;
        }
    };
    let mut matches = matcher.select(tree);

    if matches.is_empty() {
        let ntext = lowercase_capitals(&text);
        if ntext != text {
            log::warn!("transformed CSS selector {text} to {ntext}");
            diagnostics.push(Diagnostic::new(
                source_href,
                format!("transformed CSS selector {text} to {ntext}"),
            ));
            if let Ok(matcher) = compiler.compile(&ntext) {
                matches = matcher.select(tree);
            }
        }
    }

    if matches.is_empty() && is_bare_class(&text) && text.to_lowercase() != text {
        let ltext = text.to_lowercase();
        let mut found = false;
        for node in document_order(tree) {
            let Some(class) = tree.attribute(node, "class") else {
                continue;
            };
            if ltext.ends_with(&format!(".{}", class.to_lowercase())) {
                matches.push(node);
                found = true;
            }
        }
        if found {
            log::warn!("ignoring case mismatches for CSS selector {text} in {source_href}");
            diagnostics.push(Diagnostic::new(
                source_href,
                format!("ignoring case mismatches for CSS selector {text}"),
            ));
        }
    }

    Some(matches)
}

// -----------------------------------------------------------------------
// First-letter synthesis
// -----------------------------------------------------------------------

/// Materialize a wrapper around `elem`'s leading punctuation+letter run.
///
/// Finds the first text-bearing descendant, splits off the run of Unicode
/// punctuation plus one following character, and inserts a `span` wrapper
/// holding it in the text node's place. Returns the wrapper, or `None`
/// when the element has no text to wrap.
pub fn synthesize_first_letter<T: DocumentTree>(tree: &mut T, elem: NodeId) -> Option<NodeId> {
    let target = first_text_descendant(tree, elem)?;
    let text = tree.text(target)?.to_string();

    let mut split = 0;
    for c in text.chars() {
        if c.is_punctuation() {
            split += c.len_utf8();
        } else {
            break;
        }
    }
    // the punctuation run plus one following character
    let head_end = text[split..]
        .chars()
        .next()
        .map_or(split, |c| split + c.len_utf8());
    let (head, tail) = text.split_at(head_end);
    if head.is_empty() {
        return None;
    }

    let parent = tree.parent(target)?;
    let index = tree.children(parent).iter().position(|&n| n == target)?;
    let tail = tail.to_string();
    let head = head.to_string();
    let wrapper = tree.insert_wrapper(parent, index, "span", head);
    tree.set_text(target, tail);
    Some(wrapper)
}

/// First non-empty text node in `elem`'s subtree, in document order.
fn first_text_descendant<T: DocumentTree>(tree: &T, elem: NodeId) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = tree.children(elem).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if tree.text(node).is_some_and(|t| !t.is_empty()) {
            return Some(node);
        }
        for &child in tree.children(node).iter().rev() {
            stack.push(child);
        }
    }
    None
}
