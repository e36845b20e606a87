//! Shorthand property expansion.
//!
//! Expands composite declarations (`margin`, `padding`, `font`,
//! `list-style`) into their canonical longhand properties and applies the
//! `text-align` justification override plus the named `font-size`
//! normalization, producing the flat property maps the cascade applies.

use std::collections::BTreeMap;

use folio_types::profile::DeviceProfile;
use folio_types::source::Declaration;

use crate::config::Justification;
use crate::properties::{default_value, is_font_size_name};
use crate::values::validates;

const FONT_COMPOSITION: [&str; 6] = [
    "font-style",
    "font-variant",
    "font-weight",
    "font-size",
    "line-height",
    "font-family",
];

const LIST_STYLE_COMPOSITION: [&str; 3] =
    ["list-style-type", "list-style-position", "list-style-image"];

/// Expand one declaration block into a flat longhand property map.
///
/// Later declarations overwrite earlier ones key by key, so a longhand
/// following its shorthand wins as usual.
pub fn flatten_declarations(
    declarations: &[Declaration],
    profile: &DeviceProfile,
    justification: Justification,
) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    for decl in declarations {
        match decl.name.as_str() {
            "margin" | "padding" => style.extend(normalize_edge(&decl.components, &decl.name)),
            "font" => style.extend(normalize_composition(&FONT_COMPOSITION, decl)),
            "list-style" => style.extend(normalize_composition(&LIST_STYLE_COMPOSITION, decl)),
            "text-align" => style.extend(normalize_text_align(decl, justification)),
            _ => {
                style.insert(decl.name.clone(), decl.value());
            }
        }
    }
    if let Some(size) = style.get("font-size").cloned() {
        // normalize the named-size synonyms, then pin names to points
        let size = match size.as_str() {
            "normal" => "medium".to_string(),
            "smallest" => "xx-small".to_string(),
            _ => size,
        };
        if is_font_size_name(&size) {
            let pts = profile.named_size(&size).unwrap_or(profile.base_font_size);
            style.insert("font-size".to_string(), format!("{}pt", pts as i32));
        }
    }
    style
}

/// Expand a 1-4 component edge shorthand per the CSS box rules. Extra
/// components beyond four are ignored.
fn normalize_edge(components: &[String], name: &str) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    let values: Vec<&String> = match components.len() {
        1 => vec![&components[0]; 4],
        2 => vec![&components[0], &components[1], &components[0], &components[1]],
        3 => vec![&components[0], &components[1], &components[2], &components[1]],
        _ => components.iter().take(4).collect(),
    };
    for (edge, value) in ["top", "right", "bottom", "left"].iter().zip(values) {
        style.insert(format!("{name}-{edge}"), value.clone());
    }
    style
}

/// Decompose a `font`/`list-style` shorthand against its composition.
///
/// Components are taken in source order; each is consumed by the first
/// remaining target property whose grammar it satisfies. Ambiguous
/// component lists can under-consume. Downstream output depends on this
/// exact policy, so it must not be replaced by a stricter assignment.
fn normalize_composition(composition: &[&str], decl: &Declaration) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    if decl.value() == "inherit" {
        for key in composition {
            style.insert((*key).to_string(), "inherit".to_string());
        }
        return style;
    }
    let mut rest: Vec<&String> = decl.components.iter().rev().collect();
    if let Some(mut value) = rest.pop() {
        for key in composition {
            if validates(key, value) {
                style.insert((*key).to_string(), value.clone());
                match rest.pop() {
                    Some(next) => value = next,
                    None => break,
                }
            }
        }
    }
    for key in composition {
        if !style.contains_key(*key) {
            if let Some(default) = default_value(key) {
                style.insert((*key).to_string(), default.to_string());
            }
        }
    }
    style
}

/// Apply the configured justification override to `text-align`.
fn normalize_text_align(decl: &Declaration, justification: Justification) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    let text = decl.value();
    let value = match justification.css() {
        Some(forced) if text == "left" || text == "justify" => forced.to_string(),
        _ => text,
    };
    style.insert("text-align".to_string(), value);
    style
}
