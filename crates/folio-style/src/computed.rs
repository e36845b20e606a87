//! Lazily derived computed values.
//!
//! After the cascade has filled the per-node raw property maps, computed
//! values (font size, dimensions, line height, edge lengths, background
//! color) are derived on first access through [`Style`] handles and
//! memoized for the life of the resolver. Resolution is single-pass and
//! single-threaded; nothing is ever invalidated.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

use folio_types::profile::DeviceProfile;
use folio_types::tree::NodeId;

use crate::cascade::Stylizer;
use crate::properties::{default_value, is_font_size_name, is_inherited};
use crate::units;
use crate::values::{Value, is_css2_color};

// -----------------------------------------------------------------------
// Per-node state
// -----------------------------------------------------------------------

/// Raw cascade output plus memoized derivations for one node.
#[derive(Debug, Default)]
pub(crate) struct ElementRecord {
    /// Cascaded raw property map (monotonic overwrite during cascade,
    /// frozen afterwards).
    pub(crate) raw: BTreeMap<String, String>,
    /// Nearest ancestor element, for inheritance.
    pub(crate) parent: Option<NodeId>,
    /// `width=` presentation attribute, captured after tree passes.
    pub(crate) attr_width: Option<String>,
    /// `height=` presentation attribute.
    pub(crate) attr_height: Option<String>,
    pub(crate) memo: Memo,
}

#[derive(Debug, Default)]
pub(crate) struct Memo {
    font_size: OnceCell<f32>,
    width: OnceCell<f32>,
    height: OnceCell<f32>,
    line_height: OnceCell<f32>,
    background_color: OnceCell<Option<String>>,
}

// -----------------------------------------------------------------------
// Style
// -----------------------------------------------------------------------

/// Computed style accessor for one element.
///
/// Cheap to copy; borrows the resolver. Derived values are memoized on
/// first access.
#[derive(Clone, Copy)]
pub struct Style<'a> {
    stylizer: &'a Stylizer,
    node: NodeId,
}

impl<'a> Style<'a> {
    pub(crate) fn new(stylizer: &'a Stylizer, node: NodeId) -> Self {
        Style { stylizer, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    fn record(&self) -> &'a ElementRecord {
        self.stylizer.record(self.node)
    }

    fn profile(&self) -> &'a DeviceProfile {
        self.stylizer.profile()
    }

    fn parent(&self) -> Option<Style<'a>> {
        self.record().parent.map(|p| Style::new(self.stylizer, p))
    }

    /// The element's own raw (cascaded, unconverted) property value.
    fn raw(&self, name: &str) -> Option<&'a str> {
        self.record().raw.get(name).map(String::as_str)
    }

    /// Snapshot of the raw cascaded property map.
    pub fn cssdict(&self) -> &'a BTreeMap<String, String> {
        &self.record().raw
    }

    // -- font size ------------------------------------------------------

    /// Resolved font size in points.
    pub fn font_size(&self) -> f32 {
        *self.record().memo.font_size.get_or_init(|| {
            let base = match self.parent() {
                Some(parent) => parent.font_size(),
                None => self.profile().base_font_size,
            };
            match self.raw("font-size") {
                Some(value) => self.normalize_font_size(value, base),
                None => base,
            }
        })
    }

    fn normalize_font_size(&self, value: &str, base: f32) -> f32 {
        let value = value.replace(['"', '\''], "");
        if value == "inherit" {
            return base;
        }
        let profile = self.profile();
        if is_font_size_name(&value) {
            return profile.named_size(&value).unwrap_or(profile.base_font_size);
        }
        if value == "smaller" {
            // one rung down the ladder; below it, keep shrinking by 1/1.2
            if let Some(prev) = profile.size_ladder.iter().rev().find(|&&s| s < base) {
                return *prev;
            }
            return base / 1.2;
        }
        if value == "larger" {
            // one rung up the ladder, saturating at the top
            if let Some(next) = profile.size_ladder.iter().find(|&&s| s > base) {
                return *next;
            }
            if let Some(max) = profile.size_ladder.last() {
                return base.max(*max);
            }
            return base * 1.2;
        }
        match units::convert_str(&value, base, base, profile.dpi) {
            Some(pt) if pt < 0.0 => self.normalize_font_size("smaller", base),
            Some(pt) => pt,
            None => base,
        }
    }

    // -- dimensions -----------------------------------------------------

    /// Resolved width in points: the `width=` attribute, else the styled
    /// width, else the parent's width (the profile page width at the
    /// root), clamped by `max-width`.
    pub fn width(&self) -> f32 {
        *self.record().memo.width.get_or_init(|| {
            self.dimension(
                self.record().attr_width.as_deref(),
                self.raw("width"),
                self.raw("max-width"),
                |parent| parent.width(),
                self.profile().page_width,
            )
        })
    }

    /// Resolved height in points, analogous to [`width`](Style::width).
    pub fn height(&self) -> f32 {
        *self.record().memo.height.get_or_init(|| {
            self.dimension(
                self.record().attr_height.as_deref(),
                self.raw("height"),
                self.raw("max-height"),
                |parent| parent.height(),
                self.profile().page_height,
            )
        })
    }

    fn dimension(
        &self,
        attr: Option<&str>,
        styled: Option<&str>,
        max: Option<&str>,
        parent_dim: impl Fn(Style<'a>) -> f32,
        page_dim: f32,
    ) -> f32 {
        let base = match self.parent() {
            Some(parent) => parent_dim(parent),
            None => page_dim,
        };
        let dpi = self.profile().dpi;
        let raw = attr.or(styled);
        let mut result = match raw {
            None | Some("") | Some("auto") => base,
            Some(value) => {
                // a surviving non-length string falls back to the page box
                units::convert_str(value, base, self.font_size(), dpi).unwrap_or(page_dim)
            }
        };
        if let Some(clamp) = max {
            if let Some(clamp) = units::convert_str(clamp, base, self.font_size(), dpi) {
                if clamp < result {
                    result = clamp;
                }
            }
        }
        result
    }

    // -- line height ----------------------------------------------------

    /// Resolved line height in points. `normal` and unresolvable values
    /// mean 1.2 times the font size; a bare number multiplies the font
    /// size; lengths convert with the font size as percentage base.
    pub fn line_height(&self) -> f32 {
        *self.record().memo.line_height.get_or_init(|| match self.raw("line-height") {
            Some(raw) => {
                let value = if raw == "normal" { "1.2" } else { raw };
                match value.parse::<f32>() {
                    Ok(factor) => factor * self.font_size(),
                    Err(_) => {
                        let font = self.font_size();
                        units::convert_str(value, font, font, self.profile().dpi)
                            .unwrap_or(1.2 * font)
                    }
                }
            }
            None => match self.parent() {
                Some(parent) => parent.line_height(),
                None => 1.2 * self.font_size(),
            },
        })
    }

    // -- background color -----------------------------------------------

    /// Background color, if any is set on this element.
    ///
    /// Checks `background-color` first, then scans the `background`
    /// shorthand for the first component that validates as a CSS Level 2
    /// color. Deliberately neither inherited nor defaulted.
    pub fn background_color(&self) -> Option<String> {
        self.record()
            .memo
            .background_color
            .get_or_init(|| {
                if let Some(value) = self.raw("background-color") {
                    if is_css2_color(value) {
                        return Some(value.to_string());
                    }
                }
                if let Some(value) = self.raw("background") {
                    for component in value.split_whitespace() {
                        if is_css2_color(component) {
                            return Some(component.to_string());
                        }
                    }
                }
                None
            })
            .clone()
    }

    // -- edges ----------------------------------------------------------

    /// Top margin in points. Relative values resolve against the
    /// computed height, not the width; layout depends on this historical
    /// behavior.
    pub fn margin_top(&self) -> f32 {
        self.edge("margin-top")
    }

    pub fn margin_bottom(&self) -> f32 {
        self.edge("margin-bottom")
    }

    pub fn padding_top(&self) -> f32 {
        self.edge("padding-top")
    }

    pub fn padding_bottom(&self) -> f32 {
        self.edge("padding-bottom")
    }

    fn edge(&self, name: &str) -> f32 {
        let value = match self.lookup(name) {
            Some(value) => value,
            None => return 0.0,
        };
        units::convert_str(&value, self.height(), self.font_size(), self.profile().dpi)
            .unwrap_or(0.0)
    }

    // -- generic lookup -------------------------------------------------

    /// Cascaded value for any property, unit-converted against this
    /// element's width and font size. The dimensional properties resolve
    /// through their dedicated accessors. `None` means the property is
    /// unset, un-defaulted and not special-cased (or, for
    /// `background-color`, that no background is set).
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "font-size" => Some(Value::Num(self.font_size())),
            "width" => Some(Value::Num(self.width())),
            "height" => Some(Value::Num(self.height())),
            "line-height" => Some(Value::Num(self.line_height())),
            "background-color" => self.background_color().map(Value::Text),
            "margin-top" => Some(Value::Num(self.margin_top())),
            "margin-bottom" => Some(Value::Num(self.margin_bottom())),
            "padding-top" => Some(Value::Num(self.padding_top())),
            "padding-bottom" => Some(Value::Num(self.padding_bottom())),
            _ => self.lookup(name).map(|value| {
                units::convert(
                    &Value::Text(value),
                    self.width(),
                    self.font_size(),
                    self.profile().dpi,
                )
            }),
        }
    }

    /// Raw cascade chain: own map, then ancestors for inherited
    /// properties or an explicit `inherit`, then the defaults table.
    fn lookup(&self, name: &str) -> Option<String> {
        let mut result = self.raw(name).map(str::to_string);
        let explicit_inherit = result.as_deref() == Some("inherit");
        if explicit_inherit || (result.is_none() && is_inherited(name)) {
            match self.parent() {
                Some(parent) => result = parent.lookup(name),
                None if explicit_inherit => result = None,
                None => {}
            }
        }
        result.or_else(|| default_value(name).map(str::to_string))
    }

    /// Convert points into device pixels for this profile.
    pub fn pt_to_px(&self, value: f32) -> f32 {
        self.profile().dpi / 72.0 * value
    }
}

impl fmt::Debug for Style<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Style")
            .field("node", &self.node)
            .field("raw", &self.record().raw)
            .finish()
    }
}

/// Sorted `prop: value; ...` rendering of the raw property map.
impl fmt::Display for Style<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.record().raw {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use folio_types::tree::{DocumentTree, NodeId};

    use crate::cascade::{Sources, Stylizer};
    use crate::config::StyleOptions;
    use crate::test_utils::{TestParser, TestResources, TestSelectors, TestTree};
    use crate::values::Value;
    use folio_types::profile::DeviceProfile;

    /// Resolve `<html><head><style>css</style></head><body><div><p/></div>`
    /// and return (styles, body, div, p).
    fn fixture(css: &str) -> (Stylizer, NodeId, NodeId, NodeId) {
        let mut tree = TestTree::new();
        let html = tree.element(tree.root(), "html", &[]);
        let head = tree.element(html, "head", &[]);
        let style = tree.element(head, "style", &[]);
        tree.text_node(style, css);
        let body = tree.element(html, "body", &[]);
        let div = tree.element(body, "div", &[]);
        let p = tree.element(div, "p", &[]);
        let parser = TestParser;
        let selectors = TestSelectors;
        let resources = TestResources::default();
        let sources = Sources {
            resources: &resources,
            parser: &parser,
            selectors: &selectors,
        };
        let styles = Stylizer::new(
            &mut tree,
            "text/ch1.xhtml",
            &sources,
            &DeviceProfile::default(),
            &StyleOptions::default(),
        );
        (styles, body, div, p)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn font_size_defaults_to_profile_base() {
        let (styles, body, _, p) = fixture("");
        assert!(close(styles.style(body).font_size(), 12.0));
        assert!(close(styles.style(p).font_size(), 12.0));
    }

    #[test]
    fn font_size_percentage_resolves_against_parent() {
        let (styles, _, div, p) = fixture("div { font-size: 150% }");
        assert!(close(styles.style(div).font_size(), 18.0));
        // p inherits the computed 18pt, not the percentage
        assert!(close(styles.style(p).font_size(), 18.0));
    }

    #[test]
    fn font_size_em_compounds_down_the_tree() {
        let (styles, _, div, p) = fixture("div { font-size: 2em } p { font-size: 2em }");
        assert!(close(styles.style(div).font_size(), 24.0));
        assert!(close(styles.style(p).font_size(), 48.0));
    }

    #[test]
    fn font_size_inherit_takes_parent_value() {
        let (styles, _, div, p) = fixture("div { font-size: 18pt } p { font-size: inherit }");
        assert!(close(styles.style(div).font_size(), 18.0));
        assert!(close(styles.style(p).font_size(), 18.0));
    }

    #[test]
    fn font_size_smaller_steps_down_the_ladder() {
        let (styles, _, div, p) = fixture("p { font-size: smaller }");
        assert!(close(styles.style(div).font_size(), 12.0));
        // 12 sits on the ladder; one rung down is 10
        assert!(close(styles.style(p).font_size(), 10.0));
    }

    #[test]
    fn font_size_smaller_below_ladder_keeps_shrinking() {
        let (styles, _, div, p) = fixture("div { font-size: 6pt } p { font-size: smaller }");
        assert!(close(styles.style(div).font_size(), 6.0));
        assert!(close(styles.style(p).font_size(), 6.0 / 1.2));
    }

    #[test]
    fn negative_font_size_resolves_as_smaller() {
        let (styles, _, _, p) = fixture("p { font-size: -4pt }");
        assert!(close(styles.style(p).font_size(), 10.0));
    }

    #[test]
    fn unresolvable_font_size_falls_back_to_parent() {
        let (styles, _, _, p) = fixture("p { font-size: gigantic }");
        assert!(close(styles.style(p).font_size(), 12.0));
    }

    #[test]
    fn width_defaults_to_the_page_box() {
        let (styles, body, _, p) = fixture("");
        assert!(close(styles.style(body).width(), 612.0));
        assert!(close(styles.style(p).width(), 612.0));
        assert!(close(styles.style(p).height(), 792.0));
    }

    #[test]
    fn height_clamps_against_max_height() {
        let (styles, _, div, p) = fixture("div { height: 400pt } p { max-height: 5in }");
        assert!(close(styles.style(div).height(), 400.0));
        // auto height (400) clamped by 5in = 360
        assert!(close(styles.style(p).height(), 360.0));
    }

    #[test]
    fn max_width_never_grows() {
        let (styles, _, div, _) = fixture("div { width: 100pt; max-width: 500pt }");
        assert!(close(styles.style(div).width(), 100.0));
    }

    #[test]
    fn line_height_defaults_to_1_2_em() {
        let (styles, _, _, p) = fixture("");
        assert!(close(styles.style(p).line_height(), 14.4));
    }

    #[test]
    fn line_height_bare_number_multiplies_font_size() {
        let (styles, _, _, p) = fixture("p { line-height: 2; font-size: 10pt }");
        assert!(close(styles.style(p).line_height(), 20.0));
    }

    #[test]
    fn line_height_length_converts() {
        let (styles, _, _, p) = fixture("p { line-height: 150% }");
        // percentage resolves against the font size
        assert!(close(styles.style(p).line_height(), 18.0));
    }

    #[test]
    fn line_height_inherits_computed_values() {
        let (styles, _, div, p) = fixture("div { line-height: 20pt }");
        assert!(close(styles.style(div).line_height(), 20.0));
        assert!(close(styles.style(p).line_height(), 20.0));
    }

    #[test]
    fn margins_resolve_percentages_against_height() {
        let (styles, _, _, p) = fixture("p { margin-top: 10%; padding-bottom: 10% }");
        // page height 792 -> 79.2
        assert!(close(styles.style(p).margin_top(), 79.2));
        assert!(close(styles.style(p).padding_bottom(), 79.2));
    }

    #[test]
    fn auto_margins_compute_to_zero() {
        let (styles, _, _, p) = fixture("p { margin-top: auto }");
        assert!(close(styles.style(p).margin_top(), 0.0));
        // and the unset bottom margin takes the 0 default
        assert!(close(styles.style(p).padding_top(), 0.0));
    }

    #[test]
    fn get_dispatches_to_the_special_accessors() {
        let (styles, _, _, p) = fixture("p { font-size: 10pt; line-height: 2 }");
        let style = styles.style(p);
        assert_eq!(style.get("font-size"), Some(Value::Num(10.0)));
        assert_eq!(style.get("line-height"), Some(Value::Num(20.0)));
        assert_eq!(style.get("width"), Some(Value::Num(612.0)));
    }

    #[test]
    fn get_converts_generic_lengths_against_width() {
        let (styles, _, _, p) = fixture("p { text-indent: 50% }");
        assert_eq!(styles.style(p).get("text-indent"), Some(Value::Num(306.0)));
    }

    #[test]
    fn get_unknown_property_is_none() {
        let (styles, _, _, p) = fixture("");
        assert_eq!(styles.style(p).get("flex-grow"), None);
    }

    #[test]
    fn get_defaulted_keyword_passes_through() {
        let (styles, _, _, p) = fixture("");
        assert_eq!(styles.style(p).get("float"), Some(Value::text("none")));
    }

    #[test]
    fn pt_to_px_uses_profile_dpi() {
        let (styles, _, _, p) = fixture("");
        // 96 dpi: 72pt = 96px
        assert!(close(styles.style(p).pt_to_px(72.0), 96.0));
    }

    #[test]
    fn display_renders_sorted_raw_map() {
        let (styles, _, _, p) = fixture("p { color: red; text-indent: 2em }");
        let rendered = styles.style(p).to_string();
        assert!(rendered.contains("color: red"));
        assert!(rendered.contains("text-indent: 2em"));
        let color_at = rendered.find("color").unwrap();
        let indent_at = rendered.find("text-indent").unwrap();
        assert!(color_at < indent_at);
    }

    #[test]
    fn computed_values_are_memoized() {
        let (styles, _, _, p) = fixture("p { font-size: 2em }");
        let first = styles.style(p).font_size();
        let second = styles.style(p).font_size();
        assert!(close(first, second));
        assert!(close(first, 24.0));
    }
}
