//! Fixed property tables.
//!
//! The inherited-property set and the initial-value table follow CSS 2.1,
//! including the aural properties, so that generic lookups never fall off
//! the edge of the table for a CSS 2 property name.

use folio_types::profile::SIZE_NAMES;

/// Properties whose absent or `inherit` value resolves through the
/// parent chain instead of the defaults table.
const INHERITED: [&str; 40] = [
    "azimuth",
    "border-collapse",
    "border-spacing",
    "caption-side",
    "color",
    "cursor",
    "direction",
    "elevation",
    "empty-cells",
    "font-family",
    "font-size",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "orphans",
    "page-break-inside",
    "pitch",
    "pitch-range",
    "quotes",
    "richness",
    "speak",
    "speak-header",
    "speak-numeral",
    "speak-punctuation",
    "speech-rate",
    "stress",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "voice-family",
    "volume",
    "white-space",
    "widows",
    "word-spacing",
];

pub fn is_inherited(name: &str) -> bool {
    INHERITED.contains(&name)
}

pub fn is_font_size_name(name: &str) -> bool {
    SIZE_NAMES.contains(&name)
}

/// Initial value of a property, or `None` for names outside the table.
///
/// The `:color` marker on border colors stands for "same as the
/// element's color property" and is passed through for the consumer to
/// resolve.
pub fn default_value(name: &str) -> Option<&'static str> {
    Some(match name {
        "azimuth" => "center",
        "background-attachment" => "scroll",
        "background-color" => "transparent",
        "background-image" => "none",
        "background-position" => "0% 0%",
        "background-repeat" => "repeat",
        "border-bottom-color" => ":color",
        "border-bottom-style" => "none",
        "border-bottom-width" => "medium",
        "border-collapse" => "separate",
        "border-left-color" => ":color",
        "border-left-style" => "none",
        "border-left-width" => "medium",
        "border-right-color" => ":color",
        "border-right-style" => "none",
        "border-right-width" => "medium",
        "border-spacing" => "0",
        "border-top-color" => ":color",
        "border-top-style" => "none",
        "border-top-width" => "medium",
        "bottom" => "auto",
        "caption-side" => "top",
        "clear" => "none",
        "clip" => "auto",
        "color" => "black",
        "content" => "normal",
        "counter-increment" => "none",
        "counter-reset" => "none",
        "cue-after" => "none",
        "cue-before" => "none",
        "cursor" => "auto",
        "direction" => "ltr",
        "display" => "inline",
        "elevation" => "level",
        "empty-cells" => "show",
        "float" => "none",
        "font-family" => "serif",
        "font-size" => "medium",
        "font-style" => "normal",
        "font-variant" => "normal",
        "font-weight" => "normal",
        "height" => "auto",
        "left" => "auto",
        "letter-spacing" => "normal",
        "line-height" => "normal",
        "list-style-image" => "none",
        "list-style-position" => "outside",
        "list-style-type" => "disc",
        "margin-bottom" => "0",
        "margin-left" => "0",
        "margin-right" => "0",
        "margin-top" => "0",
        "max-height" => "none",
        "max-width" => "none",
        "min-height" => "0",
        "min-width" => "0",
        "orphans" => "2",
        "outline-color" => "invert",
        "outline-style" => "none",
        "outline-width" => "medium",
        "overflow" => "visible",
        "padding-bottom" => "0",
        "padding-left" => "0",
        "padding-right" => "0",
        "padding-top" => "0",
        "page-break-after" => "auto",
        "page-break-before" => "auto",
        "page-break-inside" => "auto",
        "pause-after" => "0",
        "pause-before" => "0",
        "pitch" => "medium",
        "pitch-range" => "50",
        "play-during" => "auto",
        "position" => "static",
        "quotes" => "'\u{201c}' '\u{201d}' '\u{2018}' '\u{2019}'",
        "richness" => "50",
        "right" => "auto",
        "speak" => "normal",
        "speak-header" => "once",
        "speak-numeral" => "continuous",
        "speak-punctuation" => "none",
        "speech-rate" => "medium",
        "stress" => "50",
        "table-layout" => "auto",
        "text-align" => "auto",
        "text-decoration" => "none",
        "text-indent" => "0",
        "text-transform" => "none",
        "top" => "auto",
        "unicode-bidi" => "normal",
        "vertical-align" => "baseline",
        "visibility" => "visible",
        "voice-family" => "default",
        "volume" => "medium",
        "white-space" => "normal",
        "widows" => "2",
        "width" => "auto",
        "word-spacing" => "normal",
        "z-index" => "auto",
        _ => return None,
    })
}
