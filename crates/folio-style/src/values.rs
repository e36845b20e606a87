//! Style values and property grammar validation.

use std::fmt;

use folio_types::profile::SIZE_NAMES;

// -----------------------------------------------------------------------
// Value
// -----------------------------------------------------------------------

/// A style value: either a length resolved to points or an uninterpreted
/// piece of CSS text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f32),
    Text(String),
}

impl Value {
    pub fn text(s: &str) -> Self {
        Value::Text(s.to_string())
    }

    /// Resolved point value, if numeric.
    pub fn as_pt(&self) -> Option<f32> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// -----------------------------------------------------------------------
// Property grammar validation
// -----------------------------------------------------------------------

/// Check a single component token against a longhand property grammar.
///
/// Shorthand decomposition consumes each component into the first
/// property it validates against, so these checks must stay narrow:
/// loosening one grammar changes where ambiguous components land.
pub fn validates(property: &str, value: &str) -> bool {
    match property {
        "font-style" => matches!(value, "normal" | "italic" | "oblique" | "inherit"),
        "font-variant" => matches!(value, "normal" | "small-caps" | "inherit"),
        "font-weight" => matches!(
            value,
            "normal"
                | "bold"
                | "bolder"
                | "lighter"
                | "100"
                | "200"
                | "300"
                | "400"
                | "500"
                | "600"
                | "700"
                | "800"
                | "900"
                | "inherit"
        ),
        "font-size" => is_font_size(value),
        "line-height" => is_line_height(value),
        // the terminal property of the font shorthand; anything left over
        // is a family name
        "font-family" => !value.is_empty(),
        "list-style-type" => matches!(
            value,
            "disc"
                | "circle"
                | "square"
                | "decimal"
                | "decimal-leading-zero"
                | "lower-roman"
                | "upper-roman"
                | "lower-greek"
                | "lower-latin"
                | "upper-latin"
                | "lower-alpha"
                | "upper-alpha"
                | "armenian"
                | "georgian"
                | "none"
                | "inherit"
        ),
        "list-style-position" => matches!(value, "inside" | "outside" | "inherit"),
        "list-style-image" => {
            value == "none" || value == "inherit" || (value.starts_with("url(") && value.ends_with(')'))
        }
        _ => false,
    }
}

fn is_font_size(value: &str) -> bool {
    SIZE_NAMES.contains(&value)
        || matches!(value, "smaller" | "larger" | "inherit")
        || is_length(value)
}

fn is_line_height(value: &str) -> bool {
    matches!(value, "normal" | "inherit") || value.parse::<f32>().is_ok() || is_length(value)
}

fn is_length(value: &str) -> bool {
    crate::units::parse_number_unit(value).is_some()
}

// -----------------------------------------------------------------------
// Colors
// -----------------------------------------------------------------------

/// CSS Level 2 named colors (the HTML4 sixteen plus `orange`).
const NAMED_COLORS: [&str; 17] = [
    "aqua", "black", "blue", "fuchsia", "gray", "green", "lime", "maroon", "navy", "olive",
    "orange", "purple", "red", "silver", "teal", "white", "yellow",
];

/// Validate a value against the CSS Level 2 `<color>` grammar: a named
/// color, `#rgb`/`#rrggbb`, or an `rgb()` functional form with three
/// integer or three percentage arguments.
pub fn is_css2_color(value: &str) -> bool {
    let v = value.trim();
    if NAMED_COLORS.contains(&v.to_ascii_lowercase().as_str()) {
        return true;
    }
    if let Some(hex) = v.strip_prefix('#') {
        return (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(args) = v.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return false;
        }
        let all_int = parts.iter().all(|p| p.parse::<i32>().is_ok());
        let all_pct = parts
            .iter()
            .all(|p| p.strip_suffix('%').is_some_and(|n| n.parse::<f32>().is_ok()));
        return all_int || all_pct;
    }
    false
}
