//! Length unit conversion.
//!
//! Every computed length in the engine is expressed in points. This
//! module converts raw CSS length expressions into points given the
//! context they resolve against: a base length for percentages, a font
//! size for `em`-family units, and the device resolution for pixels.

use crate::values::Value;

/// Recognized length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Em,
    Ex,
    En,
    Px,
    Mm,
    Cm,
    In,
    Pt,
    Pc,
}

/// Split `"12.5pt"` into `(12.5, Unit::Pt)`. Whitespace between number
/// and unit is tolerated; anything else returns `None`.
pub(crate) fn parse_number_unit(s: &str) -> Option<(f32, Unit)> {
    let s = s.trim();
    let unit_start = s.find(|c: char| c.is_ascii_alphabetic() || c == '%')?;
    let (number, unit) = s.split_at(unit_start);
    let unit = match unit {
        "%" => Unit::Percent,
        "em" => Unit::Em,
        "ex" => Unit::Ex,
        "en" => Unit::En,
        "px" => Unit::Px,
        "mm" => Unit::Mm,
        "cm" => Unit::Cm,
        "in" => Unit::In,
        "pt" => Unit::Pt,
        "pc" => Unit::Pc,
        _ => return None,
    };
    let number = number.trim_end();
    if number.is_empty() {
        return None;
    }
    number.parse::<f32>().ok().map(|n| (n, unit))
}

/// Convert a style value into points.
///
/// * numbers pass through unchanged (already points);
/// * a bare numeric string is a device pixel count, scaled by `72 / dpi`;
/// * `<number><unit>` strings convert with `base` resolving percentages
///   and `font` resolving the `em` family;
/// * anything else is returned unchanged, so the caller can treat the
///   original text as "not a length".
///
/// `ex`/`en` approximate the x-height as half an em; no real x-height is
/// available. `mm` and `cm` use the factors 0.04 and 0.40, which are not
/// metrically exact; downstream output depends on the historical values,
/// so they stay.
pub fn convert(value: &Value, base: f32, font: f32, dpi: f32) -> Value {
    let text = match value {
        Value::Num(n) => return Value::Num(*n),
        Value::Text(t) => t,
    };
    if let Ok(n) = text.trim().parse::<f32>() {
        return Value::Num(n * 72.0 / dpi);
    }
    match parse_number_unit(text) {
        Some((n, unit)) => Value::Num(match unit {
            Unit::Percent => n / 100.0 * base,
            Unit::Px => n * 72.0 / dpi,
            Unit::In => n * 72.0,
            Unit::Pt => n,
            Unit::Em => n * font,
            Unit::Ex | Unit::En => n * font * 0.5,
            Unit::Pc => n * 12.0,
            Unit::Mm => n * 0.04,
            Unit::Cm => n * 0.40,
        }),
        None => value.clone(),
    }
}

/// Convert a raw string, returning `None` when it is not a length.
pub fn convert_str(text: &str, base: f32, font: f32, dpi: f32) -> Option<f32> {
    match convert(&Value::text(text), base, font, dpi) {
        Value::Num(n) => Some(n),
        Value::Text(_) => None,
    }
}
