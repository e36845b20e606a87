//! Output device profiles.
//!
//! A profile describes the target device style resolution normalizes for:
//! its resolution, its base font size, the point values behind the seven
//! named CSS font sizes, and the page box in points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The seven named CSS font sizes, smallest first.
pub const SIZE_NAMES: [&str; 7] = [
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
];

/// Description of an output device, with every length in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Output resolution in dots per inch.
    pub dpi: f32,
    /// Base font size (the size of `medium` text).
    pub base_font_size: f32,
    /// Point values for the named font sizes (`xx-small` .. `xx-large`).
    pub font_names: BTreeMap<String, f32>,
    /// Ascending ladder of preferred font sizes, stepped through by
    /// `smaller`/`larger` values.
    pub size_ladder: Vec<f32>,
    /// Page width.
    pub page_width: f32,
    /// Page height.
    pub page_height: f32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        // 612x792pt is US letter.
        Self::with_ladder(96.0, 12.0, &[7.5, 9.0, 10.0, 12.0, 13.5, 17.0, 20.0], 612.0, 792.0)
    }
}

impl DeviceProfile {
    /// Build a profile whose named sizes map onto the given ladder, in
    /// order. Ladders shorter than seven entries leave the remaining
    /// names unmapped.
    pub fn with_ladder(
        dpi: f32,
        base_font_size: f32,
        ladder: &[f32],
        page_width: f32,
        page_height: f32,
    ) -> Self {
        let font_names = SIZE_NAMES
            .iter()
            .zip(ladder)
            .map(|(name, size)| ((*name).to_string(), *size))
            .collect();
        DeviceProfile {
            dpi,
            base_font_size,
            font_names,
            size_ladder: ladder.to_vec(),
            page_width,
            page_height,
        }
    }

    /// Load a profile from its JSON representation. Missing fields take
    /// the default profile's values.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Point value of a named font size, if the profile maps it.
    pub fn named_size(&self, name: &str) -> Option<f32> {
        self.font_names.get(name).copied()
    }
}
