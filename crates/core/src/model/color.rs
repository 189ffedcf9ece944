//! Color spaces and color values carried by the graphics state.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Represents a PDF color space.
///
/// Only the name and component count are interpreted; conversions are left
/// to the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpace {
    /// Name of the color space (e.g., "DeviceRGB")
    pub name: SmolStr,
    /// Number of color components
    pub ncomponents: usize,
}

impl ColorSpace {
    /// Create a new color space.
    pub fn new(name: &str, ncomponents: usize) -> Self {
        Self {
            name: SmolStr::new(name),
            ncomponents,
        }
    }

    pub fn device_gray() -> Self {
        Self::new("DeviceGray", 1)
    }

    pub fn device_rgb() -> Self {
        Self::new("DeviceRGB", 3)
    }

    pub fn device_cmyk() -> Self {
        Self::new("DeviceCMYK", 4)
    }

    /// Looks up a predefined (device or parameterless) color space by name.
    pub fn predefined(name: &str) -> Option<Self> {
        PREDEFINED_COLORSPACE.get(name).cloned()
    }

    pub fn is_pattern(&self) -> bool {
        self.name == "Pattern"
    }

    /// Color selected when this space becomes current (`CS`/`cs`).
    pub fn initial_color(&self) -> Color {
        match self.ncomponents {
            _ if self.is_pattern() => Color::Gray(0.0),
            3 => Color::Rgb(0.0, 0.0, 0.0),
            4 => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            _ => Color::Gray(0.0),
        }
    }

    /// Builds a color from `SC`/`SCN` operands interpreted in this space.
    pub fn color_from(&self, components: &[f64], pattern: Option<&str>) -> Color {
        if let Some(name) = pattern {
            return if components.is_empty() {
                Color::PatternColored(SmolStr::new(name))
            } else {
                Color::PatternUncolored(
                    Box::new(color_from_components(components)),
                    SmolStr::new(name),
                )
            };
        }
        if components.len() < self.ncomponents.min(4) {
            return self.initial_color();
        }
        match self.ncomponents {
            3 => Color::Rgb(components[0], components[1], components[2]),
            4 => Color::Cmyk(components[0], components[1], components[2], components[3]),
            _ => color_from_components(components),
        }
    }
}

impl Default for ColorSpace {
    fn default() -> Self {
        Self::device_gray()
    }
}

fn color_from_components(components: &[f64]) -> Color {
    match *components {
        [r, g, b] => Color::Rgb(r, g, b),
        [c, m, y, k] => Color::Cmyk(c, m, y, k),
        [g, ..] => Color::Gray(g),
        [] => Color::Gray(0.0),
    }
}

/// Predefined PDF color spaces.
pub static PREDEFINED_COLORSPACE: LazyLock<FxHashMap<&'static str, ColorSpace>> =
    LazyLock::new(|| {
        let entries = [
            ("DeviceGray", 1),
            ("CalRGB", 3),
            ("CalGray", 1),
            ("Lab", 3),
            ("DeviceRGB", 3),
            ("DeviceCMYK", 4),
            ("Separation", 1),
            ("Indexed", 1),
            ("Pattern", 1),
        ];

        let mut map = FxHashMap::default();
        for (name, n) in entries {
            map.insert(name, ColorSpace::new(name, n));
        }
        map
    });

/// Color value types used in the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Greyscale color (0.0 = black, 1.0 = white)
    Gray(f64),
    /// RGB color
    Rgb(f64, f64, f64),
    /// CMYK color
    Cmyk(f64, f64, f64, f64),
    /// Colored tiling pattern (PaintType=1) - just the pattern name
    PatternColored(SmolStr),
    /// Uncolored tiling pattern (PaintType=2) - base color + pattern name
    PatternUncolored(Box<Color>, SmolStr),
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray(0.0)
    }
}

impl Color {
    /// Numeric components (empty for colored patterns).
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Color::Gray(g) => vec![*g],
            Color::Rgb(r, g, b) => vec![*r, *g, *b],
            Color::Cmyk(c, m, y, k) => vec![*c, *m, *y, *k],
            Color::PatternColored(_) => vec![],
            Color::PatternUncolored(base, _) => base.to_vec(),
        }
    }

    /// Get the pattern name if this is a pattern color.
    pub fn pattern_name(&self) -> Option<&str> {
        match self {
            Color::PatternColored(name) => Some(name),
            Color::PatternUncolored(_, name) => Some(name),
            _ => None,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Color::PatternColored(_) | Color::PatternUncolored(_, _)
        )
    }
}
