use std::fmt;

/// An opaque RGB color, the stroke color used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
        }
    }

    /// `#rrggbb`, as used in SVG attributes.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A stroke color as supplied by the drawing, possibly translucent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a,
        }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// Alpha is dropped, paint is either on the brush or it isn't.
impl From<Rgba> for Color {
    fn from(value: Rgba) -> Self {
        Color::rgb(value.r, value.g, value.b)
    }
}

impl From<Color> for Rgba {
    fn from(value: Color) -> Self {
        Rgba::opaque(value.r, value.g, value.b)
    }
}

/// A named color that can be loaded into the plotter, e.g. a paint in a well.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteColor {
    pub name: String,
    pub color: Color,
}

impl PaletteColor {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Rgba::new(255, 0, 0, 0.25), Color::rgb(255, 0, 0))]
    #[case(Rgba::new(255, 0, 0, 1.0), Color::rgb(255, 0, 0))]
    #[case(Rgba::new(1, 2, 3, 0.0), Color::rgb(1, 2, 3))]
    fn test_alpha_is_normalized_away(#[case] input: Rgba, #[case] expected: Color) {
        assert_eq!(Color::from(input), expected);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(255, 16, 0).to_hex(), "#ff1000");
        assert_eq!(Color::default().to_string(), "#000000");
    }
}
