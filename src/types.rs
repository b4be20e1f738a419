use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToolType {
    /// Pen, color and weight changes are manual; optional periodic refill pauses.
    #[default]
    Pen,
    /// Brush, dipped in the nearest paint well before every stroke.
    Dip,
    /// Brush, stirred in the nearest paint well before every stroke.
    DipAndStir,
}

impl ToolType {
    pub fn requires_dipping(&self) -> bool {
        matches!(self, ToolType::Dip | ToolType::DipAndStir)
    }

    pub fn requires_stir(&self) -> bool {
        matches!(self, ToolType::DipAndStir)
    }
}

/// How a group's layer attribute applies to the shapes visited after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerInheritance {
    /// The most recently seen layer attribute stays current, in document order, until another group overrides it.
    /// A later sibling without a layer attribute inherits it, even after the tagged group has been left.
    #[default]
    Persistent,
    /// A group's layer attribute applies to its own subtree only.
    Scoped,
}

/// Stroke width, a secondary grouping key.
///
/// Compared by bit pattern so it can key a map; `-0.0` is normalized to `0.0`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeWeight(f64);

impl StrokeWeight {
    pub fn new(value: f64) -> Self {
        // `-0.0 + 0.0` is `0.0`
        Self(value + 0.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for StrokeWeight {
    fn default() -> Self {
        Self(1.0)
    }
}

impl PartialEq for StrokeWeight {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StrokeWeight {}

impl Hash for StrokeWeight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for StrokeWeight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for StrokeWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
