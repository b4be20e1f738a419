use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::color::{Color, PaletteColor};
use crate::flatten::Flattener;
use crate::geometry::{BoundingBox, PaperTransform};
use crate::types::{LayerInheritance, ToolType};
use crate::{Size, Vector};

/// Highest supported number of decimal places in the plot program.
const MAX_PRECISION: usize = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Palette color has no paint well. color: '{color}', tool_type: {tool_type:?}")]
    MissingPaintWell { color: String, tool_type: ToolType },
    #[error("Paint well refers to a color that is not in the palette. color: '{0}'")]
    UnknownPaletteColor(String),
    #[error("Refill option override has no default option to restore. key: '{0}'")]
    OverrideWithoutDefault(String),
    #[error("Invalid value. field: {field}, value: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// A physical paint reservoir, holding one palette color.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaintWell {
    /// Name of the palette color.
    pub color: String,
    pub rect: BoundingBox,
}

impl PaintWell {
    pub fn new(color: impl Into<String>, rect: BoundingBox) -> Self {
        Self {
            color: color.into(),
            rect,
        }
    }
}

/// The tunables of a plot job, unvalidated.
///
/// All lengths are in millimeters except `paper_offset` and `border`, which are in display units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotSettings {
    pub tool_type: ToolType,
    /// Maximum stroke length before the tool needs paint again, `f64::INFINITY` for never.
    pub refill_distance: f64,
    pub palette: Vec<PaletteColor>,
    pub paint_wells: Vec<PaintWell>,
    pub wash_wells: Vec<BoundingBox>,
    /// Distance kept from the well's walls while stirring.
    pub well_padding: f64,
    /// Number of strokes of the stirring motion.
    pub stir_strokes: u32,
    /// Option directives at the start of every program.
    pub default_options: IndexMap<String, String>,
    /// Options applied while in a well, each key must also be a default option so it can be restored.
    pub refill_option_overrides: IndexMap<String, String>,
    /// Maximum deviation of a flattened curve.
    pub flatness_tolerance: f64,
    /// Paths starting within this distance of the previous path's end are merged into it.
    pub join_tolerance: f64,
    pub remove_duplicates: bool,
    pub duplicate_tolerance: f64,
    /// Rotate closed paths to a random start point so seams don't line up between plots.
    ///
    /// Has no effect together with `remove_duplicates`, which splits every contour into open single segments.
    pub randomize_closed_starts: bool,
    pub layer_inheritance: LayerInheritance,
    pub default_layer: String,
    /// Display units per millimeter.
    pub display_scale: f64,
    pub paper_offset: Vector,
    pub border: f64,
    pub paper_size: Size,
    pub travel_envelope: Size,
    /// Decimal places of coordinates in the plot program.
    pub precision: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            tool_type: ToolType::Pen,
            refill_distance: f64::INFINITY,
            palette: vec![PaletteColor::new("black", Color::BLACK)],
            paint_wells: vec![],
            wash_wells: vec![],
            well_padding: 2.0,
            stir_strokes: 6,
            default_options: IndexMap::new(),
            refill_option_overrides: IndexMap::new(),
            flatness_tolerance: 0.1,
            join_tolerance: 0.1,
            remove_duplicates: false,
            duplicate_tolerance: 0.1,
            randomize_closed_starts: false,
            layer_inheritance: LayerInheritance::Persistent,
            default_layer: "default".to_string(),
            display_scale: 1.0,
            paper_offset: Vector::zeros(),
            border: 0.0,
            // A4, portrait
            paper_size: Size::new(210.0, 297.0),
            travel_envelope: Size::new(300.0, 400.0),
            precision: 3,
        }
    }
}

/// Validated, immutable plot job configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    settings: PlotSettings,
}

impl PlotConfig {
    pub fn new(settings: PlotSettings) -> Result<Self, ConfigError> {
        validate_values(&settings)?;
        validate_wells(&settings)?;
        validate_overrides(&settings)?;

        if settings.remove_duplicates && settings.randomize_closed_starts {
            warn!("closed start randomization has no effect with duplicate removal, contours become open segments");
        }

        debug!(
            "plot config validated. tool_type: {:?}, palette: {}, paint_wells: {}, wash_wells: {}",
            settings.tool_type,
            settings.palette.len(),
            settings.paint_wells.len(),
            settings.wash_wells.len()
        );

        Ok(Self {
            settings,
        })
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn requires_manual_refills(&self) -> bool {
        self.settings.refill_distance.is_finite()
    }

    pub fn requires_wash(&self) -> bool {
        !self.settings.wash_wells.is_empty() && self.requires_dipping()
    }

    pub fn requires_stir(&self) -> bool {
        self.settings.tool_type.requires_stir()
    }

    pub fn requires_dipping(&self) -> bool {
        self.settings.tool_type.requires_dipping()
    }

    pub fn has_refill_overrides(&self) -> bool {
        !self.settings.refill_option_overrides.is_empty()
    }

    pub fn paper_transform(&self) -> PaperTransform {
        PaperTransform::new(
            self.settings.paper_offset,
            self.settings.border,
            self.settings.display_scale,
        )
    }

    pub fn flattener(&self) -> Flattener {
        Flattener::new(self.settings.flatness_tolerance, self.settings.refill_distance)
    }

    /// Palette entry for `color`, the first one wins when several entries share an RGB value.
    pub fn palette_color(&self, color: Color) -> Option<&PaletteColor> {
        self.settings
            .palette
            .iter()
            .find(|entry| entry.color == color)
    }
}

impl TryFrom<PlotSettings> for PlotConfig {
    type Error = ConfigError;

    fn try_from(value: PlotSettings) -> Result<Self, Self::Error> {
        PlotConfig::new(value)
    }
}

fn invalid(field: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn validate_values(settings: &PlotSettings) -> Result<(), ConfigError> {
    if !(settings.display_scale.is_finite() && settings.display_scale > 0.0) {
        return Err(invalid("display_scale", settings.display_scale));
    }
    // infinity is valid, it disables refills
    if settings.refill_distance.is_nan() || settings.refill_distance <= 0.0 {
        return Err(invalid("refill_distance", settings.refill_distance));
    }
    if !(settings.flatness_tolerance.is_finite() && settings.flatness_tolerance > 0.0) {
        return Err(invalid("flatness_tolerance", settings.flatness_tolerance));
    }
    if !(settings.join_tolerance >= 0.0) {
        return Err(invalid("join_tolerance", settings.join_tolerance));
    }
    if !(settings.duplicate_tolerance >= 0.0) {
        return Err(invalid("duplicate_tolerance", settings.duplicate_tolerance));
    }
    if !(settings.well_padding >= 0.0) {
        return Err(invalid("well_padding", settings.well_padding));
    }
    if settings.tool_type.requires_stir() && settings.stir_strokes == 0 {
        return Err(invalid("stir_strokes", settings.stir_strokes));
    }
    if settings.precision > MAX_PRECISION {
        return Err(invalid("precision", settings.precision));
    }
    Ok(())
}

fn validate_wells(settings: &PlotSettings) -> Result<(), ConfigError> {
    if let Some(well) = settings
        .paint_wells
        .iter()
        .find(|well| {
            !settings
                .palette
                .iter()
                .any(|entry| entry.name == well.color)
        })
    {
        return Err(ConfigError::UnknownPaletteColor(well.color.clone()));
    }

    if settings.tool_type.requires_dipping() {
        if let Some(entry) = settings
            .palette
            .iter()
            .find(|entry| {
                !settings
                    .paint_wells
                    .iter()
                    .any(|well| well.color == entry.name)
            })
        {
            return Err(ConfigError::MissingPaintWell {
                color: entry.name.clone(),
                tool_type: settings.tool_type,
            });
        }
    }

    let envelope = BoundingBox::from_origin_and_size(
        0.0,
        0.0,
        settings.travel_envelope.x,
        settings.travel_envelope.y,
    );
    for rect in settings
        .paint_wells
        .iter()
        .map(|well| &well.rect)
        .chain(settings.wash_wells.iter())
        .filter(|rect| !envelope.contains(rect))
    {
        warn!(
            "Well outside of the travel envelope, the plotter cannot reach all of it. well: {:?}, envelope: {:?}",
            rect, envelope
        );
    }

    Ok(())
}

fn validate_overrides(settings: &PlotSettings) -> Result<(), ConfigError> {
    match settings
        .refill_option_overrides
        .keys()
        .find(|key| !settings.default_options.contains_key(*key))
    {
        Some(key) => Err(ConfigError::OverrideWithoutDefault(key.clone())),
        None => Ok(()),
    }
}
