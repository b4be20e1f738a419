//! Paint and wash wells: stir path geometry, the plotter subroutines that visit them, and nearest well lookup.

use log::{debug, trace};

use crate::color::Color;
use crate::config::PlotConfig;
use crate::geometry::BoundingBox;
use crate::program::{Instruction, DEFAULT_OPTIONS_COMMAND, REFILL_OPTIONS_COMMAND};
use crate::Position;

/// A named, addressable plotter subroutine that visits a well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellCommand {
    /// Anchor for nearest well lookup, the center of the well.
    pub location: Position,
    pub name: String,
    pub body: Vec<Instruction>,
    pub rect: BoundingBox,
    pub stir_path: Vec<Position>,
}

/// The wells of a plot job, built once from the configuration and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Wells {
    paint: Vec<(Color, WellCommand)>,
    wash: Vec<WellCommand>,
}

impl Wells {
    pub fn from_config(config: &PlotConfig) -> Self {
        let settings = config.settings();
        let stir = config.requires_stir();
        let overrides = config.has_refill_overrides();

        let paint = settings
            .paint_wells
            .iter()
            .enumerate()
            .filter_map(|(index, well)| {
                // validated, every paint well names a palette color
                let entry = settings
                    .palette
                    .iter()
                    .find(|entry| entry.name == well.color)?;
                let name = format!("refill_{}_w{}", command_safe(&entry.name), index);
                let command = build_command(name, &well.rect, settings.well_padding, settings.stir_strokes, stir, overrides);
                Some((entry.color, command))
            })
            .collect::<Vec<_>>();

        let wash = settings
            .wash_wells
            .iter()
            .enumerate()
            .map(|(index, rect)| {
                build_command(
                    format!("wash_w{}", index),
                    rect,
                    settings.well_padding,
                    settings.stir_strokes,
                    stir,
                    overrides,
                )
            })
            .collect::<Vec<_>>();

        debug!("wells. paint: {}, wash: {}", paint.len(), wash.len());

        Self {
            paint,
            wash,
        }
    }

    /// Paint well commands, in configuration order.
    pub fn paint_commands(&self) -> impl Iterator<Item = (Color, &WellCommand)> {
        self.paint
            .iter()
            .map(|(color, command)| (*color, command))
    }

    pub fn wash_commands(&self) -> impl Iterator<Item = &WellCommand> {
        self.wash.iter()
    }

    /// Paint commands, then wash commands.
    pub fn commands(&self) -> impl Iterator<Item = &WellCommand> {
        self.paint
            .iter()
            .map(|(_, command)| command)
            .chain(self.wash.iter())
    }

    /// The paint well holding `color` nearest to `location`; on a tie the first configured well wins.
    pub fn nearest_paint(&self, color: Color, location: Position) -> Option<&WellCommand> {
        nearest(
            self.paint
                .iter()
                .filter(|(well_color, _)| *well_color == color)
                .map(|(_, command)| command),
            location,
        )
    }

    pub fn nearest_wash(&self, location: Position) -> Option<&WellCommand> {
        nearest(self.wash.iter(), location)
    }
}

fn nearest<'a>(commands: impl Iterator<Item = &'a WellCommand>, location: Position) -> Option<&'a WellCommand> {
    commands
        .map(|command| (nalgebra::distance(&command.location, &location), command))
        .fold(None, |best: Option<(f64, &WellCommand)>, (distance, command)| match best {
            Some((best_distance, _)) if best_distance <= distance => best,
            _ => Some((distance, command)),
        })
        .map(|(_, command)| command)
}

fn build_command(
    name: String,
    rect: &BoundingBox,
    padding: f64,
    strokes: u32,
    stir: bool,
    overrides: bool,
) -> WellCommand {
    let stir_path = stir_path(rect, padding, strokes, stir);
    trace!("well command. name: {}, stir_path: {:?}", name, stir_path);

    let mut body = vec![];
    if overrides {
        body.push(Instruction::Call(REFILL_OPTIONS_COMMAND.to_string()));
    }
    body.push(Instruction::DrawPath(stir_path.clone()));
    if overrides {
        body.push(Instruction::Call(DEFAULT_OPTIONS_COMMAND.to_string()));
    }

    WellCommand {
        location: rect.center(),
        name,
        body,
        rect: rect.clone(),
        stir_path,
    }
}

/// Back and forth motion inside the well, inset from its walls by `padding`.
///
/// `ceil(strokes / 2)` equidistant points are placed along the top and the bottom inset edges, the path zig-zags
/// between them, starting and ending at the center. Without stirring the path is a single dip at the center.
pub fn stir_path(rect: &BoundingBox, padding: f64, strokes: u32, stir: bool) -> Vec<Position> {
    let center = rect.center();
    if !stir {
        return vec![center];
    }

    let inset = rect.inset(padding);
    let count = strokes.div_ceil(2).max(1) as usize;

    let edge_x = |index: usize| match count {
        1 => inset.center().x,
        _ => inset.min.x + inset.width() * index as f64 / (count - 1) as f64,
    };

    let mut path = Vec::with_capacity(count * 2 + 2);
    path.push(center);
    for index in 0..count {
        let x = edge_x(index);
        path.push(Position::new(x, inset.min.y));
        path.push(Position::new(x, inset.max.y));
    }
    path.push(center);

    path
}

/// Command names are single tokens.
fn command_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c.is_alphanumeric() {
            true => c,
            false => '_',
        })
        .collect()
}
