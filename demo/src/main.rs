use std::f64::consts::PI;

use brush_plotter::{
    BoundingBox, Color, Contour, DrawingNode, Group, PaintWell, PaletteColor, PlotJob, PlotSettings, Position, Rgba,
    Segment, Shape, ToolType, Vector,
};
use indexmap::IndexMap;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

const OUTPUT_DIR: &str = "demo-output";
const BASE_NAME: &str = "demo";
const SEED: u64 = 42;

const RED: Rgba = Rgba::opaque(200, 30, 30);
const BLUE: Rgba = Rgba::opaque(30, 60, 200);
const GREEN: Rgba = Rgba::opaque(40, 160, 60);

// bézier approximation of a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

fn main() {
    env_logger::init();

    #[cfg(feature = "profile-with-puffin")]
    {
        start_puffin_server();
    }

    let job = match PlotJob::from_settings(settings()) {
        Ok(job) => job,
        Err(err) => {
            error!("Invalid demo settings: {err}");
            std::process::exit(1);
        }
    };

    let mut rng = StdRng::seed_from_u64(SEED);
    let output = job.run(&drawing(), &mut rng);

    match output.write_to_dir(OUTPUT_DIR, BASE_NAME) {
        Ok(files) => {
            for file in files {
                info!("Wrote {}", file.display());
            }
        }
        Err(err) => {
            error!("Failed to write demo output: {err}");
            std::process::exit(1);
        }
    }
}

fn settings() -> PlotSettings {
    let mut default_options = IndexMap::new();
    default_options.insert("speed_pendown".to_string(), "25".to_string());
    default_options.insert("pen_pos_down".to_string(), "40".to_string());

    let mut refill_option_overrides = IndexMap::new();
    refill_option_overrides.insert("pen_pos_down".to_string(), "20".to_string());

    let well = |y: f64| BoundingBox::from_origin_and_size(230.0, y, 30.0, 30.0);

    PlotSettings {
        tool_type: ToolType::DipAndStir,
        refill_distance: 80.0,
        palette: vec![
            PaletteColor::new("red", Color::from(RED)),
            PaletteColor::new("blue", Color::from(BLUE)),
            PaletteColor::new("green", Color::from(GREEN)),
        ],
        paint_wells: vec![
            PaintWell::new("red", well(10.0)),
            PaintWell::new("blue", well(50.0)),
            PaintWell::new("green", well(90.0)),
        ],
        wash_wells: vec![well(150.0), well(190.0)],
        default_options,
        refill_option_overrides,
        remove_duplicates: true,
        // the drawing is in pixels, 96 per inch
        display_scale: 96.0 / 25.4,
        border: 40.0,
        paper_offset: Vector::zeros(),
        ..PlotSettings::default()
    }
}

fn drawing() -> DrawingNode {
    Group::new(vec![
        Group::new(vec![
            Shape::new(vec![rectangle(20.0, 20.0, 500.0, 700.0)])
                .with_stroke(BLUE, 3.0)
                .into(),
            // drawn twice, the duplicate is removed
            Shape::new(vec![rectangle(20.0, 20.0, 500.0, 700.0)])
                .with_stroke(BLUE, 3.0)
                .into(),
        ])
        .with_layer("frame")
        .into(),
        Group::new(vec![
            Shape::new(vec![star(270.0, 300.0, 180.0, 70.0)])
                .with_stroke(RED, 2.0)
                .into(),
            Shape::new(vec![circle(270.0, 300.0, 60.0)])
                .with_stroke(GREEN, 2.0)
                .into(),
            Shape::new(vec![wave(60.0, 600.0, 420.0, 40.0)])
                .with_stroke(RED, 2.0)
                .into(),
        ])
        .with_layer("motif")
        .into(),
    ])
    .into()
}

fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Contour {
    Contour::from_points(
        &[
            Position::new(x, y),
            Position::new(x + width, y),
            Position::new(x + width, y + height),
            Position::new(x, y + height),
        ],
        true,
    )
}

fn star(center_x: f64, center_y: f64, outer_radius: f64, inner_radius: f64) -> Contour {
    let points = (0..10)
        .map(|index| {
            let radius = match index % 2 {
                0 => outer_radius,
                _ => inner_radius,
            };
            let angle = PI / 5.0 * index as f64 - PI / 2.0;
            Position::new(center_x + radius * angle.cos(), center_y + radius * angle.sin())
        })
        .collect::<Vec<_>>();

    Contour::from_points(&points, true)
}

fn circle(center_x: f64, center_y: f64, radius: f64) -> Contour {
    let handle = radius * KAPPA;
    let center = Position::new(center_x, center_y);
    let at = |dx: f64, dy: f64| center + Vector::new(dx, dy);

    Contour::closed(vec![
        Segment::cubic(at(radius, 0.0), at(radius, handle), at(handle, radius), at(0.0, radius)),
        Segment::cubic(at(0.0, radius), at(-handle, radius), at(-radius, handle), at(-radius, 0.0)),
        Segment::cubic(at(-radius, 0.0), at(-radius, -handle), at(-handle, -radius), at(0.0, -radius)),
        Segment::cubic(at(0.0, -radius), at(handle, -radius), at(radius, -handle), at(radius, 0.0)),
    ])
}

fn wave(x: f64, y: f64, width: f64, amplitude: f64) -> Contour {
    let quarter = width / 4.0;
    let segments = (0..4)
        .map(|index| {
            let start = x + quarter * index as f64;
            let direction = match index % 2 {
                0 => -1.0,
                _ => 1.0,
            };
            Segment::cubic(
                Position::new(start, y),
                Position::new(start + quarter / 3.0, y + amplitude * direction),
                Position::new(start + quarter * 2.0 / 3.0, y + amplitude * direction),
                Position::new(start + quarter, y),
            )
        })
        .collect();

    Contour::open(segments)
}

#[cfg(feature = "profile-with-puffin")]
fn start_puffin_server() {
    profiling::puffin::set_scopes_on(true);

    match puffin_http::Server::new("127.0.0.1:8585") {
        Ok(puffin_server) => {
            info!("Run:  cargo install puffin_viewer && puffin_viewer --url 127.0.0.1:8585");

            // dropping the server stops it
            #[allow(clippy::mem_forget)]
            std::mem::forget(puffin_server);
        }
        Err(err) => {
            error!("Failed to start puffin server: {err}");
        }
    }
}
