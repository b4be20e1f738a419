mod color;
mod config;
mod dedup;
mod drawing;
mod flatten;
mod geometry;
mod layer;
mod ordering;
mod pipeline;
mod program;
mod renderer;
pub mod spacial;
mod stroke;
mod types;
mod well;

pub use color::*;
pub use config::*;
pub use dedup::*;
pub use drawing::*;
pub use flatten::*;
pub use geometry::*;
pub use layer::*;
pub use ordering::*;
pub use pipeline::*;
pub use program::*;
pub use renderer::*;
pub use spacial::{Position, Size, Vector};
pub use stroke::*;
pub use types::*;
pub use well::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
