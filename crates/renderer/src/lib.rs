//! Frame-loop orchestration: resource ownership, command recording, and the
//! renderer lifecycle.

mod recorder;
mod renderer;
mod resources;
mod spin;
mod ubo;

pub use recorder::CLEAR_COLOR;
pub use renderer::{MAX_DIMENSION, MIN_DIMENSION, Renderer, clamp_dimensions};
pub use spin::Spin;
pub use ubo::{TransformsUbo, projection_matrix, view_matrix};
