//! Shared foundations: error taxonomy, logging setup, frame timing.

mod error;
mod logging;
mod pacing;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use pacing::{FramePacer, TARGET_FRAME_INTERVAL};
