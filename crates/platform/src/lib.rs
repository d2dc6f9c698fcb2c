//! OS window and Vulkan surface handling.

mod window;

pub use window::{Surface, Window};
