//! Vulkan rendering hardware interface.
//!
//! Thin RAII wrappers over `ash`, covering exactly what a single-pipeline,
//! single-frame-in-flight renderer needs: instance and device bring-up,
//! a swapchain, host-visible buffers, one descriptor set, a graphics
//! pipeline with dynamic rendering, and timeline-semaphore synchronization.

mod error;

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};
