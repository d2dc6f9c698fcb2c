//! RHI error types.

use thiserror::Error;

/// Errors surfaced by the Vulkan layer.
#[derive(Error, Debug)]
pub enum RhiError {
    /// A raw Vulkan call failed.
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// The Vulkan loader could not be initialized.
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// GPU memory allocation failed.
    #[error("Allocation error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    /// No physical device satisfies the renderer's requirements.
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// Shader module loading or validation failed.
    #[error("Shader error: {0}")]
    ShaderError(String),

    /// Surface queries failed or the surface is unusable.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Swapchain creation or recreation failed.
    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    /// Pipeline construction failed.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// A handle or argument was invalid for the requested operation.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
}

/// Result alias for the RHI layer.
pub type RhiResult<T> = std::result::Result<T, RhiError>;
