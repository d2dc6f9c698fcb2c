//! winit window wrapper and Vulkan surface.

use std::sync::Arc;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, info};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window as WinitWindow;

use triangle_core::{Error, Result};

/// Vulkan surface with RAII cleanup.
///
/// Must be destroyed before the instance it was created from.
pub struct Surface {
    handle: vk::SurfaceKHR,
    loader: ash::khr::surface::Instance,
}

impl Surface {
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    #[inline]
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
        debug!("Surface destroyed");
    }
}

/// Application window.
///
/// Tracks the last reported framebuffer size so the renderer can query it
/// without touching winit.
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
}

impl Window {
    /// Creates a visible window with the given logical size and title.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attributes = WinitWindow::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height));

        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::Window(format!("Failed to create window: {e}")))?;

        info!("Window created: {}x{} \"{}\"", width, height, title);

        Ok(Self {
            window: Arc::new(window),
            width,
            height,
        })
    }

    #[inline]
    pub fn inner(&self) -> &WinitWindow {
        &self.window
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Records a new framebuffer size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Creates a Vulkan surface for this window.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("No display handle: {e}")))?;
        let window_handle = self
            .window
            .window_handle()
            .map_err(|e| Error::Window(format!("No window handle: {e}")))?;

        let handle = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| Error::Vulkan(format!("Failed to create surface: {e}")))?
        };

        let loader = ash::khr::surface::Instance::new(entry, instance);

        debug!("Surface created");

        Ok(Surface { handle, loader })
    }
}
