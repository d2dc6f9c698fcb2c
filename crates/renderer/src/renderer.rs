//! Renderer lifecycle and frame loop.

use std::mem::ManuallyDrop;

use ash::vk;
use glam::Mat4;
use std::sync::Arc;
use tracing::{debug, info, warn};

use triangle_core::FramePacer;
use triangle_platform::{Surface, Window};
use triangle_rhi::device::Device;
use triangle_rhi::instance::Instance;
use triangle_rhi::physical_device::select_physical_device;
use triangle_rhi::swapchain::Swapchain;
use triangle_rhi::sync::SyncFence;
use triangle_rhi::{RhiError, RhiResult};

use crate::recorder::CommandRecorder;
use crate::resources::PipelineResources;
use crate::spin::Spin;
use crate::ubo::{TransformsUbo, projection_matrix, view_matrix};

/// Smallest framebuffer dimension the renderer will track.
pub const MIN_DIMENSION: u32 = 1;
/// Largest framebuffer dimension the renderer will track.
pub const MAX_DIMENSION: u32 = 65535;

/// Clamps reported window dimensions into the supported range.
///
/// Minimized windows report zero; both axes are forced to at least 1 so the
/// swapchain and the projection aspect stay valid.
pub fn clamp_dimensions(width: u32, height: u32) -> (u32, u32) {
    (
        width.clamp(MIN_DIMENSION, MAX_DIMENSION),
        height.clamp(MIN_DIMENSION, MAX_DIMENSION),
    )
}

/// Owns the whole GPU stack and drives one frame at a time.
///
/// The renderer is single-buffered by design: every `render_frame` ends with
/// a timeline-fence drain, so no GPU work ever spans two frames. Teardown
/// runs in reverse acquisition order via `ManuallyDrop`.
pub struct Renderer {
    instance: ManuallyDrop<Instance>,
    device: ManuallyDrop<Arc<Device>>,
    surface: ManuallyDrop<Surface>,
    swapchain: ManuallyDrop<Swapchain>,
    resources: ManuallyDrop<PipelineResources>,
    recorder: ManuallyDrop<CommandRecorder>,
    fence: ManuallyDrop<SyncFence>,

    acquire_semaphore: vk::Semaphore,
    present_semaphores: Vec<vk::Semaphore>,

    current_index: u32,
    width: u32,
    height: u32,

    projection: Mat4,
    model: Mat4,
    view: Mat4,
    spin: Spin,
    pacer: FramePacer,
}

impl Renderer {
    /// Brings up the full stack against an existing window.
    ///
    /// Each component is built in dependency order; a failure propagates out
    /// and everything constructed so far is released by RAII.
    pub fn new(window: &Window) -> RhiResult<Self> {
        let (width, height) = clamp_dimensions(window.width(), window.height());

        let instance = Instance::new(cfg!(debug_assertions))?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let physical = select_physical_device(&instance, surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical)?;

        let mut fence = SyncFence::new(device.clone())?;

        let swapchain = Swapchain::new(
            &instance,
            device.clone(),
            surface.handle(),
            surface.loader(),
            width,
            height,
        )?;

        let acquire_semaphore = create_semaphore(&device)?;
        let present_semaphores = create_semaphores(&device, swapchain.image_count())?;

        let resources = PipelineResources::new(device.clone(), swapchain.format())?;
        let recorder = CommandRecorder::new(device.clone())?;

        let projection = projection_matrix(width, height);
        let view = view_matrix();
        let model = Mat4::IDENTITY;
        resources.write_transforms(&TransformsUbo::new(projection, model, view))?;

        // Confirm the static uploads before the first frame.
        let value = fence.signal_and_advance()?;
        fence.wait_until(value)?;

        info!("Renderer initialized at {}x{}", width, height);

        Ok(Self {
            instance: ManuallyDrop::new(instance),
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            swapchain: ManuallyDrop::new(swapchain),
            resources: ManuallyDrop::new(resources),
            recorder: ManuallyDrop::new(recorder),
            fence: ManuallyDrop::new(fence),
            acquire_semaphore,
            present_semaphores,
            current_index: 0,
            width,
            height,
            projection,
            model,
            view,
            spin: Spin::new(),
            pacer: FramePacer::new(),
        })
    }

    /// Renders one frame, or returns immediately when the pacer skips it.
    pub fn render_frame(&mut self) -> RhiResult<()> {
        let Some(elapsed) = self.pacer.try_begin_frame() else {
            return Ok(());
        };

        let step = self.spin.advance(elapsed.as_secs_f32() * 1000.0);
        self.model = self.model * Mat4::from_rotation_y(step);
        self.resources
            .write_transforms(&TransformsUbo::new(self.projection, self.model, self.view))?;

        let image_index = match self.swapchain.acquire_next_image(self.acquire_semaphore) {
            Ok((index, _suboptimal)) => index,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date at acquire, recreating");
                self.recreate_swapchain()?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        self.current_index = image_index;

        self.recorder.record(
            &self.resources,
            self.swapchain.image(image_index as usize),
            self.swapchain.image_view(image_index as usize),
            self.swapchain.extent(),
        )?;

        let wait_semaphores = [self.acquire_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.recorder.handle()];
        let signal_semaphores = [self.present_semaphores[image_index as usize]];

        let submit = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe { self.device.submit_graphics(&[submit], vk::Fence::null())? };

        let present_result = self.swapchain.present(
            self.device.present_queue(),
            image_index,
            self.present_semaphores[image_index as usize],
        );

        // Drain before looking at the present result: nothing stays in
        // flight across frames.
        let value = self.fence.signal_and_advance()?;
        self.fence.wait_until(value)?;

        match present_result {
            Ok(false) => {}
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain stale after present, recreating");
                self.recreate_swapchain()?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Handles a framebuffer size change.
    ///
    /// Dimensions are clamped, the projection is recomputed, and the
    /// swapchain is rebuilt after a drain. The rotation state and model
    /// matrix survive untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> RhiResult<()> {
        let (width, height) = clamp_dimensions(width, height);
        info!("Resizing renderer to {}x{}", width, height);

        self.width = width;
        self.height = height;
        self.projection = projection_matrix(width, height);

        self.recreate_swapchain()
    }

    fn recreate_swapchain(&mut self) -> RhiResult<()> {
        self.drain()?;
        // The drain settles the graphics queue only; the in-flight present
        // and its semaphore wait run on the present queue. Settle the whole
        // device before touching anything presentation may still reference.
        self.device.wait_idle()?;

        self.swapchain.recreate(
            &self.instance,
            self.surface.handle(),
            self.surface.loader(),
            self.width,
            self.height,
        )?;

        // The present engine may still hold references to the old
        // semaphores past the drain; start with fresh ones.
        self.destroy_sync_semaphores();
        self.acquire_semaphore = create_semaphore(&self.device)?;
        self.present_semaphores = create_semaphores(&self.device, self.swapchain.image_count())?;
        self.current_index = 0;

        Ok(())
    }

    /// Signals the next fence value and blocks until the GPU reaches it.
    fn drain(&mut self) -> RhiResult<()> {
        let value = self.fence.signal_and_advance()?;
        self.fence.wait_until(value)
    }

    fn destroy_sync_semaphores(&mut self) {
        unsafe {
            if self.acquire_semaphore != vk::Semaphore::null() {
                self.device
                    .handle()
                    .destroy_semaphore(self.acquire_semaphore, None);
                self.acquire_semaphore = vk::Semaphore::null();
            }
            for semaphore in self.present_semaphores.drain(..) {
                self.device.handle().destroy_semaphore(semaphore, None);
            }
        }
    }

    /// Index of the most recently acquired swapchain image.
    #[inline]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.drain() {
            warn!("Drain failed during renderer teardown: {:?}", e);
        }
        if let Err(e) = self.device.wait_idle() {
            warn!("wait_idle failed during renderer teardown: {:?}", e);
        }

        self.destroy_sync_semaphores();

        unsafe {
            ManuallyDrop::drop(&mut self.recorder);
            ManuallyDrop::drop(&mut self.resources);
            ManuallyDrop::drop(&mut self.fence);
            ManuallyDrop::drop(&mut self.swapchain);
            // Last Arc clone; the logical device is destroyed here, before
            // its parent instance goes away.
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer destroyed");
    }
}

fn create_semaphore(device: &Arc<Device>) -> RhiResult<vk::Semaphore> {
    let create_info = vk::SemaphoreCreateInfo::default();
    let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };
    Ok(semaphore)
}

fn create_semaphores(device: &Arc<Device>, count: usize) -> RhiResult<Vec<vk::Semaphore>> {
    (0..count).map(|_| create_semaphore(device)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_clamp_to_one() {
        assert_eq!(clamp_dimensions(0, 0), (1, 1));
    }

    #[test]
    fn test_oversized_dimensions_clamp_to_max() {
        assert_eq!(clamp_dimensions(100_000, 100_000), (65535, 65535));
    }

    #[test]
    fn test_in_range_dimensions_pass_through() {
        assert_eq!(clamp_dimensions(1280, 720), (1280, 720));
    }

    #[test]
    fn test_axes_clamp_independently() {
        assert_eq!(clamp_dimensions(0, 100_000), (1, 65535));
    }

    #[test]
    fn test_teardown_destroys_device_before_instance() {
        use std::sync::Mutex;

        struct Tracked {
            log: Arc<Mutex<Vec<&'static str>>>,
            name: &'static str,
        }
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.log.lock().unwrap().push(self.name);
            }
        }

        // Mirrors the Renderer layout: the device is shared as an Arc with
        // a component, and both ManuallyDrop slots are released inside the
        // owner's drop, device first, instance last.
        struct Stack {
            instance: ManuallyDrop<Tracked>,
            device: ManuallyDrop<Arc<Tracked>>,
            swapchain: ManuallyDrop<Arc<Tracked>>,
        }
        impl Drop for Stack {
            fn drop(&mut self) {
                unsafe {
                    ManuallyDrop::drop(&mut self.swapchain);
                    ManuallyDrop::drop(&mut self.device);
                    ManuallyDrop::drop(&mut self.instance);
                }
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let device = Arc::new(Tracked {
            log: log.clone(),
            name: "device",
        });
        let stack = Stack {
            instance: ManuallyDrop::new(Tracked {
                log: log.clone(),
                name: "instance",
            }),
            device: ManuallyDrop::new(device.clone()),
            swapchain: ManuallyDrop::new(device),
        };
        drop(stack);

        assert_eq!(*log.lock().unwrap(), vec!["device", "instance"]);
    }
}
