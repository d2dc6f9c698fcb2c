//! Swapchain and per-image color views.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::instance::Instance;

/// Number of backbuffers requested from the driver.
pub const BACKBUFFER_COUNT: u32 = 2;

/// Presentation runs vsynced. FIFO is the only mode Vulkan guarantees to
/// exist, so there is no preference ladder here.
const PRESENT_MODE: vk::PresentModeKHR = vk::PresentModeKHR::FIFO;

/// Surface capabilities, formats, and present modes for a device/surface pair.
pub struct SwapchainSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    pub fn query(
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
    ) -> RhiResult<Self> {
        let capabilities = unsafe {
            surface_loader.get_physical_device_surface_capabilities(device, surface)?
        };
        let formats =
            unsafe { surface_loader.get_physical_device_surface_formats(device, surface)? };
        let present_modes = unsafe {
            surface_loader.get_physical_device_surface_present_modes(device, surface)?
        };

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Swapchain with its images and color views.
pub struct Swapchain {
    device: Arc<Device>,
    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::Format,
    extent: vk::Extent2D,
}

impl Swapchain {
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        width: u32,
        height: u32,
    ) -> RhiResult<Self> {
        Self::create_internal(
            instance,
            device,
            surface,
            surface_loader,
            width,
            height,
            vk::SwapchainKHR::null(),
        )
    }

    /// Rebuilds the swapchain in place at a new size.
    ///
    /// The caller must have drained the GPU; the old chain is passed as
    /// `old_swapchain` and destroyed together with its views once the
    /// replacement exists.
    pub fn recreate(
        &mut self,
        instance: &Instance,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        width: u32,
        height: u32,
    ) -> RhiResult<()> {
        let mut replacement = Self::create_internal(
            instance,
            self.device.clone(),
            surface,
            surface_loader,
            width,
            height,
            self.swapchain,
        )?;

        std::mem::swap(self, &mut replacement);

        // `replacement` now holds the retired chain; its Drop destroys the
        // old views and handle.
        drop(replacement);

        info!(
            "Swapchain recreated: {}x{} ({} images)",
            self.extent.width,
            self.extent.height,
            self.images.len()
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn create_internal(
        instance: &Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        width: u32,
        height: u32,
        old_swapchain: vk::SwapchainKHR,
    ) -> RhiResult<Self> {
        let support =
            SwapchainSupportDetails::query(device.physical_device(), surface, surface_loader)?;
        if !support.is_adequate() {
            return Err(RhiError::SwapchainError(
                "Surface reports no formats or present modes".to_string(),
            ));
        }

        let surface_format = choose_surface_format(&support.formats);
        let extent = choose_extent(&support.capabilities, width, height);
        let image_count = determine_image_count(&support.capabilities, BACKBUFFER_COUNT);

        let families = device.queue_families();
        let family_indices = families.unique_families();
        let (sharing_mode, queue_family_indices): (vk::SharingMode, &[u32]) =
            if family_indices.len() > 1 {
                (vk::SharingMode::CONCURRENT, &family_indices)
            } else {
                (vk::SharingMode::EXCLUSIVE, &[])
            };

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(queue_family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(PRESENT_MODE)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let loader = ash::khr::swapchain::Device::new(instance.handle(), device.handle());
        let swapchain = unsafe { loader.create_swapchain(&create_info, None)? };
        let images = unsafe { loader.get_swapchain_images(swapchain)? };
        let image_views = create_image_views(&device, &images, surface_format.format)?;

        debug!(
            "Swapchain created: {}x{}, {:?}, {} images",
            extent.width,
            extent.height,
            surface_format.format,
            images.len()
        );

        Ok(Self {
            device,
            loader,
            swapchain,
            images,
            image_views,
            format: surface_format.format,
            extent,
        })
    }

    /// Acquires the next image, signaling `semaphore` when it is ready.
    ///
    /// Returns the image index and whether the chain is suboptimal. An
    /// `ERROR_OUT_OF_DATE_KHR` is returned to the caller for recreation.
    pub fn acquire_next_image(
        &self,
        semaphore: vk::Semaphore,
    ) -> Result<(u32, bool), vk::Result> {
        unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, semaphore, vk::Fence::null())
        }
    }

    /// Presents `image_index`, waiting on `wait_semaphore`.
    ///
    /// Returns true when the chain is suboptimal.
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> Result<bool, vk::Result> {
        let wait_semaphores = [wait_semaphore];
        let swapchains = [self.swapchain];
        let indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&indices);

        unsafe { self.loader.queue_present(queue, &present_info) }
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn image(&self, index: usize) -> vk::Image {
        self.images[index]
    }

    #[inline]
    pub fn image_view(&self, index: usize) -> vk::ImageView {
        self.image_views[index]
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for view in self.image_views.drain(..) {
                self.device.handle().destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
            }
        }
        debug!("Swapchain destroyed");
    }
}

/// Picks `R8G8B8A8_UNORM` with the standard colorspace when available,
/// otherwise the first reported format.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::R8G8B8A8_UNORM
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or_else(|| formats[0])
}

/// Resolves the swapchain extent from the surface capabilities.
///
/// When the surface pins a current extent, that wins; otherwise the
/// requested size is clamped into the supported range.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    width: u32,
    height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// Clamps the desired backbuffer count into the capability bounds.
/// A `max_image_count` of 0 means unbounded.
pub fn determine_image_count(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    desired: u32,
) -> u32 {
    let mut count = desired.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count = count.min(capabilities.max_image_count);
    }
    count
}

fn create_image_views(
    device: &Arc<Device>,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    images
        .iter()
        .map(|&image| {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping::default())
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            let view = unsafe { device.handle().create_image_view(&create_info, None)? };
            Ok(view)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn test_backbuffer_count_is_two() {
        assert_eq!(BACKBUFFER_COUNT, 2);
    }

    #[test]
    fn test_preferred_format_is_picked() {
        let formats = [
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn test_format_falls_back_to_first() {
        let formats = [
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn test_extent_uses_pinned_current_extent() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
            ..Default::default()
        };
        let extent = choose_extent(&capabilities, 1280, 720);
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn test_extent_clamps_requested_size() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 100,
                height: 100,
            },
            max_image_extent: vk::Extent2D {
                width: 2000,
                height: 2000,
            },
            ..Default::default()
        };

        let extent = choose_extent(&capabilities, 4000, 50);
        assert_eq!(extent.width, 2000);
        assert_eq!(extent.height, 100);
    }

    #[test]
    fn test_image_count_respects_minimum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities, BACKBUFFER_COUNT), 3);
    }

    #[test]
    fn test_image_count_respects_maximum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 1,
            max_image_count: 1,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capabilities, BACKBUFFER_COUNT), 1);
    }

    #[test]
    fn test_image_count_unbounded_maximum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(
            determine_image_count(&capabilities, BACKBUFFER_COUNT),
            BACKBUFFER_COUNT
        );
    }
}
