//! Physical device selection.
//!
//! Adapters are enumerated in driver order; software (CPU) implementations
//! are skipped and the first adapter with complete queue families, swapchain
//! support, and a usable surface wins.

use std::ffi::CStr;

use ash::vk;
use tracing::{debug, info};

use crate::error::{RhiError, RhiResult};
use crate::instance::Instance;

/// Queue family indices required by the renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    /// True when every required family was found.
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Deduplicated family indices, for queue create infos.
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families: Vec<u32> = [self.graphics, self.present]
            .into_iter()
            .flatten()
            .collect();
        families.sort_unstable();
        families.dedup();
        families
    }
}

/// A selected physical device and its cached properties.
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    pub fn device_name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Picks the first adapter that can drive the given surface.
pub fn select_physical_device(
    instance: &Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<PhysicalDeviceInfo> {
    let devices = unsafe { instance.handle().enumerate_physical_devices()? };
    if devices.is_empty() {
        return Err(RhiError::NoSuitableGpu);
    }

    for device in devices {
        let properties = unsafe { instance.handle().get_physical_device_properties(device) };
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy();

        // Software rasterizers are skipped outright.
        if properties.device_type == vk::PhysicalDeviceType::CPU {
            debug!("Skipping software adapter: {}", name);
            continue;
        }

        let queue_families = find_queue_families(instance, device, surface, surface_loader)?;
        if !queue_families.is_complete() {
            debug!("Skipping {}: incomplete queue families", name);
            continue;
        }

        if !supports_swapchain(instance, device)? {
            debug!("Skipping {}: no swapchain extension", name);
            continue;
        }

        if !surface_is_adequate(device, surface, surface_loader)? {
            debug!("Skipping {}: surface has no formats or present modes", name);
            continue;
        }

        let memory_properties = unsafe {
            instance
                .handle()
                .get_physical_device_memory_properties(device)
        };

        info!("Selected GPU: {}", name);

        return Ok(PhysicalDeviceInfo {
            device,
            properties,
            memory_properties,
            queue_families,
        });
    }

    Err(RhiError::NoSuitableGpu)
}

/// Finds graphics and present queue families for the surface.
pub fn find_queue_families(
    instance: &Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<QueueFamilyIndices> {
    let families = unsafe {
        instance
            .handle()
            .get_physical_device_queue_family_properties(device)
    };

    let mut indices = QueueFamilyIndices::default();

    for (i, family) in families.iter().enumerate() {
        let index = i as u32;

        if indices.graphics.is_none()
            && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        {
            indices.graphics = Some(index);
        }

        if indices.present.is_none() {
            let supported = unsafe {
                surface_loader.get_physical_device_surface_support(device, index, surface)?
            };
            if supported {
                indices.present = Some(index);
            }
        }

        if indices.is_complete() {
            break;
        }
    }

    Ok(indices)
}

fn supports_swapchain(instance: &Instance, device: vk::PhysicalDevice) -> RhiResult<bool> {
    let extensions = unsafe {
        instance
            .handle()
            .enumerate_device_extension_properties(device)?
    };
    let wanted = ash::khr::swapchain::NAME.to_bytes_with_nul();

    Ok(extensions.iter().any(|ext| {
        let name = unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) };
        name.to_bytes_with_nul() == wanted
    }))
}

fn surface_is_adequate(
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<bool> {
    let formats =
        unsafe { surface_loader.get_physical_device_surface_formats(device, surface)? };
    let present_modes = unsafe {
        surface_loader.get_physical_device_surface_present_modes(device, surface)?
    };
    Ok(!formats.is_empty() && !present_modes.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_indices_are_incomplete() {
        let indices = QueueFamilyIndices::default();
        assert!(!indices.is_complete());
    }

    #[test]
    fn test_complete_indices() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: Some(1),
        };
        assert!(indices.is_complete());
    }

    #[test]
    fn test_graphics_only_is_incomplete() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: None,
        };
        assert!(!indices.is_complete());
    }

    #[test]
    fn test_unique_families_dedupes_shared_index() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: Some(0),
        };
        assert_eq!(indices.unique_families(), vec![0]);
    }

    #[test]
    fn test_unique_families_keeps_distinct_indices_sorted() {
        let indices = QueueFamilyIndices {
            graphics: Some(2),
            present: Some(0),
        };
        assert_eq!(indices.unique_families(), vec![0, 2]);
    }
}
