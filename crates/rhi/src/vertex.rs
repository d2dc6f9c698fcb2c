//! Vertex layout.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Position + color vertex, tightly packed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl ColorVertex {
    pub const fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// Single binding at slot 0, one vertex per instance step.
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription::default()
            .binding(0)
            .stride(std::mem::size_of::<Self>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)
    }

    /// Position at location 0, color at location 1.
    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(0),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Self, color) as u32),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ColorVertex>(), 24);
        assert_eq!(std::mem::offset_of!(ColorVertex, position), 0);
        assert_eq!(std::mem::offset_of!(ColorVertex, color), 12);
    }

    #[test]
    fn test_binding_description() {
        let binding = ColorVertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 24);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }

    #[test]
    fn test_attribute_offsets_match_layout() {
        let attributes = ColorVertex::attribute_descriptions();
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[1].offset, 12);
        for attribute in &attributes {
            assert_eq!(attribute.format, vk::Format::R32G32B32_SFLOAT);
        }
    }

    #[test]
    fn test_vertex_byte_view() {
        let vertex = ColorVertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 24);

        let restored: &ColorVertex = bytemuck::from_bytes(bytes);
        assert_eq!(*restored, vertex);
    }
}
