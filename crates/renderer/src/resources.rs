//! Static geometry, uniform storage, and the graphics pipeline.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use glam::Vec3;
use tracing::info;

use triangle_rhi::buffer::{Buffer, BufferUsage};
use triangle_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, uniform_buffer_binding, write_uniform_buffer,
};
use triangle_rhi::device::Device;
use triangle_rhi::pipeline::{
    CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout, PrimitiveTopology,
};
use triangle_rhi::shader::{Shader, ShaderStage};
use triangle_rhi::vertex::ColorVertex;
use triangle_rhi::{RhiError, RhiResult};

use crate::ubo::TransformsUbo;

/// One red, one green, one blue corner.
pub const TRIANGLE_VERTICES: [ColorVertex; 3] = [
    ColorVertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
    ColorVertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    ColorVertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

const VERTEX_SHADER_PATH: &str = "shaders/spirv/triangle.vert.spv";
const FRAGMENT_SHADER_PATH: &str = "shaders/spirv/triangle.frag.spv";

/// Everything the draw needs besides the swapchain: descriptors, pipeline,
/// and the three buffers.
///
/// The uniform buffer is private; frames update it through
/// [`write_transforms`](Self::write_transforms) only.
pub struct PipelineResources {
    // Layout and pool outlive the set allocated from them.
    _descriptor_set_layout: DescriptorSetLayout,
    _descriptor_pool: DescriptorPool,
    descriptor_set: vk::DescriptorSet,
    pipeline_layout: PipelineLayout,
    pipeline: Pipeline,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    uniform_buffer: Buffer,
}

impl PipelineResources {
    /// Uploads the triangle, creates the uniform buffer and descriptor set,
    /// and builds the pipeline against `color_format`.
    pub fn new(device: Arc<Device>, color_format: vk::Format) -> RhiResult<Self> {
        let vertex_buffer = Buffer::new_with_data(
            device.clone(),
            BufferUsage::Vertex,
            bytemuck::cast_slice(&TRIANGLE_VERTICES),
        )?;
        let index_buffer = Buffer::new_with_data(
            device.clone(),
            BufferUsage::Index,
            bytemuck::cast_slice(&TRIANGLE_INDICES),
        )?;
        let uniform_buffer = Buffer::new(
            device.clone(),
            BufferUsage::Uniform,
            TransformsUbo::SIZE as vk::DeviceSize,
        )?;

        let bindings = [uniform_buffer_binding(0, vk::ShaderStageFlags::VERTEX)];
        let descriptor_set_layout = DescriptorSetLayout::new(device.clone(), &bindings)?;

        let pool_sizes = [vk::DescriptorPoolSize::default()
            .ty(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)];
        let descriptor_pool = DescriptorPool::new(device.clone(), 1, &pool_sizes)?;

        let layouts = [descriptor_set_layout.handle()];
        let descriptor_set = descriptor_pool
            .allocate(&layouts)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RhiError::InvalidHandle("Descriptor pool returned no set".to_string())
            })?;

        write_uniform_buffer(&device, descriptor_set, 0, &uniform_buffer);

        let pipeline_layout = PipelineLayout::new(device.clone(), &layouts)?;

        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(VERTEX_SHADER_PATH),
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(FRAGMENT_SHADER_PATH),
            ShaderStage::Fragment,
            "main",
        )?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(ColorVertex::binding_description())
            .vertex_attributes(&ColorVertex::attribute_descriptions())
            .topology(PrimitiveTopology::TriangleList)
            .cull_mode(CullMode::None)
            .front_face(FrontFace::CounterClockwise)
            .color_attachment_format(color_format)
            .build(device.clone(), &pipeline_layout)?;

        // Shader modules are baked into the pipeline and dropped here.

        info!(
            "Pipeline resources ready ({} vertices, {} indices)",
            TRIANGLE_VERTICES.len(),
            TRIANGLE_INDICES.len()
        );

        Ok(Self {
            _descriptor_set_layout: descriptor_set_layout,
            _descriptor_pool: descriptor_pool,
            descriptor_set,
            pipeline_layout,
            pipeline,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
        })
    }

    /// Writes a full transform snapshot into the uniform buffer.
    pub fn write_transforms(&self, transforms: &TransformsUbo) -> RhiResult<()> {
        self.uniform_buffer.write_data(0, bytemuck::bytes_of(transforms))
    }

    #[inline]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[inline]
    pub fn pipeline_layout(&self) -> &PipelineLayout {
        &self.pipeline_layout
    }

    #[inline]
    pub fn descriptor_set(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &Buffer {
        &self.vertex_buffer
    }

    #[inline]
    pub fn index_buffer(&self) -> &Buffer {
        &self.index_buffer
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        TRIANGLE_INDICES.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_has_three_corners() {
        assert_eq!(TRIANGLE_VERTICES.len(), 3);
        assert_eq!(TRIANGLE_INDICES, [0, 1, 2]);
    }

    #[test]
    fn test_corners_carry_primary_colors() {
        assert_eq!(TRIANGLE_VERTICES[0].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(TRIANGLE_VERTICES[1].color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(TRIANGLE_VERTICES[2].color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_geometry_lies_in_xy_plane() {
        for vertex in &TRIANGLE_VERTICES {
            assert_eq!(vertex.position.z, 0.0);
        }
    }

    #[test]
    fn test_vertex_upload_size() {
        let bytes: &[u8] = bytemuck::cast_slice(&TRIANGLE_VERTICES);
        assert_eq!(bytes.len(), 3 * 24);
    }
}
