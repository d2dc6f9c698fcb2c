//! Per-frame command recording.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use triangle_rhi::command::{CommandBuffer, CommandPool};
use triangle_rhi::device::Device;
use triangle_rhi::{RhiError, RhiResult};

use crate::resources::PipelineResources;

/// Background color for every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Records the fixed draw sequence into a single primary command buffer.
///
/// With a full GPU drain after every submission one buffer is enough; it is
/// reset and re-recorded each frame.
pub struct CommandRecorder {
    // Kept alive for the buffer allocated from it.
    _command_pool: CommandPool,
    command_buffer: CommandBuffer,
}

impl CommandRecorder {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let graphics_family = device.queue_families().graphics.ok_or_else(|| {
            RhiError::InvalidHandle("Device has no graphics queue family".to_string())
        })?;

        let command_pool = CommandPool::new(device.clone(), graphics_family)?;
        let command_buffer = CommandBuffer::new(device, &command_pool)?;

        debug!("Command recorder created");

        Ok(Self {
            _command_pool: command_pool,
            command_buffer,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer.handle()
    }

    /// Records one frame targeting the acquired swapchain image.
    ///
    /// The image enters as COLOR_ATTACHMENT_OPTIMAL, is cleared, drawn into,
    /// and leaves as PRESENT_SRC_KHR; that present transition is always the
    /// final command before `end`.
    pub fn record(
        &self,
        resources: &PipelineResources,
        image: vk::Image,
        image_view: vk::ImageView,
        extent: vk::Extent2D,
    ) -> RhiResult<()> {
        let cmd = &self.command_buffer;

        cmd.reset()?;
        cmd.begin()?;

        cmd.transition_image(
            image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        );

        let clear_value = vk::ClearValue {
            color: vk::ClearColorValue {
                float32: CLEAR_COLOR,
            },
        };

        let color_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(image_view)
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(clear_value);

        let color_attachments = [color_attachment];
        let rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .layer_count(1)
            .color_attachments(&color_attachments);

        cmd.begin_rendering(&rendering_info);

        cmd.set_viewport(
            vk::Viewport::default()
                .x(0.0)
                .y(0.0)
                .width(extent.width as f32)
                .height(extent.height as f32)
                .min_depth(0.0)
                .max_depth(1.0),
        );
        cmd.set_scissor(vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        });

        let pipeline = resources.pipeline();
        cmd.bind_pipeline(pipeline.bind_point(), pipeline.handle());
        cmd.bind_descriptor_sets(
            pipeline.bind_point(),
            resources.pipeline_layout().handle(),
            &[resources.descriptor_set()],
        );
        cmd.bind_vertex_buffers(&[resources.vertex_buffer().handle()]);
        cmd.bind_index_buffer(resources.index_buffer().handle(), vk::IndexType::UINT32);

        cmd.draw_indexed(resources.index_count());

        cmd.end_rendering();

        cmd.transition_image(
            image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        );

        cmd.end()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_is_dark_gray() {
        assert_eq!(CLEAR_COLOR, [0.2, 0.2, 0.2, 1.0]);
    }
}
