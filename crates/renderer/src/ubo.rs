//! Shader uniform data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-frame transform block, padded to the 256-byte constant-buffer
/// alignment boundary.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TransformsUbo {
    pub projection: Mat4,
    pub model: Mat4,
    pub view: Mat4,
    _padding: [f32; 16],
}

impl TransformsUbo {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(projection: Mat4, model: Mat4, view: Mat4) -> Self {
        Self {
            projection,
            model,
            view,
            _padding: [0.0; 16],
        }
    }
}

/// Perspective projection: 45 degree vertical FOV, near 0.01, far 1024.
pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height as f32;
    Mat4::perspective_rh(45f32.to_radians(), aspect, 0.01, 1024.0)
}

/// Camera sits 2.5 units back from the origin.
pub fn view_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -2.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ubo_size_is_256() {
        assert_eq!(TransformsUbo::SIZE, 256);
        assert_eq!(std::mem::size_of::<TransformsUbo>(), 256);
    }

    #[test]
    fn test_ubo_field_offsets() {
        assert_eq!(std::mem::offset_of!(TransformsUbo, projection), 0);
        assert_eq!(std::mem::offset_of!(TransformsUbo, model), 64);
        assert_eq!(std::mem::offset_of!(TransformsUbo, view), 128);
    }

    #[test]
    fn test_ubo_byte_view() {
        let ubo = TransformsUbo::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let bytes: &[u8] = bytemuck::bytes_of(&ubo);
        assert_eq!(bytes.len(), 256);
    }

    #[test]
    fn test_projection_is_reproducible() {
        // Equal dimensions must produce bit-identical matrices, so a resize
        // to the same size is observationally idempotent.
        let a = projection_matrix(1280, 720);
        let b = projection_matrix(1280, 720);
        assert_eq!(a.to_cols_array(), b.to_cols_array());
    }

    #[test]
    fn test_projection_tracks_aspect() {
        let wide = projection_matrix(1280, 720);
        let square = projection_matrix(720, 720);
        assert_ne!(wide.to_cols_array(), square.to_cols_array());
    }

    #[test]
    fn test_view_offset() {
        let view = view_matrix();
        assert_eq!(view.w_axis.z, -2.5);
    }
}
