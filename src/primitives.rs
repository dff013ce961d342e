//! Born-geometry templates for common shapes.

use crate::batch::TextureHandle;

/// Born geometry for an axis-aligned textured rectangle centered at the
/// origin in the XY plane: `(positions, uvs, indices)` with 4 vertices and
/// 2 triangles. UVs cover the full texture, origin at top-left.
pub fn quad_geometry(width: f32, height: f32) -> (Vec<f32>, Vec<f32>, Vec<u16>) {
    let hw = width / 2.0;
    let hh = height / 2.0;

    #[rustfmt::skip]
    let positions = vec![
        -hw,  hh, 0.0, // top-left
        -hw, -hh, 0.0, // bottom-left
         hw, -hh, 0.0, // bottom-right
         hw,  hh, 0.0, // top-right
    ];
    #[rustfmt::skip]
    let uvs = vec![
        0.0, 0.0,
        0.0, 1.0,
        1.0, 1.0,
        1.0, 0.0,
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];

    (positions, uvs, indices)
}

/// Quad sized to a texture's full pixel dimensions.
pub fn texture_quad_geometry(texture: TextureHandle) -> (Vec<f32>, Vec<f32>, Vec<u16>) {
    quad_geometry(texture.width as f32, texture.height as f32)
}
