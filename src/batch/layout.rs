use std::mem;

/// Components per vertex for each packed region, in region order.
pub const POSITION_COMPONENTS: usize = 3;
pub const UV_COMPONENTS: usize = 2;
pub const OPACITY_COMPONENTS: usize = 1;
pub const RGB_COMPONENTS: usize = 3;

/// Byte strides of the four tightly packed attribute streams.
pub const POSITION_STRIDE: u32 = (POSITION_COMPONENTS * mem::size_of::<f32>()) as u32;
pub const UV_STRIDE: u32 = (UV_COMPONENTS * mem::size_of::<f32>()) as u32;
pub const OPACITY_STRIDE: u32 = (OPACITY_COMPONENTS * mem::size_of::<f32>()) as u32;
pub const RGB_STRIDE: u32 = (RGB_COMPONENTS * mem::size_of::<f32>()) as u32;

/// Attribute slots, matching the shader interface order.
pub const POSITION_SLOT: u32 = 0;
pub const UV_SLOT: u32 = 1;
pub const OPACITY_SLOT: u32 = 2;
pub const RGB_SLOT: u32 = 3;

/// Element totals accumulated while sub-meshes are added, before the packed
/// buffers exist. `position`/`uv`/`opacity`/`rgb` count f32 elements; `index`
/// counts u16 elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionLengths {
    pub position: usize,
    pub uv: usize,
    pub opacity: usize,
    pub rgb: usize,
    pub index: usize,
}

impl RegionLengths {
    /// Total f32 elements of the packed vertex buffer.
    pub fn vertex_total(&self) -> usize {
        self.position + self.uv + self.opacity + self.rgb
    }

    /// Region start offsets as prefix sums in the fixed region order
    /// (position, UV, opacity, RGB).
    pub fn offsets(&self) -> RegionOffsets {
        let uv = self.position;
        let opacity = uv + self.uv;
        let rgb = opacity + self.opacity;
        RegionOffsets {
            position: 0,
            uv,
            opacity,
            rgb,
        }
    }
}

/// Element offsets of the four regions inside the packed vertex buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionOffsets {
    pub position: usize,
    pub uv: usize,
    pub opacity: usize,
    pub rgb: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_prefix_sums_in_region_order() {
        let lengths = RegionLengths {
            position: 12,
            uv: 8,
            opacity: 4,
            rgb: 12,
            index: 6,
        };
        let offsets = lengths.offsets();
        assert_eq!(offsets.position, 0);
        assert_eq!(offsets.uv, 12);
        assert_eq!(offsets.opacity, 20);
        assert_eq!(offsets.rgb, 24);
        assert_eq!(lengths.vertex_total(), 36);
    }

    #[test]
    fn offsets_are_strictly_increasing_for_nonempty_regions() {
        let lengths = RegionLengths {
            position: 6,
            uv: 4,
            opacity: 2,
            rgb: 6,
            index: 3,
        };
        let o = lengths.offsets();
        assert!(o.position < o.uv && o.uv < o.opacity && o.opacity < o.rgb);
        assert!(o.rgb + lengths.rgb == lengths.vertex_total());
    }
}
