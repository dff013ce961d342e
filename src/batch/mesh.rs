use std::collections::VecDeque;
use std::ops::Range;

use glam::Vec3;

use crate::batch::backend::{
    AttributeBinding, DrawBackend, DrawCall, PrimitiveMode, TextureHandle,
};
use crate::batch::drawable::{Drawable, DrawableState};
use crate::batch::error::BatchError;
use crate::batch::layout::{
    RegionLengths, RegionOffsets, OPACITY_COMPONENTS, OPACITY_SLOT, OPACITY_STRIDE,
    POSITION_COMPONENTS, POSITION_SLOT, POSITION_STRIDE, RGB_COMPONENTS, RGB_SLOT, RGB_STRIDE,
    UV_COMPONENTS, UV_SLOT, UV_STRIDE,
};
use crate::batch::submesh::SubMesh;
use crate::primitives::{quad_geometry, texture_quad_geometry};

/// Batched-geometry aggregate: packs every child [`SubMesh`] into one shared
/// vertex/index buffer so the whole group draws in a single indexed call.
///
/// Usage is two-phased. Topology mutation (`add_*`, `clear`) accumulates
/// layout totals; `generate_buffer` then allocates the exactly sized packed
/// buffers and copies born data into place. After that, one `update` per
/// frame rewrites only the regions whose drawables changed, and `submit`
/// hands the resolved draw range to a [`DrawBackend`]. Adding children after
/// generation invalidates the buffers until `generate_buffer` runs again.
pub struct Mesh {
    drawable: Drawable,
    texture: TextureHandle,
    mode: PrimitiveMode,

    children: Vec<SubMesh>,
    vertex_count: usize,
    lengths: RegionLengths,

    vertex_data: Vec<f32>,
    index_data: Vec<u16>,
    offsets: RegionOffsets,
    generated: bool,

    from_slot: usize,
    to_slot: usize,
    range_queue: VecDeque<usize>,

    // Vertex-buffer element ranges touched since the last take; the GPU
    // uploader drains these to keep write_buffer traffic minimal.
    dirty_ranges: Vec<Range<usize>>,
    index_dirty: bool,
}

impl Mesh {
    pub fn new(texture: TextureHandle) -> Self {
        Self::with_capacity(texture, 0)
    }

    pub fn with_capacity(texture: TextureHandle, capacity: usize) -> Self {
        Self {
            drawable: Drawable::new(),
            texture,
            mode: PrimitiveMode::Triangles,
            children: Vec::with_capacity(capacity),
            vertex_count: 0,
            lengths: RegionLengths::default(),
            vertex_data: Vec::new(),
            index_data: Vec::new(),
            offsets: RegionOffsets::default(),
            generated: false,
            from_slot: 0,
            to_slot: 0,
            range_queue: VecDeque::new(),
            dirty_ranges: Vec::new(),
            index_dirty: false,
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn primitive_mode(&self) -> PrimitiveMode {
        self.mode
    }

    pub fn set_primitive_mode(&mut self, mode: PrimitiveMode) {
        self.mode = mode;
    }

    /// Aggregate-level state: its opacity/RGB multiply into every child.
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }

    pub fn children(&self) -> &[SubMesh] {
        &self.children
    }

    pub fn child(&self, slot: usize) -> &SubMesh {
        &self.children[slot]
    }

    pub fn child_mut(&mut self, slot: usize) -> &mut SubMesh {
        &mut self.children[slot]
    }

    /// Global vertex count across all children.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Packed vertex buffer. Empty until `generate_buffer` runs.
    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data
    }

    /// Packed index buffer of global u16 vertex indices.
    pub fn index_data(&self) -> &[u16] {
        &self.index_data
    }

    /// Element offsets of the four packed regions.
    pub fn region_offsets(&self) -> RegionOffsets {
        self.offsets
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    // ------------------------------------------------------------------
    // Buffer packer: accumulation phase
    // ------------------------------------------------------------------

    /// Appends a child, recording its offsets as the running totals so far
    /// and rebasing its index template onto the global vertex numbering.
    /// Returns the child's storage slot. Invalidates any generated buffers.
    pub fn add_child(&mut self, mut child: SubMesh) -> usize {
        assert!(
            self.vertex_count + child.vertex_count() <= u16::MAX as usize + 1,
            "u16 index space exhausted: {} + {} vertices",
            self.vertex_count,
            child.vertex_count()
        );

        child.bias_indices(self.vertex_count as u16);
        child.set_initial_order(self.children.len());
        child.position_offset = self.lengths.position;
        child.uv_offset = self.lengths.uv;
        child.opacity_offset = self.lengths.opacity;
        child.rgb_offset = self.lengths.rgb;
        child.index_offset = self.lengths.index;

        self.vertex_count += child.vertex_count();
        self.lengths.position += child.born_positions().len();
        self.lengths.uv += child.born_uvs().len();
        self.lengths.opacity += child.vertex_count() * OPACITY_COMPONENTS;
        self.lengths.rgb += child.vertex_count() * RGB_COMPONENTS;
        self.lengths.index += child.index_len();

        self.generated = false;
        self.children.push(child);
        self.children.len() - 1
    }

    /// Appends a child built from raw born geometry.
    pub fn add_geometry(
        &mut self,
        positions: Vec<f32>,
        uvs: Vec<f32>,
        indices: Vec<u16>,
    ) -> usize {
        self.add_child(SubMesh::new(positions, uvs, indices))
    }

    /// Appends a textured quad of the given pixel size.
    pub fn add_quad(&mut self, width: f32, height: f32) -> usize {
        let (positions, uvs, indices) = quad_geometry(width, height);
        self.add_geometry(positions, uvs, indices)
    }

    /// Appends a quad sized to the mesh's whole texture.
    pub fn add_texture_quad(&mut self) -> usize {
        let (positions, uvs, indices) = texture_quad_geometry(self.texture);
        self.add_geometry(positions, uvs, indices)
    }

    // ------------------------------------------------------------------
    // Buffer packer: allocation phase
    // ------------------------------------------------------------------

    /// Allocates the exactly sized packed buffers from the accumulated totals
    /// and copies every child's born positions, born UVs, and index template
    /// into place. Opacity and RGB have no born data; each child is marked
    /// dirty so the next `update` fills them. Resets the draw range to the
    /// full span. Calling again discards the old buffers and repeats the copy
    /// from the already-recorded offsets (regeneration).
    pub fn generate_buffer(&mut self) {
        self.offsets = self.lengths.offsets();
        self.vertex_data = vec![0.0; self.lengths.vertex_total()];
        self.index_data = vec![0; self.lengths.index];

        let offsets = self.offsets;
        for child in &mut self.children {
            let pos_start = offsets.position + child.position_offset;
            self.vertex_data[pos_start..pos_start + child.born_positions().len()]
                .copy_from_slice(child.born_positions());

            let uv_start = offsets.uv + child.uv_offset;
            self.vertex_data[uv_start..uv_start + child.born_uvs().len()]
                .copy_from_slice(child.born_uvs());

            let idx_start = child.index_offset;
            self.index_data[idx_start..idx_start + child.index_len()]
                .copy_from_slice(child.indices());

            // No born opacity/RGB: force the next update to write both.
            child
                .drawable_mut()
                .mark(DrawableState::OPACITY_CHANGED | DrawableState::RGB_CHANGED);
        }

        self.from_slot = 0;
        self.to_slot = self.children.len().saturating_sub(1);
        self.dirty_ranges.clear();
        self.index_dirty = false;
        self.generated = true;

        log::info!(
            "generated mesh buffers: {} children, {} vertices, {} f32 + {} u16",
            self.children.len(),
            self.vertex_count,
            self.vertex_data.len(),
            self.index_data.len()
        );
    }

    // ------------------------------------------------------------------
    // Incremental updater
    // ------------------------------------------------------------------

    /// Once-per-frame pass: resolves the aggregate drawable, then every child
    /// drawable in storage order, rewriting only the packed regions whose
    /// change flags are set. Records each touched element range for
    /// [`take_dirty_ranges`](Self::take_dirty_ranges).
    pub fn update(&mut self) -> Result<(), BatchError> {
        if !self.generated {
            return Err(BatchError::NotGenerated);
        }

        self.drawable.update();
        let mesh_opacity_changed = self.drawable.check_state(DrawableState::OPACITY_CHANGED);
        let mesh_rgb_changed = self.drawable.check_state(DrawableState::RGB_CHANGED);
        let mesh_color = self.drawable.color();

        let offsets = self.offsets;
        let vertex_data = &mut self.vertex_data;
        let dirty_ranges = &mut self.dirty_ranges;

        for child in &mut self.children {
            child.drawable_mut().update();
            let drawable = child.drawable();
            let color = drawable.color();

            // Attribute recomputation only runs while the child is drawn;
            // the zero-fill from the hide transition below is what keeps a
            // hidden child degenerate, so no opacity/color change may
            // overwrite it in the meantime.
            if drawable.is_drawn() {
                if drawable.check_state(DrawableState::TRANSFORM_CHANGED) {
                    let start = offsets.position + child.position_offset;
                    let end = start + child.born_positions().len();
                    let model = drawable.model_matrix();
                    let out = &mut vertex_data[start..end];
                    for (born, dst) in child
                        .born_positions()
                        .chunks_exact(POSITION_COMPONENTS)
                        .zip(out.chunks_exact_mut(POSITION_COMPONENTS))
                    {
                        let p = model.transform_point3(Vec3::new(born[0], born[1], born[2]));
                        dst[0] = p.x;
                        dst[1] = p.y;
                        dst[2] = p.z;
                    }
                    dirty_ranges.push(start..end);
                }

                if drawable.check_state(DrawableState::OPACITY_CHANGED) || mesh_opacity_changed {
                    write_opacity(
                        vertex_data,
                        dirty_ranges,
                        offsets.opacity + child.opacity_offset,
                        child.vertex_count(),
                        color.a * mesh_color.a,
                    );
                }

                if drawable.check_state(DrawableState::RGB_CHANGED) || mesh_rgb_changed {
                    let start = offsets.rgb + child.rgb_offset;
                    let end = start + child.vertex_count() * RGB_COMPONENTS;
                    let (r, g, b) = (
                        color.r * mesh_color.r,
                        color.g * mesh_color.g,
                        color.b * mesh_color.b,
                    );
                    for rgb in vertex_data[start..end].chunks_exact_mut(RGB_COMPONENTS) {
                        rgb[0] = r;
                        rgb[1] = g;
                        rgb[2] = b;
                    }
                    dirty_ranges.push(start..end);
                }
            }

            // Visibility edge: hiding zero-fills opacity so the child
            // degenerates inside the shared draw call; showing restores the
            // product rule even when the opacity flag itself is clear.
            if drawable.check_state(DrawableState::VISIBLE_CHANGED) {
                let value = if drawable.is_drawn() {
                    color.a * mesh_color.a
                } else {
                    0.0
                };
                write_opacity(
                    vertex_data,
                    dirty_ranges,
                    offsets.opacity + child.opacity_offset,
                    child.vertex_count(),
                    value,
                );
            }
        }

        Ok(())
    }

    /// Drains the vertex-buffer element ranges touched since the last call.
    pub fn take_dirty_ranges(&mut self) -> Vec<Range<usize>> {
        std::mem::take(&mut self.dirty_ranges)
    }

    /// True (once) when the index buffer changed since the last call.
    pub fn take_index_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.index_dirty, false)
    }

    // ------------------------------------------------------------------
    // Range selector / submitter
    // ------------------------------------------------------------------

    /// Queues a partial draw range for a future `submit`. Endpoints are
    /// storage slots, inclusive on both ends.
    pub fn push_draw_range(&mut self, from: usize, to: usize) -> Result<(), BatchError> {
        for endpoint in [from, to] {
            if endpoint >= self.children.len() {
                return Err(BatchError::RangeOutOfBounds {
                    endpoint,
                    children: self.children.len(),
                });
            }
        }
        if from > to {
            return Err(BatchError::ReversedRange { from, to });
        }
        self.range_queue.push_back(from);
        self.range_queue.push_back(to);
        Ok(())
    }

    /// Resolves the draw range (one dequeued pair, each endpoint falling back
    /// to the full-span default) and issues one indexed draw through the
    /// backend: texture bind, four attribute streams at their region offsets,
    /// then the index sub-range covering the selected children. No-op with
    /// zero children.
    pub fn submit<B: DrawBackend>(&mut self, backend: &mut B) -> Result<(), BatchError> {
        if self.children.is_empty() {
            return Ok(());
        }
        if !self.generated {
            return Err(BatchError::NotGenerated);
        }

        let from_slot = self.range_queue.pop_front().unwrap_or(self.from_slot);
        let to_slot = self.range_queue.pop_front().unwrap_or(self.to_slot);
        let from = self
            .children
            .get(from_slot)
            .ok_or(BatchError::RangeOutOfBounds {
                endpoint: from_slot,
                children: self.children.len(),
            })?;
        let to = self
            .children
            .get(to_slot)
            .ok_or(BatchError::RangeOutOfBounds {
                endpoint: to_slot,
                children: self.children.len(),
            })?;
        let span = to
            .index_offset()
            .checked_sub(from.index_offset())
            .ok_or(BatchError::ReversedRange {
                from: from_slot,
                to: to_slot,
            })?;

        backend.bind_texture(self.texture);
        backend.bind_attribute(
            AttributeBinding {
                slot: POSITION_SLOT,
                components: POSITION_COMPONENTS as u32,
                stride: POSITION_STRIDE,
                element_offset: self.offsets.position,
            },
            &self.vertex_data,
        );
        backend.bind_attribute(
            AttributeBinding {
                slot: UV_SLOT,
                components: UV_COMPONENTS as u32,
                stride: UV_STRIDE,
                element_offset: self.offsets.uv,
            },
            &self.vertex_data,
        );
        backend.bind_attribute(
            AttributeBinding {
                slot: OPACITY_SLOT,
                components: OPACITY_COMPONENTS as u32,
                stride: OPACITY_STRIDE,
                element_offset: self.offsets.opacity,
            },
            &self.vertex_data,
        );
        backend.bind_attribute(
            AttributeBinding {
                slot: RGB_SLOT,
                components: RGB_COMPONENTS as u32,
                stride: RGB_STRIDE,
                element_offset: self.offsets.rgb,
            },
            &self.vertex_data,
        );
        backend.draw_indexed(
            DrawCall {
                mode: self.mode,
                element_count: (span + to.index_len()) as u32,
                first_element: from.index_offset(),
            },
            &self.index_data,
        );

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reorder pass
    // ------------------------------------------------------------------

    /// Rewrites the index buffer so that visiting it front to back yields the
    /// children in the order given by their `order` fields, while every
    /// child's vertex/UV data stays at its original offset. The `order`
    /// values must form a permutation of `0..children`; a duplicate or
    /// out-of-range value fails before anything is written. Full-buffer
    /// rebuild, not incremental.
    pub fn reorder_children(&mut self) -> Result<(), BatchError> {
        if !self.generated {
            return Err(BatchError::NotGenerated);
        }

        let n = self.children.len();
        let mut slot_to_storage = vec![usize::MAX; n];
        for (storage, child) in self.children.iter().enumerate() {
            let order = child.order();
            if order >= n {
                return Err(BatchError::OrderOutOfRange { order, children: n });
            }
            if slot_to_storage[order] != usize::MAX {
                return Err(BatchError::DuplicateOrder { order });
            }
            slot_to_storage[order] = storage;
        }

        // Children keep their original index_offset; only the buffer's
        // visiting order changes, tracked by a running write cursor.
        let mut cursor = 0;
        for &storage in &slot_to_storage {
            let child = &self.children[storage];
            self.index_data[cursor..cursor + child.index_len()].copy_from_slice(child.indices());
            cursor += child.index_len();
        }

        self.index_dirty = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Destroys every child and releases the packed buffers, keeping the
    /// mesh reusable.
    pub fn clear(&mut self) {
        self.children.clear();
        self.range_queue.clear();
        self.vertex_data = Vec::new();
        self.index_data = Vec::new();
        self.vertex_count = 0;
        self.lengths = RegionLengths::default();
        self.offsets = RegionOffsets::default();
        self.from_slot = 0;
        self.to_slot = 0;
        self.dirty_ranges.clear();
        self.index_dirty = false;
        self.generated = false;
    }
}

fn write_opacity(
    vertex_data: &mut [f32],
    dirty_ranges: &mut Vec<Range<usize>>,
    start: usize,
    vertex_count: usize,
    value: f32,
) {
    let end = start + vertex_count * OPACITY_COMPONENTS;
    vertex_data[start..end].fill(value);
    dirty_ranges.push(start..end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> SubMesh {
        SubMesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn add_child_accumulates_running_totals() {
        let mut mesh = Mesh::new(TextureHandle::new(1, 64, 64));
        let a = mesh.add_child(triangle());
        let b = mesh.add_child(triangle());

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.child(1).position_offset(), 9);
        assert_eq!(mesh.child(1).uv_offset(), 6);
        assert_eq!(mesh.child(1).index_offset(), 3);
        // Second child's template is rebased past the first's vertices.
        assert_eq!(mesh.child(1).indices(), &[3, 4, 5]);
    }

    #[test]
    fn update_before_generate_is_an_error() {
        let mut mesh = Mesh::new(TextureHandle::new(1, 64, 64));
        mesh.add_child(triangle());
        assert_eq!(mesh.update(), Err(BatchError::NotGenerated));
    }

    #[test]
    fn adding_after_generate_invalidates_buffers() {
        let mut mesh = Mesh::new(TextureHandle::new(1, 64, 64));
        mesh.add_child(triangle());
        mesh.generate_buffer();
        assert!(mesh.is_generated());

        mesh.add_child(triangle());
        assert!(!mesh.is_generated());
        assert_eq!(mesh.update(), Err(BatchError::NotGenerated));

        mesh.generate_buffer();
        assert_eq!(mesh.vertex_data().len(), 6 * (3 + 2 + 1 + 3));
    }

    #[test]
    fn clear_resets_totals_and_keeps_mesh_reusable() {
        let mut mesh = Mesh::new(TextureHandle::new(1, 64, 64));
        mesh.add_child(triangle());
        mesh.generate_buffer();

        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.children().is_empty());
        assert!(mesh.vertex_data().is_empty());

        mesh.add_child(triangle());
        mesh.generate_buffer();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn push_draw_range_validates_endpoints() {
        let mut mesh = Mesh::new(TextureHandle::new(1, 64, 64));
        mesh.add_child(triangle());
        mesh.add_child(triangle());

        assert!(mesh.push_draw_range(0, 1).is_ok());
        assert_eq!(
            mesh.push_draw_range(0, 2),
            Err(BatchError::RangeOutOfBounds {
                endpoint: 2,
                children: 2
            })
        );
        assert_eq!(
            mesh.push_draw_range(1, 0),
            Err(BatchError::ReversedRange { from: 1, to: 0 })
        );
    }
}
