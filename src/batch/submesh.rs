use crate::batch::drawable::Drawable;
use crate::batch::layout::{POSITION_COMPONENTS, UV_COMPONENTS};

/// One independently transformable fragment inside a [`Mesh`](crate::Mesh).
///
/// Born position/UV data is the immutable template the update pass transforms
/// from every frame; it is copied into the packed buffer once at generation
/// and never mutated. The index template is rebased onto the aggregate's
/// global vertex numbering when the sub-mesh is added.
#[derive(Debug, Clone)]
pub struct SubMesh {
    born_positions: Vec<f32>,
    born_uvs: Vec<f32>,
    indices: Vec<u16>,
    vertex_count: usize,

    // Region-local element offsets, fixed when the sub-mesh is added.
    pub(crate) position_offset: usize,
    pub(crate) uv_offset: usize,
    pub(crate) opacity_offset: usize,
    pub(crate) rgb_offset: usize,
    pub(crate) index_offset: usize,

    order: usize,
    drawable: Drawable,
}

impl SubMesh {
    /// Builds a sub-mesh from born geometry.
    ///
    /// `positions` holds 3 f32 per vertex, `uvs` 2 per vertex, and `indices`
    /// are local to this geometry (0-based). Mismatched lengths are a caller
    /// bug and fail immediately.
    pub fn new(positions: Vec<f32>, uvs: Vec<f32>, indices: Vec<u16>) -> Self {
        assert!(
            positions.len() % POSITION_COMPONENTS == 0,
            "position data must hold {} f32 per vertex, got {} elements",
            POSITION_COMPONENTS,
            positions.len()
        );
        let vertex_count = positions.len() / POSITION_COMPONENTS;
        assert!(
            uvs.len() == vertex_count * UV_COMPONENTS,
            "uv data must hold {} f32 per vertex ({} vertices), got {} elements",
            UV_COMPONENTS,
            vertex_count,
            uvs.len()
        );
        assert!(
            indices.iter().all(|&i| (i as usize) < vertex_count),
            "index template references a vertex outside 0..{}",
            vertex_count
        );

        Self {
            born_positions: positions,
            born_uvs: uvs,
            indices,
            vertex_count,
            position_offset: 0,
            uv_offset: 0,
            opacity_offset: 0,
            rgb_offset: 0,
            index_offset: 0,
            order: 0,
            drawable: Drawable::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn born_positions(&self) -> &[f32] {
        &self.born_positions
    }

    pub fn born_uvs(&self) -> &[f32] {
        &self.born_uvs
    }

    /// Index template, already rebased to global vertex numbers once the
    /// sub-mesh belongs to a mesh.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_len(&self) -> usize {
        self.indices.len()
    }

    /// Element offset of this sub-mesh's span inside the packed index buffer.
    pub fn index_offset(&self) -> usize {
        self.index_offset
    }

    /// Element offset inside the position region.
    pub fn position_offset(&self) -> usize {
        self.position_offset
    }

    /// Element offset inside the UV region.
    pub fn uv_offset(&self) -> usize {
        self.uv_offset
    }

    /// Element offset inside the opacity region.
    pub fn opacity_offset(&self) -> usize {
        self.opacity_offset
    }

    /// Element offset inside the RGB region.
    pub fn rgb_offset(&self) -> usize {
        self.rgb_offset
    }

    /// Current logical slot; consumed by
    /// [`Mesh::reorder_children`](crate::Mesh::reorder_children).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Reassigns the logical slot (e.g. from a depth sort). Takes effect at
    /// the next reorder pass; vertex data never moves.
    pub fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }

    /// Rebases the local index template onto the aggregate's vertex numbering
    /// at insertion time.
    pub(crate) fn bias_indices(&mut self, vertex_offset: u16) {
        for index in &mut self.indices {
            *index += vertex_offset;
        }
    }

    pub(crate) fn set_initial_order(&mut self, order: usize) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_derives_from_positions() {
        let sm = SubMesh::new(
            vec![0.0; 12],
            vec![0.0; 8],
            vec![0, 1, 2, 2, 3, 0],
        );
        assert_eq!(sm.vertex_count(), 4);
        assert_eq!(sm.index_len(), 6);
    }

    #[test]
    fn bias_rebases_every_index() {
        let mut sm = SubMesh::new(vec![0.0; 9], vec![0.0; 6], vec![0, 1, 2]);
        sm.bias_indices(7);
        assert_eq!(sm.indices(), &[7, 8, 9]);
    }

    #[test]
    #[should_panic(expected = "uv data")]
    fn mismatched_uv_length_fails_loudly() {
        let _ = SubMesh::new(vec![0.0; 9], vec![0.0; 5], vec![0]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_template_index_fails_loudly() {
        let _ = SubMesh::new(vec![0.0; 9], vec![0.0; 6], vec![0, 1, 3]);
    }
}
