use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BatchError {
    /// `update`/`submit`/`reorder_children` was called before
    /// `generate_buffer`, or after a topology change invalidated the buffers.
    #[error("packed buffers have not been generated; call generate_buffer first")]
    NotGenerated,

    /// A draw-range endpoint does not name an existing sub-mesh slot.
    #[error("draw range endpoint {endpoint} out of bounds ({children} sub-meshes)")]
    RangeOutOfBounds { endpoint: usize, children: usize },

    /// A resolved draw range runs backwards.
    #[error("draw range is reversed: from slot {from} to slot {to}")]
    ReversedRange { from: usize, to: usize },

    /// A sub-mesh `order` value lies outside `0..children`.
    #[error("sub-mesh order {order} out of range ({children} sub-meshes)")]
    OrderOutOfRange { order: usize, children: usize },

    /// Two sub-meshes claim the same logical slot.
    #[error("duplicate sub-mesh order {order}")]
    DuplicateOrder { order: usize },
}
