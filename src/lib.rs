//! Batched-geometry packing and incremental-update engine.
//!
//! Many independently transformable fragments ([`SubMesh`]) pack into one
//! shared vertex/index buffer owned by a [`Mesh`], so the whole group draws
//! in a single indexed call while each fragment's transform, opacity, color,
//! and visibility still change every frame without re-uploading the buffer.
//!
//! A frame looks like:
//! 1. mutate topology if needed (`add_*`, then [`Mesh::generate_buffer`]);
//! 2. mutate drawable state through setters;
//! 3. [`Mesh::update`] rewrites only the dirty packed regions;
//! 4. [`Mesh::submit`] issues one indexed draw through a [`DrawBackend`]
//!    (or [`gpu::GpuMesh::draw`] on a `wgpu` render pass).

pub mod batch;
pub mod gpu;
pub mod primitives;

pub use batch::{
    AttributeBinding, BatchError, Color, DrawBackend, DrawCall, Drawable, DrawableState, Mesh,
    PrimitiveMode, SubMesh, TextureHandle,
};
