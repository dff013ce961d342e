//! GPU-side mirror of a packed [`Mesh`]: owns the `wgpu` vertex/index
//! buffers, uploads only the byte ranges the incremental updater touched,
//! and records the resolved draw range on a caller-provided render pass.
//!
//! Pipeline, shader, and bind-group setup stay with the caller; this module
//! assumes a pipeline whose vertex layout matches the four fixed-stride
//! streams in [`batch::layout`](crate::batch::layout).

use std::mem;

use wgpu::util::DeviceExt;

use crate::batch::{AttributeBinding, DrawBackend, DrawCall, Mesh, TextureHandle};

/// wgpu buffers mirroring one generated mesh. Recreate after
/// [`Mesh::generate_buffer`] runs again, since buffer sizes are fixed.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl GpuMesh {
    /// Creates GPU buffers initialized from the mesh's packed data.
    /// The mesh must be generated and non-empty.
    pub fn new(device: &wgpu::Device, mesh: &Mesh) -> Self {
        assert!(
            mesh.is_generated() && !mesh.vertex_data().is_empty(),
            "GpuMesh requires a generated, non-empty mesh"
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("BatchVertexBuffer"),
            contents: bytemuck::cast_slice(mesh.vertex_data()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        // Index data is padded to the copy alignment so incremental
        // whole-buffer writes stay legal for odd u16 counts.
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("BatchIndexBuffer"),
            contents: bytemuck::cast_slice(&padded_indices(mesh.index_data())),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            vertex_buffer,
            index_buffer,
        }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    /// Drains the mesh's dirty state into minimal `write_buffer` calls:
    /// one per touched vertex range, plus the whole index buffer after a
    /// reorder pass.
    pub fn upload(&self, queue: &wgpu::Queue, mesh: &mut Mesh) {
        let ranges = mesh.take_dirty_ranges();
        for range in &ranges {
            let offset = (range.start * mem::size_of::<f32>()) as u64;
            queue.write_buffer(
                &self.vertex_buffer,
                offset,
                bytemuck::cast_slice(&mesh.vertex_data()[range.clone()]),
            );
        }
        if !ranges.is_empty() {
            log::trace!("uploaded {} dirty vertex ranges", ranges.len());
        }

        if mesh.take_index_dirty() {
            queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&padded_indices(mesh.index_data())),
            );
        }
    }

    /// Submits the mesh's resolved draw range onto an open render pass.
    /// Equivalent to `mesh.submit` driven through a pass-recording backend.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        mesh: &mut Mesh,
    ) -> Result<(), crate::batch::BatchError> {
        let mut backend = RenderPassBackend { pass, gpu: self };
        mesh.submit(&mut backend)
    }
}

/// [`DrawBackend`] that records onto a `wgpu::RenderPass`. Texture binds are
/// ignored: bind groups are owned by the caller's pipeline setup.
pub struct RenderPassBackend<'a, 'pass> {
    pub pass: &'a mut wgpu::RenderPass<'pass>,
    pub gpu: &'a GpuMesh,
}

impl DrawBackend for RenderPassBackend<'_, '_> {
    fn bind_texture(&mut self, texture: TextureHandle) {
        log::trace!("texture {} bound via caller bind groups", texture.id);
    }

    fn bind_attribute(&mut self, binding: AttributeBinding, _vertex_data: &[f32]) {
        let offset = (binding.element_offset * mem::size_of::<f32>()) as u64;
        self.pass
            .set_vertex_buffer(binding.slot, self.gpu.vertex_buffer.slice(offset..));
    }

    fn draw_indexed(&mut self, call: DrawCall, _index_data: &[u16]) {
        self.pass
            .set_index_buffer(self.gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        let first = call.first_element as u32;
        self.pass
            .draw_indexed(first..first + call.element_count, 0, 0..1);
    }
}

fn padded_indices(index_data: &[u16]) -> Vec<u16> {
    let mut padded = index_data.to_vec();
    if padded.len() % 2 != 0 {
        padded.push(0);
    }
    padded
}
