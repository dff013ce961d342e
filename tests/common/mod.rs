#![allow(dead_code)]

use mesh_batch::{AttributeBinding, DrawBackend, DrawCall, TextureHandle};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn texture() -> TextureHandle {
    TextureHandle::new(7, 128, 64)
}

/// Headless backend that records every call `Mesh::submit` makes, so tests
/// can assert on the exact binding and draw parameters.
#[derive(Default)]
pub struct RecordingBackend {
    pub textures: Vec<TextureHandle>,
    pub attributes: Vec<AttributeBinding>,
    pub draws: Vec<DrawCall>,
    pub drawn_indices: Vec<Vec<u16>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index elements covered by the most recent draw call.
    pub fn last_drawn_span(&self) -> &[u16] {
        let call = self.draws.last().expect("no draw recorded");
        let indices = self.drawn_indices.last().expect("no draw recorded");
        &indices[call.first_element..call.first_element + call.element_count as usize]
    }
}

impl DrawBackend for RecordingBackend {
    fn bind_texture(&mut self, texture: TextureHandle) {
        self.textures.push(texture);
    }

    fn bind_attribute(&mut self, binding: AttributeBinding, _vertex_data: &[f32]) {
        self.attributes.push(binding);
    }

    fn draw_indexed(&mut self, call: DrawCall, index_data: &[u16]) {
        self.draws.push(call);
        self.drawn_indices.push(index_data.to_vec());
    }
}
