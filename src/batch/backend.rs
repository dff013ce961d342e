/// Opaque texture reference supplied by the caller's resource layer. The
/// pixel dimensions only feed default-quad geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    TriangleStrip,
    Lines,
    Points,
}

/// One fixed-stride f32 attribute stream inside the shared vertex buffer.
/// `element_offset` counts f32 elements from the start of the buffer; values
/// are never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub slot: u32,
    pub components: u32,
    pub stride: u32,
    pub element_offset: usize,
}

/// One indexed draw over u16 indices. `first_element` counts u16 elements
/// from the start of the index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: PrimitiveMode,
    pub element_count: u32,
    pub first_element: usize,
}

/// Contract a rendering backend satisfies to receive one batched submission:
/// a texture bind, four attribute-stream binds, then exactly one indexed
/// draw. The packed CPU buffers are passed alongside so backends that upload
/// lazily (or tests that only record) can see the data without owning it.
pub trait DrawBackend {
    fn bind_texture(&mut self, texture: TextureHandle);

    fn bind_attribute(&mut self, binding: AttributeBinding, vertex_data: &[f32]);

    fn draw_indexed(&mut self, call: DrawCall, index_data: &[u16]);
}
