pub mod backend;
pub mod drawable;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod submesh;

pub use backend::{AttributeBinding, DrawBackend, DrawCall, PrimitiveMode, TextureHandle};
pub use drawable::{Color, Drawable, DrawableState};
pub use error::BatchError;
pub use layout::{RegionLengths, RegionOffsets};
pub use mesh::Mesh;
pub use submesh::SubMesh;
