/// objview core library - mesh loading and transform math
///
/// This library provides the renderer-independent parts of the viewer:
/// OBJ/MTL parsing, vertex normal generation, homogeneous vector and matrix
/// math, and ownership of the GPU buffers a rendering backend creates.

pub mod buffer;
pub mod error;
pub mod fmt;
pub mod geometry;
pub mod material;
pub mod obj;
pub mod projection;
pub mod transform;
pub mod vector;

// Re-export commonly used types
pub use buffer::{BufferAllocator, BufferId, BufferObject, BufferTarget};
pub use error::LoadError;
pub use geometry::{Mesh, TriangleGroup};
pub use material::Material;
pub use projection::{Camera, ProjectionMode};
pub use transform::Matrix4;
pub use vector::Vector3;
