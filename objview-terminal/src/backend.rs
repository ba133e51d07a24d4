/// CPU buffer storage standing in for GPU buffer objects
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;

use objview_core::{BufferAllocator, BufferId, BufferTarget, Vector3};

/// Decoded contents of one buffer
#[derive(Debug, Clone, PartialEq)]
pub enum StoredBuffer {
    Vertices(Vec<Vector3>),
    Indices(Vec<u32>),
}

/// Keeps uploaded buffers in memory so the rasterizer can draw from them
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    next_id: Cell<u32>,
    buffers: RefCell<HashMap<BufferId, StoredBuffer>>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, id: BufferId) -> Option<Ref<'_, StoredBuffer>> {
        Ref::filter_map(self.buffers.borrow(), |buffers| buffers.get(&id)).ok()
    }

    pub fn vertices(&self, id: BufferId) -> Option<Ref<'_, [Vector3]>> {
        Ref::filter_map(self.buffer(id)?, |buffer| match buffer {
            StoredBuffer::Vertices(vertices) => Some(vertices.as_slice()),
            StoredBuffer::Indices(_) => None,
        })
        .ok()
    }

    pub fn indices(&self, id: BufferId) -> Option<Ref<'_, [u32]>> {
        Ref::filter_map(self.buffer(id)?, |buffer| match buffer {
            StoredBuffer::Indices(indices) => Some(indices.as_slice()),
            StoredBuffer::Vertices(_) => None,
        })
        .ok()
    }

    /// Number of live buffers
    pub fn len(&self) -> usize {
        self.buffers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferAllocator for SoftwareBackend {
    fn allocate(&self, target: BufferTarget, contents: &[u8]) -> BufferId {
        let id = BufferId(self.next_id.get() + 1);
        self.next_id.set(id.0);

        let stored = match target {
            BufferTarget::Vertex => StoredBuffer::Vertices(bytemuck::pod_collect_to_vec(contents)),
            BufferTarget::Index => StoredBuffer::Indices(bytemuck::pod_collect_to_vec(contents)),
        };
        self.buffers.borrow_mut().insert(id, stored);
        id
    }

    fn release(&self, id: BufferId) {
        if self.buffers.borrow_mut().remove(&id).is_none() {
            log::warn!("released unknown buffer {id:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objview_core::BufferObject;
    use std::rc::Rc;

    #[test]
    fn test_decodes_uploads() {
        let backend = Rc::new(SoftwareBackend::new());
        let allocator: Rc<dyn BufferAllocator> = backend.clone();

        let vertices = [Vector3::new(1.0, 2.0, 3.0), Vector3::with_w(4.0, 5.0, 6.0, 0.0)];
        let vbo = BufferObject::upload(&allocator, BufferTarget::Vertex, bytemuck::cast_slice(&vertices));
        let indices = [0u32, 1, 1];
        let ibo = BufferObject::upload(&allocator, BufferTarget::Index, bytemuck::cast_slice(&indices));

        assert_eq!(backend.len(), 2);
        assert_eq!(&*backend.vertices(vbo.id()).unwrap(), &vertices[..]);
        assert_eq!(backend.vertices(vbo.id()).unwrap()[1].w, 0.0);
        assert_eq!(&*backend.indices(ibo.id()).unwrap(), &indices[..]);
        assert!(backend.indices(vbo.id()).is_none());

        drop(vbo);
        drop(ibo);
        assert!(backend.is_empty());
    }
}
