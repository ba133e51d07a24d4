/// GPU buffer handles with scoped ownership
///
/// The core never talks to a graphics API directly. A [`BufferAllocator`]
/// supplied by the rendering layer creates and deletes the actual buffers;
/// [`BufferObject`] ties each handle's lifetime to its owner so buffers are
/// released on `close`, on re-upload and on drop.
use std::fmt;
use std::rc::Rc;

/// Backend-assigned buffer name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// What a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `[positions ++ normals]`, four `f32` per element
    Vertex,
    /// `u32` indices into the vertex buffer
    Index,
}

/// Graphics backend hook used to create and delete buffers.
///
/// Methods take `&self`; backends are single-threaded and use interior
/// mutability for their bookkeeping.
pub trait BufferAllocator {
    fn allocate(&self, target: BufferTarget, contents: &[u8]) -> BufferId;
    fn release(&self, id: BufferId);
}

/// An uploaded buffer, released through its allocator when dropped
pub struct BufferObject {
    id: BufferId,
    target: BufferTarget,
    len: usize,
    allocator: Rc<dyn BufferAllocator>,
}

impl BufferObject {
    pub fn upload(allocator: &Rc<dyn BufferAllocator>, target: BufferTarget, contents: &[u8]) -> Self {
        let id = allocator.allocate(target, contents);
        log::trace!("allocated {target:?} buffer {id:?} ({} bytes)", contents.len());
        Self {
            id,
            target,
            len: contents.len(),
            allocator: Rc::clone(allocator),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Size of the uploaded contents in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for BufferObject {
    fn drop(&mut self) {
        log::trace!("releasing {:?} buffer {:?}", self.target, self.id);
        self.allocator.release(self.id);
    }
}

impl fmt::Debug for BufferObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferObject")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
