use gasket_abi::{FreeFn, RawBuffer};

/// Host handle for one allocation the engine hands back.
///
/// The handle owns the out-cells; the engine owns what they point to. It is
/// move-only: [`EngineBuffer::read`] consumes it, so contents are copied at
/// most once and can never be touched after release. Dropping an unread
/// handle releases it, and releasing twice is a no-op.
pub struct EngineBuffer {
    ptr: *mut u8,
    len: usize,
    cap: usize,
    free: FreeFn,
}

impl EngineBuffer {
    /// An empty handle whose contents will be freed through `free`.
    pub fn new(free: FreeFn) -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
            cap: 0,
            free,
        }
    }

    /// Out-cells for the engine to populate during one entry-point call.
    ///
    /// Any allocation already held is released first, so reusing a handle
    /// never leaks. The returned cells borrow `self` by address; they must
    /// not be kept past the call they are passed to.
    pub fn as_raw(&mut self) -> RawBuffer {
        self.release();
        self.cells()
    }

    fn cells(&mut self) -> RawBuffer {
        RawBuffer {
            ptr: &mut self.ptr,
            len: &mut self.len,
            cap: &mut self.cap,
        }
    }

    /// Whether the engine has stored an allocation in the handle.
    pub fn is_populated(&self) -> bool {
        !self.ptr.is_null()
    }

    /// Copy the contents into host memory and release the engine allocation.
    pub fn read(mut self) -> Vec<u8> {
        let data = if self.ptr.is_null() {
            Vec::new()
        } else {
            // SAFETY: populated cells describe `len` initialized bytes owned by the engine
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }.to_vec()
        };
        self.release();
        data
    }

    /// Hand the allocation back to the engine's allocator.
    pub fn release(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: the cells were populated by the engine that supplied `free`
        unsafe { (self.free)(self.cells()) };
        self.ptr = std::ptr::null_mut();
        self.len = 0;
        self.cap = 0;
    }
}

impl Drop for EngineBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for EngineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuffer")
            .field("populated", &self.is_populated())
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasket_engine::gasket_free;

    fn populated(data: &[u8]) -> EngineBuffer {
        let mut buffer = EngineBuffer::new(gasket_free);
        unsafe { buffer.as_raw().write(data.to_vec()) };
        buffer
    }

    #[test]
    fn test_read_copies_and_releases() {
        let buffer = populated(b"result");
        assert!(buffer.is_populated());
        assert_eq!(buffer.read(), b"result");
    }

    #[test]
    fn test_unpopulated_read_is_empty() {
        let buffer = EngineBuffer::new(gasket_free);
        assert!(!buffer.is_populated());
        assert!(buffer.read().is_empty());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut buffer = populated(b"twice");
        buffer.release();
        assert!(!buffer.is_populated());
        buffer.release();
        drop(buffer);
    }

    #[test]
    fn test_reused_handle_releases_previous_allocation() {
        let mut buffer = populated(b"first");
        unsafe { buffer.as_raw().write(b"second".to_vec()) };
        assert_eq!(buffer.read(), b"second");
    }
}
