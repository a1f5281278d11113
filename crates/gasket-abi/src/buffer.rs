use std::mem::ManuallyDrop;

/// Out-cells through which the engine hands an allocation to the host.
///
/// The host owns the three cells; the engine owns whatever they point to.
/// Only the engine that populated the cells may free their contents.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawBuffer {
    pub ptr: *mut *mut u8,
    pub len: *mut usize,
    pub cap: *mut usize,
}

impl RawBuffer {
    /// Move `data` into the host cells, giving up ownership on the engine side.
    ///
    /// # Safety
    /// The cells must be valid for writes and currently empty.
    pub unsafe fn write(self, data: Vec<u8>) {
        let mut data = ManuallyDrop::new(data);
        *self.ptr = data.as_mut_ptr();
        *self.len = data.len();
        *self.cap = data.capacity();
    }

    /// Drop the allocation the cells point at and clear them.
    ///
    /// Freeing empty cells is a no-op, so a repeated free does nothing.
    ///
    /// # Safety
    /// The cells must be valid or null, and if populated must describe a `Vec<u8>`
    /// previously stored by [`RawBuffer::write`] in this same allocator.
    pub unsafe fn free(self) {
        if self.ptr.is_null() {
            return;
        }
        let ptr = *self.ptr;
        if ptr.is_null() {
            return;
        }
        drop(Vec::from_raw_parts(ptr, *self.len, *self.cap));
        *self.ptr = std::ptr::null_mut();
        *self.len = 0;
        *self.cap = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cells {
        ptr: *mut u8,
        len: usize,
        cap: usize,
    }

    impl Cells {
        fn raw(&mut self) -> RawBuffer {
            RawBuffer {
                ptr: &mut self.ptr,
                len: &mut self.len,
                cap: &mut self.cap,
            }
        }
    }

    #[test]
    fn test_write_then_free_clears_cells() {
        let mut cells = Cells {
            ptr: std::ptr::null_mut(),
            len: 0,
            cap: 0,
        };

        unsafe { cells.raw().write(b"payload".to_vec()) };
        assert!(!cells.ptr.is_null());
        assert_eq!(cells.len, 7);
        assert!(cells.cap >= 7);

        let seen = unsafe { std::slice::from_raw_parts(cells.ptr, cells.len) };
        assert_eq!(seen, b"payload");

        unsafe { cells.raw().free() };
        assert!(cells.ptr.is_null());
        assert_eq!(cells.len, 0);

        // second free must be harmless
        unsafe { cells.raw().free() };
        assert!(cells.ptr.is_null());
    }
}
