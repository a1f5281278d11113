use std::marker::PhantomData;

/// A non-owning pointer and length over caller-held bytes.
///
/// The lifetime ties the view to the slice it was built from, so the source
/// buffer stays alive and unmodified for as long as the view exists. The
/// receiving side must not retain the view past the call it was passed to.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BorrowedView<'a> {
    ptr: *const u8,
    len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> BorrowedView<'a> {
    /// Wrap `bytes` without copying.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
            _marker: PhantomData,
        }
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reconstitute the viewed bytes on the receiving side.
    ///
    /// # Safety
    /// The view must have been built by [`BorrowedView::new`] from memory that
    /// is still live, which holds whenever it arrives as an argument of the
    /// call that created it.
    pub unsafe fn as_slice(&self) -> &'a [u8] {
        if self.ptr.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.ptr, self.len)
    }
}

impl<'a> From<&'a [u8]> for BorrowedView<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for BorrowedView<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
