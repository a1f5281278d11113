use crate::{BorrowedView, EncodedParams, RawBuffer};

/// Engine compile entry point: `(wasm, params, output) -> status`.
pub type CompileFn =
    for<'a> unsafe extern "C" fn(BorrowedView<'a>, EncodedParams, RawBuffer) -> u8;

/// Engine call entry point: `(module, calldata, params, output, gas) -> status`.
pub type CallFn = for<'a, 'b> unsafe extern "C" fn(
    BorrowedView<'a>,
    BorrowedView<'b>,
    EncodedParams,
    RawBuffer,
    *mut u64,
) -> u8;

/// Engine free entry point; must accept cells it populated, or empty cells.
pub type FreeFn = unsafe extern "C" fn(RawBuffer);

/// The three C-ABI functions an engine exposes to the host.
#[derive(Clone, Copy)]
pub struct EngineEntryPoints {
    pub compile: CompileFn,
    pub call: CallFn,
    pub free: FreeFn,
}

impl std::fmt::Debug for EngineEntryPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEntryPoints")
            .field("compile", &(self.compile as *const ()))
            .field("call", &(self.call as *const ()))
            .field("free", &(self.free as *const ()))
            .finish()
    }
}
