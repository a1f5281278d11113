//! C-ABI entry points the host drives the engine through.
//!
//! Every entry point writes exactly one allocation into the host's output
//! cells and returns a [`UserStatus`] byte. Panics are caught here and
//! reported as failures, never unwound across the boundary.

use crate::runner::{ProgramOutput, WasmRunner};
use crate::{Error, Result};
use gasket_abi::{BorrowedView, EncodedParams, EngineEntryPoints, RawBuffer, UserStatus};
use std::panic::{self, AssertUnwindSafe};

/// Table of this engine's entry points, for hosts that link it directly.
pub fn entry_points() -> EngineEntryPoints {
    EngineEntryPoints {
        compile: gasket_compile,
        call: gasket_call,
        free: gasket_free,
    }
}

/// Compile `wasm`; on success the output holds the serialized module.
///
/// # Safety
/// `wasm` must view live memory and `output` must point at writable, empty
/// cells for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn gasket_compile(
    wasm: BorrowedView<'_>,
    params: EncodedParams,
    output: RawBuffer,
) -> u8 {
    let wasm = wasm.as_slice();
    let params = params.decode();

    let result = contain(|| WasmRunner::new(&params)?.compile(wasm));
    match result {
        Ok(module) => {
            output.write(module);
            UserStatus::Success.code()
        }
        Err(err) => report(err, output),
    }
}

/// Run a compiled module, debiting `gas` in place.
///
/// # Safety
/// Both views must reference live memory, `output` must point at writable,
/// empty cells, and `gas` must be null or valid for reads and writes, all for
/// the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn gasket_call(
    module: BorrowedView<'_>,
    calldata: BorrowedView<'_>,
    params: EncodedParams,
    output: RawBuffer,
    gas: *mut u64,
) -> u8 {
    if gas.is_null() {
        return report(Error::InvalidParams("null gas cell".to_string()), output);
    }
    let gas = &mut *gas;
    let module = module.as_slice();
    let calldata = calldata.as_slice();
    let params = params.decode();

    let result = contain(|| WasmRunner::new(&params)?.call(module, calldata, gas));
    match result {
        Ok(ProgramOutput::Success(data)) => {
            output.write(data);
            UserStatus::Success.code()
        }
        Ok(ProgramOutput::Revert(data)) => {
            output.write(data);
            UserStatus::Revert.code()
        }
        Err(err) => report(err, output),
    }
}

/// Release an allocation previously handed out by this engine.
///
/// # Safety
/// `output` must be cells populated by one of this engine's entry points, or
/// empty cells. Freed cells are cleared, so repeating the call is harmless.
#[no_mangle]
pub unsafe extern "C" fn gasket_free(output: RawBuffer) {
    output.free();
}

unsafe fn report(err: Error, output: RawBuffer) -> u8 {
    let status = err.status();
    tracing::debug!(status = status.code(), "engine call failed: {}", err);
    output.write(err.payload());
    status.code()
}

fn contain<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!("engine panicked: {}", message);
        Err(Error::Panic(message))
    })
}
