use crate::buffer::EngineBuffer;
use crate::outcome::Outcome;
use crate::program_id::ProgramId;
use crate::store::{ModuleStore, StateDb};
use crate::{Error, Result};
use gasket_abi::{BorrowedView, EngineEntryPoints, ExecutionParams};

/// Compiles and calls user programs through an engine's entry points.
///
/// The bridge holds no state between calls, so one value can serve any
/// number of threads as long as each call brings its own gas cell.
#[derive(Debug, Clone, Copy)]
pub struct Bridge {
    engine: EngineEntryPoints,
}

impl Bridge {
    /// Create a bridge over the given engine entry points.
    pub fn new(engine: EngineEntryPoints) -> Self {
        Self { engine }
    }

    /// Create a bridge over the bundled wasmtime engine.
    pub fn native() -> Self {
        Self::new(gasket_engine::entry_points())
    }

    /// Compile `wasm` and return the engine's module bytes.
    pub fn compile(&self, wasm: &[u8], params: &ExecutionParams) -> Result<Vec<u8>> {
        self.compile_outcome(wasm, params).into_result()
    }

    /// Compile `wasm` and store the module under `(params.version, program)`.
    ///
    /// Nothing is stored unless compilation succeeds. Concurrent compiles for
    /// one program must be serialized by the caller.
    pub fn compile_user_wasm<D>(
        &self,
        db: &mut D,
        program: ProgramId,
        wasm: &[u8],
        params: &ExecutionParams,
    ) -> Result<()>
    where
        D: ModuleStore + ?Sized,
    {
        let module = self.compile(wasm, params)?;
        tracing::debug!(
            %program,
            version = params.version,
            module_len = module.len(),
            "storing compiled module"
        );
        db.add_user_module(params.version, program, module)?;
        Ok(())
    }

    /// Run `module` against `calldata`, debiting `gas` in place.
    ///
    /// On return `gas` holds the engine's authoritative balance, whatever the
    /// outcome.
    pub fn call(
        &self,
        module: &[u8],
        calldata: &[u8],
        params: &ExecutionParams,
        gas: &mut u64,
    ) -> Result<Vec<u8>> {
        self.call_outcome(module, calldata, params, gas).into_result()
    }

    /// Collect the program's state accesses, fetch its module, and call it.
    ///
    /// The program is recorded as accessed and, when `db` is deterministic,
    /// its code is read so the preimage is collected, in that order and
    /// before the module fetch. A missing module means the store and the
    /// bridge have diverged and yields [`Error::InvariantViolation`].
    pub fn call_user_wasm<D>(
        &self,
        db: &mut D,
        program: ProgramId,
        calldata: &[u8],
        gas: &mut u64,
        params: &ExecutionParams,
    ) -> Result<Vec<u8>>
    where
        D: StateDb + ?Sized,
    {
        db.record_program(program);
        if db.deterministic() {
            let _ = db.get_code(program);
        }

        let module = db
            .get_user_module(params.version, program)
            .map_err(|err| {
                tracing::error!(%program, version = params.version, "instance module does not exist: {}", err);
                Error::InvariantViolation(format!("instance module does not exist: {}", err))
            })?;

        self.call(&module, calldata, params, gas)
    }

    fn compile_outcome(&self, wasm: &[u8], params: &ExecutionParams) -> Outcome {
        let mut output = EngineBuffer::new(self.engine.free);
        // SAFETY: `wasm` and `output` outlive the call
        let status = unsafe {
            (self.engine.compile)(BorrowedView::new(wasm), params.encode(), output.as_raw())
        };
        Outcome::decode(status, output.read())
    }

    fn call_outcome(
        &self,
        module: &[u8],
        calldata: &[u8],
        params: &ExecutionParams,
        gas: &mut u64,
    ) -> Outcome {
        let gas_before = *gas;
        let mut output = EngineBuffer::new(self.engine.free);
        // SAFETY: the views, `output` and the exclusive gas borrow all outlive the call
        let status = unsafe {
            (self.engine.call)(
                BorrowedView::new(module),
                BorrowedView::new(calldata),
                params.encode(),
                output.as_raw(),
                &mut *gas as *mut u64,
            )
        };
        let outcome = Outcome::decode(status, output.read());

        tracing::debug!(
            status,
            gas_before,
            gas_left = *gas,
            "program call returned"
        );
        outcome
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::native()
    }
}
