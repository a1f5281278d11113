use crate::host::{GasMeter, HostFunctions, HostState, WASM_PAGE_SIZE};
use crate::{Error, Result};
use gasket_abi::ExecutionParams;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use wasmtime::{Config, Engine, Linker, Module, Store, Trap};

/// Module format version this engine compiles and runs.
pub const SUPPORTED_VERSION: u32 = 1;

/// Ceiling on the wasm stack regardless of the configured depth and frame size.
pub const MAX_WASM_STACK: usize = 512 * 1024;

/// Name of the export every callable program provides.
pub const ENTRYPOINT: &str = "user_entrypoint";

/// Execution limits derived from validated [`ExecutionParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Wasm stack budget in bytes.
    pub stack_bytes: usize,
    /// Linear memory ceiling in bytes.
    pub heap_bytes: usize,
    /// Fuel per unit of host gas.
    pub wasm_gas_price: u64,
    /// Fuel charged per host hook invocation.
    pub hostio_cost: u64,
}

impl ExecutionConfig {
    /// Validate `params` and derive engine limits from them.
    pub fn from_params(params: &ExecutionParams) -> Result<Self> {
        if params.version != SUPPORTED_VERSION {
            return Err(Error::UnsupportedVersion(params.version));
        }
        if params.wasm_gas_price == 0 {
            return Err(Error::InvalidParams(
                "wasm_gas_price must be nonzero".to_string(),
            ));
        }

        let stack_bytes = (params.max_depth as usize)
            .saturating_mul(params.max_frame_size as usize)
            .min(MAX_WASM_STACK);
        if stack_bytes == 0 {
            return Err(Error::InvalidParams(
                "max_depth and max_frame_size must be nonzero".to_string(),
            ));
        }

        Ok(Self {
            stack_bytes,
            heap_bytes: (params.heap_bound as usize).saturating_mul(WASM_PAGE_SIZE),
            wasm_gas_price: params.wasm_gas_price,
            hostio_cost: params.hostio_cost,
        })
    }
}

/// What a program returned when it ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramOutput {
    /// The entrypoint returned zero.
    Success(Vec<u8>),
    /// The entrypoint returned non-zero.
    Revert(Vec<u8>),
}

/// WASM runtime runner using wasmtime with fuel metering.
pub struct WasmRunner {
    engine: Engine,
    config: ExecutionConfig,
}

impl WasmRunner {
    /// Create a runner for one compile or call under `params`.
    pub fn new(params: &ExecutionParams) -> Result<Self> {
        let config = ExecutionConfig::from_params(params)?;
        let engine = shared_engine(config.stack_bytes)?;
        Ok(Self { engine, config })
    }

    /// Get the execution configuration.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Validate and compile `wasm`, returning the serialized module.
    pub fn compile(&self, wasm: &[u8]) -> Result<Vec<u8>> {
        if wasm.is_empty() {
            return Err(Error::Wasm("empty module".to_string()));
        }

        let module = Module::new(&self.engine, wasm).map_err(|e| Error::Wasm(format!("{:#}", e)))?;
        let serialized = module
            .serialize()
            .map_err(|e| Error::Wasm(e.to_string()))?;

        tracing::debug!(
            wasm_len = wasm.len(),
            module_len = serialized.len(),
            "compiled program"
        );
        Ok(serialized)
    }

    /// Run a module produced by [`WasmRunner::compile`].
    ///
    /// `gas` is debited in place and holds the remaining balance on return,
    /// whatever the outcome; running out of fuel leaves it at zero.
    pub fn call(&self, module: &[u8], calldata: &[u8], gas: &mut u64) -> Result<ProgramOutput> {
        // SAFETY: module bytes only ever come from `compile` via the host's module store
        let module = unsafe { Module::deserialize(&self.engine, module) }
            .map_err(|e| Error::Wasm(format!("invalid module: {:#}", e)))?;

        let meter = GasMeter::new(*gas, self.config.wasm_gas_price);
        let state = HostState::new(
            calldata.to_vec(),
            self.config.hostio_cost,
            meter,
            self.config.heap_bytes,
        );
        let mut store = Store::new(&self.engine, state);
        store.limiter(|state| state);

        store
            .set_fuel(meter.fuel_budget())
            .map_err(|e| Error::Wasm(e.to_string()))?;

        let result = self.execute(&mut store, &module, calldata.len());

        let remaining = store.get_fuel().unwrap_or(0);
        *gas = match result {
            Err(Error::OutOfGas) => 0,
            _ => meter.gas_left(remaining),
        };

        tracing::debug!(
            fuel_budget = meter.fuel_budget(),
            fuel_left = remaining,
            gas_left = *gas,
            "program call finished"
        );
        result
    }

    fn execute(
        &self,
        store: &mut Store<HostState>,
        module: &Module,
        args_len: usize,
    ) -> Result<ProgramOutput> {
        let mut linker = Linker::new(&self.engine);
        HostFunctions::register(&mut linker)?;

        let instance = linker
            .instantiate(&mut *store, module)
            .map_err(classify_error)?;

        let entrypoint = instance
            .get_typed_func::<i32, i32>(&mut *store, ENTRYPOINT)
            .map_err(|e| Error::Wasm(format!("missing {} export: {}", ENTRYPOINT, e)))?;

        let args_len = i32::try_from(args_len)
            .map_err(|_| Error::InvalidParams(format!("calldata of {} bytes", args_len)))?;

        let status = entrypoint
            .call(&mut *store, args_len)
            .map_err(classify_error)?;

        let output = std::mem::take(&mut store.data_mut().output);
        if status == 0 {
            Ok(ProgramOutput::Success(output))
        } else {
            Ok(ProgramOutput::Revert(output))
        }
    }
}

/// Engine for a given stack budget, built once and shared by every runner.
///
/// `Engine` is reference counted, so handing out clones is cheap and all
/// runners with one stack budget share compiled code caches.
fn shared_engine(stack_bytes: usize) -> Result<Engine> {
    static ENGINES: OnceLock<Mutex<HashMap<usize, Engine>>> = OnceLock::new();

    let mut engines = ENGINES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(engine) = engines.get(&stack_bytes) {
        return Ok(engine.clone());
    }

    let mut wasmtime_config = Config::new();
    wasmtime_config.consume_fuel(true);
    wasmtime_config.max_wasm_stack(stack_bytes);

    let engine = Engine::new(&wasmtime_config).map_err(|e| Error::Wasm(e.to_string()))?;
    tracing::debug!(stack_bytes, "created wasmtime engine");
    engines.insert(stack_bytes, engine.clone());
    Ok(engine)
}

/// Classify a wasmtime error into the engine's failure taxonomy.
fn classify_error(error: anyhow::Error) -> Error {
    match error.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => Error::OutOfGas,
        Some(Trap::StackOverflow) => Error::OutOfStack,
        _ => {
            tracing::debug!("program failed: {:#}", error);
            Error::Wasm(format!("{:#}", error))
        }
    }
}
