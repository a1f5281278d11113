use crate::{Error, Result};
use wasmtime::{Caller, Linker, Memory, ResourceLimiter, Trap};

/// Import module name under which host hooks are registered.
pub const HOST_MODULE: &str = "host";

/// WASM page size in bytes.
pub const WASM_PAGE_SIZE: usize = 65536;

/// Conversion between host gas and engine fuel for one call.
///
/// The fuel budget saturates at `u64::MAX`, so the gas balance is always
/// derived from the fuel actually consumed rather than from what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    gas: u64,
    price: u64,
    fuel_budget: u64,
}

impl GasMeter {
    /// Meter `gas` at `price` fuel per unit. `price` must be nonzero.
    pub fn new(gas: u64, price: u64) -> Self {
        Self {
            gas,
            price,
            fuel_budget: gas.saturating_mul(price),
        }
    }

    /// Fuel to load into the store before the call.
    pub fn fuel_budget(&self) -> u64 {
        self.fuel_budget
    }

    /// Gas left once the store is down to `fuel_left`; partial units are charged in full.
    pub fn gas_left(&self, fuel_left: u64) -> u64 {
        let consumed = self.fuel_budget.saturating_sub(fuel_left);
        self.gas.saturating_sub(consumed.div_ceil(self.price))
    }
}

/// State shared between host hooks and the WASM guest for one call.
#[derive(Debug)]
pub struct HostState {
    /// Call input, copied in once per call.
    pub calldata: Vec<u8>,
    /// Bytes set by the last `write_result`.
    pub output: Vec<u8>,
    /// Fuel charged for every hook invocation.
    pub hostio_cost: u64,
    /// Gas to fuel conversion for this call.
    pub meter: GasMeter,
    /// Linear memory ceiling in bytes.
    pub heap_limit_bytes: usize,
}

impl HostState {
    /// Create a new `HostState`.
    pub fn new(
        calldata: Vec<u8>,
        hostio_cost: u64,
        meter: GasMeter,
        heap_limit_bytes: usize,
    ) -> Self {
        Self {
            calldata,
            output: Vec::new(),
            hostio_cost,
            meter,
            heap_limit_bytes,
        }
    }
}

impl ResourceLimiter for HostState {
    fn memory_growing(
        &mut self,
        current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        if desired > self.heap_limit_bytes {
            tracing::debug!(
                current_bytes = current,
                desired_bytes = desired,
                limit_bytes = self.heap_limit_bytes,
                "memory grow rejected: exceeds heap bound"
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn table_growing(
        &mut self,
        _current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        const MAX_TABLE_ELEMENTS: usize = 10_000;
        Ok(desired <= MAX_TABLE_ELEMENTS)
    }
}

/// Host functions exposed to WASM guests.
pub struct HostFunctions;

impl HostFunctions {
    /// Register all host functions with the linker.
    pub fn register(linker: &mut Linker<HostState>) -> Result<()> {
        // Copy calldata into guest memory
        linker
            .func_wrap(
                HOST_MODULE,
                "read_args",
                |mut caller: Caller<'_, HostState>, dest: i32| -> anyhow::Result<()> {
                    Self::read_args(&mut caller, dest)
                },
            )
            .map_err(|e| Error::Wasm(e.to_string()))?;

        // Record the program's result or revert data
        linker
            .func_wrap(
                HOST_MODULE,
                "write_result",
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| -> anyhow::Result<()> {
                    Self::write_result(&mut caller, ptr, len)
                },
            )
            .map_err(|e| Error::Wasm(e.to_string()))?;

        linker
            .func_wrap(
                HOST_MODULE,
                "gas_left",
                |mut caller: Caller<'_, HostState>| -> anyhow::Result<i64> {
                    Self::gas_left(&mut caller)
                },
            )
            .map_err(|e| Error::Wasm(e.to_string()))?;

        Ok(())
    }

    fn read_args(caller: &mut Caller<'_, HostState>, dest: i32) -> anyhow::Result<()> {
        Self::charge_hostio(caller)?;
        let calldata = std::mem::take(&mut caller.data_mut().calldata);
        let written = Self::write_bytes_to_memory(caller, dest, &calldata);
        caller.data_mut().calldata = calldata;
        written?;
        Ok(())
    }

    fn write_result(caller: &mut Caller<'_, HostState>, ptr: i32, len: i32) -> anyhow::Result<()> {
        Self::charge_hostio(caller)?;
        let data = Self::read_bytes_from_memory(caller, ptr, len)?;
        caller.data_mut().output = data;
        Ok(())
    }

    fn gas_left(caller: &mut Caller<'_, HostState>) -> anyhow::Result<i64> {
        Self::charge_hostio(caller)?;
        let fuel = caller.get_fuel()?;
        let gas = caller.data().meter.gas_left(fuel);
        Ok(i64::try_from(gas).unwrap_or(i64::MAX))
    }

    /// Deduct the fixed hook cost, trapping with `OutOfFuel` when short.
    fn charge_hostio(caller: &mut Caller<'_, HostState>) -> anyhow::Result<()> {
        let cost = caller.data().hostio_cost;
        let fuel = caller.get_fuel()?;
        if fuel < cost {
            caller.set_fuel(0)?;
            return Err(Trap::OutOfFuel.into());
        }
        caller.set_fuel(fuel - cost)?;
        Ok(())
    }

    /// Helper: Read bytes from WASM memory.
    fn read_bytes_from_memory(
        caller: &mut Caller<'_, HostState>,
        ptr: i32,
        len: i32,
    ) -> Result<Vec<u8>> {
        let memory = Self::get_memory(caller)?;
        let (offset, len) = (ptr as u32 as usize, len as u32 as usize);
        Self::check_bounds(caller, memory, offset, len)?;
        let mut buffer = vec![0u8; len];
        memory
            .read(&*caller, offset, &mut buffer)
            .map_err(|e| Error::HostFunction(e.to_string()))?;
        Ok(buffer)
    }

    /// Helper: Write bytes to WASM memory.
    fn write_bytes_to_memory(
        caller: &mut Caller<'_, HostState>,
        ptr: i32,
        data: &[u8],
    ) -> Result<()> {
        let memory = Self::get_memory(caller)?;
        let offset = ptr as u32 as usize;
        Self::check_bounds(caller, memory, offset, data.len())?;
        memory
            .write(&mut *caller, offset, data)
            .map_err(|e| Error::HostFunction(e.to_string()))?;
        Ok(())
    }

    fn check_bounds(
        caller: &Caller<'_, HostState>,
        memory: Memory,
        offset: usize,
        len: usize,
    ) -> Result<()> {
        let size = memory.data_size(caller);
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(()),
            _ => Err(Error::HostFunction(format!(
                "access {}+{} out of bounds for memory of {} bytes",
                offset, len, size
            ))),
        }
    }

    /// Helper: Get memory export from WASM instance.
    fn get_memory(caller: &mut Caller<'_, HostState>) -> Result<Memory> {
        caller
            .get_export("memory")
            .and_then(|ext| ext.into_memory())
            .ok_or_else(|| Error::HostFunction("Memory export not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_limit_rejects_growth() {
        let mut state = HostState::new(Vec::new(), 0, GasMeter::new(0, 1), 2 * WASM_PAGE_SIZE);

        assert!(state
            .memory_growing(0, 2 * WASM_PAGE_SIZE, None)
            .unwrap());
        assert!(!state
            .memory_growing(2 * WASM_PAGE_SIZE, 3 * WASM_PAGE_SIZE, None)
            .unwrap());
    }

    #[test]
    fn test_table_growth_is_capped() {
        let mut state = HostState::new(Vec::new(), 0, GasMeter::new(0, 1), WASM_PAGE_SIZE);
        assert!(state.table_growing(0, 16, None).unwrap());
        assert!(!state.table_growing(0, 1_000_000, None).unwrap());
    }

    #[test]
    fn test_gas_meter_rounds_partial_units_up() {
        let meter = GasMeter::new(100, 10);
        assert_eq!(meter.fuel_budget(), 1_000);
        assert_eq!(meter.gas_left(1_000), 100);
        assert_eq!(meter.gas_left(999), 99);
        assert_eq!(meter.gas_left(990), 99);
        assert_eq!(meter.gas_left(989), 98);
        assert_eq!(meter.gas_left(0), 0);
    }

    #[test]
    fn test_gas_meter_saturated_budget_charges_consumption() {
        let gas = u64::MAX / 2;
        let meter = GasMeter::new(gas, 10_000);
        assert_eq!(meter.fuel_budget(), u64::MAX);
        assert_eq!(meter.gas_left(u64::MAX), gas);
        assert_eq!(meter.gas_left(u64::MAX - 5), gas - 1);
        assert_eq!(meter.gas_left(u64::MAX - 20_001), gas - 3);
    }
}
