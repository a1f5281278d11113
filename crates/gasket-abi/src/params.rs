use serde::{Deserialize, Serialize};
use std::path::Path;

/// Module format version understood by the current engine ABI.
pub const DEFAULT_VERSION: u32 = 1;

/// Host-side execution parameters for a compile or call.
///
/// The bridge never range-checks these values; the engine validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionParams {
    /// Module format and ABI version.
    pub version: u32,
    /// Call-stack depth bound.
    pub max_depth: u32,
    /// Per-frame memory bound in bytes.
    pub max_frame_size: u32,
    /// Total heap bound in 64 KiB pages.
    pub heap_bound: u32,
    /// Engine fuel charged per unit of host gas.
    pub wasm_gas_price: u64,
    /// Fixed cost charged per host-interaction call.
    pub hostio_cost: u64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            max_depth: 1024,
            max_frame_size: 512,
            heap_bound: 128,
            wasm_gas_price: 10_000,
            hostio_cost: 100,
        }
    }
}

impl ExecutionParams {
    /// Encode into the fixed layout passed across the engine boundary.
    pub fn encode(&self) -> EncodedParams {
        EncodedParams {
            version: self.version,
            max_depth: self.max_depth,
            max_frame_size: self.max_frame_size,
            heap_bound: self.heap_bound,
            wasm_gas_price: self.wasm_gas_price,
            hostio_cost: self.hostio_cost,
        }
    }

    /// Parse parameters from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> crate::Result<Self> {
        toml::from_str(text).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Load parameters from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Fixed binary layout of [`ExecutionParams`] as the engine reads it.
///
/// Field order and widths are the wire contract and change only together with
/// the module version.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedParams {
    pub version: u32,
    pub max_depth: u32,
    pub max_frame_size: u32,
    pub heap_bound: u32,
    pub wasm_gas_price: u64,
    pub hostio_cost: u64,
}

const _: () = assert!(std::mem::size_of::<EncodedParams>() == 32);
const _: () = assert!(std::mem::align_of::<EncodedParams>() == 8);

impl EncodedParams {
    /// Recover the host-side value. Exact inverse of [`ExecutionParams::encode`].
    pub fn decode(self) -> ExecutionParams {
        ExecutionParams {
            version: self.version,
            max_depth: self.max_depth,
            max_frame_size: self.max_frame_size,
            heap_bound: self.heap_bound,
            wasm_gas_price: self.wasm_gas_price,
            hostio_cost: self.hostio_cost,
        }
    }
}

impl From<ExecutionParams> for EncodedParams {
    fn from(params: ExecutionParams) -> Self {
        params.encode()
    }
}
