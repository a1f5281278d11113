//! # gasket-engine
//!
//! Reference engine for the gasket boundary protocol.
//!
//! This crate uses [wasmtime](https://wasmtime.dev/) with fuel metering to
//! compile and run user programs, and exposes the engine side of the
//! protocol as three C-ABI functions: [`gasket_compile`], [`gasket_call`] and
//! [`gasket_free`].
//!
//! ## Guest ABI
//!
//! A callable program exports `memory` and
//! `user_entrypoint(args_len: i32) -> i32`, returning zero on success and
//! anything else to revert. It may import from the `host` module:
//!
//! - `read_args(dest: i32)` copies the calldata to `dest`
//! - `write_result(ptr: i32, len: i32)` sets the return or revert data
//! - `gas_left() -> i64` reports the remaining gas
//!
//! Each hook costs `hostio_cost` fuel. One unit of host gas buys
//! `wasm_gas_price` units of fuel.
//!
//! ## Example
//!
//! ```ignore
//! use gasket_abi::ExecutionParams;
//! use gasket_engine::{ProgramOutput, WasmRunner};
//!
//! let runner = WasmRunner::new(&ExecutionParams::default())?;
//! let module = runner.compile(&wasm_bytes)?;
//!
//! let mut gas = 1_000_000;
//! match runner.call(&module, b"calldata", &mut gas)? {
//!     ProgramOutput::Success(data) => println!("returned {} bytes", data.len()),
//!     ProgramOutput::Revert(data) => println!("reverted with {} bytes", data.len()),
//! }
//! ```

pub mod error;
pub mod ffi;
pub mod host;
pub mod runner;

pub use error::{Error, Result};
pub use ffi::{entry_points, gasket_call, gasket_compile, gasket_free};
pub use host::{GasMeter, HostFunctions, HostState};
pub use runner::{ExecutionConfig, ProgramOutput, WasmRunner, SUPPORTED_VERSION};
