//! # gasket-abi
//!
//! The wire contract between a gasket host and a metered WASM engine.
//!
//! Both sides of the boundary link against this crate so that they agree on:
//! - the fixed layout of [`EncodedParams`]
//! - [`BorrowedView`], a zero-copy view over host-owned input
//! - [`RawBuffer`], the out-cells through which the engine returns an
//!   allocation the host must hand back for freeing
//! - [`UserStatus`], the single status byte every entry point returns
//! - [`EngineEntryPoints`], the table of C-ABI functions an engine exposes
//!
//! ## Example
//!
//! ```ignore
//! use gasket_abi::{BorrowedView, ExecutionParams};
//!
//! let params = ExecutionParams::load("params.toml")?;
//! let wasm = std::fs::read("program.wasm")?;
//!
//! let status = unsafe {
//!     (engine.compile)(BorrowedView::new(&wasm), params.encode(), output.as_raw())
//! };
//! ```

mod buffer;
mod entry;
mod error;
mod params;
mod status;
mod view;

pub use buffer::RawBuffer;
pub use entry::{CallFn, CompileFn, EngineEntryPoints, FreeFn};
pub use error::{Error, Result};
pub use params::{EncodedParams, ExecutionParams, DEFAULT_VERSION};
pub use status::UserStatus;
pub use view::BorrowedView;
