//! # gasket-host
//!
//! Host side of the gasket bridge.
//!
//! This crate provides:
//! - [`Bridge`], which compiles and calls programs through an engine's C
//!   entry points
//! - [`EngineBuffer`], the move-only handle for engine-owned output
//! - [`Outcome`], the success / revert / failure decoding of a status byte
//! - [`ModuleStore`] and [`StateDb`], the seams to the host's state, with an
//!   in-memory [`MemoryStore`]
//!
//! ## Example
//!
//! ```ignore
//! use gasket_host::{Bridge, ExecutionParams, MemoryStore, ProgramId};
//!
//! let bridge = Bridge::native();
//! let mut db = MemoryStore::new();
//! let params = ExecutionParams::default();
//! let program = ProgramId::from_code(&wasm);
//!
//! bridge.compile_user_wasm(&mut db, program, &wasm, &params)?;
//!
//! let mut gas = 1_000_000;
//! let output = bridge.call_user_wasm(&mut db, program, b"input", &mut gas, &params)?;
//! ```

mod buffer;
mod error;
mod outcome;
mod program;
mod program_id;
mod store;

pub use buffer::EngineBuffer;
pub use error::{Error, Result};
pub use outcome::{EngineFailure, FailureKind, Outcome};
pub use program::Bridge;
pub use program_id::{ProgramId, ProgramIdError};
pub use store::{MemoryStore, ModuleStore, StateAccess, StateDb, StoreError, StoreResult};

// Re-export gasket-abi types for convenience
pub use gasket_abi::{EngineEntryPoints, ExecutionParams, UserStatus};
