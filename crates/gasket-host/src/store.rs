use crate::program_id::ProgramId;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no module for program {program} at version {version}")]
    ModuleNotFound { version: u32, program: ProgramId },
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent home of compiled modules, keyed by `(version, program)`.
pub trait ModuleStore {
    /// Take ownership of a freshly compiled module.
    fn add_user_module(
        &mut self,
        version: u32,
        program: ProgramId,
        module: Vec<u8>,
    ) -> StoreResult<()>;

    /// Fetch a module previously stored under `(version, program)`.
    fn get_user_module(&self, version: u32, program: ProgramId) -> StoreResult<Vec<u8>>;
}

/// Host state a call collects from before handing control to the engine.
pub trait StateDb: ModuleStore {
    /// Note that `program` was accessed. Only recording implementations care.
    fn record_program(&mut self, _program: ProgramId) {}

    /// Whether execution must be replayable, so every state read has to be
    /// mirrored to collect its preimage.
    fn deterministic(&self) -> bool {
        false
    }

    /// Read the program's raw code.
    fn get_code(&mut self, program: ProgramId) -> Vec<u8>;
}

/// A state access observed by [`MemoryStore`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateAccess {
    Recorded(ProgramId),
    CodeRead(ProgramId),
    ModuleFetched { version: u32, program: ProgramId },
    ModuleStored { version: u32, program: ProgramId },
}

/// In-memory [`StateDb`] that logs every access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    modules: HashMap<(u32, ProgramId), Vec<u8>>,
    code: HashMap<ProgramId, Vec<u8>>,
    deterministic: bool,
    accesses: Mutex<Vec<StateAccess>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store as requiring deterministic preimage collection.
    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    /// Set the raw code returned for `program`.
    pub fn set_code(&mut self, program: ProgramId, code: Vec<u8>) {
        self.code.insert(program, code);
    }

    pub fn contains_module(&self, version: u32, program: ProgramId) -> bool {
        self.modules.contains_key(&(version, program))
    }

    /// Number of stored modules across all versions.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Snapshot of the access log.
    pub fn accesses(&self) -> Vec<StateAccess> {
        self.log().clone()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<StateAccess>> {
        self.accesses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ModuleStore for MemoryStore {
    fn add_user_module(
        &mut self,
        version: u32,
        program: ProgramId,
        module: Vec<u8>,
    ) -> StoreResult<()> {
        self.log()
            .push(StateAccess::ModuleStored { version, program });
        self.modules.insert((version, program), module);
        Ok(())
    }

    fn get_user_module(&self, version: u32, program: ProgramId) -> StoreResult<Vec<u8>> {
        self.log()
            .push(StateAccess::ModuleFetched { version, program });
        self.modules
            .get(&(version, program))
            .cloned()
            .ok_or(StoreError::ModuleNotFound { version, program })
    }
}

impl StateDb for MemoryStore {
    fn record_program(&mut self, program: ProgramId) {
        self.log().push(StateAccess::Recorded(program));
    }

    fn deterministic(&self) -> bool {
        self.deterministic
    }

    fn get_code(&mut self, program: ProgramId) -> Vec<u8> {
        self.log().push(StateAccess::CodeRead(program));
        self.code.get(&program).cloned().unwrap_or_default()
    }
}
