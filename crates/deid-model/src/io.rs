//! Load and save seams between pipelines and storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::DataIoError;
use crate::table::Table;

/// Produces the table a pipeline runs against.
pub trait TableSource: Send {
    /// Human-readable origin, used in logs and errors.
    fn location(&self) -> String;

    fn load(&self) -> Result<Table, DataIoError>;
}

/// Persists the table a pipeline produced.
pub trait TableSink: Send {
    /// Human-readable destination, used in logs and errors.
    fn location(&self) -> String;

    fn save(&self, table: &Table) -> Result<(), DataIoError>;
}

/// Source serving a fixed in-memory table; counts how often it was loaded.
#[derive(Debug, Default)]
pub struct MemorySource {
    table: Table,
    loads: AtomicUsize,
}

impl MemorySource {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl TableSource for MemorySource {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Table, DataIoError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.clone())
    }
}

impl TableSource for Arc<MemorySource> {
    fn location(&self) -> String {
        self.as_ref().location()
    }

    fn load(&self) -> Result<Table, DataIoError> {
        self.as_ref().load()
    }
}

/// Sink keeping the last saved table; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    saved: Arc<Mutex<Option<Table>>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently saved table, if any.
    pub fn saved(&self) -> Option<Table> {
        self.saved.lock().ok().and_then(|slot| slot.clone())
    }
}

impl TableSink for MemoryTarget {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn save(&self, table: &Table) -> Result<(), DataIoError> {
        let mut slot = self
            .saved
            .lock()
            .map_err(|err| DataIoError::save(self.location(), err.to_string()))?;
        *slot = Some(table.clone());
        Ok(())
    }
}
