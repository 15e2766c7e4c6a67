use crate::descriptor::AssetDescriptor;
use crate::loader::{AssetFailure, AssetLoader, BatchOutcome, BatchSender, PendingBatch};
use crate::resource::Resource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Held = Arc<Mutex<Vec<(BatchSender, BatchOutcome)>>>;

/// Serves assets from in-memory bytes keyed by source.
///
/// Completes batches immediately unless created with [`MemoryLoader::gated`],
/// in which case batches stay in flight until the gate releases them.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    held: Option<Held>,
    batches: usize,
}

/// Releases batches held by a gated [`MemoryLoader`].
#[derive(Debug, Clone)]
pub struct LoadGate {
    held: Held,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, LoadGate) {
        let held = Held::default();
        let loader = Self {
            held: Some(held.clone()),
            ..Self::default()
        };
        (loader, LoadGate { held })
    }

    pub fn with_file(mut self, source: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(source, data);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(source.into(), data.into());
    }

    /// Number of batches begun.
    pub fn batches(&self) -> usize {
        self.batches
    }

    fn build(&self, batch: &[AssetDescriptor]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for d in batch {
            let result = match self.files.get(&d.source) {
                Some(bytes) => Resource::from_bytes(d, bytes.clone()).map_err(|e| e.to_string()),
                None => Err(format!("no such asset: {}", d.source)),
            };
            match result {
                Ok(r) => outcome.loaded.push(r),
                Err(reason) => outcome.failures.push(AssetFailure {
                    key: d.key.clone(),
                    reason,
                }),
            }
        }
        outcome
    }
}

impl AssetLoader for MemoryLoader {
    fn begin(&mut self, batch: Vec<AssetDescriptor>) -> PendingBatch {
        self.batches += 1;
        let outcome = self.build(&batch);
        let (tx, pending) = PendingBatch::channel(batch.len());
        match &self.held {
            Some(held) => held
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((tx, outcome)),
            None => tx.send(outcome),
        }
        pending
    }
}

impl LoadGate {
    /// Deliver every held batch. Returns how many were released.
    pub fn release_all(&self) -> usize {
        let held = std::mem::take(&mut *self.held.lock().unwrap_or_else(PoisonError::into_inner));
        let n = held.len();
        for (tx, outcome) in held {
            tx.send(outcome);
        }
        n
    }

    /// Drop every held batch without reporting, as a crashed loader would.
    pub fn abandon_all(&self) -> usize {
        let held = std::mem::take(&mut *self.held.lock().unwrap_or_else(PoisonError::into_inner));
        held.len()
    }

    pub fn pending(&self) -> usize {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
