use crate::descriptor::AssetDescriptor;
use crate::resource::Resource;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use std::fmt;

/// One asset that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub key: String,
    pub reason: String,
}

impl fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

/// Everything a loader produced for one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub loaded: Vec<Resource>,
    pub failures: Vec<AssetFailure>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of checking a pending batch without blocking.
#[derive(Debug)]
pub enum BatchPoll {
    Pending,
    Done(BatchOutcome),
    /// The loader dropped the batch without reporting.
    Disconnected,
}

/// Loader side of a batch. Sending consumes it, so a batch completes once.
#[derive(Debug)]
pub struct BatchSender(Sender<BatchOutcome>);

impl BatchSender {
    pub fn send(self, outcome: BatchOutcome) {
        // The receiver may already be gone; nobody is waiting then.
        let _ = self.0.send(outcome);
    }
}

/// Caller side of a batch handed to a loader.
#[derive(Debug)]
pub struct PendingBatch {
    rx: Receiver<BatchOutcome>,
    len: usize,
}

impl PendingBatch {
    pub fn channel(len: usize) -> (BatchSender, PendingBatch) {
        let (tx, rx) = bounded(1);
        (BatchSender(tx), PendingBatch { rx, len })
    }

    /// A batch that is already complete.
    pub fn ready(outcome: BatchOutcome) -> PendingBatch {
        let len = outcome.loaded.len() + outcome.failures.len();
        let (tx, pending) = Self::channel(len);
        tx.send(outcome);
        pending
    }

    /// Number of descriptors in the batch.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn try_finish(&self) -> BatchPoll {
        match self.rx.try_recv() {
            Ok(outcome) => BatchPoll::Done(outcome),
            Err(TryRecvError::Empty) => BatchPoll::Pending,
            Err(TryRecvError::Disconnected) => BatchPoll::Disconnected,
        }
    }
}

/// Asynchronous multi-asset loader.
///
/// `begin` must not block; the outcome is delivered through the returned
/// batch once every descriptor has either loaded or failed.
pub trait AssetLoader {
    fn begin(&mut self, batch: Vec<AssetDescriptor>) -> PendingBatch;
}
