//! Asynchronous resource loading.
//!
//! Callers queue [`AssetDescriptor`]s, hand the batch to an [`AssetLoader`],
//! and later collect the outcome from the returned [`PendingBatch`] without
//! blocking. Loaded assets are identified by content hash and accumulated in a
//! [`ResourceTable`] that is merged, never replaced.

mod descriptor;
mod fs;
mod loader;
mod memory;
mod resource;
mod ticket;

pub use descriptor::{AssetDescriptor, AssetKind};
pub use fs::FsLoader;
pub use loader::{AssetFailure, AssetLoader, BatchOutcome, BatchPoll, BatchSender, PendingBatch};
pub use memory::{LoadGate, MemoryLoader};
pub use resource::{AssetId, Resource, ResourceTable};
pub use ticket::{LoadCompleter, LoadError, LoadTicket};
