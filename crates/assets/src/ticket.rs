use crate::loader::AssetFailure;
use crate::resource::ResourceTable;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

/// Why a load did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{} asset(s) failed to load: {}", .failures.len(), join(.failures))]
    AssetsFailed { failures: Vec<AssetFailure> },
    #[error("asset loader disconnected before completing")]
    LoaderDisconnected,
}

fn join(failures: &[AssetFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Completion handle returned by a load. Resolves exactly once.
#[derive(Debug)]
pub struct LoadTicket {
    rx: Receiver<Result<ResourceTable, LoadError>>,
    taken: bool,
}

/// Producer side of a [`LoadTicket`].
#[derive(Debug)]
pub struct LoadCompleter(Sender<Result<ResourceTable, LoadError>>);

impl LoadTicket {
    pub fn pair() -> (LoadCompleter, LoadTicket) {
        let (tx, rx) = bounded(1);
        (LoadCompleter(tx), LoadTicket { rx, taken: false })
    }

    /// An already resolved ticket.
    pub fn resolved(result: Result<ResourceTable, LoadError>) -> LoadTicket {
        let (completer, ticket) = Self::pair();
        completer.complete(result);
        ticket
    }

    /// Take the result if it has arrived. Yields `Some` at most once.
    ///
    /// A completer dropped without completing yields
    /// `LoadError::LoaderDisconnected`.
    pub fn try_take(&mut self) -> Option<Result<ResourceTable, LoadError>> {
        if self.taken {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::LoaderDisconnected),
        };
        self.taken = true;
        Some(result)
    }

    /// True once the result has been taken.
    pub fn is_taken(&self) -> bool {
        self.taken
    }
}

impl LoadCompleter {
    pub fn complete(self, result: Result<ResourceTable, LoadError>) {
        // A dropped ticket means the caller no longer cares.
        let _ = self.0.send(result);
    }
}
