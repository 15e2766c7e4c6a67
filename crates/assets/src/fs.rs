use crate::descriptor::AssetDescriptor;
use crate::loader::{AssetFailure, AssetLoader, BatchOutcome, BatchSender, PendingBatch};
use crate::resource::Resource;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("source escapes the loader root: {0}")]
    OutsideRoot(String),
}

/// Only plain relative paths stay under the root.
fn is_confined(source: &str) -> bool {
    Path::new(source)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Loads assets from files under a root directory on a background thread.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every file under the root, keyed by its `/`-separated relative path,
    /// in sorted order.
    pub fn discover(&self) -> std::io::Result<Vec<AssetDescriptor>> {
        let mut found = Vec::new();
        let mut dirs = vec![self.root.clone()];
        while let Some(dir) = dirs.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    dirs.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let source = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    found.push(AssetDescriptor::from(source.as_str()));
                }
            }
        }
        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }

    fn read_one(root: &Path, descriptor: &AssetDescriptor) -> Result<Resource, ReadError> {
        if !is_confined(&descriptor.source) {
            return Err(ReadError::OutsideRoot(descriptor.source.clone()));
        }
        let data = std::fs::read(root.join(&descriptor.source))?;
        Ok(Resource::from_bytes(descriptor, data)?)
    }

    fn read_batch(root: &Path, batch: Vec<AssetDescriptor>, tx: BatchSender) {
        let mut outcome = BatchOutcome::default();
        for descriptor in &batch {
            match Self::read_one(root, descriptor) {
                Ok(resource) => {
                    tracing::debug!(key = %descriptor.key, id = %resource.id, bytes = resource.len(), "asset loaded");
                    outcome.loaded.push(resource);
                }
                Err(e) => {
                    tracing::warn!(key = %descriptor.key, source = %descriptor.source, error = %e, "asset failed to load");
                    outcome.failures.push(AssetFailure {
                        key: descriptor.key.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        tx.send(outcome);
    }
}

impl AssetLoader for FsLoader {
    fn begin(&mut self, batch: Vec<AssetDescriptor>) -> PendingBatch {
        let (tx, pending) = PendingBatch::channel(batch.len());
        let root = self.root.clone();
        let keys: Vec<String> = batch.iter().map(|d| d.key.clone()).collect();
        tracing::info!(count = batch.len(), root = %root.display(), "loading assets");

        let spawned = std::thread::Builder::new()
            .name("skyview-asset-loader".into())
            .spawn(move || Self::read_batch(&root, batch, tx));

        match spawned {
            Ok(_) => pending,
            Err(e) => {
                tracing::warn!(error = %e, "could not start loader thread");
                PendingBatch::ready(BatchOutcome {
                    loaded: Vec::new(),
                    failures: keys
                        .into_iter()
                        .map(|key| AssetFailure {
                            key,
                            reason: format!("loader thread failed to start: {e}"),
                        })
                        .collect(),
                })
            }
        }
    }
}
