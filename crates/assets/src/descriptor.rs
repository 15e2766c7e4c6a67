use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a loaded asset contains. Inferred from the source extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Parsed as JSON on load.
    Json,
    Image,
    Audio,
    Text,
    Binary,
}

impl AssetKind {
    pub fn from_source(source: &str) -> Self {
        let ext = Path::new(source)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Self::Json,
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp") => Self::Image,
            Some("ogg" | "wav" | "mp3" | "flac") => Self::Audio,
            Some("txt" | "csv" | "md") => Self::Text,
            _ => Self::Binary,
        }
    }
}

/// A request to load one asset under a logical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub key: String,
    /// Location understood by the loader (a relative path for `FsLoader`).
    pub source: String,
    pub kind: AssetKind,
}

impl AssetDescriptor {
    pub fn new(key: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            key: key.into(),
            kind: AssetKind::from_source(&source),
            source,
        }
    }

    pub fn with_kind(mut self, kind: AssetKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A bare source doubles as its own key.
impl From<&str> for AssetDescriptor {
    fn from(source: &str) -> Self {
        Self::new(source, source)
    }
}

impl From<(&str, &str)> for AssetDescriptor {
    fn from((key, source): (&str, &str)) -> Self {
        Self::new(key, source)
    }
}
