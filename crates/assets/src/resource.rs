use crate::descriptor::{AssetDescriptor, AssetKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Content-addressed asset ID: the first 8 bytes of the SHA-256 of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A loaded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub key: String,
    pub source: String,
    pub kind: AssetKind,
    pub id: AssetId,
    pub data: Arc<[u8]>,
    /// Parsed document for `AssetKind::Json` assets.
    pub json: Option<serde_json::Value>,
}

impl Resource {
    /// Build a resource from raw bytes. JSON assets are parsed here.
    pub fn from_bytes(
        descriptor: &AssetDescriptor,
        data: Vec<u8>,
    ) -> Result<Self, serde_json::Error> {
        let json = match descriptor.kind {
            AssetKind::Json => Some(serde_json::from_slice(&data)?),
            _ => None,
        };
        Ok(Self {
            key: descriptor.key.clone(),
            source: descriptor.source.clone(),
            kind: descriptor.kind,
            id: AssetId::of(&data),
            data: data.into(),
            json,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Accumulated mapping of logical key to loaded resource.
///
/// Cloning is cheap: entries are shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTable {
    entries: BTreeMap<String, Arc<Resource>>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing only an entry with the same key.
    pub fn insert(&mut self, resource: Resource) {
        self.entries
            .insert(resource.key.clone(), Arc::new(resource));
    }

    /// Merge `other` into this table. Keys absent from `other` are kept.
    pub fn merge(&mut self, other: ResourceTable) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Resource>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Resource>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Resource> for ResourceTable {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        let mut table = Self::new();
        for r in iter {
            table.insert(r);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(key: &str, data: &[u8]) -> Resource {
        Resource::from_bytes(&AssetDescriptor::new(key, format!("{key}.bin")), data.to_vec())
            .unwrap()
    }

    #[test]
    fn content_addressed_ids() {
        assert_eq!(AssetId::of(b"abc"), AssetId::of(b"abc"));
        assert_ne!(AssetId::of(b"abc"), AssetId::of(b"abd"));
        assert_eq!(AssetId::of(b"abc").to_string().len(), 16);
    }

    #[test]
    fn json_is_parsed() {
        let d = AssetDescriptor::new("level", "level.json");
        let r = Resource::from_bytes(&d, br#"{"w": 3}"#.to_vec()).unwrap();
        assert_eq!(r.json.as_ref().unwrap()["w"], 3);
    }

    #[test]
    fn bad_json_is_an_error() {
        let d = AssetDescriptor::new("level", "level.json");
        assert!(Resource::from_bytes(&d, b"{".to_vec()).is_err());
    }

    #[test]
    fn merge_keeps_unrelated_keys() {
        let mut table: ResourceTable = [res("a", b"1"), res("b", b"2")].into_iter().collect();
        let update: ResourceTable = [res("b", b"3"), res("c", b"4")].into_iter().collect();
        table.merge(update);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(&*table.get("b").unwrap().data, b"3");
        assert_eq!(&*table.get("a").unwrap().data, b"1");
    }
}
