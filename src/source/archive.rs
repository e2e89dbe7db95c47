//! Local resource pack sources: unpacked directories and ZIP archives.

use super::AssetFetcher;
use crate::error::{IconError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads assets from an unpacked resource pack directory.
///
/// Locations are paths relative to the root, e.g.
/// `assets/minecraft/models/block/stone.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve_path(&self, location: &str) -> Option<PathBuf> {
        let relative = location.trim_start_matches('/');
        // Keep lookups inside the pack root
        if relative.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetFetcher for DirectoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve_path(location)
            .ok_or_else(|| IconError::NotFound(location.to_string()))?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IconError::NotFound(location.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Serves assets from a resource pack ZIP held in memory.
///
/// Locations are entry names, e.g. `assets/pylonbase/items/hammer.json`.
#[derive(Debug, Clone, Default)]
pub struct ZipFetcher {
    entries: HashMap<String, Vec<u8>>,
}

impl ZipFetcher {
    /// Load a pack from a ZIP file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load a pack from ZIP bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)?;
        let mut entries = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().replace('\\', "/");
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.insert(name, data);
        }

        Ok(Self { entries })
    }

    /// Number of file entries in the archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetFetcher for ZipFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.entries
            .get(location.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| IconError::NotFound(location.to_string()))
    }
}
