//! Blob store implementations.
//!
//! `FsBlobStore` lays objects out as `<root>/<bucket>/<key>` so a local run
//! produces the same key layout a remote bucket would hold. `MemoryBlobStore`
//! keeps everything in a map and can be armed to reject writes under a key
//! prefix.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::traits::BlobStore;

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!("bad bucket name '{bucket}'")));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.bucket_dir(bucket)?;
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(Error::InvalidConfig(format!("bad object key '{key}'")));
            }
            path.push(part);
        }
        Ok(path)
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(format!("{bucket}/{key}"))),
            Err(e) => Err(Error::io(key, e)),
        }
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(key, e))?;
        }
        fs::write(&path, body).map_err(|e| Error::io(key, e))?;
        tracing::debug!(bucket, key, bytes = body.len(), "stored object");
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !bucket_dir.exists() {
            return Ok(vec![]);
        }
        let mut keys = Vec::new();
        let files = walkdir::WalkDir::new(&bucket_dir).into_iter().filter_map(|e| e.ok());
        for entry in files.filter(|e| e.file_type().is_file()) {
            let Ok(relative) = entry.path().strip_prefix(&bucket_dir) else { continue };
            let key = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    failing_prefixes: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` whose key starts with `prefix` fail.
    pub fn fail_puts_under(&self, prefix: impl Into<String>) {
        lock(&self.failing_prefixes).push(prefix.into());
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned map is still structurally valid.
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{bucket}/{key}")))
    }

    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        if lock(&self.failing_prefixes).iter().any(|p| key.starts_with(p.as_str())) {
            return Err(Error::Upload { key: key.to_string(), message: "rejected by store".to_string() });
        }
        lock(&self.objects).insert((bucket.to_string(), key.to_string()), body.to_vec());
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(lock(&self.objects)
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}
