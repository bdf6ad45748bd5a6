//! Blob Store Module
//!
//! Byte-exact persistence of cache values, one file per fully-qualified key.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

// == Blob Store ==
/// Reads and writes value artifacts inside a cache directory.
///
/// Blobs are staged in a uniquely named temporary file and installed by
/// rename, so a reader never observes a half-written value, even with
/// another process sharing the directory.
#[derive(Debug, Clone)]
pub(crate) struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the value artifact for a fully-qualified key.
    pub(crate) fn path(&self, fq_key: &str) -> PathBuf {
        self.dir.join(fq_key)
    }

    /// Stores `value` exactly as given, replacing any previous blob.
    pub(crate) fn write(&self, fq_key: &str, value: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.persist(self.path(fq_key)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Returns exactly the bytes last written for the key.
    pub(crate) fn read(&self, fq_key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(fq_key))
    }

    /// Removes the blob if present. A missing blob is not an error.
    pub(crate) fn remove(&self, fq_key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(fq_key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
