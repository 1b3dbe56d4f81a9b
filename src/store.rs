// SPDX-License-Identifier: MIT
//! File lifecycle for a single database file
//!
//! A `FileStore` exclusively owns the open handle for one invocation. The
//! handle is released when the store is dropped, so every early return via `?`
//! closes the file as well.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read/write handle on a database file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
}

impl FileStore {
    /// Create a new, empty database file. Fails if `path` already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => DbError::AlreadyExists(path.clone()),
                _ => DbError::Io(e),
            })?;

        debug!("Created database file {:?}", path);
        Ok(Self { path, file })
    }

    /// Open an existing database file for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DbError::NotFound(path.clone()),
                _ => DbError::Io(e),
            })?;

        debug!("Opened database file {:?}", path);
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read exactly `n` bytes from the current position
    pub fn read_exact(&mut self, n: usize) -> DbResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(n);
        (&mut self.file).take(n as u64).read_to_end(&mut buf)?;

        if buf.len() != n {
            debug!(
                "Short read on {:?}: wanted {} bytes, got {}",
                self.path,
                n,
                buf.len()
            );
            return Err(DbError::TruncatedRead {
                expected: n,
                actual: buf.len(),
            });
        }

        Ok(buf)
    }

    /// Write the whole buffer at the current position
    pub fn write_all(&mut self, bytes: &[u8]) -> DbResult<()> {
        self.file.write_all(bytes)?;
        Ok(())
    }

    /// Reposition to offset 0
    pub fn rewind(&mut self) -> DbResult<()> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Cut the file to `len` bytes
    pub fn truncate(&mut self, len: u64) -> DbResult<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    /// Flush file data and metadata to disk
    pub fn sync(&mut self) -> DbResult<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Current on-disk length
    pub fn len(&self) -> DbResult<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> DbResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Replace the entire file contents with `bytes`.
    ///
    /// The caller builds the full image in memory first, so nothing is written
    /// until every record has been encoded.
    pub fn rewrite(&mut self, bytes: &[u8], durable: bool) -> DbResult<()> {
        self.rewind()?;
        self.write_all(bytes)?;
        self.truncate(bytes.len() as u64)?;
        if durable {
            self.sync()?;
        }
        debug!("Rewrote {:?} ({} bytes)", self.path, bytes.len());
        Ok(())
    }

    /// Release the handle
    pub fn close(self) {
        debug!("Closing database file {:?}", self.path);
    }
}
