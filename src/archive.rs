// src/archive.rs

//! Read-only view over a wheel archive
//!
//! Wheels are plain zip files. This module wraps the zip reader behind
//! the two operations installation needs: listing top-level entry names
//! (to resolve the metadata directory) and random-access reads of whole
//! entries by name.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

/// Open wheel archive handle
///
/// Owned exclusively by one installation; dropping it releases the
/// underlying file.
#[derive(Debug)]
pub struct WheelArchive {
    archive: ZipArchive<File>,
}

impl WheelArchive {
    /// Open a wheel archive for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        debug!("Opened wheel archive: {} ({} entries)", path.display(), archive.len());
        Ok(WheelArchive { archive })
    }

    /// First path component of every entry, leading slashes stripped
    pub fn top_level_names(&self) -> BTreeSet<String> {
        self.archive
            .file_names()
            .map(|name| {
                let name = name.trim_start_matches('/');
                name.split('/').next().unwrap_or(name).to_string()
            })
            .collect()
    }

    /// Read the full content of a named entry
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(Error::EntryNotFound(name.to_string())),
            Err(err) => return Err(err.into()),
        };
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;
        Ok(content)
    }
}
