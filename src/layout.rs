// src/layout.rs

//! Wheel metadata-directory layout
//!
//! Resolves the `.dist-info` directory inside a wheel from the project
//! name, version, and the archive's top-level entry names, and derives
//! the well-known paths beneath it. Pure string logic, no archive
//! access, so it is unit-testable without a real wheel.

use crate::error::{Error, Result};
use std::path::Path;

/// Resolved `.dist-info` metadata directory of a wheel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistInfo {
    dir: String,
}

impl DistInfo {
    /// Resolve the metadata directory from the archive's top-level entry names.
    ///
    /// Exactly one entry must match `{name}-{version}.dist-info` under
    /// packaging normalization rules; zero or multiple candidates fail
    /// with [`Error::MetadataResolution`] before anything is written.
    pub fn find<I, S>(project: &str, version: &str, top_level_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates: Vec<String> = top_level_names
            .into_iter()
            .filter(|name| is_matching_dist_info(name.as_ref(), project, version))
            .map(|name| name.as_ref().to_string())
            .collect();

        if candidates.len() != 1 {
            return Err(Error::MetadataResolution {
                expected: format!("{}-{}.dist-info", project, version),
                found: candidates.len(),
            });
        }

        Ok(DistInfo {
            dir: candidates.remove(0),
        })
    }

    /// The metadata directory name itself
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Archive-relative path of the RECORD manifest
    pub fn record(&self) -> String {
        format!("{}/RECORD", self.dir)
    }

    /// Archive-relative path of the INSTALLER identity file
    pub fn installer(&self) -> String {
        format!("{}/INSTALLER", self.dir)
    }
}

/// Parse project name and version from a wheel filename.
///
/// Wheel filenames are `{name}-{version}-{tags...}.whl`; only the first
/// two components matter here.
pub fn parse_wheel_filename(path: &Path) -> Result<(String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidWheelFilename(path.display().to_string()))?;

    let mut parts = stem.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Ok((name.to_string(), version.to_string()))
        }
        _ => Err(Error::InvalidWheelFilename(path.display().to_string())),
    }
}

/// Check whether a top-level entry name is the dist-info directory for
/// the given project and version.
fn is_matching_dist_info(entry: &str, project: &str, version: &str) -> bool {
    let Some(stem) = entry.strip_suffix(".dist-info") else {
        return false;
    };
    // The escaped project name cannot contain '-', so the last '-'
    // separates name from version.
    let Some((name_part, version_part)) = stem.rsplit_once('-') else {
        return false;
    };
    canonicalize_name(name_part) == canonicalize_name(project)
        && canonicalize_version(version_part) == canonicalize_version(version)
}

/// PEP 503 name canonicalization: lowercase, runs of `-`, `_`, `.`
/// collapse to a single `-`.
fn canonicalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            in_separator = true;
        } else {
            if in_separator && !out.is_empty() {
                out.push('-');
            }
            in_separator = false;
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Version comparison for dist-info matching: case-insensitive, with the
/// wheel filename's `_` escaping treated as equivalent to `-`.
fn canonicalize_version(version: &str) -> String {
    version.to_lowercase().replace('_', "-")
}
