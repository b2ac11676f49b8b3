// src/record.rs

//! RECORD manifest rows
//!
//! The RECORD file carries one row per installed file: relative path, an
//! optional `algorithm=digest` hash (urlsafe base64, no padding), and an
//! optional size in bytes. Both fields are empty only for rows that
//! cannot be verified, such as the RECORD's entry for itself.
//!
//! This module provides the row model, the row codec, content validation
//! against declared digests, and the insertion-ordered set the installer
//! accumulates rows into.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::collections::HashMap;

/// Declared content hash: algorithm tag plus urlsafe-base64 digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHash {
    pub algorithm: String,
    pub digest: String,
}

impl RecordHash {
    /// Compute the hash of `data` under `algorithm`
    pub fn compute(algorithm: &str, data: &[u8]) -> Result<Self> {
        let digest = match algorithm {
            "sha256" => URL_SAFE_NO_PAD.encode(Sha256::digest(data)),
            "sha384" => URL_SAFE_NO_PAD.encode(Sha384::digest(data)),
            "sha512" => URL_SAFE_NO_PAD.encode(Sha512::digest(data)),
            other => return Err(Error::UnsupportedHashAlgorithm(other.to_string())),
        };
        Ok(RecordHash {
            algorithm: algorithm.to_string(),
            digest,
        })
    }
}

/// One RECORD row: path, optional hash, optional size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub path: String,
    pub hash: Option<RecordHash>,
    pub size: Option<u64>,
}

impl RecordEntry {
    /// Row for a file that cannot be verified (no hash, no size)
    pub fn unverifiable(path: &str) -> Self {
        RecordEntry {
            path: path.to_string(),
            hash: None,
            size: None,
        }
    }

    /// Check `data` against the declared hash, if any.
    ///
    /// Must be called before the content is written anywhere; a
    /// mismatching archive must never reach the destination.
    pub fn validate(&self, data: &[u8]) -> Result<()> {
        let Some(declared) = &self.hash else {
            return Ok(());
        };
        let actual = RecordHash::compute(&declared.algorithm, data)?;
        if actual.digest != declared.digest {
            return Err(Error::HashMismatch {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

/// Parse RECORD text into entries.
///
/// Accepts `\r\n` line endings and skips blank lines. Fields are split
/// from the right (size, hash, then the path remainder), so unquoted
/// commas in paths survive a round trip through [`write_record`].
pub fn parse_record(text: &str) -> Result<Vec<RecordEntry>> {
    let mut entries = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let mut fields = line.rsplitn(3, ',');
        let size_field = fields.next().unwrap_or_default();
        let hash_field = fields.next();
        let path = fields.next();
        let (Some(hash_field), Some(path)) = (hash_field, path) else {
            return Err(Error::RecordParse {
                line: index + 1,
                reason: format!("expected 3 fields, got fewer: {line:?}"),
            });
        };

        let hash = if hash_field.is_empty() {
            None
        } else {
            let Some((algorithm, digest)) = hash_field.split_once('=') else {
                return Err(Error::RecordParse {
                    line: index + 1,
                    reason: format!("hash field is not algorithm=digest: {hash_field:?}"),
                });
            };
            Some(RecordHash {
                algorithm: algorithm.to_string(),
                digest: digest.to_string(),
            })
        };

        let size = if size_field.is_empty() {
            None
        } else {
            Some(size_field.parse().map_err(|_| Error::RecordParse {
                line: index + 1,
                reason: format!("invalid size: {size_field:?}"),
            })?)
        };

        entries.push(RecordEntry {
            path: path.to_string(),
            hash,
            size,
        });
    }
    Ok(entries)
}

/// Serialize entries as RECORD rows in iteration order
pub fn write_record<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a RecordEntry>,
{
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.path);
        out.push(',');
        if let Some(hash) = &entry.hash {
            out.push_str(&hash.algorithm);
            out.push('=');
            out.push_str(&hash.digest);
        }
        out.push(',');
        if let Some(size) = entry.size {
            out.push_str(&size.to_string());
        }
        out.push('\n');
    }
    out
}

/// Insertion-ordered set of RECORD entries keyed by path.
///
/// Inserting an existing path replaces the entry in place, keeping its
/// original position (last write wins on content, first insertion wins
/// on order). Grows across installation phases and is consumed once to
/// produce the final RECORD.
#[derive(Debug, Default)]
pub struct InstalledSet {
    entries: Vec<RecordEntry>,
    index: HashMap<String, usize>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, overriding any earlier entry for the same path
    pub fn insert(&mut self, entry: RecordEntry) {
        match self.index.get(&entry.path) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.path.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Merge a batch of entries, last write wins per path
    pub fn merge<I>(&mut self, new_entries: I)
    where
        I: IntoIterator<Item = RecordEntry>,
    {
        for entry in new_entries {
            self.insert(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RecordEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha256_entry(path: &str, data: &[u8]) -> RecordEntry {
        RecordEntry {
            path: path.to_string(),
            hash: Some(RecordHash::compute("sha256", data).unwrap()),
            size: Some(data.len() as u64),
        }
    }

    #[test]
    fn test_validate_matching_hash() {
        let entry = sha256_entry("pkg/__init__.py", b"x");
        assert!(entry.validate(b"x").is_ok());
    }

    #[test]
    fn test_validate_mismatching_hash() {
        let entry = sha256_entry("pkg/__init__.py", b"x");
        let err = entry.validate(b"y").unwrap_err();
        assert!(matches!(err, Error::HashMismatch { path } if path == "pkg/__init__.py"));
    }

    #[test]
    fn test_validate_absent_hash_passes() {
        let entry = RecordEntry::unverifiable("pkg-1.0.dist-info/RECORD");
        assert!(entry.validate(b"anything").is_ok());
    }

    #[test]
    fn test_validate_unsupported_algorithm() {
        let entry = RecordEntry {
            path: "f".to_string(),
            hash: Some(RecordHash {
                algorithm: "md5".to_string(),
                digest: "abc".to_string(),
            }),
            size: None,
        };
        assert!(matches!(
            entry.validate(b"x"),
            Err(Error::UnsupportedHashAlgorithm(a)) if a == "md5"
        ));
    }

    #[test]
    fn test_parse_record_rows() {
        let text = "pkg/__init__.py,sha256=abc123,42\npkg-1.0.dist-info/RECORD,,\n";
        let entries = parse_record(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "pkg/__init__.py");
        assert_eq!(entries[0].hash.as_ref().unwrap().algorithm, "sha256");
        assert_eq!(entries[0].hash.as_ref().unwrap().digest, "abc123");
        assert_eq!(entries[0].size, Some(42));
        assert_eq!(entries[1].path, "pkg-1.0.dist-info/RECORD");
        assert!(entries[1].hash.is_none());
        assert!(entries[1].size.is_none());
    }

    #[test]
    fn test_parse_record_crlf_and_blank_lines() {
        let text = "a.py,sha256=d,1\r\n\r\nb.py,,\r\n";
        let entries = parse_record(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "a.py");
        assert_eq!(entries[1].path, "b.py");
    }

    #[test]
    fn test_parse_record_comma_in_path() {
        let text = "odd,name.py,sha256=d,1\n";
        let entries = parse_record(text).unwrap();
        assert_eq!(entries[0].path, "odd,name.py");
        assert_eq!(entries[0].size, Some(1));
    }

    #[test]
    fn test_parse_record_rejects_short_row() {
        let err = parse_record("just-a-path\n").unwrap_err();
        assert!(matches!(err, Error::RecordParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_record_rejects_bad_size() {
        let err = parse_record("a.py,sha256=d,not-a-number\n").unwrap_err();
        assert!(matches!(err, Error::RecordParse { line: 1, .. }));
    }

    #[test]
    fn test_write_record_round_trip() {
        let entries = vec![
            sha256_entry("pkg/__init__.py", b"x"),
            RecordEntry::unverifiable("pkg-1.0.dist-info/RECORD"),
        ];
        let text = write_record(&entries);
        let parsed = parse_record(&text).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_installed_set_last_write_wins_keeps_position() {
        let mut set = InstalledSet::new();
        set.insert(sha256_entry("a.py", b"one"));
        set.insert(RecordEntry::unverifiable("b.py"));
        set.insert(sha256_entry("a.py", b"two"));

        let entries: Vec<_> = set.iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(entries[0].path, "a.py");
        assert_eq!(entries[0].hash, sha256_entry("a.py", b"two").hash);
        assert_eq!(entries[1].path, "b.py");
    }

    #[test]
    fn test_installed_set_merge() {
        let mut set = InstalledSet::new();
        set.merge(vec![
            RecordEntry::unverifiable("a"),
            RecordEntry::unverifiable("b"),
        ]);
        set.merge(vec![RecordEntry::unverifiable("c")]);
        let paths: Vec<_> = set.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
    }
}
