// src/install.rs

//! Wheel installation
//!
//! The installer runs a fixed sequence of phases against one archive
//! and one destination directory:
//!
//! 1. Extract every file the archive's RECORD declares, validating each
//!    against its declared hash before it is written
//! 2. Install the `.data` directory (not yet implemented, contributes
//!    no entries)
//! 3. Generate entry-point scripts (not yet implemented, contributes
//!    no entries)
//! 4. Write the INSTALLER identity file
//! 5. Write the final RECORD, including its own unverifiable self-entry
//!
//! Entries produced by each phase are merged into one [`InstalledSet`]
//! with last-write-wins semantics, so a later phase can legitimately
//! replace an earlier phase's row for the same path.
//!
//! There is no rollback: if a later entry fails validation or is
//! missing from the archive, files written by earlier entries stay on
//! disk and the run aborts before the RECORD phase, so they are not
//! recorded. The installation owns the destination exclusively for its
//! duration; nothing here locks against a second concurrent install.

use crate::archive::WheelArchive;
use crate::error::{Error, Result};
use crate::filesystem::{AtomicFileWriter, FileWriter};
use crate::layout::{DistInfo, parse_wheel_filename};
use crate::record::{InstalledSet, RecordEntry, parse_record, write_record};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// One wheel installation: archive handle, resolved metadata directory,
/// and the installer identity recorded in the destination.
///
/// Not reusable; [`install`](WheelInstaller::install) consumes the
/// installer and releases the archive handle when it returns.
#[derive(Debug)]
pub struct WheelInstaller {
    name: String,
    dist_info: DistInfo,
    archive: WheelArchive,
}

impl WheelInstaller {
    /// Open a wheel and resolve its metadata directory.
    ///
    /// Fails without touching the filesystem if the archive is
    /// unreadable, the filename is malformed, or the top level does not
    /// contain exactly one matching `.dist-info` directory.
    pub fn from_wheel_path(name: &str, wheel_path: &Path) -> Result<Self> {
        let (project, version) = parse_wheel_filename(wheel_path)?;
        let archive = WheelArchive::open(wheel_path)?;
        let dist_info = DistInfo::find(&project, &version, archive.top_level_names())?;
        info!(
            "Opened wheel {} (metadata in {})",
            wheel_path.display(),
            dist_info.dir()
        );
        Ok(WheelInstaller {
            name: name.to_string(),
            dist_info,
            archive,
        })
    }

    /// Install the wheel into `dest`, producing the final RECORD there.
    pub fn install(mut self, dest: &Path) -> Result<()> {
        let writer = AtomicFileWriter::new(&self.name);
        let mut installed = InstalledSet::new();

        self.install_declared_files(dest, &writer, &mut installed)?;
        installed.merge(self.install_data_directory(dest)?);
        installed.merge(self.generate_scripts(dest)?);
        installed.merge(self.write_additional_metadata(dest, &writer)?);
        finalize_record(installed, dest, &self.dist_info.record(), &writer)?;

        info!("Installation complete: {}", dest.display());
        Ok(())
    }

    /// Phase 1: extract and validate every file RECORD declares
    fn install_declared_files(
        &mut self,
        dest: &Path,
        writer: &dyn FileWriter,
        installed: &mut InstalledSet,
    ) -> Result<()> {
        let record_bytes = self.archive.read_entry(&self.dist_info.record())?;
        let record_text = String::from_utf8_lossy(&record_bytes);
        let declared = parse_record(&record_text)?;
        info!("RECORD declares {} files", declared.len());

        for entry in declared {
            let entry = install_entry(&mut self.archive, &entry, dest, writer)?;
            installed.insert(entry);
        }
        Ok(())
    }

    /// Phase 2: install the `{name}-{version}.data` directory.
    ///
    /// TODO: implement `.data` directory installation (scripts/, data/,
    /// headers/ subtrees mapped onto scheme paths).
    fn install_data_directory(&mut self, _dest: &Path) -> Result<Vec<RecordEntry>> {
        Ok(Vec::new())
    }

    /// Phase 3: generate entry-point wrapper scripts.
    ///
    /// TODO: read entry_points.txt and generate console-script wrappers.
    fn generate_scripts(&mut self, _dest: &Path) -> Result<Vec<RecordEntry>> {
        Ok(Vec::new())
    }

    /// Phase 4: write metadata this installer generates itself.
    ///
    /// Currently the INSTALLER identity file; its content is not known
    /// to the archive, so its RECORD row carries no hash or size.
    fn write_additional_metadata(
        &mut self,
        dest: &Path,
        writer: &dyn FileWriter,
    ) -> Result<Vec<RecordEntry>> {
        let installer_path = self.dist_info.installer();
        writer.write_atomic_text(&dest.join(&installer_path), &self.name)?;
        debug!("Wrote installer identity {:?} to {}", self.name, installer_path);
        Ok(vec![RecordEntry::unverifiable(&installer_path)])
    }
}

/// Read one declared file from the archive, validate it against its
/// declared hash, and write it beneath `dest`.
///
/// Validation happens strictly before the write, so content that fails
/// its hash never reaches the destination in any form. Returns the
/// entry unchanged as the record of what was installed.
pub fn install_entry(
    archive: &mut WheelArchive,
    entry: &RecordEntry,
    dest: &Path,
    writer: &dyn FileWriter,
) -> Result<RecordEntry> {
    let data = archive.read_entry(&entry.path)?;
    entry.validate(&data)?;

    let target = dest.join(checked_relative_path(&entry.path)?);
    writer.write_atomic(&target, &data)?;
    debug!("Installed {} ({} bytes)", entry.path, data.len());
    Ok(entry.clone())
}

/// Write the final RECORD: the accumulated entries plus an unverifiable
/// self-entry for `record_path`, serialized in insertion order.
pub fn finalize_record(
    mut installed: InstalledSet,
    dest: &Path,
    record_path: &str,
    writer: &dyn FileWriter,
) -> Result<()> {
    installed.insert(RecordEntry::unverifiable(record_path));
    let text = write_record(installed.iter());
    writer.write_atomic_text(&dest.join(checked_relative_path(record_path)?), &text)?;
    debug!("Wrote RECORD with {} rows", installed.len());
    Ok(())
}

/// Reject declared paths that would escape the destination directory
/// (absolute paths or `..` components).
fn checked_relative_path(path: &str) -> Result<PathBuf> {
    let relative = PathBuf::from(path);
    if relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(Error::UnsafePath(path.to_string()));
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordHash;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// In-memory stand-in for the filesystem writer
    #[derive(Default)]
    struct MemoryWriter {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    }

    impl FileWriter for MemoryWriter {
        fn write_atomic(&self, target: &Path, content: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(target.to_path_buf(), content.to_vec());
            Ok(())
        }
    }

    fn one_file_wheel(dir: &Path, content: &[u8]) -> PathBuf {
        let path = dir.join("pkg-1.0-py3-none-any.whl");
        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer.start_file("pkg/__init__.py", options).unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap();
        path
    }

    fn sha256_entry(path: &str, data: &[u8]) -> RecordEntry {
        RecordEntry {
            path: path.to_string(),
            hash: Some(RecordHash::compute("sha256", data).unwrap()),
            size: Some(data.len() as u64),
        }
    }

    #[test]
    fn test_install_entry_writes_validated_content() {
        let dir = tempfile::tempdir().unwrap();
        let wheel = one_file_wheel(dir.path(), b"x");
        let mut archive = WheelArchive::open(&wheel).unwrap();
        let writer = MemoryWriter::default();

        let entry = sha256_entry("pkg/__init__.py", b"x");
        let installed =
            install_entry(&mut archive, &entry, Path::new("/dest"), &writer).unwrap();

        assert_eq!(installed, entry);
        let files = writer.files.borrow();
        assert_eq!(
            files.get(Path::new("/dest/pkg/__init__.py")).unwrap(),
            b"x"
        );
    }

    #[test]
    fn test_install_entry_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let wheel = one_file_wheel(dir.path(), b"y");
        let mut archive = WheelArchive::open(&wheel).unwrap();
        let writer = MemoryWriter::default();

        let entry = sha256_entry("pkg/__init__.py", b"x");
        let err = install_entry(&mut archive, &entry, Path::new("/dest"), &writer).unwrap_err();

        assert!(matches!(err, Error::HashMismatch { .. }));
        assert!(writer.files.borrow().is_empty());
    }

    #[test]
    fn test_install_entry_missing_from_archive() {
        let dir = tempfile::tempdir().unwrap();
        let wheel = one_file_wheel(dir.path(), b"x");
        let mut archive = WheelArchive::open(&wheel).unwrap();
        let writer = MemoryWriter::default();

        let entry = RecordEntry::unverifiable("pkg/absent.py");
        let err = install_entry(&mut archive, &entry, Path::new("/dest"), &writer).unwrap_err();

        assert!(matches!(err, Error::EntryNotFound(_)));
        assert!(writer.files.borrow().is_empty());
    }

    #[test]
    fn test_finalize_record_appends_self_entry() {
        let writer = MemoryWriter::default();
        let mut installed = InstalledSet::new();
        installed.insert(sha256_entry("pkg/__init__.py", b"x"));
        installed.insert(RecordEntry::unverifiable("pkg-1.0.dist-info/INSTALLER"));

        finalize_record(
            installed,
            Path::new("/dest"),
            "pkg-1.0.dist-info/RECORD",
            &writer,
        )
        .unwrap();

        let files = writer.files.borrow();
        let text =
            String::from_utf8(files[Path::new("/dest/pkg-1.0.dist-info/RECORD")].clone()).unwrap();
        let rows = parse_record(&text).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].path, "pkg-1.0.dist-info/RECORD");
        assert!(rows[2].hash.is_none());
        assert!(rows[2].size.is_none());
    }

    #[test]
    fn test_checked_relative_path_rejects_escapes() {
        assert!(matches!(
            checked_relative_path("../escape.py"),
            Err(Error::UnsafePath(_))
        ));
        assert!(matches!(
            checked_relative_path("/etc/passwd"),
            Err(Error::UnsafePath(_))
        ));
        assert!(checked_relative_path("pkg/ok.py").is_ok());
    }
}
