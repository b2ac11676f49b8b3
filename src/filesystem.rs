// src/filesystem.rs

//! Atomic file writes
//!
//! Every write performed during installation goes through the
//! temp-file-then-rename primitive in this module: the content is
//! written to a temporary file in the same directory as the target
//! (same filesystem, a precondition for atomic rename) and then renamed
//! onto the target path. An observer reading the target concurrently
//! sees either the previous complete content or the new complete
//! content, never a partial file.

use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Capability for publishing complete file content at a path.
///
/// The extractor and the manifest writer depend on this trait rather
/// than on the filesystem directly, so tests can substitute an
/// in-memory implementation.
pub trait FileWriter {
    /// Write `content` so that `target` is never observable half-written.
    fn write_atomic(&self, target: &Path, content: &[u8]) -> Result<()>;

    /// Text-mode variant: UTF-8 bytes, `\n` line endings as given.
    fn write_atomic_text(&self, target: &Path, content: &str) -> Result<()> {
        self.write_atomic(target, content.as_bytes())
    }
}

/// Filesystem writer that stages content in an adjacent temp file.
///
/// The temp file is named `{file_name}.tmp.{tag}`, where the tag is the
/// installer identity, so concurrent writes by different installers
/// never collide on the staging path. If the staging write itself
/// fails, the temp file may be left behind; the target is untouched
/// either way.
pub struct AtomicFileWriter {
    tag: String,
}

impl AtomicFileWriter {
    pub fn new(tag: &str) -> Self {
        AtomicFileWriter {
            tag: tag.to_string(),
        }
    }
}

impl FileWriter for AtomicFileWriter {
    fn write_atomic(&self, target: &Path, content: &[u8]) -> Result<()> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = parent.join(format!("{}.tmp.{}", file_name, self.tag));

        fs::write(&temp, content)?;
        fs::rename(&temp, target)?;
        debug!("Wrote {} ({} bytes)", target.display(), content.len());
        Ok(())
    }
}
