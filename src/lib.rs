// src/lib.rs

//! Wheelhouse
//!
//! Installer for Python wheel archives with per-file atomic writes
//! and RECORD manifest tracking.
//!
//! # Architecture
//!
//! - Archive source: read-only random-access view over the wheel zip
//! - Atomic writer: every write goes through temp-file-then-rename
//! - Validation-first: declared hashes are checked before anything
//!   reaches the destination
//! - RECORD tracking: every installed path lands in the final manifest,
//!   merged across phases with last-write-wins semantics

pub mod archive;
mod error;
pub mod filesystem;
pub mod install;
pub mod layout;
pub mod record;

pub use error::{Error, Result};
