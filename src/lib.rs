// src/lib.rs

//! gomerge
//!
//! Three-way merge for Go module files, meant to run as a git merge driver.
//!
//! # Architecture
//!
//! - `gomod`: go.mod codec, per-branch change-sets, and a merge that never
//!   fails (greater versions win, direct requirements beat indirect ones)
//! - `gosum`: go.sum codec and a merge that refuses conflicting hashes
//! - `version`: Go module and toolchain version ordering
//! - `driver`: file-level pipeline used by the `go-merge` binary

pub mod driver;
mod error;
pub mod gomod;
pub mod gosum;
pub mod version;

pub use error::{Error, Result};
