// src/gomod/mod.rs

//! go.mod support
//!
//! This module provides the structured form of a go.mod file and the
//! three-way merge built on top of it:
//! - `parser` / `format`: text codec
//! - `diff`: per-branch change-sets against the common ancestor
//! - `merge`: combination of two change-sets onto the ancestor

pub mod diff;
pub mod format;
pub mod merge;
pub mod parser;

pub use diff::{Change, ChangeSet, SetChanges, diff};
pub use merge::merge;
pub use parser::parse;

use std::collections::{BTreeMap, BTreeSet};

/// A module path paired with an optional version
///
/// The version is empty for version-less replacement sources and for
/// replacement targets that point at a local directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// A `require` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    /// Pulled in transitively rather than imported directly
    pub indirect: bool,
}

impl Requirement {
    /// Create a direct requirement
    pub fn direct(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            indirect: false,
        }
    }

    /// Create an indirect requirement
    pub fn indirect(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            indirect: true,
            ..Self::direct(path, version)
        }
    }
}

/// A `replace` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
}

/// A `retract` entry; single versions have `low == high`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    pub low: String,
    pub high: String,
    /// Comment explaining the retraction, shown by `go list -m -retracted`
    pub rationale: Option<String>,
}

impl Retraction {
    /// Retract a single version
    pub fn version(version: impl Into<String>) -> Self {
        let version = version.into();
        Self::interval(version.clone(), version)
    }

    /// Retract every version in `[low, high]`
    pub fn interval(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// The `(low, high)` pair a manifest keys retractions by
    pub fn key(&self) -> (String, String) {
        (self.low.clone(), self.high.clone())
    }
}

/// Structured form of a go.mod file
///
/// Every keyed collection holds at most one entry per key; entries are the
/// unit of merging and are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// `module` path
    pub module: Option<String>,
    /// Message of a `// Deprecated:` comment on the module directive
    pub deprecated: Option<String>,
    /// `go` directive (the toolchain version the module requires)
    pub go: Option<String>,
    /// `toolchain` directive, e.g. `go1.22.0`
    pub toolchain: Option<String>,
    /// `godebug` settings keyed by setting name
    pub godebug: BTreeMap<String, String>,
    /// `require` entries keyed by module path
    pub requires: BTreeMap<String, Requirement>,
    /// `exclude` entries
    pub excludes: BTreeSet<ModuleVersion>,
    /// `replace` entries keyed by their source module (and optional version)
    pub replaces: BTreeMap<ModuleVersion, Replacement>,
    /// `tool` paths
    pub tools: BTreeSet<String>,
    /// `retract` entries keyed by their version interval
    pub retracts: BTreeMap<(String, String), Retraction>,
}

impl Manifest {
    /// Add or overwrite a requirement
    pub fn add_require(&mut self, req: Requirement) {
        self.requires.insert(req.path.clone(), req);
    }

    /// Add an exclusion
    pub fn add_exclude(&mut self, path: impl Into<String>, version: impl Into<String>) {
        self.excludes.insert(ModuleVersion::new(path, version));
    }

    /// Add or overwrite a replacement
    pub fn add_replace(&mut self, old: ModuleVersion, new: ModuleVersion) {
        self.replaces.insert(old.clone(), Replacement { old, new });
    }

    /// Add or overwrite the retraction of an interval
    pub fn add_retract(&mut self, retraction: Retraction) {
        self.retracts.insert(retraction.key(), retraction);
    }

    /// Look up a requirement by module path
    pub fn require(&self, path: &str) -> Option<&Requirement> {
        self.requires.get(path)
    }

    /// Find the replacement for a module path, whatever its source version
    pub fn replacement_for(&self, path: &str) -> Option<&Replacement> {
        self.replaces.values().find(|rep| rep.old.path == path)
    }

    /// Drop entries that carry no information
    ///
    /// Requirements without a version, replacements that point a module at
    /// itself and empty tool paths are removed. Direct and indirect grouping
    /// is derived from the `indirect` flag when formatting, so nothing else
    /// needs regrouping here.
    pub fn cleanup(&mut self) {
        self.requires.retain(|_, req| !req.version.is_empty());
        self.replaces.retain(|_, rep| rep.old != rep.new);
        self.tools.retain(|tool| !tool.is_empty());
        self.godebug.retain(|key, _| !key.is_empty());
    }
}
