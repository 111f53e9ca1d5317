// src/gomod/diff.rs

//! Manifest differ
//!
//! Computes what one branch changed relative to the common ancestor.
//! Added or changed entries are recorded as `Change::Present`, entries the
//! branch dropped as `Change::Removed`; unchanged entries are left out.

use super::{Manifest, ModuleVersion, Replacement, Requirement, Retraction};
use crate::version;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Change to a single keyed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// Added, or changed from the ancestor's value
    Present(T),
    /// Present in the ancestor, dropped by the branch
    Removed,
}

/// Changes to a set-like field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetChanges<T: Ord> {
    pub added: BTreeSet<T>,
    pub removed: BTreeSet<T>,
}

impl<T: Ord> Default for SetChanges<T> {
    fn default() -> Self {
        Self {
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> SetChanges<T> {
    fn between(branch: &BTreeSet<T>, ancestor: &BTreeSet<T>) -> Self {
        Self {
            added: branch.difference(ancestor).cloned().collect(),
            removed: ancestor.difference(branch).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The entries of a manifest that differ from a shared ancestor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// New module path, if the branch renamed the module
    pub module: Option<String>,
    /// Deprecation message, if the branch added, changed or dropped it
    pub deprecated: Option<Change<String>>,
    /// `go` version: the branch's when it is newer, the ancestor's otherwise
    pub go: Option<String>,
    /// `toolchain` directive, same rule as `go`
    pub toolchain: Option<String>,
    pub godebug: BTreeMap<String, Change<String>>,
    pub requires: BTreeMap<String, Change<Requirement>>,
    pub excludes: SetChanges<ModuleVersion>,
    pub replaces: BTreeMap<ModuleVersion, Change<Replacement>>,
    pub tools: SetChanges<String>,
    pub retracts: BTreeMap<(String, String), Change<Retraction>>,
}

impl ChangeSet {
    /// Whether no keyed entry changed
    ///
    /// The `go` and `toolchain` fields always carry a value and are not
    /// considered.
    pub fn is_empty(&self) -> bool {
        self.module.is_none()
            && self.deprecated.is_none()
            && self.godebug.is_empty()
            && self.requires.is_empty()
            && self.excludes.is_empty()
            && self.replaces.is_empty()
            && self.tools.is_empty()
            && self.retracts.is_empty()
    }
}

/// Compute the changes `branch` made relative to `ancestor`
pub fn diff(branch: &Manifest, ancestor: &Manifest) -> ChangeSet {
    let changes = ChangeSet {
        module: branch
            .module
            .as_ref()
            .filter(|module| ancestor.module.as_ref() != Some(*module))
            .cloned(),
        deprecated: diff_option(&branch.deprecated, &ancestor.deprecated),
        go: newer_or_ancestor(branch.go.as_deref(), ancestor.go.as_deref()),
        toolchain: newer_or_ancestor(branch.toolchain.as_deref(), ancestor.toolchain.as_deref()),
        godebug: diff_map(&branch.godebug, &ancestor.godebug),
        requires: diff_map(&branch.requires, &ancestor.requires),
        excludes: SetChanges::between(&branch.excludes, &ancestor.excludes),
        replaces: diff_map(&branch.replaces, &ancestor.replaces),
        tools: SetChanges::between(&branch.tools, &ancestor.tools),
        retracts: diff_map(&branch.retracts, &ancestor.retracts),
    };

    debug!(
        "Diff: {} require, {} replace, {} exclude, {} tool changes",
        changes.requires.len(),
        changes.replaces.len(),
        changes.excludes.added.len() + changes.excludes.removed.len(),
        changes.tools.added.len() + changes.tools.removed.len()
    );

    changes
}

/// The branch version if it is strictly newer, else the ancestor's
fn newer_or_ancestor(branch: Option<&str>, ancestor: Option<&str>) -> Option<String> {
    match (branch, ancestor) {
        (Some(b), Some(a)) if version::compare_go(b, a) == Ordering::Greater => Some(b.to_string()),
        (Some(b), None) => Some(b.to_string()),
        (_, a) => a.map(str::to_string),
    }
}

fn diff_option<V>(branch: &Option<V>, ancestor: &Option<V>) -> Option<Change<V>>
where
    V: PartialEq + Clone,
{
    match (branch, ancestor) {
        (branch, ancestor) if branch == ancestor => None,
        (Some(value), _) => Some(Change::Present(value.clone())),
        (None, _) => Some(Change::Removed),
    }
}

/// Keyed diff: whole-entry equality decides whether an entry changed
fn diff_map<K, V>(branch: &BTreeMap<K, V>, ancestor: &BTreeMap<K, V>) -> BTreeMap<K, Change<V>>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    let mut changes = BTreeMap::new();

    for (key, value) in branch {
        if ancestor.get(key) != Some(value) {
            changes.insert(key.clone(), Change::Present(value.clone()));
        }
    }

    for key in ancestor.keys() {
        if !branch.contains_key(key) {
            changes.insert(key.clone(), Change::Removed);
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gomod::parse;

    const ANCESTOR: &str = "module example.com/m

go 1.21.0

require (
\texample.com/a v1.0.0
\texample.com/b v1.0.0 // indirect
)

replace example.com/a => example.com/fork v1.0.0
";

    #[test]
    fn test_diff_same() {
        let manifest = parse("go.mod", ANCESTOR).unwrap();
        let changes = diff(&manifest, &manifest);

        assert!(changes.is_empty());
        assert_eq!(changes.go.as_deref(), Some("1.21.0"));
    }

    #[test]
    fn test_diff_added_and_changed() {
        let ancestor = parse("go.mod", ANCESTOR).unwrap();
        let mut branch = ancestor.clone();
        branch.add_require(Requirement::direct("example.com/b", "v1.0.0"));
        branch.add_require(Requirement::direct("example.com/c", "v0.1.0"));
        branch.tools.insert("example.com/c/cmd/gen".to_string());

        let changes = diff(&branch, &ancestor);

        // Flag-only change still counts
        assert_eq!(
            changes.requires.get("example.com/b"),
            Some(&Change::Present(Requirement::direct("example.com/b", "v1.0.0")))
        );
        assert!(matches!(changes.requires.get("example.com/c"), Some(Change::Present(_))));
        assert!(!changes.requires.contains_key("example.com/a"));
        assert!(changes.tools.added.contains("example.com/c/cmd/gen"));
    }

    #[test]
    fn test_diff_records_removals() {
        let ancestor = parse("go.mod", ANCESTOR).unwrap();
        let mut branch = ancestor.clone();
        branch.requires.remove("example.com/b");
        branch.replaces.clear();

        let changes = diff(&branch, &ancestor);

        assert_eq!(changes.requires.get("example.com/b"), Some(&Change::Removed));
        assert_eq!(
            changes.replaces.get(&ModuleVersion::new("example.com/a", "")),
            Some(&Change::Removed)
        );
    }

    #[test]
    fn test_diff_changed_replacement() {
        let ancestor = parse("go.mod", ANCESTOR).unwrap();
        let mut branch = ancestor.clone();
        branch.add_replace(
            ModuleVersion::new("example.com/a", ""),
            ModuleVersion::new("example.com/fork", "v1.1.0"),
        );

        let changes = diff(&branch, &ancestor);
        assert_eq!(changes.replaces.len(), 1);
    }

    #[test]
    fn test_diff_go_version_never_regresses() {
        let ancestor = parse("go.mod", ANCESTOR).unwrap();

        let mut newer = ancestor.clone();
        newer.go = Some("1.24.0".to_string());
        assert_eq!(diff(&newer, &ancestor).go.as_deref(), Some("1.24.0"));

        let mut older = ancestor.clone();
        older.go = Some("1.20".to_string());
        assert_eq!(diff(&older, &ancestor).go.as_deref(), Some("1.21.0"));
    }

    #[test]
    fn test_diff_module_rename() {
        let ancestor = parse("go.mod", ANCESTOR).unwrap();
        let mut branch = ancestor.clone();
        branch.module = Some("example.com/renamed".to_string());

        assert_eq!(diff(&branch, &ancestor).module.as_deref(), Some("example.com/renamed"));
        assert_eq!(diff(&ancestor, &ancestor).module, None);
    }

    #[test]
    fn test_diff_deprecation_and_rationale() {
        let mut ancestor = parse("go.mod", ANCESTOR).unwrap();
        ancestor.add_retract(Retraction::version("v0.9.0"));

        let mut branch = ancestor.clone();
        branch.deprecated = Some("use example.com/m/v2".to_string());
        branch.add_retract(Retraction::version("v0.9.0").with_rationale("leaked credentials"));

        let changes = diff(&branch, &ancestor);
        assert_eq!(
            changes.deprecated,
            Some(Change::Present("use example.com/m/v2".to_string()))
        );
        assert_eq!(
            changes.retracts.get(&("v0.9.0".to_string(), "v0.9.0".to_string())),
            Some(&Change::Present(
                Retraction::version("v0.9.0").with_rationale("leaked credentials")
            ))
        );

        assert_eq!(diff(&ancestor, &branch).deprecated, Some(Change::Removed));
    }
}
