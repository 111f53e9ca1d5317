// src/gomod/merge.rs

//! Manifest merger
//!
//! Merging is a two-phase fold. The current and other change-sets are first
//! combined into one change-set, which is then folded onto the ancestor with
//! the same per-field rules:
//!
//! - `go` / `toolchain`: the greater version wins, ties keep the lower-priority
//!   side
//! - requirements: the greater version wins; a direct requirement on either
//!   side makes the result direct
//! - exclusions, tools: set union
//! - replacements: the side with the greater target version wins
//! - godebug settings, retractions, the module path and its deprecation
//!   message: the higher-priority side wins
//!
//! A present entry always beats a removal. A manifest merge never fails.

use super::diff::{Change, ChangeSet, SetChanges, diff};
use super::{Manifest, Replacement, Requirement};
use crate::version;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Merge the changes `current` and `other` made to `ancestor`
pub fn merge(current: &Manifest, other: &Manifest, ancestor: &Manifest) -> Manifest {
    let current_changes = diff(current, ancestor);
    let other_changes = diff(other, ancestor);

    let combined = combine(current_changes, other_changes);

    debug!(
        "Combined change-set: {} require, {} replace, {} godebug changes",
        combined.requires.len(),
        combined.replaces.len(),
        combined.godebug.len()
    );

    let mut merged = apply(combined, ancestor.clone());
    merged.cleanup();
    merged
}

/// Fold change-set `a` onto change-set `b`, `a` taking priority
fn combine(a: ChangeSet, b: ChangeSet) -> ChangeSet {
    ChangeSet {
        module: a.module.or(b.module),
        deprecated: combine_option(a.deprecated, b.deprecated),
        go: version::max_go(a.go.as_deref(), b.go.as_deref()),
        toolchain: version::max_go(a.toolchain.as_deref(), b.toolchain.as_deref()),
        godebug: combine_map(a.godebug, b.godebug, |a, _| a),
        requires: combine_map(a.requires, b.requires, merge_requirement),
        excludes: combine_sets(a.excludes, b.excludes),
        replaces: combine_map(a.replaces, b.replaces, merge_replacement),
        tools: combine_sets(a.tools, b.tools),
        retracts: combine_map(a.retracts, b.retracts, |a, _| a),
    }
}

/// Fold a change-set onto the ancestor manifest
fn apply(changes: ChangeSet, mut base: Manifest) -> Manifest {
    if let Some(module) = changes.module {
        base.module = Some(module);
    }
    match changes.deprecated {
        Some(Change::Present(message)) => base.deprecated = Some(message),
        Some(Change::Removed) => base.deprecated = None,
        None => {}
    }
    base.go = version::max_go(changes.go.as_deref(), base.go.as_deref());
    base.toolchain = version::max_go(changes.toolchain.as_deref(), base.toolchain.as_deref());

    apply_map(changes.godebug, &mut base.godebug, |a, _| a);
    apply_map(changes.requires, &mut base.requires, merge_requirement);
    apply_map(changes.replaces, &mut base.replaces, merge_replacement);
    apply_map(changes.retracts, &mut base.retracts, |a, _| a);

    for exclude in changes.excludes.removed {
        base.excludes.remove(&exclude);
    }
    base.excludes.extend(changes.excludes.added);

    for tool in changes.tools.removed {
        base.tools.remove(&tool);
    }
    base.tools.extend(changes.tools.added);

    base
}

/// Greater version wins; direct on either side wins over indirect
fn merge_requirement(a: Requirement, b: Requirement) -> Requirement {
    let version = if version::compare(&a.version, &b.version) == Ordering::Greater {
        a.version
    } else {
        b.version
    };

    Requirement {
        path: b.path,
        version,
        indirect: a.indirect && b.indirect,
    }
}

/// `a` replaces `b` only when it points at a greater version
fn merge_replacement(a: Replacement, b: Replacement) -> Replacement {
    if version::compare(&b.new.version, &a.new.version) == Ordering::Less {
        a
    } else {
        b
    }
}

/// Same precedence as `combine_map`, for a single optional field
fn combine_option<V>(a: Option<Change<V>>, b: Option<Change<V>>) -> Option<Change<V>> {
    match (a, b) {
        (Some(Change::Removed), Some(Change::Present(y))) => Some(Change::Present(y)),
        (a, b) => a.or(b),
    }
}

fn combine_map<K, V>(
    a: BTreeMap<K, Change<V>>,
    mut b: BTreeMap<K, Change<V>>,
    fold: impl Fn(V, V) -> V,
) -> BTreeMap<K, Change<V>>
where
    K: Ord,
{
    for (key, change) in a {
        let merged = match (change, b.remove(&key)) {
            (Change::Present(x), Some(Change::Present(y))) => Change::Present(fold(x, y)),
            (Change::Present(x), _) => Change::Present(x),
            (Change::Removed, Some(Change::Present(y))) => Change::Present(y),
            (Change::Removed, _) => Change::Removed,
        };
        b.insert(key, merged);
    }

    b
}

fn apply_map<K, V>(changes: BTreeMap<K, Change<V>>, base: &mut BTreeMap<K, V>, fold: impl Fn(V, V) -> V)
where
    K: Ord,
{
    for (key, change) in changes {
        match change {
            Change::Present(value) => {
                let value = match base.remove(&key) {
                    Some(existing) => fold(value, existing),
                    None => value,
                };
                base.insert(key, value);
            }
            Change::Removed => {
                base.remove(&key);
            }
        }
    }
}

/// Union of both sides; anything added by either side is never removed
fn combine_sets<T: Ord>(a: SetChanges<T>, b: SetChanges<T>) -> SetChanges<T> {
    let mut added = a.added;
    added.extend(b.added);

    let mut removed = a.removed;
    removed.extend(b.removed);
    removed.retain(|item| !added.contains(item));

    SetChanges { added, removed }
}
