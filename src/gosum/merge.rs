// src/gosum/merge.rs

//! Hash-set merger
//!
//! Both branches' additions and modifications are applied to the ancestor,
//! then both branches' removals, except for keys either branch still
//! carries a new hash for. If the branches recorded different hashes for
//! the same key the merge fails: picking one could silently accept a
//! tampered or incompatible module.

use super::diff::diff;
use super::SumFile;
use crate::error::{Error, Result};
use tracing::debug;

/// Merge the changes `current` and `other` made to `ancestor`
pub fn merge(current: &SumFile, other: &SumFile, ancestor: &SumFile) -> Result<SumFile> {
    let current_diff = diff(current, ancestor);
    let other_diff = diff(other, ancestor);

    let current_changed = current_diff.changed();
    let other_changed = other_diff.changed();

    let conflict = current_changed.iter().find_map(|(key, existing)| {
        other_changed
            .get(key)
            .filter(|incoming| *incoming != existing)
            .map(|incoming| (key, existing, incoming))
    });
    if let Some((key, existing, incoming)) = conflict {
        return Err(Error::HashMismatch {
            key: key.to_string(),
            existing: existing.to_string(),
            incoming: incoming.to_string(),
        });
    }

    let all_changed = current_changed.overlay(&other_changed);
    let mut all_removed = current_diff.removed.overlay(&other_diff.removed);
    for key in all_changed.keys() {
        all_removed.remove(key);
    }

    debug!(
        "Merging go.sum: {} changed, {} removed",
        all_changed.len(),
        all_removed.len()
    );

    let mut result = ancestor.clone();
    for (key, hash) in &all_changed {
        result.set(key.clone(), hash.clone());
    }
    for key in all_removed.keys() {
        result.remove(key);
    }

    Ok(result)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::gosum::{Checksum, SumKey};
    use proptest::prelude::*;

    fn arb_key() -> impl Strategy<Value = SumKey> {
        (
            prop_oneof![Just("example.com/a"), Just("example.com/b"), Just("golang.org/x/mod")],
            prop_oneof![Just("v1.0.0"), Just("v1.2.0"), Just("v0.17.0")],
            prop_oneof![Just(""), Just("go.mod")],
        )
            .prop_map(|(path, version, sub_path)| SumKey::new(path, version, sub_path))
    }

    fn arb_sum() -> impl Strategy<Value = SumFile> {
        prop::collection::btree_map(arb_key(), "h1:[a-d]{2}=", 0..8).prop_map(|entries| {
            let mut sum = SumFile::new();
            for (key, hash) in entries {
                sum.set(key, Checksum::new(hash));
            }
            sum
        })
    }

    proptest! {
        #[test]
        fn prop_idempotence(sum in arb_sum()) {
            prop_assert_eq!(merge(&sum, &sum, &sum).unwrap(), sum);
        }

        #[test]
        fn prop_symmetry_without_conflicts(
            ancestor in arb_sum(),
            current in arb_sum(),
            other in arb_sum()
        ) {
            match (merge(&current, &other, &ancestor), merge(&other, &current, &ancestor)) {
                (Ok(ab), Ok(ba)) => prop_assert_eq!(ab, ba),
                (Err(ab), Err(ba)) => {
                    prop_assert!(ab.is_conflict());
                    prop_assert!(ba.is_conflict());
                }
                _ => prop_assert!(false, "conflict detection must be symmetric"),
            }
        }

        #[test]
        fn prop_round_trip(sum in arb_sum()) {
            prop_assert_eq!(sum.to_string().parse::<SumFile>().unwrap(), sum);
        }
    }
}
