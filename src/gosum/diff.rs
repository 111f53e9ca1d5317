// src/gosum/diff.rs

//! Hash-set differ

use super::SumFile;

/// Entries one go.sum added, modified and removed relative to another
///
/// The three sets are disjoint: a key is added if only the branch has it,
/// modified if both have it with different hashes, removed if only the
/// ancestor has it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SumDiff {
    pub added: SumFile,
    pub modified: SumFile,
    pub removed: SumFile,
}

impl SumDiff {
    /// Added and modified entries together
    pub fn changed(&self) -> SumFile {
        self.added.overlay(&self.modified)
    }
}

/// Compute the difference between `branch` and `ancestor`
pub fn diff(branch: &SumFile, ancestor: &SumFile) -> SumDiff {
    let mut result = SumDiff::default();

    for (key, hash) in branch {
        match ancestor.get(key) {
            None => result.added.set(key.clone(), hash.clone()),
            Some(ancestor_hash) if ancestor_hash != hash => {
                result.modified.set(key.clone(), hash.clone())
            }
            Some(_) => {}
        }
    }

    for (key, hash) in ancestor {
        if !branch.contains_key(key) {
            result.removed.set(key.clone(), hash.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gosum::SumKey;

    #[test]
    fn test_diff_same() {
        let sum = SumFile::parse("example.com/a v1.0.0 h1:a=\n").unwrap();
        assert_eq!(diff(&sum, &sum), SumDiff::default());
    }

    #[test]
    fn test_diff_partitions_keys() {
        let ancestor = SumFile::parse(
            "example.com/a v1.0.0 h1:a=\nexample.com/b v1.0.0 h1:b=\nexample.com/c v1.0.0 h1:c=\n",
        )
        .unwrap();
        let branch = SumFile::parse(
            "example.com/a v1.0.0 h1:a=\nexample.com/b v1.0.0 h1:B=\nexample.com/d v1.0.0 h1:d=\n",
        )
        .unwrap();

        let result = diff(&branch, &ancestor);

        let key = |path: &str| SumKey::new(path, "v1.0.0", "");
        assert_eq!(result.added.len(), 1);
        assert!(result.added.contains_key(&key("example.com/d")));
        assert_eq!(result.modified.len(), 1);
        assert_eq!(result.modified.get(&key("example.com/b")).unwrap().as_str(), "h1:B=");
        assert_eq!(result.removed.len(), 1);
        assert!(result.removed.contains_key(&key("example.com/c")));

        assert_eq!(result.changed().len(), 2);
    }
}
