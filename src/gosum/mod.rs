// src/gosum/mod.rs

//! go.sum support
//!
//! A go.sum file is a flat list of `<module> <version>[/<subpath>] <hash>`
//! lines. `SumFile` holds it as an ordered map so that formatting is
//! deterministic, and refuses to record two different hashes for one key.

pub mod diff;
pub mod merge;

pub use diff::{SumDiff, diff};
pub use merge::merge;

use crate::error::{Error, Result};
use crate::version;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

/// Identity of one go.sum record
///
/// `sub_path` is empty for the module content hash and `go.mod` for the
/// hash of the module's go.mod file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SumKey {
    pub module_path: String,
    pub version: String,
    pub sub_path: String,
}

impl SumKey {
    pub fn new(
        module_path: impl Into<String>,
        version: impl Into<String>,
        sub_path: impl Into<String>,
    ) -> Self {
        Self {
            module_path: module_path.into(),
            version: version.into(),
            sub_path: sub_path.into(),
        }
    }
}

impl Ord for SumKey {
    /// Module path, then semantic version, then sub-path
    ///
    /// Versions that compare equal semantically (`v2.0.0` and
    /// `v2.0.0+incompatible`) fall back to their text so the order stays
    /// consistent with equality.
    fn cmp(&self, other: &Self) -> Ordering {
        self.module_path
            .cmp(&other.module_path)
            .then_with(|| version::compare(&self.version, &other.version))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.sub_path.cmp(&other.sub_path))
    }
}

impl PartialOrd for SumKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_path.is_empty() {
            write!(f, "{} {}", self.module_path, self.version)
        } else {
            write!(f, "{} {}/{}", self.module_path, self.version, self.sub_path)
        }
    }
}

/// A go.sum checksum, e.g. `h1:zY54UmvipHiNd+pm+m0x9KhZ9hl1/7QNMyxXbc6ICqA=`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(pub String);

impl Checksum {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured form of a go.sum file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SumFile {
    entries: BTreeMap<SumKey, Checksum>,
}

impl SumFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse go.sum text
    ///
    /// Every line must have exactly three whitespace-separated fields.
    /// Repeated lines are accepted only if they agree on the hash.
    pub fn parse(content: &str) -> Result<Self> {
        let mut sum = Self::new();

        for (idx, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let &[module_path, version, hash] = fields.as_slice() else {
                return Err(Error::MalformedLine {
                    line: idx + 1,
                    fields: fields.len(),
                });
            };

            let (version, sub_path) = version.split_once('/').unwrap_or((version, ""));
            sum.insert(SumKey::new(module_path, version, sub_path), Checksum::new(hash))?;
        }

        Ok(sum)
    }

    /// Record a hash, failing if a different hash is already recorded
    pub fn insert(&mut self, key: SumKey, hash: Checksum) -> Result<()> {
        if let Some(existing) = self.entries.get(&key) {
            if *existing != hash {
                return Err(Error::HashMismatch {
                    key: key.to_string(),
                    existing: existing.to_string(),
                    incoming: hash.to_string(),
                });
            }
            return Ok(());
        }

        self.entries.insert(key, hash);
        Ok(())
    }

    /// Record a hash, replacing any existing one
    pub fn set(&mut self, key: SumKey, hash: Checksum) {
        self.entries.insert(key, hash);
    }

    pub fn remove(&mut self, key: &SumKey) -> Option<Checksum> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &SumKey) -> Option<&Checksum> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &SumKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in output order
    pub fn iter(&self) -> btree_map::Iter<'_, SumKey, Checksum> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, SumKey, Checksum> {
        self.entries.keys()
    }

    /// Entries of `self`, with `fallback`'s entries for keys `self` lacks
    pub fn overlay(&self, fallback: &SumFile) -> SumFile {
        let mut result = self.clone();
        for (key, hash) in fallback {
            if !result.contains_key(key) {
                result.set(key.clone(), hash.clone());
            }
        }
        result
    }
}

impl<'a> IntoIterator for &'a SumFile {
    type Item = (&'a SumKey, &'a Checksum);
    type IntoIter = btree_map::Iter<'a, SumKey, Checksum>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromStr for SumFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SumFile {
    /// One `<module> <version>[/<subpath>] <hash>` line per entry
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, hash) in &self.entries {
            writeln!(f, "{} {}", key, hash)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_MOD: &str = "golang.org/x/mod v0.17.0 h1:zY54UmvipHiNd+pm+m0x9KhZ9hl1/7QNMyxXbc6ICqA=
golang.org/x/mod v0.17.0/go.mod h1:hTbmBsO62+eylJbnUtE2MGJUyE7QWk4xUqPFrRgJ+7c=
";

    #[test]
    fn test_parse_empty() {
        let sum = SumFile::parse("").unwrap();
        assert!(sum.is_empty());
    }

    #[test]
    fn test_parse_single_mod() {
        let sum = SumFile::parse(SINGLE_MOD).unwrap();
        assert_eq!(sum.len(), 2);

        let mut key = SumKey::new("golang.org/x/mod", "v0.17.0", "");
        assert_eq!(
            sum.get(&key).map(Checksum::as_str),
            Some("h1:zY54UmvipHiNd+pm+m0x9KhZ9hl1/7QNMyxXbc6ICqA=")
        );

        key.sub_path = "go.mod".to_string();
        assert_eq!(
            sum.get(&key).map(Checksum::as_str),
            Some("h1:hTbmBsO62+eylJbnUtE2MGJUyE7QWk4xUqPFrRgJ+7c=")
        );
    }

    #[test]
    fn test_parse_duplicate_conflicting_hash() {
        let content = "golang.org/x/mod v0.17.0 h1:aaa=\ngolang.org/x/mod v0.17.0 h1:bbb=\n";
        let err = SumFile::parse(content).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_parse_duplicate_identical_hash() {
        let content = "golang.org/x/mod v0.17.0 h1:aaa=\ngolang.org/x/mod v0.17.0 h1:aaa=\n";
        assert_eq!(SumFile::parse(content).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_malformed_line() {
        let content = "golang.org/x/mod v0.17.0 h1:aaa=\ngolang.org/x/mod v0.17.0\n";
        match SumFile::parse(content) {
            Err(Error::MalformedLine { line, fields }) => {
                assert_eq!(line, 2);
                assert_eq!(fields, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(SumFile::parse("a v1.0.0 h1:x= extra\n").is_err());
    }

    #[test]
    fn test_format_sorted() {
        let mut sum = SumFile::new();
        sum.insert(SumKey::new("golang.org/x/mod", "v0.17.0", ""), Checksum::new("h1:zY54UmvipHiNd+pm+m0x9KhZ9hl1/7QNMyxXbc6ICqA=")).unwrap();
        sum.insert(SumKey::new("golang.org/x/mod", "v0.17.0", "go.mod"), Checksum::new("h1:hTbmBsO62+eylJbnUtE2MGJUyE7QWk4xUqPFrRgJ+7c=")).unwrap();
        sum.insert(SumKey::new("golang.org/x/exp", "v0.0.0-20240506185415-9bf2ced13842", ""), Checksum::new("h1:vr/HnozRka3pE4EsMEg1lgkXJkTFJCVUX+S/ZT6wYzM=")).unwrap();
        sum.insert(SumKey::new("golang.org/x/exp", "v0.0.0-20240506185415-9bf2ced13842", "go.mod"), Checksum::new("h1:XtvwrStGgqGPLc4cjQfWqZHG1YFdYs6swckp8vpsjnc=")).unwrap();

        let expected = "golang.org/x/exp v0.0.0-20240506185415-9bf2ced13842 h1:vr/HnozRka3pE4EsMEg1lgkXJkTFJCVUX+S/ZT6wYzM=
golang.org/x/exp v0.0.0-20240506185415-9bf2ced13842/go.mod h1:XtvwrStGgqGPLc4cjQfWqZHG1YFdYs6swckp8vpsjnc=
golang.org/x/mod v0.17.0 h1:zY54UmvipHiNd+pm+m0x9KhZ9hl1/7QNMyxXbc6ICqA=
golang.org/x/mod v0.17.0/go.mod h1:hTbmBsO62+eylJbnUtE2MGJUyE7QWk4xUqPFrRgJ+7c=
";
        assert_eq!(sum.to_string(), expected);
    }

    #[test]
    fn test_versions_sort_semantically() {
        let content = "example.com/a v1.10.0 h1:c=\nexample.com/a v1.9.0 h1:b=\nexample.com/a v1.9.0-rc.1 h1:a=\n";
        let sum = SumFile::parse(content).unwrap();
        let versions: Vec<&str> = sum.keys().map(|key| key.version.as_str()).collect();
        assert_eq!(versions, vec!["v1.9.0-rc.1", "v1.9.0", "v1.10.0"]);
    }

    #[test]
    fn test_format_parse_round_trip() {
        let sum = SumFile::parse(SINGLE_MOD).unwrap();
        assert_eq!(sum.to_string().parse::<SumFile>().unwrap(), sum);
    }

    #[test]
    fn test_overlay_prefers_self() {
        let top = SumFile::parse("example.com/a v1.0.0 h1:new=\n").unwrap();
        let bottom = SumFile::parse("example.com/a v1.0.0 h1:old=\nexample.com/b v1.0.0 h1:b=\n").unwrap();

        let merged = top.overlay(&bottom);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get(&SumKey::new("example.com/a", "v1.0.0", "")).map(Checksum::as_str),
            Some("h1:new=")
        );
    }
}
