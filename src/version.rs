// src/version.rs

//! Version ordering for Go modules and Go toolchains
//!
//! Two orderings are needed when merging module files:
//!
//! - Module versions (`v1.2.3`, `v0.0.0-20240506185415-9bf2ced13842`,
//!   `v2.0.0+incompatible`) follow semantic versioning with a mandatory `v`
//!   prefix. Shorthand forms `v1` and `v1.2` are accepted when no pre-release
//!   or build suffix is present. Build metadata does not affect ordering.
//! - Toolchain versions (`1.21`, `1.21rc1`, `1.21.0`, `go1.22.0`) use Go's own
//!   release ordering, where a language version sorts before its release
//!   candidates, which sort before the `.0` release.
//!
//! Invalid strings sort below every valid version and compare equal to each
//! other in both orderings.

use semver::Version;
use std::cmp::Ordering;

/// Parse a Go module version into a semver `Version`
///
/// Returns `None` for strings Go would reject as invalid semantic versions.
pub fn parse_module_version(version: &str) -> Option<Version> {
    let rest = version.strip_prefix('v')?;
    let core_end = rest.find(['-', '+']).unwrap_or(rest.len());
    let has_suffix = core_end < rest.len();

    let normalized = match rest[..core_end].matches('.').count() {
        0 if !has_suffix => format!("{}.0.0", rest),
        1 if !has_suffix => format!("{}.0", rest),
        2 => rest.to_string(),
        _ => return None,
    };

    Version::parse(&normalized).ok()
}

/// Whether `version` is a valid Go module version
pub fn is_valid(version: &str) -> bool {
    parse_module_version(version).is_some()
}

/// Compare two Go module versions
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse_module_version(a), parse_module_version(b)) {
        (Some(a), Some(b)) => a
            .major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            .then_with(|| a.pre.cmp(&b.pre)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Release kind of a toolchain version; declaration order is sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ReleaseKind {
    Final,
    Alpha,
    Beta,
    Rc,
}

/// A parsed Go toolchain version
///
/// Field order matters: the derived ordering compares major, minor, patch,
/// kind and pre-release number in turn, and a missing component sorts below
/// any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GoVersion {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
    kind: ReleaseKind,
    pre: Option<u64>,
}

impl GoVersion {
    /// Parse a toolchain version, ignoring a leading `go` prefix
    pub fn parse(version: &str) -> Option<Self> {
        let version = version.strip_prefix("go").unwrap_or(version);
        let (major, rest) = split_number(version)?;

        let mut parsed = Self {
            major,
            minor: None,
            patch: None,
            kind: ReleaseKind::Final,
            pre: None,
        };

        if rest.is_empty() {
            return Some(parsed);
        }

        let (minor, rest) = split_number(rest.strip_prefix('.')?)?;
        parsed.minor = Some(minor);

        if rest.is_empty() {
            return Some(parsed);
        }

        if let Some(rest) = rest.strip_prefix('.') {
            let (patch, rest) = split_number(rest)?;
            if !rest.is_empty() {
                return None;
            }
            parsed.patch = Some(patch);
            return Some(parsed);
        }

        let (kind, rest) = if let Some(rest) = rest.strip_prefix("alpha") {
            (ReleaseKind::Alpha, rest)
        } else if let Some(rest) = rest.strip_prefix("beta") {
            (ReleaseKind::Beta, rest)
        } else if let Some(rest) = rest.strip_prefix("rc") {
            (ReleaseKind::Rc, rest)
        } else {
            return None;
        };

        let (pre, rest) = split_number(rest)?;
        if !rest.is_empty() {
            return None;
        }

        parsed.kind = kind;
        parsed.pre = Some(pre);
        Some(parsed)
    }
}

/// Split a leading run of ASCII digits off `s`
fn split_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Compare two Go toolchain versions
pub fn compare_go(a: &str, b: &str) -> Ordering {
    GoVersion::parse(a).cmp(&GoVersion::parse(b))
}

/// Pick the greater of two optional toolchain versions
///
/// Ties, including two absent versions, resolve to `b`.
pub fn max_go(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let pick_a = match (a, b) {
        (Some(a), Some(b)) => compare_go(a, b) == Ordering::Greater,
        (Some(_), None) => true,
        (None, _) => false,
    };

    if pick_a {
        a.map(str::to_string)
    } else {
        b.map(str::to_string)
    }
}
