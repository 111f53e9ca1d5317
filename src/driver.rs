// src/driver.rs

//! Merge-driver pipeline
//!
//! Reads the ancestor, current and other versions of a file, picks the
//! go.mod or go.sum merger based on the file name, and formats the result.

use crate::error::{Error, Result};
use crate::{gomod, gosum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Kind of Go module file being merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    GoMod,
    GoSum,
}

impl FileKind {
    /// Detect the file kind from the file name of `path`
    pub fn detect(path: &Path) -> Result<Self> {
        match path.file_name().and_then(|name| name.to_str()) {
            Some("go.mod") => Ok(FileKind::GoMod),
            Some("go.sum") => Ok(FileKind::GoSum),
            _ => Err(Error::UnknownFile(path.display().to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileKind::GoMod => "go.mod",
            FileKind::GoSum => "go.sum",
        }
    }
}

/// The three versions of the file taking part in a merge
#[derive(Debug, Clone)]
pub struct MergeInputs {
    pub ancestor: PathBuf,
    pub current: PathBuf,
    pub other: PathBuf,
}

/// Where the merged result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `-` means stdout, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(arg))
        }
    }
}

/// Merge the three input files and return the formatted result
pub fn merge_files(kind: FileKind, inputs: &MergeInputs) -> Result<String> {
    info!(
        "Running {} merge: ancestor={}, current={}, other={}",
        kind.as_str(),
        inputs.ancestor.display(),
        inputs.current.display(),
        inputs.other.display()
    );

    let ancestor = fs::read_to_string(&inputs.ancestor)?;
    let current = fs::read_to_string(&inputs.current)?;
    let other = fs::read_to_string(&inputs.other)?;

    match kind {
        FileKind::GoMod => merge_gomod(inputs, &current, &other, &ancestor),
        FileKind::GoSum => merge_gosum(&current, &other, &ancestor),
    }
}

fn merge_gomod(inputs: &MergeInputs, current: &str, other: &str, ancestor: &str) -> Result<String> {
    let ancestor = gomod::parse(&inputs.ancestor.display().to_string(), ancestor)?;
    let current = gomod::parse(&inputs.current.display().to_string(), current)?;
    let other = gomod::parse(&inputs.other.display().to_string(), other)?;

    let merged = gomod::merge(&current, &other, &ancestor);
    debug!("Merged go.mod has {} requirements", merged.requires.len());

    merged.format()
}

fn merge_gosum(current: &str, other: &str, ancestor: &str) -> Result<String> {
    let ancestor = gosum::SumFile::parse(ancestor)?;
    let current = gosum::SumFile::parse(current)?;
    let other = gosum::SumFile::parse(other)?;

    let merged = gosum::merge(&current, &other, &ancestor)?;
    debug!("Merged go.sum has {} entries", merged.len());

    Ok(merged.to_string())
}

/// Write the merged result
pub fn write_output(output: &Output, content: &str) -> Result<()> {
    match output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
        Output::File(path) => {
            fs::write(path, content)?;
            info!("Wrote merged result to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_file_kind() {
        assert_eq!(FileKind::detect(Path::new("go.mod")).unwrap(), FileKind::GoMod);
        assert_eq!(FileKind::detect(Path::new("tools/go.sum")).unwrap(), FileKind::GoSum);
        assert!(matches!(
            FileKind::detect(Path::new("Cargo.toml")),
            Err(Error::UnknownFile(_))
        ));
        assert!(FileKind::detect(Path::new("go.mod.orig")).is_err());
    }

    #[test]
    fn test_output_from_arg() {
        assert_eq!(Output::from_arg("-"), Output::Stdout);
        assert_eq!(Output::from_arg("out/go.mod"), Output::File(PathBuf::from("out/go.mod")));
    }
}
