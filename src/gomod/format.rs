// src/gomod/format.rs

//! go.mod formatter
//!
//! Produces deterministic output: directives in a fixed order, direct and
//! indirect requirements in separate groups, entries sorted by module path.
//! A group with one entry is written as a single line, larger groups as a
//! parenthesised block. Multi-line comments are written above their entry,
//! one-line retraction rationales after it.

use super::{Manifest, ModuleVersion};
use crate::error::{Error, Result};
use crate::version;
use std::cmp::Ordering;

impl Manifest {
    /// Serialize the manifest to go.mod text
    pub fn format(&self) -> Result<String> {
        let mut sections: Vec<String> = Vec::new();

        if let Some(module) = &self.module {
            if module.is_empty() {
                return Err(Error::FormatError("empty module path".to_string()));
            }
            let mut section = String::new();
            if let Some(message) = &self.deprecated {
                section.push_str(&comment_lines(&format!("Deprecated: {}", message)));
            }
            section.push_str(&format!("module {}\n", quote(module)));
            sections.push(section);
        }

        if let Some(go) = &self.go {
            sections.push(format!("go {}\n", go));
        }

        if let Some(toolchain) = &self.toolchain {
            sections.push(format!("toolchain {}\n", toolchain));
        }

        let godebug: Vec<String> = self
            .godebug
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        push_group(&mut sections, "godebug", &godebug);

        let mut direct = Vec::new();
        let mut indirect = Vec::new();
        for req in self.requires.values() {
            if req.path.is_empty() || req.version.is_empty() {
                return Err(Error::FormatError(format!(
                    "requirement '{}' is missing a path or version",
                    req.path
                )));
            }
            let line = format!("{} {}", quote(&req.path), req.version);
            if req.indirect {
                indirect.push(format!("{} // indirect", line));
            } else {
                direct.push(line);
            }
        }
        push_group(&mut sections, "require", &direct);
        push_group(&mut sections, "require", &indirect);

        let tools: Vec<String> = self.tools.iter().map(|tool| quote(tool)).collect();
        push_group(&mut sections, "tool", &tools);

        let mut excludes: Vec<&ModuleVersion> = self.excludes.iter().collect();
        excludes.sort_by(|a, b| compare_module_versions(a, b));
        let excludes: Vec<String> = excludes.into_iter().map(module_version).collect();
        push_group(&mut sections, "exclude", &excludes);

        let mut replaces: Vec<_> = self.replaces.values().collect();
        replaces.sort_by(|a, b| compare_module_versions(&a.old, &b.old));
        let replaces: Vec<String> = replaces
            .into_iter()
            .map(|rep| format!("{} => {}", module_version(&rep.old), module_version(&rep.new)))
            .collect();
        push_group(&mut sections, "replace", &replaces);

        let mut retracts: Vec<_> = self.retracts.values().collect();
        retracts.sort_by(|a, b| {
            version::compare(&a.low, &b.low).then_with(|| version::compare(&a.high, &b.high))
        });
        let retracts: Vec<String> = retracts
            .into_iter()
            .map(|r| {
                let interval = if r.low == r.high {
                    r.low.clone()
                } else {
                    format!("[{}, {}]", r.low, r.high)
                };
                match r.rationale.as_deref() {
                    None => interval,
                    Some(rationale) if rationale.contains('\n') => {
                        format!("{}{}", comment_lines(rationale), interval)
                    }
                    Some(rationale) => format!("{} // {}", interval, rationale),
                }
            })
            .collect();
        push_group(&mut sections, "retract", &retracts);

        Ok(sections.join("\n"))
    }
}

/// Append a directive group as a single line or a block
///
/// An entry may start with comment lines; its last line is the directive
/// itself.
fn push_group(sections: &mut Vec<String>, verb: &str, entries: &[String]) {
    match entries {
        [] => {}
        [entry] => sections.push(match entry.rsplit_once('\n') {
            Some((comments, last)) => format!("{}\n{} {}\n", comments, verb, last),
            None => format!("{} {}\n", verb, entry),
        }),
        _ => {
            let mut block = format!("{} (\n", verb);
            for line in entries.iter().flat_map(|entry| entry.lines()) {
                block.push_str(&format!("\t{}\n", line));
            }
            block.push_str(")\n");
            sections.push(block);
        }
    }
}

/// Render text as `//` comment lines, each ending in a newline
fn comment_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "//\n".to_string()
            } else {
                format!("// {}\n", line)
            }
        })
        .collect()
}

fn module_version(mv: &ModuleVersion) -> String {
    if mv.version.is_empty() {
        quote(&mv.path)
    } else {
        format!("{} {}", quote(&mv.path), mv.version)
    }
}

/// Path order, then semantic version order, then raw text
fn compare_module_versions(a: &ModuleVersion, b: &ModuleVersion) -> Ordering {
    a.path
        .cmp(&b.path)
        .then_with(|| version::compare(&a.version, &b.version))
        .then_with(|| a.version.cmp(&b.version))
}

/// Quote a token if the go.mod lexer would otherwise split or misread it
fn quote(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.contains("//")
        || token.contains("/*")
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '(' | ')'));

    if !needs_quotes {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
