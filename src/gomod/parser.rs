// src/gomod/parser.rs

//! go.mod parser
//!
//! Parses the line-oriented go.mod syntax: single-line directives
//! (`require example.com/a v1.0.0`) and parenthesised blocks
//! (`require ( ... )`). Comments are discarded except for the ones Go
//! tooling reads back: the `// indirect` marker on requirements, the
//! rationale attached to a `retract` entry and a `// Deprecated:` comment
//! on the module directive.

use super::{Manifest, ModuleVersion, Requirement, Retraction};
use crate::error::{Error, Result};
use crate::version;
use tracing::debug;

/// Directives that may open a parenthesised block
const BLOCK_VERBS: &[&str] = &["require", "exclude", "replace", "retract", "tool", "godebug"];

/// Parse the contents of a go.mod file
///
/// `file` is only used to label errors.
pub fn parse(file: &str, content: &str) -> Result<Manifest> {
    let mut manifest = Manifest::default();
    let mut block: Option<(String, usize)> = None;
    // Comment lines directly above the next directive
    let mut leading: Vec<String> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let err = |message: String| Error::ParseError {
            file: file.to_string(),
            line: line_no,
            message,
        };

        let (tokens, comment) = tokenize(raw).map_err(err)?;

        if tokens.is_empty() {
            match comment {
                Some(comment) => leading.push(comment.trim().to_string()),
                None => leading.clear(),
            }
            continue;
        }

        let comments = Comments {
            leading: std::mem::take(&mut leading),
            trailing: comment,
        };

        if let Some((verb, _)) = &block {
            if tokens.len() == 1 && tokens[0] == ")" {
                block = None;
                continue;
            }
            apply(&mut manifest, verb, &tokens, &comments).map_err(err)?;
            continue;
        }

        let Some((verb, args)) = tokens.split_first() else {
            continue;
        };

        if args.len() == 1 && args[0] == "(" {
            if !BLOCK_VERBS.contains(&verb.as_str()) {
                return Err(err(format!("{} cannot be used as a block", verb)));
            }
            block = Some((verb.clone(), line_no));
            continue;
        }

        apply(&mut manifest, verb, args, &comments).map_err(err)?;
    }

    if let Some((verb, start)) = block {
        return Err(Error::ParseError {
            file: file.to_string(),
            line: start,
            message: format!("unterminated {} block", verb),
        });
    }

    debug!(
        "Parsed {}: {} requires, {} excludes, {} replaces, {} tools",
        file,
        manifest.requires.len(),
        manifest.excludes.len(),
        manifest.replaces.len(),
        manifest.tools.len()
    );

    Ok(manifest)
}

/// Comments attached to one directive line
#[derive(Debug)]
struct Comments {
    /// Comment-only lines directly above, without the `//`
    leading: Vec<String>,
    /// Text after `//` on the directive line itself
    trailing: Option<String>,
}

impl Comments {
    fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref().map(str::trim)
    }

    /// All comment lines, leading ones first
    fn lines(&self) -> impl Iterator<Item = &str> {
        self.leading.iter().map(String::as_str).chain(self.trailing())
    }

    /// The comment lines joined into one text, if there are any
    fn text(&self) -> Option<String> {
        let lines: Vec<&str> = self.lines().filter(|line| !line.is_empty()).collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// Apply one directive to the manifest
fn apply(
    manifest: &mut Manifest,
    verb: &str,
    args: &[String],
    comments: &Comments,
) -> std::result::Result<(), String> {
    match verb {
        "module" => {
            manifest.module = Some(single(verb, args)?);
            manifest.deprecated = deprecation(comments);
        }
        "go" => manifest.go = Some(single(verb, args)?),
        "toolchain" => manifest.toolchain = Some(single(verb, args)?),
        "godebug" => {
            let setting = single(verb, args)?;
            let (key, value) = setting
                .split_once('=')
                .ok_or_else(|| format!("invalid godebug setting: {}", setting))?;
            manifest
                .godebug
                .insert(key.trim().to_string(), value.trim().to_string());
        }
        "require" => {
            let [path, version] = args else {
                return Err("usage: require module/path v1.2.3".to_string());
            };
            check_version(version)?;
            let indirect = comments.trailing().is_some_and(is_indirect);
            manifest.add_require(Requirement {
                path: path.clone(),
                version: version.clone(),
                indirect,
            });
        }
        "exclude" => {
            let [path, version] = args else {
                return Err("usage: exclude module/path v1.2.3".to_string());
            };
            check_version(version)?;
            manifest.add_exclude(path.clone(), version.clone());
        }
        "replace" => {
            let (old, new) = parse_replace(args)?;
            manifest.add_replace(old, new);
        }
        "retract" => {
            let mut retraction = parse_retract(args)?;
            retraction.rationale = comments.text();
            manifest.add_retract(retraction);
        }
        "tool" => {
            manifest.tools.insert(single(verb, args)?);
        }
        other => return Err(format!("unknown directive: {}", other)),
    }

    Ok(())
}

fn single(verb: &str, args: &[String]) -> std::result::Result<String, String> {
    match args {
        [arg] => Ok(arg.clone()),
        _ => Err(format!("{} expects exactly one argument", verb)),
    }
}

fn check_version(version: &str) -> std::result::Result<(), String> {
    if version::is_valid(version) {
        Ok(())
    } else {
        Err(format!("invalid module version: {}", version))
    }
}

/// `replace old [v] => new [v]`
fn parse_replace(args: &[String]) -> std::result::Result<(ModuleVersion, ModuleVersion), String> {
    let usage = || "usage: replace module/path [v1.2.3] => other/module v1.4 | ../local/dir".to_string();

    let arrow = args.iter().position(|arg| arg == "=>").ok_or_else(usage)?;
    let (lhs, rhs) = (&args[..arrow], &args[arrow + 1..]);

    let old = match lhs {
        [path] => ModuleVersion::new(path.clone(), ""),
        [path, version] => {
            check_version(version)?;
            ModuleVersion::new(path.clone(), version.clone())
        }
        _ => return Err(usage()),
    };

    let new = match rhs {
        [path] => ModuleVersion::new(path.clone(), ""),
        [path, version] => {
            check_version(version)?;
            ModuleVersion::new(path.clone(), version.clone())
        }
        _ => return Err(usage()),
    };

    Ok((old, new))
}

/// `retract v1.0.0` or `retract [v1.0.0, v1.1.0]`
fn parse_retract(args: &[String]) -> std::result::Result<Retraction, String> {
    let joined = args.join(" ");

    let (low, high) = match joined
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
    {
        Some(inner) => {
            let (low, high) = inner
                .split_once(',')
                .ok_or_else(|| format!("invalid retract interval: {}", joined))?;
            (low.trim().to_string(), high.trim().to_string())
        }
        None if args.len() == 1 => (joined.clone(), joined.clone()),
        None => return Err("usage: retract v1.2.3 | [v1.2.3, v1.4.5]".to_string()),
    };

    check_version(&low)?;
    check_version(&high)?;
    Ok(Retraction::interval(low, high))
}

/// The message of a `Deprecated:` paragraph in the module comments
///
/// The paragraph runs from the line starting with `Deprecated:` to the next
/// blank comment line.
fn deprecation(comments: &Comments) -> Option<String> {
    let mut lines = comments.lines().skip_while(|line| !line.starts_with("Deprecated:"));
    let first = lines.next()?.trim_start_matches("Deprecated:").trim();

    let mut message = vec![first];
    message.extend(lines.take_while(|line| !line.is_empty()));
    let message = message.join("\n");

    (!message.trim().is_empty()).then_some(message)
}

/// Whether a trailing comment marks a requirement as indirect
fn is_indirect(comment: &str) -> bool {
    let comment = comment.trim();
    comment == "indirect" || comment.starts_with("indirect;")
}

/// Split a line into tokens and an optional trailing comment
///
/// Double-quoted tokens support `\"` and `\\` escapes; back-quoted tokens
/// are taken verbatim.
fn tokenize(line: &str) -> std::result::Result<(Vec<String>, Option<String>), String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if line[pos..].starts_with("//") {
            return Ok((tokens, Some(line[pos + 2..].to_string())));
        }

        match c {
            '"' => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => token.push(escaped),
                            None => return Err("unterminated quoted string".to_string()),
                        },
                        Some((_, ch)) => token.push(ch),
                        None => return Err("unterminated quoted string".to_string()),
                    }
                }
                tokens.push(token);
            }
            '`' => {
                chars.next();
                let mut token = String::new();
                loop {
                    match chars.next() {
                        Some((_, '`')) => break,
                        Some((_, ch)) => token.push(ch),
                        None => return Err("unterminated raw string".to_string()),
                    }
                }
                tokens.push(token);
            }
            _ => {
                let mut token = String::new();
                while let Some(&(p, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == '"' || ch == '`' || line[p..].starts_with("//") {
                        break;
                    }
                    token.push(ch);
                    chars.next();
                }
                tokens.push(token);
            }
        }
    }

    Ok((tokens, None))
}
