//! `$NAME` / `${NAME}` expansion inside env file values.
//!
//! Responsibilities:
//! - Expand references in every env file value, consulting the environment
//!   and the file itself according to a `LookupPolicy`.
//! - Apply a `MissingPolicy` to references nothing can resolve.
//! - Detect circular references between file values.
//!
//! Does NOT handle:
//! - Anything schema related. This module only rewrites a flat `EnvFile`.
//! - Expressions such as `${NAME:-default}`; only bare identifiers are references.
//!
//! Invariants:
//! - Environment values are substituted verbatim and never re-expanded.
//! - Substituted text is never rescanned for further references.
//! - `\$` always produces a literal `$` and is never looked up.
//! - Each file key is expanded at most once per call (memoized).
//! - Reference chains are followed iteratively; their length never grows the call stack.
//! - Resolution state lives in a per-call `Resolver`; nothing is cached globally.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::constants::{CYCLE_PATH_SEPARATOR, ESCAPE_CHAR, REFERENCE_MARKER};
use crate::env_file::EnvFile;
use crate::environment::EnvironmentGuard;
use crate::error::ConfigError;

/// What to do with a reference that no consulted source can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Fail the load.
    #[default]
    Error,
    /// Keep the original token text, e.g. `${NAME}`.
    Leave,
    /// Substitute an empty string.
    Empty,
}

/// Which sources a reference is resolved from, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    #[default]
    EnvFirst,
    FileFirst,
    FileOnly,
    EnvOnly,
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingPolicy::Error => "error",
            MissingPolicy::Leave => "leave",
            MissingPolicy::Empty => "empty",
        })
    }
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(MissingPolicy::Error),
            "leave" => Ok(MissingPolicy::Leave),
            "empty" => Ok(MissingPolicy::Empty),
            other => Err(format!(
                "unknown missing policy '{}' (expected error, leave or empty)",
                other
            )),
        }
    }
}

impl fmt::Display for LookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookupPolicy::EnvFirst => "env-first",
            LookupPolicy::FileFirst => "file-first",
            LookupPolicy::FileOnly => "file-only",
            LookupPolicy::EnvOnly => "env-only",
        })
    }
}

impl FromStr for LookupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "env-first" => Ok(LookupPolicy::EnvFirst),
            "file-first" => Ok(LookupPolicy::FileFirst),
            "file-only" => Ok(LookupPolicy::FileOnly),
            "env-only" => Ok(LookupPolicy::EnvOnly),
            other => Err(format!(
                "unknown lookup policy '{}' (expected env-first, file-first, file-only or env-only)",
                other
            )),
        }
    }
}

/// Interpolation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterpolationOptions {
    pub missing: MissingPolicy,
    pub lookup: LookupPolicy,
}

impl InterpolationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_lookup(mut self, lookup: LookupPolicy) -> Self {
        self.lookup = lookup;
        self
    }
}

/// Expand every value in `file`, returning a new map with the same key order.
pub fn interpolate(
    file: &EnvFile,
    env: &EnvironmentGuard,
    options: &InterpolationOptions,
) -> Result<EnvFile, ConfigError> {
    let mut resolver = Resolver {
        file,
        env,
        options,
        memo: HashMap::new(),
    };
    let mut expanded = EnvFile::new();
    for key in file.keys() {
        let value = resolver.resolve_key(key)?;
        expanded.insert(key, value);
    }
    debug!(
        entries = expanded.len(),
        lookup = %options.lookup,
        missing = %options.missing,
        "interpolated env file"
    );
    Ok(expanded)
}

struct Resolver<'a> {
    file: &'a EnvFile,
    env: &'a EnvironmentGuard,
    options: &'a InterpolationOptions,
    memo: HashMap<String, String>,
}

/// A file value whose expansion is in progress.
struct Frame {
    key: String,
    chars: Vec<char>,
    pos: usize,
    out: String,
}

/// Where `expand` stopped.
enum Step {
    Done(String),
    /// Expansion needs this file key resolved first.
    Needs(String),
}

/// Result of looking a reference name up without recursing.
enum Lookup {
    Found(String),
    /// Present in the file but not yet expanded.
    Pending,
    Missing,
}

impl Resolver<'_> {
    /// Fully expanded value of a key present in the file.
    ///
    /// Chains of file references are followed on an explicit frame stack, so
    /// their length is bounded by memory rather than by the call stack.
    fn resolve_key(&mut self, key: &str) -> Result<String, ConfigError> {
        if let Some(done) = self.memo.get(key) {
            return Ok(done.clone());
        }

        let mut frames = vec![self.frame(key)];
        while let Some(frame) = frames.last_mut() {
            match self.expand(frame)? {
                Step::Done(value) => {
                    let key = std::mem::take(&mut frame.key);
                    frames.pop();
                    self.memo.insert(key, value);
                }
                Step::Needs(name) => {
                    if let Some(start) = frames.iter().position(|f| f.key == name) {
                        let mut path: Vec<&str> =
                            frames[start..].iter().map(|f| f.key.as_str()).collect();
                        path.push(&name);
                        return Err(ConfigError::CircularReference {
                            path: path.join(CYCLE_PATH_SEPARATOR),
                        });
                    }
                    frames.push(self.frame(&name));
                }
            }
        }

        Ok(self.memo.get(key).cloned().unwrap_or_default())
    }

    fn frame(&self, key: &str) -> Frame {
        let raw = self.file.get(key).unwrap_or_default();
        Frame {
            key: key.to_string(),
            chars: raw.chars().collect(),
            pos: 0,
            out: String::with_capacity(raw.len()),
        }
    }

    /// Scan `frame` forward until it finishes or hits an unexpanded file key.
    ///
    /// A `Needs` result leaves `pos` on the reference, so the scan retries it
    /// once the dependency is memoized.
    fn expand(&self, frame: &mut Frame) -> Result<Step, ConfigError> {
        while frame.pos < frame.chars.len() {
            let c = frame.chars[frame.pos];
            if c == ESCAPE_CHAR && frame.chars.get(frame.pos + 1) == Some(&REFERENCE_MARKER) {
                frame.out.push(REFERENCE_MARKER);
                frame.pos += 2;
                continue;
            }
            if c != REFERENCE_MARKER {
                frame.out.push(c);
                frame.pos += 1;
                continue;
            }

            let Some((name, end)) = scan_reference(&frame.chars, frame.pos) else {
                frame.out.push(c);
                frame.pos += 1;
                continue;
            };
            match self.lookup(&name) {
                Lookup::Found(value) => frame.out.push_str(&value),
                Lookup::Pending => return Ok(Step::Needs(name)),
                Lookup::Missing => match self.options.missing {
                    MissingPolicy::Error => {
                        return Err(ConfigError::UnresolvedReference { name });
                    }
                    MissingPolicy::Leave => {
                        debug!(name, "leaving unresolved reference in place");
                        frame.out.extend(&frame.chars[frame.pos..end]);
                    }
                    MissingPolicy::Empty => {
                        debug!(name, "replacing unresolved reference with empty string");
                    }
                },
            }
            frame.pos = end;
        }
        Ok(Step::Done(std::mem::take(&mut frame.out)))
    }

    fn lookup(&self, name: &str) -> Lookup {
        match self.options.lookup {
            LookupPolicy::EnvFirst => match self.env.get(name) {
                Some(value) => Lookup::Found(value),
                None => self.from_file(name),
            },
            LookupPolicy::FileFirst => match self.from_file(name) {
                Lookup::Missing => self.from_env(name),
                found => found,
            },
            LookupPolicy::FileOnly => self.from_file(name),
            LookupPolicy::EnvOnly => self.from_env(name),
        }
    }

    fn from_env(&self, name: &str) -> Lookup {
        self.env.get(name).map_or(Lookup::Missing, Lookup::Found)
    }

    fn from_file(&self, name: &str) -> Lookup {
        if !self.file.contains_key(name) {
            return Lookup::Missing;
        }
        match self.memo.get(name) {
            Some(value) => Lookup::Found(value.clone()),
            None => Lookup::Pending,
        }
    }
}

/// Parse a `${NAME}` or `$NAME` reference starting at the `$` at `start`.
///
/// Returns the name and the index just past the token.
fn scan_reference(chars: &[char], start: usize) -> Option<(String, usize)> {
    match chars.get(start + 1).copied() {
        Some('{') => {
            let open = start + 2;
            let close = open + chars[open..].iter().position(|&c| c == '}')?;
            let name: String = chars[open..close].iter().collect();
            is_identifier(&name).then_some((name, close + 1))
        }
        Some(c) if is_identifier_start(c) => {
            let end = chars[start + 1..]
                .iter()
                .position(|&c| !is_identifier_continue(c))
                .map_or(chars.len(), |offset| start + 1 + offset);
            Some((chars[start + 1..end].iter().collect(), end))
        }
        _ => None,
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_file::parse_env_str;

    fn run(
        file: &str,
        env: &[(&str, &str)],
        options: InterpolationOptions,
    ) -> Result<EnvFile, ConfigError> {
        let guard = EnvironmentGuard::from_map(env.iter().copied());
        interpolate(&parse_env_str(file), &guard, &options)
    }

    fn expand(file: &str, env: &[(&str, &str)]) -> EnvFile {
        run(file, env, InterpolationOptions::default()).unwrap()
    }

    #[test]
    fn test_values_without_references_are_unchanged() {
        let file = expand("A=plain value\nB=cost: 5 dollars\nC=", &[]);
        assert_eq!(file.get("A"), Some("plain value"));
        assert_eq!(file.get("B"), Some("cost: 5 dollars"));
        assert_eq!(file.get("C"), Some(""));
    }

    #[test]
    fn test_bare_and_braced_references() {
        let file = expand("A=1\nB=$A\nC=${A}x\nE=${A}_suffix", &[]);
        assert_eq!(file.get("B"), Some("1"));
        assert_eq!(file.get("C"), Some("1x"));
        assert_eq!(file.get("E"), Some("1_suffix"));

        // `$A_suffix` names the variable A_suffix, which does not exist.
        let err = run("A=1\nD=$A_suffix", &[], InterpolationOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedReference { name } if name == "A_suffix"));
    }

    #[test]
    fn test_forward_references_and_chains() {
        let file = expand(
            "URL=postgres://$HOST:$PORT/db\nHOST=${PREFIX}db\nPREFIX=pg-\nPORT=5432",
            &[],
        );
        assert_eq!(file.get("URL"), Some("postgres://pg-db:5432/db"));
        assert_eq!(file.get("HOST"), Some("pg-db"));
    }

    #[test]
    fn test_escaped_dollar_is_literal_and_never_looked_up() {
        let guard = EnvironmentGuard::from_map([("A", "env")]);
        let file = parse_env_str("A=1\nB=\\$A\nC=\\${A}\nD=price \\$5");
        let expanded = interpolate(&file, &guard, &InterpolationOptions::default()).unwrap();

        assert_eq!(expanded.get("B"), Some("$A"));
        assert_eq!(expanded.get("C"), Some("${A}"));
        assert_eq!(expanded.get("D"), Some("price $5"));
        assert!(!guard.was_read("A"));
    }

    #[test]
    fn test_non_reference_dollars_are_literal() {
        let file = expand("A=$\nB=$5\nC=${unterminated\nD=${not-an-id}\nE=a $ b", &[]);
        assert_eq!(file.get("A"), Some("$"));
        assert_eq!(file.get("B"), Some("$5"));
        assert_eq!(file.get("C"), Some("${unterminated"));
        assert_eq!(file.get("D"), Some("${not-an-id}"));
        assert_eq!(file.get("E"), Some("a $ b"));
    }

    #[test]
    fn test_env_values_are_not_re_expanded() {
        let file = expand("A=$SECRET\nOTHER=leak", &[("SECRET", "${OTHER}$OTHER")]);
        assert_eq!(file.get("A"), Some("${OTHER}$OTHER"));
    }

    #[test]
    fn test_escaped_file_value_is_not_re_expanded_by_reference() {
        let file = expand("A=\\$B\nB=x\nC=$A", &[]);
        assert_eq!(file.get("C"), Some("$B"));
    }

    #[test]
    fn test_cycle_names_full_path() {
        let err = run("A=$B\nB=$A", &[], InterpolationOptions::default()).unwrap_err();
        match err {
            ConfigError::CircularReference { path } => assert_eq!(path, "A -> B -> A"),
            other => panic!("expected CircularReference, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_path_starts_at_repeated_key() {
        let err = run("START=$A\nA=${B}\nB=$C\nC=$A", &[], InterpolationOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference in interpolation: A -> B -> C -> A"
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = run("A=x$A", &[], InterpolationOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::CircularReference { path } if path == "A -> A"));
    }

    #[test]
    fn test_env_shadows_file_breaking_would_be_cycle() {
        // With env-first, the environment value of B is used and the file's B is never visited.
        let file = expand("A=$B\nB=$A", &[("B", "from-env")]);
        assert_eq!(file.get("A"), Some("from-env"));
        assert_eq!(file.get("B"), Some("from-env"));
    }

    #[test]
    fn test_missing_policy_matrix() {
        let source = "A=[$NOPE]\nB=[${NOPE}]";

        let err = run(source, &[], InterpolationOptions::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedReference { name } if name == "NOPE"));

        let leave_options = InterpolationOptions::new().with_missing(MissingPolicy::Leave);
        let leave = run(source, &[], leave_options).unwrap();
        assert_eq!(leave.get("A"), Some("[$NOPE]"));
        assert_eq!(leave.get("B"), Some("[${NOPE}]"));

        let empty_options = InterpolationOptions::new().with_missing(MissingPolicy::Empty);
        let empty = run(source, &[], empty_options).unwrap();
        assert_eq!(empty.get("A"), Some("[]"));
        assert_eq!(empty.get("B"), Some("[]"));
    }

    #[test]
    fn test_lookup_policies() {
        let file = "HOST=file-host\nURL=$HOST|$ONLY_ENV|$ONLY_FILE\nONLY_FILE=f";
        let env = [("HOST", "env-host"), ("ONLY_ENV", "e")];
        let leave = InterpolationOptions::new().with_missing(MissingPolicy::Leave);

        let env_first = run(file, &env, leave.with_lookup(LookupPolicy::EnvFirst)).unwrap();
        assert_eq!(env_first.get("URL"), Some("env-host|e|f"));

        let file_first = run(file, &env, leave.with_lookup(LookupPolicy::FileFirst)).unwrap();
        assert_eq!(file_first.get("URL"), Some("file-host|e|f"));

        let file_only = run(file, &env, leave.with_lookup(LookupPolicy::FileOnly)).unwrap();
        assert_eq!(file_only.get("URL"), Some("file-host|$ONLY_ENV|f"));

        let env_only = run(file, &env, leave.with_lookup(LookupPolicy::EnvOnly)).unwrap();
        assert_eq!(env_only.get("URL"), Some("env-host|e|$ONLY_FILE"));
    }

    #[test]
    fn test_long_reference_chain_resolves() {
        let depth = 5000;
        let mut text: String = (0..depth).map(|i| format!("K{}=$K{}\n", i, i + 1)).collect();
        text.push_str(&format!("K{}=end\n", depth));

        let file = run(
            &text,
            &[],
            InterpolationOptions::new().with_lookup(LookupPolicy::FileOnly),
        )
        .unwrap();

        assert_eq!(file.get("K0"), Some("end"));
        assert_eq!(file.get(&format!("K{}", depth / 2)), Some("end"));
    }

    #[test]
    fn test_long_reference_cycle_is_reported() {
        let depth = 5000;
        let text: String = (0..depth)
            .map(|i| format!("K{}=${{K{}}}\n", i, (i + 1) % depth))
            .collect();

        let err = run(&text, &[], InterpolationOptions::default()).unwrap_err();
        match err {
            ConfigError::CircularReference { path } => {
                assert!(path.starts_with("K0 -> K1 -> "));
                assert!(path.ends_with(&format!("K{} -> K0", depth - 1)));
            }
            other => panic!("expected CircularReference, got {:?}", other),
        }
    }

    #[test]
    fn test_key_order_is_preserved() {
        let file = expand("Z=1\nA=$Z\nM=2", &[]);
        assert_eq!(file.keys().collect::<Vec<_>>(), vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("leave".parse::<MissingPolicy>().unwrap(), MissingPolicy::Leave);
        assert_eq!("file-only".parse::<LookupPolicy>().unwrap(), LookupPolicy::FileOnly);
        assert!("sometimes".parse::<MissingPolicy>().is_err());
        assert_eq!(LookupPolicy::EnvFirst.to_string(), "env-first");
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let file = expand("GREETING=héllo\nMSG=$GREETING wörld ✓", &[]);
        assert_eq!(file.get("MSG"), Some("héllo wörld ✓"));
    }
}
