//! Ordered key/value property bag threaded through the bootstrap sequence.
//!
//! [`BootstrapProperties`] preserves declaration order so that list-valued
//! settings such as indexed configuration URLs and component selectors are
//! evaluated deterministically. Re-inserting a key replaces its value in place
//! (last write wins) without moving it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading a properties file.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// The properties file could not be read.
    #[error("failed to read properties file '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Flat, ordered configuration bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapProperties {
    entries: Vec<(String, String)>,
}

impl BootstrapProperties {
    /// Creates an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from key/value pairs, applying last-write-wins semantics.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = Self::new();
        for (key, value) in pairs {
            properties.insert(key, value);
        }
        properties
    }

    /// Loads a Java-style properties file.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::Read`] when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let text = fs::read_to_string(path).map_err(|source| PropertiesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parses properties text.
    ///
    /// Lines starting with `#` or `!` are comments. Keys end at the first
    /// unescaped `=`, `:` or whitespace and a trailing backslash continues the
    /// logical line.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut properties = Self::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            if !key.is_empty() {
                properties.insert(key, value);
            }
        }
        properties
    }

    /// Inserts or replaces a value. Replacement keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value for `key`, or `default` when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Returns the trimmed value for `key` when present and non-blank.
    #[must_use]
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Interprets the value for `key` as a boolean flag.
    ///
    /// `true`, `yes`, `on` and `1` (case-insensitive) are truthy and any other
    /// value is false. An absent key yields `default`.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            )
        })
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the bag holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extracts every entry whose key starts with `prefix`, stripping it.
    ///
    /// Entries whose stripped key would be empty are skipped.
    #[must_use]
    pub fn subset(&self, prefix: &str) -> Self {
        Self::from_pairs(self.iter().filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rest.to_owned(), value.to_owned()))
        }))
    }

    /// Collects the values of `base` followed by `base.0`, `base.1`, ….
    ///
    /// Indexed keys are ordered numerically regardless of declaration order;
    /// blank values are skipped.
    #[must_use]
    pub fn indexed(&self, base: &str) -> Vec<String> {
        let mut values = Vec::new();
        if let Some(value) = self.get_non_blank(base) {
            values.push(value.to_owned());
        }
        let prefix = format!("{base}.");
        let mut numbered: Vec<(u32, String)> = self
            .iter()
            .filter_map(|(key, value)| {
                let index = key.strip_prefix(prefix.as_str())?.parse::<u32>().ok()?;
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| (index, trimmed.to_owned()))
            })
            .collect();
        numbered.sort_by_key(|(index, _)| *index);
        values.extend(numbered.into_iter().map(|(_, value)| value));
        values
    }

    /// Applies `PREFIX_SOME_KEY=value` style overrides to `some.key`.
    pub fn apply_overrides<I>(&mut self, variables: I, prefix: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in variables {
            if let Some(rest) = name.strip_prefix(prefix)
                && !rest.is_empty()
            {
                let key = rest.to_ascii_lowercase().replace('_', ".");
                self.insert(key, value);
            }
        }
    }

    /// Applies overrides taken from the process environment.
    #[must_use]
    pub fn with_environment_overrides(mut self, prefix: &str) -> Self {
        self.apply_overrides(env::vars(), prefix);
        self
    }
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut continuing = false;
    for raw in text.lines() {
        let line = raw.trim_start();
        if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if !trailing.is_multiple_of(2) {
            pending.push_str(line.strip_suffix('\\').unwrap_or(line));
            continuing = true;
            continue;
        }
        pending.push_str(line);
        lines.push(std::mem::take(&mut pending));
        continuing = false;
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    key.push(unescape(escaped));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|next| next.is_whitespace()) {
                    chars.next();
                }
                if chars.peek().is_some_and(|next| *next == '=' || *next == ':') {
                    chars.next();
                }
                break;
            }
            other => key.push(other),
        }
    }
    while chars.peek().is_some_and(|next| next.is_whitespace()) {
        chars.next();
    }
    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(unescape(escaped));
            }
        } else {
            value.push(c);
        }
    }
    (key, value)
}

const fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{c}',
        other => other,
    }
}
