// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Path patterns with named wildcard slots
//!
//! A pattern is a relative path such as `sales/{region}/{day}.csv`. Each
//! `{name}` slot matches one segment-safe token (word characters and hyphens).
//! This module provides:
//! - Compilation of a pattern into an anchored matcher that extracts bindings
//! - Substitution of bindings into a pattern (partial substitution is legal)
//! - Expansion of a pattern into a single-level glob for listing storage

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

/// Slot name to concrete value
pub type Bindings = BTreeMap<String, String>;

static SLOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([\w\-]+?)\}").unwrap_or_else(|e| panic!("slot regex is invalid: {}", e))
});

/// Regex fragment a single slot expands to
const SLOT_CAPTURE: &str = r"([\w\-]+?)";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type PatternResult<T> = Result<T, PatternError>;

/// A compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    matcher: Regex,
    slots: Vec<String>,
}

impl PathPattern {
    /// Compile a pattern. Literal text is matched verbatim, slots match tokens.
    pub fn compile(pattern: &str) -> PatternResult<Self> {
        let mut expr = String::with_capacity(pattern.len() + 16);
        let mut slots = Vec::new();
        let mut last = 0;

        expr.push('^');
        for caps in SLOT_RE.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            expr.push_str(&regex::escape(&pattern[last..whole.start()]));
            expr.push_str(SLOT_CAPTURE);
            slots.push(name.as_str().to_string());
            last = whole.end();
        }
        expr.push_str(&regex::escape(&pattern[last..]));
        expr.push('$');

        let matcher = Regex::new(&expr).map_err(|e| PatternError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
            slots,
        })
    }

    /// The pattern text as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Slot names in order of appearance (repeats included)
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Match a concrete (or partially substituted) path against this pattern
    ///
    /// # Returns
    /// * `Some(bindings)` if the whole path matches
    /// * `None` if it does not, or if a repeated slot binds to different values
    pub fn matches(&self, path: &str) -> Option<Bindings> {
        let caps = self.matcher.captures(path)?;
        let mut bindings = Bindings::new();
        for (idx, name) in self.slots.iter().enumerate() {
            let value = caps.get(idx + 1)?.as_str();
            match bindings.get(name) {
                Some(previous) if previous != value => return None,
                _ => {
                    bindings.insert(name.clone(), value.to_string());
                }
            }
        }
        Some(bindings)
    }

    /// Fill slots from `bindings`, then `defaults`; unknown slots are left as `{name}`
    pub fn substitute(&self, bindings: &Bindings, defaults: &Bindings) -> String {
        substitute(&self.raw, bindings, defaults)
    }

    /// Replace every slot with a single-level `*` wildcard
    pub fn to_glob(&self) -> String {
        expand_wildcards_to_glob(&self.raw)
    }
}

/// Substitute slots in an uncompiled pattern
pub fn substitute(pattern: &str, bindings: &Bindings, defaults: &Bindings) -> String {
    SLOT_RE
        .replace_all(pattern, |caps: &regex::Captures| {
            let name = &caps[1];
            bindings
                .get(name)
                .or_else(|| defaults.get(name))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace every slot with `*`
pub fn expand_wildcards_to_glob(pattern: &str) -> String {
    SLOT_RE.replace_all(pattern, "*").into_owned()
}

/// Whether a path still contains unresolved slots
pub fn has_slots(path: &str) -> bool {
    SLOT_RE.is_match(path)
}

/// Names of the unresolved slots in a path
pub fn slot_names(path: &str) -> Vec<String> {
    SLOT_RE
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Matcher for the globs produced by [`expand_wildcards_to_glob`]
///
/// `*` and `?` never cross a `/`; `**` spans directories.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    matcher: Regex,
}

impl GlobMatcher {
    pub fn new(glob: &str) -> PatternResult<Self> {
        let mut expr = String::from("^");
        let mut chars = glob.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    expr.push_str(".*");
                }
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let matcher = Regex::new(&expr).map_err(|e| PatternError::InvalidPattern {
            pattern: glob.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { matcher })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}
