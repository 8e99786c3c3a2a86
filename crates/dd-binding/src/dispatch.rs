//! Symbolic dispatch: element path to registered entry.
//!
//! Keys are slash-joined element paths relative to a node's anchor element.
//! A lookup tries the full path first, then repeatedly drops the leading
//! segment, so `ejb/bean-pool/steady-pool-size` is matched by a key
//! `bean-pool/steady-pool-size` before a bare `steady-pool-size`.

use std::collections::HashMap;

/// Candidate keys for `path`, most specific first.
///
/// ```
/// use dd_binding::dispatch::widen;
///
/// let candidates: Vec<&str> = widen("x/a/b").collect();
/// assert_eq!(candidates, vec!["x/a/b", "a/b", "b"]);
/// ```
pub fn widen(path: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(path);
    std::iter::from_fn(move || {
        let current = next?;
        next = current.split_once('/').map(|(_, rest)| rest);
        Some(current)
    })
    .filter(|candidate| !candidate.is_empty())
}

/// A table of entries keyed by element path.
#[derive(Debug, Clone)]
pub struct DispatchTable<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for DispatchTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DispatchTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key`, returning any entry it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        self.entries.insert(key.into(), value)
    }

    /// Exact lookup, without widening.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Resolve `path` with widening.
    pub fn resolve(&self, path: &str) -> Option<&T> {
        self.resolve_key(path).map(|(_, value)| value)
    }

    /// Resolve `path` with widening, also returning the key that matched.
    pub fn resolve_key<'p>(&self, path: &'p str) -> Option<(&'p str, &T)> {
        widen(path).find_map(|candidate| self.entries.get(candidate).map(|v| (candidate, v)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
