//! Version upgrade rules: declarative rewrites of legacy element paths,
//! applied while parsing.
//!
//! A rule watches one or more absolute element paths (`root/ejb/old-tag`).
//! Each time one of them ends, its final text is captured. Once every
//! pattern holds a capture the rule fires: a `Remove` rule drops the element
//! that completed it, a `Replace` rule renames it and substitutes its value.
//! Captures are then cleared, so the rule can fire again for the next
//! occurrence.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    Remove,
    Replace,
}

/// Captured values of a rule, by pattern path.
#[derive(Debug, Clone, Copy)]
pub struct Captures<'a> {
    patterns: &'a [(String, Option<String>)],
}

impl<'a> Captures<'a> {
    pub fn get(&self, path: &str) -> Option<&'a str> {
        self.patterns
            .iter()
            .find(|(p, _)| p == path)
            .and_then(|(_, value)| value.as_deref())
    }

    /// The value captured by the last pattern.
    pub fn last(&self) -> Option<&'a str> {
        self.patterns.last().and_then(|(_, value)| value.as_deref())
    }
}

/// Computes the replacement value, or explains why the captures are invalid.
pub type ReplacementFn = Arc<dyn Fn(&Captures<'_>) -> Result<String, String> + Send + Sync>;

#[derive(Clone)]
pub struct VersionUpgradeRule {
    name: String,
    kind: UpgradeKind,
    patterns: Vec<(String, Option<String>)>,
    replacement_tag: Option<String>,
    replacement_value: Option<ReplacementFn>,
}

impl fmt::Debug for VersionUpgradeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionUpgradeRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("patterns", &self.patterns)
            .field("replacement_tag", &self.replacement_tag)
            .finish_non_exhaustive()
    }
}

impl VersionUpgradeRule {
    /// Drop the element at `path`.
    pub fn remove(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: UpgradeKind::Remove,
            patterns: vec![(path.into(), None)],
            replacement_tag: None,
            replacement_value: None,
        }
    }

    /// Rename the element at `path` to `replacement_tag`, keeping its value
    /// unless [`with_value`](Self::with_value) computes another.
    pub fn replace(
        name: impl Into<String>,
        path: impl Into<String>,
        replacement_tag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: UpgradeKind::Replace,
            patterns: vec![(path.into(), None)],
            replacement_tag: Some(replacement_tag.into()),
            replacement_value: None,
        }
    }

    /// Also require a capture at `path` before the rule fires. The rule acts
    /// on the element whose capture completes it.
    pub fn matching(mut self, path: impl Into<String>) -> Self {
        self.patterns.push((path.into(), None));
        self
    }

    pub fn with_value(
        mut self,
        value: impl Fn(&Captures<'_>) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.replacement_value = Some(Arc::new(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UpgradeKind {
        self.kind
    }

    pub fn replacement_tag(&self) -> Option<&str> {
        self.replacement_tag.as_deref()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|(p, _)| p == path)
    }

    /// Record `value` for `path`. Returns false if `path` is not a pattern.
    pub fn capture(&mut self, path: &str, value: &str) -> bool {
        match self.patterns.iter_mut().find(|(p, _)| p == path) {
            Some((_, slot)) => {
                *slot = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    /// Every pattern holds a capture.
    pub fn is_satisfied(&self) -> bool {
        self.patterns.iter().all(|(_, value)| value.is_some())
    }

    pub fn captures(&self) -> Captures<'_> {
        Captures {
            patterns: &self.patterns,
        }
    }

    pub fn reset(&mut self) {
        for (_, value) in &mut self.patterns {
            *value = None;
        }
    }

    fn replacement(&self, current: &str) -> Result<String, String> {
        match &self.replacement_value {
            Some(value) => value(&self.captures()),
            None => Ok(current.to_string()),
        }
    }
}

/// What the engine should do with an element after rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Unchanged,
    Remove {
        rule: String,
    },
    Replace {
        rule: String,
        tag: String,
        value: String,
    },
    /// A replace rule fired but rejected its captures; the element is kept as is.
    Invalid {
        rule: String,
        reason: String,
    },
}

/// The rules of one root kind, with their capture state for the current document.
#[derive(Debug, Clone, Default)]
pub struct UpgradeSet {
    rules: Vec<VersionUpgradeRule>,
}

impl UpgradeSet {
    pub fn new(rules: Vec<VersionUpgradeRule>) -> Self {
        let mut set = Self { rules };
        set.reset();
        set
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Clear all captures. Called when a root element starts.
    pub fn reset(&mut self) {
        for rule in &mut self.rules {
            rule.reset();
        }
    }

    /// Capture `value` for the absolute element `path` in every rule that
    /// watches it, in registration order, stopping at the first rule that fires.
    pub fn evaluate(&mut self, path: &str, value: &str) -> UpgradeOutcome {
        for rule in &mut self.rules {
            if !rule.capture(path, value) || !rule.is_satisfied() {
                continue;
            }

            let outcome = match rule.kind {
                UpgradeKind::Remove => UpgradeOutcome::Remove {
                    rule: rule.name.clone(),
                },
                UpgradeKind::Replace => match (&rule.replacement_tag, rule.replacement(value)) {
                    (Some(tag), Ok(replacement)) => UpgradeOutcome::Replace {
                        rule: rule.name.clone(),
                        tag: tag.clone(),
                        value: replacement,
                    },
                    (None, _) => UpgradeOutcome::Invalid {
                        rule: rule.name.clone(),
                        reason: "replace rule has no replacement tag".to_string(),
                    },
                    (_, Err(reason)) => UpgradeOutcome::Invalid {
                        rule: rule.name.clone(),
                        reason,
                    },
                },
            };
            rule.reset();
            return outcome;
        }
        UpgradeOutcome::Unchanged
    }
}
