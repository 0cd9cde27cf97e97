use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A single `name[:version]` artifact reference, as operators write them in
/// `services=` / `databases=` lists and the `release` grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactRef {
    pub name: String,
    /// Empty when the operator did not pin a version.
    pub version: String,
}

impl ArtifactRef {
    /// Splits on the first colon; a missing colon means an unpinned artifact.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, version)) => {
                Self { name: name.trim().to_owned(), version: version.trim().to_owned() }
            }
            None => Self { name: raw.trim().to_owned(), version: String::new() },
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.version)
        }
    }
}

/// A resolved option value. Every option a command can carry is one of these
/// four shapes; handlers read them back through the typed accessors on
/// [`CommandOptions`] and never see a missing key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Str(String),
    Flag(bool),
    List(Vec<String>),
    Artifacts(Vec<ArtifactRef>),
}

/// Options resolved from a command's tokens, keyed by option name.
///
/// Backed by a `BTreeMap` so that two commands resolved from identical input
/// compare equal structurally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandOptions {
    values: BTreeMap<String, OptionValue>,
}

impl CommandOptions {
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// String option, or `""` when absent or of a different shape.
    pub fn str_value(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(OptionValue::Str(value)) => value,
            _ => "",
        }
    }

    /// Flag option, or `false` when absent or of a different shape.
    pub fn flag_value(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(OptionValue::Flag(value)) => *value,
            _ => false,
        }
    }

    /// String-list option, or an empty slice when absent or of a different shape.
    pub fn list_value(&self, key: &str) -> &[String] {
        match self.values.get(key) {
            Some(OptionValue::List(values)) => values,
            _ => &[],
        }
    }

    /// Artifact-list option, or an empty slice when absent or of a different shape.
    pub fn artifact_value(&self, key: &str) -> &[ArtifactRef] {
        match self.values.get(key) {
            Some(OptionValue::Artifacts(values)) => values,
            _ => &[],
        }
    }
}
