//! Validation context records.
//!
//! The context is threaded through the pipeline by value. Each stage
//! consumes the record produced by the previous one and returns the next,
//! so a failing stage can only hand back a rejection and never a
//! half-updated context.
//!
//! ```text
//! &str ──primary──▶ PrimaryChecked ──secondary──▶ SecondaryChecked ──publication──▶ Published
//! ```

use crate::config::CheckPolicy;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Repository URL as supplied and as rewritten for raw file access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    /// Caller URL with a trailing slash removed.
    pub original: String,
    /// Raw-content URL on the default branch.
    pub normalized: String,
}

impl RepositoryRef {
    pub fn from_input(url: &str, policy: &CheckPolicy) -> Self {
        let original = url.strip_suffix('/').unwrap_or(url).to_string();
        let normalized = format!(
            "{}/{}",
            original.replacen(
                &format!("://{}", policy.forge_host),
                &format!("://{}", policy.raw_content_host),
                1,
            ),
            policy.default_branch
        );
        Self {
            original,
            normalized,
        }
    }

    /// URL of a file at the repository root on the default branch.
    pub fn file_url(&self, file: &str) -> String {
        format!("{}/{}", self.normalized, file)
    }
}

/// Validated adapter identifier (`[a-z0-9_-]+`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AdapterName(String);

impl AdapterName {
    /// Wrap a name that already passed the naming rules.
    pub(crate) fn new_validated(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdapterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `repository` descriptor of package.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    pub kind: String,
    pub url: String,
}

/// Accepted package.json.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryManifest {
    pub name: String,
    /// Kept as parsed; io-package.json must repeat it exactly.
    pub version: Value,
    pub description: String,
    /// Kept as parsed; io-package.json must repeat it exactly.
    pub license: Value,
    pub main: String,
    pub author: Value,
    pub repository: RepositoryDescriptor,
}

/// Accepted `common` group of io-package.json.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonSection {
    pub name: String,
    pub title: String,
    pub desc: Map<String, Value>,
    pub version: String,
    pub icon: String,
    pub ext_icon: String,
    pub compact: bool,
    pub only_www: bool,
    pub license: String,
    pub category: String,
    pub authors: Vec<Value>,
}

/// Accepted io-package.json.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryManifest {
    pub common: CommonSection,
    /// Opaque adapter settings; only presence is checked.
    pub native: Value,
}

/// Registry listing facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationRecord {
    pub package_name: String,
    pub listing_url: String,
    /// Recognized maintainer found among the collaborators.
    pub collaborator: String,
}

/// Context after package.json was accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryChecked {
    pub repository: RepositoryRef,
    pub adapter_name: AdapterName,
    pub primary: PrimaryManifest,
}

/// Context after io-package.json was accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryChecked {
    #[serde(flatten)]
    pub checked: PrimaryChecked,
    pub secondary: SecondaryManifest,
}

/// Context after the registry listing was accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Published {
    #[serde(flatten)]
    pub checked: SecondaryChecked,
    pub publication: PublicationRecord,
}

impl Published {
    pub fn adapter_name(&self) -> &AdapterName {
        &self.checked.checked.adapter_name
    }
}
