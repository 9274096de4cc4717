//! Registry policy: the namespace, hosts, brand and category set the
//! validation rules are parameterised over.

use serde::{Deserialize, Serialize};

/// Built-in adapter categories accepted for `common.type`.
pub static ADAPTER_CATEGORIES: &[&str] = &[
    "alarm",
    "climate-control",
    "communication",
    "date-and-time",
    "energy",
    "metering",
    "garden",
    "general",
    "geoposition",
    "hardware",
    "health",
    "household",
    "infrastructure",
    "iot-systems",
    "lighting",
    "logic",
    "messaging",
    "misc-data",
    "multimedia",
    "network",
    "notifications",
    "protocols",
    "storage",
    "utility",
    "vehicle",
    "visualization",
    "visualization-icons",
    "visualization-widgets",
    "weather",
];

/// Policy values the checks are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPolicy {
    /// Mixed-case namespace prefix of repository names (`ioBroker`).
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Platform brand name that titles must not repeat.
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    /// Forge host repository URLs point at.
    #[serde(default = "default_forge_host")]
    pub forge_host: String,
    /// Host serving raw file content for the forge.
    #[serde(default = "default_raw_content_host")]
    pub raw_content_host: String,
    /// Branch segment appended to the normalized URL.
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Prefix of the package registry listing page.
    #[serde(default = "default_registry_listing_url")]
    pub registry_listing_url: String,
    /// Marker that opens the collaborators section of the listing page.
    #[serde(default = "default_collaborators_marker")]
    pub collaborators_marker: String,
    /// Maintainer accounts, at least one of which must be a collaborator.
    #[serde(default = "default_collaborators")]
    pub collaborators: Vec<String>,
    /// Categories accepted in addition to [`ADAPTER_CATEGORIES`].
    #[serde(default)]
    pub extra_categories: Vec<String>,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            brand_name: default_brand_name(),
            forge_host: default_forge_host(),
            raw_content_host: default_raw_content_host(),
            default_branch: default_branch(),
            registry_listing_url: default_registry_listing_url(),
            collaborators_marker: default_collaborators_marker(),
            collaborators: default_collaborators(),
            extra_categories: Vec::new(),
        }
    }
}

impl CheckPolicy {
    /// Lowercase namespace used as the registry package prefix.
    pub fn namespace_lower(&self) -> String {
        self.namespace.to_lowercase()
    }

    /// `/<Namespace>.` as it must appear in the repository URL.
    pub fn namespace_segment(&self) -> String {
        format!("/{}.", self.namespace)
    }

    /// `/<namespace>.` in its lowercase spelling.
    pub fn lowercase_namespace_segment(&self) -> String {
        format!("/{}.", self.namespace_lower())
    }

    /// Registry package name for an adapter (`iobroker.<name>`).
    pub fn package_name(&self, adapter_name: &str) -> String {
        format!("{}.{}", self.namespace_lower(), adapter_name)
    }

    /// Listing page URL for a registry package.
    pub fn listing_url(&self, package_name: &str) -> String {
        format!("{}{}", self.registry_listing_url, package_name)
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        ADAPTER_CATEGORIES.contains(&category) || self.extra_categories.iter().any(|c| c == category)
    }

    /// Effective category set, built-ins first.
    pub fn categories(&self) -> Vec<&str> {
        let mut all: Vec<&str> = ADAPTER_CATEGORIES.to_vec();
        for extra in &self.extra_categories {
            if !all.contains(&extra.as_str()) {
                all.push(extra);
            }
        }
        all
    }

    /// Check the policy is usable by the rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.namespace.is_empty() || !self.namespace.is_ascii() {
            return Err("policy.namespace must be a non-empty ASCII string".to_string());
        }
        if self.namespace == self.namespace_lower() {
            return Err(format!(
                "policy.namespace {:?} must be mixed case, the casing rules compare it against its lowercase form",
                self.namespace
            ));
        }
        if self.default_branch.is_empty() || self.default_branch.contains('/') {
            return Err("policy.default_branch must be a single path segment".to_string());
        }
        if self.forge_host.is_empty() || self.raw_content_host.is_empty() {
            return Err("policy.forge_host and policy.raw_content_host must be set".to_string());
        }
        if self.collaborators.is_empty() {
            return Err("policy.collaborators must name at least one maintainer".to_string());
        }
        Ok(())
    }
}

fn default_namespace() -> String {
    "ioBroker".to_string()
}

fn default_brand_name() -> String {
    "iobroker".to_string()
}

fn default_forge_host() -> String {
    "github.com".to_string()
}

fn default_raw_content_host() -> String {
    "raw.githubusercontent.com".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_registry_listing_url() -> String {
    "https://www.npmjs.com/package/".to_string()
}

fn default_collaborators_marker() -> String {
    "collaborators".to_string()
}

fn default_collaborators() -> Vec<String> {
    vec!["bluefox".to_string(), "iobroker".to_string()]
}
