//! A fully valid adapter repository and helpers to break it one field at a
//! time.

use super::StaticFetcher;
use crate::config::CheckPolicy;
use serde_json::{Value, json};

pub const OWNER: &str = "Org";

/// Document trio for one adapter under the default policy.
#[derive(Debug, Clone)]
pub struct AdapterFixture {
    pub name: String,
    pub repo_url: String,
    pub package: Value,
    pub io_package: Value,
    pub listing: String,
    pub policy: CheckPolicy,
}

impl AdapterFixture {
    /// Valid documents for `https://github.com/Org/ioBroker.<name>`.
    pub fn valid(name: &str) -> Self {
        let policy = CheckPolicy::default();
        let repo_url = format!("https://{}/{}/ioBroker.{}", policy.forge_host, OWNER, name);
        let package = json!({
            "name": format!("iobroker.{name}"),
            "version": "1.2.3",
            "description": format!("{name} integration"),
            "license": "MIT",
            "main": "main.js",
            "author": {"name": "Some One", "email": "someone@example.com"},
            "repository": {"type": "git", "url": format!("git+{repo_url}.git")}
        });
        let io_package = json!({
            "common": {
                "name": name,
                "title": format!("{} Lights", capitalize(name)),
                "version": "1.2.3",
                "desc": {"en": "Controls lights", "de": "Steuert Lichter"},
                "icon": format!("{name}.png"),
                "extIcon": format!(
                    "https://raw.githubusercontent.com/{OWNER}/ioBroker.{name}/master/admin/{name}.png"
                ),
                "compact": true,
                "materialize": true,
                "license": "MIT",
                "type": "lighting",
                "authors": ["Some One <someone@example.com>"]
            },
            "native": {}
        });
        let listing = format!(
            "<html><body><h1>iobroker.{name}</h1>\
             <h2>Collaborators</h2><ul>\
             <li><a href=\"/~someone\">someone</a></li>\
             <li><a href=\"/~bluefox\">bluefox</a></li>\
             </ul></body></html>"
        );
        Self {
            name: name.to_string(),
            repo_url,
            package,
            io_package,
            listing,
            policy,
        }
    }

    fn raw_base(&self) -> String {
        format!(
            "https://{}/{}/ioBroker.{}/{}",
            self.policy.raw_content_host, OWNER, self.name, self.policy.default_branch
        )
    }

    pub fn package_url(&self) -> String {
        format!("{}/package.json", self.raw_base())
    }

    pub fn io_package_url(&self) -> String {
        format!("{}/io-package.json", self.raw_base())
    }

    pub fn listing_url(&self) -> String {
        self.policy
            .listing_url(&self.policy.package_name(&self.name))
    }

    pub fn icon_url(&self) -> String {
        self.io_package["common"]["extIcon"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn set_package(mut self, key: &str, value: Value) -> Self {
        self.package[key] = value;
        self
    }

    pub fn remove_package(mut self, key: &str) -> Self {
        if let Some(obj) = self.package.as_object_mut() {
            obj.remove(key);
        }
        self
    }

    pub fn set_common(mut self, key: &str, value: Value) -> Self {
        self.io_package["common"][key] = value;
        self
    }

    pub fn remove_common(mut self, key: &str) -> Self {
        if let Some(common) = self.io_package["common"].as_object_mut() {
            common.remove(key);
        }
        self
    }

    pub fn with_listing(mut self, listing: impl Into<String>) -> Self {
        self.listing = listing.into();
        self
    }

    /// Fetcher serving all four documents.
    pub fn fetcher(&self) -> StaticFetcher {
        StaticFetcher::new()
            .with_document(self.package_url(), self.package.to_string())
            .with_document(self.io_package_url(), self.io_package.to_string())
            .with_document(self.icon_url(), "\u{89}PNG")
            .with_document(self.listing_url(), self.listing.clone())
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
