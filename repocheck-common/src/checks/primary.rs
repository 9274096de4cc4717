//! package.json stage.
//!
//! Normalizes the repository URL, fetches and parses package.json, derives
//! the adapter name from the repository name and checks the manifest
//! against it.

use crate::config::CheckPolicy;
use crate::context::{
    AdapterName, PrimaryChecked, PrimaryManifest, RepositoryDescriptor, RepositoryRef,
};
use crate::errors::{Rejection, RejectionCode};
use crate::fetch::DocumentFetcher;
use crate::json;
use crate::rules::{self, Rule};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

pub const PACKAGE_MANIFEST: &str = "package.json";

static ADAPTER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("adapter name pattern"));

/// Repository URL rules, evaluated against the normalized URL.
pub static URL_RULES: &[Rule<RepositoryRef>] = &[
    Rule::new(RejectionCode::MissingNamespaceSegment, has_namespace_segment),
    Rule::new(RejectionCode::WrongNamespaceCasing, no_lowercase_namespace_segment),
];

/// Rules for the name candidate taken from the repository URL.
pub static NAME_RULES: &[Rule<String>] = &[
    Rule::new(RejectionCode::InvalidNameCasing, name_is_lowercase),
    Rule::new(RejectionCode::InvalidNameCharacters, name_has_allowed_characters),
];

/// package.json rules, in evaluation order.
pub static MANIFEST_RULES: &[Rule<PrimarySubject>] = &[
    Rule::new(RejectionCode::NameMismatch, name_matches_repository),
    Rule::new(RejectionCode::MissingField, has_version),
    Rule::new(RejectionCode::MissingField, has_description),
    Rule::new(RejectionCode::MissingField, has_license),
    Rule::new(RejectionCode::MissingField, has_main),
    Rule::new(RejectionCode::MissingField, has_author),
    Rule::new(RejectionCode::MissingField, has_repository),
    Rule::new(RejectionCode::InvalidRepositoryType, repository_type_is_git),
    Rule::new(RejectionCode::RepositoryUrlMismatch, repository_url_matches),
];

/// What the package.json rules look at.
#[derive(Debug, Clone)]
pub struct PrimarySubject {
    pub repository: RepositoryRef,
    pub adapter_name: String,
    pub manifest: Map<String, Value>,
}

impl PrimarySubject {
    fn repository_field(&self, key: &str) -> Option<&Value> {
        self.manifest
            .get("repository")
            .and_then(Value::as_object)
            .and_then(|repo| json::present(repo, key))
    }

    /// Freeze the subject into the accepted context. Only valid after
    /// [`MANIFEST_RULES`] passed.
    fn accept(self) -> PrimaryChecked {
        let field = |key: &str| {
            json::present(&self.manifest, key)
                .map(json::text)
                .unwrap_or_default()
        };
        let primary = PrimaryManifest {
            name: field("name"),
            version: self.manifest.get("version").cloned().unwrap_or(Value::Null),
            description: field("description"),
            license: self.manifest.get("license").cloned().unwrap_or(Value::Null),
            main: field("main"),
            author: self.manifest.get("author").cloned().unwrap_or(Value::Null),
            repository: RepositoryDescriptor {
                kind: self
                    .repository_field("type")
                    .map(json::text)
                    .unwrap_or_default(),
                url: self
                    .repository_field("url")
                    .map(json::text)
                    .unwrap_or_default(),
            },
        };
        PrimaryChecked {
            adapter_name: AdapterName::new_validated(self.adapter_name),
            repository: self.repository,
            primary,
        }
    }
}

/// Run the package.json stage for a caller-supplied repository URL.
pub async fn check_primary(
    url: &str,
    fetcher: &dyn DocumentFetcher,
    policy: &CheckPolicy,
) -> Result<PrimaryChecked, Rejection> {
    let repository = RepositoryRef::from_input(url, policy);
    let manifest_url = repository.file_url(PACKAGE_MANIFEST);

    let body = fetcher.fetch(&manifest_url).await.map_err(|e| {
        Rejection::new(RejectionCode::ManifestNotFound, format!("{manifest_url}: {e}"))
    })?;
    let manifest = json::parse_object(&body)
        .map_err(|e| Rejection::new(RejectionCode::ManifestParseError, e))?;

    rules::evaluate(URL_RULES, &repository, policy)?;
    let adapter_name = candidate_name(&repository, policy)?;
    rules::evaluate(NAME_RULES, &adapter_name, policy)?;
    debug!(adapter = %adapter_name, "adapter name derived");

    let subject = PrimarySubject {
        repository,
        adapter_name,
        manifest,
    };
    rules::evaluate(MANIFEST_RULES, &subject, policy)?;
    Ok(subject.accept())
}

/// Text after the last namespace segment, minus a trailing branch segment.
pub fn candidate_name(repository: &RepositoryRef, policy: &CheckPolicy) -> Result<String, Rejection> {
    let segment = policy.namespace_segment();
    let start = repository
        .normalized
        .rfind(&segment)
        .map(|idx| idx + segment.len())
        .ok_or_else(|| Rejection::from_code(RejectionCode::MissingNamespaceSegment))?;
    let rest = &repository.normalized[start..];
    let branch_suffix = format!("/{}", policy.default_branch);
    Ok(rest.strip_suffix(&branch_suffix).unwrap_or(rest).to_string())
}

fn has_namespace_segment(repo: &RepositoryRef, policy: &CheckPolicy) -> Result<(), String> {
    let segment = policy.namespace_segment();
    if repo.normalized.contains(&segment) {
        Ok(())
    } else {
        Err(format!("{} does not contain \"{}\"", repo.original, segment))
    }
}

fn no_lowercase_namespace_segment(repo: &RepositoryRef, policy: &CheckPolicy) -> Result<(), String> {
    let lowercase = policy.lowercase_namespace_segment();
    if repo.normalized.contains(&lowercase) {
        Err(format!(
            "{} contains \"{}\", use \"{}\"",
            repo.original,
            lowercase,
            policy.namespace_segment()
        ))
    } else {
        Ok(())
    }
}

fn name_is_lowercase(name: &String, _: &CheckPolicy) -> Result<(), String> {
    if name.chars().any(char::is_uppercase) {
        Err(format!("\"{name}\" contains uppercase letters"))
    } else {
        Ok(())
    }
}

fn name_has_allowed_characters(name: &String, _: &CheckPolicy) -> Result<(), String> {
    if ADAPTER_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(format!("\"{name}\" must match [a-z0-9_-]+"))
    }
}

fn name_matches_repository(s: &PrimarySubject, policy: &CheckPolicy) -> Result<(), String> {
    let expected = policy.package_name(&s.adapter_name);
    match s.manifest.get("name") {
        Some(Value::String(name)) if *name == expected => Ok(()),
        Some(name) => Err(format!(
            "package.json name is {}, expected \"{}\"",
            name, expected
        )),
        None => Err(format!("package.json has no name, expected \"{expected}\"")),
    }
}

fn require_field(s: &PrimarySubject, field: &str) -> Result<(), String> {
    if json::present(&s.manifest, field).is_some() {
        Ok(())
    } else {
        Err(field.to_string())
    }
}

fn has_version(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "version")
}

fn has_description(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "description")
}

fn has_license(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "license")
}

fn has_main(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "main")
}

fn has_author(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "author")
}

fn has_repository(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    require_field(s, "repository")
}

fn repository_type_is_git(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    match s.repository_field("type") {
        Some(Value::String(kind)) if kind == "git" => Ok(()),
        Some(kind) => Err(format!("repository.type is {kind}, expected \"git\"")),
        None => Err("repository.type is missing, expected \"git\"".to_string()),
    }
}

fn repository_url_matches(s: &PrimarySubject, _: &CheckPolicy) -> Result<(), String> {
    let url = s.repository_field("url").map(json::text).unwrap_or_default();
    if url.contains(&s.repository.original) {
        Ok(())
    } else {
        Err(format!(
            "repository.url is \"{}\", expected it to contain \"{}\"",
            url, s.repository.original
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn repo(url: &str) -> RepositoryRef {
        RepositoryRef::from_input(url, &CheckPolicy::default())
    }

    fn subject(manifest: Value) -> PrimarySubject {
        PrimarySubject {
            repository: repo("https://github.com/Org/ioBroker.foo"),
            adapter_name: "foo".to_string(),
            manifest: manifest.as_object().cloned().unwrap(),
        }
    }

    fn valid_manifest() -> Value {
        json!({
            "name": "iobroker.foo",
            "version": "1.0.0",
            "description": "d",
            "license": "MIT",
            "main": "main.js",
            "author": "a",
            "repository": {"type": "git", "url": "https://github.com/Org/ioBroker.foo"}
        })
    }

    fn first_failure(manifest: Value) -> Option<Rejection> {
        rules::evaluate(MANIFEST_RULES, &subject(manifest), &CheckPolicy::default()).err()
    }

    #[test]
    fn test_candidate_name_strips_branch() {
        let policy = CheckPolicy::default();
        let name = candidate_name(&repo("https://github.com/Org/ioBroker.foo"), &policy).unwrap();
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_lowercase_namespace_is_missing_segment() {
        let policy = CheckPolicy::default();
        let err = rules::evaluate(URL_RULES, &repo("https://github.com/Org/iobroker.foo"), &policy)
            .unwrap_err();
        assert_eq!(err.code, RejectionCode::MissingNamespaceSegment);
    }

    #[test]
    fn test_lowercase_component_alongside_cased_segment() {
        let policy = CheckPolicy::default();
        let err = rules::evaluate(
            URL_RULES,
            &repo("https://github.com/iobroker.community/ioBroker.foo"),
            &policy,
        )
        .unwrap_err();
        assert_eq!(err.code, RejectionCode::WrongNamespaceCasing);
    }

    #[test]
    fn test_name_rules() {
        let policy = CheckPolicy::default();
        let casing = rules::evaluate(NAME_RULES, &"Foo".to_string(), &policy).unwrap_err();
        assert_eq!(casing.code, RejectionCode::InvalidNameCasing);

        let chars = rules::evaluate(NAME_RULES, &"foo.bar".to_string(), &policy).unwrap_err();
        assert_eq!(chars.code, RejectionCode::InvalidNameCharacters);

        let empty = rules::evaluate(NAME_RULES, &String::new(), &policy).unwrap_err();
        assert_eq!(empty.code, RejectionCode::InvalidNameCharacters);

        assert!(rules::evaluate(NAME_RULES, &"my_adapter-2".to_string(), &policy).is_ok());
    }

    #[test]
    fn test_valid_manifest_passes() {
        assert!(first_failure(valid_manifest()).is_none());
    }

    #[test]
    fn test_name_mismatch_reports_both_values() {
        let mut manifest = valid_manifest();
        manifest["name"] = json!("iobroker.bar");
        let err = first_failure(manifest).unwrap();
        assert_eq!(err.code, RejectionCode::NameMismatch);
        assert!(err.detail.contains("iobroker.bar"));
        assert!(err.detail.contains("iobroker.foo"));
    }

    #[test]
    fn test_missing_fields_in_declared_order() {
        let mut manifest = valid_manifest();
        let obj = manifest.as_object_mut().unwrap();
        obj.remove("main");
        obj.remove("license");
        let err = first_failure(manifest).unwrap();
        assert_eq!(err.code, RejectionCode::MissingField);
        assert_eq!(err.reason(), "MissingField:license");
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut manifest = valid_manifest();
        manifest["version"] = json!("");
        let err = first_failure(manifest).unwrap();
        assert_eq!(err.reason(), "MissingField:version");
    }

    #[test]
    fn test_falsy_values_count_as_present() {
        let mut manifest = valid_manifest();
        manifest["author"] = json!(false);
        manifest["main"] = json!(0);
        assert!(first_failure(manifest).is_none());

        let mut nulled = valid_manifest();
        nulled["author"] = Value::Null;
        assert_eq!(first_failure(nulled).unwrap().reason(), "MissingField:author");
    }

    #[test]
    fn test_repository_type_must_be_git() {
        let mut manifest = valid_manifest();
        manifest["repository"]["type"] = json!("svn");
        assert_eq!(
            first_failure(manifest).unwrap().code,
            RejectionCode::InvalidRepositoryType
        );

        let mut shorthand = valid_manifest();
        shorthand["repository"] = json!("github:Org/ioBroker.foo");
        assert_eq!(
            first_failure(shorthand).unwrap().code,
            RejectionCode::InvalidRepositoryType
        );
    }

    #[test]
    fn test_repository_url_must_contain_original() {
        let mut manifest = valid_manifest();
        manifest["repository"]["url"] = json!("git+https://github.com/Other/ioBroker.foo.git");
        assert_eq!(
            first_failure(manifest).unwrap().code,
            RejectionCode::RepositoryUrlMismatch
        );

        let mut prefixed = valid_manifest();
        prefixed["repository"]["url"] = json!("git+https://github.com/Org/ioBroker.foo.git");
        assert!(first_failure(prefixed).is_none());
    }

    #[test]
    fn test_accept_builds_manifest() {
        let checked = subject(valid_manifest()).accept();
        assert_eq!(checked.adapter_name.as_str(), "foo");
        assert_eq!(checked.primary.name, "iobroker.foo");
        assert_eq!(checked.primary.repository.kind, "git");
        assert_eq!(checked.primary.author, json!("a"));
        assert_eq!(checked.primary.version, json!("1.0.0"));
    }

    proptest! {
        #[test]
        fn test_candidate_name_roundtrip(name in "[a-z0-9_-]{1,24}") {
            let policy = CheckPolicy::default();
            let repository = repo(&format!("https://github.com/SomeOrg/ioBroker.{name}"));
            prop_assert!(rules::evaluate(URL_RULES, &repository, &policy).is_ok());
            let candidate = candidate_name(&repository, &policy).unwrap();
            prop_assert_eq!(&candidate, &name);
            prop_assert!(rules::evaluate(NAME_RULES, &candidate, &policy).is_ok());
        }

        #[test]
        fn test_uppercase_names_rejected(prefix in "[a-z]{0,6}", upper in "[A-Z]", suffix in "[a-z0-9]{0,6}") {
            let policy = CheckPolicy::default();
            let name = format!("{prefix}{upper}{suffix}");
            let err = rules::evaluate(NAME_RULES, &name, &policy).unwrap_err();
            prop_assert_eq!(err.code, RejectionCode::InvalidNameCasing);
        }
    }
}
