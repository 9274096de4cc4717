//! io-package.json stage.

use crate::config::CheckPolicy;
use crate::context::{CommonSection, PrimaryChecked, SecondaryChecked, SecondaryManifest};
use crate::errors::{Rejection, RejectionCode};
use crate::fetch::DocumentFetcher;
use crate::json;
use crate::rules::{self, Rule};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

pub const SECONDARY_MANIFEST: &str = "io-package.json";

static ADAPTER_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\badapter\b").expect("adapter word pattern"));

/// Rules on the whole document, before `common` is split out.
pub static DOCUMENT_RULES: &[Rule<Map<String, Value>>] =
    &[Rule::new(RejectionCode::MissingCommonGroup, has_common_group)];

/// Rules on the `common` group and its siblings, in evaluation order.
pub static COMMON_RULES: &[Rule<SecondarySubject>] = &[
    Rule::new(RejectionCode::SecondaryNameMismatch, name_matches_adapter),
    Rule::new(RejectionCode::MissingTitle, has_title),
    Rule::new(RejectionCode::TitleContainsBrandName, title_omits_brand),
    Rule::new(RejectionCode::TitleContainsRedundantWord, title_omits_adapter_word),
    Rule::new(RejectionCode::MissingVersion, has_version),
    Rule::new(RejectionCode::MissingDescription, has_description),
    Rule::new(RejectionCode::DescriptionNotLocalized, description_is_localized),
    Rule::new(RejectionCode::MissingIcon, has_icon),
    Rule::new(RejectionCode::MissingExternalIcon, has_external_icon),
    Rule::new(RejectionCode::IconPathMismatch, external_icon_ends_with_icon),
    Rule::new(RejectionCode::CompactModeRequired, compact_or_web_only),
    Rule::new(RejectionCode::AdminUiSupportRequired, materializes_admin_ui),
    Rule::new(RejectionCode::MissingLicense, has_license),
    Rule::new(RejectionCode::LicenseMismatch, license_matches_primary),
    Rule::new(RejectionCode::VersionMismatch, version_matches_primary),
    Rule::new(RejectionCode::MissingType, has_type),
    Rule::new(RejectionCode::UnknownType, type_is_known_category),
    Rule::new(RejectionCode::MissingAuthors, has_authors),
    Rule::new(RejectionCode::AuthorsNotArray, authors_is_array),
    Rule::new(RejectionCode::AuthorsEmpty, authors_not_empty),
    Rule::new(RejectionCode::MissingNativeGroup, has_native_group),
];

/// What the `common` rules look at: the split document plus the primary
/// values it must agree with.
#[derive(Debug, Clone)]
pub struct SecondarySubject {
    pub adapter_name: String,
    pub primary_version: Value,
    pub primary_license: Value,
    pub common: Map<String, Value>,
    pub native: Option<Value>,
}

impl SecondarySubject {
    fn field(&self, key: &str) -> Option<&Value> {
        json::present(&self.common, key)
    }

    fn field_text(&self, key: &str) -> String {
        self.field(key).map(json::text).unwrap_or_default()
    }

    fn truthy(&self, key: &str) -> bool {
        self.common.get(key).is_some_and(json::is_truthy)
    }

    fn into_manifest(self) -> SecondaryManifest {
        let common = CommonSection {
            name: self.field_text("name"),
            title: self.field_text("title"),
            desc: self
                .common
                .get("desc")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            version: self.field_text("version"),
            icon: self.field_text("icon"),
            ext_icon: self.field_text("extIcon"),
            compact: self.truthy("compact"),
            only_www: self.truthy("onlyWWW"),
            license: self.field_text("license"),
            category: self.field_text("type"),
            authors: self
                .common
                .get("authors")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        };
        SecondaryManifest {
            common,
            native: self.native.unwrap_or(Value::Null),
        }
    }
}

/// Run the io-package.json stage, finishing with the external icon probe.
pub async fn check_secondary(
    checked: PrimaryChecked,
    fetcher: &dyn DocumentFetcher,
    policy: &CheckPolicy,
) -> Result<SecondaryChecked, Rejection> {
    let manifest_url = checked.repository.file_url(SECONDARY_MANIFEST);
    let body = fetcher.fetch(&manifest_url).await.map_err(|e| {
        Rejection::new(
            RejectionCode::SecondaryManifestNotFound,
            format!("{manifest_url}: {e}"),
        )
    })?;
    let mut document = json::parse_object(&body)
        .map_err(|e| Rejection::new(RejectionCode::SecondaryManifestParseError, e))?;

    rules::evaluate(DOCUMENT_RULES, &document, policy)?;
    let common = match document.remove("common") {
        Some(Value::Object(common)) => common,
        _ => return Err(Rejection::from_code(RejectionCode::MissingCommonGroup)),
    };

    let subject = SecondarySubject {
        adapter_name: checked.adapter_name.as_str().to_string(),
        primary_version: checked.primary.version.clone(),
        primary_license: checked.primary.license.clone(),
        common,
        native: document.remove("native"),
    };
    rules::evaluate(COMMON_RULES, &subject, policy)?;

    let secondary = subject.into_manifest();
    let icon_url = &secondary.common.ext_icon;
    debug!(url = %icon_url, "probing external icon");
    fetcher.fetch(icon_url).await.map_err(|e| {
        Rejection::new(
            RejectionCode::ExternalIconUnreachable,
            format!("{icon_url}: {e}"),
        )
    })?;

    Ok(SecondaryChecked { checked, secondary })
}

fn has_common_group(document: &Map<String, Value>, _: &CheckPolicy) -> Result<(), String> {
    match document.get("common") {
        Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(format!("\"common\" is a {}, expected an object", json::kind(other))),
        None => Err("io-package.json has no \"common\" group".to_string()),
    }
}

fn require(s: &SecondarySubject, key: &str) -> Result<(), String> {
    if s.field(key).is_some() {
        Ok(())
    } else {
        Err(format!("common.{key} is missing"))
    }
}

fn name_matches_adapter(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    match s.common.get("name") {
        Some(Value::String(name)) if *name == s.adapter_name => Ok(()),
        Some(name) => Err(format!(
            "common.name is {}, expected \"{}\"",
            name, s.adapter_name
        )),
        None => Err(format!("common.name is missing, expected \"{}\"", s.adapter_name)),
    }
}

fn has_title(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "title")
}

fn title_omits_brand(s: &SecondarySubject, policy: &CheckPolicy) -> Result<(), String> {
    let title = s.field_text("title");
    if title.to_lowercase().contains(&policy.brand_name.to_lowercase()) {
        Err(format!("title \"{}\" contains \"{}\"", title, policy.brand_name))
    } else {
        Ok(())
    }
}

fn title_omits_adapter_word(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    let title = s.field_text("title");
    if ADAPTER_WORD_RE.is_match(&title) {
        Err(format!("title \"{title}\" contains the word \"adapter\""))
    } else {
        Ok(())
    }
}

fn has_version(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "version")
}

fn has_description(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "desc")
}

fn description_is_localized(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    match s.field("desc") {
        Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(format!(
            "common.desc is a {}, expected an object keyed by language",
            json::kind(other)
        )),
        None => Err("common.desc is missing".to_string()),
    }
}

fn has_icon(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "icon")
}

fn has_external_icon(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "extIcon")
}

fn external_icon_ends_with_icon(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    let icon = s.field_text("icon");
    let ext_icon = s.field_text("extIcon");
    if ext_icon.ends_with(&icon) {
        Ok(())
    } else {
        Err(format!(
            "extIcon \"{ext_icon}\" does not end with icon \"{icon}\""
        ))
    }
}

fn compact_or_web_only(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    if s.truthy("compact") || s.truthy("onlyWWW") {
        Ok(())
    } else {
        Err("neither common.compact nor common.onlyWWW is set".to_string())
    }
}

fn materializes_admin_ui(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    if s.truthy("materialize") {
        Ok(())
    } else {
        Err("common.materialize is not set".to_string())
    }
}

fn has_license(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "license")
}

/// Exact match on the parsed values: `1` and `"1"` differ.
fn same_as_primary(s: &SecondarySubject, key: &str, primary: &Value) -> Result<(), String> {
    let value = s.common.get(key).unwrap_or(&Value::Null);
    if value == primary {
        Ok(())
    } else {
        Err(format!("common.{key} is {value}, package.json has {primary}"))
    }
}

fn license_matches_primary(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    same_as_primary(s, "license", &s.primary_license)
}

fn version_matches_primary(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    same_as_primary(s, "version", &s.primary_version)
}

fn has_type(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "type")
}

fn type_is_known_category(s: &SecondarySubject, policy: &CheckPolicy) -> Result<(), String> {
    let category = s.field_text("type");
    if policy.is_known_category(&category) {
        Ok(())
    } else {
        Err(format!("\"{category}\" is not a known adapter category"))
    }
}

fn has_authors(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    require(s, "authors")
}

fn authors_is_array(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    match s.field("authors") {
        Some(Value::Array(_)) => Ok(()),
        Some(other) => Err(format!("common.authors is a {}, expected an array", json::kind(other))),
        None => Err("common.authors is missing".to_string()),
    }
}

fn authors_not_empty(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    match s.field("authors") {
        Some(Value::Array(authors)) if !authors.is_empty() => Ok(()),
        _ => Err("common.authors is empty".to_string()),
    }
}

fn has_native_group(s: &SecondarySubject, _: &CheckPolicy) -> Result<(), String> {
    match &s.native {
        Some(Value::Null) | None => Err("io-package.json has no \"native\" group".to_string()),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_common() -> Value {
        json!({
            "name": "foo",
            "title": "Foo Bar",
            "version": "1.2.3",
            "desc": {"en": "Foo", "de": "Foo"},
            "icon": "a/b.png",
            "extIcon": "https://x/a/b.png",
            "compact": true,
            "materialize": true,
            "license": "MIT",
            "type": "lighting",
            "authors": ["someone <someone@example.com>"]
        })
    }

    fn subject_with(common: Value) -> SecondarySubject {
        SecondarySubject {
            adapter_name: "foo".to_string(),
            primary_version: json!("1.2.3"),
            primary_license: json!("MIT"),
            common: common.as_object().cloned().unwrap(),
            native: Some(json!({})),
        }
    }

    fn failure(common: Value) -> Option<RejectionCode> {
        rules::evaluate(COMMON_RULES, &subject_with(common), &CheckPolicy::default())
            .err()
            .map(|r| r.code)
    }

    fn with(key: &str, value: Value) -> Value {
        let mut common = valid_common();
        common[key] = value;
        common
    }

    fn without(key: &str) -> Value {
        let mut common = valid_common();
        common.as_object_mut().unwrap().remove(key);
        common
    }

    #[test]
    fn test_valid_common_passes() {
        assert_eq!(failure(valid_common()), None);
    }

    #[test]
    fn test_common_group_must_be_object() {
        let policy = CheckPolicy::default();
        let missing = json!({"native": {}});
        let err = rules::evaluate(DOCUMENT_RULES, missing.as_object().unwrap(), &policy).unwrap_err();
        assert_eq!(err.code, RejectionCode::MissingCommonGroup);

        let scalar = json!({"common": "x"});
        let err = rules::evaluate(DOCUMENT_RULES, scalar.as_object().unwrap(), &policy).unwrap_err();
        assert_eq!(err.code, RejectionCode::MissingCommonGroup);
    }

    #[test]
    fn test_name_mismatch() {
        assert_eq!(failure(with("name", json!("bar"))), Some(RejectionCode::SecondaryNameMismatch));
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(failure(without("title")), Some(RejectionCode::MissingTitle));
        assert_eq!(
            failure(with("title", json!("IOBroker Foo"))),
            Some(RejectionCode::TitleContainsBrandName)
        );
        assert_eq!(
            failure(with("title", json!("Foo Adapter"))),
            Some(RejectionCode::TitleContainsRedundantWord)
        );
        assert_eq!(failure(with("title", json!("Foo adapters"))), None);
        assert_eq!(
            failure(with("title", json!("ioBroker adapter"))),
            Some(RejectionCode::TitleContainsBrandName)
        );
    }

    #[test]
    fn test_description_rules() {
        assert_eq!(failure(without("desc")), Some(RejectionCode::MissingDescription));
        assert_eq!(
            failure(with("desc", json!("plain text"))),
            Some(RejectionCode::DescriptionNotLocalized)
        );
    }

    #[test]
    fn test_version_presence_checked_before_description() {
        let mut common = without("version");
        common.as_object_mut().unwrap().remove("desc");
        assert_eq!(failure(common), Some(RejectionCode::MissingVersion));
    }

    #[test]
    fn test_icon_rules() {
        assert_eq!(failure(without("icon")), Some(RejectionCode::MissingIcon));
        assert_eq!(failure(without("extIcon")), Some(RejectionCode::MissingExternalIcon));
        assert_eq!(
            failure(with("extIcon", json!("https://x/a/c.png"))),
            Some(RejectionCode::IconPathMismatch)
        );
    }

    #[test]
    fn test_mode_flags() {
        let mut common = without("compact");
        assert_eq!(failure(common.clone()), Some(RejectionCode::CompactModeRequired));
        common["onlyWWW"] = json!(true);
        assert_eq!(failure(common), None);

        assert_eq!(failure(with("compact", json!(0))), Some(RejectionCode::CompactModeRequired));
        assert_eq!(
            failure(with("materialize", json!(false))),
            Some(RejectionCode::AdminUiSupportRequired)
        );
    }

    #[test]
    fn test_license_and_version_consistency() {
        assert_eq!(failure(without("license")), Some(RejectionCode::MissingLicense));
        assert_eq!(failure(with("license", json!("GPL-3.0"))), Some(RejectionCode::LicenseMismatch));

        let err = rules::evaluate(
            COMMON_RULES,
            &subject_with(with("version", json!("1.2.4"))),
            &CheckPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, RejectionCode::VersionMismatch);
        assert!(err.detail.contains("1.2.4") && err.detail.contains("1.2.3"));
    }

    #[test]
    fn test_version_must_match_type_as_well_as_text() {
        let mut subject = subject_with(with("version", json!("1")));
        subject.primary_version = json!(1);
        let err = rules::evaluate(COMMON_RULES, &subject, &CheckPolicy::default()).unwrap_err();
        assert_eq!(err.code, RejectionCode::VersionMismatch);
        assert_eq!(err.detail, "common.version is \"1\", package.json has 1");
    }

    #[test]
    fn test_license_object_does_not_match_its_string_form() {
        let mut subject = subject_with(with("license", json!(r#"{"type":"MIT"}"#)));
        subject.primary_license = json!({"type": "MIT"});
        let err = rules::evaluate(COMMON_RULES, &subject, &CheckPolicy::default()).unwrap_err();
        assert_eq!(err.code, RejectionCode::LicenseMismatch);

        subject.common.insert("license".to_string(), json!({"type": "MIT"}));
        assert!(rules::evaluate(COMMON_RULES, &subject, &CheckPolicy::default()).is_ok());
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(failure(without("type")), Some(RejectionCode::MissingType));
        assert_eq!(
            failure(with("type", json!("made-up-category"))),
            Some(RejectionCode::UnknownType)
        );

        let policy = CheckPolicy {
            extra_categories: vec!["made-up-category".to_string()],
            ..CheckPolicy::default()
        };
        let subject = subject_with(with("type", json!("made-up-category")));
        assert!(rules::evaluate(COMMON_RULES, &subject, &policy).is_ok());
    }

    #[test]
    fn test_author_rules() {
        assert_eq!(failure(without("authors")), Some(RejectionCode::MissingAuthors));
        assert_eq!(failure(with("authors", json!("me"))), Some(RejectionCode::AuthorsNotArray));
        assert_eq!(failure(with("authors", json!([]))), Some(RejectionCode::AuthorsEmpty));
    }

    #[test]
    fn test_native_group_may_be_empty_but_not_absent() {
        let policy = CheckPolicy::default();
        let mut subject = subject_with(valid_common());
        assert!(rules::evaluate(COMMON_RULES, &subject, &policy).is_ok());

        subject.native = None;
        let err = rules::evaluate(COMMON_RULES, &subject, &policy).unwrap_err();
        assert_eq!(err.code, RejectionCode::MissingNativeGroup);
    }

    #[test]
    fn test_into_manifest() {
        let manifest = subject_with(valid_common()).into_manifest();
        assert_eq!(manifest.common.category, "lighting");
        assert_eq!(manifest.common.ext_icon, "https://x/a/b.png");
        assert!(manifest.common.compact);
        assert!(!manifest.common.only_www);
        assert_eq!(manifest.common.authors.len(), 1);
        assert_eq!(manifest.native, json!({}));
    }
}
