//! Config file plus environment override resolution.
#![allow(unsafe_code)]

use repocheck_common::config::ConfigSource;
use repocheck_common::testing::AdapterFixture;
use repocheck_common::{ConfigError, LogFormat, Pipeline, RepocheckConfig};
use serial_test::serial;
use std::io::Write;
use std::sync::Arc;

const VARS: &[&str] = &[
    "REPOCHECK_CONFIG",
    "REPOCHECK_LOG_FORMAT",
    "REPOCHECK_DEFAULT_BRANCH",
    "REPOCHECK_COLLABORATORS",
    "REPOCHECK_HTTP_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        // SAFETY: every test touching the environment is #[serial]
        unsafe { std::env::remove_var(var) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::set_var(key, value) };
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_config_env_var_names_the_file() {
    clear_env();
    let file = config_file("[policy]\nextra_categories = [\"robotics\"]\n");
    set_env("REPOCHECK_CONFIG", file.path().to_str().unwrap());

    let loaded = RepocheckConfig::load(None).unwrap();
    assert_eq!(loaded.path.as_deref(), Some(file.path()));
    assert!(loaded.config.policy.is_known_category("robotics"));
    assert_eq!(loaded.source_of("policy.extra_categories"), ConfigSource::File);
    clear_env();
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let file = config_file(
        "[general]\nlog_format = \"text\"\n\n[policy]\ndefault_branch = \"main\"\n",
    );
    set_env("REPOCHECK_LOG_FORMAT", "json");
    set_env("REPOCHECK_COLLABORATORS", "alice, bob");

    let loaded = RepocheckConfig::load(Some(file.path())).unwrap();
    assert_eq!(loaded.config.general.log_format, LogFormat::Json);
    assert_eq!(loaded.source_of("general.log_format"), ConfigSource::Environment);
    assert_eq!(loaded.config.policy.default_branch, "main");
    assert_eq!(loaded.source_of("policy.default_branch"), ConfigSource::File);
    assert_eq!(loaded.config.policy.collaborators, vec!["alice", "bob"]);
    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_is_reported() {
    clear_env();
    let file = config_file("");
    set_env("REPOCHECK_HTTP_TIMEOUT_SECS", "soon");

    let err = RepocheckConfig::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Environment(_)), "{err}");
    clear_env();
}

#[tokio::test]
#[serial]
async fn test_branch_override_reaches_the_pipeline() {
    clear_env();
    let file = config_file("");
    set_env("REPOCHECK_DEFAULT_BRANCH", "main");
    let loaded = RepocheckConfig::load(Some(file.path())).unwrap();
    clear_env();

    let fixture = AdapterFixture::valid("foo");
    let fetcher = Arc::new(fixture.fetcher());
    let verdict = Pipeline::with_listing_page(fetcher.clone(), loaded.config.policy)
        .run(&fixture.repo_url)
        .await;

    assert!(!verdict.is_approved());
    assert_eq!(
        fetcher.requested(),
        vec!["https://raw.githubusercontent.com/Org/ioBroker.foo/main/package.json"]
    );
}
