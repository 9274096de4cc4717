//! Configuration system for repocheck.
//!
//! This module provides:
//! - TOML config file loading with per-field defaults
//! - `REPOCHECK_*` environment overrides with type safety
//! - Source tracking for `repocheck config show`
//! - Policy validation on load

pub mod env;
pub mod load;
pub mod policy;
pub mod source;

pub use env::{EnvError, EnvParser};
pub use load::{
    ConfigError, DaemonConfig, GeneralConfig, HttpConfig, LoadedConfig, LogFormat,
    RepocheckConfig, default_config_path,
};
pub use policy::{ADAPTER_CATEGORIES, CheckPolicy};
pub use source::{ConfigSource, Sourced};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
