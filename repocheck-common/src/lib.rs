//! Shared core of repocheck: the adapter repository validation pipeline,
//! its rule catalog, configuration and logging setup.
//!
//! The CLI (`repocheck`) and the HTTP daemon (`repocheckd`) are thin
//! front-ends over [`Pipeline`].

pub mod checks;
pub mod config;
pub mod context;
pub mod errors;
pub mod fetch;
pub mod json;
pub mod logging;
pub mod pipeline;
pub mod rules;
pub mod testing;

pub use checks::{ListingPageChecker, PublicationChecker};
pub use config::{CheckPolicy, ConfigError, LoadedConfig, LogFormat, RepocheckConfig};
pub use context::{AdapterName, PrimaryChecked, Published, RepositoryRef, SecondaryChecked};
pub use errors::{Rejection, RejectionCategory, RejectionCode, RejectionEntry};
pub use fetch::{DocumentFetcher, FetchError, HttpFetcher};
pub use logging::init_logging;
pub use pipeline::{DeadlineExceeded, Outcome, Pipeline, PipelineState, Stage, Verdict};
pub use rules::Rule;
