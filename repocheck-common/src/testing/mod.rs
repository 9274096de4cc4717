//! Test support: an in-memory fetcher and document fixtures.
//!
//! Used by the unit tests here, the integration tests under `tests/` and the
//! daemon's handler tests.

pub mod fetcher;
pub mod fixtures;

pub use fetcher::StaticFetcher;
pub use fixtures::AdapterFixture;
