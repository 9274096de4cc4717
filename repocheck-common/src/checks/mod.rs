//! Validation stages.
//!
//! Each stage takes the context record produced by the previous stage and
//! either returns the next record or a single [`Rejection`](crate::Rejection).

pub mod primary;
pub mod publication;
pub mod secondary;

pub use primary::{PACKAGE_MANIFEST, check_primary};
pub use publication::{ListingPageChecker, PublicationChecker, check_publication};
pub use secondary::{SECONDARY_MANIFEST, check_secondary};
