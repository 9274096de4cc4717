//! Ordered rule lists.
//!
//! Each stage declares its checks as a static slice of [`Rule`]s. The slice
//! order is the evaluation order; the first failing rule produces the
//! stage's single rejection.

use crate::config::CheckPolicy;
use crate::errors::{Rejection, RejectionCode};
use tracing::trace;

/// A rule check returns the rejection detail on failure.
pub type Check<S> = fn(&S, &CheckPolicy) -> Result<(), String>;

/// One named predicate bound to the code it reports.
pub struct Rule<S> {
    pub code: RejectionCode,
    pub check: Check<S>,
}

impl<S> Rule<S> {
    pub const fn new(code: RejectionCode, check: Check<S>) -> Self {
        Self { code, check }
    }

    pub fn name(&self) -> &'static str {
        self.code.name()
    }

    pub fn apply(&self, subject: &S, policy: &CheckPolicy) -> Result<(), Rejection> {
        (self.check)(subject, policy).map_err(|detail| Rejection::new(self.code, detail))
    }
}

/// Evaluate `rules` in order; the first failure wins.
pub fn evaluate<S>(rules: &[Rule<S>], subject: &S, policy: &CheckPolicy) -> Result<(), Rejection> {
    for rule in rules {
        trace!(rule = rule.name(), "evaluating rule");
        rule.apply(subject, policy)?;
    }
    Ok(())
}
