use super::catalog::{RejectionCategory, RejectionCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single terminal rejection produced by one rule.
///
/// `detail` carries the observed values (both sides for mismatches, the
/// parser message for parse errors). The rendered reason is
/// `"<Name>: <detail>"`, except `MissingField`, whose detail is the bare
/// field name: `"MissingField:main"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: RejectionCode,
    pub detail: String,
}

impl Rejection {
    pub fn new(code: RejectionCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Rejection whose detail is the catalog message.
    pub fn from_code(code: RejectionCode) -> Self {
        Self::new(code, code.message())
    }

    pub fn category(&self) -> RejectionCategory {
        self.code.category()
    }

    /// The user-visible reason string.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            RejectionCode::MissingField => write!(f, "{}:{}", self.code.name(), self.detail),
            _ => write!(f, "{}: {}", self.code.name(), self.detail),
        }
    }
}

impl std::error::Error for Rejection {}
