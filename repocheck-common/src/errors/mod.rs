//! Rejection catalog and the rejection value returned by every stage.
//!
//! # Code Ranges
//!
//! | Range      | Category     | Description                          |
//! |------------|--------------|--------------------------------------|
//! | E100-E199  | Transport    | Remote document unreachable          |
//! | E200-E299  | Parse        | Malformed JSON                       |
//! | E300-E399  | Structure    | Missing field or wrong shape         |
//! | E400-E499  | Consistency  | Cross-document disagreement          |
//! | E500-E599  | Policy       | Registry rule violation              |

pub mod catalog;
mod rejection;

pub use catalog::{RejectionCategory, RejectionCode, RejectionEntry};
pub use rejection::Rejection;
