//! Rejection Catalog for repocheck
//!
//! Every reason a repository can be refused admission has a stable entry
//! here. Each entry includes:
//! - A unique code (RC-E100 through RC-E599)
//! - The reason name surfaced to callers (e.g. `VersionMismatch`)
//! - A human-readable message template
//! - Remediation steps for the adapter author
//!
//! # Code Ranges
//!
//! | Range      | Category     | Description                                   |
//! |------------|--------------|-----------------------------------------------|
//! | E100-E199  | Transport    | Remote document unreachable or non-200        |
//! | E200-E299  | Parse        | Remote document is not a JSON object          |
//! | E300-E399  | Structure    | Required field absent or of the wrong shape   |
//! | E400-E499  | Consistency  | Two sources disagree on the same value        |
//! | E500-E599  | Policy       | Value present but violates a registry rule    |
//!
//! # Example
//!
//! ```rust
//! use repocheck_common::errors::catalog::RejectionCode;
//!
//! let entry = RejectionCode::VersionMismatch.entry();
//! println!("{} {}: {}", entry.code, entry.name, entry.message);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejection code enumeration covering every admission rule.
///
/// Each variant maps to a unique code in the RC-Exxx format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RejectionCode {
    // =========================================================================
    // Transport (E100-E199)
    // =========================================================================
    /// package.json could not be fetched
    ManifestNotFound,
    /// io-package.json could not be fetched
    SecondaryManifestNotFound,
    /// The declared external icon does not resolve
    ExternalIconUnreachable,
    /// Package listing page missing or empty
    NotPublished,

    // =========================================================================
    // Parse (E200-E299)
    // =========================================================================
    /// package.json is not a JSON object
    ManifestParseError,
    /// io-package.json is not a JSON object
    SecondaryManifestParseError,

    // =========================================================================
    // Structure (E300-E399)
    // =========================================================================
    /// A required package.json field is absent
    MissingField,
    /// io-package.json has no `common` object
    MissingCommonGroup,
    /// `common.title` is absent
    MissingTitle,
    /// `common.version` is absent
    MissingVersion,
    /// `common.desc` is absent
    MissingDescription,
    /// `common.desc` is a plain string instead of a language map
    DescriptionNotLocalized,
    /// `common.icon` is absent
    MissingIcon,
    /// `common.extIcon` is absent
    MissingExternalIcon,
    /// `common.license` is absent
    MissingLicense,
    /// `common.type` is absent
    MissingType,
    /// `common.authors` is absent
    MissingAuthors,
    /// `common.authors` is not an array
    AuthorsNotArray,
    /// `common.authors` is an empty array
    AuthorsEmpty,
    /// io-package.json has no `native` group
    MissingNativeGroup,

    // =========================================================================
    // Consistency (E400-E499)
    // =========================================================================
    /// package.json name does not match the repository name
    NameMismatch,
    /// package.json repository.url does not point at the repository
    RepositoryUrlMismatch,
    /// io-package.json common.name does not match the adapter name
    SecondaryNameMismatch,
    /// extIcon does not end with the icon path
    IconPathMismatch,
    /// Licenses differ between the two manifests
    LicenseMismatch,
    /// Versions differ between the two manifests
    VersionMismatch,

    // =========================================================================
    // Policy (E500-E599)
    // =========================================================================
    /// Repository URL lacks the namespace segment
    MissingNamespaceSegment,
    /// Repository URL uses the lowercase namespace spelling
    WrongNamespaceCasing,
    /// Adapter name has uppercase letters
    InvalidNameCasing,
    /// Adapter name has characters outside `[a-z0-9_-]`
    InvalidNameCharacters,
    /// repository.type is not `git`
    InvalidRepositoryType,
    /// Title repeats the platform brand name
    TitleContainsBrandName,
    /// Title contains the word "adapter"
    TitleContainsRedundantWord,
    /// Neither compact nor onlyWWW mode is enabled
    CompactModeRequired,
    /// materialize admin UI support is not enabled
    AdminUiSupportRequired,
    /// `common.type` is not a known category
    UnknownType,
    /// No recognized maintainer is a registry collaborator
    RequiredCollaboratorMissing,
}

impl RejectionCode {
    /// Returns the numeric code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            // Transport (100-199)
            Self::ManifestNotFound => 100,
            Self::SecondaryManifestNotFound => 101,
            Self::ExternalIconUnreachable => 102,
            Self::NotPublished => 103,

            // Parse (200-299)
            Self::ManifestParseError => 200,
            Self::SecondaryManifestParseError => 201,

            // Structure (300-399)
            Self::MissingField => 300,
            Self::MissingCommonGroup => 301,
            Self::MissingTitle => 302,
            Self::MissingVersion => 303,
            Self::MissingDescription => 304,
            Self::DescriptionNotLocalized => 305,
            Self::MissingIcon => 306,
            Self::MissingExternalIcon => 307,
            Self::MissingLicense => 308,
            Self::MissingType => 309,
            Self::MissingAuthors => 310,
            Self::AuthorsNotArray => 311,
            Self::AuthorsEmpty => 312,
            Self::MissingNativeGroup => 313,

            // Consistency (400-499)
            Self::NameMismatch => 400,
            Self::RepositoryUrlMismatch => 401,
            Self::SecondaryNameMismatch => 402,
            Self::IconPathMismatch => 403,
            Self::LicenseMismatch => 404,
            Self::VersionMismatch => 405,

            // Policy (500-599)
            Self::MissingNamespaceSegment => 500,
            Self::WrongNamespaceCasing => 501,
            Self::InvalidNameCasing => 502,
            Self::InvalidNameCharacters => 503,
            Self::InvalidRepositoryType => 504,
            Self::TitleContainsBrandName => 505,
            Self::TitleContainsRedundantWord => 506,
            Self::CompactModeRequired => 507,
            Self::AdminUiSupportRequired => 508,
            Self::UnknownType => 509,
            Self::RequiredCollaboratorMissing => 510,
        }
    }

    /// Returns the formatted code string (e.g., "RC-E405").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("RC-E{:03}", self.code_number())
    }

    /// Reason name as it appears at the start of a rejection string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ManifestNotFound => "ManifestNotFound",
            Self::SecondaryManifestNotFound => "SecondaryManifestNotFound",
            Self::ExternalIconUnreachable => "ExternalIconUnreachable",
            Self::NotPublished => "NotPublished",
            Self::ManifestParseError => "ManifestParseError",
            Self::SecondaryManifestParseError => "SecondaryManifestParseError",
            Self::MissingField => "MissingField",
            Self::MissingCommonGroup => "MissingCommonGroup",
            Self::MissingTitle => "MissingTitle",
            Self::MissingVersion => "MissingVersion",
            Self::MissingDescription => "MissingDescription",
            Self::DescriptionNotLocalized => "DescriptionNotLocalized",
            Self::MissingIcon => "MissingIcon",
            Self::MissingExternalIcon => "MissingExternalIcon",
            Self::MissingLicense => "MissingLicense",
            Self::MissingType => "MissingType",
            Self::MissingAuthors => "MissingAuthors",
            Self::AuthorsNotArray => "AuthorsNotArray",
            Self::AuthorsEmpty => "AuthorsEmpty",
            Self::MissingNativeGroup => "MissingNativeGroup",
            Self::NameMismatch => "NameMismatch",
            Self::RepositoryUrlMismatch => "RepositoryUrlMismatch",
            Self::SecondaryNameMismatch => "SecondaryNameMismatch",
            Self::IconPathMismatch => "IconPathMismatch",
            Self::LicenseMismatch => "LicenseMismatch",
            Self::VersionMismatch => "VersionMismatch",
            Self::MissingNamespaceSegment => "MissingNamespaceSegment",
            Self::WrongNamespaceCasing => "WrongNamespaceCasing",
            Self::InvalidNameCasing => "InvalidNameCasing",
            Self::InvalidNameCharacters => "InvalidNameCharacters",
            Self::InvalidRepositoryType => "InvalidRepositoryType",
            Self::TitleContainsBrandName => "TitleContainsBrandName",
            Self::TitleContainsRedundantWord => "TitleContainsRedundantWord",
            Self::CompactModeRequired => "CompactModeRequired",
            Self::AdminUiSupportRequired => "AdminUiSupportRequired",
            Self::UnknownType => "UnknownType",
            Self::RequiredCollaboratorMissing => "RequiredCollaboratorMissing",
        }
    }

    /// Returns the rejection category.
    #[must_use]
    pub const fn category(&self) -> RejectionCategory {
        match self.code_number() {
            100..=199 => RejectionCategory::Transport,
            200..=299 => RejectionCategory::Parse,
            300..=399 => RejectionCategory::Structure,
            400..=499 => RejectionCategory::Consistency,
            _ => RejectionCategory::Policy,
        }
    }

    /// Returns the full catalog entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> RejectionEntry {
        RejectionEntry {
            code: self.code_string(),
            name: self.name().to_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Returns the message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            // Transport
            Self::ManifestNotFound => "package.json could not be fetched from the repository",
            Self::SecondaryManifestNotFound => {
                "io-package.json could not be fetched from the repository"
            }
            Self::ExternalIconUnreachable => "The external icon URL does not resolve",
            Self::NotPublished => "The package is not published on the package registry",

            // Parse
            Self::ManifestParseError => "package.json is not a valid JSON object",
            Self::SecondaryManifestParseError => "io-package.json is not a valid JSON object",

            // Structure
            Self::MissingField => "package.json is missing a required field",
            Self::MissingCommonGroup => "io-package.json has no common section",
            Self::MissingTitle => "common.title is missing in io-package.json",
            Self::MissingVersion => "common.version is missing in io-package.json",
            Self::MissingDescription => "common.desc is missing in io-package.json",
            Self::DescriptionNotLocalized => {
                "common.desc must be an object keyed by language, not a plain string"
            }
            Self::MissingIcon => "common.icon is missing in io-package.json",
            Self::MissingExternalIcon => "common.extIcon is missing in io-package.json",
            Self::MissingLicense => "common.license is missing in io-package.json",
            Self::MissingType => "common.type is missing in io-package.json",
            Self::MissingAuthors => "common.authors is missing in io-package.json",
            Self::AuthorsNotArray => "common.authors must be an array",
            Self::AuthorsEmpty => "common.authors must list at least one author",
            Self::MissingNativeGroup => "io-package.json has no native section",

            // Consistency
            Self::NameMismatch => "package.json name does not match the repository name",
            Self::RepositoryUrlMismatch => {
                "package.json repository.url does not point at the checked repository"
            }
            Self::SecondaryNameMismatch => {
                "io-package.json common.name does not match the adapter name"
            }
            Self::IconPathMismatch => "common.extIcon does not end with common.icon",
            Self::LicenseMismatch => "Licenses in package.json and io-package.json differ",
            Self::VersionMismatch => "Versions in package.json and io-package.json differ",

            // Policy
            Self::MissingNamespaceSegment => {
                "Repository name does not carry the required namespace prefix"
            }
            Self::WrongNamespaceCasing => {
                "Repository name uses the lowercase spelling of the namespace prefix"
            }
            Self::InvalidNameCasing => "Adapter name must be lowercase",
            Self::InvalidNameCharacters => "Adapter name may only contain a-z, 0-9, '-' and '_'",
            Self::InvalidRepositoryType => "package.json repository.type must be \"git\"",
            Self::TitleContainsBrandName => "common.title must not repeat the platform name",
            Self::TitleContainsRedundantWord => "common.title must not contain the word \"adapter\"",
            Self::CompactModeRequired => "Adapter must support compact mode",
            Self::AdminUiSupportRequired => "Adapter must support the admin UI (materialize)",
            Self::UnknownType => "common.type is not a known adapter category",
            Self::RequiredCollaboratorMissing => {
                "No recognized maintainer is listed as a collaborator on the package registry"
            }
        }
    }

    /// Returns remediation steps for this rejection.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            // Transport
            Self::ManifestNotFound => &[
                "Commit package.json to the root of the default branch",
                "Check that the repository is public",
            ],
            Self::SecondaryManifestNotFound => &[
                "Commit io-package.json to the root of the default branch",
                "Check the file name spelling (io-package.json)",
            ],
            Self::ExternalIconUnreachable => &[
                "Point common.extIcon at the raw URL of the committed icon",
                "Open the URL in a browser to confirm it resolves",
            ],
            Self::NotPublished => &[
                "Publish the package with 'npm publish'",
                "Check that the published name matches package.json",
            ],

            // Parse
            Self::ManifestParseError => &[
                "Run package.json through a JSON linter",
                "Remove trailing commas and comments",
            ],
            Self::SecondaryManifestParseError => &[
                "Run io-package.json through a JSON linter",
                "Remove trailing commas and comments",
            ],

            // Structure
            Self::MissingField => &[
                "Add the named field to package.json",
                "Required fields: version, description, license, main, author, repository",
            ],
            Self::MissingCommonGroup => &["Add a common object to io-package.json"],
            Self::MissingTitle => &["Add common.title to io-package.json"],
            Self::MissingVersion => &["Add common.version to io-package.json"],
            Self::MissingDescription => &["Add common.desc to io-package.json"],
            Self::DescriptionNotLocalized => &[
                "Turn common.desc into an object such as {\"en\": \"...\", \"de\": \"...\"}",
            ],
            Self::MissingIcon => &["Add common.icon with the relative icon path"],
            Self::MissingExternalIcon => &["Add common.extIcon with the absolute icon URL"],
            Self::MissingLicense => &["Add common.license matching package.json"],
            Self::MissingType => &[
                "Add common.type with one of the categories from 'repocheck categories'",
            ],
            Self::MissingAuthors => &["Add common.authors as an array of author strings"],
            Self::AuthorsNotArray => &["Wrap the author entry in an array"],
            Self::AuthorsEmpty => &["List at least one author in common.authors"],
            Self::MissingNativeGroup => &["Add a native object to io-package.json (may be empty)"],

            // Consistency
            Self::NameMismatch => &[
                "Set package.json name to the lowercase namespace plus the adapter name",
            ],
            Self::RepositoryUrlMismatch => &[
                "Set repository.url in package.json to the repository URL",
            ],
            Self::SecondaryNameMismatch => &[
                "Set common.name in io-package.json to the adapter name",
            ],
            Self::IconPathMismatch => &[
                "Make common.extIcon end with the same path as common.icon",
            ],
            Self::LicenseMismatch => &["Use the same license string in both manifests"],
            Self::VersionMismatch => &[
                "Bump both manifests together",
                "Use the same version string in both manifests",
            ],

            // Policy
            Self::MissingNamespaceSegment => &[
                "Rename the repository so it starts with the namespace prefix",
            ],
            Self::WrongNamespaceCasing => &[
                "Rename the repository using the exact mixed-case namespace prefix",
            ],
            Self::InvalidNameCasing => &["Rename the repository using a lowercase adapter name"],
            Self::InvalidNameCharacters => &[
                "Remove characters other than a-z, 0-9, '-' and '_' from the adapter name",
            ],
            Self::InvalidRepositoryType => &["Set repository.type to \"git\""],
            Self::TitleContainsBrandName => &["Drop the platform name from common.title"],
            Self::TitleContainsRedundantWord => &["Drop the word \"adapter\" from common.title"],
            Self::CompactModeRequired => &[
                "Set common.compact to true and support compact mode",
                "Set common.onlyWWW to true for web-only adapters",
            ],
            Self::AdminUiSupportRequired => &["Set common.materialize to true"],
            Self::UnknownType => &[
                "Pick one of the categories from 'repocheck categories'",
            ],
            Self::RequiredCollaboratorMissing => &[
                "Add one of the registry maintainers as a collaborator with 'npm owner add'",
            ],
        }
    }

    /// Returns all rejection codes, in catalog order.
    #[must_use]
    pub const fn all() -> &'static [RejectionCode] {
        &[
            // Transport
            Self::ManifestNotFound,
            Self::SecondaryManifestNotFound,
            Self::ExternalIconUnreachable,
            Self::NotPublished,
            // Parse
            Self::ManifestParseError,
            Self::SecondaryManifestParseError,
            // Structure
            Self::MissingField,
            Self::MissingCommonGroup,
            Self::MissingTitle,
            Self::MissingVersion,
            Self::MissingDescription,
            Self::DescriptionNotLocalized,
            Self::MissingIcon,
            Self::MissingExternalIcon,
            Self::MissingLicense,
            Self::MissingType,
            Self::MissingAuthors,
            Self::AuthorsNotArray,
            Self::AuthorsEmpty,
            Self::MissingNativeGroup,
            // Consistency
            Self::NameMismatch,
            Self::RepositoryUrlMismatch,
            Self::SecondaryNameMismatch,
            Self::IconPathMismatch,
            Self::LicenseMismatch,
            Self::VersionMismatch,
            // Policy
            Self::MissingNamespaceSegment,
            Self::WrongNamespaceCasing,
            Self::InvalidNameCasing,
            Self::InvalidNameCharacters,
            Self::InvalidRepositoryType,
            Self::TitleContainsBrandName,
            Self::TitleContainsRedundantWord,
            Self::CompactModeRequired,
            Self::AdminUiSupportRequired,
            Self::UnknownType,
            Self::RequiredCollaboratorMissing,
        ]
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code_string(), self.name(), self.message())
    }
}

/// Rejection category for grouping related rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionCategory {
    /// Document unreachable or non-success status (E100-E199)
    Transport,
    /// Malformed document (E200-E299)
    Parse,
    /// Field absent or of the wrong shape (E300-E399)
    Structure,
    /// Two sources disagree (E400-E499)
    Consistency,
    /// Value violates a fixed registry rule (E500-E599)
    Policy,
}

impl RejectionCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Parse => "Parse",
            Self::Structure => "Structure",
            Self::Consistency => "Consistency",
            Self::Policy => "Policy",
        }
    }
}

impl fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete catalog entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEntry {
    /// Code string (e.g., "RC-E405")
    pub code: String,
    /// Reason name (e.g., "VersionMismatch")
    pub name: String,
    /// Rejection category
    pub category: RejectionCategory,
    /// Human-readable message
    pub message: String,
    /// Steps the adapter author can take
    pub remediation: Vec<String>,
}

impl RejectionEntry {
    /// Formats the entry with full remediation steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let mut output = format!("[{}] {}: {}\n", self.code, self.name, self.message);

        if !self.remediation.is_empty() {
            output.push_str("\nRemediation steps:\n");
            for (i, step) in self.remediation.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        output
    }

    /// Single-line form used in listings.
    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {} ({}): {}", self.code, self.name, self.category, self.message)
    }
}

impl fmt::Display for RejectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_numbers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in RejectionCode::all() {
            let num = code.code_number();
            assert!(
                seen.insert(num),
                "Duplicate code number: {} for {:?}",
                num,
                code
            );
        }
    }

    #[test]
    fn test_names_are_unique_and_match_debug() {
        let mut seen = std::collections::HashSet::new();
        for code in RejectionCode::all() {
            assert!(seen.insert(code.name()), "Duplicate name {}", code.name());
            assert_eq!(code.name(), format!("{:?}", code));
        }
    }

    #[test]
    fn test_code_format() {
        assert_eq!(RejectionCode::ManifestNotFound.code_string(), "RC-E100");
        assert_eq!(RejectionCode::VersionMismatch.code_string(), "RC-E405");
        assert_eq!(
            RejectionCode::RequiredCollaboratorMissing.code_string(),
            "RC-E510"
        );
    }

    #[test]
    fn test_category_ranges() {
        for code in RejectionCode::all() {
            let num = code.code_number();
            match code.category() {
                RejectionCategory::Transport => {
                    assert!((100..200).contains(&num), "{:?} should be 100-199", code)
                }
                RejectionCategory::Parse => {
                    assert!((200..300).contains(&num), "{:?} should be 200-299", code)
                }
                RejectionCategory::Structure => {
                    assert!((300..400).contains(&num), "{:?} should be 300-399", code)
                }
                RejectionCategory::Consistency => {
                    assert!((400..500).contains(&num), "{:?} should be 400-499", code)
                }
                RejectionCategory::Policy => {
                    assert!((500..600).contains(&num), "{:?} should be 500-599", code)
                }
            }
        }
    }

    #[test]
    fn test_every_code_has_remediation() {
        for code in RejectionCode::all() {
            assert!(
                !code.remediation().is_empty(),
                "{:?} has no remediation steps",
                code
            );
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_mismatches_are_consistency_errors() {
        for code in RejectionCode::all() {
            if code.name().ends_with("Mismatch") {
                assert_eq!(code.category(), RejectionCategory::Consistency);
            }
        }
    }

    #[test]
    fn test_entry_format_full() {
        let entry = RejectionCode::DescriptionNotLocalized.entry();
        let full = entry.format_full();
        assert!(full.starts_with("[RC-E305] DescriptionNotLocalized:"));
        assert!(full.contains("Remediation steps:"));
        assert!(full.contains("  1. "));
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = RejectionCode::UnknownType.entry();
        let json = serde_json::to_string(&entry).expect("serialization failed");
        let parsed: RejectionEntry = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(parsed, entry);
        assert!(json.contains("\"category\":\"policy\""));
    }

    #[test]
    fn test_display_implementations() {
        let display = format!("{}", RejectionCode::NotPublished);
        assert!(display.contains("RC-E103"));
        assert!(display.contains("NotPublished"));
        assert_eq!(format!("{}", RejectionCategory::Structure), "Structure");
    }

    #[test]
    fn test_total_code_count() {
        // 4 transport + 2 parse + 14 structure + 6 consistency + 11 policy = 37
        assert_eq!(RejectionCode::all().len(), 37);
    }
}
