//! Registry publication stage.
//!
//! [`PublicationChecker`] decides whether an adapter is published with a
//! recognized maintainer. The default implementation scrapes the public
//! listing page; a registry API client can replace it without touching the
//! pipeline.

use crate::config::CheckPolicy;
use crate::context::{Published, PublicationRecord, SecondaryChecked};
use crate::errors::{Rejection, RejectionCode};
use crate::fetch::DocumentFetcher;
use crate::rules::{self, Rule};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Publication capability used by the final pipeline stage.
#[async_trait]
pub trait PublicationChecker: Send + Sync {
    async fn check(
        &self,
        checked: &SecondaryChecked,
        policy: &CheckPolicy,
    ) -> Result<PublicationRecord, Rejection>;
}

/// Run the publication stage, moving the context to [`Published`].
pub async fn check_publication(
    checked: SecondaryChecked,
    checker: &dyn PublicationChecker,
    policy: &CheckPolicy,
) -> Result<Published, Rejection> {
    let publication = checker.check(&checked, policy).await?;
    Ok(Published {
        checked,
        publication,
    })
}

/// Rules on a fetched listing page.
pub static LISTING_RULES: &[Rule<String>] = &[
    Rule::new(RejectionCode::NotPublished, listing_has_content),
    Rule::new(RejectionCode::RequiredCollaboratorMissing, lists_required_collaborator),
];

/// Scrapes the registry listing page for the collaborators section.
pub struct ListingPageChecker {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl ListingPageChecker {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PublicationChecker for ListingPageChecker {
    async fn check(
        &self,
        checked: &SecondaryChecked,
        policy: &CheckPolicy,
    ) -> Result<PublicationRecord, Rejection> {
        let package_name = policy.package_name(checked.checked.adapter_name.as_str());
        let listing_url = policy.listing_url(&package_name);

        let page = self
            .fetcher
            .fetch(&listing_url)
            .await
            .map_err(|e| Rejection::new(RejectionCode::NotPublished, format!("{listing_url}: {e}")))?;
        rules::evaluate(LISTING_RULES, &page, policy)?;

        let collaborator = find_collaborator(&page, policy).unwrap_or_default();
        debug!(package = %package_name, %collaborator, "listing accepted");
        Ok(PublicationRecord {
            package_name,
            listing_url,
            collaborator,
        })
    }
}

/// First configured maintainer linked after the collaborators marker.
///
/// Matching is case-insensitive on both the marker and the
/// `href="/~<id>"` profile links.
pub fn find_collaborator(page: &str, policy: &CheckPolicy) -> Option<String> {
    let page = page.to_lowercase();
    let start = page.find(&policy.collaborators_marker.to_lowercase())?;
    let section = &page[start..];
    policy
        .collaborators
        .iter()
        .find(|id| section.contains(&format!("href=\"/~{}\"", id.to_lowercase())))
        .cloned()
}

fn listing_has_content(page: &String, _: &CheckPolicy) -> Result<(), String> {
    if page.trim().is_empty() {
        Err("listing page is empty".to_string())
    } else {
        Ok(())
    }
}

fn lists_required_collaborator(page: &String, policy: &CheckPolicy) -> Result<(), String> {
    if !page
        .to_lowercase()
        .contains(&policy.collaborators_marker.to_lowercase())
    {
        return Err(format!(
            "listing page has no \"{}\" section",
            policy.collaborators_marker
        ));
    }
    match find_collaborator(page, policy) {
        Some(_) => Ok(()),
        None => Err(format!(
            "none of {} is a collaborator",
            policy.collaborators.join(", ")
        )),
    }
}
