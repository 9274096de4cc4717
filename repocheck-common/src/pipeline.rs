//! Validation pipeline.
//!
//! Runs the three stages strictly in sequence and stops at the first
//! rejection. A [`Pipeline`] holds only shared, read-only collaborators, so
//! one instance serves any number of concurrent runs.

use crate::checks::{self, ListingPageChecker, PublicationChecker};
use crate::config::CheckPolicy;
use crate::context::Published;
use crate::errors::Rejection;
use crate::fetch::DocumentFetcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span};

/// Position of a run in the validation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    PrimaryChecked,
    SecondaryChecked,
    Published,
    Rejected,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::PrimaryChecked => "primary_checked",
            Self::SecondaryChecked => "secondary_checked",
            Self::Published => "published",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Stage that produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Primary,
    Secondary,
    Publication,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Publication => "publication",
        }
    }

    /// State a run was in when this stage started.
    pub fn entered_from(&self) -> PipelineState {
        match self {
            Self::Primary => PipelineState::Start,
            Self::Secondary => PipelineState::PrimaryChecked,
            Self::Publication => PipelineState::SecondaryChecked,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Approved(Box<Published>),
    Rejected { stage: Stage, rejection: Rejection },
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    pub fn state(&self) -> PipelineState {
        match self {
            Self::Approved(_) => PipelineState::Published,
            Self::Rejected { .. } => PipelineState::Rejected,
        }
    }

    /// Caller-facing result.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Approved(_) => Outcome::approved(),
            Self::Rejected { rejection, .. } => Outcome::rejected(rejection),
        }
    }
}

/// `{approved: true}` or `{approved: false, reason: "<Code>: <detail>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Outcome {
    pub fn approved() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn rejected(rejection: &Rejection) -> Self {
        Self {
            approved: false,
            reason: Some(rejection.reason()),
        }
    }
}

/// A run did not finish within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("validation did not finish within {}s", .0.as_secs())]
pub struct DeadlineExceeded(pub Duration);

/// Validation pipeline over shared collaborators.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    publication: Arc<dyn PublicationChecker>,
    policy: Arc<CheckPolicy>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        publication: Arc<dyn PublicationChecker>,
        policy: Arc<CheckPolicy>,
    ) -> Self {
        Self {
            fetcher,
            publication,
            policy,
        }
    }

    /// Pipeline whose publication stage scrapes the registry listing page
    /// through the same fetcher.
    pub fn with_listing_page(fetcher: Arc<dyn DocumentFetcher>, policy: CheckPolicy) -> Self {
        let publication = Arc::new(ListingPageChecker::new(fetcher.clone()));
        Self::new(fetcher, publication, Arc::new(policy))
    }

    /// Validate one repository URL.
    pub async fn run(&self, url: &str) -> Verdict {
        let span = info_span!("validate", url = %url);
        async move {
            let verdict = match self.run_stages(url).await {
                Ok(published) => {
                    info!(adapter = %published.adapter_name(), "adapter approved");
                    Verdict::Approved(Box::new(published))
                }
                Err((stage, rejection)) => {
                    info!(
                        code = rejection.code.name(),
                        code_id = %rejection.code.code_string(),
                        %stage,
                        from = %stage.entered_from(),
                        detail = %rejection.detail,
                        "adapter rejected"
                    );
                    Verdict::Rejected { stage, rejection }
                }
            };
            debug!(state = %verdict.state(), "run finished");
            verdict
        }
        .instrument(span)
        .await
    }

    /// [`run`](Self::run) bounded by `deadline`. The run is dropped when the
    /// deadline passes.
    pub async fn run_with_deadline(
        &self,
        url: &str,
        deadline: Duration,
    ) -> Result<Verdict, DeadlineExceeded> {
        tokio::time::timeout(deadline, self.run(url))
            .await
            .map_err(|_| DeadlineExceeded(deadline))
    }

    async fn run_stages(&self, url: &str) -> Result<Published, (Stage, Rejection)> {
        let fetcher = self.fetcher.as_ref();
        let policy = self.policy.as_ref();

        let primary = checks::check_primary(url, fetcher, policy)
            .await
            .map_err(|r| (Stage::Primary, r))?;
        transition(PipelineState::Start, PipelineState::PrimaryChecked);

        let secondary = checks::check_secondary(primary, fetcher, policy)
            .await
            .map_err(|r| (Stage::Secondary, r))?;
        transition(PipelineState::PrimaryChecked, PipelineState::SecondaryChecked);

        let published = checks::check_publication(secondary, self.publication.as_ref(), policy)
            .await
            .map_err(|r| (Stage::Publication, r))?;
        transition(PipelineState::SecondaryChecked, PipelineState::Published);

        Ok(published)
    }
}

fn transition(from: PipelineState, to: PipelineState) {
    debug!(%from, %to, "stage passed");
}
