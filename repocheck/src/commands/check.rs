//! `repocheck check`: validate repository URLs concurrently.

use super::helpers::{humanize_elapsed, indent_lines};
use anyhow::Result;
use colored::Colorize;
use futures::future::join_all;
use repocheck_common::{HttpFetcher, Pipeline, RepocheckConfig, Stage, Verdict};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Result line for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub url: String,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Catalog code (`RC-E###`) of the rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub elapsed_ms: u64,
}

pub async fn run(config: &RepocheckConfig, urls: &[String], json: bool) -> Result<ExitCode> {
    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    let pipeline = Pipeline::with_listing_page(fetcher, config.policy.clone());
    let deadline = Duration::from_secs(config.general.run_deadline_secs);

    let reports = check_all(&pipeline, urls, deadline).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", render_text(report));
        }
        if reports.len() > 1 {
            println!("{}", render_summary(&reports));
        }
    }

    Ok(exit_code(&reports))
}

/// Run every URL at once, each under its own deadline.
pub async fn check_all(pipeline: &Pipeline, urls: &[String], deadline: Duration) -> Vec<CheckReport> {
    join_all(urls.iter().map(|url| check_one(pipeline, url, deadline))).await
}

async fn check_one(pipeline: &Pipeline, url: &str, deadline: Duration) -> CheckReport {
    let started = Instant::now();
    let result = pipeline.run_with_deadline(url, deadline).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(Verdict::Approved(_)) => CheckReport {
            url: url.to_string(),
            approved: true,
            reason: None,
            code: None,
            stage: None,
            elapsed_ms,
        },
        Ok(Verdict::Rejected { stage, rejection }) => CheckReport {
            url: url.to_string(),
            approved: false,
            reason: Some(rejection.reason()),
            code: Some(rejection.code.code_string()),
            stage: Some(stage),
            elapsed_ms,
        },
        Err(exceeded) => {
            warn!(%url, "validation run exceeded its deadline");
            CheckReport {
                url: url.to_string(),
                approved: false,
                reason: Some(exceeded.to_string()),
                code: None,
                stage: None,
                elapsed_ms,
            }
        }
    }
}

pub fn render_text(report: &CheckReport) -> String {
    let elapsed = humanize_elapsed(Duration::from_millis(report.elapsed_ms));
    if report.approved {
        return format!(
            "{} {} {}",
            "✓".green().bold(),
            report.url,
            format!("approved ({elapsed})").dimmed()
        );
    }

    let mut out = format!(
        "{} {} {}",
        "✗".red().bold(),
        report.url,
        format!("rejected ({elapsed})").dimmed()
    );
    if let Some(reason) = &report.reason {
        let label = match (&report.code, report.stage) {
            (Some(code), Some(stage)) => format!("[{code}, {stage}] "),
            _ => String::new(),
        };
        out.push('\n');
        out.push_str(&indent_lines(&format!("{label}{reason}"), "    "));
    }
    out
}

fn render_summary(reports: &[CheckReport]) -> String {
    let approved = reports.iter().filter(|r| r.approved).count();
    let rejected = reports.len() - approved;
    let line = format!("{approved} approved, {rejected} rejected");
    if rejected == 0 {
        line.green().to_string()
    } else {
        line.yellow().to_string()
    }
}

/// 0 when every URL was approved, 1 otherwise.
pub fn exit_code(reports: &[CheckReport]) -> ExitCode {
    if all_approved(reports) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn all_approved(reports: &[CheckReport]) -> bool {
    reports.iter().all(|r| r.approved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repocheck_common::CheckPolicy;
    use repocheck_common::testing::AdapterFixture;
    use serde_json::json;

    fn fixture_pipeline(fixtures: &[&AdapterFixture]) -> Pipeline {
        let mut fetcher = repocheck_common::testing::StaticFetcher::new();
        for fixture in fixtures {
            fetcher = fetcher
                .with_document(fixture.package_url(), fixture.package.to_string())
                .with_document(fixture.io_package_url(), fixture.io_package.to_string())
                .with_document(fixture.icon_url(), "png")
                .with_document(fixture.listing_url(), fixture.listing.clone());
        }
        Pipeline::with_listing_page(Arc::new(fetcher), CheckPolicy::default())
    }

    #[tokio::test]
    async fn test_check_all_keeps_input_order() {
        let good = AdapterFixture::valid("foo");
        let bad = AdapterFixture::valid("bar").set_common("version", json!("2.0.0"));
        let pipeline = fixture_pipeline(&[&good, &bad]);

        let urls = vec![bad.repo_url.clone(), good.repo_url.clone()];
        let reports = check_all(&pipeline, &urls, Duration::from_secs(5)).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].url, bad.repo_url);
        assert!(!reports[0].approved);
        assert_eq!(reports[0].code.as_deref(), Some("RC-E405"));
        assert_eq!(reports[0].stage, Some(Stage::Secondary));
        assert!(reports[1].approved);
        assert!(!all_approved(&reports));
    }

    #[tokio::test]
    async fn test_all_approved() {
        let good = AdapterFixture::valid("foo");
        let pipeline = fixture_pipeline(&[&good]);
        let reports = check_all(&pipeline, &[good.repo_url.clone()], Duration::from_secs(5)).await;
        assert!(all_approved(&reports));
    }

    #[test]
    fn test_json_report_shape() {
        let approved = CheckReport {
            url: "https://github.com/Org/ioBroker.foo".to_string(),
            approved: true,
            reason: None,
            code: None,
            stage: None,
            elapsed_ms: 12,
        };
        assert_eq!(
            serde_json::to_value(&approved).unwrap(),
            json!({"url": "https://github.com/Org/ioBroker.foo", "approved": true, "elapsed_ms": 12})
        );

        let rejected = CheckReport {
            approved: false,
            reason: Some("UnknownType: \"x\" is not a known adapter category".to_string()),
            code: Some("RC-E509".to_string()),
            stage: Some(Stage::Secondary),
            ..approved
        };
        let value = serde_json::to_value(&rejected).unwrap();
        assert_eq!(value["stage"], "secondary");
        assert_eq!(value["code"], "RC-E509");
    }

    #[test]
    fn test_render_text_rejection() {
        colored::control::set_override(false);
        let report = CheckReport {
            url: "https://github.com/Org/ioBroker.foo".to_string(),
            approved: false,
            reason: Some("MissingIcon: common.icon is missing".to_string()),
            code: Some("RC-E306".to_string()),
            stage: Some(Stage::Secondary),
            elapsed_ms: 1500,
        };
        assert_eq!(
            render_text(&report),
            "✗ https://github.com/Org/ioBroker.foo rejected (1.5s)\n    [RC-E306, secondary] MissingIcon: common.icon is missing"
        );
    }
}
