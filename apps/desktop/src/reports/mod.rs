//! # PDF Reports
//!
//! ```text
//! reports:generatePdf { reportType, params }
//!        │
//!        ▼
//! ReportKind ──► builder (cost_summary | customer_wise | job_detail | waste_report)
//!                    │  reads jobcost-db, aggregates with jobcost_core::report
//!                    ▼
//!              ReportDocument (pdf.rs) ──render──► bytes ──► {reports_dir}/{kind}-{date}.pdf
//! ```

pub mod cost_summary;
pub mod customer_wise;
pub mod job_detail;
pub mod pdf;
pub mod waste_report;

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::state::ConfigState;
use jobcost_core::dates::DateRange;
use jobcost_core::money::format_inr;
use jobcost_core::{CoreError, Money};
use jobcost_db::{Database, DbError};

/// Errors raised while building or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("The {kind} report requires {param}")]
    MissingParameter { kind: ReportKind, param: &'static str },

    #[error("Invalid period: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Could not write report: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Data(#[from] DbError),
}

/// The printable reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    CostSummary,
    CustomerWise,
    JobDetail,
    WasteReport,
}

impl ReportKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportKind::CostSummary => "cost-summary",
            ReportKind::CustomerWise => "customer-wise",
            ReportKind::JobDetail => "job-detail",
            ReportKind::WasteReport => "waste-report",
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            ReportKind::CostSummary => "Cost Summary Report",
            ReportKind::CustomerWise => "Customer-wise Report",
            ReportKind::JobDetail => "Job Detail Report",
            ReportKind::WasteReport => "Waste Report",
        }
    }

    /// `{kind}-{YYYY-MM-DD}.pdf`
    pub fn default_file_name(&self, today: NaiveDate) -> String {
        format!("{}-{}.pdf", self.as_str(), today.format("%Y-%m-%d"))
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cost-summary" => Ok(ReportKind::CostSummary),
            "customer-wise" => Ok(ReportKind::CustomerWise),
            "job-detail" => Ok(ReportKind::JobDetail),
            "waste-report" => Ok(ReportKind::WasteReport),
            other => Err(CoreError::UnknownReportType(other.to_string())),
        }
    }
}

/// Report parameters as sent by the report screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportParams {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub customer_id: Option<i64>,
    pub job_id: Option<i64>,
    /// Overrides the default location in the reports directory.
    pub output_path: Option<PathBuf>,
}

impl ReportParams {
    /// The requested period. Missing ends fall back to the current month.
    pub fn range(&self, today: NaiveDate) -> Result<DateRange, ReportError> {
        let month = DateRange::this_month(today);
        let from = self.date_from.unwrap_or(month.from);
        let to = self.date_to.unwrap_or(month.to);

        if from > to {
            return Err(ReportError::InvalidRange { from, to });
        }
        Ok(DateRange::new(from, to))
    }
}

/// Builds a report and writes it to disk, returning the written path.
pub async fn generate(
    db: &Database,
    config: &ConfigState,
    kind: ReportKind,
    params: &ReportParams,
    today: NaiveDate,
    generated_at: &str,
) -> Result<PathBuf, ReportError> {
    let document = match kind {
        ReportKind::CostSummary => cost_summary::build(db, config, params.range(today)?).await?,
        ReportKind::CustomerWise => {
            let customer_id = params.customer_id.ok_or(ReportError::MissingParameter {
                kind,
                param: "a customer",
            })?;
            customer_wise::build(db, config, customer_id, params.range(today)?).await?
        }
        ReportKind::JobDetail => {
            let job_id = params.job_id.ok_or(ReportError::MissingParameter {
                kind,
                param: "a job",
            })?;
            job_detail::build(db, config, job_id).await?
        }
        ReportKind::WasteReport => waste_report::build(db, config, params.range(today)?).await?,
    };

    let pages = document.page_count();
    let bytes = document.render(generated_at)?;

    let path = params
        .output_path
        .clone()
        .unwrap_or_else(|| config.reports_dir.join(kind.default_file_name(today)));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &bytes)?;

    info!(report = %kind, pages, bytes = bytes.len(), path = %path.display(), "Report written");
    Ok(path)
}

// =============================================================================
// Shared formatting
// =============================================================================

/// `Rs. 1,23,456.78`, for key/value lines.
pub(crate) fn rupees(amount: Money) -> String {
    format_inr(amount, "Rs. ")
}

/// `1,23,456.78`, for table cells.
pub(crate) fn plain(amount: Money) -> String {
    format_inr(amount, "")
}

pub(crate) fn paise(value: i64) -> String {
    plain(Money::from_paise(value))
}

pub(crate) fn day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub(crate) fn period(range: DateRange) -> String {
    format!("{} to {}", day(range.from), day(range.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcost_db::DbConfig;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    async fn seeded() -> (Database, ConfigState, TempDir) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.seed_if_empty(today()).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState {
            reports_dir: dir.path().join("out"),
            ..ConfigState::default()
        };
        (db, config, dir)
    }

    fn assert_pdf(path: &std::path::Path) {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(!doc.get_pages().is_empty());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("waste-report".parse::<ReportKind>().unwrap(), ReportKind::WasteReport);
        let err = "profit-loss".parse::<ReportKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown report type: profit-loss");
        assert_eq!(
            ReportKind::CostSummary.default_file_name(today()),
            "cost-summary-2025-03-20.pdf"
        );
    }

    #[test]
    fn test_range_defaults_to_this_month() {
        let range = ReportParams::default().range(today()).unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        let params = ReportParams {
            date_from: NaiveDate::from_ymd_opt(2025, 3, 10),
            date_to: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        };
        assert!(matches!(params.range(today()), Err(ReportError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn test_every_report_renders() {
        let (db, config, _dir) = seeded().await;
        let params = ReportParams {
            date_from: NaiveDate::from_ymd_opt(2025, 2, 1),
            date_to: Some(today()),
            customer_id: Some(1),
            job_id: Some(1),
            output_path: None,
        };

        for kind in [
            ReportKind::CostSummary,
            ReportKind::CustomerWise,
            ReportKind::JobDetail,
            ReportKind::WasteReport,
        ] {
            let path = generate(&db, &config, kind, &params, today(), "20/03/2025, 10:00:00")
                .await
                .unwrap();
            assert_eq!(path, config.reports_dir.join(kind.default_file_name(today())));
            assert_pdf(&path);
        }
    }

    #[tokio::test]
    async fn test_explicit_output_path_and_empty_period() {
        let (db, config, dir) = seeded().await;
        let target = dir.path().join("custom").join("summary.pdf");
        let params = ReportParams {
            date_from: NaiveDate::from_ymd_opt(2020, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2020, 1, 31),
            output_path: Some(target.clone()),
            ..Default::default()
        };

        let path = generate(&db, &config, ReportKind::CostSummary, &params, today(), "now")
            .await
            .unwrap();
        assert_eq!(path, target);
        assert_pdf(&path);
    }

    #[tokio::test]
    async fn test_required_parameters() {
        let (db, config, _dir) = seeded().await;
        let params = ReportParams::default();

        let err = generate(&db, &config, ReportKind::CustomerWise, &params, today(), "now")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The customer-wise report requires a customer");

        let err = generate(&db, &config, ReportKind::JobDetail, &params, today(), "now")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingParameter { kind: ReportKind::JobDetail, .. }));

        let params = ReportParams {
            job_id: Some(999),
            ..Default::default()
        };
        let err = generate(&db, &config, ReportKind::JobDetail, &params, today(), "now")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Data(DbError::NotFound { .. })));
    }
}
