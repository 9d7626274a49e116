//! # Report Commands
//!
//! `reports:generatePdf`

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::elapsed_ms;
use crate::error::ApiError;
use crate::reports::{self, ReportKind, ReportParams};
use crate::state::AppState;

/// `{ "reportType": "cost-summary", "params": { "dateFrom": ..., ... } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArgs {
    pub report_type: String,
    #[serde(default)]
    pub params: ReportParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub path: PathBuf,
}

/// Writes the requested report and returns where it was saved.
///
/// ## Returns
/// * `Err(VALIDATION_ERROR)` - Unknown report type or a missing customer/job
/// * `Err(NOT_FOUND)` - The customer or job does not exist
/// * `Err(REPORT_ERROR)` - The PDF could not be built or written
pub async fn generate_pdf(
    state: &AppState,
    args: &GenerateArgs,
    today: NaiveDate,
) -> Result<GeneratedReport, ApiError> {
    let start = Instant::now();
    let kind: ReportKind = args.report_type.parse()?;
    let generated_at = Local::now().format("%d/%m/%Y, %H:%M:%S").to_string();

    let path = reports::generate(
        state.db.inner(),
        &state.config,
        kind,
        &args.params,
        today,
        &generated_at,
    )
    .await?;

    info!(report = %kind, elapsed_ms = elapsed_ms(start), "reports:generatePdf");
    Ok(GeneratedReport { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_unknown_report_type() {
        let state = state().await;
        let args = GenerateArgs {
            report_type: "profit-loss".to_string(),
            params: ReportParams::default(),
        };

        let err = generate_pdf(&state, &args, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Unknown report type: profit-loss");
    }

    #[tokio::test]
    async fn test_writes_into_reports_dir() {
        let mut state = state().await;
        let dir = tempfile::tempdir().unwrap();
        state.config.reports_dir = dir.path().to_path_buf();
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let args = GenerateArgs {
            report_type: "waste-report".to_string(),
            params: ReportParams::default(),
        };
        let report = generate_pdf(&state, &args, today).await.unwrap();
        assert_eq!(report.path, dir.path().join("waste-report-2025-01-31.pdf"));
        assert!(report.path.exists());
    }
}
