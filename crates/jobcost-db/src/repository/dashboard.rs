//! # Dashboard Repository
//!
//! Headline figures for a date range plus the most recent jobs.

use sqlx::SqlitePool;
use tracing::debug;

use super::job::JobRepository;
use crate::error::DbResult;
use jobcost_core::dates::DateRange;
use jobcost_core::{DashboardStats, JobFilter, RECENT_JOBS_LIMIT};

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Job count and money totals for jobs dated within `range`.
    ///
    /// Waste is job-level waste plus machine waste. The recent jobs list is
    /// not limited to the range.
    pub async fn stats(&self, range: DateRange) -> DbResult<DashboardStats> {
        let (job_count, total_amount_paise, total_cooly_paise, total_waste_paise): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_amount_paise), 0),
                COALESCE(SUM(cooly_paise), 0),
                COALESCE(SUM(waste_amount_paise + machine_waste_paise), 0)
            FROM jobs
            WHERE date >= ? AND date <= ?
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.pool)
        .await?;

        let recent_jobs = JobRepository::new(self.pool.clone())
            .list(&JobFilter {
                limit: Some(RECENT_JOBS_LIMIT),
                ..Default::default()
            })
            .await?;

        debug!(from = %range.from, to = %range.to, job_count, "Computed dashboard stats");

        Ok(DashboardStats {
            from: range.from,
            to: range.to,
            job_count,
            total_amount_paise,
            total_cooly_paise,
            total_waste_paise,
            recent_jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, fixture};

    #[tokio::test]
    async fn test_empty_range_is_zero() {
        let fx = fixture().await;
        let stats = fx
            .db
            .dashboard()
            .stats(DateRange::this_month(date(2025, 3, 10)))
            .await
            .unwrap();

        assert_eq!(stats.job_count, 0);
        assert_eq!(stats.total_amount_paise, 0);
        assert_eq!(stats.total_waste_paise, 0);
        assert!(stats.recent_jobs.is_empty());
        assert_eq!(stats.from, date(2025, 3, 1));
        assert_eq!(stats.to, date(2025, 3, 31));
    }

    #[tokio::test]
    async fn test_stats_sum_jobs_in_range() {
        let fx = fixture().await;
        let jobs = fx.db.jobs();
        let a = jobs
            .create(&fx.job_input(date(2025, 3, 3)), &[fx.printing_entry(40_000)])
            .await
            .unwrap();
        let b = jobs.create(&fx.job_input(date(2025, 3, 20)), &[]).await.unwrap();
        jobs.create(&fx.job_input(date(2025, 2, 27)), &[]).await.unwrap();

        let stats = fx
            .db
            .dashboard()
            .stats(DateRange::this_month(date(2025, 3, 10)))
            .await
            .unwrap();

        assert_eq!(stats.job_count, 2);
        assert_eq!(
            stats.total_amount_paise,
            a.job.job.total_amount_paise + b.job.job.total_amount_paise
        );
        assert_eq!(stats.total_cooly_paise, 100_000);
        // 2 × 3% of ₹5000, plus 2% of ₹400 machine waste
        assert_eq!(stats.total_waste_paise, 15_000 * 2 + 800);
        // Recent jobs span every date, newest first
        assert_eq!(stats.recent_jobs.len(), 3);
        assert_eq!(stats.recent_jobs[0].job.date, date(2025, 3, 20));
    }
}
