//! Cost summary: every job in a period with its machine costs spread over
//! the fixed machine columns, then sub-totals per customer.

use jobcost_core::dates::DateRange;
use jobcost_core::report::{summarize_by_customer, BucketCosts, JobTotals, MachineBucket};
use jobcost_core::{JobView, Money};
use jobcost_db::Database;

use super::pdf::{Column, Orientation, ReportDocument, Table};
use super::{day, period, plain, rupees, ReportError, ReportKind};
use crate::state::ConfigState;

fn all_waste(totals: &JobTotals) -> Money {
    Money::from_paise(totals.waste_paise + totals.machine_waste_paise)
}

pub async fn build(
    db: &Database,
    config: &ConfigState,
    range: DateRange,
) -> Result<ReportDocument, ReportError> {
    let details = db.jobs().details_for_report(range.from, range.to, None).await?;

    let mut doc = ReportDocument::new(
        &config.business_name,
        ReportKind::CostSummary.title(),
        Some(period(range)),
        Orientation::Landscape,
    );

    if details.is_empty() {
        doc.paragraph("No jobs in this period.");
        return Ok(doc);
    }

    let mut columns = vec![
        Column::left("Date", 1.5),
        Column::left("Job#", 2.2),
        Column::left("Customer", 2.4),
        Column::left("Item", 2.4),
        Column::right("Qty", 1.0),
        Column::right("Rate", 1.1),
        Column::right("Amount", 1.6),
        Column::right("Cooly", 1.3),
        Column::right("Waste", 1.3),
    ];
    columns.extend(MachineBucket::COLUMNS.iter().map(|b| Column::right(b.label(), 1.3)));
    columns.push(Column::right("Total", 1.7));

    let mut table = Table::new(columns).font_size(7.0);
    let mut buckets_total = BucketCosts::default();

    for detail in &details {
        let job = &detail.job.job;
        let buckets = BucketCosts::from_entries(&detail.machine_entries);

        let mut row = vec![
            day(job.date),
            job.job_number.clone(),
            detail.job.customer_name.clone(),
            detail.job.item_name.clone(),
            job.quantity.to_string(),
            plain(job.rate()),
            plain(job.amount()),
            plain(job.cooly()),
            plain(job.total_waste()),
        ];
        row.extend(MachineBucket::COLUMNS.iter().map(|b| plain(buckets.get(*b))));
        row.push(plain(job.total_amount()));
        table.push(row);

        buckets_total.merge(&buckets);
    }

    let views: Vec<JobView> = details.iter().map(|d| d.job.clone()).collect();
    let totals = JobTotals::from_jobs(views.iter().map(|v| &v.job));

    let mut totals_row = vec![
        "TOTALS".to_string(),
        format!("{} jobs", totals.jobs),
        String::new(),
        String::new(),
        totals.quantity.to_string(),
        String::new(),
        plain(totals.amount()),
        plain(totals.cooly()),
        plain(all_waste(&totals)),
    ];
    totals_row.extend(MachineBucket::COLUMNS.iter().map(|b| plain(buckets_total.get(*b))));
    totals_row.push(plain(totals.total()));
    table.totals = Some(totals_row);

    doc.table(&table);

    let other = buckets_total.get(MachineBucket::Other);
    if !other.is_zero() {
        doc.paragraph(&format!(
            "Machine costs outside the listed columns: {}",
            rupees(other)
        ));
    }

    doc.heading("Customer-wise Sub-totals");
    let mut subtotals = Table::new(vec![
        Column::left("Customer", 4.0),
        Column::right("Jobs", 1.0),
        Column::right("Amount", 2.0),
        Column::right("Cooly", 2.0),
        Column::right("Waste", 2.0),
        Column::right("Total", 2.0),
    ]);
    for subtotal in summarize_by_customer(&views) {
        let t = &subtotal.totals;
        subtotals.push(vec![
            subtotal.customer_name.clone(),
            t.jobs.to_string(),
            plain(t.amount()),
            plain(t.cooly()),
            plain(all_waste(t)),
            plain(t.total()),
        ]);
    }
    subtotals.totals = Some(vec![
        "Grand Total".to_string(),
        totals.jobs.to_string(),
        plain(totals.amount()),
        plain(totals.cooly()),
        plain(all_waste(&totals)),
        plain(totals.total()),
    ]);
    doc.table(&subtotals);

    Ok(doc)
}
