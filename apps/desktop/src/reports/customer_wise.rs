//! All jobs of one customer in a period.

use jobcost_core::dates::DateRange;
use jobcost_core::report::JobTotals;
use jobcost_db::Database;

use super::pdf::{Column, Orientation, ReportDocument, Table};
use super::{day, paise, period, plain, rupees, ReportError, ReportKind};
use crate::state::ConfigState;

pub async fn build(
    db: &Database,
    config: &ConfigState,
    customer_id: i64,
    range: DateRange,
) -> Result<ReportDocument, ReportError> {
    let customer = db.customers().get(customer_id).await?;
    let jobs = db.jobs().for_report(range.from, range.to, Some(customer_id)).await?;

    let mut doc = ReportDocument::new(
        &config.business_name,
        ReportKind::CustomerWise.title(),
        Some(period(range)),
        Orientation::Portrait,
    );

    doc.heading("Customer");
    doc.key_value("Name", &customer.name);
    if let Some(phone) = customer.phone.as_deref() {
        doc.key_value("Phone", phone);
    }
    if let Some(address) = customer.address.as_deref() {
        doc.key_value("Address", address);
    }
    doc.spacer(6.0);

    if jobs.is_empty() {
        doc.paragraph("No jobs for this customer in this period.");
        return Ok(doc);
    }

    let mut table = Table::new(vec![
        Column::left("Date", 1.6),
        Column::left("Job#", 2.4),
        Column::left("Item", 2.6),
        Column::right("Qty", 1.0),
        Column::right("Rate", 1.2),
        Column::right("Amount", 1.8),
        Column::right("Cooly", 1.4),
        Column::right("Waste", 1.4),
        Column::right("Total", 1.8),
        Column::left("Status", 1.6),
    ])
    .font_size(7.5);

    for view in &jobs {
        let job = &view.job;
        table.push(vec![
            day(job.date),
            job.job_number.clone(),
            view.item_name.clone(),
            job.quantity.to_string(),
            plain(job.rate()),
            plain(job.amount()),
            plain(job.cooly()),
            plain(job.total_waste()),
            plain(job.total_amount()),
            job.status.label().to_string(),
        ]);
    }

    let totals = JobTotals::from_jobs(jobs.iter().map(|v| &v.job));
    table.totals = Some(vec![
        "TOTAL".to_string(),
        format!("{} jobs", totals.jobs),
        String::new(),
        totals.quantity.to_string(),
        String::new(),
        plain(totals.amount()),
        plain(totals.cooly()),
        paise(totals.waste_paise + totals.machine_waste_paise),
        plain(totals.total()),
        String::new(),
    ]);
    doc.table(&table);

    doc.key_value("Total billed", &rupees(totals.total()));

    Ok(doc)
}
