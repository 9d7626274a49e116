//! A single job: header fields, cost breakdown, machine entries and notes.

use jobcost_core::fields::describe_custom_data;
use jobcost_core::{Money, Percentage};
use jobcost_db::Database;

use super::pdf::{Align, Column, Orientation, ReportDocument, Table};
use super::{day, plain, rupees, ReportError, ReportKind};
use crate::state::ConfigState;

pub async fn build(
    db: &Database,
    config: &ConfigState,
    job_id: i64,
) -> Result<ReportDocument, ReportError> {
    let detail = db.jobs().get_detail(job_id).await?;
    let view = &detail.job;
    let job = &view.job;

    let mut doc = ReportDocument::new(
        &config.business_name,
        ReportKind::JobDetail.title(),
        None,
        Orientation::Portrait,
    );

    doc.heading("Job");
    doc.key_value("Job Number", &job.job_number);
    doc.key_value("Status", job.status.label());
    doc.key_value("Date", &day(job.date));
    doc.key_value("Customer", &view.customer_name);
    if let Some(phone) = view.customer_phone.as_deref() {
        doc.key_value("Phone", phone);
    }
    doc.key_value("Item", &view.item_name);
    doc.key_value("Size", &view.item_size);
    if !view.category_name.is_empty() {
        doc.key_value("Category", &view.category_name);
    }
    if let Some(employee) = view.employee_name.as_deref() {
        doc.key_value("Employee", employee);
    }

    doc.heading("Cost Breakdown");
    doc.key_value("Quantity", &job.quantity.to_string());
    doc.key_value("Rate", &rupees(job.rate()));
    doc.key_value("Amount", &rupees(job.amount()));
    doc.key_value(
        &format!("Waste ({})", job.waste_percentage()),
        &rupees(job.waste_amount()),
    );
    doc.key_value("Cooly", &rupees(job.cooly()));
    doc.key_value("Machine Cost", &rupees(job.machine_cost()));
    doc.key_value("Machine Waste", &rupees(job.machine_waste()));
    doc.key_value("Grand Total", &rupees(job.total_amount()));

    doc.heading("Machine Entries");
    if detail.machine_entries.is_empty() {
        doc.paragraph("No machine entries.");
    } else {
        let mut table = Table::new(vec![
            Column::left("Machine", 2.0),
            Column::left("Details", 4.5),
            Column::right("Cost", 1.6),
            Column {
                header: "Waste %".to_string(),
                weight: 1.0,
                align: Align::Center,
            },
            Column::right("Waste", 1.4),
        ]);

        for entry in &detail.machine_entries {
            table.push(vec![
                entry.machine_type_name.clone(),
                describe_custom_data(&entry.entry.machine_custom_data),
                plain(entry.entry.cost()),
                Percentage::from_bps(entry.entry.waste_percentage_bps).to_string(),
                plain(entry.entry.waste_amount()),
            ]);
        }

        let cost: Money = detail.machine_entries.iter().map(|e| e.entry.cost()).sum();
        let waste: Money = detail.machine_entries.iter().map(|e| e.entry.waste_amount()).sum();
        table.totals = Some(vec![
            "TOTAL".to_string(),
            String::new(),
            plain(cost),
            String::new(),
            plain(waste),
        ]);
        doc.table(&table);
    }

    if let Some(notes) = job.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        doc.heading("Notes");
        doc.paragraph(notes);
    }

    Ok(doc)
}
