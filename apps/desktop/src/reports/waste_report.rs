//! Waste per job and machine for a period, then a machine-wise summary.

use jobcost_core::dates::DateRange;
use jobcost_core::report::{summarize_waste_by_machine, waste_lines};
use jobcost_core::Percentage;
use jobcost_db::Database;

use super::pdf::{Column, Orientation, ReportDocument, Table};
use super::{paise, period, ReportError, ReportKind};
use crate::state::ConfigState;

pub async fn build(
    db: &Database,
    config: &ConfigState,
    range: DateRange,
) -> Result<ReportDocument, ReportError> {
    let details = db.jobs().details_for_report(range.from, range.to, None).await?;
    let lines = waste_lines(&details);

    let mut doc = ReportDocument::new(
        &config.business_name,
        ReportKind::WasteReport.title(),
        Some(period(range)),
        Orientation::Portrait,
    );

    if lines.is_empty() {
        doc.paragraph("No waste recorded in this period.");
        return Ok(doc);
    }

    let mut table = Table::new(vec![
        Column::left("Job#", 2.4),
        Column::left("Customer", 2.6),
        Column::left("Item", 2.6),
        Column::left("Machine", 2.0),
        Column::right("Qty", 1.0),
        Column::right("Waste %", 1.1),
        Column::right("Waste", 1.6),
    ])
    .font_size(8.0);

    for line in &lines {
        table.push(vec![
            line.job_number.clone(),
            line.customer_name.clone(),
            line.item_name.clone(),
            line.machine_name.clone(),
            line.quantity.to_string(),
            Percentage::from_bps(line.waste_percentage_bps).to_string(),
            paise(line.waste_amount_paise),
        ]);
    }

    let total_waste: i64 = lines.iter().map(|l| l.waste_amount_paise).sum();
    table.totals = Some(vec![
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        paise(total_waste),
    ]);
    doc.table(&table);

    let machines = summarize_waste_by_machine(&details);
    if !machines.is_empty() {
        doc.heading("Machine-wise Summary");
        let mut summary = Table::new(vec![
            Column::left("Machine", 4.0),
            Column::right("Entries", 1.0),
            Column::right("Waste", 2.0),
        ]);
        for machine in &machines {
            summary.push(vec![
                machine.machine_type_name.clone(),
                machine.entries.to_string(),
                paise(machine.waste_paise),
            ]);
        }
        summary.totals = Some(vec![
            "TOTAL".to_string(),
            machines.iter().map(|m| m.entries).sum::<i64>().to_string(),
            paise(machines.iter().map(|m| m.waste_paise).sum()),
        ]);
        doc.table(&summary);
    }

    Ok(doc)
}
