//! Reconcile the sample ledger and fiscal table and print the pendency report

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use fiscal_reconciliation::{DiscrepancyKind, FiscalEntry, LedgerEntry, ReconciliationEngine};
use std::str::FromStr;

fn main() -> DemoResult<()> {
    tracing_subscriber::fmt::init();

    println!("📒 Fiscal Reconciliation - Sample Run\n");

    let ledger = vec![
        ledger_entry("L101", 5, "110101", "Customer A receipt", "1500.00", "0.00")?,
        ledger_entry("L102", 10, "620101", "Supplier B payment", "250.50", "0.00")?,
        ledger_entry("L103", 12, "110201", "Transfer between accounts", "500.00", "0.00")?,
        ledger_entry("L104", 20, "410101", "Product C sale", "0.00", "3000.00")?,
        ledger_entry("L105", 25, "620501", "Electricity bill payment", "120.75", "0.00")?,
    ];

    // NF001 differs in value, NF002 in date, NF003 was never booked
    let fiscal = vec![
        fiscal_entry("NF000", "L101", 5, "Sale", "Customer A", "1500.00")?,
        fiscal_entry("NF001", "L102", 10, "Goods Purchase", "Supplier B", "255.50")?,
        fiscal_entry("NF002", "L104", 21, "Sale", "Customer C", "3000.00")?,
        fiscal_entry("NF003", "", 28, "Contracted Service", "IT Supplier D", "450.00")?,
    ];

    let report = ReconciliationEngine::new().reconcile(&ledger, &fiscal)?;

    if report.is_empty() {
        println!("🎉 {}", report);
        return Ok(());
    }

    println!("{}\n", report);
    println!("📊 Summary");
    println!("  Ledger only:      {}", report.count(DiscrepancyKind::LedgerOnly));
    println!("  Fiscal only:      {}", report.count(DiscrepancyKind::FiscalOnly));
    println!("  Value divergence: {}", report.count(DiscrepancyKind::ValueMismatch));
    println!("  Date divergence:  {}", report.count(DiscrepancyKind::DateMismatch));

    Ok(())
}

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

fn august(day: u32) -> DemoResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2025, 8, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "invalid sample date".into())
}

fn ledger_entry(
    ref_id: &str,
    day: u32,
    account: &str,
    description: &str,
    debit: &str,
    credit: &str,
) -> DemoResult<LedgerEntry> {
    Ok(LedgerEntry::new(
        ref_id.to_string(),
        august(day)?,
        account.to_string(),
        description.to_string(),
        BigDecimal::from_str(debit)?,
        BigDecimal::from_str(credit)?,
    ))
}

fn fiscal_entry(
    invoice_id: &str,
    ref_id: &str,
    day: u32,
    nature: &str,
    counterparty: &str,
    total: &str,
) -> DemoResult<FiscalEntry> {
    Ok(FiscalEntry::new(
        invoice_id.to_string(),
        Some(ref_id.to_string()).filter(|r| !r.is_empty()),
        august(day)?,
        nature.to_string(),
        counterparty.to_string(),
        BigDecimal::from_str(total)?,
    ))
}
