//! Run the adjustment pipeline over CSV exports with a canned generation service

use fiscal_reconciliation::utils::{CannedGenerationService, CsvRecordSource};
use fiscal_reconciliation::{export_adjustments_csv, AdjustmentPipeline, AdjustmentStatus};

const CANNED_RESPONSE: &str = r#"```json
[
  {
    "pendency_type": "Entry Only In Fiscal Table",
    "pendency_description": "Invoice NF003 has no ledger entry",
    "entry": {
      "date": "2025-09-01",
      "debit_account": "620101 - Supplier Expenses",
      "credit_account": "210101 - Suppliers Payable",
      "amount": 450.00,
      "memo": "Booking of NF003 ref. 08/2025"
    },
    "rationale": "The service was invoiced but never booked."
  }
]
```"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(ledger_path), Some(fiscal_path)) = (args.next(), args.next()) else {
        eprintln!("usage: adjustment_pipeline <ledger.csv> <fiscal.csv>");
        std::process::exit(2);
    };

    let pipeline = AdjustmentPipeline::new(CannedGenerationService::with_response(CANNED_RESPONSE));
    let run = pipeline
        .run_source(&CsvRecordSource::new(ledger_path, fiscal_path))
        .await?;

    println!("🧾 Run {}\n", run.run_id);
    println!("{}\n", run.report);

    match &run.status {
        AdjustmentStatus::Reconciled => println!("🎉 Nothing to adjust."),
        AdjustmentStatus::ExtractionFailed(error) => println!("⚠️  No adjustments: {}", error),
        AdjustmentStatus::Suggested(adjustments) => {
            println!("📝 {} suggested adjustment(s):\n", adjustments.len());
            for (i, adjustment) in adjustments.iter().enumerate() {
                println!(
                    "  {}. {} - {}\n     {}",
                    i + 1,
                    adjustment.pendency_type,
                    adjustment.pendency_description,
                    adjustment.rationale
                );
            }
            println!();
            export_adjustments_csv(std::io::stdout(), adjustments)?;
        }
    }

    Ok(())
}
