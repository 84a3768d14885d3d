//! Pendency report produced by a reconciliation run

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::*;

/// Display text for a run without discrepancies. Callers should branch on
/// [`PendencyReport::is_empty`], never on this text.
pub const NO_PENDENCIES_MESSAGE: &str = "No pendencies found. The reconciliation was successful.";

/// First line of every rendered report
pub const REPORT_HEADING: &str = "## Reconciliation Pendency Report";

/// Ordered discrepancies of one run plus their rendered text
///
/// Deserializing ignores any stored `text` and renders it again from the
/// discrepancies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredReport")]
pub struct PendencyReport {
    discrepancies: Vec<Discrepancy>,
    warnings: Vec<DuplicateKeyWarning>,
    text: String,
}

impl PendencyReport {
    /// Build a report, rendering its text from the discrepancies
    pub fn new(discrepancies: Vec<Discrepancy>, warnings: Vec<DuplicateKeyWarning>) -> Self {
        let text = if discrepancies.is_empty() {
            NO_PENDENCIES_MESSAGE.to_string()
        } else {
            render(&discrepancies)
        };
        Self {
            discrepancies,
            warnings,
            text,
        }
    }

    /// True when ledger and fiscal table are fully reconciled
    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    /// Duplicated keys seen while matching
    pub fn warnings(&self) -> &[DuplicateKeyWarning] {
        &self.warnings
    }

    /// Rendered text, or [`NO_PENDENCIES_MESSAGE`] when empty
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of discrepancies of the given kind
    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.discrepancies.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn into_discrepancies(self) -> Vec<Discrepancy> {
        self.discrepancies
    }
}

#[derive(Deserialize)]
struct StoredReport {
    discrepancies: Vec<Discrepancy>,
    #[serde(default)]
    warnings: Vec<DuplicateKeyWarning>,
}

impl From<StoredReport> for PendencyReport {
    fn from(stored: StoredReport) -> Self {
        Self::new(stored.discrepancies, stored.warnings)
    }
}

impl fmt::Display for PendencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render discrepancies as a heading followed by one labelled block each,
/// blocks separated by a blank line.
///
/// The labels and their order are consumed by the adjustment prompt and must
/// stay stable.
pub fn render(discrepancies: &[Discrepancy]) -> String {
    let blocks: Vec<String> = discrepancies.iter().map(render_block).collect();
    format!("{}\n\n{}", REPORT_HEADING, blocks.join("\n\n"))
}

fn render_block(discrepancy: &Discrepancy) -> String {
    match discrepancy {
        Discrepancy::LedgerOnly(entry) => format!(
            "- Type: Entry Only In Ledger\n  Ref_ID: {}\n  Date: {}\n  Value: {}\n  Description: {}",
            entry.ref_id,
            entry.date.date(),
            entry.absolute_value,
            entry.description
        ),
        Discrepancy::FiscalOnly(entry) => format!(
            "- Type: Entry Only In Fiscal Table\n  Invoice_ID: {}\n  Date: {}\n  Value: {}\n  Description: {}",
            entry.invoice_id,
            entry.issue_date.date(),
            entry.total_value,
            entry.description()
        ),
        Discrepancy::ValueMismatch {
            ref_id,
            ledger_value,
            fiscal_value,
            description,
        } => format!(
            "- Type: Value Divergence\n  Ref_ID: {}\n  Ledger Value: {}\n  Fiscal Value: {}\n  Description: {}",
            ref_id, ledger_value, fiscal_value, description
        ),
        Discrepancy::DateMismatch {
            ref_id,
            ledger_date,
            fiscal_date,
            description,
        } => format!(
            "- Type: Date Divergence\n  Ref_ID: {}\n  Ledger Date: {}\n  Fiscal Date: {}\n  Description: {}",
            ref_id, ledger_date, fiscal_date, description
        ),
    }
}
