//! Prompt assembly for the adjustment generation service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reconciliation::PendencyReport;

/// One account of the chart offered to the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAccount {
    pub code: String,
    pub name: String,
}

impl ChartAccount {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ChartAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

/// Contextual constants substituted into the adjustment prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// Period under analysis, e.g. "August 2025"
    pub period_label: String,
    /// Date every suggested adjustment is booked on
    pub adjustment_date: NaiveDate,
    pub chart_of_accounts: Vec<ChartAccount>,
    /// Code of the account used as counterpart for value and date adjustments
    pub reconciliation_account: String,
    pub temperature: f32,
}

impl Default for PromptContext {
    fn default() -> Self {
        Self {
            period_label: "August 2025".to_string(),
            adjustment_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or_default(),
            chart_of_accounts: standard_chart_of_accounts(),
            reconciliation_account: "999999".to_string(),
            temperature: 0.2,
        }
    }
}

/// Accounts adjustments are expected to use
pub fn standard_chart_of_accounts() -> Vec<ChartAccount> {
    vec![
        ChartAccount::new("110101", "Bank Checking Account"),
        ChartAccount::new("410101", "Sales Revenue"),
        ChartAccount::new("620101", "Supplier Expenses"),
        ChartAccount::new("210101", "Suppliers Payable"),
        ChartAccount::new("110201", "Customers Receivable"),
        ChartAccount::new("999999", "Reconciliation Adjustment Account"),
    ]
}

const PROMPT_TEMPLATE: &str = r#"You are an accounting assistant specialised in fiscal and accounting reconciliation.
Your task is to analyse a list of pendencies and, for each one, produce an adjustment entry for the following month,
together with a clear and professional explanation.

**Context:**
The period under analysis is {period}. Adjustment entries must be dated {adjustment_date}.
Use the following accounts as the default for adjustments:
{accounts}
Use account {reconciliation_account} as the counterpart for value or date adjustments.

**Pendency Report:**
{report}

**Your Task:**
Analyse each pendency in the report and produce a list of JSON objects. Each object must contain:
1.  `pendency_type`: the type of pendency identified (e.g. "Value Divergence").
2.  `pendency_description`: a summary of the pendency.
3.  `entry`: a JSON object with the suggested entry (date, debit_account, credit_account, amount, memo).
4.  `rationale`: the detailed justification for the suggested entry.

**MANDATORY Output Format:**
Return ONLY a valid list of JSON objects, inside a single JSON code block. Example:
```json
[
  {
    "pendency_type": "Example",
    "pendency_description": "Description of the problem found.",
    "entry": {
      "date": "{adjustment_date}",
      "debit_account": "XXXXXX - Account Name",
      "credit_account": "YYYYYY - Account Name",
      "amount": 123.45,
      "memo": "Adjustment ref. [pendency reason] for {period}."
    },
    "rationale": "Detailed explanation of why this entry is required to correct the pendency."
  }
]
```"#;

/// Substitute the report and context constants into the prompt template
///
/// The report is substituted last so its text is never re-scanned for
/// placeholders.
pub fn build_prompt(report: &PendencyReport, context: &PromptContext) -> String {
    let accounts: Vec<String> = context
        .chart_of_accounts
        .iter()
        .map(|account| format!("- {}", account))
        .collect();

    PROMPT_TEMPLATE
        .replace("{period}", &context.period_label)
        .replace("{adjustment_date}", &context.adjustment_date.to_string())
        .replace("{accounts}", &accounts.join("\n"))
        .replace("{reconciliation_account}", &context.reconciliation_account)
        .replace("{report}", report.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use bigdecimal::BigDecimal;

    fn report() -> PendencyReport {
        PendencyReport::new(
            vec![Discrepancy::ValueMismatch {
                ref_id: "L102".to_string(),
                ledger_value: BigDecimal::from(250),
                fiscal_value: BigDecimal::from(255),
                description: "Pays {period} supplier".to_string(),
            }],
            Vec::new(),
        )
    }

    #[test]
    fn test_prompt_contains_context_and_report() {
        let prompt = build_prompt(&report(), &PromptContext::default());

        assert!(prompt.contains("The period under analysis is August 2025."));
        assert!(prompt.contains("must be dated 2025-09-01"));
        assert!(prompt.contains("- 620101 (Supplier Expenses)"));
        assert!(prompt.contains("Use account 999999 as the counterpart"));
        assert!(prompt.contains(report().text()));
        assert!(prompt.contains("```json\n["));
    }

    #[test]
    fn test_report_text_is_not_substituted() {
        let prompt = build_prompt(&report(), &PromptContext::default());
        assert!(prompt.contains("Description: Pays {period} supplier"));
    }
}
