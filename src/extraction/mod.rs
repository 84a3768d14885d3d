//! Extraction of suggested adjustments from free-form generated text
//!
//! Generated responses are untrusted. The payload is located by ordered
//! fallbacks: a ```` ```json ```` fence first, the first `[` otherwise; the end
//! is the closing fence, or the last `]` when no fence closes the block.
//! Nothing here panics or propagates an error; failures come back as
//! [`ExtractionOutcome::Failed`] with a diagnostic.

use crate::types::*;

/// Opening marker of a fenced JSON block
pub const JSON_FENCE: &str = "```json";

/// Closing marker of any fenced block
pub const FENCE: &str = "```";

/// Result of scanning a generated response
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// No text to parse
    Empty,
    /// The adjustment list as generated (possibly empty)
    Parsed(Vec<SuggestedAdjustment>),
    /// A payload could not be located or parsed
    Failed(MalformedResponse),
}

impl ExtractionOutcome {
    /// Collapse into the nullable view: `None` for both empty and failed
    pub fn into_adjustments(self) -> Option<Vec<SuggestedAdjustment>> {
        match self {
            ExtractionOutcome::Parsed(adjustments) => Some(adjustments),
            ExtractionOutcome::Empty | ExtractionOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed(_))
    }
}

/// Locate and parse the adjustment list embedded in `raw`
///
/// Only the shape is checked. Amounts and accounts are taken as generated;
/// they are validated when an adjustment is booked with
/// [`SuggestedAdjustment::to_transaction`].
pub fn extract(raw: Option<&str>) -> ExtractionOutcome {
    let text = match raw {
        Some(text) if !text.trim().is_empty() => text,
        _ => return ExtractionOutcome::Empty,
    };

    let outcome = match parse_adjustments(text) {
        Ok(adjustments) => ExtractionOutcome::Parsed(adjustments),
        Err(error) => ExtractionOutcome::Failed(error),
    };

    if let ExtractionOutcome::Failed(error) = &outcome {
        match error {
            MalformedResponse::InvalidJson { payload, .. } => {
                tracing::warn!(%error, payload = %payload, "discarding generated response");
            }
            _ => tracing::warn!(%error, response = %text, "discarding generated response"),
        }
    }
    outcome
}

/// Nullable convenience wrapper over [`extract`]
pub fn extract_adjustments(raw: Option<&str>) -> Option<Vec<SuggestedAdjustment>> {
    extract(raw).into_adjustments()
}

fn parse_adjustments(text: &str) -> Result<Vec<SuggestedAdjustment>, MalformedResponse> {
    let payload = locate_payload(text).ok_or(MalformedResponse::NoPayload)?;

    let adjustments: Vec<SuggestedAdjustment> =
        serde_json::from_str(payload).map_err(|e| MalformedResponse::InvalidJson {
            reason: e.to_string(),
            payload: payload.to_string(),
        })?;

    tracing::debug!(count = adjustments.len(), "extracted suggested adjustments");
    Ok(adjustments)
}

/// Slice of `text` holding the JSON payload, trimmed
fn locate_payload(text: &str) -> Option<&str> {
    let start = match text.find(JSON_FENCE) {
        Some(fence) => fence + JSON_FENCE.len(),
        None => text.find('[')?,
    };

    // Only look for the end after the start, so an unclosed fence can't
    // produce an inverted range.
    let rest = &text[start..];
    let end = match rest.find(FENCE) {
        Some(fence) => start + fence,
        None => start + rest.rfind(']')? + 1,
    };

    Some(text[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    const ADJUSTMENT_JSON: &str = r#"[
      {
        "pendency_type": "Value Divergence",
        "pendency_description": "L102 booked at 250.50, invoice NF001 at 255.50",
        "entry": {
          "date": "2025-09-01",
          "debit_account": "620101 - Supplier Expenses",
          "credit_account": "999999 - Reconciliation Adjustment Account",
          "amount": 5.00,
          "memo": "Adjustment ref. value divergence 08/2025"
        },
        "rationale": "The invoice is the authoritative amount."
      }
    ]"#;

    fn sample() -> SuggestedAdjustment {
        SuggestedAdjustment {
            pendency_type: "Value Divergence".to_string(),
            pendency_description: "L102 booked at 250.50, invoice NF001 at 255.50".to_string(),
            entry: AdjustmentEntry {
                date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                debit_account: "620101 - Supplier Expenses".to_string(),
                credit_account: "999999 - Reconciliation Adjustment Account".to_string(),
                amount: BigDecimal::from_str("5.00").unwrap(),
                memo: "Adjustment ref. value divergence 08/2025".to_string(),
            },
            rationale: "The invoice is the authoritative amount.".to_string(),
        }
    }

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = format!(
            "Here are the adjustments:\n```json\n{}\n```\nLet me know if you need more.",
            ADJUSTMENT_JSON
        );
        assert_eq!(extract(Some(&raw)), ExtractionOutcome::Parsed(vec![sample()]));
    }

    #[test]
    fn test_plain_array_without_fence() {
        assert_eq!(
            extract_adjustments(Some(ADJUSTMENT_JSON)),
            Some(vec![sample()])
        );
    }

    #[test]
    fn test_unlabelled_fence_falls_back_to_bracket() {
        let raw = format!("```\n{}\n```", ADJUSTMENT_JSON);
        assert_eq!(extract_adjustments(Some(&raw)), Some(vec![sample()]));
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_last_bracket() {
        let raw = format!("```json\n{}\n(truncated", ADJUSTMENT_JSON);
        assert_eq!(extract_adjustments(Some(&raw)), Some(vec![sample()]));
    }

    #[test]
    fn test_round_trip_through_fenced_block() {
        let adjustments = vec![sample(), {
            let mut second = sample();
            second.pendency_type = "Date Divergence".to_string();
            second.entry.amount = BigDecimal::from_str("3000.00").unwrap();
            second
        }];
        let raw = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&adjustments).unwrap()
        );
        assert_eq!(extract(Some(&raw)), ExtractionOutcome::Parsed(adjustments));
    }

    #[test]
    fn test_empty_and_missing_input() {
        assert_eq!(extract(None), ExtractionOutcome::Empty);
        assert_eq!(extract(Some("")), ExtractionOutcome::Empty);
        assert_eq!(extract(Some("   \n")), ExtractionOutcome::Empty);
        assert_eq!(extract_adjustments(Some("")), None);
    }

    #[test]
    fn test_text_without_payload() {
        assert_eq!(
            extract(Some("not json at all")),
            ExtractionOutcome::Failed(MalformedResponse::NoPayload)
        );
        assert_eq!(extract_adjustments(Some("not json at all")), None);
    }

    #[test]
    fn test_truncated_json_degrades_to_failure() {
        let raw = "```json\n[{\"pendency_type\": \"Value Divergence\", \"entry\": {\n```";
        match extract(Some(raw)) {
            ExtractionOutcome::Failed(MalformedResponse::InvalidJson { payload, .. }) => {
                assert!(payload.starts_with("[{\"pendency_type\""));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_empty_array_is_parsed() {
        assert_eq!(
            extract(Some("No adjustments needed: []")),
            ExtractionOutcome::Parsed(Vec::new())
        );
    }

    #[test]
    fn test_zero_amount_round_trips() {
        let mut date_only = sample();
        date_only.pendency_type = "Date Divergence".to_string();
        date_only.entry.debit_account = "999999".to_string();
        date_only.entry.credit_account = "410101".to_string();
        date_only.entry.amount = BigDecimal::from(0);
        let adjustments = vec![date_only];

        let raw = format!("```json\n{}\n```", serde_json::to_string(&adjustments).unwrap());
        assert_eq!(extract(Some(&raw)), ExtractionOutcome::Parsed(adjustments));
    }

    #[test]
    fn test_account_names_without_codes_are_kept() {
        let raw = ADJUSTMENT_JSON
            .replace("620101 - Supplier Expenses", "Supplier Expenses")
            .replace("999999 - Reconciliation Adjustment Account", "Supplier Payables");

        let adjustments = extract_adjustments(Some(&raw)).unwrap();
        assert_eq!(adjustments[0].entry.debit_account, "Supplier Expenses");
        assert_eq!(adjustments[0].entry.credit_account, "Supplier Payables");
    }

    #[test]
    fn test_negative_amount_is_not_rejected() {
        let raw = ADJUSTMENT_JSON.replace("5.00", "-5.00");
        let adjustments = extract_adjustments(Some(&raw)).unwrap();
        assert_eq!(adjustments[0].entry.amount, BigDecimal::from_str("-5.00").unwrap());
    }

    #[test]
    fn test_one_odd_item_keeps_the_rest() {
        let mut odd = sample();
        odd.entry.credit_account = odd.entry.debit_account.clone();
        let adjustments = vec![sample(), odd];

        let raw = format!("```json\n{}\n```", serde_json::to_string(&adjustments).unwrap());
        assert_eq!(extract_adjustments(Some(&raw)), Some(adjustments));
    }
}
