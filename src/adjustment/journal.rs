//! Journal transactions and export for approved adjustments

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::io::Write;

use crate::types::*;
use crate::utils::validation::{account_code, validate_adjustment, validate_memo};

/// Header of the adjustment export
pub const EXPORT_HEADER: [&str; 5] = ["date", "debit_account", "credit_account", "amount", "memo"];

/// Transaction builder for creating validated adjustment transactions
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    /// Create a new transaction builder
    pub fn new(id: String, date: NaiveDate, description: String) -> Self {
        Self {
            transaction: Transaction::new(id, date, description, None),
        }
    }

    /// Set the reference for the transaction
    pub fn reference(mut self, reference: String) -> Self {
        self.transaction.reference = Some(reference);
        self
    }

    /// Add a debit entry
    pub fn debit(mut self, account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        self.transaction
            .entries
            .push(Entry::debit(account_id, amount, description));
        self
    }

    /// Add a credit entry
    pub fn credit(mut self, account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        self.transaction
            .entries
            .push(Entry::credit(account_id, amount, description));
        self
    }

    /// Build the transaction
    pub fn build(self) -> JournalResult<Transaction> {
        self.transaction.validate()?;
        Ok(self.transaction)
    }
}

impl SuggestedAdjustment {
    /// Turn the suggestion into a balanced two-entry journal transaction
    ///
    /// Account references are reduced to their leading code, so
    /// `"620101 - Supplier Expenses"` books against `620101`. This is where a
    /// generated adjustment is validated: the amount must be positive and the
    /// two accounts must differ.
    pub fn to_transaction(&self) -> JournalResult<Transaction> {
        validate_adjustment(self)?;
        validate_memo(&self.entry.memo)?;

        let entry = &self.entry;
        TransactionBuilder::new(
            uuid::Uuid::new_v4().to_string(),
            entry.date,
            entry.memo.clone(),
        )
        .reference(self.pendency_type.clone())
        .debit(
            account_code(&entry.debit_account).to_string(),
            entry.amount.clone(),
            Some(self.pendency_description.clone()),
        )
        .credit(
            account_code(&entry.credit_account).to_string(),
            entry.amount.clone(),
            Some(self.pendency_description.clone()),
        )
        .build()
    }
}

/// Build journal transactions for every adjustment, failing on the first invalid one
pub fn journal_from_adjustments(adjustments: &[SuggestedAdjustment]) -> JournalResult<Vec<Transaction>> {
    adjustments
        .iter()
        .map(SuggestedAdjustment::to_transaction)
        .collect()
}

/// Write adjustments as CSV rows under [`EXPORT_HEADER`]
pub fn export_adjustments_csv<W: Write>(
    writer: W,
    adjustments: &[SuggestedAdjustment],
) -> JournalResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;

    for adjustment in adjustments {
        let entry = &adjustment.entry;
        csv_writer.write_record([
            entry.date.to_string(),
            entry.debit_account.clone(),
            entry.credit_account.clone(),
            entry.amount.to_string(),
            entry.memo.clone(),
        ])?;
    }

    csv_writer.flush()?;
    tracing::debug!(count = adjustments.len(), "exported adjustments");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn adjustment() -> SuggestedAdjustment {
        SuggestedAdjustment {
            pendency_type: "Entry Only In Fiscal Table".to_string(),
            pendency_description: "NF003 was never booked".to_string(),
            entry: AdjustmentEntry {
                date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                debit_account: "620101 - Supplier Expenses".to_string(),
                credit_account: "210101 - Suppliers Payable".to_string(),
                amount: BigDecimal::from_str("450.00").unwrap(),
                memo: "Booking of NF003, ref. 08/2025".to_string(),
            },
            rationale: "The service invoice exists but was not recorded.".to_string(),
        }
    }

    #[test]
    fn test_to_transaction_is_balanced() {
        let txn = adjustment().to_transaction().unwrap();

        assert!(txn.is_balanced());
        assert_eq!(txn.entries.len(), 2);
        assert_eq!(txn.entries[0].account_id, "620101");
        assert_eq!(txn.entries[0].entry_type, EntryType::Debit);
        assert_eq!(txn.entries[1].account_id, "210101");
        assert_eq!(txn.entries[1].entry_type, EntryType::Credit);
        assert_eq!(txn.reference.as_deref(), Some("Entry Only In Fiscal Table"));
        assert_eq!(txn.total_debits(), BigDecimal::from(450));
    }

    #[test]
    fn test_to_transaction_rejects_empty_memo() {
        let mut invalid = adjustment();
        invalid.entry.memo = "  ".to_string();
        assert!(invalid.to_transaction().is_err());
    }

    #[test]
    fn test_to_transaction_rejects_zero_amount() {
        let mut zero = adjustment();
        zero.entry.debit_account = "999999".to_string();
        zero.entry.credit_account = "410101".to_string();
        zero.entry.amount = BigDecimal::from(0);

        assert!(matches!(zero.to_transaction(), Err(JournalError::Validation(_))));
        assert!(matches!(
            journal_from_adjustments(&[adjustment(), zero]),
            Err(JournalError::Validation(_))
        ));
    }

    #[test]
    fn test_to_transaction_keeps_uncoded_account_names() {
        let mut named = adjustment();
        named.entry.debit_account = "Supplier Expenses".to_string();
        named.entry.credit_account = "Supplier Payables".to_string();

        let txn = named.to_transaction().unwrap();
        assert_eq!(txn.entries[0].account_id, "Supplier Expenses");
        assert_eq!(txn.entries[1].account_id, "Supplier Payables");
    }

    #[test]
    fn test_builder_rejects_unbalanced() {
        let result = TransactionBuilder::new(
            "t1".to_string(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            "Adjustment".to_string(),
        )
        .debit("620101".to_string(), BigDecimal::from(10), None)
        .credit("999999".to_string(), BigDecimal::from(9), None)
        .build();

        assert!(matches!(result, Err(JournalError::InvalidTransaction(_))));
    }

    #[test]
    fn test_journal_from_adjustments() {
        let transactions = journal_from_adjustments(&[adjustment(), adjustment()]).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_ne!(transactions[0].id, transactions[1].id);
    }

    #[test]
    fn test_export_adjustments_csv() {
        let mut buffer = Vec::new();
        export_adjustments_csv(&mut buffer, &[adjustment()]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "date,debit_account,credit_account,amount,memo\n\
             2025-09-01,620101 - Supplier Expenses,210101 - Suppliers Payable,450.00,\"Booking of NF003, ref. 08/2025\"\n"
        );
    }
}
