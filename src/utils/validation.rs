//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> JournalResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(JournalError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// Validate an account reference such as `"620101"` or `"620101 - Supplier Expenses"`
pub fn validate_account_reference(account: &str) -> JournalResult<()> {
    if account.trim().is_empty() {
        return Err(JournalError::Validation(
            "Account reference cannot be empty".to_string(),
        ));
    }

    if account.len() > 100 {
        return Err(JournalError::Validation(
            "Account reference cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Account a reference books against
///
/// `"620101 - Supplier Expenses"` reduces to its leading numeric code
/// `"620101"`. A reference that does not start with a code, such as
/// `"Supplier Expenses"`, is kept whole.
pub fn account_code(account: &str) -> &str {
    let account = account.trim();
    let code = account
        .split(|c: char| c.is_whitespace() || c == '-')
        .next()
        .unwrap_or_default();

    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        code
    } else {
        account
    }
}

/// Validate that a memo is usable as a journal description
pub fn validate_memo(memo: &str) -> JournalResult<()> {
    if memo.trim().is_empty() {
        return Err(JournalError::Validation("Memo cannot be empty".to_string()));
    }

    if memo.len() > 500 {
        return Err(JournalError::Validation(
            "Memo cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a suggested adjustment before it is booked
pub fn validate_adjustment(adjustment: &SuggestedAdjustment) -> JournalResult<()> {
    let entry = &adjustment.entry;

    validate_positive_amount(&entry.amount)?;
    validate_account_reference(&entry.debit_account)?;
    validate_account_reference(&entry.credit_account)?;

    if account_code(&entry.debit_account) == account_code(&entry.credit_account) {
        return Err(JournalError::Validation(format!(
            "Debit and credit accounts must differ, both are '{}'",
            account_code(&entry.debit_account)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn adjustment(debit: &str, credit: &str, amount: i32) -> SuggestedAdjustment {
        SuggestedAdjustment {
            pendency_type: "Entry Only In Fiscal Table".to_string(),
            pendency_description: "NF003 not booked".to_string(),
            entry: AdjustmentEntry {
                date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                debit_account: debit.to_string(),
                credit_account: credit.to_string(),
                amount: BigDecimal::from(amount),
                memo: "Booking of NF003".to_string(),
            },
            rationale: "Invoice was issued but never booked".to_string(),
        }
    }

    #[test]
    fn test_account_code() {
        assert_eq!(account_code("620101 - Supplier Expenses"), "620101");
        assert_eq!(account_code("  210101"), "210101");
        assert_eq!(account_code(""), "");
        assert_eq!(account_code("Supplier Expenses"), "Supplier Expenses");
        assert_eq!(account_code(" Adjustment Account 999999 "), "Adjustment Account 999999");
    }

    #[test]
    fn test_valid_adjustment() {
        assert!(validate_adjustment(&adjustment("620101", "210101", 450)).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert!(validate_adjustment(&adjustment("620101", "210101", 0)).is_err());
    }

    #[test]
    fn test_rejects_same_account_on_both_sides() {
        let result = validate_adjustment(&adjustment(
            "999999 - Reconciliation Adjustment Account",
            "999999",
            10,
        ));
        assert!(matches!(result, Err(JournalError::Validation(_))));
    }

    #[test]
    fn test_accounts_sharing_a_first_word_are_distinct() {
        assert!(validate_adjustment(&adjustment("Supplier Expenses", "Supplier Payables", 10)).is_ok());
        assert!(validate_adjustment(&adjustment(
            "Adjustment Account 999999",
            "Adjustment Account 210101",
            10
        ))
        .is_ok());
        assert!(validate_adjustment(&adjustment("Supplier Expenses", " Supplier Expenses", 10)).is_err());
    }

    #[test]
    fn test_rejects_empty_account() {
        assert!(validate_adjustment(&adjustment(" ", "210101", 10)).is_err());
    }

    #[test]
    fn test_memo_validation() {
        assert!(validate_memo("Adjustment").is_ok());
        assert!(validate_memo("").is_err());
        assert!(validate_memo(&"x".repeat(501)).is_err());
    }
}
