//! Core types and data structures for ledger/fiscal reconciliation

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A line from the accounting ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Reconciliation key shared with the fiscal table
    pub ref_id: String,
    /// When the entry was booked; only the calendar date is compared
    pub date: NaiveDateTime,
    /// Chart-of-accounts code the entry was booked against
    pub account: String,
    pub description: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Unsigned amount of the entry, the value compared against the fiscal total
    pub absolute_value: BigDecimal,
}

impl LedgerEntry {
    /// Create a ledger entry, deriving the absolute value from debit and credit
    pub fn new(
        ref_id: String,
        date: NaiveDateTime,
        account: String,
        description: String,
        debit: BigDecimal,
        credit: BigDecimal,
    ) -> Self {
        let absolute_value = (&debit - &credit).abs();
        Self {
            ref_id,
            date,
            account,
            description,
            debit,
            credit,
            absolute_value,
        }
    }
}

/// A line from the fiscal (tax invoice) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalEntry {
    /// Invoice number
    pub invoice_id: String,
    /// Reference to the ledger entry; empty when the invoice was never booked
    #[serde(default)]
    pub ref_id: String,
    pub issue_date: NaiveDateTime,
    pub operation_nature: String,
    pub counterparty: String,
    pub total_value: BigDecimal,
}

impl FiscalEntry {
    /// Create a new fiscal entry
    pub fn new(
        invoice_id: String,
        ref_id: Option<String>,
        issue_date: NaiveDateTime,
        operation_nature: String,
        counterparty: String,
        total_value: BigDecimal,
    ) -> Self {
        Self {
            invoice_id,
            ref_id: ref_id.unwrap_or_default(),
            issue_date,
            operation_nature,
            counterparty,
            total_value,
        }
    }

    /// Human readable description combining nature of operation and counterparty
    pub fn description(&self) -> String {
        format!("{} - {}", self.operation_nature, self.counterparty)
    }
}

/// Bucket a discrepancy belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscrepancyKind {
    LedgerOnly,
    FiscalOnly,
    ValueMismatch,
    DateMismatch,
}

/// A classified difference between the ledger and the fiscal table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// Booked in the ledger with no fiscal counterpart
    LedgerOnly(LedgerEntry),
    /// Present in the fiscal table with no ledger counterpart
    FiscalOnly(FiscalEntry),
    /// Matched pair whose values differ by more than the tolerance
    ValueMismatch {
        ref_id: String,
        ledger_value: BigDecimal,
        fiscal_value: BigDecimal,
        description: String,
    },
    /// Matched pair booked on different calendar dates
    DateMismatch {
        ref_id: String,
        ledger_date: NaiveDate,
        fiscal_date: NaiveDate,
        description: String,
    },
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Discrepancy::LedgerOnly(_) => DiscrepancyKind::LedgerOnly,
            Discrepancy::FiscalOnly(_) => DiscrepancyKind::FiscalOnly,
            Discrepancy::ValueMismatch { .. } => DiscrepancyKind::ValueMismatch,
            Discrepancy::DateMismatch { .. } => DiscrepancyKind::DateMismatch,
        }
    }

    /// Reconciliation key of the record(s) involved
    pub fn ref_id(&self) -> &str {
        match self {
            Discrepancy::LedgerOnly(entry) => &entry.ref_id,
            Discrepancy::FiscalOnly(entry) => &entry.ref_id,
            Discrepancy::ValueMismatch { ref_id, .. } | Discrepancy::DateMismatch { ref_id, .. } => {
                ref_id
            }
        }
    }
}

/// A reconciliation key that occurred more than once on either side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKeyWarning {
    pub ref_id: String,
    pub ledger_count: usize,
    pub fiscal_count: usize,
}

/// Proposed correcting journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    #[serde(alias = "data")]
    pub date: NaiveDate,
    #[serde(alias = "conta_debito")]
    pub debit_account: String,
    #[serde(alias = "conta_credito")]
    pub credit_account: String,
    #[serde(alias = "valor", deserialize_with = "decimal_amount::deserialize")]
    pub amount: BigDecimal,
    #[serde(alias = "historico")]
    pub memo: String,
}

/// An adjustment suggested by the generation service for one pendency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAdjustment {
    #[serde(alias = "tipo_pendencia")]
    pub pendency_type: String,
    #[serde(alias = "descricao_pendencia")]
    pub pendency_description: String,
    #[serde(alias = "lancamento_sugerido")]
    pub entry: AdjustmentEntry,
    #[serde(alias = "explicacao_logica")]
    pub rationale: String,
}

/// Amounts arrive either as JSON numbers or as strings. Both are parsed from
/// their literal text so no binary float rounding leaks into the decimal.
mod decimal_amount {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Repr::deserialize(deserializer)? {
            Repr::Number(number) => number.to_string(),
            Repr::Text(text) => text,
        };
        BigDecimal::from_str(text.trim()).map_err(serde::de::Error::custom)
    }
}

/// Types of entries in double-entry bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Debit,
    Credit,
}

/// Individual entry within a journal transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub account_id: String,
    pub entry_type: EntryType,
    pub amount: BigDecimal,
    pub description: Option<String>,
}

impl Entry {
    /// Create a debit entry
    pub fn debit(account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            description,
        }
    }

    /// Create a credit entry
    pub fn credit(account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            description,
        }
    }
}

/// Journal transaction produced from an approved adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub description: String,
    /// Pendency type that motivated the adjustment
    pub reference: Option<String>,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new(id: String, date: NaiveDate, description: String, reference: Option<String>) -> Self {
        Self {
            id,
            date,
            entries: Vec::new(),
            description,
            reference,
        }
    }

    /// Calculate total debits
    pub fn total_debits(&self) -> BigDecimal {
        self.entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Debit)
            .map(|e| &e.amount)
            .sum()
    }

    /// Calculate total credits
    pub fn total_credits(&self) -> BigDecimal {
        self.entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Credit)
            .map(|e| &e.amount)
            .sum()
    }

    /// Check if the transaction is balanced (debits = credits)
    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Validate the transaction
    pub fn validate(&self) -> JournalResult<()> {
        if self.entries.len() < 2 {
            return Err(JournalError::InvalidTransaction(
                "Transaction must have at least two entries for double-entry bookkeeping"
                    .to_string(),
            ));
        }

        if !self.is_balanced() {
            return Err(JournalError::InvalidTransaction(format!(
                "Transaction is not balanced: debits = {}, credits = {}",
                self.total_debits(),
                self.total_credits()
            )));
        }

        for entry in &self.entries {
            if entry.amount <= BigDecimal::from(0) {
                return Err(JournalError::InvalidTransaction(
                    "Entry amounts must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Errors raised while loading or matching records. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("{table} records: missing column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("{table} record '{record}': missing value for '{field}'")]
    MissingField {
        table: String,
        record: String,
        field: String,
    },
    #[error("{table} record '{record}': cannot parse date '{value}'")]
    InvalidDate {
        table: String,
        record: String,
        value: String,
    },
    #[error("{table} record '{record}': cannot parse amount '{value}'")]
    InvalidAmount {
        table: String,
        record: String,
        value: String,
    },
    #[error("duplicate reconciliation key '{ref_id}' ({ledger_count} ledger, {fiscal_count} fiscal)")]
    DuplicateKey {
        ref_id: String,
        ledger_count: usize,
        fiscal_count: usize,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;

/// Failures surfaced by a generation service adapter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Result type for generation calls
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Why a generated response could not be turned into adjustments
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedResponse {
    #[error("no JSON payload found in response")]
    NoPayload,
    #[error("invalid JSON payload: {reason}")]
    InvalidJson { reason: String, payload: String },
}

/// Errors from journal construction and export of adjustments
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors that abort an adjustment pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("reconciliation failed: {0}")]
    Reconciliation(#[from] ReconciliationError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}
