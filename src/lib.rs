//! # Fiscal Reconciliation
//!
//! Reconciles an accounting ledger against a fiscal (tax invoice) table and
//! turns the resulting pendencies into suggested adjustment entries.
//!
//! ## Features
//!
//! - **Reconciliation engine**: outer join on the shared reference key with value tolerance and calendar-date checks
//! - **Pendency report**: deterministic, labelled text rendering of every discrepancy
//! - **Response extraction**: tolerant parsing of fenced or bare JSON adjustment lists from generated text
//! - **Adjustment pipeline**: prompt assembly over a pluggable [`GenerationService`]
//! - **Journal export**: balanced double-entry transactions and CSV export of approved adjustments
//! - **Record loading**: CSV loaders for ledger and fiscal exports
//!
//! ## Quick Start
//!
//! ```rust
//! use fiscal_reconciliation::{reconcile, FiscalEntry, LedgerEntry};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let ledger = vec![LedgerEntry::new(
//!     "L101".to_string(),
//!     date,
//!     "110101".to_string(),
//!     "Customer A receipt".to_string(),
//!     BigDecimal::from(1500),
//!     BigDecimal::from(0),
//! )];
//! let fiscal = vec![FiscalEntry::new(
//!     "NF000".to_string(),
//!     Some("L101".to_string()),
//!     date,
//!     "Sale".to_string(),
//!     "Customer A".to_string(),
//!     BigDecimal::from(1500),
//! )];
//!
//! let report = reconcile(&ledger, &fiscal).unwrap();
//! assert!(report.is_empty());
//! ```

pub mod adjustment;
pub mod extraction;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use adjustment::*;
pub use extraction::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
