//! Reconciliation of the accounting ledger against the fiscal table
//!
//! Records are joined on their reference key, each joined row is classified
//! into a [`Discrepancy`](crate::types::Discrepancy), and the result is
//! rendered into a [`PendencyReport`].

pub mod engine;
pub mod report;

pub use engine::*;
pub use report::*;
