//! Traits for the collaborators the reconciliation core depends on

use async_trait::async_trait;

use crate::types::*;

/// Text generation capability used to turn a pendency report into adjustments
///
/// Implementations wrap a concrete model provider. Any retry, timeout or
/// backoff policy belongs to the implementation; callers make exactly one
/// call per run and treat an error as fatal to that run.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a response for the given prompt
    async fn generate(&self, prompt: &str, temperature: f32) -> GenerationResult<String>;
}

/// Supplier of the two record sets for one reconciliation run
///
/// The engine only needs typed sequences; spreadsheets, CSV exports or
/// database queries can all sit behind this trait.
pub trait RecordSource {
    /// Load ledger entries in their source order
    fn load_ledger(&self) -> ReconciliationResult<Vec<LedgerEntry>>;

    /// Load fiscal entries in their source order
    fn load_fiscal(&self) -> ReconciliationResult<Vec<FiscalEntry>>;
}
