//! Matching engine that joins ledger and fiscal records by reference key

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::reconciliation::PendencyReport;
use crate::traits::*;
use crate::types::*;

/// How to treat a reconciliation key that appears more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Pair every ledger entry with every fiscal entry of the key (relational outer join)
    #[default]
    CartesianJoin,
    /// Pair each ledger entry with the first unconsumed fiscal entry of the key
    FirstMatchWins,
    /// Abort the run on the first duplicated key
    Reject,
}

/// Tunables for a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Largest value difference still treated as equal
    pub tolerance: BigDecimal,
    pub duplicate_policy: DuplicateKeyPolicy,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            tolerance: BigDecimal::new(1.into(), 2),
            duplicate_policy: DuplicateKeyPolicy::default(),
        }
    }
}

/// Reconciliation engine classifying ledger/fiscal differences
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    /// Create an engine with the default tolerance and duplicate policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Load both record sets from a source and reconcile them
    pub fn reconcile_source(&self, source: &dyn RecordSource) -> ReconciliationResult<PendencyReport> {
        let ledger = source.load_ledger()?;
        let fiscal = source.load_fiscal()?;
        self.reconcile(&ledger, &fiscal)
    }

    /// Reconcile ledger entries against fiscal entries
    ///
    /// Discrepancies come out in a fixed order: ledger-only entries in ledger
    /// order, fiscal-only entries in fiscal order, then the findings for each
    /// matched pair in ledger-then-fiscal order (value check before date check).
    /// Empty keys on either side never match.
    pub fn reconcile(
        &self,
        ledger: &[LedgerEntry],
        fiscal: &[FiscalEntry],
    ) -> ReconciliationResult<PendencyReport> {
        let ledger_index = index_by_key(ledger.iter().map(|e| e.ref_id.as_str()));
        let fiscal_index = index_by_key(fiscal.iter().map(|e| e.ref_id.as_str()));

        let warnings = duplicate_keys(ledger, fiscal, &ledger_index, &fiscal_index);
        for warning in &warnings {
            tracing::warn!(
                ref_id = %warning.ref_id,
                ledger_count = warning.ledger_count,
                fiscal_count = warning.fiscal_count,
                policy = ?self.config.duplicate_policy,
                "duplicate reconciliation key"
            );
        }
        if self.config.duplicate_policy == DuplicateKeyPolicy::Reject {
            if let Some(first) = warnings.first() {
                return Err(ReconciliationError::DuplicateKey {
                    ref_id: first.ref_id.clone(),
                    ledger_count: first.ledger_count,
                    fiscal_count: first.fiscal_count,
                });
            }
        }

        let mut ledger_matched = vec![false; ledger.len()];
        let mut fiscal_matched = vec![false; fiscal.len()];
        let mut pairs = Vec::new();

        for (i, entry) in ledger.iter().enumerate() {
            let Some(candidates) = fiscal_index.get(entry.ref_id.as_str()) else {
                continue;
            };
            match self.config.duplicate_policy {
                DuplicateKeyPolicy::CartesianJoin | DuplicateKeyPolicy::Reject => {
                    for &j in candidates {
                        pairs.push((i, j));
                        fiscal_matched[j] = true;
                    }
                    ledger_matched[i] = true;
                }
                DuplicateKeyPolicy::FirstMatchWins => {
                    if let Some(&j) = candidates.iter().find(|&&j| !fiscal_matched[j]) {
                        pairs.push((i, j));
                        fiscal_matched[j] = true;
                        ledger_matched[i] = true;
                    }
                }
            }
        }

        let mut discrepancies = Vec::new();

        for (entry, _) in ledger.iter().zip(&ledger_matched).filter(|(_, m)| !**m) {
            discrepancies.push(Discrepancy::LedgerOnly(entry.clone()));
        }

        for (entry, _) in fiscal.iter().zip(&fiscal_matched).filter(|(_, m)| !**m) {
            discrepancies.push(Discrepancy::FiscalOnly(entry.clone()));
        }

        for (i, j) in pairs {
            self.compare_pair(&ledger[i], &fiscal[j], &mut discrepancies);
        }

        let report = PendencyReport::new(discrepancies, warnings);
        tracing::info!(
            ledger = ledger.len(),
            fiscal = fiscal.len(),
            ledger_only = report.count(DiscrepancyKind::LedgerOnly),
            fiscal_only = report.count(DiscrepancyKind::FiscalOnly),
            value_mismatches = report.count(DiscrepancyKind::ValueMismatch),
            date_mismatches = report.count(DiscrepancyKind::DateMismatch),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Value and date are checked independently, so a pair may yield two findings
    fn compare_pair(
        &self,
        ledger: &LedgerEntry,
        fiscal: &FiscalEntry,
        discrepancies: &mut Vec<Discrepancy>,
    ) {
        let difference = (&ledger.absolute_value - &fiscal.total_value).abs();
        if difference > self.config.tolerance {
            discrepancies.push(Discrepancy::ValueMismatch {
                ref_id: ledger.ref_id.clone(),
                ledger_value: ledger.absolute_value.clone(),
                fiscal_value: fiscal.total_value.clone(),
                description: ledger.description.clone(),
            });
        }

        let ledger_date = ledger.date.date();
        let fiscal_date = fiscal.issue_date.date();
        if ledger_date != fiscal_date {
            discrepancies.push(Discrepancy::DateMismatch {
                ref_id: ledger.ref_id.clone(),
                ledger_date,
                fiscal_date,
                description: ledger.description.clone(),
            });
        }
    }
}

/// Reconcile with the default engine configuration
pub fn reconcile(
    ledger: &[LedgerEntry],
    fiscal: &[FiscalEntry],
) -> ReconciliationResult<PendencyReport> {
    ReconciliationEngine::new().reconcile(ledger, fiscal)
}

/// Positions of every non-empty key, in input order
fn index_by_key<'a>(keys: impl Iterator<Item = &'a str>) -> HashMap<&'a str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, key) in keys.enumerate() {
        if key.is_empty() {
            continue;
        }
        index.entry(key).or_default().push(position);
    }
    index
}

/// Keys occurring more than once on either side, ledger first-appearance order then fiscal
fn duplicate_keys(
    ledger: &[LedgerEntry],
    fiscal: &[FiscalEntry],
    ledger_index: &HashMap<&str, Vec<usize>>,
    fiscal_index: &HashMap<&str, Vec<usize>>,
) -> Vec<DuplicateKeyWarning> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    let keys = ledger
        .iter()
        .map(|e| e.ref_id.as_str())
        .chain(fiscal.iter().map(|e| e.ref_id.as_str()));

    for key in keys {
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        let ledger_count = ledger_index.get(key).map_or(0, Vec::len);
        let fiscal_count = fiscal_index.get(key).map_or(0, Vec::len);
        if ledger_count > 1 || fiscal_count > 1 {
            warnings.push(DuplicateKeyWarning {
                ref_id: key.to_string(),
                ledger_count,
                fiscal_count,
            });
        }
    }
    warnings
}
