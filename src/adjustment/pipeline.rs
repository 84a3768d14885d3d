//! End-to-end run: reconcile, ask for adjustments, extract them

use uuid::Uuid;

use crate::adjustment::prompt::{build_prompt, PromptContext};
use crate::extraction::{extract, ExtractionOutcome};
use crate::reconciliation::{PendencyReport, ReconciliationConfig, ReconciliationEngine};
use crate::traits::*;
use crate::types::*;

/// What a pipeline run produced besides its report
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentStatus {
    /// Nothing to adjust; the generation service was not called
    Reconciled,
    /// Adjustments suggested for the report's pendencies
    Suggested(Vec<SuggestedAdjustment>),
    /// The response could not be turned into adjustments
    ExtractionFailed(MalformedResponse),
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentRun {
    pub run_id: Uuid,
    pub report: PendencyReport,
    pub status: AdjustmentStatus,
}

impl AdjustmentRun {
    /// Suggested adjustments; empty unless the run produced any
    pub fn adjustments(&self) -> &[SuggestedAdjustment] {
        match &self.status {
            AdjustmentStatus::Suggested(adjustments) => adjustments.as_slice(),
            AdjustmentStatus::Reconciled | AdjustmentStatus::ExtractionFailed(_) => &[],
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self.status, AdjustmentStatus::Reconciled)
    }
}

/// Orchestrates reconciliation and adjustment suggestion over a generation service
pub struct AdjustmentPipeline<G: GenerationService> {
    engine: ReconciliationEngine,
    service: G,
    context: PromptContext,
}

impl<G: GenerationService> AdjustmentPipeline<G> {
    /// Create a pipeline with default engine configuration and prompt context
    pub fn new(service: G) -> Self {
        Self::with_config(service, ReconciliationConfig::default(), PromptContext::default())
    }

    /// Create a pipeline with custom engine configuration and prompt context
    pub fn with_config(service: G, config: ReconciliationConfig, context: PromptContext) -> Self {
        Self {
            engine: ReconciliationEngine::with_config(config),
            service,
            context,
        }
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    pub fn context(&self) -> &PromptContext {
        &self.context
    }

    /// Load records from `source` and run the pipeline on them
    pub async fn run_source(
        &self,
        source: &(dyn RecordSource + Sync),
    ) -> Result<AdjustmentRun, PipelineError> {
        let ledger = source.load_ledger()?;
        let fiscal = source.load_fiscal()?;
        self.run(&ledger, &fiscal).await
    }

    /// Reconcile the records and, when pendencies exist, request adjustments
    pub async fn run(
        &self,
        ledger: &[LedgerEntry],
        fiscal: &[FiscalEntry],
    ) -> Result<AdjustmentRun, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, "starting reconciliation run");

        let report = self.engine.reconcile(ledger, fiscal)?;
        if report.is_empty() {
            tracing::info!(%run_id, "no pendencies, skipping adjustment generation");
            return Ok(AdjustmentRun {
                run_id,
                report,
                status: AdjustmentStatus::Reconciled,
            });
        }

        let status = match self.suggest(&report).await? {
            ExtractionOutcome::Parsed(adjustments) => AdjustmentStatus::Suggested(adjustments),
            ExtractionOutcome::Empty => AdjustmentStatus::Suggested(Vec::new()),
            ExtractionOutcome::Failed(error) => AdjustmentStatus::ExtractionFailed(error),
        };
        let run = AdjustmentRun {
            run_id,
            report,
            status,
        };
        tracing::info!(
            %run_id,
            pendencies = run.report.len(),
            adjustments = run.adjustments().len(),
            "reconciliation run finished"
        );
        Ok(run)
    }

    /// Ask the generation service for adjustments to an existing report
    pub async fn suggest(&self, report: &PendencyReport) -> GenerationResult<ExtractionOutcome> {
        let prompt = build_prompt(report, &self.context);
        let response = self
            .service
            .generate(&prompt, self.context.temperature)
            .await
            .inspect_err(|error| tracing::warn!(%error, "generation service failed"))?;
        Ok(extract(Some(&response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CannedGenerationService;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn records(fiscal_value: i32) -> (Vec<LedgerEntry>, Vec<FiscalEntry>) {
        let date = NaiveDate::from_ymd_opt(2025, 8, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ledger = vec![LedgerEntry::new(
            "L102".to_string(),
            date,
            "620101".to_string(),
            "Supplier B payment".to_string(),
            BigDecimal::from(250),
            BigDecimal::from(0),
        )];
        let fiscal = vec![FiscalEntry::new(
            "NF001".to_string(),
            Some("L102".to_string()),
            date,
            "Goods purchase".to_string(),
            "Supplier B".to_string(),
            BigDecimal::from(fiscal_value),
        )];
        (ledger, fiscal)
    }

    #[tokio::test]
    async fn test_reconciled_run_skips_generation() {
        let service = CannedGenerationService::new();
        let pipeline = AdjustmentPipeline::new(service.clone());
        let (ledger, fiscal) = records(250);

        let run = pipeline.run(&ledger, &fiscal).await.unwrap();

        assert!(run.is_reconciled());
        assert!(run.adjustments().is_empty());
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_error_aborts_run() {
        let service =
            CannedGenerationService::with_error(GenerationError::Authentication("bad key".into()));
        let pipeline = AdjustmentPipeline::new(service);
        let (ledger, fiscal) = records(255);

        let result = pipeline.run(&ledger, &fiscal).await;

        assert!(matches!(
            result,
            Err(PipelineError::Generation(GenerationError::Authentication(_)))
        ));
    }

    #[tokio::test]
    async fn test_unparsable_response_yields_no_adjustments() {
        let service = CannedGenerationService::with_response("I could not find anything.");
        let pipeline = AdjustmentPipeline::new(service.clone());
        let (ledger, fiscal) = records(255);

        let run = pipeline.run(&ledger, &fiscal).await.unwrap();

        assert_eq!(
            run.status,
            AdjustmentStatus::ExtractionFailed(MalformedResponse::NoPayload)
        );
        assert!(run.adjustments().is_empty());
        assert_eq!(service.prompts()[0].temperature, 0.2);
        assert!(service.prompts()[0].prompt.contains("Ref_ID: L102"));
    }
}
