//! Core Pipeline implementation

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use rankright_domain::traits::{AnalysisStore, LlmProvider};
use rankright_domain::{
    overall_score, Analysis, AnalysisId, AnalysisRecord, Classify, Criterion, ErrorKind,
    FailureRecord, Finalization, Stage,
};
use rankright_extractor::{ContentExtractor, Source};
use rankright_llm::{LlmError, ModelGateway};
use rankright_store::{SqliteStore, StoreError, StoreStats};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Callback told about every stage an analysis enters
pub type ProgressFn = Arc<dyn Fn(AnalysisId, Stage) + Send + Sync>;

/// The Pipeline runs one analysis from source to stored scores
///
/// Stages run strictly in order: extract, summarize, score each of the six
/// criteria, aggregate. The first unrecovered error finalizes the analysis
/// as failed; no default scores are ever written.
pub struct Pipeline<L, S>
where
    L: LlmProvider<Error = LlmError> + Sync,
    S: AnalysisStore<Error = StoreError>,
{
    extractor: ContentExtractor,
    gateway: ModelGateway<L>,
    store: Arc<Mutex<S>>,
    config: PipelineConfig,
    progress: Option<ProgressFn>,
}

impl<L, S> Pipeline<L, S>
where
    L: LlmProvider<Error = LlmError> + Sync,
    S: AnalysisStore<Error = StoreError>,
{
    /// Create a new Pipeline
    pub fn new(provider: L, store: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_shared_store(provider, Arc::new(Mutex::new(store)), config)
    }

    /// Create a Pipeline over a store shared with other callers
    pub fn with_shared_store(
        provider: L,
        store: Arc<Mutex<S>>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let extractor = ContentExtractor::new(config.extraction.clone())
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let gateway = ModelGateway::new(provider, config.generation.clone());

        Ok(Self {
            extractor,
            gateway,
            store,
            config,
            progress: None,
        })
    }

    /// Report each stage transition to `progress`
    pub fn with_progress(mut self, progress: impl Fn(AnalysisId, Stage) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Get the pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The model gateway in use
    pub fn gateway(&self) -> &ModelGateway<L> {
        &self.gateway
    }

    /// The shared store handle
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Run a full analysis and return the stored record
    ///
    /// # Errors
    ///
    /// - `AnalysisFailed` when any stage fails; the analysis is stored as
    ///   failed with the stage, error kind and message
    /// - `FailureNotRecorded` when a stage failed and storing the failure
    ///   failed too
    /// - `Store` when the analysis cannot be created or read back
    pub async fn analyze(&self, source: &Source) -> Result<AnalysisRecord, PipelineError> {
        let analysis = Analysis::new(source.descriptor());
        let id = self.with_store(|store| store.create(&analysis))?;
        info!(%id, source = %analysis.source, kind = source.kind_label(), "Analysis created");
        self.report(id, Stage::Pending);

        let mut text_length = 0;
        if let Err(failure) = self.run(id, source, &mut text_length).await {
            return Err(self.fail(id, failure, text_length));
        }

        self.report(id, Stage::Complete);
        let record = self.get(id)?;
        info!(
            %id,
            overall_score = ?record.analysis.overall_score,
            "Analysis complete"
        );
        Ok(record)
    }

    /// Get an analysis and its results by ID
    pub fn get(&self, id: AnalysisId) -> Result<AnalysisRecord, PipelineError> {
        Ok(self.with_store(|store| store.get(id))?)
    }

    /// List analyses, newest first
    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<Analysis>, PipelineError> {
        Ok(self.with_store(|store| store.list(limit, offset))?)
    }

    async fn run(
        &self,
        id: AnalysisId,
        source: &Source,
        text_length: &mut usize,
    ) -> Result<(), FailureRecord> {
        let stage = Stage::Extracting;
        self.report(id, stage);
        let content = self
            .extractor
            .extract(source)
            .await
            .map_err(|e| failure_at(stage, &e))?;
        *text_length = content.char_count();
        debug!(%id, text_length = *text_length, "Content extracted");

        let stage = Stage::Summarizing;
        self.report(id, stage);
        let summary = self
            .gateway
            .summarize(&content.text)
            .await
            .map_err(|e| failure_at(stage, &e))?;

        let mut results = Vec::with_capacity(Criterion::ALL.len());
        for criterion in Criterion::ALL {
            let stage = Stage::Scoring(criterion);
            self.report(id, stage);

            let result = self
                .gateway
                .score(&content.text, criterion)
                .await
                .map_err(|e| failure_at(stage, &e))?;
            debug!(%id, criterion = criterion.key(), score = result.score, "Criterion scored");

            self.with_store(|store| store.append_criterion_result(id, &result))
                .map_err(|e| failure_at(stage, &e))?;
            results.push(result);
        }

        let stage = Stage::Aggregating;
        self.report(id, stage);
        let score = overall_score(&results).ok_or_else(|| FailureRecord {
            stage,
            kind: ErrorKind::Storage,
            message: format!(
                "expected one result per criterion, found {}",
                results.len()
            ),
        })?;

        let finalization = Finalization::complete(score, *text_length, summary);
        self.with_store(|store| store.finalize(id, &finalization))
            .map_err(|e| failure_at(stage, &e))
    }

    /// Record the failure and build the error returned to the caller
    fn fail(&self, id: AnalysisId, failure: FailureRecord, text_length: usize) -> PipelineError {
        warn!(
            %id,
            stage = %failure.stage,
            kind = %failure.kind,
            "Analysis failed: {}",
            failure.message
        );
        self.report(id, Stage::Failed);

        let finalization = Finalization::failed(failure.clone(), text_length);
        match self.with_store(|store| store.finalize(id, &finalization)) {
            Ok(()) => PipelineError::failed(id, failure),
            Err(e) => {
                error!(%id, "Could not record failure: {}", e);
                PipelineError::unrecorded(id, failure, e)
            }
        }
    }

    fn report(&self, id: AnalysisId, stage: Stage) {
        info!(%id, stage = %stage, "Stage started");
        if let Some(progress) = &self.progress {
            progress(id, stage);
        }
    }

    /// Lock the store for one synchronous call; never held across an await
    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}

impl<L> Pipeline<L, SqliteStore>
where
    L: LlmProvider<Error = LlmError> + Sync,
{
    /// Aggregate statistics across the stored history
    pub fn stats(&self) -> Result<StoreStats, PipelineError> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(store.stats()?)
    }
}

fn failure_at<E>(stage: Stage, err: &E) -> FailureRecord
where
    E: Classify + fmt::Display,
{
    FailureRecord {
        stage,
        kind: err.kind(),
        message: err.to_string(),
    }
}
