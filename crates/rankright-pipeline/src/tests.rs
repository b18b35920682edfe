//! End-to-end tests for the Pipeline over the mock provider and SQLite

#[cfg(test)]
mod tests {
    use crate::{Pipeline, PipelineConfig, PipelineError};
    use rankright_domain::traits::AnalysisStore;
    use rankright_domain::{
        Analysis, AnalysisId, AnalysisRecord, AnalysisStatus, Classify, Criterion,
        CriterionResult, ErrorKind, Finalization, Ranking, Stage,
    };
    use rankright_extractor::Source;
    use rankright_llm::{LlmError, MockProvider};
    use rankright_store::{SqliteStore, StoreError};
    use std::sync::{Arc, Mutex};

    const SUMMARY: &str = "The document sets out onboarding steps for new staff.";
    const SCORES: [u8; 6] = [80, 90, 70, 60, 100, 50];

    fn score_json(score: u8) -> String {
        format!(
            r#"{{"score": {}, "ranking": "green", "justification": "Scored {}", "key_findings": ["finding"], "recommendation": "Improve section {}"}}"#,
            score, score, score
        )
    }

    fn scoring_provider() -> MockProvider {
        let mut llm = MockProvider::new(SUMMARY);
        for (criterion, score) in Criterion::ALL.iter().zip(SCORES) {
            llm.add_response(format!("Criterion: {}", criterion.name()), score_json(score));
        }
        llm
    }

    fn txt(content: &str) -> Source {
        Source::from_file("handbook.txt", content.as_bytes().to_vec(), 1024 * 1024).unwrap()
    }

    fn pipeline(llm: MockProvider) -> Pipeline<MockProvider, SqliteStore> {
        Pipeline::new(llm, SqliteStore::in_memory().unwrap(), PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_full_analysis_flow() {
        let llm = scoring_provider();
        let pipeline = pipeline(llm.clone());

        let record = pipeline
            .analyze(&txt("Welcome aboard. Read the handbook."))
            .await
            .unwrap();

        assert_eq!(record.analysis.status, AnalysisStatus::Complete);
        assert_eq!(record.analysis.overall_score, Some(75));
        assert_eq!(record.analysis.source, "handbook.txt");
        assert_eq!(record.analysis.text_length, 34);
        assert_eq!(record.analysis.summary.as_deref(), Some(SUMMARY));
        assert!(record.analysis.failure.is_none());

        assert_eq!(record.results.len(), 6);
        for ((result, criterion), score) in record.results.iter().zip(Criterion::ALL).zip(SCORES) {
            assert_eq!(result.criterion, criterion);
            assert_eq!(result.score, score);
            assert_eq!(result.ranking, Ranking::from_score(score));
            assert_eq!(result.key_findings, vec!["finding".to_string()]);
        }

        // One summary call, then one call per criterion
        assert_eq!(llm.call_count(), 7);
        let requests = llm.requests();
        assert!(requests[0].prompt.contains("Summarize the following content"));
        assert!(requests[1..].iter().all(|r| r.json_response));
    }

    #[tokio::test]
    async fn test_analysis_is_readable_after_completion() {
        let pipeline = pipeline(scoring_provider());
        let record = pipeline.analyze(&txt("Some text")).await.unwrap();

        let fetched = pipeline.get(record.analysis.id).unwrap();
        assert_eq!(fetched, record);

        let listed = pipeline.list(10, 0).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.analysis.id);
    }

    #[tokio::test]
    async fn test_scoring_failure_leaves_no_results() {
        // Earlier rules win, so the error shadows the canned score
        let mut failing = MockProvider::new(SUMMARY);
        failing.add_error(
            "Criterion: Structure & Organization",
            LlmError::Network("HTTP 503".to_string()),
        );
        for (criterion, score) in Criterion::ALL.iter().zip(SCORES) {
            failing.add_response(format!("Criterion: {}", criterion.name()), score_json(score));
        }

        let pipeline = pipeline(failing.clone());
        let err = pipeline.analyze(&txt("Some text")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(
            err.stage(),
            Some(Stage::Scoring(Criterion::StructureOrganization))
        );
        let id = err.analysis_id().unwrap();

        let record = pipeline.get(id).unwrap();
        assert_eq!(record.analysis.status, AnalysisStatus::Failed);
        assert!(record.results.is_empty());
        assert!(record.analysis.overall_score.is_none());

        let failure = record.analysis.failure.unwrap();
        assert_eq!(failure.stage, Stage::Scoring(Criterion::StructureOrganization));
        assert_eq!(failure.kind, ErrorKind::Network);
        assert!(failure.message.contains("503"));

        // Stopped at the fourth criterion: summary plus four scoring calls
        assert_eq!(failing.call_count(), 5);
    }

    /// SQLite store that refuses every terminal update
    struct ReadOnlyFinalize(SqliteStore);

    impl AnalysisStore for ReadOnlyFinalize {
        type Error = StoreError;

        fn create(&mut self, analysis: &Analysis) -> Result<AnalysisId, StoreError> {
            self.0.create(analysis)
        }

        fn append_criterion_result(
            &mut self,
            id: AnalysisId,
            result: &CriterionResult,
        ) -> Result<(), StoreError> {
            self.0.append_criterion_result(id, result)
        }

        fn finalize(&mut self, _id: AnalysisId, _: &Finalization) -> Result<(), StoreError> {
            Err(StoreError::InvalidData("database is read-only".to_string()))
        }

        fn get(&self, id: AnalysisId) -> Result<AnalysisRecord, StoreError> {
            self.0.get(id)
        }

        fn list(&self, limit: usize, offset: usize) -> Result<Vec<Analysis>, StoreError> {
            self.0.list(limit, offset)
        }
    }

    #[tokio::test]
    async fn test_unrecorded_failure_is_surfaced() {
        let mut llm = MockProvider::new(SUMMARY);
        llm.add_error(
            "Criterion: Structure & Organization",
            LlmError::Network("HTTP 503".to_string()),
        );
        for (criterion, score) in Criterion::ALL.iter().zip(SCORES) {
            llm.add_response(format!("Criterion: {}", criterion.name()), score_json(score));
        }
        let store = ReadOnlyFinalize(SqliteStore::in_memory().unwrap());
        let pipeline = Pipeline::new(llm, store, PipelineConfig::default()).unwrap();

        let err = pipeline.analyze(&txt("Some text")).await.unwrap_err();
        assert!(matches!(err, PipelineError::FailureNotRecorded { .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(
            err.stage(),
            Some(Stage::Scoring(Criterion::StructureOrganization))
        );
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("read-only"));

        // The record really was left behind; the error must not claim otherwise
        let record = pipeline.get(err.analysis_id().unwrap()).unwrap();
        assert_eq!(record.analysis.status, AnalysisStatus::Pending);
        assert_eq!(record.results.len(), 3);
    }

    #[tokio::test]
    async fn test_summary_failure_recorded() {
        let mut llm = MockProvider::new("unused");
        llm.add_error("Summarize", LlmError::Auth("invalid API key".to_string()));
        let pipeline = pipeline(llm.clone());

        let err = pipeline.analyze(&txt("Some text")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.stage(), Some(Stage::Summarizing));
        assert_eq!(llm.call_count(), 1);

        let record = pipeline.get(err.analysis_id().unwrap()).unwrap();
        assert_eq!(record.analysis.status, AnalysisStatus::Failed);
        assert_eq!(record.analysis.text_length, 9);
    }

    #[tokio::test]
    async fn test_malformed_score_is_not_defaulted() {
        let mut llm = MockProvider::new(SUMMARY);
        llm.add_response("Criterion: Clarity & Readability", "I'd give it about 7/10");
        let pipeline = pipeline(llm);

        let err = pipeline.analyze(&txt("Some text")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert_eq!(err.stage(), Some(Stage::Scoring(Criterion::ClarityReadability)));

        let record = pipeline.get(err.analysis_id().unwrap()).unwrap();
        assert!(record.results.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_classified() {
        let mut llm = MockProvider::new(SUMMARY);
        llm.add_error(
            "Criterion: Accuracy & Reliability",
            LlmError::RateLimit { retry_after: Some(30) },
        );
        for (criterion, score) in Criterion::ALL.iter().zip(SCORES) {
            llm.add_response(format!("Criterion: {}", criterion.name()), score_json(score));
        }
        let pipeline = pipeline(llm);

        let err = pipeline.analyze(&txt("Some text")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert!(err.to_string().contains("30"));
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_model() {
        let llm = scoring_provider();
        let pipeline = pipeline(llm.clone());

        let err = pipeline.analyze(&txt("   \n\t  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert_eq!(err.stage(), Some(Stage::Extracting));
        assert_eq!(llm.call_count(), 0);

        let record = pipeline.get(err.analysis_id().unwrap()).unwrap();
        assert_eq!(record.analysis.status, AnalysisStatus::Failed);
        assert_eq!(record.analysis.text_length, 0);
        assert_eq!(record.analysis.source, "handbook.txt");
    }

    #[tokio::test]
    async fn test_progress_reports_every_stage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = pipeline(scoring_provider())
            .with_progress(move |_, stage| sink.lock().unwrap().push(stage));

        pipeline.analyze(&txt("Some text")).await.unwrap();

        let mut expected = vec![Stage::Pending];
        let mut stage = Stage::Pending;
        while let Some(next) = stage.next() {
            expected.push(next);
            stage = next;
        }
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_progress_ends_in_failed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut llm = MockProvider::new(SUMMARY);
        llm.add_error("Summarize", LlmError::Network("timed out".to_string()));
        let pipeline = pipeline(llm).with_progress(move |_, stage| sink.lock().unwrap().push(stage));

        pipeline.analyze(&txt("Some text")).await.unwrap_err();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Stage::Pending, Stage::Extracting, Stage::Summarizing, Stage::Failed]
        );
    }

    #[tokio::test]
    async fn test_stats_over_history() {
        let pipeline = pipeline(scoring_provider());
        pipeline.analyze(&txt("First")).await.unwrap();
        pipeline.analyze(&txt("Second")).await.unwrap();
        pipeline.analyze(&txt(" ")).await.unwrap_err();

        let stats = pipeline.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.complete, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.average_overall, Some(75.0));
        // 80, 90 and 100 are green; 70, 60 and 50 are amber; per analysis
        assert_eq!(stats.rankings.green, 6);
        assert_eq!(stats.rankings.amber, 6);
        assert_eq!(stats.rankings.red, 0);
    }

    #[tokio::test]
    async fn test_shared_store_sees_results() {
        let store = Arc::new(Mutex::new(SqliteStore::in_memory().unwrap()));
        let pipeline = Pipeline::with_shared_store(
            scoring_provider(),
            Arc::clone(&store),
            PipelineConfig::default(),
        )
        .unwrap();

        let record = pipeline.analyze(&txt("Shared")).await.unwrap();
        let fetched = store.lock().unwrap().get(record.analysis.id).unwrap();
        assert_eq!(fetched.results.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let pipeline = pipeline(scoring_provider());
        let err = pipeline.get(rankright_domain::AnalysisId::new()).unwrap_err();
        assert!(matches!(err, PipelineError::Store(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.generation.summary_words = 0;

        let result = Pipeline::new(MockProvider::default(), SqliteStore::in_memory().unwrap(), config);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
