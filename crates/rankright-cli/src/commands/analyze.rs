//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rankright_domain::traits::LlmProvider;
use rankright_domain::{AnalysisRecord, Stage};
use rankright_extractor::Source;
use rankright_llm::{AzureOpenAiProvider, GatewayConfig, LlmError};
use rankright_pipeline::Pipeline;
use rankright_store::SqliteStore;
use std::path::Path;

/// Execute the analyze command.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &Config,
    db_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let source = source_from_args(&args, config)?;

    let gateway = GatewayConfig::from_env()?;
    let provider = AzureOpenAiProvider::new(gateway)?;
    let store = SqliteStore::new(db_path)?;

    // Progress goes to stderr and only alongside table output
    let progress = (formatter.format() == OutputFormat::Table).then_some(*formatter);
    let record = run_analysis(provider, store, config, &source, progress).await?;

    println!("{}", formatter.format_record(&record)?);
    Ok(())
}

/// Build the input source from `--file` or `--url`.
pub fn source_from_args(args: &AnalyzeArgs, config: &Config) -> Result<Source> {
    match (&args.file, &args.url) {
        (Some(path), None) => Ok(Source::from_path(
            path,
            config.pipeline.extraction.max_file_bytes,
        )?),
        (None, Some(url)) => Ok(Source::from_url(url)?),
        _ => Err(CliError::InvalidInput(
            "provide exactly one of --file or --url".to_string(),
        )),
    }
}

/// Run one analysis, printing stage progress to stderr through `progress`.
pub async fn run_analysis<L>(
    provider: L,
    store: SqliteStore,
    config: &Config,
    source: &Source,
    progress: Option<Formatter>,
) -> Result<AnalysisRecord>
where
    L: LlmProvider<Error = LlmError> + Sync,
{
    let mut pipeline = Pipeline::new(provider, store, config.pipeline.clone())?;
    if let Some(formatter) = progress {
        eprintln!("Analyzing {} ({})", source.descriptor(), source.kind_label());
        pipeline = pipeline.with_progress(move |_, stage| {
            if let Some(line) = progress_line(stage) {
                eprintln!("{}", formatter.progress(&line));
            }
        });
    }

    Ok(pipeline.analyze(source).await?)
}

/// Progress line for a stage, or nothing for stages not worth showing.
fn progress_line(stage: Stage) -> Option<String> {
    match stage {
        Stage::Pending | Stage::Complete | Stage::Failed => None,
        Stage::Extracting => Some("  extracting text".to_string()),
        Stage::Summarizing => Some("  summarizing".to_string()),
        Stage::Scoring(criterion) => Some(format!(
            "  scoring {} ({}/{})",
            criterion.name(),
            criterion.index() + 1,
            rankright_domain::Criterion::ALL.len()
        )),
        Stage::Aggregating => Some("  aggregating".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankright_domain::traits::AnalysisStore;
    use rankright_domain::{AnalysisStatus, Criterion, ErrorKind};
    use rankright_llm::MockProvider;
    use std::path::PathBuf;

    fn scoring_provider() -> MockProvider {
        let mut llm = MockProvider::new("A brief summary.");
        for criterion in Criterion::ALL {
            llm.add_response(
                format!("Criterion: {}", criterion.name()),
                r#"{"score": 64, "justification": "Adequate", "recommendation": ["Add examples", "Cut jargon"]}"#,
            );
        }
        llm
    }

    #[test]
    fn test_source_from_file_arg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(&path, "Memo").unwrap();

        let args = AnalyzeArgs {
            file: Some(path),
            url: None,
        };
        let source = source_from_args(&args, &Config::default()).unwrap();
        assert_eq!(source.descriptor(), "memo.txt");
    }

    #[test]
    fn test_source_from_file_respects_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(&path, "0123456789").unwrap();

        let mut config = Config::default();
        config.pipeline.extraction.max_file_bytes = 4;
        let args = AnalyzeArgs {
            file: Some(path),
            url: None,
        };
        let err = source_from_args(&args, &config).unwrap_err();
        assert!(matches!(err, CliError::Extract(_)));
    }

    #[test]
    fn test_source_rejects_unsupported_file() {
        let args = AnalyzeArgs {
            file: Some(PathBuf::from("slides.pptx")),
            url: None,
        };
        assert!(source_from_args(&args, &Config::default()).is_err());
    }

    #[tokio::test]
    async fn test_run_analysis_stores_complete_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("scores.db");
        let source = Source::from_file("memo.txt", b"Quarterly plan".to_vec(), 1024).unwrap();

        let record = run_analysis(
            scoring_provider(),
            SqliteStore::new(&db).unwrap(),
            &Config::default(),
            &source,
            None,
        )
        .await
        .unwrap();

        assert_eq!(record.analysis.overall_score, Some(64));
        assert_eq!(record.results[0].recommendation, "Add examples\nCut jargon");

        let reopened = SqliteStore::new(&db).unwrap();
        let stored = reopened.get(record.analysis.id).unwrap();
        assert_eq!(stored.analysis.status, AnalysisStatus::Complete);
    }

    #[tokio::test]
    async fn test_run_analysis_surfaces_failure_kind() {
        let mut llm = MockProvider::new("unused");
        llm.add_error("Summarize", LlmError::Network("HTTP 403 firewall".to_string()));
        let source = Source::from_file("memo.txt", b"Quarterly plan".to_vec(), 1024).unwrap();

        let err = run_analysis(
            llm,
            SqliteStore::in_memory().unwrap(),
            &Config::default(),
            &source,
            None,
        )
        .await
        .unwrap_err();

        use rankright_domain::Classify;
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_progress_follows_formatter_color() {
        // Config asks for color; --no-color turned it off in the formatter
        let mut config = Config::default();
        config.settings.color = true;
        let formatter = Formatter::new(OutputFormat::Table, false);
        let source = Source::from_file("memo.txt", b"Quarterly plan".to_vec(), 1024).unwrap();

        let record = run_analysis(
            scoring_provider(),
            SqliteStore::in_memory().unwrap(),
            &config,
            &source,
            Some(formatter),
        )
        .await
        .unwrap();

        assert_eq!(record.analysis.status, AnalysisStatus::Complete);
        let line = progress_line(Stage::Summarizing).unwrap();
        assert_eq!(formatter.progress(&line), "  summarizing");
    }

    #[test]
    fn test_progress_lines() {
        assert!(progress_line(Stage::Pending).is_none());
        assert_eq!(
            progress_line(Stage::Scoring(Criterion::ComplianceStandards)).as_deref(),
            Some("  scoring Compliance & Standards (5/6)")
        );
    }
}
