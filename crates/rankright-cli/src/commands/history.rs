//! History, show and report command implementations.

use crate::cli::{HistoryArgs, ReportArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::report::render_report;
use rankright_domain::traits::AnalysisStore;
use rankright_domain::AnalysisId;
use rankright_store::SqliteStore;
use std::fs;

/// Execute the history command.
pub fn execute_history(
    args: HistoryArgs,
    default_limit: usize,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let limit = args.limit.unwrap_or(default_limit);
    let analyses = store.list(limit, args.offset)?;
    println!("{}", formatter.format_history(&analyses)?);
    Ok(())
}

/// Execute the show command.
pub fn execute_show(id: &str, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let record = store.get(parse_id(id)?)?;
    println!("{}", formatter.format_record(&record)?);
    Ok(())
}

/// Execute the report command.
pub fn execute_report(args: ReportArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let record = store.get(parse_id(&args.id)?)?;
    let report = render_report(&record);

    match args.output {
        Some(path) => {
            fs::write(&path, report)?;
            println!(
                "{}",
                formatter.success(&format!("Report written to {}", path.display()))
            );
        }
        None => print!("{}", report),
    }
    Ok(())
}

/// Parse an analysis ID given on the command line.
pub fn parse_id(id: &str) -> Result<AnalysisId> {
    AnalysisId::from_string(id.trim())
        .map_err(|e| CliError::InvalidInput(format!("Invalid ID '{}': {}", id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use rankright_domain::Analysis;

    #[test]
    fn test_parse_id() {
        let id = AnalysisId::new();
        assert_eq!(parse_id(&format!(" {} ", id)).unwrap(), id);
        assert!(matches!(parse_id("not-an-id"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_show_unknown_id_is_not_found() {
        use rankright_domain::{Classify, ErrorKind};

        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let err = execute_show(&AnalysisId::new().to_string(), &store, &formatter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_report_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        let mut store = SqliteStore::in_memory().unwrap();
        let analysis = Analysis::new("notes.txt");
        let id = store.create(&analysis).unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ReportArgs {
            id: id.to_string(),
            output: Some(path.clone()),
        };
        execute_report(args, &store, &formatter).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(&id.to_string()));
        assert!(text.contains("notes.txt"));
    }
}
