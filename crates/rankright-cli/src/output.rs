//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use rankright_domain::{
    prioritized_recommendations, Analysis, AnalysisRecord, AnalysisStatus, Criterion,
    CriterionResult, Ranking,
};
use rankright_store::StoreStats;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a page of analyses.
    pub fn format_history(&self, analyses: &[Analysis]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = analyses.iter().map(analysis_json).collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Quiet => Ok(analyses
                .iter()
                .map(|a| format!("{}\t{}\t{}", a.id, a.status, score_text(a.overall_score)))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.history_table(analyses)),
        }
    }

    fn history_table(&self, analyses: &[Analysis]) -> String {
        if analyses.is_empty() {
            return self.paint("No analyses found.", Color::Yellow);
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Source", "Created", "Status", "Score", "Characters"]);
        for analysis in analyses {
            builder.push_record([
                analysis.id.to_string(),
                truncate(&analysis.source, 48),
                format_timestamp(analysis.created_at),
                self.status_label(analysis.status),
                self.score_label(analysis.overall_score),
                analysis.text_length.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format one analysis with its results.
    pub fn format_record(&self, record: &AnalysisRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&record_json(record))?),
            OutputFormat::Quiet => Ok(format!(
                "{}\t{}\t{}",
                record.analysis.id,
                record.analysis.status,
                score_text(record.analysis.overall_score)
            )),
            OutputFormat::Table => Ok(self.record_text(record)),
        }
    }

    fn record_text(&self, record: &AnalysisRecord) -> String {
        let analysis = &record.analysis;
        let mut out = Vec::new();

        out.push(self.paint(&format!("Analysis {}", analysis.id), Color::Cyan));
        out.push(format!("Source:     {}", analysis.source));
        out.push(format!("Created:    {}", format_timestamp(analysis.created_at)));
        out.push(format!("Status:     {}", self.status_label(analysis.status)));
        out.push(format!("Characters: {}", analysis.text_length));

        if let Some(failure) = &analysis.failure {
            out.push(String::new());
            out.push(self.error(&format!(
                "Failed while {} ({}): {}",
                failure.stage, failure.kind, failure.message
            )));
            return out.join("\n");
        }

        out.push(format!(
            "Overall:    {}",
            self.score_label(analysis.overall_score)
        ));

        if let Some(summary) = &analysis.summary {
            out.push(String::new());
            out.push(self.paint("Summary", Color::Cyan));
            out.push(summary.clone());
        }

        if !record.results.is_empty() {
            out.push(String::new());
            out.push(self.results_table(&record.results));

            for result in &record.results {
                out.push(String::new());
                out.push(self.paint(result.criterion.name(), Color::Cyan));
                out.push(format!("  {}", result.justification));
                for finding in &result.key_findings {
                    out.push(format!("  - {}", finding));
                }
                if !result.recommendation.trim().is_empty() {
                    out.push(format!("  Recommendation: {}", result.recommendation));
                }
            }

            let priorities = prioritized_recommendations(&record.results);
            if !priorities.is_empty() {
                out.push(String::new());
                out.push(self.paint("Priority improvements", Color::Cyan));
                out.extend(priorities.iter().map(|line| format!("  {}", line)));
            }
        }

        out.join("\n")
    }

    fn results_table(&self, results: &[CriterionResult]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Criterion", "Score", "Ranking"]);
        for result in results {
            builder.push_record([
                result.criterion.name().to_string(),
                result.score.to_string(),
                self.ranking_label(result.ranking),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format aggregate statistics.
    pub fn format_stats(&self, stats: &StoreStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let criteria: Vec<Value> = stats
                    .criterion_averages
                    .iter()
                    .map(|(c, avg)| json!({ "criterion": c.key(), "average": avg }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "total": stats.total,
                    "complete": stats.complete,
                    "failed": stats.failed,
                    "pending": stats.pending,
                    "average_overall": stats.average_overall,
                    "criteria": criteria,
                    "rankings": {
                        "green": stats.rankings.green,
                        "amber": stats.rankings.amber,
                        "red": stats.rankings.red,
                    },
                }))?)
            }
            OutputFormat::Quiet => Ok(stats.total.to_string()),
            OutputFormat::Table => Ok(self.stats_text(stats)),
        }
    }

    fn stats_text(&self, stats: &StoreStats) -> String {
        let mut out = vec![
            format!(
                "Analyses: {} ({} complete, {} failed, {} pending)",
                stats.total, stats.complete, stats.failed, stats.pending
            ),
            format!(
                "Average overall score: {}",
                stats
                    .average_overall
                    .map(|avg| format!("{:.1}", avg))
                    .unwrap_or_else(|| "-".to_string())
            ),
        ];

        if !stats.criterion_averages.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Criterion", "Average"]);
            for (criterion, average) in &stats.criterion_averages {
                builder.push_record([criterion.name().to_string(), format!("{:.1}", average)]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            out.push(table.to_string());
        }

        out.push(format!(
            "Rankings: {} {}  {} {}  {} {}",
            self.ranking_label(Ranking::Green),
            stats.rankings.green,
            self.ranking_label(Ranking::Amber),
            stats.rankings.amber,
            self.ranking_label(Ranking::Red),
            stats.rankings.red
        ));
        out.join("\n")
    }

    /// Format the criteria list.
    pub fn format_criteria(&self) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = Criterion::ALL
                    .iter()
                    .map(|c| {
                        let def = c.definition();
                        json!({
                            "key": c.key(),
                            "name": def.name,
                            "description": def.description,
                            "rubric": def.rubric,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Quiet => Ok(Criterion::ALL
                .iter()
                .map(|c| c.key())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut out = Vec::new();
                for (i, criterion) in Criterion::ALL.iter().enumerate() {
                    let def = criterion.definition();
                    if i > 0 {
                        out.push(String::new());
                    }
                    out.push(self.paint(&format!("{}. {}", i + 1, def.name), Color::Cyan));
                    out.push(format!("   {}", def.description));
                    out.push(format!("   Rubric: {}", def.rubric));
                }
                out.push(String::new());
                out.push(format!(
                    "Rankings: Green {}-100, Amber {}-{}, Red 0-{}",
                    Ranking::GREEN_THRESHOLD,
                    Ranking::AMBER_THRESHOLD,
                    Ranking::GREEN_THRESHOLD - 1,
                    Ranking::AMBER_THRESHOLD - 1
                ));
                Ok(out.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.paint(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.paint(&format!("✗ {}", message), Color::Red)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.paint(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.paint(&format!("⚠ {}", message), Color::Yellow)
    }

    /// Format a progress line, dimmed when color is on.
    pub fn progress(&self, message: &str) -> String {
        if self.color_enabled {
            message.dimmed().to_string()
        } else {
            message.to_string()
        }
    }

    fn status_label(&self, status: AnalysisStatus) -> String {
        let color = match status {
            AnalysisStatus::Complete => Color::Green,
            AnalysisStatus::Failed => Color::Red,
            AnalysisStatus::Pending => Color::Yellow,
        };
        self.paint(status.as_str(), color)
    }

    fn score_label(&self, score: Option<u8>) -> String {
        match score {
            Some(score) => self.paint(&score.to_string(), ranking_color(Ranking::from_score(score))),
            None => "-".to_string(),
        }
    }

    fn ranking_label(&self, ranking: Ranking) -> String {
        self.paint(&ranking.to_string(), ranking_color(ranking))
    }

    /// Colorize text if color is enabled.
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn ranking_color(ranking: Ranking) -> Color {
    match ranking {
        Ranking::Green => Color::Green,
        Ranking::Amber => Color::Yellow,
        Ranking::Red => Color::Red,
    }
}

fn score_text(score: Option<u8>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Render epoch milliseconds as local time.
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn analysis_json(analysis: &Analysis) -> Value {
    json!({
        "id": analysis.id.to_string(),
        "source": analysis.source,
        "created_at": analysis.created_at,
        "status": analysis.status.as_str(),
        "overall_score": analysis.overall_score,
        "text_length": analysis.text_length,
        "summary": analysis.summary,
        "failure": analysis.failure.as_ref().map(|f| json!({
            "stage": f.stage.as_str(),
            "kind": f.kind.as_str(),
            "message": f.message,
        })),
    })
}

fn record_json(record: &AnalysisRecord) -> Value {
    let results: Vec<Value> = record
        .results
        .iter()
        .map(|r| {
            json!({
                "criterion": r.criterion.key(),
                "name": r.criterion.name(),
                "score": r.score,
                "ranking": r.ranking.as_str(),
                "justification": r.justification,
                "key_findings": r.key_findings,
                "recommendation": r.recommendation,
            })
        })
        .collect();

    let mut value = analysis_json(&record.analysis);
    value["results"] = Value::Array(results);
    value
}
