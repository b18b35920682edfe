//! Plain-text report export.

use crate::output::format_timestamp;
use rankright_domain::{prioritized_recommendations, AnalysisRecord, Criterion};

const RULE: &str = "============================================================";

/// Render a stored analysis as a self-contained text report.
pub fn render_report(record: &AnalysisRecord) -> String {
    let analysis = &record.analysis;
    let mut out = Vec::new();

    out.push("RANKRIGHT DOCUMENT QUALITY REPORT".to_string());
    out.push(RULE.to_string());
    out.push(format!("Analysis ID: {}", analysis.id));
    out.push(format!("Source:      {}", analysis.source));
    out.push(format!("Date:        {}", format_timestamp(analysis.created_at)));
    out.push(format!("Status:      {}", analysis.status));
    out.push(format!("Characters:  {}", analysis.text_length));

    if let Some(failure) = &analysis.failure {
        out.push(String::new());
        out.push(format!(
            "The analysis failed while {} ({}).",
            failure.stage, failure.kind
        ));
        out.push(failure.message.clone());
        out.push(String::new());
        return out.join("\n");
    }

    if let Some(score) = analysis.overall_score {
        out.push(format!("Overall:     {}/100", score));
    }

    if let Some(summary) = &analysis.summary {
        out.push(String::new());
        out.push("SUMMARY".to_string());
        out.push(RULE.to_string());
        out.push(summary.trim().to_string());
    }

    if !record.results.is_empty() {
        out.push(String::new());
        out.push("CRITERIA".to_string());
        out.push(RULE.to_string());
        for result in &record.results {
            out.push(String::new());
            out.push(format!(
                "{}: {}/100 ({})",
                result.criterion.name(),
                result.score,
                result.ranking
            ));
            out.push(format!("Justification: {}", result.justification.trim()));
            if !result.key_findings.is_empty() {
                out.push("Key findings:".to_string());
                out.extend(result.key_findings.iter().map(|f| format!("  - {}", f)));
            }
            if !result.recommendation.trim().is_empty() {
                out.push(format!("Recommendation: {}", result.recommendation.trim()));
            }
        }

        let priorities = prioritized_recommendations(&record.results);
        out.push(String::new());
        out.push("PRIORITY IMPROVEMENTS".to_string());
        out.push(RULE.to_string());
        if priorities.is_empty() {
            out.push("Every criterion is ranked Green.".to_string());
        } else {
            out.extend(
                priorities
                    .iter()
                    .enumerate()
                    .map(|(i, line)| format!("{}. {}", i + 1, line)),
            );
        }
    }

    out.push(String::new());
    out.push(format!(
        "Scored against {} criteria. Green 80-100, Amber 50-79, Red 0-49.",
        Criterion::ALL.len()
    ));
    out.push(String::new());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankright_domain::{Analysis, AnalysisStatus, CriterionResult};

    #[test]
    fn test_report_sections() {
        let mut analysis = Analysis::new("guide.docx");
        analysis.status = AnalysisStatus::Complete;
        analysis.overall_score = Some(88);
        analysis.summary = Some("A setup guide.".to_string());
        let results = Criterion::ALL
            .iter()
            .map(|c| CriterionResult::new(*c, 88, "Keep going", "Solid").unwrap())
            .collect();

        let report = render_report(&AnalysisRecord { analysis, results });
        assert!(report.contains("Overall:     88/100"));
        assert!(report.contains("SUMMARY\n"));
        assert!(report.contains("Clarity & Readability: 88/100 (Green)"));
        assert!(report.contains("Every criterion is ranked Green."));
        assert!(!report.contains('\u{1b}'));
    }

    #[test]
    fn test_report_for_failed_analysis() {
        let mut analysis = Analysis::new("empty.pdf");
        analysis.status = AnalysisStatus::Failed;
        analysis.failure = Some(rankright_domain::FailureRecord {
            stage: rankright_domain::Stage::Extracting,
            kind: rankright_domain::ErrorKind::Extraction,
            message: "no text found".to_string(),
        });

        let report = render_report(&AnalysisRecord {
            analysis,
            results: Vec::new(),
        });
        assert!(report.contains("failed while extracting (extraction)"));
        assert!(!report.contains("CRITERIA"));
    }
}
