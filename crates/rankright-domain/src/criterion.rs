//! Criterion module - the six fixed evaluation dimensions and their results

use std::fmt;

/// One of the six fixed evaluation criteria
///
/// The set is closed and identical for every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Criterion {
    /// Clarity & Readability
    ClarityReadability,
    /// Completeness & Coverage
    CompletenessCoverage,
    /// Accuracy & Reliability
    AccuracyReliability,
    /// Structure & Organization
    StructureOrganization,
    /// Compliance & Standards
    ComplianceStandards,
    /// Actionability & Usefulness
    ActionabilityUsefulness,
}

/// Static description of a criterion, used to build scoring instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriterionDefinition {
    /// Display name
    pub name: &'static str,
    /// What the criterion measures
    pub description: &'static str,
    /// How scores map to quality for this criterion
    pub rubric: &'static str,
}

impl Criterion {
    /// Every criterion, in evaluation order
    pub const ALL: [Criterion; 6] = [
        Criterion::ClarityReadability,
        Criterion::CompletenessCoverage,
        Criterion::AccuracyReliability,
        Criterion::StructureOrganization,
        Criterion::ComplianceStandards,
        Criterion::ActionabilityUsefulness,
    ];

    /// Stable storage key
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::ClarityReadability => "clarity_readability",
            Criterion::CompletenessCoverage => "completeness_coverage",
            Criterion::AccuracyReliability => "accuracy_reliability",
            Criterion::StructureOrganization => "structure_organization",
            Criterion::ComplianceStandards => "compliance_standards",
            Criterion::ActionabilityUsefulness => "actionability_usefulness",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    /// Position in [`Criterion::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Criterion::ClarityReadability => 0,
            Criterion::CompletenessCoverage => 1,
            Criterion::AccuracyReliability => 2,
            Criterion::StructureOrganization => 3,
            Criterion::ComplianceStandards => 4,
            Criterion::ActionabilityUsefulness => 5,
        }
    }

    /// The criterion evaluated after this one
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Parse a criterion from its storage key or display name
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s || c.name().eq_ignore_ascii_case(s))
    }

    /// Static definition: name, description and rubric
    pub fn definition(&self) -> CriterionDefinition {
        match self {
            Criterion::ClarityReadability => CriterionDefinition {
                name: "Clarity & Readability",
                description: "How clear, understandable and accessible the content is to its \
                    intended audience. Consider language complexity, sentence structure, \
                    jargon usage and overall readability, and whether the content \
                    communicates its message without ambiguity.",
                rubric: "80-100: plain, unambiguous language suited to the audience. \
                    50-79: generally understandable with dense or jargon-heavy passages. \
                    0-49: hard to follow, ambiguous or inaccessible to the audience.",
            },
            Criterion::CompletenessCoverage => CriterionDefinition {
                name: "Completeness & Coverage",
                description: "Whether the document thoroughly covers the necessary topics. \
                    Evaluate whether required sections are present, whether key \
                    information is missing, and whether the depth of coverage fits the \
                    document's purpose.",
                rubric: "80-100: all expected topics covered at appropriate depth. \
                    50-79: main topics present, some gaps or shallow sections. \
                    0-49: key sections or information missing.",
            },
            Criterion::AccuracyReliability => CriterionDefinition {
                name: "Accuracy & Reliability",
                description: "Factual accuracy, internal consistency and reliability of the \
                    information. Look for contradictions, outdated information and \
                    unsupported claims, and check that statements are backed by evidence \
                    or sources.",
                rubric: "80-100: consistent, current and supported by evidence. \
                    50-79: mostly sound with some unsupported or dated statements. \
                    0-49: contradictions, errors or largely unsupported claims.",
            },
            Criterion::StructureOrganization => CriterionDefinition {
                name: "Structure & Organization",
                description: "Logical flow, organization and structure. Evaluate heading \
                    hierarchy, paragraph organization, use of lists and tables, and \
                    whether the content follows a sequence that aids comprehension.",
                rubric: "80-100: clear hierarchy and logical progression throughout. \
                    50-79: recognizable structure with some disorganized parts. \
                    0-49: little discernible structure or confusing order.",
            },
            Criterion::ComplianceStandards => CriterionDefinition {
                name: "Compliance & Standards",
                description: "Adherence to relevant standards, regulations, policies or \
                    industry practice. Assess whether the document meets organizational \
                    requirements, follows established guidelines and complies with \
                    applicable regulatory or quality standards.",
                rubric: "80-100: follows applicable standards and guidelines. \
                    50-79: partially aligned, with notable deviations. \
                    0-49: disregards or conflicts with applicable standards.",
            },
            Criterion::ActionabilityUsefulness => CriterionDefinition {
                name: "Actionability & Usefulness",
                description: "How practical and useful the document is for its purpose. \
                    Evaluate whether it provides clear guidance, actionable steps and \
                    practical examples that readers can use to achieve outcomes.",
                rubric: "80-100: readers can act on it directly. \
                    50-79: useful but guidance is incomplete or vague in places. \
                    0-49: offers little a reader can act on.",
            },
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown criterion: {}", s))
    }
}

/// Traffic-light band for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ranking {
    /// 80-100: meets or exceeds expectations
    Green,
    /// 50-79: partially meets expectations
    Amber,
    /// 0-49: does not meet expectations
    Red,
}

impl Ranking {
    /// Lowest score that ranks Green
    pub const GREEN_THRESHOLD: u8 = 80;
    /// Lowest score that ranks Amber
    pub const AMBER_THRESHOLD: u8 = 50;

    /// Band a 0-100 score
    pub fn from_score(score: u8) -> Self {
        if score >= Self::GREEN_THRESHOLD {
            Ranking::Green
        } else if score >= Self::AMBER_THRESHOLD {
            Ranking::Amber
        } else {
            Ranking::Red
        }
    }

    /// Get the ranking name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Ranking::Green => "green",
            Ranking::Amber => "amber",
            Ranking::Red => "red",
        }
    }

    /// Parse a ranking from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "green" => Some(Ranking::Green),
            "amber" => Some(Ranking::Amber),
            "red" => Some(Ranking::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Ranking::Green => "Green",
            Ranking::Amber => "Amber",
            Ranking::Red => "Red",
        };
        f.write_str(label)
    }
}

/// Score and guidance produced for one criterion within one analysis
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionResult {
    /// Which criterion was scored
    pub criterion: Criterion,

    /// Score in [0, 100]
    pub score: u8,

    /// Band derived from the score
    pub ranking: Ranking,

    /// What to change to improve the score
    pub recommendation: String,

    /// Why the score was given
    pub justification: String,

    /// Notable observations behind the score
    pub key_findings: Vec<String>,
}

impl CriterionResult {
    /// Create a result; the ranking is derived from the score
    ///
    /// Returns an error if the score is above 100.
    pub fn new(
        criterion: Criterion,
        score: u8,
        recommendation: impl Into<String>,
        justification: impl Into<String>,
    ) -> Result<Self, String> {
        if score > 100 {
            return Err(format!("score {} out of range [0, 100]", score));
        }

        Ok(Self {
            criterion,
            score,
            ranking: Ranking::from_score(score),
            recommendation: recommendation.into(),
            justification: justification.into(),
            key_findings: Vec::new(),
        })
    }

    /// Attach key findings
    pub fn with_key_findings(mut self, findings: Vec<String>) -> Self {
        self.key_findings = findings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_distinct_criteria() {
        let keys: std::collections::HashSet<_> = Criterion::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), 6);
        for (idx, criterion) in Criterion::ALL.iter().enumerate() {
            assert_eq!(criterion.index(), idx);
        }
    }

    #[test]
    fn test_parse_by_key_and_name() {
        assert_eq!(
            Criterion::parse("structure_organization"),
            Some(Criterion::StructureOrganization)
        );
        assert_eq!(
            Criterion::parse("clarity & readability"),
            Some(Criterion::ClarityReadability)
        );
        assert!("Brevity".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_next_criterion() {
        assert_eq!(
            Criterion::ClarityReadability.next(),
            Some(Criterion::CompletenessCoverage)
        );
        assert_eq!(Criterion::ActionabilityUsefulness.next(), None);
    }

    #[test]
    fn test_definitions_are_populated() {
        for criterion in Criterion::ALL {
            let def = criterion.definition();
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.rubric.contains("80-100"));
        }
    }

    #[test]
    fn test_ranking_bands() {
        assert_eq!(Ranking::from_score(100), Ranking::Green);
        assert_eq!(Ranking::from_score(80), Ranking::Green);
        assert_eq!(Ranking::from_score(79), Ranking::Amber);
        assert_eq!(Ranking::from_score(50), Ranking::Amber);
        assert_eq!(Ranking::from_score(49), Ranking::Red);
        assert_eq!(Ranking::from_score(0), Ranking::Red);
        assert_eq!(Ranking::parse("AMBER"), Some(Ranking::Amber));
    }

    #[test]
    fn test_result_rejects_out_of_range_score() {
        assert!(CriterionResult::new(Criterion::ClarityReadability, 101, "r", "j").is_err());

        let result = CriterionResult::new(Criterion::ClarityReadability, 42, "r", "j").unwrap();
        assert_eq!(result.ranking, Ranking::Red);
        assert!(result.key_findings.is_empty());
    }
}
