//! Configuration for the evaluation pipeline

use rankright_extractor::ExtractorConfig;
use rankright_llm::GenerationConfig;
use serde::{Deserialize, Serialize};

/// Settings for every stage of an analysis
///
/// Serialized as TOML with one table per stage:
///
/// ```toml
/// [generation]
/// summary_words = 300
///
/// [extraction]
/// fetch_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// What the model is asked to produce
    pub generation: GenerationConfig,

    /// How documents and pages are read
    pub extraction: ExtractorConfig,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.generation
            .validate()
            .map_err(|e| format!("generation: {}", e))?;
        self.extraction
            .validate()
            .map_err(|e| format!("extraction: {}", e))?;
        Ok(())
    }
}
