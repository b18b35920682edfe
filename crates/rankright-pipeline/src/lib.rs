//! RankRight Evaluation Pipeline
//!
//! Drives one analysis from an input source to stored scores.
//!
//! # Overview
//!
//! Each analysis walks a fixed state machine and is persisted as it goes:
//!
//! ```text
//! Pending → Extracting → Summarizing → Scoring(×6) → Aggregating → Complete
//!                 ╲            ╲             ╲             ╲
//!                  └────────────┴─────────────┴─────────────┴──→ Failed
//! ```
//!
//! Every criterion result is appended to the store as soon as it is scored.
//! A failure at any stage finalizes the analysis as failed, and the store
//! drops the partial results in the same transaction.
//!
//! # Example Usage
//!
//! ```no_run
//! use rankright_extractor::Source;
//! use rankright_llm::MockProvider;
//! use rankright_pipeline::{Pipeline, PipelineConfig};
//! use rankright_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"score": 80, "justification": "fine"}"#);
//! let store = SqliteStore::in_memory()?;
//! let pipeline = Pipeline::new(llm, store, PipelineConfig::default())?;
//!
//! let source = Source::from_file("notes.txt", b"Quarterly goals".to_vec(), 1024)?;
//! let record = pipeline.analyze(&source).await?;
//!
//! println!("Overall: {:?}", record.analysis.overall_score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;

#[cfg(test)]
mod tests;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{Pipeline, ProgressFn};
