//! RankRight Domain Layer
//!
//! Core model and trait boundaries for document quality scoring. The crate
//! depends on nothing but `uuid`; every I/O concern lives in another crate
//! behind one of the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Analysis**: one evaluation run over one document or URL
//! - **Criterion**: one of six fixed evaluation dimensions
//! - **CriterionResult**: the score, recommendation and justification for one
//!   criterion within one analysis
//! - **Stage**: where an analysis is in the evaluation state machine
//! - **ErrorKind**: the shared failure taxonomy every crate classifies into
//!
//! ## Architecture
//!
//! - Pure data and arithmetic only
//! - Infrastructure implementations (SQLite, HTTP, parsers) live elsewhere
//! - Trait definitions for every external interaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod criterion;
pub mod error;
pub mod score;
pub mod stage;
pub mod traits;

// Re-exports for convenience
pub use analysis::{
    Analysis, AnalysisId, AnalysisRecord, AnalysisStatus, FailureRecord, Finalization,
};
pub use criterion::{Criterion, CriterionDefinition, CriterionResult, Ranking};
pub use error::{Classify, ErrorKind};
pub use score::{overall_score, prioritized_recommendations};
pub use stage::Stage;
