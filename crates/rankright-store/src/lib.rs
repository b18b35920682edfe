//! RankRight Storage Layer
//!
//! Implements the `AnalysisStore` trait on SQLite.
//!
//! # Architecture
//!
//! - `analyses` holds one row per evaluation run, finalized exactly once
//! - `criteria_results` holds up to six rows per analysis, keyed by criterion
//! - Finalization runs in a single transaction; a failed run keeps no results
//!
//! # Examples
//!
//! ```no_run
//! use rankright_store::SqliteStore;
//!
//! let store = SqliteStore::new("rankright.db").unwrap();
//! // Store is now ready for analysis operations
//! ```

#![warn(missing_docs)]

use rankright_domain::traits::AnalysisStore;
use rankright_domain::{
    Analysis, AnalysisId, AnalysisRecord, AnalysisStatus, Classify, Criterion, CriterionResult,
    ErrorKind, FailureRecord, Finalization, Ranking, Stage,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Analysis not found
    #[error("Analysis not found: {0}")]
    NotFound(AnalysisId),

    /// Analysis already reached a terminal status
    #[error("Analysis {0} is already finalized")]
    AlreadyFinalized(AnalysisId),

    /// Row with the same key already exists
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Completion requested without a full set of criterion results
    #[error("Analysis {id} has {found} of 6 criterion results")]
    Incomplete {
        /// Analysis being finalized
        id: AnalysisId,
        /// Number of results actually stored
        found: usize,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Storage,
        }
    }
}

/// Per-ranking counts over completed analyses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingCounts {
    /// Results ranked Green
    pub green: usize,
    /// Results ranked Amber
    pub amber: usize,
    /// Results ranked Red
    pub red: usize,
}

/// Aggregate figures across the stored history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    /// All analyses regardless of status
    pub total: usize,
    /// Analyses that completed
    pub complete: usize,
    /// Analyses that failed
    pub failed: usize,
    /// Analyses still pending
    pub pending: usize,
    /// Mean overall score over completed analyses
    pub average_overall: Option<f64>,
    /// Mean score per criterion over completed analyses, in criterion order
    pub criterion_averages: Vec<(Criterion, f64)>,
    /// Ranking distribution over completed analyses
    pub rankings: RankingCounts,
}

const ANALYSIS_COLUMNS: &str = "id, source, text_length, created_at, status, overall_score, \
     summary, failure_stage, failure_kind, failure_message";

/// SQLite-based implementation of AnalysisStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks by
/// wrapping it in a mutex, or open one store per thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```
    /// use rankright_store::SqliteStore;
    ///
    /// let store = SqliteStore::new(":memory:").unwrap();
    /// assert_eq!(store.stats().unwrap().total, 0);
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn id_to_bytes(id: AnalysisId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_id(bytes: &[u8]) -> Result<AnalysisId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for AnalysisId, got {}",
                bytes.len()
            ))
        })?;
        Ok(AnalysisId::from_value(u128::from_be_bytes(arr)))
    }

    /// Current status of an analysis, or `NotFound`
    fn status_of(conn: &Connection, id: AnalysisId) -> Result<AnalysisStatus, StoreError> {
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM analyses WHERE id = ?1",
                params![Self::id_to_bytes(id)],
                |row| row.get(0),
            )
            .optional()?;

        let status = status.ok_or(StoreError::NotFound(id))?;
        AnalysisStatus::parse(&status)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown status: {}", status)))
    }

    fn analysis_from_row(row: &Row<'_>) -> rusqlite::Result<Analysis> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| convert_err(0, Type::Blob, e))?;

        let status: String = row.get(4)?;
        let status = AnalysisStatus::parse(&status).ok_or_else(|| {
            convert_err(4, Type::Text, StoreError::InvalidData(format!("status {}", status)))
        })?;

        let overall_score: Option<i64> = row.get(5)?;
        let overall_score = overall_score
            .map(|s| u8::try_from(s).map_err(|e| convert_err(5, Type::Integer, e)))
            .transpose()?;

        let stage: Option<String> = row.get(7)?;
        let kind: Option<String> = row.get(8)?;
        let message: Option<String> = row.get(9)?;
        let failure = match (stage, kind, message) {
            (Some(stage), Some(kind), Some(message)) => Some(FailureRecord {
                stage: Stage::parse(&stage).ok_or_else(|| {
                    convert_err(7, Type::Text, StoreError::InvalidData(format!("stage {}", stage)))
                })?,
                kind: ErrorKind::parse(&kind).ok_or_else(|| {
                    convert_err(8, Type::Text, StoreError::InvalidData(format!("kind {}", kind)))
                })?,
                message,
            }),
            _ => None,
        };

        Ok(Analysis {
            id,
            source: row.get(1)?,
            text_length: row.get::<_, i64>(2)? as usize,
            created_at: row.get::<_, i64>(3)? as u64,
            status,
            overall_score,
            summary: row.get(6)?,
            failure,
        })
    }

    fn result_from_row(row: &Row<'_>) -> rusqlite::Result<CriterionResult> {
        let key: String = row.get(0)?;
        let criterion = Criterion::parse(&key).ok_or_else(|| {
            convert_err(0, Type::Text, StoreError::InvalidData(format!("criterion {}", key)))
        })?;

        let score = u8::try_from(row.get::<_, i64>(1)?)
            .map_err(|e| convert_err(1, Type::Integer, e))?;

        let ranking: String = row.get(2)?;
        let ranking = Ranking::parse(&ranking).ok_or_else(|| {
            convert_err(2, Type::Text, StoreError::InvalidData(format!("ranking {}", ranking)))
        })?;

        let findings: String = row.get(5)?;
        let key_findings: Vec<String> =
            serde_json::from_str(&findings).map_err(|e| convert_err(5, Type::Text, e))?;

        Ok(CriterionResult {
            criterion,
            score,
            ranking,
            recommendation: row.get(3)?,
            justification: row.get(4)?,
            key_findings,
        })
    }

    /// Aggregate counts and averages across the history
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM analyses GROUP BY status")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (status, count) in counts {
            let count = count as usize;
            stats.total += count;
            match AnalysisStatus::parse(&status) {
                Some(AnalysisStatus::Complete) => stats.complete = count,
                Some(AnalysisStatus::Failed) => stats.failed = count,
                Some(AnalysisStatus::Pending) => stats.pending = count,
                None => return Err(StoreError::InvalidData(format!("Unknown status: {}", status))),
            }
        }

        stats.average_overall = self.conn.query_row(
            "SELECT AVG(overall_score) FROM analyses WHERE status = 'complete'",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT r.criterion, AVG(r.score), \
                    SUM(r.ranking = 'green'), SUM(r.ranking = 'amber'), SUM(r.ranking = 'red') \
             FROM criteria_results r JOIN analyses a ON a.id = r.analysis_id \
             WHERE a.status = 'complete' GROUP BY r.criterion",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (key, average, green, amber, red) in rows {
            let criterion = Criterion::parse(&key)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown criterion: {}", key)))?;
            stats.criterion_averages.push((criterion, average));
            stats.rankings.green += green as usize;
            stats.rankings.amber += amber as usize;
            stats.rankings.red += red as usize;
        }
        stats.criterion_averages.sort_by_key(|(c, _)| c.index());

        Ok(stats)
    }

    /// Delete every analysis and result; returns how many analyses were removed
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM criteria_results", [])?;
        let removed = tx.execute("DELETE FROM analyses", [])?;
        tx.commit()?;

        info!(removed, "Cleared analysis history");
        Ok(removed)
    }
}

fn convert_err<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

impl AnalysisStore for SqliteStore {
    type Error = StoreError;

    fn create(&mut self, analysis: &Analysis) -> Result<AnalysisId, Self::Error> {
        let id_bytes = Self::id_to_bytes(analysis.id);

        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM analyses WHERE id = ?1",
                params![&id_bytes],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(format!("analysis {}", analysis.id)));
        }

        self.conn.execute(
            "INSERT INTO analyses (id, source, text_length, created_at, status)
             VALUES (?1, ?2, ?3, ?4, 'pending')",
            params![
                &id_bytes,
                &analysis.source,
                analysis.text_length as i64,
                analysis.created_at as i64,
            ],
        )?;

        debug!(id = %analysis.id, source = %analysis.source, "Created analysis");
        Ok(analysis.id)
    }

    fn append_criterion_result(
        &mut self,
        id: AnalysisId,
        result: &CriterionResult,
    ) -> Result<(), Self::Error> {
        if Self::status_of(&self.conn, id)?.is_final() {
            return Err(StoreError::AlreadyFinalized(id));
        }
        if result.score > 100 {
            return Err(StoreError::InvalidData(format!(
                "score {} out of range [0, 100]",
                result.score
            )));
        }

        let id_bytes = Self::id_to_bytes(id);
        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM criteria_results WHERE analysis_id = ?1 AND criterion = ?2",
                params![&id_bytes, result.criterion.key()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(format!(
                "{} result for analysis {}",
                result.criterion.key(),
                id
            )));
        }

        let findings = serde_json::to_string(&result.key_findings)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO criteria_results
                 (analysis_id, criterion, score, ranking, recommendation, justification, key_findings)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id_bytes,
                result.criterion.key(),
                i64::from(result.score),
                result.ranking.as_str(),
                &result.recommendation,
                &result.justification,
                findings,
            ],
        )?;

        Ok(())
    }

    fn finalize(&mut self, id: AnalysisId, finalization: &Finalization) -> Result<(), Self::Error> {
        let id_bytes = Self::id_to_bytes(id);
        let tx = self.conn.transaction()?;

        if Self::status_of(&tx, id)?.is_final() {
            return Err(StoreError::AlreadyFinalized(id));
        }

        match finalization.status {
            AnalysisStatus::Pending => {
                return Err(StoreError::InvalidData(
                    "cannot finalize an analysis as pending".to_string(),
                ));
            }
            AnalysisStatus::Complete => {
                let found: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM criteria_results WHERE analysis_id = ?1",
                    params![&id_bytes],
                    |row| row.get(0),
                )?;
                if found as usize != Criterion::ALL.len() {
                    return Err(StoreError::Incomplete {
                        id,
                        found: found as usize,
                    });
                }
                if finalization.overall_score.is_none() {
                    return Err(StoreError::InvalidData(
                        "complete analysis needs an overall score".to_string(),
                    ));
                }
            }
            AnalysisStatus::Failed => {
                if finalization.failure.is_none() {
                    return Err(StoreError::InvalidData(
                        "failed analysis needs failure details".to_string(),
                    ));
                }
                tx.execute(
                    "DELETE FROM criteria_results WHERE analysis_id = ?1",
                    params![&id_bytes],
                )?;
            }
        }

        let failure = finalization.failure.as_ref();
        tx.execute(
            "UPDATE analyses SET status = ?1, overall_score = ?2, text_length = ?3, summary = ?4,
                 failure_stage = ?5, failure_kind = ?6, failure_message = ?7
             WHERE id = ?8 AND status = 'pending'",
            params![
                finalization.status.as_str(),
                finalization.overall_score.map(i64::from),
                finalization.text_length as i64,
                finalization.summary.as_deref(),
                failure.map(|f| f.stage.as_str()),
                failure.map(|f| f.kind.as_str()),
                failure.map(|f| f.message.as_str()),
                &id_bytes,
            ],
        )?;
        tx.commit()?;

        debug!(%id, status = %finalization.status, "Finalized analysis");
        Ok(())
    }

    fn get(&self, id: AnalysisId) -> Result<AnalysisRecord, Self::Error> {
        let id_bytes = Self::id_to_bytes(id);

        let analysis = self
            .conn
            .query_row(
                &format!("SELECT {} FROM analyses WHERE id = ?1", ANALYSIS_COLUMNS),
                params![&id_bytes],
                Self::analysis_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;

        let mut stmt = self.conn.prepare(
            "SELECT criterion, score, ranking, recommendation, justification, key_findings
             FROM criteria_results WHERE analysis_id = ?1",
        )?;
        let mut results = stmt
            .query_map(params![&id_bytes], Self::result_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        results.sort_by_key(|r| r.criterion.index());

        Ok(AnalysisRecord { analysis, results })
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Analysis>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM analyses ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2",
            ANALYSIS_COLUMNS
        ))?;

        let analyses = stmt
            .query_map(
                params![limit as i64, offset as i64],
                Self::analysis_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(analyses)
    }
}
