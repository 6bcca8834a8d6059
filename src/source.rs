use std::collections::HashMap;

use thiserror::Error;

use crate::model::League;

/// Loosely-typed field map as delivered by an adapter, before any
/// vocabulary mapping or numeric coercion.
pub type RawRecord = HashMap<String, String>;

/// Why a source produced nothing this cycle. One failing source never aborts
/// a collection cycle; the orchestrator records the error and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// An external provider of raw player statistics for a league.
///
/// Implementations own their transport and markup concerns entirely; the
/// engine only sees the returned field maps. Fetches for different sources
/// run concurrently, so implementations must be shareable across threads.
pub trait Source: Send + Sync {
    /// Stable identifier, also the key into the normalizer's field-map table.
    fn id(&self) -> &str;

    /// Merge precedence when several sources supply the same metric.
    /// Higher wins; ties go to the most recently normalized observation.
    fn priority(&self) -> u8;

    fn fetch(&self, league: League) -> Result<Vec<RawRecord>, FetchError>;
}
