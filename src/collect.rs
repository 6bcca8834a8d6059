use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::merge::{merge, MergePolicy, ScoreWeights};
use crate::model::{AggregationResult, League, PlayerObservation};
use crate::normalize::normalize_all;
use crate::rank::rank;
use crate::result_cache::ResultCache;
use crate::source::Source;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;

/// The only failures that cross the engine boundary. Record- and
/// source-level errors are absorbed inside a cycle and reported through
/// `AggregationResult::source_errors`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("no data available for league {0}")]
    NoDataAvailable(League),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Drives one collection cycle: fan out to every configured source, absorb
/// individual failures, then normalize, resolve, merge, score and rank.
/// Finished results go through the single-flight cache.
pub struct Collector {
    sources: Vec<Box<dyn Source>>,
    policy: MergePolicy,
    weights: ScoreWeights,
    cache: ResultCache,
}

impl Collector {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        let mut policy = MergePolicy::new();
        for source in &sources {
            policy = policy.with_priority(source.id(), source.priority());
        }
        Self {
            sources,
            policy,
            weights: ScoreWeights::default(),
            cache: ResultCache::new(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ResultCache::with_ttl(ttl);
        self
    }

    /// Aggregate and rank the top `limit` players of `league`, served from
    /// the cache when a fresh cycle already exists.
    pub fn collect(&self, league: League, limit: usize) -> Result<AggregationResult, CollectError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(CollectError::InvalidRequest(format!(
                "limit must be {MIN_LIMIT}..={MAX_LIMIT}, got {limit}"
            )));
        }
        self.cache
            .get_or_compute(league, limit, || self.collect_uncached(league, limit))
    }

    /// Same as [`collect`](Self::collect) but validating a textual league key
    /// first, for callers sitting directly behind a request path.
    pub fn collect_by_key(
        &self,
        league: &str,
        limit: usize,
    ) -> Result<AggregationResult, CollectError> {
        let Some(league) = League::parse(league) else {
            return Err(CollectError::InvalidRequest(format!(
                "unknown league '{}', expected one of: {}",
                league.trim(),
                League::ALL.map(|l| l.key()).join(", ")
            )));
        };
        self.collect(league, limit)
    }

    fn collect_uncached(
        &self,
        league: League,
        limit: usize,
    ) -> Result<AggregationResult, CollectError> {
        // Sources are independent upstreams; fetch them concurrently. Each
        // result is buffered and folded in configuration order afterwards so
        // completion order never leaks into the output.
        let fetched: Vec<_> = with_fetch_pool(|| {
            use rayon::prelude::*;
            self.sources
                .par_iter()
                .map(|source| (source.id().to_string(), source.fetch(league)))
                .collect()
        });

        let mut errors = Vec::new();
        let mut observations: Vec<PlayerObservation> = Vec::new();
        for (source_id, outcome) in fetched {
            match outcome {
                Ok(raws) => {
                    let (obs, dropped) = normalize_all(&source_id, &raws);
                    for malformed in dropped {
                        errors.push(malformed.to_string());
                    }
                    observations.extend(obs);
                }
                Err(err) => errors.push(format!("{source_id} fetch failed: {err}")),
            }
        }

        if observations.is_empty() {
            return Err(CollectError::NoDataAvailable(league));
        }

        let groups = crate::resolve::resolve(observations);
        let total_players = groups.len();
        let records: Vec<_> = groups
            .iter()
            .map(|group| merge(group, &self.policy, &self.weights))
            .collect();

        Ok(AggregationResult {
            league,
            as_of: Utc::now().to_rfc3339(),
            total_players,
            records: rank(records, limit),
            source_errors: errors,
        })
    }
}

fn with_fetch_pool<T: Send>(f: impl FnOnce() -> T + Send) -> T {
    let threads = std::env::var("LIGAPULSE_FETCH_THREADS")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 16);
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(f),
        Err(_) => f(),
    }
}
