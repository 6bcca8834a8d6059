use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::model::{AggregationResult, League};

/// How long a completed collection cycle is served before recomputation.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(30 * 60);

type CacheKey = (League, usize);

#[derive(Debug, Clone)]
struct StoredEntry {
    value: AggregationResult,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, StoredEntry>,
    in_flight: HashSet<CacheKey>,
}

/// Memoizes complete `(league, limit)` results for a bounded window.
///
/// Single-flight: during a miss at most one computation per key runs;
/// concurrent callers block on the condvar until the leader finishes, then
/// re-check the entry. Staleness is checked lazily on read; there is no
/// eviction thread. When recomputation fails, a previously stored entry is
/// kept and served rather than surfacing the failure to callers who could
/// still be given data.
pub struct ResultCache {
    ttl: Duration,
    inner: Mutex<CacheInner>,
    flight_done: Condvar,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_RESULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(CacheInner::default()),
            flight_done: Condvar::new(),
        }
    }

    pub fn get_or_compute<E>(
        &self,
        league: League,
        limit: usize,
        compute: impl FnOnce() -> Result<AggregationResult, E>,
    ) -> Result<AggregationResult, E> {
        let key = (league, limit);

        let mut inner = self.inner.lock().expect("result cache lock poisoned");
        loop {
            if let Some(entry) = inner.entries.get(&key) {
                if entry.stored_at.elapsed() <= self.ttl {
                    return Ok(entry.value.clone());
                }
            }
            if inner.in_flight.contains(&key) {
                inner = self
                    .flight_done
                    .wait(inner)
                    .expect("result cache lock poisoned");
                continue;
            }
            inner.in_flight.insert(key);
            break;
        }
        drop(inner);

        // This caller is the flight leader; everyone else waits above.
        let outcome = compute();

        let mut inner = self.inner.lock().expect("result cache lock poisoned");
        inner.in_flight.remove(&key);
        let outcome = match outcome {
            Ok(value) => {
                inner.entries.insert(
                    key,
                    StoredEntry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
                Ok(value)
            }
            Err(err) => {
                // Stale-over-unavailable: an expired entry beats no data.
                match inner.entries.get(&key) {
                    Some(entry) => Ok(entry.value.clone()),
                    None => Err(err),
                }
            }
        };
        self.flight_done.notify_all();
        outcome
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(league: League) -> AggregationResult {
        AggregationResult {
            league,
            as_of: "2026-01-01T00:00:00Z".to_string(),
            total_players: 0,
            records: Vec::new(),
            source_errors: Vec::new(),
        }
    }

    #[test]
    fn fresh_entry_skips_recomputation() {
        let cache = ResultCache::new();
        let first = cache
            .get_or_compute(League::Premier, 10, || Ok::<_, ()>(sample(League::Premier)))
            .unwrap();
        let second = cache
            .get_or_compute(League::Premier, 10, || -> Result<_, ()> {
                panic!("should not recompute inside the TTL")
            })
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn different_limits_are_different_keys() {
        let cache = ResultCache::new();
        let mut calls = 0;
        for limit in [10, 20] {
            cache
                .get_or_compute(League::Saudi, limit, || {
                    calls += 1;
                    Ok::<_, ()>(sample(League::Saudi))
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn expired_entry_triggers_recomputation() {
        let cache = ResultCache::with_ttl(Duration::ZERO);
        let mut calls = 0;
        for _ in 0..2 {
            cache
                .get_or_compute(League::Premier, 5, || {
                    calls += 1;
                    Ok::<_, ()>(sample(League::Premier))
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn failed_recomputation_serves_the_stale_entry() {
        let cache = ResultCache::with_ttl(Duration::ZERO);
        let stored = cache
            .get_or_compute(League::Premier, 5, || Ok::<_, &str>(sample(League::Premier)))
            .unwrap();
        let served = cache
            .get_or_compute(League::Premier, 5, || Err::<AggregationResult, _>("down"))
            .unwrap();
        assert_eq!(stored, served);
    }

    #[test]
    fn cold_failure_propagates() {
        let cache = ResultCache::new();
        let err = cache
            .get_or_compute(League::Premier, 5, || Err::<AggregationResult, _>("down"))
            .unwrap_err();
        assert_eq!(err, "down");
    }
}
