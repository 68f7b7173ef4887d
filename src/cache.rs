//! Content-addressed memoization of complete analysis outcomes
//!
//! Entries are keyed by the dataset and the configuration themselves, compared
//! bit for bit, so two calls with equal inputs share one stored outcome and a
//! hash collision can never hand back another input's report. Failures are
//! cached as well; an analysis that failed once fails identically again.

use crate::analysis::analyze_with;
use ssd_core::{CancellationToken, Dataset, Error, ExecutionEngine, ProgressObserver, SsdConfig};
use ssd_report::{AnalysisFailure, SsdReport};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Outcome of one analysis
pub type AnalysisOutcome = std::result::Result<SsdReport, AnalysisFailure>;

/// Cache eviction policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Every call recomputes
    NoCache,
    /// Least recently used eviction
    Lru { max_entries: usize },
    /// Never evict
    Unbounded,
}

/// Cache statistics
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
    pub hit_rate: f64,
}

struct Entry {
    outcome: Arc<AnalysisOutcome>,
    last_access: u64,
}

/// Thread-safe store of analysis outcomes
pub struct AnalysisCache {
    policy: CachePolicy,
    storage: Mutex<HashMap<AnalysisKey, Entry>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    access_counter: AtomicU64,
}

/// Everything that determines an analysis outcome
///
/// Floats compare by bit pattern, matching the `Hash` impls of [`Dataset`]
/// and [`SsdConfig`]: a NaN concentration equals itself and `0.0` differs
/// from `-0.0`.
#[derive(Clone, Debug)]
pub struct AnalysisKey {
    dataset: Dataset,
    config: SsdConfig,
}

impl AnalysisKey {
    pub fn new(dataset: &Dataset, config: &SsdConfig) -> Self {
        Self {
            dataset: dataset.clone(),
            config: config.clone(),
        }
    }
}

impl Hash for AnalysisKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dataset.hash(state);
        self.config.hash(state);
    }
}

impl PartialEq for AnalysisKey {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.dataset.observations(), other.dataset.observations());
        let same_data = a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| {
                x.species_id == y.species_id
                    && x.concentration.to_bits() == y.concentration.to_bits()
                    && x.group_label == y.group_label
            });
        let (c, d) = (&self.config, &other.config);
        same_data
            && c.protection_level.to_bits() == d.protection_level.to_bits()
            && c.mode == d.mode
            && c.bootstrap_iterations == d.bootstrap_iterations
            && c.seed == d.seed
            && c.confidence_level.to_bits() == d.confidence_level.to_bits()
            && c.reliability_threshold.to_bits() == d.reliability_threshold.to_bits()
            && c.species_aggregation == d.species_aggregation
    }
}

impl Eq for AnalysisKey {}

impl AnalysisCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            storage: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            access_counter: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<AnalysisKey, Entry>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Return the stored outcome for `(dataset, config)`, running the
    /// analysis on a miss.
    ///
    /// The lock is not held while analyzing, so concurrent misses on the same
    /// key may both compute; the first stored outcome wins. Cancelled runs
    /// are returned but never stored.
    pub fn get_or_analyze<E: ExecutionEngine>(
        &self,
        dataset: &Dataset,
        config: &SsdConfig,
        engine: &E,
        progress: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Arc<AnalysisOutcome> {
        if self.policy == CachePolicy::NoCache {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Arc::new(analyze_with(dataset, config, engine, progress, cancel));
        }

        let key = AnalysisKey::new(dataset, config);
        if let Some(entry) = self.storage().get_mut(&key) {
            entry.last_access = self.tick();
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(observations = dataset.len(), "analysis cache hit");
            return Arc::clone(&entry.outcome);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = Arc::new(analyze_with(dataset, config, engine, progress, cancel));
        if matches!(&*outcome, Err(f) if matches!(f.error, Error::Cancelled { .. })) {
            return outcome;
        }

        let mut storage = self.storage();
        if let CachePolicy::Lru { max_entries } = self.policy {
            while storage.len() >= max_entries.max(1) && !storage.contains_key(&key) {
                let oldest = storage
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        storage.remove(&k);
                        debug!(observations = k.dataset.len(), "evicted analysis");
                    }
                    None => break,
                }
            }
        }
        let last_access = self.tick();
        let entry = storage.entry(key).or_insert(Entry {
            outcome,
            last_access,
        });
        Arc::clone(&entry.outcome)
    }

    pub fn contains(&self, dataset: &Dataset, config: &SsdConfig) -> bool {
        self.storage().contains_key(&AnalysisKey::new(dataset, config))
    }

    pub fn len(&self) -> usize {
        self.storage().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            entries: self.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(CachePolicy::Lru { max_entries: 64 })
    }
}
