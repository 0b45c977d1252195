use crate::cache::FxDashMap;
use sparql_ld_model::{BindingSet, GraphPattern, Identifier, InvocationKey};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Remembers the federation calls already performed during one query evaluation.
///
/// A `SERVICE` clause inside a join is evaluated once per input row. As long as the target and the
/// sub-pattern are the same, the answer is the same, so it is computed once and replayed for all
/// further rows.
///
/// Only successful calls are recorded. A failed call may be retried by a later row.
#[derive(Debug, Default)]
pub struct InvocationDedupCache {
    entries: FxDashMap<InvocationKey, Arc<OnceCell<BindingSet>>>,
    hits: AtomicUsize,
}

impl InvocationDedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `pattern` has already been evaluated against `target`.
    pub fn seen(&self, target: &Identifier, pattern: &GraphPattern) -> bool {
        self.contains_key(&InvocationKey::new(target, pattern))
    }

    pub fn contains_key(&self, key: &InvocationKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }

    /// Records the answer of evaluating `pattern` against `target`.
    ///
    /// Recording the same pair twice is a no-op that keeps the first answer.
    pub fn record(&self, target: &Identifier, pattern: &GraphPattern, bindings: BindingSet) {
        let cell = Arc::clone(
            &self
                .entries
                .entry(InvocationKey::new(target, pattern))
                .or_default(),
        );
        // An existing answer wins.
        cell.set(bindings).ok();
    }

    /// Returns the recorded answer of evaluating `pattern` against `target`.
    pub fn get(&self, target: &Identifier, pattern: &GraphPattern) -> Option<BindingSet> {
        self.entries
            .get(&InvocationKey::new(target, pattern))
            .and_then(|cell| cell.get().cloned())
    }

    /// Returns the recorded answer for `key` or runs `resolve` to compute it.
    ///
    /// Concurrent callers with the same key share one invocation of `resolve`. If `resolve` fails,
    /// the error is returned to the caller that ran it and nothing is recorded.
    pub async fn get_or_resolve<F, Fut, E>(
        &self,
        key: InvocationKey,
        resolve: F,
    ) -> Result<BindingSet, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BindingSet, E>>,
    {
        let cell = Arc::clone(&self.entries.entry(key).or_default());
        let resolved = AtomicBool::new(false);
        let bindings = cell
            .get_or_try_init(|| {
                resolved.store(true, Ordering::Relaxed);
                resolve()
            })
            .await?;
        if !resolved.load(Ordering::Relaxed) {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(bindings.clone())
    }

    /// The number of calls answered from the cache.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// The keys of all recorded calls.
    pub fn keys(&self) -> Vec<InvocationKey> {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// The number of recorded calls.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
