use crate::cache::FxDashMap;
use crate::error::FetchError;
use sparql_ld_model::{FetchedGraph, Identifier};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The memoized outcome of dereferencing an identifier.
pub type GraphOutcome = Result<Arc<FetchedGraph>, Arc<FetchError>>;

/// Maps identifiers to the graphs of their dereferenced documents.
///
/// The cache is keyed by the original (case-preserving) identifier. Failed fetches are memoized
/// as well, such that an unreachable document is not requested again for every input row.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: FxDashMap<Identifier, Arc<OnceCell<GraphOutcome>>>,
    fetches: AtomicUsize,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the graph of `identifier` if it has been fetched successfully.
    pub fn get(&self, identifier: &Identifier) -> Option<Arc<FetchedGraph>> {
        self.entries
            .get(identifier)
            .and_then(|cell| cell.get().and_then(|outcome| outcome.as_ref().ok().cloned()))
    }

    /// Stores `graph`, replacing any previous entry for its identifier.
    pub fn put(&self, graph: FetchedGraph) -> Arc<FetchedGraph> {
        let identifier = graph.identifier().clone();
        let graph = Arc::new(graph);
        self.entries.insert(
            identifier,
            Arc::new(OnceCell::new_with(Some(Ok(Arc::clone(&graph))))),
        );
        graph
    }

    /// Returns the memoized outcome for `identifier` or runs `fetch` to obtain it.
    ///
    /// Concurrent callers for the same identifier share one invocation of `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, identifier: &Identifier, fetch: F) -> GraphOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedGraph, FetchError>>,
    {
        let cell = Arc::clone(&self.entries.entry(identifier.clone()).or_default());
        cell.get_or_init(|| async move {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            fetch().await.map(Arc::new).map_err(Arc::new)
        })
        .await
        .clone()
    }

    /// The number of fetches that have been started through this cache.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// The number of identifiers with a memoized outcome.
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

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_ld_model::{Graph, SourceFormat};
    use std::future::ready;
    use std::time::Duration;

    fn fetched(identifier: &Identifier) -> FetchedGraph {
        FetchedGraph::new(identifier.clone(), Graph::new(), SourceFormat::NTriples, None)
    }

    #[tokio::test]
    async fn fetches_at_most_once() {
        let cache = GraphCache::new();
        let identifier = Identifier::new_unchecked("http://example.org/data.nt");

        let first = cache
            .get_or_fetch(&identifier, || ready(Ok(fetched(&identifier))))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(&identifier, || ready(Ok(fetched(&identifier))))
            .await
            .unwrap();

        assert_eq!(cache.fetch_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.get(&identifier).is_some());
    }

    #[tokio::test]
    async fn concurrent_fetches_are_shared() {
        let cache = GraphCache::new();
        let identifier = Identifier::new_unchecked("http://example.org/data.nt");

        let fetch = || {
            let graph = fetched(&identifier);
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(graph)
            }
        };
        let (first, second) = tokio::join!(
            cache.get_or_fetch(&identifier, fetch),
            cache.get_or_fetch(&identifier, fetch)
        );

        assert_eq!(cache.fetch_count(), 1);
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }

    #[tokio::test]
    async fn failures_are_memoized() {
        let cache = GraphCache::new();
        let identifier = Identifier::new_unchecked("ftp://example.org/data.nt");
        let fail = || {
            ready(Err(FetchError::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: "unsupported scheme 'ftp'".to_owned(),
            }))
        };

        assert!(cache.get_or_fetch(&identifier, fail).await.is_err());
        assert!(cache.get_or_fetch(&identifier, fail).await.is_err());
        assert_eq!(cache.fetch_count(), 1);
        assert!(cache.get(&identifier).is_none());
    }

    #[tokio::test]
    async fn keys_preserve_case() {
        let cache = GraphCache::new();
        let lower = Identifier::new_unchecked("http://example.org/data.nt");
        let upper = Identifier::new_unchecked("http://example.org/DATA.nt");

        cache.put(fetched(&lower));

        assert!(cache.get(&lower).is_some());
        assert!(cache.get(&upper).is_none());
        assert_eq!(cache.len(), 1);
    }
}
