use crate::cache::{FxDashMap, GraphCache, InvocationDedupCache};
use crate::client::SparqlClient;
use crate::config::{FailurePolicy, ResolverConfig};
use crate::dispatch::FormatDispatcher;
use crate::error::{ResolveError, ResolverError};
use crate::evaluator::ServiceEvaluator;
use crate::fetch::ResourceFetcher;
use crate::parser::{GraphParser, OxRdfGraphParser};
use crate::probe::{Classification, EndpointProbe, ProbeOutcome};
use crate::registry::EndpointRegistry;
use sparql_ld_model::{BindingSet, GraphPattern, Identifier, InvocationKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Decides how the target of a `SERVICE` clause is evaluated.
///
/// A target is either a SPARQL endpoint, in which case the sub-pattern is sent to it, or a Linked
/// Data document, in which case the document is dereferenced and the sub-pattern is evaluated
/// against its graph. Known endpoints are kept in an [EndpointRegistry] that is shared by all
/// query evaluations.
///
/// The resolver itself holds no per-query state. Call [ServiceResolver::start_request] once per
/// query evaluation and resolve all federation calls of that evaluation through the returned
/// [ServiceRequest].
#[derive(Clone, Debug)]
pub struct ServiceResolver {
    registry: Arc<EndpointRegistry>,
    http: reqwest::Client,
    probe: EndpointProbe,
    fetcher: ResourceFetcher,
    negotiation_accept: String,
    failure_policy: FailurePolicy,
}

impl ServiceResolver {
    /// Creates a new resolver that parses documents with the [OxRdfGraphParser].
    pub fn new(
        config: ResolverConfig,
        registry: Arc<EndpointRegistry>,
    ) -> Result<Self, ResolverError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ResolverError::HttpClient)?;

        Ok(Self {
            registry,
            probe: EndpointProbe::new(SparqlClient::new(http.clone()), config.probe_timeout),
            fetcher: ResourceFetcher::new(
                http.clone(),
                Arc::new(OxRdfGraphParser::new()),
                config.negotiation_accept.clone(),
            ),
            http,
            negotiation_accept: config.negotiation_accept,
            failure_policy: config.failure_policy,
        })
    }

    /// Replaces the parser used for dereferenced documents.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn GraphParser>) -> Self {
        self.fetcher =
            ResourceFetcher::new(self.http.clone(), parser, self.negotiation_accept.clone());
        self
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// A [SparqlClient] that shares the connection pool of this resolver.
    pub fn sparql_client(&self) -> SparqlClient {
        SparqlClient::new(self.http.clone())
    }

    /// Starts the evaluation of a new query.
    pub fn start_request(&self) -> ServiceRequest {
        ServiceRequest {
            resolver: self.clone(),
            graphs: GraphCache::new(),
            invocations: InvocationDedupCache::new(),
            classifications: FxDashMap::default(),
            probes: AtomicUsize::new(0),
            remote_calls: AtomicUsize::new(0),
            local_calls: AtomicUsize::new(0),
        }
    }
}

/// Counters of the work performed by a [ServiceRequest].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// The number of endpoint probes sent.
    pub probes: usize,
    /// The number of documents fetched.
    pub fetches: usize,
    /// The number of sub-patterns sent to endpoints.
    pub remote_calls: usize,
    /// The number of sub-patterns evaluated against fetched documents.
    pub local_calls: usize,
    /// The number of federation calls answered from the deduplication cache.
    pub dedup_hits: usize,
}

/// The federation state of a single query evaluation.
///
/// Fetched documents, probe results and the answers of federation calls are cached for the
/// lifetime of the request. Dropping the request discards them.
#[derive(Debug)]
pub struct ServiceRequest {
    resolver: ServiceResolver,
    graphs: GraphCache,
    invocations: InvocationDedupCache,
    /// Classifications obtained by probing, keyed by the folded identifier.
    classifications: FxDashMap<String, Arc<OnceCell<Classification>>>,
    probes: AtomicUsize,
    remote_calls: AtomicUsize,
    local_calls: AtomicUsize,
}

impl ServiceRequest {
    /// Evaluates `pattern` against `target` and returns the resulting bindings.
    ///
    /// The same pair of target and pattern is evaluated at most once per request. If the
    /// evaluation fails and the resolver is [lenient](FailurePolicy::Lenient), the failure is
    /// logged and an empty binding set is returned and recorded for the rest of the request. Under
    /// [FailurePolicy::Strict] the error is returned and nothing is recorded.
    #[instrument(skip_all, fields(identifier = %target))]
    pub async fn resolve(
        &self,
        target: &Identifier,
        pattern: &GraphPattern,
        evaluator: &dyn ServiceEvaluator,
    ) -> Result<BindingSet, ResolveError> {
        let key = InvocationKey::new(target, pattern);
        if self.invocations.contains_key(&key) {
            debug!(identifier = %target, "Replaying recorded federation call");
        }

        let policy = self.resolver.failure_policy;
        self.invocations
            .get_or_resolve(key, || async move {
                match self.evaluate(target, pattern, evaluator).await {
                    Ok(bindings) => Ok(bindings),
                    Err(err) if policy == FailurePolicy::Lenient => {
                        warn!(
                            identifier = %target,
                            kind = err.kind(),
                            error = %err,
                            "Federation call failed, continuing without bindings"
                        );
                        Ok(BindingSet::empty())
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }

    /// Returns how `target` is evaluated, probing it if necessary.
    pub async fn classify(&self, target: &Identifier) -> Classification {
        if self.resolver.registry.contains(target) {
            debug!(identifier = %target, "Target is a known endpoint");
            return Classification::Endpoint;
        }
        if let Some(format) = FormatDispatcher::format_from_extension(target) {
            debug!(identifier = %target, %format, "Target is a document");
            return Classification::Resource;
        }

        let cell = Arc::clone(
            &self
                .classifications
                .entry(target.folded().to_owned())
                .or_default(),
        );
        *cell
            .get_or_init(|| async move {
                self.probes.fetch_add(1, Ordering::Relaxed);
                let outcome = self.resolver.probe.classify(target).await;
                match &outcome {
                    ProbeOutcome::Endpoint => {
                        if self.resolver.registry.add(target) {
                            info!(identifier = %target, "Discovered SPARQL endpoint");
                        }
                    }
                    ProbeOutcome::NotAnEndpoint(reason) => {
                        debug!(identifier = %target, reason = %reason, "Target is not an endpoint");
                    }
                    ProbeOutcome::Inconclusive(reason) => {
                        debug!(
                            identifier = %target,
                            reason = %reason,
                            "Probe was inconclusive, treating target as a document"
                        );
                    }
                }
                outcome.classification()
            })
            .await
    }

    async fn evaluate(
        &self,
        target: &Identifier,
        pattern: &GraphPattern,
        evaluator: &dyn ServiceEvaluator,
    ) -> Result<BindingSet, ResolveError> {
        match self.classify(target).await {
            Classification::Endpoint => {
                self.remote_calls.fetch_add(1, Ordering::Relaxed);
                evaluator
                    .execute_remote(pattern, target)
                    .await
                    .map_err(|source| ResolveError::RemoteQueryFailed {
                        endpoint: target.to_string(),
                        source,
                    })
            }
            Classification::Resource => {
                let graph = self
                    .graphs
                    .get_or_fetch(target, || self.resolver.fetcher.fetch(target))
                    .await
                    .map_err(ResolveError::Fetch)?;
                self.local_calls.fetch_add(1, Ordering::Relaxed);
                evaluator
                    .execute_local(pattern, &graph)
                    .await
                    .map_err(|source| ResolveError::LocalQueryFailed {
                        identifier: target.to_string(),
                        source,
                    })
            }
        }
    }

    pub fn resolver(&self) -> &ServiceResolver {
        &self.resolver
    }

    /// The documents fetched during this request.
    pub fn graphs(&self) -> &GraphCache {
        &self.graphs
    }

    /// The federation calls recorded during this request.
    pub fn invocations(&self) -> &InvocationDedupCache {
        &self.invocations
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats {
            probes: self.probes.load(Ordering::Relaxed),
            fetches: self.graphs.fetch_count(),
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            local_calls: self.local_calls.load(Ordering::Relaxed),
            dedup_hits: self.invocations.hit_count(),
        }
    }
}
