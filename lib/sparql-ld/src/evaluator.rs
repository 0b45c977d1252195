use crate::error::EvaluationFailure;
use async_trait::async_trait;
use sparql_ld_model::{BindingSet, FetchedGraph, GraphPattern, Identifier};

/// The capabilities of the host query engine that the resolver relies on.
///
/// The resolver never evaluates SPARQL itself. It decides *where* a sub-pattern is evaluated and
/// hands the actual evaluation to the host.
#[async_trait]
pub trait ServiceEvaluator: Send + Sync {
    /// Evaluates `pattern` against the SPARQL endpoint `endpoint`.
    ///
    /// [SparqlClient::select](crate::SparqlClient::select) provides a ready-made implementation.
    async fn execute_remote(
        &self,
        pattern: &GraphPattern,
        endpoint: &Identifier,
    ) -> Result<BindingSet, EvaluationFailure>;

    /// Evaluates `pattern` against the graph of a dereferenced document.
    async fn execute_local(
        &self,
        pattern: &GraphPattern,
        graph: &FetchedGraph,
    ) -> Result<BindingSet, EvaluationFailure>;
}
