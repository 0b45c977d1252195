use crate::client::SparqlClient;
use crate::error::SparqlClientError;
use sparql_ld_model::Identifier;
use std::time::Duration;
use tracing::debug;

/// The query used for probing. Any boolean answer confirms an endpoint.
pub const PROBE_QUERY: &str = "ASK { ?x ?y ?z }";

/// Whether a federation target is queried remotely or dereferenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Endpoint,
    Resource,
}

/// The result of probing a target, including the reason for the classification.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The target answered the probe with a boolean result.
    Endpoint,
    /// The target answered, but not like a SPARQL endpoint.
    NotAnEndpoint(SparqlClientError),
    /// The probe failed without telling anything about the target (e.g., a timeout).
    Inconclusive(SparqlClientError),
}

impl ProbeOutcome {
    /// Maps the outcome to a [Classification].
    ///
    /// Only a successful probe classifies a target as an endpoint. Everything else is treated as
    /// a resource that is dereferenced instead.
    pub fn classification(&self) -> Classification {
        match self {
            ProbeOutcome::Endpoint => Classification::Endpoint,
            ProbeOutcome::NotAnEndpoint(_) | ProbeOutcome::Inconclusive(_) => {
                Classification::Resource
            }
        }
    }
}

/// Classifies targets by sending a minimal `ASK` query.
///
/// The probe never fails: errors are reported as part of the [ProbeOutcome].
#[derive(Clone, Debug)]
pub struct EndpointProbe {
    client: SparqlClient,
    timeout: Duration,
}

impl EndpointProbe {
    pub fn new(client: SparqlClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn classify(&self, identifier: &Identifier) -> ProbeOutcome {
        let outcome = match self
            .client
            .ask(identifier, PROBE_QUERY, Some(self.timeout))
            .await
        {
            Ok(_) => ProbeOutcome::Endpoint,
            Err(err) if err.is_conclusive() => ProbeOutcome::NotAnEndpoint(err),
            Err(err) => ProbeOutcome::Inconclusive(err),
        };
        debug!(identifier = %identifier, outcome = ?outcome, "Probed target");
        outcome
    }
}
