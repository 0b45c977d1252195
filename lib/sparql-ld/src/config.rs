use std::time::Duration;

/// The file that holds the known endpoints if no other path is configured.
pub const DEFAULT_REGISTRY_FILE: &str = "endpoints.lst";
/// The timeout for fetching documents and executing remote queries.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
/// The timeout for establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// The timeout for classifying a target with an `ASK` probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// The media type that is requested when discovering the content type of a document.
pub const NEGOTIATION_ACCEPT: &str = "application/rdf+xml";

/// Decides what happens if a federation call against a document or an endpoint fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The failure is logged and the federation call produces no bindings.
    #[default]
    Lenient,
    /// The failure is returned to the host evaluator, which usually aborts the query.
    Strict,
}

/// Holds the configuration of a [ServiceResolver](crate::ServiceResolver).
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// The timeout of a single document fetch or remote query.
    pub request_timeout: Duration,
    /// The timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// The timeout of an endpoint probe.
    pub probe_timeout: Duration,
    /// The `Accept` header sent with the content-type discovery request.
    pub negotiation_accept: String,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
    /// How failures of a single federation call are handled.
    pub failure_policy: FailurePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout: HTTP_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            negotiation_accept: NEGOTIATION_ACCEPT.to_owned(),
            user_agent: concat!("sparql-ld/", env!("CARGO_PKG_VERSION")).to_owned(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_negotiation_accept(mut self, accept: impl Into<String>) -> Self {
        self.negotiation_accept = accept.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Makes failing federation calls abort the query instead of producing no bindings.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.failure_policy = FailurePolicy::Strict;
        self
    }
}
