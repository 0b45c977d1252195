use oxrdfio::RdfParseError;
use reqwest::StatusCode;
use sparesults::QueryResultsParseError;
use sparql_ld_model::{IriParseError, SourceFormat};
use std::error::Error;
use std::sync::Arc;

/// An error returned by a [ServiceEvaluator](crate::ServiceEvaluator).
pub type EvaluationFailure = Box<dyn Error + Send + Sync + 'static>;

/// An error raised while constructing a [ServiceResolver](crate::ServiceResolver).
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("Could not build the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// An error raised while turning the bytes of a document into a graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The document does not conform to the selected serialization.
    #[error(transparent)]
    Syntax(#[from] RdfParseError),
    /// The identifier cannot be used as base IRI.
    #[error("Invalid base IRI: {0}")]
    InvalidBaseIri(#[from] IriParseError),
    /// No parser has been registered for the format.
    #[error("No parser is available for {0}")]
    Unsupported(SourceFormat),
    /// An error raised by a plug-in parser.
    #[error("{0}")]
    Other(#[source] Box<dyn Error + Send + Sync + 'static>),
}

/// The kind of a [FetchError], used for structured logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    InvalidIdentifier,
    Unreachable,
    ParseFailed,
}

/// An error raised while dereferencing a document.
///
/// None of these errors are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The identifier is not an absolute HTTP(S) URL.
    #[error("'{identifier}' is not a dereferenceable URL: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },
    /// The document could not be retrieved, either due to a transport failure or an HTTP error.
    #[error("Could not retrieve '{identifier}': {source}")]
    Unreachable {
        identifier: String,
        #[source]
        source: reqwest::Error,
    },
    /// The document was retrieved but could not be parsed.
    #[error("Could not parse '{identifier}' as {format}: {source}")]
    ParseFailed {
        identifier: String,
        format: SourceFormat,
        #[source]
        source: ParseError,
    },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidIdentifier { .. } => FetchErrorKind::InvalidIdentifier,
            FetchError::Unreachable { .. } => FetchErrorKind::Unreachable,
            FetchError::ParseFailed { .. } => FetchErrorKind::ParseFailed,
        }
    }

    /// The identifier that was dereferenced.
    pub fn identifier(&self) -> &str {
        match self {
            FetchError::InvalidIdentifier { identifier, .. }
            | FetchError::Unreachable { identifier, .. }
            | FetchError::ParseFailed { identifier, .. } => identifier,
        }
    }
}

/// An error raised by the [SparqlClient](crate::SparqlClient).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SparqlClientError {
    #[error("'{endpoint}' is not a valid endpoint URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("The request to '{endpoint}' timed out")]
    Timeout { endpoint: String },
    #[error("Could not reach '{endpoint}': {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{endpoint}' answered with HTTP status {status}")]
    Status {
        endpoint: String,
        status: StatusCode,
    },
    #[error("'{endpoint}' answered with '{content_type}', not a SPARQL results format")]
    UnsupportedContentType {
        endpoint: String,
        content_type: String,
    },
    #[error("Invalid query results from '{endpoint}': {source}")]
    Results {
        endpoint: String,
        #[source]
        source: QueryResultsParseError,
    },
    #[error("'{endpoint}' did not answer with the expected kind of results")]
    UnexpectedResults { endpoint: String },
}

impl SparqlClientError {
    /// Returns whether the server answered, but not like a SPARQL endpoint would.
    ///
    /// Errors that are not conclusive (timeouts, transport errors, ...) do not tell anything
    /// about the nature of the target.
    pub fn is_conclusive(&self) -> bool {
        matches!(
            self,
            SparqlClientError::Status { .. }
                | SparqlClientError::UnsupportedContentType { .. }
                | SparqlClientError::Results { .. }
                | SparqlClientError::UnexpectedResults { .. }
        )
    }
}

/// An error raised while resolving a single federation call.
///
/// These errors only reach the host evaluator if the resolver runs with
/// [FailurePolicy::Strict](crate::FailurePolicy::Strict).
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The target was classified as a document but could not be dereferenced.
    #[error(transparent)]
    Fetch(Arc<FetchError>),
    /// The target was classified as an endpoint but the remote query failed.
    #[error("Remote query against '{endpoint}' failed: {source}")]
    RemoteQueryFailed {
        endpoint: String,
        #[source]
        source: EvaluationFailure,
    },
    /// The document was fetched but evaluating the pattern against it failed.
    #[error("Query against the document '{identifier}' failed: {source}")]
    LocalQueryFailed {
        identifier: String,
        #[source]
        source: EvaluationFailure,
    },
}

impl ResolveError {
    /// A short name of the failure, used for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Fetch(err) => match err.kind() {
                FetchErrorKind::InvalidIdentifier => "invalid_identifier",
                FetchErrorKind::Unreachable => "unreachable",
                FetchErrorKind::ParseFailed => "parse_failed",
            },
            ResolveError::RemoteQueryFailed { .. } => "remote_query_failed",
            ResolveError::LocalQueryFailed { .. } => "local_query_failed",
        }
    }
}
