#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod cache;
mod client;
pub mod config;
mod dispatch;
pub mod error;
mod evaluator;
mod fetch;
mod parser;
mod probe;
mod registry;
mod resolver;

pub use cache::{GraphCache, InvocationDedupCache};
pub use client::SparqlClient;
pub use config::{FailurePolicy, ResolverConfig};
pub use dispatch::FormatDispatcher;
pub use error::{
    EvaluationFailure, FetchError, FetchErrorKind, ParseError, ResolveError, ResolverError,
    SparqlClientError,
};
pub use evaluator::ServiceEvaluator;
pub use fetch::ResourceFetcher;
pub use parser::{GraphParser, OxRdfGraphParser, ParseInput};
pub use probe::{Classification, EndpointProbe, ProbeOutcome, PROBE_QUERY};
pub use registry::EndpointRegistry;
pub use resolver::{RequestStats, ServiceRequest, ServiceResolver};

pub mod model {
    pub use sparql_ld_model::*;
}
