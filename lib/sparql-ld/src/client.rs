//! A small [SPARQL 1.1 Protocol](https://www.w3.org/TR/sparql11-protocol/) client.
//!
//! The client is used for probing whether a target is an endpoint. Hosts may also use it to
//! implement [ServiceEvaluator::execute_remote](crate::ServiceEvaluator::execute_remote).

use crate::dispatch::media_type_essence;
use crate::error::SparqlClientError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};
use sparql_ld_model::{BindingSet, GraphPattern, Identifier, Variable};
use spargebra::Query;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const RESULTS_ACCEPT: &str = concat!(
    "application/sparql-results+json, application/sparql-results+xml;q=0.9, ",
    "text/tab-separated-values;q=0.8, text/csv;q=0.5",
);

/// Executes queries against remote SPARQL endpoints using `GET` requests.
#[derive(Clone, Debug)]
pub struct SparqlClient {
    http: reqwest::Client,
}

impl SparqlClient {
    /// Creates a new [SparqlClient] that shares the given HTTP client (and its connection pool).
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Executes an `ASK` query and returns its answer.
    ///
    /// If `timeout` is set, it overrides the timeout of the HTTP client for this request.
    pub async fn ask(
        &self,
        endpoint: &Identifier,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<bool, SparqlClientError> {
        match self.execute(endpoint, query, timeout).await? {
            ReaderQueryResultsParserOutput::Boolean(value) => Ok(value),
            ReaderQueryResultsParserOutput::Solutions(_) => {
                Err(SparqlClientError::UnexpectedResults {
                    endpoint: endpoint.to_string(),
                })
            }
        }
    }

    /// Evaluates `pattern` on the endpoint as `SELECT * WHERE { pattern }`.
    pub async fn select(
        &self,
        endpoint: &Identifier,
        pattern: &GraphPattern,
    ) -> Result<BindingSet, SparqlClientError> {
        let query = Query::Select {
            dataset: None,
            pattern: pattern.clone(),
            base_iri: None,
        };
        let ReaderQueryResultsParserOutput::Solutions(solutions) =
            self.execute(endpoint, &query.to_string(), None).await?
        else {
            return Err(SparqlClientError::UnexpectedResults {
                endpoint: endpoint.to_string(),
            });
        };

        let variables: Arc<[Variable]> = Arc::from(solutions.variables());
        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|source| SparqlClientError::Results {
                endpoint: endpoint.to_string(),
                source,
            })?;
            rows.push(solution.values().to_vec());
        }

        BindingSet::try_new(variables, rows).map_err(|_| SparqlClientError::UnexpectedResults {
            endpoint: endpoint.to_string(),
        })
    }

    async fn execute(
        &self,
        endpoint: &Identifier,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<ReaderQueryResultsParserOutput<std::io::Cursor<Vec<u8>>>, SparqlClientError> {
        let mut url = endpoint_url(endpoint)?;
        url.query_pairs_mut().append_pair("query", query);

        let mut request = self.http.get(url).header(ACCEPT, RESULTS_ACCEPT);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport_error(endpoint, source))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SparqlClientError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(media_type_essence)
            .unwrap_or_default();
        let Some(format) = QueryResultsFormat::from_media_type(&content_type) else {
            return Err(SparqlClientError::UnsupportedContentType {
                endpoint: endpoint.to_string(),
                content_type,
            });
        };
        debug!(endpoint = %endpoint, ?format, "Received SPARQL results");

        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(endpoint, source))?;
        QueryResultsParser::from_format(format)
            .for_reader(std::io::Cursor::new(body.to_vec()))
            .map_err(|source| SparqlClientError::Results {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

fn endpoint_url(endpoint: &Identifier) -> Result<Url, SparqlClientError> {
    let url = Url::parse(endpoint.as_str()).map_err(|err| SparqlClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SparqlClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn transport_error(endpoint: &Identifier, source: reqwest::Error) -> SparqlClientError {
    if source.is_timeout() {
        SparqlClientError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        SparqlClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}
