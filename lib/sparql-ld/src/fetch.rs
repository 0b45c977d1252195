use crate::dispatch::FormatDispatcher;
use crate::error::FetchError;
use crate::parser::{GraphParser, ParseInput};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use sparql_ld_model::{FetchedGraph, Identifier, SourceFormat};
use std::sync::Arc;
use tracing::debug;

/// Dereferences identifiers and parses the retrieved documents.
///
/// # Content-type discovery
///
/// If the extension of the identifier determines the format, the document is fetched directly.
/// Otherwise, a `HEAD` request discovers the content type first. This request prefers
/// `application/rdf+xml` (configurable) such that servers with multiple representations return
/// an RDF-friendly one. A failed discovery is not an error, the document is then parsed with
/// [SourceFormat::Auto].
#[derive(Clone, Debug)]
pub struct ResourceFetcher {
    http: reqwest::Client,
    parser: Arc<dyn GraphParser>,
    negotiation_accept: String,
}

impl ResourceFetcher {
    pub fn new(
        http: reqwest::Client,
        parser: Arc<dyn GraphParser>,
        negotiation_accept: impl Into<String>,
    ) -> Self {
        Self {
            http,
            parser,
            negotiation_accept: negotiation_accept.into(),
        }
    }

    /// Fetches and parses the document identified by `identifier`.
    pub async fn fetch(&self, identifier: &Identifier) -> Result<FetchedGraph, FetchError> {
        let url = fetch_url(identifier)?;

        let format = match FormatDispatcher::format_from_extension(identifier) {
            Some(format) => {
                debug!(identifier = %identifier, %format, "Format determined by extension");
                format
            }
            None => {
                let content_type = self.discover_content_type(identifier, url.clone()).await;
                let format = FormatDispatcher::format_from_content_type(&content_type);
                debug!(
                    identifier = %identifier,
                    content_type = %content_type,
                    %format,
                    "Format determined by content type"
                );
                format
            }
        };

        let (content_type, body) = self.fetch_body(identifier, url, format).await?;

        // Servers that do not answer HEAD requests still announce the type of the body.
        let format = match (format, content_type.as_deref()) {
            (SourceFormat::Auto, Some(content_type)) => {
                FormatDispatcher::format_from_content_type(content_type)
            }
            _ => format,
        };

        let graph = self
            .parser
            .parse(&ParseInput {
                format,
                base_iri: identifier.as_str(),
                content_type: content_type.as_deref(),
                body: &body,
            })
            .map_err(|source| FetchError::ParseFailed {
                identifier: identifier.to_string(),
                format,
                source,
            })?;
        debug!(identifier = %identifier, %format, triples = graph.len(), "Fetched document");

        Ok(FetchedGraph::new(
            identifier.clone(),
            graph,
            format,
            content_type,
        ))
    }

    /// Returns the content type announced for `url`, or an empty string.
    async fn discover_content_type(&self, identifier: &Identifier, url: Url) -> String {
        let response = self
            .http
            .head(url)
            .header(ACCEPT, &self.negotiation_accept)
            .send()
            .await;
        match response {
            Ok(response) if response.status().is_success() => {
                content_type(response.headers()).unwrap_or_default()
            }
            Ok(response) => {
                debug!(
                    identifier = %identifier,
                    status = %response.status(),
                    "Content-type discovery was rejected"
                );
                String::new()
            }
            Err(err) => {
                debug!(identifier = %identifier, error = %err, "Content-type discovery failed");
                String::new()
            }
        }
    }

    async fn fetch_body(
        &self,
        identifier: &Identifier,
        url: Url,
        format: SourceFormat,
    ) -> Result<(Option<String>, Vec<u8>), FetchError> {
        let unreachable = |source: reqwest::Error| FetchError::Unreachable {
            identifier: identifier.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(ACCEPT, format.accept_header())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(unreachable)?;
        let content_type = content_type(response.headers());
        let body = response.bytes().await.map_err(unreachable)?;
        Ok((content_type, body.to_vec()))
    }
}

fn fetch_url(identifier: &Identifier) -> Result<Url, FetchError> {
    let url = Url::parse(identifier.as_str()).map_err(|err| FetchError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::parser::OxRdfGraphParser;

    fn fetcher() -> ResourceFetcher {
        ResourceFetcher::new(
            reqwest::Client::new(),
            Arc::new(OxRdfGraphParser::new()),
            "application/rdf+xml",
        )
    }

    #[tokio::test]
    async fn rejects_relative_identifiers() {
        let err = fetcher()
            .fetch(&Identifier::new_unchecked("people/alice.nt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::InvalidIdentifier);
        assert_eq!(err.identifier(), "people/alice.nt");
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let err = fetcher()
            .fetch(&Identifier::new_unchecked("urn:isbn:0451450523"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::InvalidIdentifier);
    }

    #[tokio::test]
    async fn unreachable_host() {
        let err = fetcher()
            .fetch(&Identifier::new_unchecked("http://127.0.0.1:1/data.nt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Unreachable);
    }
}
