#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use sparql_ld::model::{Identifier, NamedNodeRef, SourceFormat};
use sparql_ld::{FetchErrorKind, OxRdfGraphParser, ResourceFetcher};
use std::error::Error;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NEGOTIATION_ACCEPT: &str = "application/rdf+xml";

const JSON_LD: &str = r#"{
  "@id": "http://example.org/alice",
  "http://xmlns.com/foaf/0.1/name": "Alice",
  "http://xmlns.com/foaf/0.1/knows": { "@id": "http://example.org/bob" }
}"#;

const NTRIPLES: &str =
    "<http://example.org/bob> <http://xmlns.com/foaf/0.1/name> \"Bob\" .\n";

fn fetcher() -> ResourceFetcher {
    ResourceFetcher::new(
        reqwest::Client::new(),
        Arc::new(OxRdfGraphParser::new()),
        NEGOTIATION_ACCEPT,
    )
}

#[tokio::test]
async fn test_head_negotiates_json_ld() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/alice"))
        .and(header("accept", NEGOTIATION_ACCEPT))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-type", "application/ld+json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JSON_LD, "application/ld+json"))
        .expect(1)
        .mount(&server)
        .await;

    let identifier = Identifier::new(format!("{}/alice", server.uri()))?;
    let fetched = fetcher().fetch(&identifier).await?;

    assert_eq!(fetched.format(), SourceFormat::JsonLd);
    assert_eq!(fetched.content_type(), Some("application/ld+json"));
    let alice = NamedNodeRef::new_unchecked("http://example.org/alice");
    assert_eq!(fetched.graph().triples_for_subject(alice).count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_rejected_head_uses_get_content_type() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/bob"))
        .and(header("accept", NEGOTIATION_ACCEPT))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bob"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(NTRIPLES, "application/n-triples"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let identifier = Identifier::new(format!("{}/bob", server.uri()))?;
    let fetched = fetcher().fetch(&identifier).await?;

    assert_eq!(fetched.format(), SourceFormat::NTriples);
    assert_eq!(fetched.graph().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_extension_skips_head() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people.jsonld"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JSON_LD, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let identifier = Identifier::new(format!("{}/people.jsonld", server.uri()))?;
    let fetched = fetcher().fetch(&identifier).await?;

    assert_eq!(fetched.format(), SourceFormat::JsonLd);
    assert_eq!(fetched.graph().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unparsable_document_is_reported() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.nt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("this is not rdf", "application/n-triples"),
        )
        .mount(&server)
        .await;

    let identifier = Identifier::new(format!("{}/broken.nt", server.uri()))?;
    let err = fetcher().fetch(&identifier).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::ParseFailed);
    Ok(())
}
