use crate::dispatch::media_type_essence;
use crate::error::ParseError;
use oxrdfio::{JsonLdProfileSet, RdfFormat, RdfParser};
use reqwest::Url;
use sparql_ld_model::{Graph, SourceFormat, TripleRef};
use std::fmt::Debug;
use std::sync::Arc;

/// The input of a [GraphParser].
#[derive(Clone, Copy, Debug)]
pub struct ParseInput<'a> {
    /// The strategy selected by the [FormatDispatcher](crate::FormatDispatcher).
    pub format: SourceFormat,
    /// The identifier of the document, used for resolving relative IRIs.
    pub base_iri: &'a str,
    /// The media type announced with the document body, if any.
    pub content_type: Option<&'a str>,
    /// The raw document.
    pub body: &'a [u8],
}

/// Turns the bytes of a dereferenced document into an RDF graph.
pub trait GraphParser: Debug + Send + Sync {
    fn parse(&self, input: &ParseInput<'_>) -> Result<Graph, ParseError>;
}

/// The default [GraphParser] based on [oxrdfio].
///
/// N-Triples, N3, JSON-LD and the generic serializations (RDF/XML, Turtle, ...) are parsed
/// directly. RDF embedded in HTML is delegated to a plug-in parser; without one, parsing such
/// documents fails with [ParseError::Unsupported].
///
/// Named graphs of JSON-LD documents are merged into the resulting graph.
#[derive(Clone, Debug, Default)]
pub struct OxRdfGraphParser {
    json_ld: Option<Arc<dyn GraphParser>>,
    html: Option<Arc<dyn GraphParser>>,
}

impl OxRdfGraphParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the built-in parser for [SourceFormat::JsonLd].
    #[must_use]
    pub fn with_json_ld(mut self, parser: Arc<dyn GraphParser>) -> Self {
        self.json_ld = Some(parser);
        self
    }

    /// Registers the parser used for [SourceFormat::Html] (e.g., an RDFa processor).
    #[must_use]
    pub fn with_html(mut self, parser: Arc<dyn GraphParser>) -> Self {
        self.html = Some(parser);
        self
    }
}

impl GraphParser for OxRdfGraphParser {
    fn parse(&self, input: &ParseInput<'_>) -> Result<Graph, ParseError> {
        match input.format {
            SourceFormat::NTriples => parse_with(RdfFormat::NTriples, input),
            SourceFormat::N3 => parse_with(RdfFormat::N3, input),
            SourceFormat::Auto => parse_with(detect_format(input), input),
            SourceFormat::JsonLd => match &self.json_ld {
                Some(parser) => parser.parse(input),
                None => parse_with(json_ld(), input),
            },
            SourceFormat::Html => self
                .html
                .as_ref()
                .ok_or(ParseError::Unsupported(SourceFormat::Html))?
                .parse(input),
        }
    }
}

fn json_ld() -> RdfFormat {
    RdfFormat::JsonLd {
        profile: JsonLdProfileSet::empty(),
    }
}

fn parse_with(format: RdfFormat, input: &ParseInput<'_>) -> Result<Graph, ParseError> {
    let parser = RdfParser::from_format(format).with_base_iri(input.base_iri)?;
    let mut graph = Graph::new();
    for quad in parser.for_reader(input.body) {
        let quad = quad?;
        graph.insert(TripleRef::new(&quad.subject, &quad.predicate, &quad.object));
    }
    Ok(graph)
}

/// Media types and extensions that static hosts use for arbitrary text.
const GENERIC_MEDIA_TYPE: &str = "text/plain";
const GENERIC_EXTENSION: &str = "txt";

/// Detects the serialization of a document.
///
/// The announced media type is preferred, then the extension of the URL, and finally the content
/// is sniffed. Plain text announces nothing about the serialization and is skipped.
fn detect_format(input: &ParseInput<'_>) -> RdfFormat {
    if let Some(format) = input
        .content_type
        .map(media_type_essence)
        .filter(|media_type| media_type != GENERIC_MEDIA_TYPE)
        .and_then(|media_type| RdfFormat::from_media_type(&media_type))
    {
        return format;
    }

    if let Some(format) = Url::parse(input.base_iri).ok().and_then(|url| {
        url.path()
            .rsplit_once('.')
            .filter(|(_, extension)| !extension.eq_ignore_ascii_case(GENERIC_EXTENSION))
            .and_then(|(_, extension)| RdfFormat::from_extension(extension))
    }) {
        return format;
    }

    sniff_format(input.body)
}

fn sniff_format(body: &[u8]) -> RdfFormat {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..body.len().min(start + 512)];
    let looks_like_xml = head.starts_with(b"<?xml")
        || head.starts_with(b"<rdf:RDF")
        || head.windows(7).any(|window| window == b"rdf:RDF");
    if looks_like_xml {
        RdfFormat::RdfXml
    } else if head.starts_with(b"{") || head.starts_with(b"[") {
        json_ld()
    } else {
        RdfFormat::Turtle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_ld_model::NamedNodeRef;

    const NTRIPLES: &str = concat!(
        "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n",
        "<http://example.org/alice> <http://xmlns.com/foaf/0.1/knows> <http://example.org/bob> .\n",
    );

    const RDF_XML: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:foaf="http://xmlns.com/foaf/0.1/">
  <rdf:Description rdf:about="http://example.org/alice">
    <foaf:name>Alice</foaf:name>
  </rdf:Description>
</rdf:RDF>"#;

    const TURTLE: &str =
        "@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n<alice> foaf:name \"Alice\" .\n";

    const JSON_LD: &str =
        r#"{"@id": "http://example.org/alice", "http://xmlns.com/foaf/0.1/name": "Alice"}"#;

    fn input<'a>(
        format: SourceFormat,
        content_type: Option<&'a str>,
        body: &'a str,
    ) -> ParseInput<'a> {
        ParseInput {
            format,
            base_iri: "http://example.org/doc",
            content_type,
            body: body.as_bytes(),
        }
    }

    #[test]
    fn parses_n_triples() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(SourceFormat::NTriples, Some("text/html"), NTRIPLES))
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn auto_detects_rdf_xml_from_content() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(SourceFormat::Auto, None, RDF_XML))
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn auto_detects_from_media_type() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(
                SourceFormat::Auto,
                Some("text/turtle; charset=utf-8"),
                TURTLE,
            ))
            .unwrap();
        let alice = NamedNodeRef::new_unchecked("http://example.org/alice");
        assert_eq!(graph.triples_for_subject(alice).count(), 1);
    }

    #[test]
    fn auto_falls_back_to_turtle() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(SourceFormat::Auto, Some("text/plain"), TURTLE))
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn auto_ignores_txt_extension() {
        let graph = OxRdfGraphParser::new()
            .parse(&ParseInput {
                base_iri: "http://example.org/alice.txt",
                ..input(SourceFormat::Auto, None, TURTLE)
            })
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn auto_detects_json_ld_from_content() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(SourceFormat::Auto, Some("text/plain"), JSON_LD))
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn reports_syntax_errors() {
        let result = OxRdfGraphParser::new().parse(&input(
            SourceFormat::NTriples,
            None,
            "this is not n-triples",
        ));
        assert!(matches!(result, Err(ParseError::Syntax(_))));
    }

    #[test]
    fn parses_json_ld() {
        let graph = OxRdfGraphParser::new()
            .parse(&input(SourceFormat::JsonLd, Some("application/ld+json"), JSON_LD))
            .unwrap();
        let alice = NamedNodeRef::new_unchecked("http://example.org/alice");
        assert_eq!(graph.triples_for_subject(alice).count(), 1);
    }

    #[test]
    fn json_ld_plug_in_overrides_built_in_parser() {
        let parser = OxRdfGraphParser::new().with_json_ld(Arc::new(FixedParser));
        let graph = parser
            .parse(&input(SourceFormat::JsonLd, None, JSON_LD))
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn html_requires_plug_in() {
        let result = OxRdfGraphParser::new().parse(&input(SourceFormat::Html, None, "<html/>"));
        assert!(matches!(
            result,
            Err(ParseError::Unsupported(SourceFormat::Html))
        ));
    }

    #[derive(Debug)]
    struct FixedParser;

    impl GraphParser for FixedParser {
        fn parse(&self, input: &ParseInput<'_>) -> Result<Graph, ParseError> {
            let input = ParseInput {
                body: NTRIPLES.as_bytes(),
                ..*input
            };
            parse_with(RdfFormat::NTriples, &input)
        }
    }

    #[test]
    fn html_is_delegated_to_plug_in() {
        let parser = OxRdfGraphParser::new().with_html(Arc::new(FixedParser));
        let graph = parser
            .parse(&input(SourceFormat::Html, Some("text/html"), "<html></html>"))
            .unwrap();
        assert_eq!(graph.len(), 2);
    }
}
