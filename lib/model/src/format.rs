use std::fmt::{Display, Formatter};

/// The strategy used for turning a dereferenced document into an RDF graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [Notation3](https://w3c.github.io/N3/spec/)
    N3,
    /// [JSON-LD](https://www.w3.org/TR/json-ld/)
    JsonLd,
    /// RDF statements embedded in an HTML page, e.g. [RDFa](https://www.w3.org/TR/rdfa-core/).
    Html,
    /// Lets the parser pick a serialization from the response media type or the content itself.
    Auto,
}

impl SourceFormat {
    /// The `Accept` header value used when fetching a document in this format.
    pub fn accept_header(self) -> &'static str {
        match self {
            SourceFormat::NTriples => "application/n-triples, text/plain;q=0.5",
            SourceFormat::N3 => "text/n3, text/turtle;q=0.8",
            SourceFormat::JsonLd => "application/ld+json, application/json;q=0.9",
            SourceFormat::Html => "text/html, application/xhtml+xml",
            SourceFormat::Auto => {
                "application/rdf+xml, text/turtle;q=0.9, application/n-triples;q=0.8, */*;q=0.1"
            }
        }
    }

    /// A short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::NTriples => "N-Triples",
            SourceFormat::N3 => "N3",
            SourceFormat::JsonLd => "JSON-LD",
            SourceFormat::Html => "HTML",
            SourceFormat::Auto => "auto-detected RDF",
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
