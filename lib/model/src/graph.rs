use crate::{Identifier, SourceFormat};
use oxrdf::Graph;
use std::time::SystemTime;

/// A dereferenced document, parsed into an RDF graph.
///
/// A [FetchedGraph] is immutable once constructed and only lives as long as the query evaluation
/// that fetched it, as the remote document may change between evaluations.
#[derive(Debug)]
pub struct FetchedGraph {
    identifier: Identifier,
    graph: Graph,
    format: SourceFormat,
    content_type: Option<String>,
    fetched_at: SystemTime,
}

impl FetchedGraph {
    /// Creates a new [FetchedGraph] that was fetched just now.
    pub fn new(
        identifier: Identifier,
        graph: Graph,
        format: SourceFormat,
        content_type: Option<String>,
    ) -> Self {
        Self {
            identifier,
            graph,
            format,
            content_type,
            fetched_at: SystemTime::now(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The strategy that was used for parsing the document.
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// The media type announced by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn fetched_at(&self) -> SystemTime {
        self.fetched_at
    }
}
