mod bindings;
mod format;
mod graph;
mod identifier;
mod invocation;

pub use bindings::{BindingSet, BindingSetError};
pub use format::SourceFormat;
pub use graph::FetchedGraph;
pub use identifier::Identifier;
pub use invocation::InvocationKey;

// Re-export some oxrdf types.
pub use oxiri::{Iri, IriParseError};
pub use oxrdf::{
    BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Subject, Term, TermRef, Triple,
    TripleRef, Variable, VariableRef,
};
pub use spargebra::algebra::GraphPattern;
pub use spargebra::term::TriplePattern;
