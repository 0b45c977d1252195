use oxiri::{Iri, IriParseError};
use oxrdf::{NamedNode, NamedNodeRef};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// The target of a federation call.
///
/// An [Identifier] keeps two representations of the same IRI:
///
/// - the *original* text, trimmed but otherwise untouched. Every outbound network request and
///   every graph cache lookup uses this form, as IRIs are case-sensitive in general.
/// - the *folded* (lower-case) text. It is only used for membership tests in the endpoint
///   registry and for de-duplicating invocations.
///
/// Equality and hashing use the original text.
#[derive(Clone, Debug, Eq)]
pub struct Identifier {
    original: String,
    folded: String,
}

impl Identifier {
    /// Creates a new [Identifier] after validating that `iri` is an absolute IRI.
    ///
    /// Leading and trailing whitespace is removed before validation.
    pub fn new(iri: impl AsRef<str>) -> Result<Self, IriParseError> {
        let trimmed = iri.as_ref().trim();
        Iri::parse(trimmed)?;
        Ok(Self::new_unchecked(trimmed))
    }

    /// Creates a new [Identifier] without validating `iri`.
    ///
    /// Malformed identifiers are reported once they are dereferenced.
    pub fn new_unchecked(iri: impl AsRef<str>) -> Self {
        let original = iri.as_ref().trim().to_owned();
        let folded = original.to_lowercase();
        Self { original, folded }
    }

    /// Returns the original (case-preserving) text.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns the lower-case text used for membership tests.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Returns whether both identifiers are equal when ignoring case.
    pub fn matches_ignore_case(&self, other: &Identifier) -> bool {
        self.folded == other.folded
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.original.hash(state);
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.original
    }
}

impl From<NamedNode> for Identifier {
    fn from(node: NamedNode) -> Self {
        Self::new_unchecked(node.into_string())
    }
}

impl From<NamedNodeRef<'_>> for Identifier {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self::new_unchecked(node.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_but_preserves_case() {
        let id = Identifier::new("  http://Example.org/Data  ").unwrap();
        assert_eq!(id.as_str(), "http://Example.org/Data");
        assert_eq!(id.folded(), "http://example.org/data");
    }

    #[test]
    fn equality_is_case_sensitive() {
        let lower = Identifier::new("http://example.org/a").unwrap();
        let upper = Identifier::new("http://example.org/A").unwrap();
        assert_ne!(lower, upper);
        assert!(lower.matches_ignore_case(&upper));
    }

    #[test]
    fn rejects_relative_iris() {
        assert!(Identifier::new("data.nt").is_err());
        assert_eq!(Identifier::new_unchecked("data.nt").as_str(), "data.nt");
    }

    #[test]
    fn from_named_node() {
        let node = NamedNode::new_unchecked("http://example.org/Person");
        assert_eq!(Identifier::from(node).as_str(), "http://example.org/Person");
    }
}
