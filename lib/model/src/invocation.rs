use crate::Identifier;
use spargebra::algebra::GraphPattern;
use std::fmt::{Display, Formatter};

/// Identifies a single federation call within one query evaluation.
///
/// The key is a structured pair of the folded target identifier and the canonical text of the
/// sub-pattern. Keeping both components apart ensures that two different pairs never collide,
/// even if their concatenations are equal (e.g., `("http://a/b", "c")` and `("http://a/bc", "")`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvocationKey {
    target: String,
    pattern: String,
}

impl InvocationKey {
    /// Creates a key for evaluating `pattern` against `target`.
    ///
    /// The canonical text of the pattern is its SPARQL rendering.
    pub fn new(target: &Identifier, pattern: &GraphPattern) -> Self {
        Self::from_parts(target, pattern.to_string())
    }

    /// Creates a key from an already rendered pattern.
    pub fn from_parts(target: &Identifier, pattern: impl Into<String>) -> Self {
        Self {
            target: target.folded().to_owned(),
            pattern: pattern.into(),
        }
    }

    /// The folded target identifier.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The canonical text of the sub-pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Display for InvocationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SERVICE <{}> {{ {} }}", self.target, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{NamedNode, Variable};
    use spargebra::term::TriplePattern;

    fn pattern(predicate: &str) -> GraphPattern {
        GraphPattern::Bgp {
            patterns: vec![TriplePattern {
                subject: Variable::new_unchecked("s").into(),
                predicate: NamedNode::new_unchecked(predicate).into(),
                object: Variable::new_unchecked("o").into(),
            }],
        }
    }

    #[test]
    fn concatenation_does_not_collide() {
        let first = InvocationKey::from_parts(&Identifier::new_unchecked("http://a/b"), "c");
        let second = InvocationKey::from_parts(&Identifier::new_unchecked("http://a/bc"), "");
        assert_ne!(first, second);
    }

    #[test]
    fn target_is_compared_ignoring_case() {
        let p = pattern("http://xmlns.com/foaf/0.1/name");
        let lower = InvocationKey::new(&Identifier::new_unchecked("http://example.org/a"), &p);
        let upper = InvocationKey::new(&Identifier::new_unchecked("http://EXAMPLE.org/a"), &p);
        assert_eq!(lower, upper);
    }

    #[test]
    fn different_patterns_differ() {
        let target = Identifier::new_unchecked("http://example.org/a");
        let name = InvocationKey::new(&target, &pattern("http://xmlns.com/foaf/0.1/name"));
        let knows = InvocationKey::new(&target, &pattern("http://xmlns.com/foaf/0.1/knows"));
        assert_ne!(name, knows);
    }
}
