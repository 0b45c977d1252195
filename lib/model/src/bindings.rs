use oxrdf::{Term, Variable, VariableRef};
use std::sync::Arc;

/// An error raised when a [BindingSet] is built from inconsistent rows.
#[derive(Debug, thiserror::Error)]
pub enum BindingSetError {
    #[error("Row {row} has {actual} values but {expected} variables are declared")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// The solutions produced by a single federation call.
///
/// Each row holds one optional value per variable, in the order of [BindingSet::variables].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSet {
    variables: Arc<[Variable]>,
    rows: Vec<Vec<Option<Term>>>,
}

impl Default for BindingSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl BindingSet {
    /// Creates a [BindingSet] without variables and without solutions.
    ///
    /// This is the result of a federation call whose failure has been absorbed.
    pub fn empty() -> Self {
        Self {
            variables: Arc::from(Vec::new()),
            rows: Vec::new(),
        }
    }

    /// Creates a new [BindingSet], checking that every row matches the number of variables.
    pub fn try_new(
        variables: impl Into<Arc<[Variable]>>,
        rows: Vec<Vec<Option<Term>>>,
    ) -> Result<Self, BindingSetError> {
        let variables = variables.into();
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != variables.len())
        {
            return Err(BindingSetError::RowWidthMismatch {
                row,
                expected: variables.len(),
                actual: values.len(),
            });
        }
        Ok(Self { variables, rows })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows of this set.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Term>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns the value bound to `variable` in the row with the index `row`.
    pub fn get<'a>(&self, row: usize, variable: impl Into<VariableRef<'a>>) -> Option<&Term> {
        let variable = variable.into();
        let column = self
            .variables
            .iter()
            .position(|v| v.as_ref() == variable)?;
        self.rows.get(row)?.get(column)?.as_ref()
    }
}
