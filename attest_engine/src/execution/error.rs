use std::fmt;

/// Missing required fields on an assessment or procedure definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected all Assessment fields to have a value, but got: requirement-id=len({requirement_id}), description=len({description}), applicability=len({applicability}), procedures=len({procedures})")]
    IncompleteAssessment {
        requirement_id: usize,
        description: usize,
        applicability: usize,
        procedures: usize,
    },

    #[error("expected Procedure to have an id and steps, but got: id=len({id}), steps=len({steps})")]
    IncompleteProcedure { id: usize, steps: usize },
}

/// A definition that failed validation, returned together with the partially
/// built value so callers can still inspect or record it.
pub struct Rejected<T> {
    pub error: ValidationError,
    pub value: T,
}

impl<T> Rejected<T> {
    pub fn new(error: ValidationError, value: T) -> Self {
        Self { error, value }
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (ValidationError, T) {
        (self.error, self.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for Rejected<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
