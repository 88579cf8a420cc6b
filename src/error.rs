//! Errors produced when constructing or transforming expressions and forms.
use crate::shape::Shape;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors returned by expression and form constructors and transformations.
///
/// All errors are raised at construction time. Once an expression has been built, it is
/// guaranteed to be shape- and index-consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// An operand of the wrong kind was passed where a specific kind was required.
    TypeContract {
        operation: &'static str,
        expected: &'static str,
        found: String,
    },
    /// The number of indices does not match the rank of the indexed expression.
    RankMismatch {
        required: usize,
        actual: usize,
        expression: String,
    },
    /// Operand shapes cannot be combined by the operation.
    ShapeMismatch {
        operation: &'static str,
        left: Shape,
        right: Shape,
    },
    /// Operands have incompatible free indices.
    FreeIndexMismatch {
        operation: &'static str,
        left: String,
        right: String,
    },
    /// A fixed index is not within `[0, dimension)`.
    IndexOutOfRange { index: usize, dimension: usize },
    /// A symbolic index occurs more often than Einstein notation permits, or with
    /// inconsistent dimensions.
    RepeatedIndex { index: String, reason: String },
    /// The operation requires a geometric cell, but none could be determined.
    UndefinedCell { operation: &'static str },
    /// Differentiation was requested with respect to something that is not a coefficient.
    NotAnUnknown { found: String },
    /// The form has no arguments left.
    NoArguments,
    /// The form does not have the number of arguments required by the operation.
    ArgumentCount { expected: usize, actual: usize },
    /// The operation is not defined for the given operands.
    UnsupportedOperation(String),
    /// An internal invariant was violated. This always indicates a bug.
    InvariantBreach(String),
    /// An expression could not be evaluated.
    Evaluation(String),
}

impl FormError {
    pub(crate) fn type_contract(operation: &'static str, expected: &'static str, found: impl Display) -> Self {
        Self::TypeContract {
            operation,
            expected,
            found: found.to_string(),
        }
    }

    pub(crate) fn shape_mismatch(operation: &'static str, left: &Shape, right: &Shape) -> Self {
        Self::ShapeMismatch {
            operation,
            left: left.clone(),
            right: right.clone(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation(message.into())
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeContract {
                operation,
                expected,
                found,
            } => write!(f, "{operation}: expecting {expected}, not {found}"),
            Self::RankMismatch {
                required,
                actual,
                expression,
            } => write!(
                f,
                "Invalid number of indices ({actual}) for tensor expression of rank {required}: {expression}"
            ),
            Self::ShapeMismatch { operation, left, right } => {
                write!(f, "{operation}: incompatible shapes {left} and {right}")
            }
            Self::FreeIndexMismatch { operation, left, right } => {
                write!(f, "{operation}: incompatible free indices ({left}) and ({right})")
            }
            Self::IndexOutOfRange { index, dimension } => {
                write!(f, "Fixed index {index} out of range for dimension {dimension}")
            }
            Self::RepeatedIndex { index, reason } => write!(f, "Invalid use of index {index}: {reason}"),
            Self::UndefinedCell { operation } => {
                write!(f, "{operation}: unable to determine a geometric cell for the expression")
            }
            Self::NotAnUnknown { found } => {
                write!(f, "Can only differentiate with respect to a Coefficient, not {found}")
            }
            Self::NoArguments => write!(f, "Form has no arguments left to replace"),
            Self::ArgumentCount { expected, actual } => {
                write!(f, "Expecting a form with {expected} arguments, found {actual}")
            }
            Self::UnsupportedOperation(message) => write!(f, "Unsupported operation: {message}"),
            Self::InvariantBreach(message) => write!(f, "Internal invariant breached: {message}"),
            Self::Evaluation(message) => write!(f, "Evaluation failed: {message}"),
        }
    }
}

impl std::error::Error for FormError {}
