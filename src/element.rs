//! Finite element descriptors.
//!
//! An element only carries the information the symbolic layer needs: its family name,
//! the cell it is defined on, its polynomial degree and the shape of the values of
//! functions in the corresponding space. Basis evaluation is the business of the
//! numerical runtime.
use crate::cell::Cell;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// How the value shape of an element was specified.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Scalar,
    Vector,
    Tensor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FiniteElement {
    kind: ElementKind,
    family: String,
    cell: Cell,
    degree: usize,
    value_shape: Shape,
}

impl FiniteElement {
    /// A scalar-valued element.
    pub fn new(family: impl Into<String>, cell: Cell, degree: usize) -> Self {
        Self {
            kind: ElementKind::Scalar,
            family: family.into(),
            cell,
            degree,
            value_shape: Shape::scalar(),
        }
    }

    /// A vector-valued element with `dim` components.
    pub fn vector(family: impl Into<String>, cell: Cell, degree: usize, dim: usize) -> Self {
        Self {
            kind: ElementKind::Vector,
            family: family.into(),
            cell,
            degree,
            value_shape: Shape::from([dim]),
        }
    }

    /// A tensor-valued element with the given value shape.
    pub fn tensor(family: impl Into<String>, cell: Cell, degree: usize, shape: impl Into<Shape>) -> Self {
        Self {
            kind: ElementKind::Tensor,
            family: family.into(),
            cell,
            degree,
            value_shape: shape.into(),
        }
    }

    /// Convenience constructor for the scalar Lagrange element.
    pub fn lagrange(cell: Cell, degree: usize) -> Self {
        Self::new("Lagrange", cell, degree)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn value_shape(&self) -> &Shape {
        &self.value_shape
    }

    /// Returns the same element defined on a different cell.
    pub fn with_cell(&self, cell: Cell) -> Self {
        Self { cell, ..self.clone() }
    }
}

impl Display for FiniteElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ElementKind::Scalar => "",
            ElementKind::Vector => "vector ",
            ElementKind::Tensor => "tensor ",
        };
        write!(
            f,
            "<{}{} degree {} on a {}>",
            prefix, self.family, self.degree, self.cell
        )
    }
}
