use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

/// The tensor shape of an expression.
///
/// The rank of the tensor is the number of dimensions. A scalar has the empty shape `()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// The total number of scalar components of a tensor with this shape.
    pub fn num_components(&self) -> usize {
        self.0.iter().product()
    }

    /// Returns the shape obtained by appending the dimensions of `other` to this shape.
    pub fn concat(&self, other: &Shape) -> Shape {
        Shape(self.0.iter().chain(other.0.iter()).copied().collect())
    }

    /// Returns the shape with an additional trailing dimension.
    pub fn with_trailing(&self, dim: usize) -> Shape {
        let mut dims = self.0.clone();
        dims.push(dim);
        Shape(dims)
    }

    /// Enumerates every component of a tensor with this shape in row-major order.
    ///
    /// A scalar shape has exactly one component, the empty one.
    pub fn components(&self) -> Vec<Vec<usize>> {
        if self.0.is_empty() {
            vec![Vec::new()]
        } else {
            self.0
                .iter()
                .map(|&dim| 0..dim)
                .multi_cartesian_product()
                .collect()
        }
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

/// Formats the shape as a tuple, e.g. `()`, `(3,)` or `(2, 2)`.
impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "()"),
            [dim] => write!(f, "({dim},)"),
            dims => write!(f, "({})", dims.iter().join(", ")),
        }
    }
}
