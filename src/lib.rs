//! A symbolic language for finite element variational forms.
//!
//! Expressions are immutable trees of [`Expr`] nodes built from arguments, coefficients,
//! geometric quantities and constants with algebraic, tensor-algebraic, index and
//! differential operators. Multiplying a scalar expression by a [`Measure`] yields a
//! [`Form`], which can be added, scaled, differentiated, adjointed and preprocessed into
//! [`FormData`] for code generation.
//!
//! ```
//! use varform::{coefficient, derivative, dx, grad, inner, test_function, Cell, FiniteElement};
//!
//! let element = FiniteElement::lagrange(Cell::Triangle, 1);
//! let v = test_function(element.clone());
//! let u = coefficient(element);
//! let energy = (&u * &u) * dx(0);
//! let residual = derivative(&energy, &u).unwrap();
//! assert_eq!(residual.rank().unwrap(), 1);
//!
//! let laplace = inner(&grad(&u).unwrap(), &grad(&v).unwrap()).unwrap() * dx(0);
//! assert_eq!(laplace.rank().unwrap(), 1);
//! ```
pub mod algebra;
pub mod algorithms;
pub mod argument;
pub mod cell;
pub mod conditional;
pub mod constant;
pub mod derivative;
pub mod differentiation;
pub mod display;
pub mod element;
pub mod error;
pub mod evaluate;
pub mod expr;
pub mod form;
pub mod formoperators;
pub mod geometry;
pub mod index;
pub mod indexed;
pub mod integral;
pub mod measure;
pub mod operators;
pub mod preprocess;
pub mod repr;
pub mod restriction;
pub mod shape;
pub mod tensoralgebra;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use algebra::{abs, cos, exp, ln, sin, sqrt};
pub use argument::{argument, coefficient, coefficient_with_count, test_function, trial_function};
pub use cell::Cell;
pub use conditional::conditional;
pub use constant::{as_expr, float_value, identity, is_zero, zero, zero_tensor};
pub use differentiation::{div, grad};
pub use display::Repr;
pub use element::FiniteElement;
pub use error::FormError;
pub use evaluate::EvaluationMapping;
pub use expr::{Expr, ExprKind};
pub use form::Form;
pub use formoperators::{action, adjoint, derivative, derivative_in_direction};
pub use geometry::{facet_normal, spatial_coordinate};
pub use index::{indices, Index, MultiIndex};
pub use indexed::{as_matrix, as_tensor, as_vector, component_tensor, index_sum, indexed};
pub use integral::Integral;
pub use measure::{dE, dS, dc, ds, dx, DomainType, Measure};
pub use operators::{skew, sym};
pub use preprocess::{DefaultPreprocessor, FormData, FormPreprocessor, PreprocessOptions};
pub use repr::{parse_expr, parse_form, ReprError};
pub use restriction::{negative_restricted, positive_restricted};
pub use shape::Shape;
pub use tensoralgebra::{dot, inner, outer, trace, transpose};
