//! User-facing operators: arithmetic overloads and tensor algebra helpers.
//!
//! The free functions return a `Result`. The operator overloads call them and panic with the
//! error message if the operands are incompatible, in the same way as shape mismatches in
//! `nalgebra` arithmetic panic.
use crate::algebra::{division, neg, power, product, sum};
use crate::error::FormError;
use crate::expr::Expr;
use crate::index::{indices, MultiIndex};
use crate::indexed::{component_tensor, indexed};
use crate::tensoralgebra::{dot, transpose};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Multiplication with the usual meaning for each combination of ranks.
///
/// - scalar times scalar is a [`product`],
/// - scalar times tensor (or tensor times scalar) scales every component,
/// - a matrix times a vector or matrix is the [`dot`] product.
pub fn multiply(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    match (a.is_scalar(), b.is_scalar()) {
        (true, true) => product(a, b),
        (true, false) => scale(a, b),
        (false, true) => scale(b, a),
        (false, false) if a.rank() == 2 && b.rank() >= 1 => dot(a, b),
        (false, false) => Err(FormError::unsupported(format!(
            "invalid ranks {} and {} in product, use inner, outer or dot instead",
            a.rank(),
            b.rank()
        ))),
    }
}

/// The tensor `s * t` for a scalar `s`, expressed componentwise with fresh indices.
fn scale(s: &Expr, t: &Expr) -> Result<Expr, FormError> {
    let ii = MultiIndex::from_indices(&indices(t.rank()));
    let component = product(s, &indexed(t, ii.clone())?)?;
    component_tensor(&component, ii)
}

/// Division by a scalar without free indices. Tensor numerators are divided componentwise.
pub fn divide(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if a.is_scalar() {
        return division(a, b);
    }
    let ii = MultiIndex::from_indices(&indices(a.rank()));
    let component = division(&indexed(a, ii.clone())?, b)?;
    component_tensor(&component, ii)
}

pub fn subtract(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    sum(a, &neg(b))
}

/// The symmetric part of a matrix.
pub fn sym(a: &Expr) -> Result<Expr, FormError> {
    multiply(&Expr::from(0.5), &sum(a, &transpose(a)?)?)
}

/// The skew-symmetric part of a matrix.
pub fn skew(a: &Expr) -> Result<Expr, FormError> {
    multiply(&Expr::from(0.5), &subtract(a, &transpose(a)?)?)
}

fn or_panic(result: Result<Expr, FormError>) -> Expr {
    result.unwrap_or_else(|err| panic!("{err}"))
}

impl Expr {
    /// Indexes the expression, `A[i, j]`.
    pub fn index(&self, multiindex: impl Into<MultiIndex>) -> Result<Expr, FormError> {
        indexed(self, multiindex)
    }

    /// The power `self ** exponent`.
    pub fn pow(&self, exponent: impl Into<Expr>) -> Result<Expr, FormError> {
        power(self, &exponent.into())
    }

    /// The transpose of a matrix.
    pub fn t(&self) -> Result<Expr, FormError> {
        transpose(self)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $function:path) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                or_panic($function(&self, &rhs))
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                or_panic($function(&self, rhs))
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                or_panic($function(self, &rhs))
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                or_panic($function(self, rhs))
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                or_panic($function(&self, &Expr::from(rhs)))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                or_panic($function(self, &Expr::from(rhs)))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                or_panic($function(&Expr::from(self), &rhs))
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                or_panic($function(&Expr::from(self), rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, sum);
impl_binary_op!(Sub, sub, subtract);
impl_binary_op!(Mul, mul, multiply);
impl_binary_op!(Div, div, divide);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        neg(&self)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        neg(self)
    }
}
