//! Form arguments and coefficients.
//!
//! Arguments are the basis functions a form is linear in: the test function has number 0 and
//! the trial function number 1. Coefficients are discrete functions, for example the unknown
//! of a nonlinear problem.
use crate::element::FiniteElement;
use crate::expr::{Expr, ExprKind};
use std::sync::atomic::{AtomicUsize, Ordering};

static COEFFICIENT_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn argument(element: FiniteElement, number: usize) -> Expr {
    let shape = element.value_shape().clone();
    Expr::terminal(ExprKind::Argument { element, number }, shape)
}

pub fn test_function(element: FiniteElement) -> Expr {
    argument(element, 0)
}

pub fn trial_function(element: FiniteElement) -> Expr {
    argument(element, 1)
}

/// Creates a coefficient with a fresh count.
pub fn coefficient(element: FiniteElement) -> Expr {
    let count = COEFFICIENT_COUNTER.fetch_add(1, Ordering::Relaxed);
    coefficient_with_count(element, count)
}

/// Creates the coefficient with the given count.
pub fn coefficient_with_count(element: FiniteElement, count: usize) -> Expr {
    COEFFICIENT_COUNTER.fetch_max(count + 1, Ordering::Relaxed);
    let shape = element.value_shape().clone();
    Expr::terminal(ExprKind::Coefficient { element, count }, shape)
}
