//! Gateaux differentiation of expressions.
//!
//! The derivative of an expression `F(w)` with respect to a coefficient `w` in the direction
//! `v` is the expression
//!
//! ```text
//! dF/dw[v] = d/dτ F(w + τ v) at τ = 0.
//! ```
//!
//! It is computed by a single bottom-up pass over the expression DAG. Every node is mapped to
//! its derivative using the derivatives of its operands: linear operators are applied to the
//! derivatives of their operands, while nonlinear operators use the product, quotient and
//! chain rules. Zero derivatives keep the shape and free indices of the differentiated node,
//! so that they can be combined with the derivatives of their siblings.
use crate::algebra::{division, math_function, neg, power, product, sum};
use crate::algorithms::map_expr_dag;
use crate::conditional::conditional;
use crate::constant::{float_value, is_zero, zero_like};
use crate::error::FormError;
use crate::expr::{Expr, ExprKind, MathFunction as Function};
use crate::operators::{multiply, subtract};
use crate::tensoralgebra::{dot, inner, outer};
use log::debug;

/// Differentiates `expr` with respect to the coefficient `w` in the direction `v`.
///
/// The direction must have the same shape as the coefficient. It is usually an argument, in
/// which case the derivative is linear in that argument.
pub fn apply_derivative(expr: &Expr, w: &Expr, v: &Expr) -> Result<Expr, FormError> {
    if !matches!(w.kind(), ExprKind::Coefficient { .. }) {
        return Err(FormError::NotAnUnknown { found: w.to_string() });
    }
    if w.shape() != v.shape() {
        return Err(FormError::shape_mismatch("derivative", w.shape(), v.shape()));
    }
    debug!("Differentiating {} with respect to {} in direction {}", expr.kind().name(), w, v);

    map_expr_dag(expr, |node, derivatives| {
        if node.is_terminal() {
            Ok(if node == w { v.clone() } else { zero_like(node) })
        } else {
            derivative_rule(node, derivatives)
        }
    })
}

fn all_zero(derivatives: &[Expr]) -> bool {
    derivatives.iter().all(is_zero)
}

/// `da * b + a * db` for the bilinear operator `op`.
fn product_rule(
    op: impl Fn(&Expr, &Expr) -> Result<Expr, FormError>,
    a: &Expr,
    b: &Expr,
    da: &Expr,
    db: &Expr,
) -> Result<Expr, FormError> {
    sum(&op(da, b)?, &op(a, db)?)
}

fn derivative_rule(node: &Expr, derivatives: Vec<Expr>) -> Result<Expr, FormError> {
    use ExprKind::*;
    match node.kind() {
        Sum(..)
        | Neg(_)
        | Indexed(..)
        | ComponentTensor(..)
        | IndexSum(..)
        | ListTensor(_)
        | Transposed(_)
        | Trace(_)
        | Grad(_)
        | Div(_)
        | Restricted(..) => {
            if all_zero(&derivatives) {
                Ok(zero_like(node))
            } else {
                node.reconstruct(derivatives)
            }
        }

        // Conditions are piecewise constant
        Condition(..) | And(..) | Or(..) | Not(_) => Ok(zero_like(node)),
        Conditional(c, ..) => {
            let (dt, df) = (&derivatives[1], &derivatives[2]);
            if is_zero(dt) && is_zero(df) {
                Ok(zero_like(node))
            } else {
                conditional(c, dt, df)
            }
        }

        _ if all_zero(&derivatives) => Ok(zero_like(node)),

        Product(a, b) => product_rule(product, a, b, &derivatives[0], &derivatives[1]),
        Inner(a, b) => product_rule(inner, a, b, &derivatives[0], &derivatives[1]),
        Outer(a, b) => product_rule(outer, a, b, &derivatives[0], &derivatives[1]),
        Dot(a, b) => product_rule(dot, a, b, &derivatives[0], &derivatives[1]),

        Division(_, b) => {
            // d(a / b) = (da - (a / b) db) / b
            let (da, db) = (&derivatives[0], &derivatives[1]);
            division(&subtract(da, &multiply(node, db)?)?, b)
        }
        Power(f, g) => {
            let (df, dg) = (&derivatives[0], &derivatives[1]);
            if is_zero(dg) {
                // d(f^g) = g f^(g - 1) df
                let exponent = sum(g, &float_value(-1.0))?;
                product(&product(g, &power(f, &exponent)?)?, df)
            } else {
                // d(f^g) = f^g (dg ln(f) + g df / f)
                let log_term = product(dg, &math_function(Function::Ln, f)?)?;
                let base_term = division(&product(g, df)?, f)?;
                product(node, &sum(&log_term, &base_term)?)
            }
        }
        ExprKind::MathFunction(function, f) => {
            let df = &derivatives[0];
            match function {
                Function::Sqrt => division(df, &product(&float_value(2.0), node)?),
                Function::Exp => product(node, df),
                Function::Ln => division(df, f),
                Function::Sin => product(&math_function(Function::Cos, f)?, df),
                Function::Cos => product(&neg(&math_function(Function::Sin, f)?), df),
                Function::Abs => product(&division(f, node)?, df),
            }
        }

        Zero { .. }
        | FloatValue(_)
        | Identity(_)
        | Argument { .. }
        | Coefficient { .. }
        | SpatialCoordinate(_)
        | FacetNormal(_) => Err(FormError::InvariantBreach(format!(
            "terminal {} reached the operator derivative rules",
            node.kind().name()
        ))),
    }
}
