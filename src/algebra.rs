//! Scalar algebra: sums, products, division, powers, negation and elementary functions.
use crate::constant::{float_value, indexed_zero, is_zero, zero, zero_like};
use crate::error::FormError;
use crate::expr::{Expr, ExprKind, MathFunction};
use crate::index::{merge_index_dimensions, restrict_index_dimensions, same_index_set, split_free_and_repeated};
use crate::shape::Shape;
use itertools::Itertools;

fn free_index_string(expr: &Expr) -> String {
    expr.free_indices().iter().join(", ")
}

fn require_true_scalar(operation: &'static str, expr: &Expr) -> Result<(), FormError> {
    if expr.is_true_scalar() {
        Ok(())
    } else {
        Err(FormError::type_contract(
            operation,
            "a scalar expression without free indices",
            format!("expression of shape {} with free indices ({})", expr.shape(), free_index_string(expr)),
        ))
    }
}

/// The sum `a + b` of two expressions with the same shape and the same free indices.
///
/// A zero operand is absorbed, and two float constants are folded.
pub fn sum(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if a.shape() != b.shape() {
        return Err(FormError::shape_mismatch("Sum", a.shape(), b.shape()));
    }
    if !same_index_set(a.free_indices(), b.free_indices()) {
        return Err(FormError::FreeIndexMismatch {
            operation: "Sum",
            left: free_index_string(a),
            right: free_index_string(b),
        });
    }

    if is_zero(a) {
        return Ok(b.clone());
    }
    if is_zero(b) {
        return Ok(a.clone());
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        return Ok(float_value(x + y));
    }

    let dims = merge_index_dimensions(
        &restrict_index_dimensions(a.index_dimensions(), a.free_indices()),
        &restrict_index_dimensions(b.index_dimensions(), b.free_indices()),
    )?;
    Ok(Expr::from_parts(
        ExprKind::Sum(a.clone(), b.clone()),
        a.shape().clone(),
        a.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}

/// The product `a * b` of two scalar-valued expressions.
///
/// Indices that are free in both operands become repeated indices of the product, which
/// implies summation over their range (Einstein notation).
pub fn product(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if !a.is_scalar() || !b.is_scalar() {
        return Err(FormError::shape_mismatch("Product", a.shape(), b.shape()));
    }

    let occurrences = a.free_indices().iter().chain(b.free_indices()).copied();
    let (free, repeated) = split_free_and_repeated(occurrences)?;
    let dims = merge_index_dimensions(
        &restrict_index_dimensions(a.index_dimensions(), a.free_indices()),
        &restrict_index_dimensions(b.index_dimensions(), b.free_indices()),
    )?;

    if is_zero(a) || is_zero(b) {
        return Ok(indexed_zero(Shape::scalar(), restrict_index_dimensions(&dims, &free)));
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        return Ok(float_value(x * y));
    }

    Ok(Expr::from_parts(
        ExprKind::Product(a.clone(), b.clone()),
        Shape::scalar(),
        free,
        repeated,
        dims,
    ))
}

/// The division `a / b`, where `b` must be a scalar without free indices.
pub fn division(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    require_true_scalar("Division", b)?;
    if is_zero(b) {
        return Err(FormError::unsupported("division by zero"));
    }
    if is_zero(a) {
        return Ok(zero_like(a));
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        return Ok(float_value(x / y));
    }

    let dims = restrict_index_dimensions(a.index_dimensions(), a.free_indices());
    Ok(Expr::from_parts(
        ExprKind::Division(a.clone(), b.clone()),
        a.shape().clone(),
        a.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}

/// The power `a ** b` of two scalars without free indices.
pub fn power(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    require_true_scalar("Power", a)?;
    require_true_scalar("Power", b)?;

    if is_zero(b) {
        return Ok(float_value(1.0));
    }
    if is_zero(a) {
        if let Some(exponent) = b.as_float() {
            if exponent > 0.0 {
                return Ok(zero());
            }
        }
    }
    if let (Some(x), Some(y)) = (a.as_float(), b.as_float()) {
        let value = x.powf(y);
        if value.is_finite() {
            return Ok(float_value(value));
        }
    }

    Ok(Expr::from_parts(
        ExprKind::Power(a.clone(), b.clone()),
        Shape::scalar(),
        Vec::new(),
        Vec::new(),
        Default::default(),
    ))
}

/// The negation `-a`.
///
/// Double negations cancel, and negated constants are folded.
pub fn neg(a: &Expr) -> Expr {
    match a.kind() {
        ExprKind::Zero { .. } => a.clone(),
        ExprKind::Neg(inner) => inner.clone(),
        ExprKind::FloatValue(value) => float_value(-value.into_inner()),
        _ => Expr::from_parts(
            ExprKind::Neg(a.clone()),
            a.shape().clone(),
            a.free_indices().to_vec(),
            Vec::new(),
            restrict_index_dimensions(a.index_dimensions(), a.free_indices()),
        ),
    }
}

/// Applies an elementary function to a scalar without free indices.
///
/// Constant arguments are evaluated right away when the result is finite.
pub fn math_function(function: MathFunction, a: &Expr) -> Result<Expr, FormError> {
    require_true_scalar(function.repr_name(), a)?;

    let constant_argument = if is_zero(a) { Some(0.0) } else { a.as_float() };
    if let Some(x) = constant_argument {
        let value = function.apply(x);
        if value.is_finite() {
            return Ok(float_value(value));
        }
    }

    Ok(Expr::from_parts(
        ExprKind::MathFunction(function, a.clone()),
        Shape::scalar(),
        Vec::new(),
        Vec::new(),
        Default::default(),
    ))
}

pub fn sqrt(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Sqrt, &a.into())
}

pub fn exp(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Exp, &a.into())
}

pub fn ln(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Ln, &a.into())
}

pub fn sin(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Sin, &a.into())
}

pub fn cos(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Cos, &a.into())
}

pub fn abs(a: impl Into<Expr>) -> Result<Expr, FormError> {
    math_function(MathFunction::Abs, &a.into())
}
