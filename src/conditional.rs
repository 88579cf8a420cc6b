//! Conditions and conditional expressions.
use crate::constant::{is_zero, zero_like};
use crate::error::FormError;
use crate::expr::{ConditionOp, Expr, ExprKind};
use crate::index::{merge_index_dimensions, restrict_index_dimensions, same_index_set, IndexDimensions};
use crate::shape::Shape;
use itertools::Itertools;

fn free_dims(expr: &Expr) -> IndexDimensions {
    restrict_index_dimensions(expr.index_dimensions(), expr.free_indices())
}

fn require_condition(operation: &'static str, expr: &Expr) -> Result<(), FormError> {
    if expr.is_condition() {
        Ok(())
    } else {
        Err(FormError::type_contract(operation, "a condition", expr.kind().name()))
    }
}

fn require_same_free_indices(operation: &'static str, a: &Expr, b: &Expr) -> Result<(), FormError> {
    if same_index_set(a.free_indices(), b.free_indices()) {
        Ok(())
    } else {
        Err(FormError::FreeIndexMismatch {
            operation,
            left: a.free_indices().iter().join(", "),
            right: b.free_indices().iter().join(", "),
        })
    }
}

fn condition_node(kind: ExprKind, a: &Expr, b: Option<&Expr>) -> Result<Expr, FormError> {
    let dims = match b {
        Some(b) => merge_index_dimensions(&free_dims(a), &free_dims(b))?,
        None => free_dims(a),
    };
    Ok(Expr::from_parts(kind, Shape::scalar(), a.free_indices().to_vec(), Vec::new(), dims))
}

/// The comparison `a op b` of two scalars.
pub fn condition(op: ConditionOp, a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    let operation = op.repr_name();
    if !a.is_scalar() || !b.is_scalar() {
        return Err(FormError::shape_mismatch(operation, a.shape(), b.shape()));
    }
    require_same_free_indices(operation, a, b)?;
    condition_node(ExprKind::Condition(op, a.clone(), b.clone()), a, Some(b))
}

pub fn eq(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Eq, &a.into(), &b.into())
}

pub fn ne(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Ne, &a.into(), &b.into())
}

pub fn lt(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Lt, &a.into(), &b.into())
}

pub fn gt(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Gt, &a.into(), &b.into())
}

pub fn le(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Le, &a.into(), &b.into())
}

pub fn ge(a: impl Into<Expr>, b: impl Into<Expr>) -> Result<Expr, FormError> {
    condition(ConditionOp::Ge, &a.into(), &b.into())
}

pub fn and(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    require_condition("AndCondition", a)?;
    require_condition("AndCondition", b)?;
    require_same_free_indices("AndCondition", a, b)?;
    condition_node(ExprKind::And(a.clone(), b.clone()), a, Some(b))
}

pub fn or(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    require_condition("OrCondition", a)?;
    require_condition("OrCondition", b)?;
    require_same_free_indices("OrCondition", a, b)?;
    condition_node(ExprKind::Or(a.clone(), b.clone()), a, Some(b))
}

pub fn not(a: &Expr) -> Result<Expr, FormError> {
    require_condition("NotCondition", a)?;
    condition_node(ExprKind::Not(a.clone()), a, None)
}

/// The expression `c ? t : f`.
///
/// Both branches must have the same shape and free indices, and the free indices of the
/// condition must be among them.
pub fn conditional(c: &Expr, t: &Expr, f: &Expr) -> Result<Expr, FormError> {
    require_condition("Conditional", c)?;
    if t.shape() != f.shape() {
        return Err(FormError::shape_mismatch("Conditional", t.shape(), f.shape()));
    }
    require_same_free_indices("Conditional", t, f)?;
    if let Some(index) = c
        .free_indices()
        .iter()
        .find(|index| !t.free_indices().contains(index))
    {
        return Err(FormError::RepeatedIndex {
            index: index.to_string(),
            reason: "is free in the condition but not in the branches of a conditional".to_string(),
        });
    }

    let dims = merge_index_dimensions(&free_dims(t), &free_dims(f))?;
    let dims = merge_index_dimensions(&dims, &free_dims(c))?;
    if is_zero(t) && is_zero(f) {
        return Ok(zero_like(t));
    }
    Ok(Expr::from_parts(
        ExprKind::Conditional(c.clone(), t.clone(), f.clone()),
        t.shape().clone(),
        t.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}
