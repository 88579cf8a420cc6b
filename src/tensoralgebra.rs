//! Compound tensor algebra operators.
use crate::algebra::product;
use crate::constant::{indexed_zero, is_zero};
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::index::{merge_index_dimensions, restrict_index_dimensions, split_free_and_repeated, Index, IndexDimensions};
use crate::operators::multiply;
use crate::shape::Shape;

/// Free indices of a binary tensor operator, whose operands may not share free indices.
fn disjoint_free_indices(
    operation: &'static str,
    a: &Expr,
    b: &Expr,
) -> Result<(Vec<Index>, IndexDimensions), FormError> {
    let (free, repeated) = split_free_and_repeated(a.free_indices().iter().chain(b.free_indices()).copied())?;
    if let Some(index) = repeated.first() {
        return Err(FormError::RepeatedIndex {
            index: index.to_string(),
            reason: format!("occurs in both operands of {operation}"),
        });
    }
    let dims = merge_index_dimensions(
        &restrict_index_dimensions(a.index_dimensions(), a.free_indices()),
        &restrict_index_dimensions(b.index_dimensions(), b.free_indices()),
    )?;
    Ok((free, dims))
}

fn binary_node(kind: ExprKind, shape: Shape, free: Vec<Index>, dims: IndexDimensions, zero: bool) -> Expr {
    if zero {
        indexed_zero(shape, dims)
    } else {
        Expr::from_parts(kind, shape, free, Vec::new(), dims)
    }
}

/// The transpose of a matrix.
pub fn transpose(a: &Expr) -> Result<Expr, FormError> {
    if a.rank() != 2 {
        return Err(FormError::type_contract(
            "Transposed",
            "a tensor of rank 2",
            format!("expression of shape {}", a.shape()),
        ));
    }
    let shape = Shape::from([a.shape()[1], a.shape()[0]]);
    let dims = restrict_index_dimensions(a.index_dimensions(), a.free_indices());
    if is_zero(a) {
        return Ok(indexed_zero(shape, dims));
    }
    if let ExprKind::Transposed(inner) = a.kind() {
        return Ok(inner.clone());
    }
    Ok(Expr::from_parts(
        ExprKind::Transposed(a.clone()),
        shape,
        a.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}

/// The full contraction `a : b` of two tensors with the same shape.
pub fn inner(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if a.shape() != b.shape() {
        return Err(FormError::shape_mismatch("Inner", a.shape(), b.shape()));
    }
    if a.is_scalar() {
        return product(a, b);
    }
    let (free, dims) = disjoint_free_indices("Inner", a, b)?;
    let zero = is_zero(a) || is_zero(b);
    Ok(binary_node(ExprKind::Inner(a.clone(), b.clone()), Shape::scalar(), free, dims, zero))
}

/// The tensor product of two tensors. Scalar operands reduce to scaling.
pub fn outer(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if a.is_scalar() || b.is_scalar() {
        return multiply(a, b);
    }
    let (free, dims) = disjoint_free_indices("Outer", a, b)?;
    let shape = a.shape().concat(b.shape());
    let zero = is_zero(a) || is_zero(b);
    Ok(binary_node(ExprKind::Outer(a.clone(), b.clone()), shape, free, dims, zero))
}

/// Contraction over the last axis of `a` and the first axis of `b`.
pub fn dot(a: &Expr, b: &Expr) -> Result<Expr, FormError> {
    if a.is_scalar() || b.is_scalar() {
        return multiply(a, b);
    }
    let (Some(&last), Some(&first)) = (a.shape().last(), b.shape().first()) else {
        return Err(FormError::shape_mismatch("Dot", a.shape(), b.shape()));
    };
    if last != first {
        return Err(FormError::shape_mismatch("Dot", a.shape(), b.shape()));
    }
    let (free, dims) = disjoint_free_indices("Dot", a, b)?;
    let shape = Shape::from(&a.shape()[..a.rank() - 1]).concat(&Shape::from(&b.shape()[1..]));
    let zero = is_zero(a) || is_zero(b);
    Ok(binary_node(ExprKind::Dot(a.clone(), b.clone()), shape, free, dims, zero))
}

/// The trace of a square matrix.
pub fn trace(a: &Expr) -> Result<Expr, FormError> {
    if a.rank() != 2 || a.shape()[0] != a.shape()[1] {
        return Err(FormError::type_contract(
            "Trace",
            "a square matrix",
            format!("expression of shape {}", a.shape()),
        ));
    }
    let dims = restrict_index_dimensions(a.index_dimensions(), a.free_indices());
    if is_zero(a) {
        return Ok(indexed_zero(Shape::scalar(), dims));
    }
    Ok(Expr::from_parts(
        ExprKind::Trace(a.clone()),
        Shape::scalar(),
        a.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}
