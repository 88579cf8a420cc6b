//! Spatial differential operators.
use crate::constant::{indexed_zero, is_zero};
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::index::restrict_index_dimensions;
use crate::shape::Shape;

fn require_geometric_dimension(operation: &'static str, f: &Expr) -> Result<usize, FormError> {
    f.geometric_dimension()
        .ok_or(FormError::UndefinedCell { operation })
}

/// The spatial gradient of `f`.
///
/// The gradient appends an axis of the geometric dimension to the shape of `f`, so the
/// gradient of a scalar is a vector and the gradient of a vector is a matrix whose rows are
/// the gradients of the components.
pub fn grad(f: &Expr) -> Result<Expr, FormError> {
    let gdim = require_geometric_dimension("Grad", f)?;
    let shape = f.shape().with_trailing(gdim);
    let dims = restrict_index_dimensions(f.index_dimensions(), f.free_indices());
    if is_zero(f) {
        return Ok(indexed_zero(shape, dims));
    }
    Ok(Expr::from_parts(
        ExprKind::Grad(f.clone()),
        shape,
        f.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}

/// The divergence of `f`, contracting its last axis with the spatial derivative.
pub fn div(f: &Expr) -> Result<Expr, FormError> {
    let gdim = require_geometric_dimension("Div", f)?;
    match f.shape().last() {
        Some(&last) if last == gdim => {}
        _ => {
            return Err(FormError::type_contract(
                "Div",
                "a tensor whose last axis has the geometric dimension",
                format!("expression of shape {} in dimension {gdim}", f.shape()),
            ))
        }
    }
    let shape = Shape::from(&f.shape()[..f.rank() - 1]);
    let dims = restrict_index_dimensions(f.index_dimensions(), f.free_indices());
    if is_zero(f) {
        return Ok(indexed_zero(shape, dims));
    }
    Ok(Expr::from_parts(
        ExprKind::Div(f.clone()),
        shape,
        f.free_indices().to_vec(),
        Vec::new(),
        dims,
    ))
}
