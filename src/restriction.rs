//! Restrictions of expressions to one side of an interior facet.
use crate::constant::is_zero;
use crate::error::FormError;
use crate::expr::{Expr, ExprKind, Side};
use crate::index::restrict_index_dimensions;

pub fn restricted(side: Side, f: &Expr) -> Result<Expr, FormError> {
    if let ExprKind::Restricted(..) = f.kind() {
        return Err(FormError::unsupported(format!("cannot restrict the already restricted expression {f}")));
    }
    if is_zero(f) {
        return Ok(f.clone());
    }
    Ok(Expr::from_parts(
        ExprKind::Restricted(side, f.clone()),
        f.shape().clone(),
        f.free_indices().to_vec(),
        Vec::new(),
        restrict_index_dimensions(f.index_dimensions(), f.free_indices()),
    ))
}

/// The restriction `f('+')`.
pub fn positive_restricted(f: &Expr) -> Result<Expr, FormError> {
    restricted(Side::Positive, f)
}

/// The restriction `f('-')`.
pub fn negative_restricted(f: &Expr) -> Result<Expr, FormError> {
    restricted(Side::Negative, f)
}
