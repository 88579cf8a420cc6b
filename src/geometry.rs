//! Geometric quantities.
use crate::cell::Cell;
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::shape::Shape;

fn geometric_shape(operation: &'static str, cell: Cell) -> Result<Shape, FormError> {
    cell.geometric_dimension()
        .map(|dim| Shape::from([dim]))
        .ok_or(FormError::UndefinedCell { operation })
}

/// The coordinate vector `x` of a point in the given cell.
pub fn spatial_coordinate(cell: Cell) -> Result<Expr, FormError> {
    let shape = geometric_shape("SpatialCoordinate", cell)?;
    Ok(Expr::terminal(ExprKind::SpatialCoordinate(cell), shape))
}

/// The outward unit normal on the facets of the given cell.
pub fn facet_normal(cell: Cell) -> Result<Expr, FormError> {
    let shape = geometric_shape("FacetNormal", cell)?;
    Ok(Expr::terminal(ExprKind::FacetNormal(cell), shape))
}
