//! Constant terminals: zero tensors, float constants and the identity.
use crate::expr::{Expr, ExprKind};
use crate::index::{restrict_index_dimensions, IndexDimensions};
use crate::shape::Shape;
use log::trace;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Canonical zero tensors, one per shape. Populated lazily and never evicted.
static ZERO_CACHE: OnceLock<Mutex<FxHashMap<Shape, Expr>>> = OnceLock::new();

/// Returns the canonical zero tensor of the given shape.
///
/// Repeated requests for the same shape return handles to the very same node, also when the
/// requests are made concurrently from several threads.
pub fn zero_tensor(shape: impl Into<Shape>) -> Expr {
    let shape = shape.into();
    let cache = ZERO_CACHE.get_or_init(|| Mutex::new(FxHashMap::default()));
    let mut cache = cache.lock();
    cache
        .entry(shape)
        .or_insert_with_key(|shape| {
            trace!("Creating canonical zero tensor of shape {}", shape);
            let kind = ExprKind::Zero {
                shape: shape.clone(),
                free_indices: IndexDimensions::new(),
            };
            Expr::terminal(kind, shape.clone())
        })
        .clone()
}

/// The canonical scalar zero.
pub fn zero() -> Expr {
    zero_tensor(Shape::scalar())
}

/// A zero with the given shape and free indices.
///
/// Without free indices this is the canonical zero of the shape. Zeros with free indices arise
/// when index expressions collapse to zero, and are not cached.
pub fn indexed_zero(shape: Shape, free_indices: IndexDimensions) -> Expr {
    if free_indices.is_empty() {
        zero_tensor(shape)
    } else {
        let free: Vec<_> = free_indices.keys().copied().collect();
        let kind = ExprKind::Zero {
            shape: shape.clone(),
            free_indices: free_indices.clone(),
        };
        Expr::from_parts(kind, shape, free, Vec::new(), free_indices)
    }
}

/// A zero with the same shape and free indices as the given expression.
pub fn zero_like(expr: &Expr) -> Expr {
    let free_dims = restrict_index_dimensions(expr.index_dimensions(), expr.free_indices());
    indexed_zero(expr.shape().clone(), free_dims)
}

/// Whether the expression is a zero tensor of any shape, or equal to the number zero.
pub fn is_zero(expr: &Expr) -> bool {
    matches!(expr.kind(), ExprKind::Zero { .. }) || *expr == 0.0
}

/// Wraps a scalar value. Zero is canonicalized to [`zero()`].
pub fn float_value(value: f64) -> Expr {
    if value == 0.0 {
        zero()
    } else {
        Expr::terminal(ExprKind::FloatValue(OrderedFloat(value)), Shape::scalar())
    }
}

/// The `dim x dim` identity matrix.
pub fn identity(dim: usize) -> Expr {
    Expr::terminal(ExprKind::Identity(dim), Shape::from([dim, dim]))
}

/// Coerces a numeric literal or an expression to an expression.
pub fn as_expr(value: impl Into<Expr>) -> Expr {
    value.into()
}
