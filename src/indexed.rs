//! Index notation: component access, tensor construction from indices, and index sums.
use crate::constant::{indexed_zero, is_zero};
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::index::{
    merge_index_dimensions, restrict_index_dimensions, same_index_set, split_free_and_repeated, Index, IndexDimensions,
    IndexEntry, MultiIndex,
};
use crate::shape::Shape;
use itertools::Itertools;

/// Dimensions of the free and repeated indices of a node, taken from `dims`.
fn node_dimensions(dims: &IndexDimensions, free: &[Index], repeated: &[Index]) -> IndexDimensions {
    restrict_index_dimensions(dims, free.iter().chain(repeated))
}

/// Indexes the expression with a multi-index, `A[i, j]`.
///
/// The multi-index must have one entry per axis of `a`, and fixed entries must be within the
/// dimension of their axis. The result is always scalar. Symbolic entries that are not already
/// free in `a` become free indices of the result, while an index occurring twice (in `a` and the
/// multi-index, or twice in the multi-index) is summed over.
pub fn indexed(a: &Expr, multiindex: impl Into<MultiIndex>) -> Result<Expr, FormError> {
    let multiindex = multiindex.into();
    if multiindex.len() != a.rank() {
        return Err(FormError::RankMismatch {
            required: a.rank(),
            actual: multiindex.len(),
            expression: a.to_string(),
        });
    }
    if multiindex.is_empty() {
        return Ok(a.clone());
    }

    let mut entry_dims = IndexDimensions::new();
    for (&dimension, entry) in a.shape().iter().zip(multiindex.iter()) {
        match *entry {
            IndexEntry::Fixed(value) => {
                if value >= dimension {
                    return Err(FormError::IndexOutOfRange {
                        index: value,
                        dimension,
                    });
                }
            }
            IndexEntry::Symbolic(index) => {
                if let Some(&existing) = entry_dims.get(&index) {
                    if existing != dimension {
                        return Err(FormError::RepeatedIndex {
                            index: index.to_string(),
                            reason: format!("used for axes of dimension {existing} and {dimension}"),
                        });
                    }
                }
                entry_dims.insert(index, dimension);
            }
        }
    }

    let occurrences = a
        .free_indices()
        .iter()
        .copied()
        .chain(multiindex.symbolic_indices());
    let (free, repeated) = split_free_and_repeated(occurrences)?;

    // The dimensions of the operand's free indices take precedence over the axis dimensions
    let mut dims = entry_dims;
    dims.extend(restrict_index_dimensions(a.index_dimensions(), a.free_indices()));
    let dims = node_dimensions(&dims, &free, &repeated);

    if is_zero(a) {
        return Ok(indexed_zero(Shape::scalar(), restrict_index_dimensions(&dims, &free)));
    }

    Ok(Expr::from_parts(
        ExprKind::Indexed(a.clone(), multiindex),
        Shape::scalar(),
        free,
        repeated,
        dims,
    ))
}

/// Builds a tensor from a scalar expression by binding free indices to axes, `as_tensor(f, (i, j))`.
///
/// Every entry of the multi-index must be a distinct symbolic index that is free in `f`. The
/// shape of the result is given by the dimensions of those indices.
pub fn component_tensor(f: &Expr, multiindex: impl Into<MultiIndex>) -> Result<Expr, FormError> {
    let multiindex = multiindex.into();
    if !f.is_scalar() {
        return Err(FormError::type_contract(
            "ComponentTensor",
            "a scalar-valued expression",
            format!("expression of shape {}", f.shape()),
        ));
    }
    if multiindex.is_empty() {
        return Ok(f.clone());
    }

    let mut bound = Vec::with_capacity(multiindex.len());
    for entry in multiindex.iter() {
        let index = entry.as_symbolic().ok_or_else(|| {
            FormError::type_contract("ComponentTensor", "symbolic indices only", format!("fixed index {entry}"))
        })?;
        if bound.contains(&index) {
            return Err(FormError::RepeatedIndex {
                index: index.to_string(),
                reason: "occurs more than once in the indices of a component tensor".to_string(),
            });
        }
        if !f.free_indices().contains(&index) {
            return Err(FormError::RepeatedIndex {
                index: index.to_string(),
                reason: format!("is not a free index of {f}"),
            });
        }
        bound.push(index);
    }

    let shape = bound
        .iter()
        .map(|index| {
            f.index_dimensions()
                .get(index)
                .copied()
                .ok_or_else(|| FormError::InvariantBreach(format!("free index {index} has no dimension")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let free = f
        .free_indices()
        .iter()
        .copied()
        .filter(|index| !bound.contains(index))
        .collect_vec();
    let dims = restrict_index_dimensions(f.index_dimensions(), &free);

    if is_zero(f) {
        return Ok(indexed_zero(Shape::from(shape), dims));
    }
    if let ExprKind::Indexed(tensor, tensor_multiindex) = f.kind() {
        if *tensor_multiindex == multiindex {
            return Ok(tensor.clone());
        }
    }

    Ok(Expr::from_parts(
        ExprKind::ComponentTensor(f.clone(), multiindex),
        Shape::from(shape),
        free,
        Vec::new(),
        dims,
    ))
}

/// Sums a scalar expression over the range of one of its free indices.
pub fn index_sum(f: &Expr, index: Index) -> Result<Expr, FormError> {
    if !f.is_scalar() {
        return Err(FormError::type_contract(
            "IndexSum",
            "a scalar-valued expression",
            format!("expression of shape {}", f.shape()),
        ));
    }
    if !f.free_indices().contains(&index) {
        return Err(FormError::RepeatedIndex {
            index: index.to_string(),
            reason: format!("cannot be summed over since it is not a free index of {f}"),
        });
    }

    let free = f
        .free_indices()
        .iter()
        .copied()
        .filter(|other| *other != index)
        .collect_vec();
    let repeated = vec![index];
    let dims = node_dimensions(f.index_dimensions(), &free, &repeated);

    if is_zero(f) {
        return Ok(indexed_zero(Shape::scalar(), restrict_index_dimensions(&dims, &free)));
    }

    Ok(Expr::from_parts(ExprKind::IndexSum(f.clone(), index), Shape::scalar(), free, repeated, dims))
}

/// Stacks expressions of equal shape and free indices along a new leading axis.
pub fn list_tensor(components: Vec<Expr>) -> Result<Expr, FormError> {
    let first = components
        .first()
        .ok_or_else(|| FormError::unsupported("cannot build a ListTensor without components"))?;

    for component in &components[1..] {
        if component.shape() != first.shape() {
            return Err(FormError::shape_mismatch("ListTensor", first.shape(), component.shape()));
        }
        if !same_index_set(first.free_indices(), component.free_indices()) {
            return Err(FormError::FreeIndexMismatch {
                operation: "ListTensor",
                left: first.free_indices().iter().join(", "),
                right: component.free_indices().iter().join(", "),
            });
        }
    }

    let mut dims = IndexDimensions::new();
    for component in &components {
        let component_dims = restrict_index_dimensions(component.index_dimensions(), component.free_indices());
        dims = merge_index_dimensions(&dims, &component_dims)?;
    }
    let shape = Shape::from([components.len()]).concat(first.shape());
    let free = first.free_indices().to_vec();

    if components.iter().all(is_zero) {
        return Ok(indexed_zero(shape, dims));
    }

    Ok(Expr::from_parts(ExprKind::ListTensor(components), shape, free, Vec::new(), dims))
}

/// A vector from its components.
pub fn as_vector(components: Vec<Expr>) -> Result<Expr, FormError> {
    list_tensor(components)
}

/// A matrix from its rows.
pub fn as_matrix(rows: Vec<Vec<Expr>>) -> Result<Expr, FormError> {
    let rows = rows
        .into_iter()
        .map(list_tensor)
        .collect::<Result<Vec<_>, _>>()?;
    list_tensor(rows)
}

/// Binds the given free indices of a scalar expression to the axes of a tensor.
pub fn as_tensor(f: &Expr, indices: &[Index]) -> Result<Expr, FormError> {
    component_tensor(f, MultiIndex::from_indices(indices))
}
