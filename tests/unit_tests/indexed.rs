use crate::{p1, vector_p1};
use varform::algebra::product;
use varform::index::{IndexEntry, MultiIndex};
use varform::{
    as_vector, coefficient, component_tensor, index_sum, indexed, is_zero, zero_tensor, Cell, FiniteElement,
    FormError, Index, Shape,
};

fn matrix_element() -> FiniteElement {
    FiniteElement::tensor("Lagrange", Cell::Tetrahedron, 1, [3, 3])
}

#[test]
fn fixed_multi_index_collapses_rank() {
    let u = coefficient(vector_p1());
    let u2 = u.index(2usize).unwrap();
    assert!(u2.shape().is_scalar());
    assert!(u2.free_indices().is_empty());

    let a = coefficient(FiniteElement::tensor("Lagrange", Cell::Triangle, 1, [2, 3]));
    let a12 = a.index((1usize, 2usize)).unwrap();
    assert_eq!(a12.shape(), &Shape::scalar());
    assert!(a12.free_indices().is_empty());
    assert!(a12.repeated_indices().is_empty());
}

#[test]
fn fixed_index_bounds() {
    let u = coefficient(vector_p1());
    assert!(u.index(2usize).is_ok());
    assert_eq!(
        u.index(3usize),
        Err(FormError::IndexOutOfRange {
            index: 3,
            dimension: 3
        })
    );
}

#[test]
fn multi_index_length_must_match_rank() {
    let u = coefficient(vector_p1());
    assert!(matches!(
        u.index((0usize, 1usize)),
        Err(FormError::RankMismatch {
            required: 1,
            actual: 2,
            ..
        })
    ));

    // Indexing a scalar with the empty multi-index is the identity
    let w = coefficient(p1());
    assert_eq!(indexed(&w, MultiIndex::new(vec![])).unwrap(), w);
    assert!(w.index(0usize).is_err());
}

#[test]
fn symbolic_index_becomes_free() {
    let u = coefficient(vector_p1());
    let i = Index::new();
    let ui = u.index(i).unwrap();
    assert!(ui.shape().is_scalar());
    assert_eq!(ui.free_indices(), &[i]);
    assert!(ui.repeated_indices().is_empty());
    assert_eq!(ui.index_dimensions().get(&i), Some(&3));
}

#[test]
fn index_occurring_twice_is_summed() {
    let u = coefficient(vector_p1());
    let w = coefficient(vector_p1());
    let i = Index::new();

    let dot = product(&u.index(i).unwrap(), &w.index(i).unwrap()).unwrap();
    assert!(dot.free_indices().is_empty());
    assert_eq!(dot.repeated_indices(), &[i]);
    assert!(dot.is_true_scalar());

    // The trace A[i, i]
    let a = coefficient(matrix_element());
    let trace = a.index((i, i)).unwrap();
    assert!(trace.free_indices().is_empty());
    assert_eq!(trace.repeated_indices(), &[i]);
}

#[test]
fn mixed_fixed_and_symbolic_entries() {
    let a = coefficient(matrix_element());
    let j = Index::new();
    let row = a.index((1usize, j)).unwrap();
    assert_eq!(row.free_indices(), &[j]);
    assert_eq!(
        row.index_dimensions().get(&j),
        Some(&3),
        "dimension of j is taken from the second axis"
    );

    let mi = MultiIndex::new(vec![IndexEntry::Fixed(0), IndexEntry::Symbolic(j)]);
    assert_eq!(indexed(&a, mi).unwrap().free_indices(), &[j]);
}

#[test]
fn summing_over_axes_of_different_dimensions_fails() {
    let u = coefficient(vector_p1());
    let q = coefficient(FiniteElement::vector("Lagrange", Cell::Triangle, 1, 2));
    let i = Index::new();
    assert!(product(&u.index(i).unwrap(), &q.index(i).unwrap()).is_err());

    let a = coefficient(FiniteElement::tensor("Lagrange", Cell::Triangle, 1, [2, 3]));
    assert!(a.index((i, i)).is_err());
}

#[test]
fn operand_index_dimensions_take_precedence() {
    // l = [q_i, q_i, q_i] has shape (3,) and the free index i of dimension 2
    let q = coefficient(FiniteElement::vector("Lagrange", Cell::Triangle, 1, 2));
    let i = Index::new();
    let qi = q.index(i).unwrap();
    let l = as_vector(vec![qi.clone(), qi.clone(), qi]).unwrap();
    assert_eq!(l.shape(), &Shape::from([3]));

    let li = l.index(i).unwrap();
    assert!(li.free_indices().is_empty());
    assert_eq!(li.repeated_indices(), &[i]);
    assert_eq!(li.index_dimensions().get(&i), Some(&2));
}

#[test]
fn an_index_may_not_occur_three_times() {
    let a = coefficient(matrix_element());
    let w = coefficient(vector_p1());
    let (i, j, k) = (Index::new(), Index::new(), Index::new());

    // m_jk = a_ij w_k, with the free index i
    let a_ij_w_k = product(&a.index((i, j)).unwrap(), &w.index(k).unwrap()).unwrap();
    let m = component_tensor(&a_ij_w_k, (j, k)).unwrap();
    assert_eq!(m.shape(), &Shape::from([3, 3]));
    assert_eq!(m.free_indices(), &[i]);

    assert!(m.index((j, j)).is_ok());
    assert!(matches!(m.index((i, i)), Err(FormError::RepeatedIndex { .. })));
}

#[test]
fn component_tensor_binds_free_indices() {
    let a = coefficient(matrix_element());
    let (i, j) = (Index::new(), Index::new());
    let aij = a.index((i, j)).unwrap();

    // Binding in the same order gives back the tensor
    assert_eq!(component_tensor(&aij, (i, j)).unwrap(), a);

    // Binding in the opposite order is the transpose
    let at = component_tensor(&aij, (j, i)).unwrap();
    assert_eq!(at.shape(), &Shape::from([3, 3]));
    assert!(at.free_indices().is_empty());
    assert_ne!(at, a);

    let partial = component_tensor(&aij, i).unwrap();
    assert_eq!(partial.shape(), &Shape::from([3]));
    assert_eq!(partial.free_indices(), &[j]);

    let k = Index::new();
    assert!(component_tensor(&aij, k).is_err());
    assert!(component_tensor(&aij, (i, i)).is_err());
    assert!(component_tensor(&a, i).is_err());
}

#[test]
fn index_sum_removes_free_index() {
    let u = coefficient(vector_p1());
    let i = Index::new();
    let s = index_sum(&u.index(i).unwrap(), i).unwrap();
    assert!(s.is_true_scalar());
    assert_eq!(s.repeated_indices(), &[i]);
    assert!(index_sum(&u.index(i).unwrap(), Index::new()).is_err());
}

#[test]
fn zero_propagates_through_indexing() {
    let i = Index::new();
    let zi = zero_tensor([3]).index(i).unwrap();
    assert!(is_zero(&zi));
    assert_eq!(zi.free_indices(), &[i]);
    assert_eq!(zi.index_dimensions().get(&i), Some(&3));

    // Indexed zeros are not canonical, since they carry free indices
    let j = Index::new();
    assert_ne!(zi, zero_tensor([3]).index(j).unwrap());

    let fixed = zero_tensor([3]).index(1usize).unwrap();
    assert!(fixed.ptr_eq(&varform::zero()));
}

#[test]
fn list_tensors() {
    let u = coefficient(vector_p1());
    let components = (0..3usize).map(|k| u.index(k).unwrap()).collect();
    let v = as_vector(components).unwrap();
    assert_eq!(v.shape(), &Shape::from([3]));

    let w = coefficient(p1());
    assert!(as_vector(vec![w.clone(), u.clone()]).is_err());
    assert!(as_vector(vec![]).is_err());
    assert!(is_zero(&as_vector(vec![varform::zero(), varform::zero()]).unwrap()));
}
