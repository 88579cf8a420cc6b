use crate::{p1, p2, vector_p1};
use rustc_hash::FxHashMap;
use varform::algorithms::{
    extract_arguments, extract_coefficients, has_arguments, map_expr_dag, pre_traversal, replace, terminals,
    unique_pre_traversal,
};
use varform::{argument, coefficient, coefficient_with_count, test_function, trial_function, FormError};

#[test]
fn traversals_visit_shared_subtrees() {
    let u = coefficient(p1());
    let square = &u * &u;

    assert_eq!(pre_traversal(&square).count(), 3);
    let unique: Vec<_> = unique_pre_traversal(&square).collect();
    assert_eq!(unique, vec![square.clone(), u.clone()]);
}

#[test]
fn terminals_in_order_of_first_occurrence() {
    let u = coefficient(p1());
    let w = coefficient(p1());
    let v = test_function(p1());
    let e = &(&u * &v) + &(&w * &v);

    assert_eq!(terminals(&e), vec![u, v, w]);
}

#[test]
fn arguments_are_sorted_by_number() {
    let v = test_function(p1());
    let t = trial_function(p2());
    let e = &t * &v;

    assert_eq!(extract_arguments(&e).unwrap(), vec![v.clone(), t.clone()]);
    assert!(has_arguments(&e));
    assert!(!has_arguments(&coefficient(p1())));
}

#[test]
fn conflicting_argument_numbers_are_rejected() {
    let e = &argument(p1(), 0) * &argument(p2(), 0);
    assert!(matches!(
        extract_arguments(&e),
        Err(FormError::UnsupportedOperation(_))
    ));
}

#[test]
fn coefficients_are_sorted_by_count() {
    let later = coefficient_with_count(p1(), 7001);
    let earlier = coefficient_with_count(p1(), 7000);
    let e = &later + &earlier;

    assert_eq!(extract_coefficients(&e), vec![earlier, later]);
}

#[test]
fn map_expr_dag_visits_each_distinct_node_once() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let p = &u * &v;
    let e = &p + &p;

    let mut visited = 0;
    let mapped = map_expr_dag(&e, |node, operands| {
        visited += 1;
        node.reconstruct(operands)
    })
    .unwrap();

    assert_eq!(visited, 4);
    assert_eq!(mapped, e);
}

#[test]
fn replace_substitutes_terminals() {
    let u = coefficient(p1());
    let w = coefficient(p1());
    let v = test_function(p1());
    let e = &u * &v;

    let mut mapping = FxHashMap::default();
    mapping.insert(u.clone(), w.clone());
    assert_eq!(replace(&e, &mapping).unwrap(), &w * &v);

    // Nothing to replace, so the very same node comes back
    let untouched = replace(&e, &FxHashMap::default()).unwrap();
    assert!(untouched.ptr_eq(&e));
}

#[test]
fn replace_requires_matching_shapes() {
    let u = coefficient(p1());
    let e = &u * &u;

    let mut mapping = FxHashMap::default();
    mapping.insert(u.clone(), coefficient(vector_p1()));
    assert!(matches!(
        replace(&e, &mapping),
        Err(FormError::ShapeMismatch { operation: "replace", .. })
    ));
}
