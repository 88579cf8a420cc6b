use crate::{p1, p2, vector_p1};
use rustc_hash::FxHashSet;
use varform::algebra::sum;
use varform::{
    coefficient, coefficient_with_count, float_value, is_zero, test_function, zero, zero_tensor, Expr, ExprKind,
    FormError, Shape,
};

#[test]
fn zero_tensors_are_canonical_per_shape() {
    let shapes = [vec![], vec![3], vec![2, 2], vec![3, 4, 5]];
    for shape in &shapes {
        let a = zero_tensor(shape.clone());
        let b = zero_tensor(shape.clone());
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(a.shape(), &Shape::from(shape.clone()));
        assert!(a.free_indices().is_empty());
    }

    assert!(zero().ptr_eq(&zero_tensor(Shape::scalar())));
    for (i, a) in shapes.iter().enumerate() {
        for b in &shapes[i + 1..] {
            assert_ne!(zero_tensor(a.clone()), zero_tensor(b.clone()));
        }
    }
}

#[test]
fn concurrent_zero_requests_observe_the_same_node() {
    let shape = vec![7, 11, 13];
    let zeros: Vec<Expr> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| zero_tensor(shape.clone())))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    for z in &zeros {
        assert!(z.ptr_eq(&zeros[0]));
    }
}

#[test]
fn structural_equality() {
    let u = coefficient(p1());
    let v = test_function(p1());

    let a = sum(&u, &v).unwrap();
    let b = sum(&u, &v).unwrap();
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));

    // Changing an operand breaks equality
    let c = sum(&u, &test_function(p2())).unwrap();
    assert_ne!(a, c);
    // Equality is representational, not mathematical
    assert_ne!(a, sum(&v, &u).unwrap());

    assert_eq!(coefficient_with_count(p1(), 5), coefficient_with_count(p1(), 5));
    assert_ne!(coefficient_with_count(p1(), 5), coefficient_with_count(p2(), 5));
    assert_ne!(coefficient(p1()), coefficient(p1()));

    let set: FxHashSet<Expr> = [a.clone(), b, c.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&a));
    assert!(set.contains(&c));
}

#[test]
fn numeric_coercion() {
    assert_eq!(Expr::from(2.5), 2.5);
    assert_eq!(Expr::from(3), float_value(3.0));
    assert!(is_zero(&Expr::from(0.0)));
    assert!(Expr::from(0.0).ptr_eq(&zero()));
    assert!(matches!(Expr::from(1.5).kind(), ExprKind::FloatValue(_)));
}

#[test]
fn node_protocol() {
    let u = coefficient(vector_p1());
    assert_eq!(u.shape(), &Shape::from(vec![3]));
    assert_eq!(u.rank(), 1);
    assert!(u.is_terminal());
    assert!(u.operands().is_empty());
    assert_eq!(u.cell(), Some(varform::Cell::Tetrahedron));
    assert_eq!(u.geometric_dimension(), Some(3));
    assert_eq!(u.element(), Some(&vector_p1()));

    let w = coefficient(p1());
    let v = test_function(p1());
    let s = sum(&w, &v).unwrap();
    assert!(!s.is_terminal());
    assert_eq!(s.operands(), vec![w.clone(), v.clone()]);
    assert_eq!(s.reconstruct(vec![v.clone(), w.clone()]).unwrap(), sum(&v, &w).unwrap());
    assert!(s.reconstruct(vec![v]).is_err());
}

#[test]
fn sum_requires_equal_shapes() {
    let u = coefficient(vector_p1());
    let w = coefficient(p1());
    assert!(matches!(sum(&u, &w), Err(FormError::ShapeMismatch { .. })));
}
