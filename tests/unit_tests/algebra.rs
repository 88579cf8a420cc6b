use crate::{p1, vector_p1};
use util::assert_panics;
use varform::algebra::{division, neg, power, product, sum};
use varform::conditional::{and, lt, not};
use varform::{
    abs, coefficient, conditional, cos, exp, float_value, is_zero, sin, sqrt, test_function, zero, zero_tensor,
    ExprKind, FormError, Index,
};

#[test]
fn zeros_are_absorbed() {
    let u = coefficient(p1());
    assert_eq!(sum(&u, &zero()).unwrap(), u);
    assert_eq!(sum(&zero(), &u).unwrap(), u);
    assert!(is_zero(&product(&u, &zero()).unwrap()));
    assert!(is_zero(&division(&zero(), &u).unwrap()));
    assert_eq!(power(&u, &zero()).unwrap(), 1.0);
    assert!(is_zero(&power(&zero(), &float_value(2.0)).unwrap()));
}

#[test]
fn zero_products_keep_free_indices() {
    let w = coefficient(vector_p1());
    let i = Index::new();
    let z = product(&zero(), &w.index(i).unwrap()).unwrap();
    assert!(is_zero(&z));
    assert_eq!(z.free_indices(), &[i]);
    assert_eq!(z.index_dimensions().get(&i), Some(&3));
}

#[test]
fn constants_are_folded() {
    assert_eq!(float_value(2.0) + 3.0, 5.0);
    assert_eq!(2.0 * float_value(3.0), 6.0);
    assert_eq!(float_value(3.0) / 2.0, 1.5);
    assert_eq!(float_value(2.0).pow(3.0).unwrap(), 8.0);
    assert_eq!(sqrt(4.0).unwrap(), 2.0);
    assert_eq!(cos(0.0).unwrap(), 1.0);
    assert!(is_zero(&sin(0.0).unwrap()));
    assert!(is_zero(&(float_value(1.5) - 1.5)));
}

#[test]
fn negation() {
    let u = coefficient(p1());
    let nu = -&u;
    assert!(matches!(nu.kind(), ExprKind::Neg(_)));
    assert_eq!(neg(&nu), u);
    assert_eq!(-float_value(2.0), -2.0);
    assert!((-zero()).ptr_eq(&zero()));
    assert!((-zero_tensor([2])).ptr_eq(&zero_tensor([2])));
}

#[test]
fn subtraction_is_sum_of_negation() {
    let u = coefficient(p1());
    let v = test_function(p1());
    assert_eq!(&u - &v, sum(&u, &-&v).unwrap());
}

#[test]
fn scalar_operators_require_scalars() {
    let u = coefficient(p1());
    let w = coefficient(vector_p1());
    let i = Index::new();

    assert!(matches!(product(&u, &w), Err(FormError::ShapeMismatch { .. })));
    assert!(matches!(division(&u, &w), Err(FormError::TypeContract { .. })));
    assert!(division(&u, &w.index(i).unwrap()).is_err());
    assert!(matches!(division(&u, &zero()), Err(FormError::UnsupportedOperation(_))));
    assert!(power(&w.index(i).unwrap(), &float_value(2.0)).is_err());
    assert!(exp(w.clone()).is_err());
    assert!(abs(w.index(i).unwrap()).is_err());

    // Division of an expression with free indices by a scalar is fine
    let wi_over_u = division(&w.index(i).unwrap(), &u).unwrap();
    assert_eq!(wi_over_u.free_indices(), &[i]);
}

#[test]
fn operator_overloads_panic_on_invalid_operands() {
    let u = coefficient(p1());
    let w = coefficient(vector_p1());
    assert_panics!(&u + &w);
    assert_panics!(&u / &w);
    assert_panics!(&w * &w);
}

#[test]
fn sums_require_matching_free_indices() {
    let w = coefficient(vector_p1());
    let (i, j) = (Index::new(), Index::new());
    assert!(matches!(
        sum(&w.index(i).unwrap(), &w.index(j).unwrap()),
        Err(FormError::FreeIndexMismatch { .. })
    ));
    let s = sum(&w.index(i).unwrap(), &w.index(i).unwrap()).unwrap();
    assert_eq!(s.free_indices(), &[i]);
}

#[test]
fn conditionals() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let c = lt(u.clone(), 1.0).unwrap();
    assert!(c.is_condition());
    let nc = not(&c).unwrap();
    assert!(and(&c, &nc).is_ok());
    assert!(not(&u).is_err());

    let f = conditional(&c, &u, &v).unwrap();
    assert!(f.is_true_scalar());
    assert!(conditional(&u, &u, &v).is_err());
    assert!(is_zero(&conditional(&c, &zero(), &zero()).unwrap()));
}
