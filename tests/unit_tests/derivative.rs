use crate::{p1, vector_p1};
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;
use varform::derivative::apply_derivative;
use varform::nalgebra::DVector;
use varform::proptest::smooth_scalar_expr;
use varform::{
    coefficient, coefficient_with_count, derivative, derivative_in_direction, dot, ds, dx, float_value, grad, inner,
    is_zero, test_function, trial_function, EvaluationMapping, Expr, FormError,
};

fn origin() -> DVector<f64> {
    DVector::zeros(2)
}

#[test]
fn derivative_of_square() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let du = apply_derivative(&(&u * &u), &u, &v).unwrap();
    assert!(du.free_indices().is_empty());

    let mapping = EvaluationMapping::new()
        .with_constant(u.clone(), 3.0)
        .with_constant(v.clone(), 1.0);
    assert_eq!(du.evaluate_at(&origin(), &mapping).unwrap(), 6.0);
}

#[test]
fn derivatives_of_terminals() {
    let u = coefficient(p1());
    let w = coefficient(p1());
    let v = test_function(p1());
    assert_eq!(apply_derivative(&u, &u, &v).unwrap(), v);
    assert!(is_zero(&apply_derivative(&w, &u, &v).unwrap()));
    assert!(is_zero(&apply_derivative(&float_value(2.0), &u, &v).unwrap()));

    let q = coefficient(vector_p1());
    let dq = apply_derivative(&grad(&q).unwrap(), &u, &v).unwrap();
    assert!(is_zero(&dq));
    assert_eq!(dq.shape(), grad(&q).unwrap().shape());
}

#[test]
fn only_coefficients_can_be_differentiated_against() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f = (&u * &v) * dx(0);

    assert!(matches!(derivative(&f, &v), Err(FormError::NotAnUnknown { .. })));
    assert!(matches!(
        apply_derivative(&u, &float_value(1.0), &v),
        Err(FormError::NotAnUnknown { .. })
    ));

    // The direction must have the shape of the coefficient
    let q = test_function(vector_p1());
    assert!(matches!(
        apply_derivative(&u, &u, &q),
        Err(FormError::ShapeMismatch { .. })
    ));
}

#[test]
fn derivative_of_independent_form_is_empty() {
    let u = coefficient(p1());
    let w = coefficient(p1());
    let f = (&w * &w) * dx(0) + &w * ds(0);
    let df = derivative(&f, &u).unwrap();
    assert!(df.is_empty());
    assert_eq!(df.rank().unwrap(), 0);
}

#[test]
fn vanishing_integrals_are_dropped() {
    let u = coefficient(p1());
    let w = coefficient(p1());
    let f = (&u * &u) * dx(0) + &w * ds(0);
    let df = derivative(&f, &u).unwrap();
    assert_eq!(df.measures(), vec![dx(0)]);
}

#[test]
fn derivatives_raise_the_rank() {
    let u = coefficient(p1());
    let f = (&u * &u * &u) * dx(0);

    let residual = derivative(&f, &u).unwrap();
    assert_eq!(residual.rank().unwrap(), 1);
    let jacobian = derivative(&residual, &u).unwrap();
    assert_eq!(jacobian.rank().unwrap(), 2);

    let numbers: Vec<_> = jacobian
        .arguments()
        .unwrap()
        .iter()
        .map(|argument| argument.argument_number().unwrap())
        .collect();
    assert_eq!(numbers, vec![0, 1]);
    assert_eq!(jacobian.coefficients(), vec![u.clone()]);
}

#[test]
fn derivative_in_a_given_direction() {
    let u = coefficient(vector_p1());
    let v = trial_function(vector_p1());
    let f = inner(&grad(&u).unwrap(), &grad(&u).unwrap()).unwrap() * dx(0);

    let df = derivative_in_direction(&f, &u, &v).unwrap();
    assert_eq!(df.arguments().unwrap(), vec![v.clone()]);
    assert_eq!(df, derivative_in_direction(&f, &u, &v).unwrap());
}

#[test]
fn derivatives_of_tensor_products_keep_shapes() {
    let u = coefficient(vector_p1());
    let v = test_function(vector_p1());
    let a = grad(&u).unwrap();
    let au = dot(&a, &u).unwrap();
    let dau = apply_derivative(&au, &u, &v).unwrap();
    assert_eq!(dau.shape(), au.shape());
    assert!(!is_zero(&dau));
}

fn evaluate_scalar(expr: &Expr, w: &Expr, w_value: f64, v: &Expr) -> f64 {
    let mapping = EvaluationMapping::new()
        .with_constant(w.clone(), w_value)
        .with_constant(v.clone(), 1.0);
    expr.evaluate_at(&origin(), &mapping).unwrap()
}

proptest! {
    #[test]
    fn gateaux_derivative_agrees_with_finite_differences(
        expr in smooth_scalar_expr(vec![coefficient_with_count(p1(), 9000)], 3),
        w_value in -2.0..2.0f64
    ) {
        let w = coefficient_with_count(p1(), 9000);
        let v = test_function(p1());
        let dexpr = apply_derivative(&expr, &w, &v).unwrap();

        let h = 1e-5;
        let ad = evaluate_scalar(&dexpr, &w, w_value, &v);
        let fd = (evaluate_scalar(&expr, &w, w_value + h, &v) - evaluate_scalar(&expr, &w, w_value - h, &v))
            / (2.0 * h);
        assert_scalar_eq!(ad, fd, comp = abs, tol = 1e-4 * (1.0 + fd.abs()));
    }
}
