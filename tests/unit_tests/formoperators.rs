use crate::{p1, p2, vector_p1};
use varform::{
    action, adjoint, argument, coefficient, derivative, dx, grad, inner, test_function, trial_function, Form,
    FormError,
};

fn bilinear_form() -> Form {
    let v = test_function(p1());
    let t = trial_function(p2());
    (&t * &v) * dx(0)
}

#[test]
fn adjoint_swaps_test_and_trial_functions() {
    let a = bilinear_form();
    let a_star = adjoint(&a).unwrap();

    assert_eq!(a_star.rank().unwrap(), 2);
    assert_eq!(a_star.arguments().unwrap(), vec![argument(p2(), 0), argument(p1(), 1)]);
    assert_eq!(adjoint(&a_star).unwrap(), a);
}

#[test]
fn adjoint_of_jacobian() {
    let w = coefficient(p1());
    let energy = (inner(&grad(&w).unwrap(), &grad(&w).unwrap()).unwrap() * &w) * dx(0);
    let jacobian = derivative(&derivative(&energy, &w).unwrap(), &w).unwrap();
    assert_eq!(jacobian.rank().unwrap(), 2);

    let once = adjoint(&jacobian).unwrap();
    let thrice = adjoint(&adjoint(&once).unwrap()).unwrap();
    assert_eq!(thrice, once);
    assert_eq!(once.coefficients(), vec![w.clone()]);
}

#[test]
fn adjoint_requires_two_arguments() {
    let u = coefficient(p1());
    let v = test_function(p1());
    assert_eq!(
        adjoint(&((&u * &v) * dx(0))),
        Err(FormError::ArgumentCount { expected: 2, actual: 1 })
    );
    assert_eq!(
        adjoint(&(&u * dx(0))),
        Err(FormError::ArgumentCount { expected: 2, actual: 0 })
    );
}

#[test]
fn action_replaces_the_last_argument() {
    let a = bilinear_form();
    let w = coefficient(p1());

    let l = action(&adjoint(&a).unwrap(), Some(&w)).unwrap();
    assert_eq!(l.rank().unwrap(), 1);
    assert_eq!(l.arguments().unwrap(), vec![argument(p2(), 0)]);
    assert_eq!(l.coefficients(), vec![w.clone()]);

    // Without an expression, a new coefficient on the element of the trial function is used
    let l = action(&a, None).unwrap();
    assert_eq!(l.rank().unwrap(), 1);
    let coefficients = l.coefficients();
    assert_eq!(coefficients.len(), 1);
    assert_eq!(coefficients[0].element(), Some(&p2()));

    // The action of a linear form is a functional
    let functional = action(&l, Some(&w)).unwrap();
    assert_eq!(functional.rank().unwrap(), 0);

    // Any expression of the right shape can be used
    let nonlinear = action(&a, Some(&(&w * &w))).unwrap();
    assert_eq!(nonlinear.rank().unwrap(), 1);
}

#[test]
fn action_errors() {
    let w = coefficient(p1());
    assert_eq!(action(&(&w * dx(0)), None), Err(FormError::NoArguments));

    let q = coefficient(vector_p1());
    assert!(matches!(
        action(&bilinear_form(), Some(&q)),
        Err(FormError::ShapeMismatch { .. })
    ));
}
