use crate::{p1, vector_p1};
use varform::conditional::{and, gt, lt, not};
use varform::{
    abs, argument, as_vector, coefficient, conditional, cos, dS, ds, dx, exp, facet_normal, float_value, grad,
    identity, index_sum, inner, ln, negative_restricted, outer, parse_expr, parse_form, positive_restricted, sin,
    spatial_coordinate, sqrt, test_function, trace, transpose, zero_tensor, Cell, Expr, FormError, Index, Repr,
    ReprError,
};

fn assert_round_trip(expr: &Expr) {
    let repr = expr.repr();
    let parsed = parse_expr(&repr).unwrap_or_else(|err| panic!("failed to parse {repr}: {err}"));
    assert_eq!(&parsed, expr, "round trip of {repr}");
    assert_eq!(parsed.repr(), repr);
}

#[test]
fn terminals_round_trip() {
    let i = Index::new();
    let terminals = [
        coefficient(p1()),
        coefficient(vector_p1()),
        test_function(p1()),
        argument(vector_p1(), 1),
        float_value(2.5),
        float_value(-1.5),
        float_value(1e-20),
        float_value(f64::NAN),
        float_value(f64::INFINITY),
        float_value(f64::NEG_INFINITY),
        zero_tensor([2, 3]),
        zero_tensor([3]).index(i).unwrap(),
        identity(3),
        spatial_coordinate(Cell::Triangle).unwrap(),
        facet_normal(Cell::Tetrahedron).unwrap(),
    ];
    for terminal in &terminals {
        assert_round_trip(terminal);
    }
}

#[test]
fn scalar_algebra_round_trips() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let exprs = [
        &u * &v + sin(&u).unwrap() / 2.0,
        u.pow(2.0).unwrap() - &v,
        -&u,
        sqrt(&u * &u + 1.0).unwrap() * exp(&v).unwrap(),
        ln(abs(&u).unwrap() + 1.0).unwrap() * cos(&u).unwrap(),
        positive_restricted(&u).unwrap() * negative_restricted(&v).unwrap(),
    ];
    for expr in &exprs {
        assert_round_trip(expr);
    }
}

#[test]
fn tensor_algebra_round_trips() {
    let q = coefficient(vector_p1());
    let p = test_function(vector_p1());
    let gq = grad(&q).unwrap();
    let i = Index::new();
    let exprs = [
        gq.clone(),
        inner(&gq, &grad(&p).unwrap()).unwrap(),
        outer(&q, &p).unwrap(),
        &gq * &q,
        trace(&gq).unwrap(),
        transpose(&gq).unwrap(),
        varform::div(&q).unwrap(),
        2.0 * &q,
        q.index(i).unwrap() * p.index(i).unwrap(),
        index_sum(&q.index(i).unwrap(), i).unwrap(),
        as_vector(vec![q.index(2usize).unwrap(), float_value(1.0), p.index(0usize).unwrap()]).unwrap(),
        gq.index((1usize, i)).unwrap(),
    ];
    for expr in &exprs {
        assert_round_trip(expr);
    }
}

#[test]
fn conditionals_round_trip() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let c = and(&lt(u.clone(), 1.0).unwrap(), &not(&gt(u.clone(), -1.0).unwrap()).unwrap()).unwrap();
    assert_round_trip(&conditional(&c, &u, &v).unwrap());
}

#[test]
fn forms_round_trip() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let form = (&u * &v) * dx(0) + &u * ds(1) + positive_restricted(&v).unwrap() * dS(2);
    let parsed = parse_form(form.signature()).unwrap();
    assert_eq!(parsed, form);
    assert_eq!(parsed.integrals().len(), 3);
    assert_eq!(parse_form("Form([])").unwrap(), varform::Form::empty());
}

#[test]
fn argument_repr() {
    insta::assert_snapshot!(
        argument(p1(), 0).repr(),
        @"Argument(FiniteElement('Lagrange', Cell('triangle'), 1), 0)"
    );
}

#[test]
fn invalid_representations() {
    assert!(matches!(parse_expr("Sum(1.0"), Err(ReprError::Parse(_))));
    assert!(matches!(parse_expr("Frobnicate(1.0)"), Err(ReprError::Unexpected { .. })));
    assert!(matches!(
        parse_expr("Identity(Cell('triangle'))"),
        Err(ReprError::Unexpected { .. })
    ));
    assert!(matches!(parse_form("Sum(1.0, 2.0)"), Err(ReprError::Unexpected { .. })));

    // Well-formed, but the node cannot be constructed
    let u = coefficient(p1());
    let q = coefficient(vector_p1());
    let repr = format!("Sum({}, {})", u.repr(), q.repr());
    assert!(matches!(
        parse_expr(&repr),
        Err(ReprError::Form(FormError::ShapeMismatch { .. }))
    ));
}
