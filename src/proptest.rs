//! Strategies for property-based testing of expressions and forms.
use crate::algebra::{division, math_function, neg, product, sum};
use crate::cell::Cell;
use crate::constant::float_value;
use crate::element::FiniteElement;
use crate::expr::{Expr, MathFunction};
use crate::measure::{DomainType, Measure};
use ::proptest::prelude::*;

impl Arbitrary for Cell {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Cell::Interval),
            Just(Cell::Triangle),
            Just(Cell::Tetrahedron),
            Just(Cell::Quadrilateral),
            Just(Cell::Hexahedron)
        ]
        .boxed()
    }
}

impl Arbitrary for DomainType {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        ::proptest::sample::select(DomainType::ALL.to_vec()).boxed()
    }
}

impl Arbitrary for Measure {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<DomainType>(), 0..4usize)
            .prop_map(|(domain_type, domain_id)| Measure::new(domain_type, domain_id))
            .boxed()
    }
}

/// Scalar Lagrange elements of low degree on any defined cell.
pub fn scalar_lagrange_element() -> impl Strategy<Value = FiniteElement> {
    (any::<Cell>(), 1..=3usize).prop_map(|(cell, degree)| FiniteElement::lagrange(cell, degree))
}

/// Nonzero constants of moderate magnitude.
pub fn nonzero_constant() -> impl Strategy<Value = f64> {
    prop_oneof![-2.0..-0.25, 0.25..2.0]
}

fn scalar_op(result: Result<Expr, crate::error::FormError>) -> Expr {
    result.expect("Must succeed since all operands are scalars without free indices")
}

/// Smooth scalar expressions built from the given scalar terminals and constants.
///
/// The expressions are finite and infinitely differentiable for all finite terminal values,
/// which makes them suitable for comparing symbolic derivatives against finite differences.
pub fn smooth_scalar_expr(terminals: Vec<Expr>, depth: u32) -> impl Strategy<Value = Expr> {
    assert!(!terminals.is_empty(), "Need at least one terminal");
    assert!(
        terminals.iter().all(Expr::is_true_scalar),
        "Terminals must be scalars without free indices"
    );
    let leaf = prop_oneof![
        3 => ::proptest::sample::select(terminals),
        1 => nonzero_constant().prop_map(float_value),
    ];
    leaf.prop_recursive(depth, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| scalar_op(sum(&a, &b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| scalar_op(product(&a, &b))),
            // a / (2 + b^2) has a denominator bounded away from zero
            (inner.clone(), inner.clone()).prop_map(|(a, b)| {
                let denominator = scalar_op(sum(&float_value(2.0), &scalar_op(product(&b, &b))));
                scalar_op(division(&a, &denominator))
            }),
            inner.clone().prop_map(|a| neg(&a)),
            inner.clone().prop_map(|a| scalar_op(math_function(MathFunction::Sin, &a))),
            inner.prop_map(|a| scalar_op(math_function(MathFunction::Cos, &a))),
        ]
    })
}
