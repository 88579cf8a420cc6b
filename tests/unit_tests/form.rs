use crate::{p1, p2, vector_p1};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use util::assert_panics;
use varform::{
    argument, coefficient, coefficient_with_count, dS, ds, dx, test_function, trial_function, Cell, DomainType, Form,
    FormError, Integral, Repr,
};

fn hash_of(form: &Form) -> u64 {
    let mut hasher = DefaultHasher::new();
    form.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn integrals_over_the_same_measure_are_merged() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f1 = &u * dx(0);
    let f2 = &v * dx(0);

    let f = &f1 + &f2;
    assert_eq!(f.integrals().len(), 1);
    assert_eq!(f.integrals()[0].measure(), dx(0));
    assert_eq!(f.integrals()[0].integrand().to_string(), format!("{u} + {v}"));

    // The operands are left untouched
    assert_eq!(f1.integrals()[0].integrand(), &u);
    assert_eq!(f2.integrals()[0].integrand(), &v);
}

#[test]
fn integrals_over_distinct_measures_are_kept_apart() {
    let u = coefficient(p1());
    let f1 = &u * dx(0);

    let f3 = &u * ds(0);
    let f = &f1 + &f3;
    assert_eq!(f.integrals().len(), 2);
    assert_eq!(f.measures(), vec![dx(0), ds(0)]);

    // Different subdomains are different measures
    let g = &f1 + &(&u * dx(1));
    assert_eq!(g.integrals().len(), 2);
}

#[test]
fn negation_and_subtraction() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f = (&u * &v) * dx(0);

    assert_eq!(-(-f.clone()), f);
    assert_eq!((-(-&f)).signature(), f.signature());
    assert_ne!(-&f, f);

    // Subtraction is representational, nothing is simplified
    let g = &u * dx(0);
    let zero_form = &g - &g;
    assert_eq!(zero_form.integrals().len(), 1);
    let integrand = zero_form.integrals()[0].integrand();
    assert_eq!(integrand.to_string(), format!("{u} + -{u}"));
    assert_eq!(integrand.repr(), format!("Sum({}, Neg({}))", u.repr(), u.repr()));
}

#[test]
fn scalar_multiplication() {
    let u = coefficient(p1());
    let f = &u * dx(0);
    let g = 2.0 * &f;
    assert_eq!(g.integrals()[0].integrand().to_string(), format!("2.0 * {u}"));
    assert_eq!(g.measures(), f.measures());
}

#[test]
fn form_equality_is_signature_equality() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f = (&u * &v) * dx(0);
    let g = (&u * &v) * dx(0);
    assert_eq!(f, g);
    assert_eq!(hash_of(&f), hash_of(&g));
    assert_ne!(f, (&v * &u) * dx(0));
    assert_ne!(f, (&u * &v) * dx(1));
}

#[test]
fn hash_only_depends_on_number_of_integrals() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f = &u * dx(0);
    let g = &v * dx(3);
    assert_ne!(f, g);
    assert_eq!(hash_of(&f), hash_of(&g));
    assert_eq!(hash_of(&f), hash_of(&(&u * ds(0))));

    let two = &f + &(&u * ds(0));
    assert_ne!(hash_of(&f), hash_of(&two));
    assert_eq!(hash_of(&two), hash_of(&(&(&v * dS(1)) + &(&u * dx(2)))));
}

#[test]
fn signature_and_display() {
    let w = coefficient_with_count(p1(), 1000);
    let f = (&w * &w) * dx(0) + &w * ds(1);

    let single = &w * dx(0);
    insta::assert_snapshot!(
        single.signature(),
        @"Form([Integral(Coefficient(FiniteElement('Lagrange', Cell('triangle'), 1), 1000), Measure('cell', 0))])"
    );
    assert_eq!(f.to_string(), "{ w_1000 * w_1000 } * dx(0)\n  +  { w_1000 } * ds(1)");
    assert_eq!(Form::empty().to_string(), "<empty Form>");
    assert_eq!(format!("{f:?}"), f.signature());

    // The signature is computed once
    assert!(std::ptr::eq(f.signature(), f.signature()));
}

#[test]
fn duplicate_measures_are_rejected() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let integrals = vec![
        Integral::new(u.clone(), dx(0)).unwrap(),
        Integral::new(v.clone(), dx(0)).unwrap(),
    ];
    assert!(matches!(Form::new(integrals), Err(FormError::InvariantBreach(_))));

    let integrals = vec![Integral::new(u, dx(0)).unwrap(), Integral::new(v, ds(0)).unwrap()];
    assert_eq!(Form::new(integrals).unwrap().integrals().len(), 2);
}

#[test]
fn integrands_must_be_true_scalars() {
    let w = coefficient(vector_p1());
    assert!(matches!(Integral::new(w.clone(), dx(0)), Err(FormError::TypeContract { .. })));
    assert!(Integral::new(w.index(varform::Index::new()).unwrap(), dx(0)).is_err());
    assert_panics!(w.clone() * dx(0));
}

#[test]
fn integral_accessors() {
    let u = coefficient(p1());
    let v = test_function(p1());
    let f = &u * dx(0) + &v * ds(1) + &u * dS(0) + &v * dx(2);

    assert_eq!(f.integrals().len(), 4);
    assert_eq!(f.measures(), vec![dx(0), ds(1), dS(0), dx(2)]);
    assert_eq!(f.cell_integrals().len(), 2);
    assert_eq!(f.exterior_facet_integrals().len(), 1);
    assert_eq!(f.interior_facet_integrals().len(), 1);
    assert!(f.macro_cell_integrals().is_empty());
    assert!(f.surface_integrals().is_empty());
    assert_eq!(f.measures_by_type(DomainType::Cell), vec![dx(0), dx(2)]);
    assert_eq!(
        f.domains(),
        vec![
            (DomainType::Cell, 0),
            (DomainType::ExteriorFacet, 1),
            (DomainType::InteriorFacet, 0),
            (DomainType::Cell, 2)
        ]
    );
    assert_eq!(f.domains_by_type(DomainType::InteriorFacet), vec![(DomainType::InteriorFacet, 0)]);

    let groups = f.integral_groups();
    let keys: Vec<_> = groups.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            (DomainType::Cell, 0),
            (DomainType::Cell, 2),
            (DomainType::ExteriorFacet, 1),
            (DomainType::InteriorFacet, 0)
        ]
    );
    assert_eq!(groups[&(DomainType::Cell, 2)][0].integrand(), &v);
}

#[test]
fn cells_arguments_and_coefficients() {
    let u = coefficient(p1());
    let w = coefficient(p2());
    let v = test_function(p1());
    let t = trial_function(p2());
    let a = (&u * &t * &v + &w) * dx(0);

    assert_eq!(a.cell(), Some(Cell::Triangle));
    assert_eq!(Form::empty().cell(), None);
    assert_eq!(a.arguments().unwrap(), vec![v.clone(), t.clone()]);
    assert_eq!(a.rank().unwrap(), 2);
    assert_eq!(a.coefficients(), vec![u.clone(), w.clone()]);
    assert_eq!(Form::empty().rank().unwrap(), 0);

    let undefined = coefficient(varform::FiniteElement::lagrange(Cell::Undefined, 1));
    assert_eq!((&undefined * dx(0)).cell(), Some(Cell::Undefined));
    assert_eq!((&undefined * dx(0) + &u * ds(0)).cell(), Some(Cell::Triangle));

    // Two different arguments may not share a number
    let conflicting = (argument(p1(), 0) + argument(p2(), 0)) * dx(0);
    assert!(conflicting.arguments().is_err());
}

#[test]
fn forms_times_expressions_are_actions() {
    let v = test_function(p1());
    let t = trial_function(p1());
    let w = coefficient(p1());
    let a = (&t * &v) * dx(0);

    let l = &a * &w;
    assert_eq!(l.rank().unwrap(), 1);
    assert_eq!(l.integrals()[0].integrand(), &(&w * &v));
    assert_eq!(l, varform::action(&a, Some(&w)).unwrap());
}
