//! Reconstruction of expressions and forms from their reconstructive representation.
//!
//! Parsing goes through the generic term tree of `varform_repr_parse`. Every node is rebuilt
//! through its regular constructor, so a parsed expression is validated exactly like one built
//! by hand, and for any expression `e`, `parse_expr(&e.repr())` is equal to `e`.
use crate::algebra::{division, math_function, neg, power, product, sum};
use crate::argument::{argument, coefficient_with_count};
use crate::cell::Cell;
use crate::conditional::{and, condition, conditional, not, or};
use crate::constant::{float_value, identity, indexed_zero};
use crate::differentiation::{div, grad};
use crate::element::FiniteElement;
use crate::error::FormError;
use crate::expr::{ConditionOp, Expr, MathFunction, Side};
use crate::form::Form;
use crate::geometry::{facet_normal, spatial_coordinate};
use crate::index::{Index, IndexDimensions, IndexEntry, MultiIndex};
use crate::indexed::{component_tensor, index_sum, indexed, list_tensor};
use crate::integral::Integral;
use crate::measure::{DomainType, Measure};
use crate::restriction::restricted;
use crate::shape::Shape;
use crate::tensoralgebra::{dot, inner, outer, trace, transpose};
use std::fmt;
use std::fmt::{Display, Formatter};
use varform_repr_parse::{parse, ParseError, Term};

#[derive(Debug, Clone, PartialEq)]
pub enum ReprError {
    /// The string is not syntactically valid.
    Parse(ParseError),
    /// The string is well-formed, but a node could not be constructed from it.
    Form(FormError),
    /// A term does not have the expected form.
    Unexpected { expected: &'static str, found: String },
}

impl Display for ReprError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Form(err) => write!(f, "{err}"),
            Self::Unexpected { expected, found } => write!(f, "Expected {expected}, found {found}"),
        }
    }
}

impl std::error::Error for ReprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Form(err) => Some(err),
            Self::Unexpected { .. } => None,
        }
    }
}

impl From<ParseError> for ReprError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<FormError> for ReprError {
    fn from(err: FormError) -> Self {
        Self::Form(err)
    }
}

fn unexpected(expected: &'static str, found: &Term) -> ReprError {
    ReprError::Unexpected {
        expected,
        found: format!("{found:?}"),
    }
}

/// Parses the reconstructive representation of an expression.
pub fn parse_expr(repr: &str) -> Result<Expr, ReprError> {
    expr_from_term(&parse(repr)?)
}

/// Parses the signature of a form.
pub fn parse_form(repr: &str) -> Result<Form, ReprError> {
    form_from_term(&parse(repr)?)
}

fn call_args<'t, const N: usize>(
    term: &'t Term,
    name: &str,
    expected: &'static str,
) -> Result<&'t [Term; N], ReprError> {
    match term.as_call() {
        Some((call_name, args)) if call_name == name => args.try_into().map_err(|_| unexpected(expected, term)),
        _ => Err(unexpected(expected, term)),
    }
}

fn usize_from_term(term: &Term) -> Result<usize, ReprError> {
    term.as_integer()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| unexpected("a non-negative integer", term))
}

fn shape_from_term(term: &Term) -> Result<Shape, ReprError> {
    let dims = term
        .as_sequence()
        .ok_or_else(|| unexpected("a shape tuple", term))?
        .iter()
        .map(usize_from_term)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Shape::new(dims))
}

fn cell_from_term(term: &Term) -> Result<Cell, ReprError> {
    let [name] = call_args(term, "Cell", "Cell('<name>')")?;
    name.as_str()
        .and_then(Cell::from_name)
        .ok_or_else(|| unexpected("a known cell name", name))
}

fn element_from_term(term: &Term) -> Result<FiniteElement, ReprError> {
    const EXPECTED: &str = "a finite element";
    let (name, args) = term.as_call().ok_or_else(|| unexpected(EXPECTED, term))?;
    let (family, cell, degree, rest) = match args {
        [family, cell, degree, rest @ ..] => (
            family.as_str().ok_or_else(|| unexpected("an element family", family))?,
            cell_from_term(cell)?,
            usize_from_term(degree)?,
            rest,
        ),
        _ => return Err(unexpected(EXPECTED, term)),
    };
    match (name, rest) {
        ("FiniteElement", []) => Ok(FiniteElement::new(family, cell, degree)),
        ("VectorElement", [dim]) => Ok(FiniteElement::vector(family, cell, degree, usize_from_term(dim)?)),
        ("TensorElement", [shape]) => Ok(FiniteElement::tensor(family, cell, degree, shape_from_term(shape)?)),
        _ => Err(unexpected(EXPECTED, term)),
    }
}

fn index_from_term(term: &Term) -> Result<Index, ReprError> {
    let [count] = call_args(term, "Index", "Index(<count>)")?;
    Ok(Index::with_count(usize_from_term(count)?))
}

fn multiindex_from_term(term: &Term) -> Result<MultiIndex, ReprError> {
    let [entries] = call_args(term, "MultiIndex", "MultiIndex((...))")?;
    let entries = entries
        .as_sequence()
        .ok_or_else(|| unexpected("a tuple of indices", entries))?
        .iter()
        .map(|entry| match entry.as_call() {
            Some(("FixedIndex", [value])) => Ok(IndexEntry::Fixed(usize_from_term(value)?)),
            _ => index_from_term(entry).map(IndexEntry::Symbolic),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultiIndex::new(entries))
}

fn free_index_dimensions_from_term(term: &Term) -> Result<IndexDimensions, ReprError> {
    let pairs = term
        .as_sequence()
        .ok_or_else(|| unexpected("a tuple of (index, dimension) pairs", term))?;
    pairs
        .iter()
        .map(|pair| match pair.as_sequence() {
            Some([index, dim]) => Ok((index_from_term(index)?, usize_from_term(dim)?)),
            _ => Err(unexpected("an (index, dimension) pair", pair)),
        })
        .collect()
}

fn measure_from_term(term: &Term) -> Result<Measure, ReprError> {
    let [domain_type, domain_id] = call_args(term, "Measure", "Measure('<domain type>', <id>)")?;
    let domain_type = domain_type
        .as_str()
        .and_then(DomainType::from_name)
        .ok_or_else(|| unexpected("a known domain type", domain_type))?;
    Ok(Measure::new(domain_type, usize_from_term(domain_id)?))
}

fn form_from_term(term: &Term) -> Result<Form, ReprError> {
    let [integrals] = call_args(term, "Form", "Form([...])")?;
    let integrals = integrals
        .as_sequence()
        .ok_or_else(|| unexpected("a list of integrals", integrals))?
        .iter()
        .map(|integral| {
            let [integrand, measure] = call_args(integral, "Integral", "Integral(<integrand>, <measure>)")?;
            Ok(Integral::new(expr_from_term(integrand)?, measure_from_term(measure)?)?)
        })
        .collect::<Result<Vec<_>, ReprError>>()?;
    Ok(Form::new(integrals)?)
}

fn expr_from_term(term: &Term) -> Result<Expr, ReprError> {
    let (name, args) = term
        .as_call()
        .ok_or_else(|| unexpected("an expression", term))?;

    let operand = |i: usize| -> Result<Expr, ReprError> {
        args.get(i)
            .ok_or_else(|| unexpected("an operand", term))
            .and_then(expr_from_term)
    };
    let expect_arity = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(unexpected("a call with a different number of operands", term))
        }
    };

    if let Some(function) = MathFunction::from_repr_name(name) {
        expect_arity(1)?;
        return Ok(math_function(function, &operand(0)?)?);
    }
    if let Some(op) = ConditionOp::from_repr_name(name) {
        expect_arity(2)?;
        return Ok(condition(op, &operand(0)?, &operand(1)?)?);
    }

    let expr = match (name, args) {
        ("Zero", [shape]) => indexed_zero(shape_from_term(shape)?, IndexDimensions::new()),
        ("Zero", [shape, free]) => indexed_zero(shape_from_term(shape)?, free_index_dimensions_from_term(free)?),
        ("FloatValue", [value]) => float_value(value.as_float().ok_or_else(|| unexpected("a float", value))?),
        ("Identity", [dim]) => identity(usize_from_term(dim)?),
        ("Argument", [element, number]) => argument(element_from_term(element)?, usize_from_term(number)?),
        ("Coefficient", [element, count]) => {
            coefficient_with_count(element_from_term(element)?, usize_from_term(count)?)
        }
        ("SpatialCoordinate", [cell]) => spatial_coordinate(cell_from_term(cell)?)?,
        ("FacetNormal", [cell]) => facet_normal(cell_from_term(cell)?)?,
        ("Indexed", [a, multiindex]) => indexed(&expr_from_term(a)?, multiindex_from_term(multiindex)?)?,
        ("ComponentTensor", [a, multiindex]) => {
            component_tensor(&expr_from_term(a)?, multiindex_from_term(multiindex)?)?
        }
        ("IndexSum", [a, index]) => index_sum(&expr_from_term(a)?, index_from_term(index)?)?,
        ("ListTensor", components) => list_tensor(
            components
                .iter()
                .map(expr_from_term)
                .collect::<Result<Vec<_>, _>>()?,
        )?,
        ("Sum", [_, _]) => sum(&operand(0)?, &operand(1)?)?,
        ("Product", [_, _]) => product(&operand(0)?, &operand(1)?)?,
        ("Division", [_, _]) => division(&operand(0)?, &operand(1)?)?,
        ("Power", [_, _]) => power(&operand(0)?, &operand(1)?)?,
        ("Neg", [_]) => neg(&operand(0)?),
        ("Transposed", [_]) => transpose(&operand(0)?)?,
        ("Inner", [_, _]) => inner(&operand(0)?, &operand(1)?)?,
        ("Outer", [_, _]) => outer(&operand(0)?, &operand(1)?)?,
        ("Dot", [_, _]) => dot(&operand(0)?, &operand(1)?)?,
        ("Trace", [_]) => trace(&operand(0)?)?,
        ("Grad", [_]) => grad(&operand(0)?)?,
        ("Div", [_]) => div(&operand(0)?)?,
        ("PositiveRestricted", [_]) => restricted(Side::Positive, &operand(0)?)?,
        ("NegativeRestricted", [_]) => restricted(Side::Negative, &operand(0)?)?,
        ("AndCondition", [_, _]) => and(&operand(0)?, &operand(1)?)?,
        ("OrCondition", [_, _]) => or(&operand(0)?, &operand(1)?)?,
        ("NotCondition", [_]) => not(&operand(0)?)?,
        ("Conditional", [_, _, _]) => conditional(&operand(0)?, &operand(1)?, &operand(2)?)?,
        _ => return Err(unexpected("a known expression node", term)),
    };
    Ok(expr)
}
