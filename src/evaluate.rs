//! Pointwise evaluation of expressions.
//!
//! Terminals without an intrinsic value (arguments, coefficients, facet normals) are evaluated
//! through user-supplied functions registered in an [`EvaluationMapping`]. Evaluation is
//! primarily a testing tool, for example to check derivatives against finite differences.
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::index::{IndexDimensions, IndexValues};
use itertools::Itertools;
use nalgebra::DVector;
use rustc_hash::FxHashMap;

/// A function evaluating a terminal at a point.
///
/// The arguments are the point, the requested component of the terminal and the directions
/// of the requested spatial derivatives (empty for the value itself).
pub type TerminalFunction = Box<dyn Fn(&DVector<f64>, &[usize], &[usize]) -> f64 + Send + Sync>;

/// Values of terminals, used when evaluating expressions.
#[derive(Default)]
pub struct EvaluationMapping {
    functions: FxHashMap<Expr, TerminalFunction>,
}

impl EvaluationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, terminal: Expr, function: F)
    where
        F: Fn(&DVector<f64>, &[usize], &[usize]) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(terminal, Box::new(function));
    }

    pub fn with<F>(mut self, terminal: Expr, function: F) -> Self
    where
        F: Fn(&DVector<f64>, &[usize], &[usize]) -> f64 + Send + Sync + 'static,
    {
        self.insert(terminal, function);
        self
    }

    /// Maps a scalar terminal to a constant value, with vanishing derivatives.
    pub fn with_constant(self, terminal: Expr, value: f64) -> Self {
        self.with(terminal, move |_, _, derivatives| if derivatives.is_empty() { value } else { 0.0 })
    }

    pub fn get(&self, terminal: &Expr) -> Option<&TerminalFunction> {
        self.functions.get(terminal)
    }
}

struct Evaluator<'a> {
    x: &'a DVector<f64>,
    mapping: &'a EvaluationMapping,
}

/// Runs `f` for every assignment of values to the given indices, summing the results.
fn sum_over(
    dims: &IndexDimensions,
    index_values: &IndexValues,
    mut f: impl FnMut(&IndexValues) -> Result<f64, FormError>,
) -> Result<f64, FormError> {
    if dims.is_empty() {
        return f(index_values);
    }
    let mut total = 0.0;
    let mut values = index_values.clone();
    for assignment in dims.values().map(|&dim| 0..dim).multi_cartesian_product() {
        for (index, value) in dims.keys().zip(assignment) {
            values.insert(*index, value);
        }
        total += f(&values)?;
    }
    Ok(total)
}

fn nonlinear_derivative(expr: &Expr) -> FormError {
    FormError::evaluation(format!(
        "spatial derivatives of the nonlinear operator {} cannot be evaluated",
        expr.kind().name()
    ))
}

impl<'a> Evaluator<'a> {
    fn terminal(&self, expr: &Expr, component: &[usize], derivatives: &[usize]) -> Result<f64, FormError> {
        self.mapping
            .get(expr)
            .map(|function| function(self.x, component, derivatives))
            .ok_or_else(|| FormError::evaluation(format!("no value provided for the terminal {expr}")))
    }

    fn eval(
        &self,
        expr: &Expr,
        component: &[usize],
        derivatives: &[usize],
        index_values: &IndexValues,
    ) -> Result<f64, FormError> {
        use ExprKind::*;
        let linear_only = |value: Result<f64, FormError>| {
            if derivatives.is_empty() {
                value
            } else {
                Err(nonlinear_derivative(expr))
            }
        };

        match expr.kind() {
            Zero { .. } => Ok(0.0),
            FloatValue(value) => Ok(if derivatives.is_empty() { value.into_inner() } else { 0.0 }),
            Identity(_) => Ok(match (derivatives.is_empty(), component) {
                (true, [i, j]) if i == j => 1.0,
                _ => 0.0,
            }),
            SpatialCoordinate(_) => {
                if self.mapping.get(expr).is_some() {
                    return self.terminal(expr, component, derivatives);
                }
                let i = component[0];
                match derivatives {
                    [] => self.x.get(i).copied().ok_or_else(|| {
                        FormError::evaluation(format!(
                            "coordinate {i} is not available in a point of dimension {}",
                            self.x.len()
                        ))
                    }),
                    [d] if *d == i => Ok(1.0),
                    _ => Ok(0.0),
                }
            }
            Argument { .. } | Coefficient { .. } | FacetNormal(_) => self.terminal(expr, component, derivatives),

            Sum(a, b) => Ok(self.eval(a, component, derivatives, index_values)?
                + self.eval(b, component, derivatives, index_values)?),
            Neg(a) => Ok(-self.eval(a, component, derivatives, index_values)?),
            Product(a, b) => linear_only(sum_over(&expr.repeated_index_dimensions(), index_values, |values| {
                Ok(self.eval(a, &[], &[], values)? * self.eval(b, &[], &[], values)?)
            })),
            Division(a, b) => linear_only(
                self.eval(a, component, &[], index_values)
                    .and_then(|num| Ok(num / self.eval(b, &[], &[], index_values)?)),
            ),
            Power(a, b) => linear_only(
                self.eval(a, &[], &[], index_values)
                    .and_then(|base| Ok(base.powf(self.eval(b, &[], &[], index_values)?))),
            ),
            MathFunction(function, a) => {
                linear_only(self.eval(a, &[], &[], index_values).map(|value| function.apply(value)))
            }

            Indexed(a, multiindex) => sum_over(&expr.repeated_index_dimensions(), index_values, |values| {
                let inner_component = multiindex.evaluate(values)?;
                self.eval(a, &inner_component, derivatives, values)
            }),
            ComponentTensor(f, multiindex) => {
                let mut values = index_values.clone();
                for (index, &value) in multiindex.symbolic_indices().zip(component) {
                    values.insert(index, value);
                }
                self.eval(f, &[], derivatives, &values)
            }
            IndexSum(f, _) => sum_over(&expr.repeated_index_dimensions(), index_values, |values| {
                self.eval(f, &[], derivatives, values)
            }),
            ListTensor(components) => {
                let (&first, rest) = component
                    .split_first()
                    .ok_or_else(|| FormError::evaluation("missing component for ListTensor"))?;
                self.eval(&components[first], rest, derivatives, index_values)
            }

            Transposed(a) => self.eval(a, &[component[1], component[0]], derivatives, index_values),
            Trace(a) => (0..a.shape()[0])
                .map(|k| self.eval(a, &[k, k], derivatives, index_values))
                .sum(),
            Inner(a, b) => linear_only(
                a.shape()
                    .components()
                    .iter()
                    .map(|c| {
                        Ok::<_, FormError>(self.eval(a, c, &[], index_values)? * self.eval(b, c, &[], index_values)?)
                    })
                    .sum(),
            ),
            Outer(a, b) => {
                let (ca, cb) = component.split_at(a.rank());
                linear_only(Ok(self.eval(a, ca, &[], index_values)? * self.eval(b, cb, &[], index_values)?))
            }
            Dot(a, b) => {
                let (ca, cb) = component.split_at(a.rank() - 1);
                let contracted = a.shape()[a.rank() - 1];
                linear_only(
                    (0..contracted)
                        .map(|k| {
                            let left = ca.iter().copied().chain([k]).collect_vec();
                            let right = [k].into_iter().chain(cb.iter().copied()).collect_vec();
                            Ok::<_, FormError>(
                                self.eval(a, &left, &[], index_values)? * self.eval(b, &right, &[], index_values)?,
                            )
                        })
                        .sum(),
                )
            }

            Grad(f) => {
                let (&direction, inner_component) = component
                    .split_last()
                    .ok_or_else(|| FormError::evaluation("missing component for Grad"))?;
                let inner_derivatives = derivatives.iter().copied().chain([direction]).collect_vec();
                self.eval(f, inner_component, &inner_derivatives, index_values)
            }
            Div(f) => {
                let gdim = f.shape()[f.rank() - 1];
                (0..gdim)
                    .map(|k| {
                        let inner_component = component.iter().copied().chain([k]).collect_vec();
                        let inner_derivatives = derivatives.iter().copied().chain([k]).collect_vec();
                        self.eval(f, &inner_component, &inner_derivatives, index_values)
                    })
                    .sum()
            }
            Restricted(_, f) => self.eval(f, component, derivatives, index_values),

            Condition(op, a, b) => {
                let a = self.eval(a, &[], &[], index_values)?;
                let b = self.eval(b, &[], &[], index_values)?;
                Ok(if op.apply(a, b) { 1.0 } else { 0.0 })
            }
            And(a, b) => {
                let holds =
                    self.eval(a, &[], &[], index_values)? != 0.0 && self.eval(b, &[], &[], index_values)? != 0.0;
                Ok(if holds { 1.0 } else { 0.0 })
            }
            Or(a, b) => {
                let holds =
                    self.eval(a, &[], &[], index_values)? != 0.0 || self.eval(b, &[], &[], index_values)? != 0.0;
                Ok(if holds { 1.0 } else { 0.0 })
            }
            Not(a) => Ok(if self.eval(a, &[], &[], index_values)? != 0.0 { 0.0 } else { 1.0 }),
            Conditional(c, t, f) => {
                if self.eval(c, &[], &[], index_values)? != 0.0 {
                    self.eval(t, component, derivatives, index_values)
                } else {
                    self.eval(f, component, derivatives, index_values)
                }
            }
        }
    }
}

impl Expr {
    /// Evaluates a component of the expression at the point `x`.
    ///
    /// The component must have one entry per axis of the expression, and every free index
    /// must be assigned a value in `index_values`.
    pub fn evaluate(
        &self,
        x: &DVector<f64>,
        mapping: &EvaluationMapping,
        component: &[usize],
        index_values: &IndexValues,
    ) -> Result<f64, FormError> {
        if component.len() != self.rank() {
            return Err(FormError::evaluation(format!(
                "component {component:?} does not match the shape {}",
                self.shape()
            )));
        }
        if let Some((&value, &dim)) = component.iter().zip(self.shape().iter()).find(|(v, d)| v >= d) {
            return Err(FormError::IndexOutOfRange { index: value, dimension: dim });
        }
        if let Some(gdim) = self.geometric_dimension() {
            if x.len() < gdim {
                return Err(FormError::evaluation(format!(
                    "point of dimension {} on a cell of geometric dimension {gdim}",
                    x.len()
                )));
            }
        }
        if let Some(index) = self
            .free_indices()
            .iter()
            .find(|index| !index_values.contains_key(index))
        {
            return Err(FormError::evaluation(format!("no value assigned to the free index {index}")));
        }
        Evaluator { x, mapping }.eval(self, component, &[], index_values)
    }

    /// Evaluates a scalar expression without free indices at the point `x`.
    pub fn evaluate_at(&self, x: &DVector<f64>, mapping: &EvaluationMapping) -> Result<f64, FormError> {
        self.evaluate(x, mapping, &[], &IndexValues::default())
    }
}
