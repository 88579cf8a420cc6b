//! Operators that derive new forms from existing ones.
use crate::algorithms::replace;
use crate::argument::{argument, coefficient};
use crate::constant::is_zero;
use crate::derivative::apply_derivative;
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use crate::form::Form;
use log::debug;
use rustc_hash::FxHashMap;

/// The Gateaux derivative of a form with respect to a coefficient.
///
/// The direction of the derivative is a new argument on the element of the coefficient. Its
/// number is the rank of the form, so the derivative of a functional is a linear form in a
/// test function and the derivative of a linear form is a bilinear form in a trial function.
pub fn derivative(form: &Form, coefficient: &Expr) -> Result<Form, FormError> {
    let element = match coefficient.kind() {
        ExprKind::Coefficient { element, .. } => element.clone(),
        _ => {
            return Err(FormError::NotAnUnknown {
                found: coefficient.to_string(),
            })
        }
    };
    let direction = argument(element, form.rank()?);
    derivative_in_direction(form, coefficient, &direction)
}

/// The Gateaux derivative of a form with respect to a coefficient in the given direction.
///
/// Integrals whose integrand has a vanishing derivative are dropped.
pub fn derivative_in_direction(form: &Form, coefficient: &Expr, direction: &Expr) -> Result<Form, FormError> {
    let mut integrals = Vec::with_capacity(form.integrals().len());
    for integral in form.integrals() {
        let integrand = apply_derivative(integral.integrand(), coefficient, direction)?;
        if !is_zero(&integrand) {
            integrals.push(integral.reconstruct(integrand)?);
        }
    }
    debug!(
        "Derivative with respect to {coefficient} kept {} of {} integrals",
        integrals.len(),
        form.integrals().len()
    );
    Form::new(integrals)
}

/// The adjoint of a bilinear form, obtained by swapping the test and trial functions.
pub fn adjoint(form: &Form) -> Result<Form, FormError> {
    let arguments = form.arguments()?;
    let [test, trial] = arguments.as_slice() else {
        return Err(FormError::ArgumentCount {
            expected: 2,
            actual: arguments.len(),
        });
    };
    let (test_number, trial_number) = (number_of(test)?, number_of(trial)?);
    let (test_element, trial_element) = (element_of(test)?, element_of(trial)?);

    let mut replacements = FxHashMap::default();
    replacements.insert(test.clone(), argument(test_element, trial_number));
    replacements.insert(trial.clone(), argument(trial_element, test_number));
    form.map_integrands(|integrand| replace(integrand, &replacements))
}

/// The action of a form on an expression: the argument with the highest number is replaced.
///
/// Without an expression, a new coefficient on the element of the replaced argument is used.
/// The action of a bilinear form is thus a linear form, and the action of a linear form is a
/// functional.
pub fn action(form: &Form, expr: Option<&Expr>) -> Result<Form, FormError> {
    let arguments = form.arguments()?;
    let last = arguments.last().ok_or(FormError::NoArguments)?;
    let replacement = match expr {
        Some(expr) => expr.clone(),
        None => coefficient(element_of(last)?),
    };
    if replacement.shape() != last.shape() {
        return Err(FormError::shape_mismatch("action", last.shape(), replacement.shape()));
    }

    let mut replacements = FxHashMap::default();
    replacements.insert(last.clone(), replacement);
    form.map_integrands(|integrand| replace(integrand, &replacements))
}

fn number_of(argument: &Expr) -> Result<usize, FormError> {
    argument
        .argument_number()
        .ok_or_else(|| FormError::InvariantBreach(format!("{argument} is not an argument")))
}

fn element_of(object: &Expr) -> Result<crate::element::FiniteElement, FormError> {
    object
        .element()
        .cloned()
        .ok_or_else(|| FormError::InvariantBreach(format!("{object} has no element")))
}
