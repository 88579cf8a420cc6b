//! The hand-off point to code generation: form metadata.
//!
//! Before a form can be compiled, its arguments and coefficients need to be identified and
//! named, their elements need to be resolved, and the cell of the form must be determined.
//! This is the job of a [`FormPreprocessor`]. [`Form::compute_form_data`] runs the
//! preprocessor at most once per form and caches the resulting [`FormData`].
use crate::algorithms::replace;
use crate::argument::{argument, coefficient_with_count};
use crate::cell::Cell;
use crate::element::FiniteElement;
use crate::expr::Expr;
use crate::form::Form;
use crate::measure::{DomainType, Measure};
use eyre::{bail, eyre, WrapErr};
use itertools::Itertools;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Configuration of the preprocessing of a form.
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    object_names: FxHashMap<Expr, String>,
    common_cell: Option<Cell>,
    element_mapping: FxHashMap<FiniteElement, FiniteElement>,
}

impl PreprocessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names an argument or coefficient in the generated metadata.
    pub fn with_object_name(mut self, object: Expr, name: impl Into<String>) -> Self {
        self.object_names.insert(object, name.into());
        self
    }

    /// The cell to use for elements and expressions on the undefined cell.
    pub fn with_common_cell(mut self, cell: Cell) -> Self {
        self.common_cell = Some(cell);
        self
    }

    /// Replaces an element by another during preprocessing.
    pub fn with_element_mapping(mut self, from: FiniteElement, to: FiniteElement) -> Self {
        self.element_mapping.insert(from, to);
        self
    }

    pub fn object_names(&self) -> &FxHashMap<Expr, String> {
        &self.object_names
    }

    pub fn common_cell(&self) -> Option<Cell> {
        self.common_cell
    }

    pub fn element_mapping(&self) -> &FxHashMap<FiniteElement, FiniteElement> {
        &self.element_mapping
    }
}

/// Metadata of a preprocessed form.
///
/// Expression-valued fields are not serialized.
#[derive(Debug, Clone, Serialize)]
pub struct FormData {
    /// The signature of the original form.
    pub signature: String,
    pub rank: usize,
    pub num_coefficients: usize,
    pub argument_names: Vec<String>,
    pub coefficient_names: Vec<String>,
    /// The elements of the arguments followed by those of the coefficients, after mapping.
    pub elements: Vec<FiniteElement>,
    pub unique_elements: Vec<FiniteElement>,
    pub cell: Option<Cell>,
    pub geometric_dimension: Option<usize>,
    pub integral_domains: Vec<Measure>,
    pub num_integrals_by_type: BTreeMap<DomainType, usize>,
    #[serde(skip)]
    pub original_arguments: Vec<Expr>,
    #[serde(skip)]
    pub original_coefficients: Vec<Expr>,
    /// The form with mapped elements and coefficients renumbered from zero.
    #[serde(skip)]
    pub preprocessed_form: Box<Form>,
}

/// Computes the metadata of a form.
pub trait FormPreprocessor {
    fn preprocess(&self, form: &Form, options: &PreprocessOptions) -> eyre::Result<FormData>;
}

/// Determines the cell, maps elements, renumbers coefficients and collects names.
#[derive(Debug, Copy, Clone, Default)]
pub struct DefaultPreprocessor;

impl DefaultPreprocessor {
    fn determine_cell(
        &self,
        form: &Form,
        elements: &[FiniteElement],
        options: &PreprocessOptions,
    ) -> eyre::Result<Option<Cell>> {
        let defined_cells = elements
            .iter()
            .map(FiniteElement::cell)
            .chain(form.cell())
            .filter(|cell| !cell.is_undefined())
            .unique()
            .collect_vec();
        if defined_cells.len() > 1 {
            bail!(
                "form is defined on several cells ({}), which is not supported",
                defined_cells.iter().join(", ")
            );
        }

        match (defined_cells.first().copied(), options.common_cell()) {
            (Some(cell), Some(common)) if cell != common => {
                bail!("form is defined on the cell {cell}, but the common cell {common} was requested")
            }
            (Some(cell), _) => Ok(Some(cell)),
            (None, Some(common)) => Ok(Some(common)),
            (None, None) => {
                warn!("Unable to determine a cell for the form, and no common cell was provided.");
                Ok(None)
            }
        }
    }

    fn map_element(&self, element: &FiniteElement, cell: Option<Cell>, options: &PreprocessOptions) -> FiniteElement {
        let mapped = options
            .element_mapping()
            .get(element)
            .cloned()
            .unwrap_or_else(|| element.clone());
        match cell {
            Some(cell) if mapped.cell().is_undefined() => mapped.with_cell(cell),
            _ => mapped,
        }
    }
}

impl FormPreprocessor for DefaultPreprocessor {
    fn preprocess(&self, form: &Form, options: &PreprocessOptions) -> eyre::Result<FormData> {
        let arguments = form.arguments()?;
        let coefficients = form.coefficients();

        let original_elements = arguments
            .iter()
            .chain(&coefficients)
            .map(|object| {
                object
                    .element()
                    .cloned()
                    .ok_or_else(|| eyre!("form object {object} has no element"))
            })
            .collect::<eyre::Result<Vec<_>>>()?;
        let cell = self.determine_cell(form, &original_elements, options)?;
        let elements = original_elements
            .iter()
            .map(|element| self.map_element(element, cell, options))
            .collect_vec();
        let unique_elements = elements.iter().unique().cloned().collect_vec();

        let (argument_elements, coefficient_elements) = elements.split_at(arguments.len());
        let mut replacements = FxHashMap::default();
        for (original, element) in arguments.iter().zip(argument_elements) {
            let number = original
                .argument_number()
                .ok_or_else(|| eyre!("expected an argument, found {original}"))?;
            replacements.insert(original.clone(), argument(element.clone(), number));
        }
        for (count, (original, element)) in coefficients.iter().zip(coefficient_elements).enumerate() {
            replacements.insert(original.clone(), coefficient_with_count(element.clone(), count));
        }
        let preprocessed_form = form
            .map_integrands(|integrand| replace(integrand, &replacements))
            .wrap_err("failed to renumber form arguments and coefficients")?;

        let name_of = |object: &Expr, default: String| {
            options
                .object_names()
                .get(object)
                .cloned()
                .unwrap_or(default)
        };
        let argument_names = arguments
            .iter()
            .enumerate()
            .map(|(i, argument)| name_of(argument, format!("v{i}")))
            .collect_vec();
        let coefficient_names = coefficients
            .iter()
            .enumerate()
            .map(|(i, coefficient)| name_of(coefficient, format!("w{i}")))
            .collect_vec();

        let mut num_integrals_by_type = BTreeMap::new();
        for integral in form.integrals() {
            *num_integrals_by_type.entry(integral.domain_type()).or_insert(0) += 1;
        }

        debug!(
            "Preprocessed form of rank {} with {} coefficients on cell {:?}",
            arguments.len(),
            coefficients.len(),
            cell
        );

        Ok(FormData {
            signature: form.signature().to_string(),
            rank: arguments.len(),
            num_coefficients: coefficients.len(),
            argument_names,
            coefficient_names,
            elements,
            unique_elements,
            cell,
            geometric_dimension: cell.and_then(|cell| cell.geometric_dimension()),
            integral_domains: form.measures(),
            num_integrals_by_type,
            original_arguments: arguments,
            original_coefficients: coefficients,
            preprocessed_form: Box::new(preprocessed_form),
        })
    }
}
