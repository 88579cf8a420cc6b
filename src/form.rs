//! Forms: sums of integrals over distinct measures.
use crate::algebra::sum;
use crate::algorithms::{extract_arguments, extract_coefficients, sorted_arguments};
use crate::cell::{best_cell, Cell};
use crate::display::Repr;
use crate::error::FormError;
use crate::expr::Expr;
use crate::integral::Integral;
use crate::measure::{DomainType, Measure};
use crate::preprocess::{DefaultPreprocessor, FormData, FormPreprocessor, PreprocessOptions};
use eyre::WrapErr;
use itertools::Itertools;
use log::debug;
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::OnceLock;

/// A variational form: an ordered collection of integrals, at most one per measure.
///
/// Forms are immutable. The string representations, the hash and the preprocessed form data
/// are computed on first request and cached for the lifetime of the form.
///
/// Two forms are equal if their signatures, i.e. their reconstructive representations, are
/// equal. The hash only takes the number of integrals into account. It is consistent with
/// equality, but forms with the same number of integrals all collide.
#[derive(Clone)]
pub struct Form {
    integrals: Vec<Integral>,
    repr: OnceLock<String>,
    str: OnceLock<String>,
    hash: OnceLock<u64>,
    form_data: OnceLock<FormData>,
}

impl Form {
    /// Creates a form from integrals over pairwise distinct measures.
    ///
    /// Returns [`FormError::InvariantBreach`] if two integrals share a measure. Use form
    /// addition to combine integrals over the same measure.
    pub fn new(integrals: Vec<Integral>) -> Result<Self, FormError> {
        if let Some(measure) = integrals.iter().map(Integral::measure).duplicates().next() {
            return Err(FormError::InvariantBreach(format!(
                "Form contains several integrals over the measure {measure}"
            )));
        }
        Ok(Self {
            integrals,
            repr: OnceLock::new(),
            str: OnceLock::new(),
            hash: OnceLock::new(),
            form_data: OnceLock::new(),
        })
    }

    /// The form without integrals.
    pub fn empty() -> Self {
        Self::new(Vec::new()).expect("Must succeed since there are no integrals")
    }

    pub fn integrals(&self) -> &[Integral] {
        &self.integrals
    }

    pub fn is_empty(&self) -> bool {
        self.integrals.is_empty()
    }

    pub fn integrals_by_type(&self, domain_type: DomainType) -> Vec<&Integral> {
        self.integrals
            .iter()
            .filter(|integral| integral.domain_type() == domain_type)
            .collect()
    }

    pub fn cell_integrals(&self) -> Vec<&Integral> {
        self.integrals_by_type(DomainType::Cell)
    }

    pub fn exterior_facet_integrals(&self) -> Vec<&Integral> {
        self.integrals_by_type(DomainType::ExteriorFacet)
    }

    pub fn interior_facet_integrals(&self) -> Vec<&Integral> {
        self.integrals_by_type(DomainType::InteriorFacet)
    }

    pub fn macro_cell_integrals(&self) -> Vec<&Integral> {
        self.integrals_by_type(DomainType::MacroCell)
    }

    pub fn surface_integrals(&self) -> Vec<&Integral> {
        self.integrals_by_type(DomainType::Surface)
    }

    pub fn measures(&self) -> Vec<Measure> {
        self.integrals.iter().map(Integral::measure).collect()
    }

    pub fn measures_by_type(&self, domain_type: DomainType) -> Vec<Measure> {
        self.integrals_by_type(domain_type)
            .into_iter()
            .map(Integral::measure)
            .collect()
    }

    /// The `(domain type, domain id)` pairs of the integrals, in order.
    pub fn domains(&self) -> Vec<(DomainType, usize)> {
        self.integrals
            .iter()
            .map(|integral| (integral.domain_type(), integral.domain_id()))
            .collect()
    }

    pub fn domains_by_type(&self, domain_type: DomainType) -> Vec<(DomainType, usize)> {
        self.integrals_by_type(domain_type)
            .into_iter()
            .map(|integral| (integral.domain_type(), integral.domain_id()))
            .collect()
    }

    /// The integrals grouped by `(domain type, domain id)`.
    pub fn integral_groups(&self) -> BTreeMap<(DomainType, usize), Vec<&Integral>> {
        let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for integral in &self.integrals {
            groups
                .entry((integral.domain_type(), integral.domain_id()))
                .or_default()
                .push(integral);
        }
        groups
    }

    /// The first fully defined cell among the integrands.
    ///
    /// Falls back to the undefined cell if no integrand has a defined cell, and returns `None`
    /// if no integrand has a cell at all.
    pub fn cell(&self) -> Option<Cell> {
        best_cell(self.integrals.iter().map(|integral| integral.integrand().cell()))
    }

    /// The arguments of the form, sorted by number.
    pub fn arguments(&self) -> Result<Vec<Expr>, FormError> {
        let mut arguments = Vec::new();
        for integral in &self.integrals {
            arguments.extend(extract_arguments(integral.integrand())?);
        }
        sorted_arguments(arguments)
    }

    /// The coefficients of the form, sorted by count.
    pub fn coefficients(&self) -> Vec<Expr> {
        let mut coefficients = self
            .integrals
            .iter()
            .flat_map(|integral| extract_coefficients(integral.integrand()))
            .unique()
            .collect_vec();
        coefficients.sort_by_key(|c| c.coefficient_count());
        coefficients
    }

    /// The number of arguments of the form: 0 for a functional, 1 for a linear form and 2 for
    /// a bilinear form.
    pub fn rank(&self) -> Result<usize, FormError> {
        Ok(self.arguments()?.len())
    }

    /// The signature of the form, which is its reconstructive representation.
    pub fn signature(&self) -> &str {
        self.repr.get_or_init(|| {
            let mut out = String::new();
            self.write_repr(&mut out);
            out
        })
    }

    /// Rebuilds every integral with a transformed integrand.
    pub fn map_integrands<F>(&self, mut f: F) -> Result<Form, FormError>
    where
        F: FnMut(&Expr) -> Result<Expr, FormError>,
    {
        let integrals = self
            .integrals
            .iter()
            .map(|integral| integral.reconstruct(f(integral.integrand())?))
            .collect::<Result<Vec<_>, _>>()?;
        Form::new(integrals)
    }

    /// The sum of two forms.
    ///
    /// Integrals over measures present in only one of the forms are carried over. Integrals
    /// over a shared measure are replaced by a single integral of the sum of the integrands.
    pub fn merge(&self, other: &Form) -> Result<Form, FormError> {
        let mut integrals = self.integrals.clone();
        for integral in &other.integrals {
            match integrals
                .iter_mut()
                .find(|existing| existing.measure() == integral.measure())
            {
                Some(existing) => {
                    let integrand = sum(existing.integrand(), integral.integrand())?;
                    *existing = existing.reconstruct(integrand)?;
                }
                None => integrals.push(integral.clone()),
            }
        }
        Form::new(integrals)
    }

    /// Scales every integrand by a constant.
    pub fn scale(&self, factor: f64) -> Result<Form, FormError> {
        let integrals = self
            .integrals
            .iter()
            .map(|integral| integral.scale(factor))
            .collect::<Result<Vec<_>, _>>()?;
        Form::new(integrals)
    }

    /// Computes the metadata of the form with the default preprocessor.
    ///
    /// The result is cached, so repeated calls return the same object without recomputation.
    pub fn compute_form_data(&self, options: &PreprocessOptions) -> eyre::Result<&FormData> {
        self.compute_form_data_with(&DefaultPreprocessor, options)
    }

    /// Computes the metadata of the form with the given preprocessor, unless already computed.
    pub fn compute_form_data_with<P>(&self, preprocessor: &P, options: &PreprocessOptions) -> eyre::Result<&FormData>
    where
        P: FormPreprocessor + ?Sized,
    {
        if let Some(form_data) = self.form_data.get() {
            return Ok(form_data);
        }
        debug!("Computing form data for form with {} integrals", self.integrals.len());
        let form_data = preprocessor
            .preprocess(self, options)
            .wrap_err("failed to compute form data")?;
        Ok(self.form_data.get_or_init(|| form_data))
    }

    /// The metadata of the form, if it has been computed.
    pub fn form_data(&self) -> Option<&FormData> {
        self.form_data.get()
    }

    pub fn is_preprocessed(&self) -> bool {
        self.form_data.get().is_some()
    }
}

impl From<Integral> for Form {
    fn from(integral: Integral) -> Self {
        Form::new(vec![integral]).expect("Must succeed since a single integral has a unique measure")
    }
}

impl Repr for Form {
    fn write_repr(&self, out: &mut String) {
        if let Some(repr) = self.repr.get() {
            out.push_str(repr);
            return;
        }
        out.push_str("Form([");
        for (i, integral) in self.integrals.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            integral.write_repr(out);
        }
        out.push_str("])");
    }
}

impl Display for Form {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = self.str.get_or_init(|| {
            if self.integrals.is_empty() {
                "<empty Form>".to_string()
            } else {
                self.integrals.iter().join("\n  +  ")
            }
        });
        write!(f, "{s}")
    }
}

impl Debug for Form {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for Form {}

impl Hash for Form {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hash = *self.hash.get_or_init(|| {
            let mut hasher = FxHasher::default();
            "Form".hash(&mut hasher);
            for _ in &self.integrals {
                "Integral".hash(&mut hasher);
            }
            hasher.finish()
        });
        state.write_u64(hash);
    }
}

impl Add<&Form> for &Form {
    type Output = Form;

    fn add(self, rhs: &Form) -> Form {
        self.merge(rhs)
            .expect("Must succeed since integrands are scalars and measures are merged")
    }
}

impl Add<Form> for Form {
    type Output = Form;

    fn add(self, rhs: Form) -> Form {
        &self + &rhs
    }
}

impl Neg for &Form {
    type Output = Form;

    fn neg(self) -> Form {
        let integrals = self.integrals.iter().map(|integral| -integral).collect();
        Form::new(integrals).expect("Must succeed since negation keeps the measures")
    }
}

impl Neg for Form {
    type Output = Form;

    fn neg(self) -> Form {
        -&self
    }
}

impl Sub<&Form> for &Form {
    type Output = Form;

    fn sub(self, rhs: &Form) -> Form {
        self + &(-rhs)
    }
}

impl Sub<Form> for Form {
    type Output = Form;

    fn sub(self, rhs: Form) -> Form {
        &self - &rhs
    }
}

impl Mul<&Form> for f64 {
    type Output = Form;

    fn mul(self, rhs: &Form) -> Form {
        rhs.scale(self)
            .expect("Must succeed since scaling keeps integrands scalar")
    }
}

impl Mul<Form> for f64 {
    type Output = Form;

    fn mul(self, rhs: Form) -> Form {
        self * &rhs
    }
}

/// The action of a form on an expression, see [`crate::formoperators::action`].
///
/// Panics if the action is not defined.
impl Mul<&Expr> for &Form {
    type Output = Form;

    fn mul(self, rhs: &Expr) -> Form {
        crate::formoperators::action(self, Some(rhs)).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl Mul<Expr> for Form {
    type Output = Form;

    fn mul(self, rhs: Expr) -> Form {
        &self * &rhs
    }
}
