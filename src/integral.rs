use crate::display::Repr;
use crate::error::FormError;
use crate::expr::Expr;
use crate::measure::{DomainType, Measure};
use crate::operators::multiply;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// An integrand together with the measure it is integrated over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integral {
    integrand: Expr,
    measure: Measure,
}

impl Integral {
    /// The integrand must be a scalar without free indices.
    pub fn new(integrand: Expr, measure: Measure) -> Result<Self, FormError> {
        if !integrand.is_true_scalar() {
            return Err(FormError::type_contract(
                "Integral",
                "a scalar integrand without free indices",
                format!("integrand of shape {}", integrand.shape()),
            ));
        }
        Ok(Self { integrand, measure })
    }

    pub fn integrand(&self) -> &Expr {
        &self.integrand
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn domain_type(&self) -> DomainType {
        self.measure.domain_type()
    }

    pub fn domain_id(&self) -> usize {
        self.measure.domain_id()
    }

    /// The integral of another integrand over the same measure.
    pub fn reconstruct(&self, integrand: Expr) -> Result<Self, FormError> {
        Self::new(integrand, self.measure)
    }

    /// The integral with its integrand scaled by a constant.
    pub fn scale(&self, factor: f64) -> Result<Self, FormError> {
        self.reconstruct(multiply(&Expr::from(factor), &self.integrand)?)
    }
}

impl Neg for &Integral {
    type Output = Integral;

    fn neg(self) -> Integral {
        Integral {
            integrand: -&self.integrand,
            measure: self.measure,
        }
    }
}

impl Neg for Integral {
    type Output = Integral;

    fn neg(self) -> Integral {
        -&self
    }
}

impl Display for Integral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} }} * {}", self.integrand, self.measure)
    }
}

impl Repr for Integral {
    fn write_repr(&self, out: &mut String) {
        out.push_str("Integral(");
        self.integrand.write_repr(out);
        out.push_str(", ");
        self.measure.write_repr(out);
        out.push(')');
    }
}
