//! Integration measures.
use crate::display::Repr;
use crate::expr::Expr;
use crate::form::Form;
use crate::integral::Integral;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter, Write};
use std::ops::Mul;

/// The kind of domain an integral is taken over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainType {
    Cell,
    ExteriorFacet,
    InteriorFacet,
    MacroCell,
    Surface,
}

impl DomainType {
    pub const ALL: [DomainType; 5] = [
        Self::Cell,
        Self::ExteriorFacet,
        Self::InteriorFacet,
        Self::MacroCell,
        Self::Surface,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::ExteriorFacet => "exterior_facet",
            Self::InteriorFacet => "interior_facet",
            Self::MacroCell => "macro_cell",
            Self::Surface => "surface",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|domain_type| domain_type.name() == name)
    }

    /// The conventional name of the measure over this domain type.
    pub fn measure_name(&self) -> &'static str {
        match self {
            Self::Cell => "dx",
            Self::ExteriorFacet => "ds",
            Self::InteriorFacet => "dS",
            Self::MacroCell => "dE",
            Self::Surface => "dc",
        }
    }
}

impl Display for DomainType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An integration domain: a domain type together with the id of a subdomain.
///
/// Measures partition the integrals of a form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Measure {
    domain_type: DomainType,
    domain_id: usize,
}

impl Measure {
    pub fn new(domain_type: DomainType, domain_id: usize) -> Self {
        Self { domain_type, domain_id }
    }

    pub fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    pub fn domain_id(&self) -> usize {
        self.domain_id
    }

    /// The same domain type with another subdomain id.
    pub fn with_domain_id(&self, domain_id: usize) -> Self {
        Self::new(self.domain_type, domain_id)
    }
}

impl Display for Measure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.domain_type.measure_name(), self.domain_id)
    }
}

impl Repr for Measure {
    fn write_repr(&self, out: &mut String) {
        let _ = write!(out, "Measure('{}', {})", self.domain_type.name(), self.domain_id);
    }
}

/// Integration over cells.
pub fn dx(domain_id: usize) -> Measure {
    Measure::new(DomainType::Cell, domain_id)
}

/// Integration over exterior facets.
pub fn ds(domain_id: usize) -> Measure {
    Measure::new(DomainType::ExteriorFacet, domain_id)
}

/// Integration over interior facets.
#[allow(non_snake_case)]
pub fn dS(domain_id: usize) -> Measure {
    Measure::new(DomainType::InteriorFacet, domain_id)
}

#[allow(non_snake_case)]
pub fn dE(domain_id: usize) -> Measure {
    Measure::new(DomainType::MacroCell, domain_id)
}

pub fn dc(domain_id: usize) -> Measure {
    Measure::new(DomainType::Surface, domain_id)
}

/// `integrand * dx(0)` is the form consisting of a single integral.
///
/// Panics if the integrand is not a scalar without free indices.
impl Mul<Measure> for Expr {
    type Output = Form;

    fn mul(self, measure: Measure) -> Form {
        let integral = Integral::new(self, measure).unwrap_or_else(|err| panic!("{err}"));
        Form::from(integral)
    }
}

impl Mul<Measure> for &Expr {
    type Output = Form;

    fn mul(self, measure: Measure) -> Form {
        self.clone() * measure
    }
}
