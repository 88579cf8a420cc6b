use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A reference cell type.
///
/// The undefined cell acts as a placeholder for forms that are built before the cell is known,
/// and is replaced by a concrete cell during preprocessing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Undefined,
    Interval,
    Triangle,
    Tetrahedron,
    Quadrilateral,
    Hexahedron,
}

impl Cell {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Interval => "interval",
            Self::Triangle => "triangle",
            Self::Tetrahedron => "tetrahedron",
            Self::Quadrilateral => "quadrilateral",
            Self::Hexahedron => "hexahedron",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "undefined" => Some(Self::Undefined),
            "interval" => Some(Self::Interval),
            "triangle" => Some(Self::Triangle),
            "tetrahedron" => Some(Self::Tetrahedron),
            "quadrilateral" => Some(Self::Quadrilateral),
            "hexahedron" => Some(Self::Hexahedron),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The dimension of the space the cell is embedded in, or `None` for the undefined cell.
    pub fn geometric_dimension(&self) -> Option<usize> {
        self.topological_dimension()
    }

    pub fn topological_dimension(&self) -> Option<usize> {
        match self {
            Self::Undefined => None,
            Self::Interval => Some(1),
            Self::Triangle | Self::Quadrilateral => Some(2),
            Self::Tetrahedron | Self::Hexahedron => Some(3),
        }
    }

    pub fn num_facets(&self) -> Option<usize> {
        match self {
            Self::Undefined => None,
            Self::Interval => Some(2),
            Self::Triangle => Some(3),
            Self::Tetrahedron | Self::Quadrilateral => Some(4),
            Self::Hexahedron => Some(6),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Picks the best cell among a sequence of candidates.
///
/// The first fully defined cell wins. If only undefined cells are present, the undefined cell
/// is returned, and if there are no candidates at all, `None`.
pub(crate) fn best_cell(candidates: impl IntoIterator<Item = Option<Cell>>) -> Option<Cell> {
    let mut best = None;
    for cell in candidates.into_iter().flatten() {
        best = Some(cell);
        if !cell.is_undefined() {
            break;
        }
    }
    best
}
