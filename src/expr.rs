//! The expression tree.
//!
//! An [`Expr`] is a cheap, reference-counted handle to an immutable node. Subtrees are freely
//! shared between parents, which is sound because no node is ever mutated after construction.
//! All validation happens in the constructors (see [`crate::algebra`], [`crate::indexed`],
//! [`crate::tensoralgebra`] and friends), and the derived properties of a node (shape, free
//! indices, index dimensions, cell and structural hash) are computed exactly once, when the node
//! is built.
use crate::cell::{best_cell, Cell};
use crate::element::FiniteElement;
use crate::error::FormError;
use crate::index::{Index, IndexDimensions, MultiIndex};
use crate::shape::Shape;
use crate::{algebra, conditional, constant, differentiation, indexed, restriction, tensoralgebra};
use ordered_float::OrderedFloat;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Elementary scalar functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MathFunction {
    Sqrt,
    Exp,
    Ln,
    Sin,
    Cos,
    Abs,
}

impl MathFunction {
    /// The name used in the reconstructive representation.
    pub fn repr_name(&self) -> &'static str {
        match self {
            Self::Sqrt => "Sqrt",
            Self::Exp => "Exp",
            Self::Ln => "Ln",
            Self::Sin => "Sin",
            Self::Cos => "Cos",
            Self::Abs => "Abs",
        }
    }

    pub fn from_repr_name(name: &str) -> Option<Self> {
        match name {
            "Sqrt" => Some(Self::Sqrt),
            "Exp" => Some(Self::Exp),
            "Ln" => Some(Self::Ln),
            "Sin" => Some(Self::Sin),
            "Cos" => Some(Self::Cos),
            "Abs" => Some(Self::Abs),
            _ => None,
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Abs => x.abs(),
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ConditionOp {
    pub fn repr_name(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Le => "LE",
            Self::Ge => "GE",
        }
    }

    pub fn from_repr_name(name: &str) -> Option<Self> {
        match name {
            "EQ" => Some(Self::Eq),
            "NE" => Some(Self::Ne),
            "LT" => Some(Self::Lt),
            "GT" => Some(Self::Gt),
            "LE" => Some(Self::Le),
            "GE" => Some(Self::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => a < b,
            Self::Gt => a > b,
            Self::Le => a <= b,
            Self::Ge => a >= b,
        }
    }
}

/// The side of an interior facet an expression is restricted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Positive,
    Negative,
}

/// The closed catalog of expression node kinds.
///
/// Every operation on expressions is a total match over this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// A zero tensor. Zeros produced inside index expressions carry free indices.
    Zero {
        shape: Shape,
        free_indices: IndexDimensions,
    },
    FloatValue(OrderedFloat<f64>),
    Identity(usize),
    /// A basis function in a finite element space: the test (0) or trial (1) function.
    Argument {
        element: FiniteElement,
        number: usize,
    },
    /// A discrete function in a finite element space.
    Coefficient {
        element: FiniteElement,
        count: usize,
    },
    SpatialCoordinate(Cell),
    FacetNormal(Cell),

    Sum(Expr, Expr),
    /// Product of two scalars, with implicit summation over repeated indices.
    Product(Expr, Expr),
    Division(Expr, Expr),
    Power(Expr, Expr),
    Neg(Expr),
    MathFunction(MathFunction, Expr),

    Indexed(Expr, MultiIndex),
    ComponentTensor(Expr, MultiIndex),
    IndexSum(Expr, Index),
    ListTensor(Vec<Expr>),

    Transposed(Expr),
    Inner(Expr, Expr),
    Outer(Expr, Expr),
    Dot(Expr, Expr),
    Trace(Expr),

    Grad(Expr),
    Div(Expr),

    Restricted(Side, Expr),

    Condition(ConditionOp, Expr, Expr),
    And(Expr, Expr),
    Or(Expr, Expr),
    Not(Expr),
    Conditional(Expr, Expr, Expr),
}

impl ExprKind {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Zero { .. }
                | Self::FloatValue(_)
                | Self::Identity(_)
                | Self::Argument { .. }
                | Self::Coefficient { .. }
                | Self::SpatialCoordinate(_)
                | Self::FacetNormal(_)
        )
    }

    /// The direct expression children, in order.
    pub fn operands(&self) -> Vec<&Expr> {
        use ExprKind::*;
        match self {
            Zero { .. }
            | FloatValue(_)
            | Identity(_)
            | Argument { .. }
            | Coefficient { .. }
            | SpatialCoordinate(_)
            | FacetNormal(_) => Vec::new(),
            Neg(a)
            | ExprKind::MathFunction(_, a)
            | Indexed(a, _)
            | ComponentTensor(a, _)
            | IndexSum(a, _)
            | Transposed(a)
            | Trace(a)
            | Grad(a)
            | Div(a)
            | Restricted(_, a)
            | Not(a) => vec![a],
            Sum(a, b)
            | Product(a, b)
            | Division(a, b)
            | Power(a, b)
            | Inner(a, b)
            | Outer(a, b)
            | Dot(a, b)
            | Condition(_, a, b)
            | And(a, b)
            | Or(a, b) => vec![a, b],
            Conditional(c, t, f) => vec![c, t, f],
            ListTensor(components) => components.iter().collect(),
        }
    }

    /// A short name of the node kind, used in error messages.
    pub fn name(&self) -> &'static str {
        use ExprKind::*;
        match self {
            Zero { .. } => "Zero",
            FloatValue(_) => "FloatValue",
            Identity(_) => "Identity",
            Argument { .. } => "Argument",
            Coefficient { .. } => "Coefficient",
            SpatialCoordinate(_) => "SpatialCoordinate",
            FacetNormal(_) => "FacetNormal",
            Sum(..) => "Sum",
            Product(..) => "Product",
            Division(..) => "Division",
            Power(..) => "Power",
            Neg(_) => "Neg",
            ExprKind::MathFunction(function, _) => function.repr_name(),
            Indexed(..) => "Indexed",
            ComponentTensor(..) => "ComponentTensor",
            IndexSum(..) => "IndexSum",
            ListTensor(_) => "ListTensor",
            Transposed(_) => "Transposed",
            Inner(..) => "Inner",
            Outer(..) => "Outer",
            Dot(..) => "Dot",
            Trace(_) => "Trace",
            Grad(_) => "Grad",
            Div(_) => "Div",
            Restricted(Side::Positive, _) => "PositiveRestricted",
            Restricted(Side::Negative, _) => "NegativeRestricted",
            Condition(op, ..) => op.repr_name(),
            And(..) => "AndCondition",
            Or(..) => "OrCondition",
            Not(_) => "NotCondition",
            Conditional(..) => "Conditional",
        }
    }
}

struct ExprNode {
    kind: ExprKind,
    shape: Shape,
    free_indices: Vec<Index>,
    repeated_indices: Vec<Index>,
    /// Dimensions of the free and repeated indices of this node.
    index_dimensions: IndexDimensions,
    cell: Option<Cell>,
    hash: u64,
}

/// A handle to an immutable expression node.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    /// Assembles a node from already validated parts.
    pub(crate) fn from_parts(
        kind: ExprKind,
        shape: Shape,
        free_indices: Vec<Index>,
        repeated_indices: Vec<Index>,
        index_dimensions: IndexDimensions,
    ) -> Self {
        let cell = match &kind {
            ExprKind::Argument { element, .. } | ExprKind::Coefficient { element, .. } => Some(element.cell()),
            ExprKind::SpatialCoordinate(cell) | ExprKind::FacetNormal(cell) => Some(*cell),
            other => best_cell(other.operands().into_iter().map(Expr::cell)),
        };
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        let hash = hasher.finish();
        Self(Arc::new(ExprNode {
            kind,
            shape,
            free_indices,
            repeated_indices,
            index_dimensions,
            cell,
            hash,
        }))
    }

    pub(crate) fn terminal(kind: ExprKind, shape: Shape) -> Self {
        Self::from_parts(kind, shape, Vec::new(), Vec::new(), IndexDimensions::new())
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// The direct children of the node, in order. Empty for terminals.
    pub fn operands(&self) -> Vec<Expr> {
        self.0.kind.operands().into_iter().cloned().collect()
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    pub fn rank(&self) -> usize {
        self.0.shape.rank()
    }

    /// The symbolic indices that occur exactly once in this subtree.
    pub fn free_indices(&self) -> &[Index] {
        &self.0.free_indices
    }

    /// The symbolic indices that are summed over at this node.
    ///
    /// Only products, indexing and index sums have repeated indices.
    pub fn repeated_indices(&self) -> &[Index] {
        &self.0.repeated_indices
    }

    /// Dimensions of the free and repeated indices of this node.
    pub fn index_dimensions(&self) -> &IndexDimensions {
        &self.0.index_dimensions
    }

    /// Maps every free index to the given default dimension.
    ///
    /// Intended for callers that do not track index dimensions themselves.
    pub fn free_index_dimensions(&self, default_dim: usize) -> IndexDimensions {
        self.0
            .free_indices
            .iter()
            .map(|index| (*index, default_dim))
            .collect()
    }

    pub fn repeated_index_dimensions(&self) -> IndexDimensions {
        self.0
            .repeated_indices
            .iter()
            .filter_map(|index| {
                self.0
                    .index_dimensions
                    .get(index)
                    .map(|dim| (*index, *dim))
            })
            .collect()
    }

    /// Whether the node is a linear operator in its operands.
    pub fn is_linear(&self) -> bool {
        use ExprKind::*;
        !matches!(
            self.kind(),
            Product(..)
                | Division(..)
                | Power(..)
                | ExprKind::MathFunction(..)
                | Inner(..)
                | Outer(..)
                | Dot(..)
                | Condition(..)
                | And(..)
                | Or(..)
                | Not(_)
                | Conditional(..)
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.0.kind.is_terminal()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.shape.is_scalar()
    }

    /// Whether the expression is a single scalar value, with no free indices.
    pub fn is_true_scalar(&self) -> bool {
        self.is_scalar() && self.0.free_indices.is_empty()
    }

    pub fn is_condition(&self) -> bool {
        matches!(
            self.kind(),
            ExprKind::Condition(..) | ExprKind::And(..) | ExprKind::Or(..) | ExprKind::Not(_)
        )
    }

    /// The geometric cell of the expression.
    ///
    /// Returns the first fully defined cell among the terminals of the expression. If the
    /// expression only contains terminals on undefined cells, the undefined cell is returned,
    /// and if no terminal has a cell at all, `None`.
    pub fn cell(&self) -> Option<Cell> {
        self.0.cell
    }

    /// The geometric dimension of the cell of the expression, if it is defined.
    pub fn geometric_dimension(&self) -> Option<usize> {
        self.cell().and_then(|cell| cell.geometric_dimension())
    }

    /// The number of an argument, or `None` if the expression is not an argument.
    pub fn argument_number(&self) -> Option<usize> {
        match self.kind() {
            ExprKind::Argument { number, .. } => Some(*number),
            _ => None,
        }
    }

    /// The count of a coefficient, or `None` if the expression is not a coefficient.
    pub fn coefficient_count(&self) -> Option<usize> {
        match self.kind() {
            ExprKind::Coefficient { count, .. } => Some(*count),
            _ => None,
        }
    }

    /// The element of an argument or coefficient.
    pub fn element(&self) -> Option<&FiniteElement> {
        match self.kind() {
            ExprKind::Argument { element, .. } | ExprKind::Coefficient { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.kind() {
            ExprKind::FloatValue(value) => Some(value.into_inner()),
            _ => None,
        }
    }

    /// Whether both handles point to the very same node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Rebuilds a node of the same kind from new operands.
    ///
    /// Non-expression data such as multi-indices, the math function or the restriction side
    /// is kept. The new node is validated exactly like a freshly constructed one.
    pub fn reconstruct(&self, operands: Vec<Expr>) -> Result<Expr, FormError> {
        use ExprKind::*;
        let kind_name = self.kind().name();
        match self.kind() {
            Zero { .. }
            | FloatValue(_)
            | Identity(_)
            | Argument { .. }
            | Coefficient { .. }
            | SpatialCoordinate(_)
            | FacetNormal(_) => {
                expect_operands::<0>(kind_name, operands)?;
                Ok(self.clone())
            }
            Sum(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                algebra::sum(&a, &b)
            }
            Product(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                algebra::product(&a, &b)
            }
            Division(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                algebra::division(&a, &b)
            }
            Power(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                algebra::power(&a, &b)
            }
            Neg(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                Ok(algebra::neg(&a))
            }
            ExprKind::MathFunction(function, _) => {
                let [a] = expect_operands(kind_name, operands)?;
                algebra::math_function(*function, &a)
            }
            Indexed(_, multiindex) => {
                let [a] = expect_operands(kind_name, operands)?;
                indexed::indexed(&a, multiindex.clone())
            }
            ComponentTensor(_, multiindex) => {
                let [a] = expect_operands(kind_name, operands)?;
                indexed::component_tensor(&a, multiindex.clone())
            }
            IndexSum(_, index) => {
                let [a] = expect_operands(kind_name, operands)?;
                indexed::index_sum(&a, *index)
            }
            ListTensor(_) => indexed::list_tensor(operands),
            Transposed(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                tensoralgebra::transpose(&a)
            }
            Inner(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                tensoralgebra::inner(&a, &b)
            }
            Outer(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                tensoralgebra::outer(&a, &b)
            }
            Dot(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                tensoralgebra::dot(&a, &b)
            }
            Trace(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                tensoralgebra::trace(&a)
            }
            Grad(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                differentiation::grad(&a)
            }
            Div(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                differentiation::div(&a)
            }
            Restricted(side, _) => {
                let [a] = expect_operands(kind_name, operands)?;
                restriction::restricted(*side, &a)
            }
            Condition(op, ..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                conditional::condition(*op, &a, &b)
            }
            And(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                conditional::and(&a, &b)
            }
            Or(..) => {
                let [a, b] = expect_operands(kind_name, operands)?;
                conditional::or(&a, &b)
            }
            Not(_) => {
                let [a] = expect_operands(kind_name, operands)?;
                conditional::not(&a)
            }
            Conditional(..) => {
                let [c, t, f] = expect_operands(kind_name, operands)?;
                conditional::conditional(&c, &t, &f)
            }
        }
    }
}

fn expect_operands<const N: usize>(kind_name: &'static str, operands: Vec<Expr>) -> Result<[Expr; N], FormError> {
    let count = operands.len();
    operands.try_into().map_err(|_| {
        FormError::unsupported(format!(
            "cannot reconstruct {kind_name} from {count} operands, expected {N}"
        ))
    })
}

/// Structural equality.
///
/// Two expressions are equal if they are of the same kind and have recursively equal operands
/// and data. This is representational equality: `a + b` and `b + a` are different expressions.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

/// Compares float constants (and scalar zeros) with native scalars by value.
impl PartialEq<f64> for Expr {
    fn eq(&self, other: &f64) -> bool {
        match self.kind() {
            ExprKind::FloatValue(value) => value.into_inner() == *other,
            ExprKind::Zero { .. } => self.is_true_scalar() && *other == 0.0,
            _ => false,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::display::Repr;
        write!(f, "{}", self.repr())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        constant::float_value(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        constant::float_value(f64::from(value))
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}
