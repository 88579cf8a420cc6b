//! String rendering of expressions.
//!
//! Two renderings are provided. [`Display`] produces compact mathematical notation meant for
//! humans, such as `v_0 * w_1 + -x[0]`. The [`Repr`] trait produces the reconstructive
//! representation: a nested call expression like `Sum(Argument(...), Neg(...))` that
//! [`crate::repr::parse_expr`] turns back into an equal expression. The reconstructive string
//! is the canonical identity of an expression and forms the signature of a form.
use crate::cell::Cell;
use crate::element::{ElementKind, FiniteElement};
use crate::expr::{Expr, ExprKind, Side};
use crate::index::{Index, IndexEntry, MultiIndex};
use crate::shape::Shape;
use itertools::Itertools;
use std::fmt;
use std::fmt::{Display, Formatter, Write};

/// Reconstructive string representation.
pub trait Repr {
    fn write_repr(&self, out: &mut String);

    fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }
}

/// Writes a tuple in the reconstructive syntax: `()`, `(a,)` or `(a, b)`.
pub(crate) fn write_tuple<T>(out: &mut String, items: &[T], mut write_item: impl FnMut(&mut String, &T)) {
    out.push('(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_item(out, item);
    }
    if items.len() == 1 {
        out.push(',');
    }
    out.push(')');
}

/// Writes `Name(a, b, ...)` for the given operands.
fn write_call(out: &mut String, name: &str, operands: &[&dyn Repr]) {
    out.push_str(name);
    out.push('(');
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        operand.write_repr(out);
    }
    out.push(')');
}

pub(crate) fn write_float(out: &mut String, value: f64) {
    // Debug formatting of f64 is the shortest string that parses back to the same value
    let _ = write!(out, "{value:?}");
}

impl Repr for usize {
    fn write_repr(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}

impl Repr for Shape {
    fn write_repr(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}

impl Repr for Cell {
    fn write_repr(&self, out: &mut String) {
        let _ = write!(out, "Cell('{}')", self.name());
    }
}

impl Repr for FiniteElement {
    fn write_repr(&self, out: &mut String) {
        let name = match self.kind() {
            ElementKind::Scalar => "FiniteElement",
            ElementKind::Vector => "VectorElement",
            ElementKind::Tensor => "TensorElement",
        };
        let _ = write!(out, "{name}('{}', ", self.family());
        self.cell().write_repr(out);
        let _ = write!(out, ", {}", self.degree());
        match self.kind() {
            ElementKind::Scalar => {}
            ElementKind::Vector => {
                let _ = write!(out, ", {}", self.value_shape()[0]);
            }
            ElementKind::Tensor => {
                let _ = write!(out, ", {}", self.value_shape());
            }
        }
        out.push(')');
    }
}

impl Repr for Index {
    fn write_repr(&self, out: &mut String) {
        let _ = write!(out, "Index({})", self.count());
    }
}

impl Repr for IndexEntry {
    fn write_repr(&self, out: &mut String) {
        match self {
            IndexEntry::Fixed(value) => {
                let _ = write!(out, "FixedIndex({value})");
            }
            IndexEntry::Symbolic(index) => index.write_repr(out),
        }
    }
}

impl Repr for MultiIndex {
    fn write_repr(&self, out: &mut String) {
        out.push_str("MultiIndex(");
        write_tuple(out, self.entries(), |out, entry| entry.write_repr(out));
        out.push(')');
    }
}

impl Repr for Expr {
    fn write_repr(&self, out: &mut String) {
        use ExprKind::*;
        let name = self.kind().name();
        match self.kind() {
            Zero { shape, free_indices } => {
                out.push_str("Zero(");
                shape.write_repr(out);
                if !free_indices.is_empty() {
                    out.push_str(", ");
                    let pairs = free_indices.iter().collect_vec();
                    write_tuple(out, &pairs, |out, (index, dim)| {
                        out.push('(');
                        index.write_repr(out);
                        let _ = write!(out, ", {dim})");
                    });
                }
                out.push(')');
            }
            FloatValue(value) => {
                out.push_str("FloatValue(");
                write_float(out, value.into_inner());
                out.push(')');
            }
            Identity(dim) => write_call(out, name, &[dim as &dyn Repr]),
            Argument { element, number } => write_call(out, name, &[element as &dyn Repr, number]),
            Coefficient { element, count } => write_call(out, name, &[element as &dyn Repr, count]),
            SpatialCoordinate(cell) | FacetNormal(cell) => write_call(out, name, &[cell as &dyn Repr]),
            Indexed(a, multiindex) | ComponentTensor(a, multiindex) => {
                write_call(out, name, &[a as &dyn Repr, multiindex])
            }
            IndexSum(a, index) => write_call(out, name, &[a as &dyn Repr, index]),
            Sum(..)
            | Product(..)
            | Division(..)
            | Power(..)
            | Neg(_)
            | MathFunction(..)
            | ListTensor(_)
            | Transposed(_)
            | Inner(..)
            | Outer(..)
            | Dot(..)
            | Trace(_)
            | Grad(_)
            | Div(_)
            | Restricted(..)
            | Condition(..)
            | And(..)
            | Or(..)
            | Not(_)
            | Conditional(..) => {
                let operands = self.kind().operands();
                let operands = operands.iter().map(|e| *e as &dyn Repr).collect_vec();
                write_call(out, name, &operands);
            }
        }
    }
}

/// Binding strength of the pretty-printed form of an expression. Atoms bind tightest.
fn precedence(expr: &Expr) -> u8 {
    use ExprKind::*;
    match expr.kind() {
        Conditional(..) => 0,
        Condition(..) | And(..) | Or(..) => 1,
        Sum(..) => 2,
        Product(..) | Division(..) | Inner(..) | Dot(..) | IndexSum(..) => 3,
        Neg(_) => 4,
        FloatValue(value) if value.into_inner() < 0.0 => 4,
        Power(..) => 5,
        _ => 6,
    }
}

/// Writes an operand of a node with precedence `parent`, adding parentheses where needed.
///
/// In strict mode operands of equal precedence are parenthesized as well.
fn write_operand(f: &mut Formatter<'_>, operand: &Expr, parent: u8, strict: bool) -> fmt::Result {
    let own = precedence(operand);
    if own < parent || (strict && own == parent) {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use ExprKind::*;
        let prec = precedence(self);
        match self.kind() {
            Zero { shape, .. } => {
                if shape.is_scalar() {
                    write!(f, "0")
                } else {
                    write!(f, "<Zero tensor with shape {shape}>")
                }
            }
            FloatValue(value) => write!(f, "{:?}", value.into_inner()),
            Identity(_) => write!(f, "I"),
            Argument { number, .. } => write!(f, "v_{number}"),
            Coefficient { count, .. } => write!(f, "w_{count}"),
            SpatialCoordinate(_) => write!(f, "x"),
            FacetNormal(_) => write!(f, "n"),
            Sum(a, b) => {
                write_operand(f, a, prec, false)?;
                write!(f, " + ")?;
                write_operand(f, b, prec, false)
            }
            Product(a, b) => {
                write_operand(f, a, prec, false)?;
                write!(f, " * ")?;
                write_operand(f, b, prec, false)
            }
            Division(a, b) => {
                write_operand(f, a, prec, false)?;
                write!(f, " / ")?;
                write_operand(f, b, prec, true)
            }
            Power(a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " ** ")?;
                write_operand(f, b, prec, true)
            }
            Neg(a) => {
                write!(f, "-")?;
                write_operand(f, a, prec, true)
            }
            MathFunction(function, a) => match function {
                crate::expr::MathFunction::Abs => write!(f, "|{a}|"),
                _ => write!(f, "{}({a})", function.repr_name().to_lowercase()),
            },
            Indexed(a, multiindex) => {
                write_operand(f, a, prec, false)?;
                write!(f, "[{multiindex}]")
            }
            ComponentTensor(a, multiindex) => write!(f, "{{ {a} | {multiindex} }}"),
            IndexSum(a, index) => {
                write!(f, "sum_{{{index}}} ")?;
                write_operand(f, a, 6, false)
            }
            ListTensor(components) => write!(f, "[{}]", components.iter().join(", ")),
            Transposed(a) => {
                write_operand(f, a, prec, false)?;
                write!(f, "^T")
            }
            Inner(a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " : ")?;
                write_operand(f, b, prec, true)
            }
            Dot(a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " . ")?;
                write_operand(f, b, prec, true)
            }
            Outer(a, b) => write!(f, "outer({a}, {b})"),
            Trace(a) => write!(f, "tr({a})"),
            Grad(a) => write!(f, "grad({a})"),
            Div(a) => write!(f, "div({a})"),
            Restricted(side, a) => {
                write_operand(f, a, prec, false)?;
                match side {
                    Side::Positive => write!(f, "('+')"),
                    Side::Negative => write!(f, "('-')"),
                }
            }
            Condition(op, a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, b, prec, true)
            }
            And(a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " && ")?;
                write_operand(f, b, prec, true)
            }
            Or(a, b) => {
                write_operand(f, a, prec, true)?;
                write!(f, " || ")?;
                write_operand(f, b, prec, true)
            }
            Not(a) => write!(f, "!({a})"),
            Conditional(c, t, e) => {
                write_operand(f, c, prec, true)?;
                write!(f, " ? ")?;
                write_operand(f, t, prec, true)?;
                write!(f, " : ")?;
                write_operand(f, e, prec, true)
            }
        }
    }
}
