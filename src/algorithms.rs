//! Traversal and transformation of expression trees.
use crate::error::FormError;
use crate::expr::{Expr, ExprKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Iterator over the nodes of an expression in pre-order, parents before children.
///
/// Shared subtrees are visited once for every parent that references them.
pub struct PreTraversal {
    stack: Vec<Expr>,
}

impl Iterator for PreTraversal {
    type Item = Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        self.stack.extend(expr.operands().into_iter().rev());
        Some(expr)
    }
}

pub fn pre_traversal(expr: &Expr) -> PreTraversal {
    PreTraversal {
        stack: vec![expr.clone()],
    }
}

/// Pre-order traversal that visits every distinct subexpression only once.
pub fn unique_pre_traversal(expr: &Expr) -> impl Iterator<Item = Expr> {
    let mut visited = FxHashSet::default();
    let mut stack = vec![expr.clone()];
    std::iter::from_fn(move || loop {
        let expr = stack.pop()?;
        if visited.insert(expr.clone()) {
            stack.extend(expr.operands().into_iter().rev());
            return Some(expr);
        }
    })
}

/// The distinct terminals of the expression, in order of first occurrence.
pub fn terminals(expr: &Expr) -> Vec<Expr> {
    unique_pre_traversal(expr)
        .filter(Expr::is_terminal)
        .collect()
}

/// The arguments of the expression, sorted by number.
///
/// Fails if two different arguments share a number.
pub fn extract_arguments(expr: &Expr) -> Result<Vec<Expr>, FormError> {
    sorted_arguments(terminals(expr).into_iter().filter(|t| t.argument_number().is_some()))
}

/// Sorts and deduplicates arguments by number, checking that numbers are unique.
pub(crate) fn sorted_arguments(arguments: impl IntoIterator<Item = Expr>) -> Result<Vec<Expr>, FormError> {
    let mut by_number: FxHashMap<usize, Expr> = FxHashMap::default();
    for argument in arguments {
        let number = argument
            .argument_number()
            .ok_or_else(|| FormError::type_contract("extract_arguments", "an Argument", argument.kind().name()))?;
        if let Some(existing) = by_number.get(&number) {
            if *existing != argument {
                return Err(FormError::unsupported(format!(
                    "found different arguments with the same number {number}: {existing:?} and {argument:?}"
                )));
            }
        } else {
            by_number.insert(number, argument);
        }
    }
    let mut arguments: Vec<_> = by_number.into_iter().collect();
    arguments.sort_unstable_by_key(|(number, _)| *number);
    Ok(arguments.into_iter().map(|(_, argument)| argument).collect())
}

/// The distinct coefficients of the expression, sorted by count.
pub fn extract_coefficients(expr: &Expr) -> Vec<Expr> {
    let mut coefficients: Vec<_> = terminals(expr)
        .into_iter()
        .filter(|t| t.coefficient_count().is_some())
        .collect();
    coefficients.sort_by_key(|c| c.coefficient_count());
    coefficients
}

/// Whether the expression contains any argument.
pub fn has_arguments(expr: &Expr) -> bool {
    unique_pre_traversal(expr).any(|e| matches!(e.kind(), ExprKind::Argument { .. }))
}

/// Transforms an expression bottom-up.
///
/// `f` is called once for every distinct subexpression, with the node and the already
/// transformed operands, and returns the transformed node.
pub fn map_expr_dag<F>(expr: &Expr, mut f: F) -> Result<Expr, FormError>
where
    F: FnMut(&Expr, Vec<Expr>) -> Result<Expr, FormError>,
{
    let mut cache = FxHashMap::default();
    map_expr_dag_cached(expr, &mut f, &mut cache)
}

fn map_expr_dag_cached<F>(expr: &Expr, f: &mut F, cache: &mut FxHashMap<Expr, Expr>) -> Result<Expr, FormError>
where
    F: FnMut(&Expr, Vec<Expr>) -> Result<Expr, FormError>,
{
    if let Some(mapped) = cache.get(expr) {
        return Ok(mapped.clone());
    }
    let operands = expr
        .kind()
        .operands()
        .into_iter()
        .map(|operand| map_expr_dag_cached(operand, f, cache))
        .collect::<Result<Vec<_>, _>>()?;
    let mapped = f(expr, operands)?;
    cache.insert(expr.clone(), mapped.clone());
    Ok(mapped)
}

/// Rebuilds `expr` from new operands, reusing the node if the operands are unchanged.
pub fn reuse_if_untouched(expr: &Expr, operands: Vec<Expr>) -> Result<Expr, FormError> {
    let unchanged = expr
        .kind()
        .operands()
        .into_iter()
        .zip(&operands)
        .all(|(old, new)| old.ptr_eq(new));
    if unchanged {
        Ok(expr.clone())
    } else {
        expr.reconstruct(operands)
    }
}

/// Replaces subexpressions according to `mapping`. Replacements must keep the shape.
pub fn replace(expr: &Expr, mapping: &FxHashMap<Expr, Expr>) -> Result<Expr, FormError> {
    for (original, replacement) in mapping {
        if original.shape() != replacement.shape() {
            return Err(FormError::shape_mismatch("replace", original.shape(), replacement.shape()));
        }
    }
    map_expr_dag(expr, |node, operands| match mapping.get(node) {
        Some(replacement) => Ok(replacement.clone()),
        None => reuse_if_untouched(node, operands),
    })
}
