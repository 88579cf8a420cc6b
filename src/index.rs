//! Symbolic and fixed indices for tensor (Einstein) notation.
//!
//! A symbolic [`Index`] that occurs exactly once in an expression is *free*: it is unbound and
//! must be bound or summed by an enclosing expression. An index that occurs exactly twice is
//! *repeated* and implies summation over its range. More than two occurrences are an error.
use crate::error::FormError;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

static INDEX_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Maps indices to the dimension of the axis they range over.
///
/// Ordered, so that anything derived from it is deterministic.
pub type IndexDimensions = BTreeMap<Index, usize>;

/// An assignment of concrete values to symbolic indices, used during evaluation.
pub type IndexValues = FxHashMap<Index, usize>;

/// A symbolic index.
///
/// Indices are identified by their count. Fresh indices draw their count from a process-wide
/// counter, so two indices created with [`Index::new`] are never equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    count: usize,
}

impl Index {
    /// Creates a fresh index.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            count: INDEX_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Creates the index with the given count.
    ///
    /// This is primarily useful for reconstructing expressions. Mixing explicitly counted
    /// indices with fresh ones may produce unintended collisions.
    pub fn with_count(count: usize) -> Self {
        // Keep the counter ahead of any explicitly requested count
        INDEX_COUNTER.fetch_max(count + 1, Ordering::Relaxed);
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "i_{}", self.count)
    }
}

/// Creates `n` fresh indices.
pub fn indices(n: usize) -> Vec<Index> {
    (0..n).map(|_| Index::new()).collect()
}

/// A single entry of a multi-index: either a fixed, concrete index or a symbolic one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexEntry {
    Fixed(usize),
    Symbolic(Index),
}

impl IndexEntry {
    pub fn as_symbolic(&self) -> Option<Index> {
        match self {
            Self::Symbolic(index) => Some(*index),
            Self::Fixed(_) => None,
        }
    }

    pub fn as_fixed(&self) -> Option<usize> {
        match self {
            Self::Fixed(value) => Some(*value),
            Self::Symbolic(_) => None,
        }
    }
}

impl From<Index> for IndexEntry {
    fn from(index: Index) -> Self {
        Self::Symbolic(index)
    }
}

impl From<usize> for IndexEntry {
    fn from(value: usize) -> Self {
        Self::Fixed(value)
    }
}

impl Display for IndexEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Symbolic(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered sequence of index entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MultiIndex {
    entries: Vec<IndexEntry>,
}

impl MultiIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    /// A multi-index consisting only of symbolic indices.
    pub fn from_indices(indices: &[Index]) -> Self {
        Self::new(indices.iter().copied().map(IndexEntry::from).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, i: usize) -> Option<&IndexEntry> {
        self.entries.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// The symbolic entries, in order, including duplicates.
    pub fn symbolic_indices(&self) -> impl Iterator<Item = Index> + '_ {
        self.entries.iter().filter_map(IndexEntry::as_symbolic)
    }

    /// Resolves the multi-index to a concrete component using the given index assignment.
    pub fn evaluate(&self, index_values: &IndexValues) -> Result<Vec<usize>, FormError> {
        self.entries
            .iter()
            .map(|entry| match entry {
                IndexEntry::Fixed(value) => Ok(*value),
                IndexEntry::Symbolic(index) => index_values
                    .get(index)
                    .copied()
                    .ok_or_else(|| FormError::evaluation(format!("no value assigned to index {index}"))),
            })
            .collect()
    }
}

impl Display for MultiIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entries.iter().join(", "))
    }
}

impl From<Index> for MultiIndex {
    fn from(index: Index) -> Self {
        Self::new(vec![index.into()])
    }
}

impl From<usize> for MultiIndex {
    fn from(value: usize) -> Self {
        Self::new(vec![value.into()])
    }
}

impl From<Vec<IndexEntry>> for MultiIndex {
    fn from(entries: Vec<IndexEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<&[Index]> for MultiIndex {
    fn from(indices: &[Index]) -> Self {
        Self::from_indices(indices)
    }
}

impl<T: Into<IndexEntry>, const N: usize> From<[T; N]> for MultiIndex {
    fn from(entries: [T; N]) -> Self {
        Self::new(entries.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<IndexEntry>, B: Into<IndexEntry>> From<(A, B)> for MultiIndex {
    fn from((a, b): (A, B)) -> Self {
        Self::new(vec![a.into(), b.into()])
    }
}

impl<A: Into<IndexEntry>, B: Into<IndexEntry>, C: Into<IndexEntry>> From<(A, B, C)> for MultiIndex {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::new(vec![a.into(), b.into(), c.into()])
    }
}

/// Splits a sequence of index occurrences into free (once) and repeated (twice) indices.
///
/// Both lists preserve the order of first occurrence.
pub(crate) fn split_free_and_repeated(
    occurrences: impl IntoIterator<Item = Index>,
) -> Result<(Vec<Index>, Vec<Index>), FormError> {
    let mut order = Vec::new();
    let mut counts = FxHashMap::default();
    for index in occurrences {
        let count = counts.entry(index).or_insert(0usize);
        if *count == 0 {
            order.push(index);
        }
        *count += 1;
    }

    let mut free = Vec::new();
    let mut repeated = Vec::new();
    for index in order {
        match counts[&index] {
            1 => free.push(index),
            2 => repeated.push(index),
            n => {
                return Err(FormError::RepeatedIndex {
                    index: index.to_string(),
                    reason: format!("occurs {n} times, but at most two occurrences are allowed"),
                })
            }
        }
    }
    Ok((free, repeated))
}

/// Merges two index dimension maps, failing if an index is assigned two different dimensions.
pub(crate) fn merge_index_dimensions(
    a: &IndexDimensions,
    b: &IndexDimensions,
) -> Result<IndexDimensions, FormError> {
    let mut merged = a.clone();
    for (index, &dim) in b {
        if let Some(&existing) = merged.get(index) {
            if existing != dim {
                return Err(FormError::RepeatedIndex {
                    index: index.to_string(),
                    reason: format!("used with conflicting dimensions {existing} and {dim}"),
                });
            }
        } else {
            merged.insert(*index, dim);
        }
    }
    Ok(merged)
}

/// Restricts an index dimension map to the given indices.
pub(crate) fn restrict_index_dimensions<'a>(
    dims: &IndexDimensions,
    indices: impl IntoIterator<Item = &'a Index>,
) -> IndexDimensions {
    indices
        .into_iter()
        .filter_map(|index| dims.get(index).map(|&dim| (*index, dim)))
        .collect()
}

/// Whether two lists of free indices contain the same indices, disregarding order.
pub(crate) fn same_index_set(a: &[Index], b: &[Index]) -> bool {
    a.len() == b.len() && a.iter().all(|index| b.contains(index))
}
