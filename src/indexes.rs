use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Original row positions kept after dropping rows from a table of
/// `total` rows.
///
/// Positions are strictly increasing and all below `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedRows {
    selection: Box<[usize]>,
    total: usize,
}

impl RetainedRows {
    /// `None` unless `selection` is strictly increasing and below `total`.
    pub fn new(selection: impl Into<Box<[usize]>>, total: usize) -> Option<Self> {
        let selection = selection.into();
        let ordered = selection.iter().tuple_windows().all(|(lhs, rhs)| lhs < rhs);
        let in_range = selection.last().is_none_or(|last| *last < total);
        (ordered && in_range).then_some(Self { selection, total })
    }

    /// Positions where `keep` yields true.
    pub fn from_mask(keep: impl IntoIterator<Item = bool>) -> Self {
        let mut total = 0;
        let selection = keep
            .into_iter()
            .inspect(|_| total += 1)
            .positions(|keep| keep)
            .collect();
        Self { selection, total }
    }

    pub fn all(total: usize) -> Self {
        Self {
            selection: (0..total).collect(),
            total,
        }
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Number of rows before dropping.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.selection
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection.iter().copied()
    }

    /// Positions that were dropped, increasing.
    pub fn dropped(&self) -> impl Iterator<Item = usize> + '_ {
        let mut retained = self.iter().peekable();
        (0..self.total).filter(move |idx| {
            if retained.peek() == Some(idx) {
                retained.next();
                false
            } else {
                true
            }
        })
    }
}
