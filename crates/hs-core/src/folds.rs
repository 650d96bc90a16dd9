//! K-fold splitting over a word's sequence indices.
//!
//! Folds are contiguous and unshuffled: with `n` items and `k` folds the
//! first `n % k` folds hold one extra item. Sequences are never cut, so a
//! fold's train and test sets are rebuilt with [`combine_sequences`].

use crate::corpus::{combine_sequences, CorpusError, Sequence, Xlengths};

/// Number of folds to use for `n_sequences`, or `None` when a word has too
/// few sequences to hold any out.
///
/// Two sequences always give two folds; otherwise the count is capped at
/// `max_folds` (never below two).
pub fn fold_count(n_sequences: usize, max_folds: usize) -> Option<usize> {
    match n_sequences {
        0 | 1 => None,
        2 => Some(2),
        n => Some(max_folds.max(2).min(n)),
    }
}

/// One train/test partition of item indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Fold {
    /// Rebuild the train and test matrices from `sequences`.
    pub fn xlengths(&self, sequences: &[Sequence]) -> Result<(Xlengths, Xlengths), CorpusError> {
        Ok((
            combine_sequences(&self.train, sequences)?,
            combine_sequences(&self.test, sequences)?,
        ))
    }
}

/// Contiguous, unshuffled k-fold splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Partition `0..n_items`. The split count is clamped to `n_items`, so
    /// no fold is ever empty.
    pub fn split(&self, n_items: usize) -> Vec<Fold> {
        let k = self.n_splits.min(n_items);
        if k == 0 {
            return Vec::new();
        }
        let base = n_items / k;
        let extra = n_items % k;

        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let size = base + usize::from(i < extra);
            let end = start + size;
            folds.push(Fold {
                train: (0..start).chain(end..n_items).collect(),
                test: (start..end).collect(),
            });
            start = end;
        }
        folds
    }
}
