//! Time conflict analysis.
//!
//! Computes the pairwise overlap relation between tasks: two tasks
//! conflict iff they occur on the same date and their `[start, end)`
//! intervals overlap. The relation is symmetric and irreflexive,
//! computed once per solve and read-only afterwards.
//!
//! The O(n²) pairwise scan is fine for event-sized inputs; a
//! sort-and-sweep per date would be the next step if task counts grow.

use itertools::Itertools;
use std::collections::HashSet;

use crate::models::Task;

/// Precomputed task-pair conflict relation.
///
/// Pairs are stored with the lower task index first, in ascending
/// `(i, j)` order, so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ConflictTable {
    pairs: Vec<(usize, usize)>,
    lookup: HashSet<(usize, usize)>,
}

impl ConflictTable {
    /// Builds the conflict relation over all task pairs.
    pub fn build(tasks: &[Task]) -> Self {
        let mut pairs = Vec::new();
        let mut lookup = HashSet::new();

        for (i, j) in (0..tasks.len()).tuple_combinations() {
            if tasks[i].conflicts_with(&tasks[j]) {
                pairs.push((i, j));
                lookup.insert((i, j));
            }
        }

        Self { pairs, lookup }
    }

    /// Whether two tasks conflict. Symmetric; a task never conflicts
    /// with itself.
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        self.lookup.contains(&key)
    }

    /// All conflicting pairs `(i, j)` with `i < j`, in ascending order.
    pub fn conflicting_pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Number of conflicting pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair of tasks conflicts.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
