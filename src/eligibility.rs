//! Eligibility filtering.
//!
//! Determines, per participant, the set of tasks they may legally be
//! assigned to: all tasks minus the participant's exclusion list. A
//! pure set difference; the result decides which decision variables
//! exist at all (ineligible pairs never get a variable).

use crate::models::{Participant, Task};

/// Per-participant candidate task sets, by index into the input slices.
#[derive(Debug, Clone, Default)]
pub struct EligibilityMap {
    /// `tasks_by_participant[p]` = ascending task indices p may take.
    tasks_by_participant: Vec<Vec<usize>>,
    task_count: usize,
}

impl EligibilityMap {
    /// Computes candidate sets for all participants.
    pub fn build(participants: &[Participant], tasks: &[Task]) -> Self {
        let tasks_by_participant = participants
            .iter()
            .map(|p| {
                tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| p.may_take(&t.id))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();

        Self {
            tasks_by_participant,
            task_count: tasks.len(),
        }
    }

    /// Whether participant `p` may be assigned to task `t`.
    pub fn eligible(&self, p: usize, t: usize) -> bool {
        self.tasks_by_participant
            .get(p)
            .is_some_and(|ts| ts.binary_search(&t).is_ok())
    }

    /// Ascending task indices participant `p` may take.
    pub fn eligible_tasks(&self, p: usize) -> &[usize] {
        &self.tasks_by_participant[p]
    }

    /// Ascending participant indices that may take task `t`.
    pub fn eligible_pool(&self, t: usize) -> Vec<usize> {
        (0..self.tasks_by_participant.len())
            .filter(|&p| self.eligible(p, t))
            .collect()
    }

    /// Number of participants covered by this map.
    pub fn participant_count(&self) -> usize {
        self.tasks_by_participant.len()
    }

    /// Number of tasks covered by this map.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Total number of eligible (participant, task) pairs.
    pub fn pair_count(&self) -> usize {
        self.tasks_by_participant.iter().map(Vec::len).sum()
    }
}
