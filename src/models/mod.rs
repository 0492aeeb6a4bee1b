//! Staffing domain models.
//!
//! Core data types for the assignment problem and its solution:
//! participants (who), tasks (what and when), and the roster
//! (the accepted assignment set with derived statistics).
//!
//! All entities are loaded fresh per run and treated as immutable
//! for the duration of one solve.

mod participant;
mod roster;
mod task;

pub use participant::{Participant, Role};
pub use roster::{AssignedTask, Roster, WorkloadLevel, WorkloadThresholds};
pub use task::{Task, TimeOfDay, TimeParseError, TimeSpan};
