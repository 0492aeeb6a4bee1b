//! Event staffing planner.
//!
//! Assigns a fixed set of participants to time-boxed tasks over a
//! multi-day event by building a mixed-integer model and handing it to
//! an external solver behind a narrow adapter boundary. Hard
//! constraints cover task coverage bounds, time-conflict freedom,
//! exclusion lists, SNU hour caps, and per-participant task counts;
//! soft objectives balance workload and nudge critical tasks toward
//! permanent staff.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Participant`, `Task`, `Roster`
//! - **`conflict`**: Same-date interval-overlap relation over tasks
//! - **`eligibility`**: Per-participant candidate task sets
//! - **`model`**: Solver-agnostic model IR, builder, and objective
//! - **`solver`**: Solver trait and the bundled MILP adapter
//! - **`extract`**: Solution decoding and independent invariant re-checks
//! - **`validation`**: Input integrity and structural feasibility
//! - **`planner`**: The end-to-end batch pipeline
//! - **`io`** / **`report`**: CSV boundary and console summary
//!
//! # Pipeline
//!
//! ```text
//! load → validate → conflicts + eligibility → feasibility gate
//!      → build model → compose objective → solve → extract → roster
//! ```
//!
//! Each run builds everything from fresh input; models are never
//! reused across runs.

pub mod config;
pub mod conflict;
pub mod eligibility;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod models;
pub mod planner;
pub mod report;
pub mod solver;
pub mod validation;
