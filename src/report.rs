//! Console summary rendering.
//!
//! Renders a roster as a plain-text report: assignments grouped by
//! event day, then a per-participant summary with task counts, hour
//! totals, and workload labels. Pure string building, so the layout
//! is testable without capturing stdout.

use std::fmt::Write;

use crate::models::Roster;

/// Renders the day-grouped assignment listing and the participant
/// summary.
pub fn render(roster: &Roster) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(72));
    let _ = writeln!(out, "TASK ASSIGNMENTS");
    let _ = writeln!(out, "{}", "=".repeat(72));

    for (day, date) in roster.days() {
        let _ = writeln!(out, "\nDay {day} - {}", date.format("%d/%m/%Y"));
        let _ = writeln!(out, "{}", "-".repeat(48));
        for a in roster.assignments_on_day(day) {
            let _ = writeln!(
                out,
                "{:<13} | {:<6} | {} ({}) | {}",
                a.duration_label, a.task_id, a.participant, a.workload, a.description
            );
        }
    }

    let _ = writeln!(out, "\n{}", "=".repeat(72));
    let _ = writeln!(out, "SUMMARY BY PARTICIPANT");
    let _ = writeln!(out, "{}", "=".repeat(72));

    for name in roster.participants() {
        let held = roster.assignments_for(name);
        let first = held[0];
        let _ = writeln!(
            out,
            "\n{name} ({}, {}) - {} tasks, {:.1}h",
            first.role,
            first.workload,
            held.len(),
            first.total_hours
        );
        for a in held {
            let _ = writeln!(
                out,
                "  - {} {} {}: {}",
                a.date.format("%d/%m/%Y"),
                a.duration_label,
                a.task_id,
                a.description
            );
        }
    }

    if !roster.proven_optimal {
        let _ = writeln!(out, "\nnote: solution is feasible but not proven optimal");
    }

    out
}
