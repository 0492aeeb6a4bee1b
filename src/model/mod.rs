//! Optimization model intermediate representation.
//!
//! A solver-agnostic description of the assignment problem: binary
//! decision variables for eligible (participant, task) pairs,
//! non-negative auxiliaries for the objective, linear constraints
//! tagged by family, and a single linear minimization objective.
//!
//! The IR keeps the model builder and objective composer independent
//! of any solver crate; `crate::solver` adapts it to a backend.

mod builder;
mod objective;

pub use builder::ModelBuilder;
pub use objective::compose_objective;

use std::collections::HashMap;
use std::fmt;

/// Index of a decision variable within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 assignment decision.
    Binary,
    /// Continuous, bounded below by zero (objective auxiliaries).
    NonNegative,
}

/// A declared decision variable.
#[derive(Debug, Clone)]
pub struct DecisionVar {
    /// Diagnostic name (stable across runs).
    pub name: String,
    /// Variable domain.
    pub kind: VarKind,
}

/// A binary variable standing for "participant p takes task t".
#[derive(Debug, Clone, Copy)]
pub struct PairVar {
    /// Participant index into the input slice.
    pub participant: usize,
    /// Task index into the input slice.
    pub task: usize,
    /// The backing decision variable.
    pub var: VarId,
}

/// A linear combination of variables plus a constant.
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    /// `(variable, coefficient)` terms in insertion order.
    pub terms: Vec<(VarId, f64)>,
    /// Constant offset.
    pub constant: f64,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a term.
    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    /// Builder-style term append.
    pub fn with_term(mut self, var: VarId, coeff: f64) -> Self {
        self.add_term(var, coeff);
        self
    }

    /// Evaluates the expression against per-variable values.
    pub fn value(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
                .sum::<f64>()
    }

    /// Whether the expression has no variable terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Constraint comparison sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `expr <= rhs`
    Leq,
    /// `expr >= rhs`
    Geq,
    /// `expr == rhs`
    Eq,
}

/// Constraint grouping used for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Per-task coverage bounds.
    Coverage,
    /// Pairwise time-conflict exclusion.
    Conflict,
    /// SNU total (and optional daily) hour caps.
    HourCap,
    /// Per-participant task-count bounds.
    TaskCount,
    /// Pre-seeded assignments forced on.
    Pinned,
    /// Workload-balance slack linking.
    Balance,
    /// Critical-task shortfall linking.
    Priority,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintFamily::Coverage => "coverage",
            ConstraintFamily::Conflict => "conflict",
            ConstraintFamily::HourCap => "hour-cap",
            ConstraintFamily::TaskCount => "task-count",
            ConstraintFamily::Pinned => "pinned",
            ConstraintFamily::Balance => "balance",
            ConstraintFamily::Priority => "priority",
        };
        write!(f, "{name}")
    }
}

/// One linear constraint `expr (sense) rhs`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Diagnostic label naming the constrained entity.
    pub label: String,
    /// Family tag.
    pub family: ConstraintFamily,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Comparison sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// `expr <= rhs`
    pub fn leq(
        label: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        rhs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            family,
            expr,
            sense: Sense::Leq,
            rhs,
        }
    }

    /// `expr >= rhs`
    pub fn geq(
        label: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        rhs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            family,
            expr,
            sense: Sense::Geq,
            rhs,
        }
    }

    /// `expr == rhs`
    pub fn eq(
        label: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        rhs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            family,
            expr,
            sense: Sense::Eq,
            rhs,
        }
    }
}

/// The complete model handed to a solver.
///
/// Variables are indexed densely by [`VarId`]; pair variables are
/// created first (in participant-major, ascending-task order), then
/// objective auxiliaries. Creation order is deterministic for a given
/// input, which keeps solves reproducible.
#[derive(Debug, Clone, Default)]
pub struct AssignmentModel {
    vars: Vec<DecisionVar>,
    pairs: Vec<PairVar>,
    pair_lookup: HashMap<(usize, usize), VarId>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
}

impl AssignmentModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a fresh binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(DecisionVar {
            name: name.into(),
            kind: VarKind::Binary,
        });
        id
    }

    /// Declares a fresh non-negative continuous variable.
    pub fn add_non_negative(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(DecisionVar {
            name: name.into(),
            kind: VarKind::NonNegative,
        });
        id
    }

    /// Declares the assignment variable for an eligible pair.
    pub fn add_pair(&mut self, participant: usize, task: usize) -> VarId {
        let var = self.add_binary(format!("x_p{participant}_t{task}"));
        self.pairs.push(PairVar {
            participant,
            task,
            var,
        });
        self.pair_lookup.insert((participant, task), var);
        var
    }

    /// The variable for an eligible pair; `None` when the pair is
    /// structurally impossible (no variable exists).
    pub fn pair_var(&self, participant: usize, task: usize) -> Option<VarId> {
        self.pair_lookup.get(&(participant, task)).copied()
    }

    /// All pair variables in creation order.
    pub fn pairs(&self) -> &[PairVar] {
        &self.pairs
    }

    /// All declared variables.
    pub fn vars(&self) -> &[DecisionVar] {
        &self.vars
    }

    /// Number of declared variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// All constraints in insertion order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints in a family.
    pub fn constraint_count_for(&self, family: ConstraintFamily) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.family == family)
            .count()
    }

    /// Adds a term to the minimization objective.
    pub fn add_objective_term(&mut self, var: VarId, coeff: f64) {
        self.objective.add_term(var, coeff);
    }

    /// The minimization objective.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_variables() {
        let mut model = AssignmentModel::new();
        let v0 = model.add_pair(0, 2);
        let v1 = model.add_pair(1, 0);

        assert_eq!(model.var_count(), 2);
        assert_eq!(model.pair_var(0, 2), Some(v0));
        assert_eq!(model.pair_var(1, 0), Some(v1));
        assert_eq!(model.pair_var(0, 0), None);
        assert_eq!(model.vars()[v0.0].kind, VarKind::Binary);
        assert_eq!(model.vars()[v0.0].name, "x_p0_t2");
    }

    #[test]
    fn test_expression_evaluation() {
        let mut model = AssignmentModel::new();
        let a = model.add_binary("a");
        let b = model.add_non_negative("b");

        let expr = LinearExpr::new().with_term(a, 2.0).with_term(b, -1.0);
        assert!((expr.value(&[1.0, 3.0]) - (-1.0)).abs() < 1e-10);

        let mut with_constant = expr.clone();
        with_constant.constant = 5.0;
        assert!((with_constant.value(&[1.0, 3.0]) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_constraint_families() {
        let mut model = AssignmentModel::new();
        let v = model.add_binary("v");
        model.add_constraint(LinearConstraint::leq(
            "c1",
            ConstraintFamily::Coverage,
            LinearExpr::new().with_term(v, 1.0),
            1.0,
        ));
        model.add_constraint(LinearConstraint::geq(
            "c2",
            ConstraintFamily::Coverage,
            LinearExpr::new().with_term(v, 1.0),
            0.0,
        ));
        model.add_constraint(LinearConstraint::eq(
            "c3",
            ConstraintFamily::Pinned,
            LinearExpr::new().with_term(v, 1.0),
            1.0,
        ));

        assert_eq!(model.constraint_count(), 3);
        assert_eq!(model.constraint_count_for(ConstraintFamily::Coverage), 2);
        assert_eq!(model.constraint_count_for(ConstraintFamily::Pinned), 1);
        assert_eq!(model.constraint_count_for(ConstraintFamily::Conflict), 0);
    }

    #[test]
    fn test_objective_terms() {
        let mut model = AssignmentModel::new();
        let v = model.add_non_negative("slack");
        model.add_objective_term(v, 1.5);

        assert_eq!(model.objective().terms.len(), 1);
        assert!((model.objective().value(&[2.0]) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_family_display() {
        assert_eq!(ConstraintFamily::Coverage.to_string(), "coverage");
        assert_eq!(ConstraintFamily::HourCap.to_string(), "hour-cap");
    }
}
