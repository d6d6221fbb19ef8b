//! The satisfiability oracle capability and its varisat-backed implementation.
//!
//! The equivalence search only ever talks to the [`Oracle`] trait; any
//! engine providing incremental clause addition and solving under
//! assumptions can be substituted here.

use std::collections::HashSet;
use std::ops::Not;

use thiserror::Error;
use varisat::ExtendFormula;

/// A propositional literal handed out by an oracle.
///
/// Internally a nonzero DIMACS-style signed index; negation flips the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Lit {
    /// Positive literal of the 1-based variable `var`.
    pub fn from_var(var: usize) -> Self {
        debug_assert!(var >= 1);
        Lit(var as i64)
    }

    /// 1-based variable index.
    pub fn var(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    pub fn is_negated(self) -> bool {
        self.0 < 0
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

/// Outcome of an [`Oracle::solve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// A model satisfying clauses and assumptions exists.
    Sat,
    /// No model exists under the given assumptions.
    Unsat,
    /// The solve was interrupted or failed; nothing is proven.
    Unknown,
}

/// The oracle rejected a clause: its accumulated clause set is unsatisfiable
/// regardless of any assumptions.
#[derive(Debug, Error)]
#[error("oracle rejected a clause: accumulated state is unsatisfiable")]
pub struct OracleError;

/// Capability interface over an incremental satisfiability engine.
///
/// Clauses accumulate monotonically for the lifetime of the session; there
/// is no reset. A session must not be shared across unrelated graphs, since
/// literal allocation is scoped to a single circuit.
pub trait Oracle {
    /// Allocates a fresh literal.
    fn allocate_literal(&mut self) -> Lit;

    /// Adds a clause. Returns false if the oracle is now permanently
    /// unsatisfiable.
    fn add_clause(&mut self, clause: &[Lit]) -> bool;

    /// Decides satisfiability of the accumulated clauses under the given
    /// assumptions.
    fn solve(&mut self, assumptions: &[Lit]) -> SolveResult;

    /// Value of `lit` in the model. Only meaningful immediately after a
    /// [`SolveResult::Sat`].
    fn value_of(&self, lit: Lit) -> bool;

    /// Best-effort: aborts an in-flight solve, making it return
    /// [`SolveResult::Unknown`] instead of blocking. Default is a no-op.
    fn interrupt(&self) {}
}

/// [`Oracle`] implementation over an in-process [varisat](https://docs.rs/varisat) solver.
///
/// varisat supports incrementality natively through assume/solve, so solve
/// calls reuse everything the session has learnt so far. Note that its
/// `add_clause` cannot report an already-contradictory state (the
/// contradiction only surfaces at solve time), so this backend always
/// answers true.
pub struct VarisatOracle<'a> {
    solver: varisat::Solver<'a>,
    interrupt: varisat::solver::InterruptHandle,
    /// Backend literal per allocated variable (index `var - 1`).
    lits: Vec<varisat::Lit>,
    /// Model of the most recent Sat answer.
    model: HashSet<varisat::Lit>,
}

impl<'a> VarisatOracle<'a> {
    pub fn new() -> Self {
        let solver = varisat::Solver::new();
        let interrupt = solver.interrupt_handle();
        VarisatOracle {
            solver,
            interrupt,
            lits: Vec::new(),
            model: HashSet::new(),
        }
    }

    fn map(&self, lit: Lit) -> varisat::Lit {
        let backend = self.lits[lit.var() - 1];
        if lit.is_negated() { !backend } else { backend }
    }
}

impl Default for VarisatOracle<'_> {
    fn default() -> Self {
        VarisatOracle::new()
    }
}

impl Oracle for VarisatOracle<'_> {
    fn allocate_literal(&mut self) -> Lit {
        self.lits.push(self.solver.new_lit());
        Lit::from_var(self.lits.len())
    }

    fn add_clause(&mut self, clause: &[Lit]) -> bool {
        let mapped: Vec<varisat::Lit> = clause.iter().map(|&l| self.map(l)).collect();
        self.solver.add_clause(&mapped);
        true
    }

    fn solve(&mut self, assumptions: &[Lit]) -> SolveResult {
        let mapped: Vec<varisat::Lit> = assumptions.iter().map(|&l| self.map(l)).collect();
        self.solver.assume(&mapped);
        match self.solver.solve() {
            Ok(true) => {
                self.model = self
                    .solver
                    .model()
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                SolveResult::Sat
            }
            Ok(false) => SolveResult::Unsat,
            Err(_) => SolveResult::Unknown,
        }
    }

    fn value_of(&self, lit: Lit) -> bool {
        self.model.contains(&self.map(lit))
    }

    fn interrupt(&self) {
        self.interrupt.interrupt();
    }
}
