//! A compact DPLL reference solver.
//!
//! This is the collaborator the encoders hand their clauses to: clause
//! storage, unit propagation over a trail with occurrence lists, depth-first
//! search with chronological backtracking, and model enumeration by
//! projection. It is deliberately naive (no watched literals, no clause
//! learning) — its job is to exercise the encodings and the cancellation
//! protocol, not to win competitions.
//!
//! The search polls [`SatHandler::detected_conflict`] at every conflict;
//! once a checkpoint returns `false` the search stops and the result is
//! [`Solution::Unknown`].

use log::debug;

use crate::cnf::{Clause, Cnf};
use crate::handler::{NopSatHandler, SatHandler};
use crate::types::{Lit, Var};

/// A total assignment, one literal per variable, ordered by variable.
pub type Model = Vec<Lit>;

/// Outcome of a SAT search.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Solution {
    Sat(Model),
    Unsat,
    /// The search was aborted by its handler before reaching a result.
    Unknown,
}

impl Solution {
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Sat(_))
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            Solution::Sat(model) => Some(model),
            _ => None,
        }
    }
}

pub struct Solver {
    num_vars: u32,
    clauses: Vec<Clause>,
}

impl Solver {
    pub fn new(num_vars: u32) -> Self {
        Self {
            num_vars,
            clauses: Vec::new(),
        }
    }

    pub fn add_clause(&mut self, clause: Clause) {
        for lit in clause.lits() {
            self.num_vars = self.num_vars.max(lit.var().id());
        }
        self.clauses.push(clause);
    }

    pub fn add_cnf(&mut self, cnf: &Cnf) {
        for clause in cnf.clauses() {
            self.add_clause(clause.clone());
        }
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn solve(&self) -> Solution {
        self.solve_with_handler(&mut NopSatHandler)
    }

    /// Solve, polling the handler at every conflict.
    pub fn solve_with_handler(&self, handler: &mut dyn SatHandler) -> Solution {
        handler.started_solving();
        let result = Search::new(&self.clauses, self.num_vars).run(handler);
        handler.finished_solving();
        result
    }

    /// Enumerate all models projected onto `vars`.
    ///
    /// Repeatedly solves, records the projection of the model onto `vars`,
    /// and blocks it, so each returned model is a distinct projection.
    pub fn enumerate_models(&self, vars: &[Var]) -> Vec<Model> {
        for var in vars {
            assert!(
                var.id() <= self.num_vars,
                "Undeclared variable {} (solver has {} variables)",
                var,
                self.num_vars
            );
        }

        let mut clauses = self.clauses.clone();
        let mut models = Vec::new();

        loop {
            match Search::new(&clauses, self.num_vars).run(&mut NopSatHandler) {
                Solution::Sat(model) => {
                    let projection: Model = vars
                        .iter()
                        .map(|var| model[(var.id() - 1) as usize])
                        .collect();
                    let blocking: Clause = projection.iter().map(|&lit| -lit).collect();
                    models.push(projection);
                    let done = blocking.is_empty();
                    clauses.push(blocking);
                    if done {
                        break;
                    }
                }
                _ => break,
            }
        }

        models
    }
}

#[derive(Debug)]
struct Decision {
    var: u32,
    /// Whether the complementary value was already tried.
    flipped: bool,
    trail_len: usize,
}

/// Status of a clause under a partial assignment.
enum Assess {
    Satisfied,
    Unresolved,
    Unit(Lit),
    Conflict,
}

struct Search<'a> {
    clauses: &'a [Clause],
    num_vars: u32,
    /// For each literal, the clauses containing it (see [`lit_slot`]).
    occurrences: Vec<Vec<usize>>,
    assignment: Vec<Option<bool>>,
    trail: Vec<u32>,
    /// Trail position up to which propagation has been performed.
    qhead: usize,
    decisions: Vec<Decision>,
}

/// Slot of a literal in the occurrence table.
fn lit_slot(lit: Lit) -> usize {
    let v = lit.var().id() as usize;
    2 * v + lit.is_negated() as usize
}

impl<'a> Search<'a> {
    fn new(clauses: &'a [Clause], num_vars: u32) -> Self {
        let mut occurrences = vec![Vec::new(); 2 * (num_vars as usize + 1)];
        for (i, clause) in clauses.iter().enumerate() {
            for &lit in clause.lits() {
                occurrences[lit_slot(lit)].push(i);
            }
        }
        Self {
            clauses,
            num_vars,
            occurrences,
            assignment: vec![None; num_vars as usize],
            trail: Vec::new(),
            qhead: 0,
            decisions: Vec::new(),
        }
    }

    fn value(&self, lit: Lit) -> Option<bool> {
        self.assignment[(lit.var().id() - 1) as usize].map(|value| value != lit.is_negated())
    }

    fn assign(&mut self, lit: Lit) {
        self.assignment[(lit.var().id() - 1) as usize] = Some(!lit.is_negated());
        self.trail.push(lit.var().id());
    }

    fn assess(&self, clause: &Clause) -> Assess {
        let mut unassigned = None;
        let mut num_unassigned = 0;
        for &lit in clause.lits() {
            match self.value(lit) {
                Some(true) => return Assess::Satisfied,
                Some(false) => {}
                None => {
                    num_unassigned += 1;
                    unassigned = Some(lit);
                }
            }
        }
        match num_unassigned {
            0 => Assess::Conflict,
            1 => Assess::Unit(unassigned.unwrap()),
            _ => Assess::Unresolved,
        }
    }

    /// Propagate every trail entry past `qhead` to fixpoint.
    /// Returns `false` on conflict.
    fn propagate(&mut self) -> bool {
        while self.qhead < self.trail.len() {
            let v = self.trail[self.qhead];
            self.qhead += 1;

            // Only clauses containing the literal that just became false
            // can newly turn unit or conflicting.
            let falsified = if self.assignment[(v - 1) as usize].unwrap() {
                Var::new(v).neg()
            } else {
                Var::new(v).pos()
            };
            for i in 0..self.occurrences[lit_slot(falsified)].len() {
                let clause = &self.clauses[self.occurrences[lit_slot(falsified)][i]];
                match self.assess(clause) {
                    Assess::Conflict => return false,
                    Assess::Unit(lit) => self.assign(lit),
                    _ => {}
                }
            }
        }
        true
    }

    fn run(&mut self, handler: &mut dyn SatHandler) -> Solution {
        // Seed the trail with the initial units; an empty clause is an
        // immediate conflict.
        for clause in self.clauses {
            match self.assess(clause) {
                Assess::Conflict => {
                    return if handler.detected_conflict() {
                        Solution::Unsat
                    } else {
                        Solution::Unknown
                    };
                }
                Assess::Unit(lit) => self.assign(lit),
                _ => {}
            }
        }

        loop {
            if self.propagate() {
                // No conflict: decide the next unassigned variable. Variables
                // below the deepest decision are all assigned already.
                let start = self.decisions.last().map_or(1, |d| d.var + 1);
                match (start..=self.num_vars).find(|&v| self.assignment[(v - 1) as usize].is_none())
                {
                    None => return Solution::Sat(self.model()),
                    Some(v) => {
                        self.decisions.push(Decision {
                            var: v,
                            flipped: false,
                            trail_len: self.trail.len(),
                        });
                        self.assign(Var::new(v).pos());
                    }
                }
            } else {
                // Conflict checkpoint: the handler decides whether to go on.
                if !handler.detected_conflict() {
                    debug!(
                        "search aborted by handler after {} decisions",
                        self.decisions.len()
                    );
                    return Solution::Unknown;
                }

                // Chronological backtracking: flip the deepest unflipped
                // decision.
                loop {
                    match self.decisions.pop() {
                        None => return Solution::Unsat,
                        Some(decision) => {
                            let value = self.assignment[(decision.var - 1) as usize].unwrap();
                            for &v in &self.trail[decision.trail_len..] {
                                self.assignment[(v - 1) as usize] = None;
                            }
                            self.trail.truncate(decision.trail_len);
                            self.qhead = decision.trail_len;

                            if !decision.flipped {
                                let var = Var::new(decision.var);
                                self.assign(if value { var.neg() } else { var.pos() });
                                self.decisions.push(Decision {
                                    var: decision.var,
                                    flipped: true,
                                    trail_len: decision.trail_len,
                                });
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    fn model(&self) -> Model {
        (1..=self.num_vars)
            .map(|v| {
                let var = Var::new(v);
                if self.assignment[(v - 1) as usize].unwrap() {
                    var.pos()
                } else {
                    var.neg()
                }
            })
            .collect()
    }
}
