//! Branch-and-bound MaxSAT.
//!
//! Hard clauses must hold; each soft clause costs 1 when falsified, and the
//! search minimizes the total cost. Depth-first branching over the variables
//! with two prunings: a fully falsified hard clause (a conflict, reported to
//! the embedded SAT handler), and a partial cost already at the incumbent.
//!
//! Handler checkpoints: every improved incumbent triggers
//! [`MaxSatHandler::found_upper_bound`]; exhausting the search proves the
//! optimum and triggers [`MaxSatHandler::found_lower_bound`] with the final
//! cost. A search aborted at any checkpoint returns
//! [`MaxSatResult::Aborted`]; the best bounds remain queryable on the
//! handler.

use log::debug;

use crate::cnf::{Clause, Cnf};
use crate::handler::MaxSatHandler;
use crate::solver::Model;
use crate::types::Var;

/// Outcome of a MaxSAT search.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MaxSatResult {
    /// Proven optimum: the minimal number of falsified soft clauses.
    Optimum { cost: i32, model: Model },
    /// The hard clauses are unsatisfiable.
    Unsat,
    /// The handler aborted the search before it finished.
    Aborted,
}

pub struct MaxSatSolver {
    num_vars: u32,
    hard: Vec<Clause>,
    soft: Vec<Clause>,
}

struct Search<'a> {
    hard: &'a [Clause],
    soft: &'a [Clause],
    num_vars: u32,
    assignment: Vec<Option<bool>>,
    best_cost: i32,
    best_model: Option<Model>,
}

/// Raised when a handler checkpoint returns `false`.
struct AbortedSearch;

impl MaxSatSolver {
    pub fn new(num_vars: u32) -> Self {
        Self {
            num_vars,
            hard: Vec::new(),
            soft: Vec::new(),
        }
    }

    pub fn add_hard(&mut self, clause: Clause) {
        for lit in clause.lits() {
            self.num_vars = self.num_vars.max(lit.var().id());
        }
        self.hard.push(clause);
    }

    pub fn add_hard_cnf(&mut self, cnf: &Cnf) {
        for clause in cnf.clauses() {
            self.add_hard(clause.clone());
        }
    }

    pub fn add_soft(&mut self, clause: Clause) {
        for lit in clause.lits() {
            self.num_vars = self.num_vars.max(lit.var().id());
        }
        self.soft.push(clause);
    }

    pub fn num_soft(&self) -> usize {
        self.soft.len()
    }

    /// Minimize the number of falsified soft clauses, polling the handler
    /// at every bound improvement.
    pub fn solve(&self, handler: &mut dyn MaxSatHandler) -> MaxSatResult {
        handler.started_solving();

        let mut search = Search {
            hard: &self.hard,
            soft: &self.soft,
            num_vars: self.num_vars,
            assignment: vec![None; self.num_vars as usize],
            best_cost: i32::MAX,
            best_model: None,
        };

        let outcome = search.branch(1, handler);
        let result = match outcome {
            Err(AbortedSearch) => MaxSatResult::Aborted,
            Ok(()) => match search.best_model {
                None => MaxSatResult::Unsat,
                Some(model) => {
                    let cost = search.best_cost;
                    // The exhausted search proves the bound from below too.
                    handler.found_lower_bound(cost, &model);
                    debug!("maxsat optimum: {} falsified soft clauses", cost);
                    MaxSatResult::Optimum { cost, model }
                }
            },
        };

        handler.finished_solving();
        result
    }
}

impl Search<'_> {
    fn branch(&mut self, var: u32, handler: &mut dyn MaxSatHandler) -> Result<(), AbortedSearch> {
        // Hard conflict: this subtree holds no feasible assignment.
        if self.has_falsified(self.hard) {
            if let Some(sat) = handler.sat_handler() {
                if !sat.detected_conflict() {
                    return Err(AbortedSearch);
                }
            }
            return Ok(());
        }

        // Bound: the partial cost can only grow further down.
        let cost = self.falsified_count(self.soft);
        if cost >= self.best_cost {
            return Ok(());
        }

        if var > self.num_vars {
            // Complete assignment strictly better than the incumbent.
            self.best_cost = cost;
            let model = self.model();
            self.best_model = Some(model.clone());
            debug!("maxsat incumbent: cost {}", cost);
            if !handler.found_upper_bound(cost, &model) {
                return Err(AbortedSearch);
            }
            return Ok(());
        }

        for value in [true, false] {
            self.assignment[(var - 1) as usize] = Some(value);
            self.branch(var + 1, handler)?;
        }
        self.assignment[(var - 1) as usize] = None;
        Ok(())
    }

    fn has_falsified(&self, clauses: &[Clause]) -> bool {
        clauses.iter().any(|clause| self.is_falsified(clause))
    }

    fn falsified_count(&self, clauses: &[Clause]) -> i32 {
        clauses.iter().filter(|clause| self.is_falsified(clause)).count() as i32
    }

    /// A clause is falsified once every literal is assigned false.
    fn is_falsified(&self, clause: &Clause) -> bool {
        clause.lits().iter().all(|lit| {
            self.assignment[(lit.var().id() - 1) as usize] == Some(lit.is_negated())
        })
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
