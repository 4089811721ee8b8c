//! # satkit: Boolean encodings and cooperative cancellation in Rust
//!
//! **`satkit`** is a toolkit for turning propositional formulas into clause
//! sets a SAT engine can consume, and for keeping potentially exponential
//! searches on a leash with a cooperative cancellation protocol.
//!
//! ## What is in the box?
//!
//! - A **manager-centric BDD engine**: all diagrams are built through the
//!   [`Bdd`][crate::bdd::Bdd] manager, which hash-conses nodes for maximal
//!   sharing and memoizes operations in a computed table. Complemented edges
//!   make negation free.
//! - **Two CNF encodings** with opposite trade-offs: the structure-sharing
//!   [Tseitin transformation][crate::tseitin::TseitinEncoder]
//!   (equisatisfiable, linear in the formula graph, introduces auxiliary
//!   variables) and the [BDD-based transformation][crate::cnf::BddCnfEncoder]
//!   (logically equivalent, no auxiliary variables, sized by the function's
//!   BDD).
//! - A **cardinality network builder** ([`card`]) compiling at-least-k /
//!   at-most-k constraints into comparator-network CNF in `O(n·log²n)`
//!   clauses.
//! - A **handler protocol** ([`handler`]) polled by search loops at
//!   conflicts and bound improvements, with timeout implementations that
//!   track the best bounds found so far.
//! - Compact **reference search engines** ([`solver`], [`maxsat`]) that
//!   honor the handler contract, used to exercise the encodings end to end.
//!
//! ## Basic Usage
//!
//! ```rust
//! use satkit::formula::FormulaFactory;
//! use satkit::solver::Solver;
//! use satkit::tseitin::TseitinEncoder;
//!
//! // 1. Build a formula through the factory.
//! let f = FormulaFactory::new();
//! let a = f.var();
//! let b = f.var();
//! let formula = f.and([f.pos(a), f.implication(f.pos(a), f.pos(b))]);
//!
//! // 2. Encode it to CNF.
//! let mut encoder = TseitinEncoder::new();
//! let cnf = encoder.encode(&f, formula);
//!
//! // 3. Hand the clauses to a solver.
//! let mut solver = Solver::new(cnf.num_vars());
//! solver.add_cnf(&cnf);
//! assert!(solver.solve().is_sat());
//! ```
//!
//! ## Bounding a search
//!
//! Any search accepting a handler can be stopped cooperatively. A timeout
//! handler captures a deadline when the search starts and answers every
//! checkpoint with `now < deadline`; an aborted search reports
//! `Unknown`/`Aborted` and the best bounds remain queryable:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use satkit::cnf::Clause;
//! use satkit::handler::{MaxSatHandler, TimeoutMaxSatHandler};
//! use satkit::maxsat::{MaxSatResult, MaxSatSolver};
//! use satkit::types::Var;
//!
//! let mut solver = MaxSatSolver::new(2);
//! solver.add_soft(Clause::unit(Var::new(1).pos()));
//! solver.add_soft(Clause::unit(Var::new(1).neg()));
//! solver.add_soft(Clause::unit(Var::new(2).pos()));
//!
//! let mut handler = TimeoutMaxSatHandler::new(Duration::from_secs(60));
//! match solver.solve(&mut handler) {
//!     MaxSatResult::Optimum { cost, .. } => assert_eq!(cost, 1),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! assert_eq!(handler.upper_bound_approximation(), 1);
//! ```
//!
//! All computations are synchronous and single-threaded; concurrent
//! searches need independent managers, factories and handler instances.

pub mod bdd;
pub mod cache;
pub mod card;
pub mod cnf;
pub mod formula;
pub mod handler;
pub mod maxsat;
pub mod paths;
pub mod reference;
pub mod sat;
pub mod solver;
pub mod table;
pub mod tseitin;
pub mod types;
pub mod utils;
