//! CNF data model and the BDD-based CNF transformation.
//!
//! [`BddCnfEncoder`] produces a CNF that is *logically equivalent* to the
//! input formula over the same variables: the formula is compiled into a
//! single BDD and every path to the FALSE terminal is turned into one
//! blocking clause (the disjunction of the negated path literals). Blocking
//! all falsifying paths asserts the function itself, and no auxiliary
//! variables are introduced. The price is that the clause count is bounded
//! by the number of falsifying paths, which is exponential for unfortunate
//! variable orders; there is deliberately no fallback or size cap.

use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;

use crate::bdd::{Bdd, Op};
use crate::formula::{Formula, FormulaFactory, FormulaId};
use crate::reference::Ref;
use crate::types::Lit;

/// A disjunction of literals. The empty clause is falsum.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: Vec<Lit>) -> Self {
        Self { lits }
    }

    pub fn unit(lit: Lit) -> Self {
        Self { lits: vec![lit] }
    }

    /// The empty clause, satisfied by nothing.
    pub fn empty() -> Self {
        Self { lits: Vec::new() }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Truth value under a total assignment.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.lits
            .iter()
            .any(|lit| assignment[(lit.var().id() - 1) as usize] != lit.is_negated())
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self.lits.iter().map(Lit::to_string).collect();
        write!(f, "({})", parts.join(" | "))
    }
}

/// An ordered sequence of clauses plus the highest referenced variable.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Cnf {
    clauses: Vec<Clause>,
    num_vars: u32,
}

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: Clause) {
        for lit in clause.lits() {
            self.num_vars = self.num_vars.max(lit.var().id());
        }
        self.clauses.push(clause);
    }

    pub fn extend(&mut self, other: &Cnf) {
        for clause in &other.clauses {
            self.add_clause(clause.clone());
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Truth value under a total assignment over all referenced variables.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.clauses.iter().all(|clause| clause.evaluate(assignment))
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self.clauses.iter().map(Clause::to_string).collect();
        write!(f, "{}", parts.join(" & "))
    }
}

impl Bdd {
    /// Derive a CNF exactly equivalent to the function of `f`.
    ///
    /// Every path to the FALSE terminal becomes one blocking clause (the
    /// negated path literals); blocking all falsifying paths asserts the
    /// function. No auxiliary variables are introduced, and the clause count
    /// equals the number of falsifying paths.
    pub fn to_cnf(&self, f: Ref) -> Cnf {
        let mut cnf = Cnf::new();
        for path in self.paths_to_false(f) {
            cnf.add_clause(path.into_iter().map(|lit| -lit).collect());
        }
        cnf
    }
}

/// CNF transformation via BDD compilation and falsifying-path extraction.
///
/// With [`BddCnfEncoder::new`], each encoding call builds a private manager
/// sized to the formula's variables. With [`BddCnfEncoder::with_manager`],
/// the caller-supplied manager is reused across calls; its declared variable
/// count must cover every encoded formula, otherwise construction fails.
#[derive(Debug, Default)]
pub struct BddCnfEncoder {
    manager: Option<Bdd>,
}

impl BddCnfEncoder {
    pub fn new() -> Self {
        Self { manager: None }
    }

    pub fn with_manager(manager: Bdd) -> Self {
        Self {
            manager: Some(manager),
        }
    }

    pub fn manager(&self) -> Option<&Bdd> {
        self.manager.as_ref()
    }

    /// Encode `root` into a logically equivalent CNF without auxiliary
    /// variables.
    pub fn encode(&self, factory: &FormulaFactory, root: FormulaId) -> Cnf {
        let mut cnf = Cnf::new();

        match factory.kind(root) {
            Formula::Const(true) => return cnf,
            Formula::Const(false) => {
                cnf.add_clause(Clause::empty());
                return cnf;
            }
            Formula::Lit(lit) => {
                cnf.add_clause(Clause::unit(lit));
                return cnf;
            }
            _ => {}
        }

        let private;
        let bdd = match &self.manager {
            Some(manager) => manager,
            None => {
                let max_var = factory
                    .variables(root)
                    .iter()
                    .map(|v| v.id())
                    .max()
                    .unwrap_or(0);
                private = Bdd::new(max_var);
                &private
            }
        };

        let mut memo = FxHashMap::default();
        let node = compile(factory, bdd, root, &mut memo);
        debug!(
            "bdd-cnf: compiled {} into {} nodes",
            factory.to_string(root),
            bdd.node_count(node)
        );

        cnf.extend(&bdd.to_cnf(node));
        cnf
    }
}

/// Compile a formula into a single BDD node, memoized over the formula DAG.
fn compile(
    factory: &FormulaFactory,
    bdd: &Bdd,
    id: FormulaId,
    memo: &mut FxHashMap<FormulaId, Ref>,
) -> Ref {
    if let Some(&node) = memo.get(&id) {
        return node;
    }
    let node = match factory.kind(id) {
        Formula::Const(value) => bdd.terminal(value),
        Formula::Lit(lit) => {
            let v = bdd.mk_var(lit.var().id());
            if lit.is_negated() {
                -v
            } else {
                v
            }
        }
        Formula::Not(x) => -compile(factory, bdd, x, memo),
        Formula::And(ops) => {
            let nodes: Vec<_> = ops
                .iter()
                .map(|&op| compile(factory, bdd, op, memo))
                .collect();
            bdd.apply_and_many(nodes)
        }
        Formula::Or(ops) => {
            let nodes: Vec<_> = ops
                .iter()
                .map(|&op| compile(factory, bdd, op, memo))
                .collect();
            bdd.apply_or_many(nodes)
        }
        Formula::Impl(a, b) => {
            let a = compile(factory, bdd, a, memo);
            let b = compile(factory, bdd, b, memo);
            bdd.apply(Op::Imply, a, b)
        }
        Formula::Equiv(a, b) => {
            let a = compile(factory, bdd, a, memo);
            let b = compile(factory, bdd, b, memo);
            bdd.apply(Op::Equiv, a, b)
        }
    };
    memo.insert(id, node);
    node
}
