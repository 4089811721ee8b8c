//! Cardinality constraints via odd-even merge sorting networks.
//!
//! [`at_least_k`] compiles "at least `k` of these literals are true" into a
//! comparator network: the inputs are sorted by a Batcher odd-even
//! mergesort, every comparator cell introducing two fresh wires with the
//! output-to-input implication clauses, and the `k`-th sorted output wire is
//! asserted true. The network needs `O(n·log²n)` clauses, against the
//! binomial blow-up of enumerating the constraint directly.
//!
//! Inputs are padded to a power of two with constant-false wires; those fold
//! through comparator cells without emitting clauses or fresh variables.
//! Duplicate input literals are treated as independent wires.

use log::debug;

use crate::cnf::{Clause, Cnf};
use crate::formula::FormulaFactory;
use crate::types::Lit;

/// A wire of the network; `None` is the constant-false wire.
type Wire = Option<Lit>;

/// Build a CNF asserting that at least `rhs` of `lits` are true.
///
/// Edge cases: `rhs == 0` yields the empty clause set (no restriction),
/// `rhs > lits.len()` yields an unsatisfiable clause set.
///
/// # Panics
///
/// Panics if `rhs` is negative.
pub fn at_least_k(factory: &FormulaFactory, lits: &[Lit], rhs: i32) -> Cnf {
    assert!(rhs >= 0, "Cardinality bound must be non-negative, got {}", rhs);

    let mut cnf = Cnf::new();
    if rhs == 0 {
        return cnf;
    }
    let rhs = rhs as usize;
    if rhs > lits.len() {
        cnf.add_clause(Clause::empty());
        return cnf;
    }

    let mut builder = NetworkBuilder {
        factory,
        cnf: Cnf::new(),
    };

    let mut wires: Vec<Wire> = lits.iter().map(|&lit| Some(lit)).collect();
    let padded = wires.len().next_power_of_two();
    wires.resize(padded, None);

    let sorted = builder.sort(wires);
    debug!(
        "cardinality network: {} inputs, {} clauses",
        lits.len(),
        builder.cnf.num_clauses()
    );

    // With n real inputs the first n sorted outputs are real wires.
    let output = sorted[rhs - 1].expect("sorted output within the input count");
    let mut cnf = builder.cnf;
    cnf.add_clause(Clause::unit(output));
    cnf
}

/// Build a CNF asserting that at most `rhs` of `lits` are true.
///
/// Dual of [`at_least_k`] over the negated inputs.
///
/// # Panics
///
/// Panics if `rhs` is negative.
pub fn at_most_k(factory: &FormulaFactory, lits: &[Lit], rhs: i32) -> Cnf {
    assert!(rhs >= 0, "Cardinality bound must be non-negative, got {}", rhs);

    let n = lits.len() as i32;
    if rhs >= n {
        return Cnf::new();
    }
    let negated: Vec<Lit> = lits.iter().map(|&lit| -lit).collect();
    at_least_k(factory, &negated, n - rhs)
}

struct NetworkBuilder<'a> {
    factory: &'a FormulaFactory,
    cnf: Cnf,
}

impl NetworkBuilder<'_> {
    /// Sort `wires` (length a power of two) into descending order: output 0
    /// carries the maximum.
    fn sort(&mut self, wires: Vec<Wire>) -> Vec<Wire> {
        debug_assert!(wires.len().is_power_of_two());
        if wires.len() == 1 {
            return wires;
        }
        let half = wires.len() / 2;
        let (left, right) = wires.split_at(half);
        let left = self.sort(left.to_vec());
        let right = self.sort(right.to_vec());
        self.merge(left, right)
    }

    /// Batcher odd-even merge of two sorted runs of equal power-of-two
    /// length.
    fn merge(&mut self, a: Vec<Wire>, b: Vec<Wire>) -> Vec<Wire> {
        debug_assert_eq!(a.len(), b.len());
        if a.len() == 1 {
            let (hi, lo) = self.comparator(a[0], b[0]);
            return vec![hi, lo];
        }

        let evens = |run: &[Wire]| run.iter().copied().step_by(2).collect::<Vec<_>>();
        let odds = |run: &[Wire]| run.iter().copied().skip(1).step_by(2).collect::<Vec<_>>();

        let d = self.merge(evens(&a), evens(&b));
        let e = self.merge(odds(&a), odds(&b));

        let n = d.len();
        let mut out = Vec::with_capacity(2 * n);
        out.push(d[0]);
        for i in 0..n - 1 {
            let (hi, lo) = self.comparator(d[i + 1], e[i]);
            out.push(hi);
            out.push(lo);
        }
        out.push(e[n - 1]);
        out
    }

    /// One comparator cell: `(max, min)` of the two input wires.
    ///
    /// A constant-false input folds the cell away. A real cell introduces
    /// two fresh wires with the clauses `hi => a | b`, `lo => a`, `lo => b`;
    /// that implication direction is what lets an asserted output wire force
    /// inputs below it to be true.
    fn comparator(&mut self, a: Wire, b: Wire) -> (Wire, Wire) {
        match (a, b) {
            (None, None) => (None, None),
            (Some(x), None) | (None, Some(x)) => (Some(x), None),
            (Some(a), Some(b)) => {
                let hi = self.factory.aux_var().pos();
                let lo = self.factory.aux_var().pos();
                self.cnf.add_clause(Clause::new(vec![-hi, a, b]));
                self.cnf.add_clause(Clause::new(vec![-lo, a]));
                self.cnf.add_clause(Clause::new(vec![-lo, b]));
                (Some(hi), Some(lo))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::solver::Solver;
    use crate::types::Var;

    /// Model count of the encoding projected onto the input variables.
    fn count_models(cnf: &Cnf, vars: &[Var]) -> usize {
        let max_var = vars.iter().map(|v| v.id()).max().unwrap_or(0);
        let mut solver = Solver::new(cnf.num_vars().max(max_var));
        solver.add_cnf(cnf);
        solver.enumerate_models(vars).len()
    }

    fn fresh_vars(factory: &FormulaFactory, n: usize) -> Vec<Var> {
        (0..n).map(|_| factory.var()).collect()
    }

    fn pos_lits(vars: &[Var]) -> Vec<Lit> {
        vars.iter().map(|v| v.pos()).collect()
    }

    #[test]
    fn test_empty_inputs_zero_bound() {
        let factory = FormulaFactory::new();
        let cnf = at_least_k(&factory, &[], 0);
        assert!(cnf.is_empty());
    }

    #[test]
    #[should_panic(expected = "Cardinality bound must be non-negative")]
    fn test_negative_bound() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 4);
        at_least_k(&factory, &pos_lits(&vars), -1);
    }

    #[test]
    fn test_zero_bound_is_unrestricted() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 3);
        let cnf = at_least_k(&factory, &pos_lits(&vars), 0);
        assert!(cnf.is_empty());
        assert_eq!(count_models(&cnf, &vars), 8);
    }

    #[test]
    fn test_bound_above_input_count_is_unsat() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 10);
        let cnf = at_least_k(&factory, &pos_lits(&vars), 12);
        assert_eq!(count_models(&cnf, &vars), 0);
    }

    /// Model counts over 10 inputs must match `Σ_{i=k}^{10} C(10,i)`.
    #[test]
    fn test_at_least_k_of_ten() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 10);
        let lits = pos_lits(&vars);

        let expected = [1023, 1013, 968, 848, 638, 386, 176, 56, 11, 1];
        for (k, &count) in (1..=10).zip(expected.iter()) {
            let cnf = at_least_k(&factory, &lits, k);
            assert_eq!(
                count_models(&cnf, &vars),
                count,
                "wrong model count for k = {}",
                k
            );
        }
    }

    #[test]
    fn test_models_respect_the_bound() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 6);
        let lits = pos_lits(&vars);

        let cnf = at_least_k(&factory, &lits, 4);
        let max_var = cnf.num_vars();
        let mut solver = Solver::new(max_var);
        solver.add_cnf(&cnf);
        for model in solver.enumerate_models(&vars) {
            let positives = model.iter().filter(|lit| !lit.is_negated()).count();
            assert!(positives >= 4, "model with only {} positives", positives);
        }
    }

    #[test]
    fn test_all_inputs_required() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 20);
        let lits = pos_lits(&vars);

        let cnf = at_least_k(&factory, &lits, 20);
        let models = {
            let mut solver = Solver::new(cnf.num_vars());
            solver.add_cnf(&cnf);
            solver.enumerate_models(&vars)
        };
        assert_eq!(models.len(), 1);
        assert!(models[0].iter().all(|lit| !lit.is_negated()));
    }

    #[test]
    fn test_negated_and_duplicate_inputs() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 3);

        // at-least-2 of {~x1, x2, x2}: duplicates stay independent wires,
        // so x2 alone already contributes two true wires.
        let lits = vec![vars[0].neg(), vars[1].pos(), vars[1].pos()];
        let cnf = at_least_k(&factory, &lits, 2);
        let mut solver = Solver::new(cnf.num_vars());
        solver.add_cnf(&cnf);
        let check_vars = [vars[0], vars[1]];
        let models = solver.enumerate_models(&check_vars);
        // (x1=F, x2=T) gives three true wires and (x1=T, x2=T) two; every
        // other assignment stays below the bound.
        assert_eq!(models.len(), 2);
    }

    #[test]
    fn test_at_most_k() {
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 5);
        let lits = pos_lits(&vars);

        // Σ_{i=0}^{2} C(5,i) = 1 + 5 + 10.
        let cnf = at_most_k(&factory, &lits, 2);
        assert_eq!(count_models(&cnf, &vars), 16);

        // A bound at or above the input count is no restriction.
        let cnf = at_most_k(&factory, &lits, 5);
        assert!(cnf.is_empty());
    }

    #[test]
    fn test_clause_count_stays_subquadratic() {
        // 3 clauses per comparator and O(n·log²n) comparators; for n = 32
        // the naive binomial encoding of at-least-16 would need C(32,17)
        // clauses, far beyond this.
        let factory = FormulaFactory::new();
        let vars = fresh_vars(&factory, 32);
        let cnf = at_least_k(&factory, &pos_lits(&vars), 16);
        assert!(cnf.num_clauses() <= 3 * 32 * 25 + 1);
    }
}
