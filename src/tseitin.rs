//! Structure-sharing Tseitin transformation.
//!
//! Every distinct sub-formula identity receives one representative literal:
//! the literal itself for leaves, the negated child representative for
//! negations, and a fresh auxiliary variable for connectives. Definitional
//! clauses tie each auxiliary variable to its connective, and a final unit
//! clause asserts the root representative. The result is equisatisfiable
//! with the input (models correspond under projection onto the original
//! variables), and its size is linear in the size of the formula *graph*,
//! not the formula tree.
//!
//! A polarity pass over the DAG decides which implication direction each
//! sub-formula actually needs: a sub-formula occurring only positively gets
//! only the `rep => connective` clauses, only negatively only the converse,
//! and both directions when both polarities occur. The per-encoder cache
//! persists across calls, so re-encoding a formula reuses its auxiliary
//! variables and emits no duplicate definitions.

use log::debug;
use rustc_hash::FxHashMap;

use crate::cnf::{Clause, Cnf};
use crate::formula::{Formula, FormulaFactory, FormulaId};
use crate::types::Lit;

#[derive(Debug)]
struct CacheEntry {
    rep: Lit,
    /// Which implication directions have been emitted so far.
    pos_done: bool,
    neg_done: bool,
    clauses: Vec<Clause>,
}

/// Tseitin encoder with a persistent encoding cache.
#[derive(Debug, Default)]
pub struct TseitinEncoder {
    cache: FxHashMap<FormulaId, CacheEntry>,
}

impl TseitinEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The representative literal of an already-encoded sub-formula.
    pub fn representative(&self, id: FormulaId) -> Option<Lit> {
        self.cache.get(&id).map(|entry| entry.rep)
    }

    /// Encode `root` into an equisatisfiable CNF.
    pub fn encode(&mut self, factory: &FormulaFactory, root: FormulaId) -> Cnf {
        let mut cnf = Cnf::new();

        match factory.kind(root) {
            Formula::Const(true) => return cnf,
            Formula::Const(false) => {
                cnf.add_clause(Clause::empty());
                return cnf;
            }
            _ => {}
        }

        let polarities = self.mark_polarities(factory, root);
        for (&id, &(pos, neg)) in &polarities {
            self.encode_node(factory, id, pos, neg);
        }

        // Collect the definitional clauses of every reachable sub-formula.
        let mut ids: Vec<_> = polarities.keys().copied().collect();
        ids.sort();
        for id in ids {
            for clause in &self.cache[&id].clauses {
                cnf.add_clause(clause.clone());
            }
        }

        let root_rep = self.cache[&root].rep;
        cnf.add_clause(Clause::unit(root_rep));
        debug!(
            "tseitin: {} -> {} clauses, root representative {}",
            factory.to_string(root),
            cnf.num_clauses(),
            root_rep
        );
        cnf
    }

    /// Fixpoint polarity marking over the formula DAG.
    fn mark_polarities(
        &self,
        factory: &FormulaFactory,
        root: FormulaId,
    ) -> FxHashMap<FormulaId, (bool, bool)> {
        let mut marks: FxHashMap<FormulaId, (bool, bool)> = FxHashMap::default();
        let mut worklist = vec![(root, true, false)];

        while let Some((id, pos, neg)) = worklist.pop() {
            let mark = marks.entry(id).or_insert((false, false));
            let merged = (mark.0 || pos, mark.1 || neg);
            if merged == *mark {
                // Nothing new to propagate; the fixpoint is monotone.
                continue;
            }
            *mark = merged;
            let (pos, neg) = merged;

            match factory.kind(id) {
                Formula::Const(_) | Formula::Lit(_) => {}
                Formula::Not(x) => worklist.push((x, neg, pos)),
                Formula::And(ops) | Formula::Or(ops) => {
                    for &op in ops.iter() {
                        worklist.push((op, pos, neg));
                    }
                }
                Formula::Impl(a, b) => {
                    worklist.push((a, neg, pos));
                    worklist.push((b, pos, neg));
                }
                Formula::Equiv(a, b) => {
                    worklist.push((a, true, true));
                    worklist.push((b, true, true));
                }
            }
        }

        marks
    }

    /// Ensure the representative literal of `id` exists.
    fn representative_of(&mut self, factory: &FormulaFactory, id: FormulaId) -> Lit {
        if let Some(entry) = self.cache.get(&id) {
            return entry.rep;
        }
        let rep = match factory.kind(id) {
            Formula::Lit(lit) => lit,
            Formula::Not(x) => -self.representative_of(factory, x),
            Formula::Const(_) => {
                // The factory folds constants out of connectives.
                unreachable!("constant below a connective")
            }
            _ => factory.aux_var().pos(),
        };
        self.cache.insert(
            id,
            CacheEntry {
                rep,
                pos_done: false,
                neg_done: false,
                clauses: Vec::new(),
            },
        );
        rep
    }

    /// Emit the definitional clauses of `id` for the polarities that are
    /// marked but not yet covered.
    fn encode_node(&mut self, factory: &FormulaFactory, id: FormulaId, pos: bool, neg: bool) {
        let y = self.representative_of(factory, id);

        let (need_pos, need_neg) = {
            let entry = &self.cache[&id];
            (pos && !entry.pos_done, neg && !entry.neg_done)
        };
        if !need_pos && !need_neg {
            return;
        }

        let mut clauses = Vec::new();
        match factory.kind(id) {
            // Leaves and negations define no clauses of their own; a
            // negation shares the (already emitted) clauses of its child.
            Formula::Const(_) | Formula::Lit(_) | Formula::Not(_) => {}
            Formula::And(ops) => {
                let reps: Vec<_> = ops
                    .iter()
                    .map(|&op| self.representative_of(factory, op))
                    .collect();
                if need_pos {
                    // y => r_i, for each operand.
                    for &r in &reps {
                        clauses.push(Clause::new(vec![-y, r]));
                    }
                }
                if need_neg {
                    // (r_1 & ... & r_n) => y.
                    let mut lits = vec![y];
                    lits.extend(reps.iter().map(|&r| -r));
                    clauses.push(Clause::new(lits));
                }
            }
            Formula::Or(ops) => {
                let reps: Vec<_> = ops
                    .iter()
                    .map(|&op| self.representative_of(factory, op))
                    .collect();
                if need_pos {
                    // y => (r_1 | ... | r_n).
                    let mut lits = vec![-y];
                    lits.extend(reps.iter().copied());
                    clauses.push(Clause::new(lits));
                }
                if need_neg {
                    // r_i => y, for each operand.
                    for &r in &reps {
                        clauses.push(Clause::new(vec![y, -r]));
                    }
                }
            }
            Formula::Impl(a, b) => {
                let ra = self.representative_of(factory, a);
                let rb = self.representative_of(factory, b);
                if need_pos {
                    clauses.push(Clause::new(vec![-y, -ra, rb]));
                }
                if need_neg {
                    clauses.push(Clause::new(vec![y, ra]));
                    clauses.push(Clause::new(vec![y, -rb]));
                }
            }
            Formula::Equiv(a, b) => {
                let ra = self.representative_of(factory, a);
                let rb = self.representative_of(factory, b);
                if need_pos {
                    clauses.push(Clause::new(vec![-y, -ra, rb]));
                    clauses.push(Clause::new(vec![-y, ra, -rb]));
                }
                if need_neg {
                    clauses.push(Clause::new(vec![y, ra, rb]));
                    clauses.push(Clause::new(vec![y, -ra, -rb]));
                }
            }
        }

        let entry = self.cache.get_mut(&id).unwrap();
        entry.clauses.extend(clauses);
        entry.pos_done |= pos;
        entry.neg_done |= neg;
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::solver::Solver;
    use crate::types::Var;

    /// Brute-force model count of a formula over the first `n` variables.
    fn formula_models(factory: &FormulaFactory, root: FormulaId, n: u32) -> usize {
        (0..(1u64 << n))
            .filter(|bits| {
                let assignment: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
                factory.evaluate(root, &assignment)
            })
            .count()
    }

    /// Model count of the encoding projected onto the first `n` variables.
    fn encoding_models(cnf: &Cnf, n: u32) -> usize {
        let mut solver = Solver::new(cnf.num_vars().max(n));
        solver.add_cnf(cnf);
        let vars: Vec<Var> = (1..=n).map(Var::new).collect();
        solver.enumerate_models(&vars).len()
    }

    #[test]
    fn test_constants() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();

        let cnf = encoder.encode(&factory, factory.verum());
        assert!(cnf.is_empty());

        let cnf = encoder.encode(&factory, factory.falsum());
        assert_eq!(cnf.num_clauses(), 1);
        assert!(cnf.clauses()[0].is_empty());
    }

    #[test]
    fn test_literals() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.var();

        let cnf = encoder.encode(&factory, factory.pos(a));
        assert_eq!(cnf.clauses(), &[Clause::unit(a.pos())]);

        let cnf = encoder.encode(&factory, factory.neg(a));
        assert_eq!(cnf.clauses(), &[Clause::unit(a.neg())]);
        assert_eq!(factory.aux_count(), 0);
    }

    #[test]
    fn test_equisatisfiability_with_projection() {
        let factory = FormulaFactory::new();
        let a = factory.var();
        let b = factory.var();
        let c = factory.var();
        let x = factory.var();
        let y = factory.var();
        let n = factory.num_vars();

        let formulas = [
            factory.implication(factory.pos(a), factory.pos(b)),
            factory.equivalence(factory.pos(a), factory.neg(b)),
            factory.and([
                factory.not(factory.or([factory.pos(a), factory.pos(b)])),
                factory.pos(c),
                factory.not(factory.and([factory.pos(x), factory.neg(y)])),
            ]),
            factory.or([
                factory.not(factory.and([factory.pos(a), factory.pos(b)])),
                factory.pos(c),
                factory.not(factory.or([factory.pos(x), factory.neg(y)])),
            ]),
            factory.not(factory.equivalence(
                factory.not(factory.or([factory.pos(a), factory.pos(b)])),
                factory.not(factory.or([factory.pos(x), factory.pos(y)])),
            )),
        ];

        for root in formulas {
            let mut encoder = TseitinEncoder::new();
            let cnf = encoder.encode(&factory, root);
            assert_eq!(
                formula_models(&factory, root, n),
                encoding_models(&cnf, n),
                "projection mismatch for {}",
                factory.to_string(root)
            );
        }
    }

    #[test]
    fn test_unsat_formula() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());

        let or = factory.or([a, b]);
        let root = factory.and([or, factory.not(or)]);
        let cnf = encoder.encode(&factory, root);

        let mut solver = Solver::new(cnf.num_vars());
        solver.add_cnf(&cnf);
        assert!(!solver.solve().is_sat());
    }

    #[test]
    fn test_sharing_is_structural() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());
        let c = factory.pos(factory.var());

        // ((a & b) | (a & b)) & ((a & b) | c): the repeated (a & b) occurs
        // three times in the tree but is one identity in the DAG.
        let ab = factory.and([a, b]);
        let root = factory.and([factory.or([ab, ab]), factory.or([ab, c])]);

        let before = factory.aux_count();
        let cnf = encoder.encode(&factory, root);
        let introduced = factory.aux_count() - before;

        // One auxiliary per distinct connective: (a & b), (a & b) | c, root.
        assert_eq!(introduced, 3);
        // All-positive polarity: 2 + 1 + 2 definitional clauses, plus the
        // root unit.
        assert_eq!(cnf.num_clauses(), 6);
    }

    #[test]
    fn test_idempotent_reencoding() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());

        let root = factory.or([factory.and([a, b]), factory.not(b)]);

        let first = encoder.encode(&factory, root);
        let rep_first = encoder.representative(root).unwrap();
        let aux_after_first = factory.aux_count();

        let second = encoder.encode(&factory, root);
        let rep_second = encoder.representative(root).unwrap();

        assert_eq!(rep_first, rep_second);
        assert_eq!(factory.aux_count(), aux_after_first);
        assert_eq!(first.num_clauses(), second.num_clauses());
    }

    #[test]
    fn test_polarity_prunes_clauses() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());
        let c = factory.pos(factory.var());

        // (a & b) | c occurs purely positively: the conjunction needs only
        // its two forward implications, the disjunction one.
        let root = factory.or([factory.and([a, b]), c]);
        let cnf = encoder.encode(&factory, root);
        // 2 (and) + 1 (or) + 1 (root unit).
        assert_eq!(cnf.num_clauses(), 4);
    }

    #[test]
    fn test_negative_polarity_emits_converse() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());

        // ~(a & b): the conjunction occurs only negatively, so only the
        // single converse clause is needed.
        let root = factory.not(factory.and([a, b]));
        let cnf = encoder.encode(&factory, root);
        // 1 (and, negative direction) + 1 (root unit).
        assert_eq!(cnf.num_clauses(), 2);
    }

    #[test]
    fn test_both_polarities_under_equivalence() {
        let factory = FormulaFactory::new();
        let mut encoder = TseitinEncoder::new();
        let a = factory.pos(factory.var());
        let b = factory.pos(factory.var());
        let c = factory.pos(factory.var());
        let n = factory.num_vars();

        // Under an equivalence both directions of (a & b) are required.
        let root = factory.equivalence(factory.and([a, b]), c);
        let cnf = encoder.encode(&factory, root);
        // 3 (and, both directions) + 2 (equiv, positive) + unit.
        assert_eq!(cnf.num_clauses(), 6);
        assert_eq!(
            formula_models(&factory, root, n),
            encoding_models(&cnf, n)
        );
    }
}
