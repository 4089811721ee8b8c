//! The BDD manager.
//!
//! All diagrams live inside a [`Bdd`] manager: nodes are hash-consed through
//! a [`Table`], so structurally equal subgraphs are shared and identity
//! comparison of [`Ref`]s decides structural equality. Edges are
//! complemented: `-f` is the negation of `f` at zero cost, and the manager
//! keeps a single terminal node whose positive reference is `one` and whose
//! negative reference is `zero`.
//!
//! The variable order is the numeric order of the 1-indexed variables. Every
//! inner node tests a variable strictly smaller than the variables of its
//! non-terminal children; violating this during construction is a fatal
//! order violation.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::reference::Ref;
use crate::table::Table;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: 0,
            low: Ref::positive(0),
            high: Ref::positive(0),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            self.variable as u64,
            self.low.unsigned() as u64,
            self.high.unsigned() as u64,
        )
    }
}

type Storage = Table<Node>;

/// Binary Boolean connectives accepted by [`Bdd::apply`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Op {
    And,
    Or,
    Xor,
    Equiv,
    Imply,
}

/// The manager owning all nodes, the canonicalizing store and the
/// operation cache.
///
/// Concurrent searches must use independent managers; a manager is not
/// shareable across threads.
pub struct Bdd {
    storage: RefCell<Storage>,
    cache: RefCell<Cache<(Ref, Ref, Ref), Ref>>,
    num_vars: u32,
    zero: Ref,
    one: Ref,
}

impl Bdd {
    /// Create a manager for variables `1..=num_vars` with default capacity.
    pub fn new(num_vars: u32) -> Self {
        Self::with_capacity(num_vars, 20)
    }

    /// Create a manager with storage for `2^storage_bits` nodes.
    pub fn with_capacity(num_vars: u32, storage_bits: usize) -> Self {
        assert!(
            storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );

        let cache_bits = storage_bits.min(16);
        let mut storage = Storage::new(storage_bits);

        // Allocate the terminal node:
        let one = storage.alloc();
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(cache_bits)),
            num_vars,
            zero: -one,
            one,
        }
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Bdd")
            .field("num_vars", &self.num_vars)
            .field("capacity", &storage.capacity())
            .field("size", &storage.len())
            .finish()
    }
}

impl Bdd {
    /// Number of declared variables.
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// The constant-true function.
    pub fn one(&self) -> Ref {
        self.one
    }

    /// The constant-false function.
    pub fn zero(&self) -> Ref {
        self.zero
    }

    /// The canonical terminal for the given constant. Idempotent.
    pub fn terminal(&self, value: bool) -> Ref {
        if value {
            self.one
        } else {
            self.zero
        }
    }

    pub fn variable(&self, index: u32) -> u32 {
        self.storage.borrow().value(index as usize).variable
    }
    pub fn low(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).low
    }
    pub fn high(&self, index: u32) -> Ref {
        self.storage.borrow().value(index as usize).high
    }

    /// The low child as a function, complement mark applied.
    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }

    /// The high child as a function, complement mark applied.
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        self.is_zero(node) || self.is_one(node)
    }

    /// Construct (or look up) the inner node `(v, low, high)`.
    ///
    /// Redundant nodes are eliminated (`low == high` returns `low`) and a
    /// negated high edge is flipped through the complement rules so that
    /// every stored node has a regular high child.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a declared variable, or if a non-terminal child
    /// tests a variable at or above `v` (order violation).
    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert!(
            v >= 1 && v <= self.num_vars,
            "Undeclared variable x{} (manager has {} variables)",
            v,
            self.num_vars
        );

        // Canonicity: regular high edge.
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Redundancy elimination.
        if low == high {
            return low;
        }

        for child in [low, high] {
            if !self.is_terminal(child) {
                let cv = self.variable(child.index());
                assert!(
                    cv > v,
                    "Variable order violated: x{} cannot appear above x{}",
                    v,
                    cv
                );
            }
        }

        let i = self.storage.borrow_mut().put(Node {
            variable: v,
            low,
            high,
        });
        debug!("mk_node(v = {}, low = {}, high = {}) -> @{}", v, low, high, i);
        Ref::positive(i as u32)
    }

    /// The single-variable function `v`.
    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(v, self.zero, self.one)
    }

    /// The conjunction of the given DIMACS literals.
    pub fn mk_cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| v.abs());
        literals.reverse();
        let mut current = self.one;
        for lit in literals {
            assert_ne!(lit, 0, "Literals must be non-zero");
            current = if lit < 0 {
                self.mk_node(-lit as u32, current, self.zero)
            } else {
                self.mk_node(lit as u32, self.zero, current)
            };
        }
        current
    }

    /// The disjunction of the given DIMACS literals.
    pub fn mk_clause(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| v.abs());
        literals.reverse();
        let mut current = self.zero;
        for lit in literals {
            assert_ne!(lit, 0, "Literals must be non-zero");
            current = if lit < 0 {
                self.mk_node(-lit as u32, self.one, current)
            } else {
                self.mk_node(lit as u32, current, self.one)
            };
        }
        current
    }

    /// Cofactors of `node` with respect to the top variable `v`.
    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        let i = node.index();
        if self.is_terminal(node) || v < self.variable(i) {
            return (node, node);
        }
        assert_eq!(v, self.variable(i));
        if node.is_negated() {
            (-self.low(i), -self.high(i))
        } else {
            (self.low(i), self.high(i))
        }
    }

    /// Shannon-expansion ITE with memoization.
    ///
    /// ```text
    /// ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    ///
    /// Every binary connective reduces to an ITE triple, which also serves
    /// as the operation-cache key. Terminates because each recursive call
    /// strictly descends in the variable order.
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Terminal condition:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // From now on, F is known not to be a constant.
        debug_assert!(!self.is_terminal(f));

        // Constant-result cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        //   ite(F,1,~F) => 1
        //   ite(F,F,1) => 1
        //   ite(F,~F,0) => 0
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }
        if self.is_one(g) && h == -f {
            return self.one;
        }
        if g == f && self.is_one(h) {
            return self.one;
        }
        if g == -f && self.is_zero(h) {
            return self.zero;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f {
            return self.apply_ite(f, self.one, h);
        }
        if h == f {
            return self.apply_ite(f, g, self.zero);
        }
        if g == -f {
            return self.apply_ite(f, self.zero, h);
        }
        if h == -f {
            return self.apply_ite(f, g, self.one);
        }

        let i = self.variable(f.index());
        let j = self.variable(g.index());
        let k = self.variable(h.index());
        debug_assert_ne!(i, 0);

        // Equivalent pairs (rewrite so the first argument tests the
        // smallest variable, improving cache locality):
        //   ite(F,1,H) == ite(H,1,F)
        //   ite(F,G,0) == ite(G,F,0)
        //   ite(F,G,1) == ite(~G,~F,1)
        //   ite(F,0,H) == ite(~H,0,~F)
        //   ite(F,G,~G) == ite(G,F,~F)
        if self.is_one(g) && k < i {
            debug_assert_ne!(k, 0);
            return self.apply_ite(h, self.one, f);
        }
        if self.is_zero(h) && j < i {
            debug_assert_ne!(j, 0);
            return self.apply_ite(g, f, self.zero);
        }
        if self.is_one(h) && j < i {
            debug_assert_ne!(j, 0);
            return self.apply_ite(-g, -f, self.one);
        }
        if self.is_zero(g) && k < i {
            debug_assert_ne!(k, 0);
            return self.apply_ite(-h, self.zero, -f);
        }
        if g == -h && j < i {
            debug_assert_ne!(j, 0);
            return self.apply_ite(g, f, -f);
        }

        // Normalize: the first two arguments must be regular.
        let (mut f, mut g, mut h) = (f, g, h);

        // ite(~F,G,H) => ite(F,H,G)
        if f.is_negated() {
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }

        // ite(F,~G,H) => ~ite(F,G,~H)
        let mut n = false;
        if g.is_negated() {
            n = true;
            g = -g;
            h = -h;
        }

        let (f, g, h) = (f, g, h);

        let key = (f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            debug!("cache: ite({}, {}, {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let i = self.variable(f.index());
        let j = self.variable(g.index());
        let k = self.variable(h.index());
        let mut m = i;
        if j != 0 {
            m = m.min(j);
        }
        if k != 0 {
            m = m.min(k);
        }
        debug_assert_ne!(m, 0);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);
        let res = self.mk_node(m, e, t);
        self.cache.borrow_mut().insert(&key, res);

        if n {
            -res
        } else {
            res
        }
    }

    /// Compute `f op g`.
    pub fn apply(&self, op: Op, f: Ref, g: Ref) -> Ref {
        match op {
            Op::And => self.apply_ite(f, g, self.zero),
            Op::Or => self.apply_ite(f, self.one, g),
            Op::Xor => self.apply_ite(f, -g, g),
            Op::Equiv => self.apply_ite(f, g, -g),
            Op::Imply => self.apply_ite(f, g, self.one),
        }
    }

    /// Negation is a complement flip, no graph traversal.
    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Op::And, f, g)
    }

    pub fn apply_or(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Op::Or, f, g)
    }

    pub fn apply_xor(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Op::Xor, f, g)
    }

    pub fn apply_eq(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Op::Equiv, f, g)
    }

    pub fn apply_imply(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Op::Imply, f, g)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
        }
        res
    }

    /// The cofactor `f | v<-value`: `v` is fixed and vanishes from the
    /// support of the result.
    pub fn restrict(&self, f: Ref, v: u32, value: bool) -> Ref {
        assert!(
            v >= 1 && v <= self.num_vars,
            "Undeclared variable x{} (manager has {} variables)",
            v,
            self.num_vars
        );
        let mut cache = HashMap::new();
        self.restrict_rec(f, v, value, &mut cache)
    }

    fn restrict_rec(&self, f: Ref, v: u32, value: bool, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }

        let i = self.variable(f.index());

        if v < i {
            // 'f' does not depend on 'v'.
            return f;
        }

        if v == i {
            return if value {
                self.high_node(f)
            } else {
                self.low_node(f)
            };
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let low = self.restrict_rec(self.low_node(f), v, value, cache);
        let high = self.restrict_rec(self.high_node(f), v, value, cache);
        let res = self.mk_node(i, low, high);
        cache.insert(f, res);
        res
    }

    /// Existential quantification: `∃v. f`.
    pub fn exists(&self, f: Ref, v: u32) -> Ref {
        self.apply_or(self.restrict(f, v, false), self.restrict(f, v, true))
    }

    /// Universal quantification: `∀v. f`.
    pub fn forall(&self, f: Ref, v: u32) -> Ref {
        self.apply_and(self.restrict(f, v, false), self.restrict(f, v, true))
    }

    pub fn exists_many(&self, f: Ref, vars: impl IntoIterator<Item = u32>) -> Ref {
        let mut res = f;
        for v in vars {
            res = self.exists(res, v);
        }
        res
    }

    pub fn forall_many(&self, f: Ref, vars: impl IntoIterator<Item = u32>) -> Ref {
        let mut res = f;
        for v in vars {
            res = self.forall(res, v);
        }
        res
    }

    /// Evaluate `f` under a total assignment (`assignment[v-1]` is the value
    /// of variable `v`).
    pub fn evaluate(&self, f: Ref, assignment: &[bool]) -> bool {
        let mut current = f;
        loop {
            if self.is_one(current) {
                return true;
            }
            if self.is_zero(current) {
                return false;
            }
            let v = self.variable(current.index());
            current = if assignment[(v - 1) as usize] {
                self.high_node(current)
            } else {
                self.low_node(current)
            };
        }
    }

    /// Indices of all nodes reachable from the given roots, terminal
    /// included. Shared subgraphs are visited once.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.index());
        let mut queue = VecDeque::from_iter(roots);

        while let Some(node) = queue.pop_front() {
            let i = node.index();
            if visited.insert(i) {
                queue.push_back(self.low(i));
                queue.push_back(self.high(i));
            }
        }

        visited
    }

    /// Number of distinct nodes in the graph of `f`, terminal included.
    pub fn node_count(&self, f: Ref) -> u64 {
        self.descendants([f]).len() as u64
    }

    /// Reset the manager: all nodes are dropped and every previously
    /// returned [`Ref`] becomes invalid. The terminal is re-created, so
    /// `one`/`zero` stay meaningful.
    pub fn reset(&self) {
        let mut storage = self.storage.borrow_mut();
        storage.clear();
        let one = storage.alloc();
        assert_eq!(one, 1);
        self.cache.borrow_mut().clear();
    }

    pub fn to_bracket_string(&self, node: Ref) -> String {
        if self.is_zero(node) {
            return "(0)".to_string();
        } else if self.is_one(node) {
            return "(1)".to_string();
        }

        let v = self.variable(node.index());
        format!(
            "{}:(x{}, {}, {})",
            node,
            v,
            self.to_bracket_string(self.high_node(node)),
            self.to_bracket_string(self.low_node(node))
        )
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_var() {
        let bdd = Bdd::new(4);

        let x = bdd.mk_var(1);

        assert_eq!(bdd.variable(x.index()), 1);
        assert_eq!(bdd.high_node(x), bdd.one());
        assert_eq!(bdd.low_node(x), bdd.zero());
    }

    #[test]
    fn test_not_var() {
        let bdd = Bdd::new(4);

        let x = bdd.mk_var(1);
        let not_x = -x;

        assert_eq!(bdd.variable(not_x.index()), 1);
        assert_eq!(bdd.high_node(not_x), bdd.zero());
        assert_eq!(bdd.low_node(not_x), bdd.one());
    }

    #[test]
    fn test_terminal() {
        let bdd = Bdd::new(4);

        assert!(bdd.is_terminal(bdd.zero()));
        assert!(bdd.is_zero(bdd.zero()));
        assert!(!bdd.is_one(bdd.zero()));

        assert!(bdd.is_terminal(bdd.one()));
        assert!(!bdd.is_zero(bdd.one()));
        assert!(bdd.is_one(bdd.one()));

        // The terminal accessor is idempotent.
        assert_eq!(bdd.terminal(true), bdd.one());
        assert_eq!(bdd.terminal(false), bdd.zero());
        assert_eq!(bdd.terminal(true), bdd.terminal(true));
        assert_eq!(bdd.terminal(true), -bdd.terminal(false));
    }

    #[test]
    fn test_canonicity() {
        let bdd = Bdd::new(4);

        // Two construction routes to the same structural triple yield the
        // same identity.
        let a = bdd.mk_node(1, bdd.zero(), bdd.one());
        let b = bdd.mk_var(1);
        assert_eq!(a, b);

        let x2 = bdd.mk_var(2);
        let f = bdd.mk_node(1, x2, bdd.one());
        let g = bdd.mk_node(1, x2, bdd.one());
        assert_eq!(f, g);

        // Redundancy elimination.
        assert_eq!(bdd.mk_node(1, x2, x2), x2);
    }

    #[test]
    #[should_panic(expected = "Variable order violated")]
    fn test_order_violation() {
        let bdd = Bdd::new(4);
        let x1 = bdd.mk_var(1);
        // x2 cannot be built above x1.
        bdd.mk_node(2, x1, bdd.one());
    }

    #[test]
    #[should_panic(expected = "Undeclared variable")]
    fn test_undeclared_variable() {
        let bdd = Bdd::new(2);
        bdd.mk_var(3);
    }

    #[test]
    fn test_cube() {
        let bdd = Bdd::new(4);

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let f = bdd.apply_and(bdd.apply_and(x1, x2), x3);
        assert_eq!(f, bdd.mk_cube([1, 2, 3]));

        let f = bdd.apply_and(bdd.apply_and(x1, -x2), -x3);
        assert_eq!(f, bdd.mk_cube([1, -2, -3]));
    }

    #[test]
    fn test_clause() {
        let bdd = Bdd::new(4);

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let f = bdd.apply_or(bdd.apply_or(x1, x2), x3);
        assert_eq!(f, bdd.mk_clause([1, 2, 3]));

        let f = bdd.apply_or(bdd.apply_or(x1, -x2), -x3);
        assert_eq!(f, bdd.mk_clause([1, -2, -3]));
    }

    #[test]
    fn test_de_morgan() {
        let bdd = Bdd::new(4);

        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);

        assert_eq!(-bdd.apply_and(x, y), bdd.apply_or(-x, -y));
        assert_eq!(-bdd.apply_or(x, y), bdd.apply_and(-x, -y));
    }

    #[test]
    fn test_xor_itself_and_contrary() {
        let bdd = Bdd::new(4);

        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let f = bdd.apply_and(x, y);

        assert_eq!(bdd.apply_xor(f, f), bdd.zero());
        assert_eq!(bdd.apply_xor(f, -f), bdd.one());
    }

    #[test]
    fn test_apply_ite() {
        let bdd = Bdd::new(12);

        // Terminal cases.
        let g = bdd.mk_var(2);
        let h = bdd.mk_var(3);
        assert_eq!(bdd.apply_ite(bdd.one(), g, h), g);
        assert_eq!(bdd.apply_ite(bdd.zero(), g, h), h);

        // Functions; f tests a variable above its child.
        let g = bdd.mk_var(6);
        let h = bdd.mk_var(7);
        let f = bdd.mk_node(5, bdd.one(), bdd.mk_var(8));
        assert_eq!(bdd.apply_ite(f, f, h), bdd.apply_or(f, h));
        assert_eq!(bdd.apply_ite(f, g, f), bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, -g, bdd.one()), -bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, bdd.zero(), -h), -bdd.apply_or(f, h));

        // Constants.
        let f = bdd.mk_var(9);
        assert_eq!(bdd.apply_ite(f, g, g), g);
        assert_eq!(bdd.apply_ite(f, bdd.one(), bdd.zero()), f);
        assert_eq!(bdd.apply_ite(f, bdd.zero(), bdd.one()), -f);

        // General case.
        let f = bdd.mk_var(10);
        let g = bdd.mk_var(11);
        let h = bdd.mk_var(12);
        let result = bdd.mk_node(bdd.variable(f.index()), -g, -h);
        assert_eq!(bdd.apply_ite(-f, -g, -h), result);
    }

    #[test]
    fn test_apply_matches_evaluation() {
        let bdd = Bdd::new(3);

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let a = bdd.apply_or(bdd.apply_and(x1, x2), x3);
        let b = bdd.apply_xor(x2, -x3);

        for bits in 0..8u32 {
            let assignment = [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0];
            let va = bdd.evaluate(a, &assignment);
            let vb = bdd.evaluate(b, &assignment);

            for (op, expected) in [
                (Op::And, va && vb),
                (Op::Or, va || vb),
                (Op::Xor, va ^ vb),
                (Op::Equiv, va == vb),
                (Op::Imply, !va || vb),
            ] {
                let f = bdd.apply(op, a, b);
                assert_eq!(
                    bdd.evaluate(f, &assignment),
                    expected,
                    "{:?} disagrees under {:?}",
                    op,
                    assignment
                );
            }
        }
    }

    #[test]
    fn test_restrict() {
        let bdd = Bdd::new(3);

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let f = bdd.apply_or(bdd.apply_eq(x1, x2), x3);
        let f_x2_zero = bdd.restrict(f, 2, false);
        let g = bdd.apply_or(-x1, x3);
        assert_eq!(f_x2_zero, g);
    }

    #[test]
    fn test_exists_forall() {
        let bdd = Bdd::new(3);

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);

        let f = bdd.apply_and(x1, x2);
        assert_eq!(bdd.exists(f, 2), x1);
        assert_eq!(bdd.forall(f, 2), bdd.zero());

        let g = bdd.apply_or(x1, x2);
        assert_eq!(bdd.exists(g, 2), bdd.one());
        assert_eq!(bdd.forall(g, 2), x1);

        assert_eq!(bdd.exists_many(f, [1, 2]), bdd.one());
    }

    #[test]
    fn test_node_count() {
        let bdd = Bdd::new(3);

        assert_eq!(bdd.node_count(bdd.one()), 1);
        assert_eq!(bdd.node_count(bdd.mk_var(1)), 2);

        // x1 ∧ x2 ∧ x3: a chain of three inner nodes plus the terminal.
        let f = bdd.mk_cube([1, 2, 3]);
        assert_eq!(bdd.node_count(f), 4);

        // Shared subgraphs are counted once.
        let g = bdd.apply_or(f, f);
        assert_eq!(bdd.node_count(g), 4);
    }

    #[test]
    fn test_reset() {
        let bdd = Bdd::new(3);

        bdd.mk_cube([1, 2, 3]);
        assert!(bdd.storage.borrow().len() > 1);

        bdd.reset();
        assert_eq!(bdd.storage.borrow().len(), 1);

        // The manager is usable again after a reset.
        let x = bdd.mk_var(1);
        assert_eq!(bdd.variable(x.index()), 1);
    }
}
