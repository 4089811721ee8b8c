//! Iterator over satisfying paths in a BDD.
//!
//! Each path from the root to the TRUE terminal is one implicant of the
//! function: a conjunction of literals under which the function is true,
//! with all variables not tested on the path left as don't-cares. The
//! iterator is lazy and finite; calling [`Bdd::paths`] again restarts the
//! enumeration from scratch.
//!
//! Note: the number of paths can be exponential in the number of variables,
//! so use with caution on large BDDs.

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Lit, Var};

impl Bdd {
    /// Returns an iterator over all satisfying paths (paths to TRUE).
    ///
    /// Each path is a `Vec<Lit>` ordered by the variable order.
    ///
    /// ```
    /// use satkit::bdd::Bdd;
    /// use satkit::types::Lit;
    ///
    /// let bdd = Bdd::new(2);
    /// let f = bdd.mk_cube([1, -2]);
    ///
    /// let paths: Vec<_> = bdd.paths(f).collect();
    /// assert_eq!(paths, vec![vec![Lit::from(1), Lit::from(-2)]]);
    /// ```
    pub fn paths(&self, f: Ref) -> BddPaths<'_> {
        BddPaths::new(self, f)
    }

    /// Returns an iterator over all paths to FALSE.
    ///
    /// Equivalent to `bdd.paths(-f)`, but explicit about intent.
    pub fn paths_to_false(&self, f: Ref) -> BddPaths<'_> {
        BddPaths::new(self, -f)
    }
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    High,
    Low,
}

#[derive(Debug)]
struct StackFrame {
    node: Ref,
    /// Which branch to explore next (None if both were explored).
    next_branch: Option<Branch>,
}

/// An iterator over satisfying paths in a BDD.
///
/// Created by [`Bdd::paths()`]. Uses depth-first traversal with
/// backtracking; the current path lives in a single vector that grows and
/// shrinks during the walk, so only yielded paths are allocated.
pub struct BddPaths<'a> {
    bdd: &'a Bdd,
    stack: Vec<StackFrame>,
    current_path: Vec<Lit>,
}

impl<'a> BddPaths<'a> {
    pub fn new(bdd: &'a Bdd, f: Ref) -> Self {
        BddPaths {
            bdd,
            stack: vec![StackFrame {
                node: f,
                next_branch: Some(Branch::High),
            }],
            current_path: Vec::new(),
        }
    }

    fn backtrack(&mut self) {
        self.stack.pop();
        // Pop the literal that led here (unless we are at the root).
        if !self.stack.is_empty() {
            self.current_path.pop();
        }
    }
}

impl Iterator for BddPaths<'_> {
    type Item = Vec<Lit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let next_branch = frame.next_branch;

            if self.bdd.is_one(node) {
                let result = self.current_path.clone();
                self.backtrack();
                return Some(result);
            }

            if self.bdd.is_zero(node) {
                self.backtrack();
                continue;
            }

            let var = Var::new(self.bdd.variable(node.index()));

            match next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    let high = self.bdd.high_node(node);
                    self.current_path.push(var.pos());
                    self.stack.push(StackFrame {
                        node: high,
                        next_branch: Some(Branch::High),
                    });
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    let low = self.bdd.low_node(node);
                    self.current_path.push(var.neg());
                    self.stack.push(StackFrame {
                        node: low,
                        next_branch: Some(Branch::High),
                    });
                }
                None => {
                    self.backtrack();
                }
            }
        }
    }
}
