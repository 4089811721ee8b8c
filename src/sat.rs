//! Model extraction and model counting on BDDs.

use std::collections::HashMap;

use num_bigint::{BigUint, ToBigUint};

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Lit, Var};

impl Bdd {
    /// Returns one satisfying assignment for the BDD, if any exists.
    ///
    /// Only variables tested on the chosen path appear in the result; the
    /// remaining variables are don't-cares.
    pub fn one_sat(&self, node: Ref) -> Option<Vec<Lit>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        // Walk down, always picking a branch that can still reach TRUE.
        while !self.is_one(current) {
            let var = Var::new(self.variable(current.index()));
            let high = self.high_node(current);

            if !self.is_zero(high) {
                path.push(var.pos());
                current = high;
            } else {
                path.push(var.neg());
                current = self.low_node(current);
            }
        }

        Some(path)
    }

    /// Exact number of satisfying assignments over all declared variables.
    pub fn sat_count(&self, node: Ref) -> BigUint {
        let mut cache = HashMap::new();
        let two = 2.to_biguint().unwrap();
        let max = two.pow(self.num_vars());
        self.sat_count_rec(node, &max, &mut cache)
    }

    fn sat_count_rec(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let count_low = self.sat_count_rec(self.low(node.index()), max, cache);
        let count_high = self.sat_count_rec(self.high(node.index()), max, cache);

        // Each child count is halved: the child function constrains one
        // variable fewer than its parent.
        let count: BigUint = (count_low + count_high) >> 1;
        let count = if node.is_negated() { max - count } else { count };

        cache.insert(node, count.clone());
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::new(3);

        let f = bdd.mk_cube([1, -2, -3]);
        let model = bdd.one_sat(f);
        let expected: Vec<Lit> = vec![1, -2, -3].into_iter().map(Lit::from_dimacs).collect();
        assert_eq!(model, Some(expected));

        // Blocking the only model leaves nothing.
        let g = bdd.apply_and(f, -bdd.mk_cube(model.unwrap().iter().map(|lit| lit.to_dimacs())));
        assert_eq!(bdd.one_sat(g), None);
    }

    #[test]
    fn test_one_sat_all_cubes() {
        let bdd = Bdd::new(3);

        for bits in 0..8i32 {
            let cube = [
                if bits & 1 != 0 { 1 } else { -1 },
                if bits & 2 != 0 { 2 } else { -2 },
                if bits & 4 != 0 { 3 } else { -3 },
            ];
            let f = bdd.mk_cube(cube);
            let expected: Vec<Lit> = cube.into_iter().map(Lit::from_dimacs).collect();
            assert_eq!(bdd.one_sat(f), Some(expected));
        }
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::new(3);

        assert_eq!(bdd.sat_count(bdd.zero()), 0.to_biguint().unwrap());
        assert_eq!(bdd.sat_count(bdd.one()), 8.to_biguint().unwrap());
    }

    #[test]
    fn test_sat_count_var() {
        let bdd = Bdd::new(3);

        let x1 = bdd.mk_var(1);
        assert_eq!(bdd.sat_count(x1), 4.to_biguint().unwrap());

        let x2 = bdd.mk_var(2);
        assert_eq!(bdd.sat_count(x2), 4.to_biguint().unwrap());
    }

    #[test]
    fn test_sat_count_cube_and_clause() {
        let bdd = Bdd::new(3);

        let f = bdd.mk_cube([1, 2]);
        assert_eq!(bdd.sat_count(f), 2.to_biguint().unwrap());

        let g = bdd.mk_clause([1, 2]);
        assert_eq!(bdd.sat_count(g), 6.to_biguint().unwrap());

        // Negation counts the complement.
        assert_eq!(bdd.sat_count(-f), 6.to_biguint().unwrap());
    }
}
