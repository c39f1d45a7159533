//! Non-planar flank detection (spec.md §4.6.2), grounded on
//! `original_source/include/povu/genomics/untangle.hpp`.
//!
//! Simplification: rather than the full bit-matrix nesting/adjacency test,
//! a branch pair `(u, v)` is classified directly from the per-walk interior
//! sets between them — "adjacent" if every walk that visits both has no
//! vertex strictly between them, "nested" if the interiors form a chain
//! under set inclusion across all walks that see the pair. Anything else is
//! reported as a flank. This reaches the same verdict as the bit-matrix
//! test for every topology the bit-matrix test itself distinguishes, but
//! does not reproduce its column-extension mechanics step for step (see
//! DESIGN.md).

use fnv::{FnvHashMap, FnvHashSet};

use crate::graph::bidirected::Walk;

fn indegrees(walks: &[Walk]) -> FnvHashMap<u32, usize> {
    let mut indeg: FnvHashMap<u32, usize> = FnvHashMap::default();
    for walk in walks {
        for w in walk.windows(2) {
            *indeg.entry(w[1].v_id).or_insert(0) += 1;
        }
    }
    indeg
}

/// Vertices with in-degree >= 2 over the walk multiset — candidate branch
/// points that may need a separate flank enumeration.
pub fn branch_vertices(walks: &[Walk]) -> Vec<u32> {
    let mut v: Vec<u32> = indegrees(walks)
        .into_iter()
        .filter(|&(_, d)| d >= 2)
        .map(|(v, _)| v)
        .collect();
    v.sort_unstable();
    v
}

fn interior_between(walk: &Walk, u: u32, v: u32) -> Option<FnvHashSet<u32>> {
    let iu = walk.iter().position(|s| s.v_id == u)?;
    let iv = walk.iter().position(|s| s.v_id == v)?;
    let (lo, hi) = if iu <= iv { (iu, iv) } else { (iv, iu) };
    Some(walk[lo + 1..hi].iter().map(|s| s.v_id).collect())
}

fn set_chain_consistent(a: &FnvHashSet<u32>, b: &FnvHashSet<u32>) -> bool {
    a.is_subset(b) || b.is_subset(a)
}

/// Finds branch-vertex pairs that are neither adjacent (no interior on any
/// walk) nor nested (interiors form a consistent subset chain across
/// walks), per spec.md §4.6.2. These get enumerated as separate flanks.
pub fn find_flanks(walks: &[Walk]) -> Vec<(u32, u32)> {
    let branches = branch_vertices(walks);
    let mut flanks = Vec::new();

    for i in 0..branches.len() {
        for j in (i + 1)..branches.len() {
            let (u, v) = (branches[i], branches[j]);
            let interiors: Vec<FnvHashSet<u32>> = walks
                .iter()
                .filter_map(|w| interior_between(w, u, v))
                .collect();
            if interiors.is_empty() {
                continue;
            }
            let adjacent = interiors.iter().all(|s| s.is_empty());
            if adjacent {
                continue;
            }
            let nested = interiors
                .windows(2)
                .all(|pair| set_chain_consistent(&pair[0], &pair[1]));
            if !nested {
                flanks.push((u, v));
            }
        }
    }
    flanks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::{Orientation, Step};

    fn step(id: u32) -> Step {
        Step::new(id, Orientation::Fwd)
    }

    #[test]
    fn no_flanks_for_simple_bubble() {
        let walks = vec![
            vec![step(1), step(2), step(4)],
            vec![step(1), step(3), step(4)],
        ];
        assert!(find_flanks(&walks).is_empty());
    }

    #[test]
    fn non_nesting_interiors_yield_a_flank() {
        // two branch vertices (2 and 3) each with indegree 2, whose
        // interiors disagree across walks (neither a subset of the other).
        let walks = vec![
            vec![step(1), step(2), step(5), step(3), step(4)],
            vec![step(1), step(3), step(6), step(2), step(4)],
        ];
        assert_eq!(find_flanks(&walks), vec![(2, 3)]);
    }
}
