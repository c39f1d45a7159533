//! Overlay data: per-(walk, ref) prefix-sum mismatch counts (spec.md §3.7,
//! §4.8), grounded on `original_source/include/povu/genomics/allele.hpp`.

use crate::graph::bidirected::{Step, Walk};
use crate::graph::refs::RefStep;

#[derive(Debug, Clone)]
pub struct StartOverlay {
    /// index into the reference walk where this walk's first step aligns.
    pub ref_start: usize,
    /// fwd_prefix[k] = mismatches among the first k steps walking forward
    /// from `ref_start`.
    pub fwd_prefix: Vec<u32>,
    /// rev_prefix[k] = mismatches among the first k steps walking backward
    /// from `ref_start` with the walk read in reverse-complement.
    pub rev_prefix: Vec<u32>,
}

impl StartOverlay {
    /// O(1) mismatch count over the half-open step range `[lo, hi)`,
    /// walking forward from `ref_start`. A zero result means an exact
    /// match on the reference in that orientation (spec.md §3.7).
    pub fn fwd_mismatches(&self, lo: usize, hi: usize) -> u32 {
        self.fwd_prefix[hi] - self.fwd_prefix[lo]
    }

    pub fn rev_mismatches(&self, lo: usize, hi: usize) -> u32 {
        self.rev_prefix[hi] - self.rev_prefix[lo]
    }
}

fn step_matches(step: Step, ref_step: &RefStep) -> bool {
    step.v_id == ref_step.v_id && step.orientation == ref_step.orientation
}

/// All overlays for `walk` against `ref_walk`: one per ref position whose
/// vertex matches the walk's first step (spec.md §3.7 "the set of ref start
/// positions where that walk starts").
pub fn compute_overlay(walk: &Walk, ref_walk: &[RefStep]) -> Vec<StartOverlay> {
    let Some(&first) = walk.first() else {
        return Vec::new();
    };
    let n = walk.len();

    ref_walk
        .iter()
        .enumerate()
        .filter(|(_, rs)| step_matches(first, rs))
        .map(|(ref_start, _)| {
            let mut fwd_prefix = vec![0u32; n + 1];
            for k in 0..n {
                let mismatch = match ref_walk.get(ref_start + k) {
                    Some(rs) => !step_matches(walk[k], rs),
                    None => true,
                };
                fwd_prefix[k + 1] = fwd_prefix[k] + mismatch as u32;
            }

            let mut rev_prefix = vec![0u32; n + 1];
            for k in 0..n {
                let mismatch = match ref_start.checked_sub(k) {
                    Some(pos) => {
                        let flipped = walk[n - 1 - k].flip();
                        !step_matches(flipped, &ref_walk[pos])
                    }
                    None => true,
                };
                rev_prefix[k + 1] = rev_prefix[k] + mismatch as u32;
            }

            StartOverlay {
                ref_start,
                fwd_prefix,
                rev_prefix,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::Orientation;

    fn rs(id: u32, locus: u32) -> RefStep {
        RefStep {
            v_id: id,
            orientation: Orientation::Fwd,
            locus,
        }
    }

    #[test]
    fn exact_match_has_zero_mismatches() {
        let walk = vec![
            Step::new(1, Orientation::Fwd),
            Step::new(2, Orientation::Fwd),
        ];
        let ref_walk = vec![rs(1, 0), rs(2, 1), rs(3, 2)];
        let overlays = compute_overlay(&walk, &ref_walk);
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].fwd_mismatches(0, 2), 0);
    }

    #[test]
    fn divergent_alt_has_nonzero_mismatches() {
        let walk = vec![
            Step::new(1, Orientation::Fwd),
            Step::new(99, Orientation::Fwd),
        ];
        let ref_walk = vec![rs(1, 0), rs(2, 1)];
        let overlays = compute_overlay(&walk, &ref_walk);
        assert_eq!(overlays[0].fwd_mismatches(0, 2), 1);
    }
}
