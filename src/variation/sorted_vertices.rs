//! Total vertex order inside an RoV, feeding the depth matrix (spec.md
//! §4.6), grounded on `original_source/include/povu/genomics/untangle.hpp`.

use std::collections::VecDeque;

use fnv::{FnvHashMap, FnvHashSet};

use crate::graph::bidirected::Walk;

/// BFS topological sort over the RoV's walk multiset: an edge `a -> b`
/// exists whenever some walk steps from vertex `a` directly to vertex `b`.
/// Returns `None` if the induced graph has a cycle that defeats a pure
/// topological order (the caller then falls back to `lap_merge_sort`).
pub fn bfs_topological_sort(source: u32, walks: &[Walk]) -> Option<Vec<u32>> {
    let mut adj: FnvHashMap<u32, FnvHashSet<u32>> = FnvHashMap::default();
    let mut indeg: FnvHashMap<u32, usize> = FnvHashMap::default();
    let mut all: FnvHashSet<u32> = FnvHashSet::default();

    for walk in walks {
        for w in walk.windows(2) {
            all.insert(w[0].v_id);
            all.insert(w[1].v_id);
            if adj.entry(w[0].v_id).or_default().insert(w[1].v_id) {
                *indeg.entry(w[1].v_id).or_insert(0) += 1;
            }
            indeg.entry(w[0].v_id).or_insert(0);
        }
        if let Some(s) = walk.first() {
            all.insert(s.v_id);
            indeg.entry(s.v_id).or_insert(0);
        }
    }

    let mut queue: VecDeque<u32> = VecDeque::new();
    queue.push_back(source);
    let mut seeded: FnvHashSet<u32> = FnvHashSet::default();
    seeded.insert(source);
    for &v in &all {
        if v != source && *indeg.get(&v).unwrap_or(&0) == 0 {
            queue.push_back(v);
            seeded.insert(v);
        }
    }

    let mut order = Vec::new();
    let mut visited: FnvHashSet<u32> = FnvHashSet::default();
    let mut indeg = indeg;
    while let Some(v) = queue.pop_front() {
        if !visited.insert(v) {
            continue;
        }
        order.push(v);
        if let Some(succ) = adj.get(&v) {
            for &w in succ {
                let e = indeg.entry(w).or_insert(0);
                if *e > 0 {
                    *e -= 1;
                }
                if *e == 0 && !visited.contains(&w) {
                    queue.push_back(w);
                }
            }
        }
    }

    if order.len() == all.len() {
        Some(order)
    } else {
        None
    }
}

/// Fallback ordering (spec.md §4.6): walk each haplotype's vertex sequence
/// as a single "lap" and merge it into the accumulated order, inserting any
/// unplaced vertex just after the farthest already-placed predecessor it
/// has in its own walk.
pub fn lap_merge_sort(source: u32, walks: &[Walk]) -> Vec<u32> {
    let mut order: Vec<u32> = vec![source];
    let mut pos: FnvHashMap<u32, usize> = FnvHashMap::default();
    pos.insert(source, 0);

    for walk in walks {
        let mut anchor = 0usize;
        for step in walk {
            if let Some(&p) = pos.get(&step.v_id) {
                anchor = anchor.max(p);
                continue;
            }
            let insert_at = (anchor + 1).min(order.len());
            order.insert(insert_at, step.v_id);
            for (i, v) in order.iter().enumerate() {
                pos.insert(*v, i);
            }
            anchor = insert_at;
        }
    }
    order
}

/// Primary method with fallback, per spec.md §4.6.
pub fn sort_vertices(source: u32, walks: &[Walk]) -> Vec<u32> {
    bfs_topological_sort(source, walks).unwrap_or_else(|| lap_merge_sort(source, walks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::{Orientation, Step};

    #[test]
    fn orders_a_simple_bubble() {
        let walks = vec![
            vec![
                Step::new(1, Orientation::Fwd),
                Step::new(2, Orientation::Fwd),
                Step::new(4, Orientation::Fwd),
            ],
            vec![
                Step::new(1, Orientation::Fwd),
                Step::new(3, Orientation::Fwd),
                Step::new(4, Orientation::Fwd),
            ],
        ];
        let order = sort_vertices(1, &walks);
        assert_eq!(order[0], 1);
        assert_eq!(*order.last().unwrap(), 4);
        assert_eq!(order.len(), 4);
    }
}
