//! Tree metadata for later queries (spec.md §3.4), grounded on
//! `original_source/include/povu/graph/tree_utils.hpp`: Euler tour, depth,
//! `lo`/`HiD`, flattened per-vertex bracket lists, and LCA via sparse-table
//! RMQ instead of the original's `std::map`-based bookkeeping (Design Notes
//! §9 — hash/array maps over `std::map` except where order matters, which
//! here it does for the Euler tour itself).

use super::spanning_tree::SpanningTree;

#[derive(Debug, Clone)]
pub struct TreeMeta {
    pub e: Vec<u32>,     // Euler tour vertex sequence
    pub d: Vec<u32>,     // depths matching E
    pub first: Vec<u32>, // vertex_idx -> first position in E
    pub lo: Vec<u32>,
    pub hi_d: Vec<u32>,
    pub depth: Vec<u32>, // tree depth per vertex
    pub off: Vec<u32>,   // prefix offsets into `be`
    pub be: Vec<usize>,  // flattened per-vertex bracket lists (backedge indices)
    sparse: SparseTable,
}

#[derive(Debug, Clone)]
struct SparseTable {
    // table[k][i] = euler-position of the minimum-depth entry in the window
    // [i, i + 2^k)
    table: Vec<Vec<u32>>,
}

impl SparseTable {
    fn build(d: &[u32]) -> Self {
        let n = d.len();
        if n == 0 {
            return Self { table: vec![] };
        }
        let mut k = 1;
        while (1 << k) <= n {
            k += 1;
        }
        let mut table = vec![vec![0u32; n]; k];
        for i in 0..n {
            table[0][i] = i as u32;
        }
        for j in 1..k {
            let half = 1 << (j - 1);
            let mut i = 0;
            while i + (1 << j) <= n {
                let left = table[j - 1][i];
                let right = table[j - 1][i + half];
                table[j][i] = if d[left as usize] <= d[right as usize] {
                    left
                } else {
                    right
                };
                i += 1;
            }
        }
        Self { table }
    }

    fn query(&self, d: &[u32], lo: usize, hi: usize) -> u32 {
        // inclusive range [lo, hi]
        let len = hi - lo + 1;
        let mut k = 0;
        while (1 << (k + 1)) <= len {
            k += 1;
        }
        let left = self.table[k][lo];
        let right = self.table[k][hi + 1 - (1 << k)];
        if d[left as usize] <= d[right as usize] {
            left
        } else {
            right
        }
    }
}

fn euler_tour(st: &SpanningTree) -> (Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>) {
    let n = st.parent.len();
    let mut depth = vec![0u32; n];
    let mut e = Vec::with_capacity(2 * n);
    let mut d = Vec::with_capacity(2 * n);
    let mut first = vec![u32::MAX; n];

    struct Frame {
        v: u32,
        child_idx: usize,
    }
    let mut stack = vec![Frame {
        v: st.root,
        child_idx: 0,
    }];
    e.push(st.root);
    d.push(0);
    first[st.root as usize] = 0;

    while let Some(top) = stack.last_mut() {
        if top.child_idx < st.children[top.v as usize].len() {
            let c = st.children[top.v as usize][top.child_idx];
            top.child_idx += 1;
            depth[c as usize] = depth[top.v as usize] + 1;
            e.push(c);
            d.push(depth[c as usize]);
            if first[c as usize] == u32::MAX {
                first[c as usize] = (e.len() - 1) as u32;
            }
            stack.push(Frame { v: c, child_idx: 0 });
        } else {
            let v = top.v;
            stack.pop();
            if let Some(parent_frame) = stack.last() {
                e.push(parent_frame.v);
                d.push(depth[parent_frame.v as usize]);
            }
            let _ = v;
        }
    }

    (e, d, first, depth)
}

fn compute_lo_hid(st: &SpanningTree, depth: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let n = depth.len();
    let mut lo = depth.to_vec();
    let mut hid = depth.to_vec();
    let mut order: Vec<u32> = (0..n as u32).collect();
    order.sort_by_key(|&v| st.post[v as usize]);
    for v in order {
        for &c in &st.children[v as usize] {
            lo[v as usize] = lo[v as usize].min(lo[c as usize]);
            hid[v as usize] = hid[v as usize].max(hid[c as usize]);
        }
        for be in &st.back_edges {
            if be.src_idx == v && !be.is_self_loop() {
                lo[v as usize] = lo[v as usize].min(depth[be.tgt_idx as usize]);
                hid[v as usize] = hid[v as usize].max(depth[be.tgt_idx as usize]);
            }
        }
    }
    (lo, hid)
}

/// Flattened per-vertex bracket lists (the set of backedges crossing each
/// vertex at the moment it is visited in the cycle-equivalence pass),
/// re-derived here for downstream queries per spec.md §3.4.
fn flatten_brackets(st: &SpanningTree) -> (Vec<u32>, Vec<usize>) {
    let n = st.parent.len();
    let mut order: Vec<u32> = (0..n as u32).collect();
    order.sort_by_key(|&v| st.post[v as usize]);

    let mut lists: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut per_vertex: Vec<Vec<usize>> = vec![Vec::new(); n];

    for v in order {
        let mut combined: Vec<usize> = Vec::new();
        for &c in &st.children[v as usize] {
            combined.extend(lists[c as usize].drain(..));
        }
        combined.retain(|&be_idx| st.back_edges[be_idx].tgt_idx != v);
        for (i, be) in st.back_edges.iter().enumerate() {
            if be.src_idx == v && !be.is_self_loop() {
                combined.push(i);
            }
        }
        per_vertex[v as usize] = combined.clone();
        lists[v as usize] = combined;
    }

    let mut off = vec![0u32; n + 1];
    let mut be = Vec::new();
    for v in 0..n {
        off[v] = be.len() as u32;
        be.extend(per_vertex[v].iter().copied());
    }
    off[n] = be.len() as u32;
    (off, be)
}

/// Builds the full tree-metadata bundle for `st` (spec.md §3.4).
pub fn gen_tree_meta(st: &SpanningTree) -> TreeMeta {
    let (e, d, first, depth) = euler_tour(st);
    let (lo, hi_d) = compute_lo_hid(st, &depth);
    let (off, be) = flatten_brackets(st);
    let sparse = SparseTable::build(&d);
    TreeMeta {
        e,
        d,
        first,
        lo,
        hi_d,
        depth,
        off,
        be,
        sparse,
    }
}

impl TreeMeta {
    pub fn get_brackets(&self, v_idx: u32) -> &[usize] {
        let start = self.off[v_idx as usize] as usize;
        let end = self.off[v_idx as usize + 1] as usize;
        &self.be[start..end]
    }

    fn lca_pair(&self, u: u32, v: u32) -> u32 {
        let fu = self.first[u as usize] as usize;
        let fv = self.first[v as usize] as usize;
        let (lo, hi) = if fu <= fv { (fu, fv) } else { (fv, fu) };
        self.e[self.sparse.query(&self.d, lo, hi) as usize]
    }

    /// Lowest common ancestor of a set of vertices, folded pairwise.
    pub fn find_lca(&self, vtxs: &[u32]) -> Option<u32> {
        let mut it = vtxs.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, v| self.lca_pair(acc, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::{VEnd, VariationGraph};

    fn chain() -> VariationGraph {
        let mut g = VariationGraph::new();
        let i1 = g.add_vertex(1, "A");
        let i2 = g.add_vertex(2, "C");
        let i3 = g.add_vertex(3, "G");
        g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
        g.add_edge(i2, VEnd::R, i3, VEnd::L).unwrap();
        g.recompute_tips();
        g
    }

    #[test]
    fn first_indexes_into_euler_tour() {
        let g = chain();
        let st = SpanningTree::build(&g, None).unwrap();
        let tm = gen_tree_meta(&st);
        for v in 0..g.vtx_count() {
            let pos = tm.first[v as usize] as usize;
            assert!(pos < tm.e.len());
            assert_eq!(tm.e[pos], v);
        }
    }

    #[test]
    fn lca_of_leaf_and_root_is_root() {
        let g = chain();
        let st = SpanningTree::build(&g, None).unwrap();
        let tm = gen_tree_meta(&st);
        let leaf = g.v_id_to_idx(3).unwrap();
        assert_eq!(tm.find_lca(&[st.root, leaf]), Some(st.root));
    }
}
