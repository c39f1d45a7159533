//! The bidirected variation graph (spec.md §3.1, §4.1).
//!
//! Ported from the shape of `original_source/include/povu/graph/bidirected.hpp`
//! and `types.hpp`: vertices carry two ends (`L`, `R`), edges connect specific
//! ends, and a `TwoWayMap` keeps the id/index bijection instead of the
//! original's raw-pointer graph (Design Notes §9).

use std::collections::BTreeSet;
use std::fmt;

use fnv::{FnvHashMap, FnvHashSet};

use super::refs::{Refs, PANSN_DELIM};
use super::two_way_map::TwoWayMap;
use crate::error::{PovuError, Result};

/// 5' (`L`) or 3' (`R`) end of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VEnd {
    L,
    R,
}

impl VEnd {
    pub fn complement(self) -> VEnd {
        match self {
            VEnd::L => VEnd::R,
            VEnd::R => VEnd::L,
        }
    }
}

impl fmt::Display for VEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VEnd::L => write!(f, "L"),
            VEnd::R => write!(f, "R"),
        }
    }
}

/// Orientation of a step along a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Fwd,
    Rev,
}

impl Orientation {
    pub fn complement(self) -> Orientation {
        match self {
            Orientation::Fwd => Orientation::Rev,
            Orientation::Rev => Orientation::Fwd,
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Orientation::Rev)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Fwd => write!(f, ">"),
            Orientation::Rev => write!(f, "<"),
        }
    }
}

/// `(v_end, v_id)` pair. Used to name tips and graph sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SideNId {
    pub v_end: VEnd,
    pub v_id: u32,
}

impl SideNId {
    pub fn new(v_end: VEnd, v_id: u32) -> Self {
        Self { v_end, v_id }
    }

    pub fn complement(self) -> Self {
        Self {
            v_end: self.v_end.complement(),
            v_id: self.v_id,
        }
    }
}

/// An oriented step: a vertex id plus the orientation it's walked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step {
    pub v_id: u32,
    pub orientation: Orientation,
}

impl Step {
    pub fn new(v_id: u32, orientation: Orientation) -> Self {
        Self { v_id, orientation }
    }

    pub fn as_str(&self) -> String {
        format!("{}{}", self.orientation, self.v_id)
    }

    pub fn flip(&self) -> Self {
        Self {
            v_id: self.v_id,
            orientation: self.orientation.complement(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Walk = Vec<Step>;

pub fn walk_to_string(w: &Walk) -> String {
    w.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("")
}

/// Reverse complement of a DNA string. Any byte outside `ACGTNacgtn` maps to
/// itself reversed (lenient, matching how graph labels in practice include
/// ambiguity codes the core doesn't need to reject).
pub fn revcomp(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            b'T' => b'A',
            b'a' => b't',
            b'c' => b'g',
            b'g' => b'c',
            b't' => b'a',
            b'N' => b'N',
            b'n' => b'n',
            other => other,
        })
        .map(|b| b as char)
        .collect()
}

/// Undirected edge: stores vertex *indices*, not ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    v1_idx: u32,
    v1_end: VEnd,
    v2_idx: u32,
    v2_end: VEnd,
}

impl Edge {
    pub fn new(v1_idx: u32, v1_end: VEnd, v2_idx: u32, v2_end: VEnd) -> Self {
        Self {
            v1_idx,
            v1_end,
            v2_idx,
            v2_end,
        }
    }

    pub fn v1_idx(&self) -> u32 {
        self.v1_idx
    }
    pub fn v1_end(&self) -> VEnd {
        self.v1_end
    }
    pub fn v2_idx(&self) -> u32 {
        self.v2_idx
    }
    pub fn v2_end(&self) -> VEnd {
        self.v2_end
    }

    /// Follows this edge from `(v_idx, v_end)` to the vertex (and end) on
    /// the other side. Correctly returns the same vertex for a self-loop.
    pub fn get_other_vtx(&self, v_idx: u32, v_end: VEnd) -> SideNId {
        if v_idx == self.v1_idx && v_end == self.v1_end {
            SideNId::new(self.v2_end, self.v2_idx)
        } else {
            SideNId::new(self.v1_end, self.v1_idx)
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.v1_idx == self.v2_idx
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    v_id: u32,
    label: String,
    edges_l: BTreeSet<u32>,
    edges_r: BTreeSet<u32>,
}

impl Vertex {
    pub fn new(v_id: u32, label: impl Into<String>) -> Self {
        Self {
            v_id,
            label: label.into(),
            edges_l: BTreeSet::new(),
            edges_r: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.v_id
    }

    pub fn get_length(&self) -> u32 {
        self.label.len() as u32
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn get_rc_label(&self) -> String {
        revcomp(&self.label)
    }

    pub fn get_edges(&self, end: VEnd) -> &BTreeSet<u32> {
        match end {
            VEnd::L => &self.edges_l,
            VEnd::R => &self.edges_r,
        }
    }

    pub fn add_edge(&mut self, end: VEnd, e_idx: u32) {
        match end {
            VEnd::L => self.edges_l.insert(e_idx),
            VEnd::R => self.edges_r.insert(e_idx),
        };
    }

    pub fn degree(&self) -> usize {
        self.edges_l.len() + self.edges_r.len()
    }
}

/// Per-sample genotype column layout, built by `gen_genotype_metadata`
/// (spec.md §4.1, §4.10). Haploid per haplotype: one column per sample, one
/// row per haplotype number within that sample.
#[derive(Debug, Clone, Default)]
pub struct GenotypeLayout {
    /// Samples in column order.
    pub samples: Vec<String>,
    /// ref_id -> (column, row)
    pub ref_cell: FnvHashMap<u32, (usize, usize)>,
    /// number of rows (max ploidy) per column
    pub rows_per_column: Vec<usize>,
}

impl GenotypeLayout {
    pub fn ncols(&self) -> usize {
        self.samples.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariationGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    id_to_idx: TwoWayMap<u32, u32>,
    tips: BTreeSet<SideNId>,
    refs: Refs,
    /// (vertex_idx, ref_id) -> step indices into that ref's walk
    vertex_ref_idx: FnvHashMap<(u32, u32), Vec<usize>>,
}

impl VariationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vtx_count: usize, edge_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vtx_count),
            edges: Vec::with_capacity(edge_count),
            ..Default::default()
        }
    }

    /// Idempotent: adding the same id twice returns the existing index.
    pub fn add_vertex(&mut self, v_id: u32, label: impl Into<String>) -> u32 {
        if let Some(&idx) = self.id_to_idx.by_key(&v_id) {
            return idx;
        }
        let idx = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(v_id, label));
        self.id_to_idx.insert(v_id, idx);
        idx
    }

    pub fn add_edge(
        &mut self,
        v1_idx: u32,
        v1_end: VEnd,
        v2_idx: u32,
        v2_end: VEnd,
    ) -> Result<u32> {
        if v1_idx as usize >= self.vertices.len() || v2_idx as usize >= self.vertices.len() {
            return Err(PovuError::InvariantViolation {
                subsystem: "bidirected".into(),
                message: format!(
                    "add_edge: vertex index out of range ({}, {})",
                    v1_idx, v2_idx
                ),
            });
        }
        let e_idx = self.edges.len() as u32;
        self.edges.push(Edge::new(v1_idx, v1_end, v2_idx, v2_end));
        self.vertices[v1_idx as usize].add_edge(v1_end, e_idx);
        self.vertices[v2_idx as usize].add_edge(v2_end, e_idx);
        Ok(e_idx)
    }

    pub fn add_all_refs(&mut self, refs: Refs) {
        self.refs = refs;
    }

    pub fn set_vtx_ref_idx(&mut self, v_idx: u32, ref_id: u32, step_idx: usize) {
        self.vertex_ref_idx
            .entry((v_idx, ref_id))
            .or_default()
            .push(step_idx);
    }

    pub fn vtx_ref_steps(&self, v_idx: u32, ref_id: u32) -> &[usize] {
        self.vertex_ref_idx
            .get(&(v_idx, ref_id))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Recomputes the tip set: `(v_id, end)` pairs whose end has no incident
    /// edges.
    pub fn recompute_tips(&mut self) {
        self.tips.clear();
        for v in &self.vertices {
            if v.get_edges(VEnd::L).is_empty() {
                self.tips.insert(SideNId::new(VEnd::L, v.id()));
            }
            if v.get_edges(VEnd::R).is_empty() {
                self.tips.insert(SideNId::new(VEnd::R, v.id()));
            }
        }
    }

    pub fn tips(&self) -> &BTreeSet<SideNId> {
        &self.tips
    }

    pub fn vtx_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn edge_count(&self) -> u32 {
        self.edges.len() as u32
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn refs_mut(&mut self) -> &mut Refs {
        &mut self.refs
    }

    pub fn v_id_to_idx(&self, v_id: u32) -> Option<u32> {
        self.id_to_idx.by_key(&v_id).copied()
    }

    pub fn v_idx_to_id(&self, v_idx: u32) -> Option<u32> {
        self.id_to_idx.by_value(&v_idx).copied()
    }

    pub fn get_vertex_by_idx(&self, v_idx: u32) -> &Vertex {
        &self.vertices[v_idx as usize]
    }

    pub fn get_vertex_by_id(&self, v_id: u32) -> &Vertex {
        let idx = self.v_id_to_idx(v_id).expect("unknown vertex id");
        &self.vertices[idx as usize]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get_edge(&self, e_idx: u32) -> &Edge {
        &self.edges[e_idx as usize]
    }

    pub fn get_other_vtx(&self, v_idx: u32, v_end: VEnd) -> Option<SideNId> {
        let v = &self.vertices[v_idx as usize];
        // a vertex can have more than one incident edge at an end (branch
        // point); this follows the *first* in index order, matching the
        // deterministic trunk-choosing behaviour callers rely on when they
        // already know the end has exactly one edge (e.g. walking a simple
        // chain).
        let e_idx = *v.get_edges(v_end).iter().next()?;
        let e = self.get_edge(e_idx);
        Some(e.get_other_vtx(v_idx, v_end))
    }

    /// Builds the per-sample genotype column layout: one column per sample
    /// (PanSN sample name, or the ref's own tag if undefined), one row per
    /// haplotype number seen for that sample (defaulting to a single row).
    pub fn gen_genotype_metadata(&self) -> GenotypeLayout {
        let mut samples: Vec<String> = Vec::new();
        let mut sample_idx: FnvHashMap<String, usize> = FnvHashMap::default();
        let mut rows_per_column: Vec<usize> = Vec::new();
        let mut ref_cell = FnvHashMap::default();

        for r in self.refs.iter() {
            let sample = r.get_sample_name().to_string();
            let col = *sample_idx.entry(sample.clone()).or_insert_with(|| {
                samples.push(sample.clone());
                rows_per_column.push(0);
                samples.len() - 1
            });
            let row = r.hap_or_zero() as usize;
            if rows_per_column[col] <= row {
                rows_per_column[col] = row + 1;
            }
            ref_cell.insert(r.id(), (col, row));
        }

        GenotypeLayout {
            samples,
            ref_cell,
            rows_per_column,
        }
    }

    /// Returns the weakly-connected components of this graph as new graphs,
    /// preserving vertex id identity (spec.md §4.1, §8.1). References are
    /// partitioned by whether *all* of their walk's vertices fall in the
    /// component (a ref never straddles components by construction, since a
    /// walk is connected).
    pub fn componetize(&self) -> Vec<VariationGraph> {
        let n = self.vertices.len();
        let mut comp_of = vec![u32::MAX; n];
        let mut next_comp = 0u32;

        for start in 0..n {
            if comp_of[start] != u32::MAX {
                continue;
            }
            let mut stack = vec![start as u32];
            comp_of[start] = next_comp;
            while let Some(v_idx) = stack.pop() {
                let v = &self.vertices[v_idx as usize];
                for end in [VEnd::L, VEnd::R] {
                    for &e_idx in v.get_edges(end) {
                        let e = self.get_edge(e_idx);
                        let other = e.get_other_vtx(v_idx, end).v_id; // v_id field doubles as idx here
                        if comp_of[other as usize] == u32::MAX {
                            comp_of[other as usize] = next_comp;
                            stack.push(other);
                        }
                    }
                }
            }
            next_comp += 1;
        }

        let mut out = vec![VariationGraph::new(); next_comp as usize];
        let mut old_to_new_idx: FnvHashMap<u32, u32> = FnvHashMap::default();

        for (old_idx, v) in self.vertices.iter().enumerate() {
            let c = comp_of[old_idx] as usize;
            let new_idx = out[c].add_vertex(v.id(), v.get_label());
            old_to_new_idx.insert(old_idx as u32, new_idx);
        }

        let mut seen_edges: FnvHashSet<u32> = FnvHashSet::default();
        for (old_idx, v) in self.vertices.iter().enumerate() {
            let c = comp_of[old_idx] as usize;
            for end in [VEnd::L, VEnd::R] {
                for &e_idx in v.get_edges(end) {
                    if !seen_edges.insert(e_idx) {
                        continue;
                    }
                    let e = self.get_edge(e_idx);
                    let n1 = old_to_new_idx[&e.v1_idx()];
                    let n2 = old_to_new_idx[&e.v2_idx()];
                    out[c]
                        .add_edge(n1, e.v1_end(), n2, e.v2_end())
                        .expect("component edge endpoints exist");
                }
            }
        }

        // Each ref belongs to whichever component its walk's first vertex
        // landed in (a walk never crosses components, since its steps are
        // joined by graph edges).
        let mut refs_out: Vec<Refs> = (0..next_comp as usize).map(|_| Refs::new()).collect();
        for r in self.refs.iter() {
            let Some(first) = r.walk().first() else { continue };
            let Some(old_idx) = self.v_id_to_idx(first.v_id) else { continue };
            let c = comp_of[old_idx as usize] as usize;
            let new_id = refs_out[c].add_ref(&r.tag(), PANSN_DELIM);
            let new_ref = refs_out[c].get_ref_mut(new_id);
            new_ref.set_walk(r.walk().to_vec());
            new_ref.set_length(r.get_length());
        }
        for (c, refs) in refs_out.into_iter().enumerate() {
            out[c].add_all_refs(refs);
        }

        for g in out.iter_mut() {
            g.recompute_tips();
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> VariationGraph {
        // 1 - 2 - 3, each connected R-of-prev to L-of-next
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
    fn idempotent_add_vertex() {
        let mut g = VariationGraph::new();
        let a = g.add_vertex(5, "ACGT");
        let b = g.add_vertex(5, "ACGT");
        assert_eq!(a, b);
        assert_eq!(g.vtx_count(), 1);
    }

    #[test]
    fn tips_are_dangling_ends() {
        let g = line_graph();
        assert!(g.tips().contains(&SideNId::new(VEnd::L, 1)));
        assert!(g.tips().contains(&SideNId::new(VEnd::R, 3)));
        assert!(!g.tips().contains(&SideNId::new(VEnd::R, 1)));
    }

    #[test]
    fn self_loop_other_vtx_is_itself() {
        let mut g = VariationGraph::new();
        let i1 = g.add_vertex(1, "A");
        g.add_edge(i1, VEnd::R, i1, VEnd::R).unwrap();
        let other = g.get_edge(0).get_other_vtx(i1, VEnd::R);
        assert_eq!(other.v_id, i1);
    }

    #[test]
    fn componetize_preserves_edges_and_labels() {
        let mut g = VariationGraph::new();
        let a = g.add_vertex(1, "A");
        let b = g.add_vertex(2, "C");
        g.add_edge(a, VEnd::R, b, VEnd::L).unwrap();
        let d = g.add_vertex(10, "T"); // disconnected
        let _ = d;
        let comps = g.componetize();
        assert_eq!(comps.len(), 2);
        let total_vtx: u32 = comps.iter().map(|c| c.vtx_count()).sum();
        assert_eq!(total_vtx, g.vtx_count());
        let total_edges: u32 = comps.iter().map(|c| c.edge_count()).sum();
        assert_eq!(total_edges, g.edge_count());
    }

    #[test]
    fn revcomp_is_correct() {
        assert_eq!(revcomp("ACGT"), "ACGT");
        assert_eq!(revcomp("AACG"), "CGTT");
    }
}
