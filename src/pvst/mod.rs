//! Pangenome Variation Structure Tree (spec.md §3.5), grounded on
//! `original_source/include/povu/graph/pvst.hpp`. Vertex families are a
//! tagged enum rather than a class hierarchy (Design Notes §9).

pub mod flubble;
pub mod io;
pub mod subflubbles;

pub(crate) use io::{encode_label, type_char};

use crate::graph::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Dummy,
    Flubble,
    Tiny,
    Parallel,
    Concealed,
    Smothered,
    Midi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clan {
    FlLike,
    Subflubble,
}

pub fn to_clan(f: Family) -> Option<Clan> {
    match f {
        Family::Flubble | Family::Tiny | Family::Parallel => Some(Clan::FlLike),
        Family::Concealed | Family::Smothered | Family::Midi => Some(Clan::Subflubble),
        Family::Dummy => None,
    }
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Dummy => "dummy",
            Family::Flubble => "flubble",
            Family::Tiny => "tiny",
            Family::Parallel => "parallel",
            Family::Concealed => "concealed",
            Family::Smothered => "smothered",
            Family::Midi => "midi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    S2e,
    E2s,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteParams {
    pub left_endpoint: Step,
    pub right_endpoint: Step,
    pub route: Route,
}

#[derive(Debug, Clone)]
pub struct PvstNode {
    pub family: Family,
    pub route_params: Option<RouteParams>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub height: u32,
}

impl PvstNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A "flubble leaf": a fl_like node with no fl_like children (may still
    /// have subflubble children) — per spec.md §3.6, this is also eligible
    /// for an RoV.
    pub fn is_flubble_leaf(&self, pvst: &Pvst) -> bool {
        matches!(to_clan(self.family), Some(Clan::FlLike))
            && !self
                .children
                .iter()
                .any(|&c| matches!(to_clan(pvst.nodes[c].family), Some(Clan::FlLike)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pvst {
    pub nodes: Vec<PvstNode>,
}

pub const ROOT: usize = 0;

impl Pvst {
    /// A new forest with just the dummy root (spec.md §3.5 invariant: root
    /// is a single dummy).
    pub fn new() -> Self {
        Self {
            nodes: vec![PvstNode {
                family: Family::Dummy,
                route_params: None,
                parent: None,
                children: Vec::new(),
                height: 0,
            }],
        }
    }

    pub fn add_node(
        &mut self,
        family: Family,
        route_params: RouteParams,
        parent: usize,
    ) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(PvstNode {
            family,
            route_params: Some(route_params),
            parent: Some(parent),
            children: Vec::new(),
            height: 0,
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Re-parents `child` under `new_parent` (used by the midi refinement,
    /// spec.md §4.4).
    pub fn reparent(&mut self, child: usize, new_parent: usize) {
        if let Some(old_parent) = self.nodes[child].parent {
            self.nodes[old_parent].children.retain(|&c| c != child);
        }
        self.nodes[child].parent = Some(new_parent);
        self.nodes[new_parent].children.push(child);
    }

    /// Bottom-up height pass (spec.md §3.5): height is the node's distance
    /// from its deepest descendant; leaves get height 1, the dummy root
    /// gets height 0.
    pub fn compute_heights(&mut self) {
        fn visit(pvst: &mut Pvst, idx: usize) -> u32 {
            if pvst.nodes[idx].children.is_empty() {
                let h = if idx == ROOT { 0 } else { 1 };
                pvst.nodes[idx].height = h;
                return h;
            }
            let children = pvst.nodes[idx].children.clone();
            let max_child_h = children.iter().map(|&c| visit(pvst, c)).max().unwrap_or(0);
            let h = max_child_h + 1;
            pvst.nodes[idx].height = h;
            h
        }
        visit(self, ROOT);
    }

    pub fn depth_of(&self, mut idx: usize) -> u32 {
        let mut d = 0;
        while let Some(p) = self.nodes[idx].parent {
            d += 1;
            idx = p;
        }
        d
    }

    /// Nodes reachable from the root via `children` links, pre-order.
    /// Refinement passes may leave superseded nodes in `self.nodes` with
    /// their children moved elsewhere (see `subflubbles::merge_parallel`);
    /// those are unreachable and must not surface here.
    pub fn reachable_nodes(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.nodes[idx].children.iter().rev());
        }
        out
    }

    /// All leaf/flubble-leaf nodes eligible for an RoV (spec.md §3.6).
    pub fn rov_eligible_nodes(&self) -> Vec<usize> {
        self.reachable_nodes()
            .into_iter()
            .filter(|&i| i != ROOT)
            .filter(|&i| {
                let n = &self.nodes[i];
                n.is_leaf() || n.is_flubble_leaf(self)
            })
            .collect()
    }

    /// The node's textual label (e.g. `F>1>4`), used both as a VCF record's
    /// variant id and as its enclosing-flubble label (spec.md §3.10).
    pub fn label_of(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        match &node.route_params {
            Some(rp) => format!("{}{}", type_char(node.family), encode_label(rp)),
            None => ".".to_string(),
        }
    }

    /// The nearest ancestor belonging to the `FlLike` clan, or `ROOT` if
    /// none (spec.md §3.10 "enclosing-flubble label").
    pub fn enclosing_flubble(&self, idx: usize) -> usize {
        let mut cur = self.nodes[idx].parent;
        while let Some(p) = cur {
            if p == ROOT || matches!(to_clan(self.nodes[p].family), Some(Clan::FlLike)) {
                return p;
            }
            cur = self.nodes[p].parent;
        }
        ROOT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Orientation, Step};

    fn rp(a: u32, b: u32) -> RouteParams {
        RouteParams {
            left_endpoint: Step::new(a, Orientation::Fwd),
            right_endpoint: Step::new(b, Orientation::Fwd),
            route: Route::S2e,
        }
    }

    #[test]
    fn single_dummy_root() {
        let pvst = Pvst::new();
        assert_eq!(pvst.nodes.len(), 1);
        assert_eq!(pvst.nodes[ROOT].family, Family::Dummy);
    }

    #[test]
    fn heights_respect_bounds() {
        let mut pvst = Pvst::new();
        let a = pvst.add_node(Family::Flubble, rp(1, 4), ROOT);
        let _b = pvst.add_node(Family::Concealed, rp(2, 3), a);
        pvst.compute_heights();
        assert!(pvst.nodes[a].height >= 1);
        assert!(pvst.nodes[a].height <= pvst.depth_of(a) + pvst.nodes[a].height);
    }
}
