//! Interval tree ("slice tree") keyed by reference start position, used to
//! overlay inversion alternates onto a reference haplotype (spec.md §3.9,
//! §4.9), grounded on `original_source/include/povu/genomics/allele.hpp`.
//!
//! Nodes live in an arena (`Vec<Node>`), children referenced by index, per
//! Design Notes §9 ("represent the tree as an arena ... with `None`
//! sentinels for absent children").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    InsertLeaf,
    InsertAlt,
    ReplaceAlt,
    MergeExtend,
    MergeReplace,
    ExtendAlt,
    DoNothing,
    Contained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: u32,
    pub len: u32,
}

impl Interval {
    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

#[derive(Debug, Clone)]
struct AltEntry {
    alt_ref_id: u32,
    intervals: Vec<Interval>,
}

#[derive(Debug, Clone)]
struct Node {
    ref_h_start: u32,
    alts: Vec<AltEntry>,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SliceTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl SliceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// (alt_ref_id, alt_start, len) tuples stored at `ref_h_start`, if any.
    pub fn alts_at(&self, ref_h_start: u32) -> Vec<(u32, u32, u32)> {
        let Some(idx) = self.find(ref_h_start) else {
            return Vec::new();
        };
        self.nodes[idx]
            .alts
            .iter()
            .flat_map(|a| a.intervals.iter().map(move |iv| (a.alt_ref_id, iv.start, iv.len)))
            .collect()
    }

    fn find(&self, ref_h_start: u32) -> Option<usize> {
        let mut cur = self.root;
        while let Some(idx) = cur {
            let n = &self.nodes[idx];
            cur = match ref_h_start.cmp(&n.ref_h_start) {
                std::cmp::Ordering::Equal => return Some(idx),
                std::cmp::Ordering::Less => n.left,
                std::cmp::Ordering::Greater => n.right,
            };
        }
        None
    }

    fn new_node(&mut self, ref_h_start: u32, alt_ref_id: u32, interval: Interval) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            ref_h_start,
            alts: vec![AltEntry {
                alt_ref_id,
                intervals: vec![interval],
            }],
            left: None,
            right: None,
        });
        idx
    }

    /// Case analysis on one existing interval against the incoming one, for
    /// entries that already share `ref_h_start` and `alt_ref_id` (spec.md
    /// §4.9).
    fn classify(existing: Interval, incoming: Interval) -> Option<InsertOutcome> {
        if existing == incoming {
            return Some(InsertOutcome::DoNothing);
        }
        if existing.start <= incoming.start && existing.end() >= incoming.end() {
            return Some(InsertOutcome::Contained);
        }
        if incoming.start <= existing.start && incoming.end() >= existing.end() {
            return Some(InsertOutcome::ReplaceAlt);
        }
        if existing.start < incoming.start && incoming.start < existing.end() && existing.end() < incoming.end() {
            return Some(InsertOutcome::MergeExtend);
        }
        if incoming.start < existing.start && existing.start < incoming.end() && incoming.end() < existing.end() {
            return Some(InsertOutcome::MergeReplace);
        }
        None
    }

    pub fn insert(&mut self, ref_h_start: u32, alt_ref_id: u32, alt_h_start: u32, len: u32) -> InsertOutcome {
        let incoming = Interval { start: alt_h_start, len };

        let Some(root) = self.root else {
            self.root = Some(self.new_node(ref_h_start, alt_ref_id, incoming));
            return InsertOutcome::InsertLeaf;
        };

        let mut cur = root;
        loop {
            let key = self.nodes[cur].ref_h_start;
            match ref_h_start.cmp(&key) {
                std::cmp::Ordering::Less => {
                    if let Some(l) = self.nodes[cur].left {
                        cur = l;
                        continue;
                    }
                    let new_idx = self.new_node(ref_h_start, alt_ref_id, incoming);
                    self.nodes[cur].left = Some(new_idx);
                    return InsertOutcome::InsertLeaf;
                }
                std::cmp::Ordering::Greater => {
                    if let Some(r) = self.nodes[cur].right {
                        cur = r;
                        continue;
                    }
                    let new_idx = self.new_node(ref_h_start, alt_ref_id, incoming);
                    self.nodes[cur].right = Some(new_idx);
                    return InsertOutcome::InsertLeaf;
                }
                std::cmp::Ordering::Equal => {
                    let alt_pos = self.nodes[cur].alts.iter().position(|a| a.alt_ref_id == alt_ref_id);
                    let Some(ap) = alt_pos else {
                        self.nodes[cur].alts.push(AltEntry {
                            alt_ref_id,
                            intervals: vec![incoming],
                        });
                        return InsertOutcome::InsertAlt;
                    };
                    let intervals = &mut self.nodes[cur].alts[ap].intervals;
                    for existing_pos in 0..intervals.len() {
                        if let Some(outcome) = Self::classify(intervals[existing_pos], incoming) {
                            match outcome {
                                InsertOutcome::ReplaceAlt => intervals[existing_pos] = incoming,
                                InsertOutcome::MergeExtend => {
                                    intervals[existing_pos].len = incoming.end() - intervals[existing_pos].start
                                }
                                InsertOutcome::MergeReplace => {
                                    let end = intervals[existing_pos].end();
                                    intervals[existing_pos].start = incoming.start;
                                    intervals[existing_pos].len = end - incoming.start;
                                }
                                _ => {}
                            }
                            return outcome;
                        }
                    }
                    intervals.push(incoming);
                    return InsertOutcome::ExtendAlt;
                }
            }
        }
    }

    fn leftmost(&self, mut idx: usize) -> usize {
        while let Some(l) = self.nodes[idx].left {
            idx = l;
        }
        idx
    }

    /// Removes every entry at `ref_h_start` (all alts). Promotes the
    /// left-most leaf of the right subtree when the node has two children
    /// (spec.md §4.9).
    pub fn remove(&mut self, ref_h_start: u32) {
        self.root = self.remove_rec(self.root, ref_h_start);
    }

    fn remove_rec(&mut self, node: Option<usize>, key: u32) -> Option<usize> {
        let idx = node?;
        match key.cmp(&self.nodes[idx].ref_h_start) {
            std::cmp::Ordering::Less => {
                let new_left = self.remove_rec(self.nodes[idx].left, key);
                self.nodes[idx].left = new_left;
                Some(idx)
            }
            std::cmp::Ordering::Greater => {
                let new_right = self.remove_rec(self.nodes[idx].right, key);
                self.nodes[idx].right = new_right;
                Some(idx)
            }
            std::cmp::Ordering::Equal => match (self.nodes[idx].left, self.nodes[idx].right) {
                (None, None) => None,
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (Some(_), Some(r)) => {
                    let successor = self.leftmost(r);
                    let (succ_key, succ_alts) =
                        (self.nodes[successor].ref_h_start, self.nodes[successor].alts.clone());
                    let new_right = self.remove_rec(Some(r), succ_key);
                    self.nodes[idx].ref_h_start = succ_key;
                    self.nodes[idx].alts = succ_alts;
                    self.nodes[idx].right = new_right;
                    Some(idx)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_case_table() {
        let mut t = SliceTree::new();
        assert_eq!(t.insert(10, 1, 100, 5), InsertOutcome::InsertLeaf);
        assert_eq!(t.insert(10, 1, 100, 5), InsertOutcome::DoNothing);
        assert_eq!(t.insert(10, 2, 200, 5), InsertOutcome::InsertAlt);
        assert_eq!(t.insert(10, 1, 98, 9), InsertOutcome::ReplaceAlt);
        assert_eq!(t.insert(20, 1, 300, 5), InsertOutcome::InsertLeaf);
        assert_eq!(t.insert(5, 1, 80, 5), InsertOutcome::InsertLeaf);

        let at_10 = t.alts_at(10);
        assert!(at_10.contains(&(1, 98, 9)));
        assert!(at_10.contains(&(2, 200, 5)));
    }

    #[test]
    fn merge_extend_and_replace() {
        let mut t = SliceTree::new();
        t.insert(10, 1, 100, 10); // [100,110)
        assert_eq!(t.insert(10, 1, 105, 10), InsertOutcome::MergeExtend); // [105,115) -> [100,115)
        assert_eq!(t.alts_at(10), vec![(1, 100, 15)]);

        let mut t2 = SliceTree::new();
        t2.insert(10, 1, 100, 10); // [100,110)
        assert_eq!(t2.insert(10, 1, 95, 10), InsertOutcome::MergeReplace); // [95,105) -> [95,110)
        assert_eq!(t2.alts_at(10), vec![(1, 95, 15)]);
    }

    #[test]
    fn extend_alt_for_non_overlapping_same_hap() {
        let mut t = SliceTree::new();
        t.insert(10, 1, 100, 5);
        assert_eq!(t.insert(10, 1, 500, 5), InsertOutcome::ExtendAlt);
        assert_eq!(t.alts_at(10).len(), 2);
    }

    #[test]
    fn remove_with_two_children_promotes_successor() {
        let mut t = SliceTree::new();
        t.insert(10, 1, 100, 5);
        t.insert(5, 1, 80, 5);
        t.insert(20, 1, 300, 5);
        t.remove(10);
        assert!(t.alts_at(10).is_empty());
        assert_eq!(t.alts_at(20), vec![(1, 300, 5)]);
    }
}
