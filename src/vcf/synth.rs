//! Per-RoV VCF record synthesis (spec.md §4.10), grounded on
//! `original_source/include/povu/genomics/vcf.hpp`.

use std::collections::BTreeSet;

use crate::error::PovuWarning;
use crate::graph::bidirected::{GenotypeLayout, Orientation, Step, VariationGraph};
use crate::graph::refs::RefStep;
use crate::overlay::VariantType;
use crate::pvst::Pvst;
use crate::variation::{DepthMatrix, Rov};
use crate::vcf::record::{AltAllele, VcfRecord};

/// The slice of `ref_walk` strictly between the first occurrence of
/// `source_id` and the next occurrence of `sink_id`, plus the index of that
/// `source_id` occurrence (for locus lookups). `None` if this reference
/// doesn't traverse the region.
fn local_interior(ref_walk: &[RefStep], source_id: u32, sink_id: u32) -> Option<(usize, Vec<RefStep>)> {
    let start = ref_walk.iter().position(|s| s.v_id == source_id)?;
    let rel_end = ref_walk[start + 1..].iter().position(|s| s.v_id == sink_id)?;
    let end = start + 1 + rel_end;
    Some((start, ref_walk[start + 1..end].to_vec()))
}

fn interior_key(interior: &[RefStep]) -> Vec<Step> {
    interior.iter().map(|rs| rs.step()).collect()
}

struct Group {
    steps: Vec<Step>,
    haps: BTreeSet<u32>,
}

fn vertex_label(graph: &VariationGraph, step: Step) -> String {
    let idx = graph.v_id_to_idx(step.v_id).expect("step vertex must exist");
    let v = graph.get_vertex_by_idx(idx);
    match step.orientation {
        Orientation::Fwd => v.get_label().to_string(),
        Orientation::Rev => v.get_rc_label(),
    }
}

fn render_interior(graph: &VariationGraph, steps: &[Step]) -> String {
    steps.iter().map(|&s| vertex_label(graph, s)).collect()
}

fn anchor_base(graph: &VariationGraph, source: Step) -> String {
    let lbl = vertex_label(graph, source);
    lbl.chars().last().map(|c| c.to_string()).unwrap_or_default()
}

fn traversal_str(source: Step, interior: &[Step], sink: Step) -> String {
    std::iter::once(source.as_str())
        .chain(interior.iter().map(|s| s.as_str()))
        .chain(std::iter::once(sink.as_str()))
        .collect()
}

/// Classifies an alt group's interior against the reference group's
/// interior (spec.md §4.10).
fn classify(ref_steps: &[Step], alt_steps: &[Step]) -> VariantType {
    if alt_steps.len() < ref_steps.len() {
        return VariantType::Del;
    }
    if alt_steps.len() > ref_steps.len() {
        return VariantType::Ins;
    }
    if !ref_steps.is_empty()
        && ref_steps
            .iter()
            .zip(alt_steps)
            .all(|(r, a)| r.v_id == a.v_id && r.orientation != a.orientation)
    {
        return VariantType::Inv;
    }
    VariantType::Sub
}

/// Synthesizes the (at most one) VCF record for `rov`, one reference's walk
/// at a time (spec.md §4.10). `primary_ref_id` names the reference whose
/// own local walk becomes the record's REF allele and coordinate system.
/// Returns `None` (with a warning) if `primary_ref_id` doesn't traverse this
/// region.
pub fn synth_record(
    rov: &Rov,
    graph: &VariationGraph,
    dm: &DepthMatrix,
    pvst: &Pvst,
    primary_ref_id: u32,
    layout: &GenotypeLayout,
    warnings: &mut Vec<PovuWarning>,
) -> Option<VcfRecord> {
    let source = *rov.walks.first()?.first()?;
    let sink = *rov.walks.first()?.last()?;

    let mut groups: Vec<Group> = Vec::new();
    let mut ref_group_idx: Option<usize> = None;
    let mut primary_start_idx: Option<usize> = None;

    for r in graph.refs().iter() {
        let Some((start_idx, interior)) = local_interior(r.walk(), source.v_id, sink.v_id) else {
            continue;
        };
        let key = interior_key(&interior);
        let gi = match groups.iter().position(|g| g.steps == key) {
            Some(gi) => gi,
            None => {
                groups.push(Group {
                    steps: key,
                    haps: BTreeSet::new(),
                });
                groups.len() - 1
            }
        };
        groups[gi].haps.insert(r.id());
        if r.id() == primary_ref_id {
            ref_group_idx = Some(gi);
            primary_start_idx = Some(start_idx);
        }
    }

    let (Some(ref_gi), Some(start_idx)) = (ref_group_idx, primary_start_idx) else {
        warnings.push(PovuWarning::new(
            "vcf::synth",
            format!(
                "primary reference {} does not traverse RoV at pvst node {}; record skipped",
                primary_ref_id, rov.pvst_idx
            ),
        ));
        return None;
    };

    let primary_ref = graph.refs().get_ref(primary_ref_id);
    let anchor_locus = primary_ref.walk()[start_idx].locus + graph.get_vertex_by_id(source.v_id).get_length();

    let ref_steps = groups[ref_gi].steps.clone();
    let ref_haps = groups[ref_gi].haps.clone();

    let mut alts: Vec<AltAllele> = Vec::new();
    let mut first_alt_type: Option<VariantType> = None;
    for (gi, group) in groups.iter().enumerate() {
        if gi == ref_gi {
            continue;
        }
        let vt = classify(&ref_steps, &group.steps);
        if first_alt_type.is_none() {
            first_alt_type = Some(vt);
        }
        let seq = match vt {
            VariantType::Del | VariantType::Ins => {
                format!("{}{}", anchor_base(graph, source), render_interior(graph, &group.steps))
            }
            VariantType::Sub | VariantType::Inv => render_interior(graph, &group.steps),
        };
        alts.push(AltAllele {
            seq,
            haps: group.haps.clone(),
            traversal: traversal_str(source, &group.steps, sink),
        });
    }

    if alts.is_empty() {
        warnings.push(PovuWarning::new(
            "vcf::synth",
            format!("pvst node {} has no distinct alt allele; record skipped", rov.pvst_idx),
        ));
        return None;
    }

    let variant_type = first_alt_type.unwrap_or(VariantType::Sub);
    let pos = match variant_type {
        VariantType::Del | VariantType::Ins => anchor_locus.saturating_sub(1),
        VariantType::Sub | VariantType::Inv => anchor_locus,
    };
    let ref_allele = match variant_type {
        VariantType::Del | VariantType::Ins => {
            format!("{}{}", anchor_base(graph, source), render_interior(graph, &ref_steps))
        }
        VariantType::Sub | VariantType::Inv => render_interior(graph, &ref_steps),
    };

    let mut genotypes: Vec<Vec<String>> = layout
        .rows_per_column
        .iter()
        .map(|&n| vec![".".to_string(); n])
        .collect();
    for &id in ref_haps.iter() {
        if let Some(&(col, row)) = layout.ref_cell.get(&id) {
            genotypes[col][row] = "0".to_string();
        }
    }
    for (k, alt) in alts.iter().enumerate() {
        for &id in alt.haps.iter() {
            if let Some(&(col, row)) = layout.ref_cell.get(&id) {
                genotypes[col][row] = (k + 1).to_string();
            }
        }
    }

    Some(VcfRecord {
        chrom: primary_ref.tag(),
        pos,
        var_id: pvst.label_of(rov.pvst_idx),
        enclosing_flubble: pvst.label_of(pvst.enclosing_flubble(rov.pvst_idx)),
        ref_allele,
        ref_traversal: traversal_str(source, &ref_steps, sink),
        ref_haps,
        alts,
        depth: pvst.depth_of(rov.pvst_idx),
        variant_type,
        tangled: dm.tangled,
        genotypes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::{VEnd, VariationGraph};
    use crate::graph::refs::Refs;
    use crate::pvst::{Family, Route, RouteParams, ROOT};
    use crate::variation::build_depth_matrix;

    fn snp_bubble_with_ref() -> (VariationGraph, Pvst) {
        let mut g = VariationGraph::new();
        let i1 = g.add_vertex(1, "A");
        let i2 = g.add_vertex(2, "C");
        let i3 = g.add_vertex(3, "G");
        let i4 = g.add_vertex(4, "T");
        g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
        g.add_edge(i1, VEnd::R, i3, VEnd::L).unwrap();
        g.add_edge(i2, VEnd::R, i4, VEnd::L).unwrap();
        g.add_edge(i3, VEnd::R, i4, VEnd::L).unwrap();
        g.recompute_tips();

        let mut refs = Refs::new();
        let rid = refs.add_ref("R#0#chr", '#');
        refs.get_ref_mut(rid).set_walk(vec![
            RefStep { v_id: 1, orientation: Orientation::Fwd, locus: 1 },
            RefStep { v_id: 2, orientation: Orientation::Fwd, locus: 2 },
            RefStep { v_id: 4, orientation: Orientation::Fwd, locus: 3 },
        ]);
        refs.get_ref_mut(rid).set_length(3);
        g.add_all_refs(refs);

        let mut pvst = Pvst::new();
        pvst.add_node(
            Family::Flubble,
            RouteParams {
                left_endpoint: Step::new(1, Orientation::Fwd),
                right_endpoint: Step::new(4, Orientation::Fwd),
                route: Route::S2e,
            },
            ROOT,
        );
        pvst.compute_heights();
        (g, pvst)
    }

    #[test]
    fn snp_bubble_yields_one_sub_record_at_pos_2() {
        let (g, pvst) = snp_bubble_with_ref();
        let rov = Rov {
            pvst_idx: 1,
            walks: vec![
                vec![Step::new(1, Orientation::Fwd), Step::new(2, Orientation::Fwd), Step::new(4, Orientation::Fwd)],
                vec![Step::new(1, Orientation::Fwd), Step::new(3, Orientation::Fwd), Step::new(4, Orientation::Fwd)],
            ],
            cycles: vec![Vec::new(), Vec::new()],
            sorted_vertices: vec![1, 2, 3, 4],
            flanks: vec![],
        };
        let dm = build_depth_matrix(&rov.sorted_vertices, &rov.walks);
        let layout = g.gen_genotype_metadata();
        let mut warnings = Vec::new();
        let rec = synth_record(&rov, &g, &dm, &pvst, 0, &layout, &mut warnings).unwrap();
        assert_eq!(rec.pos, 2);
        assert_eq!(rec.ref_allele, "C");
        assert_eq!(rec.alts.len(), 1);
        assert_eq!(rec.alts[0].seq, "G");
        assert_eq!(rec.variant_type, VariantType::Sub);
        let an = rec.ref_haps.len() + rec.alts.iter().map(|a| a.haps.len()).sum::<usize>();
        assert_eq!(an, 1);
    }
}
