//! End-to-end scenarios (spec.md §8 property 13): build a graph through the
//! public API, run it through decomposition and record synthesis exactly as
//! the `decompose`/`call` subcommands do, and check the documented outputs.

use povu::graph::bidirected::{Orientation, Step, VariationGraph, VEnd};
use povu::graph::refs::{RefStep, Refs};
use povu::graph::SpanningTree;
use povu::overlay::VariantType;
use povu::pvst::flubble::find_flubbles;
use povu::pvst::{Family, Pvst, Route, RouteParams, ROOT};
use povu::variation::process_rovs;
use povu::vcf::{synth_record, write_header};

/// A single-flubble PVST spanning `(left_id, right_id)`, built directly
/// (the same shortcut `vcf::synth`'s own tests use) rather than through
/// `find_flubbles`, for topologies the flubble finder isn't exercised on
/// elsewhere in this suite.
fn single_flubble_pvst(left_id: u32, right_id: u32) -> Pvst {
    let mut pvst = Pvst::new();
    pvst.add_node(
        Family::Flubble,
        RouteParams {
            left_endpoint: Step::new(left_id, Orientation::Fwd),
            right_endpoint: Step::new(right_id, Orientation::Fwd),
            route: Route::S2e,
        },
        ROOT,
    );
    pvst.compute_heights();
    pvst
}

/// a. Empty graph: no components to decompose, and a VCF with headers only.
#[test]
fn empty_graph_has_no_components_and_header_only_vcf() {
    let g = VariationGraph::new();
    assert!(g.componetize().is_empty());

    let layout = g.gen_genotype_metadata();
    let mut out = String::new();
    write_header(g.refs(), &layout, &mut out).unwrap();
    assert!(out.contains("##fileformat=VCFv4.2"));
    assert!(out.contains("#CHROM"));
    assert_eq!(out.lines().filter(|l| !l.starts_with('#')).count(), 0);
}

/// Builds `1->2->3`, one ref `R#0#chr` walking straight through.
fn linear_graph() -> VariationGraph {
    let mut g = VariationGraph::new();
    let i1 = g.add_vertex(1, "A");
    let i2 = g.add_vertex(2, "C");
    let i3 = g.add_vertex(3, "G");
    g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
    g.add_edge(i2, VEnd::R, i3, VEnd::L).unwrap();
    g.recompute_tips();

    let mut refs = Refs::new();
    let rid = refs.add_ref("R#0#chr", '#');
    refs.get_ref_mut(rid).set_walk(vec![
        RefStep { v_id: 1, orientation: Orientation::Fwd, locus: 1 },
        RefStep { v_id: 2, orientation: Orientation::Fwd, locus: 2 },
        RefStep { v_id: 3, orientation: Orientation::Fwd, locus: 3 },
    ]);
    refs.get_ref_mut(rid).set_length(3);
    g.add_all_refs(refs);
    g
}

/// b. Linear graph on one ref: no flubbles, zero records.
#[test]
fn linear_graph_yields_no_flubbles_and_no_records() {
    let g = linear_graph();
    let trunk: Vec<Step> = g.refs().get_ref(0).walk().iter().map(|s| s.step()).collect();
    let st = SpanningTree::build(&g, Some(&trunk)).unwrap();
    let pvst = find_flubbles(&g, &st, Some(&trunk));
    assert_eq!(pvst.nodes.len(), 1);

    let mut warnings = Vec::new();
    let rovs = process_rovs(&pvst, &g, &mut warnings);
    assert!(rovs.is_empty());
}

/// `1:A, 2:C, 3:G, 4:T`, edges `1-2, 1-3, 2-4, 3-4`, ref `R` walking `1>2>4`.
fn snp_bubble() -> VariationGraph {
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
    g
}

/// c. Simple SNP bubble: one flubble `(>1, >4)`, one SUB record.
#[test]
fn snp_bubble_yields_one_flubble_and_one_sub_record() {
    let g = snp_bubble();
    let trunk: Vec<Step> = g.refs().get_ref(0).walk().iter().map(|s| s.step()).collect();
    let st = SpanningTree::build(&g, Some(&trunk)).unwrap();
    let pvst = find_flubbles(&g, &st, Some(&trunk));

    assert_eq!(pvst.nodes.len(), 2);
    let rp = pvst.nodes[1].route_params.unwrap();
    assert_eq!(rp.left_endpoint.v_id, 1);
    assert_eq!(rp.right_endpoint.v_id, 4);

    let mut warnings = Vec::new();
    let rovs = process_rovs(&pvst, &g, &mut warnings);
    assert_eq!(rovs.len(), 1);

    let layout = g.gen_genotype_metadata();
    let (rov, dm) = &rovs[0];
    let rec = synth_record(rov, &g, dm, &pvst, 0, &layout, &mut warnings).unwrap();

    assert_eq!(rec.pos, 2);
    assert_eq!(rec.ref_allele, "C");
    assert_eq!(rec.variant_type, VariantType::Sub);
    assert_eq!(rec.alts.len(), 1);
    assert_eq!(rec.alts[0].seq, "G");
    assert_eq!(rec.ref_haps.len(), 1);
    assert_eq!(rec.alts[0].haps.len(), 1);

    let refs = g.refs().clone();
    let mut out = String::new();
    write_header(&refs, &layout, &mut out).unwrap();
    out.push_str(&rec.render(&refs, &layout));
    assert!(out.contains("VARTYPE=SUB"));
    assert!(out.contains("AN=1"));
    assert!(out.contains("AC=1"));
    assert!(out.contains("AF=1.0000"));
}

/// d. Deletion: same diamond plus a direct `1-4` edge and a second ref `R2`
/// taking that edge — relative to the trunk ref `R` (whose own interior is
/// `[vertex2]`), `R2`'s empty interior is the shorter allele, so `call`
/// emits a DEL record anchored at `POS=1`.
#[test]
fn direct_edge_ref_yields_deletion_record_at_pos_1() {
    let mut g = snp_bubble();
    let i1 = g.v_id_to_idx(1).unwrap();
    let i4 = g.v_id_to_idx(4).unwrap();
    g.add_edge(i1, VEnd::R, i4, VEnd::L).unwrap();
    g.recompute_tips();

    let r2 = g.refs_mut().add_ref("R2#0#chr", '#');
    g.refs_mut().get_ref_mut(r2).set_walk(vec![
        RefStep { v_id: 1, orientation: Orientation::Fwd, locus: 1 },
        RefStep { v_id: 4, orientation: Orientation::Fwd, locus: 2 },
    ]);
    g.refs_mut().get_ref_mut(r2).set_length(2);

    let trunk: Vec<Step> = g.refs().get_ref(0).walk().iter().map(|s| s.step()).collect();
    let st = SpanningTree::build(&g, Some(&trunk)).unwrap();
    let pvst = find_flubbles(&g, &st, Some(&trunk));

    let mut warnings = Vec::new();
    let rovs = process_rovs(&pvst, &g, &mut warnings);
    assert_eq!(rovs.len(), 1);

    let layout = g.gen_genotype_metadata();
    let (rov, dm) = &rovs[0];
    let rec = synth_record(rov, &g, dm, &pvst, 0, &layout, &mut warnings).unwrap();

    assert_eq!(rec.pos, 1);
    assert_eq!(rec.variant_type, VariantType::Del);
    assert_eq!(rec.ref_allele.chars().next().unwrap(), 'A');
    assert_eq!(rec.alts.len(), 1);
    assert!(rec.alts[0].haps.contains(&r2));
}

/// e. Inversion: `R1=>1>2>3>4`, `R2=>1<2>3>4` — one `VARTYPE=INV` record,
/// not tangled.
#[test]
fn inverted_second_ref_yields_inv_record() {
    let mut g = VariationGraph::new();
    let i1 = g.add_vertex(1, "A");
    let i2 = g.add_vertex(2, "CC");
    let i3 = g.add_vertex(3, "G");
    let i4 = g.add_vertex(4, "T");
    g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
    g.add_edge(i1, VEnd::R, i2, VEnd::R).unwrap();
    g.add_edge(i2, VEnd::R, i3, VEnd::L).unwrap();
    g.add_edge(i2, VEnd::L, i3, VEnd::L).unwrap();
    g.add_edge(i3, VEnd::R, i4, VEnd::L).unwrap();
    g.recompute_tips();

    let mut refs = Refs::new();
    let r1 = refs.add_ref("R1#0#chr", '#');
    refs.get_ref_mut(r1).set_walk(vec![
        RefStep { v_id: 1, orientation: Orientation::Fwd, locus: 1 },
        RefStep { v_id: 2, orientation: Orientation::Fwd, locus: 2 },
        RefStep { v_id: 3, orientation: Orientation::Fwd, locus: 4 },
        RefStep { v_id: 4, orientation: Orientation::Fwd, locus: 5 },
    ]);
    refs.get_ref_mut(r1).set_length(6);
    let r2 = refs.add_ref("R2#0#chr", '#');
    refs.get_ref_mut(r2).set_walk(vec![
        RefStep { v_id: 1, orientation: Orientation::Fwd, locus: 1 },
        RefStep { v_id: 2, orientation: Orientation::Rev, locus: 2 },
        RefStep { v_id: 3, orientation: Orientation::Fwd, locus: 4 },
        RefStep { v_id: 4, orientation: Orientation::Fwd, locus: 5 },
    ]);
    refs.get_ref_mut(r2).set_length(6);
    g.add_all_refs(refs);

    let pvst = single_flubble_pvst(1, 4);

    let mut warnings = Vec::new();
    let rovs = process_rovs(&pvst, &g, &mut warnings);
    assert_eq!(rovs.len(), 1);

    let layout = g.gen_genotype_metadata();
    let (rov, dm) = &rovs[0];
    let rec = synth_record(rov, &g, dm, &pvst, r1, &layout, &mut warnings).unwrap();

    assert_eq!(rec.variant_type, VariantType::Inv);
    assert!(!rec.tangled);
    let refs = g.refs().clone();
    let line = rec.render(&refs, &layout);
    assert!(line.contains("VARTYPE=INV"));
    assert!(line.contains("TANGLED=F"));
}

/// f. Tangled RoV: the reference loops back through the bubble a second
/// time; the depth matrix flags the column as multi-visit and the rendered
/// record carries `TANGLED=T`.
#[test]
fn looping_ref_yields_tangled_record() {
    let g = snp_bubble();
    let pvst = single_flubble_pvst(1, 4);

    let mut warnings = Vec::new();
    let (rov, _) = process_rovs(&pvst, &g, &mut warnings).into_iter().next().unwrap();

    // Re-run the depth matrix with the ref walking the whole bubble twice,
    // re-entering the source vertex (a column the sort always puts first).
    use povu::variation::build_depth_matrix;
    let looping_walk = vec![
        Step::new(1, Orientation::Fwd),
        Step::new(2, Orientation::Fwd),
        Step::new(4, Orientation::Fwd),
        Step::new(1, Orientation::Fwd),
        Step::new(3, Orientation::Fwd),
        Step::new(4, Orientation::Fwd),
    ];
    let walks = vec![looping_walk];
    let dm = build_depth_matrix(&rov.sorted_vertices, &walks);
    assert!(dm.tangled);

    let layout = g.gen_genotype_metadata();
    let rec = synth_record(&rov, &g, &dm, &pvst, 0, &layout, &mut warnings).unwrap();
    assert!(rec.tangled);
    let refs = g.refs().clone();
    assert!(rec.render(&refs, &layout).contains("TANGLED=T"));
}
