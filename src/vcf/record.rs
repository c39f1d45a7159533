//! A single VCF record and VCFv4.2 header/text rendering (spec.md §3.10,
//! §4.10, §6.4), grounded on
//! `original_source/include/povu/genomics/vcf.hpp`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Utc;

use crate::graph::bidirected::GenotypeLayout;
use crate::graph::refs::Refs;
use crate::overlay::VariantType;

pub const QUAL: &str = "60";
pub const FILTER: &str = "PASS";

/// One ALT allele: its rendered DNA and the hap (ref) ids that carry it.
#[derive(Debug, Clone)]
pub struct AltAllele {
    pub seq: String,
    pub haps: BTreeSet<u32>,
    pub traversal: String,
}

#[derive(Debug, Clone)]
pub struct VcfRecord {
    pub chrom: String,
    pub pos: u32,
    pub var_id: String,
    pub enclosing_flubble: String,
    pub ref_allele: String,
    pub ref_traversal: String,
    pub ref_haps: BTreeSet<u32>,
    pub alts: Vec<AltAllele>,
    /// PVST depth of the originating node (spec.md §3.10 "height").
    pub depth: u32,
    pub variant_type: VariantType,
    pub tangled: bool,
    /// `[column][row]` genotype cells, `.` where no hap is placed.
    pub genotypes: Vec<Vec<String>>,
}

impl VcfRecord {
    fn an(&self) -> u32 {
        self.ref_haps.len() as u32 + self.alts.iter().map(|a| a.haps.len() as u32).sum::<u32>()
    }

    fn ns(&self, refs: &Refs) -> u32 {
        let mut samples: BTreeSet<&str> = BTreeSet::new();
        for &id in self.ref_haps.iter().chain(self.alts.iter().flat_map(|a| a.haps.iter())) {
            samples.insert(refs.get_ref(id).get_sample_name());
        }
        samples.len() as u32
    }

    /// Renders one tab-separated VCFv4.2 data line (spec.md §3.10, §6.4).
    pub fn render(&self, refs: &Refs, layout: &GenotypeLayout) -> String {
        let an = self.an();
        let ac = self
            .alts
            .iter()
            .map(|a| a.haps.len().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let af = self
            .alts
            .iter()
            .map(|a| {
                let f = if an == 0 { 0.0 } else { a.haps.len() as f64 / an as f64 };
                format!("{:.4}", f)
            })
            .collect::<Vec<_>>()
            .join(",");
        let at = std::iter::once(self.ref_traversal.clone())
            .chain(self.alts.iter().map(|a| a.traversal.clone()))
            .collect::<Vec<_>>()
            .join(",");
        let alt_col = self
            .alts
            .iter()
            .map(|a| a.seq.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let info = format!(
            "AC={};AF={};AN={};NS={};AT={};VARTYPE={};TANGLED={};LV={}",
            ac,
            af,
            an,
            self.ns(refs),
            at,
            self.variant_type.as_str(),
            if self.tangled { "T" } else { "F" },
            self.depth.saturating_sub(1),
        );

        let mut fields = vec![
            self.chrom.clone(),
            self.pos.to_string(),
            self.var_id.clone(),
            self.ref_allele.clone(),
            alt_col,
            QUAL.to_string(),
            FILTER.to_string(),
            info,
            "GT".to_string(),
        ];

        for (col, rows) in self.genotypes.iter().enumerate() {
            let rows_in_col = layout.rows_per_column.get(col).copied().unwrap_or(rows.len());
            for row in 0..rows_in_col {
                fields.push(rows.get(row).cloned().unwrap_or_else(|| ".".to_string()));
            }
        }

        fields.join("\t")
    }
}

/// Writes the VCFv4.2 header, including one `##contig` line per reference
/// and the `#CHROM` column line (spec.md §6.4).
pub fn write_header<W: fmt::Write>(refs: &Refs, layout: &GenotypeLayout, out: &mut W) -> fmt::Result {
    writeln!(out, "##fileformat=VCFv4.2")?;
    writeln!(out, "##fileDate={}", Utc::now().format("%Y%m%d"))?;
    writeln!(out, "##source=povu")?;
    writeln!(out, "##INFO=<ID=AC,Number=A,Type=Integer,Description=\"Allele count in haplotypes\">")?;
    writeln!(out, "##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency\">")?;
    writeln!(out, "##INFO=<ID=AN,Number=1,Type=Integer,Description=\"Total haplotypes with data\">")?;
    writeln!(out, "##INFO=<ID=NS,Number=1,Type=Integer,Description=\"Number of samples with data\">")?;
    writeln!(out, "##INFO=<ID=AT,Number=R,Type=String,Description=\"Allele traversal through the graph\">")?;
    writeln!(out, "##INFO=<ID=VARTYPE,Number=1,Type=String,Description=\"Variant type: INS, DEL, SUB or INV\">")?;
    writeln!(out, "##INFO=<ID=TANGLED,Number=1,Type=Character,Description=\"T if some haplotype visits the region more than once\">")?;
    writeln!(out, "##INFO=<ID=LV,Number=1,Type=Integer,Description=\"PVST depth minus one\">")?;
    writeln!(out, "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">")?;
    for r in refs.iter() {
        writeln!(out, "##contig=<ID={},length={}>", r.tag(), r.get_length())?;
    }
    let mut header_cols = vec![
        "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
    ]
    .into_iter()
    .map(String::from)
    .collect::<Vec<_>>();
    header_cols.extend(layout.samples.iter().cloned());
    writeln!(out, "{}", header_cols.join("\t"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::refs::{Ref, Refs};

    fn refs_with_one() -> Refs {
        let mut refs = Refs::new();
        refs.add_ref("R#0#chr1", crate::graph::refs::PANSN_DELIM);
        let r: &mut Ref = refs.get_ref_mut(0);
        r.set_length(10);
        refs
    }

    #[test]
    fn renders_minimal_snp_record() {
        let refs = refs_with_one();
        let layout = GenotypeLayout {
            samples: vec!["R".to_string()],
            ref_cell: [(0u32, (0usize, 0usize))].into_iter().collect(),
            rows_per_column: vec![1],
        };
        let rec = VcfRecord {
            chrom: "R#0#chr1".to_string(),
            pos: 2,
            var_id: "F>1>4".to_string(),
            enclosing_flubble: "F>1>4".to_string(),
            ref_allele: "C".to_string(),
            ref_traversal: ">1>2>4".to_string(),
            ref_haps: [0u32].into_iter().collect(),
            alts: vec![],
            depth: 1,
            variant_type: VariantType::Sub,
            tangled: false,
            genotypes: vec![vec!["0".to_string()]],
        };
        let line = rec.render(&refs, &layout);
        assert!(line.starts_with("R#0#chr1\t2\tF>1>4\tC\t\t60\tPASS\t"));
        assert!(line.contains("VARTYPE=SUB"));
        assert!(line.contains("AN=1"));
    }
}
