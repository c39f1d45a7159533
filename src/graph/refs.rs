//! References / haplotypes (spec.md §3.2), grounded on
//! `original_source/include/refs/refs.hpp`.

use std::collections::BTreeSet;

use super::bidirected::{Orientation, Step};

pub const PANSN_DELIM: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefFormat {
    PanSn,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanSn {
    pub sample: String,
    pub hap: u32,
    pub contig: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTag {
    Undefined(String),
    PanSn(PanSn),
}

/// A step of a reference walk, with its genomic locus (spec.md §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefStep {
    pub v_id: u32,
    pub orientation: Orientation,
    pub locus: u32,
}

impl RefStep {
    pub fn step(&self) -> Step {
        Step::new(self.v_id, self.orientation)
    }
}

/// Splits `tag` on `#`. Returns `Some` only for exactly three non-empty
/// parts.
fn split3(tag: &str, delim: char) -> Option<[&str; 3]> {
    let parts: Vec<&str> = tag.split(delim).collect();
    if parts.len() != 3 {
        return None;
    }
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some([parts[0], parts[1], parts[2]])
}

fn parse_pansn(tag: &str, delim: char) -> Option<PanSn> {
    let [sample, hap, contig] = split3(tag, delim)?;
    if hap.is_empty() || !hap.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hap_id: u32 = hap.parse().ok()?;
    Some(PanSn {
        sample: sample.to_string(),
        hap: hap_id,
        contig: contig.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct Ref {
    id: u32,
    tag: RefTag,
    format: RefFormat,
    len: u32,
    walk: Vec<RefStep>,
}

impl Ref {
    pub fn parse(id: u32, tag: &str, delim: char) -> Self {
        let (format, rtag) = match parse_pansn(tag, delim) {
            Some(p) => (RefFormat::PanSn, RefTag::PanSn(p)),
            None => (RefFormat::Undefined, RefTag::Undefined(tag.to_string())),
        };
        Self {
            id,
            tag: rtag,
            format,
            len: 0,
            walk: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn get_format(&self) -> RefFormat {
        self.format
    }

    pub fn tag(&self) -> String {
        match &self.tag {
            RefTag::Undefined(s) => s.clone(),
            RefTag::PanSn(p) => format!("{}{}{}{}{}", p.sample, PANSN_DELIM, p.hap, PANSN_DELIM, p.contig),
        }
    }

    pub fn get_sample_name(&self) -> &str {
        match &self.tag {
            RefTag::Undefined(s) => s.as_str(),
            RefTag::PanSn(p) => p.sample.as_str(),
        }
    }

    pub fn hap_or_zero(&self) -> u32 {
        match &self.tag {
            RefTag::Undefined(_) => 0,
            RefTag::PanSn(p) => p.hap,
        }
    }

    pub fn set_walk(&mut self, walk: Vec<RefStep>) {
        self.walk = walk;
    }

    pub fn walk(&self) -> &[RefStep] {
        &self.walk
    }

    /// Length of the ref's walk: locus after the last step (sum of label
    /// lengths along the walk), per spec.md §3.2.
    pub fn get_length(&self) -> u32 {
        self.len
    }

    pub fn set_length(&mut self, len: u32) {
        self.len = len;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Refs {
    refs: Vec<Ref>,
}

impl Refs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            refs: Vec::with_capacity(n),
        }
    }

    pub fn add_ref(&mut self, tag: &str, delim: char) -> u32 {
        let id = self.refs.len() as u32;
        self.refs.push(Ref::parse(id, tag, delim));
        id
    }

    pub fn get_ref(&self, ref_id: u32) -> &Ref {
        &self.refs[ref_id as usize]
    }

    pub fn get_ref_mut(&mut self, ref_id: u32) -> &mut Ref {
        &mut self.refs[ref_id as usize]
    }

    pub fn get_ref_id(&self, tag: &str) -> Option<u32> {
        self.refs.iter().find(|r| r.tag() == tag).map(|r| r.id())
    }

    pub fn ref_count(&self) -> u32 {
        self.refs.len() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ref> {
        self.refs.iter()
    }

    fn is_prefix(prefix: &str, s: &str) -> bool {
        s.starts_with(prefix)
    }

    /// Refs sharing a sample name. For PanSN: same sample; for undefined:
    /// strict prefix match of the tag against `sample_name` (spec.md §3.2).
    pub fn get_refs_in_sample(&self, sample_name: &str) -> BTreeSet<u32> {
        self.refs
            .iter()
            .filter(|r| match r.get_format() {
                RefFormat::PanSn => r.get_sample_name() == sample_name,
                RefFormat::Undefined => Self::is_prefix(sample_name, r.get_sample_name()),
            })
            .map(|r| r.id())
            .collect()
    }

    pub fn get_shared_samples(&self, ref_id: u32) -> BTreeSet<u32> {
        let sample = self.get_ref(ref_id).get_sample_name().to_string();
        self.get_refs_in_sample(&sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pansn_tag_round_trips() {
        let r = Ref::parse(0, "HG002#1#chr1", PANSN_DELIM);
        assert_eq!(r.get_format(), RefFormat::PanSn);
        assert_eq!(r.tag(), "HG002#1#chr1");
        assert_eq!(r.get_sample_name(), "HG002");
        assert_eq!(r.hap_or_zero(), 1);
    }

    #[test]
    fn non_digit_haplotype_falls_back_to_undefined() {
        let r = Ref::parse(0, "HG002#a#chr1", PANSN_DELIM);
        assert_eq!(r.get_format(), RefFormat::Undefined);
        assert_eq!(r.tag(), "HG002#a#chr1");
    }

    #[test]
    fn opaque_tag_is_undefined() {
        let r = Ref::parse(0, "just_a_name", PANSN_DELIM);
        assert_eq!(r.get_format(), RefFormat::Undefined);
        assert_eq!(r.get_sample_name(), "just_a_name");
    }

    #[test]
    fn too_many_parts_is_undefined() {
        let r = Ref::parse(0, "a#b#c#d", PANSN_DELIM);
        assert_eq!(r.get_format(), RefFormat::Undefined);
    }

    #[test]
    fn shared_sample_pansn() {
        let mut refs = Refs::new();
        refs.add_ref("HG002#1#chr1", PANSN_DELIM);
        refs.add_ref("HG002#2#chr1", PANSN_DELIM);
        refs.add_ref("HG003#1#chr1", PANSN_DELIM);
        let shared = refs.get_shared_samples(0);
        assert_eq!(shared, [0, 1].into_iter().collect());
    }

    #[test]
    fn shared_sample_undefined_is_prefix() {
        let mut refs = Refs::new();
        refs.add_ref("sample_chr1", PANSN_DELIM);
        refs.add_ref("sample_chr2", PANSN_DELIM);
        refs.add_ref("other_chr1", PANSN_DELIM);
        let shared = refs.get_refs_in_sample("sample");
        assert_eq!(shared, [0, 1].into_iter().collect());
    }
}
