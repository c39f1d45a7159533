//! VCF record synthesis and serialization (spec.md §3.10, §4.10, §6.4).

pub mod record;
pub mod synth;

pub use record::{write_header, AltAllele, VcfRecord, FILTER, QUAL};
pub use synth::synth_record;
