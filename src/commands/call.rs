//! `call`: PVST forest + GFA → VCF (spec.md §4.10, §5). The producer chunks
//! RoVs and fans each chunk out to the pool; a dedicated writer thread pops
//! finished chunks off a bounded queue and owns the output stream for one
//! reference, preserving record order within each chunk.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use indicatif::ProgressBar;
use structopt::StructOpt;

use crate::concurrent::{BoundedQueue, ThreadPool};
use crate::error::{PovuError, Result};
use crate::graph::refs::Refs;
use crate::graph::GenotypeLayout;
use crate::pvst::Pvst;
use crate::variation::{process_rovs, DepthMatrix, Rov};
use crate::vcf::{synth_record, write_header, VcfRecord};

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_QUEUE_LENGTH: usize = 4;

#[derive(StructOpt, Debug)]
pub struct CallArgs {
    #[structopt(short = "i", long = "input-gfa", parse(from_os_str))]
    pub input_gfa: PathBuf,

    #[structopt(short = "f", long = "forest-dir", parse(from_os_str))]
    pub forest_dir: PathBuf,

    #[structopt(short = "o", long = "output-dir", parse(from_os_str))]
    pub output_dir: Option<PathBuf>,

    #[structopt(long = "stdout")]
    pub stdout: bool,

    #[structopt(short = "c", long = "chunk-size", default_value = "100")]
    pub chunk_size: usize,

    #[structopt(short = "q", long = "queue-length", default_value = "4")]
    pub queue_length: usize,

    #[structopt(short = "r", long = "prefix-list", parse(from_os_str))]
    pub prefix_list: Option<PathBuf>,

    #[structopt(short = "P", long = "path-prefix")]
    pub path_prefix: Vec<String>,

    #[structopt(name = "refs")]
    pub refs: Vec<String>,
}

/// One pending RoV, paired with the forest member it came from (`synth_record`
/// needs that PVST for `var_id`/`enclosing_flubble`/`depth`).
type Work = (Rov, DepthMatrix, usize);

fn gather_work(forest: &[Pvst], graph: &crate::graph::VariationGraph) -> (Vec<Work>, Vec<crate::error::PovuWarning>) {
    let mut warnings = Vec::new();
    let mut work = Vec::new();
    for (fi, pvst) in forest.iter().enumerate() {
        for (rov, dm) in process_rovs(pvst, graph, &mut warnings) {
            work.push((rov, dm, fi));
        }
    }
    (work, warnings)
}

/// Runs the producer/consumer pipeline for a single reference and returns
/// its rendered VCF text (header included).
fn call_one_ref(
    pool: &ThreadPool,
    work: &Arc<Vec<Work>>,
    forest: &Arc<Vec<Pvst>>,
    graph: &Arc<crate::graph::VariationGraph>,
    layout: &Arc<GenotypeLayout>,
    ref_id: u32,
    chunk_size: usize,
    queue_length: usize,
    bar: &ProgressBar,
) -> Result<String> {
    let queue: Arc<BoundedQueue<Vec<VcfRecord>>> = Arc::new(BoundedQueue::new(queue_length.max(1)));

    let writer_refs: Refs = graph.refs().clone();
    let writer_layout = Arc::clone(layout);
    let writer_queue = Arc::clone(&queue);
    let writer = thread::spawn(move || -> Result<String> {
        let mut out = String::new();
        write_header(&writer_refs, &writer_layout, &mut out).map_err(|e| PovuError::InvariantViolation {
            subsystem: "vcf::record".into(),
            message: e.to_string(),
        })?;
        while let Some(batch) = writer_queue.pop() {
            for rec in &batch {
                out.push_str(&rec.render(&writer_refs, &writer_layout));
                out.push('\n');
            }
        }
        Ok(out)
    });

    let chunk_size = chunk_size.max(1);
    let handles: Vec<_> = work
        .chunks(chunk_size)
        .map(|chunk| {
            let chunk: Vec<Work> = chunk.to_vec();
            let forest = Arc::clone(forest);
            let graph = Arc::clone(graph);
            let layout = Arc::clone(layout);
            pool.submit(move || {
                let mut warnings = Vec::new();
                chunk
                    .iter()
                    .filter_map(|(rov, dm, fi)| {
                        synth_record(rov, &graph, dm, &forest[*fi], ref_id, &layout, &mut warnings)
                    })
                    .collect::<Vec<VcfRecord>>()
            })
        })
        .collect();

    for handle in handles {
        let records = handle.wait();
        bar.inc(1);
        if !records.is_empty() && !queue.push(records) {
            break;
        }
    }
    queue.close();

    writer.join().map_err(|_| PovuError::Transient("vcf writer thread panicked".into()))?
}

pub fn call(args: &CallArgs, threads: usize, progress: bool) -> Result<()> {
    if args.output_dir.is_some() == args.stdout {
        return Err(PovuError::Input(
            "call requires exactly one of --output-dir or --stdout".into(),
        ));
    }

    let graph = Arc::new(super::load_graph(&args.input_gfa)?);
    let forest = Arc::new(super::load_forest(&args.forest_dir)?);
    let prefixes = super::resolve_ref_source(&args.prefix_list, &args.path_prefix, &args.refs)?;
    let target_ids = super::matching_ref_ids(&graph, &prefixes);
    if target_ids.is_empty() {
        return Err(PovuError::Input(
            "no reference matched the requested prefixes/tags".into(),
        ));
    }

    let (work, warnings) = gather_work(&forest, &graph);
    for w in &warnings {
        log::warn!("{}", w);
    }
    let work = Arc::new(work);
    let layout = Arc::new(graph.gen_genotype_metadata());
    let pool = ThreadPool::new(threads);

    let chunk_size = args.chunk_size.max(1);
    let chunks_per_ref = (work.len() + chunk_size - 1) / chunk_size;
    let bar = crate::util::progress_bar(chunks_per_ref * target_ids.len(), progress);

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(PovuError::Io)?;
        for &ref_id in &target_ids {
            let tag = graph.refs().get_ref(ref_id).tag();
            let text = call_one_ref(&pool, &work, &forest, &graph, &layout, ref_id, args.chunk_size, args.queue_length, &bar)?;
            let path = dir.join(format!("{}.vcf", tag.replace(crate::graph::refs::PANSN_DELIM, "_")));
            fs::write(&path, text).map_err(PovuError::Io)?;
            log::info!("wrote {}", path.display());
        }
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        for (i, &ref_id) in target_ids.iter().enumerate() {
            let text = call_one_ref(&pool, &work, &forest, &graph, &layout, ref_id, args.chunk_size, args.queue_length, &bar)?;
            let body = if i == 0 {
                text
            } else {
                // every ref's text carries its own header; only the first is kept.
                text.lines().skip_while(|l| l.starts_with('#')).collect::<Vec<_>>().join("\n") + "\n"
            };
            handle.write_all(body.as_bytes()).map_err(PovuError::Io)?;
        }
    }

    bar.finish_and_clear();
    pool.shutdown();
    Ok(())
}
