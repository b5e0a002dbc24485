/// pipeline_steps: read one recording, extract its trials, run each
/// conditioning stage and write every intermediate to a safetensors file for
/// comparison against a reference implementation.
///
/// Output keys:
///   extracted     [N, C, T]     f32  trials after pad/truncate
///   lowpass       [N, C, T]     f32  after zero-phase Butterworth
///   ref           [N, C, T]     f32  after common-average reference
///   ica           [N, C, T]     f32  after ICA decompose + rebuild
///   downsample    [N, C, T/2]   f32  after decimation
///   normalized    [N, C, T/2]   f32  after min-max
///   labels        [N]           i64  raw marker codes
///   n_trials      [1]           i32
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use eegtrial::{
    condition_steps,
    dataset::Corpus,
    extract::extract_trials,
    io::StWriter,
    logging,
    table::{CsvTableReader, TableReader},
    ConditionProfile, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "pipeline_steps")]
struct Args {
    /// Input recording (CSV, marker column last).
    #[arg(long)]
    input: PathBuf,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Electrode montage tag.
    #[arg(long, default_value = "AK-SREP")]
    class_type: String,

    /// Task family tag.
    #[arg(long, default_value = "reading")]
    trial_type: String,

    /// Trial length in samples.
    #[arg(long, default_value_t = 4000)]
    target_samples: usize,

    /// Low-pass cutoff (Hz).
    #[arg(long, default_value_t = 50.0)]
    lowpass: f64,

    /// Decimation factor.
    #[arg(long, default_value_t = 2)]
    downsample: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(false)?;

    let profile = ConditionProfile::from_tags(&args.class_type, &args.trial_type)?;
    let cfg = PipelineConfig {
        target_samples: args.target_samples,
        lowpass_hz: args.lowpass,
        downsample: args.downsample,
        ..PipelineConfig::default()
    };
    cfg.validate()?;

    // ── 1. Read + extract ──────────────────────────────────────────────────
    let t_read = now();
    let table = CsvTableReader
        .load(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let ms_read = t_read.elapsed().as_secs_f64() * 1000.0;

    let t_ex = now();
    let extraction = extract_trials(&table, &profile, cfg.target_samples)?;
    let corpus = Corpus::from_extractions(
        vec![(args.input.clone(), extraction)],
        profile.n_channels(),
        cfg.target_samples,
    )?;
    let ms_ex = t_ex.elapsed().as_secs_f64() * 1000.0;

    // ── 2. Conditioning stages ─────────────────────────────────────────────
    let t_cond = now();
    let steps = condition_steps(corpus.trials.clone(), &cfg)?;
    let ms_cond = t_cond.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "TIMING read={ms_read:.4}ms extract={ms_ex:.4}ms condition={ms_cond:.4}ms",
    );
    eprintln!(
        "  {} samples  {} trials  {} skipped",
        table.n_samples(), corpus.len(), corpus.skipped.len()
    );

    // ── 3. Write output ────────────────────────────────────────────────────
    eprintln!("Writing → {}", args.output.display());
    let n = corpus.len();
    let mut w = StWriter::new();
    w.add_f32_arr3("extracted",  corpus.trials.view());
    w.add_f32_arr3("lowpass",    steps.lowpass.view());
    w.add_f32_arr3("ref",        steps.referenced.view());
    w.add_f32_arr3("ica",        steps.ica.view());
    w.add_f32_arr3("downsample", steps.downsampled.view());
    w.add_f32_arr3("normalized", steps.normalized.view());
    w.add_i64("labels",   &corpus.labels, &[n]);
    w.add_i32("n_trials", &[n as i32],    &[1]);
    w.write(&args.output)?;

    eprintln!("Done.");
    Ok(())
}

/// Return `std::time::Instant::now()` (used for internal timing).
#[inline(always)]
fn now() -> std::time::Instant { std::time::Instant::now() }
