use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use eegtrial::{io::write_dataset, logging, ConditionProfile, PipelineConfig, TrialDataset};

#[derive(Parser)]
#[command(name = "preproc", about = "Extract and condition labelled EEG trials")]
struct Args {
    /// Root directory holding one subdirectory per session
    #[arg(long)]
    root: PathBuf,

    /// Electrode montage: AK-SREP, CTK-SREP, AK-SRES or CTK-SRES
    #[arg(long, default_value = "AK-SREP")]
    class_type: String,

    /// Task family: reading or response
    #[arg(long, default_value = "reading")]
    trial_type: String,

    /// dataset.safetensors output path
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON pipeline configuration (missing keys use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the trial length in samples
    #[arg(long)]
    target_samples: Option<usize>,

    /// Reject ICA components whose |excess kurtosis| exceeds this value
    #[arg(long)]
    reject_kurtosis: Option<f64>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    // Resolve tags and configuration before touching any recording.
    let profile = ConditionProfile::from_tags(&args.class_type, &args.trial_type)?;
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(n) = args.target_samples {
        cfg.target_samples = n;
    }
    if args.reject_kurtosis.is_some() {
        cfg.ica.reject_kurtosis = args.reject_kurtosis;
    }
    cfg.validate()?;

    let dataset = TrialDataset::build(&args.root, &profile, &cfg)
        .with_context(|| format!("building dataset from {}", args.root.display()))?;
    println!("Produced {} trials ({} start markers skipped)",
        dataset.len(), dataset.skipped().len());

    write_dataset(&dataset, &args.output)?;
    println!("Written → {}", args.output.display());

    Ok(())
}
