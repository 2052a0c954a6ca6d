use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::DatasetConfig;
use crate::constants::inspect::DEFAULT_BASE_DIR;
use crate::inspect::{inspect_version, verify_version};
use crate::pipeline::BuildPipeline;

#[derive(Debug, Parser)]
#[command(
    name = "build_dataset",
    disable_help_subcommand = true,
    about = "Build a versioned, sharded dataset",
    long_about = "Clean, filter, and shard a raw corpus into <base_dir>/<dataset_name>/<version>, writing content-hashed shards, manifest.txt, manifest.json, and metadata.json."
)]
struct BuildDatasetCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Path to dataset config YAML (e.g. configs/dataset-v1.0.yaml)"
    )]
    config: PathBuf,
}

#[derive(Debug, Parser)]
#[command(
    name = "inspect_version",
    disable_help_subcommand = true,
    about = "Inspect a built dataset version",
    long_about = "Print a version's metadata and one randomly sampled record, optionally re-hashing every shard against the manifest."
)]
struct InspectVersionCli {
    #[arg(
        long = "base-dir",
        alias = "base_dir",
        value_name = "DIR",
        default_value = DEFAULT_BASE_DIR,
        help = "Base directory for dataset versions"
    )]
    base_dir: PathBuf,
    #[arg(long, help = "Version to inspect, e.g. v1.0.0")]
    version: String,
    #[arg(long, help = "Optional deterministic seed for sampling")]
    seed: Option<u64>,
    #[arg(long, help = "Re-hash every shard and compare with the manifest")]
    verify: bool,
}

/// Entry point for `build_dataset`.
pub fn run_build_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<BuildDatasetCli, _>(
        std::iter::once("build_dataset".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = DatasetConfig::load(&cli.config)?;
    println!(
        "Building dataset '{}' version {}",
        config.output.dataset_name, config.version
    );
    println!("Output directory: {}", config.version_dir().display());

    let outcome = BuildPipeline::new(config)?.run_configured()?;
    let meta = &outcome.metadata;
    println!(
        "Kept {} / {} examples after filtering",
        meta.num_examples, meta.num_raw_examples
    );
    println!("Wrote {} shards", meta.num_shards);
    println!("Done!");
    println!("Metadata: {}", outcome.metadata_path.display());
    println!("Manifest: {}", outcome.manifest_paths.text.display());
    Ok(())
}

/// Entry point for `inspect_version`; report text goes to `out`.
pub fn run_inspect_version<I, W>(args_iter: I, out: &mut W) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let Some(cli) = parse_cli::<InspectVersionCli, _>(
        std::iter::once("inspect_version".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    inspect_version(&cli.base_dir, &cli.version, &mut rng, out)?;

    if cli.verify {
        let report = verify_version(&cli.base_dir.join(&cli.version))?;
        writeln!(out, "\n=== VERIFY ===")?;
        writeln!(out, "checked: {}", report.checked)?;
        for file in &report.missing {
            writeln!(out, "missing: {file}")?;
        }
        for file in &report.mismatched {
            writeln!(out, "sha256 mismatch: {file}")?;
        }
        writeln!(out, "counts consistent: {}", report.counts_consistent)?;
        if !report.is_ok() {
            return Err("version failed integrity verification".into());
        }
    }
    Ok(())
}

/// `run_inspect_version` writing to stdout.
pub fn run_inspect_version_stdout<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_inspect_version(args_iter, &mut out)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
