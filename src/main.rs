use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use borehole_align::analysis::detrend::parse_optional_trend;
use borehole_align::data::{loader, writer};
use borehole_align::{AlignConfig, Borehole};

/// Resample the logs of one file onto a common domain.
#[derive(Parser, Debug)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None)]
struct Cli {
    /// Log file to read (.csv, .json or .parquet)
    input: PathBuf,

    /// JSON alignment config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the aligned matrix here as CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Column holding the sample positions
    #[arg(long)]
    domain_key: Option<String>,

    /// Signal columns to align (comma separated); default is all columns
    #[arg(short = 'k', long = "signals", value_delimiter = ',')]
    signal_keys: Vec<String>,

    /// Number of samples on the shared domain
    #[arg(short, long)]
    nsamples: Option<usize>,

    /// Domain bounds of the shared grid
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    bounds: Option<Vec<f64>>,

    /// Standardise every column to zero mean and unit variance
    #[arg(long)]
    normalize: bool,

    /// Trend to remove from each log: none, mean, linear, quadratic, cubic
    #[arg(long)]
    detrend: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<(AlignConfig, PathBuf, Option<PathBuf>)> {
        let mut cfg = match &self.config {
            Some(path) => AlignConfig::from_path(path)?,
            None => AlignConfig::default(),
        };

        if let Some(key) = self.domain_key {
            cfg.domain_key = key;
        }
        if !self.signal_keys.is_empty() {
            cfg.signal_keys = self.signal_keys;
        }
        if self.nsamples.is_some() {
            cfg.nsamples = self.nsamples;
        }
        if let Some(bounds) = self.bounds {
            let &[min, max] = bounds.as_slice() else {
                bail!("--bounds takes exactly two values");
            };
            cfg.domain_bounds = Some((min, max).try_into()?);
        }
        if self.normalize {
            cfg.normalize = true;
        }
        if let Some(name) = self.detrend {
            cfg.detrend = parse_optional_trend(&name).map_err(anyhow::Error::msg)?;
        }
        Ok((cfg, self.input, self.output))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (cfg, input, output) = Cli::parse().into_config()?;

    let mut borehole = Borehole::new();
    loader::add_file(&mut borehole, &input, &cfg.domain_key, &cfg.signal_keys, &cfg.labels)?;
    borehole
        .resample(&cfg.resample_options())
        .context("aligning datasets")?;

    match output {
        Some(path) => {
            writer::write_aligned_csv(&borehole, &cfg.domain_key, &path)?;
            info!("Wrote aligned data to {}", path.display());
        }
        None => {
            let props = borehole
                .sampler_properties()
                .context("borehole was not resampled")?;
            println!(
                "{} datasets aligned onto {} samples over {}",
                borehole.len(),
                props.nsamples,
                props.domain_bounds
            );
            for (key, label) in borehole.get_keys().iter().zip(borehole.get_labels(&[])?) {
                println!("  {key}: {label}");
            }
        }
    }
    Ok(())
}
