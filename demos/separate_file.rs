//! Example: Separate a single audio file
//!
//! Usage:
//!   cargo run --release --example separate_file -- [--json] [-k N] [--iter N] [--sr HZ] [--seed N] <file>
//!
//! Prints the processing summary, quality flags and timing.

use sound_separator::{assess, separate_file, SeparationConfig};
use std::env;
use std::path::PathBuf;

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    value
        .ok_or_else(|| format!("{} needs a value", flag))?
        .parse()
        .map_err(|_| format!("invalid value for {}", flag))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut json = false;
    let mut config = SeparationConfig::default();
    let mut path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "-k" | "--components" => config.n_components = parse_value(&arg, args.next())?,
            "--iter" => config.max_iterations = parse_value(&arg, args.next())?,
            "--sr" => config.sample_rate = parse_value(&arg, args.next())?,
            "--seed" => config.seed = parse_value(&arg, args.next())?,
            _ if path.is_none() => path = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument: {}", arg).into()),
        }
    }

    let path = path.ok_or("usage: separate_file [--json] [-k N] [--iter N] [--sr HZ] [--seed N] <file>")?;

    let result = separate_file(&path, &config, None)?;
    let quality = assess(&result);

    if json {
        let report = serde_json::json!({
            "results": result.summary,
            "quality": quality,
            "metadata": result.metadata,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &result.summary;
    println!("Separation Results:");
    println!("  Duration: {:.2}s at {} Hz", summary.duration, summary.sample_rate);
    println!("  W: {:?}, H: {:?}, D: {:?}", summary.w_shape, summary.h_shape, summary.d_shape);
    println!(
        "  Cluster 0: {} frames, cluster 1: {} frames (ratio {:.3})",
        summary.cluster_0_count, summary.cluster_1_count, summary.cluster_ratio
    );
    println!(
        "  Relative reconstruction error: {:.4}",
        quality.relative_reconstruction_error
    );
    if !quality.flags.is_empty() {
        println!("  Flags: {:?}", quality.flags);
    }
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
