//! demo - end-to-end synthetic session for the cabin occupancy kernel
//!
//! Runs a complete session against the stub video source with the synthetic
//! detector (no model, no network) and prints the statistics block and the
//! local report.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::time::{SystemTime, UNIX_EPOCH};

use cabinwatch::report;
use cabinwatch::{
    DetectionPipeline, FileConfig, FileSource, SessionAggregator, Thresholds,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Synthetic session length in seconds.
    #[arg(long, default_value_t = 30)]
    seconds: u64,
    /// Sampling cadence in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.seconds == 0 {
        return Err(anyhow!("seconds must be >= 1"));
    }
    if args.tick_ms == 0 {
        return Err(anyhow!("tick_ms must be >= 1"));
    }

    let duration_ms = args.seconds * 1000;

    stage("open synthetic source");
    let mut source = FileSource::new(FileConfig {
        path: "stub://demo_cabin".to_string(),
        stub_duration_ms: duration_ms,
        ..FileConfig::default()
    })?;
    source.connect()?;

    stage("sample session");
    let mut aggregator = SessionAggregator::new(DetectionPipeline::new(Thresholds::default()));
    aggregator.reset();

    let mut position_ms = 0;
    while position_ms < duration_ms {
        let frame = source.frame_at(position_ms)?;
        aggregator.on_tick(position_ms, frame.as_ref());
        position_ms += args.tick_ms;
    }

    stage("summarize");
    let summary = aggregator.summarize();
    let stats_text = report::session_stats_text(&summary, duration_ms, args.tick_ms, 0.5);
    println!("{}\n", stats_text);

    stage("render local report");
    let report_text = report::local_summary(&summary, duration_ms, now_s());
    println!("{}", report_text);

    Ok(())
}

fn stage(name: &str) {
    println!("==> {}", name);
}

fn now_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
