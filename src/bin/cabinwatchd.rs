//! cabinwatchd - cabin occupancy analytics daemon
//!
//! This daemon:
//! 1. Samples frames from the configured video source on a playback-driven
//!    cadence (nominal 100 ms; slow ticks coalesce, they never queue)
//! 2. Runs person detection (ONNX backend when configured, synthetic
//!    fallback otherwise)
//! 3. Publishes immutable detection snapshots to the overlay consumer
//! 4. Aggregates the per-session detection history
//! 5. Generates the end-of-session report (cloud summary, local fallback)
//! 6. Submits the session record to the results backend (single attempt)

use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use cabinwatch::report::{self, summarizer};
use cabinwatch::{
    CabinwatchConfig, DetectionOrigin, DetectionPipeline, FileConfig, FileSource,
    SessionAggregator, SessionSummary, Thresholds, TickDetections,
};

/// Immutable per-tick update handed to the overlay consumer.
struct OverlayUpdate {
    position_ms: u64,
    tick: TickDetections,
    frame_width: f32,
    frame_height: f32,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Video source path (overrides the configured one).
    #[arg(long)]
    video: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = CabinwatchConfig::load()?;
    if let Some(video) = args.video {
        config.video.path = video;
    }

    let mut source = FileSource::new(FileConfig {
        path: config.video.path.clone(),
        width: config.video.width,
        height: config.video.height,
        stub_duration_ms: config.video.stub_duration_ms,
    })?;
    source.connect()?;
    let duration_ms = source.duration_ms();
    if duration_ms == 0 {
        return Err(anyhow!(
            "video source '{}' reports zero duration",
            config.video.path
        ));
    }

    let pipeline = build_pipeline(&config)?;
    let with_backend = pipeline.has_backend();
    let mut aggregator = SessionAggregator::new(pipeline);
    aggregator.reset();

    log::info!(
        "cabinwatchd running. source={} duration={} backend={}",
        config.video.path,
        cabinwatch::format_position(duration_ms),
        if with_backend { "model" } else { "synthetic" }
    );

    // Overlay consumer: single receiver of immutable snapshot copies. The
    // sampling loop keeps sole ownership of the live state.
    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayUpdate>();
    let overlay = std::thread::spawn(move || {
        for update in overlay_rx {
            log_overlay(&update);
        }
    });

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })?;

    let session_started_epoch_s = now_s();
    let session_id = report::session_id(&config.video.path, session_started_epoch_s);
    let playback_started = Instant::now();
    let tick_interval = config.video.tick_interval;
    let mut last_health_log = Instant::now();
    let mut ticks_sampled = 0u64;
    let mut ticks_skipped = 0u64;

    loop {
        if stop.load(Ordering::SeqCst) {
            log::info!("stop requested, ending session");
            break;
        }

        // The playback clock decides the position: a slow tick simply means
        // the next sample lands later, with no backlog of pending ticks.
        let position_ms = playback_started.elapsed().as_millis() as u64;
        if position_ms >= duration_ms {
            log::info!("playback complete at {}", cabinwatch::format_position(duration_ms));
            break;
        }

        let frame = match source.frame_at(position_ms) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("frame extraction failed at {} ms: {}", position_ms, err);
                None
            }
        };

        match frame {
            Some(frame) => {
                if let Some(tick) = aggregator.on_tick(position_ms, Some(&frame)) {
                    ticks_sampled += 1;
                    let _ = overlay_tx.send(OverlayUpdate {
                        position_ms,
                        tick,
                        frame_width: frame.width as f32,
                        frame_height: frame.height as f32,
                    });
                }
            }
            None => {
                ticks_skipped += 1;
                log::debug!("no frame at {} ms, tick skipped", position_ms);
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} sampled={} skipped={} history={}",
                source.is_healthy(),
                stats.frames_served,
                ticks_sampled,
                ticks_skipped,
                aggregator.history().len()
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(tick_interval);
    }

    drop(overlay_tx);
    if overlay.join().is_err() {
        log::warn!("overlay consumer thread panicked");
    }

    // Sampling has stopped; the history is stable from here on.
    let summary = aggregator.summarize();
    log::info!(
        "session {}: {} snapshots, peak occupancy {}, mean confidence {:.2}",
        session_id,
        summary.snapshot_count,
        summary.peak_occupancy,
        summary.mean_confidence
    );

    // Reporting runs on its own thread; a panic there is reported, never
    // propagated into the exit path.
    let reporting = std::thread::spawn(move || {
        report_session(&config, &summary, duration_ms, &session_id);
    });
    if reporting.join().is_err() {
        log::error!("reporting thread panicked; session results were not submitted");
    }

    Ok(())
}

fn build_pipeline(config: &CabinwatchConfig) -> Result<DetectionPipeline> {
    let thresholds = Thresholds {
        confidence: config.detection.confidence_threshold,
        iou: config.detection.iou_threshold,
    };
    let pipeline = DetectionPipeline::new(thresholds);

    match config.detection.model_path.as_deref() {
        #[cfg(feature = "backend-tract")]
        Some(model_path) => {
            // The detector consumes frames at the source geometry.
            let backend = cabinwatch::detect::TractBackend::new(
                model_path,
                config.video.width,
                config.video.height,
            )?;
            Ok(pipeline.with_backend(Box::new(backend)))
        }
        #[cfg(not(feature = "backend-tract"))]
        Some(_) => {
            log::warn!(
                "model_path configured but cabinwatch was built without backend-tract; \
                 using synthetic detections"
            );
            Ok(pipeline)
        }
        None => Ok(pipeline),
    }
}

fn log_overlay(update: &OverlayUpdate) {
    let origin = match update.tick.origin {
        DetectionOrigin::Model => "model",
        DetectionOrigin::Synthetic(_) => "synthetic",
    };
    let boxes: Vec<String> = update
        .tick
        .detections
        .iter()
        .map(|detection| {
            let bounds = detection
                .bounds
                .clamp_to(update.frame_width, update.frame_height);
            format!(
                "{} {:.0}% ({:.0},{:.0},{:.0},{:.0})",
                detection.label,
                detection.confidence * 100.0,
                bounds.left,
                bounds.top,
                bounds.right,
                bounds.bottom
            )
        })
        .collect();
    log::debug!(
        "overlay {} [{}] {} occupants: {}",
        cabinwatch::format_position(update.position_ms),
        origin,
        update.tick.detections.len(),
        boxes.join("; ")
    );
}

fn report_session(
    config: &CabinwatchConfig,
    summary: &SessionSummary,
    duration_ms: u64,
    session_id: &str,
) {
    let stats_text = report::session_stats_text(
        summary,
        duration_ms,
        config.video.tick_interval.as_millis() as u64,
        config.detection.confidence_threshold,
    );

    let cloud = match (&config.summary.api_url, &config.summary.api_key) {
        (Some(url), Some(key)) => Some(summarizer::CloudSummarizer::new(
            url.clone(),
            key.clone(),
            config.summary.timeout,
        )),
        _ => None,
    };
    let completed_at = now_s();
    let (summary_text, origin) = report::summarize_with_fallback(
        cloud
            .as_ref()
            .map(|service| service as &dyn cabinwatch::SummaryService),
        &stats_text,
        summary,
        duration_ms,
        completed_at,
    );
    log::info!("session report ({}):\n{}", origin.as_str(), summary_text);

    let Some(endpoint) = config.results.endpoint.clone() else {
        log::info!("no results endpoint configured, skipping submission");
        return;
    };

    let record = report::SessionRecord {
        session_id: session_id.to_string(),
        completed_at_epoch_s: completed_at,
        device: report::DeviceInfo::current(),
        video_duration_s: duration_ms / 1000,
        analysis: summary.clone(),
        summary_origin: origin,
        summary_text,
    };
    let client = report::ResultsClient::new(endpoint, config.results.timeout);
    match client.submit(&record) {
        Ok(()) => log::info!("session {} logged to results backend", record.session_id),
        // One attempt per session; the on-device analysis stands either way.
        Err(err) => log::warn!("results backend submission failed: {}", err),
    }
}

fn now_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
