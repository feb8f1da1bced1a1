use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_VIDEO_PATH: &str = "stub://cabin_camera";
const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;
const DEFAULT_STUB_DURATION_MS: u64 = 30_000;
const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
struct CabinwatchConfigFile {
    video: Option<VideoConfigFile>,
    detection: Option<DetectionConfigFile>,
    summary: Option<SummaryConfigFile>,
    results: Option<ResultsConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct VideoConfigFile {
    path: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    stub_duration_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    confidence_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct SummaryConfigFile {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ResultsConfigFile {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CabinwatchConfig {
    pub video: VideoSettings,
    pub detection: DetectionSettings,
    pub summary: SummarySettings,
    pub results: ResultsSettings,
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub stub_duration_ms: u64,
    pub tick_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SummarySettings {
    /// Cloud summary endpoint; `None` disables the cloud summarizer and the
    /// local report is used directly.
    pub api_url: Option<String>,
    /// API key, taken from the environment only.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ResultsSettings {
    /// Results backend endpoint; `None` disables submission.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl CabinwatchConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CABINWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CabinwatchConfigFile) -> Self {
        let video = VideoSettings {
            path: file
                .video
                .as_ref()
                .and_then(|video| video.path.clone())
                .unwrap_or_else(|| DEFAULT_VIDEO_PATH.to_string()),
            width: file
                .video
                .as_ref()
                .and_then(|video| video.width)
                .unwrap_or(DEFAULT_FRAME_WIDTH),
            height: file
                .video
                .as_ref()
                .and_then(|video| video.height)
                .unwrap_or(DEFAULT_FRAME_HEIGHT),
            stub_duration_ms: file
                .video
                .as_ref()
                .and_then(|video| video.stub_duration_ms)
                .unwrap_or(DEFAULT_STUB_DURATION_MS),
            tick_interval: Duration::from_millis(
                file.video
                    .as_ref()
                    .and_then(|video| video.tick_interval_ms)
                    .unwrap_or(DEFAULT_TICK_INTERVAL_MS),
            ),
        };
        let detection = DetectionSettings {
            confidence_threshold: file
                .detection
                .as_ref()
                .and_then(|detection| detection.confidence_threshold)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            iou_threshold: file
                .detection
                .as_ref()
                .and_then(|detection| detection.iou_threshold)
                .unwrap_or(DEFAULT_IOU_THRESHOLD),
            model_path: file.detection.and_then(|detection| detection.model_path),
        };
        let summary = SummarySettings {
            api_url: file.summary.as_ref().and_then(|summary| summary.api_url.clone()),
            api_key: None,
            timeout: Duration::from_secs(
                file.summary
                    .and_then(|summary| summary.timeout_secs)
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        };
        let results = ResultsSettings {
            endpoint: file
                .results
                .as_ref()
                .and_then(|results| results.endpoint.clone()),
            timeout: Duration::from_secs(
                file.results
                    .and_then(|results| results.timeout_secs)
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        };
        Self {
            video,
            detection,
            summary,
            results,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CABINWATCH_VIDEO") {
            if !path.trim().is_empty() {
                self.video.path = path;
            }
        }
        if let Ok(interval) = std::env::var("CABINWATCH_TICK_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|_| {
                anyhow!("CABINWATCH_TICK_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.video.tick_interval = Duration::from_millis(millis);
        }
        if let Ok(threshold) = std::env::var("CABINWATCH_CONFIDENCE_THRESHOLD") {
            self.detection.confidence_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("CABINWATCH_CONFIDENCE_THRESHOLD must be a number"))?;
        }
        if let Ok(threshold) = std::env::var("CABINWATCH_IOU_THRESHOLD") {
            self.detection.iou_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("CABINWATCH_IOU_THRESHOLD must be a number"))?;
        }
        if let Ok(model) = std::env::var("CABINWATCH_MODEL") {
            if !model.trim().is_empty() {
                self.detection.model_path = Some(PathBuf::from(model));
            }
        }
        if let Ok(url) = std::env::var("CABINWATCH_SUMMARY_API_URL") {
            if !url.trim().is_empty() {
                self.summary.api_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("CABINWATCH_SUMMARY_API_KEY") {
            if !key.trim().is_empty() {
                self.summary.api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var("CABINWATCH_RESULTS_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.results.endpoint = Some(endpoint);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.video.path.trim().is_empty() {
            return Err(anyhow!("video path must not be empty"));
        }
        if self.video.width == 0 || self.video.height == 0 {
            return Err(anyhow!("frame dimensions must be greater than zero"));
        }
        if self.video.tick_interval.is_zero() {
            return Err(anyhow!("tick interval must be greater than zero"));
        }
        for (name, value) in [
            ("confidence_threshold", self.detection.confidence_threshold),
            ("iou_threshold", self.detection.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within [0, 1]", name));
            }
        }
        if self.summary.api_url.is_some() && self.summary.api_key.is_none() {
            return Err(anyhow!(
                "summary api_url is set but CABINWATCH_SUMMARY_API_KEY is not"
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CabinwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
