//! Results-logging backend client.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use super::SummaryOrigin;
use crate::session::SessionSummary;

/// Host metadata attached to every session record.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceInfo {
    pub os: String,
    pub arch: String,
    pub app_version: String,
}

impl DeviceInfo {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Structured record submitted to the results backend once per session.
#[derive(Clone, Debug, Serialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub completed_at_epoch_s: u64,
    pub device: DeviceInfo,
    pub video_duration_s: u64,
    pub analysis: SessionSummary,
    pub summary_origin: SummaryOrigin,
    pub summary_text: String,
}

/// Single-attempt HTTP client for the results backend.
///
/// A failed submission is an error for the caller to report to the user; it
/// never invalidates the completed on-device analysis, and no retry happens
/// within a session.
pub struct ResultsClient {
    endpoint: String,
    timeout: Duration,
}

impl ResultsClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn submit(&self, record: &SessionRecord) -> Result<()> {
        let response = ureq::post(&self.endpoint)
            .timeout(self.timeout)
            .set("User-Agent", concat!("cabinwatch/", env!("CARGO_PKG_VERSION")))
            .send_json(record)
            .with_context(|| format!("results backend submission to {} failed", self.endpoint))?;

        log::info!(
            "results backend accepted session {} (status {})",
            record.session_id,
            response.status()
        );
        Ok(())
    }
}
