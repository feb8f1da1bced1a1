//! Summary generation: cloud service with deterministic local fallback.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use super::{local_summary, SummaryOrigin};
use crate::session::SessionSummary;

/// Summary service collaborator: turns a formatted statistics block into a
/// natural-language report, or fails.
pub trait SummaryService {
    fn summarize(&self, stats_text: &str) -> Result<String>;
}

/// Cloud language-model summarizer.
///
/// Posts a generateContent-style request and extracts the first candidate's
/// text. Any transport, status or shape problem is an error; the caller
/// substitutes the local report.
pub struct CloudSummarizer {
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl CloudSummarizer {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            api_url,
            api_key,
            timeout,
        }
    }

    fn request_body(stats_text: &str) -> serde_json::Value {
        let prompt = format!(
            "As an automotive AI assistant, analyze this interior camera \
             detection data and provide a professional summary for engineers \
             and safety researchers.\n\n{}\n\nPlease provide:\n\
             1. Executive Summary (2-3 sentences)\n\
             2. Key Detection Insights\n\
             3. Safety and Behavioral Observations\n\
             4. Recommendations for Interior Safety Systems",
            stats_text
        );
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 1024,
            }
        })
    }

    fn extract_text(response: &serde_json::Value) -> Result<String> {
        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("summary response carried no text candidate"))
    }
}

impl SummaryService for CloudSummarizer {
    fn summarize(&self, stats_text: &str) -> Result<String> {
        let url = format!("{}?key={}", self.api_url, self.api_key);
        let response: serde_json::Value = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(Self::request_body(stats_text))
            .context("summary service request failed")?
            .into_json()
            .context("summary service returned unreadable JSON")?;
        Self::extract_text(&response)
    }
}

/// Generate the session report, preferring the cloud service.
///
/// A missing or failing service degrades to the deterministic local report;
/// the returned [`SummaryOrigin`] tells the caller which one the user is
/// looking at. The cloud failure is logged, not propagated.
pub fn summarize_with_fallback(
    service: Option<&dyn SummaryService>,
    stats_text: &str,
    summary: &SessionSummary,
    video_duration_ms: u64,
    generated_epoch_s: u64,
) -> (String, SummaryOrigin) {
    if let Some(service) = service {
        match service.summarize(stats_text) {
            Ok(text) => return (text, SummaryOrigin::Cloud),
            Err(err) => {
                log::warn!("summary service failed, using local report: {}", err);
            }
        }
    }
    (
        local_summary(summary, video_duration_ms, generated_epoch_s),
        SummaryOrigin::Local,
    )
}
