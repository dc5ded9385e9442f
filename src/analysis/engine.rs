use crate::config::AnalysisConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the engine gets to see about one finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Uploaded script, when one was captured. Currently always empty
    /// pending script storage.
    pub script_text: String,
    pub transcribed_text: String,
    pub session_metadata: SessionMetadata,
    pub realtime_metrics: RealtimeMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub title: String,
    pub theme: String,
    pub expected_duration: i64,
    pub actual_duration: i64,
}

/// Aggregated telemetry snapshot. Static defaults until per-session
/// aggregation lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMetrics {
    pub avg_volume: f64,
    pub avg_speaking_pace: f64,
    pub audience_contact_ratio: f64,
    pub page_transitions: u32,
}

impl Default for RealtimeMetrics {
    fn default() -> Self {
        Self {
            avg_volume: 0.7,
            avg_speaking_pace: 150.0,
            audience_contact_ratio: 0.0,
            page_transitions: 0,
        }
    }
}

/// Named sub-scores the core itself queries; everything else stays inside
/// the opaque payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub expression: Option<f64>,
    pub comprehension: Option<f64>,
    pub delivery: Option<f64>,
    pub engagement: Option<f64>,
}

/// Engine output: the few fields the core extracts, plus the full document.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub overall_score: Option<f64>,
    pub scores: SubScores,
    /// The engine's complete response; schema owned by the engine.
    pub payload: serde_json::Value,
}

impl AnalysisOutcome {
    /// Pull the queryable fields out of an engine document. Older engine
    /// versions nest scores under `scores` instead of `detailed_scores`.
    pub fn from_payload(payload: serde_json::Value) -> Self {
        let overall_score = payload["overall_score"]
            .as_f64()
            .or_else(|| payload["total_score"].as_f64());
        let detailed = &payload["detailed_scores"];
        let legacy = &payload["scores"];
        let scores = SubScores {
            expression: detailed["expression"]
                .as_f64()
                .or_else(|| legacy["delivery"].as_f64()),
            comprehension: detailed["comprehension"]
                .as_f64()
                .or_else(|| legacy["content"].as_f64()),
            delivery: detailed["delivery"]
                .as_f64()
                .or_else(|| legacy["delivery"].as_f64()),
            engagement: detailed["engagement"]
                .as_f64()
                .or_else(|| legacy["engagement"].as_f64()),
        };
        Self {
            overall_score,
            scores,
            payload,
        }
    }
}

/// The opaque external analysis engine. Content of the result is not this
/// crate's concern; the call may fail.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome>;
}

/// Production engine: POSTs the context to a configured HTTP endpoint.
pub struct HttpAnalysisEngine {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpAnalysisEngine {
    pub fn new(cfg: &AnalysisConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("failed to build analysis engine client")?;
        Ok(Self {
            client,
            endpoint_url: cfg.endpoint_url.clone(),
        })
    }
}

#[async_trait]
impl AnalysisEngine for HttpAnalysisEngine {
    async fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(ctx)
            .send()
            .await
            .context("analysis engine request failed")?
            .error_for_status()
            .context("analysis engine returned an error status")?;

        let payload: serde_json::Value = response
            .json()
            .await
            .context("analysis engine returned invalid JSON")?;

        Ok(AnalysisOutcome::from_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_overall_and_detailed_scores() {
        let outcome = AnalysisOutcome::from_payload(json!({
            "overall_score": 82.5,
            "detailed_scores": {
                "expression": 80.0,
                "comprehension": 85.0,
                "delivery": 78.0,
                "engagement": 88.0
            },
            "summary": "solid pacing"
        }));
        assert_eq!(outcome.overall_score, Some(82.5));
        assert_eq!(outcome.scores.comprehension, Some(85.0));
        assert_eq!(outcome.payload["summary"], "solid pacing");
    }

    #[test]
    fn falls_back_to_legacy_score_fields() {
        let outcome = AnalysisOutcome::from_payload(json!({
            "total_score": 70,
            "scores": { "content": 65.0, "delivery": 72.0, "engagement": 68.0 }
        }));
        assert_eq!(outcome.overall_score, Some(70.0));
        assert_eq!(outcome.scores.comprehension, Some(65.0));
        assert_eq!(outcome.scores.expression, Some(72.0));
    }

    #[test]
    fn missing_scores_stay_none() {
        let outcome = AnalysisOutcome::from_payload(json!({ "notes": [] }));
        assert_eq!(outcome.overall_score, None);
        assert!(outcome.scores.delivery.is_none());
    }
}
