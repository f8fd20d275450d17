//! Scorer: asks the chat model how well one resume matches the job description.
//!
//! Every call yields a tagged `ScoreOutcome`. `ScoreReport::into_result`
//! turns failures into zero-score results so one bad resume cannot abort a
//! ranking run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::documents::DocumentError;
use crate::llm_client::{ChatModel, LlmError};
use crate::ranking::json_block::extract_json_block;
use crate::ranking::prompts::{build_scoring_prompt, scoring_system};

pub const MAX_SCORE: u8 = 100;

/// One row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub name: String,
    pub score: u8,
    pub reason: String,
}

/// The parsed model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ScoreFailure {
    #[error("could not extract JSON from model output")]
    NoJsonBlock,

    #[error("invalid JSON from model")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid JSON from model")]
    InvalidScore(String),

    #[error("model error: {0}")]
    Model(#[from] LlmError),

    #[error("could not read resume: {0}")]
    Document(#[from] DocumentError),
}

pub type ScoreOutcome = Result<Verdict, ScoreFailure>;

/// Outcome of scoring one resume, plus the raw model output when debugging.
#[derive(Debug)]
pub struct ScoreReport {
    pub outcome: ScoreOutcome,
    pub raw_output: Option<String>,
}

impl ScoreReport {
    pub fn failed(failure: ScoreFailure) -> Self {
        Self {
            outcome: Err(failure),
            raw_output: None,
        }
    }

    /// Converts the outcome into a display row; failures score zero and
    /// carry the failure message as the reason.
    pub fn into_result(self, name: impl Into<String>) -> ScoreResult {
        let (score, reason) = match self.outcome {
            Ok(verdict) => (verdict.score, verdict.reason),
            Err(failure) => (0, failure.to_string()),
        };
        ScoreResult {
            name: name.into(),
            score,
            reason,
        }
    }
}

pub struct Scorer {
    model: Arc<dyn ChatModel>,
}

impl Scorer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Scores one resume against the job description. Never fails; errors
    /// are reported in the returned outcome.
    pub async fn score(&self, jd_text: &str, resume_text: &str, debug: bool) -> ScoreReport {
        let prompt = build_scoring_prompt(jd_text, resume_text);

        let raw = match self.model.complete(&prompt, &scoring_system()).await {
            Ok(raw) => raw,
            Err(e) => return ScoreReport::failed(ScoreFailure::Model(e)),
        };
        debug!("Raw model output ({} chars): {raw}", raw.len());

        ScoreReport {
            outcome: parse_model_output(&raw),
            raw_output: debug.then_some(raw),
        }
    }
}

/// Extracts and parses the `{score, reason}` object from raw model output.
pub fn parse_model_output(raw: &str) -> ScoreOutcome {
    let block = extract_json_block(raw).ok_or(ScoreFailure::NoJsonBlock)?;
    let value: Value = serde_json::from_str(block).map_err(ScoreFailure::InvalidJson)?;

    let score = match value.get("score") {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ScoreFailure::InvalidScore(n.to_string()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ScoreFailure::InvalidScore(s.clone()))?,
        Some(other) => return Err(ScoreFailure::InvalidScore(other.to_string())),
    };
    if !score.is_finite() {
        return Err(ScoreFailure::InvalidScore(score.to_string()));
    }

    let reason = match value.get("reason") {
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(Verdict {
        score: score.round().clamp(0.0, MAX_SCORE as f64) as u8,
        reason,
    })
}
