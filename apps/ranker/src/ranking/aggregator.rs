//! Ranking Aggregator: scores a batch of resumes and sorts the results.
//!
//! Flow per resume, in upload order: read_pdf → Scorer::score → ScoreResult.
//! Only the first `MAX_RESUMES` uploads are processed.

use std::future::Future;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{read_pdf, DocumentError, Upload};
use crate::ranking::scorer::{ScoreReport, ScoreResult, Scorer};

pub const MAX_RESUMES: usize = 10;

/// Raw model output captured for one resume in debug mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOutput {
    pub name: String,
    pub output: String,
}

/// Result of one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Sorted by score, highest first; equal scores keep upload order.
    pub results: Vec<ScoreResult>,
    /// Uploads beyond `MAX_RESUMES` that were not scored.
    pub skipped: usize,
    /// Results that are zero-score fallbacks.
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_outputs: Vec<RawOutput>,
}

/// Scores up to `MAX_RESUMES` resume PDFs sequentially and returns them ranked.
pub async fn rank_resumes(
    scorer: &Scorer,
    jd_text: &str,
    resumes: Vec<Upload>,
    debug: bool,
) -> RankingRun {
    rank_with(scorer, jd_text, resumes, debug, read_pdf).await
}

/// `rank_resumes` with a caller-supplied text extractor.
pub async fn rank_with<E, Fut>(
    scorer: &Scorer,
    jd_text: &str,
    resumes: Vec<Upload>,
    debug: bool,
    extract: E,
) -> RankingRun
where
    E: Fn(Bytes) -> Fut,
    Fut: Future<Output = Result<String, DocumentError>>,
{
    let run_id = Uuid::new_v4();
    let total = resumes.len();
    let skipped = total.saturating_sub(MAX_RESUMES);
    if skipped > 0 {
        warn!("run {run_id}: {total} resumes uploaded, scoring only the first {MAX_RESUMES}");
    }
    info!(
        "run {run_id}: scoring {} resumes with {}",
        total - skipped,
        scorer.model_name()
    );

    let mut results = Vec::with_capacity(total - skipped);
    let mut raw_outputs = Vec::new();
    let mut failed = 0;

    for resume in resumes.into_iter().take(MAX_RESUMES) {
        let report = match extract(resume.bytes).await {
            Ok(text) => scorer.score(jd_text, &text, debug).await,
            Err(e) => ScoreReport::failed(e.into()),
        };

        if let Err(failure) = &report.outcome {
            failed += 1;
            warn!("run {run_id}: {} scored as fallback: {failure}", resume.name);
        }
        if let Some(output) = report.raw_output.clone() {
            raw_outputs.push(RawOutput {
                name: resume.name.clone(),
                output,
            });
        }

        let result = report.into_result(resume.name);
        info!("run {run_id}: {} → {}/100", result.name, result.score);
        results.push(result);
    }

    sort_by_score(&mut results);

    RankingRun {
        run_id,
        generated_at: Utc::now(),
        results,
        skipped,
        failed,
        raw_outputs,
    }
}

/// Highest score first; `sort_by` is stable, so ties keep encounter order.
pub fn sort_by_score(results: &mut [ScoreResult]) {
    results.sort_by(|a, b| b.score.cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::ScriptedChatModel;

    fn result(name: &str, score: u8) -> ScoreResult {
        ScoreResult {
            name: name.to_string(),
            score,
            reason: String::new(),
        }
    }

    fn text_resume(name: &str, text: &'static str) -> Upload {
        Upload::new(name, None, Bytes::from_static(text.as_bytes()))
    }

    async fn read_utf8(bytes: Bytes) -> Result<String, DocumentError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| DocumentError::InvalidPdf(e.to_string()))
    }

    fn not_a_pdf(name: &str) -> Upload {
        Upload::new(name, Some("application/pdf".to_string()), Bytes::from_static(b"garbage"))
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut results = vec![
            result("a", 40),
            result("b", 90),
            result("c", 90),
            result("d", 10),
        ];
        sort_by_score(&mut results);

        let order: Vec<(&str, u8)> = results.iter().map(|r| (r.name.as_str(), r.score)).collect();
        assert_eq!(order, vec![("b", 90), ("c", 90), ("a", 40), ("d", 10)]);
    }

    #[tokio::test]
    async fn test_results_are_ranked_by_model_score() {
        let model = Arc::new(ScriptedChatModel::texts(&[
            r#"{"score": 40, "reason": "some overlap"}"#,
            r#"{"score": 90, "reason": "first strong"}"#,
            "Sorry, I can't help with that.",
            r#"{"score": 90, "reason": "second strong"}"#,
        ]));
        let scorer = Scorer::new(model.clone());
        let resumes = vec![
            text_resume("a.pdf", "Java"),
            text_resume("b.pdf", "Python, Django"),
            text_resume("c.pdf", "Photoshop"),
            text_resume("d.pdf", "Python, FastAPI"),
        ];

        let run = rank_with(&scorer, "Python backend", resumes, true, read_utf8).await;

        let order: Vec<(&str, u8)> = run
            .results
            .iter()
            .map(|r| (r.name.as_str(), r.score))
            .collect();
        assert_eq!(
            order,
            vec![("b.pdf", 90), ("d.pdf", 90), ("a.pdf", 40), ("c.pdf", 0)]
        );
        assert_eq!(run.results[3].reason, "could not extract JSON from model output");
        assert_eq!(run.failed, 1);
        assert_eq!(run.raw_outputs.len(), 4);
        assert_eq!(run.raw_outputs[2].name, "c.pdf");
        assert_eq!(model.calls(), 4);
        assert!(model.prompts.lock().unwrap()[1].contains("Python, Django"));
    }

    #[tokio::test]
    async fn test_only_first_ten_resumes_are_processed() {
        let model = Arc::new(ScriptedChatModel::always(r#"{"score": 50, "reason": "ok"}"#));
        let scorer = Scorer::new(model.clone());
        let resumes: Vec<Upload> = (0..13)
            .map(|i| text_resume(&format!("r{i}.pdf"), "Rust"))
            .collect();

        let run = rank_with(&scorer, "jd", resumes, false, read_utf8).await;

        assert_eq!(run.results.len(), MAX_RESUMES);
        assert_eq!(model.calls(), MAX_RESUMES);
        assert_eq!(run.skipped, 3);
        assert!(run.results.iter().all(|r| r.name != "r10.pdf"));
        assert!(run.results.iter().any(|r| r.name == "r9.pdf"));
    }

    #[tokio::test]
    async fn test_unreadable_resume_is_zero_score_not_omitted() {
        let model = Arc::new(ScriptedChatModel::always(r#"{"score": 50, "reason": "ok"}"#));
        let scorer = Scorer::new(model.clone());

        let run = rank_resumes(&scorer, "jd", vec![not_a_pdf("broken.pdf")], false).await;

        assert_eq!(run.results.len(), 1);
        assert_eq!(run.results[0].score, 0);
        assert!(run.results[0].reason.starts_with("could not read resume: "));
        assert_eq!(run.failed, 1);
        assert_eq!(model.calls(), 0, "model must not be called without resume text");
    }

    #[tokio::test]
    async fn test_empty_upload_list_gives_empty_run() {
        let scorer = Scorer::new(Arc::new(ScriptedChatModel::always("{}")));
        let run = rank_resumes(&scorer, "jd", Vec::new(), true).await;

        assert!(run.results.is_empty());
        assert_eq!(run.skipped, 0);
        assert!(run.raw_outputs.is_empty());
    }

    /// Live check against the configured Azure deployment:
    /// `cargo test -- --ignored live_scoring`
    #[tokio::test]
    #[ignore]
    async fn live_scoring_separates_strong_and_weak_matches() {
        use crate::config::Config;
        use crate::llm_client::LlmClient;

        let config = Config::from_env().expect("Azure credentials in environment");
        let llm = LlmClient::new(config.chat, config.chat_temperature, config.chat_max_tokens)
            .expect("http client");
        let scorer = Scorer::new(Arc::new(llm));
        let jd = "Looking for a Python backend engineer with 3 years experience";

        let strong = scorer
            .score(jd, "5 years Python, Django, PostgreSQL", false)
            .await
            .into_result("strong");
        let weak = scorer
            .score(jd, "Graphic design, Photoshop", false)
            .await
            .into_result("weak");

        assert!(strong.score >= 70, "strong match scored {}", strong.score);
        assert!(!strong.reason.is_empty());
        assert!(weak.score <= 30, "weak match scored {}", weak.score);
    }
}
