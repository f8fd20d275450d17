// LLM prompts for resume scoring.

use crate::documents::{truncate_chars, MAX_PROMPT_CHARS};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for resume scoring.
pub fn scoring_system() -> String {
    format!(
        "You are an experienced technical recruiter who evaluates how well a \
         candidate's resume matches a job description. {JSON_ONLY_SYSTEM}"
    )
}

/// Builds the scoring prompt from the first `MAX_PROMPT_CHARS` characters of
/// the job description and the resume.
pub fn build_scoring_prompt(jd_text: &str, resume_text: &str) -> String {
    format!(
        r#"You are an expert recruiter. Compare the candidate's resume with the job description.

JOB DESCRIPTION:
{jd}

RESUME:
{resume}

Return ONLY a JSON object with these keys:
{{"score": <integer from 0 to 100>, "reason": "<one or two short sentences>"}}

A score of 100 means a perfect match; 0 means no relevant overlap."#,
        jd = truncate_chars(jd_text, MAX_PROMPT_CHARS),
        resume = truncate_chars(resume_text, MAX_PROMPT_CHARS),
    )
}
