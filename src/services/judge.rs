// src/services/judge.rs

//! Language-model scoring of a candidate answer against a reference answer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::JudgeConfig;

pub const MALFORMED_OUTPUT: &str = "Malformed model output";

const SCORING_SYSTEM_PROMPT: &str = "You are an impartial technical examiner. \
Given a reference answer and a candidate's answer, return a JSON object with:\n\
{\"score\": <0-100 integer>, \"justification\": \"<one short sentence>\"}.\n\
Score on semantic correctness, coverage of key points, and clarity; be strict but fair. \
If the candidate answer is empty or unrelated, score near 0.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeScore {
    pub score: i32,
    pub justification: String,
}

impl JudgeScore {
    pub fn malformed() -> Self {
        Self {
            score: 0,
            justification: MALFORMED_OUTPUT.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// No credential configured. Fatal for a finish that needs judging.
    #[error("scoring judge is not configured")]
    Unavailable,

    #[error("judge request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("judge returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed judge output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ScoringJudge: Send + Sync {
    async fn score(&self, reference: &str, candidate: &str) -> Result<JudgeScore, JudgeError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiJudge {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl OpenAiJudge {
    pub fn new(config: &JudgeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ScoringJudge for OpenAiJudge {
    async fn score(&self, reference: &str, candidate: &str) -> Result<JudgeScore, JudgeError> {
        let api_key = self.api_key.as_deref().ok_or(JudgeError::Unavailable)?;

        let prompt = format!(
            "Reference answer:\n{}\n\nCandidate answer:\n{}\n\nRespond ONLY with the JSON.",
            reference, candidate
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SCORING_SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.0
        });

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(JudgeError::Status { status, body });
        }

        let body: JsonValue = res.json().await?;

        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| JudgeError::Malformed("response has no message content".to_string()))?;

        parse_judge_output(content)
    }
}

/// Parses the model's JSON reply into a clamped score.
///
/// Accepts integer, float (truncated) or numeric-string scores. A missing
/// score counts as 0. An explicit null, or anything that is not a JSON
/// object, is malformed.
pub fn parse_judge_output(text: &str) -> Result<JudgeScore, JudgeError> {
    let value: JsonValue = serde_json::from_str(text.trim())
        .map_err(|e| JudgeError::Malformed(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| JudgeError::Malformed("expected a JSON object".to_string()))?;

    let score = match object.get("score") {
        None => 0,
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| JudgeError::Malformed(format!("score {} is not a number", n)))?,
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| JudgeError::Malformed(format!("score '{}' is not an integer", s)))?,
        Some(other) => {
            return Err(JudgeError::Malformed(format!("unexpected score {}", other)));
        }
    };

    let justification = match object.get("justification") {
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(JudgeScore {
        score: clamp_score(score),
        justification,
    })
}

pub fn clamp_score(score: i64) -> i32 {
    score.clamp(0, 100) as i32
}
