use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::AppConfig;
use crate::http_client::http_client;

/// Filler appended when the model supplies fewer than three key factors.
pub const KEY_FACTOR_FILLER: &str = "tactical analysis of the match";

/// One user submission: two team names, trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub home_team: String,
    pub away_team: String,
    pub home_team_logo: Option<String>,
    pub away_team_logo: Option<String>,
}

impl PredictionRequest {
    pub fn new(
        home_team: &str,
        away_team: &str,
        home_team_logo: Option<String>,
        away_team_logo: Option<String>,
    ) -> Option<Self> {
        let home_team = home_team.trim();
        let away_team = away_team.trim();
        if home_team.is_empty() || away_team.is_empty() {
            return None;
        }
        Some(Self {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_team_logo,
            away_team_logo,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Home,
    Away,
    Draw,
}

impl Winner {
    pub fn label(self) -> &'static str {
        match self {
            Winner::Home => "home",
            Winner::Away => "away",
            Winner::Draw => "draw",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    pub predicted_home: i64,
    pub predicted_away: i64,
    pub winner: Winner,
    pub probabilities: Probabilities,
    pub confidence: Confidence,
    pub key_factors: Vec<String>,
}

/// Which validation step rejected the model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing or invalid predictedScore")]
    PredictedScore,
    #[error("winner must be home, away or draw")]
    Winner,
    #[error("missing probabilities")]
    Probabilities,
    #[error("confidenceLevel must be low, medium or high")]
    ConfidenceLevel,
    #[error("keyFactors must be a non-empty list of strings")]
    KeyFactors,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("http client unavailable: {0}")]
    Client(#[source] anyhow::Error),
    #[error("prediction request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("prediction service returned http {status}: {body:.200}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model reply contained no text")]
    EmptyReply,
    #[error("model reply was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model reply rejected: {0}")]
    Invalid(#[from] FieldError),
}

/// Runs the full pipeline: prompt, single non-streaming completion call,
/// fence stripping, parse, fail-fast validation, normalization. No retries;
/// every failure surfaces once to the caller.
pub fn predict(
    config: &AppConfig,
    request: &PredictionRequest,
) -> Result<PredictionResponse, PredictError> {
    let prompt = build_prompt(request);
    let reply = generate_completion(config, &prompt)?;
    parse_prediction_reply(&reply)
}

pub fn build_prompt(request: &PredictionRequest) -> String {
    format!(
        r#"Act as an expert football analyst. Analyse the following match and provide a detailed prediction.

Home team: {home}
Away team: {away}

IMPORTANT: respond ONLY with a valid JSON object, no extra text, following EXACTLY this structure:

{{
  "predictedScore": {{
    "home": integer,
    "away": integer
  }},
  "winner": "home" | "away" | "draw",
  "probabilities": {{
    "home": number_between_0_and_100,
    "draw": number_between_0_and_100,
    "away": number_between_0_and_100
  }},
  "confidenceLevel": "low" | "medium" | "high",
  "keyFactors": [
    "factor 1",
    "factor 2",
    "factor 3"
  ]
}}

Consider: recent form, historical statistics, home advantage, squad quality, known injuries, and current context.
The probabilities must sum to 100.
Provide exactly 3 key factors."#,
        home = request.home_team,
        away = request.away_team,
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn generate_completion(config: &AppConfig, prompt: &str) -> Result<String, PredictError> {
    let client = http_client().map_err(PredictError::Client)?;
    let url = format!(
        "{base}/v1beta/models/{model}:generateContent",
        base = config.gemini_api_base,
        model = config.gemini_model,
    );

    let resp = client
        .post(&url)
        .header("x-goog-api-key", &config.gemini_api_key)
        .json(&json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        }))
        .send()?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(PredictError::Upstream { status, body });
    }

    let parsed: GenerateContentResponse = resp.json()?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PredictError::EmptyReply);
    }
    Ok(text)
}

/// Cleans, parses, validates, and normalizes a raw model reply.
pub fn parse_prediction_reply(raw: &str) -> Result<PredictionResponse, PredictError> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    let mut prediction = validate_prediction(&value)?;
    normalize_key_factors(&mut prediction.key_factors);
    normalize_probabilities(&mut prediction.probabilities);
    Ok(prediction)
}

/// The model sometimes wraps the JSON in Markdown fences despite the prompt.
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}

/// Structural validation, in the documented order, failing at the first
/// violating field. Winner/probability consistency is deliberately not
/// cross-checked, and a probability of exactly 0 counts as missing.
fn validate_prediction(value: &Value) -> Result<PredictionResponse, FieldError> {
    let score = value.get("predictedScore").ok_or(FieldError::PredictedScore)?;
    let predicted_home = score
        .get("home")
        .and_then(Value::as_f64)
        .ok_or(FieldError::PredictedScore)? as i64;
    let predicted_away = score
        .get("away")
        .and_then(Value::as_f64)
        .ok_or(FieldError::PredictedScore)? as i64;

    let winner = match value.get("winner").and_then(Value::as_str) {
        Some("home") => Winner::Home,
        Some("away") => Winner::Away,
        Some("draw") => Winner::Draw,
        _ => return Err(FieldError::Winner),
    };

    let probs = value.get("probabilities").ok_or(FieldError::Probabilities)?;
    let probabilities = Probabilities {
        home: nonzero_number(probs.get("home")).ok_or(FieldError::Probabilities)?,
        draw: nonzero_number(probs.get("draw")).ok_or(FieldError::Probabilities)?,
        away: nonzero_number(probs.get("away")).ok_or(FieldError::Probabilities)?,
    };

    let confidence = match value.get("confidenceLevel").and_then(Value::as_str) {
        Some("low") => Confidence::Low,
        Some("medium") => Confidence::Medium,
        Some("high") => Confidence::High,
        _ => return Err(FieldError::ConfidenceLevel),
    };

    let factors = value
        .get("keyFactors")
        .and_then(Value::as_array)
        .ok_or(FieldError::KeyFactors)?;
    if factors.is_empty() {
        return Err(FieldError::KeyFactors);
    }
    let key_factors = factors
        .iter()
        .map(|entry| entry.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(FieldError::KeyFactors)?;

    Ok(PredictionResponse {
        predicted_home,
        predicted_away,
        winner,
        probabilities,
        confidence,
        key_factors,
    })
}

fn nonzero_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| *v != 0.0)
}

/// Exactly three factors: truncate extras, pad with the fixed filler.
fn normalize_key_factors(factors: &mut Vec<String>) {
    factors.truncate(3);
    while factors.len() < 3 {
        factors.push(KEY_FACTOR_FILLER.to_string());
    }
}

/// Rescales H/D/A so they sum to exactly 100 whenever the raw values are
/// more than 1 away from it. `away` absorbs the rounding error.
fn normalize_probabilities(probs: &mut Probabilities) {
    let total = probs.home + probs.draw + probs.away;
    if (total - 100.0).abs() > 1.0 {
        let factor = 100.0 / total;
        probs.home = (probs.home * factor).round();
        probs.draw = (probs.draw * factor).round();
        probs.away = 100.0 - probs.home - probs.draw;
    }
}
