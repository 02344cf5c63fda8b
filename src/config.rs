use std::env;

use anyhow::{Result, bail};

const DEFAULT_FOOTBALL_API_BASE: &str = "https://v3.football.api-sports.io";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API-Football key. Absent means the local catalog fallback is used.
    pub football_api_key: Option<String>,
    pub football_api_base: String,
    /// Gemini key. Required; startup fails without it.
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let football_api_key = opt_env("FOOTBALL_API_KEY");
        let Some(gemini_api_key) = opt_env("GEMINI_API_KEY") else {
            bail!("GEMINI_API_KEY is not set; add it to .env or the environment");
        };

        Ok(Self {
            football_api_key,
            football_api_base: opt_env("FOOTBALL_API_BASE")
                .unwrap_or_else(|| DEFAULT_FOOTBALL_API_BASE.to_string()),
            gemini_api_key,
            gemini_api_base: opt_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_model: opt_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
