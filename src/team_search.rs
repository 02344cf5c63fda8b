use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::http_client::http_client;
use crate::team_cache::TeamCache;

pub const MIN_QUERY_LEN: usize = 2;

/// A football team as surfaced to the autocomplete list. `logo` is either a
/// badge URL (remote results) or an emoji glyph (local catalog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub logo: String,
    pub country: String,
}

/// Where a lookup's teams came from, so the provider can log degradations
/// without them ever surfacing as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Short,
    Cache,
    Remote,
    LocalFallback,
}

#[derive(Debug)]
pub struct LookupOutcome {
    pub teams: Vec<Team>,
    pub source: LookupSource,
    /// Remote failure that triggered the fallback, for the console log only.
    pub degraded: Option<String>,
}

pub struct TeamSearcher {
    api_key: Option<String>,
    api_base: String,
    cache: TeamCache,
}

impl TeamSearcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_key: config.football_api_key.clone(),
            api_base: config.football_api_base.clone(),
            cache: TeamCache::new(),
        }
    }

    /// Resolves a partial team name to a ranked candidate list.
    ///
    /// Never fails: any remote problem degrades to the local catalog. Only
    /// successful remote results (including empty ones) are cached, keyed by
    /// the lowercased query.
    pub fn lookup(&mut self, query: &str, now: Instant) -> LookupOutcome {
        let api_key = self.api_key.clone();
        let api_base = self.api_base.clone();
        self.lookup_with(query, now, move |q| {
            api_key
                .as_deref()
                .map(|key| fetch_remote_teams(&api_base, key, q))
        })
    }

    /// Cache-aware core of `lookup` with the remote fetch injected, so the
    /// cache precedence and write-through are testable without a live
    /// upstream. `fetch` returns `None` when no remote is configured.
    pub fn lookup_with<F>(&mut self, query: &str, now: Instant, fetch: F) -> LookupOutcome
    where
        F: FnOnce(&str) -> Option<Result<Vec<Team>>>,
    {
        if query.trim().chars().count() < MIN_QUERY_LEN {
            return LookupOutcome {
                teams: Vec::new(),
                source: LookupSource::Short,
                degraded: None,
            };
        }

        let cache_key = query.to_lowercase();
        if let Some(cached) = self.cache.get(&cache_key, now) {
            return LookupOutcome {
                teams: cached.to_vec(),
                source: LookupSource::Cache,
                degraded: None,
            };
        }

        match fetch(query) {
            Some(Ok(teams)) => {
                self.cache.put(&cache_key, teams.clone(), now);
                LookupOutcome {
                    teams,
                    source: LookupSource::Remote,
                    degraded: None,
                }
            }
            Some(Err(err)) => LookupOutcome {
                teams: local_catalog_matches(query),
                source: LookupSource::LocalFallback,
                degraded: Some(format!("{err:#}")),
            },
            None => LookupOutcome {
                teams: local_catalog_matches(query),
                source: LookupSource::LocalFallback,
                degraded: None,
            },
        }
    }

    pub fn sweep_cache(&mut self, now: Instant) {
        self.cache.sweep(now);
    }
}

fn fetch_remote_teams(api_base: &str, api_key: &str, query: &str) -> Result<Vec<Team>> {
    let client = http_client()?;
    let url = format!("{api_base}/teams");

    let resp = client
        .get(&url)
        .query(&[("search", query)])
        .header("x-rapidapi-key", api_key)
        .header("x-rapidapi-host", "v3.football.api-sports.io")
        .send()
        .context("team search request failed")?;

    let status = resp.status();
    let body = resp.text().context("failed reading team search body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}: {body}"));
    }

    parse_team_search_json(&body)
}

#[derive(Debug, Deserialize)]
struct TeamSearchResponse {
    #[serde(default)]
    response: Vec<TeamSearchItem>,
}

#[derive(Debug, Deserialize)]
struct TeamSearchItem {
    team: TeamPayload,
}

#[derive(Debug, Deserialize)]
struct TeamPayload {
    id: u32,
    name: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

pub fn parse_team_search_json(raw: &str) -> Result<Vec<Team>> {
    let parsed: TeamSearchResponse =
        serde_json::from_str(raw.trim()).context("invalid team search json")?;

    Ok(parsed
        .response
        .into_iter()
        .map(|item| Team {
            id: item.team.id,
            name: item.team.name,
            logo: item.team.logo.unwrap_or_default(),
            country: item.team.country.unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect())
}

/// Case-insensitive substring filter over the fixed catalog, catalog order.
pub fn local_catalog_matches(query: &str) -> Vec<Team> {
    let needle = query.to_lowercase();
    local_catalog()
        .into_iter()
        .filter(|team| team.name.to_lowercase().contains(&needle))
        .collect()
}

fn local_catalog() -> Vec<Team> {
    const CATALOG: [(u32, &str, &str, &str); 12] = [
        (1, "Real Madrid", "⚪", "🇪🇸 Spain"),
        (2, "Barcelona", "🔵", "🇪🇸 Spain"),
        (3, "Manchester City", "🔵", "🏴󠁧󠁢󠁥󠁮󠁧󠁿 England"),
        (4, "Liverpool", "🔴", "🏴󠁧󠁢󠁥󠁮󠁧󠁿 England"),
        (5, "Bayern Munich", "🔴", "🇩🇪 Germany"),
        (6, "PSG", "🔵", "🇫🇷 France"),
        (7, "Juventus", "⚫", "🇮🇹 Italy"),
        (8, "Inter Milan", "🔵", "🇮🇹 Italy"),
        (9, "Boca Juniors", "🔵", "🇦🇷 Argentina"),
        (10, "River Plate", "🔴", "🇦🇷 Argentina"),
        (11, "Barcelona SC", "🟡", "🇪🇨 Ecuador"),
        (12, "Flamengo", "🔴", "🇧🇷 Brazil"),
    ];

    CATALOG
        .iter()
        .map(|(id, name, logo, country)| Team {
            id: *id,
            name: (*name).to_string(),
            logo: (*logo).to_string(),
            country: (*country).to_string(),
        })
        .collect()
}
