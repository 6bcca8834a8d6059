use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{http_client, BROWSER_USER_AGENT};
use crate::model::League;
use crate::source::{FetchError, RawRecord, Source};

const FOTMOB_SEASON_STATS_URL: &str = "https://www.fotmob.com/api/leagueseasonstats";

/// Pause between successive requests against the same upstream.
/// A courtesy, not a retry mechanism.
const DEFAULT_COURTESY_DELAY: Duration = Duration::from_millis(1500);

fn fotmob_league_id(league: League) -> u32 {
    match league {
        League::SuperLig => 71,
        League::Bundesliga => 54,
        League::Premier => 47,
        League::Saudi => 536,
    }
}

/// Detailed-statistics provider: goals, assists, xG, passing, defensive work
/// and keeper numbers per player. Outranks rating-only sources for technical
/// metrics.
pub struct FotmobSource {
    courtesy_delay: Duration,
}

impl FotmobSource {
    pub fn new() -> Self {
        Self {
            courtesy_delay: DEFAULT_COURTESY_DELAY,
        }
    }

    pub fn with_courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }
}

impl Default for FotmobSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for FotmobSource {
    fn id(&self) -> &str {
        "fotmob"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn fetch(&self, league: League) -> Result<Vec<RawRecord>, FetchError> {
        let client = http_client().map_err(|err| FetchError::Network(err.to_string()))?;
        let league_id = fotmob_league_id(league);

        let mut records = fetch_rows(
            client,
            &format!("{FOTMOB_SEASON_STATS_URL}?id={league_id}&type=players"),
        )?;

        thread::sleep(self.courtesy_delay);

        // Keeper rows live behind a second request. Outfield data alone is
        // still a usable contribution, so a keeper-page hiccup is tolerated.
        if let Ok(keepers) = fetch_rows(
            client,
            &format!("{FOTMOB_SEASON_STATS_URL}?id={league_id}&type=keepers"),
        ) {
            records.extend(keepers);
        }

        Ok(records)
    }
}

fn fetch_rows(client: &Client, url: &str) -> Result<Vec<RawRecord>, FetchError> {
    let resp = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .map_err(classify_transport_error)?;
    let status = resp.status();
    let body = resp.text().map_err(classify_transport_error)?;
    if !status.is_success() {
        return Err(FetchError::Network(format!("http {status}")));
    }
    parse_player_rows_json(&body)
}

fn classify_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    players: Vec<PlayerRow>,
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    name: Option<String>,
    #[serde(rename = "teamName")]
    team_name: Option<String>,
    role: Option<String>,
    #[serde(default)]
    stats: HashMap<String, Value>,
}

/// Pure parse step, fixture-testable without a network. An empty or `null`
/// body is an empty page, not an error.
pub fn parse_player_rows_json(raw: &str) -> Result<Vec<RawRecord>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: StatsResponse = serde_json::from_str(trimmed)
        .map_err(|err| FetchError::Parse(format!("invalid fotmob stats json: {err}")))?;

    let mut records = Vec::with_capacity(data.players.len());
    for row in data.players {
        let mut record = RawRecord::new();
        if let Some(name) = row.name {
            record.insert("name".to_string(), name);
        }
        if let Some(team) = row.team_name {
            record.insert("team_name".to_string(), team);
        }
        if let Some(role) = row.role {
            record.insert("role".to_string(), role);
        }
        for (key, value) in row.stats {
            if let Some(text) = stat_value_text(&value) {
                record.insert(key, text);
            }
        }
        records.push(record);
    }
    Ok(records)
}

fn stat_value_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
