use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::http_client::{http_client, BROWSER_USER_AGENT};
use crate::model::League;
use crate::source::{FetchError, RawRecord, Source};

const EA_RATINGS_URL: &str = "https://drop-api.ea.com/rating/ea-sports-fc";

fn ea_league_id(league: League) -> u32 {
    match league {
        League::SuperLig => 68,
        League::Bundesliga => 19,
        League::Premier => 13,
        League::Saudi => 1122,
    }
}

/// Ratings-only provider. Supplies a single 1-99 overall rating per player;
/// everything technical comes from higher-priority sources.
pub struct EaRatingsSource;

impl Source for EaRatingsSource {
    fn id(&self) -> &str {
        "eafc"
    }

    fn priority(&self) -> u8 {
        1
    }

    fn fetch(&self, league: League) -> Result<Vec<RawRecord>, FetchError> {
        let client = http_client().map_err(|err| FetchError::Network(err.to_string()))?;
        let url = format!(
            "{EA_RATINGS_URL}?locale=en&limit=100&leagueId={}",
            ea_league_id(league)
        );
        let resp = client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    FetchError::Timeout(err.to_string())
                } else {
                    FetchError::Network(err.to_string())
                }
            })?;
        let status = resp.status();
        let body = resp.text().map_err(|err| FetchError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(FetchError::Network(format!("http {status}")));
        }
        parse_ratings_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct RatingsResponse {
    #[serde(default)]
    items: Vec<RatingItem>,
}

#[derive(Debug, Deserialize)]
struct RatingItem {
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    #[serde(rename = "overallRating")]
    overall_rating: Option<f64>,
    team: Option<LabelWrapper>,
    position: Option<ShortLabelWrapper>,
}

#[derive(Debug, Deserialize)]
struct LabelWrapper {
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShortLabelWrapper {
    #[serde(rename = "shortLabel")]
    short_label: Option<String>,
}

pub fn parse_ratings_json(raw: &str) -> Result<Vec<RawRecord>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: RatingsResponse = serde_json::from_str(trimmed)
        .map_err(|err| FetchError::Parse(format!("invalid ratings json: {err}")))?;

    let mut records = Vec::with_capacity(data.items.len());
    for item in data.items {
        let mut record = RawRecord::new();
        let name = [item.first_name, item.last_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            record.insert("player".to_string(), name);
        }
        if let Some(club) = item.team.and_then(|t| t.label) {
            record.insert("club".to_string(), club);
        }
        if let Some(pos) = item.position.and_then(|p| p.short_label) {
            record.insert("pos".to_string(), pos);
        }
        if let Some(rating) = item.overall_rating {
            record.insert("overall_rating".to_string(), rating.to_string());
        }
        records.push(record);
    }
    Ok(records)
}
