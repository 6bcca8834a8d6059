use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Metric, PlayerObservation};
use crate::source::RawRecord;

/// A record that cannot yield an observation. Dropped and recorded, never
/// fatal to the cycle.
#[derive(Debug, Clone, Error)]
#[error("malformed record from {source_id}: {reason}")]
pub struct MalformedRecord {
    pub source_id: String,
    pub reason: String,
}

/// Mapping from one source's vocabulary to the canonical metric set.
/// Adding a source means adding an entry to [`FIELD_MAPS`], nothing else.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub source_id: &'static str,
    pub name_field: &'static str,
    pub team_field: &'static str,
    pub position_field: &'static str,
    pub metrics: &'static [(&'static str, Metric)],
}

/// Canonical vocabulary, used for any source without a dedicated entry.
/// The fake feed and most tests speak this directly.
const CANONICAL_MAP: FieldMap = FieldMap {
    source_id: "canonical",
    name_field: "player",
    team_field: "team",
    position_field: "position",
    metrics: &[
        ("goals", Metric::Goals),
        ("assists", Metric::Assists),
        ("expected_goals", Metric::ExpectedGoals),
        ("pass_completion_pct", Metric::PassCompletionPct),
        ("tackles", Metric::Tackles),
        ("interceptions", Metric::Interceptions),
        ("saves", Metric::Saves),
        ("save_pct", Metric::SavePct),
        ("goals_against_per90", Metric::GoalsAgainstPer90),
        ("rating", Metric::Rating),
    ],
};

pub const FIELD_MAPS: &[FieldMap] = &[
    FieldMap {
        source_id: "fotmob",
        name_field: "name",
        team_field: "team_name",
        position_field: "role",
        metrics: &[
            ("goals", Metric::Goals),
            ("goal_assist", Metric::Assists),
            ("expected_goals", Metric::ExpectedGoals),
            ("pass_accuracy", Metric::PassCompletionPct),
            ("tackles_won", Metric::Tackles),
            ("interceptions", Metric::Interceptions),
            ("saves", Metric::Saves),
            ("save_percentage", Metric::SavePct),
            ("goals_conceded_per90", Metric::GoalsAgainstPer90),
            ("rating", Metric::Rating),
        ],
    },
    FieldMap {
        source_id: "eafc",
        name_field: "player",
        team_field: "club",
        position_field: "pos",
        metrics: &[("overall_rating", Metric::Rating)],
    },
];

pub fn field_map_for(source_id: &str) -> &'static FieldMap {
    FIELD_MAPS
        .iter()
        .find(|map| map.source_id == source_id)
        .unwrap_or(&CANONICAL_MAP)
}

/// Convert one raw field map into a canonical observation.
///
/// A record without an extractable name is malformed. Metric values that fail
/// numeric coercion are treated as absent, not as zero.
pub fn normalize(source_id: &str, raw: &RawRecord) -> Result<PlayerObservation, MalformedRecord> {
    let map = field_map_for(source_id);

    let player_name = raw
        .get(map.name_field)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MalformedRecord {
            source_id: source_id.to_string(),
            reason: format!("missing player name field '{}'", map.name_field),
        })?
        .to_string();

    let team_name = non_empty_field(raw, map.team_field);
    let position = non_empty_field(raw, map.position_field);

    let mut metrics = HashMap::new();
    for (field, metric) in map.metrics {
        let Some(value) = raw.get(*field) else {
            continue;
        };
        if let Some(parsed) = parse_metric_value(value) {
            metrics.insert(*metric, parsed);
        }
    }

    Ok(PlayerObservation {
        source_id: source_id.to_string(),
        player_name,
        team_name,
        position,
        metrics,
    })
}

/// Normalize a whole batch, dropping malformed records and reporting them
/// back so silent data loss stays observable.
pub fn normalize_all(
    source_id: &str,
    raws: &[RawRecord],
) -> (Vec<PlayerObservation>, Vec<MalformedRecord>) {
    let mut observations = Vec::with_capacity(raws.len());
    let mut dropped = Vec::new();
    for raw in raws {
        match normalize(source_id, raw) {
            Ok(obs) => observations.push(obs),
            Err(err) => dropped.push(err),
        }
    }
    (observations, dropped)
}

fn non_empty_field(raw: &RawRecord, field: &str) -> Option<String> {
    raw.get(field)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Parse a numeric value out of source text, stripping percent signs, unit
/// suffixes and thousands separators.
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
