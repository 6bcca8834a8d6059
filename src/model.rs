use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Leagues the engine knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    SuperLig,
    Bundesliga,
    Premier,
    Saudi,
}

impl League {
    pub const ALL: [League; 4] = [
        League::SuperLig,
        League::Bundesliga,
        League::Premier,
        League::Saudi,
    ];

    /// Stable lowercase key used in request paths, env vars and cache keys.
    pub fn key(self) -> &'static str {
        match self {
            League::SuperLig => "superlig",
            League::Bundesliga => "bundesliga",
            League::Premier => "premier",
            League::Saudi => "saudi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            League::SuperLig => "Super Lig",
            League::Bundesliga => "Bundesliga",
            League::Premier => "Premier League",
            League::Saudi => "Saudi Pro League",
        }
    }

    pub fn parse(raw: &str) -> Option<League> {
        let key = raw.trim().to_lowercase();
        League::ALL.into_iter().find(|league| league.key() == key)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Canonical metric vocabulary. Every source vocabulary maps into this set
/// through the normalizer's field-map table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Goals,
    Assists,
    ExpectedGoals,
    PassCompletionPct,
    Tackles,
    Interceptions,
    Saves,
    SavePct,
    GoalsAgainstPer90,
    Rating,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Goals,
        Metric::Assists,
        Metric::ExpectedGoals,
        Metric::PassCompletionPct,
        Metric::Tackles,
        Metric::Interceptions,
        Metric::Saves,
        Metric::SavePct,
        Metric::GoalsAgainstPer90,
        Metric::Rating,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Goals => "goals",
            Metric::Assists => "assists",
            Metric::ExpectedGoals => "expected_goals",
            Metric::PassCompletionPct => "pass_completion_pct",
            Metric::Tackles => "tackles",
            Metric::Interceptions => "interceptions",
            Metric::Saves => "saves",
            Metric::SavePct => "save_pct",
            Metric::GoalsAgainstPer90 => "goals_against_per90",
            Metric::Rating => "rating",
        }
    }
}

/// One source's view of one player. Built by the normalizer, consumed by the
/// resolver; immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerObservation {
    pub source_id: String,
    pub player_name: String,
    pub team_name: Option<String>,
    pub position: Option<String>,
    /// Only metrics the source actually supplied. Absence is distinct from a
    /// real zero until the merger assigns defaults.
    pub metrics: HashMap<Metric, f64>,
}

/// Observations judged to describe the same real player.
/// Never empty by construction.
#[derive(Debug, Clone)]
pub struct PlayerGroup {
    pub name_key: String,
    pub team_key: Option<String>,
    pub observations: Vec<PlayerObservation>,
}

/// The merged, canonical per-player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_name: String,
    pub position: Option<String>,
    pub team_name: Option<String>,
    pub goals: f64,
    pub assists: f64,
    pub expected_goals: f64,
    pub pass_completion_pct: f64,
    pub tackles: f64,
    pub interceptions: f64,
    pub saves: f64,
    pub save_pct: f64,
    pub goals_against_per90: f64,
    pub rating: f64,
    /// Sources that contributed at least one observation to this record.
    pub source_list: BTreeSet<String>,
    pub performance_score: f64,
}

impl PlayerRecord {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Goals => self.goals,
            Metric::Assists => self.assists,
            Metric::ExpectedGoals => self.expected_goals,
            Metric::PassCompletionPct => self.pass_completion_pct,
            Metric::Tackles => self.tackles,
            Metric::Interceptions => self.interceptions,
            Metric::Saves => self.saves,
            Metric::SavePct => self.save_pct,
            Metric::GoalsAgainstPer90 => self.goals_against_per90,
            Metric::Rating => self.rating,
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        let Some(position) = self.position.as_deref() else {
            return false;
        };
        let s = position.to_lowercase();
        s == "gk" || s.contains("goalkeeper") || s.contains("keeper")
    }
}

/// Goalkeeper projection of a merged record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeeperRecord {
    pub player_name: String,
    pub team_name: Option<String>,
    pub saves: f64,
    pub save_pct: f64,
    pub goals_against_per90: f64,
}

/// One complete collection cycle for a `(league, limit)` pair.
/// Cached and served as an atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub league: League,
    pub as_of: String,
    pub total_players: usize,
    pub records: Vec<PlayerRecord>,
    /// Per-source and per-record failures absorbed during the cycle.
    pub source_errors: Vec<String>,
}

/// Cross-league summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueAverages {
    pub league: League,
    pub players: usize,
    pub mean_goals: f64,
    pub mean_assists: f64,
    pub best_player: Option<String>,
}
