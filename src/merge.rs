use std::collections::{BTreeSet, HashMap};

use crate::model::{KeeperRecord, Metric, PlayerGroup, PlayerObservation, PlayerRecord};

/// Coefficients of the composite performance score. A tunable configuration,
/// not a law: swap the weights without touching the merger.
///
/// Goalkeeper metrics (saves, save %, goals against per 90) are carried on
/// the record but deliberately excluded from the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub goals: f64,
    pub assists: f64,
    pub expected_goals: f64,
    pub tackles: f64,
    pub pass_pct: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            goals: 3.0,
            assists: 2.0,
            expected_goals: 1.5,
            tackles: 1.2,
            pass_pct: 0.01,
        }
    }
}

impl ScoreWeights {
    pub fn score(&self, record: &PlayerRecord) -> f64 {
        record.goals * self.goals
            + record.assists * self.assists
            + record.expected_goals * self.expected_goals
            + record.tackles * self.tackles
            + record.pass_completion_pct * self.pass_pct
    }
}

/// Fixed source precedence applied per metric during a merge. Priorities come
/// from the configured sources; unknown sources rank lowest.
#[derive(Debug, Clone, Default)]
pub struct MergePolicy {
    priorities: HashMap<String, u8>,
}

impl MergePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, source_id: &str, priority: u8) -> Self {
        self.priorities.insert(source_id.to_string(), priority);
        self
    }

    pub fn priority_of(&self, source_id: &str) -> u8 {
        self.priorities.get(source_id).copied().unwrap_or(0)
    }
}

/// Combine all observations of a group into one canonical record.
///
/// Per metric: highest-priority source wins; on a priority tie the most
/// recently normalized observation wins (observations arrive in the
/// resolver's canonical order, so "later wins" is deterministic). A metric no
/// observation supplies becomes exactly 0. Negative raw values are floored at
/// zero; none of the canonical metrics can meaningfully go below it.
pub fn merge(group: &PlayerGroup, policy: &MergePolicy, weights: &ScoreWeights) -> PlayerRecord {
    let mut merged: HashMap<Metric, f64> = HashMap::new();
    let mut winning_priority: HashMap<Metric, u8> = HashMap::new();

    for obs in &group.observations {
        let priority = policy.priority_of(&obs.source_id);
        for (metric, value) in &obs.metrics {
            let current = winning_priority.get(metric).copied();
            if current.is_none_or(|p| priority >= p) {
                merged.insert(*metric, value.max(0.0));
                winning_priority.insert(*metric, priority);
            }
        }
    }

    let source_list: BTreeSet<String> = group
        .observations
        .iter()
        .map(|obs| obs.source_id.clone())
        .collect();

    let lead = leading_observation(group, policy);
    let position = pick_field(group, policy, |obs| obs.position.clone());
    let team_name = pick_field(group, policy, |obs| obs.team_name.clone());

    let value = |metric: Metric| merged.get(&metric).copied().unwrap_or(0.0);
    let mut record = PlayerRecord {
        player_name: lead.player_name.clone(),
        position,
        team_name,
        goals: value(Metric::Goals),
        assists: value(Metric::Assists),
        expected_goals: value(Metric::ExpectedGoals),
        pass_completion_pct: value(Metric::PassCompletionPct),
        tackles: value(Metric::Tackles),
        interceptions: value(Metric::Interceptions),
        saves: value(Metric::Saves),
        save_pct: value(Metric::SavePct),
        goals_against_per90: value(Metric::GoalsAgainstPer90),
        rating: value(Metric::Rating),
        source_list,
        performance_score: 0.0,
    };
    record.performance_score = weights.score(&record);
    record
}

/// Highest-priority observation, later-wins on ties; supplies the display name.
fn leading_observation<'a>(group: &'a PlayerGroup, policy: &MergePolicy) -> &'a PlayerObservation {
    let mut best = &group.observations[0];
    for obs in &group.observations {
        if policy.priority_of(&obs.source_id) >= policy.priority_of(&best.source_id) {
            best = obs;
        }
    }
    best
}

/// First non-empty optional field, scanning sources from highest priority down.
fn pick_field(
    group: &PlayerGroup,
    policy: &MergePolicy,
    get: impl Fn(&PlayerObservation) -> Option<String>,
) -> Option<String> {
    let mut candidates: Vec<&PlayerObservation> = group.observations.iter().collect();
    candidates.sort_by_key(|obs| std::cmp::Reverse(policy.priority_of(&obs.source_id)));
    candidates.into_iter().find_map(|obs| get(obs))
}

/// Keeper-focused view: goalkeepers only, keeper metrics only.
pub fn keeper_records(records: &[PlayerRecord]) -> Vec<KeeperRecord> {
    records
        .iter()
        .filter(|r| r.is_goalkeeper())
        .map(|r| KeeperRecord {
            player_name: r.player_name.clone(),
            team_name: r.team_name.clone(),
            saves: r.saves,
            save_pct: r.save_pct,
            goals_against_per90: r.goals_against_per90,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(source: &str, name: &str, metrics: &[(Metric, f64)]) -> PlayerObservation {
        PlayerObservation {
            source_id: source.to_string(),
            player_name: name.to_string(),
            team_name: None,
            position: None,
            metrics: metrics.iter().copied().collect(),
        }
    }

    fn group(observations: Vec<PlayerObservation>) -> PlayerGroup {
        PlayerGroup {
            name_key: "p".to_string(),
            team_key: None,
            observations,
        }
    }

    #[test]
    fn higher_priority_source_wins_metric() {
        let policy = MergePolicy::new()
            .with_priority("detail", 2)
            .with_priority("ratings", 1);
        let g = group(vec![
            obs("ratings", "P", &[(Metric::Goals, 7.0)]),
            obs("detail", "P", &[(Metric::Goals, 9.0)]),
        ]);
        let record = merge(&g, &policy, &ScoreWeights::default());
        assert_eq!(record.goals, 9.0);
    }

    #[test]
    fn priority_tie_goes_to_later_observation() {
        let policy = MergePolicy::new();
        let g = group(vec![
            obs("s1", "P", &[(Metric::Assists, 1.0)]),
            obs("s2", "P", &[(Metric::Assists, 4.0)]),
        ]);
        let record = merge(&g, &policy, &ScoreWeights::default());
        assert_eq!(record.assists, 4.0);
    }

    #[test]
    fn absent_metrics_default_to_zero_and_never_negative() {
        let policy = MergePolicy::new();
        let g = group(vec![obs("s1", "P", &[(Metric::Tackles, -2.0)])]);
        let record = merge(&g, &policy, &ScoreWeights::default());
        for metric in Metric::ALL {
            assert!(record.metric(metric) >= 0.0, "{metric:?} went negative");
        }
        assert_eq!(record.goals, 0.0);
        assert_eq!(record.tackles, 0.0);
        assert!(record.performance_score.is_finite());
    }

    #[test]
    fn keeper_metrics_do_not_feed_the_score() {
        let policy = MergePolicy::new();
        let g = group(vec![obs(
            "s1",
            "P",
            &[(Metric::Saves, 80.0), (Metric::SavePct, 77.0)],
        )]);
        let record = merge(&g, &policy, &ScoreWeights::default());
        assert_eq!(record.performance_score, 0.0);
        assert_eq!(record.saves, 80.0);
    }

    #[test]
    fn custom_weights_change_the_score() {
        let policy = MergePolicy::new();
        let g = group(vec![obs("s1", "P", &[(Metric::Goals, 2.0)])]);
        let weights = ScoreWeights {
            goals: 10.0,
            ..ScoreWeights::default()
        };
        let record = merge(&g, &policy, &weights);
        assert_eq!(record.performance_score, 20.0);
    }
}
