use crate::model::{AggregationResult, LeagueAverages, PlayerRecord};
use crate::resolve::identity_key;

/// Top-K selection: performance score descending, normalized name ascending
/// on ties so equal scores always come out in the same order. A limit beyond
/// the population size is capped, never an error.
pub fn rank(mut records: Vec<PlayerRecord>, limit: usize) -> Vec<PlayerRecord> {
    records.sort_by(|a, b| {
        b.performance_score
            .total_cmp(&a.performance_score)
            .then_with(|| identity_key(&a.player_name).cmp(&identity_key(&b.player_name)))
    });
    records.truncate(limit.min(records.len()));
    records
}

/// Cross-league comparison rows built from already-collected results.
pub fn league_averages(results: &[AggregationResult]) -> Vec<LeagueAverages> {
    results
        .iter()
        .map(|result| {
            let n = result.records.len();
            let mean = |f: fn(&PlayerRecord) -> f64| {
                if n == 0 {
                    0.0
                } else {
                    result.records.iter().map(f).sum::<f64>() / n as f64
                }
            };
            LeagueAverages {
                league: result.league,
                players: result.total_players,
                mean_goals: mean(|r| r.goals),
                mean_assists: mean(|r| r.assists),
                // Records are already ranked, so the best player leads.
                best_player: result.records.first().map(|r| r.player_name.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(name: &str, score: f64) -> PlayerRecord {
        PlayerRecord {
            player_name: name.to_string(),
            position: None,
            team_name: None,
            goals: 0.0,
            assists: 0.0,
            expected_goals: 0.0,
            pass_completion_pct: 0.0,
            tackles: 0.0,
            interceptions: 0.0,
            saves: 0.0,
            save_pct: 0.0,
            goals_against_per90: 0.0,
            rating: 0.0,
            source_list: BTreeSet::new(),
            performance_score: score,
        }
    }

    #[test]
    fn sorts_by_score_then_name() {
        let ranked = rank(
            vec![record("Zeta", 5.0), record("alpha", 9.0), record("Beta", 5.0)],
            10,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn equal_scores_are_stable_by_name() {
        let ranked = rank(
            vec![record("Cem", 4.0), record("Ada", 4.0), record("Bora", 4.0)],
            3,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bora", "Cem"]);
    }

    #[test]
    fn limit_is_capped_at_population() {
        let ranked = rank(vec![record("A", 1.0), record("B", 2.0)], 50);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn averages_use_ranked_head_as_best_player() {
        use crate::model::{AggregationResult, League};

        let mut top = record("Top Scorer", 40.0);
        top.goals = 12.0;
        top.assists = 4.0;
        let mut other = record("Runner Up", 20.0);
        other.goals = 6.0;
        other.assists = 2.0;

        let result = AggregationResult {
            league: League::Bundesliga,
            as_of: "2026-01-01T00:00:00Z".to_string(),
            total_players: 2,
            records: rank(vec![other, top], 10),
            source_errors: Vec::new(),
        };

        let rows = league_averages(&[result]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean_goals, 9.0);
        assert_eq!(rows[0].mean_assists, 3.0);
        assert_eq!(rows[0].best_player.as_deref(), Some("Top Scorer"));
    }
}
