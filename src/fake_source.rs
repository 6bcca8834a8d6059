use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::League;
use crate::source::{FetchError, RawRecord, Source};

/// Synthetic feed standing in for a real upstream: offline mode, the demo
/// binary, benches and tests. Instrumented so tests can assert how many
/// fetches actually happened and flip the source into a failing state.
pub struct FakeSource {
    id: String,
    priority: u8,
    feed: Feed,
    failure: FetchError,
    failing: Arc<AtomicBool>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

enum Feed {
    /// Same records for every league; tests set these up explicitly.
    Fixed(Vec<RawRecord>),
    /// Deterministic per-league squad derived from a seed.
    Seeded { seed: u64, ratings_only: bool },
}

impl FakeSource {
    pub fn new(id: &str, priority: u8, records: Vec<RawRecord>) -> Self {
        Self::build(id, priority, Feed::Fixed(records))
    }

    /// Full-statistics persona speaking the canonical vocabulary.
    pub fn seeded(id: &str, priority: u8, seed: u64) -> Self {
        Self::build(
            id,
            priority,
            Feed::Seeded {
                seed,
                ratings_only: false,
            },
        )
    }

    /// Ratings-only persona over the same synthetic squad, with sloppier
    /// name casing so entity resolution has real work to do.
    pub fn seeded_ratings(id: &str, priority: u8, seed: u64) -> Self {
        Self::build(
            id,
            priority,
            Feed::Seeded {
                seed,
                ratings_only: true,
            },
        )
    }

    pub fn failing_with(id: &str, priority: u8, failure: FetchError) -> Self {
        let source = Self::build(id, priority, Feed::Fixed(Vec::new()));
        source.failing.store(true, Ordering::SeqCst);
        Self { failure, ..source }
    }

    fn build(id: &str, priority: u8, feed: Feed) -> Self {
        Self {
            id: id.to_string(),
            priority,
            feed,
            failure: FetchError::Network("injected outage".to_string()),
            failing: Arc::new(AtomicBool::new(false)),
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold each fetch open for `latency`; lets tests pile callers onto one
    /// in-flight computation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Toggle for turning the source into a failing one mid-test.
    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.failing)
    }
}

impl Source for FakeSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn fetch(&self, league: League) -> Result<Vec<RawRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(self.failure.clone());
        }
        match &self.feed {
            Feed::Fixed(records) => Ok(records.clone()),
            Feed::Seeded { seed, ratings_only } => {
                Ok(synth_league_records(*seed, league, *ratings_only))
            }
        }
    }
}

/// The standard offline line-up: one detailed source and one ratings source
/// over the same synthetic squads.
pub fn demo_sources(seed: u64) -> Vec<Box<dyn Source>> {
    vec![
        Box::new(FakeSource::seeded("demo_stats", 2, seed)),
        Box::new(FakeSource::seeded_ratings("demo_ratings", 1, seed)),
    ]
}

const FIRST_INITIALS: &[&str] = &["A.", "B.", "C.", "D.", "E.", "F.", "H.", "K.", "M.", "S."];
const LAST_NAMES: &[&str] = &[
    "Yilmaz", "Kaya", "Demir", "Aydin", "Arslan", "Dogan", "Kilic", "Celik", "Muller", "Fischer",
    "Weber", "Wagner", "Becker", "Hoffmann", "Schulz", "Smith", "Taylor", "Brown", "Wilson",
    "Davies", "Evans", "Walker", "Alharbi", "Alqahtani", "Alzahrani", "Alghamdi", "Alshehri",
    "Almutairi", "Santos", "Silva",
];

fn league_teams(league: League) -> &'static [&'static str] {
    match league {
        League::SuperLig => &["Galatasaray", "Fenerbahce", "Besiktas", "Trabzonspor"],
        League::Bundesliga => &["Bayern", "Dortmund", "Leverkusen", "Leipzig"],
        League::Premier => &["Arsenal", "Liverpool", "Man City", "Chelsea"],
        League::Saudi => &["Al-Hilal", "Al-Nassr", "Al-Ittihad", "Al-Ahli"],
    }
}

fn league_seed(seed: u64, league: League) -> u64 {
    let offset = League::ALL
        .iter()
        .position(|l| *l == league)
        .unwrap_or_default() as u64;
    seed.wrapping_mul(0x9e37_79b9).wrapping_add(offset + 1)
}

fn synth_league_records(seed: u64, league: League, ratings_only: bool) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(league_seed(seed, league));
    let teams = league_teams(league);
    let mut records = Vec::with_capacity(LAST_NAMES.len());

    for (idx, last) in LAST_NAMES.iter().enumerate() {
        let name = format!("{} {}", FIRST_INITIALS[idx % FIRST_INITIALS.len()], last);
        let team = teams[idx % teams.len()];
        let keeper = idx % 10 == 9;

        // Both personas draw from one rng stream per league so they describe
        // the same squad; every stat below must be sampled on both paths.
        let goals: u32 = if keeper { 0 } else { rng.gen_range(0..=18) };
        let assists: u32 = if keeper { 0 } else { rng.gen_range(0..=12) };
        let xg = goals as f64 * rng.gen_range(0.6..1.2);
        let pass_pct = rng.gen_range(62.0..94.0_f64);
        let tackles: u32 = rng.gen_range(0..=60);
        let interceptions: u32 = rng.gen_range(0..=45);
        let saves: u32 = if keeper { rng.gen_range(30..=110) } else { 0 };
        let save_pct = if keeper { rng.gen_range(58.0..82.0_f64) } else { 0.0 };
        let ga90 = if keeper { rng.gen_range(0.6..2.2_f64) } else { 0.0 };
        let rating = rng.gen_range(6.2..8.6_f64);

        let mut record = RawRecord::new();
        if ratings_only {
            // Ratings feeds list names lower-cased with doubled spacing;
            // the resolver is expected to line these up anyway.
            record.insert("player".to_string(), name.to_lowercase().replace(' ', "  "));
            record.insert("team".to_string(), team.to_string());
            record.insert("rating".to_string(), format!("{rating:.2}"));
        } else {
            record.insert("player".to_string(), name);
            record.insert("team".to_string(), team.to_string());
            record.insert(
                "position".to_string(),
                if keeper { "GK" } else { "Outfield" }.to_string(),
            );
            record.insert("goals".to_string(), goals.to_string());
            record.insert("assists".to_string(), assists.to_string());
            record.insert("expected_goals".to_string(), format!("{xg:.2}"));
            record.insert("pass_completion_pct".to_string(), format!("{pass_pct:.1}%"));
            record.insert("tackles".to_string(), tackles.to_string());
            record.insert("interceptions".to_string(), interceptions.to_string());
            if keeper {
                record.insert("saves".to_string(), saves.to_string());
                record.insert("save_pct".to_string(), format!("{save_pct:.1}%"));
                record.insert("goals_against_per90".to_string(), format!("{ga90:.2}"));
            }
        }
        records.push(record);
    }
    records
}
