use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use ligapulse::collect::Collector;
use ligapulse::fake_source::demo_sources;
use ligapulse::fotmob_source::parse_player_rows_json;
use ligapulse::merge::{merge, MergePolicy, ScoreWeights};
use ligapulse::model::League;
use ligapulse::normalize::normalize_all;
use ligapulse::rank::rank;
use ligapulse::resolve::resolve;
use ligapulse::source::{RawRecord, Source};

fn synthetic_raws(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let mut record = RawRecord::new();
            record.insert("player".to_string(), format!("Player {i}"));
            record.insert("team".to_string(), format!("Team {}", i % 20));
            record.insert("goals".to_string(), (i % 19).to_string());
            record.insert("assists".to_string(), (i % 11).to_string());
            record.insert("expected_goals".to_string(), format!("{:.2}", i as f64 * 0.03));
            record.insert("pass_completion_pct".to_string(), format!("{}%", 60 + i % 35));
            record.insert("tackles".to_string(), (i % 50).to_string());
            record
        })
        .collect()
}

fn bench_stats_parse(c: &mut Criterion) {
    c.bench_function("fotmob_stats_parse", |b| {
        b.iter(|| {
            let records = parse_player_rows_json(black_box(STATS_JSON)).unwrap();
            black_box(records.len());
        })
    });
}

fn bench_aggregation_pipeline(c: &mut Criterion) {
    let raws = synthetic_raws(500);
    let policy = MergePolicy::new().with_priority("bench", 1);
    let weights = ScoreWeights::default();

    c.bench_function("normalize_resolve_merge_rank_500", |b| {
        b.iter(|| {
            let (observations, _) = normalize_all("bench", black_box(&raws));
            let groups = resolve(observations);
            let records: Vec<_> = groups
                .iter()
                .map(|group| merge(group, &policy, &weights))
                .collect();
            let ranked = rank(records, 50);
            black_box(ranked.len());
        })
    });
}

fn bench_offline_collect(c: &mut Criterion) {
    // Zero TTL so every iteration runs a full cycle instead of a cache hit.
    let collector = Collector::new(demo_sources(26)).with_cache_ttl(Duration::ZERO);
    c.bench_function("offline_collect_top50", |b| {
        b.iter(|| {
            let result = collector.collect(black_box(League::Premier), 50).unwrap();
            black_box(result.records.len());
        })
    });
}

fn bench_demo_fetch(c: &mut Criterion) {
    let sources = demo_sources(26);
    c.bench_function("demo_source_fetch", |b| {
        b.iter(|| {
            let records = sources[0].fetch(black_box(League::SuperLig)).unwrap();
            black_box(records.len());
        })
    });
}

criterion_group!(
    perf,
    bench_stats_parse,
    bench_aggregation_pipeline,
    bench_offline_collect,
    bench_demo_fetch
);
criterion_main!(perf);

static STATS_JSON: &str = include_str!("../tests/fixtures/fotmob_player_stats.json");
