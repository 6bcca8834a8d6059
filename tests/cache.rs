use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ligapulse::collect::{CollectError, Collector};
use ligapulse::fake_source::FakeSource;
use ligapulse::model::League;
use ligapulse::source::RawRecord;

fn raw(pairs: &[(&str, &str)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn one_player_source(id: &str) -> FakeSource {
    FakeSource::new(
        id,
        1,
        vec![raw(&[("player", "Cached Player"), ("goals", "6")])],
    )
}

#[test]
fn second_collect_inside_ttl_hits_the_cache() {
    let source = one_player_source("s1");
    let calls = source.call_counter();
    let collector = Collector::new(vec![Box::new(source)]);

    let first = collector.collect(League::Premier, 10).unwrap();
    let second = collector.collect(League::Premier, 10).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // Same object from cache, down to the as_of stamp.
    assert_eq!(first, second);
}

#[test]
fn different_limits_do_not_share_entries() {
    let source = one_player_source("s1");
    let calls = source.call_counter();
    let collector = Collector::new(vec![Box::new(source)]);

    collector.collect(League::Premier, 10).unwrap();
    collector.collect(League::Premier, 20).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_cold_collects_trigger_exactly_one_computation() {
    let source = one_player_source("s1").with_latency(Duration::from_millis(150));
    let calls = source.call_counter();
    let collector = Arc::new(Collector::new(vec![Box::new(source)]));

    let results: Vec<_> = thread::scope(|scope| {
        (0..8)
            .map(|_| {
                let collector = Arc::clone(&collector);
                scope.spawn(move || collector.collect(League::Premier, 10))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().expect("collect thread panicked"))
            .collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
}

#[test]
fn failed_refresh_serves_the_previous_result() {
    let source = one_player_source("s1");
    let calls = source.call_counter();
    let outage = source.failure_switch();
    // Zero TTL: every lookup is a refresh attempt.
    let collector = Collector::new(vec![Box::new(source)]).with_cache_ttl(Duration::ZERO);

    let first = collector.collect(League::Premier, 10).unwrap();
    outage.store(true, Ordering::SeqCst);
    let second = collector.collect(League::Premier, 10).unwrap();

    // The refresh ran and failed; the stale cycle was served instead.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(first, second);
}

#[test]
fn failure_on_one_key_leaves_other_entries_alone() {
    let source = one_player_source("s1");
    let calls = source.call_counter();
    let outage = source.failure_switch();
    let collector = Collector::new(vec![Box::new(source)]);

    let cached = collector.collect(League::Premier, 10).unwrap();
    outage.store(true, Ordering::SeqCst);

    // A cold key fails hard.
    assert_eq!(
        collector.collect(League::Saudi, 10),
        Err(CollectError::NoDataAvailable(League::Saudi))
    );

    // The warm key is still served without another fetch.
    let calls_before = calls.load(Ordering::SeqCst);
    let again = collector.collect(League::Premier, 10).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), calls_before);
    assert_eq!(cached, again);
}
