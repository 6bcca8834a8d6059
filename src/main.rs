use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};

use ligapulse::collect::{Collector, MAX_LIMIT, MIN_LIMIT};
use ligapulse::export::{export_csv, export_xlsx};
use ligapulse::fake_source::demo_sources;
use ligapulse::fotmob_source::FotmobSource;
use ligapulse::merge::keeper_records;
use ligapulse::model::AggregationResult;
use ligapulse::rating_source::EaRatingsSource;
use ligapulse::result_cache::DEFAULT_RESULT_TTL;
use ligapulse::source::Source;

struct Options {
    league: String,
    limit: usize,
    offline: bool,
    keepers: bool,
    export: Option<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options {
        league: "premier".to_string(),
        limit: 50,
        offline: std::env::var("LIGAPULSE_OFFLINE").is_ok_and(|v| v == "1"),
        keepers: false,
        export: None,
    };

    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--offline" => opts.offline = true,
            "--keepers" => opts.keepers = true,
            "--export" => {
                let path = args.next().context("--export requires a path")?;
                opts.export = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => positional.push(other.to_string()),
        }
    }
    if let Some(league) = positional.first() {
        opts.league = league.clone();
    }
    if let Some(limit) = positional.get(1) {
        opts.limit = limit
            .parse()
            .with_context(|| format!("limit must be a number, got '{limit}'"))?;
    }
    Ok(opts)
}

fn print_usage() {
    println!("usage: ligapulse [LEAGUE] [LIMIT] [--offline] [--keepers] [--export PATH]");
    println!();
    println!("  LEAGUE  one of: superlig, bundesliga, premier, saudi (default premier)");
    println!("  LIMIT   top-K players, {MIN_LIMIT}..={MAX_LIMIT} (default 50)");
}

fn build_collector(offline: bool) -> Collector {
    let sources: Vec<Box<dyn Source>> = if offline {
        let seed = std::env::var("LIGAPULSE_SEED")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(26);
        demo_sources(seed)
    } else {
        let mut fotmob = FotmobSource::new();
        if let Some(delay) = std::env::var("LIGAPULSE_COURTESY_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
        {
            fotmob = fotmob.with_courtesy_delay(Duration::from_millis(delay));
        }
        vec![Box::new(fotmob), Box::new(EaRatingsSource)]
    };

    let ttl = std::env::var("LIGAPULSE_CACHE_TTL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RESULT_TTL);

    Collector::new(sources).with_cache_ttl(ttl)
}

fn print_result(result: &AggregationResult, keepers: bool) {
    println!(
        "{}: {} players merged, as of {}",
        result.league.label(),
        result.total_players,
        result.as_of
    );

    if keepers {
        println!(
            "{:<24} {:<16} {:>6} {:>7} {:>6}",
            "Keeper", "Team", "Saves", "Save%", "GA/90"
        );
        for k in keeper_records(&result.records) {
            println!(
                "{:<24} {:<16} {:>6.0} {:>6.1}% {:>6.2}",
                k.player_name,
                k.team_name.unwrap_or_default(),
                k.saves,
                k.save_pct,
                k.goals_against_per90
            );
        }
        return;
    }

    println!(
        "{:<4} {:<24} {:<16} {:>5} {:>5} {:>6} {:>6} {:>7}",
        "#", "Player", "Team", "G", "A", "xG", "Tkl", "Score"
    );
    for (idx, r) in result.records.iter().enumerate() {
        println!(
            "{:<4} {:<24} {:<16} {:>5.0} {:>5.0} {:>6.2} {:>6.0} {:>7.2}",
            idx + 1,
            r.player_name,
            r.team_name.clone().unwrap_or_default(),
            r.goals,
            r.assists,
            r.expected_goals,
            r.tackles,
            r.performance_score
        );
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let collector = build_collector(opts.offline);
    let result = match collector.collect_by_key(&opts.league, opts.limit) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            return ExitCode::FAILURE;
        }
    };

    for warning in &result.source_errors {
        eprintln!("[WARN] {warning}");
    }
    print_result(&result, opts.keepers);

    if let Some(path) = &opts.export {
        let export = if path.extension().is_some_and(|ext| ext == "xlsx") {
            export_xlsx(path, &result)
        } else {
            export_csv(path, &result)
        };
        match export {
            Ok(()) => println!("exported to {}", path.display()),
            Err(err) => {
                eprintln!("[ERROR] export failed: {err:#}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
