//! Market Trial autoplay harness.
//!
//! Plays one game per role through a single `GameService`, so achievements
//! and reputation carry from game to game, then replays every journal and
//! checks the save codec against the live state.
//!
//! Usage: market-trial-autoplay [config.json]
//!
//! With a config file, storage lives under its `dataDir`; without one,
//! everything stays in memory.

use std::path::Path;
use std::process::ExitCode;

use market_trial_engine::domain::{Choice, GamePhase, Role};
use market_trial_engine::engine::GameEngine;
use market_trial_engine::hashing::canonical_hash;
use market_trial_engine::metrics::Metric;
use market_trial_engine::random::RandomSource;

use market_trial_runtime::config::RuntimeConfig;
use market_trial_runtime::replay::verify_determinism;
use market_trial_runtime::service::GameService;
use market_trial_runtime::snapshot_codec::{decode_save, encode_save};
use market_trial_runtime::storage::{FileStore, KeyValueStore, MemoryStore};

fn main() -> ExitCode {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => RuntimeConfig::load(Path::new(path)),
        None => Ok(RuntimeConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {}", e);
            return ExitCode::from(2);
        }
    };

    let passed = match config_path {
        Some(_) => run(&config, FileStore::new(&config.data_dir)),
        None => run(&config, MemoryStore::new()),
    };
    match passed {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("setup error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run<S: KeyValueStore>(config: &RuntimeConfig, store: S) -> Result<bool, String> {
    let catalog = config.load_catalog().map_err(|e| e.to_string())?;
    let mut service = GameService::new(GameEngine::new(catalog), store, config.random_source())
        .with_rules(config.rules.clone());

    println!(
        "Autoplay: seed={}",
        config.seed.map_or_else(|| "entropy".to_string(), |s| s.to_string())
    );

    let mut all_passed = true;
    for role in Role::ALL {
        let ok = play_one(&mut service, role);
        all_passed &= ok;
    }

    let rep = service.reputation();
    println!(
        "Reputation: points={} rank={:?} games={} best={}",
        rep.points, rep.rank, rep.total_games_played, rep.best_score
    );
    println!("{}", if all_passed { "ALL PASSED" } else { "SOME FAILED" });
    Ok(all_passed)
}

/// Greedy policy: take the choice with the largest total effect on the
/// role's primary metrics. Uses the first unlocked power-up, if any.
fn play_one<S: KeyValueStore, R: RandomSource>(service: &mut GameService<S, R>, role: Role) -> bool {
    let primary: Vec<Metric> = service
        .catalog()
        .role(role)
        .map(|r| r.primary_metrics.clone())
        .unwrap_or_default();

    if service.start_game(role, Default::default(), None).is_none() {
        println!("[FAIL] role={}: game did not start", role);
        return false;
    }
    if let Some(kind) = service.available_power_ups().first().copied() {
        service.use_power_up(kind);
    }

    while service.phase() == GamePhase::InProgress {
        let Some(round) = service.game_state().and_then(|s| s.current_round_content()) else {
            break;
        };
        let best = round.choices.iter().max_by(|a, b| {
            let score = |c: &Choice| -> f64 {
                primary.iter().filter_map(|m| c.effects.get(*m)).sum()
            };
            score(a).total_cmp(&score(b))
        });
        let Some(choice_id) = best.map(|c| c.id.clone()) else {
            break;
        };
        if service.make_choice_by_id(&choice_id).is_none() {
            println!("[FAIL] role={}: choice {} refused", role, choice_id);
            return false;
        }
    }

    let Some(state) = service.game_state().cloned() else {
        println!("[FAIL] role={}: no state after play", role);
        return false;
    };
    let live_hash = canonical_hash(&state);
    let Some(result) = service.record_game_result() else {
        println!("[FAIL] role={}: result not recorded", role);
        return false;
    };

    let replay = service
        .journal()
        .ok_or_else(|| "no journal".to_string())
        .and_then(|j| verify_determinism(j, service.catalog()).map_err(|e| e.to_string()));
    let save = encode_save(&state)
        .and_then(|json| decode_save(&json))
        .map_err(|e| e.to_string());
    service.reset_game();

    let replay_ok = matches!(&replay, Ok(h) if *h == live_hash);
    let save_ok = matches!(&save, Ok(s) if *s == state);
    if replay_ok && save_ok {
        println!(
            "[PASS] role={}: score={} rating={:?} branch={:?} achievements={} hash={}",
            role,
            result.score,
            result.rating,
            result.story_branch,
            result.achievements.len(),
            live_hash
        );
        true
    } else {
        println!("[FAIL] role={}:", role);
        if !replay_ok {
            println!("  Replay mismatch: live={} replay={:?}", live_hash, replay);
        }
        if !save_ok {
            println!("  Save roundtrip failed: {:?}", save.err());
        }
        false
    }
}
