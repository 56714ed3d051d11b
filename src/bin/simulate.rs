use clap::Parser;
use packman_sim::config::SimConfig;
use packman_sim::engine::{Autopilot, GameEngine};
use packman_sim::error::EngineError;
use packman_sim::types::{Phase, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Runs seeded headless games on the classic maze with the autopilot at the
/// controls and prints one JSON line per game.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    games: u32,
    /// Seed of the first game; later games count up from it.
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 12_000)]
    max_ticks: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct GameResultLine {
    game: u32,
    seed: u32,
    outcome: String,
    score: u32,
    lives: u32,
    ticks: u64,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u64,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    captures: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct GameRunResult {
    result: GameResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "gameCount")]
    game_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "bestScore")]
    best_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    games: Vec<GameResultLine>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => match SimConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, path = %path.display(), "failed to load config");
                std::process::exit(2);
            }
        },
        None => SimConfig::load(),
    };
    let first_seed = cli.seed.unwrap_or(config.seed);
    let run_started_at_ms = now_ms();
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(first_seed, run_started_at_ms));

    let mut has_anomaly = false;
    let mut game_results = Vec::new();
    let mut total_anomalies = 0usize;

    for game in 0..cli.games {
        let seed = first_seed.wrapping_add(game);
        info!(%match_id, game, seed, "game started");
        let run = match run_game(&config, game, seed, cli.max_ticks) {
            Ok(run) => run,
            Err(err) => {
                error!(%err, "cannot build the classic game");
                std::process::exit(2);
            }
        };

        for anomaly in &run.anomaly_records {
            warn!(%match_id, game, seed, tick = anomaly.tick, message = %anomaly.message, "anomaly detected");
        }
        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();
        info!(
            %match_id,
            game,
            seed,
            outcome = %run.result.outcome,
            score = run.result.score,
            ticks = run.result.ticks,
            "game finished"
        );

        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(err) => error!(%err, "failed to serialize game result"),
        }
        game_results.push(run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        game_results,
        total_anomalies,
    );

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(%err, path = %path.display(), "summary write failed");
            std::process::exit(2);
        }
    }

    info!(
        %match_id,
        games = summary.game_count,
        anomalies = summary.anomaly_count,
        average_score = summary.average_score,
        best_score = summary.best_score,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_game(
    config: &SimConfig,
    game: u32,
    seed: u32,
    max_ticks: u64,
) -> Result<GameRunResult, EngineError> {
    let config = SimConfig {
        seed,
        ..config.clone()
    };
    let mut engine = GameEngine::classic(config)?;
    let mut pilot = Autopilot::new(seed);
    engine.start();

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous: Option<Snapshot> = None;

    while !engine.is_ended() && engine.tick_count() < max_ticks {
        let dir = pilot.choose(&engine);
        engine.set_requested_direction(dir);
        engine.tick();
        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(previous.as_ref(), &snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        previous = Some(snapshot);
    }

    let summary = engine.build_summary();
    let outcome = match summary.phase {
        Phase::Won => "won",
        Phase::Lost => "lost",
        Phase::Playing => "tick_limit",
    };
    Ok(GameRunResult {
        result: GameResultLine {
            game,
            seed,
            outcome: outcome.to_string(),
            score: summary.score,
            lives: summary.lives,
            ticks: summary.ticks,
            elapsed_ms: summary.elapsed_ms,
            pellets_eaten: summary.pellets_eaten,
            power_pellets_eaten: summary.power_pellets_eaten,
            captures: summary.captures,
            lives_lost: summary.lives_lost,
            anomalies,
        },
        anomaly_records,
    })
}

fn collect_snapshot_anomalies(previous: Option<&Snapshot>, snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if let Some(previous) = previous {
        if snapshot.score < previous.score {
            anomalies.push(format!(
                "score decreased: {} -> {}",
                previous.score, snapshot.score
            ));
        }
        if snapshot.lives > previous.lives {
            anomalies.push(format!(
                "lives increased: {} -> {}",
                previous.lives, snapshot.lives
            ));
        }
        if snapshot.remaining_pellets > previous.remaining_pellets {
            anomalies.push("pellets reappeared".to_string());
        }
    }

    let is_wall = |col: i32, row: i32| {
        usize::try_from(row)
            .ok()
            .and_then(|row| snapshot.tiles.get(row))
            .zip(usize::try_from(col).ok())
            .and_then(|(line, col)| line.chars().nth(col))
            .map(|tile| tile == '#')
            .unwrap_or(true)
    };
    if is_wall(snapshot.player.col, snapshot.player.row) {
        anomalies.push(format!(
            "player inside wall at ({}, {})",
            snapshot.player.col, snapshot.player.row
        ));
    }
    for pursuer in &snapshot.pursuers {
        if is_wall(pursuer.col, pursuer.row) {
            anomalies.push(format!("pursuer {} inside wall", pursuer.id));
        }
        if pursuer.vulnerable && pursuer.vulnerable_until <= snapshot.now_ms {
            anomalies.push(format!("pursuer {} vulnerable past deadline", pursuer.id));
        }
    }

    let tokens_left = snapshot.remaining_pellets + snapshot.remaining_power_pellets;
    if snapshot.phase == Phase::Won && tokens_left > 0 {
        anomalies.push(format!("won with {tokens_left} tokens left"));
    }
    if snapshot.lives == 0 && snapshot.phase != Phase::Lost {
        anomalies.push("no lives left but game not lost".to_string());
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    games: Vec<GameResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let game_count = games.len();
    let total_score: u64 = games.iter().map(|game| game.score as u64).sum();
    let average_score = if game_count == 0 {
        0
    } else {
        (total_score / game_count as u64) as u32
    };
    let best_score = games.iter().map(|game| game.score).max().unwrap_or(0);
    let mut outcome_counts = BTreeMap::new();
    for game in &games {
        *outcome_counts.entry(game.outcome.clone()).or_insert(0) += 1;
    }
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        game_count,
        anomaly_count,
        average_score,
        best_score,
        outcome_counts,
        games,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
