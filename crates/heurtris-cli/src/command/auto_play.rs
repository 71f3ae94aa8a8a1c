use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use heurtris_engine::{Game, GameMode, GameState, GameStats, PieceSeed};
use heurtris_evaluator::{HeuristicAgent, HeuristicsWeights};
use heurtris_training::individual;
use log::debug;
use rand::Rng as _;

use crate::model::HeuristicModel;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum PlayMode {
    /// 40-line sprint
    Lines,
    /// Two-minute blitz
    Blitz,
    /// Play until topping out
    #[default]
    Zen,
}

impl From<PlayMode> for GameMode {
    fn from(mode: PlayMode) -> Self {
        match mode {
            PlayMode::Lines => GameMode::SPRINT,
            PlayMode::Blitz => GameMode::BLITZ,
            PlayMode::Zen => GameMode::Zen,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Path to the model file (JSON format); built-in weights if omitted
    #[arg(long)]
    model: Option<PathBuf>,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Game mode: lines, blitz or zen
    #[arg(long, default_value = "zen")]
    mode: PlayMode,
    /// Pieces per second used to advance the game clock (wall clock if 0)
    #[arg(long, default_value_t = 0.0)]
    pps: f64,
    /// Stop a game once this many lines are cleared
    #[arg(long, default_value_t = usize::MAX)]
    max_lines: usize,
    /// Seed of the first game (random if omitted); game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        model,
        games,
        mode,
        pps,
        max_lines,
        seed,
    } = arg;
    anyhow::ensure!(
        pps.is_finite() && *pps >= 0.0,
        "pieces per second must be a non-negative number, got {pps}"
    );

    let weights = match model {
        Some(path) => {
            let model = HeuristicModel::open(path)?;
            eprintln!(
                "Loaded model {} (generation {}, fitness {:.6})",
                model.name, model.generation, model.fitness
            );
            model.weights
        }
        None => HeuristicsWeights::default(),
    };
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let piece_interval = (*pps > 0.0).then(|| Duration::from_secs_f64(1.0 / pps));

    let mut agent = HeuristicAgent::new(weights);
    let mut total_lines = 0;
    let mut total_score = 0;
    for i in 0..*games {
        let game_seed = seed.wrapping_add(i as u64);
        let mut game = Game::new((*mode).into(), PieceSeed::from_u64(game_seed));
        let stats = play(&mut agent, &mut game, *max_lines, piece_interval);
        total_lines += stats.total_cleared_lines();
        total_score += stats.score();
        print_game(i, game_seed, &game, &stats);
    }

    if *games > 0 {
        eprintln!("Total ({games} games):");
        eprintln!("  Lines: {total_lines}");
        eprintln!("  Score: {total_score}");
        eprintln!(
            "  Fitness: {:.6}",
            individual::fitness(*games, total_lines, total_score)
        );
    }
    Ok(())
}

/// Plays until the game is over or `max_lines` are cleared.
///
/// The game clock advances by `piece_interval` per piece, or by the wall
/// clock time spent searching if `None`.
fn play(
    agent: &mut HeuristicAgent,
    game: &mut Game,
    max_lines: usize,
    piece_interval: Option<Duration>,
) -> GameStats {
    let mut last = Instant::now();
    while !game.is_over() && game.stats().total_cleared_lines() < max_lines {
        if let Err(err) = agent.step(game) {
            debug!("game ended on a rejected move: {err}");
            break;
        }
        let now = Instant::now();
        game.tick(piece_interval.unwrap_or(now - last));
        last = now;
    }
    game.stats().clone()
}

#[expect(clippy::cast_precision_loss)]
fn print_game(index: usize, seed: u64, game: &Game, stats: &GameStats) {
    let end = match game.state() {
        GameState::Playing => "line cap reached".to_owned(),
        GameState::Over(reason) => format!("{reason:?}"),
    };
    let elapsed = game.elapsed().as_secs_f64();
    let pps = if elapsed > 0.0 {
        stats.completed_pieces() as f64 / elapsed
    } else {
        0.0
    };
    eprintln!("Game #{index} (seed {seed}): {end}");
    eprintln!("  Pieces:   {} ({pps:.2}/s)", stats.completed_pieces());
    eprintln!("  Lines:    {}", stats.total_cleared_lines());
    eprintln!("  Cleared:  {:?}", stats.line_cleared_counter());
    eprintln!("  Tetrises: {}", stats.tetrises());
    eprintln!("  Score:    {}", stats.score());
}
