//! Genetic-algorithm training of heuristic weights.
//!
//! Individuals are candidate
//! [`HeuristicsWeights`](heurtris_evaluator::HeuristicsWeights) vectors. Each generation
//! they play a fixed number of games with the two-piece lookahead agent, and
//! the best ones seed the next generation.
//!
//! # How Training Works
//!
//! 1. **Population** - Start from random weights, or resume from a checkpoint
//! 2. **Evaluation** - Each unevaluated individual plays
//!    `trials_per_individual` games on a pool of worker threads
//! 3. **Fitness** - `trials / (lines + 0.01 * score)`, lower is better
//! 4. **Selection** - Sort ascending; stop if the best fitness is below the
//!    convergence threshold
//! 5. **Reproduction** - Copy the elites, then fill the population with
//!    single-point crossover children of parents drawn uniformly from the top
//!    ranks, with per-gene random reset mutation
//! 6. **Checkpoint** - Write the bred population to `gen_<n>.bin`
//!
//! # Architecture
//!
//! ```text
//! Trainer (state machine, trainer.rs)
//!     ↓ evaluates with
//! Worker pool (evaluation.rs)
//!     ↓ plays games with
//! HeuristicAgent (heurtris-evaluator)
//!     ↓ produces
//! Fitness (individual.rs)
//!     ↓ ranks
//! Population::breed (population.rs)
//!     ↓ persisted by
//! Checkpoint (checkpoint.rs)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use heurtris_training::{Trainer, TrainingConfig};
//!
//! let config = TrainingConfig {
//!     population_size: 20,
//!     ..TrainingConfig::default()
//! };
//! let mut trainer = Trainer::new(config, 42)?.with_checkpoint_dir("checkpoints");
//! let reason = trainer.run(|report| {
//!     println!("generation {}: {}", report.generation, report.population.best_fitness());
//! })?;
//! println!("stopped: {reason}");
//! # Ok::<(), heurtris_training::TrainError>(())
//! ```
//!
//! # Current Limitations
//!
//! - **Noisy fitness**: worker games are seeded per worker, so which piece
//!   sequences an individual sees depends on scheduling; fitness values are
//!   not reproducible across runs with more than one worker
//! - **Simple GA**: no adaptive mutation, no tournament selection, no island
//!   models

pub use self::{
    config::{ConfigError, TrainingConfig},
    evaluation::{EvaluationError, EvaluationProgress, evaluate_population},
    individual::{Cancelled, Individual, TrialProgress},
    population::Population,
    trainer::{GenerationReport, StopReason, TrainError, Trainer, TrainerState},
};

pub mod checkpoint;
mod config;
mod evaluation;
pub mod individual;
mod population;
pub mod stats;
mod trainer;
