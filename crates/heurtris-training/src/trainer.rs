//! Generation loop of the genetic algorithm.
//!
//! # How It Works
//!
//! ```text
//! Idle → Evaluating → Breeding → Checkpointed → Evaluating → …
//!            │                        │
//!            ├─ best < threshold ─→ Converged
//!            └─ cancel ──────────→ Cancelled     generation > max ─→ MaxGenerationsReached
//! ```
//!
//! 1. **Evaluating**: every unevaluated individual plays its trials on the
//!    worker pool (see [`evaluate_population`])
//! 2. **Breeding**: the population is sorted; if the best fitness is already
//!    below `convergence_fitness` it is kept as is, otherwise elites and
//!    children form the next generation and the counter is incremented
//! 3. **Checkpointed**: the bred population is written to the checkpoint
//!    directory, if one is set
//!
//! A cancelled evaluation discards the generation: the population is restored
//! to its state before evaluation, nothing is bred and nothing is written, so
//! the last checkpoint stays the resume point.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::info;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    Population, TrainingConfig,
    checkpoint::{self, CheckpointError},
    config::ConfigError,
    evaluation::{EvaluationError, evaluate_population},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TrainerState {
    Idle,
    Evaluating,
    Breeding,
    Checkpointed,
    Converged,
    MaxGenerationsReached,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StopReason {
    #[display("converged")]
    Converged,
    #[display("reached the maximum generation")]
    MaxGenerationsReached,
    #[display("cancelled")]
    Cancelled,
}

impl From<StopReason> for TrainerState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Converged => Self::Converged,
            StopReason::MaxGenerationsReached => Self::MaxGenerationsReached,
            StopReason::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display("invalid training config: {_0}")]
    Config(ConfigError),
    #[display("{_0}")]
    Checkpoint(CheckpointError),
    #[display("training cancelled")]
    Cancelled,
    #[display("an evaluation worker panicked")]
    WorkerPanicked,
}

impl From<ConfigError> for TrainError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<CheckpointError> for TrainError {
    fn from(err: CheckpointError) -> Self {
        Self::Checkpoint(err)
    }
}

impl From<EvaluationError> for TrainError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::Cancelled => Self::Cancelled,
            EvaluationError::WorkerPanicked => Self::WorkerPanicked,
        }
    }
}

/// Outcome of one evaluated generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Generation that was evaluated.
    pub generation: u32,
    /// The evaluated population, sorted by fitness.
    pub population: Population,
    pub elapsed: Duration,
    /// Checkpoint written after breeding, if any.
    pub checkpoint: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Trainer {
    config: TrainingConfig,
    population: Population,
    generation: u32,
    state: TrainerState,
    rng: Pcg32,
    checkpoint_dir: Option<PathBuf>,
    cancel: Arc<AtomicBool>,
}

impl Trainer {
    /// Starts from a random population at generation 0.
    pub fn new(config: TrainingConfig, seed: u64) -> Result<Self, TrainError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = Population::random(config.population_size, &mut rng);
        Ok(Self::from_parts(config, population, 0, rng))
    }

    /// Starts from `population` at `generation`.
    pub fn with_population(
        config: TrainingConfig,
        population: Population,
        generation: u32,
        seed: u64,
    ) -> Result<Self, TrainError> {
        config.validate()?;
        if population.len() != config.population_size {
            return Err(CheckpointError::SizeMismatch {
                expected: config.population_size,
                found: population.len(),
            }
            .into());
        }
        let rng = Pcg32::seed_from_u64(seed);
        Ok(Self::from_parts(config, population, generation, rng))
    }

    /// Resumes from the checkpoint of `generation` (or the latest one) in `dir`.
    ///
    /// Falls back to a random population at generation 0 if no usable
    /// checkpoint is found. New checkpoints are written to `dir`.
    pub fn resume(
        config: TrainingConfig,
        seed: u64,
        dir: &Path,
        generation: Option<u32>,
    ) -> Result<Self, TrainError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let checkpoint = checkpoint::load_or_init(dir, generation, &config, &mut rng);
        let trainer = Self::from_parts(config, checkpoint.population, checkpoint.generation, rng);
        Ok(trainer.with_checkpoint_dir(dir))
    }

    fn from_parts(
        config: TrainingConfig,
        population: Population,
        generation: u32,
        rng: Pcg32,
    ) -> Self {
        Self {
            config,
            population,
            generation,
            state: TrainerState::Idle,
            rng,
            checkpoint_dir: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn with_checkpoint_dir<P>(mut self, dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    /// Setting the returned flag cancels the running generation.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    #[must_use]
    pub fn should_stop(&self) -> Option<StopReason> {
        if self.cancel.load(Ordering::Relaxed) {
            Some(StopReason::Cancelled)
        } else if self.population.best_fitness() < self.config.convergence_fitness {
            Some(StopReason::Converged)
        } else if self.generation > self.config.max_generations {
            Some(StopReason::MaxGenerationsReached)
        } else {
            None
        }
    }

    /// Evaluates the current generation and breeds the next one.
    ///
    /// On cancellation the generation is discarded, including the fitness of
    /// individuals that finished before the cancel, and
    /// [`TrainError::Cancelled`] is returned.
    pub fn run_generation(&mut self) -> Result<GenerationReport, TrainError> {
        let start = Instant::now();
        let generation = self.generation;

        self.state = TrainerState::Evaluating;
        info!("generation {generation}: evaluating {} individuals", self.population.len());
        let unevaluated = self.population.clone();
        if let Err(err) = evaluate_population(
            self.population.individuals_mut(),
            &self.config,
            &mut self.rng,
            &self.cancel,
        ) {
            self.population = unevaluated;
            if err == EvaluationError::Cancelled {
                self.state = TrainerState::Cancelled;
            }
            return Err(err.into());
        }
        self.population.sort_by_fitness();
        let evaluated = self.population.clone();
        let best_fitness = evaluated.best_fitness();

        if best_fitness < self.config.convergence_fitness {
            self.state = TrainerState::Converged;
            info!("generation {generation}: converged with fitness {best_fitness:.6}");
            return Ok(GenerationReport {
                generation,
                population: evaluated,
                elapsed: start.elapsed(),
                checkpoint: None,
            });
        }

        self.state = TrainerState::Breeding;
        self.population = self.population.breed(&self.config, &mut self.rng);
        self.generation += 1;

        let checkpoint = match &self.checkpoint_dir {
            Some(dir) => {
                let path = checkpoint::save(dir, self.generation, &self.population)?;
                self.state = TrainerState::Checkpointed;
                Some(path)
            }
            None => {
                self.state = TrainerState::Idle;
                None
            }
        };

        info!(
            "generation {generation}: best fitness {best_fitness:.6} ({:.1?})",
            start.elapsed()
        );
        Ok(GenerationReport {
            generation,
            population: evaluated,
            elapsed: start.elapsed(),
            checkpoint,
        })
    }

    /// Runs generations until [`Trainer::should_stop`] gives a reason.
    ///
    /// `on_generation` is called with every evaluated generation.
    pub fn run<F>(&mut self, mut on_generation: F) -> Result<StopReason, TrainError>
    where
        F: FnMut(&GenerationReport),
    {
        loop {
            if let Some(reason) = self.should_stop() {
                self.state = reason.into();
                info!("training stopped at generation {}: {reason}", self.generation);
                return Ok(reason);
            }
            match self.run_generation() {
                Ok(report) => on_generation(&report),
                Err(TrainError::Cancelled) => {
                    info!("training cancelled at generation {}", self.generation);
                    return Ok(StopReason::Cancelled);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
