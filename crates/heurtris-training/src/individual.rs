use std::{
    ops::RangeInclusive,
    sync::atomic::{AtomicBool, Ordering},
};

use heurtris_engine::Game;
use heurtris_evaluator::{HeuristicAgent, HeuristicsWeights};
use log::debug;
use rand::Rng;

use crate::TrainingConfig;

/// Genes are drawn uniformly from this range.
pub const GENE_RANGE: RangeInclusive<f64> = -1.0..=1.0;

/// Weight of the total score relative to the total lines in the fitness.
const SCORE_FACTOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("evaluation cancelled")]
pub struct Cancelled;

/// Telemetry of an evaluation in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialProgress {
    pub current_trial: usize,
    pub total_lines: usize,
    pub total_score: u64,
    pub running: bool,
}

/// A candidate weight vector and its fitness.
///
/// Fitness is cost-like: lower is better. `f64::INFINITY` means the individual
/// has not been evaluated yet; once the fitness is finite, evaluating again is
/// a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: HeuristicsWeights,
    fitness: f64,
    progress: TrialProgress,
}

impl Individual {
    /// Creates an unevaluated individual.
    #[must_use]
    pub fn new(chromosome: HeuristicsWeights) -> Self {
        Self::with_fitness(chromosome, f64::INFINITY)
    }

    #[must_use]
    pub fn with_fitness(chromosome: HeuristicsWeights, fitness: f64) -> Self {
        Self {
            chromosome,
            fitness,
            progress: TrialProgress::default(),
        }
    }

    /// Creates an individual with every gene drawn from [`GENE_RANGE`].
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(HeuristicsWeights::from_fn(|_| random_gene(rng)))
    }

    /// Breeds a child with single-point crossover at a random point in `0..9`.
    pub fn crossover<R>(
        a: &HeuristicsWeights,
        b: &HeuristicsWeights,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let point = rng.random_range(0..HeuristicsWeights::LEN);
        Self::crossover_at(a, b, point, mutation_rate, rng)
    }

    /// Breeds a child taking genes before `point` from `a` and the rest from `b`.
    ///
    /// Each gene is instead replaced by a fresh random value with probability
    /// `mutation_rate`.
    ///
    /// # Example
    ///
    /// ```
    /// use heurtris_evaluator::HeuristicsWeights;
    /// use heurtris_training::Individual;
    ///
    /// let a = HeuristicsWeights::from_array([0.1; 9]);
    /// let b = HeuristicsWeights::from_array([0.9; 9]);
    /// let child = Individual::crossover_at(&a, &b, 3, 0.0, &mut rand::rng());
    /// assert_eq!(child.chromosome()[2], 0.1);
    /// assert_eq!(child.chromosome()[3], 0.9);
    /// ```
    pub fn crossover_at<R>(
        a: &HeuristicsWeights,
        b: &HeuristicsWeights,
        point: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let chromosome = HeuristicsWeights::from_fn(|i| {
            if rng.random::<f64>() < mutation_rate {
                random_gene(rng)
            } else if i < point {
                a[i]
            } else {
                b[i]
            }
        });
        Self::new(chromosome)
    }

    #[must_use]
    pub const fn chromosome(&self) -> &HeuristicsWeights {
        &self.chromosome
    }

    #[must_use]
    pub const fn fitness(&self) -> f64 {
        self.fitness
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_finite()
    }

    #[must_use]
    pub const fn progress(&self) -> &TrialProgress {
        &self.progress
    }

    /// Plays `config.trials_per_individual` games with this chromosome on `game`
    /// and stores the resulting fitness.
    ///
    /// Returns the stored fitness without playing if it is already finite.
    /// `cancel` is checked before each trial; a cancelled evaluation leaves the
    /// individual unevaluated.
    pub fn evaluate(
        &mut self,
        config: &TrainingConfig,
        game: &mut Game,
        cancel: &AtomicBool,
    ) -> Result<f64, Cancelled> {
        if self.is_evaluated() {
            return Ok(self.fitness);
        }

        self.progress = TrialProgress {
            running: true,
            ..TrialProgress::default()
        };
        let mut agent = HeuristicAgent::new(self.chromosome);
        for trial in 0..config.trials_per_individual {
            if cancel.load(Ordering::Relaxed) {
                self.progress.running = false;
                return Err(Cancelled);
            }
            self.progress.current_trial = trial;
            game.new_game();
            let stats = agent.play_game(game, config.max_lines_per_trial);
            self.progress.total_lines += stats.total_cleared_lines();
            self.progress.total_score += stats.score();
            debug!(
                "trial {trial}: {} lines, {} points, {} pieces",
                stats.total_cleared_lines(),
                stats.score(),
                stats.completed_pieces()
            );
        }
        self.progress.running = false;

        self.fitness = fitness(
            config.trials_per_individual,
            self.progress.total_lines,
            self.progress.total_score,
        );
        Ok(self.fitness)
    }
}

/// Computes `trials / (lines + 0.01 * score)`.
///
/// Play that clears nothing and scores nothing gets `f64::MAX`, the worst
/// finite fitness, so it still counts as evaluated.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn fitness(trials: usize, total_lines: usize, total_score: u64) -> f64 {
    let denominator = total_lines as f64 + SCORE_FACTOR * total_score as f64;
    if denominator > 0.0 {
        trials as f64 / denominator
    } else {
        f64::MAX
    }
}

fn random_gene<R>(rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    rng.random_range(GENE_RANGE)
}
