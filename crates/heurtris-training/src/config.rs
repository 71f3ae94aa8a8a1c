use std::{num::NonZeroUsize, thread, time::Duration};

use serde::{Deserialize, Serialize};

/// Knobs of a training run.
///
/// Every field has a default, so a JSON file only needs the fields it changes:
///
/// ```
/// use heurtris_training::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{ "population_size": 50 }"#).unwrap();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.elitism_count, 5);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Number of individuals per generation.
    pub population_size: usize,
    /// Number of best individuals copied unchanged into the next generation.
    pub elitism_count: usize,
    /// Probability that a gene is replaced by a fresh random value during crossover.
    pub mutation_rate: f64,
    /// Parents are drawn uniformly from this many best-ranked individuals.
    pub top_n_parents: usize,
    /// Games played to evaluate one individual.
    pub trials_per_individual: usize,
    /// A trial ends once this many lines are cleared.
    pub max_lines_per_trial: usize,
    /// Size of the evaluation worker pool.
    pub worker_threads: usize,
    /// Training stops once the generation counter exceeds this value, so
    /// generations `0..=max_generations` are evaluated.
    pub max_generations: u32,
    /// Training stops once the best fitness drops below this value.
    pub convergence_fitness: f64,
    /// Interval between two progress reports while a generation is evaluated.
    pub poll_interval_ms: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elitism_count: 5,
            mutation_rate: 0.03,
            top_n_parents: 40,
            trials_per_individual: 20,
            max_lines_per_trial: 1_000_000,
            worker_threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            max_generations: 1000,
            convergence_fitness: 1e-6,
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display(
        "elitism count ({elitism_count}) must be smaller than the population size ({population_size})"
    )]
    ElitismTooLarge {
        elitism_count: usize,
        population_size: usize,
    },
    #[display(
        "parent pool size ({top_n_parents}) must be between 1 and the population size ({population_size})"
    )]
    ParentPoolOutOfRange {
        top_n_parents: usize,
        population_size: usize,
    },
    #[display("mutation rate ({mutation_rate}) must be within [0, 1]")]
    MutationRateOutOfRange { mutation_rate: f64 },
    #[display("trials per individual must be at least 1")]
    NoTrials,
    #[display("max lines per trial must be at least 1")]
    NoLineCap,
    #[display("worker thread count must be at least 1")]
    NoWorkers,
    #[display("convergence fitness ({convergence_fitness}) must be a positive finite number")]
    InvalidConvergenceFitness { convergence_fitness: f64 },
}

impl TrainingConfig {
    /// Rejects settings that would break breeding or evaluation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elitism_count >= self.population_size {
            return Err(ConfigError::ElitismTooLarge {
                elitism_count: self.elitism_count,
                population_size: self.population_size,
            });
        }
        if !(1..=self.population_size).contains(&self.top_n_parents) {
            return Err(ConfigError::ParentPoolOutOfRange {
                top_n_parents: self.top_n_parents,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange {
                mutation_rate: self.mutation_rate,
            });
        }
        if self.trials_per_individual == 0 {
            return Err(ConfigError::NoTrials);
        }
        if self.max_lines_per_trial == 0 {
            return Err(ConfigError::NoLineCap);
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if !self.convergence_fitness.is_finite() || self.convergence_fitness <= 0.0 {
            return Err(ConfigError::InvalidConvergenceFitness {
                convergence_fitness: self.convergence_fitness,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
