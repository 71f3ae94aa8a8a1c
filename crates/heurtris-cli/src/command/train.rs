use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context as _;
use chrono::Utc;
use heurtris_evaluator::HeuristicsWeights;
use heurtris_training::{GenerationReport, Individual, StopReason, Trainer, TrainingConfig};
use log::{info, warn};
use rand::Rng as _;

use crate::{model::HeuristicModel, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training config file (JSON); missing fields use their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for generation checkpoints; training resumes from the latest one
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
    /// Resume from this generation instead of the latest checkpoint
    #[arg(long, requires = "checkpoint_dir")]
    resume_generation: Option<u32>,
    /// Seed for the population and the worker games (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Name stored in the model file
    #[arg(long, default_value = "heuristic")]
    name: String,
    /// Model output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Default, Debug, Clone, clap::Args)]
struct ConfigOverrides {
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    elitism_count: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    top_n_parents: Option<usize>,
    #[arg(long)]
    trials_per_individual: Option<usize>,
    #[arg(long)]
    max_lines_per_trial: Option<usize>,
    #[arg(long)]
    worker_threads: Option<usize>,
    #[arg(long)]
    max_generations: Option<u32>,
    #[arg(long)]
    convergence_fitness: Option<f64>,
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut TrainingConfig) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        set(&mut config.population_size, self.population_size);
        set(&mut config.elitism_count, self.elitism_count);
        set(&mut config.mutation_rate, self.mutation_rate);
        set(&mut config.top_n_parents, self.top_n_parents);
        set(&mut config.trials_per_individual, self.trials_per_individual);
        set(&mut config.max_lines_per_trial, self.max_lines_per_trial);
        set(&mut config.worker_threads, self.worker_threads);
        set(&mut config.max_generations, self.max_generations);
        set(&mut config.convergence_fitness, self.convergence_fitness);
        set(&mut config.poll_interval_ms, self.poll_interval_ms);
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        checkpoint_dir,
        resume_generation,
        seed,
        name,
        output,
        overrides,
    } = arg;

    let mut config = match config {
        Some(path) => util::read_json_file("training config", path)?,
        None => TrainingConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid training config")?;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Training with seed {seed}");
    eprintln!("{config:#?}");

    let mut trainer = match checkpoint_dir {
        Some(dir) => Trainer::resume(config, seed, dir, *resume_generation)?,
        None => Trainer::new(config, seed)?,
    };
    install_cancel_handler(trainer.cancel_flag())?;

    let mut best: Option<(u32, Individual)> = None;
    let reason = trainer.run(|report| {
        print_report(report);
        if let Some(individual) = report.population.best() {
            best = Some((report.generation, individual.clone()));
        }
    })?;

    eprintln!("Training stopped at generation {}: {reason}", trainer.generation());
    if reason == StopReason::Cancelled {
        eprintln!("  The running generation was discarded");
    }

    let Some((generation, best)) = best.filter(|(_, individual)| individual.is_evaluated()) else {
        warn!("no generation was evaluated, model not saved");
        return Ok(());
    };

    let model = HeuristicModel {
        name: name.clone(),
        trained_at: Utc::now(),
        generation,
        fitness: best.fitness(),
        weights: *best.chromosome(),
    };
    util::save_json(&model, output.as_deref())?;
    match output {
        Some(path) => info!("model of generation {generation} written to {}", path.display()),
        None => info!("model of generation {generation} written to stdout"),
    }

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Fitness: {:.6}", model.fitness);

    Ok(())
}

fn install_cancel_handler(cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if !cancel.swap(true, Ordering::Relaxed) {
            eprintln!("Cancelling, waiting for running trials to finish...");
        }
    })
    .context("Failed to install the Ctrl-C handler")
}

fn print_report(report: &GenerationReport) {
    let population = &report.population;
    eprintln!("Generation #{} ({:.1?}):", report.generation, report.elapsed);

    eprintln!("  Individuals:");
    for (i, ind) in population.individuals().iter().enumerate() {
        eprintln!(
            "  {i:3}: {:.3?} => {:.6} ({} lines, {} points)",
            ind.chromosome().to_array(),
            ind.fitness(),
            ind.progress().total_lines,
            ind.progress().total_score,
        );
    }

    let weight_stats = population.weight_stats();
    eprintln!("  Weights Stats:");
    eprintln!("    Names:      {:?}", HeuristicsWeights::NAMES);
    eprintln!(
        "    Min:        {:.3?}",
        weight_stats.iter().map(|s| s.min).collect::<Vec<_>>(),
    );
    eprintln!(
        "    Max:        {:.3?}",
        weight_stats.iter().map(|s| s.max).collect::<Vec<_>>(),
    );
    eprintln!(
        "    Mean:       {:.3?}",
        weight_stats.iter().map(|s| s.mean).collect::<Vec<_>>(),
    );
    eprintln!(
        "    NormStddev: {:.3?}",
        weight_stats
            .iter()
            .map(|s| s.normalized_std_dev)
            .collect::<Vec<_>>(),
    );

    if let Some(fitness_stats) = population.fitness_stats() {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:    {:.6}", fitness_stats.min);
        eprintln!("    Median: {:.6}", fitness_stats.median);
        eprintln!("    Max:    {:.6}", fitness_stats.max);
        eprintln!("    Mean:   {:.6}", fitness_stats.mean);
    }

    if let Some(path) = &report.checkpoint {
        eprintln!("  Checkpoint: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        arg: TrainArg,
    }

    #[test]
    fn test_overrides_replace_only_given_knobs() {
        let cli = Cli::parse_from([
            "heurtris",
            "--population-size",
            "30",
            "--mutation-rate",
            "0.1",
        ]);
        let mut config = TrainingConfig::default();
        cli.arg.overrides.apply(&mut config);
        assert_eq!(config.population_size, 30);
        assert_eq!(config.mutation_rate, 0.1);
        assert_eq!(config.elitism_count, TrainingConfig::default().elitism_count);
    }

    #[test]
    fn test_resume_generation_requires_checkpoint_dir() {
        let result = Cli::try_parse_from(["heurtris", "--resume-generation", "3"]);
        assert!(result.is_err());
    }
}
