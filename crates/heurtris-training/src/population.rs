use heurtris_evaluator::HeuristicsWeights;
use rand::Rng;

use crate::{Individual, TrainingConfig, stats::Summary};

/// An ordered set of individuals.
///
/// Individuals are identified only by their position. After evaluation the
/// population is sorted ascending by fitness, so index 0 is the best.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `size` random, unevaluated individuals.
    pub fn random<R>(size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..size).map(|_| Individual::random(rng)).collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Sorts ascending by fitness (best first); unevaluated individuals go last.
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
    }

    #[must_use]
    pub fn is_sorted_by_fitness(&self) -> bool {
        self.individuals
            .is_sorted_by(|a, b| a.fitness().total_cmp(&b.fitness()).is_le())
    }

    /// Returns the individual with the lowest fitness.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    /// Returns the lowest fitness, `f64::INFINITY` if nothing is evaluated.
    #[must_use]
    pub fn best_fitness(&self) -> f64 {
        self.best().map_or(f64::INFINITY, Individual::fitness)
    }

    /// Breeds the next generation.
    ///
    /// 1. The first `elitism_count` individuals are copied unchanged, fitness included
    /// 2. The rest are children of two parents drawn uniformly from the first
    ///    `top_n_parents` individuals (a parent may be drawn twice)
    ///
    /// The population must be sorted by fitness and `config` must be valid.
    #[must_use]
    pub fn breed<R>(&self, config: &TrainingConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        debug_assert!(self.is_sorted_by_fitness());
        let size = self.individuals.len();
        let mut next = Vec::with_capacity(size);

        next.extend(self.individuals.iter().take(config.elitism_count).cloned());

        let pool = &self.individuals[..config.top_n_parents.min(size)];
        while next.len() < size {
            let a = &pool[rng.random_range(0..pool.len())];
            let b = &pool[rng.random_range(0..pool.len())];
            next.push(Individual::crossover(
                a.chromosome(),
                b.chromosome(),
                config.mutation_rate,
                rng,
            ));
        }

        Self { individuals: next }
    }

    /// Statistics over the fitness of every individual.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<Summary> {
        Summary::of(self.individuals.iter().map(Individual::fitness))
    }

    /// Statistics over each weight slot, in slot order.
    #[must_use]
    pub fn weight_stats(&self) -> Vec<Summary> {
        (0..HeuristicsWeights::LEN)
            .filter_map(|i| {
                Summary::of(self.individuals.iter().map(|ind| ind.chromosome()[i]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn ranked(fitness: &[f64]) -> Population {
        let individuals = fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                Individual::with_fitness(HeuristicsWeights::from_fn(|_| i as f64 / 10.0), f)
            })
            .collect();
        Population::from_individuals(individuals)
    }

    #[test]
    fn test_sort_puts_unevaluated_last() {
        let mut population = ranked(&[0.3, f64::INFINITY, 0.1]);
        population.sort_by_fitness();
        let fitness: Vec<_> = population.individuals().iter().map(Individual::fitness).collect();
        assert_eq!(fitness, [0.1, 0.3, f64::INFINITY]);
        assert_eq!(population.best_fitness(), 0.1);
    }

    #[test]
    fn test_elite_copied_and_children_from_parent_pool() {
        let population = ranked(&[0.1, 0.2, 0.3, 0.4]);
        let config = TrainingConfig {
            population_size: 4,
            elitism_count: 1,
            top_n_parents: 2,
            mutation_rate: 0.0,
            ..TrainingConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let next = population.breed(&config, &mut rng);

        assert_eq!(next.len(), 4);
        assert_eq!(next.individuals()[0], population.individuals()[0]);
        assert_eq!(next.individuals()[0].fitness(), 0.1);

        let pool_genes = [0.0, 0.1];
        for child in &next.individuals()[1..] {
            assert!(!child.is_evaluated());
            for gene in child.chromosome().iter() {
                assert!(pool_genes.contains(&gene), "gene {gene} not from the parent pool");
            }
        }
    }

    #[test]
    fn test_breeding_is_reproducible() {
        let population = ranked(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        let config = TrainingConfig {
            population_size: 5,
            elitism_count: 2,
            top_n_parents: 3,
            ..TrainingConfig::default()
        };
        let a = population.breed(&config, &mut Pcg32::seed_from_u64(1));
        let b = population.breed(&config, &mut Pcg32::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_weight_stats_per_slot() {
        let population = ranked(&[0.1, 0.2, 0.3]);
        let stats = population.weight_stats();
        assert_eq!(stats.len(), HeuristicsWeights::LEN);
        assert_eq!(stats[0].min, 0.0);
        assert_eq!(stats[0].max, 0.2);
    }
}
