//! Binary checkpoint files.
//!
//! # Format
//!
//! One file per generation, named `gen_<generation>.bin`. All values are
//! little-endian, with no header and no padding:
//!
//! ```text
//! i32 generation
//! N × { f64 × 9 chromosome (slot order of HeuristicsWeights), f64 fitness }
//! ```
//!
//! A file is written after breeding, so the stored population is the one the
//! next generation starts from: elites keep their finite fitness, children are
//! stored as `+inf` (not evaluated).
//!
//! Files are first written as `gen_<generation>.bin.tmp` and then renamed, so a
//! crash never leaves a partially written checkpoint behind.
//!
//! # Resuming
//!
//! [`load_or_init`] never fails: a missing directory, a missing or malformed
//! file, or a population of the wrong size falls back to a fresh random
//! population at generation 0 with a warning.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use heurtris_evaluator::HeuristicsWeights;
use log::{info, warn};
use rand::Rng;

use crate::{Individual, Population, TrainingConfig};

const GENERATION_SIZE: usize = size_of::<i32>();
const RECORD_SIZE: usize = (HeuristicsWeights::LEN + 1) * size_of::<f64>();

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CheckpointError {
    #[display("checkpoint I/O error: {_0}")]
    Io(io::Error),
    #[display("checkpoint is truncated ({len} bytes)")]
    Truncated { len: usize },
    #[display("checkpoint size ({len} bytes) is not a whole number of records")]
    Misaligned { len: usize },
    #[display("checkpoint has a negative generation ({generation})")]
    NegativeGeneration { generation: i32 },
    #[display("generation {generation} does not fit in a checkpoint")]
    GenerationOutOfRange { generation: u32 },
    #[display("checkpoint holds {found} individuals, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
    #[display("no checkpoint found in {}", dir.display())]
    NotFound { dir: PathBuf },
}

impl From<io::Error> for CheckpointError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// A decoded checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub generation: u32,
    pub population: Population,
}

#[must_use]
pub fn file_name(generation: u32) -> String {
    format!("gen_{generation}.bin")
}

/// Parses `gen_<generation>.bin`.
fn parse_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("gen_")?
        .strip_suffix(".bin")?
        .parse()
        .ok()
}

pub fn encode(generation: u32, population: &Population) -> Result<Vec<u8>, CheckpointError> {
    let stored = i32::try_from(generation)
        .map_err(|_| CheckpointError::GenerationOutOfRange { generation })?;

    let mut bytes = Vec::with_capacity(GENERATION_SIZE + RECORD_SIZE * population.len());
    bytes.extend_from_slice(&stored.to_le_bytes());
    for individual in population.individuals() {
        for gene in individual.chromosome().iter() {
            bytes.extend_from_slice(&gene.to_le_bytes());
        }
        bytes.extend_from_slice(&individual.fitness().to_le_bytes());
    }
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<Checkpoint, CheckpointError> {
    let len = bytes.len();
    let Some((generation, records)) = bytes.split_first_chunk::<GENERATION_SIZE>() else {
        return Err(CheckpointError::Truncated { len });
    };
    let generation = i32::from_le_bytes(*generation);
    let generation = u32::try_from(generation)
        .map_err(|_| CheckpointError::NegativeGeneration { generation })?;
    if records.len() % RECORD_SIZE != 0 {
        return Err(CheckpointError::Misaligned { len });
    }

    let individuals = records
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let mut values = record
                .chunks_exact(size_of::<f64>())
                .map(|chunk| {
                    let mut buf = [0; size_of::<f64>()];
                    buf.copy_from_slice(chunk);
                    f64::from_le_bytes(buf)
                });
            let chromosome = HeuristicsWeights::from_fn(|_| values.next().unwrap_or_default());
            let fitness = values.next().unwrap_or(f64::INFINITY);
            Individual::with_fitness(chromosome, fitness)
        })
        .collect();

    Ok(Checkpoint {
        generation,
        population: Population::from_individuals(individuals),
    })
}

/// Writes `population` as the checkpoint of `generation` and returns its path.
pub fn save(dir: &Path, generation: u32, population: &Population) -> Result<PathBuf, CheckpointError> {
    let bytes = encode(generation, population)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(generation));
    let tmp_path = path.with_extension("bin.tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, &path)?;
    Ok(path)
}

pub fn load(path: &Path) -> Result<Checkpoint, CheckpointError> {
    decode(&fs::read(path)?)
}

/// Returns the highest generation with a checkpoint in `dir`.
///
/// A missing directory has no checkpoint.
pub fn latest_generation(dir: &Path) -> Result<Option<u32>, CheckpointError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut latest = None;
    for entry in entries {
        let entry = entry?;
        if let Some(generation) = entry.file_name().to_str().and_then(parse_file_name) {
            latest = latest.max(Some(generation));
        }
    }
    Ok(latest)
}

/// Loads the checkpoint of `generation` (or the latest one) from `dir`.
///
/// The population must have exactly `config.population_size` individuals; it
/// is returned sorted by fitness.
pub fn load_population(
    dir: &Path,
    generation: Option<u32>,
    config: &TrainingConfig,
) -> Result<Checkpoint, CheckpointError> {
    let generation = match generation {
        Some(generation) => generation,
        None => latest_generation(dir)?.ok_or_else(|| CheckpointError::NotFound {
            dir: dir.to_owned(),
        })?,
    };
    let mut checkpoint = load(&dir.join(file_name(generation)))?;
    if checkpoint.population.len() != config.population_size {
        return Err(CheckpointError::SizeMismatch {
            expected: config.population_size,
            found: checkpoint.population.len(),
        });
    }
    checkpoint.population.sort_by_fitness();
    Ok(checkpoint)
}

/// Like [`load_population`], but falls back to a fresh random population at
/// generation 0 on any error.
pub fn load_or_init<R>(
    dir: &Path,
    generation: Option<u32>,
    config: &TrainingConfig,
    rng: &mut R,
) -> Checkpoint
where
    R: Rng + ?Sized,
{
    match load_population(dir, generation, config) {
        Ok(checkpoint) => {
            info!(
                "resuming from generation {} ({})",
                checkpoint.generation,
                dir.display()
            );
            checkpoint
        }
        Err(err) => {
            warn!("starting a fresh population: {err}");
            Checkpoint {
                generation: 0,
                population: Population::random(config.population_size, rng),
            }
        }
    }
}
