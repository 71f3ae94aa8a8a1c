//! Concurrent fitness evaluation.
//!
//! # Worker Pool
//!
//! [`evaluate_population`] runs `worker_threads` scoped threads. Each worker
//! owns its own [`Game`] seeded from its own [`PieceSeed`], so no simulation
//! state is shared between threads. Work is handed out through one atomic
//! counter of remaining individuals, decremented by each claim and never
//! reset. Every individual sits behind its own mutex, which the claiming
//! worker holds while it plays.
//!
//! The calling thread coordinates: it waits up to `poll_interval` between
//! reports (workers wake it early when they finish an individual), logs
//! progress from the shared running/finished sets, and returns once every
//! worker has exited.
//!
//! # Cancellation
//!
//! The shared `cancel` flag is checked by workers between trials and between
//! claims. Cancelled evaluations leave their individuals unevaluated; results
//! already computed stay in memory but the caller is expected to discard the
//! generation.

use std::{
    collections::BTreeSet,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, Thread},
    time::Instant,
};

use heurtris_engine::{Game, GameMode, PieceSeed};
use log::{debug, info};
use rand::Rng;

use crate::{Cancelled, Individual, TrainingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    #[display("evaluation cancelled")]
    Cancelled,
    #[display("an evaluation worker panicked")]
    WorkerPanicked,
}

/// Indices of individuals being evaluated and already evaluated.
///
/// Only used for progress reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationProgress {
    pub running: BTreeSet<usize>,
    pub finished: BTreeSet<usize>,
}

struct SharedState<'a> {
    config: &'a TrainingConfig,
    slots: Vec<Mutex<&'a mut Individual>>,
    remaining: AtomicUsize,
    progress: Mutex<EvaluationProgress>,
    cancel: &'a AtomicBool,
    coordinator: Thread,
}

impl SharedState<'_> {
    /// Claims the next individual, or `None` once all have been handed out.
    fn claim(&self) -> Option<usize> {
        let remaining = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()?;
        Some(self.slots.len() - remaining)
    }

    fn lock_progress(&self) -> MutexGuard<'_, EvaluationProgress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Evaluates every individual of `individuals` that has no fitness yet.
///
/// Worker seeds are drawn from `rng`. Returns the final progress sets; on
/// success every index is in `finished`.
pub fn evaluate_population<R>(
    individuals: &mut [Individual],
    config: &TrainingConfig,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Result<EvaluationProgress, EvaluationError>
where
    R: Rng + ?Sized,
{
    let total = individuals.len();
    let seeds: Vec<PieceSeed> = (0..config.worker_threads).map(|_| rng.random()).collect();
    let shared = SharedState {
        config,
        remaining: AtomicUsize::new(total),
        slots: individuals.iter_mut().map(Mutex::new).collect(),
        progress: Mutex::new(EvaluationProgress::default()),
        cancel,
        coordinator: thread::current(),
    };

    let start = Instant::now();
    let outcomes = thread::scope(|s| {
        let handles: Vec<_> = seeds
            .into_iter()
            .enumerate()
            .map(|(worker, seed)| {
                let shared = &shared;
                s.spawn(move || {
                    let result = run_worker(worker, seed, shared);
                    shared.coordinator.unpark();
                    result
                })
            })
            .collect();

        let mut last_reported = usize::MAX;
        while !handles.iter().all(|handle| handle.is_finished()) {
            thread::park_timeout(config.poll_interval());
            let progress = shared.lock_progress();
            let finished = progress.finished.len();
            if finished != last_reported {
                info!(
                    "evaluated {finished}/{total} individuals ({} running, {:.1?} elapsed)",
                    progress.running.len(),
                    start.elapsed()
                );
                last_reported = finished;
            }
            if cancel.load(Ordering::Relaxed) {
                debug!("cancellation requested, waiting for workers");
            }
        }

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });

    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(Cancelled)) => cancelled = true,
            Err(_) => return Err(EvaluationError::WorkerPanicked),
        }
    }
    if cancelled || cancel.load(Ordering::Relaxed) {
        return Err(EvaluationError::Cancelled);
    }

    let progress = shared.lock_progress().clone();
    Ok(progress)
}

fn run_worker(worker: usize, seed: PieceSeed, shared: &SharedState<'_>) -> Result<(), Cancelled> {
    let mut game = Game::new(GameMode::Zen, seed);
    loop {
        if shared.cancel.load(Ordering::Relaxed) {
            return Err(Cancelled);
        }
        let Some(index) = shared.claim() else {
            return Ok(());
        };

        let mut individual = shared.slots[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        shared.lock_progress().running.insert(index);

        let result = individual.evaluate(shared.config, &mut game, shared.cancel);

        let mut progress = shared.lock_progress();
        progress.running.remove(&index);
        let fitness = result?;
        progress.finished.insert(index);
        drop(progress);

        info!("worker {worker}: individual {index} fitness {fitness:.6}");
        shared.coordinator.unpark();
    }
}
