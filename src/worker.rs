/// Background alien mover / spawner.
///
/// Each `Worker` is a named OS thread that wakes on a fixed interval, takes
/// the alien-field lock, runs one `BackgroundJob`, and goes back to sleep.
/// Shutdown is cooperative: `CancelToken::cancel` wakes every sleeper at once
/// and the thread is joined before `stop` returns.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error};

use crate::error::{GameError, Result};
use crate::motion::MotionTable;
use crate::store::{AlienField, SharedAliens};

// ── CancelToken ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Clonable stop flag that sleeping workers can wait on.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        if !*cancelled {
            *cancelled = true;
            self.inner.wake.notify_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for up to `timeout`. Returns `true` as soon as the token is
    /// cancelled, `false` if the full timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            if self.inner.wake.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

// ── Jobs ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundJob {
    /// Step every alien with its kind's motion policy.
    MoveAliens(MotionTable),
    /// Append `count` aliens at random positions.
    SpawnAliens { count: usize },
}

impl BackgroundJob {
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundJob::MoveAliens(_) => "alien-mover",
            BackgroundJob::SpawnAliens { .. } => "alien-spawner",
        }
    }
}

/// Run `job` once against an already-locked field. Does nothing once the
/// field has been halted; returns whether the job ran.
pub fn run_job_once(job: &BackgroundJob, field: &mut AlienField, rng: &mut impl Rng) -> bool {
    if field.is_halted() {
        return false;
    }
    match job {
        BackgroundJob::MoveAliens(table) => table.advance(field, rng),
        BackgroundJob::SpawnAliens { count } => {
            for _ in 0..*count {
                field.spawn_random(rng);
            }
        }
    }
    true
}

// ── Worker ───────────────────────────────────────────────────────────────────

pub struct Worker {
    name: &'static str,
    token: CancelToken,
    handle: Option<JoinHandle<u64>>,
}

impl Worker {
    /// Start a thread that runs `job` every `interval` until `token` is
    /// cancelled.
    pub fn spawn(
        interval: Duration,
        job: BackgroundJob,
        field: SharedAliens,
        token: CancelToken,
        seed: u64,
    ) -> Result<Self> {
        let name = job.name();
        let thread_token = token.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut runs = 0u64;
                while !thread_token.wait_timeout(interval) {
                    let mut field = field.lock();
                    // A stop may have landed while we queued for the lock.
                    if thread_token.is_cancelled() {
                        break;
                    }
                    if run_job_once(&job, &mut field, &mut rng) {
                        runs += 1;
                    }
                }
                runs
            })
            .map_err(GameError::Thread)?;
        debug!(worker = name, ?interval, "worker started");
        Ok(Self {
            name,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel and join. Returns how many times the job ran.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.token.cancel();
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.join() {
            Ok(runs) => {
                debug!(worker = self.name, runs, "worker stopped");
                runs
            }
            Err(_) => {
                error!(worker = self.name, "worker panicked");
                0
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
