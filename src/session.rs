use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::compute::{GameState, InputState, Snapshot};
use crate::config::GameConfig;
use crate::entities::EndReason;
use crate::error::Result;
use crate::render::{SilentSoundtrack, Soundtrack};
use crate::worker::{BackgroundJob, CancelToken, Worker};

/// One game from start to game over.
///
/// Owns the `GameState`, the background workers that share its alien field,
/// and the soundtrack. Workers are stopped and joined as soon as the game
/// ends, on `end`, or on drop, whichever comes first.
pub struct Session {
    state: GameState,
    rng: StdRng,
    token: CancelToken,
    workers: Vec<Worker>,
    soundtrack: Box<dyn Soundtrack>,
    closed: bool,
}

impl Session {
    pub fn start(config: GameConfig) -> Result<Self> {
        Self::start_with(config, Box::new(SilentSoundtrack::default()))
    }

    pub fn start_with(config: GameConfig, mut soundtrack: Box<dyn Soundtrack>) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        let state = GameState::new(config, &mut rng)?;
        let token = CancelToken::new();

        let mut workers = Vec::new();
        let config = state.config();
        if config.mover.enabled {
            workers.push(Worker::spawn(
                Duration::from_millis(config.mover.interval_ms),
                BackgroundJob::MoveAliens(config.aliens.motion.clone()),
                state.alien_field(),
                token.clone(),
                rng.gen(),
            )?);
        }
        if config.spawner.enabled {
            workers.push(Worker::spawn(
                Duration::from_millis(config.spawner.interval_ms),
                BackgroundJob::SpawnAliens {
                    count: config.spawner.count,
                },
                state.alien_field(),
                token.clone(),
                rng.gen(),
            )?);
        }

        soundtrack.start_loop();
        info!(seed, workers = workers.len(), "session started");

        Ok(Self {
            state,
            rng,
            token,
            workers,
            soundtrack,
            closed: false,
        })
    }

    /// Advance one frame. The first tick that ends the game also stops the
    /// background workers before returning.
    pub fn tick(&mut self, input: &InputState, dt: Duration) -> Snapshot {
        let snapshot = self.state.tick(input, dt, &mut self.rng);
        if !snapshot.running {
            self.stop_workers();
        }
        snapshot
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Number of background workers still attached.
    pub fn active_workers(&self) -> usize {
        self.workers.len()
    }

    /// Tear the session down and report how it ended (`None` if it was
    /// still running).
    pub fn end(mut self) -> Option<EndReason> {
        self.shutdown();
        self.state.end_reason()
    }

    fn stop_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.token.cancel();
        for worker in self.workers.drain(..) {
            worker.stop();
        }
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.stop_workers();
        self.soundtrack.stop();
        info!(
            frames = self.state.frame(),
            reason = ?self.state.end_reason(),
            "session ended"
        );
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
