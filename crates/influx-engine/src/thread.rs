//! Background runner: the kernel cycles on its own thread.
//!
//! [`SimulationThread`] moves the [`Kernel`] into a named thread. The
//! thread owns it exclusively until it exits, at which point the kernel
//! comes back through the `JoinHandle`. Stop and pause requests are only
//! honored between cycles, so the world is never observed half-applied.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use influx_world::PhaseLock;
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, WorldConfig};
use crate::kernel::{Behaviors, CycleReport, Kernel};

/// How often a paused loop re-checks the shutdown flag.
const PAUSE_POLL: Duration = Duration::from_millis(20);

/// Unread cycle reports kept before newer ones are dropped.
pub const REPORT_BUFFER: usize = 64;

/// Why the background loop exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// `stop()` or drop.
    Stopped,
    /// The world drained.
    GameOver,
    /// The configured cycle limit was reached.
    MaxCycles,
    /// A cycle failed and the kernel disabled itself.
    Failed,
}

struct LoopState {
    kernel: Kernel,
    shutdown: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    pause: Arc<PhaseLock>,
    reports: Sender<CycleReport>,
    dropped: Arc<AtomicU64>,
    workers: usize,
}

impl LoopState {
    fn run(mut self) -> (Kernel, ExitReason) {
        let reason = loop {
            if !self.wait_unpaused() {
                break ExitReason::Stopped;
            }
            if self
                .kernel
                .max_cycles()
                .is_some_and(|max| self.kernel.current_cycle().0 >= max)
            {
                break ExitReason::MaxCycles;
            }
            let result = if self.workers > 1 {
                self.kernel.step_parallel(self.workers)
            } else {
                self.kernel.step()
            };
            match result {
                Ok(report) => {
                    let over = report.game_over;
                    self.publish(report);
                    if over {
                        break ExitReason::GameOver;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "simulation thread stopping on cycle error");
                    break ExitReason::Failed;
                }
            }
        };
        info!(?reason, cycle = self.kernel.current_cycle().0, "simulation thread exiting");
        self.finished.store(true, Ordering::Release);
        (self.kernel, reason)
    }

    /// Hand a report to the reader without blocking the loop. A full
    /// buffer drops the report; a gone reader is ignored.
    fn publish(&self, report: CycleReport) {
        match self.reports.try_send(report) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(report)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(cycle = report.cycle.0, "report buffer full, report dropped");
            }
        }
    }

    /// Wait out a pause. Returns `false` if shutdown was requested.
    fn wait_unpaused(&self) -> bool {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return false;
            }
            if self.pause.wait_released(PAUSE_POLL) {
                return !self.shutdown.load(Ordering::Acquire);
            }
        }
    }
}

/// A kernel cycling on a background thread.
///
/// Dropping the handle requests shutdown and joins the thread.
pub struct SimulationThread {
    handle: Option<JoinHandle<(Kernel, ExitReason)>>,
    shutdown: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    pause: Arc<PhaseLock>,
    paused: bool,
    reports: Receiver<CycleReport>,
    dropped: Arc<AtomicU64>,
}

impl SimulationThread {
    /// Build a kernel and start cycling it sequentially.
    pub fn start(config: WorldConfig, behaviors: Behaviors) -> Result<Self, ConfigError> {
        Self::spawn(Kernel::new(config, behaviors)?, 1)
    }

    /// Start cycling an existing kernel. With `workers > 1` the action
    /// phase runs on that many scoped threads per cycle.
    pub fn spawn(kernel: Kernel, workers: usize) -> Result<Self, ConfigError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let pause = Arc::new(PhaseLock::new());
        let dropped = Arc::new(AtomicU64::new(0));
        let (tx, rx) = crossbeam_channel::bounded(REPORT_BUFFER);

        let seed = kernel.seed();
        let state = LoopState {
            kernel,
            shutdown: Arc::clone(&shutdown),
            finished: Arc::clone(&finished),
            pause: Arc::clone(&pause),
            reports: tx,
            dropped: Arc::clone(&dropped),
            workers,
        };
        let handle = thread::Builder::new()
            .name("influx-kernel".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        debug!(seed, workers, "simulation thread spawned");

        Ok(Self {
            handle: Some(handle),
            shutdown,
            finished,
            pause,
            paused: false,
            reports: rx,
            dropped,
        })
    }

    /// Cycle reports, in order, as the thread produces them. At most
    /// [`REPORT_BUFFER`] unread reports are held; later ones are dropped
    /// until the reader catches up.
    pub fn reports(&self) -> &Receiver<CycleReport> {
        &self.reports
    }

    /// Reports dropped because the buffer was full.
    pub fn dropped_reports(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Hold the thread before its next cycle. The in-flight cycle
    /// completes first. Returns `false` if already paused.
    pub fn pause(&mut self) -> bool {
        if self.paused || !self.pause.try_acquire() {
            return false;
        }
        self.paused = true;
        true
    }

    /// Let a paused thread continue.
    pub fn resume(&mut self) {
        if self.paused {
            self.pause.release();
            self.paused = false;
        }
    }

    /// Whether the thread is held by [`pause()`](Self::pause).
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the loop has exited on its own or after a stop.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Request shutdown, join, and recover the kernel.
    pub fn stop(mut self) -> Result<(Kernel, ExitReason), ConfigError> {
        self.shutdown.store(true, Ordering::Release);
        self.resume();
        self.join()
    }

    /// Join without requesting shutdown: returns once the loop ends on
    /// game over, the cycle limit or an error.
    pub fn wait(mut self) -> Result<(Kernel, ExitReason), ConfigError> {
        self.resume();
        self.join()
    }

    fn join(&mut self) -> Result<(Kernel, ExitReason), ConfigError> {
        let handle = self.handle.take().ok_or(ConfigError::KernelRecoveryFailed)?;
        handle.join().map_err(|_| ConfigError::KernelRecoveryFailed)
    }
}

impl Drop for SimulationThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.store(true, Ordering::Release);
            if self.paused {
                self.pause.release();
            }
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for SimulationThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationThread")
            .field("running", &self.handle.is_some())
            .field("paused", &self.paused)
            .field("finished", &self.is_finished())
            .field("dropped_reports", &self.dropped_reports())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemSpec;
    use influx_core::Color;
    use std::time::Duration;

    fn endless() -> WorldConfig {
        WorldConfig::new(6, 6)
            .with_item(ItemSpec::agent(1, 1, 2, 1, "a"))
            .with_item(ItemSpec::packet(4, 4, Color::Blue))
    }

    #[test]
    fn stop_returns_kernel() {
        let sim = SimulationThread::start(endless(), Behaviors::new()).unwrap();
        let first = sim.reports().recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.cycle.0, 0);
        let (kernel, reason) = sim.stop().unwrap();
        assert_eq!(reason, ExitReason::Stopped);
        assert!(kernel.current_cycle().0 >= 1);
    }

    #[test]
    fn wait_ends_at_max_cycles() {
        let mut config = endless();
        config.max_cycles = Some(5);
        let sim = SimulationThread::start(config, Behaviors::new()).unwrap();
        let (kernel, reason) = sim.wait().unwrap();
        assert_eq!(reason, ExitReason::MaxCycles);
        assert_eq!(kernel.current_cycle().0, 5);
    }

    #[test]
    fn wait_ends_at_game_over() {
        let config = WorldConfig::new(3, 3).with_item(ItemSpec::agent(0, 0, 1, 1, "a"));
        let sim = SimulationThread::start(config, Behaviors::new()).unwrap();
        let rx = sim.reports().clone();
        let (_, reason) = sim.wait().unwrap();
        assert_eq!(reason, ExitReason::GameOver);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn pause_holds_cycles() {
        let mut sim = SimulationThread::start(endless(), Behaviors::new()).unwrap();
        sim.reports().recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(sim.pause());
        assert!(!sim.pause());
        // At most the in-flight cycle lands after the pause.
        std::thread::sleep(Duration::from_millis(50));
        let _ = sim.reports().try_iter().count();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(sim.reports().try_iter().count(), 0);
        sim.resume();
        assert!(sim.reports().recv_timeout(Duration::from_secs(5)).is_ok());
        let (_, reason) = sim.stop().unwrap();
        assert_eq!(reason, ExitReason::Stopped);
    }

    #[test]
    fn unread_reports_stay_capped() {
        let sim = SimulationThread::start(endless(), Behaviors::new()).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while sim.dropped_reports() == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(sim.dropped_reports() > 0);
        assert!(sim.reports().len() <= REPORT_BUFFER);
        // The oldest reports are the ones kept.
        assert_eq!(sim.reports().recv().unwrap().cycle.0, 0);
        let (_, reason) = sim.stop().unwrap();
        assert_eq!(reason, ExitReason::Stopped);
    }

    #[test]
    fn stop_while_paused() {
        let mut sim = SimulationThread::start(endless(), Behaviors::new()).unwrap();
        sim.pause();
        let (_, reason) = sim.stop().unwrap();
        assert_eq!(reason, ExitReason::Stopped);
    }
}
