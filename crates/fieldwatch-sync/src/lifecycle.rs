//! Active/torn-down flag shared by the engine and its background tasks.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Phase {
    active: bool,
    generation: u64,
}

/// Whether the owning component is live, and which run it is in.
///
/// Cheap to clone. Every `start`/`stop` transition begins a new generation.
/// Work that spans an await captures [`generation`](Self::generation) first
/// and applies its result only if [`is_current`](Self::is_current) still
/// holds, so a result begun before a stop/start cycle never lands in the
/// next run. Timers wait on [`stopped`](Self::stopped) to cancel.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<Phase>>,
}

impl Lifecycle {
    /// Creates an active lifecycle.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Phase {
            active: true,
            generation: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Returns `true` until [`stop`](Self::stop) is called.
    pub fn is_active(&self) -> bool {
        self.tx.borrow().active
    }

    /// Identifier of the current run.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Returns `true` if the component is live and still in `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        let phase = *self.tx.borrow();
        phase.active && phase.generation == generation
    }

    /// Marks the component live again.
    pub fn start(&self) {
        self.transition(true);
    }

    /// Marks the component torn down and wakes every waiter.
    pub fn stop(&self) {
        self.transition(false);
    }

    fn transition(&self, active: bool) {
        self.tx.send_if_modified(|phase| {
            if phase.active == active {
                return false;
            }
            phase.active = active;
            phase.generation += 1;
            true
        });
    }

    /// Resolves once the component is torn down.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = rx.wait_for(|phase| !phase.active).await;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
