//! The polling process monitor.
//!
//! [`ProcessMonitor`] answers one question: should the overlay be visible
//! right now?  With no target the answer is always yes.  With a target the
//! answer is yes while some process runs that executable.
//!
//! # Threading
//!
//! All mutable state sits behind one [`Mutex`]: the target, the last
//! observed state, the running flag and the subscriber list.  The worker
//! thread, [`start`](ProcessMonitor::start), [`stop`](ProcessMonitor::stop),
//! [`update_target`](ProcessMonitor::update_target) and
//! [`dispose`](ProcessMonitor::dispose) all take that lock, and the worker
//! re-reads the running flag under it before every check.  Once `stop`
//! has taken the lock no further event can be emitted; `stop` then joins
//! the worker before returning.
//!
//! Subscribers are invoked with the lock held.  A subscriber must not call
//! back into the monitor; forward the event over a channel instead.

use super::matcher::{is_blank, target_visible};
use super::SystemProcessTable;
use crate::traits::ProcessTable;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A change of the "target is visible" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityChanged {
    /// New state.
    pub visible: bool,
    /// Target the state was computed for (`None` when unset).
    pub target: Option<PathBuf>,
}

/// Errors from [`ProcessMonitor`].
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("monitor has been disposed")]
    Disposed,
    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

type Subscriber = Box<dyn Fn(&VisibilityChanged) + Send>;

struct State {
    target: Option<PathBuf>,
    last: Option<bool>,
    running: bool,
    disposed: bool,
    /// Bumped on every start so a stale worker never outlives its run.
    generation: u64,
    subscribers: Vec<Subscriber>,
}

struct Shared {
    table: Box<dyn ProcessTable>,
    state: Mutex<State>,
    wake: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn clean_target(target: Option<PathBuf>) -> Option<PathBuf> {
    target.filter(|p| !is_blank(Some(p.as_path())))
}

impl Shared {
    /// Re-evaluate the target and notify subscribers on a transition.
    fn check(&self, state: &mut State) {
        let visible = target_visible(self.table.as_ref(), state.target.as_ref());
        if state.last == Some(visible) {
            return;
        }
        state.last = Some(visible);
        let change = VisibilityChanged {
            visible,
            target: state.target.clone(),
        };
        match &change.target {
            Some(path) => info!("target {} visible={}", path.display(), visible),
            None => info!("no target, visible={}", visible),
        }
        for subscriber in &state.subscribers {
            subscriber(&change);
        }
    }
}

/// Worker loop: wait one interval, check, repeat until stopped.
fn run_worker(shared: Arc<Shared>, interval: Duration, generation: u64) {
    let mut state = lock(&shared.state);
    loop {
        let deadline = Instant::now() + interval;
        loop {
            if !state.running || state.generation != generation {
                debug!("monitor worker exiting");
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        shared.check(&mut state);
    }
}

/// Polls whether a target executable is running and reports transitions.
///
/// Every method takes `&self`, so the monitor can be shared behind an
/// [`Arc`] between the thread that owns the overlay and anything else that
/// retargets it.
///
/// # Example
///
/// ```no_run
/// use poshud::monitor::ProcessMonitor;
/// use std::time::Duration;
///
/// let monitor = ProcessMonitor::new(Some("/usr/bin/sim".into()), Duration::from_secs(1));
/// monitor.subscribe(|change| println!("visible: {}", change.visible));
/// monitor.start()?;
/// # Ok::<(), poshud::monitor::MonitorError>(())
/// ```
pub struct ProcessMonitor {
    shared: Arc<Shared>,
    interval: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ProcessMonitor {
    /// Create a stopped monitor backed by the platform's process table.
    ///
    /// A `None`, empty or whitespace-only `target` means "no target": the
    /// monitor always reports visible.
    pub fn new(target: Option<PathBuf>, interval: Duration) -> Self {
        Self::with_table(target, interval, SystemProcessTable::default())
    }

    /// Create a stopped monitor backed by `table`.
    pub fn with_table(
        target: Option<PathBuf>,
        interval: Duration,
        table: impl ProcessTable + 'static,
    ) -> Self {
        let state = State {
            target: clean_target(target),
            last: None,
            running: false,
            disposed: false,
            generation: 0,
            subscribers: Vec::new(),
        };
        Self {
            shared: Arc::new(Shared {
                table: Box::new(table),
                state: Mutex::new(state),
                wake: Condvar::new(),
            }),
            interval,
            worker: Mutex::new(None),
        }
    }

    /// Register a callback for visibility transitions.
    ///
    /// Ignored after [`dispose`](Self::dispose).
    pub fn subscribe(&self, callback: impl Fn(&VisibilityChanged) + Send + 'static) {
        let mut state = lock(&self.shared.state);
        if state.disposed {
            return;
        }
        state.subscribers.push(Box::new(callback));
    }

    /// Check immediately, then keep checking every interval.
    ///
    /// The first check after a start always emits, because the previous
    /// state counts as unknown.  Starting a running monitor does nothing.
    pub fn start(&self) -> Result<(), MonitorError> {
        let mut worker = lock(&self.worker);
        let mut state = lock(&self.shared.state);
        if state.disposed {
            return Err(MonitorError::Disposed);
        }
        if state.running {
            return Ok(());
        }
        state.running = true;
        state.last = None;
        state.generation += 1;
        let generation = state.generation;
        self.shared.check(&mut state);
        drop(state);

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("poshud-monitor".into())
            .spawn(move || run_worker(shared, interval, generation));
        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                debug!("monitor started ({:?} interval)", self.interval);
                Ok(())
            }
            Err(e) => {
                warn!("failed to spawn monitor thread: {}", e);
                lock(&self.shared.state).running = false;
                Err(MonitorError::Spawn(e))
            }
        }
    }

    /// Stop polling.
    ///
    /// Waits for an in-flight check to finish.  No event is emitted after
    /// this returns.  Stopping a stopped monitor does nothing.
    pub fn stop(&self) {
        let mut worker = lock(&self.worker);
        {
            let mut state = lock(&self.shared.state);
            state.running = false;
            self.shared.wake.notify_all();
        }
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                warn!("monitor thread panicked");
            }
            debug!("monitor stopped");
        }
    }

    /// Replace the target.
    ///
    /// While running, the new target is checked immediately, which may emit
    /// a transition.  While stopped, the target is only recorded.
    pub fn update_target(&self, target: Option<PathBuf>) {
        let mut state = lock(&self.shared.state);
        if state.disposed {
            return;
        }
        state.target = clean_target(target);
        if state.running {
            self.shared.check(&mut state);
        }
    }

    /// Last observed state, `None` before the first check.
    pub fn is_visible(&self) -> Option<bool> {
        lock(&self.shared.state).last
    }

    /// Whether the worker is polling.
    pub fn is_running(&self) -> bool {
        lock(&self.shared.state).running
    }

    /// The current target, `None` when unset.
    pub fn target(&self) -> Option<PathBuf> {
        lock(&self.shared.state).target.clone()
    }

    /// Stop for good and drop every subscriber.
    ///
    /// Safe to call any number of times.  A disposed monitor cannot be
    /// started again.
    pub fn dispose(&self) {
        self.stop();
        let mut state = lock(&self.shared.state);
        if !state.disposed {
            state.disposed = true;
            state.subscribers.clear();
        }
    }
}

impl Drop for ProcessMonitor {
    fn drop(&mut self) {
        self.dispose();
    }
}

//  Tests
