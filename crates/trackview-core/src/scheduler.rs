//! Throttled refresh scheduling and the presentation job queue.
//!
//! All registry and panel mutation happens on one presentation context, the
//! owner of a [`PanelModel`](crate::panel::PanelModel). Other threads talk to
//! it through a cloneable [`PresentationSender`]. The [`RefreshScheduler`] may
//! be ticked from any thread; it only decides whether a refresh job is queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;

use crate::capability::TrackerHandle;
use crate::registry::TrackerId;

/// Work item for the presentation context.
#[derive(Debug)]
pub enum Job {
    /// A tracker appeared.
    Register(TrackerHandle),
    /// A tracker went away.
    Remove(TrackerId),
    /// Debug fields were switched on or off.
    SetDebug(bool),
    /// Recompute every panel's values.
    Refresh,
}

/// Sending half of the presentation queue. Cheap to clone; usable from any
/// thread.
#[derive(Debug, Clone)]
pub struct PresentationSender {
    tx: Sender<Job>,
}

impl PresentationSender {
    /// Subscription callback for the tracker subsystem.
    pub fn new_tracker_added(&self, handle: TrackerHandle) -> bool {
        self.send(Job::Register(handle))
    }

    pub fn remove(&self, id: TrackerId) -> bool {
        self.send(Job::Remove(id))
    }

    pub fn set_debug(&self, debug: bool) -> bool {
        self.send(Job::SetDebug(debug))
    }

    pub fn refresh(&self) -> bool {
        self.send(Job::Refresh)
    }

    /// Queue a job. Returns `false` once the receiving side is gone.
    pub fn send(&self, job: Job) -> bool {
        self.tx.send(job).is_ok()
    }
}

/// FIFO of jobs for the presentation context.
#[derive(Debug)]
pub struct PresentationQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
}

impl Default for PresentationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new sending handle.
    pub fn sender(&self) -> PresentationSender {
        PresentationSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every job queued so far, in order, without blocking.
    pub fn drain(&self) -> Vec<Job> {
        let mut jobs = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(job) => jobs.push(job),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        jobs
    }
}

/// Throttle in front of the refresh job.
///
/// A tick dispatches only when at least the update delay has passed since the
/// previous dispatch; the first tick always dispatches. Ticks that lose the
/// race are dropped, never deferred.
#[derive(Debug)]
pub struct RefreshScheduler {
    delay: Duration,
    epoch: Instant,
    last: Mutex<Option<Duration>>,
    dispatched: AtomicU64,
    sender: PresentationSender,
}

impl RefreshScheduler {
    pub fn new(delay: Duration, sender: PresentationSender) -> Self {
        Self {
            delay,
            epoch: Instant::now(),
            last: Mutex::new(None),
            dispatched: AtomicU64::new(0),
            sender,
        }
    }

    /// Minimum interval between dispatches.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Tick using the monotonic clock.
    pub fn tick(&self) -> bool {
        self.tick_at(self.epoch.elapsed())
    }

    /// Tick at `now`, measured from any fixed origin. Returns whether a refresh
    /// was dispatched.
    pub fn tick_at(&self, now: Duration) -> bool {
        let mut last = match self.last.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(prev) = *last
            && now.saturating_sub(prev) < self.delay
        {
            return false;
        }
        *last = Some(now);
        drop(last);

        if !self.sender.refresh() {
            return false;
        }
        let n = self.dispatched.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("refresh dispatch #{n} at {:?}", now);
        true
    }

    /// Number of refreshes dispatched so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}
