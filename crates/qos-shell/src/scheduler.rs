//! Periodic activities and the foreground post queue.
//!
//! Two cadences run on the foreground thread (animation, clock); the
//! widget refresh runs on a background worker that may only post work
//! back to the foreground through a [`Poster`].

use crate::error::{PostError, TickError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Work posted to the foreground thread.
pub type Task<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

// =============================================================================
// Foreground queue
// =============================================================================

/// Bounded queue of tasks executed on the thread that owns `T`.
pub struct ForegroundQueue<T> {
    tx: SyncSender<Task<T>>,
    rx: Receiver<Task<T>>,
    capacity: usize,
}

impl<T> ForegroundQueue<T> {
    /// Queue holding at most `capacity` pending tasks.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel(capacity);
        Self { tx, rx, capacity }
    }

    /// A handle other threads use to post tasks.
    #[must_use]
    pub fn poster(&self) -> Poster<T> {
        Poster {
            tx: self.tx.clone(),
        }
    }

    /// Run the next pending task, if any. Returns whether one ran.
    pub fn run_next(&self, target: &mut T) -> bool {
        match self.rx.try_recv() {
            Ok(task) => {
                run_task(task, target);
                true
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }

    /// Wait up to `timeout` for a task and run it. Returns whether one ran.
    pub fn run_next_timeout(&self, target: &mut T, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                run_task(task, target);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Run the tasks pending right now, at most one queue's worth.
    ///
    /// Returns how many ran. Tasks posted while draining wait for the
    /// next call.
    pub fn drain(&self, target: &mut T) -> usize {
        let mut ran = 0;
        while ran < self.capacity && self.run_next(target) {
            ran += 1;
        }
        ran
    }
}

impl<T> std::fmt::Debug for ForegroundQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundQueue")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

fn run_task<T>(task: Task<T>, target: &mut T) {
    let _ = run_isolated("posted", || {
        task(target);
        Ok(())
    });
}

/// Sending half of a [`ForegroundQueue`]. Never blocks.
pub struct Poster<T> {
    tx: SyncSender<Task<T>>,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Poster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poster").finish_non_exhaustive()
    }
}

impl<T> Poster<T> {
    /// Enqueue `task` for the foreground thread.
    ///
    /// A full queue drops the task with [`PostError::Full`]; a dropped
    /// queue yields [`PostError::Closed`].
    pub fn post<F>(&self, task: F) -> Result<(), PostError>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.tx.try_send(Box::new(task)).map_err(|e| match e {
            TrySendError::Full(_) => PostError::Full,
            TrySendError::Disconnected(_) => PostError::Closed,
        })
    }
}

// =============================================================================
// Tick isolation
// =============================================================================

/// Run one tick, containing both errors and panics.
///
/// Failures are logged and returned; they never propagate further, so the
/// caller can schedule the next tick regardless.
pub fn run_isolated<F>(activity: &'static str, tick: F) -> Result<(), TickError>
where
    F: FnOnce() -> Result<(), TickError>,
{
    let outcome = match panic::catch_unwind(AssertUnwindSafe(tick)) {
        Ok(result) => result,
        Err(payload) => Err(TickError::Panicked {
            activity,
            message: panic_message(payload.as_ref()),
        }),
    };
    if let Err(ref error) = outcome {
        warn!(activity, %error, "tick failed, continuing");
    }
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// Foreground cadences
// =============================================================================

/// A foreground periodic activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    Animation,
    Clock,
}

impl Activity {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Animation => "animation",
            Self::Clock => "clock",
        }
    }
}

/// A self-rescheduling foreground timer.
#[derive(Debug, Clone)]
pub struct Cadence {
    pub activity: Activity,
    pub interval_ms: u64,
    /// Fires when the clock reaches this time.
    pub next_due_ms: u64,
    pub paused: bool,
}

/// Drives the three periodic activities of the shell.
#[derive(Debug)]
pub struct RefreshScheduler {
    cadences: Vec<Cadence>,
    widget_interval: Duration,
    current_time_ms: u64,
}

impl RefreshScheduler {
    /// Both foreground cadences are due immediately.
    #[must_use]
    pub fn new(animation_ms: u64, clock_ms: u64, widget_refresh_ms: u64) -> Self {
        let cadence = |activity, interval_ms| Cadence {
            activity,
            interval_ms,
            next_due_ms: 0,
            paused: false,
        };
        Self {
            cadences: vec![
                cadence(Activity::Animation, animation_ms),
                cadence(Activity::Clock, clock_ms),
            ],
            widget_interval: Duration::from_millis(widget_refresh_ms),
            current_time_ms: 0,
        }
    }

    /// Activities due at `now_ms`; each is rescheduled `interval` after `now_ms`.
    pub fn update(&mut self, now_ms: u64) -> Vec<Activity> {
        self.current_time_ms = now_ms;
        let mut due = Vec::new();
        for cadence in &mut self.cadences {
            if cadence.paused || now_ms < cadence.next_due_ms {
                continue;
            }
            due.push(cadence.activity);
            cadence.next_due_ms = now_ms.saturating_add(cadence.interval_ms);
        }
        due
    }

    /// Milliseconds until the next unpaused cadence fires.
    #[must_use]
    pub fn time_until_next(&self) -> Option<u64> {
        self.cadences
            .iter()
            .filter(|c| !c.paused)
            .map(|c| c.next_due_ms.saturating_sub(self.current_time_ms))
            .min()
    }

    /// Make `activity` due on the next update.
    pub fn force(&mut self, activity: Activity) {
        if let Some(c) = self.cadence_mut(activity) {
            c.next_due_ms = 0;
        }
    }

    pub fn pause(&mut self, activity: Activity) {
        if let Some(c) = self.cadence_mut(activity) {
            c.paused = true;
        }
    }

    pub fn resume(&mut self, activity: Activity) {
        if let Some(c) = self.cadence_mut(activity) {
            c.paused = false;
        }
    }

    #[must_use]
    pub fn is_paused(&self, activity: Activity) -> bool {
        self.cadences
            .iter()
            .any(|c| c.activity == activity && c.paused)
    }

    #[must_use]
    pub fn cadences(&self) -> &[Cadence] {
        &self.cadences
    }

    #[must_use]
    pub const fn widget_interval(&self) -> Duration {
        self.widget_interval
    }

    /// Start the background worker that asks the foreground to run
    /// `refresh` every widget interval.
    ///
    /// The worker exits once the queue behind `poster` is gone.
    pub fn spawn_widget_refresh<T: 'static>(
        &self,
        poster: Poster<T>,
        refresh: fn(&mut T),
    ) -> std::io::Result<JoinHandle<()>> {
        spawn_refresh_worker("widget-refresh", self.widget_interval, poster, refresh)
    }

    fn cadence_mut(&mut self, activity: Activity) -> Option<&mut Cadence> {
        self.cadences.iter_mut().find(|c| c.activity == activity)
    }
}

/// Sleep `interval`, post `refresh`, repeat until the queue is closed.
pub fn spawn_refresh_worker<T: 'static>(
    name: &str,
    interval: Duration,
    poster: Poster<T>,
    refresh: fn(&mut T),
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name.to_string()).spawn(move || loop {
        thread::sleep(interval);
        match poster.post(refresh) {
            Ok(()) => debug!("posted widget refresh"),
            Err(PostError::Full) => debug!("foreground queue full, dropping widget refresh"),
            Err(PostError::Closed) => {
                debug!("foreground queue closed, refresh worker exiting");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_queue_runs_tasks_in_order() {
        let queue = ForegroundQueue::<Vec<u32>>::bounded(4);
        let poster = queue.poster();
        poster.post(|v| v.push(1)).unwrap();
        poster.post(|v| v.push(2)).unwrap();
        let mut target = Vec::new();
        assert_eq!(queue.drain(&mut target), 2);
        assert_eq!(target, vec![1, 2]);
        assert!(!queue.run_next(&mut target));
    }

    #[test]
    fn test_full_queue_drops_post() {
        let queue = ForegroundQueue::<u32>::bounded(1);
        let poster = queue.poster();
        poster.post(|n| *n += 1).unwrap();
        assert_eq!(poster.post(|n| *n += 100), Err(PostError::Full));
        let mut n = 0;
        queue.drain(&mut n);
        assert_eq!(n, 1);
    }

    #[test]
    fn test_closed_queue_reports_closed() {
        let queue = ForegroundQueue::<u32>::bounded(2);
        let poster = queue.poster();
        drop(queue);
        assert_eq!(poster.post(|n| *n += 1), Err(PostError::Closed));
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let queue = ForegroundQueue::<u32>::bounded(4);
        let poster = queue.poster();
        poster.post(|_| panic!("bad task")).unwrap();
        poster.post(|n| *n = 7).unwrap();
        let mut n = 0;
        assert_eq!(queue.drain(&mut n), 2);
        assert_eq!(n, 7);
    }

    #[test]
    fn test_drain_is_bounded_by_capacity() {
        let queue = ForegroundQueue::<u32>::bounded(2);
        let poster = queue.poster();
        poster.post(|n| *n += 1).unwrap();
        poster.post(|n| *n += 1).unwrap();
        let mut n = 0;
        assert_eq!(queue.drain(&mut n), 2);
        assert_eq!(queue.drain(&mut n), 0);
    }

    #[test]
    fn test_run_isolated_reports_panic() {
        let err = run_isolated("clock", || panic!("tick exploded")).unwrap_err();
        assert_eq!(
            err,
            TickError::Panicked {
                activity: "clock",
                message: "tick exploded".to_string()
            }
        );
    }

    #[test]
    fn test_run_isolated_passes_errors_through() {
        let err = run_isolated("animation", || Err(TickError::NonFinite { index: 2 })).unwrap_err();
        assert_eq!(err, TickError::NonFinite { index: 2 });
        assert!(run_isolated("animation", || Ok(())).is_ok());
    }

    #[test]
    fn test_cadences_fire_immediately_then_on_interval() {
        let mut scheduler = RefreshScheduler::new(50, 1000, 3000);
        assert_eq!(scheduler.update(0), vec![Activity::Animation, Activity::Clock]);
        assert!(scheduler.update(49).is_empty());
        assert_eq!(scheduler.update(50), vec![Activity::Animation]);
        assert_eq!(scheduler.update(1000), vec![Activity::Animation, Activity::Clock]);
        assert_eq!(scheduler.time_until_next(), Some(50));
    }

    #[test]
    fn test_late_update_reschedules_from_now() {
        let mut scheduler = RefreshScheduler::new(50, 1000, 3000);
        scheduler.update(0);
        assert_eq!(scheduler.update(400), vec![Activity::Animation]);
        assert!(scheduler.update(440).is_empty());
        assert_eq!(scheduler.update(450), vec![Activity::Animation]);
    }

    #[test]
    fn test_pause_resume_force() {
        let mut scheduler = RefreshScheduler::new(50, 1000, 3000);
        scheduler.update(0);
        scheduler.pause(Activity::Animation);
        assert!(scheduler.is_paused(Activity::Animation));
        assert!(scheduler.update(100).is_empty());
        scheduler.resume(Activity::Animation);
        assert_eq!(scheduler.update(150), vec![Activity::Animation]);
        scheduler.force(Activity::Clock);
        assert_eq!(scheduler.update(160), vec![Activity::Clock]);
    }

    #[test]
    fn test_activity_names() {
        assert_eq!(Activity::Animation.name(), "animation");
        assert_eq!(Activity::Clock.name(), "clock");
    }

    #[test]
    fn test_worker_posts_until_queue_dropped() {
        let scheduler = RefreshScheduler::new(50, 1000, 1);
        let queue = ForegroundQueue::<u32>::bounded(8);
        let handle = scheduler
            .spawn_widget_refresh(queue.poster(), |n| *n += 1)
            .unwrap();

        let mut n = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        while n < 3 && Instant::now() < deadline {
            queue.run_next_timeout(&mut n, Duration::from_millis(50));
        }
        assert_eq!(n, 3);

        drop(queue);
        handle.join().unwrap();
    }
}
