//! Trailing-edge debounce on Tokio timers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

type Action<A> = Box<dyn Fn(A) + Send + Sync + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delays an action until `delay` passes without another [`schedule`](Self::schedule) call.
///
/// At most one invocation is pending at any time, and it receives the
/// arguments of the last call. The action can be swapped with
/// [`set_action`](Self::set_action) without disturbing a pending timer.
/// Dropping the debouncer cancels whatever is pending.
///
/// Scheduling spawns onto the current Tokio runtime.
pub struct Debouncer<A> {
    delay: Duration,
    action: Arc<Mutex<Action<A>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new(delay: Duration, action: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self { delay, action: Arc::new(Mutex::new(Box::new(action))), pending: Mutex::new(None) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the action; a pending invocation will call the new one.
    pub fn set_action(&self, action: impl Fn(A) + Send + Sync + 'static) {
        *lock(&self.action) = Box::new(action);
    }

    /// Cancel any pending invocation and schedule `args` for `delay` from now.
    pub fn schedule(&self, args: A) {
        let mut pending = lock(&self.pending);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let action = Arc::clone(&self.action);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let run = lock(&action);
            (**run)(args);
        }));
    }

    /// Cancel the pending invocation. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match lock(&self.pending).take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    /// Whether an invocation is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, sleep};

    type Calls = Arc<Mutex<Vec<(u32, Duration)>>>;

    fn recorder(start: Instant) -> (Calls, impl Fn(u32) + Send + Sync + 'static) {
        let calls: Calls = Arc::default();
        let sink = Arc::clone(&calls);
        (calls, move |arg| lock(&sink).push((arg, start.elapsed())))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_fires_after_quiet_period() {
        let start = Instant::now();
        let (calls, action) = recorder(start);
        let debouncer = Debouncer::new(Duration::from_millis(400), action);

        debouncer.schedule(1);
        sleep(Duration::from_millis(100)).await;
        debouncer.schedule(2);
        sleep(Duration::from_millis(50)).await;
        debouncer.schedule(3);
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(1_000)).await;

        let calls = lock(&calls).clone();
        assert_eq!(calls.len(), 1);
        let (arg, at) = calls[0];
        assert_eq!(arg, 3);
        assert!(at >= Duration::from_millis(550) && at < Duration::from_millis(560), "fired at {at:?}");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_before_delay_cancels() {
        let (calls, action) = recorder(Instant::now());
        let debouncer = Debouncer::new(Duration::from_millis(400), action);

        debouncer.schedule(1);
        sleep(Duration::from_millis(200)).await;
        drop(debouncer);
        sleep(Duration::from_millis(1_000)).await;

        assert!(lock(&calls).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_pending() {
        let (calls, action) = recorder(Instant::now());
        let debouncer = Debouncer::new(Duration::from_millis(400), action);

        assert!(!debouncer.cancel());
        debouncer.schedule(1);
        assert!(debouncer.cancel());
        sleep(Duration::from_millis(1_000)).await;

        assert!(lock(&calls).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_swapped_action_keeps_timer() {
        let start = Instant::now();
        let (old_calls, old_action) = recorder(start);
        let (new_calls, new_action) = recorder(start);
        let debouncer = Debouncer::new(Duration::from_millis(400), old_action);

        debouncer.schedule(7);
        sleep(Duration::from_millis(300)).await;
        debouncer.set_action(new_action);
        sleep(Duration::from_millis(200)).await;

        assert!(lock(&old_calls).is_empty());
        let new_calls = lock(&new_calls).clone();
        assert_eq!(new_calls.len(), 1);
        assert_eq!(new_calls[0].0, 7);
        assert!(new_calls[0].1 < Duration::from_millis(410));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_fire_separately() {
        let (calls, action) = recorder(Instant::now());
        let debouncer = Debouncer::new(Duration::from_millis(100), action);

        debouncer.schedule(1);
        sleep(Duration::from_millis(150)).await;
        debouncer.schedule(2);
        sleep(Duration::from_millis(150)).await;

        let args: Vec<_> = lock(&calls).iter().map(|(arg, _)| *arg).collect();
        assert_eq!(args, vec![1, 2]);
    }
}
