use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shared `Running`/`Paused` switch observed by the countdown ticker and the
/// main loop. Resuming wakes every waiter at once.
#[derive(Clone, Debug, Default)]
pub struct PauseGate {
    inner: Arc<GateInner>,
}

#[derive(Debug, Default)]
struct GateInner {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, bool> {
        self.inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pause(&self) {
        *self.state() = true;
    }

    pub fn resume(&self) {
        *self.state() = false;
        self.inner.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.state()
    }

    /// Block until the gate is running or `timeout` passes. Returns `true`
    /// if the gate is running. The countdown ticker parks here while paused.
    pub fn wait_until_running_timeout(&self, timeout: Duration) -> bool {
        let guard = self.state();
        let (guard, _) = self
            .inner
            .resumed
            .wait_timeout_while(guard, timeout, |paused| *paused)
            .unwrap_or_else(PoisonError::into_inner);
        !*guard
    }
}

/// One-way session cancellation flag shared by every activity of a session.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[test]
    fn test_running_by_default() {
        let gate = PauseGate::new();
        assert!(!gate.is_paused());
        assert!(gate.wait_until_running_timeout(Duration::ZERO));
    }

    #[test]
    fn test_timeout_while_paused() {
        let gate = PauseGate::new();
        gate.pause();
        assert!(!gate.wait_until_running_timeout(Duration::from_millis(20)));
        gate.resume();
        assert!(gate.wait_until_running_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_resume_wakes_all_waiters() {
        let gate = PauseGate::new();
        gate.pause();

        let (tx, rx) = mpsc::channel();
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let gate = gate.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    assert!(gate.wait_until_running_timeout(Duration::from_secs(5)));
                    tx.send(i).unwrap();
                })
            })
            .collect();
        drop(tx);

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        gate.resume();

        let mut woke: Vec<i32> = rx.iter().collect();
        woke.sort();
        assert_eq!(woke, vec![0, 1, 2]);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
