//! Turns live keystrokes into settled search terms.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use common::search_query::SearchTerm;
use tokio::task::JoinHandle;

use crate::listing::lock;

type SettleCallback = Arc<dyn Fn(SearchTerm) + Send + Sync>;

/// Shared with the timer tasks. A timer settles only if `generation` still
/// holds the value it was started under, checked while holding `gate`.
struct SettleGate {
    generation: AtomicU64,
    gate: Mutex<()>,
}

/// Emits a [`SearchTerm`] once no keystroke has arrived for `window`.
///
/// Each keystroke aborts the pending timer and starts a new one, so a burst
/// of typing settles exactly once, with the text of its last keystroke.
/// Dropping the controller cancels the pending timer. Must be used from
/// within a tokio runtime.
pub struct DebouncedInput {
    window: Duration,
    on_settle: SettleCallback,
    shared: Arc<SettleGate>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedInput {
    pub fn new(window: Duration, on_settle: impl Fn(SearchTerm) + Send + Sync + 'static) -> Self {
        Self {
            window,
            on_settle: Arc::new(on_settle),
            shared: Arc::new(SettleGate { generation: AtomicU64::new(0), gate: Mutex::new(()) }),
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn input(&self, raw: &str) {
        let term = SearchTerm::new(raw);
        let on_settle = self.on_settle.clone();
        let shared = self.shared.clone();
        let window = self.window;
        let mut pending = lock(&self.pending);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _gate = lock(&shared.gate);
            // an abort can land after the sleep on another worker thread
            if shared.generation.load(Ordering::SeqCst) == generation {
                on_settle(term);
            }
        }));
    }

    /// Settles `raw` right away, dropping any pending keystroke timer.
    pub fn settle_now(&self, raw: &str) {
        let term = SearchTerm::new(raw);
        self.supersede(|| (self.on_settle)(term));
    }

    /// Cancels the pending timer, waits out a settle already running, then
    /// runs `f`. Nothing from before the call can settle after `f`.
    pub fn supersede<T>(&self, f: impl FnOnce() -> T) -> T {
        self.cancel();
        let _gate = lock(&self.shared.gate);
        f()
    }

    /// Does not wait for a settle already running; see [`Self::supersede`].
    pub fn cancel(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = lock(&self.pending).take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for DebouncedInput {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Instant, sleep};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<(String, Instant)>>>, impl Fn(SearchTerm) + Send + Sync + 'static) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        (events, move |term: SearchTerm| sink.lock().unwrap().push((term.to_string(), Instant::now())))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_settles_once_after_quiet_window() {
        let (events, on_settle) = recorder();
        let input = DebouncedInput::new(Duration::from_millis(300), on_settle);
        let start = Instant::now();

        input.input("s");
        sleep(Duration::from_millis(100)).await;
        input.input("sl");
        sleep(Duration::from_millis(50)).await;
        input.input(" sla ");
        sleep(Duration::from_millis(1000)).await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "sla");
        assert_eq!(events[0].1 - start, Duration::from_millis(450));
    }

    #[tokio::test(start_paused = true)]
    async fn separated_keystrokes_settle_separately() {
        let (events, on_settle) = recorder();
        let input = DebouncedInput::new(Duration::from_millis(300), on_settle);

        input.input("a");
        sleep(Duration::from_millis(400)).await;
        input.input("ab");
        sleep(Duration::from_millis(400)).await;

        let terms: Vec<_> = events.lock().unwrap().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(terms, vec!["a", "ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_now_bypasses_window_and_cancels_timer() {
        let (events, on_settle) = recorder();
        let input = DebouncedInput::new(Duration::from_millis(300), on_settle);
        let start = Instant::now();

        input.input("draft");
        assert!(input.is_pending());
        input.settle_now("");
        assert!(!input.is_pending());
        sleep(Duration::from_millis(1000)).await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "");
        assert_eq!(events[0].1, start);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn superseding_waits_for_a_running_settle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let sink = events.clone();
        let input = Arc::new(DebouncedInput::new(Duration::from_millis(10), move |term: SearchTerm| {
            sink.lock().unwrap().push(term.to_string());
            entered_tx.send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        }));

        input.input("old");
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let clearing = input.clone();
        let sink = events.clone();
        let clear = std::thread::spawn(move || {
            clearing.supersede(|| sink.lock().unwrap().push("cleared".to_string()));
        });
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(*events.lock().unwrap(), vec!["old"]);

        release_tx.send(()).unwrap();
        clear.join().unwrap();
        assert_eq!(*events.lock().unwrap(), vec!["old", "cleared"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_pending_settle() {
        let (events, on_settle) = recorder();
        let input = DebouncedInput::new(Duration::from_millis(300), on_settle);
        input.input("gone");
        drop(input);
        sleep(Duration::from_millis(1000)).await;
        assert!(events.lock().unwrap().is_empty());
    }
}
