//! Fixed-size batch scheduling of probe futures.
//!
//! Items are split into consecutive chunks. Every future of a chunk is
//! polled concurrently and the whole chunk must finish before the next one
//! starts, which bounds a scan's worst-case latency at
//! `ceil(items / batch_size) * timeout`. Output order matches input order.

use futures::future::join_all;
use indicatif::ProgressBar;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cooperative stop flag.
///
/// Once set, batches that have not started yet are skipped. Probes already
/// in flight run until their own timeout.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create an unset stop signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further batches start.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check if a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Runs work in fixed-size concurrent batches.
#[derive(Clone)]
pub struct BatchScheduler {
    batch_size: usize,
    stop: Option<StopSignal>,
    progress: Option<ProgressBar>,
}

impl BatchScheduler {
    /// Create a scheduler. A batch size of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            stop: None,
            progress: None,
        }
    }

    /// Skip remaining batches once `stop` is set.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Advance `progress` by one for every completed item.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Get the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `worker` over `items`, one batch at a time.
    ///
    /// Returns one result per processed item, in input order. If the stop
    /// signal fires, only the batches that completed are returned.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, worker: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut remaining = items.into_iter();

        loop {
            let chunk: Vec<T> = remaining.by_ref().take(self.batch_size).collect();
            if chunk.is_empty() {
                break;
            }
            if self.stop.as_ref().is_some_and(StopSignal::is_stopped) {
                debug!(completed = results.len(), total, "stop requested, skipping remaining batches");
                break;
            }

            let progress = self.progress.as_ref();
            let outputs = join_all(chunk.into_iter().map(|item| {
                let probe = worker(item);
                async move {
                    let output = probe.await;
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    output
                }
            }))
            .await;

            results.extend(outputs);
        }

        results
    }
}

/// Run `worker` over `items` in concurrent batches of `batch_size`.
pub async fn run_batched<T, R, F, Fut>(items: Vec<T>, worker: F, batch_size: usize) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    BatchScheduler::new(batch_size).run(items, worker).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_preserves_input_order() {
        let items = vec!['a', 'b', 'c', 'd', 'e'];
        // Earlier items sleep longer, so within a chunk the later item finishes first.
        let results = run_batched(
            items,
            |c| async move {
                let delay = 5 * (b'f' - c as u8) as u64;
                sleep(Duration::from_millis(delay)).await;
                c.to_ascii_uppercase()
            },
            2,
        )
        .await;

        assert_eq!(results, vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_batch_size() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let results = run_batched(
            (0..10).collect(),
            |i: usize| {
                let in_flight = &in_flight;
                let peak = &peak;
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    i * 2
                }
            },
            3,
        )
        .await;

        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<_>>());
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_chunk_completes_before_next_starts() {
        let events = Mutex::new(Vec::new());

        run_batched(
            vec![0u64, 1, 2, 3],
            |i| {
                let events = &events;
                async move {
                    events.lock().unwrap().push(format!("start {i}"));
                    sleep(Duration::from_millis(20 - i * 5)).await;
                    events.lock().unwrap().push(format!("end {i}"));
                }
            },
            2,
        )
        .await;

        let events = events.into_inner().unwrap();
        let pos = |e: &str| events.iter().position(|x| x == e).unwrap();
        assert!(pos("end 0") < pos("start 2"));
        assert!(pos("end 1") < pos("start 2"));
        assert!(pos("end 1") < pos("start 3"));
    }

    #[tokio::test]
    async fn test_stop_signal_skips_later_batches() {
        let stop = StopSignal::new();
        let scheduler = BatchScheduler::new(2).with_stop_signal(stop.clone());

        let results = scheduler
            .run((0..6).collect(), |i: u32| {
                let stop = stop.clone();
                async move {
                    if i == 1 {
                        stop.stop();
                    }
                    i
                }
            })
            .await;

        assert_eq!(results, vec![0, 1]);
        assert!(stop.is_stopped());
    }

    #[tokio::test]
    async fn test_progress_and_edge_sizes() {
        let progress = ProgressBar::hidden();
        let scheduler = BatchScheduler::new(0).with_progress(progress.clone());
        assert_eq!(scheduler.batch_size(), 1);

        let results = scheduler.run(vec![1, 2, 3], |i| async move { i + 1 }).await;
        assert_eq!(results, vec![2, 3, 4]);
        assert_eq!(progress.position(), 3);

        let empty: Vec<u8> = run_batched(Vec::<u8>::new(), |i| async move { i }, 4).await;
        assert!(empty.is_empty());
    }
}
