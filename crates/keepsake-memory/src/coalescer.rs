// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debounced task coalescing.
//!
//! Rapid edits to the same note (or several notes) schedule many times
//! but produce one batched pass: ids accumulate in a pending set while a
//! single timer is armed, and the timer drains the whole set at once.
//!
//! The drain and the disarm happen inside the same critical section, so
//! a schedule that races the drain either lands in the outgoing batch or
//! observes the disarmed state and arms a fresh timer. Ids are never
//! lost. The timer is not restarted by later schedules; the delay is a
//! coalescing window, not an idle timeout.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

/// Work executed for each id in a drained batch.
#[async_trait]
pub trait CoalescedTask: Send + Sync + 'static {
    async fn run(&self, id: i64);
}

pub struct TaskCoalescer<T: CoalescedTask> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    task: T,
    delay: Duration,
    pending: Mutex<HashSet<i64>>,
    armed: AtomicBool,
}

impl<T: CoalescedTask> Clone for TaskCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: CoalescedTask> TaskCoalescer<T> {
    pub fn new(task: T, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                task,
                delay,
                pending: Mutex::new(HashSet::new()),
                armed: AtomicBool::new(false),
            }),
        }
    }

    /// Add an id to the pending batch, arming the timer if idle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, id: i64) {
        let arm = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.insert(id);
            !self.inner.armed.swap(true, Ordering::SeqCst)
        };
        if arm {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                tokio::time::sleep(inner.delay).await;
                let batch: Vec<i64> = {
                    let mut pending = inner.pending.lock().unwrap();
                    let batch = pending.drain().collect();
                    inner.armed.store(false, Ordering::SeqCst);
                    batch
                };
                debug!(count = batch.len(), "coalescer draining batch");
                join_all(batch.iter().map(|&id| inner.task.run(id))).await;
            });
        }
    }

    /// Number of ids waiting for the next drain.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Recorder {
        runs: AtomicUsize,
        seen: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl CoalescedTask for Arc<Recorder> {
        async fn run(&self, id: i64) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(id);
        }
    }

    fn recorder() -> Arc<Recorder> {
        Arc::new(Recorder {
            runs: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn repeated_schedules_for_one_id_run_once() {
        let rec = recorder();
        let coalescer = TaskCoalescer::new(Arc::clone(&rec), Duration::from_millis(20));
        coalescer.schedule(1);
        coalescer.schedule(1);
        coalescer.schedule(1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(rec.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_ids_share_one_timer() {
        let rec = recorder();
        let coalescer = TaskCoalescer::new(Arc::clone(&rec), Duration::from_millis(20));
        coalescer.schedule(1);
        coalescer.schedule(2);
        coalescer.schedule(3);
        assert_eq!(coalescer.pending_len(), 3);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(rec.runs.load(Ordering::SeqCst), 3);
        assert_eq!(coalescer.pending_len(), 0);

        let mut seen = rec.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    struct GatedRecorder {
        runs: AtomicUsize,
        seen: Mutex<Vec<i64>>,
        gate: tokio::sync::Semaphore,
    }

    #[async_trait]
    impl CoalescedTask for Arc<GatedRecorder> {
        async fn run(&self, id: i64) {
            self.seen.lock().unwrap().push(id);
            self.runs.fetch_add(1, Ordering::SeqCst);
            // Id 1 blocks until the test releases it, holding its batch open.
            if id == 1 {
                let _permit = self.gate.acquire().await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn schedule_during_a_running_batch_lands_in_the_next_cycle() {
        let rec = Arc::new(GatedRecorder {
            runs: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            gate: tokio::sync::Semaphore::new(0),
        });
        let coalescer = TaskCoalescer::new(Arc::clone(&rec), Duration::from_millis(10));

        coalescer.schedule(1);
        for _ in 0..200 {
            if rec.runs.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(rec.runs.load(Ordering::SeqCst), 1, "first batch is mid-run");

        // The first batch was drained and the timer disarmed before it ran,
        // so this must arm a fresh timer rather than vanish.
        coalescer.schedule(2);
        assert_eq!(coalescer.pending_len(), 1);

        rec.gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(rec.runs.load(Ordering::SeqCst), 2);
        assert_eq!(*rec.seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(coalescer.pending_len(), 0);
    }

    #[tokio::test]
    async fn schedule_after_drain_arms_a_new_timer() {
        let rec = recorder();
        let coalescer = TaskCoalescer::new(Arc::clone(&rec), Duration::from_millis(10));
        coalescer.schedule(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rec.runs.load(Ordering::SeqCst), 1);

        coalescer.schedule(2);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rec.runs.load(Ordering::SeqCst), 2);
    }
}
