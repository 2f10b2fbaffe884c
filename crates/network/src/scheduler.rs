// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A deadline-ordered action queue and its single worker.

use std::{
    cmp::Ordering as CmpOrdering,
    collections::BinaryHeap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{sync::Notify, task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

/// Upper bound on a single sleep; the queue is re-polled on every wake.
const MAX_WAIT: Duration = Duration::from_millis(i32::MAX as u64);

#[derive(Debug)]
struct Entry<T> {
    deadline: Instant,
    seq: u64,
    value: T,
}

// Reversed so the BinaryHeap pops the earliest deadline; equal deadlines keep
// FIFO order through the insertion sequence.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

#[derive(Debug)]
struct QueueInner<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

/// A deadline-ordered MPMC queue with stable ordering for equal deadlines.
#[derive(Debug)]
pub struct TimedQueue<T> {
    inner: Mutex<QueueInner<T>>,
    notify: Notify,
}

impl<T> Default for TimedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimedQueue<T> {
    /// Creates a new empty [`TimedQueue`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Adds an item due at `deadline`.
    pub fn push(&self, value: T, deadline: Instant) {
        {
            let mut inner = self.inner.lock().expect("poisoned lock");
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.heap.push(Entry {
                deadline,
                seq,
                value,
            });
        }
        self.notify.notify_waiters();
    }

    /// Adds an item due after `delay`.
    pub fn push_in(&self, value: T, delay: Duration) {
        self.push(value, Instant::now() + delay);
    }

    /// Returns the number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("poisoned lock").heap.len()
    }

    /// Returns `true` if no items are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until the head item's deadline passes and returns it, or `None`
    /// on cancellation.
    ///
    /// Sleeps are bounded by [`MAX_WAIT`] and the queue is re-polled on every
    /// wake, so a push with an earlier deadline takes effect immediately.
    pub async fn wait(&self, cancel: &CancellationToken) -> Option<T> {
        loop {
            // Register for wake-ups before inspecting the queue so a
            // concurrent push cannot slip between the check and the sleep
            let mut notified = std::pin::pin!(self.notify.notified());
            notified.as_mut().enable();

            let now = Instant::now();
            let next_deadline = {
                let mut inner = self.inner.lock().expect("poisoned lock");
                match inner.heap.peek() {
                    Some(entry) if entry.deadline <= now => {
                        if let Some(entry) = inner.heap.pop() {
                            return Some(entry.value);
                        }
                        None
                    }
                    Some(entry) => Some(entry.deadline),
                    None => None,
                }
            };

            let sleep_for = next_deadline
                .map_or(MAX_WAIT, |deadline| {
                    deadline.saturating_duration_since(now).min(MAX_WAIT)
                });

            tokio::select! {
                () = cancel.cancelled() => return None,
                () = &mut notified => {}
                () = tokio::time::sleep(sleep_for) => {}
            }
        }
    }
}

/// A single worker draining a [`TimedQueue`] and running each action to
/// completion before taking the next.
///
/// Actions run serially; an action may push further actions (including for
/// itself, which is how periodic work reschedules).
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: Arc<TimedQueue<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Spawns the worker with a fresh queue.
    pub fn spawn<H, Fut>(cancel: CancellationToken, handler: H) -> Self
    where
        H: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        Self::spawn_with_queue(Arc::new(TimedQueue::new()), cancel, handler)
    }

    /// Spawns the worker draining an existing queue.
    pub fn spawn_with_queue<H, Fut>(
        queue: Arc<TimedQueue<T>>,
        cancel: CancellationToken,
        handler: H,
    ) -> Self
    where
        H: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let worker_queue = queue.clone();

        let task = tokio::spawn(async move {
            tracing::debug!("Started task 'scheduler'");
            while let Some(action) = worker_queue.wait(&cancel).await {
                handler(action).await;
            }
            tracing::debug!("Stopped task 'scheduler'");
        });

        Self { queue, task }
    }

    /// Returns the shared queue for pushing actions.
    #[must_use]
    pub fn queue(&self) -> &Arc<TimedQueue<T>> {
        &self.queue
    }

    /// Schedules an action at `deadline`.
    pub fn push(&self, value: T, deadline: Instant) {
        self.queue.push(value, deadline);
    }

    /// Schedules an action after `delay`.
    pub fn push_in(&self, value: T, delay: Duration) {
        self.queue.push_in(value, delay);
    }

    /// Returns `true` once the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Aborts the worker without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}
