use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::core::{Command, Ticks};
use super::event::{Event, EventSnapshot};
use super::null::NullCommand;

static QUEUE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_queue_lock_poison_once(operation: &'static str) {
    if QUEUE_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "delta queue lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Default)]
struct DeltaHeap {
    events: BinaryHeap<Event>,
    next_seq: u64,
}

/// Delta queue of pending commands, after Comer's XINU delay list.
///
/// Events keep the delay they were inserted with; nothing is renormalized on insert.
/// Each extraction pops the smallest delta `dt` and subtracts `dt` from every event left
/// behind, so the head's delta is always the time from the last extraction until it fires.
/// The four delays 10, 25, 7, 29 come out as 7, 10, 25, 29; in the chained form each
/// delta is relative to its predecessor, giving 7, 3, 15, 4.
///
/// Safe to share between the scheduler and background producers.
#[derive(Debug, Default)]
pub struct DeltaCmdList {
    inner: Mutex<DeltaHeap>,
}

impl DeltaCmdList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, command: Box<dyn Command>) {
        let mut heap = self.lock_recovering("insert");
        let seq = heap.next_seq;
        heap.next_seq = heap.next_seq.wrapping_add(1);
        debug!(
            command = command.name(),
            delay = command.delay(),
            duration = command.duration(),
            queued = heap.events.len() + 1,
            "event_inserted"
        );
        heap.events.push(Event::new(command, seq));
    }

    /// Removes the head event and returns its command, or a [`NullCommand`] when the queue is
    /// empty or the lock was poisoned mid-extraction. Never fails.
    pub fn get_next_cmd(&self) -> Box<dyn Command> {
        let mut heap = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("delta queue extraction fault; substituting NullCommand");
                self.inner.clear_poison();
                return Box::new(NullCommand::new());
            }
        };

        let Some(event) = heap.events.pop() else {
            return Box::new(NullCommand::new());
        };

        let dt = event.delta();
        if dt != 0 && !heap.events.is_empty() {
            // A uniform shift keeps the heap order, but BinaryHeap has no in-place mutation.
            let mut remaining = std::mem::take(&mut heap.events).into_vec();
            for pending in &mut remaining {
                pending.set_delta(pending.delta().saturating_sub(dt));
            }
            heap.events = BinaryHeap::from(remaining);
        }

        let command = event.into_command();
        debug!(
            command = command.name(),
            elapsed = dt,
            remaining = heap.events.len(),
            "event_extracted"
        );
        command
    }

    pub fn is_empty(&self) -> bool {
        self.lock_recovering("is_empty").events.is_empty()
    }

    pub fn size(&self) -> usize {
        self.lock_recovering("size").events.len()
    }

    pub fn clear(&self) {
        self.lock_recovering("clear").events.clear();
    }

    /// Time from the last extraction until the head event fires.
    pub fn next_delta(&self) -> Option<Ticks> {
        self.lock_recovering("next_delta")
            .events
            .peek()
            .map(Event::delta)
    }

    /// Pending events in the order they will be extracted.
    pub fn snapshot(&self) -> Vec<EventSnapshot> {
        let heap = self.lock_recovering("snapshot");
        let mut ordered = heap.events.iter().collect::<Vec<_>>();
        ordered.sort_by(|left, right| right.cmp(left));
        ordered.into_iter().map(Event::snapshot).collect()
    }

    /// Deltas in the classic linked-list form, each relative to the event ahead of it.
    pub fn chained_deltas(&self) -> Vec<Ticks> {
        let mut previous = 0;
        self.snapshot()
            .into_iter()
            .map(|event| {
                let chained = event.delta.saturating_sub(previous);
                previous = event.delta;
                chained
            })
            .collect()
    }

    fn lock_recovering(&self, operation: &'static str) -> MutexGuard<'_, DeltaHeap> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_queue_lock_poison_once(operation);
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
impl DeltaCmdList {
    /// Leaves the queue lock poisoned, as a producer panicking mid-insert would.
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = self.inner.lock().expect("queue guard");
                    panic!("poison delta queue");
                })
                .join();
        });
    }
}
