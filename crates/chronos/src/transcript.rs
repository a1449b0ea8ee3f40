use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

pub const MAX_TRANSCRIPT_LINES: usize = 256;

static TRANSCRIPT_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_transcript_lock_poison_once(operation: &'static str) {
    if TRANSCRIPT_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "transcript lock poisoned; recovered inner value");
    }
}

/// Where commands send user-visible text. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_output_line(&self, line: impl Into<String>) {
        let mut lines = self.lock("append");
        if lines.len() == MAX_TRANSCRIPT_LINES {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    pub fn drain_output_lines_into(&self, out: &mut Vec<String>) {
        out.extend(self.lock("drain").drain(..));
    }

    pub fn output_lines(&self) -> Vec<String> {
        self.lock("read").iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock("read").is_empty()
    }

    fn lock(&self, operation: &'static str) -> MutexGuard<'_, VecDeque<String>> {
        match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_transcript_lock_poison_once(operation);
                poisoned.into_inner()
            }
        }
    }
}
