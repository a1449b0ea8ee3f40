use std::sync::Arc;

use tracing::{debug, info};

use super::core::{Command, Ticks};
use super::delta_list::DeltaCmdList;
use crate::clock::GameClock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRecord {
    pub name: String,
    pub internal: bool,
    pub succeeded: bool,
    pub duration: Ticks,
}

/// What one drain executed, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub executed: Vec<ExecRecord>,
    pub clock_after: Ticks,
}

impl DrainReport {
    pub fn elapsed(&self) -> Ticks {
        self.executed.iter().map(|record| record.duration).sum()
    }

    /// The user-facing command that ended the drain, if the queue produced one.
    pub fn user_command(&self) -> Option<&ExecRecord> {
        self.executed.last().filter(|record| !record.internal)
    }
}

/// Feeds commands through the delta queue and advances the game clock by each
/// executed command's duration.
pub struct Scheduler {
    queue: Arc<DeltaCmdList>,
    clock: GameClock,
}

impl Scheduler {
    pub fn new(queue: Arc<DeltaCmdList>, clock: GameClock) -> Self {
        Self { queue, clock }
    }

    /// A handle producers can insert follow-up commands through.
    pub fn queue(&self) -> Arc<DeltaCmdList> {
        Arc::clone(&self.queue)
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Queues `command`. A user command is drained immediately along with every internal
    /// command due before it; anything else waits for the next user command.
    pub fn sched(&mut self, command: Box<dyn Command>) -> Option<DrainReport> {
        let user_input = command.is_user_input();
        self.queue.insert(command);
        if user_input {
            Some(self.do_one_user_command())
        } else {
            None
        }
    }

    /// Executes internal commands from the head of the queue until a user-facing command has
    /// run or the queue is exhausted. Every exec is followed by one clock advance of that
    /// command's duration, whether or not it succeeded. A `NullCommand` only ends the drain
    /// when nothing is left behind it.
    pub fn do_one_user_command(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        loop {
            let mut command = self.queue.get_next_cmd();
            if command.is_null() {
                if self.queue.is_empty() {
                    debug!(executed = report.executed.len(), "drain_queue_exhausted");
                    break;
                }
                // An extraction fault or a queued sentinel; run it as a no-op and keep going.
                command.exec();
                self.clock.increment(command.duration());
                continue;
            }

            let succeeded = command.exec();
            self.clock.increment(command.duration());
            let record = ExecRecord {
                name: command.name().to_string(),
                internal: command.is_internal(),
                succeeded,
                duration: command.duration(),
            };
            if record.internal {
                debug!(
                    command = %record.name,
                    succeeded,
                    duration = record.duration,
                    "internal_command_executed"
                );
                report.executed.push(record);
                continue;
            }

            info!(
                command = %record.name,
                succeeded,
                duration = record.duration,
                clock = self.clock.time(),
                "user_command_executed"
            );
            report.executed.push(record);
            break;
        }

        report.clock_after = self.clock.time();
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use super::super::core::test_support::ScriptedCommand;
    use super::super::null::NullCommand;
    use super::*;

    fn scheduler_at_zero() -> Scheduler {
        Scheduler::new(Arc::new(DeltaCmdList::new()), GameClock::starting_at(0))
    }

    #[test]
    fn user_command_runs_immediately_and_advances_clock() {
        let mut scheduler = scheduler_at_zero();
        let command = ScriptedCommand::user("TestCmd", 0, 5);
        let count = command.exec_counter();

        let report = scheduler.sched(command.boxed()).expect("drained");

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.clock().time(), 5);
        assert_eq!(report.clock_after, 5);
        assert_eq!(report.user_command().expect("user").name, "TestCmd");
    }

    #[test]
    fn internal_command_waits_for_next_user_command() {
        let mut scheduler = scheduler_at_zero();
        let internal = ScriptedCommand::internal("arrive", 0, 10);
        let count = internal.exec_counter();

        assert!(scheduler.sched(internal.boxed()).is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.queue().size(), 1);
        assert_eq!(scheduler.clock().time(), 0);
    }

    #[test]
    fn drain_runs_internal_commands_in_delay_order_then_user_command() {
        let mut scheduler = scheduler_at_zero();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (name, delay, duration) in [("c", 6, 3), ("a", 1, 2), ("b", 4, 7)] {
            let command = ScriptedCommand::internal(name, delay, duration).with_log(&log);
            assert!(scheduler.sched(command.boxed()).is_none());
        }

        let user = ScriptedCommand::user("look", 9, 4).with_log(&log);
        let report = scheduler.sched(user.boxed()).expect("drained");

        assert_eq!(*log.lock().expect("log"), vec!["a", "b", "c", "look"]);
        assert_eq!(report.elapsed(), 2 + 7 + 3 + 4);
        assert_eq!(scheduler.clock().time(), 16);
        assert!(scheduler.queue().is_empty());
    }

    #[test]
    fn later_internal_commands_stay_queued() {
        let mut scheduler = scheduler_at_zero();
        let log = Arc::new(Mutex::new(Vec::new()));
        let late = ScriptedCommand::internal("late", 50, 1).with_log(&log);
        scheduler.sched(late.boxed());

        let report = scheduler
            .sched(ScriptedCommand::user("now", 0, 2).with_log(&log).boxed())
            .expect("drained");

        assert_eq!(report.executed.len(), 1);
        assert_eq!(*log.lock().expect("log"), vec!["now"]);
        assert_eq!(scheduler.queue().size(), 1);
        assert_eq!(scheduler.queue().next_delta(), Some(50));
    }

    #[test]
    fn failed_commands_still_consume_their_duration() {
        let mut scheduler = scheduler_at_zero();
        scheduler.sched(ScriptedCommand::internal("stumble", 0, 6).failing().boxed());
        let report = scheduler
            .sched(ScriptedCommand::user("miss", 1, 4).failing().boxed())
            .expect("drained");

        assert!(report.executed.iter().all(|record| !record.succeeded));
        assert_eq!(scheduler.clock().time(), 10);
    }

    #[test]
    fn drain_on_empty_queue_terminates_without_advancing_clock() {
        let mut scheduler = scheduler_at_zero();
        let report = scheduler.do_one_user_command();

        assert!(report.executed.is_empty());
        assert!(report.user_command().is_none());
        assert_eq!(scheduler.clock().time(), 0);
    }

    #[test]
    fn each_command_executes_at_most_once() {
        let mut scheduler = scheduler_at_zero();
        let internal = ScriptedCommand::internal("once", 0, 1);
        let internal_count = internal.exec_counter();
        let user = ScriptedCommand::user("go", 2, 1);
        let user_count = user.exec_counter();

        scheduler.sched(internal.boxed());
        scheduler.sched(user.boxed());
        scheduler.do_one_user_command();
        scheduler.do_one_user_command();

        assert_eq!(internal_count.load(Ordering::SeqCst), 1);
        assert_eq!(user_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clock_is_shared_with_outside_observers() {
        let clock = GameClock::starting_at(100);
        let mut scheduler = Scheduler::new(Arc::new(DeltaCmdList::new()), clock.clone());
        scheduler.sched(ScriptedCommand::user("rest", 0, 25).boxed());

        assert_eq!(clock.time(), 125);
    }

    #[test]
    fn extraction_fault_does_not_strand_the_submitted_command() {
        let mut scheduler = scheduler_at_zero();
        scheduler.queue().poison();
        let look = ScriptedCommand::user("look", 0, 4);
        let count = look.exec_counter();

        let report = scheduler.sched(look.boxed()).expect("drained");

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(report.user_command().expect("user").name, "look");
        assert_eq!(scheduler.clock().time(), 4);
        assert!(scheduler.queue().is_empty());
    }

    #[test]
    fn queued_null_command_is_skipped_during_drain() {
        let mut scheduler = scheduler_at_zero();
        assert!(scheduler.sched(Box::new(NullCommand::new())).is_none());
        let look = ScriptedCommand::user("look", 3, 4);
        let count = look.exec_counter();

        let report = scheduler.sched(look.boxed()).expect("drained");

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(report.executed.len(), 1);
        assert_eq!(scheduler.clock().time(), 4);
        assert!(scheduler.queue().is_empty());
    }
}
