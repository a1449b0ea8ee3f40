use std::sync::Arc;

use tracing::{debug, warn};

use super::core::{Command, CommandHeader, Execute, Ticks, Validate};
use super::delta_list::DeltaCmdList;
use crate::world::{InnHandle, Npc};

pub const PATRON_ENTER_NAME: &str = "PatronEnter";
pub const PATRON_LEAVE_NAME: &str = "PatronLeave";
pub const PATRON_MOVE_DURATION: Ticks = 10;

const PATRON_ENTER_DESCRIPTION: &str = "Move a Patron into the Inn for a certain amount of time.";
const PATRON_LEAVE_DESCRIPTION: &str = "Cause a Patron to leave the Inn after a certain amount of time.";

fn accepts_no_args(command: &str, args: &[String]) -> bool {
    if args.is_empty() {
        return true;
    }
    warn!(command, args = args.len(), "internal command given arguments");
    false
}

#[derive(Debug, Clone)]
struct LeaveSchedule {
    visit: Ticks,
    queue: Arc<DeltaCmdList>,
}

/// Puts an NPC into the Inn. Never typed by the user.
#[derive(Debug, Clone)]
pub struct PatronEnter {
    header: CommandHeader,
    npc: Npc,
    inn: InnHandle,
    leave: Option<LeaveSchedule>,
}

impl PatronEnter {
    pub fn new(delay: Ticks, npc: Npc, inn: InnHandle) -> Self {
        Self {
            header: CommandHeader::fixed(
                PATRON_ENTER_NAME,
                delay,
                PATRON_MOVE_DURATION,
                PATRON_ENTER_DESCRIPTION,
                None,
            ),
            npc,
            inn,
            leave: None,
        }
    }

    /// Once the patron is inside, queue a [`PatronLeave`] that fires `visit` ticks later.
    pub fn leaving_after(mut self, visit: Ticks, queue: Arc<DeltaCmdList>) -> Self {
        self.leave = Some(LeaveSchedule { visit, queue });
        self
    }

    pub fn npc(&self) -> &Npc {
        &self.npc
    }
}

impl Validate for PatronEnter {
    fn init(&mut self, args: &[String]) -> bool {
        accepts_no_args(PATRON_ENTER_NAME, args)
    }
}

impl Execute for PatronEnter {
    fn exec(&mut self) -> bool {
        let admitted = self.inn.write().add(self.npc.clone());
        if !admitted {
            debug!(npc = %self.npc.name, "patron_already_inside");
            return false;
        }

        let inn_name = self.inn.read().name().to_string();
        self.header
            .say(format!("{} enters the {}.", self.npc.name, inn_name));
        if let Some(schedule) = &self.leave {
            let mut leave = PatronLeave::following(self);
            leave.set_delay(schedule.visit);
            schedule.queue.insert(Box::new(leave));
        }
        true
    }
}

impl Command for PatronEnter {
    fn header(&self) -> &CommandHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut CommandHeader {
        &mut self.header
    }

    fn is_user_input(&self) -> bool {
        false
    }

    fn is_internal(&self) -> bool {
        true
    }
}

/// Takes an NPC back out of the Inn. Only built from a [`PatronEnter`], so nobody leaves
/// without having entered.
#[derive(Debug, Clone)]
pub struct PatronLeave {
    header: CommandHeader,
    npc: Npc,
    inn: InnHandle,
}

impl PatronLeave {
    /// Fires when the entering command's own time is up: its delay plus its duration.
    pub fn following(enter: &PatronEnter) -> Self {
        let mut header = CommandHeader::fixed(
            PATRON_LEAVE_NAME,
            enter.delay() + enter.duration(),
            PATRON_MOVE_DURATION,
            PATRON_LEAVE_DESCRIPTION,
            None,
        );
        if let Some(output) = enter.header().output() {
            header.set_output(output.clone());
        }
        Self {
            header,
            npc: enter.npc.clone(),
            inn: enter.inn.clone(),
        }
    }

    pub fn npc(&self) -> &Npc {
        &self.npc
    }
}

impl Validate for PatronLeave {
    fn init(&mut self, args: &[String]) -> bool {
        accepts_no_args(PATRON_LEAVE_NAME, args)
    }
}

impl Execute for PatronLeave {
    fn exec(&mut self) -> bool {
        let removed = self.inn.write().remove(&self.npc.name);
        if removed {
            let inn_name = self.inn.read().name().to_string();
            self.header
                .say(format!("{} leaves the {}.", self.npc.name, inn_name));
        }
        removed
    }
}

impl Command for PatronLeave {
    fn header(&self) -> &CommandHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut CommandHeader {
        &mut self.header
    }

    fn is_user_input(&self) -> bool {
        false
    }

    fn is_internal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::test_support::ScriptedCommand;
    use super::super::scheduler::Scheduler;
    use super::*;
    use crate::clock::GameClock;
    use crate::transcript::Transcript;
    use crate::world::Inn;

    fn inn() -> InnHandle {
        InnHandle::new(Inn::new("Ugly Ogre Inn", "Bork", "Smoke and noise."))
    }

    fn falsoon() -> Npc {
        Npc::new("Falsoon", "a burly fighter", "scarred knuckles")
    }

    #[test]
    fn patron_commands_are_internal_and_take_no_args() {
        let mut enter = PatronEnter::new(0, falsoon(), inn());
        assert!(enter.is_internal());
        assert!(!enter.is_user_input());
        assert!(enter.validate(&[]));
        assert!(!enter.validate(&["Falsoon".to_string()]));

        let mut leave = PatronLeave::following(&enter);
        assert!(leave.is_internal());
        assert!(!leave.validate(&["now".to_string()]));
    }

    #[test]
    fn enter_fails_when_patron_already_inside() {
        let inn = inn();
        let mut first = PatronEnter::new(0, falsoon(), inn.clone());
        let mut second = PatronEnter::new(0, falsoon(), inn.clone());

        assert!(first.exec());
        assert!(!second.exec());
        assert_eq!(inn.read().patrons().len(), 1);
    }

    #[test]
    fn leave_timing_follows_enter() {
        let enter = PatronEnter::new(15, falsoon(), inn());
        let leave = PatronLeave::following(&enter);

        assert_eq!(leave.delay(), 15 + PATRON_MOVE_DURATION);
        assert_eq!(leave.duration(), PATRON_MOVE_DURATION);
        assert_eq!(leave.npc(), enter.npc());
    }

    #[test]
    fn leave_fails_for_patron_not_inside() {
        let enter = PatronEnter::new(0, falsoon(), inn());
        let mut leave = PatronLeave::following(&enter);
        assert!(!leave.exec());
    }

    #[test]
    fn entering_patron_chains_its_own_departure() {
        let inn = inn();
        let transcript = Transcript::new();
        let mut scheduler =
            Scheduler::new(Arc::new(DeltaCmdList::new()), GameClock::starting_at(0));
        let mut enter =
            PatronEnter::new(0, falsoon(), inn.clone()).leaving_after(100, scheduler.queue());
        enter.set_output(transcript.clone());
        scheduler.sched(Box::new(enter));

        let report = scheduler
            .sched(ScriptedCommand::user("look", 5, 4).boxed())
            .expect("drained");
        assert_eq!(report.executed[0].name, PATRON_ENTER_NAME);
        assert!(inn.read().contains("Falsoon"));
        assert_eq!(scheduler.queue().size(), 1);
        assert_eq!(scheduler.queue().snapshot()[0].name, PATRON_LEAVE_NAME);

        let report = scheduler
            .sched(ScriptedCommand::user("wait", 200, 60).boxed())
            .expect("drained");
        assert_eq!(report.executed[0].name, PATRON_LEAVE_NAME);
        assert!(report.executed[0].succeeded);
        assert!(!inn.read().contains("Falsoon"));
        assert_eq!(
            transcript.output_lines(),
            vec!["Falsoon enters the Ugly Ogre Inn.", "Falsoon leaves the Ugly Ogre Inn."]
        );
        assert_eq!(scheduler.clock().time(), 10 + 4 + 10 + 60);
    }
}
