use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::core::{convert_args_to_string, Command, CommandHeader, Execute, Ticks, Validate};
use crate::clock::{SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::world::InnHandle;

pub const DEFAULT_WAIT_SECONDS: Ticks = 5 * SECONDS_PER_MINUTE;
pub const LOOK_DURATION: Ticks = 4;
pub const INSPECT_DURATION: Ticks = 5;

const WAIT_FORMAT: &str =
    "WAIT [N M[inutes]] | [N H[ours]] where 1 <= N <= 59 minutes; or 0 <= N <= 24 hours";

macro_rules! command_header_accessors {
    ($ty:ty) => {
        impl Command for $ty {
            fn header(&self) -> &CommandHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut CommandHeader {
                &mut self.header
            }
        }
    };
}

/// Lets game time pass. The wait is both the delay, so earlier internal events fire first,
/// and the duration the clock advances by.
#[derive(Debug, Clone)]
pub struct Wait {
    header: CommandHeader,
    default_duration: Ticks,
    unit: WaitUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitUnit {
    Minutes,
    Hours,
}

impl Wait {
    pub fn new(default_duration: Ticks) -> Self {
        Self {
            header: CommandHeader::fixed(
                "Wait",
                default_duration,
                default_duration,
                "Do nothing for the given amount of time",
                Some(WAIT_FORMAT),
            ),
            default_duration,
            unit: WaitUnit::Minutes,
        }
    }

    fn wait_for(&mut self, seconds: Ticks) {
        self.header.set_delay(seconds);
        self.header.set_duration(seconds);
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_SECONDS)
    }
}

impl Validate for Wait {
    fn init(&mut self, args: &[String]) -> bool {
        match args {
            [] => {
                self.wait_for(self.default_duration);
                true
            }
            [count, unit] => match parse_wait(count, unit) {
                Some((seconds, parsed_unit)) => {
                    self.header.push_parm(count.clone());
                    self.header.push_parm(unit.clone());
                    self.unit = parsed_unit;
                    self.wait_for(seconds);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

fn parse_wait(count: &str, unit: &str) -> Option<(Ticks, WaitUnit)> {
    let count = count.parse::<Ticks>().ok()?;
    let unit = unit.to_ascii_lowercase();
    match unit.as_str() {
        "h" | "hr" | "hours" if (0..=24).contains(&count) => {
            Some((count * SECONDS_PER_HOUR, WaitUnit::Hours))
        }
        "m" | "min" | "minutes" if (1..=59).contains(&count) => {
            Some((count * SECONDS_PER_MINUTE, WaitUnit::Minutes))
        }
        _ => None,
    }
}

impl Execute for Wait {
    fn exec(&mut self) -> bool {
        let (amount, unit) = match self.unit {
            WaitUnit::Hours => (self.header.duration() / SECONDS_PER_HOUR, "hour"),
            WaitUnit::Minutes => (self.header.duration() / SECONDS_PER_MINUTE, "minute"),
        };
        let plural = if amount == 1 { "" } else { "s" };
        self.header.say(format!("You wait for {amount} {unit}{plural}."));
        true
    }
}

command_header_accessors!(Wait);

#[derive(Debug, Clone)]
pub struct Look {
    header: CommandHeader,
    inn: InnHandle,
}

impl Look {
    pub fn new(inn: InnHandle) -> Self {
        Self {
            header: CommandHeader::fixed(
                "Look",
                0,
                LOOK_DURATION,
                "Look around the room and see who is here",
                None,
            ),
            inn,
        }
    }
}

impl Validate for Look {
    fn init(&mut self, args: &[String]) -> bool {
        args.is_empty()
    }
}

impl Execute for Look {
    fn exec(&mut self) -> bool {
        let description = self.inn.read().describe();
        self.header.say(description);
        true
    }
}

command_header_accessors!(Look);

/// Takes a closer look at one patron, named by the remaining words of the line.
#[derive(Debug, Clone)]
pub struct Inspect {
    header: CommandHeader,
    inn: InnHandle,
    npc_name: String,
}

impl Inspect {
    pub fn new(inn: InnHandle) -> Self {
        Self {
            header: CommandHeader::fixed(
                "Inspect",
                0,
                INSPECT_DURATION,
                "Get a near description of a requested NPC",
                Some("INSPECT <NPC Name>"),
            ),
            inn,
            npc_name: String::new(),
        }
    }
}

impl Validate for Inspect {
    fn init(&mut self, args: &[String]) -> bool {
        let npc_name = convert_args_to_string(args);
        if npc_name.is_empty() {
            return false;
        }
        for arg in args {
            self.header.push_parm(arg.clone());
        }
        self.npc_name = npc_name;
        true
    }
}

impl Execute for Inspect {
    fn exec(&mut self) -> bool {
        let line = match self.inn.read().find(&self.npc_name) {
            Some(npc) => npc.near_description.clone(),
            None => format!("You don't see {} here.", self.npc_name),
        };
        self.header.say(line);
        true
    }
}

command_header_accessors!(Inspect);

/// Prints the command list it was built with. Takes no game time.
#[derive(Debug, Clone)]
pub struct Help {
    header: CommandHeader,
    lines: Vec<String>,
}

impl Help {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            header: CommandHeader::fixed("Help", 0, 0, "List the commands you can use", None),
            lines,
        }
    }
}

impl Validate for Help {
    fn init(&mut self, args: &[String]) -> bool {
        args.is_empty()
    }
}

impl Execute for Help {
    fn exec(&mut self) -> bool {
        for line in &self.lines {
            self.header.say(line.clone());
        }
        true
    }
}

command_header_accessors!(Help);

#[derive(Debug, Clone)]
pub struct Quit {
    header: CommandHeader,
    quit_requested: Arc<AtomicBool>,
}

impl Quit {
    pub fn new(quit_requested: Arc<AtomicBool>) -> Self {
        Self {
            header: CommandHeader::fixed("Quit", 0, 0, "End the program.", None),
            quit_requested,
        }
    }
}

impl Validate for Quit {
    fn init(&mut self, args: &[String]) -> bool {
        args.is_empty()
    }
}

impl Execute for Quit {
    fn exec(&mut self) -> bool {
        self.quit_requested.store(true, Ordering::SeqCst);
        self.header.say("Farewell, adventurer.");
        true
    }
}

command_header_accessors!(Quit);
