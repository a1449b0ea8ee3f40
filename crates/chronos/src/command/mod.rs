mod core;
mod delta_list;
mod event;
mod internal;
mod null;
mod registry;
mod scheduler;
mod user;

pub use self::core::{
    convert_args_to_string, Command, CommandError, CommandHeader, Execute, Ticks, Validate,
};
pub use delta_list::DeltaCmdList;
pub use event::{Event, EventSnapshot};
pub use internal::{
    PatronEnter, PatronLeave, PATRON_ENTER_NAME, PATRON_LEAVE_NAME, PATRON_MOVE_DURATION,
};
pub use null::{NullCommand, NULL_COMMAND_NAME};
pub use registry::{
    BuiltinContext, CommandParser, CommandRegistry, CommandSpec, ParseOutcome, RegistryError,
    ERRMSG_UNKNOWN,
};
pub use scheduler::{DrainReport, ExecRecord, Scheduler};
pub use user::{
    Help, Inspect, Look, Quit, Wait, DEFAULT_WAIT_SECONDS, INSPECT_DURATION, LOOK_DURATION,
};
