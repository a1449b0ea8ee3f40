pub mod clock;
pub mod command;
pub mod config;
pub mod transcript;
pub mod world;

pub use clock::{format_time_of_day, GameClock, DEFAULT_START_SECONDS};
pub use command::{
    convert_args_to_string, BuiltinContext, Command, CommandError, CommandHeader, CommandParser,
    CommandRegistry, DeltaCmdList, DrainReport, Event, EventSnapshot, ExecRecord, Execute,
    NullCommand, ParseOutcome, PatronEnter, PatronLeave, RegistryError, Scheduler, Ticks,
    Validate, NULL_COMMAND_NAME,
};
pub use config::{
    load_config, load_config_from_env, ConfigError, GameConfig, PatronArrival, CONFIG_ENV_VAR,
};
pub use transcript::Transcript;
pub use world::{Inn, InnHandle, Npc};
