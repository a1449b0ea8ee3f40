use std::fmt;

use thiserror::Error;

use crate::transcript::Transcript;

/// Game time in seconds. Delays, durations, queue deltas and the clock all use it.
pub type Ticks = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid argument in command constructor: {reason}")]
    InvalidArgument { reason: String },
}

/// State shared by every command variant.
///
/// Delay and duration are taken as given; negative values are stored unchanged.
#[derive(Debug, Clone)]
pub struct CommandHeader {
    name: String,
    delay: Ticks,
    duration: Ticks,
    description: String,
    usage_format: Option<String>,
    initialized: bool,
    parms: Vec<String>,
    output: Option<Transcript>,
}

impl CommandHeader {
    pub fn new(
        name: impl Into<String>,
        delay: Ticks,
        duration: Ticks,
        description: impl Into<String>,
        usage_format: Option<&str>,
    ) -> Result<Self, CommandError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CommandError::InvalidArgument {
                reason: "command name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            name,
            delay,
            duration,
            description: description.into(),
            usage_format: usage_format.map(ToString::to_string),
            initialized: false,
            parms: Vec::new(),
            output: None,
        })
    }

    /// Infallible constructor for the crate's own commands, whose names are non-empty literals.
    pub(crate) fn fixed(
        name: &'static str,
        delay: Ticks,
        duration: Ticks,
        description: &'static str,
        usage_format: Option<&'static str>,
    ) -> Self {
        debug_assert!(!name.trim().is_empty());
        Self {
            name: name.to_string(),
            delay,
            duration,
            description: description.to_string(),
            usage_format: usage_format.map(ToString::to_string),
            initialized: false,
            parms: Vec::new(),
            output: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> Ticks {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Ticks) {
        self.delay = delay;
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Ticks) {
        self.duration = duration;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage_format(&self) -> Option<&str> {
        self.usage_format.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn parms(&self) -> &[String] {
        &self.parms
    }

    pub fn push_parm(&mut self, parm: impl Into<String>) {
        self.parms.push(parm.into());
    }

    pub fn output(&self) -> Option<&Transcript> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, output: Transcript) {
        self.output = Some(output);
    }

    /// Writes a user-visible line if an output sink is attached.
    pub fn say(&self, line: impl Into<String>) {
        if let Some(output) = &self.output {
            output.append_output_line(line);
        }
    }

    /// Builds the usage diagnostic and zeroes the timing so a rejected command costs nothing.
    pub fn usage(&mut self) -> String {
        self.delay = 0;
        self.duration = 0;
        match &self.usage_format {
            Some(format) => format!("USAGE: {format}"),
            None => format!("USAGE: {} command takes no parms", self.name),
        }
    }
}

pub trait Validate {
    /// Returns true iff `args` satisfies the command's grammar.
    fn init(&mut self, args: &[String]) -> bool;
}

pub trait Execute {
    /// Returns true iff the action completed. Doing nothing on purpose still counts.
    fn exec(&mut self) -> bool;
}

pub trait Command: Validate + Execute + Send {
    fn header(&self) -> &CommandHeader;

    fn header_mut(&mut self) -> &mut CommandHeader;

    fn is_user_input(&self) -> bool {
        true
    }

    fn is_internal(&self) -> bool {
        false
    }

    /// True only for the empty-queue sentinel.
    fn is_null(&self) -> bool {
        false
    }

    fn usage(&mut self) -> String {
        self.header_mut().usage()
    }

    fn name(&self) -> &str {
        self.header().name()
    }

    fn delay(&self) -> Ticks {
        self.header().delay()
    }

    fn set_delay(&mut self, delay: Ticks) {
        self.header_mut().set_delay(delay);
    }

    fn duration(&self) -> Ticks {
        self.header().duration()
    }

    fn is_initialized(&self) -> bool {
        self.header().is_initialized()
    }

    fn set_output(&mut self, output: Transcript) {
        self.header_mut().set_output(output);
    }

    /// Runs `init` and records the outcome in the header.
    fn validate(&mut self, args: &[String]) -> bool {
        let accepted = self.init(args);
        self.header_mut().set_initialized(accepted);
        accepted
    }
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("delay", &self.delay())
            .field("duration", &self.duration())
            .field("internal", &self.is_internal())
            .finish()
    }
}

pub fn convert_args_to_string(args: &[String]) -> String {
    args.join(" ").trim().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every exec into a shared log so tests can check order and count.
    pub(crate) struct ScriptedCommand {
        header: CommandHeader,
        internal: bool,
        succeed: bool,
        log: Arc<Mutex<Vec<String>>>,
        exec_count: Arc<AtomicUsize>,
    }

    impl ScriptedCommand {
        pub(crate) fn user(name: &str, delay: Ticks, duration: Ticks) -> Self {
            Self::build(name, delay, duration, false)
        }

        pub(crate) fn internal(name: &str, delay: Ticks, duration: Ticks) -> Self {
            Self::build(name, delay, duration, true)
        }

        fn build(name: &str, delay: Ticks, duration: Ticks, internal: bool) -> Self {
            Self {
                header: CommandHeader::new(name, delay, duration, "scripted", None)
                    .expect("scripted header"),
                internal,
                succeed: true,
                log: Arc::new(Mutex::new(Vec::new())),
                exec_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn failing(mut self) -> Self {
            self.succeed = false;
            self
        }

        pub(crate) fn with_log(mut self, log: &Arc<Mutex<Vec<String>>>) -> Self {
            self.log = Arc::clone(log);
            self
        }

        pub(crate) fn exec_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.exec_count)
        }

        pub(crate) fn boxed(self) -> Box<dyn Command> {
            Box::new(self)
        }
    }

    impl Validate for ScriptedCommand {
        fn init(&mut self, args: &[String]) -> bool {
            for arg in args {
                self.header.push_parm(arg.clone());
            }
            true
        }
    }

    impl Execute for ScriptedCommand {
        fn exec(&mut self) -> bool {
            self.exec_count.fetch_add(1, Ordering::SeqCst);
            self.log
                .lock()
                .expect("scripted log")
                .push(self.header.name().to_string());
            self.succeed
        }
    }

    impl Command for ScriptedCommand {
        fn header(&self) -> &CommandHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut CommandHeader {
            &mut self.header
        }

        fn is_user_input(&self) -> bool {
            !self.internal
        }

        fn is_internal(&self) -> bool {
            self.internal
        }
    }
}
