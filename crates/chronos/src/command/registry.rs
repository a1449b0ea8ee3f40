use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::core::{Command, Ticks};
use super::scheduler::{DrainReport, Scheduler};
use super::user::{Help, Inspect, Look, Quit, Wait};
use crate::transcript::Transcript;
use crate::world::InnHandle;

pub const ERRMSG_UNKNOWN: &str = "I don't understand what you want to do.";

type FactoryFn = dyn Fn(&CommandRegistry) -> Box<dyn Command> + Send + Sync;

pub struct CommandSpec {
    name: String,
    description: String,
    arg_schema: String,
    factory: Box<FactoryFn>,
}

impl CommandSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arg_schema(&self) -> &str {
        &self.arg_schema
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command name cannot be empty")]
    EmptyName,
    #[error("duplicate command registration: {name}")]
    Duplicate { name: String },
}

/// Collaborators the built-in user commands act on.
#[derive(Debug, Clone)]
pub struct BuiltinContext {
    pub inn: InnHandle,
    pub quit_requested: Arc<AtomicBool>,
    pub wait_seconds: Ticks,
}

pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub fn with_builtins(context: &BuiltinContext) -> Self {
        let mut registry = Self::new();
        let inn = context.inn.clone();
        let quit_requested = Arc::clone(&context.quit_requested);
        let wait_seconds = context.wait_seconds;
        registry
            .register("help", "List the commands you can use", "", |registry| {
                Box::new(Help::new(registry.help_lines()))
            })
            .expect("built-in command registration should not fail");
        registry
            .register("look", "Look around the room", "", move |_| {
                Box::new(Look::new(inn.clone()))
            })
            .expect("built-in command registration should not fail");
        let inspect_inn = context.inn.clone();
        registry
            .register(
                "inspect",
                "Get a near description of a patron",
                "<NPC Name>",
                move |_| Box::new(Inspect::new(inspect_inn.clone())),
            )
            .expect("built-in command registration should not fail");
        registry
            .register(
                "wait",
                "Do nothing for the given amount of time",
                "[N M[inutes] | N H[ours]]",
                move |_| Box::new(Wait::new(wait_seconds)),
            )
            .expect("built-in command registration should not fail");
        registry
            .register("quit", "End the program", "", move |_| {
                Box::new(Quit::new(Arc::clone(&quit_requested)))
            })
            .expect("built-in command registration should not fail");
        registry
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        arg_schema: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&CommandRegistry) -> Box<dyn Command> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(RegistryError::Duplicate { name });
        }

        self.specs.push(CommandSpec {
            name,
            description: description.into(),
            arg_schema: arg_schema.into(),
            factory: Box::new(factory),
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    /// Builds a fresh command for `input_name`, matched case-insensitively.
    pub fn create(&self, input_name: &str) -> Option<Box<dyn Command>> {
        let spec = self.lookup(input_name)?;
        Some((spec.factory)(self))
    }

    pub fn iter_specs_in_order(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn help_lines(&self) -> Vec<String> {
        self.iter_specs_in_order()
            .map(|spec| {
                if spec.arg_schema().is_empty() {
                    format!("{} - {}", spec.name(), spec.description())
                } else {
                    format!(
                        "{} {} - {}",
                        spec.name(),
                        spec.arg_schema(),
                        spec.description()
                    )
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Empty,
    Malformed { reason: String },
    Unknown { name: String },
    Rejected { usage: String },
    Scheduled(Option<DrainReport>),
}

/// Turns typed lines into scheduled commands.
pub struct CommandParser {
    registry: CommandRegistry,
    scheduler: Scheduler,
    output: Transcript,
}

impl CommandParser {
    pub fn new(registry: CommandRegistry, scheduler: Scheduler, output: Transcript) -> Self {
        Self {
            registry,
            scheduler,
            output,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn receive_command(&mut self, raw_line: &str) -> ParseOutcome {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return ParseOutcome::Empty;
        }

        let tokens = match tokenize_line(trimmed) {
            Ok(tokens) => tokens,
            Err(reason) => {
                self.output
                    .append_output_line(format!("error: {reason}. try: help"));
                return ParseOutcome::Malformed { reason };
            }
        };
        let Some((command_name, args)) = tokens.split_first() else {
            return ParseOutcome::Empty;
        };

        let Some(mut command) = self.registry.create(command_name) else {
            self.output.append_output_line(ERRMSG_UNKNOWN);
            return ParseOutcome::Unknown {
                name: command_name.clone(),
            };
        };
        command.set_output(self.output.clone());

        if !command.validate(args) {
            let usage = command.usage();
            debug!(command = command.name(), args = args.len(), "command_rejected");
            self.output.append_output_line(usage.clone());
            return ParseOutcome::Rejected { usage };
        }

        ParseOutcome::Scheduled(self.scheduler.sched(command))
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }

    if seen_token_content {
        tokens.push(current);
    }

    Ok(tokens)
}
