use super::core::{Command, CommandHeader, Execute, Validate};

pub const NULL_COMMAND_NAME: &str = "NullCommand";

/// Returned by an empty queue in place of a real command. Never scheduled by producers.
#[derive(Debug, Clone)]
pub struct NullCommand {
    header: CommandHeader,
}

impl Default for NullCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl NullCommand {
    pub fn new() -> Self {
        Self {
            header: CommandHeader::fixed(NULL_COMMAND_NAME, 0, 0, "Nothing to do", None),
        }
    }
}

impl Validate for NullCommand {
    fn init(&mut self, _args: &[String]) -> bool {
        true
    }
}

impl Execute for NullCommand {
    fn exec(&mut self) -> bool {
        true
    }
}

impl Command for NullCommand {
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

    fn is_null(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_internal_and_harmless() {
        let mut command = NullCommand::new();
        assert_eq!(command.name(), NULL_COMMAND_NAME);
        assert!(command.is_internal());
        assert!(!command.is_user_input());
        assert!(command.validate(&["ignored".to_string()]));
        assert!(command.exec());
        assert_eq!(command.delay(), 0);
        assert_eq!(command.duration(), 0);
    }
}
