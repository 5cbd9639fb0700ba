//! Interactive operator commands for `run`.
//!
//! One command per line, case-insensitive:
//!
//! ```text
//! start | stop | reset | set <green> <left> | status | help | quit
//! ```

use crate::error::CommandError;
use crate::input::RequestedDurations;

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Stop,
    Reset,
    /// New duration fields, already sanitized.
    Set(RequestedDurations),
    Status,
    Help,
    Quit,
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  start              start or resume the cycle
  stop               pause the cycle, keeping state
  reset              discard state and show all red
  set <green> <left> change durations (applied on the next tick)
  status             print the current snapshot
  quit               exit";

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown words or wrong argument counts.
pub fn parse_command(line: &str) -> Result<Option<OperatorCommand>, CommandError> {
    let line = line.split('#').next().unwrap_or_default();
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let (command, expected) = match word.to_ascii_lowercase().as_str() {
        "start" => (OperatorCommand::Start, 0),
        "stop" => (OperatorCommand::Stop, 0),
        "reset" => (OperatorCommand::Reset, 0),
        "status" => (OperatorCommand::Status, 0),
        "help" | "?" => (OperatorCommand::Help, 0),
        "quit" | "exit" | "q" => (OperatorCommand::Quit, 0),
        "set" => {
            let [green, left_turn] = args.as_slice() else {
                return Err(CommandError::Arity {
                    command: "set",
                    expected: 2,
                    found: args.len(),
                });
            };
            return Ok(Some(OperatorCommand::Set(RequestedDurations::from_text(
                green, left_turn,
            ))));
        }
        _ => return Err(CommandError::Unknown(word.to_string())),
    };

    if args.len() != expected {
        return Err(CommandError::Arity {
            command: command.name(),
            expected,
            found: args.len(),
        });
    }
    Ok(Some(command))
}

impl OperatorCommand {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
            Self::Set(_) => "set",
            Self::Status => "status",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}
