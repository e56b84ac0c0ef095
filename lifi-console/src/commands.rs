//! Console command parsing

/// Printed for `h` and at startup
pub const HELP: &str = "\
Commands:
  0-9    select channel
  t      begin transmitting the selected channel
  s      stop transmitting
  r      refresh transmitters
  p      list transmitters
  h      show this help
  q/esc  quit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectChannel(i64),
    BeginTransmit,
    EndTransmit,
    Refresh,
    ListPorts,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a line, `None` for blank input
    pub fn parse(line: &str) -> Option<Command> {
        let input = line.trim();
        if input.is_empty() {
            return None;
        }
        if let Ok(channel) = input.parse::<i64>() {
            return Some(Command::SelectChannel(channel));
        }

        let command = match input.to_ascii_lowercase().as_str() {
            "t" | "transmit" => Command::BeginTransmit,
            "s" | "stop" => Command::EndTransmit,
            "r" | "refresh" => Command::Refresh,
            "p" | "ports" => Command::ListPorts,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "esc" | "\x1b" => Command::Quit,
            _ => Command::Unknown(input.to_string()),
        };
        Some(command)
    }
}
