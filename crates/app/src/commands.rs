use std::fmt;

use greeting_core::model::{AchievementId, SectionId, TransitionKind};
use services::MiniGame;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Go { section: String, kind: TransitionKind },
    Back,
    Interact { section: SectionId, id: String },
    Collect { section: SectionId, id: String },
    Secret(String),
    Unlock(AchievementId),
    Candles(u32),
    Win(MiniGame),
    Status,
    Achievements,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str, argument: &'static str },
    InvalidArgument { command: &'static str, raw: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(raw) => write!(f, "unknown command: {raw} (try `help`)"),
            CommandError::MissingArgument { command, argument } => {
                write!(f, "{command} requires <{argument}>")
            }
            CommandError::InvalidArgument { command, raw } => {
                write!(f, "invalid argument for {command}: {raw}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  go <section> [fade|slide|zoom]   navigate to a section
  back                             return to the previous section
  interact <section> <id>          record a completed interaction
  collect <section> <id>           pick up a collectible
  secret <id>                      unlock a secret
  unlock <achievement>             grant an achievement directly
  candles <n>                      report how many candles were blown out
  win <memory|quiz|words>          report a finished mini-game
  status                           show progress
  achievements                     list unlocked achievements
  help                             show this text
  quit                             leave";

fn next_arg<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    parts
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn section_arg<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<SectionId, CommandError> {
    let raw = next_arg(parts, command, "section")?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        raw: raw.to_string(),
    })
}

fn transition_kind(raw: &str) -> Option<TransitionKind> {
    match raw {
        "fade" => Some(TransitionKind::Fade),
        "slide" => Some(TransitionKind::Slide),
        "zoom" => Some(TransitionKind::Zoom),
        _ => None,
    }
}

impl HostCommand {
    /// Parse a prompt line.
    ///
    /// Section names for `go` stay raw so that navigation itself reports
    /// unknown sections.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for empty, unknown, or malformed lines.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };

        let command = match head {
            "go" => {
                let section = next_arg(&mut parts, "go", "section")?.to_string();
                let kind = match parts.next() {
                    None => TransitionKind::default(),
                    Some(raw) => transition_kind(raw).ok_or(CommandError::InvalidArgument {
                        command: "go",
                        raw: raw.to_string(),
                    })?,
                };
                HostCommand::Go { section, kind }
            }
            "back" => HostCommand::Back,
            "interact" => HostCommand::Interact {
                section: section_arg(&mut parts, "interact")?,
                id: next_arg(&mut parts, "interact", "id")?.to_string(),
            },
            "collect" => HostCommand::Collect {
                section: section_arg(&mut parts, "collect")?,
                id: next_arg(&mut parts, "collect", "id")?.to_string(),
            },
            "secret" => HostCommand::Secret(next_arg(&mut parts, "secret", "id")?.to_string()),
            "unlock" => HostCommand::Unlock(AchievementId::parse(next_arg(
                &mut parts,
                "unlock",
                "achievement",
            )?)),
            "candles" => {
                let raw = next_arg(&mut parts, "candles", "n")?;
                let count = raw.parse().map_err(|_| CommandError::InvalidArgument {
                    command: "candles",
                    raw: raw.to_string(),
                })?;
                HostCommand::Candles(count)
            }
            "win" => {
                let raw = next_arg(&mut parts, "win", "game")?;
                let game = raw.parse().map_err(|_| CommandError::InvalidArgument {
                    command: "win",
                    raw: raw.to_string(),
                })?;
                HostCommand::Win(game)
            }
            "status" => HostCommand::Status,
            "achievements" => HostCommand::Achievements,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" => HostCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
