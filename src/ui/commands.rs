//! Parsing of terminal commands.

use std::{mem::take, path::PathBuf, str::FromStr};

use crate::error::domain::UiError;

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  play | pause | p     toggle playback
  next | n             next song
  prev | b             previous song
  rewind | r           back to the start, or the previous song at the start
  seek <seconds>       jump to a position in the song
  vol <db>             set the volume in decibels
  jump <index>         play the song at a playlist index
  list                 show the playlist
  open <path>...       resolve files, folders and .musiclist manifests;
                       quote paths that contain spaces
  load <file>          play a single file without a playlist
  status               show what is playing
  help                 show this help
  quit | q             exit";

/// A user command read from the terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePlay,
    Next,
    Prev,
    Rewind,
    Seek(f64),
    Volume(f64),
    Jump(i64),
    List,
    Open(Vec<PathBuf>),
    Load(PathBuf),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = UiError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "play" | "pause" | "p" => Ok(Command::TogglePlay),
            "next" | "n" => Ok(Command::Next),
            "prev" | "b" => Ok(Command::Prev),
            "rewind" | "r" => Ok(Command::Rewind),
            "seek" => parse_finite(word, rest).map(Command::Seek),
            "vol" | "volume" => parse_finite(word, rest).map(Command::Volume),
            "jump" | "j" => parse_argument(word, rest).map(Command::Jump),
            "list" | "l" => Ok(Command::List),
            "open" | "o" => {
                let paths = split_paths(word, rest)?;
                if paths.is_empty() {
                    Err(invalid(word, "expected at least one path"))
                } else {
                    Ok(Command::Open(paths))
                }
            }
            "load" => {
                if rest.is_empty() {
                    Err(invalid(word, "expected a file path"))
                } else {
                    Ok(Command::Load(PathBuf::from(rest)))
                }
            }
            "status" | "s" => Ok(Command::Status),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ => Err(UiError::UnknownCommand(word.to_string())),
        }
    }
}

fn parse_argument<T: FromStr>(command: &str, argument: &str) -> Result<T, UiError> {
    if argument.is_empty() {
        return Err(invalid(command, "missing value"));
    }
    argument
        .parse()
        .map_err(|_| invalid(command, &format!("'{argument}' is not a number")))
}

fn parse_finite(command: &str, argument: &str) -> Result<f64, UiError> {
    let value: f64 = parse_argument(command, argument)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(command, &format!("'{argument}' is not a finite number")))
    }
}

/// Splits on whitespace, keeping double-quoted runs together.
fn split_paths(command: &str, rest: &str) -> Result<Vec<PathBuf>, UiError> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in rest.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    paths.push(PathBuf::from(take(&mut current)));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if quoted {
        return Err(invalid(command, "unterminated quote"));
    }
    if pending {
        paths.push(PathBuf::from(current));
    }
    Ok(paths)
}

fn invalid(command: &str, reason: &str) -> UiError {
    UiError::InvalidArgument {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}
