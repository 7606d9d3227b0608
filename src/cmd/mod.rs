mod builtin;
mod parse;

pub use builtin::usage;
use parse::{parse_shape, Shape};

use crate::eval::Evaluator;
use crate::memory::{Memory, SaveDir};

/// Everything a command can touch.
pub struct State<E> {
    pub memory: Memory,
    pub saves: SaveDir,
    pub evaluator: E,
}

impl<E: Evaluator> State<E> {
    pub fn new(saves: SaveDir, evaluator: E) -> Self {
        Self {
            memory: Memory::new(),
            saves,
            evaluator,
        }
    }

    /// Picks up the memory the last session autosaved. A missing autosave is
    /// not an error; an unreadable one is logged and skipped.
    pub fn autoload(&mut self) {
        match self.saves.autoload(&mut self.memory) {
            Ok(loaded) => log::debug!("autoloaded: {}", loaded),
            Err(e) => log::warn!("Ignoring the last session: {:#}", anyhow::Error::new(e)),
        }
    }

    pub fn autosave(&self) {
        if let Err(e) = self.saves.autosave(&self.memory) {
            log::warn!("Failed to autosave memory: {:#}", anyhow::Error::new(e));
        }
    }
}

/// What the session should do after a command ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Nothing,
    Print(String),
    ClearScreen,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Blank,
    ClearScreen,
    Quit,
    Help,
    Save(Option<String>),
    Restore(Option<String>),
    List,
    DeleteAll,
    Delete(String),
    DeleteFile(String),
    Store { name: String, value: String },
    Evaluate {
        name: Option<String>,
        expression: String,
    },
}

impl Command {
    /// Classifies a trimmed input line. Keywords are case-insensitive; a
    /// keyword with an argument it doesn't take is read as an expression.
    pub fn parse(line: &str) -> Self {
        let shape = match parse_shape(line) {
            Some(shape) => shape,
            None => return Self::Blank,
        };

        let (head, rest) = match shape {
            Shape::Store { name, value } => return Self::Store { name, value },
            Shape::Assign { name, expression } => {
                return Self::Evaluate {
                    name: Some(name),
                    expression,
                }
            }
            Shape::Words { head, rest } => (head.to_ascii_lowercase(), rest),
        };

        match (head.as_str(), rest) {
            ("clear", None) | ("cs", None) => Self::ClearScreen,
            ("q", None) | ("quit", None) | ("exit", None) => Self::Quit,
            ("help", None) | ("wtf", None) => Self::Help,
            ("save", name) => Self::Save(name),
            ("restore", name) | ("load", name) => Self::Restore(name),
            ("list", None) | ("ls", None) => Self::List,
            ("delete", Some(target)) if target.eq_ignore_ascii_case("all") => Self::DeleteAll,
            ("delete", Some(target)) => match file_argument(&target) {
                Some(name) => Self::DeleteFile(name.to_string()),
                None => {
                    let target = target.strip_prefix('$').unwrap_or(&target);
                    Self::Delete(target.to_string())
                }
            },
            _ => Self::Evaluate {
                name: None,
                expression: line.to_string(),
            },
        }
    }

    pub fn exec<E: Evaluator>(&self, state: &mut State<E>) -> anyhow::Result<Reply> {
        Ok(match self {
            Self::Blank => Reply::Nothing,
            Self::ClearScreen => Reply::ClearScreen,
            Self::Quit => Reply::Quit,
            Self::Help => Reply::Print(usage()),
            Self::Save(name) => Reply::Print(builtin::save(state, name.as_deref())?),
            Self::Restore(name) => Reply::Print(builtin::restore(state, name.as_deref())?),
            Self::List => Reply::Print(builtin::list(state)),
            Self::DeleteAll => {
                state.memory.clear();
                Reply::Print(String::from("  All variables deleted."))
            }
            Self::Delete(name) => Reply::Print(builtin::delete(state, name)?),
            Self::DeleteFile(name) => Reply::Print(builtin::delete_file(state, name)?),
            Self::Store { name, value } => {
                let name = state.memory.store(Some(name.as_str()), value.as_str());
                Reply::Print(format!("  ${} = {}", name, value))
            }
            Self::Evaluate { name, expression } => {
                Reply::Print(builtin::evaluate(state, name.as_deref(), expression)?)
            }
        })
    }

    /// Extra advice printed after this command fails.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Evaluate { .. } => Some("(Lost? Type \"quit\" or ^C to quit.)"),
            _ => None,
        }
    }
}

/// `file <name>` after `delete`.
fn file_argument(target: &str) -> Option<&str> {
    let (word, name) = target.split_once(char::is_whitespace)?;
    if word.eq_ignore_ascii_case("file") {
        Some(name.trim_start())
    } else {
        None
    }
}
