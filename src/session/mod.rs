mod complete;
mod io;
mod prompt;

pub use complete::CalcHelper;
pub use io::IOReader;
pub use prompt::PromptReader;

use std::io::{stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::cmd::{Command, Reply, State};
use crate::eval::Evaluator;
use crate::memory::{Memory, SaveDir};

pub struct Session<R, E> {
    reader: R,
    state: State<E>,
}

pub trait Reader: Sized {
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn next_line(&mut self) -> anyhow::Result<Option<String>>;
    #[allow(unused_variables)]
    fn refresh(&mut self, memory: &Memory, saves: &SaveDir) {}
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<R: Reader, E: Evaluator> Session<R, E> {
    pub fn new(mut reader: R, state: State<E>) -> anyhow::Result<Self> {
        reader.init()?;
        Ok(Self { reader, state })
    }

    #[cfg(test)]
    pub fn state(&self) -> &State<E> {
        &self.state
    }

    pub fn next(&mut self) -> anyhow::Result<bool> {
        self.reader.refresh(&self.state.memory, &self.state.saves);

        let line = match self.reader.next_line() {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(false),
            Err(e) => {
                eprintln!("Readline Error: {}", e);
                return Ok(true);
            }
        };
        let line = line.replace('\t', " ");

        let cmd = Command::parse(line.trim());
        log::debug!("{:?}", cmd);

        match cmd.exec(&mut self.state) {
            Ok(Reply::Nothing) => (),
            Ok(Reply::Quit) => return Ok(false),
            Ok(Reply::ClearScreen) => {
                let mut out = stdout();
                execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
                out.flush()?;
            }
            Ok(Reply::Print(text)) => {
                println!("{}", text);
                println!();
                self.state.autosave();
            }
            Err(e) => {
                match cmd.hint() {
                    Some(hint) => eprintln!("  {:#}. {}", e, hint),
                    None => eprintln!("  {:#}.", e),
                }
                println!();
            }
        }

        Ok(true)
    }

    pub fn all(&mut self) -> anyhow::Result<()> {
        loop {
            if !self.next()? {
                break;
            }
        }

        self.reader.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stub::Stub;
    use std::collections::VecDeque;

    struct Script {
        lines: VecDeque<&'static str>,
        refreshed: usize,
        finished: bool,
    }

    impl Script {
        fn new(lines: &[&'static str]) -> Self {
            Self {
                lines: lines.iter().copied().collect(),
                refreshed: 0,
                finished: false,
            }
        }
    }

    impl Reader for Script {
        fn next_line(&mut self) -> anyhow::Result<Option<String>> {
            Ok(self.lines.pop_front().map(String::from))
        }

        fn refresh(&mut self, _memory: &Memory, _saves: &SaveDir) {
            self.refreshed += 1;
        }

        fn finish(&mut self) -> anyhow::Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn session(lines: &[&'static str]) -> (tempfile::TempDir, Session<Script, Stub>) {
        let dir = tempfile::tempdir().unwrap();
        let stub = Stub::new().answer("2 + 2", "4").answer("4 * 10", "40");
        let state = State::new(SaveDir::new(dir.path()), stub);
        (dir, Session::new(Script::new(lines), state).unwrap())
    }

    #[test]
    fn runs_until_end_of_input() {
        let (_dir, mut session) = session(&["2 + 2", "", "\t$1 * 10  ", "$x <= 1"]);
        session.all().unwrap();

        let state = session.state();
        assert_eq!(state.memory.get("1"), Some("4"));
        assert_eq!(state.memory.get("2"), Some("40"));
        assert_eq!(state.memory.get("x"), Some("1"));
        assert_eq!(state.evaluator.calls, vec!["2 + 2", "4 * 10"]);
        assert_eq!(session.reader.refreshed, 5);
        assert!(session.reader.finished);
    }

    #[test]
    fn changes_are_autosaved() {
        let (dir, mut session) = session(&["2 + 2", "$x <= 1"]);
        session.all().unwrap();

        let mut memory = Memory::new();
        assert!(SaveDir::new(dir.path()).autoload(&mut memory).unwrap());
        assert_eq!(&memory, &session.state().memory);
    }

    #[test]
    fn quit_stops_reading() {
        let (_dir, mut session) = session(&["2 + 2", "quit", "4 * 10"]);
        session.all().unwrap();

        assert_eq!(session.state().evaluator.calls, vec!["2 + 2"]);
        assert_eq!(session.reader.lines, vec!["4 * 10"]);
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let (_dir, mut session) = session(&["delete nope", "restore nope", "bogus", "2 + 2"]);
        session.all().unwrap();

        assert_eq!(session.state().memory.get("1"), Some("4"));
        assert_eq!(session.state().evaluator.calls, vec!["bogus", "2 + 2"]);
    }
}
