extern crate rustyline;
extern crate signal_hook;

use super::{CalcHelper, Reader};
use crate::memory::{Memory, SaveDir};
use anyhow::Context;
use rustyline::{error::ReadlineError, CompletionType, Config, Editor};
use signal_hook::consts::signal;
use signal_hook::iterator::Signals;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;

pub const PROMPT: &str = "? ";

pub struct PromptReader {
    editor: Editor<CalcHelper>,
    history: PathBuf,
}

impl Reader for PromptReader {
    fn init(&mut self) -> anyhow::Result<()> {
        if let Err(e) = self.editor.load_history(&self.history) {
            log::debug!("no history loaded from {}: {}", self.history.display(), e);
        }
        sighook()
    }

    fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        match self.editor.readline(PROMPT) {
            Ok(s) => {
                if !s.trim().is_empty() {
                    self.editor.add_history_entry(s.as_str());
                }
                Ok(Some(s))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn refresh(&mut self, memory: &Memory, saves: &SaveDir) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_context(memory.named_variables(), saves.list());
        }
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        let saved = self
            .history
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .context("Failed to create the history directory.")
            .and_then(|_| {
                self.editor
                    .save_history(&self.history)
                    .context("Failed to save history.")
            });
        if let Err(e) = saved {
            log::warn!("{:#}", e);
        }
        Ok(())
    }
}

impl PromptReader {
    pub fn new<P: Into<PathBuf>>(history: P) -> Self {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .max_history_size(1000)
            .build();
        let mut editor = Editor::with_config(config);
        editor.set_helper(Some(CalcHelper::new()));

        Self {
            editor,
            history: history.into(),
        }
    }
}

/// Ends the process cleanly when interrupted outside the line editor, e.g.
/// while waiting on the evaluator.
fn sighook() -> anyhow::Result<()> {
    let mut signals = Signals::new(&[signal::SIGINT, signal::SIGTERM])
        .context("Failed to initialize signals.")?;

    thread::spawn(move || {
        if signals.forever().next().is_some() {
            println!();
            process::exit(0);
        }
    });
    Ok(())
}
