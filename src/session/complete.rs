use std::collections::BTreeSet;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

const WORDS: &str = include_str!("words.txt");

/// Tab completion over a fixed vocabulary plus the session's variables and
/// memory files. `$` does not break words, so `$ra<TAB>` completes `$radius`.
#[derive(Debug, Default)]
pub struct CalcHelper {
    words: Vec<String>,
    variables: BTreeSet<String>,
    saves: Vec<String>,
}

impl CalcHelper {
    pub fn new() -> Self {
        Self {
            words: static_words(),
            ..Self::default()
        }
    }

    pub fn set_context(&mut self, variables: BTreeSet<String>, saves: Vec<String>) {
        self.variables = variables;
        self.saves = saves;
    }

    /// Case-insensitive prefix matches for `token`, sorted and deduplicated.
    pub fn candidates(&self, token: &str) -> Vec<String> {
        if token.is_empty() {
            return Vec::new();
        }

        let token = token.to_lowercase();
        self.words
            .iter()
            .chain(self.variables.iter())
            .chain(self.saves.iter())
            .filter(|word| word.to_lowercase().starts_with(&token))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn static_words() -> Vec<String> {
    WORDS
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn is_break(c: char) -> bool {
    c.is_whitespace() || "\"'`@><=;|&{(".contains(c)
}

fn token_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|&(_, c)| is_break(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

impl Completer for CalcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = token_start(line, pos);
        let pairs = self
            .candidates(&line[start..pos])
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CalcHelper {
    type Hint = String;
}

impl Highlighter for CalcHelper {}

impl Validator for CalcHelper {}

impl Helper for CalcHelper {}
