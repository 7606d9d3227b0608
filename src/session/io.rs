use super::Reader;
use std::io::{BufRead, Lines};

/// Reads commands from a non-interactive source such as piped stdin.
pub struct IOReader<R>(Lines<R>);

impl<R: BufRead> Reader for IOReader<R> {
    fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        match self.0.next() {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }
}

impl<R: BufRead> IOReader<R> {
    pub fn new(reader: R) -> Self {
        Self(reader.lines())
    }
}
