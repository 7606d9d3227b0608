use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::Memory;
use crate::error::{Error, Result};

/// Repeat passes allowed before a chain of references is treated as circular.
pub const MAX_DEPTH: usize = 100;

/// Longest expansion accepted, in bytes. A value that refers to itself more
/// than once grows geometrically and would exhaust memory before `MAX_DEPTH`.
pub const MAX_LEN: usize = 64 * 1024;

fn reference() -> &'static Regex {
    static REFERENCE: OnceLock<Regex> = OnceLock::new();
    REFERENCE.get_or_init(|| Regex::new(r"\$([0-9A-Za-z_]+)").unwrap())
}

impl Memory {
    /// Replaces every bound `$name` in `expression` with its value, repeating
    /// until a pass changes nothing.
    ///
    /// Unbound references are passed through untouched, so `$5 in UK pounds`
    /// still reaches the evaluator when `$5` was never stored. Names are
    /// matched whole: `$10` is never read as `$1` followed by `0`.
    pub fn substitute(&self, expression: &str) -> Result<String> {
        let mut expression = expression.to_string();
        let mut depth = 0;

        loop {
            if depth > MAX_DEPTH {
                return Err(Error::RecursionLimitExceeded);
            }

            let (next, substituted) = self.substitute_pass(&expression);
            if !substituted {
                return Ok(next);
            }
            if next.len() > MAX_LEN {
                return Err(Error::RecursionLimitExceeded);
            }

            log::debug!("substitution pass {}: {}", depth, next);
            expression = next;
            depth += 1;
        }
    }

    fn substitute_pass(&self, expression: &str) -> (String, bool) {
        let mut substituted = false;
        let next = reference().replace_all(expression, |caps: &Captures| {
            match self.get(&caps[1]) {
                Some(value) => {
                    substituted = true;
                    value.to_string()
                }
                None => caps[0].to_string(),
            }
        });
        (next.into_owned(), substituted)
    }
}
