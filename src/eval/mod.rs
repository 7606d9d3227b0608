mod web;

pub use web::WebEvaluator;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

/// Turns an expression into display text.
///
/// Implementations collapse every failure into
/// [`Error::EvaluationFailed`](crate::error::Error::EvaluationFailed).
pub trait Evaluator {
    fn evaluate(&mut self, expression: &str) -> Result<String>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, expression: &str) -> Result<String> {
        (**self).evaluate(expression)
    }
}

fn plain_number() -> &'static Regex {
    static PLAIN_NUMBER: OnceLock<Regex> = OnceLock::new();
    PLAIN_NUMBER.get_or_init(|| Regex::new(r"^(?:[0-9]*\.?[0-9]+|[0-9]+\.?[0-9]*)$").unwrap())
}

pub fn is_plain_number(expression: &str) -> bool {
    plain_number().is_match(expression.trim())
}

/// Evaluates `expression`, answering plain decimal numbers without asking the
/// evaluator.
pub fn calculate<E: Evaluator + ?Sized>(evaluator: &mut E, expression: &str) -> Result<String> {
    if is_plain_number(expression) {
        return Ok(expression.to_string());
    }
    evaluator.evaluate(expression)
}
