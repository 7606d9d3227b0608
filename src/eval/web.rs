//! Evaluation through a search engine's calculator answer.
//!
//! The expression is sent as a search query with a trailing `=`, and the
//! answer is scraped out of the first `<b>lhs = rhs</b>` in the page. Query
//! building and scraping are pure so they can be tested without a network.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use regex::Regex;
use ureq::{Agent, AgentBuilder, Proxy};

use super::Evaluator;
use crate::config::{Config, Endpoint};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct WebEvaluator {
    agent: Agent,
    endpoint: Endpoint,
}

impl WebEvaluator {
    pub fn new(
        endpoint: Endpoint,
        proxy: Option<&Endpoint>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut builder = AgentBuilder::new().timeout(timeout).user_agent(USER_AGENT);
        if let Some(proxy) = proxy {
            let proxy = Proxy::new(proxy.to_string())
                .with_context(|| format!("Invalid proxy: {}", proxy))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            agent: builder.build(),
            endpoint,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.endpoint.clone(), config.proxy.as_ref(), config.timeout)
    }

    fn contact_failed<E: std::fmt::Display>(&self, e: E) -> Error {
        Error::EvaluationFailed(format!("Error contacting {}: {}", self.endpoint.host, e))
    }
}

impl Evaluator for WebEvaluator {
    fn evaluate(&mut self, expression: &str) -> Result<String> {
        let url = format!("http://{}/search", self.endpoint);
        let query = query(expression);
        log::debug!("GET {} q={:?}", url, query);

        let response = match self.agent.get(&url).query("q", &query).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(Error::EvaluationFailed(format!(
                    "{} answered with HTTP {}",
                    self.endpoint.host, code
                )))
            }
            Err(ureq::Error::Transport(e)) => return Err(self.contact_failed(e)),
        };

        let body = response.into_string().map_err(|e| self.contact_failed(e))?;
        scrape(&body)
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// The search query for `expression`.
///
/// Digit groups separated by a single space are joined, since `1 000` would
/// otherwise be read as two numbers.
pub fn query(expression: &str) -> String {
    static DIGIT_GROUP: OnceLock<Regex> = OnceLock::new();
    let digit_group = regex(&DIGIT_GROUP, r"(\d) (\d)");

    let mut joined = expression.to_string();
    loop {
        let next = digit_group.replace_all(&joined, "$1$2").into_owned();
        if next == joined {
            break;
        }
        joined = next;
    }

    format!("{}=", joined)
}

/// Pulls the answer out of a result page.
pub fn scrape(body: &str) -> Result<String> {
    static ANSWER: OnceLock<Regex> = OnceLock::new();
    let answer = regex(&ANSWER, r"<b>(.*?) += +(.*?) *</b>");

    let caps = answer
        .captures(body)
        .ok_or_else(|| Error::EvaluationFailed(String::from("Error extracting results")))?;
    log::debug!("service read the expression as {:?}", caps[1].trim());

    let result = clean(&caps[2]);
    if result.is_empty() {
        return Err(Error::EvaluationFailed(String::from("Error extracting results")));
    }
    Ok(result)
}

fn clean(markup: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let text = markup
        .replace("&#215;", " x ")
        .replace("<sup>", "^");
    let text = regex(&TAG, r"<.+?>").replace_all(&text, "");
    let text = text.replace('\u{a0}', " ").replace("&nbsp;", " ");
    regex(&SPACES, r" +")
        .replace_all(&text, " ")
        .trim()
        .to_string()
}
