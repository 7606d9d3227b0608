//! Runtime configuration, read from the environment.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `CLI_CALC_DIR` | memory file directory | `~/.cli-calc` |
//! | `CLI_CALC_ENDPOINT` | `host[:port]` of the search service | `www.google.com:80` |
//! | `http_proxy`, `HTTP_PROXY` | `[http://][user@]host[:port][/]` | none |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use directories::BaseDirs;

pub const DEFAULT_HOST: &str = "www.google.com";
pub const DEFAULT_PORT: u16 = 80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new<T: Into<String>>(host: T, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `host[:port]`, also accepting the `http://user@host:port/`
    /// shape proxy variables usually carry.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("http://").unwrap_or(s);
        let s = s.split('/').next().unwrap_or("");
        let s = s.rsplit('@').next().unwrap_or("");

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>()
                    .with_context(|| format!("Invalid port: {}", port))?,
            ),
            None => (s, DEFAULT_PORT),
        };

        if host.is_empty() {
            anyhow::bail!("Missing host name.");
        }
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub history_file: PathBuf,
    pub endpoint: Endpoint,
    pub proxy: Option<Endpoint>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup("CLI_CALC_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => BaseDirs::new()
                .context("Failed to get the home directory.")?
                .home_dir()
                .join(".cli-calc"),
        };

        let endpoint = match lookup("CLI_CALC_ENDPOINT") {
            Some(s) if !s.is_empty() => {
                Endpoint::parse(&s).context("Invalid CLI_CALC_ENDPOINT.")?
            }
            _ => Endpoint::new(DEFAULT_HOST, DEFAULT_PORT),
        };

        let proxy = match lookup("http_proxy").or_else(|| lookup("HTTP_PROXY")) {
            Some(s) if !s.is_empty() => Some(Endpoint::parse(&s).context("Invalid http_proxy.")?),
            _ => None,
        };

        Ok(Self {
            history_file: data_dir.join(".history"),
            data_dir,
            endpoint,
            proxy,
            timeout: Duration::from_secs(15),
        })
    }
}
