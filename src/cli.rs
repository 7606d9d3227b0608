//! Command-line arguments.
//!
//! Usage:
//!   cli-calc [-q]
//!   cli-calc -e <expression>
//!   cli-calc -h | -v

/// What to do after parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Action {
    #[default]
    Interactive,
    Help,
    Version,
    /// Evaluate one expression and exit (`-e`).
    Expression(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Skip the startup banner (`-q`).
    pub quiet: bool,
    pub action: Action,
}

pub fn version() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

pub fn usage() -> &'static str {
    "Usage: cli-calc [options]
    -?, -h, --help                   Show this message
    -v, --version                    Display version information
    -q, --quiet                      Do not display banner at startup
    -e, --expression EXPRESSION      Evaluate expression (non-interactive)"
}

/// Parses `std::env::args()`.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    parse_argv(&raw)
}

/// Parses an argument list. Help, version and `-e` take effect as soon as
/// they are seen; anything after them is ignored.
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        match arg {
            "-?" | "-h" | "--help" => {
                args.action = Action::Help;
                return Ok(args);
            }
            "-v" | "--version" => {
                args.action = Action::Version;
                return Ok(args);
            }
            "-q" | "--quiet" => args.quiet = true,
            "-e" | "--expression" => {
                let expression = argv
                    .get(i + 1)
                    .ok_or_else(|| format!("missing argument: {}", arg))?;
                args.action = Action::Expression(expression.clone());
                return Ok(args);
            }
            _ => {
                if let Some(expression) = arg.strip_prefix("--expression=") {
                    args.action = Action::Expression(expression.to_string());
                    return Ok(args);
                }
                if arg.starts_with('-') {
                    return Err(format!("invalid option: {}", arg));
                }
                return Err(format!("unexpected argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(args)
}
