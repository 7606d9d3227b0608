extern crate anyhow;

mod cli;
mod cmd;
mod config;
mod error;
mod eval;
mod memory;
mod session;

use std::io;
use std::os::unix::io::AsRawFd;
use std::process;

use anyhow::Context;
use nix::unistd::isatty;

use cli::{Action, CliArgs};
use cmd::State;
use config::Config;
use eval::WebEvaluator;
use memory::SaveDir;
use session::{IOReader, PromptReader, Session};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("CLI_CALC_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", cli::usage());
            process::exit(2);
        }
    };

    let code = run(args).unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        1
    });
    process::exit(code);
}

fn run(args: CliArgs) -> anyhow::Result<i32> {
    match args.action {
        Action::Help => {
            println!("{}", cli::usage());
            return Ok(0);
        }
        Action::Version => {
            println!("{}", cli::version());
            return Ok(0);
        }
        Action::Expression(expression) => {
            let config = Config::from_env()?;
            let mut evaluator = WebEvaluator::from_config(&config)?;
            return Ok(match eval::calculate(&mut evaluator, &expression) {
                Ok(result) => {
                    println!("{}", result);
                    0
                }
                Err(e) => {
                    eprintln!("{}", e);
                    1
                }
            });
        }
        Action::Interactive => (),
    }

    let config = Config::from_env()?;
    log::debug!("{:?}", config);
    let mut state = State::new(
        SaveDir::new(&config.data_dir),
        WebEvaluator::from_config(&config)?,
    );
    state.autoload();

    let stdin = io::stdin();
    if isatty(stdin.as_raw_fd()).context("Failed to inspect stdin.")? {
        if !args.quiet {
            println!("{}", cli::version());
            println!();
        }
        Session::new(PromptReader::new(&config.history_file), state)?.all()?;
    } else {
        Session::new(IOReader::new(stdin.lock()), state)?.all()?;
    }

    Ok(0)
}
