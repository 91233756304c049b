// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The `Arguments` type represents all possible invocations of the program.

use anyhow::anyhow;
use clap::{ArgAction, ArgMatches, Command, arg, command};

const MODE_SERVE_SUBCOMMAND: &str = "serve";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The path of the configuration file.
    pub config: Option<String>,
    // The number of times the verbose flag was given.
    pub verbose: u8,
    // The mode of the application.
    pub mode: Mode,
}

/// Represents the mode of the application.
#[derive(Debug, PartialEq)]
pub enum Mode {
    /// Resolve the flags of the given files and print them.
    Query { files: Vec<String> },
    /// Answer requests from the standard input until it is closed.
    Serve,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        match matches.subcommand() {
            Some((MODE_SERVE_SUBCOMMAND, serve_matches)) => {
                // Global arguments are propagated to the subcommand.
                let (config, verbose) = common(serve_matches);
                Ok(Arguments { config, verbose, mode: Mode::Serve })
            }
            None => {
                let (config, verbose) = common(&matches);
                let files: Vec<String> =
                    matches.get_many::<String>("FILE").map(|values| values.cloned().collect()).unwrap_or_default();
                if files.is_empty() {
                    return Err(anyhow!("missing source file"));
                }
                Ok(Arguments { config, verbose, mode: Mode::Query { files } })
            }
            _ => Err(anyhow!("unrecognized subcommand")),
        }
    }
}

fn common(matches: &ArgMatches) -> (Option<String>, u8) {
    let config = matches.get_one::<String>("config").map(String::to_string);
    let verbose = matches.get_count("verbose");
    (config, verbose)
}

/// Represents the command line interface of the application.
///
/// Without a subcommand the files given as arguments are resolved, the
/// `serve` subcommand runs the request loop of the editor integration.
pub fn cli() -> Command {
    command!()
        .subcommand_required(false)
        .subcommand_negates_reqs(true)
        .subcommand_precedence_over_arg(true)
        .arg_required_else_help(true)
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count).global(true),
            arg!(-c --config <FILE> "Path of the config file").global(true),
        ])
        .subcommand(
            Command::new(MODE_SERVE_SUBCOMMAND)
                .about("answers JSON requests from the standard input, one per line")
                .arg_required_else_help(false),
        )
        .arg(arg!(<FILE> ... "Source files to resolve the flags for").action(ArgAction::Append).required(true))
}
