// SPDX-License-Identifier: GPL-3.0-or-later

mod serve;

use crate::context::Context;
use crate::ninja::Ninja;
use crate::resolver::{Resolver, Response};
use crate::{args, config, database, environment};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

/// Represent the modes the application can run in.
///
/// - query: resolve the files named on the command line, print and exit.
/// - serve: keep answering requests, the way an editor plugin would ask.
///
/// Both share one resolver, and with that one compilation database which is
/// loaded at most once for the lifetime of the process.
pub enum Mode {
    Query(Resolver<'static>, Vec<String>),
    Serve(Resolver<'static>),
}

impl Mode {
    /// Configure the application mode based on the command line arguments and the configuration.
    ///
    /// Problems with the compilation database or the build tool are not fatal
    /// here; those are reported when the files are resolved.
    pub fn configure(context: Context, args: args::Arguments, config: config::Main) -> Self {
        let database_directory = context
            .var(environment::KEY_CHROMIUM__BUILD_DIR)
            .map(Path::new)
            .or(config.database.directory.as_deref())
            .map(|directory| context.absolute(directory));
        match &database_directory {
            Some(directory) => log::debug!("Compilation database directory: {}", directory.display()),
            None => log::debug!("Compilation database is not configured"),
        }
        let database = database::shared(database_directory.as_deref());

        let tool = Box::new(Ninja::new(config.build.program.clone()));
        let resolver = Resolver::new(context, &config, database, tool);

        match args.mode {
            args::Mode::Query { files } => {
                log::debug!("Mode: resolve {} file(s)", files.len());
                Self::Query(resolver, files)
            }
            args::Mode::Serve => {
                log::debug!("Mode: serve requests from standard input");
                Self::Serve(resolver)
            }
        }
    }

    /// It actually runs the application mode.
    ///
    /// Resolution itself can't fail, only writing the responses can.
    pub fn run(self) -> ExitCode {
        let status = match self {
            Self::Query(resolver, files) => query(&resolver, &files, io::stdout().lock()),
            Self::Serve(resolver) => serve::serve(&resolver, io::stdin().lock(), io::stdout().lock()),
        };
        match status {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                log::error!("ycm-flags: {error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Resolves each file and writes the responses in the order of the files.
fn query(resolver: &Resolver, files: &[String], mut output: impl Write) -> io::Result<()> {
    for file in files {
        let response = resolver.resolve(Path::new(file));
        write_response(&mut output, &response)?;
    }
    Ok(())
}

/// Writes the response as a single JSON line.
fn write_response(output: &mut impl Write, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()
}
