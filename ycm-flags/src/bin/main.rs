// SPDX-License-Identifier: GPL-3.0-or-later

use std::env::consts::{ARCH, FAMILY, OS};
use std::process::ExitCode;
use ycm_flags::{args, config, context, modes};

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Parse the command line arguments first, the verbosity sets up the logging.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;

    // Initialize the logging system. Logs go to stderr, stdout is for responses.
    let level = match arguments.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("{} v{} on {}/{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), FAMILY, OS, ARCH);
    log::info!("{arguments:?}");

    // Capture application context.
    let context = context::Context::capture()?;
    log::info!("{context}");
    // Load the configuration.
    let configuration = config::Loader::load(&context, &arguments.config)?;
    log::info!("{configuration}");

    // Run the application.
    let application = modes::Mode::configure(context, arguments, configuration);
    log::debug!("Configuration complete, resolving flags now...");
    let result = application.run();
    log::debug!("Exit code: {result:?}");

    Ok(result)
}
