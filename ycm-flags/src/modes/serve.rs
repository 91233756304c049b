// SPDX-License-Identifier: GPL-3.0-or-later

//! The request loop of the editor integration.
//!
//! Every input line is a JSON object with a `filename` key, and is answered by
//! exactly one output line. The loop ends when the input is closed.

use super::write_response;
use crate::resolver::{Request, Resolver, Response};
use std::io::{self, BufRead, Write};

pub(super) fn serve(resolver: &Resolver, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    // Lines are bytes here; one which is not UTF-8 is an invalid request, not an I/O error.
    for line in input.split(b'\n') {
        let line = line?;
        if line.trim_ascii().is_empty() {
            continue;
        }
        let response = match serde_json::from_slice::<Request>(&line) {
            Ok(request) => {
                log::debug!("Request: {}", request.filename.display());
                resolver.resolve(&request.filename)
            }
            Err(error) => {
                log::warn!("Invalid request ({error}): {}", String::from_utf8_lossy(&line));
                Response::fallback()
            }
        };
        write_response(&mut output, &response)?;
    }
    log::debug!("Input closed, stop serving");
    Ok(())
}
