// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;

use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_serve_answers_each_line() -> Result<()> {
    let checkout = Checkout::new()?;
    let config = checkout.write_config("schema: 1.0\nbuild:\n  program: /nonexistent/ninja\n")?;
    let file = checkout.root.join("base/logging.cc");

    let input = format!(
        "{}\nnot a request\n{{\"filename\": \"/outside/of/checkout.cc\"}}\n",
        serde_json::json!({"filename": file, "client_data": {"&filetype": "cpp"}})
    );
    let output = checkout.command()?.arg("-c").arg(&config).arg("serve").write_stdin(input).output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;
    assert_eq!(responses.len(), 3);
    assert_eq!(flags(&responses[0]), checkout_flags(&checkout.root));
    assert_eq!(flags(&responses[1]), BASELINE_FLAGS);
    assert_eq!(flags(&responses[2]), BASELINE_FLAGS);
    assert!(responses.iter().all(|response| response["do_cache"] == false));
    Ok(())
}

#[test]
fn test_serve_reports_invalid_requests() -> Result<()> {
    let checkout = Checkout::new()?;

    checkout
        .command()?
        .args(["serve", "-v"])
        .write_stdin("{\"file\": \"base/logging.cc\"}\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid request"));
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_serve_with_build_tool() -> Result<()> {
    let checkout = Checkout::new()?;
    let ninja = checkout.fake_ninja()?;
    let config = checkout.write_config(&format!("schema: 1.0\nbuild:\n  program: {}\n", ninja.display()))?;

    let output = checkout
        .command()?
        .arg("-c")
        .arg(&config)
        .arg("serve")
        .write_stdin("{\"filename\": \"base/logging.cc\"}\n{\"filename\": \"base/logging.h\"}\n")
        .output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0], responses[1]);
    assert_eq!(responses[0]["do_cache"], true);
    assert!(flags(&responses[0]).contains(&"-DFAKE_NINJA".to_string()));
    Ok(())
}

#[test]
fn test_serve_continues_after_binary_line() -> Result<()> {
    let checkout = Checkout::new()?;
    let config = checkout.write_config("schema: 1.0\nbuild:\n  program: /nonexistent/ninja\n")?;

    let mut input = b"{\"filename\": \"base/\xff\xfe.cc\"}\n".to_vec();
    input.extend_from_slice(b"{\"filename\": \"base/logging.cc\"}\n");
    let output = checkout.command()?.arg("-c").arg(&config).arg("serve").write_stdin(input).output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;
    assert_eq!(responses.len(), 2);
    assert_eq!(flags(&responses[0]), BASELINE_FLAGS);
    assert_eq!(flags(&responses[1]), checkout_flags(&checkout.root));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid request"));
    Ok(())
}
