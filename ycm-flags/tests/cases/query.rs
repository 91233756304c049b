// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;

use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_outside_of_checkout() -> Result<()> {
    let checkout = Checkout::new()?;

    checkout
        .command_in(checkout.base())?
        .arg("hello.cc")
        .assert()
        .success()
        .stdout(predicate::eq(
            "{\"flags\":[\"-DUSE_CLANG_COMPLETER\",\"-std=c++14\",\"-x\",\"c++\"],\"do_cache\":false}\n",
        ));
    Ok(())
}

#[test]
fn test_without_build_tool() -> Result<()> {
    let checkout = Checkout::new()?;
    let config = checkout.write_config("schema: 1.0\nbuild:\n  program: /nonexistent/ninja\n")?;

    let output = checkout.command()?.arg("-c").arg(&config).args(["base/logging.cc", "base/mac/window.mm"]).output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;
    assert_eq!(responses.len(), 2);

    assert_eq!(flags(&responses[0]), checkout_flags(&checkout.root));
    assert_eq!(responses[0]["do_cache"], false);

    let mut expected = checkout_flags(&checkout.root);
    expected.extend(["-x".to_string(), "objective-c++".to_string()]);
    assert_eq!(flags(&responses[1]), expected);
    assert_eq!(responses[1]["do_cache"], false);
    Ok(())
}

#[test]
fn test_from_compilation_database() -> Result<()> {
    let checkout = Checkout::new()?;
    let config = checkout.write_config("schema: 1.0\nbuild:\n  program: /nonexistent/ninja\n")?;
    let out_dir = checkout.write_database(
        "out/Release",
        serde_json::json!([
            {
                "directory": checkout.root.join("out/Release"),
                "file": "../../base/logging.cc",
                "command": "clang++ -I../.. -Igen -DNDEBUG -std=c++20 -c ../../base/logging.cc -o obj/logging.o"
            }
        ]),
    )?;

    let output = checkout
        .command()?
        .env("CHROMIUM_BUILD_DIR", &out_dir)
        .arg("-c")
        .arg(&config)
        .args(["base/logging.h", "base/other.cc"])
        .output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;

    let mut expected = checkout_flags(&checkout.root);
    expected.extend([
        format!("-I{}", checkout.root.display()),
        format!("-I{}", out_dir.join("gen").display()),
        "-DNDEBUG".to_string(),
        "-std=c++20".to_string(),
        "-c".to_string(),
        "../../base/logging.cc".to_string(),
        "-o".to_string(),
        "obj/logging.o".to_string(),
    ]);
    assert_eq!(flags(&responses[0]), expected);
    assert_eq!(responses[0]["do_cache"], true);

    // Not in the database, and the build tool is missing.
    assert_eq!(flags(&responses[1]), checkout_flags(&checkout.root));
    assert_eq!(responses[1]["do_cache"], false);
    Ok(())
}

#[test]
fn test_missing_compilation_database() -> Result<()> {
    let checkout = Checkout::new()?;
    let config = checkout.write_config("schema: 1.0\nbuild:\n  program: /nonexistent/ninja\n")?;

    checkout
        .command()?
        .env("CHROMIUM_BUILD_DIR", checkout.root.join("out/Missing"))
        .arg("-c")
        .arg(&config)
        .arg("base/logging.cc")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""do_cache":false"#))
        .stderr(predicate::str::contains("Compilation database directory does not exist"));
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_from_build_tool() -> Result<()> {
    let checkout = Checkout::new()?;
    let ninja = checkout.fake_ninja()?;
    let config = checkout.write_config(&format!("schema: 1.0\nbuild:\n  program: {}\n", ninja.display()))?;

    let output = checkout.command()?.arg("-c").arg(&config).arg("base/logging.h").output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;

    let mut expected = checkout_flags(&checkout.root);
    expected.extend([
        "../../third_party/llvm-build/Release+Asserts/bin/clang++".to_string(),
        "-DFAKE_NINJA".to_string(),
        format!("-I{}", checkout.root.display()),
        format!("-I{}", checkout.root.join("out/Debug/gen").display()),
        "-c".to_string(),
        "../../base/logging.cc".to_string(),
        "-o".to_string(),
        "obj/base/base/logging.o".to_string(),
    ]);
    assert_eq!(flags(&responses[0]), expected);
    assert_eq!(responses[0]["do_cache"], true);
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_newest_output_directory() -> Result<()> {
    let checkout = Checkout::new()?;
    let ninja = checkout.fake_ninja()?;
    let config = checkout.write_config(&format!("schema: 1.0\nbuild:\n  program: {}\n", ninja.display()))?;
    std::fs::create_dir_all(checkout.root.join("out_arm/Release"))?;
    std::fs::write(checkout.root.join("out_arm/Release/build.ninja"), "")?;

    let output = checkout
        .command()?
        .env("CHROMIUM_OUT_DIR", "out_arm")
        .arg("-c")
        .arg(&config)
        .arg("base/logging.cc")
        .output()?;

    assert!(output.status.success());
    let responses = responses(&output.stdout)?;
    let generated = format!("-I{}", checkout.root.join("out_arm/Release/gen").display());
    assert!(flags(&responses[0]).contains(&generated));
    Ok(())
}
