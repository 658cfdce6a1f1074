// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runs the `counter` executable on commands that don't need the network.

use std::{io::Write as _, process::Command};

use test_case::test_case;

fn counter() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_counter"));
    command
        .env_remove("COUNTER_CONFIG")
        .env_remove("COUNTER_CONTRACT")
        .env("RUST_LOG", "warn");
    command
}

fn stdout_of(command: &mut Command) -> String {
    let output = command.output().expect("The executable should start");
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("Output is UTF-8")
}

#[test_case("5", "7e8764ef000000000000000000000005", "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAAV9U2MQ")]
#[test_case("10", "7e8764ef00000000000000000000000a", "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAApZb3BO")]
#[test_case("0.01", "7e8764ef000000000000000000000000", "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAABhR5Il")]
fn encode_prints_the_payload(amount: &str, payload: &str, boc: &str) {
    let stdout = stdout_of(counter().args(["encode", "--amount", amount]));

    assert_eq!(stdout, format!("payload: {payload}\nboc: {boc}\n"));
}

#[test]
fn configured_opcode_is_used() {
    let mut file = tempfile::NamedTempFile::new().expect("Temporary file creation should not fail");
    writeln!(file, "add_opcode = 0x12345678").expect("Writing should not fail");

    let stdout = stdout_of(
        counter()
            .arg("--config")
            .arg(file.path())
            .args(["encode", "--amount", "5"]),
    );

    assert!(stdout.starts_with("payload: 12345678000000000000000000000005\n"));
}

#[test_case("five"; "not a number")]
#[test_case("4294967296"; "beyond 32 bits")]
fn invalid_amounts_fail(amount: &str) {
    let output = counter()
        .args(["encode", "--amount", amount])
        .output()
        .expect("The executable should start");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
