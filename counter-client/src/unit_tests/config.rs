// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{io::Write as _, time::Duration};

use assert_matches::assert_matches;
use test_case::test_case;

use super::{ClientConfig, ConfigError, Network, DEFAULT_CONTRACT};
use crate::toncenter::{MAINNET_ENDPOINT, TESTNET_ENDPOINT};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Temporary file creation should not fail");
    file.write_all(contents.as_bytes())
        .expect("Writing to a temporary file should not fail");
    file
}

#[test]
fn defaults_target_the_test_network() {
    let config = ClientConfig::default();

    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.endpoint(), TESTNET_ENDPOINT);
    assert_eq!(config.contract.to_string(), DEFAULT_CONTRACT);

    let controller = config.controller_config();
    assert_eq!(controller.settle_delay, Duration::from_secs(5));
    assert_eq!(controller.validity, Duration::from_secs(600));
}

/// Test that fields missing from the file keep their defaults.
#[test]
fn partial_file_keeps_defaults() {
    let file = write_config(
        r#"
        network = "mainnet"
        add_opcode = 0x12345678
        settle_delay_ms = 250
        "#,
    );

    let config = ClientConfig::read(file.path()).expect("Valid configuration");

    assert_eq!(config.endpoint(), MAINNET_ENDPOINT);
    assert_eq!(config.add_opcode, 0x1234_5678);
    assert_eq!(config.valid_for_secs, 600);
    let controller = config.controller_config();
    assert_eq!(controller.opcode, 0x1234_5678);
    assert_eq!(controller.settle_delay, Duration::from_millis(250));
}

#[test]
fn explicit_endpoint_wins_over_the_network() {
    let file = write_config(
        r#"
        network = "mainnet"
        endpoint = "http://localhost:8081/jsonRPC"
        api_key = "secret"
        "#,
    );

    let config = ClientConfig::read(file.path()).expect("Valid configuration");

    assert_eq!(config.endpoint(), "http://localhost:8081/jsonRPC");
    assert_eq!(config.api_key.as_deref(), Some("secret"));
}

#[test_case("contract = \"not an address\""; "invalid contract")]
#[test_case("network = \"devnet\""; "unknown network")]
#[test_case("colour = \"blue\""; "unknown field")]
fn invalid_files_are_rejected(contents: &str) {
    let file = write_config(contents);

    assert_matches!(ClientConfig::read(file.path()), Err(ConfigError::Toml(_)));
}

#[test]
fn missing_file_is_reported() {
    let directory = tempfile::tempdir().expect("Temporary directory creation should not fail");
    let path = directory.path().join("missing.toml");

    assert_matches!(ClientConfig::read(&path), Err(ConfigError::Io { .. }));
}

#[test_case("testnet", Network::Testnet)]
#[test_case("Mainnet", Network::Mainnet)]
fn network_parses_case_insensitively(input: &str, expected: Network) {
    assert_eq!(input.parse::<Network>(), Ok(expected));
}
