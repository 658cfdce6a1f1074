// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The client configuration, optionally read from a TOML file.

use std::{fmt, path::Path, str::FromStr, time::Duration};

use counter_base::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    controller::{ControllerConfig, DEFAULT_SETTLE_DELAY, DEFAULT_VALIDITY},
    message::ADD_OPCODE,
    toncenter::{MAINNET_ENDPOINT, TESTNET_ENDPOINT},
};

#[cfg(test)]
#[path = "unit_tests/config.rs"]
mod tests;

/// The counter contract deployed on the test network.
pub const DEFAULT_CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";

/// The default timeout of requests to the node.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors when loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration file {path}: {error}")]
    Io {
        /// The path of the file.
        path: String,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The file is not a valid configuration.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The network the client talks to.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The test network.
    #[default]
    Testnet,
    /// The main network.
    Mainnet,
}

impl Network {
    /// Returns the public JSON-RPC endpoint of this network.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_ENDPOINT,
            Network::Mainnet => MAINNET_ENDPOINT,
        }
    }

    /// Returns `true` for the test network.
    pub fn is_test(&self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Network::Testnet => "Testnet",
            Network::Mainnet => "Mainnet",
        })
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            _ => Err(format!("unknown network {string:?}")),
        }
    }
}

/// The configuration of the counter client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// The network to use.
    pub network: Network,
    /// The JSON-RPC endpoint, defaulting to the network's public one.
    pub endpoint: Option<String>,
    /// The key sent to the API, if any.
    pub api_key: Option<String>,
    /// The counter contract.
    pub contract: Address,
    /// The operation code of the increment message.
    pub add_opcode: u32,
    /// The time waited after a transaction was accepted before reading the counter again.
    pub settle_delay_ms: u64,
    /// How long a submitted transaction stays valid.
    pub valid_for_secs: u64,
    /// The timeout of requests to the node.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            network: Network::default(),
            endpoint: None,
            api_key: None,
            contract: DEFAULT_CONTRACT
                .parse()
                .expect("Default contract address is valid"),
            add_opcode: ADD_OPCODE,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            valid_for_secs: DEFAULT_VALIDITY.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the TOML file at `path`. Missing fields take their
    /// default values.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Returns the JSON-RPC endpoint to use.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint())
    }

    /// Returns the timeout of requests to the node.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the parameters of the controller.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            contract: self.contract,
            opcode: self.add_opcode,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            validity: Duration::from_secs(self.valid_for_secs),
        }
    }
}
