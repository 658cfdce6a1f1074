// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The `counter` executable: reads and increments a counter contract on the TON network.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context as _};
use counter_base::{amount::NANOTONS_PER_TOKEN, Address, Tokens};
use counter_client::{
    read_counter,
    wallet::{Presenter, TransferLink},
    ClientConfig, ControllerHandle, CounterController, DeeplinkWallet, IncrementMessage, Network,
    TonCenterClient,
};
use counter_service::{
    command::{Command, HELP},
    view::{render, ViewContext},
};
use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    select,
    sync::mpsc,
};
use tracing::{debug, info};

#[derive(Debug, clap::Parser)]
#[command(
    name = "counter",
    version = clap::crate_version!(),
    about = "Reads and increments a counter contract on the TON network"
)]
struct ClientOptions {
    /// A TOML file with the client configuration. Options given on the command line take
    /// precedence over its fields.
    #[arg(long, env = "COUNTER_CONFIG")]
    config: Option<PathBuf>,

    /// The JSON-RPC endpoint of the TON Center API.
    #[arg(long, env = "COUNTER_ENDPOINT")]
    endpoint: Option<String>,

    /// The counter contract.
    #[arg(long, env = "COUNTER_CONTRACT")]
    contract: Option<Address>,

    /// The key sent to the TON Center API.
    #[arg(long, env = "TONCENTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// The network to use: `testnet` or `mainnet`.
    #[arg(long)]
    network: Option<Network>,

    /// The time in milliseconds waited after a transaction was accepted before reading the
    /// counter again.
    #[arg(long)]
    settle_delay_ms: Option<u64>,

    /// How long in seconds a submitted transaction stays valid.
    #[arg(long)]
    valid_for_secs: Option<u64>,

    #[command(subcommand)]
    command: ClientCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ClientCommand {
    /// Print the current counter value.
    Show,

    /// Print the payload of the message adding `amount` to the counter.
    Encode {
        /// The amount to add.
        #[arg(long)]
        amount: Tokens,
    },

    /// Add `amount` to the counter through a transfer link, then print the counter once the
    /// transaction had time to settle.
    Add {
        /// The amount to add, also attached to the transaction.
        #[arg(long)]
        amount: Tokens,

        /// The account signing the transaction.
        #[arg(long)]
        wallet: Address,
    },

    /// Show the counter panel and read commands from the standard input.
    Interactive,
}

impl ClientOptions {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::read(path)?,
            None => ClientConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(contract) = self.contract {
            config.contract = contract;
        }
        if let Some(settle_delay_ms) = self.settle_delay_ms {
            config.settle_delay_ms = settle_delay_ms;
        }
        if let Some(valid_for_secs) = self.valid_for_secs {
            config.valid_for_secs = valid_for_secs;
        }
        Ok(config)
    }
}

fn reader(config: &ClientConfig) -> anyhow::Result<Arc<TonCenterClient>> {
    let client = TonCenterClient::new(
        config.endpoint(),
        config.api_key.clone(),
        config.request_timeout(),
    )?;
    debug!(endpoint = %client.endpoint(), "Using TON Center API");
    Ok(Arc::new(client))
}

/// Starts a controller backed by a [`DeeplinkWallet`] printing its links.
fn start_controller(
    config: &ClientConfig,
    presented: Option<mpsc::UnboundedSender<()>>,
) -> anyhow::Result<(ControllerHandle, Arc<TonCenterClient>)> {
    let presenter: Presenter = Box::new(move |link: &TransferLink| {
        println!("Open this link in a wallet application to sign the transaction:\n{link}");
        if let Some(presented) = &presented {
            // The command may have stopped waiting.
            let _ = presented.send(());
        }
        Ok(())
    });
    let wallet = Arc::new(DeeplinkWallet::new(config.network.is_test(), presenter));
    let reader = reader(config)?;
    let (controller, handle) =
        CounterController::new(config.controller_config(), wallet, reader.clone());
    tokio::spawn(controller.run());
    Ok((handle, reader))
}

async fn show(config: &ClientConfig) -> anyhow::Result<()> {
    let reader = reader(config)?;
    let value = read_counter(&*reader, &config.contract)
        .await
        .context("failed to read the counter")?;
    println!("{value}");
    Ok(())
}

fn encode(config: &ClientConfig, amount: Tokens) -> anyhow::Result<()> {
    let message = IncrementMessage::new(amount)?.with_opcode(config.add_opcode);
    if amount.nanotons() % NANOTONS_PER_TOKEN != 0 {
        info!(%amount, encoded = message.amount, "The fractional part of the amount is dropped");
    }
    let cell = message.to_cell()?;
    println!("payload: {}", hex::encode(cell.data()));
    println!("boc: {}", cell.to_boc_base64());
    Ok(())
}

async fn add(config: &ClientConfig, amount: Tokens, account: Address) -> anyhow::Result<()> {
    let (sender, mut presented) = mpsc::unbounded_channel();
    let (mut handle, reader) = start_controller(config, Some(sender))?;
    let mut view = handle.subscribe();

    handle.connect(Some(account))?;
    view.wait_for(|state| state.address.is_some()).await?;
    handle.add(amount)?;

    select! {
        Some(()) = presented.recv() => {}
        alert = handle.next_alert() => match alert {
            Some(alert) => bail!("{alert}"),
            None => bail!("the counter controller has stopped"),
        },
    }
    info!(
        delay_ms = config.settle_delay_ms,
        "Waiting for the transaction to settle"
    );
    view.wait_for(|state| !state.pending).await?;
    if let Some(alert) = handle.try_alert() {
        bail!("{alert}");
    }

    let value = read_counter(&*reader, &config.contract)
        .await
        .context("failed to read the counter")?;
    println!("{value}");
    Ok(())
}

async fn interactive(config: &ClientConfig) -> anyhow::Result<()> {
    let (mut handle, _reader) = start_controller(config, None)?;
    let context = ViewContext {
        contract: config.contract,
        network: config.network,
    };
    let mut view = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render(&view.borrow_and_update(), &context));
    println!("{HELP}");

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(command) => match command.request_in(&view.borrow()) {
                        Ok(Some(request)) => handle.send(request)?,
                        Ok(None) => {}
                        Err(error) => eprintln!("{error}"),
                    },
                    Err(error) => eprintln!("{error}"),
                }
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = view.borrow_and_update().clone();
                println!("{}", render(&state, &context));
            }
            Some(alert) = handle.next_alert() => println!("⚠️  {alert}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    counter_base::tracing::init();

    let options = <ClientOptions as clap::Parser>::parse();
    let config = options.client_config()?;
    debug!(network = %config.network, contract = %config.contract, "Configuration loaded");

    match options.command {
        ClientCommand::Show => show(&config).await,
        ClientCommand::Encode { amount } => encode(&config, amount),
        ClientCommand::Add { amount, wallet } => add(&config, amount, wallet).await,
        ClientCommand::Interactive => interactive(&config).await,
    }
}
