// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rendering of the [`ViewState`] as a text panel.

use comfy_table::{presets::UTF8_FULL, CellAlignment, Table};
use counter_base::{Address, AddressFlags, Tokens};
use counter_client::{Network, ViewState};

#[cfg(test)]
#[path = "unit_tests/view.rs"]
mod tests;

/// The title of the panel.
pub const TITLE: &str = "TON Counter DApp";
/// The label of the wallet button while no account is connected.
pub const CONNECT_LABEL: &str = "Connect Wallet";
/// The label of the increment buttons while a transaction is being processed.
pub const PROCESSING_LABEL: &str = "⏳ Processing...";
/// The label of the refresh button.
pub const REFRESH_LABEL: &str = "🔄 Refresh Counter";

/// An increment button.
#[derive(Clone, Copy, Debug)]
pub struct Preset {
    /// The label of the button.
    pub label: &'static str,
    /// The amount submitted by the button.
    pub amount: Tokens,
}

/// The increment buttons shown while an account is connected.
///
/// The first button submits a fractional amount, which the increment message encodes as zero.
pub const PRESETS: [Preset; 3] = [
    Preset {
        label: "➕ Add 1 to Counter",
        amount: Tokens::from_nanotons(10_000_000),
    },
    Preset {
        label: "➕ Add 5 to Counter",
        amount: Tokens::from_tokens(5),
    },
    Preset {
        label: "➕ Add 10 to Counter",
        amount: Tokens::from_tokens(10),
    },
];

/// What the panel shows besides the view state.
#[derive(Clone, Copy, Debug)]
pub struct ViewContext {
    /// The counter contract.
    pub contract: Address,
    /// The network the client talks to.
    pub network: Network,
}

/// Keeps the first `head` and last `tail` characters of `text`, eliding the middle.
pub fn shorten(text: &str, head: usize, tail: usize) -> String {
    let count = text.chars().count();
    if count <= head + tail {
        return text.to_owned();
    }
    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(count - tail).collect();
    format!("{start}...{end}")
}

/// Returns the label of the wallet button.
///
/// Connected accounts are shown in their non-bounceable form, flagged for the test network
/// when on it, as wallets display them.
pub fn wallet_label(address: Option<&Address>, network: Network) -> String {
    match address {
        Some(address) => {
            let flags = AddressFlags {
                bounceable: false,
                test_only: network.is_test(),
            };
            shorten(&address.to_friendly(flags), 6, 4)
        }
        None => CONNECT_LABEL.to_owned(),
    }
}

/// Renders the panel for `state`.
pub fn render(state: &ViewState, context: &ViewContext) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![TITLE]);

    table.add_row(vec![wallet_label(state.address.as_ref(), context.network)]);
    table.add_row(vec!["Current Counter Value".to_owned()]);
    table.add_row(vec![state.counter.to_string()]);

    let refresh = if state.pending {
        format!("{REFRESH_LABEL} (disabled)")
    } else {
        REFRESH_LABEL.to_owned()
    };
    table.add_row(vec![refresh]);

    if state.address.is_some() {
        for preset in &PRESETS {
            let button = if state.pending {
                PROCESSING_LABEL.to_owned()
            } else {
                format!("{}  [add {}]", preset.label, preset.amount)
            };
            table.add_row(vec![button]);
        }
    }

    table.add_row(vec![format!(
        "Contract: {}",
        shorten(&context.contract.to_string(), 8, 6)
    )]);
    table.add_row(vec![format!("Network: {}", context.network)]);

    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Center);
    }
    table.to_string()
}
