// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The commands accepted by the interactive front-end.

use std::str::FromStr;

use counter_base::{address::AddressError, amount::AmountError, Address, Tokens};
use counter_client::{controller::ControllerRequest, ViewState};
use thiserror::Error;

#[cfg(test)]
#[path = "unit_tests/command.rs"]
mod tests;

/// The usage shown by the `help` command.
pub const HELP: &str = "\
Commands:
  connect <address>  connect the wallet account at <address>
  disconnect         disconnect the wallet
  refresh            read the counter again
  add <amount>       add <amount> to the counter, attaching as many tokens
  help               show this message
  quit               leave";

/// A command typed by the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Connect the wallet account.
    Connect(Address),
    /// Disconnect the wallet.
    Disconnect,
    /// Read the counter again.
    Refresh,
    /// Submit an increment.
    Add(Tokens),
    /// Show the usage.
    Help,
    /// Leave the front-end.
    Quit,
}

/// Errors when parsing a [`Command`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    /// The line holds no command.
    #[error("no command given")]
    Empty,

    /// The command is not known.
    #[error("unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),

    /// The command needs an argument that is missing.
    #[error("`{command}` expects {argument}")]
    MissingArgument {
        /// The command.
        command: &'static str,
        /// The expected argument.
        argument: &'static str,
    },

    /// The command got more arguments than it takes.
    #[error("too many arguments for `{0}`")]
    TooManyArguments(String),

    /// The address argument is invalid.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The amount argument is invalid.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The button of the command is disabled in the current view.
    #[error("`{0}` is disabled while a transaction is being processed")]
    Disabled(&'static str),
}

impl Command {
    /// Returns the request to send to the controller for this command, if any.
    pub fn request(&self) -> Option<ControllerRequest> {
        match self {
            Command::Connect(account) => Some(ControllerRequest::Connect {
                account: Some(*account),
            }),
            Command::Disconnect => Some(ControllerRequest::Disconnect),
            Command::Refresh => Some(ControllerRequest::Refresh),
            Command::Add(amount) => Some(ControllerRequest::Add { amount: *amount }),
            Command::Help | Command::Quit => None,
        }
    }

    /// Returns the request to send to the controller while the view shows `state`, refusing
    /// the commands whose button is disabled.
    pub fn request_in(
        &self,
        state: &ViewState,
    ) -> Result<Option<ControllerRequest>, CommandError> {
        if *self == Command::Refresh && state.pending {
            return Err(CommandError::Disabled("refresh"));
        }
        Ok(self.request())
    }
}

fn argument<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    words.next().ok_or(CommandError::MissingArgument {
        command,
        argument: expected,
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let command = match name.to_ascii_lowercase().as_str() {
            "connect" => Command::Connect(argument(&mut words, "connect", "an address")?.parse()?),
            "disconnect" => Command::Disconnect,
            "refresh" => Command::Refresh,
            "add" => Command::Add(argument(&mut words, "add", "an amount")?.parse()?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_owned())),
        };
        if words.next().is_some() {
            return Err(CommandError::TooManyArguments(name.to_owned()));
        }
        Ok(command)
    }
}
