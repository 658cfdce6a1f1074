// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use counter_base::{Address, Tokens};
use counter_client::{controller::ControllerRequest, ViewState};
use test_case::test_case;

use super::{Command, CommandError};

const ACCOUNT: &str = "0QCrq6urq6urq6urq6urq6urq6urq6urq6urq6urq6urqyNr";

#[test_case("refresh", Command::Refresh)]
#[test_case("  Disconnect ", Command::Disconnect)]
#[test_case("add 5", Command::Add(Tokens::from_tokens(5)))]
#[test_case("add 0.01", Command::Add(Tokens::from_nanotons(10_000_000)))]
#[test_case("connect 0QCrq6urq6urq6urq6urq6urq6urq6urq6urq6urq6urqyNr", Command::Connect(Address::new(0, [0xab; 32])))]
#[test_case("?", Command::Help)]
#[test_case("exit", Command::Quit)]
fn commands_are_parsed(line: &str, expected: Command) {
    assert_eq!(line.parse::<Command>(), Ok(expected));
}

#[test]
fn empty_line_is_not_a_command() {
    assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
}

#[test]
fn unknown_command_is_named() {
    assert_eq!(
        "increment 5".parse::<Command>(),
        Err(CommandError::Unknown("increment".to_owned()))
    );
}

#[test]
fn missing_amount_is_reported() {
    assert_matches!(
        "add".parse::<Command>(),
        Err(CommandError::MissingArgument { command: "add", .. })
    );
}

#[test]
fn extra_arguments_are_refused() {
    assert_matches!(
        "refresh now".parse::<Command>(),
        Err(CommandError::TooManyArguments(command)) if command == "refresh"
    );
}

#[test_case("add five"; "words")]
#[test_case("add -1"; "negative")]
fn invalid_amounts_are_refused(line: &str) {
    assert_matches!(line.parse::<Command>(), Err(CommandError::Amount(_)));
}

#[test]
fn invalid_address_is_refused() {
    assert_matches!(
        "connect EQnotanaddress".parse::<Command>(),
        Err(CommandError::Address(_))
    );
}

#[test]
fn commands_map_to_controller_requests() {
    let account: Address = ACCOUNT.parse().expect("Valid address");

    assert_eq!(
        Command::Connect(account).request(),
        Some(ControllerRequest::Connect {
            account: Some(account)
        })
    );
    assert_eq!(
        Command::Add(Tokens::from_tokens(10)).request(),
        Some(ControllerRequest::Add {
            amount: Tokens::from_tokens(10)
        })
    );
    assert_eq!(Command::Quit.request(), None);
    assert_eq!(Command::Help.request(), None);
}

#[test]
fn refresh_is_refused_while_pending() {
    let pending = ViewState::default()
        .connected(Address::new(0, [0xab; 32]))
        .submission_started();

    assert_eq!(
        Command::Refresh.request_in(&pending),
        Err(CommandError::Disabled("refresh"))
    );
    assert_eq!(
        Command::Refresh.request_in(&pending.submission_finished()),
        Ok(Some(ControllerRequest::Refresh))
    );
    assert_eq!(
        Command::Disconnect.request_in(&ViewState::default().submission_started()),
        Ok(Some(ControllerRequest::Disconnect))
    );
}
