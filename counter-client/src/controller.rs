// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An actor owning the [`ViewState`], wiring user requests to the wallet session and the
//! chain reader.
//!
//! The actor handles one event at a time. Wallet and network calls run as futures polled by
//! the actor itself, so requests keep being accepted while they are in flight and every state
//! change happens on the actor's task. Each change is published on a [`watch`] channel and
//! failures of user actions are reported as [`Alert`]s.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use counter_base::{Address, Tokens};
use futures::{
    future::BoxFuture,
    stream::{FuturesUnordered, StreamExt as _},
    FutureExt as _,
};
use num_bigint::BigInt;
use thiserror::Error;
use tokio::{
    select,
    sync::{mpsc, watch},
};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    message::{IncrementMessage, MessageError, ADD_OPCODE},
    rpc::{read_counter, ChainReader, RpcError},
    state::ViewState,
    timer::{SettleTimer, TimerOutcome},
    wallet::{OutgoingMessage, TransactionRequest, WalletError, WalletSession},
};

#[cfg(test)]
#[path = "unit_tests/controller.rs"]
mod tests;

/// The default time waited after a transaction was accepted before reading the counter again.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);
/// The default validity window of submitted transactions.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(600);

/// The alert raised when adding without a connected wallet.
pub const NOT_CONNECTED_ALERT: &str = "Please connect your wallet first";
/// The alert raised when adding while another transaction is being processed.
pub const BUSY_ALERT: &str = "A transaction is already being processed";

/// The parameters of a [`CounterController`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerConfig {
    /// The counter contract.
    pub contract: Address,
    /// The operation code of the increment message.
    pub opcode: u32,
    /// The time waited after a transaction was accepted before reading the counter again.
    pub settle_delay: Duration,
    /// How long a submitted transaction stays valid.
    pub validity: Duration,
}

impl ControllerConfig {
    /// Creates the configuration for the counter at `contract` with default parameters.
    pub fn new(contract: Address) -> Self {
        ControllerConfig {
            contract,
            opcode: ADD_OPCODE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            validity: DEFAULT_VALIDITY,
        }
    }
}

/// A request for the [`CounterController`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ControllerRequest {
    /// Connect the wallet, to the `account` if the wallet lets the client choose.
    Connect {
        /// The account to connect to.
        account: Option<Address>,
    },

    /// Disconnect the wallet, abandoning any transaction being processed.
    Disconnect,

    /// Read the counter again.
    Refresh,

    /// Submit a transaction adding `amount` to the counter.
    Add {
        /// The amount to add, also attached to the transaction as its value.
        amount: Tokens,
    },
}

/// A failure of a user action, to be shown prominently.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alert {
    /// The message to show.
    pub message: String,
}

impl Alert {
    fn new(message: impl Into<String>) -> Self {
        Alert {
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

/// Errors when talking to a [`CounterController`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller stopped and no longer accepts requests.
    #[error("the counter controller has stopped")]
    Stopped,
}

/// The endpoint to talk to a running [`CounterController`].
pub struct ControllerHandle {
    requests: mpsc::UnboundedSender<ControllerRequest>,
    view: watch::Receiver<ViewState>,
    alerts: mpsc::UnboundedReceiver<Alert>,
}

impl ControllerHandle {
    /// Sends a `request` to the controller.
    pub fn send(&self, request: ControllerRequest) -> Result<(), ControllerError> {
        self.requests
            .send(request)
            .map_err(|_| ControllerError::Stopped)
    }

    /// Connects the wallet.
    pub fn connect(&self, account: Option<Address>) -> Result<(), ControllerError> {
        self.send(ControllerRequest::Connect { account })
    }

    /// Disconnects the wallet.
    pub fn disconnect(&self) -> Result<(), ControllerError> {
        self.send(ControllerRequest::Disconnect)
    }

    /// Reads the counter again.
    pub fn refresh(&self) -> Result<(), ControllerError> {
        self.send(ControllerRequest::Refresh)
    }

    /// Submits a transaction adding `amount` to the counter.
    pub fn add(&self, amount: Tokens) -> Result<(), ControllerError> {
        self.send(ControllerRequest::Add { amount })
    }

    /// Returns the latest view state.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Returns a receiver notified of every change to the view state.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    /// Waits until the view state satisfies `condition`, returning that state.
    pub async fn wait_for(
        &mut self,
        condition: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, ControllerError> {
        self.view
            .wait_for(condition)
            .await
            .map(|state| state.clone())
            .map_err(|_| ControllerError::Stopped)
    }

    /// Waits for the next alert, returning `None` once the controller stopped.
    pub async fn next_alert(&mut self) -> Option<Alert> {
        self.alerts.recv().await
    }

    /// Returns an alert if one was raised and not taken yet.
    pub fn try_alert(&mut self) -> Option<Alert> {
        self.alerts.try_recv().ok()
    }
}

/// The stage of the transaction being processed.
#[derive(Debug)]
enum Submission {
    /// No transaction is being processed.
    Idle,
    /// The wallet was asked to sign and broadcast transaction `id`.
    Submitting { id: u64 },
    /// The wallet accepted transaction `id`; waiting before reading the counter again.
    Settling { id: u64, _timer: SettleTimer },
}

impl Submission {
    fn id(&self) -> Option<u64> {
        match self {
            Submission::Idle => None,
            Submission::Submitting { id } | Submission::Settling { id, .. } => Some(*id),
        }
    }
}

/// Numbers counter reads so that a response older than one already applied is discarded.
#[derive(Debug, Default)]
struct ReadSequencer {
    issued: u64,
    applied: u64,
}

impl ReadSequencer {
    /// Returns the sequence number of a new read.
    fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `true` if the response of read `sequence` should be applied.
    fn accept(&mut self, sequence: u64) -> bool {
        if sequence > self.applied {
            self.applied = sequence;
            true
        } else {
            false
        }
    }
}

/// The completion of work started by the controller.
enum Event {
    Connected(Result<Address, WalletError>),
    Disconnected(Result<(), WalletError>),
    CounterRead {
        sequence: u64,
        result: Result<BigInt, RpcError>,
    },
    TransactionSent {
        id: u64,
        result: Result<(), WalletError>,
    },
    Settled {
        id: u64,
        outcome: TimerOutcome,
    },
}

/// The actor owning the view state of the counter client.
pub struct CounterController<Wallet, Reader> {
    config: ControllerConfig,
    wallet: Arc<Wallet>,
    reader: Arc<Reader>,
    state: ViewState,
    submission: Submission,
    last_submission: u64,
    reads: ReadSequencer,
    in_flight: FuturesUnordered<BoxFuture<'static, Event>>,
    requests: mpsc::UnboundedReceiver<ControllerRequest>,
    view: watch::Sender<ViewState>,
    alerts: mpsc::UnboundedSender<Alert>,
}

impl<Wallet, Reader> CounterController<Wallet, Reader>
where
    Wallet: WalletSession + 'static,
    Reader: ChainReader + 'static,
{
    /// Creates a new [`CounterController`].
    ///
    /// Returns the controller so that it can be executed later with
    /// [`CounterController::run`] and the handle to talk to it.
    pub fn new(
        config: ControllerConfig,
        wallet: Arc<Wallet>,
        reader: Arc<Reader>,
    ) -> (Self, ControllerHandle) {
        let (request_sender, request_receiver) = mpsc::unbounded_channel();
        let (alert_sender, alert_receiver) = mpsc::unbounded_channel();
        let state = ViewState {
            address: wallet.account(),
            ..ViewState::default()
        };
        let (view_sender, view_receiver) = watch::channel(state.clone());

        let controller = CounterController {
            config,
            wallet,
            reader,
            state,
            submission: Submission::Idle,
            last_submission: 0,
            reads: ReadSequencer::default(),
            in_flight: FuturesUnordered::new(),
            requests: request_receiver,
            view: view_sender,
            alerts: alert_sender,
        };
        let handle = ControllerHandle {
            requests: request_sender,
            view: view_receiver,
            alerts: alert_receiver,
        };

        (controller, handle)
    }

    /// Runs the controller until every [`ControllerHandle`] is dropped.
    ///
    /// The counter is read once on start.
    #[instrument(skip_all, fields(contract = %self.config.contract))]
    pub async fn run(mut self) {
        trace!("Starting `CounterController`");
        self.start_read();

        loop {
            select! {
                Some(event) = self.in_flight.next() => self.handle_event(event),
                maybe_request = self.requests.recv() => match maybe_request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
            }
        }

        trace!("`CounterController` finished");
    }

    fn handle_request(&mut self, request: ControllerRequest) {
        debug!(?request, "Handling request");
        match request {
            ControllerRequest::Connect { account } => {
                let wallet = self.wallet.clone();
                self.in_flight.push(
                    async move { Event::Connected(wallet.connect(account).await) }.boxed(),
                );
            }
            ControllerRequest::Disconnect => {
                let wallet = self.wallet.clone();
                self.in_flight
                    .push(async move { Event::Disconnected(wallet.disconnect().await) }.boxed());
            }
            ControllerRequest::Refresh => self.start_read(),
            ControllerRequest::Add { amount } => self.start_submission(amount),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Connected(Ok(address)) => {
                self.update(|state| state.connected(address));
            }
            Event::Connected(Err(error)) => {
                self.alert(format!("Wallet connection failed: {error}"));
            }
            Event::Disconnected(Ok(())) => {
                if let Some(id) = self.submission.id() {
                    info!(id, "Abandoning transaction after disconnection");
                }
                self.submission = Submission::Idle;
                self.update(ViewState::disconnected);
            }
            Event::Disconnected(Err(error)) => {
                self.alert(format!("Wallet disconnection failed: {error}"));
            }
            Event::CounterRead { sequence, result } => self.apply_read(sequence, result),
            Event::TransactionSent { id, result } => self.apply_sent(id, result),
            Event::Settled { id, outcome } => self.apply_settled(id, outcome),
        }
    }

    fn start_read(&mut self) {
        let sequence = self.reads.next();
        let reader = self.reader.clone();
        let contract = self.config.contract;
        trace!(sequence, "Reading counter");
        self.in_flight.push(
            async move {
                let result = read_counter(&*reader, &contract).await;
                Event::CounterRead { sequence, result }
            }
            .boxed(),
        );
    }

    fn apply_read(&mut self, sequence: u64, result: Result<BigInt, RpcError>) {
        if !self.reads.accept(sequence) {
            debug!(sequence, "Discarding stale counter read");
            return;
        }
        match result {
            Ok(value) => {
                debug!(sequence, %value, "Counter loaded");
                self.update(|state| state.counter_loaded(value));
            }
            Err(error) => {
                error!(sequence, %error, "Error loading counter");
                self.update(ViewState::counter_failed);
            }
        }
    }

    fn start_submission(&mut self, amount: Tokens) {
        if self.state.address.is_none() {
            self.alert(NOT_CONNECTED_ALERT);
            return;
        }
        if let Some(id) = self.submission.id() {
            warn!(id, "Rejecting a transaction while another one is processed");
            self.alert(BUSY_ALERT);
            return;
        }

        let request = match self.transaction_request(amount) {
            Ok(request) => request,
            Err(error) => {
                self.alert(format!("Transaction failed: {error}"));
                return;
            }
        };

        self.last_submission += 1;
        let id = self.last_submission;
        info!(id, %amount, "Submitting transaction");
        self.submission = Submission::Submitting { id };
        self.update(ViewState::submission_started);

        let wallet = self.wallet.clone();
        self.in_flight.push(
            async move {
                let result = wallet.send_transaction(request).await;
                Event::TransactionSent { id, result }
            }
            .boxed(),
        );
    }

    fn transaction_request(
        &self,
        amount: Tokens,
    ) -> Result<TransactionRequest, MessageError> {
        let payload = IncrementMessage::new(amount)?
            .with_opcode(self.config.opcode)
            .to_payload()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Ok(TransactionRequest {
            valid_until: now.saturating_add(self.config.validity).as_secs(),
            messages: vec![OutgoingMessage {
                destination: self.config.contract,
                amount,
                payload,
            }],
        })
    }

    fn apply_sent(&mut self, id: u64, result: Result<(), WalletError>) {
        if !matches!(self.submission, Submission::Submitting { id: current } if current == id) {
            debug!(id, "Ignoring the outcome of an abandoned transaction");
            return;
        }
        match result {
            Ok(()) => {
                info!(id, "Transaction accepted by the wallet");
                let (timer, elapsed) = SettleTimer::start(self.config.settle_delay);
                self.submission = Submission::Settling { id, _timer: timer };
                self.in_flight.push(
                    async move {
                        let outcome = elapsed.await;
                        Event::Settled { id, outcome }
                    }
                    .boxed(),
                );
            }
            Err(error) => {
                error!(id, %error, "Transaction error");
                self.submission = Submission::Idle;
                self.update(ViewState::submission_finished);
                self.alert(format!("Transaction failed: {error}"));
            }
        }
    }

    fn apply_settled(&mut self, id: u64, outcome: TimerOutcome) {
        let is_current =
            matches!(&self.submission, Submission::Settling { id: current, .. } if *current == id);
        if outcome == TimerOutcome::Cancelled || !is_current {
            debug!(id, ?outcome, "Ignoring settle timer");
            return;
        }
        self.submission = Submission::Idle;
        self.start_read();
        self.update(ViewState::submission_finished);
    }

    fn update(&mut self, transition: impl FnOnce(ViewState) -> ViewState) {
        self.state = transition(std::mem::take(&mut self.state));
        self.view.send_replace(self.state.clone());
    }

    fn alert(&self, message: impl Into<String>) {
        let alert = Alert::new(message);
        warn!(%alert, "Alert");
        // Nobody may be listening for alerts any more.
        let _ = self.alerts.send(alert);
    }
}
