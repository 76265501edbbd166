//! The Remote Gateway.
//!
//! The system of record is a spreadsheet behind a web-app endpoint that offers two very different
//! channels:
//!
//! - The read channel: `GET <endpoint>?action=<name>` returning
//!   `{ success, data?, message?, summary? }`.
//! - The write channel: `POST <endpoint>` with a JSON body. Its response body is never read, so
//!   a successful `send` only means the request left the machine. An `Ack` says nothing about
//!   whether the remote side accepted the write; a rejected write looks exactly like an accepted
//!   one until the next full reload.

mod http;
mod request;
mod test_gateway;

use crate::error::Res;
use crate::model::{HistoryPage, Member};
use crate::Config;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

pub use request::{DuesPayment, ExpenseEntry, OtherIncomeEntry, WriteAction, WriteRequest};
pub use test_gateway::{TestGateway, TestState};

pub(crate) const GET_CLASSES: &str = "getClasses";
pub(crate) const GET_MEMBERS: &str = "getMembers";
pub(crate) const GET_HISTORY: &str = "getHistory";

/// Environment variable that switches the CLI to the in-memory gateway.
pub const TEST_MODE_ENV: &str = "KAS_HIMA_IN_TEST_MODE";

/// The readable half of the gateway.
#[async_trait::async_trait]
pub trait ReadChannel: Send + Sync {
    /// Distinct class labels, used to populate the class filter.
    async fn classes(&self) -> Res<Vec<String>>;

    /// All members, or only those whose class is exactly `kelas`.
    async fn members(&self, kelas: Option<&str>) -> Res<Vec<Member>>;

    /// The latest `limit` ledger entries, newest first, with running totals.
    async fn history(&self, limit: u32) -> Res<HistoryPage>;
}

/// The fire-and-forget half of the gateway.
#[async_trait::async_trait]
pub trait WriteChannel: Send + Sync {
    /// Delivers `request`. `Ok` carries no application-level guarantee, see the module docs.
    async fn send(&self, request: &WriteRequest) -> Result<Ack, TransportError>;
}

/// Both channels together.
pub trait Gateway: ReadChannel + WriteChannel {}

impl<T> Gateway for T where T: ReadChannel + WriteChannel {}

/// Proof that a write request was handed to the network, and nothing more.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Ack {
    action: WriteAction,
}

impl Ack {
    pub(crate) fn new(action: WriteAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> WriteAction {
        self.action
    }
}

/// A write request could not be delivered at all.
pub struct TransportError {
    action: WriteAction,
    source: anyhow::Error,
}

impl TransportError {
    pub(crate) fn new(action: WriteAction, source: impl Into<anyhow::Error>) -> Self {
        Self {
            action,
            source: source.into(),
        }
    }

    pub fn action(&self) -> WriteAction {
        self.action
    }
}

impl Debug for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransportError({}, {:?})", self.action, self.source)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to deliver {}: {:#}", self.action, self.source)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

/// Selects the gateway implementation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the configured endpoint.
    #[default]
    Http,
    /// Use the seeded in-memory gateway.
    Test,
}

impl Mode {
    /// `Mode::Test` when `KAS_HIMA_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Builds the gateway for `mode`.
pub(crate) fn gateway(config: &Config, mode: Mode) -> Res<Arc<dyn Gateway>> {
    match mode {
        Mode::Http => Ok(Arc::new(http::HttpGateway::new(
            config.endpoint().clone(),
            config.secret_key(),
        )?)),
        Mode::Test => Ok(Arc::new(TestGateway::seeded()?)),
    }
}
