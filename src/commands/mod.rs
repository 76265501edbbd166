//! Command handlers for the kas CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod ping;
mod query;
mod session;
mod update;

use crate::api::{self, Mode};
use crate::app::App;
use crate::error::{ErrorType, IntoResult};
use crate::render::LogView;
use crate::session::PinGate;
use crate::storage::LocalStorage;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use delete::delete;
pub use init::init;
pub use insert::{dues, expense, other_income};
pub use ping::{ping, PingOutput};
pub use query::{classes, history, members, HistoryOutput};
pub use session::{login, logout, theme};
pub use update::edit;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

async fn storage(config: &Config) -> Result<LocalStorage> {
    LocalStorage::load(config.local_storage_path())
        .await
        .pub_result(ErrorType::Internal)
}

/// Builds the controller for a data command. Fails unless a session is active.
async fn open(config: &Config, mode: Mode) -> Result<App> {
    let storage = storage(config).await?;
    PinGate::new(config.pin()).require(&storage)?;
    let gateway = api::gateway(config, mode).pub_result(ErrorType::Config)?;
    Ok(App::new(
        gateway,
        Arc::new(LogView),
        config.history_limit(),
    ))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
