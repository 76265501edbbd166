//! The delete command.

use crate::args::DeleteArgs;
use crate::commands::{open, Out};
use crate::error::{Error, ErrorType};
use crate::model::Transaction;
use crate::optimistic::Outcome;
use crate::{Config, Mode, Result};

/// Deletes a ledger entry of any type.
///
/// The entry is removed locally before the request is sent and put back if the request cannot be
/// delivered.
///
/// # Errors
/// - Validation, when the id is unknown.
/// - Transport, when the request could not be delivered. The entry has been restored locally.
pub async fn delete(config: Config, mode: Mode, args: DeleteArgs) -> Result<Out<Transaction>> {
    let mut app = open(&config, mode).await?;
    app.load_history().await?;
    let target = app.open_delete(args.id()).await?;
    match app.confirm_delete().await? {
        Outcome::Sent(_) => Ok(Out::new(format!("Deleted {}", target.describe()), target)),
        Outcome::RolledBack(e) => Err(Error::new(
            ErrorType::Transport,
            anyhow::Error::new(e).context("The delete was rolled back, check the spreadsheet"),
        )),
    }
}
