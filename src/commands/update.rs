//! The edit command.

use crate::args::EditArgs;
use crate::commands::{open, Out};
use crate::error::{Error, ErrorType};
use crate::model::Transaction;
use crate::optimistic::Outcome;
use crate::{Config, Mode, Result};

/// Changes the amount of a dues entry.
///
/// The history is loaded first so that the entry can be found. The local copy is changed before
/// the request is sent and restored if the request cannot be delivered.
///
/// # Errors
/// - Validation, when the id is unknown, the entry is not a dues entry or the amount is invalid.
/// - Transport, when the request could not be delivered. The local change has been undone.
pub async fn edit(config: Config, mode: Mode, args: EditArgs) -> Result<Out<Transaction>> {
    let mut app = open(&config, mode).await?;
    app.load_history().await?;
    app.open_edit(args.id()).await?;
    match app.save_edit(args.amount()).await? {
        Outcome::Sent(_) => {
            let updated = app.store().lock().await.find(args.id()).cloned();
            match updated {
                Some(t) => Ok(Out::new(format!("Updated {}", t.describe()), t)),
                None => Err(Error::msg(
                    ErrorType::Internal,
                    format!("'{}' disappeared after the update", args.id()),
                )),
            }
        }
        Outcome::RolledBack(e) => Err(Error::new(
            ErrorType::Transport,
            anyhow::Error::new(e).context("The update was rolled back, check the spreadsheet"),
        )),
    }
}
