use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and writes its `config.json`.
///
/// # Arguments
/// - `kas_home` - The directory that will be the home directory, e.g. `$HOME/kas-hima`
/// - `endpoint` - The URL of the deployed spreadsheet web-app
/// - `secret_key` - The shared secret that the web-app checks on every write
/// - `pin` - The PIN that `kas login` will compare against
/// - `history_limit` - How many history entries to fetch, 50 when `None`
///
/// # Errors
/// - Returns an error if the settings are invalid or any file operation fails.
pub async fn init(
    kas_home: &Path,
    endpoint: &str,
    secret_key: &str,
    pin: &str,
    history_limit: Option<u32>,
) -> Result<Out<()>> {
    let config = Config::create(kas_home, endpoint, secret_key, pin, history_limit)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the kas-hima directory at {}",
        config.root().display()
    )
    .into())
}
