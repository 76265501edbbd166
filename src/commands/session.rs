//! Login, logout and the theme preference.

use crate::args::ThemeChoice;
use crate::commands::{storage, Out};
use crate::error::{ErrorType, IntoResult};
use crate::session::PinGate;
use crate::storage::Theme;
use crate::{Config, Result};

/// Starts a session when `pin` matches the configured PIN.
pub async fn login(config: Config, pin: &str) -> Result<Out<()>> {
    let mut storage = storage(&config).await?;
    PinGate::new(config.pin()).login(&mut storage, pin).await?;
    Ok("Logged in".into())
}

pub async fn logout(config: Config) -> Result<Out<()>> {
    let mut storage = storage(&config).await?;
    PinGate::new(config.pin()).logout(&mut storage).await?;
    Ok("Logged out".into())
}

/// Prints the theme, or stores a new one. This works without a session.
pub async fn theme(config: Config, choice: Option<ThemeChoice>) -> Result<Out<Theme>> {
    let mut storage = storage(&config).await?;
    let current = storage.theme();
    let next = match choice {
        None => return Ok(Out::new(format!("Theme: {current}"), current)),
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Toggle) => current.toggled(),
    };
    storage
        .set_theme(next)
        .await
        .pub_result(ErrorType::Internal)?;
    Ok(Out::new(format!("Theme set to {next}"), next))
}
