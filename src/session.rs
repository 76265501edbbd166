//! The PIN gate.
//!
//! This is a plain string comparison against the PIN in `config.json`; it hides the data commands
//! from a casual user and nothing more. The web-app itself only checks the shared secret.

use crate::error::{Error, ErrorType, IntoResult};
use crate::storage::LocalStorage;
use crate::Result;
use tracing::debug;

/// Checks PINs and records the session flag in local storage.
#[derive(Debug, Clone)]
pub struct PinGate {
    pin: String,
}

impl PinGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    /// Records a session when `pin` matches. Nothing is stored on a mismatch.
    pub async fn login(&self, storage: &mut LocalStorage, pin: &str) -> Result<()> {
        if pin != self.pin {
            return Err(Error::msg(ErrorType::Auth, "Wrong PIN"));
        }
        storage.start_session().await.pub_result(ErrorType::Internal)?;
        debug!("Session started");
        Ok(())
    }

    /// Clears the session flag.
    pub async fn logout(&self, storage: &mut LocalStorage) -> Result<()> {
        storage.end_session().await.pub_result(ErrorType::Internal)?;
        debug!("Session ended");
        Ok(())
    }

    /// Whether a session is active.
    pub fn check_session(&self, storage: &LocalStorage) -> bool {
        storage.has_session()
    }

    /// Fails unless a session is active.
    pub fn require(&self, storage: &LocalStorage) -> Result<()> {
        if self.check_session(storage) {
            Ok(())
        } else {
            Err(Error::msg(
                ErrorType::Auth,
                "Not logged in, run 'kas login --pin <PIN>' first",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_login_logout() {
        let dir = TempDir::new().unwrap();
        let mut storage = LocalStorage::load(dir.path().join("s.json")).await.unwrap();
        let gate = PinGate::new("123456");

        let err = gate.require(&storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Auth);

        let err = gate.login(&mut storage, "000000").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Auth);
        assert!(!storage.has_session());

        gate.login(&mut storage, "123456").await.unwrap();
        assert!(gate.check_session(&storage));
        assert!(gate.require(&storage).is_ok());

        gate.logout(&mut storage).await.unwrap();
        assert!(gate.require(&storage).is_err());
    }
}
