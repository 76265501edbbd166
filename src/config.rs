//! Configuration file handling for kas-hima.
//!
//! The configuration file is stored at `$KAS_HOME/config.json` and contains the endpoint of the
//! spreadsheet web-app, the shared secret sent with every write, the PIN of the login gate and
//! how much history to fetch.

use crate::error::{ErrorType, IntoResult, Res};
use crate::Result;
use crate::utils;
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "kas-hima";
const CONFIG_VERSION: u8 = 1;
const HISTORY_LIMIT: u32 = 50;
const CONFIG_JSON: &str = "config.json";
const LOCAL_STORAGE_JSON: &str = "local_storage.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$KAS_HOME` and from there it loads `$KAS_HOME/config.json`. It also knows where
/// the other files within the home directory live.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    local_storage_path: PathBuf,
    config_file: ConfigFile,
    endpoint: Url,
}

impl Config {
    /// Creates the home directory (if needed) and writes an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/kas-hima`
    /// - `endpoint` - The URL of the deployed spreadsheet web-app
    /// - `secret_key` - The shared secret the web-app expects with every write
    /// - `pin` - The PIN of the login gate
    /// - `history_limit` - How many history entries to fetch, defaults to 50
    ///
    /// # Errors
    /// - Returns an error if the settings are invalid or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        endpoint: &str,
        secret_key: &str,
        pin: &str,
        history_limit: Option<u32>,
    ) -> Res<Self> {
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            endpoint: endpoint.to_string(),
            secret_key: secret_key.to_string(),
            pin: pin.to_string(),
            history_limit: history_limit.unwrap_or(HISTORY_LIMIT),
        };
        let endpoint = config_file.validate()?;

        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the kas-hima home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        Ok(Self {
            local_storage_path: root.join(LOCAL_STORAGE_JSON),
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(kas_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(kas_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(kas_home: PathBuf) -> Res<Self> {
        let maybe_relative = kas_home;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The kas-hima home directory is missing, run 'kas init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'kas init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let endpoint = config_file.validate()?;

        Ok(Self {
            local_storage_path: root.join(LOCAL_STORAGE_JSON),
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where the theme and session flag are persisted.
    pub fn local_storage_path(&self) -> &Path {
        &self.local_storage_path
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn secret_key(&self) -> &str {
        &self.config_file.secret_key
    }

    pub fn pin(&self) -> &str {
        &self.config_file.pin
    }

    pub fn history_limit(&self) -> u32 {
        self.config_file.history_limit
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "kas-hima",
///   "config_version": 1,
///   "endpoint": "https://script.google.com/macros/s/AKfycbx3Jq0yW/exec",
///   "secret_key": "hima_si_secret",
///   "pin": "123456",
///   "history_limit": 50
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "kas-hima"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the spreadsheet web-app
    endpoint: String,

    /// Shared secret sent with every write request
    secret_key: String,

    /// PIN of the login gate
    pin: String,

    /// Number of history entries to fetch
    #[serde(default = "default_history_limit")]
    history_limit: u32,
}

fn default_history_limit() -> u32 {
    HISTORY_LIMIT
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or has the wrong `app_name`.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        utils::serialize(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }

    /// Checks the settings and returns the parsed endpoint.
    fn validate(&self) -> Res<Url> {
        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL '{}'", self.endpoint))?;
        ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "The endpoint must be an http or https URL, got '{}'",
            self.endpoint
        );
        ensure!(!self.secret_key.is_empty(), "The secret key must not be empty");
        ensure!(!self.pin.is_empty(), "The PIN must not be empty");
        ensure!(self.history_limit > 0, "The history limit must be positive");
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://script.google.com/macros/s/AKfycbx3Jq0yW/exec";

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("kas_home");

        // Run the function under test:
        let config = Config::create(&home_dir, URL, "s3cret", "123456", None)
            .await
            .unwrap();

        assert_eq!(URL, config.endpoint().as_str());
        assert_eq!("s3cret", config.secret_key());
        assert_eq!("123456", config.pin());
        assert_eq!(50, config.history_limit());
        assert!(config.config_path().is_file());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.root(), config.root());
        assert_eq!(loaded.endpoint(), config.endpoint());
        assert_eq!(
            loaded.local_storage_path(),
            config.root().join(LOCAL_STORAGE_JSON)
        );
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_endpoint() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path(), "not a url", "k", "1", None).await;
        assert!(result.is_err());
        let result = Config::create(dir.path(), "ftp://example.com/x", "k", "1", None).await;
        assert!(result.is_err());
        // Nothing was written.
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_create_rejects_empty_secrets() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path(), URL, "", "1", None).await.is_err());
        assert!(Config::create(dir.path(), URL, "k", "", None).await.is_err());
        assert!(Config::create(dir.path(), URL, "k", "1", Some(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_JSON);

        let json = r#"{
            "app_name": "kas-hima",
            "config_version": 1,
            "endpoint": "https://example.com/exec",
            "secret_key": "k",
            "pin": "0000"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.history_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_JSON);

        let json = r#"{
            "app_name": "tiller",
            "config_version": 1,
            "endpoint": "https://example.com/exec",
            "secret_key": "k",
            "pin": "0000"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let original = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            endpoint: URL.to_string(),
            secret_key: "k".to_string(),
            pin: "4321".to_string(),
            history_limit: 20,
        };
        original.save(&path).await.unwrap();
        let read = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, read);
    }
}
