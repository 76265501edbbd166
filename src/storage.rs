//! Persisted local state: a flat string map stored as JSON, plus the two things kept in it, the
//! theme preference and the session flag.

use crate::error::Res;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// Key of the session flag.
pub const SESSION_KEY: &str = "kas_hima_session";

const AUTHENTICATED: &str = "authenticated";

/// A string map that survives restarts. Every change is written through to disk.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Loads the storage file at `path`. A missing file is an empty storage.
    pub async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let items = if path.is_file() {
            utils::deserialize(&path).await?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, items })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub async fn set_item(&mut self, key: &str, value: impl Into<String>) -> Res<()> {
        self.items.insert(key.to_string(), value.into());
        self.save().await
    }

    pub async fn remove_item(&mut self, key: &str) -> Res<()> {
        if self.items.remove(key).is_some() {
            self.save().await?;
        }
        Ok(())
    }

    async fn save(&self) -> Res<()> {
        utils::serialize(&self.path, &self.items).await
    }

    /// The stored theme, `Theme::Light` when unset or unreadable.
    pub fn theme(&self) -> Theme {
        match self.get_item(THEME_KEY) {
            None => Theme::default(),
            Some(s) => s.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown theme '{s}'");
                Theme::default()
            }),
        }
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Res<()> {
        self.set_item(THEME_KEY, theme.to_string()).await
    }

    /// Whether a login has been recorded and not yet cleared by logout.
    pub fn has_session(&self) -> bool {
        self.get_item(SESSION_KEY) == Some(AUTHENTICATED)
    }

    pub(crate) async fn start_session(&mut self) -> Res<()> {
        self.set_item(SESSION_KEY, AUTHENTICATED).await
    }

    pub(crate) async fn end_session(&mut self) -> Res<()> {
        self.remove_item(SESSION_KEY).await
    }
}

/// The color theme preference.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
