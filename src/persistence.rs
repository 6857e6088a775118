//! Snapshot I/O between a [`Typewriter`] and a [`BlobStore`].
//!
//! The `try_*` functions report every failure. The plain ones are what the
//! front-end calls: they log and swallow, so a broken store can never leave
//! the in-memory session half-restored.

use crate::config::Settings;
use crate::session::WorkSnapshot;
use crate::store::{BlobStore, StoreError};
use crate::typewriter::{InconsistentSnapshot, Typewriter};
use thiserror::Error;
use tracing::{debug, warn};

pub const SETTINGS_KEY: &str = "settings";
pub const WORK_KEY: &str = "work";

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("reading {key}: {source}")]
    Read {
        key: &'static str,
        source: StoreError,
    },

    #[error("writing {key}: {source}")]
    Write {
        key: &'static str,
        source: StoreError,
    },

    #[error("{key} is not valid JSON: {source}")]
    Malformed {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("{key} could not be encoded: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Inconsistent(#[from] InconsistentSnapshot),
}

fn read_json<T: serde::de::DeserializeOwned>(
    store: &dyn BlobStore,
    key: &'static str,
) -> Result<Option<T>, PersistError> {
    let Some(raw) = store
        .read(key)
        .map_err(|source| PersistError::Read { key, source })?
    else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistError::Malformed { key, source })
}

fn write_json<T: serde::Serialize>(
    store: &mut dyn BlobStore,
    key: &'static str,
    value: &T,
) -> Result<(), PersistError> {
    let data =
        serde_json::to_string(value).map_err(|source| PersistError::Encode { key, source })?;
    store
        .write(key, &data)
        .map_err(|source| PersistError::Write { key, source })
}

pub fn try_load_settings(store: &dyn BlobStore) -> Result<Option<Settings>, PersistError> {
    read_json(store, SETTINGS_KEY)
}

/// Saved settings merged over defaults; defaults alone on any failure.
pub fn load_settings(store: &dyn BlobStore) -> Settings {
    match try_load_settings(store) {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "falling back to default settings");
            Settings::default()
        }
    }
}

pub fn try_save_settings(store: &mut dyn BlobStore, settings: &Settings) -> Result<(), PersistError> {
    write_json(store, SETTINGS_KEY, settings)
}

pub fn save_settings(store: &mut dyn BlobStore, settings: &Settings) {
    if let Err(e) = try_save_settings(store, settings) {
        warn!(error = %e, "settings not saved");
    }
}

/// Restores saved work into `typewriter`. Returns whether anything was applied.
pub fn try_restore_work(
    store: &dyn BlobStore,
    typewriter: &mut Typewriter,
) -> Result<bool, PersistError> {
    let Some(snapshot) = read_json::<WorkSnapshot>(store, WORK_KEY)? else {
        return Ok(false);
    };
    typewriter.restore(snapshot)?;
    Ok(true)
}

pub fn restore_work(store: &dyn BlobStore, typewriter: &mut Typewriter) -> bool {
    match try_restore_work(store, typewriter) {
        Ok(restored) => {
            debug!(restored, "work restore");
            restored
        }
        Err(e) => {
            warn!(error = %e, "starting from a blank sheet");
            false
        }
    }
}

pub fn try_save_work(store: &mut dyn BlobStore, typewriter: &Typewriter) -> Result<(), PersistError> {
    write_json(store, WORK_KEY, &typewriter.snapshot())
}

/// Writes the current work. A failure is dropped; the next autosave retries.
pub fn save_work(store: &mut dyn BlobStore, typewriter: &Typewriter) -> bool {
    match try_save_work(store, typewriter) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "work not saved");
            false
        }
    }
}
