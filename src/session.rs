//! Patient session store.
//!
//! Holds the opaque bearer token and the cached profile snapshot, persisted
//! together in one JSON state file so both survive an app restart and are
//! destroyed together on logout. Views that render profile data (header,
//! avatar, medical card) subscribe to snapshot changes instead of polling.
//!
//! Single-threaded by design: at most one logical session per app instance,
//! controllers borrow the store mutably one at a time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::Patient;

/// Durable part of the session: the two values that survive reloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    token: Option<String>,
    patient: Option<Patient>,
}

/// Callback invoked whenever the cached profile snapshot changes.
pub type ProfileListener = Box<dyn Fn(&Patient)>;

pub struct SessionStore {
    path: PathBuf,
    state: SessionState,
    listeners: Vec<ProfileListener>,
}

impl SessionStore {
    /// Open the store at the default location, loading any persisted state.
    pub fn open_default() -> Result<Self, SessionError> {
        Self::open(config::session_file())
    }

    /// Open the store at `path`. A missing or unreadable state file starts
    /// an empty session rather than failing: a corrupt cache must never
    /// lock the patient out of the login screen.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "session file corrupt, starting empty");
                SessionState::default()
            }),
            Err(_) => SessionState::default(),
        };
        Ok(Self { path, state, listeners: Vec::new() })
    }

    /// The bearer credential, if the patient is logged in.
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    /// The cached profile snapshot for immediate render.
    pub fn patient(&self) -> Option<&Patient> {
        self.state.patient.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.token.is_some()
    }

    /// Begin a session: store the credential and the profile together.
    /// Called once, at OTP confirmation.
    pub fn start(&mut self, token: String, patient: Patient) -> Result<(), SessionError> {
        self.state.token = Some(token);
        self.state.patient = Some(patient.clone());
        self.persist()?;
        self.broadcast(&patient);
        Ok(())
    }

    /// Replace the cached snapshot with a fresher one from the backend and
    /// tell subscribed views to re-render.
    pub fn set_patient(&mut self, patient: Patient) -> Result<(), SessionError> {
        self.state.patient = Some(patient.clone());
        self.persist()?;
        self.broadcast(&patient);
        Ok(())
    }

    /// Destroy the session: credential and snapshot are cleared together,
    /// regardless of what the backend's logout endpoint answered.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::default();
        self.persist()
    }

    /// Subscribe to profile snapshot changes (header/avatar sync).
    pub fn subscribe(&mut self, listener: ProfileListener) {
        self.listeners.push(listener);
    }

    fn broadcast(&self, patient: &Patient) {
        for listener in &self.listeners {
            listener(patient);
        }
    }

    fn persist(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Errors from persisting session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot persist session state: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot serialize session state: {0}")]
    Serde(#[from] serde_json::Error),
}
