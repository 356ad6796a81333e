//! Espace Patient — desktop client for the Gemma Santé platform.
//!
//! The crate is the non-visual half of the application: a persisted
//! session store, a typed client for the patient REST API, one controller
//! per screen (dashboard, consultations, rendez-vous, déclarations,
//! profile, medical card), and a notification relay the UI shell plugs
//! into. The shell
//! renders whatever state the controllers hold and forwards user actions
//! back to them.

pub mod api;
pub mod auth;
pub mod card;
pub mod config;
pub mod consultations;
pub mod dashboard;
pub mod dates;
pub mod declarations;
pub mod forms;
pub mod models;
pub mod notify;
pub mod profile;
pub mod rendezvous;
pub mod screen;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the application process. `RUST_LOG` overrides
/// the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
