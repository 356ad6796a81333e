//! Remote data fetcher for the Gemma patient API.
//!
//! [`PortalApi`] is the seam between screens and the network: the real
//! implementation is [`client::HttpPortalClient`], tests drive screens
//! with [`client::MockPortal`]. Every call takes the bearer token
//! explicitly — the session store owns the credential, not the client.

pub mod client;
pub mod error;
pub mod payload;
pub mod types;

pub use client::{HttpPortalClient, MockPortal};
pub use error::ApiError;
pub use types::{Attachment, ConfirmOk, LoginAck, NewRendezVous, ProfileUpdate};

use crate::models::{Consultation, Declaration, Doctor, Patient, RendezVous};

/// The backend endpoints the portal consumes, as one typed surface.
///
/// Reads return canonical records (normalization happens at this
/// boundary); mutations return unit and the caller re-fetches. No call
/// retries on its own — the screen decides whether to offer a retry.
pub trait PortalApi {
    /// Request an OTP for a patient identifier (DM code).
    fn login(&self, code: &str) -> Result<LoginAck, ApiError>;

    /// Exchange identifier + OTP for a bearer token and the profile.
    fn confirm(&self, code: &str, otp: &str) -> Result<ConfirmOk, ApiError>;

    fn show_profile(&self, token: &str) -> Result<Patient, ApiError>;

    /// Multipart profile update. Returns the fresh profile when the
    /// backend echoes one back.
    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Patient>, ApiError>;

    fn consultations(&self, token: &str) -> Result<Vec<Consultation>, ApiError>;

    fn doctors(&self, token: &str) -> Result<Vec<Doctor>, ApiError>;

    fn rendezvous(&self, token: &str) -> Result<Vec<RendezVous>, ApiError>;

    fn create_rendezvous(&self, token: &str, rdv: &NewRendezVous) -> Result<(), ApiError>;

    fn delete_rendezvous(&self, token: &str, id: i64) -> Result<(), ApiError>;

    fn declarations(&self, token: &str) -> Result<Vec<Declaration>, ApiError>;

    fn logout(&self, token: &str) -> Result<(), ApiError>;
}
