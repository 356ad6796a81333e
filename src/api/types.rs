use serde::{Deserialize, Serialize};

use crate::models::Patient;

/// Successful login acknowledgement: the backend sent an OTP and tells
/// the patient where (SMS/email) in `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAck {
    pub message: String,
}

impl LoginAck {
    /// Fallback text when the backend omits the message.
    pub fn message_or_default(&self) -> &str {
        if self.message.is_empty() {
            "Le code de vérification a été envoyé par SMS/Email."
        } else {
            &self.message
        }
    }
}

/// Successful OTP confirmation: the credential plus the initial profile
/// snapshot, persisted together by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmOk {
    pub token: String,
    pub patient: Patient,
    pub message: Option<String>,
}

/// A file the patient attaches to a form (photo or supporting document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Payload for creating a rendez-vous. Dates are `YYYY-MM-DD`, heure is
/// `HH:MM`; validation happens in the screen before this exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRendezVous {
    pub title: String,
    pub date: String,
    pub heure: String,
    pub doctor_id: i64,
    pub motif: String,
    pub notes: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Payload for the multipart profile update.
///
/// Fields keep their client-side names here; the HTTP client applies the
/// backend rename table (`telephone` -> `contact1`, ...) at send time so
/// the mapping lives in exactly one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub fields: Vec<(String, String)>,
    pub photo: Option<Attachment>,
}

impl ProfileUpdate {
    /// Add a field, skipping empty values the way the form submit does.
    pub fn push(&mut self, name: &str, value: &str) {
        if !value.is_empty() {
            self.fields.push((name.to_string(), value.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.photo.is_none()
    }
}
