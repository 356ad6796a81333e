//! Canonical records mirrored from backend JSON.
//!
//! The backend's payloads are loosely typed and inconsistently named
//! (`doctor.name` vs `doctor_name`, `img_url` vs `photo`, status as a
//! string or a numeric flag). Each model owns a `from_value` boundary that
//! maps every known shape variant into one canonical struct immediately
//! after fetch, so nothing above this layer ever touches raw JSON.

pub mod consultation;
pub mod declaration;
pub mod doctor;
pub mod enums;
pub mod patient;
pub mod rdv;

pub use consultation::{Consultation, ConsultationStatus};
pub use declaration::Declaration;
pub use doctor::Doctor;
pub use enums::{DeclarationCategory, RdvStatus};
pub use patient::Patient;
pub use rdv::{RdvBadge, RendezVous};

/// Errors from decoding canonical model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },
}

/// Read a string field that may arrive as a JSON string or number.
pub(crate) fn string_ish(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fetch `key` from an object, tolerating absence and nulls.
pub(crate) fn field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(string_ish).filter(|s| !s.is_empty())
}

/// Fetch the first non-empty value among `keys`.
pub(crate) fn first_field(value: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| field(value, k))
}

/// Numeric id that may arrive as a number or a numeric string.
pub(crate) fn id_field(value: &serde_json::Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
