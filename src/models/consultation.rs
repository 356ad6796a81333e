use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::doctor::{resolve_doctor_name, Doctor};
use super::field;

/// Completion state of a consultation.
///
/// The backend is inconsistent here: some endpoints send a string status,
/// others a numeric flag where `1` means done. Decoding accepts both; the
/// canonical representation is this enum (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsultationStatus {
    Done,
    InProgress,
}

impl ConsultationStatus {
    pub fn decode(raw: Option<&Value>) -> Self {
        match raw {
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Self::Done,
            Some(Value::String(s)) => match s.as_str() {
                "1" | "complete" | "terminé" | "termine" => Self::Done,
                _ => Self::InProgress,
            },
            _ => Self::InProgress,
        }
    }

    /// Badge text shown on the consultation card.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Done => "Terminé",
            Self::InProgress => "En cours",
        }
    }
}

/// A past medical encounter. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Option<i64>,
    pub motif: String,
    pub date: Option<String>,
    pub consultation_type: Option<String>,
    pub doctor_name: String,
    pub status: ConsultationStatus,
    pub observation: Option<String>,
}

impl Consultation {
    pub fn from_value(raw: &Value, doctors: &[Doctor]) -> Self {
        Consultation {
            id: super::id_field(raw, "id"),
            motif: field(raw, "motif").unwrap_or_else(|| "Consultation générale".into()),
            date: field(raw, "date"),
            consultation_type: field(raw, "type"),
            doctor_name: resolve_doctor_name(raw, doctors)
                .unwrap_or_else(|| "Médecin non spécifié".into()),
            status: ConsultationStatus::decode(raw.get("status")),
            observation: field(raw, "observation"),
        }
    }
}
