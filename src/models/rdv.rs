use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::doctor::{resolve_doctor_name, Doctor};
use super::enums::RdvStatus;
use super::{field, id_field};
use crate::dates;
use chrono::NaiveDate;

/// Badge shown on a rendez-vous card, derived from status and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RdvBadge {
    Termine,
    Aujourdhui,
    Passe,
    AVenir,
}

impl RdvBadge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Termine => "Terminé",
            Self::Aujourdhui => "Aujourd'hui",
            Self::Passe => "Passé",
            Self::AVenir => "À venir",
        }
    }
}

/// A scheduled encounter, created and deleted by the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendezVous {
    pub id: i64,
    pub title: String,
    pub date: Option<String>,
    pub heure: Option<String>,
    pub motif: String,
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
    pub duree: Option<String>,
    pub status: RdvStatus,
}

impl RendezVous {
    /// Normalize a raw rendez-vous payload.
    ///
    /// The `details` column may arrive as a JSON string, an object, or be
    /// absent; `heure` may only exist embedded inside the date; `motif`
    /// falls back to details then title.
    pub fn from_value(raw: &Value, doctors: &[Doctor]) -> Self {
        let details: Value = match raw.get("details") {
            Some(Value::String(s)) => serde_json::from_str(s).unwrap_or(Value::Null),
            Some(v @ Value::Object(_)) => v.clone(),
            _ => Value::Null,
        };

        let date = field(raw, "date");
        let heure = field(raw, "heure")
            .or_else(|| field(&details, "heure"))
            .or_else(|| date.as_deref().and_then(dates::embedded_time));

        let title = field(raw, "title").unwrap_or_else(|| "Rendez-vous médical".into());
        let motif = field(raw, "motif")
            .or_else(|| field(&details, "motif"))
            .or_else(|| field(raw, "title"))
            .unwrap_or_else(|| "Motif non spécifié".into());

        RendezVous {
            id: id_field(raw, "id").unwrap_or_default(),
            title,
            date,
            heure,
            motif,
            doctor_id: id_field(raw, "doctor_id"),
            doctor_name: resolve_doctor_name(raw, doctors),
            notes: field(raw, "notes").or_else(|| field(&details, "notes")),
            duree: field(raw, "duree").or_else(|| field(&details, "duree")),
            status: RdvStatus::decode(field(raw, "status").as_deref()),
        }
    }

    /// Midnight-normalized calendar day of the rendez-vous.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(dates::midnight)
    }

    /// Status badge for a given "today". Completion wins over the date.
    pub fn badge(&self, today: NaiveDate) -> RdvBadge {
        if self.status == RdvStatus::Complete {
            return RdvBadge::Termine;
        }
        match self.day() {
            Some(d) if d == today => RdvBadge::Aujourdhui,
            Some(d) if d < today => RdvBadge::Passe,
            _ => RdvBadge::AVenir,
        }
    }
}
