use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{field, id_field};

/// A doctor the patient can book a rendez-vous with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialite: Option<String>,
}

impl Doctor {
    pub fn from_value(raw: &Value) -> Option<Self> {
        Some(Doctor {
            id: id_field(raw, "id")?,
            name: field(raw, "name")?,
            specialite: field(raw, "specialite"),
        })
    }

    /// "Dr. Name - Spécialité" as shown in the booking dialog.
    pub fn display_name(&self) -> String {
        match &self.specialite {
            Some(s) => format!("Dr. {} - {}", self.name, s),
            None => format!("Dr. {}", self.name),
        }
    }
}

/// Resolve a record's doctor label from whichever shape the backend sent:
/// a nested `doctor.user` object, a nested `doctor` object, a flat
/// `doctor_name`, or only a `doctor_id` to look up in the fetched list.
pub fn resolve_doctor_name(raw: &Value, doctors: &[Doctor]) -> Option<String> {
    if let Some(user) = raw.get("doctor").and_then(|d| d.get("user")) {
        let name = field(user, "name")?;
        let prenom = field(user, "prenom").unwrap_or_default();
        return Some(format!("Dr. {} {}", name, prenom).trim_end().to_string());
    }
    if let Some(doctor) = raw.get("doctor") {
        if let Some(name) = field(doctor, "name") {
            return Some(format!("Dr. {name}"));
        }
    }
    if let Some(name) = field(raw, "doctor_name") {
        return Some(name);
    }
    let id = id_field(raw, "doctor_id")?;
    let doctor = doctors.iter().find(|d| d.id == id)?;
    Some(doctor.display_name())
}
