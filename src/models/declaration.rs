use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::DeclarationCategory;
use super::{field, first_field, id_field};

/// An administrative or medical record (certificate, hospitalization note,
/// birth/death declaration...). Read-only from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: Option<i64>,
    pub declaration_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub doctor_name: String,
    pub hospital_name: String,
    pub created_at: Option<String>,
    pub date: Option<String>,
}

impl Declaration {
    pub fn from_value(raw: &Value) -> Self {
        // `hospital` is sometimes an object with varying label fields,
        // sometimes a plain string.
        let hospital_name = match raw.get("hospital") {
            Some(h @ Value::Object(_)) => {
                first_field(h, &["label", "nom_direction_generale"])
                    .unwrap_or_else(|| "Nom non disponible".into())
            }
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => "Non spécifié".into(),
        };

        Declaration {
            id: id_field(raw, "id"),
            declaration_type: field(raw, "type"),
            description: field(raw, "description"),
            status: field(raw, "status"),
            reference: field(raw, "reference"),
            notes: field(raw, "notes"),
            doctor_name: super::doctor::resolve_doctor_name(raw, &[])
                .unwrap_or_else(|| "Non spécifié".into()),
            hospital_name,
            created_at: field(raw, "created_at"),
            date: field(raw, "date"),
        }
    }

    /// Human label for the declaration type (birth -> "Naissance").
    pub fn type_label(&self) -> String {
        match self.declaration_type.as_deref().map(str::to_lowercase).as_deref() {
            Some("birth") => "Naissance".into(),
            Some("death") => "Décès".into(),
            Some(_) => self.declaration_type.clone().unwrap_or_default(),
            None => "Déclaration".into(),
        }
    }

    /// Filter category of this declaration.
    pub fn category(&self) -> DeclarationCategory {
        self.declaration_type
            .as_deref()
            .map(DeclarationCategory::of_type)
            .unwrap_or(DeclarationCategory::Other)
    }

    /// Status text with the screen's fallback.
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("Non défini")
    }
}
