use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{field, first_field};
use crate::config;

/// Canonical patient record.
///
/// The backend nests identity fields under `user` on some endpoints and
/// flattens them on others; [`Patient::from_value`] accepts both. The
/// client holds a read/write cache only — the backend owns the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    pub prenom: String,
    /// Unique human-readable code ("code bulletin médical"), never editable.
    pub code_patient: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub country: Option<String>,
    pub type_piece: Option<String>,
    pub numero_identite: Option<String>,
    pub assurer: Option<String>,
    pub no_assurance: Option<String>,
    pub telephone: Option<String>,
    pub contact2: Option<String>,
    pub profession: Option<String>,
    pub situation_matrimoniale: Option<String>,
    pub address: Option<String>,
    pub residence_actuelle: Option<String>,
    pub residence_habituelle: Option<String>,
    pub nom_personne_cas_urgence: Option<String>,
    pub telephone_personne_cas_urgence: Option<String>,
    pub lien_personne_cas_urgence: Option<String>,
    pub nom_personne2_cas_urgence: Option<String>,
    pub telephone_personne2_cas_urgence: Option<String>,
    pub lien_personne2_cas_urgence: Option<String>,
    /// Photo reference as the backend sent it: a bare filename or a full URL.
    pub photo: Option<String>,
}

impl Patient {
    /// Normalize a raw backend payload into the canonical record.
    pub fn from_value(raw: &Value) -> Self {
        let user = raw.get("user").cloned().unwrap_or(Value::Null);
        let from_user_or_root =
            |key: &str| field(&user, key).or_else(|| field(raw, key));

        Patient {
            name: from_user_or_root("name").unwrap_or_default(),
            prenom: from_user_or_root("prenom").unwrap_or_default(),
            code_patient: field(raw, "code_patient").unwrap_or_default(),
            email: from_user_or_root("email"),
            gender: field(raw, "gender"),
            birth_date: field(raw, "birth_date"),
            country: field(raw, "country"),
            type_piece: field(raw, "type_piece"),
            numero_identite: field(raw, "numero_identite"),
            assurer: field(raw, "assurer"),
            no_assurance: field(raw, "no_assurance"),
            telephone: first_field(raw, &["telephone", "contact1"]),
            contact2: field(raw, "contact2"),
            profession: field(raw, "profession"),
            situation_matrimoniale: field(raw, "situation_matrimoniale"),
            address: first_field(raw, &["address", "adresse"]),
            residence_actuelle: first_field(
                raw,
                &["residence_actuelle_id", "residence_actuelle"],
            ),
            residence_habituelle: first_field(
                raw,
                &["residence_habituelle_id", "residence_habituelle"],
            ),
            nom_personne_cas_urgence: first_field(
                raw,
                &["nom_personne_cas_urgence", "nom_persn_sos"],
            ),
            telephone_personne_cas_urgence: first_field(
                raw,
                &["telephone_personne_cas_urgence", "tel_persn_sos"],
            ),
            lien_personne_cas_urgence: first_field(
                raw,
                &["lien_personne_cas_urgence", "lien_persn_sos"],
            ),
            nom_personne2_cas_urgence: first_field(
                raw,
                &["nom_personne2_cas_urgence", "nom_persn_sos2"],
            ),
            telephone_personne2_cas_urgence: first_field(
                raw,
                &["telephone_personne2_cas_urgence", "tel_persn_sos2"],
            ),
            lien_personne2_cas_urgence: first_field(
                raw,
                &["lien_personne2_cas_urgence", "lien_persn_sos2"],
            ),
            photo: first_field(raw, &["img_url", "photo"]).or_else(|| {
                first_field(&user, &["img_url", "image_url"])
            }),
        }
    }

    /// "Prenom Name" for headers and the medical card.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.name).trim().to_string()
    }

    /// Absolute URL of the profile photo, or `None` when there is none.
    pub fn photo_url(&self) -> Option<String> {
        let photo = self.photo.as_deref()?;
        if photo.starts_with("http") {
            Some(photo.to_string())
        } else {
            Some(format!("{}/{}", config::PATIENT_PHOTO_BASE, photo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_user_fields_are_lifted() {
        let raw = json!({
            "code_patient": "DM2014562452",
            "user": {"name": "Ouedraogo", "prenom": "Awa", "email": "awa@example.org"},
            "birth_date": "1990-04-02",
        });
        let p = Patient::from_value(&raw);
        assert_eq!(p.name, "Ouedraogo");
        assert_eq!(p.prenom, "Awa");
        assert_eq!(p.email.as_deref(), Some("awa@example.org"));
        assert_eq!(p.code_patient, "DM2014562452");
    }

    #[test]
    fn flat_fields_also_accepted() {
        let raw = json!({"name": "Kabore", "prenom": "Issa", "telephone": "0612345678"});
        let p = Patient::from_value(&raw);
        assert_eq!(p.name, "Kabore");
        assert_eq!(p.telephone.as_deref(), Some("0612345678"));
    }

    #[test]
    fn backend_field_aliases_are_normalized() {
        let raw = json!({
            "contact1": "0711111111",
            "adresse": "Secteur 15, Ouagadougou",
            "nom_persn_sos": "Mariam K.",
        });
        let p = Patient::from_value(&raw);
        assert_eq!(p.telephone.as_deref(), Some("0711111111"));
        assert_eq!(p.address.as_deref(), Some("Secteur 15, Ouagadougou"));
        assert_eq!(p.nom_personne_cas_urgence.as_deref(), Some("Mariam K."));
    }

    #[test]
    fn photo_filename_becomes_full_url() {
        let raw = json!({"photo": "awa.jpg"});
        let p = Patient::from_value(&raw);
        assert_eq!(
            p.photo_url().unwrap(),
            "https://gestpatients-bf.com/assets/uploads/patient/awa.jpg"
        );
    }

    #[test]
    fn absolute_photo_url_is_kept() {
        let raw = json!({"img_url": "https://cdn.example.org/p.png"});
        let p = Patient::from_value(&raw);
        assert_eq!(p.photo_url().unwrap(), "https://cdn.example.org/p.png");
    }

    #[test]
    fn missing_photo_is_none() {
        assert!(Patient::from_value(&json!({})).photo_url().is_none());
    }

    #[test]
    fn full_name_joins_prenom_first() {
        let raw = json!({"user": {"name": "Ouedraogo", "prenom": "Awa"}});
        assert_eq!(Patient::from_value(&raw).full_name(), "Awa Ouedraogo");
    }
}
