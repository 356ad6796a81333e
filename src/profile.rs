//! Profile screen: cache-first display and the multipart update.

use chrono::NaiveDate;

use crate::api::{ApiError, Attachment, PortalApi, ProfileUpdate};
use crate::forms::{self, FormErrors};
use crate::models::Patient;
use crate::notify::{Notice, Notifier};
use crate::screen::ScreenState;
use crate::session::SessionStore;

/// The profile form as the patient edited it. Starts as a copy of the
/// cached snapshot; [`ProfileForm::diff`] derives what actually changed.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub patient: Patient,
    pub photo: Option<Attachment>,
    /// Optional password change; both fields empty means "keep it".
    pub new_password: String,
    pub confirm_password: String,
}

impl ProfileForm {
    pub fn from_patient(patient: &Patient) -> Self {
        Self { patient: patient.clone(), ..Default::default() }
    }

    /// Field-level validation. Identity fields (name, code) are not
    /// editable so only contact and date fields are checked.
    pub fn validate(&self, today: NaiveDate) -> FormErrors {
        let mut errors = FormErrors::new();
        let p = &self.patient;
        errors.check("telephone", forms::phone(p.telephone.as_deref().unwrap_or("")));
        errors.check("contact2", forms::phone(p.contact2.as_deref().unwrap_or("")));
        errors.check(
            "telephone_personne_cas_urgence",
            forms::phone(p.telephone_personne_cas_urgence.as_deref().unwrap_or("")),
        );
        errors.check(
            "telephone_personne2_cas_urgence",
            forms::phone(p.telephone_personne2_cas_urgence.as_deref().unwrap_or("")),
        );
        errors.check("email", forms::email(p.email.as_deref().unwrap_or("")));
        errors.check(
            "birth_date",
            forms::birth_date(p.birth_date.as_deref().unwrap_or(""), today),
        );
        if let Some(photo) = &self.photo {
            errors.check("photo", forms::attachment_size(photo.size()));
        }
        if !self.new_password.is_empty() || !self.confirm_password.is_empty() {
            errors.check("password", forms::password(&self.new_password));
            errors.check(
                "password_confirmation",
                forms::password_confirmation(&self.new_password, &self.confirm_password),
            );
        }
        errors
    }

    /// Build the update payload from what differs against `original`.
    /// Field names stay client-side here; the HTTP layer renames them.
    pub fn diff(&self, original: &Patient) -> ProfileUpdate {
        let mut update = ProfileUpdate::default();
        let p = &self.patient;
        let mut changed = |name: &str, before: &Option<String>, after: &Option<String>| {
            if before != after {
                update.push(name, after.as_deref().unwrap_or(""));
            }
        };
        changed("email", &original.email, &p.email);
        changed("gender", &original.gender, &p.gender);
        changed("birth_date", &original.birth_date, &p.birth_date);
        changed("country", &original.country, &p.country);
        changed("type_piece", &original.type_piece, &p.type_piece);
        changed("numero_identite", &original.numero_identite, &p.numero_identite);
        changed("assurer", &original.assurer, &p.assurer);
        changed("no_assurance", &original.no_assurance, &p.no_assurance);
        changed("telephone", &original.telephone, &p.telephone);
        changed("contact2", &original.contact2, &p.contact2);
        changed("profession", &original.profession, &p.profession);
        changed(
            "situation_matrimoniale",
            &original.situation_matrimoniale,
            &p.situation_matrimoniale,
        );
        changed("address", &original.address, &p.address);
        changed(
            "residence_actuelle_id",
            &original.residence_actuelle,
            &p.residence_actuelle,
        );
        changed(
            "residence_habituelle_id",
            &original.residence_habituelle,
            &p.residence_habituelle,
        );
        changed(
            "nom_personne_cas_urgence",
            &original.nom_personne_cas_urgence,
            &p.nom_personne_cas_urgence,
        );
        changed(
            "telephone_personne_cas_urgence",
            &original.telephone_personne_cas_urgence,
            &p.telephone_personne_cas_urgence,
        );
        changed(
            "lien_personne_cas_urgence",
            &original.lien_personne_cas_urgence,
            &p.lien_personne_cas_urgence,
        );
        changed(
            "nom_personne2_cas_urgence",
            &original.nom_personne2_cas_urgence,
            &p.nom_personne2_cas_urgence,
        );
        changed(
            "telephone_personne2_cas_urgence",
            &original.telephone_personne2_cas_urgence,
            &p.telephone_personne2_cas_urgence,
        );
        changed(
            "lien_personne2_cas_urgence",
            &original.lien_personne2_cas_urgence,
            &p.lien_personne2_cas_urgence,
        );
        if !self.new_password.is_empty() {
            update.push("password", &self.new_password);
            update.push("password_confirmation", &self.confirm_password);
        }
        update.photo = self.photo.clone();
        update
    }

    /// Whether anything differs from `original`. The shell disables the
    /// submit control while this is false.
    pub fn is_dirty(&self, original: &Patient) -> bool {
        !self.diff(original).is_empty()
    }
}

#[derive(Default)]
pub struct ProfileScreen {
    pub state: ScreenState<Patient>,
}

impl ProfileScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache-first load: the stored snapshot renders immediately, then the
    /// backend copy replaces it. A refresh failure keeps the cache visible
    /// rather than blanking the screen.
    pub fn load(&mut self, api: &impl PortalApi, session: &mut SessionStore) {
        let Some(token) = session.token().map(str::to_string) else {
            self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
            return;
        };
        if let Some(cached) = session.patient() {
            self.state = ScreenState::Loaded(cached.clone());
        } else {
            self.state = ScreenState::Loading;
        }

        match api.show_profile(&token) {
            Ok(fresh) => {
                if let Err(err) = session.set_patient(fresh.clone()) {
                    tracing::error!(error = %err, "profile snapshot could not be persisted");
                }
                self.state = ScreenState::Loaded(fresh);
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile refresh failed");
                if self.state.data().is_none() {
                    self.state = ScreenState::Failed(err.user_message());
                }
            }
        }
    }

    /// Submit the edited form. Returns whether the backend accepted it.
    pub fn submit(
        &mut self,
        api: &impl PortalApi,
        session: &mut SessionStore,
        notifier: &impl Notifier,
        form: &ProfileForm,
        today: NaiveDate,
    ) -> bool {
        let Some(token) = session.token().map(str::to_string) else {
            notifier.notify(Notice::error("Erreur", ApiError::AuthMissing.user_message()));
            return false;
        };

        let errors = form.validate(today);
        if let Some(message) = errors.first_message() {
            notifier.notify(Notice::error("Formulaire Invalide", message));
            return false;
        }

        let original = session.patient().cloned().unwrap_or_default();
        let update = form.diff(&original);
        if update.is_empty() {
            notifier.notify(Notice::info(
                "Aucune Modification",
                "Aucun champ n'a été modifié.",
            ));
            return false;
        }

        match api.update_profile(&token, &update) {
            Ok(echoed) => {
                // When the backend does not echo the record, re-fetch it so
                // the cache never drifts from the server.
                let fresh = match echoed {
                    Some(patient) => Some(patient),
                    None => api.show_profile(&token).ok(),
                };
                if let Some(patient) = fresh {
                    if let Err(err) = session.set_patient(patient.clone()) {
                        tracing::error!(error = %err, "profile snapshot could not be persisted");
                    }
                    self.state = ScreenState::Loaded(patient);
                }
                notifier.notify(Notice::success(
                    "Profil Mis à Jour",
                    "Vos informations ont été enregistrées.",
                ));
                true
            }
            Err(err) => {
                notifier.notify(Notice::error("Erreur", err.user_message()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPortal;
    use crate::notify::{NoticeKind, RecordingNotifier};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn session_with(patient: Patient) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(dir.path().join("s.json")).unwrap();
        store.start("tok".into(), patient).unwrap();
        (dir, store)
    }

    fn patient() -> Patient {
        Patient {
            name: "Ouedraogo".into(),
            prenom: "Awa".into(),
            code_patient: "DM1".into(),
            telephone: Some("0612345678".into()),
            ..Default::default()
        }
    }

    #[test]
    fn load_shows_cache_then_refreshes() {
        let fresh = Patient { profession: Some("Enseignante".into()), ..patient() };
        let api = MockPortal::new().with_profile(Ok(fresh));
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();

        screen.load(&api, &mut session);

        assert_eq!(
            screen.state.data().unwrap().profession.as_deref(),
            Some("Enseignante")
        );
        // The refreshed copy also lands in the session cache.
        assert_eq!(
            session.patient().unwrap().profession.as_deref(),
            Some("Enseignante")
        );
    }

    #[test]
    fn refresh_failure_keeps_the_cached_snapshot() {
        let api = MockPortal::new().with_profile(Err(ApiError::unreachable()));
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();

        screen.load(&api, &mut session);

        assert_eq!(screen.state.data().unwrap().code_patient, "DM1");
    }

    #[test]
    fn refresh_failure_without_cache_fails_the_screen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        // A token without a snapshot, as an older client version left it.
        std::fs::write(&path, r#"{"token":"tok","patient":null}"#).unwrap();
        let mut session = SessionStore::open(&path).unwrap();
        let api = MockPortal::new().with_profile(Err(ApiError::unreachable()));
        let mut screen = ProfileScreen::new();

        screen.load(&api, &mut session);

        assert!(screen.state.error().unwrap().contains("Impossible de se connecter"));
    }

    #[test]
    fn diff_contains_only_changed_fields() {
        let original = patient();
        let mut form = ProfileForm::from_patient(&original);
        form.patient.profession = Some("Enseignante".into());
        form.patient.address = Some("Secteur 15".into());

        let update = form.diff(&original);

        assert_eq!(update.fields.len(), 2);
        assert!(update.fields.contains(&("profession".into(), "Enseignante".into())));
        assert!(update.fields.contains(&("address".into(), "Secteur 15".into())));
        assert!(form.is_dirty(&original));
        assert!(!ProfileForm::from_patient(&original).is_dirty(&original));
    }

    #[test]
    fn unchanged_form_is_rejected_before_the_network() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();
        let form = ProfileForm::from_patient(&patient());

        let ok = screen.submit(&api, &mut session, &relay, &form, d(2025, 6, 15));

        assert!(!ok);
        assert!(api.calls().is_empty());
        assert_eq!(relay.last().unwrap().kind, NoticeKind::Info);
    }

    #[test]
    fn invalid_phone_blocks_the_submit() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();
        let mut form = ProfileForm::from_patient(&patient());
        form.patient.telephone = Some("123".into());

        let ok = screen.submit(&api, &mut session, &relay, &form, d(2025, 6, 15));

        assert!(!ok);
        assert!(api.calls().is_empty());
        assert_eq!(relay.last().unwrap().message, forms::MSG_PHONE);
    }

    #[test]
    fn accepted_update_refreshes_session_and_screen() {
        let echoed = Patient { profession: Some("Enseignante".into()), ..patient() };
        let api = MockPortal::new().with_update(Ok(Some(echoed)));
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();
        let mut form = ProfileForm::from_patient(&patient());
        form.patient.profession = Some("Enseignante".into());

        let ok = screen.submit(&api, &mut session, &relay, &form, d(2025, 6, 15));

        assert!(ok);
        assert_eq!(
            session.patient().unwrap().profession.as_deref(),
            Some("Enseignante")
        );
        assert_eq!(relay.last().unwrap().title, "Profil Mis à Jour");
    }

    #[test]
    fn update_without_echo_refetches_the_profile() {
        let fresh = Patient { profession: Some("Enseignante".into()), ..patient() };
        let api = MockPortal::new().with_update(Ok(None)).with_profile(Ok(fresh));
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();
        let mut form = ProfileForm::from_patient(&patient());
        form.patient.profession = Some("Enseignante".into());

        assert!(screen.submit(&api, &mut session, &relay, &form, d(2025, 6, 15)));
        assert_eq!(api.call_count("show"), 1);
        assert_eq!(
            screen.state.data().unwrap().profession.as_deref(),
            Some("Enseignante")
        );
    }

    #[test]
    fn password_change_requires_matching_confirmation() {
        let mut form = ProfileForm::from_patient(&patient());
        form.new_password = "abcd".into();
        form.confirm_password = "abce".into();
        assert_eq!(
            form.validate(d(2025, 6, 15)).first_message(),
            Some(forms::MSG_PASSWORD_MISMATCH)
        );

        form.confirm_password = "abcd".into();
        assert!(form.validate(d(2025, 6, 15)).is_empty());
        let update = form.diff(&patient());
        assert!(update.fields.contains(&("password".into(), "abcd".into())));
        assert!(update.fields.contains(&("password_confirmation".into(), "abcd".into())));
    }

    #[test]
    fn new_photo_alone_is_a_valid_update() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = session_with(patient());
        let mut screen = ProfileScreen::new();
        let mut form = ProfileForm::from_patient(&patient());
        form.photo = Some(Attachment { filename: "moi.jpg".into(), bytes: vec![1, 2, 3] });

        assert!(screen.submit(&api, &mut session, &relay, &form, d(2025, 6, 15)));
        assert_eq!(api.call_count("update"), 1);
    }
}
