//! Rendez-vous screen: list, stats, booking, and cancellation.

use chrono::NaiveDate;

use crate::api::{ApiError, Attachment, NewRendezVous, PortalApi};
use crate::forms::{self, FormErrors};
use crate::models::{Doctor, RdvBadge, RendezVous};
use crate::notify::{Notice, Notifier};
use crate::screen::ScreenState;
use crate::session::SessionStore;

/// Tabs above the rendez-vous list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RdvFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

/// Counters shown in the header cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RdvStats {
    pub total: usize,
    pub upcoming: usize,
    pub today: usize,
    pub done: usize,
}

/// Booking form as the patient filled it. `doctor_id` is `None` until a
/// doctor is picked in the dropdown.
#[derive(Debug, Clone, Default)]
pub struct NewRdvForm {
    pub title: String,
    pub date: String,
    pub heure: String,
    pub doctor_id: Option<i64>,
    pub motif: String,
    pub notes: String,
    pub attachment: Option<Attachment>,
}

pub const MSG_MANDATORY: &str = "Veuillez remplir tous les champs obligatoires (*)";

impl NewRdvForm {
    /// Run every rule. The mandatory-fields rule collapses into one
    /// message; date and attachment problems keep their own text.
    pub fn validate(&self, today: NaiveDate) -> FormErrors {
        let mut errors = FormErrors::new();
        let mandatory_missing = forms::required(&self.title).is_some()
            || forms::required(&self.date).is_some()
            || forms::required(&self.heure).is_some()
            || forms::required(&self.motif).is_some()
            || self.doctor_id.is_none();
        if mandatory_missing {
            errors.check("mandatory", Some(MSG_MANDATORY));
        }
        if forms::required(&self.date).is_none() {
            errors.check("date", forms::not_past(&self.date, today));
        }
        if let Some(attachment) = &self.attachment {
            errors.check("attachment", forms::attachment_size(attachment.size()));
        }
        errors
    }

    fn into_payload(self) -> Option<NewRendezVous> {
        Some(NewRendezVous {
            title: self.title.trim().to_string(),
            date: self.date.trim().to_string(),
            heure: self.heure.trim().to_string(),
            doctor_id: self.doctor_id?,
            motif: self.motif.trim().to_string(),
            notes: {
                let notes = self.notes.trim();
                (!notes.is_empty()).then(|| notes.to_string())
            },
            attachment: self.attachment,
        })
    }
}

#[derive(Default)]
pub struct RendezVousScreen {
    pub state: ScreenState<Vec<RendezVous>>,
    pub doctors: Vec<Doctor>,
    pub filter: RdvFilter,
    pub query: String,
}

impl RendezVousScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch doctors and rendez-vous together; doctors are needed to
    /// resolve names for records that only carry a `doctor_id`.
    pub fn load(&mut self, api: &impl PortalApi, session: &SessionStore) {
        let Some(token) = session.token() else {
            self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
            return;
        };
        self.state = ScreenState::Loading;

        // A doctors failure is not fatal: names degrade, the list still shows.
        match api.doctors(token) {
            Ok(doctors) => self.doctors = doctors,
            Err(err) => tracing::warn!(error = %err, "doctor list unavailable"),
        }

        self.state = match api.rendezvous(token) {
            Ok(mut list) => {
                for rdv in &mut list {
                    if rdv.doctor_name.is_none() {
                        rdv.doctor_name = rdv
                            .doctor_id
                            .and_then(|id| self.doctors.iter().find(|d| d.id == id))
                            .map(Doctor::display_name);
                    }
                }
                tracing::debug!(count = list.len(), "rendez-vous loaded");
                ScreenState::Loaded(list)
            }
            // A rejected token renders the same prompt as a missing one.
            Err(err) if err.is_auth() => {
                ScreenState::Failed(ApiError::AuthMissing.user_message())
            }
            Err(err) => ScreenState::Failed(err.user_message()),
        };
    }

    pub fn stats(&self, today: NaiveDate) -> RdvStats {
        let mut stats = RdvStats::default();
        let Some(list) = self.state.data() else { return stats };
        stats.total = list.len();
        for rdv in list {
            match rdv.badge(today) {
                RdvBadge::Termine => stats.done += 1,
                RdvBadge::Aujourdhui => {
                    stats.today += 1;
                    stats.upcoming += 1;
                }
                RdvBadge::AVenir => stats.upcoming += 1,
                RdvBadge::Passe => {}
            }
        }
        stats
    }

    /// Rows after the tab filter and the search box. Search matches title,
    /// motif, and doctor name.
    pub fn visible(&self, today: NaiveDate) -> Vec<&RendezVous> {
        let query = self.query.trim().to_lowercase();
        let Some(list) = self.state.data() else { return Vec::new() };
        list.iter()
            .filter(|rdv| match self.filter {
                RdvFilter::All => true,
                RdvFilter::Upcoming => rdv.day().map(|d| d >= today).unwrap_or(true),
                RdvFilter::Past => rdv.day().map(|d| d < today).unwrap_or(false),
            })
            .filter(|rdv| {
                if query.is_empty() {
                    return true;
                }
                rdv.title.to_lowercase().contains(&query)
                    || rdv.motif.to_lowercase().contains(&query)
                    || rdv
                        .doctor_name
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Book a rendez-vous. Validation failures notify and never reach the
    /// network; on success the list is re-fetched from the backend.
    pub fn create(
        &mut self,
        api: &impl PortalApi,
        session: &SessionStore,
        notifier: &impl Notifier,
        form: NewRdvForm,
        today: NaiveDate,
    ) -> bool {
        let Some(token) = session.token() else {
            notifier.notify(Notice::error("Erreur", ApiError::AuthMissing.user_message()));
            return false;
        };

        let errors = form.validate(today);
        if let Some(message) = errors.first_message() {
            notifier.notify(Notice::error("Création Impossible", message));
            return false;
        }
        // validate() guarantees doctor_id is set past this point.
        let Some(payload) = form.into_payload() else { return false };

        match api.create_rendezvous(token, &payload) {
            Ok(()) => {
                notifier.notify(Notice::success(
                    "Rendez-vous Créé",
                    "Votre demande de rendez-vous a été enregistrée.",
                ));
                self.load(api, session);
                true
            }
            Err(err) => {
                notifier.notify(Notice::error("Erreur", err.user_message()));
                false
            }
        }
    }

    /// Cancel a rendez-vous (the confirmation dialog happens in the shell).
    pub fn delete(
        &mut self,
        api: &impl PortalApi,
        session: &SessionStore,
        notifier: &impl Notifier,
        id: i64,
    ) -> bool {
        let Some(token) = session.token() else {
            notifier.notify(Notice::error("Erreur", ApiError::AuthMissing.user_message()));
            return false;
        };
        match api.delete_rendezvous(token, id) {
            Ok(()) => {
                notifier.notify(Notice::success(
                    "Rendez-vous Supprimé",
                    "Le rendez-vous a été annulé.",
                ));
                self.load(api, session);
                true
            }
            Err(err) => {
                notifier.notify(Notice::error("Erreur", err.user_message()));
                false
            }
        }
    }
}
