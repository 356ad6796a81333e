//! Dashboard: greeting, quick counters, and the next rendez-vous.

use chrono::NaiveDate;

use crate::api::{ApiError, PortalApi};
use crate::models::{Patient, RdvBadge, RendezVous};
use crate::screen::ScreenState;
use crate::session::SessionStore;

/// Counters shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardData {
    pub consultations: usize,
    pub rendezvous: usize,
    pub upcoming_rendezvous: usize,
    /// Soonest upcoming rendez-vous, for the "prochain rendez-vous" card.
    pub next_rendezvous: Option<RendezVous>,
}

#[derive(Default)]
pub struct DashboardScreen {
    /// Cached profile for the greeting; renders before any network call.
    pub patient: Option<Patient>,
    pub state: ScreenState<DashboardData>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greeting line, from the cached snapshot.
    pub fn greeting(&self) -> String {
        match &self.patient {
            Some(p) if !p.prenom.is_empty() => format!("Bonjour, {}", p.prenom),
            _ => "Bonjour".into(),
        }
    }

    pub fn load(&mut self, api: &impl PortalApi, session: &SessionStore, today: NaiveDate) {
        self.patient = session.patient().cloned();
        let Some(token) = session.token() else {
            self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
            return;
        };
        self.state = ScreenState::Loading;

        let consultations = match api.consultations(token) {
            Ok(list) => list.len(),
            Err(err) if err.is_auth() => {
                self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
                return;
            }
            Err(err) => {
                self.state = ScreenState::Failed(err.user_message());
                return;
            }
        };

        match api.rendezvous(token) {
            Ok(mut list) => {
                let rendezvous = list.len();
                let upcoming: Vec<usize> = list
                    .iter()
                    .enumerate()
                    .filter(|(_, rdv)| {
                        matches!(rdv.badge(today), RdvBadge::Aujourdhui | RdvBadge::AVenir)
                    })
                    .map(|(i, _)| i)
                    .collect();
                let upcoming_rendezvous = upcoming.len();
                // Soonest of the upcoming subset only, so a completed
                // rendez-vous on the same day never takes the card.
                let next_rendezvous = upcoming
                    .iter()
                    .filter_map(|&i| list[i].day().map(|d| (d, i)))
                    .min_by_key(|&(d, _)| d)
                    .map(|(_, i)| list.swap_remove(i));
                self.state = ScreenState::Loaded(DashboardData {
                    consultations,
                    rendezvous,
                    upcoming_rendezvous,
                    next_rendezvous,
                });
            }
            Err(err) => {
                self.state = ScreenState::Failed(err.user_message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPortal;
    use crate::models::Consultation;
    use serde_json::json;

    fn session_with(patient: Patient) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(dir.path().join("s.json")).unwrap();
        store.start("tok".into(), patient).unwrap();
        (dir, store)
    }

    fn rdv(date: &str) -> RendezVous {
        RendezVous::from_value(&json!({"id": 1, "date": date}), &[])
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn greeting_uses_the_cached_first_name() {
        let mut screen = DashboardScreen::new();
        assert_eq!(screen.greeting(), "Bonjour");
        screen.patient = Some(Patient { prenom: "Awa".into(), ..Default::default() });
        assert_eq!(screen.greeting(), "Bonjour, Awa");
    }

    #[test]
    fn counters_and_next_rendezvous() {
        let patient = Patient { prenom: "Awa".into(), ..Default::default() };
        let api = MockPortal::new()
            .with_consultations(Ok(vec![Consultation::from_value(&json!({}), &[])]))
            .with_rendezvous(Ok(vec![
                rdv("2025-05-01"),
                rdv("2025-07-01"),
                rdv("2025-06-20"),
            ]));
        let (_dir, session) = session_with(patient);
        let mut screen = DashboardScreen::new();

        screen.load(&api, &session, d(2025, 6, 15));

        let data = screen.state.data().unwrap();
        assert_eq!(data.consultations, 1);
        assert_eq!(data.rendezvous, 3);
        assert_eq!(data.upcoming_rendezvous, 2);
        assert_eq!(
            data.next_rendezvous.as_ref().and_then(|r| r.date.as_deref()),
            Some("2025-06-20")
        );
        assert_eq!(screen.greeting(), "Bonjour, Awa");
    }

    #[test]
    fn completed_rendezvous_on_the_same_day_never_takes_the_card() {
        // The completed one comes first in the backend's list order.
        let api = MockPortal::new().with_rendezvous(Ok(vec![
            RendezVous::from_value(
                &json!({"id": 1, "title": "Déjà passé", "date": "2025-06-20", "status": "complete"}),
                &[],
            ),
            RendezVous::from_value(
                &json!({"id": 2, "title": "Contrôle", "date": "2025-06-20"}),
                &[],
            ),
        ]));
        let (_dir, session) = session_with(Patient::default());
        let mut screen = DashboardScreen::new();

        screen.load(&api, &session, d(2025, 6, 15));

        let data = screen.state.data().unwrap();
        assert_eq!(data.upcoming_rendezvous, 1);
        assert_eq!(
            data.next_rendezvous.as_ref().map(|r| r.title.as_str()),
            Some("Contrôle")
        );
    }

    #[test]
    fn no_upcoming_rendezvous_leaves_the_card_empty() {
        let api = MockPortal::new().with_rendezvous(Ok(vec![rdv("2025-01-01")]));
        let (_dir, session) = session_with(Patient::default());
        let mut screen = DashboardScreen::new();

        screen.load(&api, &session, d(2025, 6, 15));

        let data = screen.state.data().unwrap();
        assert_eq!(data.upcoming_rendezvous, 0);
        assert!(data.next_rendezvous.is_none());
    }

    #[test]
    fn missing_session_prompts_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("s.json")).unwrap();
        let api = MockPortal::new();
        let mut screen = DashboardScreen::new();

        screen.load(&api, &session, d(2025, 6, 15));

        assert_eq!(screen.state.error(), Some("Veuillez vous connecter"));
        assert!(api.calls().is_empty());
    }
}
