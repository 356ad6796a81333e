//! Consultation history screen.

use chrono::NaiveDate;

use crate::api::{ApiError, PortalApi};
use crate::dates;
use crate::models::Consultation;
use crate::screen::ScreenState;
use crate::session::SessionStore;

/// Date filter tabs above the consultation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsultationFilter {
    #[default]
    All,
    /// Last three months.
    Recent,
    /// Today or later (scheduled follow-ups).
    Upcoming,
}

#[derive(Default)]
pub struct ConsultationsScreen {
    pub state: ScreenState<Vec<Consultation>>,
    pub filter: ConsultationFilter,
    pub query: String,
}

impl ConsultationsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full history. Also the retry action after a failure.
    pub fn load(&mut self, api: &impl PortalApi, session: &SessionStore) {
        let Some(token) = session.token() else {
            self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
            return;
        };
        self.state = ScreenState::Loading;
        self.state = match api.consultations(token) {
            Ok(list) => {
                tracing::debug!(count = list.len(), "consultations loaded");
                ScreenState::Loaded(list)
            }
            // A rejected token renders the same prompt as a missing one.
            Err(err) if err.is_auth() => {
                ScreenState::Failed(ApiError::AuthMissing.user_message())
            }
            Err(err) => ScreenState::Failed(err.user_message()),
        };
    }

    /// Rows to render after the date filter and the search box.
    ///
    /// The search matches motif, doctor name, and consultation type,
    /// case-insensitively. Records without a parseable date drop out of
    /// the dated filters but stay under "all".
    pub fn visible(&self, today: NaiveDate) -> Vec<&Consultation> {
        let query = self.query.trim().to_lowercase();
        let list = match self.state.data() {
            Some(list) => list,
            None => return Vec::new(),
        };
        list.iter()
            .filter(|c| match self.filter {
                ConsultationFilter::All => true,
                ConsultationFilter::Recent => c
                    .date
                    .as_deref()
                    .map(|d| dates::is_recent(d, today))
                    .unwrap_or(false),
                ConsultationFilter::Upcoming => c
                    .date
                    .as_deref()
                    .map(|d| dates::is_upcoming(d, today))
                    .unwrap_or(false),
            })
            .filter(|c| {
                if query.is_empty() {
                    return true;
                }
                c.motif.to_lowercase().contains(&query)
                    || c.doctor_name.to_lowercase().contains(&query)
                    || c.consultation_type
                        .as_deref()
                        .map(|t| t.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }
}
