//! Login and OTP confirmation flow.
//!
//! Two steps: the patient submits their DM code, the backend sends a
//! one-time code by SMS/email, and the code is exchanged for a bearer
//! token. Controllers return the [`Route`] the shell should show next
//! instead of navigating themselves, so the post-notice navigation order
//! (dialog first, then screen change) stays in the shell's hands.

use std::time::{Duration, Instant};

use crate::api::{ApiError, PortalApi};
use crate::config;
use crate::forms;
use crate::notify::{Notice, Notifier};
use crate::session::SessionStore;

/// Where the shell should take the patient after a controller ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ConfirmOtp { identifier: String },
    Dashboard,
}

const LOGIN_FALLBACK: &str = "Identifiant invalide ou non trouvé.";
const CONFIRM_FALLBACK: &str = "Code OTP incorrect ou expiré.";

/// Step one: request an OTP for the patient identifier.
pub fn submit_login(api: &impl PortalApi, notifier: &impl Notifier, identifier: &str) -> Route {
    let identifier = identifier.trim();
    if let Some(message) = forms::required(identifier) {
        notifier.notify(Notice::error("Erreur de Connexion", message));
        return Route::Login;
    }

    tracing::info!("requesting OTP");
    match api.login(identifier) {
        Ok(ack) => {
            notifier.notify(Notice::success("Code OTP Envoyé", ack.message_or_default()));
            Route::ConfirmOtp { identifier: identifier.to_string() }
        }
        Err(ApiError::NetworkUnreachable(message)) => {
            notifier.notify(Notice::warning("Problème Serveur", message));
            Route::Login
        }
        Err(err) => {
            let message = match &err {
                // A 404 means the DM code matched no patient.
                ApiError::RequestFailed { status: 404, .. } => LOGIN_FALLBACK.to_string(),
                _ => err.user_message(),
            };
            notifier.notify(Notice::error("Erreur de Connexion", message));
            Route::Login
        }
    }
}

/// Step two: exchange identifier + OTP for a token, then open the session.
pub fn confirm_otp(
    api: &impl PortalApi,
    session: &mut SessionStore,
    notifier: &impl Notifier,
    identifier: &str,
    otp: &str,
) -> Route {
    let stay = Route::ConfirmOtp { identifier: identifier.to_string() };
    if let Some(message) = forms::required(otp) {
        notifier.notify(Notice::error("Échec de la Vérification", message));
        return stay;
    }

    match api.confirm(identifier, otp.trim()) {
        Ok(ok) => {
            let welcome = format!("Bienvenue {}", ok.patient.full_name());
            if let Err(err) = session.start(ok.token, ok.patient) {
                // Session lives in memory for this run even if the disk write failed.
                tracing::error!(error = %err, "session state could not be persisted");
            }
            notifier.notify(Notice::success("Connexion Réussie", welcome));
            Route::Dashboard
        }
        Err(ApiError::NetworkUnreachable(message)) => {
            notifier.notify(Notice::warning("Problème Serveur", message));
            stay
        }
        Err(err) => {
            let message = match &err {
                ApiError::AuthInvalid { .. } => CONFIRM_FALLBACK.to_string(),
                _ => err.user_message(),
            };
            notifier.notify(Notice::error("Échec de la Vérification", message));
            stay
        }
    }
}

/// Cooldown between OTP re-sends.
pub struct ResendGate {
    cooldown: Duration,
    last_sent: Option<Instant>,
}

impl ResendGate {
    pub fn new() -> Self {
        Self::with_cooldown(Duration::from_secs(config::OTP_RESEND_COOLDOWN_SECS))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self { cooldown, last_sent: None }
    }

    pub fn ready(&self) -> bool {
        self.remaining_secs() == 0
    }

    /// Whole seconds until the next send is allowed.
    pub fn remaining_secs(&self) -> u64 {
        match self.last_sent {
            Some(at) => self.cooldown.saturating_sub(at.elapsed()).as_secs(),
            None => 0,
        }
    }

    pub fn mark_sent(&mut self) {
        self.last_sent = Some(Instant::now());
    }
}

impl Default for ResendGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-send the OTP, subject to the cooldown. Returns whether a request
/// was actually made.
pub fn resend_otp(
    api: &impl PortalApi,
    notifier: &impl Notifier,
    gate: &mut ResendGate,
    identifier: &str,
) -> bool {
    if !gate.ready() {
        notifier.notify(Notice::info(
            "Patientez",
            format!(
                "Vous pourrez renvoyer le code dans {} secondes.",
                gate.remaining_secs()
            ),
        ));
        return false;
    }

    match api.login(identifier) {
        Ok(ack) => {
            gate.mark_sent();
            notifier.notify(Notice::success("Code OTP Envoyé", ack.message_or_default()));
            true
        }
        Err(err) => {
            notifier.notify(Notice::error("Erreur de Connexion", err.user_message()));
            false
        }
    }
}

/// End the session. The backend call is best-effort: local state is
/// cleared no matter what the logout endpoint answered.
pub fn logout(api: &impl PortalApi, session: &mut SessionStore, notifier: &impl Notifier) -> Route {
    if let Some(token) = session.token() {
        if let Err(err) = api.logout(token) {
            tracing::warn!(error = %err, "backend logout failed, clearing local session anyway");
        }
    }
    if let Err(err) = session.clear() {
        tracing::error!(error = %err, "session file could not be cleared");
    }
    notifier.notify(Notice::success("Déconnexion", "Vous avez été déconnecté."));
    Route::Login
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ConfirmOk, LoginAck, MockPortal};
    use crate::models::Patient;
    use crate::notify::{NoticeKind, RecordingNotifier};

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn login_success_routes_to_otp_screen() {
        let api = MockPortal::new()
            .with_login(Ok(LoginAck { message: "Code envoyé".into() }));
        let relay = RecordingNotifier::new();

        let route = submit_login(&api, &relay, "DM2014562452");

        assert_eq!(route, Route::ConfirmOtp { identifier: "DM2014562452".into() });
        let notice = relay.last().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.title, "Code OTP Envoyé");
        assert_eq!(notice.message, "Code envoyé");
    }

    #[test]
    fn empty_identifier_never_calls_the_backend() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();

        let route = submit_login(&api, &relay, "   ");

        assert_eq!(route, Route::Login);
        assert!(api.calls().is_empty());
        assert_eq!(relay.last().unwrap().message, forms::MSG_REQUIRED);
    }

    #[test]
    fn unknown_identifier_gets_the_fallback_text() {
        let api = MockPortal::new().with_login(Err(ApiError::request_failed(404)));
        let relay = RecordingNotifier::new();

        assert_eq!(submit_login(&api, &relay, "DM000"), Route::Login);
        let notice = relay.last().unwrap();
        assert_eq!(notice.title, "Erreur de Connexion");
        assert_eq!(notice.message, "Identifiant invalide ou non trouvé.");
    }

    #[test]
    fn unreachable_backend_is_a_warning_not_an_error() {
        let api = MockPortal::new().with_login(Err(ApiError::unreachable()));
        let relay = RecordingNotifier::new();

        submit_login(&api, &relay, "DM1");

        let notice = relay.last().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.title, "Problème Serveur");
    }

    #[test]
    fn confirm_persists_token_and_profile_together() {
        let patient = Patient {
            name: "Ouedraogo".into(),
            prenom: "Awa".into(),
            code_patient: "DM1".into(),
            ..Default::default()
        };
        let api = MockPortal::new().with_confirm(Ok(ConfirmOk {
            token: "tok-xyz".into(),
            patient,
            message: None,
        }));
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = store();

        let route = confirm_otp(&api, &mut session, &relay, "DM1", "123456");

        assert_eq!(route, Route::Dashboard);
        assert_eq!(session.token(), Some("tok-xyz"));
        assert_eq!(session.patient().unwrap().code_patient, "DM1");
        let notice = relay.last().unwrap();
        assert_eq!(notice.title, "Connexion Réussie");
        assert_eq!(notice.message, "Bienvenue Awa Ouedraogo");
    }

    #[test]
    fn wrong_otp_stays_on_the_otp_screen() {
        let api = MockPortal::new().with_confirm(Err(ApiError::AuthInvalid {
            message: "Unauthenticated.".into(),
        }));
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = store();

        let route = confirm_otp(&api, &mut session, &relay, "DM1", "000000");

        assert_eq!(route, Route::ConfirmOtp { identifier: "DM1".into() });
        assert!(session.token().is_none());
        let notice = relay.last().unwrap();
        assert_eq!(notice.title, "Échec de la Vérification");
        assert_eq!(notice.message, "Code OTP incorrect ou expiré.");
    }

    #[test]
    fn empty_otp_never_calls_the_backend() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = store();

        confirm_otp(&api, &mut session, &relay, "DM1", "");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn resend_respects_the_cooldown() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let mut gate = ResendGate::with_cooldown(Duration::from_secs(60));

        assert!(resend_otp(&api, &relay, &mut gate, "DM1"));
        // Second attempt inside the window is gated, no network call.
        assert!(!resend_otp(&api, &relay, &mut gate, "DM1"));
        assert_eq!(api.call_count("login"), 1);
        assert_eq!(relay.last().unwrap().kind, NoticeKind::Info);
    }

    #[test]
    fn expired_cooldown_allows_resend() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let mut gate = ResendGate::with_cooldown(Duration::from_secs(0));

        assert!(resend_otp(&api, &relay, &mut gate, "DM1"));
        assert!(resend_otp(&api, &relay, &mut gate, "DM1"));
        assert_eq!(api.call_count("login"), 2);
    }

    #[test]
    fn logout_clears_local_state_even_when_backend_fails() {
        let api = MockPortal::new().with_logout(Err(ApiError::request_failed(500)));
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = store();
        session.start("tok".into(), Patient::default()).unwrap();

        let route = logout(&api, &mut session, &relay);

        assert_eq!(route, Route::Login);
        assert!(session.token().is_none());
        assert!(session.patient().is_none());
        assert_eq!(api.call_count("logout"), 1);
    }

    #[test]
    fn logout_without_token_skips_the_backend() {
        let api = MockPortal::new();
        let relay = RecordingNotifier::new();
        let (_dir, mut session) = store();

        logout(&api, &mut session, &relay);
        assert!(api.calls().is_empty());
    }
}
