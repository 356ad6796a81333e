//! Error taxonomy for backend calls.
//!
//! Every failure a screen can see is one of these variants. The `Display`
//! text is the user-facing message handed to the notification relay, so
//! variants carry backend-provided text verbatim when it exists.

/// Outcome classification for a portal API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No stored credential — the screen should prompt for login.
    #[error("Veuillez vous connecter")]
    AuthMissing,

    /// The backend rejected the bearer token (401/403). Soft failure:
    /// screens surface it but do not force a logout on their own.
    #[error("{message}")]
    AuthInvalid { message: String },

    /// Client-side validation failed; the request never left the client.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status and a readable JSON body.
    /// `message` is the backend's own text when present, a generic
    /// fallback otherwise.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// No response at all, or a body that is not JSON (e.g. an HTML error
    /// page). The message distinguishes the two cases.
    #[error("{0}")]
    NetworkUnreachable(String),
}

impl ApiError {
    /// Message for a connection-level failure.
    pub fn unreachable() -> Self {
        ApiError::NetworkUnreachable(
            "Impossible de se connecter au serveur API. Vérifiez votre connexion.".into(),
        )
    }

    /// Message for a response whose body could not be parsed as JSON.
    pub fn invalid_body() -> Self {
        ApiError::NetworkUnreachable(
            "Le serveur a retourné une réponse invalide.".into(),
        )
    }

    /// Generic fallback for a non-2xx response without a usable message.
    pub fn request_failed(status: u16) -> Self {
        ApiError::RequestFailed {
            status,
            message: format!("Une erreur est survenue (HTTP {status})."),
        }
    }

    /// Whether the auth credential was rejected or absent.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::AuthMissing | ApiError::AuthInvalid { .. })
    }

    /// The text shown to the patient.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            tracing::warn!(error = %err, "backend unreachable");
            ApiError::unreachable()
        } else if err.is_decode() {
            tracing::warn!(error = %err, "backend returned an unparseable body");
            ApiError::invalid_body()
        } else {
            tracing::warn!(error = %err, "request failed before a response arrived");
            ApiError::unreachable()
        }
    }
}
