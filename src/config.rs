use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Espace Patient";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of the Gemma Sante REST API (no trailing slash).
pub const API_BASE_URL: &str = "https://gestpatients-bf.com/api";

/// Root of the backend site, used for asset URLs outside `/api`.
pub const SITE_BASE_URL: &str = "https://gestpatients-bf.com";

/// Where patient profile photos are served from when the backend returns
/// a bare filename instead of a full URL.
pub const PATIENT_PHOTO_BASE: &str =
    "https://gestpatients-bf.com/assets/uploads/patient";

/// URL template for the medical-card QR payload; the patient code is
/// appended as the last path segment.
pub const PATIENT_INFO_URL: &str = "https://gestpatients-bf.com/patient/info";

/// Maximum attachment/photo upload size accepted client-side (2 MB).
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Seconds a patient must wait before the OTP code can be re-sent.
pub const OTP_RESEND_COOLDOWN_SECS: u64 = 60;

/// Profile-update fields whose names differ between this client and the
/// backend. The backend expects the right-hand names; the table is kept as
/// data rather than scattered through the submit path.
pub const PROFILE_FIELD_REMAP: &[(&str, &str)] = &[
    ("telephone", "contact1"),
    ("address", "adresse"),
    ("residence_actuelle_id", "residence_actuelle"),
    ("residence_habituelle_id", "residence_habituelle"),
    ("nom_personne_cas_urgence", "nom_persn_sos"),
    ("telephone_personne_cas_urgence", "tel_persn_sos"),
    ("lien_personne_cas_urgence", "lien_persn_sos"),
    ("nom_personne2_cas_urgence", "nom_persn_sos2"),
    ("telephone_personne2_cas_urgence", "tel_persn_sos2"),
    ("lien_personne2_cas_urgence", "lien_persn_sos2"),
];

/// Backend field name for a client-side form field, applying the remap
/// table. Unmapped fields keep their own name.
pub fn backend_field_name(client_name: &str) -> &str {
    PROFILE_FIELD_REMAP
        .iter()
        .find(|(from, _)| *from == client_name)
        .map(|(_, to)| *to)
        .unwrap_or(client_name)
}

/// Get the application data directory
/// ~/EspacePatient/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("EspacePatient")
}

/// Path of the persisted session state file (token + profile snapshot).
pub fn session_file() -> PathBuf {
    app_data_dir().join("session.json")
}

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "info,espace_patient=debug".to_string()
}
