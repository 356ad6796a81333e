use std::cell::RefCell;

use serde_json::{json, Value};

use super::error::ApiError;
use super::payload;
use super::types::{Attachment, ConfirmOk, LoginAck, NewRendezVous, ProfileUpdate};
use super::PortalApi;
use crate::config;
use crate::models::{Consultation, Declaration, Doctor, Patient, RendezVous};

/// HTTP client for the Gemma patient API.
///
/// Blocking by design: controllers run off the shell's render thread and
/// one screen never has two requests in flight. Timeouts are left to the
/// transport's defaults — the application enforces no deadline of its own.
pub struct HttpPortalClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpPortalClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client pointed at the production Gemma backend.
    pub fn default_remote() -> Self {
        Self::new(config::API_BASE_URL)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read(response: reqwest::blocking::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let text = response.text()?;
        payload::classify(status, &text)
    }

    fn get(&self, path: &str, token: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()?;
        Self::read(response)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.client.post(self.url(path)).json(body).send()?;
        Self::read(response)
    }
}

/// Profile-update fields with the backend's names applied.
pub(crate) fn remapped_fields(update: &ProfileUpdate) -> Vec<(String, String)> {
    update
        .fields
        .iter()
        .map(|(name, value)| (config::backend_field_name(name).to_string(), value.clone()))
        .collect()
}

fn attachment_part(attachment: &Attachment) -> reqwest::blocking::multipart::Part {
    reqwest::blocking::multipart::Part::bytes(attachment.bytes.clone())
        .file_name(attachment.filename.clone())
}

impl PortalApi for HttpPortalClient {
    fn login(&self, code: &str) -> Result<LoginAck, ApiError> {
        let body = self.post_json("/v1/patient/login", &json!({ "code": code }))?;
        Ok(LoginAck {
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    fn confirm(&self, code: &str, otp: &str) -> Result<ConfirmOk, ApiError> {
        let body = self.post_json(
            "/v1/patient/confirm",
            &json!({ "code": code, "password": otp }),
        )?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(ApiError::invalid_body)?
            .to_string();
        let patient = payload::extract_object(&body, &["patient"])
            .map(Patient::from_value)
            .ok_or_else(ApiError::invalid_body)?;
        Ok(ConfirmOk {
            token,
            patient,
            message: body.get("message").and_then(Value::as_str).map(String::from),
        })
    }

    fn show_profile(&self, token: &str) -> Result<Patient, ApiError> {
        let body = self.get("/v1/patient/show", token)?;
        payload::extract_object(&body, &["patient", "data"])
            .map(Patient::from_value)
            .ok_or_else(ApiError::invalid_body)
    }

    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<Patient>, ApiError> {
        let mut form = reqwest::blocking::multipart::Form::new();
        for (name, value) in remapped_fields(update) {
            form = form.text(name, value);
        }
        if let Some(photo) = &update.photo {
            form = form.part("image", attachment_part(photo));
        }

        let response = self
            .client
            .post(self.url("/v1/patient/update"))
            .bearer_auth(token)
            .multipart(form)
            .send()?;
        let body = Self::read(response)?;
        Ok(payload::extract_object(&body, &["patient", "data"]).map(Patient::from_value))
    }

    fn consultations(&self, token: &str) -> Result<Vec<Consultation>, ApiError> {
        let body = self.get("/v1/patient/consultations", token)?;
        Ok(payload::extract_list(&body, &["consultations"])
            .iter()
            .map(|raw| Consultation::from_value(raw, &[]))
            .collect())
    }

    fn doctors(&self, token: &str) -> Result<Vec<Doctor>, ApiError> {
        let body = self.get("/v1/patient/doctors", token)?;
        Ok(payload::extract_list(&body, &["doctors"])
            .iter()
            .filter_map(Doctor::from_value)
            .collect())
    }

    fn rendezvous(&self, token: &str) -> Result<Vec<RendezVous>, ApiError> {
        let body = self.get("/v1/patient/rdv", token)?;
        Ok(payload::extract_list(&body, &["rdv", "rendezvous"])
            .iter()
            .map(|raw| RendezVous::from_value(raw, &[]))
            .collect())
    }

    fn create_rendezvous(&self, token: &str, rdv: &NewRendezVous) -> Result<(), ApiError> {
        let mut form = reqwest::blocking::multipart::Form::new()
            .text("title", rdv.title.clone())
            .text("date", rdv.date.clone())
            .text("heure", rdv.heure.clone())
            .text("doctor_id", rdv.doctor_id.to_string())
            .text("motif", rdv.motif.clone());
        if let Some(notes) = &rdv.notes {
            form = form.text("notes", notes.clone());
        }
        if let Some(attachment) = &rdv.attachment {
            form = form.part("image", attachment_part(attachment));
        }

        let response = self
            .client
            .post(self.url("/v1/patient/rdv/create"))
            .bearer_auth(token)
            .multipart(form)
            .send()?;
        Self::read(response).map(|_| ())
    }

    fn delete_rendezvous(&self, token: &str, id: i64) -> Result<(), ApiError> {
        // The backend deletes on a GET of the rendez-vous resource.
        self.get(&format!("/v1/patient/rdv/{id}"), token).map(|_| ())
    }

    fn declarations(&self, token: &str) -> Result<Vec<Declaration>, ApiError> {
        let body = self.get("/v1/patient/declarations", token)?;
        Ok(payload::extract_list(&body, &["declarations"])
            .iter()
            .map(Declaration::from_value)
            .collect())
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/v1/patient/logout"))
            .bearer_auth(token)
            .send()?;
        Self::read(response).map(|_| ())
    }
}

/// Mock backend for screen tests — every endpoint returns a configured
/// result and records that it was called, so tests can assert both
/// outcomes and "no network call was made".
pub struct MockPortal {
    calls: RefCell<Vec<&'static str>>,
    login: Result<LoginAck, ApiError>,
    confirm: Result<ConfirmOk, ApiError>,
    profile: Result<Patient, ApiError>,
    update: Result<Option<Patient>, ApiError>,
    consultations: Result<Vec<Consultation>, ApiError>,
    doctors: Result<Vec<Doctor>, ApiError>,
    rendezvous: Result<Vec<RendezVous>, ApiError>,
    create: Result<(), ApiError>,
    delete: Result<(), ApiError>,
    declarations: Result<Vec<Declaration>, ApiError>,
    logout: Result<(), ApiError>,
}

impl Default for MockPortal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortal {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            login: Ok(LoginAck { message: "Code envoyé".into() }),
            confirm: Ok(ConfirmOk {
                token: "mock-token".into(),
                patient: Patient::default(),
                message: None,
            }),
            profile: Ok(Patient::default()),
            update: Ok(None),
            consultations: Ok(Vec::new()),
            doctors: Ok(Vec::new()),
            rendezvous: Ok(Vec::new()),
            create: Ok(()),
            delete: Ok(()),
            declarations: Ok(Vec::new()),
            logout: Ok(()),
        }
    }

    pub fn with_login(mut self, result: Result<LoginAck, ApiError>) -> Self {
        self.login = result;
        self
    }

    pub fn with_confirm(mut self, result: Result<ConfirmOk, ApiError>) -> Self {
        self.confirm = result;
        self
    }

    pub fn with_profile(mut self, result: Result<Patient, ApiError>) -> Self {
        self.profile = result;
        self
    }

    pub fn with_update(mut self, result: Result<Option<Patient>, ApiError>) -> Self {
        self.update = result;
        self
    }

    pub fn with_consultations(mut self, result: Result<Vec<Consultation>, ApiError>) -> Self {
        self.consultations = result;
        self
    }

    pub fn with_doctors(mut self, doctors: Vec<Doctor>) -> Self {
        self.doctors = Ok(doctors);
        self
    }

    pub fn with_rendezvous(mut self, result: Result<Vec<RendezVous>, ApiError>) -> Self {
        self.rendezvous = result;
        self
    }

    pub fn with_create(mut self, result: Result<(), ApiError>) -> Self {
        self.create = result;
        self
    }

    pub fn with_delete(mut self, result: Result<(), ApiError>) -> Self {
        self.delete = result;
        self
    }

    pub fn with_declarations(mut self, result: Result<Vec<Declaration>, ApiError>) -> Self {
        self.declarations = result;
        self
    }

    pub fn with_logout(mut self, result: Result<(), ApiError>) -> Self {
        self.logout = result;
        self
    }

    /// Endpoint names called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == endpoint).count()
    }

    fn record(&self, endpoint: &'static str) {
        self.calls.borrow_mut().push(endpoint);
    }
}

impl PortalApi for MockPortal {
    fn login(&self, _code: &str) -> Result<LoginAck, ApiError> {
        self.record("login");
        self.login.clone()
    }

    fn confirm(&self, _code: &str, _otp: &str) -> Result<ConfirmOk, ApiError> {
        self.record("confirm");
        self.confirm.clone()
    }

    fn show_profile(&self, _token: &str) -> Result<Patient, ApiError> {
        self.record("show");
        self.profile.clone()
    }

    fn update_profile(
        &self,
        _token: &str,
        _update: &ProfileUpdate,
    ) -> Result<Option<Patient>, ApiError> {
        self.record("update");
        self.update.clone()
    }

    fn consultations(&self, _token: &str) -> Result<Vec<Consultation>, ApiError> {
        self.record("consultations");
        self.consultations.clone()
    }

    fn doctors(&self, _token: &str) -> Result<Vec<Doctor>, ApiError> {
        self.record("doctors");
        self.doctors.clone()
    }

    fn rendezvous(&self, _token: &str) -> Result<Vec<RendezVous>, ApiError> {
        self.record("rdv");
        self.rendezvous.clone()
    }

    fn create_rendezvous(&self, _token: &str, _rdv: &NewRendezVous) -> Result<(), ApiError> {
        self.record("rdv/create");
        self.create.clone()
    }

    fn delete_rendezvous(&self, _token: &str, _id: i64) -> Result<(), ApiError> {
        self.record("rdv/delete");
        self.delete.clone()
    }

    fn declarations(&self, _token: &str) -> Result<Vec<Declaration>, ApiError> {
        self.record("declarations");
        self.declarations.clone()
    }

    fn logout(&self, _token: &str) -> Result<(), ApiError> {
        self.record("logout");
        self.logout.clone()
    }
}
