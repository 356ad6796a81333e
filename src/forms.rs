//! Client-side form validation.
//!
//! Every rule returns the French message the screen renders under the
//! field, or `None` when the value passes. Screens run all rules before
//! any network call so an invalid form never leaves the client.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::config;
use crate::dates;

pub const MSG_REQUIRED: &str = "Ce champ est requis";
pub const MSG_PHONE: &str = "Numéro invalide (10 chiffres)";
pub const MSG_EMAIL: &str = "Email invalide";
pub const MSG_PAST_DATE: &str = "La date ne peut pas être dans le passé";
pub const MSG_BIRTH_DATE: &str = "Date de naissance invalide";
pub const MSG_PASSWORD_SHORT: &str = "Le mot de passe doit contenir au moins 4 caractères";
pub const MSG_PASSWORD_MISMATCH: &str = "Les mots de passe ne correspondent pas";
pub const MSG_FILE_TOO_LARGE: &str = "Le fichier est trop volumineux (max 2MB)";

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{10}$").unwrap())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn required(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(MSG_REQUIRED)
}

/// Phone numbers are exactly ten digits. Empty is accepted — pair with
/// [`required`] on mandatory fields.
pub fn phone(value: &str) -> Option<&'static str> {
    let value = value.trim();
    (!value.is_empty() && !phone_re().is_match(value)).then_some(MSG_PHONE)
}

pub fn email(value: &str) -> Option<&'static str> {
    let value = value.trim();
    (!value.is_empty() && !email_re().is_match(value)).then_some(MSG_EMAIL)
}

/// A date that must be today or later (rendez-vous booking).
pub fn not_past(value: &str, today: NaiveDate) -> Option<&'static str> {
    match dates::midnight(value) {
        Some(date) if date < today => Some(MSG_PAST_DATE),
        Some(_) => None,
        None => Some(MSG_PAST_DATE),
    }
}

/// A birth date must parse and not be in the future.
pub fn birth_date(value: &str, today: NaiveDate) -> Option<&'static str> {
    if value.trim().is_empty() {
        return None;
    }
    match dates::midnight(value) {
        Some(date) if date <= today => None,
        _ => Some(MSG_BIRTH_DATE),
    }
}

pub fn password(value: &str) -> Option<&'static str> {
    (value.chars().count() < 4).then_some(MSG_PASSWORD_SHORT)
}

pub fn password_confirmation(value: &str, confirmation: &str) -> Option<&'static str> {
    (value != confirmation).then_some(MSG_PASSWORD_MISMATCH)
}

/// Upload size gate (2 MB), applied to photos and rendez-vous attachments.
pub fn attachment_size(size: u64) -> Option<&'static str> {
    (size > config::MAX_UPLOAD_BYTES).then_some(MSG_FILE_TOO_LARGE)
}

/// Per-field validation errors collected during one submit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(String, String)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one rule against one field, recording the failure if any.
    pub fn check(&mut self, field: &str, outcome: Option<&str>) {
        if let Some(message) = outcome {
            self.errors.push((field.to_string(), message.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|(_, m)| m.as_str())
    }
}
