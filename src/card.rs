//! Digital medical card.
//!
//! Two faces: the front shows identity and the patient code, the back a
//! QR code that opens the patient's public info page when a hospital
//! scans it. The card is derived entirely from the cached profile, so it
//! works offline.

use crate::config;
use crate::models::Patient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFace {
    #[default]
    Front,
    Back,
}

impl CardFace {
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedicalCard {
    pub face: CardFace,
}

impl MedicalCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flip(&mut self) {
        self.face = self.face.flipped();
    }
}

/// URL encoded in the QR code: the public info page for this patient.
pub fn qr_payload(patient: &Patient) -> String {
    format!("{}/{}", config::PATIENT_INFO_URL, patient.code_patient)
}

/// Render the card's QR code as an SVG string.
pub fn qr_svg(patient: &Patient) -> Result<String, String> {
    use qrcode::render::svg;
    use qrcode::QrCode;

    let payload = qr_payload(patient);
    let code =
        QrCode::new(payload.as_bytes()).map_err(|e| format!("QR generation failed: {e}"))?;

    let svg_string = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .max_dimensions(300, 300)
        .dark_color(svg::Color("#1c1917"))
        .light_color(svg::Color("#ffffff"))
        .quiet_zone(true)
        .build();

    Ok(svg_string)
}
