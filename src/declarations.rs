//! Declarations screen: list, filters, and the PDF export.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::api::{ApiError, PortalApi};
use crate::dates;
use crate::models::{Declaration, DeclarationCategory};
use crate::screen::ScreenState;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationFilter {
    #[default]
    All,
    /// Last three months.
    Recent,
    Medical,
    Administrative,
}

#[derive(Default)]
pub struct DeclarationsScreen {
    pub state: ScreenState<Vec<Declaration>>,
    pub filter: DeclarationFilter,
    pub query: String,
}

impl DeclarationsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the declarations. Also the retry action after a failure.
    pub fn load(&mut self, api: &impl PortalApi, session: &SessionStore) {
        let Some(token) = session.token() else {
            self.state = ScreenState::Failed(ApiError::AuthMissing.user_message());
            return;
        };
        self.state = ScreenState::Loading;
        self.state = match api.declarations(token) {
            Ok(list) => {
                tracing::debug!(count = list.len(), "declarations loaded");
                ScreenState::Loaded(list)
            }
            // A rejected token renders the same prompt as a missing one.
            Err(err) if err.is_auth() => {
                ScreenState::Failed(ApiError::AuthMissing.user_message())
            }
            Err(err) => ScreenState::Failed(err.user_message()),
        };
    }

    /// Rows after the category filter and the search box. Search matches
    /// type label, description, reference, doctor, and hospital.
    pub fn visible(&self, today: NaiveDate) -> Vec<&Declaration> {
        let query = self.query.trim().to_lowercase();
        let Some(list) = self.state.data() else { return Vec::new() };
        list.iter()
            .filter(|d| match self.filter {
                DeclarationFilter::All => true,
                DeclarationFilter::Recent => d
                    .created_at
                    .as_deref()
                    .or(d.date.as_deref())
                    .map(|raw| dates::is_recent(raw, today))
                    .unwrap_or(false),
                DeclarationFilter::Medical => d.category() == DeclarationCategory::Medical,
                DeclarationFilter::Administrative => {
                    d.category() == DeclarationCategory::Administrative
                }
            })
            .filter(|d| {
                if query.is_empty() {
                    return true;
                }
                d.type_label().to_lowercase().contains(&query)
                    || d.doctor_name.to_lowercase().contains(&query)
                    || d.hospital_name.to_lowercase().contains(&query)
                    || d.description
                        .as_deref()
                        .map(|s| s.to_lowercase().contains(&query))
                        .unwrap_or(false)
                    || d.reference
                        .as_deref()
                        .map(|s| s.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }
}

/// Errors while writing the export PDF.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Impossible d'écrire le fichier PDF: {0}")]
    Io(#[from] std::io::Error),
    #[error("Impossible de générer le PDF: {0}")]
    Pdf(String),
}

/// Export one declaration as a single-page A4 PDF.
///
/// Returns the path of the written file, named
/// `declaration_{type}_{timestamp_ms}.pdf` under `output_dir`.
pub fn export_pdf(declaration: &Declaration, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new("Déclaration", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;

    let mut y = Mm(272.0);

    // Header
    layer.use_text("GEMMA SANTÉ", 18.0, Mm(20.0), y, &bold);
    y -= Mm(7.0);
    layer.use_text("Plateforme de Gestion Hospitalière", 10.0, Mm(20.0), y, &font);
    y -= Mm(16.0);
    layer.use_text("DÉCLARATION", 14.0, Mm(20.0), y, &bold);
    y -= Mm(12.0);

    let date_text = declaration
        .date
        .as_deref()
        .or(declaration.created_at.as_deref())
        .and_then(dates::midnight)
        .map(dates::format_long_fr)
        .unwrap_or_else(|| "Non spécifiée".into());

    write_row(&layer, &bold, &font, "Type", &declaration.type_label(), &mut y);
    write_row(&layer, &bold, &font, "Date", &date_text, &mut y);
    write_row(&layer, &bold, &font, "Statut", declaration.status_label(), &mut y);
    write_row(&layer, &bold, &font, "Médecin", &declaration.doctor_name, &mut y);
    write_row(&layer, &bold, &font, "Établissement", &declaration.hospital_name, &mut y);
    if let Some(reference) = &declaration.reference {
        write_row(&layer, &bold, &font, "Référence", reference, &mut y);
    }
    if let Some(description) = &declaration.description {
        write_row(&layer, &bold, &font, "Description", description, &mut y);
    }
    if let Some(notes) = &declaration.notes {
        write_row(&layer, &bold, &font, "Notes", notes, &mut y);
    }

    // Footer
    let generated = chrono::Local::now();
    let footer = format!(
        "Document généré le {} - © Gemma Santé",
        dates::format_short_fr(generated.date_naive())
    );
    layer.use_text(&footer, 8.0, Mm(20.0), Mm(15.0), &font);
    layer.use_text("Page 1 / 1", 8.0, Mm(175.0), Mm(15.0), &font);

    let path = output_dir.join(export_filename(declaration, generated.timestamp_millis()));
    let mut writer = BufWriter::new(File::create(&path)?);
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(format!("PDF save error: {e}")))?;
    tracing::info!(path = %path.display(), "declaration exported");
    Ok(path)
}

fn write_row(
    layer: &PdfLayerReference,
    bold: &IndirectFontRef,
    font: &IndirectFontRef,
    label: &str,
    value: &str,
    y: &mut Mm,
) {
    layer.use_text(format!("{label} :"), 10.0, Mm(20.0), *y, bold);
    for line in wrap_text(value, 70) {
        layer.use_text(&line, 10.0, Mm(60.0), *y, font);
        *y -= Mm(5.5);
    }
    *y -= Mm(2.5);
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// `declaration_{type}_{timestamp_ms}.pdf`, type lowercased.
pub fn export_filename(declaration: &Declaration, timestamp_ms: i64) -> String {
    format!(
        "declaration_{}_{timestamp_ms}.pdf",
        declaration.type_label().to_lowercase().replace(' ', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPortal;
    use crate::models::Patient;
    use serde_json::json;

    fn session_with_token() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(dir.path().join("s.json")).unwrap();
        store.start("tok".into(), Patient::default()).unwrap();
        (dir, store)
    }

    fn decl(raw: serde_json::Value) -> Declaration {
        Declaration::from_value(&raw)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn load_without_session_prompts_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("s.json")).unwrap();
        let api = MockPortal::new();
        let mut screen = DeclarationsScreen::new();

        screen.load(&api, &session);

        assert_eq!(screen.state.error(), Some("Veuillez vous connecter"));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn rejected_token_prompts_for_login_and_allows_retry() {
        let (_dir, session) = session_with_token();
        let api = MockPortal::new().with_declarations(Err(ApiError::AuthInvalid {
            message: "Unauthenticated.".into(),
        }));
        let mut screen = DeclarationsScreen::new();

        screen.load(&api, &session);
        assert_eq!(screen.state.error(), Some("Veuillez vous connecter"));

        // Retry with a fresh token succeeds.
        let api = MockPortal::new()
            .with_declarations(Ok(vec![decl(json!({"type": "birth"}))]));
        screen.load(&api, &session);
        assert_eq!(screen.state.data().unwrap().len(), 1);
    }

    #[test]
    fn category_filters_split_medical_and_administrative() {
        let mut screen = DeclarationsScreen::new();
        screen.state = ScreenState::Loaded(vec![
            decl(json!({"type": "hospitalisation"})),
            decl(json!({"type": "certificat"})),
            decl(json!({"type": "birth"})),
        ]);
        let today = d(2025, 6, 15);

        screen.filter = DeclarationFilter::Medical;
        assert_eq!(screen.visible(today).len(), 1);
        screen.filter = DeclarationFilter::Administrative;
        assert_eq!(screen.visible(today).len(), 1);
        screen.filter = DeclarationFilter::All;
        assert_eq!(screen.visible(today).len(), 3);
    }

    #[test]
    fn recent_filter_uses_created_at_then_date() {
        let mut screen = DeclarationsScreen::new();
        screen.state = ScreenState::Loaded(vec![
            decl(json!({"type": "birth", "created_at": "2025-05-20"})),
            decl(json!({"type": "death", "date": "2024-01-01"})),
        ]);
        screen.filter = DeclarationFilter::Recent;

        let visible = screen.visible(d(2025, 6, 15));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].type_label(), "Naissance");
    }

    #[test]
    fn search_matches_translated_type_label() {
        let mut screen = DeclarationsScreen::new();
        screen.state = ScreenState::Loaded(vec![
            decl(json!({"type": "birth"})),
            decl(json!({"type": "certificat", "hospital": "CHU Yalgado"})),
        ]);
        let today = d(2025, 6, 15);

        screen.query = "naissance".into();
        assert_eq!(screen.visible(today).len(), 1);
        screen.query = "yalgado".into();
        assert_eq!(screen.visible(today).len(), 1);
    }

    #[test]
    fn export_writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let declaration = decl(json!({
            "type": "birth",
            "date": "2025-03-07",
            "status": "validé",
            "reference": "REF-2025-0042",
            "hospital": {"label": "CHU Yalgado"},
            "doctor": {"user": {"name": "Sawadogo", "prenom": "Paul"}},
        }));

        let path = export_pdf(&declaration, dir.path()).unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("declaration_naissance_"));
        assert!(name.ends_with(".pdf"));
        // A PDF file starts with the %PDF magic.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
    }

    #[test]
    fn wrap_text_splits_on_word_boundaries() {
        let lines = wrap_text("un deux trois quatre", 9);
        assert_eq!(lines, vec!["un deux", "trois", "quatre"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn export_filename_lowercases_the_type() {
        let declaration = decl(json!({"type": "Certificat Médical"}));
        assert_eq!(
            export_filename(&declaration, 1700000000000),
            "declaration_certificat_médical_1700000000000.pdf"
        );
    }
}
