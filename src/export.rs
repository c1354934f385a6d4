//! Export functionality for workbooks
//!
//! PDF rendering is not wired up yet. An export currently produces the payload
//! a renderer would consume (layout settings plus the block sequence), logs it,
//! and can write it to disk as JSON.

use crate::error::{ExportError, ExportResult};
use crate::state::{AppWorkspaceState, DocumentSettings, WorkbookBlock};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name prefix of written export payloads
pub const EXPORT_FILE_PREFIX: &str = "workbook-export";

/// Snapshot handed to the PDF renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportPayload {
    pub generated_at_iso_timestamp: String,
    pub document_settings: DocumentSettings,
    pub workbook_blocks: Vec<WorkbookBlock>,
    #[serde(skip)]
    generated_at: DateTime<Utc>,
}

impl PdfExportPayload {
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// File name the payload is written under
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            EXPORT_FILE_PREFIX,
            self.generated_at.format("%Y%m%dT%H%M%S%3fZ")
        )
    }
}

/// Build the export payload for `state`, stamped with the current time
pub fn create_pdf_export_payload(state: &AppWorkspaceState) -> PdfExportPayload {
    create_pdf_export_payload_at(state, Utc::now())
}

/// Build the export payload for `state`, stamped with `generated_at`
pub fn create_pdf_export_payload_at(state: &AppWorkspaceState, generated_at: DateTime<Utc>) -> PdfExportPayload {
    PdfExportPayload {
        generated_at_iso_timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        document_settings: state.document_settings.clone(),
        workbook_blocks: state.workbook_blocks.clone(),
        generated_at,
    }
}

/// Build the payload and log it in place of a real PDF export
pub fn export_workbook_pdf_placeholder(state: &AppWorkspaceState) -> PdfExportPayload {
    let payload = create_pdf_export_payload(state);
    match serde_json::to_string(&payload) {
        Ok(json) => log::info!("PDF export placeholder payload: {}", json),
        Err(e) => log::warn!("Could not encode export payload for logging: {}", e),
    }
    payload
}

/// Write `payload` into `directory` and return the written path
///
/// The directory is created when missing.
pub fn write_export_payload(payload: &PdfExportPayload, directory: &Path, pretty: bool) -> ExportResult<PathBuf> {
    if directory.exists() && !directory.is_dir() {
        return Err(ExportError::InvalidPath(directory.to_path_buf()));
    }
    fs::create_dir_all(directory)?;

    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    let output_path = directory.join(payload.file_name());
    let mut file = fs::File::create(&output_path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;

    log::info!("Wrote export payload to {:?}", output_path);
    Ok(output_path)
}
