//! Document types and upload validation

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, IncapacityId};

use crate::error::IncapacityError;

/// Largest accepted upload, 10 MiB
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// File extensions the upload check accepts, lowercase
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Kind of supporting document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Physician-issued incapacity certificate
    MedicalCertificate,
    /// Hospital discharge summary
    Epicrisis,
    /// Traffic accident insurance form
    Furips,
    /// Live birth certificate
    LiveBirthCertificate,
    /// Civil registry entry for the newborn
    CivilRegistry,
    /// Identity document of the mother
    MotherIdentityDocument,
}

impl DocumentKind {
    /// All document kinds
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::MedicalCertificate,
        DocumentKind::Epicrisis,
        DocumentKind::Furips,
        DocumentKind::LiveBirthCertificate,
        DocumentKind::CivilRegistry,
        DocumentKind::MotherIdentityDocument,
    ];

    /// Canonical string form, used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::MedicalCertificate => "medical_certificate",
            DocumentKind::Epicrisis => "epicrisis",
            DocumentKind::Furips => "furips",
            DocumentKind::LiveBirthCertificate => "live_birth_certificate",
            DocumentKind::CivilRegistry => "civil_registry",
            DocumentKind::MotherIdentityDocument => "mother_identity_document",
        }
    }

    /// Human-readable name for notification copy
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::MedicalCertificate => "medical certificate",
            DocumentKind::Epicrisis => "epicrisis",
            DocumentKind::Furips => "FURIPS form",
            DocumentKind::LiveBirthCertificate => "live birth certificate",
            DocumentKind::CivilRegistry => "civil registry",
            DocumentKind::MotherIdentityDocument => "mother's identity document",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = IncapacityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| {
                IncapacityError::InvalidDocument(format!("unknown document kind '{s}'"))
            })
    }
}

/// A document attached to an incapacity claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub incapacity_id: IncapacityId,
    pub kind: DocumentKind,
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Creates a stored-document record for an accepted upload
    pub fn new(incapacity_id: IncapacityId, submission: &SubmittedDocument) -> Self {
        Self {
            id: DocumentId::new_v7(),
            incapacity_id,
            kind: submission.kind,
            file_name: submission.file_name.clone(),
            size_bytes: submission.size_bytes,
            uploaded_at: Utc::now(),
        }
    }
}

/// An upload offered by the claimant, not yet accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedDocument {
    pub kind: DocumentKind,
    pub file_name: String,
    pub size_bytes: u64,
}

impl SubmittedDocument {
    pub fn new(kind: DocumentKind, file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            size_bytes,
        }
    }

    /// Checks extension and size limits
    ///
    /// Rejects uploads with a missing or unknown extension and uploads over
    /// [`MAX_DOCUMENT_BYTES`]. Matching is case-insensitive.
    pub fn validate(&self) -> Result<(), IncapacityError> {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(IncapacityError::InvalidDocument(format!(
                "extension '.{extension}' not accepted for '{}', use one of: {}",
                self.file_name,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        if self.size_bytes > MAX_DOCUMENT_BYTES {
            return Err(IncapacityError::InvalidDocument(format!(
                "'{}' is {} bytes, limit is {} bytes",
                self.file_name, self.size_bytes, MAX_DOCUMENT_BYTES
            )));
        }
        Ok(())
    }
}
