//! Binary attachments, regular or inline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MailError;

/// Content disposition of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Regular attachment (shown as downloadable file)
    #[default]
    Attachment,
    /// Inline attachment (embedded in HTML via cid:)
    Inline,
}

impl Disposition {
    /// The header token for this disposition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

/// A file carried alongside the message.
///
/// ```
/// use postmark_transport::Attachment;
///
/// let report = Attachment::from_bytes("report.pdf", b"PDF content".to_vec());
/// assert_eq!(report.content_type, "application/pdf");
///
/// // Referenced from HTML as <img src="cid:company-logo">
/// let logo = Attachment::from_bytes("logo.png", vec![0x89, 0x50, 0x4E, 0x47])
///     .inline()
///     .id("company-logo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename for the attachment
    pub filename: String,
    /// MIME content type (e.g., "application/pdf", "image/png")
    pub content_type: String,
    /// Raw attachment data
    pub data: Vec<u8>,
    pub disposition: Disposition,
    /// Content identifier for cid: references
    pub id: Option<String>,
}

impl Attachment {
    /// Create a new attachment from raw bytes.
    ///
    /// Content type is guessed from the filename extension.
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self {
            filename,
            content_type,
            data,
            disposition: Disposition::Attachment,
            id: None,
        }
    }

    /// Create a new attachment by reading a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MailError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let data = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::AttachmentFileNotFound(path.display().to_string())
            } else {
                MailError::AttachmentReadError(format!("{}: {}", path.display(), e))
            }
        })?;

        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self {
            filename,
            content_type,
            data,
            disposition: Disposition::Attachment,
            id: None,
        })
    }

    /// Set the content type explicitly.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Mark as inline. The filename doubles as the id unless one is set.
    pub fn inline(mut self) -> Self {
        self.disposition = Disposition::Inline;
        if self.id.is_none() {
            self.id = Some(self.filename.clone());
        }
        self
    }

    /// Set the content identifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Standard base64 (padded) encoding of the data.
    pub fn base64_data(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// The `cid:` reference for this attachment, if it is addressable.
    ///
    /// Only non-`attachment` dispositions with an id have one.
    pub fn content_id(&self) -> Option<String> {
        match (self.disposition, &self.id) {
            (Disposition::Attachment, _) => None,
            (_, Some(id)) => Some(format!("cid:{}", id)),
            (_, None) => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.disposition == Disposition::Inline
    }
}
