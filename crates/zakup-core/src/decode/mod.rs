//! Document decoding module.
//!
//! One decoder per supported container format, each producing raw extracted
//! text from bytes. Any other format is rejected before decoding is
//! attempted.

mod docx;
mod pdf;

pub use docx::decode_docx;
pub use pdf::decode_pdf;

#[cfg(test)]
pub(crate) use docx::build_docx;

use crate::error::{DecodeError, ZakupError};

/// Supported document container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word Open XML document.
    Docx,
}

impl DocumentFormat {
    /// Map a declared MIME type to a supported format.
    pub fn from_mime(mime: &str) -> Result<Self, ZakupError> {
        match mime.trim().to_lowercase().as_str() {
            "application/pdf" => Ok(DocumentFormat::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(DocumentFormat::Docx)
            }
            other => Err(ZakupError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Map a file extension to a supported format.
    pub fn from_extension(ext: &str) -> Result<Self, ZakupError> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(ZakupError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Decode raw document bytes into extracted text.
///
/// A decode error is terminal for the document; the pipeline never retries
/// across formats.
pub fn decode(data: &[u8], format: DocumentFormat) -> Result<String, DecodeError> {
    match format {
        DocumentFormat::Pdf => decode_pdf(data),
        DocumentFormat::Docx => decode_docx(data),
    }
}
