//! Error types for the zakup-core library.

use thiserror::Error;

/// Main error type for the zakup library.
///
/// Only `UnsupportedFormat` and `Decode` are ever produced by the extraction
/// pipeline itself; a structuring failure is recoverable and is consumed by
/// the fallback transition before it can reach the caller.
#[derive(Error, Debug)]
pub enum ZakupError {
    /// The declared document format cannot be decoded at all.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Document decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document decoding.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Failed to open/parse the PDF container.
    #[error("failed to parse PDF: {0}")]
    PdfParse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The DOCX container is not a readable zip archive.
    #[error("invalid DOCX container: {0}")]
    DocxContainer(String),

    /// The DOCX archive has no `word/document.xml` body.
    #[error("DOCX has no document body")]
    MissingBody,

    /// The DOCX body XML is malformed.
    #[error("malformed document XML: {0}")]
    Xml(String),
}

/// Errors related to the remote structuring service.
///
/// These are recoverable: the pipeline treats every variant the same way
/// and switches to the deterministic fallback extractor.
#[derive(Error, Debug)]
pub enum StructuringError {
    /// Could not reach the service endpoint.
    #[error("structuring service unreachable at {0}")]
    Connection(String),

    /// The request exceeded the configured timeout.
    #[error("structuring request timed out after {0}s")]
    Timeout(u64),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("structuring service error: status {status}")]
    Service { status: u16, body: String },

    /// The response carried no recognizable JSON payload.
    #[error("malformed structuring response: {0}")]
    MalformedResponse(String),

    /// The JSON payload failed to deserialize.
    #[error("failed to parse structuring JSON: {0}")]
    JsonParsing(String),

    /// The service is disabled for this pipeline instance.
    #[error("structuring service disabled")]
    Disabled,
}

/// Result type for the zakup library.
pub type Result<T> = std::result::Result<T, ZakupError>;
