use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfEditError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Invalid position {position} (document has {len} pages)")]
    InvalidPosition { position: usize, len: usize },

    #[error("Invalid page order: {0}")]
    InvalidOrder(String),

    #[error("Document index {0} out of bounds")]
    UnknownDocument(usize),

    #[error("Unsupported PDF: {0}")]
    Unsupported(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
