use serde::{Deserialize, Serialize};

/// A page edit submitted as JSON by a front-end or the CLI.
/// Positions are 0-based display positions; `DeleteRange` takes a 1-based
/// range string like "2, 4-5".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageCommand {
    Move { from: usize, to: usize },
    Delete { position: usize },
    DeleteRange { range: String },
    Rotate { position: usize, degrees: i32 },
    Reorder { order: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
}

/// Output of an export: the PDF bytes plus what it took to build them
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    pub bytes: Vec<u8>,
    pub metrics: ExportMetrics,
}

/// Parse a JSON array of commands
pub fn parse_commands(json: &str) -> Result<Vec<PageCommand>, crate::PdfEditError> {
    serde_json::from_str(json).map_err(|e| crate::PdfEditError::SerializationError(e.to_string()))
}
