/// Failure of a catalog request.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure or a non-success status.
    #[error("Network error: {0}")]
    Network(String),
    /// The request was superseded and dropped before it settled.
    #[error("Request cancelled")]
    Cancelled,
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed JSON or date in a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}
