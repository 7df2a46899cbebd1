use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorklogError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorklogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported format '{format}' (supported: {supported})")]
    UnsupportedFormat { format: String, supported: String },

    #[error("cannot render worklog: {0}")]
    Render(String),
}
