use thiserror::Error;

use crate::flow::FlowError;

/// Errors produced while turning a document config into a PDF.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Layout failed: {0}")]
    Layout(#[from] FlowError),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, Error>;
