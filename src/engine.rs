use crate::components::ConnectionOverflow;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Glyph catalog error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid glyph catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Overflow(#[from] ConnectionOverflow),

    #[error("Cannot identify dose screen vendor: {0}")]
    UnidentifiedSource(String),

    #[error("Training error: {0}")]
    Training(String),
}

impl EngineError {
    /// True when the failure only concerns the image being processed and a
    /// batch should go on with the next one.
    pub fn is_page_local(&self) -> bool {
        matches!(self, EngineError::Overflow(_))
    }
}
