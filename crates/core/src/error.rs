#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Font error: {0}")]
    Font(String),
}
