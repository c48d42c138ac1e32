use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}
