use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("blob already exists: {0}")]
    AlreadyExists(String),
}
