use crate::error::BlobError;

/// BlobStore provides storage for uploaded files.
///
/// Keys are plain file names: `cat.jpg`, `cat3.jpg`. The default
/// implementation (`FileStore`) maps keys to files in one directory.
pub trait BlobStore: Send + Sync {
    /// Store a blob under a key that must not exist yet.
    /// Fails with `BlobError::AlreadyExists` otherwise; nothing is overwritten.
    fn create(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. Returns false if the key did not exist.
    fn delete(&self, key: &str) -> Result<bool, BlobError>;
}
