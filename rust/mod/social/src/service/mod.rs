pub mod schema;
pub mod identity;
pub mod relationship;
pub mod tweet;
pub mod feed;
pub mod media;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use chirp_blob::{BlobError, BlobStore};
use chirp_sql::{Row, SQLError, SQLExecutor, SQLStore, SQLTransaction, Value};

use crate::model::{User, UserRef};

/// Social service error type.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    EntryNotPresent(String),

    #[error("{0}")]
    TweetIndex(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<SQLError> for SocialError {
    fn from(e: SQLError) -> Self {
        SocialError::Storage(e.to_string())
    }
}

impl From<BlobError> for SocialError {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::InvalidKey(_) => SocialError::Validation(e.to_string()),
            BlobError::Io(_) | BlobError::AlreadyExists(_) => SocialError::Storage(e.to_string()),
        }
    }
}

impl From<SocialError> for chirp_core::ServiceError {
    fn from(e: SocialError) -> Self {
        use chirp_core::ServiceError;
        match e {
            SocialError::NotFound(m) => ServiceError::NotFound(m),
            SocialError::EntryNotPresent(m) => ServiceError::EntryNotPresent(m),
            SocialError::TweetIndex(m) => ServiceError::TweetIndex(m),
            SocialError::Validation(m) => ServiceError::Validation(m),
            SocialError::Storage(m) => ServiceError::Storage(m),
            SocialError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Configuration for the social service.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// Path prefix of the media retrieval endpoint, used to build
    /// tweet attachment links.
    pub media_url_prefix: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            media_url_prefix: "/api/medias".to_string(),
        }
    }
}

/// The social service. Holds storage backends and configuration.
pub struct SocialService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) config: SocialConfig,
}

impl SocialService {
    /// Create a new SocialService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        config: SocialConfig,
    ) -> Result<Arc<Self>, SocialError> {
        schema::init_schema(sql.as_ref())?;
        info!("social schema ready");
        Ok(Arc::new(Self { sql, blob, config }))
    }

    /// Run `f` inside one transaction. Committed only if `f` succeeds;
    /// any error rolls every statement back.
    pub(crate) fn transaction<T>(
        &self,
        f: impl FnOnce(&dyn SQLTransaction) -> Result<T, SocialError>,
    ) -> Result<T, SocialError> {
        let tx = self.sql.begin()?;
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

// ── Row helpers shared by the service files ──

pub(crate) fn col_i64(row: &Row, name: &str) -> Result<i64, SocialError> {
    row.get_i64(name)
        .ok_or_else(|| SocialError::Internal(format!("missing integer column {}", name)))
}

pub(crate) fn col_str(row: &Row, name: &str) -> Result<String, SocialError> {
    row.get_str(name)
        .map(str::to_string)
        .ok_or_else(|| SocialError::Internal(format!("missing text column {}", name)))
}

fn user_refs(rows: &[Row]) -> Result<Vec<UserRef>, SocialError> {
    rows.iter()
        .map(|r| {
            Ok(UserRef {
                id: col_i64(r, "id")?,
                name: col_str(r, "name")?,
            })
        })
        .collect()
}

/// Look up a user id by name.
pub(crate) fn find_user_id<E: SQLExecutor + ?Sized>(
    db: &E,
    name: &str,
) -> Result<Option<i64>, SocialError> {
    let rows = db.query(
        "SELECT id FROM users WHERE name = ?1",
        &[Value::Text(name.to_string())],
    )?;
    rows.first().map(|r| col_i64(r, "id")).transpose()
}

/// Load a user with both follow lists.
pub(crate) fn load_user<E: SQLExecutor + ?Sized>(
    db: &E,
    id: i64,
) -> Result<Option<User>, SocialError> {
    let rows = db.query(
        "SELECT id, name FROM users WHERE id = ?1",
        &[Value::Integer(id)],
    )?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };
    let name = col_str(row, "name")?;

    let following = db.query(
        "SELECT u.id AS id, u.name AS name FROM follows f \
         JOIN users u ON u.id = f.followee_id \
         WHERE f.follower_id = ?1 ORDER BY f.rowid",
        &[Value::Integer(id)],
    )?;
    let followers = db.query(
        "SELECT u.id AS id, u.name AS name FROM follows f \
         JOIN users u ON u.id = f.follower_id \
         WHERE f.followee_id = ?1 ORDER BY f.rowid",
        &[Value::Integer(id)],
    )?;

    Ok(Some(User {
        id,
        name,
        followers: user_refs(&followers)?,
        following: user_refs(&following)?,
    }))
}

/// Fail with `NotFound` unless a user with this id exists.
pub(crate) fn require_user<E: SQLExecutor + ?Sized>(
    db: &E,
    id: i64,
) -> Result<(), SocialError> {
    let rows = db.query("SELECT id FROM users WHERE id = ?1", &[Value::Integer(id)])?;
    if rows.is_empty() {
        return Err(SocialError::NotFound(format!("users/{}", id)));
    }
    Ok(())
}

/// Fail with `NotFound` unless a tweet with this id exists.
pub(crate) fn require_tweet<E: SQLExecutor + ?Sized>(
    db: &E,
    id: i64,
) -> Result<(), SocialError> {
    let rows = db.query("SELECT id FROM tweets WHERE id = ?1", &[Value::Integer(id)])?;
    if rows.is_empty() {
        return Err(SocialError::NotFound(format!("tweets/{}", id)));
    }
    Ok(())
}
