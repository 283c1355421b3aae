use chirp_blob::BlobError;
use chirp_sql::{SQLExecutor, Value};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::model::Media;
use crate::service::{SocialError, SocialService, col_i64, col_str};

impl SocialService {
    /// Store an upload and return its media id.
    ///
    /// The file keeps its original name unless that name is taken, in which
    /// case a random digit is appended to the stem until a free name is found.
    pub fn store_media(&self, data: &[u8], original_name: &str) -> Result<i64, SocialError> {
        let mut filename = base_name(original_name)?;

        loop {
            match self.blob.create(&filename, data) {
                Ok(()) => break,
                Err(BlobError::AlreadyExists(_)) => {
                    let digit = rand::thread_rng().gen_range(0..10);
                    filename = with_digit(&filename, digit);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let inserted = self.sql.query(
            "INSERT INTO medias (filename) VALUES (?1) RETURNING id",
            &[Value::Text(filename.clone())],
        );
        let id = match inserted.map_err(SocialError::from).and_then(|rows| {
            rows.first()
                .map(|r| col_i64(r, "id"))
                .transpose()?
                .ok_or_else(|| SocialError::Internal("insert returned no id".into()))
        }) {
            Ok(id) => id,
            Err(e) => {
                // No row will ever point at the file.
                if let Err(cleanup) = self.blob.delete(&filename) {
                    warn!("failed to remove {} after insert error: {}", filename, cleanup);
                }
                return Err(e);
            }
        };

        info!(media_id = id, "stored media {} ({} bytes)", filename, data.len());
        Ok(id)
    }

    /// Read the media row.
    pub fn get_media(&self, media_id: i64) -> Result<Option<Media>, SocialError> {
        let rows = self.sql.query(
            "SELECT id, filename FROM medias WHERE id = ?1",
            &[Value::Integer(media_id)],
        )?;
        rows.first()
            .map(|r| {
                Ok(Media {
                    id: col_i64(r, "id")?,
                    filename: col_str(r, "filename")?,
                })
            })
            .transpose()
    }

    /// Read the bytes behind a media id. `None` if the row or its file is gone.
    pub fn fetch_media(&self, media_id: i64) -> Result<Option<Vec<u8>>, SocialError> {
        let Some(media) = self.get_media(media_id)? else {
            return Ok(None);
        };
        let data = self.blob.get(&media.filename)?;
        if data.is_none() {
            debug!(media_id, "file {} missing for media row", media.filename);
        }
        Ok(data)
    }

    /// Delete the media row and return the file name it pointed at.
    /// The file itself is left in place.
    pub fn delete_media(&self, media_id: i64) -> Result<Option<String>, SocialError> {
        self.transaction(|tx| delete_media_row(tx, media_id))
    }
}

/// Remove a media row, returning its file name if it existed.
pub(crate) fn delete_media_row<E: SQLExecutor + ?Sized>(
    db: &E,
    media_id: i64,
) -> Result<Option<String>, SocialError> {
    let rows = db.query(
        "DELETE FROM medias WHERE id = ?1 RETURNING filename",
        &[Value::Integer(media_id)],
    )?;
    rows.first().map(|r| col_str(r, "filename")).transpose()
}

/// Last path component of an upload name.
fn base_name(original_name: &str) -> Result<String, SocialError> {
    let name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(SocialError::Validation(format!(
            "invalid upload file name {:?}",
            original_name
        )));
    }
    Ok(name.to_string())
}

/// Append `digit` to the stem: `cat.jpg` → `cat7.jpg`, `cat` → `cat7`.
/// A leading dot does not start an extension.
fn with_digit(filename: &str, digit: u8) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &filename[..dot], digit, &filename[dot..]),
        _ => format!("{}{}", filename, digit),
    }
}
