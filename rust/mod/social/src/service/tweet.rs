use chirp_sql::Value;
use tracing::{debug, info, warn};

use crate::service::media::delete_media_row;
use crate::service::{
    SocialError, SocialService, col_i64, find_user_id, require_tweet, require_user,
};

impl SocialService {
    /// Post a tweet for `user_id`. Media ids are kept in the order given.
    pub fn create_tweet(
        &self,
        user_id: i64,
        body: &str,
        media_ids: &[i64],
    ) -> Result<i64, SocialError> {
        let tweet_id = self.transaction(|tx| {
            require_user(tx, user_id)?;

            let rows = tx.query(
                "INSERT INTO tweets (body, user_id) VALUES (?1, ?2) RETURNING id",
                &[Value::Text(body.to_string()), Value::Integer(user_id)],
            )?;
            let tweet_id = rows
                .first()
                .map(|r| col_i64(r, "id"))
                .transpose()?
                .ok_or_else(|| SocialError::Internal("insert returned no id".into()))?;

            for (position, media_id) in media_ids.iter().enumerate() {
                tx.exec(
                    "INSERT INTO tweet_media (tweet_id, position, media_id) VALUES (?1, ?2, ?3)",
                    &[
                        Value::Integer(tweet_id),
                        Value::Integer(position as i64),
                        Value::Integer(*media_id),
                    ],
                )?;
            }
            Ok(tweet_id)
        })?;

        info!(tweet_id, user_id, media = media_ids.len(), "tweet created");
        Ok(tweet_id)
    }

    /// Delete one of the caller's own tweets along with its likes and media.
    ///
    /// Rows go in one transaction. Media files are removed after commit;
    /// a file that is already gone is not an error.
    pub fn delete_tweet(&self, caller: &str, tweet_id: i64) -> Result<(), SocialError> {
        let filenames = self.transaction(|tx| {
            let user_id = find_user_id(tx, caller)?
                .ok_or_else(|| SocialError::NotFound(format!("users/{}", caller)))?;

            let owned = tx.query(
                "SELECT id FROM tweets WHERE id = ?1 AND user_id = ?2",
                &[Value::Integer(tweet_id), Value::Integer(user_id)],
            )?;
            if owned.is_empty() {
                return Err(SocialError::TweetIndex("user has no tweet with this id".into()));
            }

            let media_ids = tx
                .query(
                    "SELECT media_id FROM tweet_media WHERE tweet_id = ?1 ORDER BY position",
                    &[Value::Integer(tweet_id)],
                )?
                .iter()
                .map(|r| col_i64(r, "media_id"))
                .collect::<Result<Vec<_>, _>>()?;

            let id = [Value::Integer(tweet_id)];
            tx.exec("DELETE FROM likes WHERE tweet_id = ?1", &id)?;
            tx.exec("DELETE FROM tweet_media WHERE tweet_id = ?1", &id)?;
            tx.exec("DELETE FROM tweets WHERE id = ?1", &id)?;

            let mut filenames = Vec::with_capacity(media_ids.len());
            for media_id in media_ids {
                match delete_media_row(tx, media_id)? {
                    Some(name) => filenames.push(name),
                    None => debug!(tweet_id, media_id, "attached media has no row"),
                }
            }
            Ok(filenames)
        })?;

        for name in &filenames {
            match self.blob.delete(name) {
                Ok(true) => {}
                Ok(false) => debug!(tweet_id, "media file {} already gone", name),
                Err(e) => warn!(tweet_id, "failed to remove media file {}: {}", name, e),
            }
        }

        info!(tweet_id, media = filenames.len(), "tweet deleted");
        Ok(())
    }

    /// Like a tweet. Liking twice is a no-op.
    pub fn add_like(&self, tweet_id: i64, user_id: i64) -> Result<(), SocialError> {
        self.transaction(|tx| {
            require_user(tx, user_id)?;
            require_tweet(tx, tweet_id)?;

            let inserted = tx.exec(
                "INSERT OR IGNORE INTO likes (tweet_id, user_id) VALUES (?1, ?2)",
                &[Value::Integer(tweet_id), Value::Integer(user_id)],
            )?;
            debug!(tweet_id, user_id, inserted, "like");
            Ok(())
        })
    }

    /// Withdraw a like.
    pub fn remove_like(&self, tweet_id: i64, user_id: i64) -> Result<(), SocialError> {
        self.transaction(|tx| {
            require_user(tx, user_id)?;
            require_tweet(tx, tweet_id)?;

            let removed = tx.exec(
                "DELETE FROM likes WHERE tweet_id = ?1 AND user_id = ?2",
                &[Value::Integer(tweet_id), Value::Integer(user_id)],
            )?;
            if removed == 0 {
                return Err(SocialError::EntryNotPresent(format!(
                    "user {} has not liked tweet {}",
                    user_id, tweet_id
                )));
            }
            debug!(tweet_id, user_id, "unlike");
            Ok(())
        })
    }
}
