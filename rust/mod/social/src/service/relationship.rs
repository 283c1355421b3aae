use chirp_sql::Value;
use tracing::debug;

use crate::service::{SocialError, SocialService, require_user};

impl SocialService {
    /// Record that `follower_id` follows `followee_id`.
    ///
    /// The edge is one row, so it shows up in the follower's `following`
    /// and the followee's `followers` in the same commit. Following twice
    /// is a no-op.
    pub fn follow(&self, follower_id: i64, followee_id: i64) -> Result<(), SocialError> {
        self.transaction(|tx| {
            require_user(tx, follower_id)?;
            require_user(tx, followee_id)?;

            let inserted = tx.exec(
                "INSERT OR IGNORE INTO follows (follower_id, followee_id) VALUES (?1, ?2)",
                &[Value::Integer(follower_id), Value::Integer(followee_id)],
            )?;
            debug!(follower_id, followee_id, inserted, "follow");
            Ok(())
        })
    }

    /// Remove the edge `follower_id -> followee_id` from both sides.
    pub fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<(), SocialError> {
        self.transaction(|tx| {
            require_user(tx, follower_id)?;
            require_user(tx, followee_id)?;

            let removed = tx.exec(
                "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                &[Value::Integer(follower_id), Value::Integer(followee_id)],
            )?;
            if removed == 0 {
                return Err(SocialError::EntryNotPresent(format!(
                    "user {} does not follow user {}",
                    follower_id, followee_id
                )));
            }
            debug!(follower_id, followee_id, "unfollow");
            Ok(())
        })
    }
}
