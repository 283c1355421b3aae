use chirp_sql::Value;
use tracing::{debug, info};

use crate::model::User;
use crate::service::{SocialError, SocialService, col_i64, find_user_id, load_user};

impl SocialService {
    /// Return the user named `token`, creating it on first use.
    ///
    /// This is the only path that creates users.
    pub fn resolve_or_create(&self, token: &str) -> Result<User, SocialError> {
        if token.is_empty() {
            return Err(SocialError::Validation("identity token is empty".into()));
        }

        self.transaction(|tx| {
            if let Some(id) = find_user_id(tx, token)? {
                return load_user(tx, id)?
                    .ok_or_else(|| SocialError::Internal(format!("users/{} vanished", id)));
            }

            let rows = tx.query(
                "INSERT INTO users (name) VALUES (?1) RETURNING id",
                &[Value::Text(token.to_string())],
            )?;
            let id = rows
                .first()
                .map(|r| col_i64(r, "id"))
                .transpose()?
                .ok_or_else(|| SocialError::Internal("insert returned no id".into()))?;
            info!(user_id = id, "created user {}", token);

            Ok(User {
                id,
                name: token.to_string(),
                followers: Vec::new(),
                following: Vec::new(),
            })
        })
    }

    /// Get a user by id. Never creates.
    pub fn get_user(&self, id: i64) -> Result<User, SocialError> {
        self.transaction(|tx| load_user(tx, id))?
            .ok_or_else(|| SocialError::NotFound(format!("users/{}", id)))
    }

    /// Get a user by identity token. Never creates.
    pub fn find_user_by_name(&self, name: &str) -> Result<User, SocialError> {
        let user = self.transaction(|tx| match find_user_id(tx, name)? {
            Some(id) => load_user(tx, id),
            None => Ok(None),
        })?;
        if user.is_none() {
            debug!("unknown caller {}", name);
        }
        user.ok_or_else(|| SocialError::NotFound(format!("users/{}", name)))
    }
}
