use serde::{Deserialize, Serialize};

/// A `{id, name}` pair as it appears in follow lists and tweet authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

/// A user identity. Created on the first request carrying a new token;
/// the token is the user's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Caller-supplied identity token, unique.
    pub name: String,

    /// Users following this user, oldest edge first.
    pub followers: Vec<UserRef>,

    /// Users this user follows, oldest edge first.
    pub following: Vec<UserRef>,
}
