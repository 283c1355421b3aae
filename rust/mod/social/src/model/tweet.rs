use serde::{Deserialize, Serialize};

use super::UserRef;

/// One like on a tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: i64,
    pub name: String,
}

/// A stored tweet with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: i64,
    pub body: String,
    /// Attached media ids in attachment order.
    pub media_ids: Vec<i64>,
    pub author: UserRef,
    /// Likes, oldest first.
    pub likes: Vec<Like>,
}

/// Input for posting a tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTweet {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Vec<i64>,
}

/// A tweet as rendered in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TweetView {
    pub id: i64,
    pub content: String,
    /// Retrieval paths, one per media id: `/api/medias/{id}`.
    pub attachments: Vec<String>,
    pub author: UserRef,
    pub likes: Vec<Like>,
}
