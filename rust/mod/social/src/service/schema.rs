use chirp_sql::SQLStore;

use crate::service::SocialError;

/// Initialize the SQLite schema.
///
/// Follow edges and likes are rows keyed by their natural composite key,
/// so an edge is visible from both endpoints at once and cannot be
/// recorded twice.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), SocialError> {
    let statements = [
        // Users: identity token is the name
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",

        // Follow edges: follower -> followee
        "CREATE TABLE IF NOT EXISTS follows (
            follower_id INTEGER NOT NULL,
            followee_id INTEGER NOT NULL,
            PRIMARY KEY (follower_id, followee_id),
            FOREIGN KEY (follower_id) REFERENCES users(id),
            FOREIGN KEY (followee_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id)",

        // Media references: id -> file name in the media area
        "CREATE TABLE IF NOT EXISTS medias (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL
        )",

        // Tweets
        "CREATE TABLE IF NOT EXISTS tweets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            body TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_tweets_user ON tweets(user_id)",

        // Attachments in order; media ids are stored as given
        "CREATE TABLE IF NOT EXISTS tweet_media (
            tweet_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            media_id INTEGER NOT NULL,
            PRIMARY KEY (tweet_id, position),
            FOREIGN KEY (tweet_id) REFERENCES tweets(id) ON DELETE CASCADE
        )",

        // Likes
        "CREATE TABLE IF NOT EXISTS likes (
            tweet_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            PRIMARY KEY (tweet_id, user_id),
            FOREIGN KEY (tweet_id) REFERENCES tweets(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])?;
    }

    Ok(())
}
