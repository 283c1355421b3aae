use std::collections::{HashMap, HashSet};

use chirp_sql::Value;
use tracing::debug;

use crate::model::{Like, Tweet, TweetView, UserRef};
use crate::service::{SocialError, SocialService, col_i64, col_str, require_user};

impl SocialService {
    /// Every tweet, authors the viewer follows first, then by like count.
    pub fn compose_feed(&self, viewer_id: i64) -> Result<Vec<TweetView>, SocialError> {
        let (mut tweets, followed) = self.transaction(|tx| {
            require_user(tx, viewer_id)?;

            let followed = tx
                .query(
                    "SELECT followee_id FROM follows WHERE follower_id = ?1",
                    &[Value::Integer(viewer_id)],
                )?
                .iter()
                .map(|r| col_i64(r, "followee_id"))
                .collect::<Result<HashSet<_>, _>>()?;

            let mut media: HashMap<i64, Vec<i64>> = HashMap::new();
            for r in tx.query(
                "SELECT tweet_id, media_id FROM tweet_media ORDER BY tweet_id, position",
                &[],
            )? {
                media
                    .entry(col_i64(&r, "tweet_id")?)
                    .or_default()
                    .push(col_i64(&r, "media_id")?);
            }

            let mut likes: HashMap<i64, Vec<Like>> = HashMap::new();
            for r in tx.query(
                "SELECT l.tweet_id AS tweet_id, u.id AS user_id, u.name AS name \
                 FROM likes l JOIN users u ON u.id = l.user_id ORDER BY l.rowid",
                &[],
            )? {
                likes.entry(col_i64(&r, "tweet_id")?).or_default().push(Like {
                    user_id: col_i64(&r, "user_id")?,
                    name: col_str(&r, "name")?,
                });
            }

            let tweets = tx
                .query(
                    "SELECT t.id AS id, t.body AS body, u.id AS author_id, u.name AS author_name \
                     FROM tweets t JOIN users u ON u.id = t.user_id ORDER BY t.id",
                    &[],
                )?
                .iter()
                .map(|r| {
                    let id = col_i64(r, "id")?;
                    Ok(Tweet {
                        id,
                        body: col_str(r, "body")?,
                        media_ids: media.remove(&id).unwrap_or_default(),
                        author: UserRef {
                            id: col_i64(r, "author_id")?,
                            name: col_str(r, "author_name")?,
                        },
                        likes: likes.remove(&id).unwrap_or_default(),
                    })
                })
                .collect::<Result<Vec<_>, SocialError>>()?;

            Ok((tweets, followed))
        })?;

        order_feed(&mut tweets, &followed);
        debug!(viewer_id, tweets = tweets.len(), "feed composed");

        let prefix = self.config.media_url_prefix.trim_end_matches('/');
        Ok(tweets
            .into_iter()
            .map(|t| TweetView {
                id: t.id,
                content: t.body,
                attachments: t
                    .media_ids
                    .iter()
                    .map(|m| format!("{}/{}", prefix, m))
                    .collect(),
                author: t.author,
                likes: t.likes,
            })
            .collect())
    }
}

/// Sort tweets for a viewer following `followed`.
///
/// Tweets by followed authors come first. Within each group, more likes
/// come first. The sort is stable, so equal keys keep their input order.
pub fn order_feed(tweets: &mut [Tweet], followed: &HashSet<i64>) {
    tweets.sort_by(|a, b| {
        let a_followed = followed.contains(&a.author.id);
        let b_followed = followed.contains(&b.author.id);
        b_followed
            .cmp(&a_followed)
            .then_with(|| b.likes.len().cmp(&a.likes.len()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::test_service;

    fn tweet(id: i64, author: i64, likes: usize) -> Tweet {
        Tweet {
            id,
            body: format!("tweet {}", id),
            media_ids: Vec::new(),
            author: UserRef {
                id: author,
                name: format!("user{}", author),
            },
            likes: (0..likes as i64)
                .map(|n| Like {
                    user_id: 100 + n,
                    name: format!("fan{}", n),
                })
                .collect(),
        }
    }

    fn ids(tweets: &[Tweet]) -> Vec<i64> {
        tweets.iter().map(|t| t.id).collect()
    }

    #[test]
    fn followed_authors_come_first_regardless_of_likes() {
        let mut tweets = vec![tweet(1, 10, 5), tweet(2, 20, 0), tweet(3, 10, 9)];
        order_feed(&mut tweets, &HashSet::from([20]));
        assert_eq!(ids(&tweets), [2, 3, 1]);
    }

    #[test]
    fn likes_order_each_partition() {
        let mut tweets = vec![
            tweet(1, 10, 1),
            tweet(2, 20, 1),
            tweet(3, 10, 3),
            tweet(4, 20, 2),
        ];
        order_feed(&mut tweets, &HashSet::from([20]));
        assert_eq!(ids(&tweets), [4, 2, 3, 1]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut tweets = vec![tweet(1, 10, 2), tweet(2, 11, 2), tweet(3, 12, 2), tweet(4, 13, 0)];
        order_feed(&mut tweets, &HashSet::new());
        assert_eq!(ids(&tweets), [1, 2, 3, 4]);

        let mut tweets = vec![tweet(1, 10, 0), tweet(2, 11, 0), tweet(3, 10, 0)];
        order_feed(&mut tweets, &HashSet::from([10]));
        assert_eq!(ids(&tweets), [1, 3, 2]);
    }

    #[test]
    fn follow_and_like_scenario() {
        let (svc, _dir) = test_service();
        let author = svc.resolve_or_create("user001").unwrap();
        let tweet_id = svc.create_tweet(author.id, "message", &[]).unwrap();
        assert_eq!(tweet_id, 1);

        let kate = svc.resolve_or_create("kate").unwrap();
        svc.follow(kate.id, author.id).unwrap();
        svc.add_like(tweet_id, kate.id).unwrap();

        let feed = svc.compose_feed(kate.id).unwrap();
        assert_eq!(
            feed,
            vec![TweetView {
                id: 1,
                content: "message".into(),
                attachments: vec![],
                author: UserRef { id: 1, name: "user001".into() },
                likes: vec![Like { user_id: 2, name: "kate".into() }],
            }]
        );
    }

    #[test]
    fn feed_spans_all_authors() {
        let (svc, _dir) = test_service();
        let viewer = svc.resolve_or_create("viewer").unwrap();
        let followed = svc.resolve_or_create("followed").unwrap();
        let stranger = svc.resolve_or_create("stranger").unwrap();
        let popular = svc.create_tweet(stranger.id, "popular", &[]).unwrap();
        let quiet = svc.create_tweet(followed.id, "quiet", &[]).unwrap();
        let own = svc.create_tweet(viewer.id, "own", &[]).unwrap();

        svc.follow(viewer.id, followed.id).unwrap();
        svc.add_like(popular, viewer.id).unwrap();
        svc.add_like(popular, followed.id).unwrap();

        let order: Vec<i64> = svc.compose_feed(viewer.id).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(order, [quiet, popular, own]);

        // Likes list follows like order.
        let feed = svc.compose_feed(stranger.id).unwrap();
        let names: Vec<&str> = feed[0].likes.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["viewer", "followed"]);
    }

    #[test]
    fn unknown_viewer_is_not_found() {
        let (svc, _dir) = test_service();
        assert!(matches!(svc.compose_feed(1), Err(SocialError::NotFound(_))));
    }
}
