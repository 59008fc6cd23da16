use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub author_id: i64,
}

impl Post {
    pub fn absolute_url(&self) -> String {
        format!("/post/{}", self.slug)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub title: String,
}

impl Tag {
    pub fn absolute_url(&self) -> String {
        format!("/tag/{}", self.title)
    }
}

/// A tag annotated with the number of posts it is attached to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagWithPostsCount {
    pub id: i64,
    pub title: String,
    pub posts_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// A comment joined with the title of its post and its author's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithPostInfo {
    pub id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub post_id: i64,
    pub post_title: String,
    pub author_id: i64,
    pub author_username: String,
}

impl fmt::Display for CommentWithPostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} under {}", self.author_username, self.post_title)
    }
}

#[derive(Debug, Clone)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

/// A post with everything a page needs already loaded: its author, its tags
/// (each with their own post count), its comments and both counts.
///
/// Only the eager-loading queries in `db_helpers` produce this type, so code
/// holding one never has to go back to the database.
#[derive(Debug, Clone)]
pub struct PostWithRelated {
    pub post: Post,
    pub author: Author,
    pub tags: Vec<TagWithPostsCount>,
    /// Oldest first. Loaded with the post; page records only use
    /// `comments_count`.
    pub comments: Vec<Comment>,
    pub comments_count: i64,
    pub likes_count: i64,
}
