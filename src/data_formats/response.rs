use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PostWithRelated, TagWithPostsCount};

const TEASER_LENGTH: usize = 200;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagResponse {
    pub title: String,
    pub posts_with_tag: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostResponse {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagResponse>,
    pub first_tag_title: Option<String>,
}

impl TagResponse {
    pub fn new(TagWithPostsCount { title, posts_count, .. }: TagWithPostsCount) -> Self {
        TagResponse {
            title,
            posts_with_tag: posts_count,
        }
    }
}

impl PostResponse {
    /// Builds the presentation record from an eagerly loaded post. Counts come
    /// from the query annotations; nothing here touches the database.
    pub fn new(
        PostWithRelated {
            post,
            author,
            tags,
            comments_count,
            ..
        }: PostWithRelated,
        media_url: &str,
    ) -> Self {
        let first_tag_title = tags.first().map(|tag| tag.title.clone());
        PostResponse {
            teaser_text: post.text.chars().take(TEASER_LENGTH).collect(),
            image_url: image_url(post.image.as_deref(), media_url),
            title: post.title,
            author: author.username,
            comments_amount: comments_count,
            published_at: post.published_at,
            slug: post.slug,
            tags: tags.into_iter().map(TagResponse::new).collect(),
            first_tag_title,
        }
    }
}

fn image_url(image: Option<&str>, media_url: &str) -> Option<String> {
    image
        .filter(|name| !name.is_empty())
        .map(|name| format!("{}{}", media_url, name))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::models::{Author, Comment, Post};

    use super::*;

    fn tag(id: i64, title: &str, posts_count: i64) -> TagWithPostsCount {
        TagWithPostsCount {
            id,
            title: title.to_string(),
            posts_count,
        }
    }

    fn post_with(text: &str, image: Option<&str>, tags: Vec<TagWithPostsCount>) -> PostWithRelated {
        let published_at = Utc.with_ymd_and_hms(2023, 4, 15, 10, 30, 0).unwrap();
        PostWithRelated {
            post: Post {
                id: 1,
                title: "Hello".to_string(),
                text: text.to_string(),
                slug: "hello-world".to_string(),
                image: image.map(str::to_string),
                published_at,
                author_id: 7,
            },
            author: Author {
                id: 7,
                username: "editor".to_string(),
            },
            tags,
            comments: vec![Comment {
                id: 3,
                post_id: 1,
                author_id: 7,
                text: "first!".to_string(),
                published_at,
            }],
            comments_count: 1,
            likes_count: 4,
        }
    }

    #[test]
    fn teaser_is_cut_at_200_characters() {
        let text = "ж".repeat(250);
        let response = PostResponse::new(post_with(&text, None, vec![]), "/media/");
        assert_eq!(response.teaser_text.chars().count(), 200);

        let short = PostResponse::new(post_with("short", None, vec![]), "/media/");
        assert_eq!(short.teaser_text, "short");
    }

    #[test]
    fn first_tag_title_follows_tag_order() {
        let tags = vec![tag(2, "art", 3), tag(1, "music", 1)];
        let response = PostResponse::new(post_with("text", None, tags), "/media/");
        assert_eq!(response.first_tag_title.as_deref(), Some("art"));
        assert_eq!(
            response.tags,
            vec![
                TagResponse {
                    title: "art".into(),
                    posts_with_tag: 3
                },
                TagResponse {
                    title: "music".into(),
                    posts_with_tag: 1
                },
            ]
        );
    }

    #[test]
    fn untagged_post_has_no_first_tag() {
        let response = PostResponse::new(post_with("text", None, vec![]), "/media/");
        assert!(response.first_tag_title.is_none());
        assert!(response.tags.is_empty());
    }

    #[test]
    fn image_url_is_prefixed_with_media_url() {
        let response = PostResponse::new(post_with("text", Some("cover.png"), vec![]), "/media/");
        assert_eq!(response.image_url.as_deref(), Some("/media/cover.png"));

        let empty = PostResponse::new(post_with("text", Some(""), vec![]), "/media/");
        assert!(empty.image_url.is_none());
    }

    #[test]
    fn uses_precomputed_counts_and_author_name() {
        let response = PostResponse::new(post_with("text", None, vec![]), "/media/");
        assert_eq!(response.comments_amount, 1);
        assert_eq!(response.author, "editor");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["slug"], "hello-world");
        assert_eq!(json["image_url"], serde_json::Value::Null);
        assert_eq!(json["first_tag_title"], serde_json::Value::Null);
    }
}
