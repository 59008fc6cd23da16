use serde::{Deserialize, Serialize};

use super::response::{PostResponse, TagResponse};

/// What a page hands to the rendering layer: the template to render and the
/// context to render it with.
#[derive(Debug, Deserialize, Serialize)]
pub struct Page<T> {
    pub template: String,
    pub context: T,
}

impl<T> Page<T> {
    pub fn new(template: &str, context: T) -> Page<T> {
        Page {
            template: template.to_owned(),
            context,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IndexContext {
    pub most_popular_posts: Vec<PostResponse>,
    pub page_posts: Vec<PostResponse>,
    pub popular_tags: Vec<TagResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailContext {
    pub post: PostResponse,
    pub likes_count: i64,
    pub popular_tags: Vec<TagResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TagFilterContext {
    pub tag: String,
    pub popular_tags: Vec<TagResponse>,
    pub posts: Vec<PostResponse>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ContactsContext {}
