use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    Extension, Json,
};

use crate::{
    data_formats::{
        ContactsContext, IndexContext, Page, PostDetailContext, PostResponse, TagFilterContext,
        TagResponse,
    },
    db_helpers::{get_tag_by_title_in_db, popular_tags_in_db, PostQuery},
    errors::RequestError,
    models::{PostWithRelated, TagWithPostsCount},
    AppState,
};

const POPULAR_LIMIT: i64 = 5;
const TAG_PAGE_LIMIT: i64 = 20;

type PageResult<T> = Result<Json<Page<T>>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn serialize_posts(posts: Vec<PostWithRelated>, media_url: &str) -> Vec<PostResponse> {
    posts
        .into_iter()
        .map(|post| PostResponse::new(post, media_url))
        .collect()
}

fn serialize_tags(tags: Vec<TagWithPostsCount>) -> Vec<TagResponse> {
    tags.into_iter().map(TagResponse::new).collect()
}

// ----------------- Page Handlers -----------------
pub async fn index(Extension(state): Extension<Arc<AppState>>) -> PageResult<IndexContext> {
    let mut tx = state.pool.begin().await?;
    let most_popular_posts = PostQuery::new()
        .popular()
        .limit(POPULAR_LIMIT)
        .fetch_with_related_data(&mut tx)
        .await?;
    let fresh_posts = PostQuery::new()
        .newest()
        .limit(POPULAR_LIMIT)
        .fetch_with_related_data(&mut tx)
        .await?;
    let popular_tags = popular_tags_in_db(&mut tx, POPULAR_LIMIT).await?;
    tx.commit().await?;

    let context = IndexContext {
        most_popular_posts: serialize_posts(most_popular_posts, &state.media_url),
        page_posts: serialize_posts(fresh_posts, &state.media_url),
        popular_tags: serialize_tags(popular_tags),
    };
    Ok(Json(Page::new("index.html", context)))
}

pub async fn post_detail(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> PageResult<PostDetailContext> {
    let mut tx = state.pool.begin().await?;
    let post = PostQuery::new()
        .with_slug(&slug)
        .fetch_one_with_related_data(&mut tx)
        .await?;
    let popular_tags = popular_tags_in_db(&mut tx, POPULAR_LIMIT).await?;
    tx.commit().await?;
    tracing::debug!(slug = %slug, "rendering post detail");

    let likes_count = post.likes_count;
    let context = PostDetailContext {
        post: PostResponse::new(post, &state.media_url),
        likes_count,
        popular_tags: serialize_tags(popular_tags),
    };
    Ok(Json(Page::new("post-details.html", context)))
}

pub async fn tag_filter(
    Extension(state): Extension<Arc<AppState>>,
    Path(tag_title): Path<String>,
) -> PageResult<TagFilterContext> {
    let mut tx = state.pool.begin().await?;
    let tag = get_tag_by_title_in_db(&mut tx, &tag_title).await?;
    let popular_tags = popular_tags_in_db(&mut tx, POPULAR_LIMIT).await?;
    let related_posts = PostQuery::new()
        .tagged(tag.id)
        .limit(TAG_PAGE_LIMIT)
        .fetch_with_related_data(&mut tx)
        .await?;
    tx.commit().await?;

    let context = TagFilterContext {
        tag: tag.title,
        popular_tags: serialize_tags(popular_tags),
        posts: serialize_posts(related_posts, &state.media_url),
    };
    Ok(Json(Page::new("posts-list.html", context)))
}

pub async fn contacts() -> Json<Page<ContactsContext>> {
    Json(Page::new("contacts.html", ContactsContext::default()))
}
