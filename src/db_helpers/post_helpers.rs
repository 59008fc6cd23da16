use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::data_formats::CreatePostRequest;
use crate::errors::RequestError;
use crate::models::{Author, Comment, Post, PostWithRelated, TagWithPostsCount};

use super::{comments_for_posts_in_db, get_user_by_id, tags_for_posts_in_db};

const POST_TITLE_MAX_LENGTH: usize = 200;
const POST_SLUG_MAX_LENGTH: usize = 200;

const POST_QUERY: &str = r#"
            SELECT posts.id                                      AS "id",
                   posts.title                                   AS "title",
                   posts.text                                    AS "text",
                   posts.slug                                    AS "slug",
                   posts.image                                   AS "image",
                   posts.published_at                            AS "published_at",
                   posts.author_id                               AS "author_id",
                   users.username                                AS "author_username",
                   (SELECT Count(*)
                    FROM   post_likes
                    WHERE  post_likes.post_id = posts.id)        AS "likes_count",
                   (SELECT Count(*)
                    FROM   comments
                    WHERE  comments.post_id = posts.id)          AS "comments_count"
            FROM   posts
                JOIN users
                    ON posts.author_id = users.id
            WHERE  1 = 1 "#;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    slug: String,
    image: Option<String>,
    published_at: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    likes_count: i64,
    comments_count: i64,
}

impl PostRow {
    fn into_post_with_related(
        self,
        tags: Vec<TagWithPostsCount>,
        comments: Vec<Comment>,
    ) -> PostWithRelated {
        PostWithRelated {
            post: Post {
                id: self.id,
                title: self.title,
                text: self.text,
                slug: self.slug,
                image: self.image,
                published_at: self.published_at,
                author_id: self.author_id,
            },
            author: Author {
                id: self.author_id,
                username: self.author_username,
            },
            tags,
            comments,
            comments_count: self.comments_count,
            likes_count: self.likes_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    /// Most recently published first.
    #[default]
    Newest,
    /// Most liked first, ties in insertion order.
    Popular,
}

/// Composable post query. Every method narrows or reorders the result; the
/// `fetch_*` methods run it and eagerly load related data.
///
/// ```ignore
/// let posts = PostQuery::new().popular().limit(5).fetch_with_related_data(&mut conn).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    ordering: PostOrdering,
    tag_id: Option<i64>,
    slug: Option<String>,
    limit: Option<i64>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popular(mut self) -> Self {
        self.ordering = PostOrdering::Popular;
        self
    }

    pub fn newest(mut self) -> Self {
        self.ordering = PostOrdering::Newest;
        self
    }

    pub fn tagged(mut self, tag_id: i64) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_owned());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(POST_QUERY);
        if let Some(tag_id) = self.tag_id {
            builder.push(" AND posts.id IN (SELECT post_tags.post_id FROM post_tags WHERE post_tags.tag_id = ");
            builder.push_bind(tag_id);
            builder.push(")");
        }
        if let Some(slug) = &self.slug {
            builder.push(" AND posts.slug = ");
            builder.push_bind(slug.clone());
        }
        match self.ordering {
            PostOrdering::Newest => {
                builder.push(" ORDER BY julianday(posts.published_at) DESC, posts.id DESC")
            }
            PostOrdering::Popular => builder.push(" ORDER BY likes_count DESC, posts.id ASC"),
        };
        if let Some(limit) = self.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
        builder
    }

    /// Runs the query, then loads tags and comments for all matched posts with
    /// one query each.
    pub async fn fetch_with_related_data(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<PostWithRelated>, RequestError> {
        let mut builder = self.build();
        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&mut *conn)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut tags = tags_for_posts_in_db(conn, &ids).await?;
        let mut comments = comments_for_posts_in_db(conn, &ids).await?;
        tracing::debug!(
            posts = rows.len(),
            ordering = ?self.ordering,
            "loaded posts with related data"
        );

        let posts = rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_post_with_related(
                    tags.remove(&id).unwrap_or_default(),
                    comments.remove(&id).unwrap_or_default(),
                )
            })
            .collect();
        Ok(posts)
    }

    pub async fn fetch_one_with_related_data(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<PostWithRelated, RequestError> {
        self.clone()
            .limit(1)
            .fetch_with_related_data(conn)
            .await?
            .into_iter()
            .next()
            .ok_or(RequestError::NotFound("Post not found"))
    }
}

fn validate_slug(slug: &str) -> Result<(), RequestError> {
    if slug.is_empty() {
        return Err(RequestError::RunTimeError("Slug can't be empty"));
    }
    if slug.chars().count() > POST_SLUG_MAX_LENGTH {
        return Err(RequestError::RunTimeError("Slug is too long"));
    }
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(RequestError::RunTimeError(
            "Slug may only contain letters, numbers, underscores or hyphens",
        ));
    }
    Ok(())
}

pub async fn create_post_in_db(
    conn: &mut SqliteConnection,
    author_id: i64,
    CreatePostRequest {
        title,
        text,
        slug,
        image,
        published_at,
    }: CreatePostRequest,
) -> Result<Post, RequestError> {
    let author = match get_user_by_id(conn, author_id).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("Author not found")),
    };
    if !author.is_staff {
        return Err(RequestError::RunTimeError(
            "Post author must be a staff member",
        ));
    }
    if title.chars().count() > POST_TITLE_MAX_LENGTH {
        return Err(RequestError::RunTimeError("Title is too long"));
    }
    let slug = slug.unwrap_or_else(|| slug::slugify(&title));
    validate_slug(&slug)?;

    let result = sqlx::query_as::<Sqlite, Post>(
        r#"
        INSERT INTO posts (title, text, slug, image, published_at, author_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, text, slug, image, published_at, author_id
        "#,
    )
    .bind(title)
    .bind(text)
    .bind(slug)
    .bind(image)
    .bind(published_at)
    .bind(author.id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RequestError::on_unique_violation(e, "Post with this slug already exists"))?;
    Ok(result)
}

pub async fn like_post_in_db(
    conn: &mut SqliteConnection,
    post_id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    sqlx::query(
        r#"
        INSERT INTO post_likes (post_id, user_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| RequestError::on_unique_violation(e, "Post was already liked"))?;
    Ok(())
}

pub async fn delete_post_in_db(conn: &mut SqliteConnection, post_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query(
        r#"
        DELETE FROM posts WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    Ok(())
}
