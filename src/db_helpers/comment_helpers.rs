use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    data_formats::CommentRequest,
    errors::RequestError,
    models::{Comment, CommentWithPostInfo},
};

use super::push_id_list;

pub async fn create_comment_in_db(
    conn: &mut SqliteConnection,
    post_id: i64,
    author_id: i64,
    CommentRequest { text, published_at }: CommentRequest,
) -> Result<Comment, RequestError> {
    let result = sqlx::query_as::<Sqlite, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text, published_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, post_id, author_id, text, published_at
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(published_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(result)
}

/// Loads the comments of every post in `post_ids` in one query, grouped by
/// post, oldest first.
pub async fn comments_for_posts_in_db(
    conn: &mut SqliteConnection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<Comment>>, RequestError> {
    let mut grouped: HashMap<i64, Vec<Comment>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT id, post_id, author_id, text, published_at
        FROM comments
        WHERE post_id IN "#,
    );
    push_id_list(&mut builder, post_ids);
    builder.push(" ORDER BY julianday(published_at) ASC, id ASC");

    let comments = builder
        .build_query_as::<Comment>()
        .fetch_all(&mut *conn)
        .await?;
    for comment in comments {
        grouped.entry(comment.post_id).or_default().push(comment);
    }
    Ok(grouped)
}

/// Comments joined with their post title and author, oldest first. Pass a
/// post id to restrict the result to that post.
pub async fn comments_with_post_info_in_db(
    conn: &mut SqliteConnection,
    post_id: Option<i64>,
) -> Result<Vec<CommentWithPostInfo>, RequestError> {
    let result = sqlx::query_as::<Sqlite, CommentWithPostInfo>(
        r#"
        SELECT comments.id                 AS "id",
               comments.text               AS "text",
               comments.published_at       AS "published_at",
               posts.id                    AS "post_id",
               posts.title                 AS "post_title",
               users.id                    AS "author_id",
               users.username              AS "author_username"
        FROM   comments
            JOIN posts
                ON posts.id = comments.post_id
            JOIN users
                ON users.id = comments.author_id
        WHERE  ( posts.id = $1
                 OR $1 IS NULL )
        ORDER  BY julianday(comments.published_at) ASC, comments.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(result)
}
