use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    errors::RequestError,
    models::{Tag, TagWithPostsCount},
};

use super::push_id_list;

const TAG_TITLE_MAX_LENGTH: usize = 20;

const TAG_WITH_POSTS_COUNT_QUERY: &str = r#"
            SELECT tags.id                                     AS "id",
                   tags.title                                  AS "title",
                   (SELECT Count(*)
                    FROM   post_tags
                    WHERE  post_tags.tag_id = tags.id)         AS "posts_count"
            FROM   tags
"#;

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    title: String,
    posts_count: i64,
}

/// Lowercases and trims a tag title, rejecting empty and over-long ones.
pub fn normalize_tag_title(title: &str) -> Result<String, RequestError> {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return Err(RequestError::RunTimeError("Tag title can't be empty"));
    }
    if title.chars().count() > TAG_TITLE_MAX_LENGTH {
        return Err(RequestError::RunTimeError("Tag title is too long"));
    }
    Ok(title)
}

pub async fn create_tag_in_db(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<Tag, RequestError> {
    let title = normalize_tag_title(title)?;
    let tag = sqlx::query_as::<Sqlite, Tag>(
        r#"
        INSERT INTO tags (title)
        VALUES ($1)
        RETURNING id, title
        "#,
    )
    .bind(title)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RequestError::on_unique_violation(e, "Tag already exists"))?;
    Ok(tag)
}

/// Exact, case-sensitive lookup. Stored titles are always lowercase.
pub async fn get_tag_by_title_in_db(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<Tag, RequestError> {
    let tag = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT id, title FROM tags WHERE title = $1
        "#,
    )
    .bind(title)
    .fetch_optional(&mut *conn)
    .await?;
    match tag {
        Some(tag) => Ok(tag),
        None => Err(RequestError::NotFound("Tag not found")),
    }
}

pub async fn popular_tags_in_db(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<TagWithPostsCount>, RequestError> {
    let query = format!(
        "{} ORDER BY posts_count DESC, tags.id ASC LIMIT $1",
        TAG_WITH_POSTS_COUNT_QUERY
    );
    let tags = sqlx::query_as::<Sqlite, TagWithPostsCount>(&query)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
    Ok(tags)
}

pub async fn tags_with_posts_count_in_db(
    conn: &mut SqliteConnection,
) -> Result<Vec<TagWithPostsCount>, RequestError> {
    let query = format!("{} ORDER BY tags.title ASC", TAG_WITH_POSTS_COUNT_QUERY);
    let tags = sqlx::query_as::<Sqlite, TagWithPostsCount>(&query)
        .fetch_all(&mut *conn)
        .await?;
    Ok(tags)
}

/// Loads the tags of every post in `post_ids` in one query, grouped by post
/// and ordered by title within each group.
pub async fn tags_for_posts_in_db(
    conn: &mut SqliteConnection,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagWithPostsCount>>, RequestError> {
    let mut grouped: HashMap<i64, Vec<TagWithPostsCount>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
            SELECT post_tags.post_id                           AS "post_id",
                   tags.id                                     AS "id",
                   tags.title                                  AS "title",
                   (SELECT Count(*)
                    FROM   post_tags AS counted
                    WHERE  counted.tag_id = tags.id)           AS "posts_count"
            FROM   post_tags
                JOIN tags
                    ON tags.id = post_tags.tag_id
            WHERE  post_tags.post_id IN "#,
    );
    push_id_list(&mut builder, post_ids);
    builder.push(" ORDER BY tags.title ASC");

    let rows = builder
        .build_query_as::<PostTagRow>()
        .fetch_all(&mut *conn)
        .await?;
    for PostTagRow {
        post_id,
        id,
        title,
        posts_count,
    } in rows
    {
        grouped.entry(post_id).or_default().push(TagWithPostsCount {
            id,
            title,
            posts_count,
        });
    }
    Ok(grouped)
}

pub async fn attach_tag_to_post_in_db(
    conn: &mut SqliteConnection,
    post_id: i64,
    tag_id: i64,
) -> Result<(), RequestError> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO post_tags (post_id, tag_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(post_id)
    .bind(tag_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
