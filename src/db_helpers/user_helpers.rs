use sqlx::{Sqlite, SqliteConnection};

use crate::{data_formats::CreateUserRequest, errors::RequestError, models::User};

pub async fn create_user_in_db(
    conn: &mut SqliteConnection,
    CreateUserRequest { username, is_staff }: CreateUserRequest,
) -> Result<User, RequestError> {
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (username, is_staff)
        VALUES ($1, $2)
        RETURNING id, username, is_staff
        "#,
    )
    .bind(username)
    .bind(is_staff)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RequestError::on_unique_violation(e, "Username already taken"))?;
    Ok(user)
}

pub async fn get_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, username, is_staff FROM users WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(result)
}

/// Removes a user. Their posts, comments and likes go with them.
pub async fn delete_user_in_db(conn: &mut SqliteConnection, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
