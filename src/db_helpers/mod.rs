use sqlx::{QueryBuilder, Sqlite};

mod comment_helpers;
mod post_helpers;
mod tag_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use post_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

/// Appends `(?, ?, ...)` to `builder`, binding one placeholder per id.
///
/// Callers must not pass an empty slice; `IN ()` is not valid SQLite.
fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
