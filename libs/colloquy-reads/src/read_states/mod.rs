//! Read-marker persistence and bulk first-unread annotation.

pub mod queries;

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, OptionalExtension};
use diesel::sql_types::{BigInt, Nullable};
use diesel_async::AsyncPgConnection;

use crate::db::schema::read_states;
use crate::error::{Error, Result};
use crate::models::post::Post;
use crate::models::read_state::{NewReadState, ReadState};
use crate::models::topic::Topic;
use crate::sql::{BackendDialect, SqlDialect};

pub use queries::{PostsScope, ReadStatesScope};

/// A read-state row annotated with its first unread post and page.
#[derive(Debug, QueryableByName)]
pub struct ReadStateFirstUnread {
    #[diesel(embed)]
    pub state: ReadState,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub first_unread_post_id: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub first_unread_post_page: Option<i64>,
}

/// A read-state row annotated with its first unread page only.
#[derive(Debug, QueryableByName)]
pub struct ReadStateFirstUnreadPage {
    #[diesel(embed)]
    pub state: ReadState,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub first_unread_post_page: Option<i64>,
}

/// Advance (or create) the read marker for `user_id` in `postable_id`.
///
/// The marker only moves forward: a post at or before the current marker
/// is a no-op, so duplicate or out-of-order deliveries never regress it.
///
/// Find-then-write in two round trips. Concurrent touches for the same
/// pair can lose one update; the marker self-corrects on the next later
/// post.
pub async fn touch(
    conn: &mut AsyncPgConnection,
    user_id: &str,
    postable_id: &str,
    post: &Post,
    post_page: i32,
) -> Result<()> {
    if post_page < 1 {
        return Err(Error::InvalidPostPage(post_page));
    }

    let existing: Option<ReadState> = diesel_async::RunQueryDsl::get_result(
        read_states::table
            .filter(read_states::user_id.eq(user_id))
            .filter(read_states::postable_id.eq(postable_id))
            .select(ReadState::as_select()),
        conn,
    )
    .await
    .optional()?;

    match existing {
        None => {
            diesel_async::RunQueryDsl::execute(
                diesel::insert_into(read_states::table).values(NewReadState {
                    user_id,
                    postable_id,
                    read_at: post.created_at,
                    page: post_page,
                }),
                conn,
            )
            .await?;
            tracing::debug!(user_id, postable_id, "read marker created");
        }
        Some(state) if state.read_at < post.created_at => {
            diesel_async::RunQueryDsl::execute(
                diesel::update(read_states::table.find(state.id)).set((
                    read_states::read_at.eq(post.created_at),
                    read_states::page.eq(post_page),
                )),
                conn,
            )
            .await?;
            tracing::debug!(user_id, postable_id, page = post_page, "read marker advanced");
        }
        Some(_) => {}
    }

    Ok(())
}

/// Create a read state marking `topic` fully read as of now, on page 1.
///
/// Callers must know no row exists yet — first topic view, or right after
/// the user's own first post. If two creators race, the unique index lets
/// exactly one through; the loser gets [`Error::DuplicateReadState`].
pub async fn mark_read_on_first_post(
    conn: &mut AsyncPgConnection,
    user_id: &str,
    topic: &Topic,
) -> Result<ReadState> {
    diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(read_states::table)
            .values(NewReadState {
                user_id,
                postable_id: &topic.id,
                read_at: Utc::now(),
                page: 1,
            })
            .returning(ReadState::as_returning()),
        conn,
    )
    .await
    .map_err(|err| match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Error::DuplicateReadState {
                user_id: user_id.to_string(),
                postable_id: topic.id.clone(),
            }
        }
        other => Error::Database(other),
    })
}

/// Annotate every scoped read-state row with the id and page of its first
/// unread post, in one query. Rows with nothing unread come back with both
/// columns `None`.
pub async fn include_first_unread(
    conn: &mut AsyncPgConnection,
    states_scope: &ReadStatesScope,
    posts_per_page: i64,
    posts_scope: &PostsScope,
) -> Result<Vec<ReadStateFirstUnread>> {
    let dialect = active_dialect();
    let sql = queries::first_unread_query(&dialect, states_scope, posts_per_page, posts_scope);
    let rows = diesel_async::RunQueryDsl::load(diesel::sql_query(sql), conn).await?;
    Ok(rows)
}

/// Page-only variant of [`include_first_unread`]: one join fewer, no post
/// id in the output.
pub async fn include_first_unread_page(
    conn: &mut AsyncPgConnection,
    states_scope: &ReadStatesScope,
    posts_per_page: i64,
    posts_scope: &PostsScope,
) -> Result<Vec<ReadStateFirstUnreadPage>> {
    let dialect = active_dialect();
    let sql =
        queries::first_unread_page_query(&dialect, states_scope, posts_per_page, posts_scope);
    let rows = diesel_async::RunQueryDsl::load(diesel::sql_query(sql), conn).await?;
    Ok(rows)
}

/// Dialect of the engine behind [`AsyncPgConnection`].
fn active_dialect() -> impl SqlDialect {
    <diesel::pg::Pg as BackendDialect>::dialect()
}
