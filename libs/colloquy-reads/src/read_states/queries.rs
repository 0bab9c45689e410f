//! Construction of the bulk first-unread queries.
//!
//! One query per call annotates every scoped read-state row with the
//! location of its first unread post, so a topic listing never issues
//! per-topic lookups. The shapes here need aliased derived tables,
//! aggregate projections, and engine-specific integer division, hence the
//! `sql` composer rather than Diesel's typed DSL.

use crate::sql::{and, count, eq, gt, lt_eq, min, Select, SqlDialect, TableRef};

/// Filter over the `read_states` table, applied to the outer query.
///
/// Stands in for the caller's own row selection; the bulk queries annotate
/// whatever this scope matches.
#[derive(Debug, Clone, Default)]
pub enum ReadStatesScope {
    /// Every read-state row.
    #[default]
    All,
    /// Rows belonging to one user.
    ForUser(String),
    /// An arbitrary predicate over `read_states` columns. Trusted input:
    /// the fragment is embedded in the query as-is.
    Predicate(String),
}

impl ReadStatesScope {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::ForUser(user_id.into())
    }

    fn predicate(&self, states: &TableRef, dialect: &dyn SqlDialect) -> Option<String> {
        match self {
            Self::All => None,
            Self::ForUser(user_id) => Some(eq(
                states.col("user_id"),
                dialect.string_literal(user_id),
            )),
            Self::Predicate(sql) => Some(sql.clone()),
        }
    }
}

/// Filter over the `posts` table: which posts count as readable content.
///
/// `All` reuses the base table directly; anything else wraps the filtered
/// rows in a derived table.
#[derive(Debug, Clone, Default)]
pub enum PostsScope {
    /// Every post.
    #[default]
    All,
    /// Every post except the given ids.
    ExcludingPosts(Vec<i64>),
    /// An arbitrary predicate over `posts` columns. Trusted input.
    Predicate(String),
}

impl PostsScope {
    pub fn excluding_posts(ids: impl Into<Vec<i64>>) -> Self {
        Self::ExcludingPosts(ids.into())
    }

    fn where_clause(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::ExcludingPosts(ids) if ids.is_empty() => None,
            Self::ExcludingPosts(ids) => {
                let list = ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!("posts.id NOT IN ({list})"))
            }
            Self::Predicate(sql) => Some(sql.clone()),
        }
    }

    /// This scope as a join / FROM target under `alias`.
    fn table_ref(&self, alias: &str) -> TableRef {
        match self.where_clause() {
            None => TableRef::aliased("posts", alias),
            Some(predicate) => Select::from(&TableRef::table("posts"))
                .project("posts.*")
                .filter(predicate)
                .into_derived(alias),
        }
    }
}

/// Query returning every scoped read-state row plus the id and page of its
/// first unread post, both NULL when the user is caught up.
///
/// The first unread post is the scope post with the smallest `created_at`
/// past the row's marker, located by a correlated MIN subquery inside the
/// join condition. Grouping runs on the read-state id and the unread post
/// id so both can be projected next to the read-post count.
pub fn first_unread_query(
    dialect: &dyn SqlDialect,
    states_scope: &ReadStatesScope,
    posts_per_page: i64,
    posts_scope: &PostsScope,
) -> String {
    assert!(posts_per_page >= 1, "posts_per_page must be >= 1");

    let states = TableRef::table("read_states");
    let unread = TableRef::aliased("posts", "unread_posts");
    let read = posts_scope.table_ref("read_posts");

    let first_unread_at = Select::from(&posts_scope.table_ref("posts"))
        .project(min("posts.created_at"))
        .filter(and(
            eq("posts.postable_id", states.col("postable_id")),
            gt("posts.created_at", states.col("read_at")),
        ))
        .to_sql();

    let per_row = Select::from(&states)
        .project(states.col("id"))
        .project(format!("{} AS first_unread_post_id", unread.col("id")))
        .project(page_projection(dialect, &read, posts_per_page))
        .inner_join(
            &unread,
            and(
                eq(unread.col("postable_id"), states.col("postable_id")),
                eq(unread.col("created_at"), format!("({first_unread_at})")),
            ),
        )
        .left_outer_join(&read, read_posts_on(&read, &states))
        .group_by(states.col("id"))
        .group_by(unread.col("id"))
        .into_derived("first_unread");

    annotate(
        &states,
        &per_row,
        &["first_unread_post_id", "first_unread_post_page"],
        states_scope,
        dialect,
    )
}

/// Page-only variant: no unread-post join, so no post id in the output.
///
/// Instead of anchoring on the unread post, the page is emitted whenever
/// the topic's `last_post_at` sits past the marker. A topic the user has
/// caught up on never gets a phantom page.
pub fn first_unread_page_query(
    dialect: &dyn SqlDialect,
    states_scope: &ReadStatesScope,
    posts_per_page: i64,
    posts_scope: &PostsScope,
) -> String {
    assert!(posts_per_page >= 1, "posts_per_page must be >= 1");

    let states = TableRef::table("read_states");
    let topics = TableRef::table("topics");
    let read = posts_scope.table_ref("read_posts");

    let per_row = Select::from(&states)
        .project(states.col("id"))
        .project(page_projection(dialect, &read, posts_per_page))
        .inner_join(
            &topics,
            and(
                eq(topics.col("id"), states.col("postable_id")),
                gt(topics.col("last_post_at"), states.col("read_at")),
            ),
        )
        .left_outer_join(&read, read_posts_on(&read, &states))
        .group_by(states.col("id"))
        .into_derived("first_unread_page");

    annotate(
        &states,
        &per_row,
        &["first_unread_post_page"],
        states_scope,
        dialect,
    )
}

/// Boundary page: full pages of already-read posts, plus one.
fn page_projection(dialect: &dyn SqlDialect, read: &TableRef, posts_per_page: i64) -> String {
    format!(
        "{} + 1 AS first_unread_post_page",
        dialect.integer_division(&count(read.col("id")), &posts_per_page.to_string()),
    )
}

/// Read posts belong to the row's topic and sit at or before the marker.
fn read_posts_on(read: &TableRef, states: &TableRef) -> String {
    and(
        eq(read.col("postable_id"), states.col("postable_id")),
        lt_eq(read.col("created_at"), states.col("read_at")),
    )
}

/// Left-join the per-row aggregate back onto the full rows, so topics with
/// nothing unread still come back — with NULL annotation columns.
fn annotate(
    states: &TableRef,
    per_row: &TableRef,
    columns: &[&str],
    states_scope: &ReadStatesScope,
    dialect: &dyn SqlDialect,
) -> String {
    let mut query = Select::from(states).project(format!("{}.*", states.qualifier()));
    for column in columns {
        query = query.project(per_row.col(column));
    }
    query = query.left_outer_join(per_row, eq(states.col("id"), per_row.col("id")));
    if let Some(predicate) = states_scope.predicate(states, dialect) {
        query = query.filter(predicate);
    }
    query.to_sql()
}
