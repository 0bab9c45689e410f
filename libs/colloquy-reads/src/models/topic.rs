use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::topics;

/// Posts shown per topic page when the caller does not override it.
pub const DEFAULT_POSTS_PER_PAGE: i64 = 25;

/// A discussion topic, as far as read tracking needs to see one.
///
/// `last_post_at` is maintained by the posting path whenever a post is
/// added; read tracking only compares against it.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub last_post_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = topics)]
pub struct NewTopic<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub last_post_at: DateTime<Utc>,
}
