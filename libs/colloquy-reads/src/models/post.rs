use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::posts;

/// A post inside a topic. Ids are snowflakes assigned by the posting path.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: i64,
    pub postable_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost<'a> {
    pub id: i64,
    pub postable_id: &'a str,
    pub author_id: &'a str,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}
