use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::read_states;
use crate::models::post::Post;
use crate::models::topic::Topic;

/// A user's read marker in a single topic.
///
/// At most one row exists per (`user_id`, `postable_id`). Every post
/// created at or before `read_at` counts as read; `page` is the last page
/// the user is known to have viewed and is advisory, never recomputed from
/// `read_at`.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Serialize)]
#[diesel(table_name = read_states)]
pub struct ReadState {
    pub id: i64,
    pub user_id: String,
    pub postable_id: String,
    pub read_at: DateTime<Utc>,
    pub page: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = read_states)]
pub struct NewReadState<'a> {
    pub user_id: &'a str,
    pub postable_id: &'a str,
    pub read_at: DateTime<Utc>,
    pub page: i32,
}

/// Read/unread predicates shared by persisted rows and [`NullReadState`].
pub trait ReadStatus {
    /// Last page the user is known to have viewed.
    fn page(&self) -> i32;

    /// True when every post in `topic` is read.
    fn read(&self, topic: &Topic) -> bool;

    /// True when `post` sits at or before the read marker. Equality counts
    /// as read: the post that set the marker is itself read.
    fn post_read(&self, post: &Post) -> bool;
}

impl ReadStatus for ReadState {
    fn page(&self) -> i32 {
        self.page
    }

    fn read(&self, topic: &Topic) -> bool {
        topic.last_post_at <= self.read_at
    }

    fn post_read(&self, post: &Post) -> bool {
        post.created_at <= self.read_at
    }
}

/// Stand-in for a user with no read-state row in a topic.
///
/// Lets call sites use one code path whether or not a row exists: nothing
/// is read, and the last viewed page is the first.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReadState;

impl ReadStatus for NullReadState {
    fn page(&self) -> i32 {
        1
    }

    fn read(&self, _topic: &Topic) -> bool {
        false
    }

    fn post_read(&self, _post: &Post) -> bool {
        false
    }
}
