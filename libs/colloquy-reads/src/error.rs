//! Error types for `colloquy-reads`.

use thiserror::Error;

/// Errors surfaced by the read-tracking operations.
///
/// Engine failures pass through untranslated; nothing is retried or logged
/// on the way up.
#[derive(Debug, Error)]
pub enum Error {
    /// `touch` was handed a page number below 1. Nothing was written.
    #[error("expected post_page >= 1, given {0}")]
    InvalidPostPage(i32),

    /// A read-state row already exists for this (user, postable) pair.
    #[error("read state already exists for user {user_id} in {postable_id}")]
    DuplicateReadState {
        user_id: String,
        postable_id: String,
    },

    #[error(transparent)]
    Database(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
