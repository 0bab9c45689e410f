//! Read tracking for Colloquy discussions: per-user read markers over
//! threaded topics, and bulk first-unread lookups for topic listings.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod read_states;
pub mod sql;

pub use error::{Error, Result};
pub use models::read_state::{NullReadState, ReadState, ReadStatus};
pub use read_states::{PostsScope, ReadStatesScope};
