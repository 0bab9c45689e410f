//! Shared helpers for the DB-backed tests.
//!
//! These tests need a real PostgreSQL database. They skip themselves when
//! `TEST_DATABASE_URL` is unset, so the pure unit tests still run anywhere.

use std::sync::{Mutex, Once, OnceLock};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::Object;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use colloquy_reads::db::pool::{self, DbPool};
use colloquy_reads::models::post::{NewPost, Post};
use colloquy_reads::models::topic::{NewTopic, Topic};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

static TRACING: Once = Once::new();
static MIGRATION_LOCK: Mutex<()> = Mutex::new(());
static POOL: OnceLock<DbPool> = OnceLock::new();

pub type TestConn = Object<AsyncPgConnection>;

/// Check a connection out of the shared test pool, or `None` when
/// `TEST_DATABASE_URL` is unset. Runs pending migrations on the way in.
pub async fn try_conn() -> Option<TestConn> {
    let _ = dotenvy::dotenv();
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });

    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    migrate(url.clone()).await;

    let conn = POOL
        .get_or_init(|| pool::connect(&url))
        .get()
        .await
        .expect("checkout from test pool");
    Some(conn)
}

async fn migrate(url: String) {
    tokio::task::spawn_blocking(move || {
        // Parallel test binaries share the database; only one runner may
        // apply migrations at a time.
        let _guard = MIGRATION_LOCK.lock().unwrap();
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
            .expect("connect for migrations");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");
    })
    .await
    .expect("migration task");
}

pub fn unique_user_id() -> String {
    format!("usr_{}", ulid::Ulid::new())
}

fn unique_post_id() -> i64 {
    ulid::Ulid::new().0 as i64
}

/// Insert a topic with `count` posts spaced one minute apart, oldest
/// first, ending an hour before now. `last_post_at` tracks the newest
/// post. Timestamps sit on microsecond boundaries so they round-trip
/// through TIMESTAMPTZ exactly.
pub async fn create_topic_with_posts(
    conn: &mut AsyncPgConnection,
    count: usize,
) -> (Topic, Vec<Post>) {
    use colloquy_reads::db::schema::{posts, topics};

    let topic_id = format!("top_{}", ulid::Ulid::new());
    let base_micros = Utc::now().timestamp_micros() - 3_600_000_000;
    let times: Vec<DateTime<Utc>> = (0..count)
        .map(|i| {
            DateTime::from_timestamp_micros(base_micros + i as i64 * 60_000_000)
                .expect("valid timestamp")
        })
        .collect();

    let topic: Topic = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(topics::table)
            .values(NewTopic {
                id: &topic_id,
                title: "Reading progress",
                last_post_at: *times.last().expect("at least one post"),
            })
            .returning(Topic::as_returning()),
        conn,
    )
    .await
    .expect("insert topic");

    let new_posts: Vec<NewPost> = times
        .iter()
        .map(|created_at| NewPost {
            id: unique_post_id(),
            postable_id: &topic_id,
            author_id: "usr_fixture",
            content: "post body",
            created_at: *created_at,
        })
        .collect();

    let mut inserted: Vec<Post> = diesel_async::RunQueryDsl::get_results(
        diesel::insert_into(posts::table)
            .values(&new_posts)
            .returning(Post::as_returning()),
        conn,
    )
    .await
    .expect("insert posts");
    inserted.sort_by_key(|post| post.created_at);

    (topic, inserted)
}

/// Delete a fixture topic; its posts and read states ride the cascade.
pub async fn cleanup_topic(conn: &mut AsyncPgConnection, topic_id: &str) {
    use colloquy_reads::db::schema::topics;

    diesel_async::RunQueryDsl::execute(
        diesel::delete(topics::table.filter(topics::id.eq(topic_id))),
        conn,
    )
    .await
    .expect("cleanup topic");
}
