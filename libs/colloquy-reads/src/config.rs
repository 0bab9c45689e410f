use crate::models::topic::DEFAULT_POSTS_PER_PAGE;

/// Read-tracking configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Page size used for first-unread page computation when the caller
    /// does not pass one explicitly.
    pub posts_per_page: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_var("DATABASE_URL"),
            posts_per_page: std::env::var("POSTS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POSTS_PER_PAGE),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}
