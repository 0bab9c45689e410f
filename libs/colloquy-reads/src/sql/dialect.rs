//! Engine-family differences in generated SQL.
//!
//! PostgreSQL truncates integer division with plain `/`; MySQL and MariaDB
//! return a decimal there and need the dedicated `DIV` operator.

use diesel::backend::Backend;

/// SQL syntax that differs between engine families.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Truncating integer division of `a` by `b`.
    fn integer_division(&self, a: &str, b: &str) -> String;

    /// Escape and quote a string as a SQL literal.
    fn string_literal(&self, value: &str) -> String;
}

/// PostgreSQL family. `/` on integer operands already truncates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn integer_division(&self, a: &str, b: &str) -> String {
        format!("{a} / {b}")
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// MySQL / MariaDB family. Plain `/` yields a decimal, so integer division
/// goes through `DIV`; backslashes are escape characters inside literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl SqlDialect for MysqlDialect {
    fn integer_division(&self, a: &str, b: &str) -> String {
        format!("{a} DIV {b}")
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

/// Maps a Diesel backend onto the dialect its SQL must be rendered in, so
/// query construction follows the engine behind the active connection.
pub trait BackendDialect: Backend {
    type Dialect: SqlDialect + Default;

    fn dialect() -> Self::Dialect {
        Self::Dialect::default()
    }
}

impl BackendDialect for diesel::pg::Pg {
    type Dialect = PostgresDialect;
}

#[cfg(feature = "mysql")]
impl BackendDialect for diesel::mysql::Mysql {
    type Dialect = MysqlDialect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_divides_with_slash() {
        let sql = PostgresDialect.integer_division("COUNT(read_posts.id)", "25");
        assert_eq!(sql, "COUNT(read_posts.id) / 25");
    }

    #[test]
    fn mysql_divides_with_div() {
        let sql = MysqlDialect.integer_division("COUNT(read_posts.id)", "25");
        assert_eq!(sql, "COUNT(read_posts.id) DIV 25");
    }

    #[test]
    fn postgres_doubles_single_quotes() {
        assert_eq!(PostgresDialect.string_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn mysql_escapes_backslashes_and_quotes() {
        assert_eq!(
            MysqlDialect.string_literal(r"a\b'c"),
            r"'a\\b''c'"
        );
    }
}
