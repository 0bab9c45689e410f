//! Hand-built SELECT composition.
//!
//! The bulk unread queries join against aliased derived tables, project
//! aggregates next to plain columns, and pick operators per engine family.
//! Diesel's typed DSL does not reach that shape, so this module composes
//! the SQL text directly, behind small handles instead of one-off string
//! constants.

pub mod dialect;

use std::fmt::Display;

pub use dialect::{BackendDialect, MysqlDialect, PostgresDialect, SqlDialect};

/// A table, aliased table, or aliased derived table usable in FROM / JOIN.
#[derive(Debug, Clone)]
pub struct TableRef {
    source: Source,
    alias: Option<String>,
}

#[derive(Debug, Clone)]
enum Source {
    Table(String),
    Derived(String),
}

impl TableRef {
    /// A plain table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            source: Source::Table(name.into()),
            alias: None,
        }
    }

    /// A table under an alias. An alias equal to the table name renders as
    /// the bare table.
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: Source::Table(name.into()),
            alias: Some(alias.into()),
        }
    }

    /// A derived table (subquery) under an alias.
    pub fn derived(sql: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: Source::Derived(sql.into()),
            alias: Some(alias.into()),
        }
    }

    /// The name this table answers to in predicates and projections.
    pub fn qualifier(&self) -> &str {
        match (&self.alias, &self.source) {
            (Some(alias), _) => alias,
            (None, Source::Table(name)) => name,
            (None, Source::Derived(_)) => unreachable!("derived tables always carry an alias"),
        }
    }

    /// A column qualified by this table's name or alias.
    pub fn col(&self, column: &str) -> String {
        format!("{}.{column}", self.qualifier())
    }

    /// The fragment used in FROM and JOIN clauses.
    fn from_clause(&self) -> String {
        match (&self.source, &self.alias) {
            (Source::Table(name), None) => name.clone(),
            (Source::Table(name), Some(alias)) if alias == name => name.clone(),
            (Source::Table(name), Some(alias)) => format!("{name} AS {alias}"),
            (Source::Derived(sql), Some(alias)) => format!("({sql}) AS {alias}"),
            (Source::Derived(_), None) => unreachable!("derived tables always carry an alias"),
        }
    }
}

/// An under-construction SELECT statement.
#[derive(Debug, Clone)]
pub struct Select {
    projections: Vec<String>,
    from: String,
    joins: Vec<String>,
    predicates: Vec<String>,
    group_by: Vec<String>,
}

impl Select {
    pub fn from(table: &TableRef) -> Self {
        Self {
            projections: Vec::new(),
            from: table.from_clause(),
            joins: Vec::new(),
            predicates: Vec::new(),
            group_by: Vec::new(),
        }
    }

    /// Add a projected expression.
    pub fn project(mut self, expr: impl Into<String>) -> Self {
        self.projections.push(expr.into());
        self
    }

    pub fn inner_join(mut self, table: &TableRef, on: impl Into<String>) -> Self {
        self.joins
            .push(format!("INNER JOIN {} ON {}", table.from_clause(), on.into()));
        self
    }

    /// Outer join: unmatched left rows survive with NULLs on the right.
    pub fn left_outer_join(mut self, table: &TableRef, on: impl Into<String>) -> Self {
        self.joins.push(format!(
            "LEFT OUTER JOIN {} ON {}",
            table.from_clause(),
            on.into()
        ));
        self
    }

    /// AND another predicate onto the WHERE clause.
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Render to SQL text.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.projections.join(", "), self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        sql
    }

    /// Close over this query as an aliased derived table.
    pub fn into_derived(self, alias: &str) -> TableRef {
        TableRef::derived(self.to_sql(), alias)
    }
}

pub fn eq(a: impl Display, b: impl Display) -> String {
    format!("{a} = {b}")
}

pub fn gt(a: impl Display, b: impl Display) -> String {
    format!("{a} > {b}")
}

pub fn lt_eq(a: impl Display, b: impl Display) -> String {
    format!("{a} <= {b}")
}

pub fn and(a: impl Display, b: impl Display) -> String {
    format!("{a} AND {b}")
}

pub fn count(expr: impl Display) -> String {
    format!("COUNT({expr})")
}

pub fn min(expr: impl Display) -> String {
    format!("MIN({expr})")
}
